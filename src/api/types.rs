use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::entities::bookings::{self, BookingStatus};
use crate::entities::{audit_log, desks, users};

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub const fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DeskDto {
    pub id: i32,
    pub name: String,
    pub location: Option<String>,
    pub is_active: bool,
    pub admin_only: bool,
}

impl From<desks::Model> for DeskDto {
    fn from(m: desks::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            location: m.location,
            is_active: m.is_active,
            admin_only: m.admin_only,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BookingDto {
    pub id: i32,
    pub user_id: i32,
    pub desk_id: i32,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub status: BookingStatus,
    pub checked_in: bool,
    pub created_at: String,
}

impl From<bookings::Model> for BookingDto {
    fn from(m: bookings::Model) -> Self {
        Self {
            id: m.id,
            user_id: m.user_id,
            desk_id: m.desk_id,
            date: m.date,
            start_time: m.start_time,
            end_time: m.end_time,
            status: m.status,
            checked_in: m.checked_in,
            created_at: m.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MyBookingsDto {
    pub upcoming: Vec<BookingDto>,
    pub past: Vec<BookingDto>,
}

#[derive(Debug, Serialize)]
pub struct UserDto {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub role: String,
    pub can_book: bool,
    pub is_active: bool,
}

impl From<users::Model> for UserDto {
    fn from(m: users::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            email: m.email,
            role: m.role,
            can_book: m.can_book,
            is_active: m.is_active,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AuditEntryDto {
    pub id: i64,
    pub actor_email: String,
    pub action: String,
    pub details: String,
    pub created_at: String,
}

impl From<audit_log::Model> for AuditEntryDto {
    fn from(m: audit_log::Model) -> Self {
        Self {
            id: m.id,
            actor_email: m.actor_email,
            action: m.action,
            details: m.details,
            created_at: m.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CancelResultDto {
    pub calendar_event_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AvailabilityDto {
    pub available: bool,
}

#[derive(Debug, Serialize)]
pub struct SweepResultDto {
    pub transitioned: usize,
}

#[derive(Debug, Deserialize)]
pub struct CreateBookingRequest {
    pub desk_id: i32,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

#[derive(Debug, Deserialize)]
pub struct ScheduleQuery {
    pub date: NaiveDate,
}

#[derive(Debug, Deserialize)]
pub struct AvailabilityQuery {
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

#[derive(Debug, Deserialize)]
pub struct CreateDeskRequest {
    pub name: String,
    pub location: Option<String>,
    #[serde(default)]
    pub admin_only: bool,
}

#[derive(Debug, Deserialize)]
pub struct ToggleRequest {
    pub enabled: bool,
}
