use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
};
use chrono::Local;

use super::identity::Identity;
use super::{ApiError, ApiResponse, AppState};
use super::types::{BookingDto, CancelResultDto, CreateBookingRequest, MyBookingsDto};
use crate::domain::TimeSlot;

pub async fn create_booking(
    State(state): State<Arc<AppState>>,
    Identity(actor): Identity,
    Json(req): Json<CreateBookingRequest>,
) -> Result<Json<ApiResponse<BookingDto>>, ApiError> {
    let slot = TimeSlot::new(req.start_time, req.end_time)?;
    let now = Local::now().naive_local();

    let booking = state
        .bookings
        .create(&actor, req.desk_id, req.date, slot, now)
        .await?;

    Ok(Json(ApiResponse::success(BookingDto::from(booking))))
}

pub async fn check_in(
    State(state): State<Arc<AppState>>,
    Identity(actor): Identity,
    Path(booking_id): Path<i32>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let now = Local::now().naive_local();
    state.bookings.check_in(&actor, booking_id, now).await?;
    Ok(Json(ApiResponse::success(())))
}

pub async fn cancel(
    State(state): State<Arc<AppState>>,
    Identity(actor): Identity,
    Path(booking_id): Path<i32>,
) -> Result<Json<ApiResponse<CancelResultDto>>, ApiError> {
    // Cleaning up any external calendar event is the caller's job; the
    // stored reference is handed back for that purpose.
    let calendar_event_id = state.bookings.cancel(&actor, booking_id).await?;
    Ok(Json(ApiResponse::success(CancelResultDto {
        calendar_event_id,
    })))
}

pub async fn my_bookings(
    State(state): State<Arc<AppState>>,
    Identity(actor): Identity,
) -> Result<Json<ApiResponse<MyBookingsDto>>, ApiError> {
    let today = Local::now().date_naive();
    let (upcoming, past) = state.queries.user_bookings(actor.user_id, today).await?;

    Ok(Json(ApiResponse::success(MyBookingsDto {
        upcoming: upcoming.into_iter().map(BookingDto::from).collect(),
        past: past.into_iter().map(BookingDto::from).collect(),
    })))
}
