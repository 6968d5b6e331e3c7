//! Domain service for the booking lifecycle.
//!
//! This module provides the [`BookingService`] trait, abstracting slot
//! validation, conflict detection, and the booked → cancelled / no-show
//! transitions.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use thiserror::Error;

use crate::domain::{Actor, BookingId, DeskId, TimeSlot};
use crate::entities::bookings;

/// Domain errors for booking operations.
#[derive(Debug, Error)]
pub enum BookingError {
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("Invalid interval: start {start} must be before end {end}")]
    InvalidInterval { start: NaiveTime, end: NaiveTime },

    #[error("Date {0} is in the past")]
    DateInPast(NaiveDate),

    #[error("Desk not found: {0}")]
    UnknownDesk(DeskId),

    #[error("Desk {0} is retired")]
    DeskInactive(DeskId),

    #[error("Booking not found: {0}")]
    BookingNotFound(BookingId),

    #[error("Slot conflict: the desk is already booked for an overlapping interval")]
    SlotConflict,

    #[error("Not permitted: {0}")]
    BookingNotPermitted(String),

    #[error("Check-in window closed: booking runs {start}-{end}")]
    OutsideCheckInWindow { start: NaiveTime, end: NaiveTime },

    #[error("Invalid lifecycle transition: {0}")]
    InvalidTransition(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<anyhow::Error> for BookingError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Domain service trait for booking lifecycle operations.
///
/// Every operation takes the acting user and the caller's clock explicitly,
/// so tests and the sweeper drive time deterministically.
#[async_trait::async_trait]
pub trait BookingService: Send + Sync {
    /// Checks whether a desk is free for the whole slot on a date.
    ///
    /// Only `booked` rows block a slot; cancelled and no-show rows free it.
    /// Advisory: the authoritative check runs atomically inside [`create`].
    ///
    /// # Errors
    ///
    /// - Returns [`BookingError::UnknownDesk`] / [`BookingError::DeskInactive`]
    ///   for a missing or retired desk
    /// - Returns [`BookingError::DateInPast`] if `date` precedes `today`
    ///
    /// [`create`]: BookingService::create
    async fn is_available(
        &self,
        desk_id: DeskId,
        date: NaiveDate,
        slot: TimeSlot,
        today: NaiveDate,
    ) -> Result<bool, BookingError>;

    /// Creates a booking after validating the actor, the desk, and the slot.
    ///
    /// Conflict detection is re-run inside a transaction under a per
    /// (desk, date) lock, so two racing requests for overlapping slots
    /// cannot both commit.
    ///
    /// # Errors
    ///
    /// - Returns [`BookingError::DateInPast`] if `date` precedes `now.date()`
    /// - Returns [`BookingError::BookingNotPermitted`] if the actor may not book
    /// - Returns [`BookingError::UnknownDesk`] / [`BookingError::DeskInactive`]
    ///   for a missing or retired desk
    /// - Returns [`BookingError::SlotConflict`] when any live booking overlaps
    async fn create(
        &self,
        actor: &Actor,
        desk_id: DeskId,
        date: NaiveDate,
        slot: TimeSlot,
        now: NaiveDateTime,
    ) -> Result<bookings::Model, BookingError>;

    /// Marks a booking as checked in. Idempotent: repeating the call for an
    /// already checked-in booking succeeds without effect.
    ///
    /// # Errors
    ///
    /// - Returns [`BookingError::OutsideCheckInWindow`] when `now` falls
    ///   outside the inclusive `[start, end]` window on the booking's date
    /// - Returns [`BookingError::InvalidTransition`] for terminal bookings
    async fn check_in(
        &self,
        actor: &Actor,
        booking_id: BookingId,
        now: NaiveDateTime,
    ) -> Result<(), BookingError>;

    /// Cancels a booking, freeing its slot. Returns the external calendar
    /// event reference, if one was attached, so the caller can clean it up.
    ///
    /// # Errors
    ///
    /// - Returns [`BookingError::BookingNotPermitted`] unless the actor owns the
    ///   booking or is an admin
    /// - Returns [`BookingError::InvalidTransition`] for terminal bookings
    async fn cancel(
        &self,
        actor: &Actor,
        booking_id: BookingId,
    ) -> Result<Option<String>, BookingError>;

    /// Transitions an overdue booking to no-show. Returns `true` when this
    /// call performed the transition, `false` when another sweep already had.
    ///
    /// # Errors
    ///
    /// - Returns [`BookingError::InvalidTransition`] if the booking was
    ///   checked in, cancelled, or its grace period has not elapsed
    async fn mark_no_show(
        &self,
        booking_id: BookingId,
        now: NaiveDateTime,
    ) -> Result<bool, BookingError>;
}
