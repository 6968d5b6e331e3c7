//! Periodic no-show enforcement.
//!
//! The sweep finds bookings whose grace period has elapsed without a
//! check-in and transitions them to no-show. Every transition goes through
//! [`BookingService::mark_no_show`], whose guarded update makes concurrent
//! or repeated sweeps converge on the same result.

use std::sync::Arc;

use chrono::{Duration, NaiveDateTime};
use tracing::info;

use crate::db::Store;
use crate::services::booking_service::{BookingError, BookingService};

pub struct NoShowSweeper {
    store: Store,
    bookings: Arc<dyn BookingService>,
    grace_minutes: i64,
}

impl NoShowSweeper {
    #[must_use]
    pub fn new(store: Store, bookings: Arc<dyn BookingService>, grace_minutes: i64) -> Self {
        Self {
            store,
            bookings,
            grace_minutes,
        }
    }

    /// Runs one sweep against the supplied clock and returns how many
    /// bookings this call transitioned.
    ///
    /// A booking is overdue once `start + grace <= now`; the boundary minute
    /// itself is overdue. Re-running the sweep with the same clock is a
    /// no-op.
    pub async fn sweep(&self, now: NaiveDateTime) -> Result<usize, BookingError> {
        let cutoff = now - Duration::minutes(self.grace_minutes);
        let candidates = self
            .store
            .no_show_candidates(cutoff.date(), cutoff.time())
            .await
            .map_err(BookingError::from)?;

        let mut transitioned = 0usize;
        for booking in candidates {
            match self.bookings.mark_no_show(booking.id, now).await {
                Ok(true) => transitioned += 1,
                // Another sweep got there first.
                Ok(false) => {}
                // The booking was checked in or cancelled between the select
                // and the transition; leave it alone.
                Err(BookingError::InvalidTransition(_) | BookingError::BookingNotFound(_)) => {}
                Err(err) => return Err(err),
            }
        }

        if transitioned > 0 {
            info!(transitioned, "No-show sweep finished");
        }

        Ok(transitioned)
    }
}
