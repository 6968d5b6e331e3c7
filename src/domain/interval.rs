//! Half-open time interval `[start, end)` within a single operating day.
//!
//! Minute granularity, no fixed slot boundaries: whatever HH:MM pair the
//! caller supplies is kept as-is, never rounded.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::services::booking_service::BookingError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    start: NaiveTime,
    end: NaiveTime,
}

impl TimeSlot {
    /// Builds a slot, rejecting empty or inverted intervals.
    pub fn new(start: NaiveTime, end: NaiveTime) -> Result<Self, BookingError> {
        if start >= end {
            return Err(BookingError::InvalidInterval { start, end });
        }
        Ok(Self { start, end })
    }

    #[must_use]
    pub const fn start(&self) -> NaiveTime {
        self.start
    }

    #[must_use]
    pub const fn end(&self) -> NaiveTime {
        self.end
    }

    /// True iff the two intervals share at least one minute.
    ///
    /// Touching intervals (`a.end == b.start`) do not overlap; back-to-back
    /// bookings on the same desk are allowed.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start.max(other.start) < self.end.min(other.end)
    }

    /// Overlap test against raw column values from the bookings table.
    #[must_use]
    pub fn overlaps_times(&self, start: NaiveTime, end: NaiveTime) -> bool {
        self.start.max(start) < self.end.min(end)
    }

    /// True iff `at` falls within `[start, end]`, end inclusive.
    ///
    /// Check-in is accepted up to and including the booking's end time.
    #[must_use]
    pub fn contains_inclusive(&self, at: NaiveTime) -> bool {
        self.start <= at && at <= self.end
    }
}

impl std::fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}-{}",
            self.start.format("%H:%M"),
            self.end.format("%H:%M")
        )
    }
}
