//! Read-side queries: schedules, personal booking lists, and the HR
//! attendance reports. No lifecycle transitions happen here.

use anyhow::Result;
use chrono::NaiveDate;

use crate::db::{ComplianceRow, NoShowRow, Store};
use crate::domain::{DeskId, UserId};
use crate::entities::bookings;
use crate::services::booking_service::BookingError;

#[derive(Clone)]
pub struct QueryService {
    store: Store,
}

impl QueryService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    /// Full schedule for one desk on one day, every status, ordered by start
    /// time.
    pub async fn desk_schedule(
        &self,
        desk_id: DeskId,
        date: NaiveDate,
    ) -> Result<Vec<bookings::Model>, BookingError> {
        self.store
            .get_desk(desk_id)
            .await?
            .ok_or(BookingError::UnknownDesk(desk_id))?;

        let rows = self.store.bookings_for_desk_date(desk_id, date).await?;
        Ok(rows)
    }

    /// A user's bookings split into upcoming (still booked, today or later)
    /// and past (earlier days, or already resolved).
    pub async fn user_bookings(
        &self,
        user_id: UserId,
        today: NaiveDate,
    ) -> Result<(Vec<bookings::Model>, Vec<bookings::Model>)> {
        let upcoming = self.store.upcoming_bookings_for_user(user_id, today).await?;
        let past = self.store.past_bookings_for_user(user_id, today).await?;
        Ok((upcoming, past))
    }

    pub async fn all_bookings(&self) -> Result<Vec<bookings::Model>> {
        self.store.list_all_bookings().await
    }

    pub async fn compliance(&self) -> Result<Vec<ComplianceRow>> {
        self.store.compliance_summary().await
    }

    pub async fn no_show_report(&self) -> Result<Vec<NoShowRow>> {
        self.store.no_show_report().await
    }
}
