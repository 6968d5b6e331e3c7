use anyhow::Result;
use chrono::{NaiveDate, NaiveTime};
use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, EntityTrait, FromQueryResult, QueryFilter,
    QueryOrder, QuerySelect, sea_query::Expr,
};
use serde::Serialize;

use crate::entities::bookings::BookingStatus;
use crate::entities::{bookings, prelude::*, users};

pub struct BookingRepository {
    conn: DatabaseConnection,
}

impl BookingRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn get(&self, booking_id: i32) -> Result<Option<bookings::Model>> {
        let row = Bookings::find_by_id(booking_id).one(&self.conn).await?;
        Ok(row)
    }

    /// Bookings that block availability: status `booked` only. Terminal rows
    /// free their slot again.
    pub async fn active_for_desk_date(
        &self,
        desk_id: i32,
        date: NaiveDate,
    ) -> Result<Vec<bookings::Model>> {
        let rows = Bookings::find()
            .filter(bookings::Column::DeskId.eq(desk_id))
            .filter(bookings::Column::Date.eq(date))
            .filter(bookings::Column::Status.eq(BookingStatus::Booked))
            .order_by_asc(bookings::Column::StartTime)
            .all(&self.conn)
            .await?;

        Ok(rows)
    }

    /// Full desk-day schedule, every status, for display.
    pub async fn for_desk_date(
        &self,
        desk_id: i32,
        date: NaiveDate,
    ) -> Result<Vec<bookings::Model>> {
        let rows = Bookings::find()
            .filter(bookings::Column::DeskId.eq(desk_id))
            .filter(bookings::Column::Date.eq(date))
            .order_by_asc(bookings::Column::StartTime)
            .all(&self.conn)
            .await?;

        Ok(rows)
    }

    pub async fn upcoming_for_user(
        &self,
        user_id: i32,
        today: NaiveDate,
    ) -> Result<Vec<bookings::Model>> {
        let rows = Bookings::find()
            .filter(bookings::Column::UserId.eq(user_id))
            .filter(bookings::Column::Date.gte(today))
            .filter(bookings::Column::Status.eq(BookingStatus::Booked))
            .order_by_asc(bookings::Column::Date)
            .order_by_asc(bookings::Column::StartTime)
            .all(&self.conn)
            .await?;

        Ok(rows)
    }

    pub async fn past_for_user(
        &self,
        user_id: i32,
        today: NaiveDate,
    ) -> Result<Vec<bookings::Model>> {
        let rows = Bookings::find()
            .filter(bookings::Column::UserId.eq(user_id))
            .filter(
                Condition::any()
                    .add(bookings::Column::Date.lt(today))
                    .add(bookings::Column::Status.ne(BookingStatus::Booked)),
            )
            .order_by_desc(bookings::Column::Date)
            .order_by_desc(bookings::Column::StartTime)
            .all(&self.conn)
            .await?;

        Ok(rows)
    }

    /// Admin overview: everything, newest dates first.
    pub async fn list_all(&self) -> Result<Vec<bookings::Model>> {
        let rows = Bookings::find()
            .order_by_desc(bookings::Column::Date)
            .order_by_asc(bookings::Column::StartTime)
            .all(&self.conn)
            .await?;

        Ok(rows)
    }

    /// Sets the checked-in flag, guarded so only a live booking is touched.
    /// Returns the number of rows changed (0 or 1).
    pub async fn set_checked_in(&self, booking_id: i32) -> Result<u64> {
        let result = Bookings::update_many()
            .col_expr(bookings::Column::CheckedIn, Expr::value(true))
            .filter(bookings::Column::Id.eq(booking_id))
            .filter(bookings::Column::Status.eq(BookingStatus::Booked))
            .filter(bookings::Column::CheckedIn.eq(false))
            .exec(&self.conn)
            .await?;

        Ok(result.rows_affected)
    }

    /// Cancels a booking iff it is still `booked`. The guard in the WHERE
    /// clause makes the transition atomic against concurrent sweeps.
    pub async fn cancel_if_booked(&self, booking_id: i32) -> Result<u64> {
        let result = Bookings::update_many()
            .col_expr(
                bookings::Column::Status,
                Expr::value(BookingStatus::Cancelled),
            )
            .filter(bookings::Column::Id.eq(booking_id))
            .filter(bookings::Column::Status.eq(BookingStatus::Booked))
            .exec(&self.conn)
            .await?;

        Ok(result.rows_affected)
    }

    /// Transitions a booking to `no_show` iff it is still `booked` and was
    /// never checked in. Concurrent sweeps may race here; at most one wins.
    pub async fn mark_no_show_if_eligible(&self, booking_id: i32) -> Result<u64> {
        let result = Bookings::update_many()
            .col_expr(bookings::Column::Status, Expr::value(BookingStatus::NoShow))
            .filter(bookings::Column::Id.eq(booking_id))
            .filter(bookings::Column::Status.eq(BookingStatus::Booked))
            .filter(bookings::Column::CheckedIn.eq(false))
            .exec(&self.conn)
            .await?;

        Ok(result.rows_affected)
    }

    /// Bookings eligible for the no-show sweep: still `booked`, never checked
    /// in, and starting at or before the cutoff (`now - grace`).
    pub async fn no_show_candidates(
        &self,
        cutoff_date: NaiveDate,
        cutoff_time: NaiveTime,
    ) -> Result<Vec<bookings::Model>> {
        let rows = Bookings::find()
            .filter(bookings::Column::Status.eq(BookingStatus::Booked))
            .filter(bookings::Column::CheckedIn.eq(false))
            .filter(
                Condition::any()
                    .add(bookings::Column::Date.lt(cutoff_date))
                    .add(
                        Condition::all()
                            .add(bookings::Column::Date.eq(cutoff_date))
                            .add(bookings::Column::StartTime.lte(cutoff_time)),
                    ),
            )
            .all(&self.conn)
            .await?;

        Ok(rows)
    }

    /// No-show report rows with the owning user attached, newest first.
    pub async fn no_show_report(&self) -> Result<Vec<NoShowRow>> {
        let rows = Bookings::find()
            .select_only()
            .column_as(bookings::Column::Id, "booking_id")
            .column_as(bookings::Column::DeskId, "desk_id")
            .column(bookings::Column::Date)
            .column(bookings::Column::StartTime)
            .column(bookings::Column::EndTime)
            .column_as(users::Column::Name, "user_name")
            .column_as(users::Column::Email, "user_email")
            .inner_join(Users)
            .filter(bookings::Column::Status.eq(BookingStatus::NoShow))
            .order_by_desc(bookings::Column::Date)
            .into_model::<NoShowRow>()
            .all(&self.conn)
            .await?;

        Ok(rows)
    }

    /// Per-user attendance aggregate for the compliance overview.
    pub async fn compliance_summary(&self) -> Result<Vec<ComplianceRow>> {
        let rows = Users::find()
            .select_only()
            .column_as(users::Column::Id, "user_id")
            .column_as(users::Column::Name, "user_name")
            .column_as(users::Column::Email, "user_email")
            .column_as(bookings::Column::Id.count(), "total_bookings")
            .column_as(
                Expr::cust("COALESCE(SUM(CASE WHEN bookings.checked_in THEN 1 ELSE 0 END), 0)"),
                "attended",
            )
            .column_as(
                Expr::cust(
                    "COALESCE(SUM(CASE WHEN bookings.status = 'no_show' THEN 1 ELSE 0 END), 0)",
                ),
                "no_shows",
            )
            .left_join(Bookings)
            .group_by(users::Column::Id)
            .into_model::<ComplianceRow>()
            .all(&self.conn)
            .await?;

        Ok(rows)
    }
}

#[derive(Debug, Clone, FromQueryResult, Serialize)]
pub struct NoShowRow {
    pub booking_id: i32,
    pub desk_id: i32,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub user_name: String,
    pub user_email: String,
}

#[derive(Debug, Clone, FromQueryResult, Serialize)]
pub struct ComplianceRow {
    pub user_id: i32,
    pub user_name: String,
    pub user_email: String,
    pub total_bookings: i64,
    pub attended: i64,
    pub no_shows: i64,
}
