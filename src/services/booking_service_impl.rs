//! SeaORM-backed implementation of [`BookingService`].

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Duration, NaiveDate, NaiveDateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, Set, TransactionTrait,
};
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::db::Store;
use crate::domain::{Actor, BookingId, DeskId, TimeSlot};
use crate::entities::bookings::{self, BookingStatus};
use crate::entities::desks;
use crate::entities::prelude::Bookings;
use crate::services::audit::{self, AuditRecorder};
use crate::services::booking_service::{BookingError, BookingService};

/// Booking lifecycle service backed by the SQLite store.
///
/// Creation is serialized per (desk, date): the pre-insert conflict check and
/// the insert run inside one transaction while holding that slot's lock, so
/// overlapping requests cannot both commit.
pub struct SeaOrmBookingService {
    store: Store,
    audit: AuditRecorder,
    grace_minutes: i64,
    slot_locks: Mutex<HashMap<(DeskId, NaiveDate), Arc<Mutex<()>>>>,
}

impl SeaOrmBookingService {
    #[must_use]
    pub fn new(store: Store, audit: AuditRecorder, grace_minutes: i64) -> Self {
        Self {
            store,
            audit,
            grace_minutes,
            slot_locks: Mutex::new(HashMap::new()),
        }
    }

    async fn slot_lock(&self, desk_id: DeskId, date: NaiveDate) -> Arc<Mutex<()>> {
        let mut locks = self.slot_locks.lock().await;
        locks
            .entry((desk_id, date))
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    async fn bookable_desk(
        &self,
        actor: &Actor,
        desk_id: DeskId,
    ) -> Result<desks::Model, BookingError> {
        let desk = self
            .store
            .get_desk(desk_id)
            .await?
            .ok_or(BookingError::UnknownDesk(desk_id))?;

        if !desk.is_active {
            return Err(BookingError::DeskInactive(desk_id));
        }

        if desk.admin_only && !actor.is_admin() {
            return Err(BookingError::BookingNotPermitted(format!(
                "desk {} is reserved for admins",
                desk.name
            )));
        }

        Ok(desk)
    }
}

#[async_trait::async_trait]
impl BookingService for SeaOrmBookingService {
    async fn is_available(
        &self,
        desk_id: DeskId,
        date: NaiveDate,
        slot: TimeSlot,
        today: NaiveDate,
    ) -> Result<bool, BookingError> {
        if date < today {
            return Err(BookingError::DateInPast(date));
        }

        let desk = self
            .store
            .get_desk(desk_id)
            .await?
            .ok_or(BookingError::UnknownDesk(desk_id))?;

        if !desk.is_active {
            return Err(BookingError::DeskInactive(desk_id));
        }

        let existing = self.store.active_bookings_for_desk_date(desk_id, date).await?;
        let free = !existing
            .iter()
            .any(|b| slot.overlaps_times(b.start_time, b.end_time));

        Ok(free)
    }

    async fn create(
        &self,
        actor: &Actor,
        desk_id: DeskId,
        date: NaiveDate,
        slot: TimeSlot,
        now: NaiveDateTime,
    ) -> Result<bookings::Model, BookingError> {
        if date < now.date() {
            return Err(BookingError::DateInPast(date));
        }

        if !actor.can_book {
            return Err(BookingError::BookingNotPermitted(
                "booking privileges are suspended".to_string(),
            ));
        }

        let desk = self.bookable_desk(actor, desk_id).await?;

        let lock = self.slot_lock(desk_id, date).await;
        let _guard = lock.lock().await;

        let txn = self.store.conn.begin().await?;

        let conflicts = Bookings::find()
            .filter(bookings::Column::DeskId.eq(desk_id))
            .filter(bookings::Column::Date.eq(date))
            .filter(bookings::Column::Status.eq(BookingStatus::Booked))
            .filter(bookings::Column::StartTime.lt(slot.end()))
            .filter(bookings::Column::EndTime.gt(slot.start()))
            .count(&txn)
            .await?;

        if conflicts > 0 {
            txn.rollback().await?;
            return Err(BookingError::SlotConflict);
        }

        let model = bookings::ActiveModel {
            user_id: Set(actor.user_id),
            desk_id: Set(desk_id),
            date: Set(date),
            start_time: Set(slot.start()),
            end_time: Set(slot.end()),
            status: Set(BookingStatus::Booked),
            checked_in: Set(false),
            created_at: Set(Utc::now().to_rfc3339()),
            calendar_event_id: Set(None),
            ..Default::default()
        };

        let booking = model.insert(&txn).await?;
        txn.commit().await?;

        info!(
            booking_id = booking.id,
            desk_id,
            date = %date,
            slot = %slot,
            user = %actor.email,
            "Booking created"
        );

        self.audit
            .record(
                &actor.email,
                audit::BOOKING_CREATED,
                &format!("desk '{}' on {date} {slot}", desk.name),
            )
            .await;

        Ok(booking)
    }

    async fn check_in(
        &self,
        actor: &Actor,
        booking_id: BookingId,
        now: NaiveDateTime,
    ) -> Result<(), BookingError> {
        let booking = self
            .store
            .get_booking(booking_id)
            .await?
            .ok_or(BookingError::BookingNotFound(booking_id))?;

        if booking.user_id != actor.user_id && !actor.is_admin() {
            return Err(BookingError::BookingNotPermitted(
                "only the booking owner may check in".to_string(),
            ));
        }

        // Terminal states win over the idempotent no-op: a booking that was
        // checked in and later cancelled still rejects further check-ins.
        if booking.status.is_terminal() {
            return Err(BookingError::InvalidTransition(format!(
                "cannot check in a {:?} booking",
                booking.status
            )));
        }

        // Repeated check-in is a no-op, not an error.
        if booking.checked_in {
            return Ok(());
        }

        // The window is inclusive at both ends: arriving exactly at the end
        // time still counts.
        let in_window = booking.date == now.date()
            && booking.start_time <= now.time()
            && now.time() <= booking.end_time;

        if !in_window {
            return Err(BookingError::OutsideCheckInWindow {
                start: booking.start_time,
                end: booking.end_time,
            });
        }

        let changed = self.store.set_booking_checked_in(booking_id).await?;
        if changed == 0 {
            // Lost a race. If the other writer was another check-in we are
            // still fine; anything else invalidated the booking under us.
            let current = self
                .store
                .get_booking(booking_id)
                .await?
                .ok_or(BookingError::BookingNotFound(booking_id))?;

            if !current.checked_in {
                return Err(BookingError::InvalidTransition(format!(
                    "booking moved to {:?} concurrently",
                    current.status
                )));
            }
        }

        info!(booking_id, user = %actor.email, "Checked in");

        self.audit
            .record(
                &actor.email,
                audit::CHECK_IN,
                &format!("booking {booking_id}"),
            )
            .await;

        Ok(())
    }

    async fn cancel(
        &self,
        actor: &Actor,
        booking_id: BookingId,
    ) -> Result<Option<String>, BookingError> {
        let booking = self
            .store
            .get_booking(booking_id)
            .await?
            .ok_or(BookingError::BookingNotFound(booking_id))?;

        if booking.user_id != actor.user_id && !actor.is_admin() {
            return Err(BookingError::BookingNotPermitted(
                "only the booking owner or an admin may cancel".to_string(),
            ));
        }

        if booking.status != BookingStatus::Booked {
            return Err(BookingError::InvalidTransition(format!(
                "cannot cancel a {:?} booking",
                booking.status
            )));
        }

        let changed = self.store.cancel_booking_if_booked(booking_id).await?;
        if changed == 0 {
            return Err(BookingError::InvalidTransition(
                "booking left the booked state concurrently".to_string(),
            ));
        }

        info!(booking_id, user = %actor.email, "Booking cancelled");

        self.audit
            .record(
                &actor.email,
                audit::BOOKING_CANCELLED,
                &format!(
                    "booking {booking_id} (desk {} on {})",
                    booking.desk_id, booking.date
                ),
            )
            .await;

        Ok(booking.calendar_event_id)
    }

    async fn mark_no_show(
        &self,
        booking_id: BookingId,
        now: NaiveDateTime,
    ) -> Result<bool, BookingError> {
        let booking = self
            .store
            .get_booking(booking_id)
            .await?
            .ok_or(BookingError::BookingNotFound(booking_id))?;

        // A concurrent sweep may have won already; that is success for both.
        if booking.status == BookingStatus::NoShow {
            return Ok(false);
        }

        if booking.status == BookingStatus::Cancelled {
            return Err(BookingError::InvalidTransition(
                "cannot mark a cancelled booking as no-show".to_string(),
            ));
        }

        if booking.checked_in {
            return Err(BookingError::InvalidTransition(
                "booking was checked in".to_string(),
            ));
        }

        let deadline = booking.date.and_time(booking.start_time)
            + Duration::minutes(self.grace_minutes);

        if now < deadline {
            return Err(BookingError::InvalidTransition(format!(
                "grace period runs until {deadline}"
            )));
        }

        let changed = self.store.mark_booking_no_show_if_eligible(booking_id).await?;
        if changed == 0 {
            // Raced with a check-in, cancel, or another sweep.
            warn!(booking_id, "No-show transition lost a race, skipping");
            return Ok(false);
        }

        info!(booking_id, "Booking marked as no-show");

        self.audit
            .record(
                audit::SYSTEM_ACTOR,
                audit::AUTO_NO_SHOW,
                &format!(
                    "booking {booking_id} (desk {} on {} {}-{})",
                    booking.desk_id, booking.date, booking.start_time, booking.end_time
                ),
            )
            .await;

        Ok(true)
    }
}
