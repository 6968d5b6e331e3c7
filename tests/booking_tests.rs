//! Lifecycle tests for the booking engine: conflict detection, check-in
//! windows, and the no-show sweep.

use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use deskarr::api::{AppState, build_app_state};
use deskarr::config::Config;
use deskarr::db::Store;
use deskarr::domain::{Actor, Role, TimeSlot};
use deskarr::entities::bookings::BookingStatus;
use deskarr::services::BookingError;

const DESK: i32 = 1;

async fn spawn_state() -> Arc<AppState> {
    let db_path = std::env::temp_dir().join(format!("deskarr-test-{}.db", uuid::Uuid::new_v4()));

    let mut config = Config::default();
    config.general.database_path = format!("sqlite:{}", db_path.display());

    let store = Store::with_pool_options(&config.general.database_path, 5, 1)
        .await
        .expect("failed to open test store");

    build_app_state(store, config)
}

async fn user(state: &AppState, email: &str) -> Actor {
    let row = state
        .store
        .ensure_user(email, "Test User")
        .await
        .expect("provision user");
    Actor::new(row.id, row.email, Role::User, true)
}

async fn admin(state: &AppState, email: &str) -> Actor {
    let row = state
        .store
        .ensure_user(email, "Test Admin")
        .await
        .expect("provision admin");
    Actor::new(row.id, row.email, Role::Admin, true)
}

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 9, 10).unwrap()
}

fn at(hour: u32, min: u32) -> NaiveDateTime {
    date().and_time(NaiveTime::from_hms_opt(hour, min, 0).unwrap())
}

fn slot(start: (u32, u32), end: (u32, u32)) -> TimeSlot {
    TimeSlot::new(
        NaiveTime::from_hms_opt(start.0, start.1, 0).unwrap(),
        NaiveTime::from_hms_opt(end.0, end.1, 0).unwrap(),
    )
    .unwrap()
}

#[tokio::test]
async fn overlapping_bookings_are_rejected_but_touching_ones_are_not() {
    let state = spawn_state().await;
    let alice = user(&state, "alice@example.com").await;
    let bob = user(&state, "bob@example.com").await;

    state
        .bookings
        .create(&alice, DESK, date(), slot((9, 0), (12, 0)), at(8, 0))
        .await
        .expect("first booking");

    // Contained interval conflicts.
    let err = state
        .bookings
        .create(&bob, DESK, date(), slot((10, 0), (11, 0)), at(8, 0))
        .await
        .unwrap_err();
    assert!(matches!(err, BookingError::SlotConflict));

    // Straddling the end conflicts too.
    let err = state
        .bookings
        .create(&bob, DESK, date(), slot((11, 30), (13, 0)), at(8, 0))
        .await
        .unwrap_err();
    assert!(matches!(err, BookingError::SlotConflict));

    // Back-to-back is fine: [9,12) and [12,13) share no minute.
    state
        .bookings
        .create(&bob, DESK, date(), slot((12, 0), (13, 0)), at(8, 0))
        .await
        .expect("touching booking");

    // A different desk is unaffected.
    state
        .bookings
        .create(&bob, 2, date(), slot((9, 0), (12, 0)), at(8, 0))
        .await
        .expect("other desk");
}

#[tokio::test]
async fn concurrent_creates_for_one_slot_admit_exactly_one() {
    let state = spawn_state().await;

    let mut handles = Vec::new();
    for i in 0..8 {
        let actor = user(&state, &format!("racer{i}@example.com")).await;
        let bookings = state.bookings.clone();
        handles.push(tokio::spawn(async move {
            bookings
                .create(&actor, DESK, date(), slot((9, 0), (10, 0)), at(8, 0))
                .await
        }));
    }

    let results = futures::future::join_all(handles).await;

    let mut won = 0;
    let mut conflicts = 0;
    for result in results {
        match result.expect("task panicked") {
            Ok(_) => won += 1,
            Err(BookingError::SlotConflict) => conflicts += 1,
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    assert_eq!(won, 1);
    assert_eq!(conflicts, 7);
}

#[tokio::test]
async fn cancelling_frees_the_slot_for_rebooking() {
    let state = spawn_state().await;
    let alice = user(&state, "alice@example.com").await;
    let bob = user(&state, "bob@example.com").await;

    let booking = state
        .bookings
        .create(&alice, DESK, date(), slot((9, 0), (17, 0)), at(8, 0))
        .await
        .unwrap();

    state.bookings.cancel(&alice, booking.id).await.unwrap();

    state
        .bookings
        .create(&bob, DESK, date(), slot((9, 0), (17, 0)), at(8, 0))
        .await
        .expect("slot should be free after cancel");
}

#[tokio::test]
async fn terminal_bookings_admit_no_further_transitions() {
    let state = spawn_state().await;
    let alice = user(&state, "alice@example.com").await;

    let booking = state
        .bookings
        .create(&alice, DESK, date(), slot((9, 0), (10, 0)), at(8, 0))
        .await
        .unwrap();

    state.bookings.cancel(&alice, booking.id).await.unwrap();

    let err = state.bookings.cancel(&alice, booking.id).await.unwrap_err();
    assert!(matches!(err, BookingError::InvalidTransition(_)));

    let err = state
        .bookings
        .check_in(&alice, booking.id, at(9, 5))
        .await
        .unwrap_err();
    assert!(matches!(err, BookingError::InvalidTransition(_)));

    let err = state
        .bookings
        .mark_no_show(booking.id, at(11, 0))
        .await
        .unwrap_err();
    assert!(matches!(err, BookingError::InvalidTransition(_)));
}

#[tokio::test]
async fn cancelling_a_checked_in_booking_still_closes_it_to_check_in() {
    let state = spawn_state().await;
    let alice = user(&state, "alice@example.com").await;

    let booking = state
        .bookings
        .create(&alice, DESK, date(), slot((9, 0), (10, 0)), at(8, 0))
        .await
        .unwrap();

    state
        .bookings
        .check_in(&alice, booking.id, at(9, 5))
        .await
        .unwrap();
    state.bookings.cancel(&alice, booking.id).await.unwrap();

    // The terminal state wins over the repeat-check-in no-op.
    let err = state
        .bookings
        .check_in(&alice, booking.id, at(9, 30))
        .await
        .unwrap_err();
    assert!(matches!(err, BookingError::InvalidTransition(_)));
}

#[tokio::test]
async fn concurrent_first_requests_provision_one_account() {
    let state = spawn_state().await;

    let mut handles = Vec::new();
    for _ in 0..8 {
        let store = state.store.clone();
        handles.push(tokio::spawn(async move {
            store.ensure_user("newcomer@example.com", "Newcomer").await
        }));
    }

    let results = futures::future::join_all(handles).await;

    let mut ids = Vec::new();
    for result in results {
        let row = result.expect("task panicked").expect("provisioning failed");
        ids.push(row.id);
    }

    ids.dedup();
    assert_eq!(ids.len(), 1);
}

#[tokio::test]
async fn past_dates_are_rejected_but_today_is_allowed() {
    let state = spawn_state().await;
    let alice = user(&state, "alice@example.com").await;

    let yesterday = date().pred_opt().unwrap();
    let err = state
        .bookings
        .create(&alice, DESK, yesterday, slot((9, 0), (10, 0)), at(8, 0))
        .await
        .unwrap_err();
    assert!(matches!(err, BookingError::DateInPast(_)));

    state
        .bookings
        .create(&alice, DESK, date(), slot((9, 0), (10, 0)), at(8, 0))
        .await
        .expect("same-day booking");
}

#[tokio::test]
async fn check_in_window_is_inclusive_at_both_ends() {
    let state = spawn_state().await;
    let alice = user(&state, "alice@example.com").await;

    let booking = state
        .bookings
        .create(&alice, DESK, date(), slot((9, 0), (10, 0)), at(8, 0))
        .await
        .unwrap();

    let err = state
        .bookings
        .check_in(&alice, booking.id, at(8, 59))
        .await
        .unwrap_err();
    assert!(matches!(err, BookingError::OutsideCheckInWindow { .. }));

    // Exactly at the end time still counts.
    state
        .bookings
        .check_in(&alice, booking.id, at(10, 0))
        .await
        .expect("check-in at end boundary");

    // Repeating is a no-op, even outside the window.
    state
        .bookings
        .check_in(&alice, booking.id, at(10, 30))
        .await
        .expect("repeated check-in");

    let row = state.store.get_booking(booking.id).await.unwrap().unwrap();
    assert!(row.checked_in);
    assert_eq!(row.status, BookingStatus::Booked);
}

#[tokio::test]
async fn check_in_after_the_window_is_rejected() {
    let state = spawn_state().await;
    let alice = user(&state, "alice@example.com").await;

    let booking = state
        .bookings
        .create(&alice, DESK, date(), slot((9, 0), (10, 0)), at(8, 0))
        .await
        .unwrap();

    let err = state
        .bookings
        .check_in(&alice, booking.id, at(10, 1))
        .await
        .unwrap_err();
    assert!(matches!(err, BookingError::OutsideCheckInWindow { .. }));
}

#[tokio::test]
async fn only_the_owner_or_an_admin_may_cancel() {
    let state = spawn_state().await;
    let alice = user(&state, "alice@example.com").await;
    let bob = user(&state, "bob@example.com").await;
    let boss = admin(&state, "boss@example.com").await;

    let booking = state
        .bookings
        .create(&alice, DESK, date(), slot((9, 0), (10, 0)), at(8, 0))
        .await
        .unwrap();

    let err = state.bookings.cancel(&bob, booking.id).await.unwrap_err();
    assert!(matches!(err, BookingError::BookingNotPermitted(_)));

    state
        .bookings
        .cancel(&boss, booking.id)
        .await
        .expect("admin cancel");
}

#[tokio::test]
async fn suspended_users_and_retired_desks_cannot_be_booked() {
    let state = spawn_state().await;
    let alice = user(&state, "alice@example.com").await;

    let suspended = Actor::new(alice.user_id, alice.email.clone(), Role::User, false);
    let err = state
        .bookings
        .create(&suspended, DESK, date(), slot((9, 0), (10, 0)), at(8, 0))
        .await
        .unwrap_err();
    assert!(matches!(err, BookingError::BookingNotPermitted(_)));

    state.store.set_desk_active(2, false).await.unwrap();
    let err = state
        .bookings
        .create(&alice, 2, date(), slot((9, 0), (10, 0)), at(8, 0))
        .await
        .unwrap_err();
    assert!(matches!(err, BookingError::DeskInactive(2)));

    let err = state
        .bookings
        .create(&alice, 999, date(), slot((9, 0), (10, 0)), at(8, 0))
        .await
        .unwrap_err();
    assert!(matches!(err, BookingError::UnknownDesk(999)));
}

#[tokio::test]
async fn admin_only_desks_are_off_limits_to_regular_users() {
    let state = spawn_state().await;
    let alice = user(&state, "alice@example.com").await;
    let boss = admin(&state, "boss@example.com").await;

    state.store.set_desk_admin_only(3, true).await.unwrap();

    let err = state
        .bookings
        .create(&alice, 3, date(), slot((9, 0), (10, 0)), at(8, 0))
        .await
        .unwrap_err();
    assert!(matches!(err, BookingError::BookingNotPermitted(_)));

    state
        .bookings
        .create(&boss, 3, date(), slot((9, 0), (10, 0)), at(8, 0))
        .await
        .expect("admin booking on admin-only desk");
}

#[tokio::test]
async fn sweep_transitions_exactly_at_the_grace_boundary() {
    let state = spawn_state().await;
    let alice = user(&state, "alice@example.com").await;

    // Grace defaults to 30 minutes; booking starts at 09:00.
    let booking = state
        .bookings
        .create(&alice, DESK, date(), slot((9, 0), (17, 0)), at(8, 0))
        .await
        .unwrap();

    // One minute before the boundary nothing happens.
    let swept = state.sweeper.sweep(at(9, 29)).await.unwrap();
    assert_eq!(swept, 0);
    let row = state.store.get_booking(booking.id).await.unwrap().unwrap();
    assert_eq!(row.status, BookingStatus::Booked);

    // At start + grace the booking is overdue.
    let swept = state.sweeper.sweep(at(9, 30)).await.unwrap();
    assert_eq!(swept, 1);
    let row = state.store.get_booking(booking.id).await.unwrap().unwrap();
    assert_eq!(row.status, BookingStatus::NoShow);
    assert!(!row.checked_in);

    // Re-running the sweep finds nothing more to do.
    let swept = state.sweeper.sweep(at(9, 30)).await.unwrap();
    assert_eq!(swept, 0);
}

#[tokio::test]
async fn checked_in_bookings_survive_the_sweep() {
    let state = spawn_state().await;
    let alice = user(&state, "alice@example.com").await;

    let booking = state
        .bookings
        .create(&alice, DESK, date(), slot((9, 0), (17, 0)), at(8, 0))
        .await
        .unwrap();

    state
        .bookings
        .check_in(&alice, booking.id, at(9, 10))
        .await
        .unwrap();

    let swept = state.sweeper.sweep(at(12, 0)).await.unwrap();
    assert_eq!(swept, 0);

    let row = state.store.get_booking(booking.id).await.unwrap().unwrap();
    assert_eq!(row.status, BookingStatus::Booked);
    assert!(row.checked_in);
}

#[tokio::test]
async fn sweep_handles_overdue_bookings_from_earlier_days() {
    let state = spawn_state().await;
    let alice = user(&state, "alice@example.com").await;

    state
        .bookings
        .create(&alice, DESK, date(), slot((9, 0), (10, 0)), at(8, 0))
        .await
        .unwrap();

    // The day after, well past everything.
    let next_day = date().succ_opt().unwrap().and_time(NaiveTime::MIN);
    let swept = state.sweeper.sweep(next_day).await.unwrap();
    assert_eq!(swept, 1);
}

#[tokio::test]
async fn no_show_frees_the_slot_for_rebooking() {
    let state = spawn_state().await;
    let alice = user(&state, "alice@example.com").await;
    let bob = user(&state, "bob@example.com").await;

    state
        .bookings
        .create(&alice, DESK, date(), slot((9, 0), (10, 0)), at(8, 0))
        .await
        .unwrap();

    let swept = state.sweeper.sweep(at(9, 45)).await.unwrap();
    assert_eq!(swept, 1);

    state
        .bookings
        .create(&bob, DESK, date(), slot((9, 0), (10, 0)), at(9, 45))
        .await
        .expect("slot freed by no-show");
}

#[tokio::test]
async fn availability_reflects_live_bookings_only() {
    let state = spawn_state().await;
    let alice = user(&state, "alice@example.com").await;

    assert!(
        state
            .bookings
            .is_available(DESK, date(), slot((9, 0), (10, 0)), date())
            .await
            .unwrap()
    );

    let booking = state
        .bookings
        .create(&alice, DESK, date(), slot((9, 0), (10, 0)), at(8, 0))
        .await
        .unwrap();

    assert!(
        !state
            .bookings
            .is_available(DESK, date(), slot((9, 30), (10, 30)), date())
            .await
            .unwrap()
    );
    assert!(
        state
            .bookings
            .is_available(DESK, date(), slot((10, 0), (11, 0)), date())
            .await
            .unwrap()
    );

    state.bookings.cancel(&alice, booking.id).await.unwrap();

    assert!(
        state
            .bookings
            .is_available(DESK, date(), slot((9, 0), (10, 0)), date())
            .await
            .unwrap()
    );

    // A retired desk and a past date are caller errors, not "unavailable".
    state.store.set_desk_active(2, false).await.unwrap();
    let err = state
        .bookings
        .is_available(2, date(), slot((9, 0), (10, 0)), date())
        .await
        .unwrap_err();
    assert!(matches!(err, BookingError::DeskInactive(2)));

    let err = state
        .bookings
        .is_available(DESK, date().pred_opt().unwrap(), slot((9, 0), (10, 0)), date())
        .await
        .unwrap_err();
    assert!(matches!(err, BookingError::DateInPast(_)));
}

#[tokio::test]
async fn audit_trail_records_the_full_lifecycle() {
    let state = spawn_state().await;
    let alice = user(&state, "alice@example.com").await;

    let booking = state
        .bookings
        .create(&alice, DESK, date(), slot((9, 0), (10, 0)), at(8, 0))
        .await
        .unwrap();
    state
        .bookings
        .check_in(&alice, booking.id, at(9, 5))
        .await
        .unwrap();

    let second = state
        .bookings
        .create(&alice, DESK, date(), slot((10, 0), (11, 0)), at(8, 0))
        .await
        .unwrap();
    state.bookings.cancel(&alice, second.id).await.unwrap();

    let entries = state.store.recent_audit(50).await.unwrap();
    let actions: Vec<&str> = entries.iter().map(|e| e.action.as_str()).collect();

    assert!(actions.contains(&"BOOKING_CREATED"));
    assert!(actions.contains(&"CHECK_IN"));
    assert!(actions.contains(&"BOOKING_CANCELLED"));
}
