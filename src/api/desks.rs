use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
};

use super::identity::Identity;
use super::{ApiError, ApiResponse, AppState};
use super::types::{AvailabilityDto, AvailabilityQuery, BookingDto, DeskDto, ScheduleQuery};
use crate::domain::TimeSlot;

/// Lists desks the caller may book. Admin-only desks stay hidden from
/// regular users.
pub async fn list_desks(
    State(state): State<Arc<AppState>>,
    Identity(actor): Identity,
) -> Result<Json<ApiResponse<Vec<DeskDto>>>, ApiError> {
    let desks = state.store.list_bookable_desks(actor.is_admin()).await?;
    let dtos = desks.into_iter().map(DeskDto::from).collect();
    Ok(Json(ApiResponse::success(dtos)))
}

/// Full schedule for one desk on one day, every status included.
pub async fn desk_schedule(
    State(state): State<Arc<AppState>>,
    Identity(_actor): Identity,
    Path(desk_id): Path<i32>,
    Query(query): Query<ScheduleQuery>,
) -> Result<Json<ApiResponse<Vec<BookingDto>>>, ApiError> {
    let rows = state.queries.desk_schedule(desk_id, query.date).await?;
    let dtos = rows.into_iter().map(BookingDto::from).collect();
    Ok(Json(ApiResponse::success(dtos)))
}

/// Checks whether a desk is free for a whole interval on a date.
pub async fn desk_availability(
    State(state): State<Arc<AppState>>,
    Identity(_actor): Identity,
    Path(desk_id): Path<i32>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<ApiResponse<AvailabilityDto>>, ApiError> {
    let slot = TimeSlot::new(query.start_time, query.end_time)?;
    let today = chrono::Local::now().date_naive();
    let available = state
        .bookings
        .is_available(desk_id, query.date, slot, today)
        .await?;
    Ok(Json(ApiResponse::success(AvailabilityDto { available })))
}
