use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
};
use chrono::Local;

use super::identity::Identity;
use super::{ApiError, ApiResponse, AppState};
use super::types::{
    AuditEntryDto, BookingDto, CreateDeskRequest, DeskDto, SweepResultDto, ToggleRequest, UserDto,
};
use crate::db::{ComplianceRow, NoShowRow};
use crate::domain::Actor;
use crate::services::audit;

fn require_admin(actor: &Actor) -> Result<(), ApiError> {
    if actor.is_admin() {
        Ok(())
    } else {
        Err(ApiError::forbidden("Admin access required"))
    }
}

pub async fn list_bookings(
    State(state): State<Arc<AppState>>,
    Identity(actor): Identity,
) -> Result<Json<ApiResponse<Vec<BookingDto>>>, ApiError> {
    require_admin(&actor)?;
    let rows = state.queries.all_bookings().await?;
    let dtos = rows.into_iter().map(BookingDto::from).collect();
    Ok(Json(ApiResponse::success(dtos)))
}

pub async fn compliance(
    State(state): State<Arc<AppState>>,
    Identity(actor): Identity,
) -> Result<Json<ApiResponse<Vec<ComplianceRow>>>, ApiError> {
    require_admin(&actor)?;
    let rows = state.queries.compliance().await?;
    Ok(Json(ApiResponse::success(rows)))
}

pub async fn no_shows(
    State(state): State<Arc<AppState>>,
    Identity(actor): Identity,
) -> Result<Json<ApiResponse<Vec<NoShowRow>>>, ApiError> {
    require_admin(&actor)?;
    let rows = state.queries.no_show_report().await?;
    Ok(Json(ApiResponse::success(rows)))
}

pub async fn audit_log(
    State(state): State<Arc<AppState>>,
    Identity(actor): Identity,
) -> Result<Json<ApiResponse<Vec<AuditEntryDto>>>, ApiError> {
    require_admin(&actor)?;
    let limit = state.config.read().await.booking.audit_page_size;
    let rows = state.audit.recent(limit).await?;
    let dtos = rows.into_iter().map(AuditEntryDto::from).collect();
    Ok(Json(ApiResponse::success(dtos)))
}

pub async fn list_all_desks(
    State(state): State<Arc<AppState>>,
    Identity(actor): Identity,
) -> Result<Json<ApiResponse<Vec<DeskDto>>>, ApiError> {
    require_admin(&actor)?;
    let desks = state.store.list_all_desks().await?;
    let dtos = desks.into_iter().map(DeskDto::from).collect();
    Ok(Json(ApiResponse::success(dtos)))
}

pub async fn create_desk(
    State(state): State<Arc<AppState>>,
    Identity(actor): Identity,
    Json(req): Json<CreateDeskRequest>,
) -> Result<Json<ApiResponse<DeskDto>>, ApiError> {
    require_admin(&actor)?;

    let name = req.name.trim();
    if name.is_empty() {
        return Err(ApiError::validation("Desk name cannot be empty"));
    }

    let desk = state
        .store
        .add_desk(name, req.location.as_deref(), req.admin_only)
        .await?;

    state
        .audit
        .record(
            &actor.email,
            audit::CREATE_DESK,
            &format!("desk '{}' (id {})", desk.name, desk.id),
        )
        .await;

    Ok(Json(ApiResponse::success(DeskDto::from(desk))))
}

pub async fn toggle_desk_active(
    State(state): State<Arc<AppState>>,
    Identity(actor): Identity,
    Path(desk_id): Path<i32>,
    Json(req): Json<ToggleRequest>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    require_admin(&actor)?;

    let changed = state.store.set_desk_active(desk_id, req.enabled).await?;
    if !changed {
        return Err(ApiError::not_found("Desk", desk_id));
    }

    state
        .audit
        .record(
            &actor.email,
            audit::TOGGLE_DESK_ACTIVE,
            &format!("desk {desk_id} -> {}", req.enabled),
        )
        .await;

    Ok(Json(ApiResponse::success(())))
}

pub async fn toggle_desk_admin_only(
    State(state): State<Arc<AppState>>,
    Identity(actor): Identity,
    Path(desk_id): Path<i32>,
    Json(req): Json<ToggleRequest>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    require_admin(&actor)?;

    let changed = state.store.set_desk_admin_only(desk_id, req.enabled).await?;
    if !changed {
        return Err(ApiError::not_found("Desk", desk_id));
    }

    state
        .audit
        .record(
            &actor.email,
            audit::TOGGLE_DESK_ADMIN_ONLY,
            &format!("desk {desk_id} -> {}", req.enabled),
        )
        .await;

    Ok(Json(ApiResponse::success(())))
}

pub async fn list_users(
    State(state): State<Arc<AppState>>,
    Identity(actor): Identity,
) -> Result<Json<ApiResponse<Vec<UserDto>>>, ApiError> {
    require_admin(&actor)?;
    let users = state.store.list_all_users().await?;
    let dtos = users.into_iter().map(UserDto::from).collect();
    Ok(Json(ApiResponse::success(dtos)))
}

pub async fn toggle_can_book(
    State(state): State<Arc<AppState>>,
    Identity(actor): Identity,
    Path(user_id): Path<i32>,
    Json(req): Json<ToggleRequest>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    require_admin(&actor)?;

    let changed = state.store.set_user_can_book(user_id, req.enabled).await?;
    if !changed {
        return Err(ApiError::not_found("User", user_id));
    }

    state
        .audit
        .record(
            &actor.email,
            audit::TOGGLE_CAN_BOOK,
            &format!("user {user_id} -> {}", req.enabled),
        )
        .await;

    Ok(Json(ApiResponse::success(())))
}

/// Runs one no-show sweep immediately, outside the scheduler cadence.
pub async fn run_sweep(
    State(state): State<Arc<AppState>>,
    Identity(actor): Identity,
) -> Result<Json<ApiResponse<SweepResultDto>>, ApiError> {
    require_admin(&actor)?;

    let transitioned = state.sweeper.sweep(Local::now().naive_local()).await?;
    Ok(Json(ApiResponse::success(SweepResultDto { transitioned })))
}
