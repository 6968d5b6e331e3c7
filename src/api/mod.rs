use axum::{
    Json, Router,
    extract::State,
    http::HeaderValue,
    routing::{get, post},
};
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::db::Store;
use crate::services::{
    AuditRecorder, BookingService, NoShowSweeper, QueryService, SeaOrmBookingService,
};

mod admin;
mod bookings;
mod desks;
mod error;
pub mod identity;
mod types;

pub use error::ApiError;
pub use types::*;

pub struct AppState {
    pub store: Store,

    pub bookings: Arc<dyn BookingService>,

    pub queries: QueryService,

    pub audit: AuditRecorder,

    pub sweeper: Arc<NoShowSweeper>,

    pub config: Arc<RwLock<Config>>,

    pub start_time: std::time::Instant,
}

pub async fn create_app_state(config: Config) -> anyhow::Result<Arc<AppState>> {
    let store = Store::with_pool_options(
        &config.general.database_path,
        config.general.max_db_connections,
        config.general.min_db_connections,
    )
    .await?;

    Ok(build_app_state(store, config))
}

/// Wires the service graph on top of an already-connected store. Tests use
/// this directly with a temp database.
#[must_use]
pub fn build_app_state(store: Store, config: Config) -> Arc<AppState> {
    let grace = config.booking.no_show_grace_minutes;

    let audit = AuditRecorder::new(store.clone());
    let bookings: Arc<dyn BookingService> = Arc::new(SeaOrmBookingService::new(
        store.clone(),
        audit.clone(),
        grace,
    ));
    let queries = QueryService::new(store.clone());
    let sweeper = Arc::new(NoShowSweeper::new(store.clone(), bookings.clone(), grace));

    Arc::new(AppState {
        store,
        bookings,
        queries,
        audit,
        sweeper,
        config: Arc::new(RwLock::new(config)),
        start_time: std::time::Instant::now(),
    })
}

pub async fn router(state: Arc<AppState>) -> Router {
    let cors_origins = {
        let config = state.config.read().await;
        config.server.cors_allowed_origins.clone()
    };

    let api_router = Router::new()
        .route("/health", get(health))
        .route("/desks", get(desks::list_desks))
        .route("/desks/{id}/schedule", get(desks::desk_schedule))
        .route("/desks/{id}/availability", get(desks::desk_availability))
        .route("/bookings", post(bookings::create_booking))
        .route("/bookings/mine", get(bookings::my_bookings))
        .route("/bookings/{id}/checkin", post(bookings::check_in))
        .route("/bookings/{id}/cancel", post(bookings::cancel))
        .route("/admin/bookings", get(admin::list_bookings))
        .route("/admin/compliance", get(admin::compliance))
        .route("/admin/no-shows", get(admin::no_shows))
        .route("/admin/audit", get(admin::audit_log))
        .route("/admin/desks", get(admin::list_all_desks))
        .route("/admin/desks", post(admin::create_desk))
        .route("/admin/desks/{id}/active", post(admin::toggle_desk_active))
        .route(
            "/admin/desks/{id}/admin-only",
            post(admin::toggle_desk_admin_only),
        )
        .route("/admin/users", get(admin::list_users))
        .route("/admin/users/{id}/can-book", post(admin::toggle_can_book))
        .route("/admin/sweep", post(admin::run_sweep))
        .with_state(state);

    let cors_layer = if cors_origins.contains(&"*".to_string()) {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };

    Router::new()
        .nest("/api", api_router)
        .layer(cors_layer.allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
}

async fn health(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    state.store.ping().await?;

    let uptime = state.start_time.elapsed().as_secs();
    Ok(Json(ApiResponse::success(serde_json::json!({
        "status": "ok",
        "uptime_seconds": uptime,
    }))))
}
