//! Smoke tests for the HTTP surface: identity resolution, booking flows,
//! and the admin endpoints.

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use chrono::{Days, Local};
use deskarr::api::AppState;
use deskarr::config::Config;
use deskarr::db::Store;
use http_body_util::BodyExt;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, sea_query::Expr};
use std::sync::Arc;
use tower::ServiceExt;

async fn spawn_app() -> (Arc<AppState>, Router) {
    let db_path =
        std::env::temp_dir().join(format!("deskarr-api-test-{}.db", uuid::Uuid::new_v4()));

    let mut config = Config::default();
    config.general.database_path = format!("sqlite:{}", db_path.display());

    let store = Store::with_pool_options(&config.general.database_path, 5, 1)
        .await
        .expect("failed to open test store");

    let state = deskarr::api::build_app_state(store, config);
    let router = deskarr::api::router(state.clone()).await;
    (state, router)
}

async fn promote_to_admin(state: &AppState, email: &str) {
    use deskarr::entities::{prelude::Users, users};

    state
        .store
        .ensure_user(email, "Admin")
        .await
        .expect("provision admin");

    Users::update_many()
        .col_expr(users::Column::Role, Expr::value("admin"))
        .filter(users::Column::Email.eq(email))
        .exec(&state.store.conn)
        .await
        .expect("promote admin");
}

fn get(uri: &str, email: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header("X-User-Email", email)
        .body(Body::empty())
        .unwrap()
}

fn post_json(uri: &str, email: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("X-User-Email", email)
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn tomorrow() -> String {
    Local::now()
        .date_naive()
        .checked_add_days(Days::new(1))
        .unwrap()
        .to_string()
}

#[tokio::test]
async fn requests_without_identity_are_rejected() {
    let (_, app) = spawn_app().await;

    let response = app
        .oneshot(Request::builder().uri("/api/desks").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn first_request_provisions_the_user_and_lists_seed_desks() {
    let (_, app) = spawn_app().await;

    let response = app
        .oneshot(get("/api/desks", "alice@example.com"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["success"], serde_json::json!(true));
    assert_eq!(body["data"].as_array().map(Vec::len), Some(3));
}

#[tokio::test]
async fn booking_flow_create_conflict_and_schedule() {
    let (_, app) = spawn_app().await;
    let date = tomorrow();

    let create = serde_json::json!({
        "desk_id": 1,
        "date": date,
        "start_time": "09:00:00",
        "end_time": "12:00:00",
    });

    let response = app
        .clone()
        .oneshot(post_json("/api/bookings", "alice@example.com", create.clone()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["data"]["status"], serde_json::json!("booked"));
    assert_eq!(body["data"]["checked_in"], serde_json::json!(false));

    // An overlapping request from another user conflicts.
    let overlap = serde_json::json!({
        "desk_id": 1,
        "date": date,
        "start_time": "10:00:00",
        "end_time": "11:00:00",
    });
    let response = app
        .clone()
        .oneshot(post_json("/api/bookings", "bob@example.com", overlap))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // The desk-day schedule shows the surviving booking.
    let response = app
        .clone()
        .oneshot(get(
            &format!("/api/desks/1/schedule?date={date}"),
            "bob@example.com",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["data"].as_array().map(Vec::len), Some(1));

    // And availability says the overlapping window is taken.
    let response = app
        .clone()
        .oneshot(get(
            &format!(
                "/api/desks/1/availability?date={date}&start_time=11:00:00&end_time=13:00:00"
            ),
            "bob@example.com",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["data"]["available"], serde_json::json!(false));
}

#[tokio::test]
async fn invalid_intervals_are_rejected_up_front() {
    let (_, app) = spawn_app().await;

    let inverted = serde_json::json!({
        "desk_id": 1,
        "date": tomorrow(),
        "start_time": "12:00:00",
        "end_time": "09:00:00",
    });

    let response = app
        .oneshot(post_json("/api/bookings", "alice@example.com", inverted))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn cancel_flow_returns_ok_and_frees_my_upcoming_list() {
    let (_, app) = spawn_app().await;
    let date = tomorrow();

    let create = serde_json::json!({
        "desk_id": 2,
        "date": date,
        "start_time": "09:00:00",
        "end_time": "10:00:00",
    });
    let response = app
        .clone()
        .oneshot(post_json("/api/bookings", "alice@example.com", create))
        .await
        .unwrap();
    let body = json_body(response).await;
    let booking_id = body["data"]["id"].as_i64().unwrap();

    let response = app
        .clone()
        .oneshot(post_json(
            &format!("/api/bookings/{booking_id}/cancel"),
            "alice@example.com",
            serde_json::json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Cancelling again hits the terminal-state guard.
    let response = app
        .clone()
        .oneshot(post_json(
            &format!("/api/bookings/{booking_id}/cancel"),
            "alice@example.com",
            serde_json::json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = app
        .clone()
        .oneshot(get("/api/bookings/mine", "alice@example.com"))
        .await
        .unwrap();
    let body = json_body(response).await;
    assert_eq!(body["data"]["upcoming"].as_array().map(Vec::len), Some(0));
    assert_eq!(body["data"]["past"].as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn admin_endpoints_require_the_admin_role() {
    let (state, app) = spawn_app().await;

    let response = app
        .clone()
        .oneshot(get("/api/admin/bookings", "alice@example.com"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    promote_to_admin(&state, "boss@example.com").await;

    let response = app
        .clone()
        .oneshot(get("/api/admin/bookings", "boss@example.com"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(get("/api/admin/compliance", "boss@example.com"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/admin/sweep",
            "boss@example.com",
            serde_json::json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["data"]["transitioned"], serde_json::json!(0));
}

#[tokio::test]
async fn admin_desk_management_and_audit_trail() {
    let (state, app) = spawn_app().await;
    promote_to_admin(&state, "boss@example.com").await;

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/admin/desks",
            "boss@example.com",
            serde_json::json!({"name": "Desk 4", "location": "Annex", "admin_only": true}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    let desk_id = body["data"]["id"].as_i64().unwrap();
    assert_eq!(body["data"]["admin_only"], serde_json::json!(true));

    // Hidden from regular users, visible to the admin.
    let response = app
        .clone()
        .oneshot(get("/api/desks", "alice@example.com"))
        .await
        .unwrap();
    let body = json_body(response).await;
    assert_eq!(body["data"].as_array().map(Vec::len), Some(3));

    let response = app
        .clone()
        .oneshot(get("/api/desks", "boss@example.com"))
        .await
        .unwrap();
    let body = json_body(response).await;
    assert_eq!(body["data"].as_array().map(Vec::len), Some(4));

    // Retire it and confirm everyone loses it.
    let response = app
        .clone()
        .oneshot(post_json(
            &format!("/api/admin/desks/{desk_id}/active"),
            "boss@example.com",
            serde_json::json!({"enabled": false}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(get("/api/desks", "boss@example.com"))
        .await
        .unwrap();
    let body = json_body(response).await;
    assert_eq!(body["data"].as_array().map(Vec::len), Some(3));

    let response = app
        .clone()
        .oneshot(get("/api/admin/audit", "boss@example.com"))
        .await
        .unwrap();
    let body = json_body(response).await;
    let actions: Vec<String> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["action"].as_str().unwrap().to_string())
        .collect();

    assert!(actions.contains(&"CREATE_DESK".to_string()));
    assert!(actions.contains(&"TOGGLE_DESK_ACTIVE".to_string()));
}

#[tokio::test]
async fn suspended_users_cannot_book() {
    let (state, app) = spawn_app().await;
    promote_to_admin(&state, "boss@example.com").await;

    let user = state
        .store
        .ensure_user("mallory@example.com", "Mallory")
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(post_json(
            &format!("/api/admin/users/{}/can-book", user.id),
            "boss@example.com",
            serde_json::json!({"enabled": false}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/bookings",
            "mallory@example.com",
            serde_json::json!({
                "desk_id": 1,
                "date": tomorrow(),
                "start_time": "09:00:00",
                "end_time": "10:00:00",
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn health_endpoint_reports_ok() {
    let (_, app) = spawn_app().await;

    let response = app
        .oneshot(Request::builder().uri("/api/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["data"]["status"], serde_json::json!("ok"));
}
