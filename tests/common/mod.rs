// SPDX-License-Identifier: MIT

use axum::body::Body;
use axum::http::{header, Request, Response};
use serde_json::Value;
use std::sync::Arc;
use uuid::Uuid;
use walk_tracker::config::Config;
use walk_tracker::db::MemoryDb;
use walk_tracker::middleware::auth::create_jwt;
use walk_tracker::routes::create_router;
use walk_tracker::AppState;

/// Create a test app backed by an empty in-memory database.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    let state = Arc::new(AppState {
        config: Config::test_default(),
        db: MemoryDb::new(),
    });

    (create_router(state.clone()), state)
}

/// A signed-in test user.
#[allow(dead_code)]
pub struct TestUser {
    pub user_id: Uuid,
    pub email: Option<String>,
    pub token: String,
}

/// Create a session token for a fresh user with the given email.
#[allow(dead_code)]
pub fn test_user(state: &AppState, email: Option<&str>) -> TestUser {
    let user_id = Uuid::new_v4();
    let token = create_jwt(user_id, email, &state.config.jwt_signing_key).unwrap();
    TestUser {
        user_id,
        email: email.map(String::from),
        token,
    }
}

/// Build an authenticated JSON request.
#[allow(dead_code)]
pub fn json_request(method: &str, uri: &str, token: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Build an authenticated GET request.
#[allow(dead_code)]
pub fn get_request(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap()
}

/// Read a response body as JSON.
#[allow(dead_code)]
pub async fn body_json(response: Response<Body>) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

/// A fix as the tracker sends it on the wire.
#[allow(dead_code)]
pub fn fix_json(lat: f64, lng: f64) -> Value {
    serde_json::json!({
        "ts": "2025-06-01T14:00:00.000Z",
        "lat": lat,
        "lng": lng,
        "accuracy": 5.0
    })
}
