//! Common test utilities

#![allow(dead_code)]

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::{middleware, Router};
use serde_json::Value;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tower::util::ServiceExt;
use uuid::Uuid;

/// Setup test database - truncate tables and seed test principals.
/// Returns the pool plus a seeded admin and creator profile id.
pub async fn setup_test_db() -> (PgPool, Uuid, Uuid) {
    dotenvy::dotenv().ok();
    let database_url = std::env::var("DATABASE_URL")
        .expect("DATABASE_URL must be set for tests");

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .expect("Failed to connect to DB");

    sqlx::query("TRUNCATE TABLE withdrawals, payments, submissions, campaigns, profiles CASCADE")
        .execute(&pool)
        .await
        .expect("Failed to clean up DB");

    let admin_id = seed_profile(&pool, "admin").await;
    let creator_id = seed_profile(&pool, "creator").await;

    (pool, admin_id, creator_id)
}

/// Insert a profile row (normally owned by the identity provider).
pub async fn seed_profile(pool: &PgPool, role: &str) -> Uuid {
    let id = Uuid::new_v4();
    sqlx::query(
        r#"
        INSERT INTO profiles (id, role, first_name, last_name, email)
        VALUES ($1, $2, 'Test', $2, $1 || '@test.example')
        "#,
    )
    .bind(id)
    .bind(role)
    .execute(pool)
    .await
    .expect("Failed to seed profile");
    id
}

/// The API router wired the way main.rs wires it, minus the /api/v1 nest.
pub fn test_app(pool: PgPool) -> Router {
    sponsorpay::api::create_router()
        .layer(middleware::from_fn_with_state(
            pool.clone(),
            sponsorpay::api::middleware::principal_middleware,
        ))
        .with_state(pool)
}

/// Send a JSON request as the given principal and return status + body.
pub async fn send_json(
    app: &Router,
    method: &str,
    uri: &str,
    principal: Uuid,
    body: Value,
) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .header("X-Principal-Id", principal.to_string())
        .body(Body::from(body.to_string()))
        .unwrap();

    dispatch(app, request).await
}

/// Send a GET request as the given principal and return status + body.
pub async fn send_get(app: &Router, uri: &str, principal: Uuid) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .header("X-Principal-Id", principal.to_string())
        .body(Body::empty())
        .unwrap();

    dispatch(app, request).await
}

async fn dispatch(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, body)
}
