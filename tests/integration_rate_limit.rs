mod common;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::json;
use sqlx::PgPool;
use tower::ServiceExt;

use classbook::router::init_router;
use classbook_config::RateLimitConfig;
use common::test_state;

fn throttled_app(pool: PgPool) -> Router {
    let config = RateLimitConfig {
        enabled: true,
        auth_per_second: 60,
        auth_burst_size: 1,
    };
    init_router(test_state(pool, config)).unwrap()
}

async fn login_from(app: &Router, ip: &str) -> StatusCode {
    let request = Request::builder()
        .method("POST")
        .uri("/api/auth/login")
        .header("content-type", "application/json")
        .header("x-forwarded-for", ip)
        .body(Body::from(
            json!({ "email": "nobody@school.test", "password": "whatever" }).to_string(),
        ))
        .unwrap();

    app.clone().oneshot(request).await.unwrap().status()
}

#[sqlx::test(migrations = "./migrations")]
async fn test_login_is_throttled_per_ip(pool: PgPool) {
    let app = throttled_app(pool);

    assert_eq!(login_from(&app, "203.0.113.7").await, StatusCode::UNAUTHORIZED);
    assert_eq!(login_from(&app, "203.0.113.7").await, StatusCode::TOO_MANY_REQUESTS);

    // another client has its own bucket
    assert_eq!(login_from(&app, "198.51.100.23").await, StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_authenticated_routes_are_not_throttled(pool: PgPool) {
    let app = throttled_app(pool);

    for _ in 0..3 {
        let request = Request::builder()
            .uri("/api/auth/me")
            .header("x-forwarded-for", "203.0.113.7")
            .body(Body::empty())
            .unwrap();
        let status = app.clone().oneshot(request).await.unwrap().status();
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}

#[sqlx::test(migrations = "./migrations")]
async fn test_health_check(pool: PgPool) {
    let app = common::setup_test_app(pool);

    let (status, body) = common::send(&app, "GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}
