mod common;

use axum::http::StatusCode;
use serde_json::json;
use sqlx::PgPool;

use classbook_models::system_roles;
use common::{
    TEST_PASSWORD, admin_token, create_test_user, generate_unique_email, get_auth_token, send,
    setup_test_app,
};

#[sqlx::test(migrations = "./migrations")]
async fn test_admin_manages_accounts(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let token = admin_token(&app, &pool).await;
    let email = generate_unique_email();

    let (status, user) = send(
        &app,
        "POST",
        "/api/users",
        Some(&token),
        Some(json!({
            "first_name": "Agus",
            "last_name": "Pratama",
            "email": email,
            "password": TEST_PASSWORD,
            "role_id": system_roles::PRINCIPAL,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{user}");
    assert_eq!(user["role"], "principal");

    let (status, _) = send(
        &app,
        "POST",
        "/api/users",
        Some(&token),
        Some(json!({
            "first_name": "Agus",
            "last_name": "Again",
            "email": email,
            "password": TEST_PASSWORD,
            "role_id": system_roles::PRINCIPAL,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let uri = format!("/api/users/{}", user["id"].as_str().unwrap());
    let (status, body) = send(&app, "PUT", &uri, Some(&token), Some(json!({ "is_active": false }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_active"], false);

    let (status, _) = send(&app, "DELETE", &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, "GET", &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_user_routes_are_admin_only(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let principal = create_test_user(&pool, system_roles::PRINCIPAL).await;
    let token = get_auth_token(&app, &principal).await;

    let (status, _) = send(&app, "GET", "/api/users", Some(&token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(&app, "GET", "/api/users", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
