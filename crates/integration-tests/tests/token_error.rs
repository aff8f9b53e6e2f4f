//! A backend "Invalid token" answer signs the user out.

#![allow(clippy::unwrap_used)]

use axum::{
    Json, Router,
    http::StatusCode,
    routing::{get, post},
};
use serde_json::json;
use shipdesk_integration_tests::{browser, login, serve_backend, spawn_app, user_json};

#[tokio::test]
async fn test_invalid_token_clears_session_and_redirects() {
    let rejected = || async {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({"message": "Invalid token"})),
        )
    };
    let router = Router::new()
        .route(
            "/api/auth/login",
            post(|| async {
                Json(json!({"token": "expired", "user": user_json("u1", "Noura", "user", true)}))
            }),
        )
        .route("/api/shipment/my-shipments", get(rejected))
        .route("/api/shipment/statistics", get(rejected));
    let backend = serve_backend(router).await;
    let app = spawn_app(&backend).await;
    let client = browser();
    login(&client, &app).await;

    let response = client.get(format!("{app}/shipments")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response.headers()["location"],
        "/auth/login?error=Invalid%20token"
    );

    let login_page = client
        .get(format!("{app}/auth/login?error=Invalid%20token"))
        .send()
        .await
        .unwrap();
    assert!(login_page.text().await.unwrap().contains("Invalid token"));

    // The session is gone: protected pages bounce straight to login.
    let again = client.get(format!("{app}/shipments")).send().await.unwrap();
    assert_eq!(again.status(), StatusCode::SEE_OTHER);
    assert_eq!(again.headers()["location"], "/auth/login");
}
