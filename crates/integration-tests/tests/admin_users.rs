//! Admin users table: toggling the active flag.

#![allow(clippy::unwrap_used)]

use axum::{
    Json, Router,
    http::{Method, StatusCode},
    routing::{get, put},
};
use serde_json::json;
use shipdesk_integration_tests::{browser, login, serve_backend, spawn_app, user_json};

const USERS: &str = "/api/admin/users";

fn admin_backend() -> Router {
    Router::new()
        .route(
            "/api/auth/login",
            axum::routing::post(|| async {
                Json(json!({"token": "tok-admin", "user": user_json("u1", "Admin", "admin", true)}))
            }),
        )
        .route(
            USERS,
            get(|| async {
                Json(json!({
                    "data": [user_json("u2", "Salem", "user", true)],
                    "pagination": {"currentPage": 1, "totalPages": 1, "totalItems": 1}
                }))
            }),
        )
        .route(
            "/api/admin/users/{id}/status",
            put(|| async { Json(json!({"message": "updated"})) }),
        )
}

#[tokio::test]
async fn test_toggle_sends_opposite_flag_and_refetches_once() {
    let backend = serve_backend(admin_backend()).await;
    let app = spawn_app(&backend).await;
    let client = browser();

    assert_eq!(login(&client, &app).await, "/admin");
    let list = client.get(format!("{app}/admin/users")).send().await.unwrap();
    assert_eq!(list.status(), StatusCode::OK);
    assert!(list.text().await.unwrap().contains("Salem"));
    assert_eq!(backend.recorder.count(&Method::GET, USERS), 1);

    let toggled = client
        .post(format!("{app}/admin/users/u2/active"))
        .form(&[("active", "true"), ("back", "?page=1")])
        .send()
        .await
        .unwrap();
    assert_eq!(toggled.status(), StatusCode::SEE_OTHER);
    assert_eq!(toggled.headers()["location"], "/admin/users?page=1");
    assert_eq!(
        backend.recorder.bodies(&Method::PUT, "/api/admin/users/u2/status"),
        vec![json!({"active": false})]
    );

    let after = client
        .get(format!("{app}/admin/users?page=1"))
        .send()
        .await
        .unwrap();
    assert!(after.text().await.unwrap().contains("تم إيقاف المستخدم"));
    client.get(format!("{app}/admin/users")).send().await.unwrap();
    assert_eq!(backend.recorder.count(&Method::GET, USERS), 2);
}

#[tokio::test]
async fn test_customer_cannot_open_admin_pages() {
    let backend = serve_backend(shipdesk_integration_tests::customer_backend()).await;
    let app = spawn_app(&backend).await;
    let client = browser();
    login(&client, &app).await;

    let response = client.get(format!("{app}/admin/users")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(backend.recorder.count(&Method::GET, USERS), 0);
}
