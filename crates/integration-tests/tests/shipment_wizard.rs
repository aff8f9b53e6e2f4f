//! Shipment wizard: submission, success redirect and failure handling.

#![allow(clippy::unwrap_used)]

use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use axum::{
    Json,
    http::{Method, StatusCode},
    routing::{get, post},
};
use reqwest::Client;
use serde_json::json;
use shipdesk_integration_tests::{
    browser, customer_backend, customer_backend_with_parcels, login, serve_backend, spawn_app,
};

const LIST: &str = "/api/shipment/my-shipments";
const CREATE: &str = "/api/shipment/createshipment";

async fn step(client: &Client, app: &str, fields: &[(&str, &str)]) -> reqwest::Response {
    client
        .post(format!("{app}/shipments/new"))
        .form(fields)
        .send()
        .await
        .unwrap()
}

/// Fill the first two steps and land on the carrier step.
async fn walk_to_carrier(client: &Client, app: &str) {
    let parties = step(
        client,
        app,
        &[
            ("sender_address_id", "a1"),
            ("receiver_name", "Huda"),
            ("receiver_phone", "0500000002"),
            ("receiver_city", "Dammam"),
            ("receiver_address", "Street 4"),
            ("action", "next"),
        ],
    )
    .await;
    assert_eq!(parties.status(), StatusCode::OK);

    let package = step(
        client,
        app,
        &[
            ("length", "20"),
            ("width", "15"),
            ("height", "10"),
            ("weight", "2.5"),
            ("action", "next"),
        ],
    )
    .await;
    assert_eq!(package.status(), StatusCode::OK);
    assert!(package.text().await.unwrap().contains("SMSA"));
}

const CARRIER: &[(&str, &str)] = &[
    ("company_id", "c1"),
    ("shipping_type", "express"),
    ("payment_method", "wallet"),
    ("action", "next"),
];

#[tokio::test]
async fn test_success_refetches_list_once_and_redirects() {
    let backend = serve_backend(
        customer_backend().route(
            CREATE,
            post(|| async { Json(json!({"message": "created"})) }),
        ),
    )
    .await;
    let app = spawn_app(&backend).await;
    let client = browser();

    assert_eq!(login(&client, &app).await, "/shipments");
    let list = client.get(format!("{app}/shipments")).send().await.unwrap();
    assert_eq!(list.status(), StatusCode::OK);
    assert_eq!(backend.recorder.count(&Method::GET, LIST), 1);

    walk_to_carrier(&client, &app).await;
    let done = step(&client, &app, CARRIER).await;

    assert_eq!(done.status(), StatusCode::OK);
    assert_eq!(done.headers()["refresh"], "1.2; url=/shipments");
    let page = done.text().await.unwrap();
    assert!(page.contains("تمت إضافة الشحنة بنجاح"));

    let bodies = backend.recorder.bodies(&Method::POST, CREATE);
    assert_eq!(bodies.len(), 1);
    let body = &bodies[0];
    assert_eq!(body["company"], "c1");
    assert_eq!(body["shipmentType"], "express");
    assert_eq!(body["order"]["clientAddress"], "a1");
    assert_eq!(body["order"]["customer"]["fullName"], "Huda");
    assert_eq!(body["order"]["boxNum"], 1);
    assert!(body["order"].get("codAmount").is_none());

    // The creation invalidated the list: one refetch, then cached again.
    client.get(format!("{app}/shipments")).send().await.unwrap();
    client.get(format!("{app}/shipments")).send().await.unwrap();
    assert_eq!(backend.recorder.count(&Method::GET, LIST), 2);

    // A fresh wizard starts over.
    let fresh = client.get(format!("{app}/shipments/new")).send().await.unwrap();
    assert!(fresh.text().await.unwrap().contains("Main store"));
}

#[tokio::test]
async fn test_failure_shows_server_message_without_redirect() {
    let backend = serve_backend(customer_backend().route(
        CREATE,
        post(|| async {
            (
                StatusCode::BAD_REQUEST,
                Json(json!({"message": "الرصيد غير كافٍ"})),
            )
        }),
    ))
    .await;
    let app = spawn_app(&backend).await;
    let client = browser();
    login(&client, &app).await;

    walk_to_carrier(&client, &app).await;
    let failed = step(&client, &app, CARRIER).await;

    assert_eq!(failed.status(), StatusCode::OK);
    assert!(failed.headers().get("refresh").is_none());
    let page = failed.text().await.unwrap();
    assert!(page.contains("الرصيد غير كافٍ"));
    assert!(!page.contains("http-equiv=\"refresh\""));

    // Still on the carrier step with the draft intact.
    let again = client.get(format!("{app}/shipments/new")).send().await.unwrap();
    let page = again.text().await.unwrap();
    assert!(page.contains("إنشاء الشحنة"));
    assert_eq!(backend.recorder.count(&Method::GET, LIST), 0);
}

#[tokio::test]
async fn test_failure_without_message_uses_fallback() {
    let backend = serve_backend(customer_backend().route(
        CREATE,
        post(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
    ))
    .await;
    let app = spawn_app(&backend).await;
    let client = browser();
    login(&client, &app).await;

    walk_to_carrier(&client, &app).await;
    let failed = step(&client, &app, CARRIER).await;

    assert!(failed.headers().get("refresh").is_none());
    assert!(failed.text().await.unwrap().contains("حدث خطأ أثناء إضافة الشحنة"));
}

#[tokio::test]
async fn test_missing_recipient_fields_block_the_step() {
    let backend = serve_backend(customer_backend()).await;
    let app = spawn_app(&backend).await;
    let client = browser();
    login(&client, &app).await;

    let response = step(
        &client,
        &app,
        &[("sender_address_id", "a1"), ("receiver_phone", "12"), ("action", "next")],
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let page = response.text().await.unwrap();
    assert!(page.contains("هذا الحقل مطلوب"));
    assert!(page.contains("رقم الجوال غير صالح"));
}

#[tokio::test]
async fn test_blanked_recipient_is_caught_before_submission() {
    let backend = serve_backend(
        customer_backend().route(
            CREATE,
            post(|| async { Json(json!({"message": "created"})) }),
        ),
    )
    .await;
    let app = spawn_app(&backend).await;
    let client = browser();
    login(&client, &app).await;

    walk_to_carrier(&client, &app).await;
    let mut fields = CARRIER.to_vec();
    fields.push(("receiver_name", ""));
    let response = step(&client, &app, &fields).await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let page = response.text().await.unwrap();
    assert!(page.contains("هذا الحقل مطلوب"));
    assert!(page.contains("Main store"));
    assert_eq!(backend.recorder.count(&Method::POST, CREATE), 0);
}

#[tokio::test]
async fn test_failed_preset_lookup_is_shown() {
    // The first two lookups fail: the package step render and the preset.
    let calls = Arc::new(AtomicUsize::new(0));
    let parcels = get(move || {
        let calls = Arc::clone(&calls);
        async move {
            if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    Json(json!({"message": "parcel service down"})),
                )
            } else {
                (
                    StatusCode::OK,
                    Json(json!({"data": [
                        {"_id": "p1", "title": "Small", "length": 20, "width": 15, "height": 10}
                    ]})),
                )
            }
        }
    });
    let backend = serve_backend(customer_backend_with_parcels(parcels)).await;
    let app = spawn_app(&backend).await;
    let client = browser();
    login(&client, &app).await;

    step(
        &client,
        &app,
        &[
            ("sender_address_id", "a1"),
            ("receiver_name", "Huda"),
            ("receiver_phone", "0500000002"),
            ("receiver_city", "Dammam"),
            ("receiver_address", "Street 4"),
            ("action", "next"),
        ],
    )
    .await;

    let response = step(&client, &app, &[("parcel_size_id", "p1"), ("action", "preset")]).await;

    assert_eq!(response.status(), StatusCode::OK);
    let page = response.text().await.unwrap();
    assert!(page.contains("parcel service down"));
    assert!(!page.contains("value=\"20\""));
    assert_eq!(backend.recorder.count(&Method::GET, "/api/parcel"), 3);
}
