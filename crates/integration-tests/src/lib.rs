//! Integration tests for Shipdesk.
//!
//! Each test starts two servers on ephemeral ports: a mock shipping backend
//! built with axum, and the real web app pointed at it. A cookie-keeping
//! `reqwest` client then drives the app the way a browser would.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p shipdesk-integration-tests
//! ```

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::sync::{Arc, Mutex};

use axum::{
    Json, Router,
    body::Body,
    extract::{Request, State},
    http::Method,
    middleware::{Next, from_fn_with_state},
    response::Response,
    routing::{MethodRouter, get, post},
};
use reqwest::{Client, StatusCode, redirect::Policy};
use serde_json::{Value, json};
use shipdesk_web::{AppState, WebConfig};
use url::Url;

/// One request seen by the mock backend.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: Method,
    pub path: String,
    pub body: Option<Value>,
}

/// Every request the mock backend received, in order.
#[derive(Debug, Clone, Default)]
pub struct Recorder(Arc<Mutex<Vec<Recorded>>>);

impl Recorder {
    fn push(&self, recorded: Recorded) {
        self.0.lock().unwrap().push(recorded);
    }

    /// How many times `method path` was called.
    pub fn count(&self, method: &Method, path: &str) -> usize {
        self.0
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.method == *method && r.path == path)
            .count()
    }

    /// JSON bodies posted to `method path`.
    pub fn bodies(&self, method: &Method, path: &str) -> Vec<Value> {
        self.0
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.method == *method && r.path == path)
            .filter_map(|r| r.body.clone())
            .collect()
    }
}

async fn record(State(recorder): State<Recorder>, request: Request, next: Next) -> Response {
    let (parts, body) = request.into_parts();
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap_or_default();
    recorder.push(Recorded {
        method: parts.method.clone(),
        path: parts.uri.path().to_string(),
        body: serde_json::from_slice(&bytes).ok(),
    });
    next.run(Request::from_parts(parts, Body::from(bytes))).await
}

async fn listen(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

/// A running mock backend.
pub struct Backend {
    pub url: Url,
    pub recorder: Recorder,
}

/// Serve `router` as the backend; routes are mounted under `/api`.
pub async fn serve_backend(router: Router) -> Backend {
    let recorder = Recorder::default();
    let router = router.layer(from_fn_with_state(recorder.clone(), record));
    let base = listen(router).await;
    Backend {
        url: Url::parse(&format!("{base}/api/")).unwrap(),
        recorder,
    }
}

/// Start the web app against `backend` and return its base URL.
pub async fn spawn_app(backend: &Backend) -> String {
    let config = WebConfig::new(backend.url.clone(), "http://127.0.0.1").unwrap();
    let app = shipdesk_web::app(AppState::new(config));
    listen(app).await
}

/// Browser-like client: keeps cookies, does not follow redirects.
pub fn browser() -> Client {
    Client::builder()
        .cookie_store(true)
        .redirect(Policy::none())
        .build()
        .unwrap()
}

/// A user record as the backend returns it.
pub fn user_json(id: &str, name: &str, role: &str, active: bool) -> Value {
    json!({
        "_id": id,
        "name": name,
        "email": format!("{id}@example.com"),
        "phone": "0500000000",
        "role": role,
        "active": active
    })
}

/// Backend routes for signing in as a customer and filling the wizard.
pub fn customer_backend() -> Router {
    customer_backend_with_parcels(get(|| async {
        Json(json!({"data": [
            {"_id": "p1", "title": "Small", "length": 20, "width": 15, "height": 10}
        ]}))
    }))
}

/// [`customer_backend`] with a custom parcel-size endpoint.
pub fn customer_backend_with_parcels(parcels: MethodRouter) -> Router {
    Router::new()
        .route(
            "/api/auth/login",
            post(|| async {
                Json(json!({"token": "tok-user", "user": user_json("u1", "Noura", "user", true)}))
            }),
        )
        .route(
            "/api/clientaddress",
            get(|| async {
                Json(json!({"data": [{
                    "_id": "a1",
                    "contactName": "Main store",
                    "phone": "0500000001",
                    "city": "Riyadh",
                    "district": "Olaya",
                    "details": "King Fahd Rd"
                }]}))
            }),
        )
        .route("/api/parcel", parcels)
        .route(
            "/api/shipmentcompany",
            get(|| async {
                Json(json!({"data": [{
                    "_id": "c1",
                    "name": "SMSA",
                    "shippingTypes": [{"name": "express", "price": 30, "codFee": 5}]
                }]}))
            }),
        )
        .route(
            "/api/shipment/my-shipments",
            get(|| async {
                Json(json!({
                    "data": [],
                    "pagination": {"currentPage": 1, "totalPages": 1, "totalItems": 0}
                }))
            }),
        )
        .route(
            "/api/shipment/statistics",
            get(|| async {
                Json(json!({"data": {
                    "total": 0, "pending": 0, "readyForPickup": 0,
                    "inTransit": 0, "delivered": 0, "canceled": 0
                }}))
            }),
        )
}

/// Sign in through the login form and return the redirect target.
pub async fn login(client: &Client, app: &str) -> String {
    let response = client
        .post(format!("{app}/auth/login"))
        .form(&[("email", "noura@example.com"), ("password", "hunter22")])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    response.headers()["location"].to_str().unwrap().to_string()
}
