//! The current user's shipments.

use reqwest::Method;
use shipdesk_core::ShipmentId;
use tracing::instrument;

use crate::cache::{Mutation, Query};
use crate::client::{BackendClient, NO_ARGS};
use crate::error::ApiError;
use crate::types::{
    AccessToken, Ack, CreateShipmentRequest, Data, ListQuery, Paginated, Shipment,
    ShipmentStatistics,
};

impl BackendClient {
    /// List the current user's shipments.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response is malformed.
    #[instrument(skip(self, token))]
    pub async fn my_shipments(
        &self,
        token: &AccessToken,
        query: &ListQuery,
    ) -> Result<Paginated<Shipment>, ApiError> {
        self.cached_get(Query::MyShipments, Some(token), "shipment/my-shipments", query)
            .await
    }

    /// Fetch one shipment.
    ///
    /// # Errors
    ///
    /// Returns an error if the shipment does not exist or the request fails.
    #[instrument(skip(self, token), fields(shipment_id = %id))]
    pub async fn shipment(
        &self,
        token: &AccessToken,
        id: &ShipmentId,
    ) -> Result<Shipment, ApiError> {
        let envelope: Data<Shipment> = self
            .cached_get(Query::Shipment, Some(token), &format!("shipment/{id}"), NO_ARGS)
            .await?;
        Ok(envelope.data)
    }

    /// Per-status counts for the current user's shipments.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response is malformed.
    #[instrument(skip(self, token))]
    pub async fn shipment_statistics(
        &self,
        token: &AccessToken,
    ) -> Result<ShipmentStatistics, ApiError> {
        let envelope: Data<ShipmentStatistics> = self
            .cached_get(
                Query::ShipmentStatistics,
                Some(token),
                "shipment/statistics",
                NO_ARGS,
            )
            .await?;
        Ok(envelope.data)
    }

    /// Submit a new shipment.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the shipment.
    #[instrument(skip(self, token, request), fields(company = %request.company))]
    pub async fn create_shipment(
        &self,
        token: &AccessToken,
        request: &CreateShipmentRequest,
    ) -> Result<Ack, ApiError> {
        let builder = self
            .request(Method::POST, "shipment/createshipment", Some(token))?
            .json(request);
        self.mutate(Mutation::CreateShipment, builder).await
    }

    /// Cancel a shipment that is still waiting for pickup.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend refuses the cancellation.
    #[instrument(skip(self, token), fields(shipment_id = %id))]
    pub async fn cancel_shipment(
        &self,
        token: &AccessToken,
        id: &ShipmentId,
    ) -> Result<Ack, ApiError> {
        let builder = self.request(Method::POST, &format!("shipment/cancel/{id}"), Some(token))?;
        self.mutate(Mutation::CancelShipment, builder).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use axum::extract::State;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use serde_json::json;

    use super::*;
    use crate::client::tests::{client_for, serve};
    use crate::events::ClientEvent;

    fn page() -> serde_json::Value {
        json!({
            "data": [{
                "_id": "s1",
                "sender": {"name": "Store", "phone": "0500000001", "city": "Riyadh"},
                "receiver": {"name": "Huda", "phone": "0500000002", "city": "Dammam"},
                "weight": 1,
                "company": "SMSA",
                "price": 20,
                "status": "PENDING",
                "createdAt": "2026-03-01T10:00:00Z"
            }],
            "pagination": {"currentPage": 1, "totalPages": 3, "totalItems": 21}
        })
    }

    #[tokio::test]
    async fn test_list_is_cached_until_cancel() {
        let hits = Arc::new(AtomicUsize::new(0));
        let router = Router::new()
            .route(
                "/api/shipment/my-shipments",
                get(|State(hits): State<Arc<AtomicUsize>>, headers: HeaderMap| async move {
                    assert_eq!(headers["authorization"], "Bearer tok");
                    hits.fetch_add(1, Ordering::SeqCst);
                    Json(page())
                }),
            )
            .route(
                "/api/shipment/cancel/{id}",
                post(|| async { Json(json!({"message": "تم إلغاء الشحنة"})) }),
            )
            .with_state(Arc::clone(&hits));
        let client = client_for(&serve(router).await);
        let token = AccessToken::new("tok");
        let query = ListQuery::first_page();

        let first = client.my_shipments(&token, &query).await.unwrap();
        client.my_shipments(&token, &query).await.unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert!(first.pagination.has_next());

        let ack = client
            .cancel_shipment(&token, &ShipmentId::new("s1"))
            .await
            .unwrap();
        assert_eq!(ack.message.as_deref(), Some("تم إلغاء الشحنة"));

        client.my_shipments(&token, &query).await.unwrap();
        client.my_shipments(&token, &query).await.unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_other_tokens_do_not_share_entries() {
        let hits = Arc::new(AtomicUsize::new(0));
        let router = Router::new()
            .route(
                "/api/shipment/my-shipments",
                get(|State(hits): State<Arc<AtomicUsize>>| async move {
                    hits.fetch_add(1, Ordering::SeqCst);
                    Json(page())
                }),
            )
            .with_state(Arc::clone(&hits));
        let client = client_for(&serve(router).await);
        let query = ListQuery::first_page();

        client.my_shipments(&AccessToken::new("a"), &query).await.unwrap();
        client.my_shipments(&AccessToken::new("b"), &query).await.unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_invalid_token_over_http() {
        let router = Router::new().route(
            "/api/shipment/statistics",
            get(|| async {
                (
                    StatusCode::UNAUTHORIZED,
                    Json(json!({"message": "Invalid token"})),
                )
            }),
        );
        let client = client_for(&serve(router).await);
        let mut events = client.events().subscribe();

        let err = client
            .shipment_statistics(&AccessToken::new("expired"))
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::InvalidToken(ref m) if m == "Invalid token"));
        assert_eq!(
            events.recv().await.unwrap(),
            ClientEvent::TokenError {
                message: "Invalid token".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_empty_success_body_is_invalid_response() {
        let router = Router::new().route("/api/shipment/{id}", get(|| async { "" }));
        let client = client_for(&serve(router).await);

        let err = client
            .shipment(&AccessToken::new("tok"), &ShipmentId::new("s1"))
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::InvalidResponse { status: 200, .. }));
    }

    #[tokio::test]
    async fn test_schema_mismatch_is_invalid_response() {
        let router = Router::new().route(
            "/api/shipment/{id}",
            get(|| async { Json(json!({"data": {"_id": "s1"}})) }),
        );
        let client = client_for(&serve(router).await);

        let err = client
            .shipment(&AccessToken::new("tok"), &ShipmentId::new("s1"))
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::InvalidResponse { .. }));
    }
}
