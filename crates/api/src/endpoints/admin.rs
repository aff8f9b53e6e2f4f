//! Admin dashboard: statistics and the user, shipment and order tables.

use reqwest::Method;
use shipdesk_core::{OrderId, OrderStatus, ShipmentId, ShipmentStatus, UserId, UserRole};
use tracing::instrument;

use crate::cache::{Mutation, Query};
use crate::client::{BackendClient, NO_ARGS};
use crate::error::ApiError;
use crate::types::order::OrderStatusBody;
use crate::types::shipment::ShipmentStatusBody;
use crate::types::user::{UserRoleBody, UserStatusBody};
use crate::types::{AccessToken, Ack, AdminStats, Data, ListQuery, Order, Paginated, Shipment, User};

impl BackendClient {
    /// Headline numbers for the dashboard.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response is malformed.
    #[instrument(skip(self, token))]
    pub async fn admin_stats(&self, token: &AccessToken) -> Result<AdminStats, ApiError> {
        let envelope: Data<AdminStats> = self
            .cached_get(Query::AdminStats, Some(token), "admin/stats", NO_ARGS)
            .await?;
        Ok(envelope.data)
    }

    // =========================================================================
    // Users
    // =========================================================================

    /// List users.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response is malformed.
    #[instrument(skip(self, token))]
    pub async fn admin_users(
        &self,
        token: &AccessToken,
        query: &ListQuery,
    ) -> Result<Paginated<User>, ApiError> {
        self.cached_get(Query::AdminUsers, Some(token), "admin/users", query)
            .await
    }

    /// Activate or deactivate a user.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the change.
    #[instrument(skip(self, token), fields(user_id = %id))]
    pub async fn set_user_active(
        &self,
        token: &AccessToken,
        id: &UserId,
        active: bool,
    ) -> Result<Ack, ApiError> {
        let builder = self
            .request(Method::PUT, &format!("admin/users/{id}/status"), Some(token))?
            .json(&UserStatusBody { active });
        self.mutate(Mutation::UpdateUserStatus, builder).await
    }

    /// Change a user's role.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the change.
    #[instrument(skip(self, token), fields(user_id = %id, role = %role))]
    pub async fn set_user_role(
        &self,
        token: &AccessToken,
        id: &UserId,
        role: UserRole,
    ) -> Result<Ack, ApiError> {
        let builder = self
            .request(Method::PUT, &format!("admin/users/{id}/role"), Some(token))?
            .json(&UserRoleBody { role });
        self.mutate(Mutation::UpdateUserRole, builder).await
    }

    /// Delete a user.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend refuses the deletion.
    #[instrument(skip(self, token), fields(user_id = %id))]
    pub async fn delete_user(&self, token: &AccessToken, id: &UserId) -> Result<Ack, ApiError> {
        let builder = self.request(Method::DELETE, &format!("admin/users/{id}"), Some(token))?;
        self.mutate(Mutation::DeleteUser, builder).await
    }

    // =========================================================================
    // Shipments
    // =========================================================================

    /// List every user's shipments.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response is malformed.
    #[instrument(skip(self, token))]
    pub async fn admin_shipments(
        &self,
        token: &AccessToken,
        query: &ListQuery,
    ) -> Result<Paginated<Shipment>, ApiError> {
        self.cached_get(Query::AdminShipments, Some(token), "admin/shipments", query)
            .await
    }

    /// Move a shipment to a new status.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the transition.
    #[instrument(skip(self, token), fields(shipment_id = %id, status = %status))]
    pub async fn set_shipment_status(
        &self,
        token: &AccessToken,
        id: &ShipmentId,
        status: ShipmentStatus,
    ) -> Result<Ack, ApiError> {
        let builder = self
            .request(Method::PUT, &format!("admin/shipments/{id}/status"), Some(token))?
            .json(&ShipmentStatusBody { status });
        self.mutate(Mutation::UpdateShipmentStatus, builder).await
    }

    /// Delete a shipment.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend refuses the deletion.
    #[instrument(skip(self, token), fields(shipment_id = %id))]
    pub async fn delete_shipment(
        &self,
        token: &AccessToken,
        id: &ShipmentId,
    ) -> Result<Ack, ApiError> {
        let builder =
            self.request(Method::DELETE, &format!("admin/shipments/{id}"), Some(token))?;
        self.mutate(Mutation::DeleteShipment, builder).await
    }

    // =========================================================================
    // Orders
    // =========================================================================

    /// List orders.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response is malformed.
    #[instrument(skip(self, token))]
    pub async fn admin_orders(
        &self,
        token: &AccessToken,
        query: &ListQuery,
    ) -> Result<Paginated<Order>, ApiError> {
        self.cached_get(Query::AdminOrders, Some(token), "admin/orders", query)
            .await
    }

    /// Approve or reject an order.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the change.
    #[instrument(skip(self, token), fields(order_id = %id, status = %status))]
    pub async fn set_order_status(
        &self,
        token: &AccessToken,
        id: &OrderId,
        status: OrderStatus,
    ) -> Result<Ack, ApiError> {
        let builder = self
            .request(Method::PUT, &format!("admin/orders/{id}/status"), Some(token))?
            .json(&OrderStatusBody { status });
        self.mutate(Mutation::UpdateOrderStatus, builder).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::extract::{Path, State};
    use axum::routing::put;
    use axum::{Json, Router};
    use serde_json::{Value, json};

    use super::*;
    use crate::client::tests::{client_for, serve};
    use crate::events::ClientEvent;
    use crate::cache::Tag;

    #[tokio::test]
    async fn test_set_user_active_sends_flag_and_announces_invalidation() {
        let seen: Arc<Mutex<Vec<(String, Value)>>> = Arc::default();
        let router = Router::new()
            .route(
                "/api/admin/users/{id}/status",
                put(
                    |State(seen): State<Arc<Mutex<Vec<(String, Value)>>>>,
                     Path(id): Path<String>,
                     Json(body): Json<Value>| async move {
                        seen.lock().unwrap().push((id, body));
                        Json(json!({"message": "ok"}))
                    },
                ),
            )
            .with_state(Arc::clone(&seen));
        let client = client_for(&serve(router).await);
        let mut events = client.events().subscribe();

        client
            .set_user_active(&AccessToken::new("tok"), &UserId::new("u7"), false)
            .await
            .unwrap();

        let seen = seen.lock().unwrap().clone();
        assert_eq!(seen, vec![("u7".to_string(), json!({"active": false}))]);
        assert_eq!(
            events.recv().await.unwrap(),
            ClientEvent::Invalidated(vec![Tag::Users])
        );
    }

    #[tokio::test]
    async fn test_failed_mutation_does_not_invalidate() {
        let router = Router::new().route(
            "/api/admin/orders/{id}/status",
            put(|| async {
                (
                    axum::http::StatusCode::CONFLICT,
                    Json(json!({"message": "الطلب معالج مسبقاً"})),
                )
            }),
        );
        let client = client_for(&serve(router).await);
        let mut events = client.events().subscribe();

        let err = client
            .set_order_status(&AccessToken::new("tok"), &OrderId::new("o1"), OrderStatus::Approved)
            .await
            .unwrap_err();

        assert_eq!(err.user_message("fallback"), "الطلب معالج مسبقاً");
        assert!(events.try_recv().is_err());
    }
}
