//! Query cache and the static cache-invalidation contract.
//!
//! Every read query provides exactly one [`Tag`]; every mutation lists the
//! tags it invalidates in [`INVALIDATIONS`]. The two tables below are the
//! whole contract: a page sees fresh data after a mutation because the
//! mutation's row names a tag its query provides.
//!
//! Entries are keyed by the caller's token scope, the query and its
//! serialized arguments. Concurrent misses on the same key share one backend
//! request.
//!
//! Each tag also carries a generation number that is part of the stored key.
//! Invalidating a tag bumps its generation, so a fetch that was already in
//! flight stores its result under the old generation and later reads never
//! see it.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use moka::future::Cache;
use sha2::{Digest, Sha256};

use crate::error::ApiError;
use crate::types::AccessToken;

/// A family of cached data that mutations can invalidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    Shipments,
    ShipmentStatistics,
    ClientAddresses,
    ParcelSizes,
    ShippingCompanies,
    Wallet,
    Notifications,
    AdminStats,
    Users,
    Orders,
    Wallets,
    PendingTransfers,
}

/// A cacheable read endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Query {
    MyShipments,
    Shipment,
    ShipmentStatistics,
    ClientAddresses,
    ParcelSizes,
    ShippingCompanies,
    MyWallet,
    MyNotifications,
    AdminStats,
    AdminUsers,
    AdminShipments,
    AdminOrders,
    AdminWallets,
    PendingTransfers,
}

/// A write endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mutation {
    CreateShipment,
    CancelShipment,
    CreateClientAddress,
    UpdateClientAddress,
    DeleteClientAddress,
    SubmitBankTransfer,
    MarkNotificationRead,
    UpdateUserStatus,
    UpdateUserRole,
    DeleteUser,
    UpdateShipmentStatus,
    DeleteShipment,
    UpdateOrderStatus,
    AddBalance,
    ApproveTransfer,
    RejectTransfer,
    SendNotification,
}

/// The tag each query provides.
pub const PROVIDES: &[(Query, Tag)] = &[
    (Query::MyShipments, Tag::Shipments),
    (Query::Shipment, Tag::Shipments),
    (Query::ShipmentStatistics, Tag::ShipmentStatistics),
    (Query::ClientAddresses, Tag::ClientAddresses),
    (Query::ParcelSizes, Tag::ParcelSizes),
    (Query::ShippingCompanies, Tag::ShippingCompanies),
    (Query::MyWallet, Tag::Wallet),
    (Query::MyNotifications, Tag::Notifications),
    (Query::AdminStats, Tag::AdminStats),
    (Query::AdminUsers, Tag::Users),
    (Query::AdminShipments, Tag::Shipments),
    (Query::AdminOrders, Tag::Orders),
    (Query::AdminWallets, Tag::Wallets),
    (Query::PendingTransfers, Tag::PendingTransfers),
];

/// The tags each mutation invalidates once it succeeds.
pub const INVALIDATIONS: &[(Mutation, &[Tag])] = &[
    (
        Mutation::CreateShipment,
        &[Tag::Shipments, Tag::ShipmentStatistics, Tag::Orders, Tag::Wallet, Tag::AdminStats],
    ),
    (
        Mutation::CancelShipment,
        &[Tag::Shipments, Tag::ShipmentStatistics, Tag::Wallet, Tag::AdminStats],
    ),
    (Mutation::CreateClientAddress, &[Tag::ClientAddresses]),
    (Mutation::UpdateClientAddress, &[Tag::ClientAddresses]),
    (Mutation::DeleteClientAddress, &[Tag::ClientAddresses]),
    (Mutation::SubmitBankTransfer, &[Tag::Wallet, Tag::PendingTransfers]),
    (Mutation::MarkNotificationRead, &[Tag::Notifications]),
    (Mutation::UpdateUserStatus, &[Tag::Users]),
    (Mutation::UpdateUserRole, &[Tag::Users]),
    (Mutation::DeleteUser, &[Tag::Users, Tag::AdminStats]),
    (
        Mutation::UpdateShipmentStatus,
        &[Tag::Shipments, Tag::ShipmentStatistics, Tag::AdminStats],
    ),
    (
        Mutation::DeleteShipment,
        &[Tag::Shipments, Tag::ShipmentStatistics, Tag::AdminStats],
    ),
    (
        Mutation::UpdateOrderStatus,
        &[Tag::Orders, Tag::Shipments, Tag::AdminStats],
    ),
    (Mutation::AddBalance, &[Tag::Wallets, Tag::Wallet, Tag::Users]),
    (
        Mutation::ApproveTransfer,
        &[Tag::PendingTransfers, Tag::Wallets, Tag::Wallet, Tag::AdminStats],
    ),
    (
        Mutation::RejectTransfer,
        &[Tag::PendingTransfers, Tag::Wallet, Tag::AdminStats],
    ),
    (Mutation::SendNotification, &[Tag::Notifications]),
];

impl Query {
    /// The tag this query provides.
    #[must_use]
    pub fn tag(self) -> Tag {
        PROVIDES
            .iter()
            .find_map(|(query, tag)| (*query == self).then_some(*tag))
            .unwrap_or(Tag::Shipments)
    }
}

impl Mutation {
    /// The tags this mutation invalidates.
    #[must_use]
    pub fn invalidates(self) -> &'static [Tag] {
        INVALIDATIONS
            .iter()
            .find_map(|(mutation, tags)| (*mutation == self).then_some(*tags))
            .unwrap_or(&[])
    }
}

/// Identifies one cached response.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    /// Digest of the caller's token; anonymous queries use an empty scope.
    pub scope: String,
    pub query: Query,
    /// Serialized query arguments.
    pub args: String,
}

impl CacheKey {
    /// Build a key for `query` called with `token` and `args`.
    #[must_use]
    pub fn new(token: Option<&AccessToken>, query: Query, args: String) -> Self {
        Self {
            scope: token.map(token_scope).unwrap_or_default(),
            query,
            args,
        }
    }
}

/// Short digest of a token, so raw tokens never live in cache keys.
#[must_use]
pub fn token_scope(token: &AccessToken) -> String {
    let digest = Sha256::digest(token.expose().as_bytes());
    hex::encode(digest.iter().take(12).copied().collect::<Vec<u8>>())
}

/// In-memory cache of decoded-but-untyped responses.
#[derive(Clone)]
pub struct QueryCache {
    entries: Cache<(CacheKey, u64), Arc<serde_json::Value>>,
    generations: Arc<Mutex<HashMap<Tag, u64>>>,
}

impl std::fmt::Debug for QueryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryCache")
            .field("entries", &self.entries.entry_count())
            .finish()
    }
}

impl QueryCache {
    /// Create a cache holding at most `capacity` responses for `ttl` each.
    #[must_use]
    pub fn new(capacity: u64, ttl: Duration) -> Self {
        let entries = Cache::builder()
            .max_capacity(capacity)
            .time_to_live(ttl)
            .support_invalidation_closures()
            .build();
        Self {
            entries,
            generations: Arc::default(),
        }
    }

    fn generation(&self, tag: Tag) -> u64 {
        let generations = self.generations.lock().unwrap_or_else(PoisonError::into_inner);
        generations.get(&tag).copied().unwrap_or_default()
    }

    /// Return the cached value for `key`, or run `fetch` and cache its result.
    ///
    /// Concurrent callers with the same key wait on a single `fetch`, unless
    /// the key's tag was invalidated in between. Errors are returned to every
    /// waiter and are not cached.
    ///
    /// # Errors
    ///
    /// Returns the error produced by `fetch`.
    pub async fn get_or_fetch<F>(
        &self,
        key: CacheKey,
        fetch: F,
    ) -> Result<Arc<serde_json::Value>, ApiError>
    where
        F: Future<Output = Result<serde_json::Value, ApiError>>,
    {
        let generation = self.generation(key.query.tag());
        self.entries
            .try_get_with((key, generation), async move { fetch.await.map(Arc::new) })
            .await
            .map_err(ApiError::from_shared)
    }

    /// Drop every entry whose query provides one of `tags`.
    pub fn invalidate(&self, tags: &[Tag]) {
        if tags.is_empty() {
            return;
        }
        {
            let mut generations = self.generations.lock().unwrap_or_else(PoisonError::into_inner);
            for tag in tags {
                *generations.entry(*tag).or_default() += 1;
            }
        }

        let tags = tags.to_vec();
        if let Err(e) = self
            .entries
            .invalidate_entries_if(move |entry: &(CacheKey, u64), _| {
                tags.contains(&entry.0.query.tag())
            })
        {
            // Only possible when closures are not supported; fall back to a full clear.
            tracing::warn!(error = %e, "Tag invalidation unavailable, clearing query cache");
            self.entries.invalidate_all();
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    const ALL_QUERIES: &[Query] = &[
        Query::MyShipments,
        Query::Shipment,
        Query::ShipmentStatistics,
        Query::ClientAddresses,
        Query::ParcelSizes,
        Query::ShippingCompanies,
        Query::MyWallet,
        Query::MyNotifications,
        Query::AdminStats,
        Query::AdminUsers,
        Query::AdminShipments,
        Query::AdminOrders,
        Query::AdminWallets,
        Query::PendingTransfers,
    ];

    #[test]
    fn test_every_query_has_a_row() {
        for query in ALL_QUERIES {
            assert!(
                PROVIDES.iter().any(|(q, _)| q == query),
                "{query:?} missing from PROVIDES"
            );
        }
    }

    #[test]
    fn test_every_mutation_invalidates_something() {
        for (mutation, tags) in INVALIDATIONS {
            assert!(!tags.is_empty(), "{mutation:?} invalidates nothing");
        }
    }

    #[test]
    fn test_shipment_creation_refreshes_lists() {
        let tags = Mutation::CreateShipment.invalidates();
        assert!(tags.contains(&Query::MyShipments.tag()));
        assert!(tags.contains(&Query::AdminShipments.tag()));
        assert!(tags.contains(&Query::ShipmentStatistics.tag()));
    }

    #[test]
    fn test_user_status_only_touches_users() {
        assert_eq!(Mutation::UpdateUserStatus.invalidates(), &[Tag::Users]);
    }

    #[test]
    fn test_token_scope_is_stable_and_opaque() {
        let token = AccessToken::new("secret-token");
        let scope = token_scope(&token);
        assert_eq!(scope, token_scope(&AccessToken::new("secret-token")));
        assert_eq!(scope.len(), 24);
        assert!(!scope.contains("secret"));
    }

    #[tokio::test]
    async fn test_invalidation_forces_one_refetch() {
        let cache = QueryCache::new(100, Duration::from_secs(60));
        let fetches = Arc::new(AtomicUsize::new(0));
        let key = CacheKey::new(None, Query::MyShipments, "page=1".to_string());

        let fetch = |fetches: Arc<AtomicUsize>| async move {
            fetches.fetch_add(1, Ordering::SeqCst);
            Ok(serde_json::json!({"data": []}))
        };

        cache.get_or_fetch(key.clone(), fetch(fetches.clone())).await.unwrap();
        cache.get_or_fetch(key.clone(), fetch(fetches.clone())).await.unwrap();
        assert_eq!(fetches.load(Ordering::SeqCst), 1);

        cache.invalidate(Mutation::UpdateUserStatus.invalidates());
        cache.get_or_fetch(key.clone(), fetch(fetches.clone())).await.unwrap();
        assert_eq!(fetches.load(Ordering::SeqCst), 1, "unrelated tag kept entry");

        cache.invalidate(Mutation::CreateShipment.invalidates());
        cache.get_or_fetch(key.clone(), fetch(fetches.clone())).await.unwrap();
        cache.get_or_fetch(key, fetch(fetches.clone())).await.unwrap();
        assert_eq!(fetches.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_errors_are_not_cached() {
        let cache = QueryCache::new(100, Duration::from_secs(60));
        let key = CacheKey::new(None, Query::ParcelSizes, String::new());

        let first = cache
            .get_or_fetch(key.clone(), async {
                Err(ApiError::Rejected {
                    status: 500,
                    message: None,
                })
            })
            .await;
        assert!(first.is_err());

        let second = cache
            .get_or_fetch(key, async { Ok(serde_json::json!({"data": []})) })
            .await;
        assert!(second.is_ok());
    }

    #[tokio::test]
    async fn test_fetch_in_flight_during_invalidation_is_not_served_afterwards() {
        let cache = QueryCache::new(100, Duration::from_secs(60));
        let key = CacheKey::new(None, Query::MyShipments, "page=1".to_string());
        let (started_tx, started_rx) = tokio::sync::oneshot::channel::<()>();
        let (release_tx, release_rx) = tokio::sync::oneshot::channel::<()>();

        let slow = {
            let cache = cache.clone();
            let key = key.clone();
            tokio::spawn(async move {
                cache
                    .get_or_fetch(key, async move {
                        let _ = started_tx.send(());
                        let _ = release_rx.await;
                        Ok(serde_json::json!("before"))
                    })
                    .await
            })
        };
        started_rx.await.unwrap();

        cache.invalidate(Mutation::CreateShipment.invalidates());
        let fresh = cache
            .get_or_fetch(key.clone(), async { Ok(serde_json::json!("after")) })
            .await
            .unwrap();
        assert_eq!(*fresh, serde_json::json!("after"));

        release_tx.send(()).unwrap();
        assert_eq!(*slow.await.unwrap().unwrap(), serde_json::json!("before"));

        let again = cache
            .get_or_fetch(key, async { Ok(serde_json::json!("unexpected")) })
            .await
            .unwrap();
        assert_eq!(*again, serde_json::json!("after"));
    }
}
