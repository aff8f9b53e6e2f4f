//! The backend client: base URL, bearer auth, decoding and caching.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Method, RequestBuilder, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

use crate::cache::{CacheKey, Mutation, Query, QueryCache, Tag};
use crate::error::{ApiError, is_invalid_token_message};
use crate::events::{ClientEvent, DEFAULT_BUS_CAPACITY, EventBus};
use crate::types::{AccessToken, ErrorBody};

/// Query arguments for endpoints that take none.
pub(crate) const NO_ARGS: &[(&str, &str)] = &[];

/// Connection settings for [`BackendClient`].
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Base URL of the REST API, e.g. `https://api.example.com/api/`.
    pub base_url: Url,
    /// URL of the notification WebSocket.
    pub socket_url: Url,
    /// How long cached query responses stay fresh.
    pub cache_ttl: Duration,
    /// Maximum number of cached query responses.
    pub cache_capacity: u64,
}

impl BackendConfig {
    /// Settings with default cache sizing and a socket URL derived from `base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the socket URL cannot be derived.
    pub fn new(base_url: Url) -> Result<Self, ApiError> {
        let socket_url = derive_socket_url(&base_url)?;
        Ok(Self {
            base_url,
            socket_url,
            cache_ttl: Duration::from_secs(30),
            cache_capacity: 1000,
        })
    }
}

/// `http(s)://host/api/` becomes `ws(s)://host/socket`.
///
/// # Errors
///
/// Returns an error if the base URL has no host.
pub fn derive_socket_url(base_url: &Url) -> Result<Url, ApiError> {
    let scheme = if base_url.scheme() == "https" { "wss" } else { "ws" };
    let host = base_url
        .host_str()
        .ok_or(ApiError::Url(url::ParseError::EmptyHost))?;
    let url = match base_url.port() {
        Some(port) => format!("{scheme}://{host}:{port}/socket"),
        None => format!("{scheme}://{host}/socket"),
    };
    Ok(Url::parse(&url)?)
}

/// Client for the shipping backend.
///
/// Cheap to clone; all clones share the HTTP connection pool, the query
/// cache and the event bus.
#[derive(Clone)]
pub struct BackendClient {
    inner: Arc<BackendClientInner>,
}

struct BackendClientInner {
    http: reqwest::Client,
    config: BackendConfig,
    cache: QueryCache,
    events: EventBus,
}

impl std::fmt::Debug for BackendClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendClient")
            .field("base_url", &self.inner.config.base_url.as_str())
            .field("socket_url", &self.inner.config.socket_url.as_str())
            .finish_non_exhaustive()
    }
}

impl BackendClient {
    /// Create a client with its own event bus.
    #[must_use]
    pub fn new(config: BackendConfig) -> Self {
        Self::with_events(config, EventBus::new(DEFAULT_BUS_CAPACITY))
    }

    /// Create a client publishing to an existing event bus.
    #[must_use]
    pub fn with_events(config: BackendConfig, events: EventBus) -> Self {
        let cache = QueryCache::new(config.cache_capacity, config.cache_ttl);
        Self {
            inner: Arc::new(BackendClientInner {
                http: reqwest::Client::new(),
                config,
                cache,
                events,
            }),
        }
    }

    /// The event bus this client publishes to.
    #[must_use]
    pub fn events(&self) -> &EventBus {
        &self.inner.events
    }

    /// The query cache.
    #[must_use]
    pub fn cache(&self) -> &QueryCache {
        &self.inner.cache
    }

    /// The configured notification socket URL.
    #[must_use]
    pub fn socket_url(&self) -> &Url {
        &self.inner.config.socket_url
    }

    // =========================================================================
    // Request plumbing
    // =========================================================================

    /// Resolve an endpoint path against the base URL.
    ///
    /// Leading slashes are ignored so `"/shipment/x"` and `"shipment/x"` agree.
    pub(crate) fn url(&self, path: &str) -> Result<Url, ApiError> {
        let base = self.inner.config.base_url.as_str().trim_end_matches('/');
        Ok(Url::parse(&format!("{base}/{}", path.trim_start_matches('/')))?)
    }

    /// Start a request, attaching the bearer token when given.
    pub(crate) fn request(
        &self,
        method: Method,
        path: &str,
        token: Option<&AccessToken>,
    ) -> Result<RequestBuilder, ApiError> {
        let builder = self.inner.http.request(method, self.url(path)?);
        Ok(match token {
            Some(token) => builder.bearer_auth(token.expose()),
            None => builder,
        })
    }

    /// Send a request and decode the response into `T`.
    pub(crate) async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, ApiError> {
        let value = self.send_value(request).await?;
        decode_value(value)
    }

    /// Send a request and return the raw JSON body of a success response.
    async fn send_value(&self, request: RequestBuilder) -> Result<serde_json::Value, ApiError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        self.check_response(status, &body)
    }

    /// Turn a status + body pair into JSON or a typed error.
    ///
    /// An "invalid token" message publishes [`ClientEvent::TokenError`].
    pub(crate) fn check_response(
        &self,
        status: StatusCode,
        body: &str,
    ) -> Result<serde_json::Value, ApiError> {
        if status.is_success() {
            if body.trim().is_empty() {
                return Err(ApiError::InvalidResponse {
                    status: status.as_u16(),
                    detail: "empty body".to_string(),
                });
            }
            return serde_json::from_str(body).map_err(|e| {
                warn!(
                    status = %status,
                    body = %body.chars().take(200).collect::<String>(),
                    "Backend returned non-JSON body"
                );
                ApiError::InvalidResponse {
                    status: status.as_u16(),
                    detail: e.to_string(),
                }
            });
        }

        if body.trim().is_empty() {
            return Err(ApiError::Rejected {
                status: status.as_u16(),
                message: None,
            });
        }

        let error: ErrorBody = serde_json::from_str(body).map_err(|e| ApiError::InvalidResponse {
            status: status.as_u16(),
            detail: e.to_string(),
        })?;

        if let Some(message) = &error.message
            && is_invalid_token_message(message)
        {
            warn!(status = %status, "Backend rejected bearer token");
            self.inner.events.publish(ClientEvent::TokenError {
                message: message.clone(),
            });
            return Err(ApiError::InvalidToken(message.clone()));
        }

        debug!(status = %status, message = ?error.message, "Backend rejected request");
        Err(ApiError::Rejected {
            status: status.as_u16(),
            message: error.message,
        })
    }

    // =========================================================================
    // Cached reads and invalidating writes
    // =========================================================================

    /// Run a cached GET.
    ///
    /// The body is validated against `T` before it is cached, so a malformed
    /// response is never stored.
    pub(crate) async fn cached_get<T, A>(
        &self,
        query: Query,
        token: Option<&AccessToken>,
        path: &str,
        args: &A,
    ) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        A: Serialize + ?Sized,
    {
        let serialized = serde_json::to_string(args).map_err(|e| ApiError::InvalidResponse {
            status: 0,
            detail: format!("unserializable query arguments: {e}"),
        })?;
        let key = CacheKey::new(token, query, format!("{path}?{serialized}"));
        let request = self.request(Method::GET, path, token)?.query(args);

        let value = self
            .inner
            .cache
            .get_or_fetch(key, async move {
                debug!(?query, "Query cache miss");
                let value = self.send_value(request).await?;
                decode_ref::<T>(&value)?;
                Ok(value)
            })
            .await?;

        decode_ref(&value)
    }

    /// Send a mutation and, on success, invalidate its tags.
    pub(crate) async fn mutate<T: DeserializeOwned>(
        &self,
        mutation: Mutation,
        request: RequestBuilder,
    ) -> Result<T, ApiError> {
        let result = self.send(request).await?;
        self.invalidate(mutation.invalidates());
        Ok(result)
    }

    /// Invalidate cached queries and announce it on the event bus.
    pub fn invalidate(&self, tags: &[Tag]) {
        self.inner.cache.invalidate(tags);
        self.inner
            .events
            .publish(ClientEvent::Invalidated(tags.to_vec()));
    }
}

fn decode_value<T: DeserializeOwned>(value: serde_json::Value) -> Result<T, ApiError> {
    serde_json::from_value(value).map_err(|e| ApiError::InvalidResponse {
        status: 200,
        detail: e.to_string(),
    })
}

fn decode_ref<T: DeserializeOwned>(value: &serde_json::Value) -> Result<T, ApiError> {
    T::deserialize(value).map_err(|e| ApiError::InvalidResponse {
        status: 200,
        detail: e.to_string(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use super::*;

    /// Serve `router` on an ephemeral local port and return its base URL.
    pub(crate) async fn serve(router: axum::Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}/api/")
    }

    /// Client pointed at `base`, with a long cache TTL.
    pub(crate) fn client_for(base: &str) -> BackendClient {
        let mut config = BackendConfig::new(Url::parse(base).unwrap()).unwrap();
        config.cache_ttl = Duration::from_secs(300);
        BackendClient::new(config)
    }

    #[test]
    fn test_url_joining_ignores_slashes() {
        let client = client_for("https://api.example.com/api/");
        assert_eq!(
            client.url("/shipment/my-shipments").unwrap().as_str(),
            "https://api.example.com/api/shipment/my-shipments"
        );
        assert_eq!(
            client.url("notifications/getMynotification").unwrap().as_str(),
            "https://api.example.com/api/notifications/getMynotification"
        );
    }

    #[test]
    fn test_socket_url_derivation() {
        let url = derive_socket_url(&Url::parse("https://api.example.com/api/").unwrap()).unwrap();
        assert_eq!(url.as_str(), "wss://api.example.com/socket");

        let url = derive_socket_url(&Url::parse("http://127.0.0.1:4000/").unwrap()).unwrap();
        assert_eq!(url.as_str(), "ws://127.0.0.1:4000/socket");
    }

    #[test]
    fn test_check_response_success() {
        let client = client_for("http://localhost/");
        let value = client.check_response(StatusCode::OK, r#"{"data": 1}"#).unwrap();
        assert_eq!(value["data"], 1);
    }

    #[test]
    fn test_check_response_empty_or_garbage_is_invalid() {
        let client = client_for("http://localhost/");
        assert!(matches!(
            client.check_response(StatusCode::OK, "  "),
            Err(ApiError::InvalidResponse { status: 200, .. })
        ));
        assert!(matches!(
            client.check_response(StatusCode::OK, "<html>"),
            Err(ApiError::InvalidResponse { .. })
        ));
        assert!(matches!(
            client.check_response(StatusCode::BAD_GATEWAY, "<html>"),
            Err(ApiError::InvalidResponse { status: 502, .. })
        ));
    }

    #[test]
    fn test_check_response_rejection_keeps_message() {
        let client = client_for("http://localhost/");
        let err = client
            .check_response(StatusCode::BAD_REQUEST, r#"{"message": "الوزن مطلوب"}"#)
            .unwrap_err();
        assert!(matches!(
            err,
            ApiError::Rejected { status: 400, message: Some(ref m) } if m == "الوزن مطلوب"
        ));
    }

    #[tokio::test]
    async fn test_invalid_token_publishes_event() {
        let client = client_for("http://localhost/");
        let mut events = client.events().subscribe();

        let err = client
            .check_response(StatusCode::UNAUTHORIZED, r#"{"message": "Invalid token"}"#)
            .unwrap_err();

        assert!(matches!(err, ApiError::InvalidToken(ref m) if m == "Invalid token"));
        assert_eq!(
            events.recv().await.unwrap(),
            ClientEvent::TokenError {
                message: "Invalid token".to_string()
            }
        );
    }
}
