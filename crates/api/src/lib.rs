//! Shipdesk API - Typed client for the shipping backend.
//!
//! # Overview
//!
//! [`BackendClient`] wraps one `reqwest::Client` configured with the backend
//! base URL. Each backend resource adds its methods in its own module under
//! `endpoints`, so pages import only the client and the types they render.
//!
//! # Behaviour shared by every endpoint
//!
//! - Responses are decoded into closed schemas from [`types`]; anything else
//!   is an [`ApiError::InvalidResponse`].
//! - Reads go through the [`cache::QueryCache`]; writes invalidate the tags
//!   listed in [`cache::INVALIDATIONS`] once they succeed.
//! - A backend "Invalid token" message publishes
//!   [`ClientEvent::TokenError`] on the [`EventBus`].
//!
//! # Example
//!
//! ```rust,ignore
//! use shipdesk_api::{BackendClient, BackendConfig, ListQuery};
//!
//! let client = BackendClient::new(BackendConfig::new(base_url)?);
//! let page = client.my_shipments(&token, &ListQuery::first_page()).await?;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cache;
mod client;
mod endpoints;
pub mod error;
pub mod events;
pub mod socket;
pub mod types;

pub use cache::{Mutation, Query, QueryCache, Tag};
pub use client::{BackendClient, BackendConfig, derive_socket_url};
pub use error::ApiError;
pub use events::{ClientEvent, ConnectionState, EventBus};
pub use socket::SocketEvent;
pub use types::*;
