//! One module per backend resource, each adding methods to [`BackendClient`].
//!
//! [`BackendClient`]: crate::BackendClient

mod addresses;
mod admin;
mod auth;
mod companies;
mod notifications;
mod shipments;
mod tracking;
mod wallets;
