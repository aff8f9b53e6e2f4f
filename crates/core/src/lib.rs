//! Shipdesk Core - Shared domain types.
//!
//! This crate provides the types shared by every Shipdesk component:
//! - `api` - Typed client for the shipping backend
//! - `web` - Customer portal and admin dashboard
//! - `cli` - Command-line lookups
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O and no
//! HTTP clients - so it can be used anywhere, including in tests that never
//! touch the network.
//!
//! # Modules
//!
//! - [`types`] - Newtype ids, statuses, money and email
//! - [`validation`] - Per-field form validation

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;
pub mod validation;

pub use types::*;
pub use validation::FieldErrors;
