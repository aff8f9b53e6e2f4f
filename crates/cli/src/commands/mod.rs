//! Subcommand implementations.

pub mod shipments;
pub mod stats;
pub mod track;

use shipdesk_api::{AccessToken, ApiError, BackendClient, BackendConfig};
use thiserror::Error;
use url::Url;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CliError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// The backend URL does not parse.
    #[error("Invalid backend URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The status filter names no known shipment status.
    #[error(transparent)]
    UnknownStatus(#[from] shipdesk_core::UnknownStatus),

    /// The backend call failed.
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Build a client from `SHIPDESK_BACKEND_URL`.
pub fn client() -> Result<BackendClient, CliError> {
    let base = std::env::var("SHIPDESK_BACKEND_URL")
        .map_err(|_| CliError::MissingEnvVar("SHIPDESK_BACKEND_URL"))?;
    let config = BackendConfig::new(Url::parse(&base)?)?;
    Ok(BackendClient::new(config))
}

/// The bearer token from `SHIPDESK_TOKEN`.
pub fn token() -> Result<AccessToken, CliError> {
    std::env::var("SHIPDESK_TOKEN")
        .map(AccessToken::new)
        .map_err(|_| CliError::MissingEnvVar("SHIPDESK_TOKEN"))
}
