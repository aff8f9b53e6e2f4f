//! Public shipment tracking.

use reqwest::Method;
use tracing::instrument;

use crate::client::BackendClient;
use crate::error::ApiError;
use crate::types::tracking::TrackingBody;
use crate::types::{AccessToken, Data, TrackingResult};

impl BackendClient {
    /// Look up a shipment by tracking number.
    ///
    /// Works without a session; the token is attached when there is one.
    ///
    /// # Errors
    ///
    /// Returns an error if the number is unknown or the request fails.
    #[instrument(skip(self, token))]
    pub async fn track(
        &self,
        token: Option<&AccessToken>,
        tracking_number: &str,
    ) -> Result<TrackingResult, ApiError> {
        let request = self
            .request(Method::POST, "tracking", token)?
            .json(&TrackingBody {
                tracking_number: tracking_number.trim(),
            });
        let envelope: Data<TrackingResult> = self.send(request).await?;
        Ok(envelope.data)
    }
}
