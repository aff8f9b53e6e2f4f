//! Lookup lists for the shipment wizard: carriers and parcel size presets.

use tracing::instrument;

use crate::cache::Query;
use crate::client::{BackendClient, NO_ARGS};
use crate::error::ApiError;
use crate::types::{AccessToken, Data, ParcelSize, ShippingCompany};

impl BackendClient {
    /// List shipping companies with their priced shipping types.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response is malformed.
    #[instrument(skip(self, token))]
    pub async fn shipping_companies(
        &self,
        token: &AccessToken,
    ) -> Result<Vec<ShippingCompany>, ApiError> {
        let envelope: Data<Vec<ShippingCompany>> = self
            .cached_get(
                Query::ShippingCompanies,
                Some(token),
                "shipmentcompany",
                NO_ARGS,
            )
            .await?;
        Ok(envelope.data)
    }

    /// List predefined parcel sizes.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response is malformed.
    #[instrument(skip(self, token))]
    pub async fn parcel_sizes(&self, token: &AccessToken) -> Result<Vec<ParcelSize>, ApiError> {
        let envelope: Data<Vec<ParcelSize>> = self
            .cached_get(Query::ParcelSizes, Some(token), "parcel", NO_ARGS)
            .await?;
        Ok(envelope.data)
    }
}
