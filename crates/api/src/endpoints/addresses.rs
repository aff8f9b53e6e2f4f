//! The current user's saved sender addresses.

use reqwest::Method;
use shipdesk_core::AddressId;
use tracing::instrument;

use crate::cache::{Mutation, Query};
use crate::client::{BackendClient, NO_ARGS};
use crate::error::ApiError;
use crate::types::{AccessToken, Ack, ClientAddress, ClientAddressInput, Data};

impl BackendClient {
    /// List saved addresses.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response is malformed.
    #[instrument(skip(self, token))]
    pub async fn client_addresses(
        &self,
        token: &AccessToken,
    ) -> Result<Vec<ClientAddress>, ApiError> {
        let envelope: Data<Vec<ClientAddress>> = self
            .cached_get(Query::ClientAddresses, Some(token), "clientaddress", NO_ARGS)
            .await?;
        Ok(envelope.data)
    }

    /// Save a new address.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the address.
    #[instrument(skip(self, token, input), fields(city = %input.city))]
    pub async fn create_client_address(
        &self,
        token: &AccessToken,
        input: &ClientAddressInput,
    ) -> Result<Ack, ApiError> {
        let builder = self
            .request(Method::POST, "clientaddress", Some(token))?
            .json(input);
        self.mutate(Mutation::CreateClientAddress, builder).await
    }

    /// Replace an existing address.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the update.
    #[instrument(skip(self, token, input), fields(address_id = %id))]
    pub async fn update_client_address(
        &self,
        token: &AccessToken,
        id: &AddressId,
        input: &ClientAddressInput,
    ) -> Result<Ack, ApiError> {
        let builder = self
            .request(Method::PUT, &format!("clientaddress/{id}"), Some(token))?
            .json(input);
        self.mutate(Mutation::UpdateClientAddress, builder).await
    }

    /// Delete an address.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend refuses the deletion.
    #[instrument(skip(self, token), fields(address_id = %id))]
    pub async fn delete_client_address(
        &self,
        token: &AccessToken,
        id: &AddressId,
    ) -> Result<Ack, ApiError> {
        let builder = self.request(Method::DELETE, &format!("clientaddress/{id}"), Some(token))?;
        self.mutate(Mutation::DeleteClientAddress, builder).await
    }
}
