//! Address book API client.
//!
//! Persistence only - the eligibility rules live in
//! [`crate::checkout::address`], and callers are expected to check
//! `can_save_address` before calling [`AddressApiClient::store`].

use serde::Serialize;

use souk_core::{AddressForm, AddressId, CustomerId, SavedAddress};

use crate::api::{ApiError, RestClient};
use crate::config::ApiConfig;

#[derive(Serialize)]
struct StoreAddressRequest<'a> {
    customer_id: CustomerId,
    #[serde(flatten)]
    address: &'a AddressForm,
}

/// REST client for the customer address book.
#[derive(Clone)]
pub struct AddressApiClient {
    rest: RestClient,
}

impl AddressApiClient {
    /// Create a new Address API client.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client fails to build.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        Ok(Self {
            rest: RestClient::new(config)?,
        })
    }

    /// Fetch all saved addresses for a customer.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be
    /// decoded.
    pub async fn list(&self, customer_id: CustomerId) -> Result<Vec<SavedAddress>, ApiError> {
        self.rest
            .get_json(&format!("customer/addresses/{customer_id}"))
            .await
    }

    /// Persist a new address to the customer's book.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails; the backend enforces its own
    /// copy of the address cap.
    pub async fn store(
        &self,
        customer_id: CustomerId,
        address: &AddressForm,
    ) -> Result<SavedAddress, ApiError> {
        self.rest
            .post_json(
                "customer/addresses/store",
                &StoreAddressRequest {
                    customer_id,
                    address,
                },
            )
            .await
    }

    /// Replace an existing saved address.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the address is unknown.
    pub async fn update(
        &self,
        id: AddressId,
        address: &AddressForm,
    ) -> Result<SavedAddress, ApiError> {
        self.rest
            .put_json(&format!("customer/addresses/update/{id}"), address)
            .await
    }

    /// Delete a saved address.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the address is unknown.
    pub async fn delete(&self, id: AddressId) -> Result<(), ApiError> {
        self.rest
            .delete(&format!("customer/addresses/delete/{id}"))
            .await
    }
}
