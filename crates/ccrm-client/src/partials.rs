//! Partial (lead capture) endpoints.

use reqwest::Method;
use serde_json::Value;

use crate::client::{to_object, CrmClient};
use crate::error::CrmError;
use crate::transform::{transform_keys, PARTIAL_FIELDS};
use crate::types::PartialInput;

impl CrmClient {
    /// Creates a partial: contact details captured before payment, later
    /// converted with [`CrmClient::create_order_on_partial`].
    ///
    /// # Errors
    ///
    /// - [`CrmError::Crm`] if the vendor rejects the partial.
    /// - [`CrmError::Operational`] on transport failure or a malformed error body.
    /// - [`CrmError::Decode`] if a successful response is not JSON.
    pub async fn create_partial(&self, partial: &PartialInput) -> Result<Value, CrmError> {
        let data = transform_keys(&to_object(partial, "partial")?, &PARTIAL_FIELDS);
        self.request("partials", Some(Value::Object(data)), Method::POST)
            .await
    }
}
