//! Reference-data endpoints: provinces and product tax quotes.

use reqwest::Method;
use serde_json::{json, Value};

use crate::client::CrmClient;
use crate::error::CrmError;

impl CrmClient {
    /// Lists the provinces/states the vendor knows for `country`.
    ///
    /// # Errors
    ///
    /// - [`CrmError::Crm`] if the vendor rejects the lookup.
    /// - [`CrmError::Operational`] on transport failure or a malformed error body.
    /// - [`CrmError::Decode`] if a successful response is not JSON.
    pub async fn get_provinces(&self, country: &str) -> Result<Value, CrmError> {
        let endpoint = format!("orders/getProvinces/{country}");
        self.request(&endpoint, None, Method::GET).await
    }

    /// Quotes tax for one product shipped to `shipping_country`.
    ///
    /// The country code is upper-cased before sending.
    ///
    /// # Errors
    ///
    /// - [`CrmError::Crm`] if the vendor rejects the quote.
    /// - [`CrmError::Operational`] on transport failure or a malformed error body.
    /// - [`CrmError::Decode`] if a successful response is not JSON.
    pub async fn get_tax_for_product(
        &self,
        product_id: i64,
        shipping_country: &str,
    ) -> Result<Value, CrmError> {
        let query = json!({
            "ProductId": product_id,
            "ShippingCountry": shipping_country.to_uppercase(),
        });
        self.request("products/calculateTaxForProduct", Some(query), Method::GET)
            .await
    }
}
