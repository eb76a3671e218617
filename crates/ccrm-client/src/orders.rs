//! Order endpoints: creation, upsells, lookup, search and order-product
//! maintenance.

use std::fmt::Display;

use reqwest::Method;
use serde_json::{json, Map, Value};

use crate::client::{to_object, CrmClient};
use crate::error::CrmError;
use crate::payment::PaymentType;
use crate::rebill::apply_rebill_discount;
use crate::transform::{pascal_case_keys, transform_keys, CUSTOMER_FIELDS, PAYMENT_FIELDS};
use crate::types::{CustomerInput, Order, OrderSearch, PaymentInput, ProductLine};

impl CrmClient {
    /// Places a new order for a customer who has no partial.
    ///
    /// Customer fields become the shipping address, payment fields the
    /// billing address and card. Product lines with a promo price get a
    /// derived rebill discount (see [`crate::rebill_discount`]).
    ///
    /// # Errors
    ///
    /// - [`CrmError::UnknownPaymentType`] before sending, for an unsupported card brand.
    /// - [`CrmError::Crm`] if the vendor rejects the order; check
    ///   [`CrmError::is_order_decline`] for a declined payment.
    /// - [`CrmError::Operational`] on transport failure or a malformed error body.
    /// - [`CrmError::Decode`] / [`CrmError::Deserialize`] if a successful
    ///   response is not an order record.
    pub async fn create_order(
        &self,
        customer: &CustomerInput,
        products: &[ProductLine],
        payment: &PaymentInput,
    ) -> Result<Order, CrmError> {
        let products: Vec<ProductLine> = products.iter().map(apply_rebill_discount).collect();

        let mut data = transform_keys(&to_object(customer, "customer")?, &CUSTOMER_FIELDS);
        data.extend(payment_payload(payment, &products)?);

        self.request_as("orders", Some(Value::Object(data)), Method::POST)
            .await
    }

    /// Converts an existing partial into an order.
    ///
    /// # Errors
    ///
    /// Same as [`CrmClient::create_order`].
    pub async fn create_order_on_partial(
        &self,
        partial_id: impl Display,
        products: &[ProductLine],
        payment: &PaymentInput,
    ) -> Result<Order, CrmError> {
        let endpoint = format!("partials/order/{partial_id}");
        let data = payment_payload(payment, products)?;
        self.request_as(&endpoint, Some(Value::Object(data)), Method::POST)
            .await
    }

    /// Adds upsell product lines to an existing order.
    ///
    /// # Errors
    ///
    /// - [`CrmError::Crm`] if the vendor rejects the upsell (402 for a decline).
    /// - [`CrmError::Operational`] on transport failure or a malformed error body.
    /// - [`CrmError::Decode`] if a successful response is not JSON.
    pub async fn upsell_on_order(
        &self,
        order_id: impl Display,
        upsell: &[ProductLine],
    ) -> Result<Value, CrmError> {
        let endpoint = format!("orders/upsell/{order_id}");
        let data = json!({ "OrderProducts": order_products(upsell)? });
        self.request(&endpoint, Some(data), Method::POST).await
    }

    /// Searches orders in a date range. Results are always fetched at depth 0.
    ///
    /// # Errors
    ///
    /// - [`CrmError::Crm`] if the vendor rejects the search.
    /// - [`CrmError::Operational`] on transport failure or a malformed error body.
    /// - [`CrmError::Decode`] / [`CrmError::Deserialize`] if a successful
    ///   response is not a list of orders.
    pub async fn find_orders(&self, search: &OrderSearch) -> Result<Vec<Order>, CrmError> {
        let mut query = to_object(search, "order search")?;
        query.insert("depth".to_owned(), json!(0));
        self.request_as("orders/find", Some(Value::Object(query)), Method::GET)
            .await
    }

    /// Fetches a single order.
    ///
    /// # Errors
    ///
    /// - [`CrmError::Crm`] if the vendor rejects the lookup.
    /// - [`CrmError::Operational`] on transport failure or a malformed error body
    ///   (an unknown id usually lands here as an empty 404).
    /// - [`CrmError::Decode`] / [`CrmError::Deserialize`] if a successful
    ///   response is not an order record.
    pub async fn get_order(&self, order_id: impl Display) -> Result<Order, CrmError> {
        let endpoint = format!("orders/{order_id}");
        self.request_as(&endpoint, None, Method::GET).await
    }

    /// Updates rebilling details (`nextDate`, `nextProductId`, ...) on an
    /// order's products. Pass lines built with `ProductLine::from(&OrderProduct)`
    /// to keep the fields the vendor already has.
    ///
    /// # Errors
    ///
    /// - [`CrmError::Crm`] if the vendor rejects the update.
    /// - [`CrmError::Operational`] on transport failure or a malformed error body.
    /// - [`CrmError::Decode`] if a successful response is not JSON.
    pub async fn patch_order_products(
        &self,
        order_id: impl Display,
        products: &[ProductLine],
    ) -> Result<Value, CrmError> {
        let endpoint = format!("orders/orderProducts/{order_id}");
        let data = json!({ "OrderProducts": order_products(products)? });
        self.request(&endpoint, Some(data), Method::PATCH).await
    }

    /// Stops future rebilling on an order.
    ///
    /// # Errors
    ///
    /// - [`CrmError::Crm`] if the vendor rejects the cancellation.
    /// - [`CrmError::Operational`] on transport failure or a malformed error body.
    /// - [`CrmError::Decode`] if a successful response is not JSON.
    pub async fn cancel_subscription(&self, order_id: impl Display) -> Result<Value, CrmError> {
        let endpoint = format!("orders/cancelSubscription/{order_id}");
        self.request(&endpoint, None, Method::POST).await
    }
}

/// Billing/card fields plus `OrderProducts` and the numeric `PaymentType`.
fn payment_payload(
    payment: &PaymentInput,
    products: &[ProductLine],
) -> Result<Map<String, Value>, CrmError> {
    let payment_type = PaymentType::from_brand(&payment.credit_card_type)?;

    let mut data = transform_keys(&to_object(payment, "payment")?, &PAYMENT_FIELDS);
    data.insert("OrderProducts".to_owned(), order_products(products)?);
    data.insert("PaymentType".to_owned(), json!(payment_type.code()));
    Ok(data)
}

fn order_products(products: &[ProductLine]) -> Result<Value, CrmError> {
    products
        .iter()
        .map(|line| to_object(line, "product line").map(|obj| Value::Object(pascal_case_keys(obj))))
        .collect::<Result<Vec<_>, _>>()
        .map(Value::Array)
}
