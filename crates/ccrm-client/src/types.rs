//! Request inputs and response records for the ContinuityCRM API.
//!
//! Inputs serialize with camelCase names and are then renamed to vendor
//! names by the tables in [`crate::transform`]. Every input carries an
//! `extra` map whose keys are forwarded verbatim, so fields the client does
//! not model can still reach the API.
//!
//! Response records deserialize from bodies that have already been
//! camelCased by [`crate::transform::normalize_response`].

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// Lead/contact details captured before payment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialInput {
    pub first_name: String,
    pub last_name: String,
    pub address1: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address2: Option<String>,
    pub city: String,
    pub country: String,
    /// Province or state code, e.g. `US-NY`.
    pub state: String,
    pub postal_code: String,
    pub phone: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub affid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sid: Option<String>,
    pub product_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Customer (shipping) details for a new order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerInput {
    pub first_name: String,
    pub last_name: String,
    pub address1: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address2: Option<String>,
    pub city: String,
    pub country: String,
    pub state: String,
    pub postal_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub affid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Billing address and card details.
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentInput {
    pub first_name: String,
    pub last_name: String,
    pub address1: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address2: Option<String>,
    pub city: String,
    pub country: String,
    pub state: String,
    pub postal_code: String,
    pub cvv: String,
    /// Card brand name; resolved through [`crate::PaymentType::from_brand`].
    pub credit_card_type: String,
    pub credit_card_number: String,
    pub exp_month: u32,
    pub exp_year: u32,
    pub shipping_method_id: i64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl std::fmt::Debug for PaymentInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaymentInput")
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("country", &self.country)
            .field("credit_card_type", &self.credit_card_type)
            .field("credit_card_number", &"[redacted]")
            .field("cvv", &"[redacted]")
            .field("shipping_method_id", &self.shipping_method_id)
            .finish_non_exhaustive()
    }
}

/// One product line on an order, upsell or order-product update.
///
/// Serialized keys are PascalCased before sending (`productId` -> `ProductId`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductLine {
    pub product_id: i64,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub promo_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rebill_discount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount_cycle_count: Option<u32>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ProductLine {
    #[must_use]
    pub fn new(product_id: i64, quantity: u32) -> Self {
        Self {
            product_id,
            quantity,
            ..Self::default()
        }
    }
}

impl From<&OrderProduct> for ProductLine {
    /// Carries an existing order product into an update, keeping the
    /// rebilling fields (`nextDate`, `nextProductId`, `billValue`, ...) in `extra`.
    fn from(product: &OrderProduct) -> Self {
        let mut extra = product.extra.clone();
        if let Some(next_date) = &product.next_date {
            extra.insert("nextDate".to_owned(), Value::String(next_date.clone()));
        }
        if let Some(next_product_id) = product.next_product_id {
            extra.insert("nextProductId".to_owned(), Value::from(next_product_id));
        }
        if let Some(bill_value) = product.bill_value {
            extra.insert("billValue".to_owned(), Value::from(bill_value));
        }
        Self {
            product_id: product.product_id,
            quantity: product.quantity,
            price: product.price,
            extra,
            ..Self::default()
        }
    }
}

/// Search criteria for `orders/find`. The date range is required.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSearch {
    #[serde(serialize_with = "iso_millis")]
    pub from_date: DateTime<Utc>,
    #[serde(serialize_with = "iso_millis")]
    pub to_date: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub affiliate_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipped: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address2: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rma: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bin: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_four: Option<u32>,
    /// Include order-product rebilling details in each result.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_view: Option<bool>,
}

impl OrderSearch {
    #[must_use]
    pub fn new(from_date: DateTime<Utc>, to_date: DateTime<Utc>) -> Self {
        Self {
            from_date,
            to_date,
            status: None,
            product_id: None,
            order_id: None,
            affiliate_id: None,
            customer_id: None,
            shipped: None,
            address: None,
            address2: None,
            first_name: None,
            last_name: None,
            sub_id: None,
            email: None,
            city: None,
            zip: None,
            phone: None,
            state: None,
            country: None,
            transaction_id: None,
            rma: None,
            ip: None,
            bin: None,
            last_four: None,
            order_view: None,
        }
    }
}

/// `2020-04-01T12:00:00.000Z`
fn iso_millis<S: Serializer>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&date.to_rfc3339_opts(SecondsFormat::Millis, true))
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

/// An order record as returned by order creation, lookup and search.
///
/// Vendor timestamps are kept as the strings the API sends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub order_id: i64,
    #[serde(default)]
    pub created: Option<String>,
    #[serde(default)]
    pub is_test: Option<bool>,
    #[serde(default)]
    pub is_prepaid: Option<bool>,
    #[serde(default)]
    pub shipped: Option<bool>,
    #[serde(default)]
    pub customer_id: Option<i64>,
    #[serde(default)]
    pub shipping_first_name: Option<String>,
    #[serde(default)]
    pub shipping_last_name: Option<String>,
    #[serde(default)]
    pub shipping_address1: Option<String>,
    #[serde(default)]
    pub shipping_address2: Option<String>,
    #[serde(default)]
    pub shipping_city: Option<String>,
    #[serde(default)]
    pub shipping_province: Option<String>,
    #[serde(default)]
    pub shipping_postal_code: Option<String>,
    #[serde(default)]
    pub shipping_country: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub billing_first_name: Option<String>,
    #[serde(default)]
    pub billing_last_name: Option<String>,
    #[serde(default)]
    pub billing_address1: Option<String>,
    #[serde(default)]
    pub billing_address2: Option<String>,
    #[serde(default)]
    pub billing_city: Option<String>,
    #[serde(default)]
    pub billing_province: Option<String>,
    #[serde(default)]
    pub billing_postal_code: Option<String>,
    #[serde(default)]
    pub billing_country: Option<String>,
    #[serde(default)]
    pub shipping_method_id: Option<i64>,
    #[serde(default)]
    pub processor_id: Option<i64>,
    #[serde(default)]
    pub affiliate_id: Option<String>,
    #[serde(default)]
    pub sub_id: Option<String>,
    #[serde(default)]
    pub chargeback_date: Option<String>,
    #[serde(default)]
    pub parent_id: Option<i64>,
    #[serde(default)]
    pub status: Option<i32>,
    #[serde(default)]
    pub ip_address: Option<String>,
    #[serde(default)]
    pub sub_total: Option<f64>,
    #[serde(default)]
    pub tax: Option<f64>,
    #[serde(default)]
    pub shipping_price: Option<f64>,
    #[serde(default)]
    pub total: Option<f64>,
    #[serde(default)]
    pub depth: Option<i32>,
    #[serde(default)]
    pub order_products: Vec<OrderProduct>,
    /// Fields the client does not model, camelCased.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A product line inside an [`Order`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderProduct {
    pub product_id: i64,
    pub quantity: u32,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub product_name: Option<String>,
    #[serde(default)]
    pub currency_in_iso4217_format: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
    /// Next rebill date; present when searched with `order_view`.
    #[serde(default)]
    pub next_date: Option<String>,
    #[serde(default)]
    pub next_product_id: Option<i64>,
    /// Days between rebills.
    #[serde(default)]
    pub bill_value: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
