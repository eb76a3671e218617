//! Key renaming between caller field names and ContinuityCRM field names.
//!
//! Outbound payloads are renamed through static [`FieldMap`] tables (top-level
//! keys only; unknown keys pass through). Inbound bodies are camelCased deeply
//! by [`normalize_response`].

use serde_json::{Map, Value};

/// A static rename table from caller field names to vendor field names.
///
/// Lookup is a partial function made total by the identity default: keys
/// missing from the table keep their name.
#[derive(Debug, Clone, Copy)]
pub struct FieldMap {
    entries: &'static [(&'static str, &'static str)],
}

impl FieldMap {
    #[must_use]
    pub const fn new(entries: &'static [(&'static str, &'static str)]) -> Self {
        Self { entries }
    }

    /// Vendor name for `key`, if the table renames it.
    #[must_use]
    pub fn vendor_name(&self, key: &str) -> Option<&'static str> {
        self.entries
            .iter()
            .find(|(from, _)| *from == key)
            .map(|(_, to)| *to)
    }

    #[must_use]
    pub fn entries(&self) -> &'static [(&'static str, &'static str)] {
        self.entries
    }
}

/// Partial (lead capture) fields.
pub const PARTIAL_FIELDS: FieldMap = FieldMap::new(&[
    ("firstName", "FirstName"),
    ("lastName", "LastName"),
    ("address1", "Address1"),
    ("address2", "Address2"),
    ("city", "City"),
    ("country", "Country"),
    ("state", "Province"),
    ("postalCode", "PostalCode"),
    ("phone", "Phone"),
    ("email", "Email"),
    ("affid", "AffiliateId"),
    ("sid", "SubId"),
    ("productId", "ProductId"),
    ("ip", "IPAddress"),
]);

/// Customer fields for a new order, sent as the shipping address.
pub const CUSTOMER_FIELDS: FieldMap = FieldMap::new(&[
    ("firstName", "ShippingFirstName"),
    ("lastName", "ShippingLastName"),
    ("address1", "ShippingAddress1"),
    ("address2", "ShippingAddress2"),
    ("city", "ShippingCity"),
    ("country", "ShippingCountry"),
    ("state", "ShippingProvince"),
    ("postalCode", "ShippingPostalCode"),
    ("phone", "Phone"),
    ("email", "Email"),
    ("affid", "AffiliateId"),
    ("sid", "SubId"),
    ("ip", "IPAddress"),
]);

/// Payment fields, sent as the billing address plus card details.
pub const PAYMENT_FIELDS: FieldMap = FieldMap::new(&[
    ("firstName", "BillingFirstName"),
    ("lastName", "BillingLastName"),
    ("address1", "BillingAddress1"),
    ("address2", "BillingAddress2"),
    ("city", "BillingCity"),
    ("country", "BillingCountry"),
    ("state", "BillingProvince"),
    ("postalCode", "BillingPostalCode"),
    ("cvv", "CreditCardCVV"),
    ("creditCardType", "PaymentType"),
    ("creditCardNumber", "CreditCardNumber"),
    ("expMonth", "CreditCardExpirationMonth"),
    ("expYear", "CreditCardExpirationYear"),
    ("shippingMethodId", "ShippingMethodId"),
]);

/// Renames the top-level keys of `obj` through `fields`. Values are cloned
/// untouched and nested objects are not visited.
#[must_use]
pub fn transform_keys(obj: &Map<String, Value>, fields: &FieldMap) -> Map<String, Value> {
    obj.iter()
        .map(|(key, value)| {
            let renamed = fields.vendor_name(key).unwrap_or(key.as_str());
            (renamed.to_owned(), value.clone())
        })
        .collect()
}

/// PascalCases the top-level keys of `obj` (`productId` -> `ProductId`).
#[must_use]
pub fn pascal_case_keys(obj: Map<String, Value>) -> Map<String, Value> {
    obj.into_iter()
        .map(|(key, value)| (to_pascal_case(&key), value))
        .collect()
}

/// camelCases every object key in `value`, descending into nested objects
/// and arrays.
#[must_use]
pub fn camel_case_keys_deep(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, inner)| (to_camel_case(&key), camel_case_keys_deep(inner)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(camel_case_keys_deep).collect()),
        other => other,
    }
}

/// Reshapes a decoded success body into the client's camelCase convention.
///
/// - array whose first element is an object: every element deep-camelCased
/// - any other array: unchanged
/// - object: deep-camelCased
/// - scalar or null: unchanged
#[must_use]
pub fn normalize_response(value: Value) -> Value {
    match value {
        Value::Array(items) if items.first().is_some_and(Value::is_object) => {
            Value::Array(items.into_iter().map(camel_case_keys_deep).collect())
        }
        Value::Object(_) => camel_case_keys_deep(value),
        other => other,
    }
}

#[must_use]
pub fn to_camel_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    for (i, word) in split_words(key).iter().enumerate() {
        let lower = word.to_lowercase();
        if i == 0 {
            out.push_str(&lower);
        } else {
            push_capitalized(&mut out, &lower);
        }
    }
    out
}

#[must_use]
pub fn to_pascal_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    for word in split_words(key) {
        push_capitalized(&mut out, &word.to_lowercase());
    }
    out
}

fn push_capitalized(out: &mut String, word: &str) {
    let mut chars = word.chars();
    if let Some(first) = chars.next() {
        out.extend(first.to_uppercase());
        out.push_str(chars.as_str());
    }
}

/// Splits an identifier into words on separators, lower-to-upper transitions,
/// digit-to-upper transitions and acronym ends (`IPAddress` -> `IP`, `Address`).
fn split_words(key: &str) -> Vec<String> {
    let chars: Vec<char> = key.chars().collect();
    let mut words = Vec::new();
    let mut current = String::new();

    for (i, &c) in chars.iter().enumerate() {
        if matches!(c, '_' | '-' | '.' | ' ') {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            continue;
        }

        if c.is_uppercase() && !current.is_empty() {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            if prev.is_lowercase()
                || prev.is_ascii_digit()
                || (prev.is_uppercase() && next_is_lower)
            {
                words.push(std::mem::take(&mut current));
            }
        }

        current.push(c);
    }

    if !current.is_empty() {
        words.push(current);
    }
    words
}

#[cfg(test)]
#[path = "transform_test.rs"]
mod tests;
