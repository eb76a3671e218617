//! Typed async client for the ContinuityCRM order API.
//!
//! [`CrmClient`] maps each operation onto one vendor endpoint, renaming
//! payload keys to the vendor's PascalCase names on the way out and
//! camelCasing response keys on the way back. Every call delivers exactly
//! one [`LogRecord`] to the configured [`CrmLogger`].

mod catalog;
mod classify;
pub mod client;
pub mod error;
pub mod log;
mod orders;
mod partials;
pub mod payment;
pub mod rebill;
pub mod transform;
pub mod types;

pub use ccrm_core::ClientConfig;
pub use client::CrmClient;
pub use error::{CrmError, CrmErrorKind, CrmFailure, OperationalFailure};
pub use log::{CrmLogger, LogRecord, NoopLogger, TracingLogger};
pub use payment::PaymentType;
pub use rebill::{apply_rebill_discount, rebill_discount};
pub use reqwest::Method;
pub use transform::{FieldMap, CUSTOMER_FIELDS, PARTIAL_FIELDS, PAYMENT_FIELDS};
pub use types::{
    CustomerInput, Order, OrderProduct, OrderSearch, PartialInput, PaymentInput, ProductLine,
};
