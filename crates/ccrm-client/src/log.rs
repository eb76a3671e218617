//! Per-call log records and the sink they are delivered to.

use std::panic::{catch_unwind, AssertUnwindSafe};

use serde::Serialize;
use serde_json::Value;

/// Vendor keys whose values never reach a log line.
const CARD_KEYS: &[&str] = &["CreditCardNumber", "CreditCardCVV"];

/// One completed (or failed) exchange with the vendor.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogRecord {
    pub endpoint: String,
    pub request_body: Value,
    pub response_body: Value,
    /// Milliseconds from just before send until the body was buffered.
    pub latency: f64,
    /// `None` when the request failed before any response arrived.
    pub http_response_code: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub info: Option<String>,
}

/// Receives exactly one [`LogRecord`] per client call.
///
/// Implemented for any `Fn(&LogRecord) + Send + Sync` closure.
pub trait CrmLogger: Send + Sync {
    fn log(&self, record: &LogRecord);
}

impl<F> CrmLogger for F
where
    F: Fn(&LogRecord) + Send + Sync,
{
    fn log(&self, record: &LogRecord) {
        self(record);
    }
}

/// Default sink: discards every record.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopLogger;

impl CrmLogger for NoopLogger {
    fn log(&self, _record: &LogRecord) {}
}

/// Forwards records as `tracing` events. Bodies are only attached at debug
/// level, with card number and CVV masked.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogger;

impl CrmLogger for TracingLogger {
    fn log(&self, record: &LogRecord) {
        tracing::info!(
            endpoint = %record.endpoint,
            latency_ms = record.latency,
            http_status = ?record.http_response_code,
            info = record.info.as_deref().unwrap_or(""),
            "ContinuityCRM call completed"
        );
        tracing::debug!(
            endpoint = %record.endpoint,
            request_body = %mask_card_data(&record.request_body),
            response_body = %mask_card_data(&record.response_body),
            "ContinuityCRM call bodies"
        );
    }
}

/// Copy of `value` with every card number and CVV replaced, at any depth.
pub(crate) fn mask_card_data(value: &Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| {
                    let masked = if CARD_KEYS.contains(&k.as_str()) {
                        Value::String("[redacted]".to_owned())
                    } else {
                        mask_card_data(v)
                    };
                    (k.clone(), masked)
                })
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(mask_card_data).collect()),
        other => other.clone(),
    }
}

/// Hands `record` to `logger`, containing any panic so the call outcome is
/// never affected by the sink.
pub(crate) fn emit(logger: &dyn CrmLogger, record: &LogRecord) {
    if catch_unwind(AssertUnwindSafe(|| logger.log(record))).is_err() {
        tracing::warn!(
            endpoint = %record.endpoint,
            "ContinuityCRM logger panicked; record dropped"
        );
    }
}
