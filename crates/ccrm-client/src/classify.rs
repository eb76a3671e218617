//! Turns a buffered HTTP response into a normalized value or a typed error.
//!
//! The body is buffered once by the caller; the JSON attempt and the
//! raw-text fallback both read from that buffer.

use reqwest::StatusCode;
use serde_json::{json, Value};

use crate::error::{CrmError, CrmErrorKind, CrmFailure, OperationalFailure};
use crate::transform::normalize_response;

/// Key whose presence marks an ASP.NET-style validation body.
const MODEL_STATE_KEY: &str = "ModelState";

/// Everything the caller needs to log the exchange and answer the call.
#[derive(Debug)]
pub(crate) struct Classified {
    /// Body to record in the log: the decoded JSON, or a placeholder.
    pub response_body: Value,
    pub info: Option<String>,
    pub result: Result<Value, CrmError>,
}

/// Placeholder recorded when a body cannot be decoded.
pub(crate) fn bogus_response(raw: &str) -> Value {
    json!({ "bogusResponse": raw })
}

pub(crate) fn classify_response(
    endpoint: &str,
    status: StatusCode,
    body: &[u8],
    request_body: &Value,
) -> Classified {
    let decoded = serde_json::from_slice::<Value>(body);

    if status.is_success() {
        return match decoded {
            Ok(json) => Classified {
                result: Ok(normalize_response(json.clone())),
                response_body: json,
                info: None,
            },
            Err(source) => {
                let raw = String::from_utf8_lossy(body);
                tracing::debug!(endpoint, raw = %raw, "non-JSON body on successful response");
                Classified {
                    response_body: bogus_response(&raw),
                    info: Some(format!("invalid JSON in successful response: {source}")),
                    result: Err(CrmError::Decode {
                        endpoint: endpoint.to_owned(),
                        source,
                    }),
                }
            }
        };
    }

    match decoded {
        Ok(json) => {
            let kind = if status == StatusCode::PAYMENT_REQUIRED {
                CrmErrorKind::OrderDecline
            } else {
                CrmErrorKind::Rejected
            };
            let failure = CrmFailure {
                kind,
                message: error_message(&json, status),
                status: status.as_u16(),
                request_body: request_body.clone(),
                response_body: json.clone(),
            };
            Classified {
                response_body: json,
                info: None,
                result: Err(CrmError::Crm(Box::new(failure))),
            }
        }
        Err(source) => {
            let raw = String::from_utf8_lossy(body).into_owned();
            tracing::debug!(endpoint, raw = %raw, error = %source, "non-JSON error body");
            let placeholder = bogus_response(&raw);
            let failure = OperationalFailure {
                message: raw,
                status: Some(status.as_u16()),
                request_body: request_body.clone(),
                response_body: placeholder.clone(),
                source: None,
            };
            Classified {
                response_body: placeholder,
                info: Some(format!("invalid JSON in error response: {source}")),
                result: Err(CrmError::Operational(Box::new(failure))),
            }
        }
    }
}

/// Picks the text for a domain error.
///
/// With a `ModelState` body this is the first message of the first field
/// (falling back to the top-level `Message`); otherwise the HTTP reason phrase.
fn error_message(body: &Value, status: StatusCode) -> String {
    if let Some(model_state) = body.get(MODEL_STATE_KEY) {
        if let Some(message) = first_validation_message(model_state) {
            return message;
        }
        if let Some(message) = body.get("Message").and_then(Value::as_str) {
            return message.to_owned();
        }
    }
    status
        .canonical_reason()
        .unwrap_or("Unknown Status")
        .to_owned()
}

fn first_validation_message(model_state: &Value) -> Option<String> {
    let (_, messages) = model_state.as_object()?.iter().next()?;
    let first = match messages {
        Value::Array(items) => items.first()?,
        other => other,
    };
    match first {
        Value::String(s) => Some(s.clone()),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}
