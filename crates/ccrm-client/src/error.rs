use std::fmt;

use serde_json::Value;
use thiserror::Error;

/// Distinguishes an ordinary vendor rejection from a declined payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrmErrorKind {
    /// Validation failure or business rule rejection.
    Rejected,
    /// HTTP 402: the vendor declined the payment for the order.
    OrderDecline,
}

impl fmt::Display for CrmErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CrmErrorKind::Rejected => write!(f, "rejected the request"),
            CrmErrorKind::OrderDecline => write!(f, "declined the order"),
        }
    }
}

/// The vendor answered with a non-2xx status and a JSON body.
#[derive(Debug, Error)]
#[error("ContinuityCRM {kind} (HTTP {status}): {message}")]
pub struct CrmFailure {
    pub kind: CrmErrorKind,
    pub message: String,
    pub status: u16,
    pub request_body: Value,
    pub response_body: Value,
}

/// The exchange failed below the business layer: the connection broke or the
/// error body was not JSON.
///
/// `response_body` is always a `{"bogusResponse": <raw text>}` placeholder.
#[derive(Debug, Error)]
#[error("ContinuityCRM operational error: {message}")]
pub struct OperationalFailure {
    pub message: String,
    /// `None` when the request never produced a response.
    pub status: Option<u16>,
    pub request_body: Value,
    pub response_body: Value,
    #[source]
    pub source: Option<reqwest::Error>,
}

/// Errors returned by the ContinuityCRM client.
#[derive(Debug, Error)]
pub enum CrmError {
    /// Domain error: the vendor actively rejected the request.
    #[error(transparent)]
    Crm(Box<CrmFailure>),

    /// Operational error: transport failure or malformed error body.
    #[error(transparent)]
    Operational(Box<OperationalFailure>),

    /// A 2xx response whose body was not valid JSON. The decode error is
    /// passed through as-is.
    #[error("invalid JSON in successful response from {endpoint}: {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },

    /// The normalized response did not match the expected record shape.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// A request payload could not be converted to a JSON object.
    #[error("could not encode {context} as a JSON object")]
    Encode { context: String },

    #[error("unknown payment type: {0:?}")]
    UnknownPaymentType(String),

    #[error("invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("API key contains characters that cannot be sent in a header")]
    InvalidApiKey,

    /// The underlying `reqwest::Client` could not be built.
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}

impl CrmError {
    /// `true` for vendor rejections, including order declines.
    #[must_use]
    pub fn is_domain(&self) -> bool {
        matches!(self, CrmError::Crm(_))
    }

    #[must_use]
    pub fn is_operational(&self) -> bool {
        matches!(self, CrmError::Operational(_))
    }

    /// `true` when the vendor answered HTTP 402.
    #[must_use]
    pub fn is_order_decline(&self) -> bool {
        matches!(self, CrmError::Crm(f) if f.kind == CrmErrorKind::OrderDecline)
    }

    /// HTTP status of the exchange, when one was received.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            CrmError::Crm(f) => Some(f.status),
            CrmError::Operational(f) => f.status,
            _ => None,
        }
    }

    #[must_use]
    pub fn request_body(&self) -> Option<&Value> {
        match self {
            CrmError::Crm(f) => Some(&f.request_body),
            CrmError::Operational(f) => Some(&f.request_body),
            _ => None,
        }
    }

    #[must_use]
    pub fn response_body(&self) -> Option<&Value> {
        match self {
            CrmError::Crm(f) => Some(&f.response_body),
            CrmError::Operational(f) => Some(&f.response_body),
            _ => None,
        }
    }
}
