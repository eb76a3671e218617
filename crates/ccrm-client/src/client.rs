//! HTTP client for the ContinuityCRM REST API.
//!
//! Wraps `reqwest` with the vendor's header set, payload placement (JSON body
//! or query string), latency measurement, response classification and the
//! per-call log record. There is no retry: every call is exactly one request.

use std::sync::Arc;
use std::time::{Duration, Instant};

use ccrm_core::ClientConfig;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::{Client, Method, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::classify::{bogus_response, classify_response};
use crate::error::{CrmError, OperationalFailure};
use crate::log::{emit, CrmLogger, LogRecord, NoopLogger};

/// Sent as `APIKey`; header names are case-insensitive on the wire.
const API_KEY_HEADER: &str = "apikey";

/// Client for the ContinuityCRM REST API.
///
/// Holds an immutable `reqwest::Client`, the API root, and the log sink; safe
/// to share across tasks. Use [`CrmClient::new`] for a silent client or
/// [`CrmClient::with_logger`] to receive a [`LogRecord`] for every call.
pub struct CrmClient {
    client: Client,
    base_url: Url,
    logger: Arc<dyn CrmLogger>,
}

impl CrmClient {
    /// Creates a client that discards its log records.
    ///
    /// # Errors
    ///
    /// See [`CrmClient::with_logger`].
    pub fn new(config: &ClientConfig) -> Result<Self, CrmError> {
        Self::with_logger(config, NoopLogger)
    }

    /// Creates a client that reports every call to `logger`.
    ///
    /// # Errors
    ///
    /// - [`CrmError::InvalidApiKey`] if the key cannot be sent as a header.
    /// - [`CrmError::InvalidUrl`] if `config.base_url` is not a valid URL.
    /// - [`CrmError::Http`] if the underlying `reqwest::Client` cannot be built.
    pub fn with_logger(
        config: &ClientConfig,
        logger: impl CrmLogger + 'static,
    ) -> Result<Self, CrmError> {
        let mut api_key =
            HeaderValue::from_str(&config.api_key).map_err(|_| CrmError::InvalidApiKey)?;
        api_key.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(HeaderName::from_static(API_KEY_HEADER), api_key);

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(config.user_agent.as_str())
            .build()?;

        // Exactly one trailing slash, so endpoints join under the API root
        // instead of replacing its last path segment.
        let normalised = format!("{}/", config.base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| CrmError::InvalidUrl {
            url: config.base_url.clone(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            base_url,
            logger: Arc::new(logger),
        })
    }

    /// Sends one request to `endpoint` and returns the camelCased response.
    ///
    /// `GET` carries `payload` as query parameters; every other method sends
    /// it as a JSON body (`{}` when absent). Exactly one [`LogRecord`] is
    /// delivered before this returns, whatever the outcome.
    ///
    /// # Errors
    ///
    /// - [`CrmError::Crm`] when the vendor answers non-2xx with a JSON body
    ///   (`OrderDecline` for 402).
    /// - [`CrmError::Operational`] on transport failure or a non-JSON error body.
    /// - [`CrmError::Decode`] when a 2xx body is not JSON.
    /// - [`CrmError::InvalidUrl`] if `endpoint` does not form a valid URL.
    pub async fn request(
        &self,
        endpoint: &str,
        payload: Option<Value>,
        method: Method,
    ) -> Result<Value, CrmError> {
        let request_body = payload.unwrap_or(Value::Null);

        let query = if method == Method::GET {
            query_pairs(&request_body)
        } else {
            Vec::new()
        };
        let url = self.endpoint_url(endpoint, &query)?;

        let mut builder = self.client.request(method.clone(), url);
        if method != Method::GET {
            let body = match &request_body {
                Value::Null => Value::Object(Map::new()),
                other => other.clone(),
            };
            builder = builder.body(body.to_string());
        }

        tracing::debug!(endpoint, %method, "ContinuityCRM request");

        let started = Instant::now();
        let response = match builder.send().await {
            Ok(response) => response,
            Err(e) => {
                return Err(self.transport_failure(endpoint, request_body, None, started, e));
            }
        };
        let status = response.status();
        let body = match response.bytes().await {
            Ok(body) => body,
            Err(e) => {
                return Err(self.transport_failure(
                    endpoint,
                    request_body,
                    Some(status),
                    started,
                    e,
                ));
            }
        };
        let latency = elapsed_ms(started);

        tracing::debug!(
            endpoint,
            status = status.as_u16(),
            latency_ms = latency,
            "ContinuityCRM response"
        );

        let classified = classify_response(endpoint, status, &body, &request_body);
        emit(
            self.logger.as_ref(),
            &LogRecord {
                endpoint: endpoint.to_owned(),
                request_body,
                response_body: classified.response_body,
                latency,
                http_response_code: Some(status.as_u16()),
                info: classified.info,
            },
        );
        classified.result
    }

    /// [`CrmClient::request`] followed by deserialization into `T`.
    pub(crate) async fn request_as<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        payload: Option<Value>,
        method: Method,
    ) -> Result<T, CrmError> {
        let context = format!("{method} {endpoint}");
        let value = self.request(endpoint, payload, method).await?;
        serde_json::from_value(value).map_err(|e| CrmError::Deserialize { context, source: e })
    }

    /// Joins `endpoint` onto the API root and appends `query` pairs.
    ///
    /// Ids interpolated into `endpoint` are not escaped.
    pub(crate) fn endpoint_url(
        &self,
        endpoint: &str,
        query: &[(String, String)],
    ) -> Result<Url, CrmError> {
        let mut url = self
            .base_url
            .join(endpoint)
            .map_err(|e| CrmError::InvalidUrl {
                url: format!("{}{endpoint}", self.base_url),
                reason: e.to_string(),
            })?;
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in query {
                pairs.append_pair(k, v);
            }
        }
        Ok(url)
    }

    /// Logs and builds the error for a request that produced no usable response.
    fn transport_failure(
        &self,
        endpoint: &str,
        request_body: Value,
        status: Option<StatusCode>,
        started: Instant,
        source: reqwest::Error,
    ) -> CrmError {
        let latency = elapsed_ms(started);
        let message = source.to_string();
        let placeholder = bogus_response(&message);

        tracing::debug!(endpoint, error = %source, "ContinuityCRM transport failure");

        emit(
            self.logger.as_ref(),
            &LogRecord {
                endpoint: endpoint.to_owned(),
                request_body: request_body.clone(),
                response_body: placeholder.clone(),
                latency,
                http_response_code: status.map(|s| s.as_u16()),
                info: Some(format!("transport error: {message}")),
            },
        );

        CrmError::Operational(Box::new(OperationalFailure {
            message,
            status: status.map(|s| s.as_u16()),
            request_body,
            response_body: placeholder,
            source: Some(source),
        }))
    }
}

impl std::fmt::Debug for CrmClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CrmClient")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

fn elapsed_ms(started: Instant) -> f64 {
    started.elapsed().as_secs_f64() * 1_000.0
}

/// Converts a serializable input into a JSON object.
pub(crate) fn to_object<T: Serialize>(
    value: &T,
    context: &str,
) -> Result<Map<String, Value>, CrmError> {
    match serde_json::to_value(value) {
        Ok(Value::Object(map)) => Ok(map),
        _ => Err(CrmError::Encode {
            context: context.to_owned(),
        }),
    }
}

/// Flattens a payload object into query-string pairs.
///
/// Strings are sent as-is, other scalars in their JSON form, `null` and
/// nested objects as empty values, and arrays as one pair per element.
/// Anything other than an object yields no pairs.
pub(crate) fn query_pairs(payload: &Value) -> Vec<(String, String)> {
    let Value::Object(map) = payload else {
        return Vec::new();
    };

    let mut pairs = Vec::with_capacity(map.len());
    for (key, value) in map {
        match value {
            Value::Array(items) => {
                pairs.extend(items.iter().map(|item| (key.clone(), query_value(item))));
            }
            other => pairs.push((key.clone(), query_value(other))),
        }
    }
    pairs
}

fn query_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Bool(_) | Value::Number(_) => value.to_string(),
        Value::Null | Value::Array(_) | Value::Object(_) => String::new(),
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
