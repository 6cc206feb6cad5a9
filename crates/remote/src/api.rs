//! Shared HTTP plumbing for the remote service clients.
//!
//! Both backends talk JSON over [`reqwest`] and wrap their payloads in a
//! `{ "data": ... }` envelope. Status checking and envelope decoding live
//! here so each client only describes its endpoints.

use std::time::Duration;

use serde::de::DeserializeOwned;

use crate::credential::CredentialError;
use crate::schema;

/// Errors from the remote API layer.
#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The service returned a non-2xx status code.
    #[error("Remote API error ({status}): {body}")]
    ApiError {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The body was valid HTTP but not the shape the endpoint promises.
    #[error("Malformed response from {endpoint}: {message}")]
    Schema {
        endpoint: &'static str,
        message: String,
    },

    /// A bearer token could not be produced.
    #[error("Credential error: {0}")]
    Credential(#[from] CredentialError),
}

impl RemoteError {
    pub(crate) fn schema(endpoint: &'static str, message: impl Into<String>) -> Self {
        RemoteError::Schema {
            endpoint,
            message: message.into(),
        }
    }
}

/// Build the shared HTTP client with a per-request timeout.
pub fn build_http_client(timeout: Duration) -> Result<reqwest::Client, RemoteError> {
    Ok(reqwest::Client::builder().timeout(timeout).build()?)
}

/// Ensure the response has a success status code. Returns the response
/// unchanged on success, or a [`RemoteError::ApiError`] containing the
/// status and body text on failure.
pub async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, RemoteError> {
    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());
        return Err(RemoteError::ApiError {
            status: status.as_u16(),
            body,
        });
    }
    Ok(response)
}

/// Check the status, then decode the `data` member of the JSON envelope.
pub async fn read_envelope<T: DeserializeOwned>(
    endpoint: &'static str,
    response: reqwest::Response,
) -> Result<T, RemoteError> {
    let response = ensure_success(response).await?;
    let body = response.bytes().await?;
    schema::parse_envelope(endpoint, &body)
}

/// Strip trailing slashes so paths can be appended with a leading `/`.
pub(crate) fn normalize_base_url(url: impl Into<String>) -> String {
    let url = url.into();
    url.trim_end_matches('/').to_string()
}
