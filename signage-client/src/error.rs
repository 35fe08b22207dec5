//! Signage client error types
//!
//! One error enum shared by both protocol clients. The login state machines
//! classify transport and protocol failures into these kinds; raw reqwest or
//! serde errors never reach callers.

use thiserror::Error;

/// Maximum response body size for display HTTP calls (16 MB).
/// Prevents OOM from a misbehaving or misidentified endpoint.
pub const MAX_RESPONSE_SIZE: usize = 16 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum SignageError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP error {status} for {url}")]
    Http { status: reqwest::StatusCode, url: String },

    #[error("Protocol mismatch: {0}")]
    Protocol(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Captcha solve failed: {0}")]
    CaptchaSolve(String),

    #[error("Authentication rejected: {0}")]
    AuthRejected(String),

    #[error("Account or address restricted by the display")]
    AccountRestricted,

    #[error("Reference not found: {0}")]
    ReferenceNotFound(String),

    #[error("Not authenticated, call login() first")]
    NotAuthenticated,

    #[error("Unsupported on this display type: {0}")]
    Unsupported(String),

    #[error("Invalid header value: {0}")]
    InvalidHeader(String),

    #[error("Response too large ({size} bytes, max {MAX_RESPONSE_SIZE})")]
    ResponseTooLarge { size: u64 },
}

impl SignageError {
    /// Whether a login flow may retry after this failure.
    ///
    /// `AccountRestricted` is a lockout signal and must never be retried;
    /// `NotAuthenticated` and `ReferenceNotFound` are caller errors, not
    /// transient conditions.
    #[must_use]
    pub const fn retryable(&self) -> bool {
        matches!(
            self,
            Self::Network(_)
                | Self::Http { .. }
                | Self::CaptchaSolve(_)
                | Self::AuthRejected(_)
        )
    }
}

/// Check HTTP response status before processing body.
pub fn check_response(resp: reqwest::Response) -> Result<reqwest::Response, SignageError> {
    let status = resp.status();
    if status.is_client_error() || status.is_server_error() {
        return Err(SignageError::Http {
            status,
            url: resp.url().to_string(),
        });
    }
    Ok(resp)
}

/// Read a response body with size limit enforced.
///
/// Checks the `Content-Length` hint first (if available), then enforces the
/// limit on the actual body bytes.
pub async fn bytes_with_limit(response: reqwest::Response) -> Result<Vec<u8>, SignageError> {
    if let Some(cl) = response.content_length() {
        if cl as usize > MAX_RESPONSE_SIZE {
            return Err(SignageError::ResponseTooLarge { size: cl });
        }
    }
    let bytes = response.bytes().await?;
    if bytes.len() > MAX_RESPONSE_SIZE {
        return Err(SignageError::ResponseTooLarge {
            size: bytes.len() as u64,
        });
    }
    Ok(bytes.to_vec())
}

/// Read a response body with size limit and deserialize as JSON.
pub async fn json_with_limit<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, SignageError> {
    let bytes = bytes_with_limit(response).await?;
    serde_json::from_slice(&bytes).map_err(Into::into)
}

/// Read a response body with size limit as UTF-8 text (lossy).
///
/// Legacy displays answer the login POST with a bare text body.
pub async fn text_with_limit(response: reqwest::Response) -> Result<String, SignageError> {
    let bytes = bytes_with_limit(response).await?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

impl From<reqwest::Error> for SignageError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network(err.to_string())
    }
}

impl From<serde_json::Error> for SignageError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}

impl From<reqwest::header::InvalidHeaderValue> for SignageError {
    fn from(err: reqwest::header::InvalidHeaderValue) -> Self {
        Self::InvalidHeader(err.to_string())
    }
}
