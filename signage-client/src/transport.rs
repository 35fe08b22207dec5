//! Cookie-bearing session transport
//!
//! Each [`Session`] owns its own `reqwest::Client` and cookie jar. Captchas
//! are bound to the cookie jar on the display side, so sessions are never
//! shared or pooled across login attempts; a retry constructs a whole new
//! `Session` and starts from a clean jar.

use std::sync::Arc;
use std::time::Duration;

use reqwest::cookie::Jar;
use reqwest::Client;

use crate::error::SignageError;

/// Transport-level configuration, fixed at session construction.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// URL scheme; displays speak HTTPS with self-signed certificates.
    pub scheme: String,
    /// Accept the displays' self-signed TLS certificates.
    ///
    /// This is a deliberate trust decision scoped to this client, replacing
    /// any process-wide verification opt-out.
    pub accept_invalid_certs: bool,
    pub connect_timeout: Duration,
    pub timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            scheme: "https".to_string(),
            accept_invalid_certs: true,
            connect_timeout: Duration::from_secs(10),
            timeout: Duration::from_secs(30),
        }
    }
}

impl TransportConfig {
    /// Variant with short timeouts for detection probes.
    #[must_use]
    pub fn for_probe(&self) -> Self {
        Self {
            connect_timeout: Duration::from_secs(3),
            timeout: Duration::from_secs(3),
            ..self.clone()
        }
    }
}

/// One cookie-bearing HTTP session against one display.
pub struct Session {
    client: Client,
    base_url: String,
}

impl Session {
    /// Create a session with a fresh cookie jar.
    pub fn new(host: &str, port: u16, config: &TransportConfig) -> Result<Self, SignageError> {
        let jar = Arc::new(Jar::default());
        let client = Client::builder()
            .cookie_provider(jar)
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .connect_timeout(config.connect_timeout)
            .timeout(config.timeout)
            .build()
            .map_err(|e| SignageError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: format!("{}://{host}:{port}", config.scheme),
        })
    }

    #[must_use]
    pub fn client(&self) -> &Client {
        &self.client
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for an endpoint path (`path` must start with `/`).
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

/// Millisecond timestamp used to defeat captcha caching.
#[must_use]
pub fn cache_buster_ms() -> String {
    chrono::Utc::now().timestamp_millis().to_string()
}
