//! Display type auto-detection
//!
//! Probes a host across a short, fixed-priority list of (port, type)
//! candidates and classifies it by the shape of its login endpoints. Probe
//! failures are fallthrough, never fatal: detection exists to spare callers
//! from pinning a type, not to gate explicitly pinned configurations.

use serde_json::Value;
use tracing::debug;

use crate::error::{json_with_limit, SignageError};
use crate::transport::{Session, TransportConfig};

/// API variant a display speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayType {
    /// JSON REST login/control API.
    Modern,
    /// Form-based HTML login plus a Socket.io push channel.
    Legacy,
}

impl DisplayType {
    /// Standard port for this variant.
    #[must_use]
    pub const fn default_port(self) -> u16 {
        match self {
            Self::Modern => DEFAULT_MODERN_PORT,
            Self::Legacy => DEFAULT_LEGACY_PORT,
        }
    }
}

/// Resolved display identity; immutable once produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayIdentity {
    pub display_type: DisplayType,
    pub port: u16,
}

pub const DEFAULT_MODERN_PORT: u16 = 3777;
pub const DEFAULT_LEGACY_PORT: u16 = 443;

/// Probe order: modern candidates first, then legacy on the shared port.
pub const DETECT_CANDIDATES: [(u16, DisplayType); 3] = [
    (DEFAULT_MODERN_PORT, DisplayType::Modern),
    (443, DisplayType::Modern),
    (DEFAULT_LEGACY_PORT, DisplayType::Legacy),
];

/// Display type detector with short per-probe timeouts.
pub struct Detector {
    transport: TransportConfig,
}

impl Detector {
    #[must_use]
    pub fn new(transport: &TransportConfig) -> Self {
        Self {
            transport: transport.for_probe(),
        }
    }

    /// Classify a host over the standard candidate list.
    ///
    /// The first candidate whose discriminant matches wins; remaining
    /// candidates are never probed. Exhaustion defaults to modern on its
    /// standard port rather than failing.
    pub async fn detect(&self, host: &str) -> DisplayIdentity {
        self.detect_with_candidates(host, &DETECT_CANDIDATES).await
    }

    /// Classify a host over an explicit candidate list, in order.
    pub async fn detect_with_candidates(
        &self,
        host: &str,
        candidates: &[(u16, DisplayType)],
    ) -> DisplayIdentity {
        for &(port, display_type) in candidates {
            let matched = match display_type {
                DisplayType::Modern => self.probe_modern(host, port).await,
                DisplayType::Legacy => self.probe_legacy(host, port).await,
            };
            match matched {
                Ok(true) => {
                    debug!(host, port, ?display_type, "display type detected");
                    return DisplayIdentity { display_type, port };
                }
                Ok(false) => {}
                Err(e) => {
                    debug!(host, port, ?display_type, error = %e, "probe failed");
                }
            }
        }

        debug!(host, "detection exhausted, defaulting to modern");
        DisplayIdentity {
            display_type: DisplayType::Modern,
            port: DEFAULT_MODERN_PORT,
        }
    }

    /// Modern discriminant: the login-status route answers, and the captcha
    /// text route returns JSON carrying both `status` and `message` fields.
    /// Legacy firmware answers that path with HTML, never this shape.
    async fn probe_modern(&self, host: &str, port: u16) -> Result<bool, SignageError> {
        let session = Session::new(host, port, &self.transport)?;
        let resp = session
            .client()
            .get(session.url("/login/status"))
            .send()
            .await?;
        if !resp.status().is_success() {
            return Ok(false);
        }

        let resp = session
            .client()
            .get(session.url("/login/captchaText"))
            .send()
            .await?;
        // 404 carries the discriminant JSON too ("not exist captcha session").
        let status = resp.status();
        if !(status.is_success() || status == reqwest::StatusCode::NOT_FOUND) {
            return Ok(false);
        }
        let body: Value = match json_with_limit(resp).await {
            Ok(v) => v,
            Err(_) => return Ok(false),
        };
        Ok(body.get("status").is_some() && body.get("message").is_some())
    }

    /// Legacy discriminant: the login page is HTML and the captcha image
    /// route exists (404 still proves the route, just no active captcha).
    async fn probe_legacy(&self, host: &str, port: u16) -> Result<bool, SignageError> {
        let session = Session::new(host, port, &self.transport)?;
        let resp = session.client().get(session.url("/login")).send().await?;
        if !resp.status().is_success() {
            return Ok(false);
        }
        let is_html = resp
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.contains("text/html"));
        if !is_html {
            return Ok(false);
        }

        let resp = session
            .client()
            .get(session.url("/request/captchapng"))
            .send()
            .await?;
        let status = resp.status();
        Ok(status.is_success() || status == reqwest::StatusCode::NOT_FOUND)
    }
}
