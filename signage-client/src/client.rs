//! Unified signage client
//!
//! Composes the detector and both protocol clients behind one login/play
//! API. After `login()` the client holds a [`DisplayFlow`] variant for the
//! resolved display type; every operation dispatches by exhaustive match on
//! that variant.

use std::sync::Arc;

use serde_json::Value;
use tracing::info;

use crate::captcha::{CaptchaSolver, NoSolver, PromptSolver};
use crate::detect::{Detector, DisplayIdentity, DisplayType};
use crate::error::SignageError;
use crate::legacy::LegacyClient;
use crate::modern::types::ALL_MEDIA_TYPES;
use crate::modern::{MediaEntry, MediaType, ModernClient, StorageDevice};
use crate::transport::TransportConfig;

/// Configuration for a [`SignageClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub host: String,
    pub password: String,
    /// Pinned port. Identity detection runs unless both `port` and
    /// `display_type` are pinned.
    pub port: Option<u16>,
    /// Pinned display type.
    pub display_type: Option<DisplayType>,
    pub transport: TransportConfig,
    /// Attempt budget for the legacy captcha/login loop.
    pub max_login_attempts: usize,
    /// Consult an interactive prompt after automated captcha solving fails.
    pub interactive_captcha: bool,
}

impl ClientConfig {
    #[must_use]
    pub fn new(host: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            password: password.into(),
            port: None,
            display_type: None,
            transport: TransportConfig::default(),
            max_login_attempts: 5,
            interactive_captcha: false,
        }
    }
}

/// The protocol flow resolved for this client, one variant per display type.
enum DisplayFlow {
    Modern(ModernClient),
    Legacy(LegacyClient),
}

/// Unified client for modern and legacy displays.
pub struct SignageClient {
    config: ClientConfig,
    solver: Arc<dyn CaptchaSolver>,
    identity: Option<DisplayIdentity>,
    flow: Option<DisplayFlow>,
}

impl SignageClient {
    /// Client without an automated captcha solver; legacy logins will rely
    /// on the interactive fallback if enabled.
    #[must_use]
    pub fn new(config: ClientConfig) -> Self {
        Self::with_solver(config, Arc::new(NoSolver))
    }

    /// Client with an automated captcha solver for legacy displays.
    #[must_use]
    pub fn with_solver(config: ClientConfig, solver: Arc<dyn CaptchaSolver>) -> Self {
        Self {
            config,
            solver,
            identity: None,
            flow: None,
        }
    }

    /// The resolved identity, if login has run (or detection completed).
    #[must_use]
    pub const fn identity(&self) -> Option<DisplayIdentity> {
        self.identity
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        match &self.flow {
            Some(DisplayFlow::Modern(c)) => c.is_authenticated(),
            Some(DisplayFlow::Legacy(c)) => c.is_authenticated(),
            None => false,
        }
    }

    fn flow_mut(&mut self) -> Result<&mut DisplayFlow, SignageError> {
        self.flow.as_mut().ok_or(SignageError::NotAuthenticated)
    }

    /// Resolve the display identity and run the matching login flow.
    ///
    /// The identity is resolved once and kept for the client's lifetime.
    /// Detection runs only when the caller has not pinned both type and
    /// port; a pinned pair is used as-is even if unreachable.
    pub async fn login(&mut self) -> Result<(), SignageError> {
        let identity = match self.identity {
            Some(identity) => identity,
            None => match (self.config.display_type, self.config.port) {
                (Some(display_type), Some(port)) => DisplayIdentity { display_type, port },
                _ => {
                    Detector::new(&self.config.transport)
                        .detect(&self.config.host)
                        .await
                }
            },
        };
        self.identity = Some(identity);
        info!(
            host = %self.config.host,
            port = identity.port,
            display_type = ?identity.display_type,
            "logging in"
        );

        match identity.display_type {
            DisplayType::Modern => {
                let mut client = ModernClient::new(
                    &self.config.host,
                    identity.port,
                    &self.config.password,
                    &self.config.transport,
                )?;
                client.login().await?;
                self.flow = Some(DisplayFlow::Modern(client));
            }
            DisplayType::Legacy => {
                let mut client = LegacyClient::new(
                    &self.config.host,
                    identity.port,
                    &self.config.password,
                    Arc::clone(&self.solver),
                    &self.config.transport,
                )?
                .with_max_attempts(self.config.max_login_attempts);
                if self.config.interactive_captcha {
                    client = client.with_fallback(Arc::new(PromptSolver::default()));
                }
                client.login().await?;
                self.flow = Some(DisplayFlow::Legacy(client));
            }
        }
        Ok(())
    }

    /// Play a playlist by reference on either display type.
    ///
    /// Modern displays resolve the reference against the current media
    /// listing (exact file-name match); legacy displays fire the launch
    /// command without confirmation that playback started.
    pub async fn play(&mut self, reference: &str) -> Result<(), SignageError> {
        match self.flow_mut()? {
            DisplayFlow::Modern(client) => client.play_playlist(reference).await,
            DisplayFlow::Legacy(client) => client.play_playlist(reference).await,
        }
    }

    /// List media on the display, filtered by type (empty filter = all).
    pub async fn list_media(
        &mut self,
        filters: &[MediaType],
    ) -> Result<Vec<MediaEntry>, SignageError> {
        let filters = if filters.is_empty() {
            &ALL_MEDIA_TYPES[..]
        } else {
            filters
        };
        match self.flow_mut()? {
            DisplayFlow::Modern(client) => client.list_media(filters).await,
            DisplayFlow::Legacy(_) => Err(SignageError::Unsupported(
                "media listing requires the modern JSON API".into(),
            )),
        }
    }

    /// Enumerate storage devices (modern displays only).
    pub async fn list_storage(&mut self) -> Result<Vec<StorageDevice>, SignageError> {
        match self.flow_mut()? {
            DisplayFlow::Modern(client) => client.list_storage().await,
            DisplayFlow::Legacy(_) => Err(SignageError::Unsupported(
                "storage enumeration requires the modern JSON API".into(),
            )),
        }
    }

    /// Fetch system information (modern displays only).
    pub async fn system_info(&mut self) -> Result<Value, SignageError> {
        match self.flow_mut()? {
            DisplayFlow::Modern(client) => client.system_info().await,
            DisplayFlow::Legacy(_) => Err(SignageError::Unsupported(
                "system info requires the modern JSON API".into(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = ClientConfig::new("10.0.30.2", "password");
        assert!(config.port.is_none());
        assert!(config.display_type.is_none());
        assert_eq!(config.max_login_attempts, 5);
        assert!(!config.interactive_captcha);
    }

    #[tokio::test]
    async fn test_operations_fail_fast_before_login() {
        let mut client = SignageClient::new(ClientConfig::new("127.0.0.1", "password"));
        assert!(matches!(
            client.play("Sunday.pls").await,
            Err(SignageError::NotAuthenticated)
        ));
        assert!(matches!(
            client.list_media(&[]).await,
            Err(SignageError::NotAuthenticated)
        ));
        assert!(!client.is_authenticated());
        assert!(client.identity().is_none());
    }
}
