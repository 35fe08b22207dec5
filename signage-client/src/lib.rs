// LG webOS Signage Client
//
// Client library for driving LG webOS signage displays over their two
// divergent vendor HTTP APIs:
// - modern: JSON REST login/control API (captcha text endpoint, digest login)
// - legacy: form-based HTML login plus a Socket.io push channel for commands
//
// Architecture:
// - detect: probes a host and classifies it as modern or legacy
// - modern/legacy: pure per-protocol clients over a cookie-bearing session
// - client: unified facade dispatching on the detected display type
// - captcha: pluggable solver capability (OCR, remote, interactive prompt)

// Shared error types
pub mod error;

// Leaf components
pub mod captcha;
pub mod credentials;
pub mod transport;

// Protocol clients
pub mod legacy;
pub mod modern;

// Detection + unified facade
pub mod client;
pub mod detect;

// Re-export the main types for convenience
pub use captcha::{CaptchaSolver, NoSolver, PromptSolver};
pub use client::{ClientConfig, SignageClient};
pub use credentials::encode_password;
pub use detect::{Detector, DisplayIdentity, DisplayType};
pub use error::SignageError;
pub use legacy::LegacyClient;
pub use modern::{MediaEntry, MediaType, ModernClient, StorageDevice};
pub use transport::{Session, TransportConfig};

/// On-display application that renders media and playlists; every play
/// command targets it.
pub const DSMP_APP_ID: &str = "com.webos.app.dsmp";
