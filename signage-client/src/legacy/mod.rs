//! Legacy display client
//!
//! Older webOS signage firmware serves a form-based HTML login and takes
//! commands over a Socket.io push channel instead of REST routes. Login is
//! captcha-gated with no text endpoint, so a [`crate::captcha::CaptchaSolver`]
//! reads the image; the solve loop is bounded and every retry starts from a
//! brand-new session because captchas are bound to the cookie jar.

mod channel;
mod client;

pub use channel::CommandChannel;
pub use client::{normalize_media_path, LegacyClient, LUNA_LAUNCH_SERVICE, SIGNAGE_MEDIA_DIR};
