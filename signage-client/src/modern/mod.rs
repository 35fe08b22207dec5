//! Modern display client
//!
//! Pure HTTP client for the JSON login/control API spoken by newer webOS
//! signage firmware. Login drives a captcha handshake and a double-SHA512
//! password digest; content operations ride the authenticated cookie
//! session.
//!
//! # Example
//!
//! ```no_run
//! use signage_client::modern::ModernClient;
//! use signage_client::transport::TransportConfig;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut client = ModernClient::new("10.0.30.2", 3777, "password", &TransportConfig::default())?;
//! client.login().await?;
//! let _media = client.list_media(&[signage_client::modern::MediaType::PlayList]).await?;
//! # Ok(())
//! # }
//! ```

mod client;
pub mod types;

pub use client::ModernClient;
pub use types::{DeviceType, MediaEntry, MediaType, StorageDevice};
