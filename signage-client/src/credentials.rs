//! Password digest for the modern login API.

use sha2::{Digest, Sha512};

/// Compute the login digest: `SHA512(hex(SHA512(password)) + captcha)`.
///
/// The inner digest is lowercase-hex encoded before the captcha text is
/// appended; the display compares the outer digest byte for byte, so any
/// case or whitespace difference fails login with a generic rejection.
#[must_use]
pub fn encode_password(password: &str, captcha_text: &str) -> String {
    let first = hex::encode(Sha512::digest(password.as_bytes()));
    let mut hasher = Sha512::new();
    hasher.update(first.as_bytes());
    hasher.update(captcha_text.as_bytes());
    hex::encode(hasher.finalize())
}
