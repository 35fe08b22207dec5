//! Captcha solver capability
//!
//! The login state machines never interpret captcha images themselves; they
//! hand the raw bytes to a [`CaptchaSolver`] and act on its answer. Solvers
//! are swappable without touching the state machines: OCR, a remote service,
//! or an interactive prompt all fit behind the same trait.

use std::io::Write;
use std::path::PathBuf;

use async_trait::async_trait;

use crate::error::SignageError;

/// A pluggable captcha solving capability.
///
/// `Ok(None)` means "no confident answer" and is an ordinary, retryable
/// outcome; `Err` is reserved for solver infrastructure failures.
#[async_trait]
pub trait CaptchaSolver: Send + Sync {
    /// Attempt to read the 4-digit answer from a captcha image.
    async fn solve(&self, image: &[u8]) -> Result<Option<String>, SignageError>;
}

/// Whether a solver answer has the shape the displays accept.
#[must_use]
pub fn is_valid_answer(answer: &str) -> bool {
    answer.len() == 4 && answer.bytes().all(|b| b.is_ascii_digit())
}

/// Solver that never answers.
///
/// Useful when captchas are supplied out-of-band or login is expected to
/// short-circuit on an existing session.
pub struct NoSolver;

#[async_trait]
impl CaptchaSolver for NoSolver {
    async fn solve(&self, _image: &[u8]) -> Result<Option<String>, SignageError> {
        Ok(None)
    }
}

/// Interactive solver: saves the captcha image and blocks on stdin.
///
/// Suspends the whole login call until the operator types the digits, which
/// is acceptable only for low-frequency, operator-adjacent usage.
pub struct PromptSolver {
    image_path: PathBuf,
}

impl PromptSolver {
    #[must_use]
    pub fn new(image_path: impl Into<PathBuf>) -> Self {
        Self {
            image_path: image_path.into(),
        }
    }
}

impl Default for PromptSolver {
    fn default() -> Self {
        Self::new("captcha.png")
    }
}

#[async_trait]
impl CaptchaSolver for PromptSolver {
    async fn solve(&self, image: &[u8]) -> Result<Option<String>, SignageError> {
        let path = self.image_path.clone();
        let image = image.to_vec();
        let answer = tokio::task::spawn_blocking(move || -> std::io::Result<String> {
            std::fs::write(&path, &image)?;
            eprintln!("Captcha saved to {}", path.display());
            eprint!("Enter 4-digit captcha: ");
            std::io::stderr().flush()?;
            let mut line = String::new();
            std::io::stdin().read_line(&mut line)?;
            Ok(line.trim().to_string())
        })
        .await
        .map_err(|e| SignageError::CaptchaSolve(format!("prompt task failed: {e}")))?
        .map_err(|e| SignageError::CaptchaSolve(format!("prompt I/O failed: {e}")))?;

        if is_valid_answer(&answer) {
            Ok(Some(answer))
        } else {
            Ok(None)
        }
    }
}
