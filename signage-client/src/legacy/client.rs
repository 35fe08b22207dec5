//! Legacy display HTTP client

use std::sync::Arc;

use serde_json::{json, Value};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::captcha::{is_valid_answer, CaptchaSolver};
use crate::error::{bytes_with_limit, check_response, text_with_limit, SignageError};
use crate::transport::{cache_buster_ms, Session, TransportConfig};
use crate::DSMP_APP_ID;

use super::channel::CommandChannel;

/// Directory the display keeps operator-managed signage media in; relative
/// play references resolve against it.
pub const SIGNAGE_MEDIA_DIR: &str = "/mnt/lg/appstore/signage";

/// Luna service that launches on-display applications.
pub const LUNA_LAUNCH_SERVICE: &str = "luna://com.webos.applicationManager/launch";

const DEFAULT_MAX_ATTEMPTS: usize = 5;

/// Resolve a play reference to an absolute on-display path.
#[must_use]
pub fn normalize_media_path(reference: &str) -> String {
    if reference.starts_with('/') {
        reference.to_string()
    } else {
        format!("{SIGNAGE_MEDIA_DIR}/{reference}")
    }
}

enum AttemptOutcome {
    Authenticated,
    /// The solver had no confident answer; no credentials were submitted.
    SolveMiss,
    /// The display answered the login POST with something other than
    /// `"success"`.
    Rejected(String),
}

/// Client for the legacy form-login API and its Socket.io command channel.
pub struct LegacyClient {
    host: String,
    port: u16,
    password: String,
    transport: TransportConfig,
    session: Session,
    solver: Arc<dyn CaptchaSolver>,
    fallback: Option<Arc<dyn CaptchaSolver>>,
    max_attempts: usize,
    authenticated: bool,
    channel: Option<CommandChannel>,
    last_captcha: Option<Vec<u8>>,
}

impl LegacyClient {
    pub fn new(
        host: &str,
        port: u16,
        password: &str,
        solver: Arc<dyn CaptchaSolver>,
        config: &TransportConfig,
    ) -> Result<Self, SignageError> {
        Ok(Self {
            host: host.to_string(),
            port,
            password: password.to_string(),
            transport: config.clone(),
            session: Session::new(host, port, config)?,
            solver,
            fallback: None,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            authenticated: false,
            channel: None,
            last_captcha: None,
        })
    }

    /// Solver of last resort, consulted once after the solve budget is spent
    /// (typically [`crate::captcha::PromptSolver`]).
    #[must_use]
    pub fn with_fallback(mut self, fallback: Arc<dyn CaptchaSolver>) -> Self {
        self.fallback = Some(fallback);
        self
    }

    #[must_use]
    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    /// Image bytes of the most recently fetched captcha, if any.
    #[must_use]
    pub fn last_captcha(&self) -> Option<&[u8]> {
        self.last_captcha.as_deref()
    }

    const fn require_auth(&self) -> Result<(), SignageError> {
        if self.authenticated {
            Ok(())
        } else {
            Err(SignageError::NotAuthenticated)
        }
    }

    /// Replace the session with a fresh cookie jar. The pending captcha and
    /// command channel die with the old jar.
    fn reset_session(&mut self) -> Result<(), SignageError> {
        self.session = Session::new(&self.host, self.port, &self.transport)?;
        self.authenticated = false;
        self.channel = None;
        Ok(())
    }

    /// Drive the captcha/login loop, bounded by the attempt budget.
    ///
    /// Every retry discards the cookie jar and refetches the login page:
    /// captchas are bound to their session and cannot be resubmitted against
    /// a stale one. A response containing `"restricted"` is a lockout signal
    /// and terminates immediately regardless of remaining attempts.
    pub async fn login(&mut self) -> Result<(), SignageError> {
        let mut solve_misses = 0usize;
        let mut last_error: Option<SignageError> = None;

        for attempt in 1..=self.max_attempts {
            if attempt > 1 {
                self.reset_session()?;
            }
            match self.login_attempt(Arc::clone(&self.solver)).await {
                Ok(AttemptOutcome::Authenticated) => {
                    info!(attempt, "login succeeded (legacy API)");
                    self.authenticated = true;
                    return Ok(());
                }
                Ok(AttemptOutcome::SolveMiss) => {
                    debug!(attempt, "captcha solver had no confident answer");
                    solve_misses += 1;
                    last_error = Some(SignageError::CaptchaSolve(format!(
                        "solver had no confident answer ({solve_misses} miss(es))"
                    )));
                }
                Ok(AttemptOutcome::Rejected(body)) => {
                    if body.to_lowercase().contains("restricted") {
                        warn!("display reports restricted access, not retrying");
                        return Err(SignageError::AccountRestricted);
                    }
                    debug!(attempt, body = %body, "login rejected");
                    last_error = Some(SignageError::AuthRejected(body));
                }
                Err(e) if e.retryable() => {
                    warn!(attempt, error = %e, "login attempt failed");
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        // Solve budget spent: ask the interactive fallback for the digits
        // before giving up entirely.
        if solve_misses > 0 {
            if let Some(fallback) = self.fallback.clone() {
                self.reset_session()?;
                return match self.login_attempt(fallback).await? {
                    AttemptOutcome::Authenticated => {
                        info!("login succeeded (legacy API, manual captcha)");
                        self.authenticated = true;
                        Ok(())
                    }
                    AttemptOutcome::SolveMiss => Err(SignageError::CaptchaSolve(
                        "manual captcha entry yielded no answer".into(),
                    )),
                    AttemptOutcome::Rejected(body)
                        if body.to_lowercase().contains("restricted") =>
                    {
                        Err(SignageError::AccountRestricted)
                    }
                    AttemptOutcome::Rejected(body) => Err(SignageError::AuthRejected(body)),
                };
            }
        }

        Err(last_error.unwrap_or_else(|| {
            SignageError::CaptchaSolve(format!(
                "no successful login in {} attempts",
                self.max_attempts
            ))
        }))
    }

    /// One full attempt on the current session: root, login page, captcha
    /// image, solve, form submit.
    async fn login_attempt(
        &mut self,
        solver: Arc<dyn CaptchaSolver>,
    ) -> Result<AttemptOutcome, SignageError> {
        let client = self.session.client();
        check_response(client.get(self.session.url("/")).send().await?)?;
        check_response(client.get(self.session.url("/login")).send().await?)?;

        let resp = client
            .get(self.session.url("/request/captchapng"))
            .query(&[("timestamp", cache_buster_ms())])
            .send()
            .await?;
        let resp = check_response(resp)?;
        let image = bytes_with_limit(resp).await?;
        self.last_captcha = Some(image.clone());

        let Some(answer) = solver.solve(&image).await?.filter(|a| is_valid_answer(a)) else {
            return Ok(AttemptOutcome::SolveMiss);
        };

        let resp = self
            .session
            .client()
            .post(self.session.url("/login"))
            .form(&[
                ("password", self.password.as_str()),
                ("captcha", answer.as_str()),
            ])
            .send()
            .await?;
        let resp = check_response(resp)?;
        let body = text_with_limit(resp).await?;
        let body = body.trim();
        if body == "success" {
            Ok(AttemptOutcome::Authenticated)
        } else {
            Ok(AttemptOutcome::Rejected(body.to_string()))
        }
    }

    /// Establish the command channel if it is not already up. Idempotent.
    pub async fn ensure_channel(&mut self) -> Result<(), SignageError> {
        self.require_auth()?;
        if self.channel.is_none() {
            self.channel = Some(CommandChannel::connect(&self.session).await?);
        }
        Ok(())
    }

    /// Fire a one-way Luna service invocation; returns the event id.
    ///
    /// The display does not acknowledge these calls on any channel this
    /// client reads, so success only means the command was dispatched.
    pub async fn palm_service_call(
        &mut self,
        service_id: &str,
        params: Value,
    ) -> Result<String, SignageError> {
        self.ensure_channel().await?;
        let event_id = Uuid::new_v4().to_string();
        let message = json!({
            "serviceId": service_id,
            "params": params,
            "eventId": event_id,
        });
        match &self.channel {
            Some(channel) => {
                channel
                    .emit(&self.session, "PalmServiceBridge.call", &message)
                    .await?;
            }
            None => {
                return Err(SignageError::Protocol(
                    "command channel not established".into(),
                ))
            }
        }
        debug!(service_id, %event_id, "luna service call dispatched");
        Ok(event_id)
    }

    /// Launch DSMP on a playlist. Relative references resolve under
    /// [`SIGNAGE_MEDIA_DIR`].
    pub async fn play_playlist(&mut self, reference: &str) -> Result<(), SignageError> {
        let path = normalize_media_path(reference);
        self.palm_service_call(
            LUNA_LAUNCH_SERVICE,
            json!({
                "id": DSMP_APP_ID,
                "params": { "type": "playlist", "src": path },
            }),
        )
        .await?;
        Ok(())
    }

    /// End the display session.
    pub async fn logout(&mut self) -> Result<(), SignageError> {
        check_response(
            self.session
                .client()
                .get(self.session.url("/logout"))
                .send()
                .await?,
        )?;
        self.authenticated = false;
        self.channel = None;
        Ok(())
    }

    /// Raw login status text from the display.
    pub async fn login_status(&self) -> Result<String, SignageError> {
        self.require_auth()?;
        let resp = check_response(
            self.session
                .client()
                .get(self.session.url("/getLoginStatus"))
                .send()
                .await?,
        )?;
        text_with_limit(resp).await
    }
}
