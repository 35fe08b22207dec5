//! Socket.io command channel, driven over its HTTP long-polling transport.
//!
//! The display's push channel is Socket.io (engine.io v3). Commands in this
//! design are one-way launch events, so the polling transport on the
//! existing cookie session is enough: handshake, namespace connect, then
//! framed event POSTs. Responses are neither read nor correlated.

use serde_json::{json, Value};
use tracing::debug;

use crate::error::{check_response, text_with_limit, SignageError};
use crate::transport::{cache_buster_ms, Session};

const SOCKET_IO_PATH: &str = "/socket.io/";
const ENGINE_IO_VERSION: &str = "3";

/// An established command channel, identified by the engine.io session id.
pub struct CommandChannel {
    sid: String,
}

impl CommandChannel {
    /// Handshake and connect the default Socket.io namespace.
    ///
    /// Must use the session that carried the login; the display associates
    /// the channel with the authenticated cookies.
    pub async fn connect(session: &Session) -> Result<Self, SignageError> {
        let resp = session
            .client()
            .get(session.url(SOCKET_IO_PATH))
            .query(&[
                ("EIO", ENGINE_IO_VERSION.to_string()),
                ("transport", "polling".to_string()),
                ("t", cache_buster_ms()),
            ])
            .send()
            .await?;
        let resp = check_response(resp)?;
        let body = text_with_limit(resp).await?;
        let sid = parse_handshake_sid(&body)?;
        debug!(%sid, "engine.io handshake complete");

        let channel = Self { sid };
        // Socket.io connect packet for the default namespace.
        channel.post_packet(session, "40").await?;
        Ok(channel)
    }

    #[must_use]
    pub fn sid(&self) -> &str {
        &self.sid
    }

    /// Emit a one-way event; the display's acknowledgement is not awaited.
    pub async fn emit(
        &self,
        session: &Session,
        event: &str,
        message: &Value,
    ) -> Result<(), SignageError> {
        let packet = format!("42{}", serde_json::to_string(&json!([event, message]))?);
        self.post_packet(session, &packet).await
    }

    async fn post_packet(&self, session: &Session, packet: &str) -> Result<(), SignageError> {
        // engine.io polling frames: `<length>:<packet>`. Packets here are
        // ASCII, so byte length equals the character count the frame wants.
        let payload = format!("{}:{packet}", packet.len());
        let resp = session
            .client()
            .post(session.url(SOCKET_IO_PATH))
            .query(&[
                ("EIO", ENGINE_IO_VERSION.to_string()),
                ("transport", "polling".to_string()),
                ("t", cache_buster_ms()),
                ("sid", self.sid.clone()),
            ])
            .header(reqwest::header::CONTENT_TYPE, "text/plain;charset=UTF-8")
            .body(payload)
            .send()
            .await?;
        check_response(resp)?;
        Ok(())
    }
}

/// Extract the `sid` from an engine.io handshake body.
///
/// The body is a framed packet stream like
/// `96:0{"sid":"...","upgrades":["websocket"],...}2:40`; the open packet's
/// JSON is the first value after the packet type marker.
fn parse_handshake_sid(body: &str) -> Result<String, SignageError> {
    let start = body
        .find('{')
        .ok_or_else(|| SignageError::Protocol("no open packet in socket.io handshake".into()))?;
    let mut stream = serde_json::Deserializer::from_str(&body[start..]).into_iter::<Value>();
    let value = match stream.next() {
        Some(Ok(v)) => v,
        _ => {
            return Err(SignageError::Protocol(
                "malformed socket.io handshake".into(),
            ))
        }
    };
    value
        .get("sid")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| SignageError::Protocol("socket.io handshake missing sid".into()))
}
