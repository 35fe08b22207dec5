//! Modern display HTTP client

use serde_json::{json, Value};
use tracing::{debug, info};

use crate::credentials::encode_password;
use crate::error::{check_response, json_with_limit, SignageError};
use crate::transport::{cache_buster_ms, Session, TransportConfig};
use crate::DSMP_APP_ID;

use super::types::{
    captcha_text, truthy, ApiResp, ContentData, LoginResult, MediaEntry, MediaType, StorageData,
    StorageDevice, STORAGE_DEVICE_FILTER,
};

/// Fixed page size for one `/content/list` call. Callers needing more must
/// page explicitly; this client does not aggregate pages.
const MEDIA_PAGE_LIMIT: u64 = 100;

/// Client for the modern JSON login/control API.
pub struct ModernClient {
    session: Session,
    password: String,
    authenticated: bool,
}

impl ModernClient {
    pub fn new(
        host: &str,
        port: u16,
        password: &str,
        config: &TransportConfig,
    ) -> Result<Self, SignageError> {
        Ok(Self {
            session: Session::new(host, port, config)?,
            password: password.to_string(),
            authenticated: false,
        })
    }

    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.session.client().get(self.session.url(path))
    }

    const fn require_auth(&self) -> Result<(), SignageError> {
        if self.authenticated {
            Ok(())
        } else {
            Err(SignageError::NotAuthenticated)
        }
    }

    /// Whether the display reports an existing valid session for our cookies.
    pub async fn check_login_status(&self) -> Result<bool, SignageError> {
        let resp = check_response(self.get("/login/checkLoginStatus").send().await?)?;
        let body: ApiResp<Value> = json_with_limit(resp).await?;
        Ok(body.data.as_ref().is_some_and(truthy))
    }

    /// Drive the captcha/login handshake.
    ///
    /// Single attempt: any failure is classified and returned; the caller
    /// decides whether to retry with a fresh captcha. Cookies accumulate in
    /// the session across steps and are reused, never rotated, within one
    /// attempt.
    pub async fn login(&mut self) -> Result<(), SignageError> {
        // Init: establish the session cookie.
        check_response(self.get("/login/status").send().await?)?;

        // An existing valid session short-circuits the handshake.
        if self.check_login_status().await? {
            debug!("already logged in, skipping captcha handshake");
            self.authenticated = true;
            return Ok(());
        }

        // Fetch the captcha image (binds the answer to our session) and its
        // text. The timestamp defeats intermediary caching.
        let resp = self
            .get("/login/captcha")
            .query(&[("time", cache_buster_ms())])
            .send()
            .await?;
        check_response(resp)?;

        let resp = check_response(self.get("/login/captchaText").send().await?)?;
        let body: ApiResp<Value> = json_with_limit(resp).await?;
        if body.status != 200 {
            return Err(SignageError::Protocol(format!(
                "captcha text rejected: status {}, message {:?}",
                body.status, body.message
            )));
        }
        let text = body
            .data
            .as_ref()
            .and_then(captcha_text)
            .ok_or_else(|| SignageError::Protocol("captcha text missing from response".into()))?;

        // Submit the digest; status code and nested result flag must both
        // indicate success. The server does not distinguish a bad password
        // from a bad captcha.
        let digest = encode_password(&self.password, &text);
        let resp = self
            .session
            .client()
            .post(self.session.url("/login/login"))
            .json(&json!({ "pwd": digest }))
            .send()
            .await?;
        let resp = check_response(resp)?;
        let body: ApiResp<LoginResult> = json_with_limit(resp).await?;

        if body.status == 200 && body.data.map(|d| d.result).unwrap_or(false) {
            info!("login succeeded (modern API)");
            self.authenticated = true;
            Ok(())
        } else {
            Err(SignageError::AuthRejected(
                "credentials or captcha rejected".into(),
            ))
        }
    }

    /// Enumerate storage devices (internal, USB, SD card).
    pub async fn list_storage(&self) -> Result<Vec<StorageDevice>, SignageError> {
        self.require_auth()?;
        let req_param = json!({ "deviceType": STORAGE_DEVICE_FILTER });
        let resp = self
            .get("/storage/list")
            .query(&[("reqParam", req_param.to_string())])
            .send()
            .await?;
        let resp = check_response(resp)?;
        let body: ApiResp<StorageData> = json_with_limit(resp).await?;
        Ok(body.data.map(|d| d.payload.devices).unwrap_or_default())
    }

    /// List media filtered by type, restricted to currently present storage.
    ///
    /// Entries whose `udn` does not match an enumerated device are dropped
    /// even if the display returns them; they are not playable.
    pub async fn list_media(&self, filters: &[MediaType]) -> Result<Vec<MediaEntry>, SignageError> {
        self.require_auth()?;
        let device_ids: Vec<String> = self
            .list_storage()
            .await?
            .into_iter()
            .map(|d| d.device_id)
            .collect();

        let req_param = json!({
            "from": "MEDIA",
            "orderBy": "FILE_NAME",
            "desc": false,
            "limit": MEDIA_PAGE_LIMIT,
            "where": [{ "prop": "mediaType", "op": "=", "val": filters }],
            "filter": [{ "prop": "udn", "op": "=", "val": device_ids }],
            "page": "",
        });
        let resp = self
            .get("/content/list")
            .query(&[("reqParam", req_param.to_string())])
            .send()
            .await?;
        let resp = check_response(resp)?;
        let body: ApiResp<ContentData> = json_with_limit(resp).await?;

        let mut results = body.data.map(|d| d.payload.results).unwrap_or_default();
        results.retain(|entry| device_ids.iter().any(|id| *id == entry.udn));
        Ok(results)
    }

    /// Launch DSMP on a known media type and path, bypassing listing.
    pub async fn play_by_reference(
        &self,
        media_type: MediaType,
        path: &str,
    ) -> Result<(), SignageError> {
        self.require_auth()?;
        let req_param = json!({
            "id": DSMP_APP_ID,
            "params": { "type": media_type, "src": path },
        });
        let resp = self
            .session
            .client()
            .put(self.session.url("/content/play/dsmp"))
            .query(&[("reqParam", req_param.to_string())])
            .send()
            .await?;
        let resp = check_response(resp)?;
        let body: ApiResp<Value> = json_with_limit(resp).await?;
        if body.status == 200 {
            debug!(path, "play command accepted");
            Ok(())
        } else {
            Err(SignageError::Protocol(format!(
                "play command rejected: status {}, message {:?}",
                body.status, body.message
            )))
        }
    }

    /// Resolve a playlist by exact file name and play it.
    ///
    /// Absence from the current listing is [`SignageError::ReferenceNotFound`],
    /// distinct from transport or auth failures.
    pub async fn play_playlist(&self, reference: &str) -> Result<(), SignageError> {
        let media = self.list_media(&[MediaType::PlayList]).await?;
        let entry = media
            .into_iter()
            .find(|e| e.file_name == reference)
            .ok_or_else(|| SignageError::ReferenceNotFound(reference.to_string()))?;
        self.play_by_reference(entry.media_type, &entry.full_path)
            .await
    }

    /// Fetch the display's system information payload.
    ///
    /// The endpoint moved between firmware generations; negotiate by trying
    /// the current route first and falling back on 404.
    pub async fn system_info(&self) -> Result<Value, SignageError> {
        self.require_auth()?;
        let resp = self.get("/config/getConfigs").send().await?;
        let resp = if resp.status() == reqwest::StatusCode::NOT_FOUND {
            self.get("/api/system").send().await?
        } else {
            resp
        };
        let resp = check_response(resp)?;
        let body: Value = json_with_limit(resp).await?;
        Ok(body.get("data").cloned().unwrap_or(body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offline_client() -> ModernClient {
        // Port 9 (discard) is never contacted: the auth guard fires first.
        ModernClient::new("127.0.0.1", 9, "password", &TransportConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn test_operations_fail_fast_without_login() {
        let client = offline_client();
        assert!(matches!(
            client.list_storage().await,
            Err(SignageError::NotAuthenticated)
        ));
        assert!(matches!(
            client.list_media(&[MediaType::PlayList]).await,
            Err(SignageError::NotAuthenticated)
        ));
        assert!(matches!(
            client
                .play_by_reference(MediaType::PlayList, "/tmp/a.pls")
                .await,
            Err(SignageError::NotAuthenticated)
        ));
        assert!(matches!(
            client.system_info().await,
            Err(SignageError::NotAuthenticated)
        ));
    }

    #[test]
    fn test_starts_unauthenticated() {
        assert!(!offline_client().is_authenticated());
    }
}
