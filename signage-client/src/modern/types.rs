//! Modern API wire types
//!
//! JSON shapes observed on the display's REST endpoints. Responses are
//! wrapped in a `{status, message, data}` envelope; payload-bearing
//! endpoints nest another `{payload: ...}` level inside `data`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Generic response envelope `{status, message, data}`.
#[derive(Debug, Deserialize)]
pub struct ApiResp<T> {
    pub status: u16,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Option<T>,
}

/// Login result carried inside the envelope's `data`.
#[derive(Debug, Default, Deserialize)]
pub struct LoginResult {
    #[serde(default)]
    pub result: bool,
}

/// Storage inventory: `data.payload.devices`.
#[derive(Debug, Default, Deserialize)]
pub struct StorageData {
    #[serde(default)]
    pub payload: StoragePayload,
}

#[derive(Debug, Default, Deserialize)]
pub struct StoragePayload {
    #[serde(default)]
    pub devices: Vec<StorageDevice>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageDevice {
    #[serde(rename = "deviceId")]
    pub device_id: String,
    #[serde(rename = "deviceType")]
    pub device_type: DeviceType,
}

/// Storage device classes the content operations query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum DeviceType {
    #[serde(rename = "internal signage")]
    Internal,
    #[serde(rename = "usb")]
    Usb,
    #[serde(rename = "sdcard")]
    SdCard,
    #[serde(other, rename = "unknown")]
    Unknown,
}

/// All device classes eligible for content listing.
pub const STORAGE_DEVICE_FILTER: [DeviceType; 3] =
    [DeviceType::Internal, DeviceType::Usb, DeviceType::SdCard];

/// Content listing: `data.payload.results`.
#[derive(Debug, Default, Deserialize)]
pub struct ContentData {
    #[serde(default)]
    pub payload: ContentPayload,
}

#[derive(Debug, Default, Deserialize)]
pub struct ContentPayload {
    #[serde(default)]
    pub results: Vec<MediaEntry>,
}

/// One media item as reported by `/content/list`.
///
/// `udn` names the storage device the item lives on; an entry is only
/// playable while that device is present in the storage inventory.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaEntry {
    pub file_name: String,
    pub media_type: MediaType,
    #[serde(default)]
    pub full_path: String,
    #[serde(default)]
    pub udn: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MediaType {
    Video,
    Image,
    Template,
    SuperSign,
    PlayList,
}

/// All media classes, the default listing filter.
pub const ALL_MEDIA_TYPES: [MediaType; 5] = [
    MediaType::Video,
    MediaType::Image,
    MediaType::Template,
    MediaType::SuperSign,
    MediaType::PlayList,
];

/// Python-style truthiness for loosely shaped `data` fields.
///
/// `checkLoginStatus` reports an existing session as `data: true` on some
/// firmware and as a non-empty object on others.
#[must_use]
pub fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// Captcha text extraction: `data` is a bare string on some firmware and
/// `{text: ...}` on others.
#[must_use]
pub fn captcha_text(data: &Value) -> Option<String> {
    match data {
        Value::String(s) => Some(s.clone()),
        Value::Object(o) => o.get("text").and_then(Value::as_str).map(str::to_string),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_resp_deserialize() {
        let json = r#"{"status": 200, "message": "OK", "data": {"result": true}}"#;
        let resp: ApiResp<LoginResult> = serde_json::from_str(json).unwrap();
        assert_eq!(resp.status, 200);
        assert_eq!(resp.message.as_deref(), Some("OK"));
        assert!(resp.data.unwrap().result);
    }

    #[test]
    fn test_api_resp_missing_data() {
        let json = r#"{"status": 404, "message": "not exist captcha session"}"#;
        let resp: ApiResp<LoginResult> = serde_json::from_str(json).unwrap();
        assert_eq!(resp.status, 404);
        assert!(resp.data.is_none());
    }

    #[test]
    fn test_media_entry_deserialize() {
        let json = r#"{
            "fileName": "Sunday.pls",
            "mediaType": "PLAY_LIST",
            "fullPath": "/mnt/lg/appstore/signage/Sunday.pls",
            "udn": "usb-0001"
        }"#;
        let entry: MediaEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.file_name, "Sunday.pls");
        assert_eq!(entry.media_type, MediaType::PlayList);
        assert_eq!(entry.full_path, "/mnt/lg/appstore/signage/Sunday.pls");
        assert_eq!(entry.udn, "usb-0001");
    }

    #[test]
    fn test_media_type_wire_names() {
        assert_eq!(
            serde_json::to_string(&MediaType::SuperSign).unwrap(),
            r#""SUPER_SIGN""#
        );
        assert_eq!(
            serde_json::to_string(&MediaType::PlayList).unwrap(),
            r#""PLAY_LIST""#
        );
        let parsed: MediaType = serde_json::from_str(r#""VIDEO""#).unwrap();
        assert_eq!(parsed, MediaType::Video);
    }

    #[test]
    fn test_device_type_wire_names() {
        assert_eq!(
            serde_json::to_string(&DeviceType::Internal).unwrap(),
            r#""internal signage""#
        );
        let parsed: DeviceType = serde_json::from_str(r#""usb""#).unwrap();
        assert_eq!(parsed, DeviceType::Usb);
        // Unknown classes must not fail the whole inventory.
        let parsed: DeviceType = serde_json::from_str(r#""nfs""#).unwrap();
        assert_eq!(parsed, DeviceType::Unknown);
    }

    #[test]
    fn test_storage_payload_deserialize() {
        let json = r#"{
            "payload": {
                "devices": [
                    {"deviceId": "internal-0", "deviceType": "internal signage"},
                    {"deviceId": "usb-0001", "deviceType": "usb"}
                ]
            }
        }"#;
        let data: StorageData = serde_json::from_str(json).unwrap();
        assert_eq!(data.payload.devices.len(), 2);
        assert_eq!(data.payload.devices[1].device_id, "usb-0001");
    }

    #[test]
    fn test_truthy() {
        use serde_json::json;
        assert!(truthy(&json!(true)));
        assert!(truthy(&json!({"session": "abc"})));
        assert!(truthy(&json!("yes")));
        assert!(!truthy(&json!(false)));
        assert!(!truthy(&json!(null)));
        assert!(!truthy(&json!({})));
        assert!(!truthy(&json!("")));
        assert!(!truthy(&json!(0)));
    }

    #[test]
    fn test_captcha_text_shapes() {
        use serde_json::json;
        assert_eq!(captcha_text(&json!("4821")).as_deref(), Some("4821"));
        assert_eq!(
            captcha_text(&json!({"text": "4821"})).as_deref(),
            Some("4821")
        );
        assert!(captcha_text(&json!(4821)).is_none());
        assert!(captcha_text(&json!({"no_text": 1})).is_none());
    }
}
