//! CDP wire messages and the handful of domain types the client reads.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Outgoing command. Session commands carry the flattened `sessionId`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CdpRequest {
    pub id: u64,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

/// Incoming frame: a response when `id` is set, an event otherwise.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CdpResponse {
    pub id: Option<u64>,
    pub result: Option<Value>,
    pub error: Option<CdpErrorResponse>,
    pub method: Option<String>,
    pub params: Option<Value>,
    pub session_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CdpErrorResponse {
    pub code: i64,
    pub message: String,
}

/// Target created through `PUT /json/new`.
#[derive(Debug, Clone, Deserialize)]
pub struct PageInfo {
    pub id: String,
    #[serde(default)]
    pub url: String,
}

/// `GET /json/version`. Chrome mixes key styles here.
#[derive(Debug, Clone, Deserialize)]
pub struct BrowserVersion {
    #[serde(rename = "Browser")]
    pub browser: String,
    #[serde(rename = "webSocketDebuggerUrl")]
    pub web_socket_debugger_url: String,
}

/// Document root from `DOM.getDocument`.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomNode {
    pub node_id: i64,
}

/// `DOM.getBoxModel` result; only the content quad is used.
#[derive(Debug, Clone, Deserialize)]
pub struct BoxModel {
    pub content: Vec<f64>,
}

/// Non-serialized evaluation result (`returnByValue: false`).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteObject {
    #[serde(rename = "type")]
    pub object_type: String,
    pub subtype: Option<String>,
    pub object_id: Option<String>,
}

impl RemoteObject {
    /// Object id of a live object; `None` for `null`, `undefined` and primitives.
    pub fn live_object_id(&self) -> Option<&str> {
        if self.object_type != "object" || self.subtype.as_deref() == Some("null") {
            return None;
        }
        self.object_id.as_deref()
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MouseButton {
    None,
    Left,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum MouseEventType {
    MousePressed,
    MouseReleased,
    MouseMoved,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum KeyEventType {
    KeyDown,
    KeyUp,
    RawKeyDown,
}

/// Cookie accepted by `Network.setCookies`.
///
/// Deserializes both DevTools/Puppeteer exports (`expires`, `sameSite:
/// "Lax"`) and browser-extension exports (`expirationDate`, `sameSite:
/// "no_restriction"`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CookieParam {
    pub name: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secure: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_only: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub same_site: Option<String>,
    #[serde(
        default,
        alias = "expirationDate",
        skip_serializing_if = "Option::is_none"
    )]
    pub expires: Option<f64>,
}

impl CookieParam {
    /// Normalize fields into the shapes CDP accepts.
    pub fn normalized(mut self) -> Self {
        self.same_site = self
            .same_site
            .as_deref()
            .and_then(|s| match s.to_ascii_lowercase().as_str() {
                "strict" => Some("Strict".to_string()),
                "lax" => Some("Lax".to_string()),
                "none" | "no_restriction" => Some("None".to_string()),
                _ => None,
            });
        // Session cookies are exported with a negative expiry.
        if self.expires.is_some_and(|e| e <= 0.0) {
            self.expires = None;
        }
        self
    }
}

#[cfg(test)]
#[path = "protocol_tests.rs"]
mod tests;
