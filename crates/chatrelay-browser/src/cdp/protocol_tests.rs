use super::*;

#[test]
fn test_cdp_request_serialize() {
    let req = CdpRequest {
        id: 1,
        method: "Page.navigate".to_string(),
        params: Some(serde_json::json!({"url": "https://chatgpt.com"})),
        session_id: Some("S1".to_string()),
    };
    let json = serde_json::to_string(&req).unwrap();
    assert!(json.contains("Page.navigate"));
    assert!(json.contains("chatgpt.com"));
    assert!(json.contains(r#""sessionId":"S1""#));
}

#[test]
fn test_cdp_request_omits_missing_session() {
    let req = CdpRequest {
        id: 7,
        method: "Target.getTargets".to_string(),
        params: None,
        session_id: None,
    };
    let json = serde_json::to_string(&req).unwrap();
    assert_eq!(json, r#"{"id":7,"method":"Target.getTargets"}"#);
}

#[test]
fn test_cdp_response_deserialize() {
    let json = r#"{"id": 1, "result": {"frameId": "abc"}}"#;
    let resp: CdpResponse = serde_json::from_str(json).unwrap();
    assert_eq!(resp.id, Some(1));
    assert!(resp.result.is_some());
}

#[test]
fn test_cdp_event_deserialize() {
    let json = r#"{"method": "Page.loadEventFired", "params": {"timestamp": 1.5}, "sessionId": "S1"}"#;
    let resp: CdpResponse = serde_json::from_str(json).unwrap();
    assert!(resp.id.is_none());
    assert_eq!(resp.method.as_deref(), Some("Page.loadEventFired"));
    assert_eq!(resp.session_id.as_deref(), Some("S1"));
}

#[test]
fn test_page_info_deserialize() {
    let json = r#"{
        "id": "page123",
        "type": "page",
        "title": "New Tab",
        "url": "about:blank",
        "webSocketDebuggerUrl": "ws://127.0.0.1:9222/devtools/page/page123"
    }"#;
    let info: PageInfo = serde_json::from_str(json).unwrap();
    assert_eq!(info.id, "page123");
    assert_eq!(info.url, "about:blank");
}

#[test]
fn test_browser_version_deserialize() {
    let json = r#"{
        "Browser": "Chrome/124.0.6367.60",
        "Protocol-Version": "1.3",
        "User-Agent": "Mozilla/5.0",
        "V8-Version": "12.4",
        "webSocketDebuggerUrl": "ws://127.0.0.1:9222/devtools/browser/abc"
    }"#;
    let version: BrowserVersion = serde_json::from_str(json).unwrap();
    assert_eq!(version.browser, "Chrome/124.0.6367.60");
    assert!(version.web_socket_debugger_url.ends_with("/browser/abc"));
}

#[test]
fn test_input_enums_serialize() {
    assert_eq!(serde_json::to_string(&MouseButton::Left).unwrap(), "\"left\"");
    assert_eq!(
        serde_json::to_string(&MouseEventType::MousePressed).unwrap(),
        "\"mousePressed\""
    );
    assert_eq!(
        serde_json::to_string(&KeyEventType::RawKeyDown).unwrap(),
        "\"rawKeyDown\""
    );
}

#[test]
fn test_remote_object_live_id() {
    let element: RemoteObject = serde_json::from_str(
        r#"{"type": "object", "subtype": "node", "className": "HTMLInputElement", "objectId": "1.2"}"#,
    )
    .unwrap();
    assert_eq!(element.live_object_id(), Some("1.2"));

    let null: RemoteObject = serde_json::from_str(r#"{"type": "object", "subtype": "null", "value": null}"#).unwrap();
    assert!(null.live_object_id().is_none());

    let undefined: RemoteObject = serde_json::from_str(r#"{"type": "undefined"}"#).unwrap();
    assert!(undefined.live_object_id().is_none());
}

#[test]
fn test_cookie_from_extension_export() {
    let json = r#"{
        "name": "__Secure-next-auth.session-token",
        "value": "abc",
        "domain": ".chatgpt.com",
        "path": "/",
        "secure": true,
        "httpOnly": true,
        "sameSite": "no_restriction",
        "expirationDate": 1767225600.5,
        "storeId": "0",
        "hostOnly": false
    }"#;
    let cookie: CookieParam = serde_json::from_str(json).unwrap();
    let cookie = cookie.normalized();
    assert_eq!(cookie.same_site.as_deref(), Some("None"));
    assert_eq!(cookie.expires, Some(1767225600.5));

    let out = serde_json::to_value(&cookie).unwrap();
    assert_eq!(out["httpOnly"], true);
    assert!(out.get("storeId").is_none());
}

#[test]
fn test_cookie_session_expiry_dropped() {
    let cookie = CookieParam {
        name: "a".to_string(),
        value: "b".to_string(),
        url: None,
        domain: Some("chatgpt.com".to_string()),
        path: None,
        secure: None,
        http_only: None,
        same_site: Some("unspecified".to_string()),
        expires: Some(-1.0),
    }
    .normalized();
    assert!(cookie.expires.is_none());
    assert!(cookie.same_site.is_none());
}
