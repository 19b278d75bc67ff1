//! Wire types and acceptance rules for the hosting service's JSON bodies.
//!
//! Interpretation is factored into pure functions over `(status, body)` so
//! the protocol rules can be tested against literal fixtures without a live
//! service.

use serde::Deserialize;

use crate::error::{ClientError, Result};

/// Upload target handed out by the register phase. Single-use: the upload
/// and finalize phases consume it, and it is never re-acquired on retry.
#[derive(Debug, Clone)]
pub struct RemoteArtifact {
    pub id: String,
    pub upload_url: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateArtifactResponse {
    pub upload_url: Option<String>,
    pub id: Option<serde_json::Value>,
    pub error_msg: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct FinishUploadResponse {
    pub status: Option<String>,
    pub public_install_page_url: Option<String>,
    pub error_msg: Option<String>,
}

// The service returns the artifact id either as a string or a bare number.
fn id_string(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s,
        other => other.to_string(),
    }
}

/// Accept a register response: HTTP 200, no service error message, and both
/// the upload URL and the artifact id present.
pub fn interpret_register(status: u16, body: &str) -> Result<RemoteArtifact> {
    if status != 200 {
        return Err(ClientError::Status(status));
    }

    let resp: CreateArtifactResponse = serde_json::from_str(body)?;
    if let Some(msg) = resp.error_msg {
        return Err(ClientError::Rejected(msg));
    }

    let upload_url = resp
        .upload_url
        .filter(|u| !u.is_empty())
        .ok_or(ClientError::MissingField("upload_url"))?;
    let id = resp
        .id
        .map(id_string)
        .filter(|i| !i.is_empty())
        .ok_or(ClientError::MissingField("id"))?;

    Ok(RemoteArtifact { id, upload_url })
}

/// Accept a finalize response: HTTP 200 and `status == "ok"`. When the
/// public page was requested, a missing or empty URL is a fatal
/// inconsistency (the service accepted the request but did not honor it);
/// when it was not, the outcome is the empty string.
pub fn interpret_finish(status: u16, body: &str, public_page: bool) -> Result<String> {
    if status != 200 {
        return Err(ClientError::Status(status));
    }

    let resp: FinishUploadResponse = serde_json::from_str(body)?;
    if resp.status.as_deref() != Some("ok") {
        let detail = resp
            .error_msg
            .or(resp.status)
            .unwrap_or_default();
        return Err(ClientError::FinishNotOk(detail));
    }

    if !public_page {
        return Ok(String::new());
    }

    match resp.public_install_page_url {
        Some(url) if !url.is_empty() => Ok(url),
        _ => Err(ClientError::PublicPageUnavailable),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_accepts_complete_response() {
        let body = r#"{"upload_url":"https://storage.example.com/up/1","id":"artifact-1"}"#;
        let remote = interpret_register(200, body).unwrap();
        assert_eq!(remote.id, "artifact-1");
        assert_eq!(remote.upload_url, "https://storage.example.com/up/1");
    }

    #[test]
    fn test_register_normalizes_numeric_id() {
        let body = r#"{"upload_url":"https://storage.example.com/up/2","id":42}"#;
        let remote = interpret_register(200, body).unwrap();
        assert_eq!(remote.id, "42");
    }

    #[test]
    fn test_register_non_200_is_transient() {
        let err = interpret_register(502, "{}").unwrap_err();
        assert!(matches!(err, ClientError::Status(502)));
        assert!(err.is_transient());
    }

    #[test]
    fn test_register_malformed_body_is_transient() {
        let err = interpret_register(200, "<html>not json</html>").unwrap_err();
        assert!(err.is_transient());
    }

    #[test]
    fn test_register_error_msg_is_definitive() {
        let body = r#"{"error_msg":"build expired"}"#;
        let err = interpret_register(200, body).unwrap_err();
        assert!(matches!(err, ClientError::Rejected(ref m) if m == "build expired"));
        assert!(!err.is_transient());
    }

    #[test]
    fn test_register_missing_upload_url_is_definitive() {
        let err = interpret_register(200, r#"{"id":"a"}"#).unwrap_err();
        assert!(matches!(err, ClientError::MissingField("upload_url")));
        assert!(!err.is_transient());
    }

    #[test]
    fn test_register_missing_id_is_definitive() {
        let err = interpret_register(200, r#"{"upload_url":"https://u"}"#).unwrap_err();
        assert!(matches!(err, ClientError::MissingField("id")));
    }

    #[test]
    fn test_finish_without_public_page_yields_empty_url() {
        let body = r#"{"status":"ok"}"#;
        assert_eq!(interpret_finish(200, body, false).unwrap(), "");
    }

    #[test]
    fn test_finish_with_public_page_returns_url() {
        let body = r#"{"status":"ok","public_install_page_url":"https://host.example.com/i/abc"}"#;
        assert_eq!(
            interpret_finish(200, body, true).unwrap(),
            "https://host.example.com/i/abc"
        );
    }

    #[test]
    fn test_finish_public_page_requested_but_absent_is_fatal() {
        // `status: ok` with no URL must not degrade to a silently empty
        // outcome when the page was requested.
        let body = r#"{"status":"ok","public_install_page_url":""}"#;
        let err = interpret_finish(200, body, true).unwrap_err();
        assert!(matches!(err, ClientError::PublicPageUnavailable));
        assert!(!err.is_transient());
    }

    #[test]
    fn test_finish_status_not_ok_is_definitive() {
        let body = r#"{"status":"error","error_msg":"artifact not found"}"#;
        let err = interpret_finish(200, body, false).unwrap_err();
        assert!(matches!(err, ClientError::FinishNotOk(ref m) if m == "artifact not found"));
        assert!(!err.is_transient());
    }
}
