// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

fn target() -> JobTarget {
    JobTarget::new("rg", "nightly")
}

#[test]
fn group_url_layout() {
    assert_eq!(
        group_url("https://management.azure.com", "sub-1", &target()),
        "https://management.azure.com/subscriptions/sub-1/resourceGroups/rg/providers/Microsoft.ContainerInstance/containerGroups/nightly"
    );
}

#[yare::parameterized(
    group_named = { None, "/containers/nightly/logs" },
    named       = { Some("sidecar"), "/containers/sidecar/logs" },
)]
fn logs_url_picks_container(container: Option<&str>, suffix: &str) {
    let url = logs_url("https://arm/group", &target(), container);
    assert_eq!(url, format!("https://arm/group{suffix}"));
}

#[test]
fn endpoint_trailing_slash_is_trimmed() {
    struct NoCredential;

    #[async_trait]
    impl CredentialProvider for NoCredential {
        fn name(&self) -> &'static str {
            "none"
        }

        async fn token(&self) -> Result<AccessToken, crate::credential::CredentialError> {
            Ok(AccessToken { token: String::new(), expires_on: None })
        }
    }

    let client = AciJobControl::new("http://localhost:1/", "s".to_string(), Box::new(NoCredential));
    assert!(client.group_url(&target()).starts_with("http://localhost:1/subscriptions/s/"));
}

#[yare::parameterized(
    not_found   = { 404, "not_found" },
    timeout     = { 408, "transient" },
    throttled   = { 429, "transient" },
    bad_gateway = { 502, "transient" },
    forbidden   = { 403, "rejected" },
    conflict    = { 409, "rejected" },
)]
fn classifies_status_codes(code: u16, expected: &str) {
    let status = StatusCode::from_u16(code).unwrap();
    let err = classify_response(status, "", &target());
    let kind = match err {
        JobControlError::NotFound(_) => "not_found",
        JobControlError::Transient(_) => "transient",
        JobControlError::Rejected(_) => "rejected",
        _ => "other",
    };
    assert_eq!(kind, expected);
}

#[test]
fn error_envelope_detail_is_kept() {
    let body = r#"{"error": {"code": "ResourceGroupNotFound", "message": "Resource group 'rg' could not be found."}}"#;
    let err = classify_response(StatusCode::NOT_FOUND, body, &target());
    let text = err.to_string();
    assert!(text.contains("rg/nightly"), "{text}");
    assert!(text.contains("ResourceGroupNotFound"), "{text}");
}

#[tokio::test]
async fn unreachable_endpoint_is_transient() {
    struct StaticToken;

    #[async_trait]
    impl CredentialProvider for StaticToken {
        fn name(&self) -> &'static str {
            "static"
        }

        async fn token(&self) -> Result<AccessToken, crate::credential::CredentialError> {
            Ok(AccessToken { token: "t".to_string(), expires_on: Some(u64::MAX) })
        }
    }

    // Port 9 (discard) on localhost is not expected to be listening
    let client = AciJobControl::new("http://127.0.0.1:9", "s".to_string(), Box::new(StaticToken));
    let err = client.get_status(&target()).await.unwrap_err();
    assert!(err.is_transient(), "{err}");
}

struct FixedToken;

#[async_trait]
impl CredentialProvider for FixedToken {
    fn name(&self) -> &'static str {
        "fixed"
    }

    async fn token(&self) -> Result<AccessToken, crate::credential::CredentialError> {
        Ok(AccessToken { token: "identity-token".to_string(), expires_on: Some(u64::MAX) })
    }
}

/// Answer a single HTTP request with `status` and `body`; the task yields the request head.
async fn serve_once(
    status: &'static str,
    body: &'static str,
) -> (String, tokio::task::JoinHandle<String>) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut head = Vec::new();
        let mut buf = [0u8; 1024];
        while !head.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            head.extend_from_slice(&buf[..n]);
        }
        let response = format!(
            "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
            body.len()
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        let _ = socket.shutdown().await;
        String::from_utf8_lossy(&head).into_owned()
    });
    (format!("http://{addr}/"), handle)
}

#[tokio::test]
async fn identity_without_subscription_uses_first_enabled_one() {
    let (endpoint, server) = serve_once(
        "200 OK",
        r#"{"value": [{"subscriptionId": "off", "state": "Disabled"}, {"subscriptionId": "sub-live", "state": "Enabled"}]}"#,
    )
    .await;

    let subscription = first_enabled_subscription(&endpoint, &FixedToken).await.unwrap();
    assert_eq!(subscription, "sub-live");

    let head = server.await.unwrap().to_ascii_lowercase();
    assert!(head.starts_with("get /subscriptions?api-version=2020-01-01 "), "{head}");
    assert!(head.contains("authorization: bearer identity-token"), "{head}");
}

#[tokio::test]
async fn identity_with_no_enabled_subscription_is_rejected() {
    let (endpoint, server) =
        serve_once("200 OK", r#"{"value": [{"subscriptionId": "off", "state": "Disabled"}]}"#)
            .await;

    let err = first_enabled_subscription(&endpoint, &FixedToken).await.unwrap_err();
    assert!(matches!(err, JobControlError::Rejected(_)), "{err}");
    assert!(err.to_string().contains("VIGIL_SUBSCRIPTION_ID"), "{err}");
    server.await.unwrap();
}

#[tokio::test]
async fn forbidden_subscription_listing_is_rejected() {
    let (endpoint, server) = serve_once(
        "403 Forbidden",
        r#"{"error": {"code": "AuthorizationFailed", "message": "no access"}}"#,
    )
    .await;

    let err = first_enabled_subscription(&endpoint, &FixedToken).await.unwrap_err();
    assert!(!err.is_transient());
    assert!(err.to_string().contains("AuthorizationFailed"), "{err}");
    server.await.unwrap();
}
