// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn cli_token_with_epoch_expiry() {
    let out = br#"{"accessToken": "eyJ0", "expiresOn": "2026-01-01 10:00:00.000000", "expires_on": 1767261600, "tenant": "t"}"#;
    let token = parse_cli_token(out).unwrap();
    assert_eq!(token.token, "eyJ0");
    assert_eq!(token.expires_on, Some(1_767_261_600));
}

#[test]
fn cli_token_from_older_cli_has_no_expiry() {
    let out = br#"{"accessToken": "eyJ0", "expiresOn": "2026-01-01 10:00:00.000000"}"#;
    let token = parse_cli_token(out).unwrap();
    assert_eq!(token.expires_on, None);
    assert!(!token.is_fresh(0, 0), "unknown expiry is never cached");
}

#[yare::parameterized(
    not_json     = { b"az: command failed" as &[u8] },
    empty_token  = { br#"{"accessToken": ""}"# },
    missing      = { br#"{"token": "x"}"# },
)]
fn bad_cli_output_is_a_parse_error(out: &[u8]) {
    assert!(matches!(parse_cli_token(out), Err(CredentialError::Parse(_))));
}

#[yare::parameterized(
    string_expiry = { r#"{"access_token": "abc", "expires_on": "1767261600"}"#, Some(1_767_261_600) },
    number_expiry = { r#"{"access_token": "abc", "expires_on": 1767261600}"#, Some(1_767_261_600) },
    no_expiry     = { r#"{"access_token": "abc"}"#, None },
)]
fn identity_token_expiry_formats(body: &str, expected: Option<u64>) {
    let token = parse_identity_token(body.as_bytes()).unwrap();
    assert_eq!(token.token, "abc");
    assert_eq!(token.expires_on, expected);
}

#[test]
fn freshness_respects_margin() {
    let token = AccessToken { token: "t".to_string(), expires_on: Some(1_000) };
    assert!(token.is_fresh(500, 300));
    assert!(!token.is_fresh(700, 300));
    assert!(!token.is_fresh(1_000, 0));
}

#[yare::parameterized(
    throttled   = { 429, true },
    unavailable = { 503, true },
    forbidden   = { 403, false },
)]
fn rejected_transience(status: u16, transient: bool) {
    let err = CredentialError::Rejected { status, body: String::new() };
    assert_eq!(err.is_transient(), transient);
}

#[test]
fn cli_errors_are_not_transient() {
    assert!(!CredentialError::Cli("Please run 'az login'".to_string()).is_transient());
}
