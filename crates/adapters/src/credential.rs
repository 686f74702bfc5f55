// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Access tokens for the Azure management plane.
//!
//! Two sources, picked once from configuration:
//!
//! ```text
//! local            az account get-access-token (developer login, tenant scoped)
//! managed-identity IDENTITY_ENDPOINT + IDENTITY_HEADER (App Service / Functions)
//!                  falling back to the instance metadata service
//! ```

use crate::subprocess::{failure_detail, run_with_timeout, AZ_CLI_TIMEOUT};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;

/// Resource the tokens are requested for
pub const MANAGEMENT_RESOURCE: &str = "https://management.azure.com/";

const IMDS_ENDPOINT: &str = "http://169.254.169.254/metadata/identity/oauth2/token";
const IMDS_API_VERSION: &str = "2018-02-01";
const APP_SERVICE_API_VERSION: &str = "2019-08-01";
const IDENTITY_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("az cli: {0}")]
    Cli(String),
    #[error("identity endpoint unreachable: {0}")]
    Http(#[from] reqwest::Error),
    #[error("identity endpoint returned {status}: {body}")]
    Rejected { status: u16, body: String },
    #[error("unexpected token response: {0}")]
    Parse(String),
}

impl CredentialError {
    /// Failures a later attempt may not hit (network blips, endpoint 5xx).
    pub fn is_transient(&self) -> bool {
        match self {
            CredentialError::Http(_) => true,
            CredentialError::Rejected { status, .. } => *status == 429 || *status >= 500,
            CredentialError::Cli(_) | CredentialError::Parse(_) => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessToken {
    pub token: String,
    /// Expiry as epoch seconds, when the source reports one
    pub expires_on: Option<u64>,
}

impl AccessToken {
    /// Whether the token is still usable `margin_secs` from `now_secs`.
    pub fn is_fresh(&self, now_secs: u64, margin_secs: u64) -> bool {
        match self.expires_on {
            Some(expires) => now_secs + margin_secs < expires,
            None => false,
        }
    }
}

#[async_trait]
pub trait CredentialProvider: Send + Sync + 'static {
    /// Short name for logs ("local", "managed-identity")
    fn name(&self) -> &'static str;

    async fn token(&self) -> Result<AccessToken, CredentialError>;
}

/// Developer token from the logged-in `az` CLI, scoped to a tenant.
#[derive(Debug, Clone)]
pub struct LocalTokenProvider {
    tenant_id: String,
}

impl LocalTokenProvider {
    pub fn new(tenant_id: impl Into<String>) -> Self {
        Self { tenant_id: tenant_id.into() }
    }

    /// The CLI's default subscription, used when none is configured.
    pub async fn default_subscription(&self) -> Result<String, CredentialError> {
        let mut cmd = Command::new("az");
        cmd.args(["account", "show", "--query", "id", "--output", "tsv"]);
        let output = run_with_timeout(cmd, AZ_CLI_TIMEOUT, "az account show")
            .await
            .map_err(CredentialError::Cli)?;
        if !output.status.success() {
            return Err(CredentialError::Cli(failure_detail(&output)));
        }
        let id = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if id.is_empty() {
            return Err(CredentialError::Cli("no default subscription".to_string()));
        }
        Ok(id)
    }
}

#[async_trait]
impl CredentialProvider for LocalTokenProvider {
    fn name(&self) -> &'static str {
        "local"
    }

    async fn token(&self) -> Result<AccessToken, CredentialError> {
        let mut cmd = Command::new("az");
        cmd.args([
            "account",
            "get-access-token",
            "--resource",
            MANAGEMENT_RESOURCE,
            "--tenant",
            &self.tenant_id,
            "--output",
            "json",
        ]);
        let output = run_with_timeout(cmd, AZ_CLI_TIMEOUT, "az account get-access-token")
            .await
            .map_err(CredentialError::Cli)?;
        if !output.status.success() {
            return Err(CredentialError::Cli(failure_detail(&output)));
        }
        parse_cli_token(&output.stdout)
    }
}

/// Managed identity of the hosting environment.
#[derive(Debug, Clone)]
pub struct ManagedIdentityProvider {
    http: reqwest::Client,
    /// User-assigned identity; system-assigned when `None`
    client_id: Option<String>,
    /// `(IDENTITY_ENDPOINT, IDENTITY_HEADER)` when running on App Service
    app_service: Option<(String, String)>,
}

impl ManagedIdentityProvider {
    pub fn new(client_id: Option<String>, app_service: Option<(String, String)>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(IDENTITY_TIMEOUT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self { http, client_id, app_service }
    }

    /// Read the App Service identity variables from the environment.
    pub fn from_env(client_id: Option<String>) -> Self {
        let app_service = match (std::env::var("IDENTITY_ENDPOINT"), std::env::var("IDENTITY_HEADER")) {
            (Ok(endpoint), Ok(header)) if !endpoint.is_empty() => Some((endpoint, header)),
            _ => None,
        };
        Self::new(client_id, app_service)
    }

    fn request(&self) -> reqwest::RequestBuilder {
        let mut query = vec![("resource", MANAGEMENT_RESOURCE)];
        if let Some(client_id) = &self.client_id {
            query.push(("client_id", client_id.as_str()));
        }
        match &self.app_service {
            Some((endpoint, header)) => {
                query.push(("api-version", APP_SERVICE_API_VERSION));
                self.http.get(endpoint).header("X-IDENTITY-HEADER", header).query(&query)
            }
            None => {
                query.push(("api-version", IMDS_API_VERSION));
                self.http.get(IMDS_ENDPOINT).header("Metadata", "true").query(&query)
            }
        }
    }
}

#[async_trait]
impl CredentialProvider for ManagedIdentityProvider {
    fn name(&self) -> &'static str {
        "managed-identity"
    }

    async fn token(&self) -> Result<AccessToken, CredentialError> {
        let response = self.request().send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(CredentialError::Rejected { status: status.as_u16(), body });
        }
        parse_identity_token(body.as_bytes())
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CliToken {
    access_token: String,
    /// Newer CLI versions report epoch seconds directly
    #[serde(default, rename = "expires_on")]
    expires_on: Option<u64>,
}

fn parse_cli_token(stdout: &[u8]) -> Result<AccessToken, CredentialError> {
    let parsed: CliToken =
        serde_json::from_slice(stdout).map_err(|e| CredentialError::Parse(e.to_string()))?;
    if parsed.access_token.is_empty() {
        return Err(CredentialError::Parse("empty accessToken".to_string()));
    }
    Ok(AccessToken { token: parsed.access_token, expires_on: parsed.expires_on })
}

#[derive(Deserialize)]
struct IdentityToken {
    access_token: String,
    /// Epoch seconds, sent as a string by both endpoints
    #[serde(default)]
    expires_on: Option<serde_json::Value>,
}

fn parse_identity_token(body: &[u8]) -> Result<AccessToken, CredentialError> {
    let parsed: IdentityToken =
        serde_json::from_slice(body).map_err(|e| CredentialError::Parse(e.to_string()))?;
    if parsed.access_token.is_empty() {
        return Err(CredentialError::Parse("empty access_token".to_string()));
    }
    let expires_on = match parsed.expires_on {
        Some(serde_json::Value::String(s)) => s.parse().ok(),
        Some(serde_json::Value::Number(n)) => n.as_u64(),
        _ => None,
    };
    Ok(AccessToken { token: parsed.access_token, expires_on })
}

#[cfg(test)]
#[path = "credential_tests.rs"]
mod tests;
