// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Azure Container Instances over the ARM REST API.

mod model;

use super::{JobControl, JobControlError};
use crate::config::{AuthMode, ProviderConfig};
use crate::credential::{
    AccessToken, CredentialProvider, LocalTokenProvider, ManagedIdentityProvider,
};
use async_trait::async_trait;
use model::{ContainerGroup, ErrorEnvelope, LogsResponse, SubscriptionList};
use parking_lot::Mutex;
use reqwest::{Method, StatusCode};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use vigil_core::{JobStatusSnapshot, JobTarget};

const API_VERSION: &str = "2023-05-01";
const SUBSCRIPTIONS_API_VERSION: &str = "2020-01-01";
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);
/// Refresh tokens this long before they expire
const TOKEN_REFRESH_MARGIN_SECS: u64 = 300;

struct Inner {
    http: reqwest::Client,
    endpoint: String,
    subscription_id: String,
    credential: Box<dyn CredentialProvider>,
    token: Mutex<Option<AccessToken>>,
}

#[derive(Clone)]
pub struct AciJobControl {
    inner: Arc<Inner>,
}

impl AciJobControl {
    /// Pick the credential source and resolve the subscription.
    ///
    /// Without a configured subscription, local auth uses the CLI's default
    /// and managed identity takes the first enabled subscription it can see.
    pub async fn connect(config: &ProviderConfig) -> Result<Self, JobControlError> {
        let (credential, configured): (Box<dyn CredentialProvider>, Option<String>) =
            match config.auth {
                AuthMode::Local => {
                    let tenant = config.tenant_id.clone().unwrap_or_default();
                    let provider = LocalTokenProvider::new(tenant);
                    let subscription = match &config.subscription_id {
                        Some(id) => id.clone(),
                        None => provider.default_subscription().await?,
                    };
                    (Box::new(provider), Some(subscription))
                }
                AuthMode::ManagedIdentity => {
                    let provider =
                        ManagedIdentityProvider::from_env(config.identity_client_id.clone());
                    (Box::new(provider), config.subscription_id.clone())
                }
            };
        let subscription_id = match configured {
            Some(id) => id,
            None => {
                first_enabled_subscription(&config.management_endpoint, credential.as_ref())
                    .await?
            }
        };
        tracing::info!(
            credential = credential.name(),
            subscription = %subscription_id,
            "azure container instances provider ready"
        );
        Ok(Self::new(&config.management_endpoint, subscription_id, credential))
    }

    pub fn new(
        endpoint: &str,
        subscription_id: String,
        credential: Box<dyn CredentialProvider>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                http: http_client(),
                endpoint: endpoint.trim_end_matches('/').to_string(),
                subscription_id,
                credential,
                token: Mutex::new(None),
            }),
        }
    }

    fn group_url(&self, target: &JobTarget) -> String {
        group_url(&self.inner.endpoint, &self.inner.subscription_id, target)
    }

    async fn bearer(&self) -> Result<String, JobControlError> {
        let now = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_secs();
        let cached = self.inner.token.lock().clone();
        if let Some(token) = cached.filter(|t| t.is_fresh(now, TOKEN_REFRESH_MARGIN_SECS)) {
            return Ok(token.token);
        }
        let token = self.inner.credential.token().await?;
        let bearer = token.token.clone();
        *self.inner.token.lock() = Some(token);
        Ok(bearer)
    }

    async fn send(
        &self,
        method: Method,
        url: String,
        target: &JobTarget,
    ) -> Result<String, JobControlError> {
        let bearer = self.bearer().await?;
        let mut request = self
            .inner
            .http
            .request(method.clone(), &url)
            .query(&[("api-version", API_VERSION)])
            .bearer_auth(bearer);
        if method == Method::POST {
            // ARM rejects body-less POSTs without an explicit length
            request = request.header(reqwest::header::CONTENT_LENGTH, "0");
        }
        let response = request
            .send()
            .await
            .map_err(|e| JobControlError::Transient(format!("{method} {target}: {e}")))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| JobControlError::Transient(format!("{method} {target}: {e}")))?;
        if status.is_success() {
            return Ok(body);
        }
        tracing::debug!(%method, %target, status = status.as_u16(), "provider error response");
        Err(classify_response(status, &body, target))
    }
}

fn http_client() -> reqwest::Client {
    reqwest::Client::builder().timeout(HTTP_TIMEOUT).build().unwrap_or_else(|_| reqwest::Client::new())
}

/// List the subscriptions visible to `credential` and pick the first enabled one.
async fn first_enabled_subscription(
    endpoint: &str,
    credential: &dyn CredentialProvider,
) -> Result<String, JobControlError> {
    let token = credential.token().await?;
    let url = format!("{}/subscriptions", endpoint.trim_end_matches('/'));
    let response = http_client()
        .get(&url)
        .query(&[("api-version", SUBSCRIPTIONS_API_VERSION)])
        .bearer_auth(token.token)
        .send()
        .await
        .map_err(|e| JobControlError::Transient(format!("GET {url}: {e}")))?;
    let status = response.status();
    let body =
        response.text().await.map_err(|e| JobControlError::Transient(format!("GET {url}: {e}")))?;
    if !status.is_success() {
        let detail = match serde_json::from_str::<ErrorEnvelope>(&body) {
            Ok(envelope) => format!("{}: {}", envelope.error.code, envelope.error.message),
            Err(_) => format!("HTTP {}", status.as_u16()),
        };
        return Err(if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
            JobControlError::Transient(format!("listing subscriptions: {detail}"))
        } else {
            JobControlError::Rejected(format!("listing subscriptions: {detail}"))
        });
    }
    let list: SubscriptionList =
        serde_json::from_str(&body).map_err(|e| JobControlError::Decode(e.to_string()))?;
    list.first_enabled().ok_or_else(|| {
        JobControlError::Rejected(
            "no enabled subscription visible to the identity; set VIGIL_SUBSCRIPTION_ID"
                .to_string(),
        )
    })
}

fn group_url(endpoint: &str, subscription_id: &str, target: &JobTarget) -> String {
    format!(
        "{endpoint}/subscriptions/{subscription_id}/resourceGroups/{}/providers/Microsoft.ContainerInstance/containerGroups/{}",
        target.resource_scope, target.job_group_name
    )
}

fn logs_url(group_url: &str, target: &JobTarget, container: Option<&str>) -> String {
    let container = container.unwrap_or(&target.job_group_name);
    format!("{group_url}/containers/{container}/logs")
}

/// Map a non-success ARM response to an error.
fn classify_response(status: StatusCode, body: &str, target: &JobTarget) -> JobControlError {
    let detail = match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => format!("{}: {}", envelope.error.code, envelope.error.message),
        Err(_) => format!("HTTP {}", status.as_u16()),
    };
    match status {
        StatusCode::NOT_FOUND => JobControlError::NotFound(format!("{target} ({detail})")),
        StatusCode::REQUEST_TIMEOUT | StatusCode::TOO_MANY_REQUESTS => {
            JobControlError::Transient(format!("{target}: {detail}"))
        }
        s if s.is_server_error() => JobControlError::Transient(format!("{target}: {detail}")),
        _ => JobControlError::Rejected(format!("{target}: {detail}")),
    }
}

#[async_trait]
impl JobControl for AciJobControl {
    async fn stop(&self, target: &JobTarget) -> Result<(), JobControlError> {
        let url = format!("{}/stop", self.group_url(target));
        self.send(Method::POST, url, target).await.map(|_| ())
    }

    async fn start(&self, target: &JobTarget) -> Result<(), JobControlError> {
        // Long-running operation; polling the group observes its progress
        let url = format!("{}/start", self.group_url(target));
        self.send(Method::POST, url, target).await.map(|_| ())
    }

    async fn get_status(
        &self,
        target: &JobTarget,
    ) -> Result<Option<JobStatusSnapshot>, JobControlError> {
        let body = match self.send(Method::GET, self.group_url(target), target).await {
            Ok(body) => body,
            Err(JobControlError::NotFound(_)) => return Ok(None),
            Err(e) => return Err(e),
        };
        let group: ContainerGroup =
            serde_json::from_str(&body).map_err(|e| JobControlError::Decode(e.to_string()))?;
        Ok(Some(group.into_snapshot(&target.resource_scope)))
    }

    async fn get_logs(
        &self,
        target: &JobTarget,
        container: Option<&str>,
    ) -> Result<String, JobControlError> {
        let url = logs_url(&self.group_url(target), target, container);
        let body = self.send(Method::GET, url, target).await?;
        let logs: LogsResponse =
            serde_json::from_str(&body).map_err(|e| JobControlError::Decode(e.to_string()))?;
        Ok(logs.content.unwrap_or_default())
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
