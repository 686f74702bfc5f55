// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Provider configuration, read once at process start.
//!
//! Each setting accepts a `VIGIL_*` name and the name the Azure Functions
//! deployment used (`TenantId`, `SubscriptionId`). The `VIGIL_*` name wins.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unknown provider '{0}' (expected aci or fake)")]
    UnknownProvider(String),
    #[error("unknown auth mode '{0}' (expected local or managed-identity)")]
    UnknownAuth(String),
    #[error("local auth needs a tenant id (VIGIL_TENANT_ID or TenantId)")]
    MissingTenant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    /// Azure Container Instances over the management REST API
    Aci,
    /// Scripted in-process provider
    Fake,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    Local,
    ManagedIdentity,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    pub kind: ProviderKind,
    pub auth: AuthMode,
    pub tenant_id: Option<String>,
    pub subscription_id: Option<String>,
    /// User-assigned managed identity
    pub identity_client_id: Option<String>,
    pub management_endpoint: String,
    /// Script for the fake provider
    pub fake_script: Option<PathBuf>,
}

pub const DEFAULT_MANAGEMENT_ENDPOINT: &str = "https://management.azure.com";

impl ProviderConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source.
    ///
    /// Without an explicit `VIGIL_AUTH`, a configured tenant selects local
    /// auth and its absence selects managed identity.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |names: &[&str]| {
            names.iter().find_map(|n| lookup(n)).map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
        };

        let kind = match get(&["VIGIL_PROVIDER"]).as_deref() {
            None | Some("aci") => ProviderKind::Aci,
            Some("fake") => ProviderKind::Fake,
            Some(other) => return Err(ConfigError::UnknownProvider(other.to_string())),
        };
        let tenant_id = get(&["VIGIL_TENANT_ID", "TenantId"]);
        let auth = match get(&["VIGIL_AUTH"]).as_deref() {
            Some("local") => AuthMode::Local,
            Some("managed-identity") | Some("msi") => AuthMode::ManagedIdentity,
            Some(other) => return Err(ConfigError::UnknownAuth(other.to_string())),
            None if tenant_id.is_some() => AuthMode::Local,
            None => AuthMode::ManagedIdentity,
        };
        if kind == ProviderKind::Aci && auth == AuthMode::Local && tenant_id.is_none() {
            return Err(ConfigError::MissingTenant);
        }

        Ok(Self {
            kind,
            auth,
            tenant_id,
            subscription_id: get(&["VIGIL_SUBSCRIPTION_ID", "SubscriptionId"]),
            identity_client_id: get(&["VIGIL_IDENTITY_CLIENT_ID"]),
            management_endpoint: get(&["VIGIL_MANAGEMENT_ENDPOINT"])
                .unwrap_or_else(|| DEFAULT_MANAGEMENT_ENDPOINT.to_string()),
            fake_script: get(&["VIGIL_FAKE_SCRIPT"]).map(PathBuf::from),
        })
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
