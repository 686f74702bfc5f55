// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Subset of the ARM container group schema

use serde::Deserialize;
use vigil_core::{ContainerStatus, JobStatusSnapshot};

#[derive(Debug, Deserialize)]
pub(crate) struct ContainerGroup {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub properties: GroupProperties,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GroupProperties {
    #[serde(default)]
    pub provisioning_state: Option<String>,
    #[serde(default)]
    pub containers: Vec<Container>,
    #[serde(default)]
    pub instance_view: Option<GroupInstanceView>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GroupInstanceView {
    #[serde(default)]
    pub state: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Container {
    pub name: String,
    #[serde(default)]
    pub properties: ContainerProperties,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ContainerProperties {
    #[serde(default)]
    pub instance_view: Option<ContainerInstanceView>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ContainerInstanceView {
    #[serde(default)]
    pub current_state: Option<ContainerState>,
    #[serde(default)]
    pub restart_count: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ContainerState {
    #[serde(default)]
    pub state: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LogsResponse {
    #[serde(default)]
    pub content: Option<String>,
}

/// `GET /subscriptions` response
#[derive(Debug, Deserialize)]
pub(crate) struct SubscriptionList {
    #[serde(default)]
    pub value: Vec<Subscription>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Subscription {
    pub subscription_id: String,
    #[serde(default)]
    pub state: Option<String>,
}

impl SubscriptionList {
    pub fn first_enabled(self) -> Option<String> {
        self.value
            .into_iter()
            .find(|s| s.state.as_deref() == Some("Enabled"))
            .map(|s| s.subscription_id)
    }
}

/// ARM error envelope: `{"error": {"code": "...", "message": "..."}}`
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
}

impl ContainerGroup {
    pub fn into_snapshot(self, resource_scope: &str) -> JobStatusSnapshot {
        let overall_state = self
            .properties
            .instance_view
            .and_then(|v| v.state)
            .or(self.properties.provisioning_state)
            .unwrap_or_default();
        let containers = self
            .properties
            .containers
            .into_iter()
            .map(|c| {
                let view = c.properties.instance_view;
                ContainerStatus {
                    name: c.name,
                    current_state_label: view
                        .as_ref()
                        .and_then(|v| v.current_state.as_ref())
                        .and_then(|s| s.state.clone()),
                    restart_count: view.and_then(|v| v.restart_count),
                }
            })
            .collect();
        JobStatusSnapshot {
            instance_id: self.id,
            display_name: self.name,
            resource_scope: resource_scope.to_string(),
            overall_state,
            containers,
        }
    }
}

#[cfg(test)]
#[path = "model_tests.rs"]
mod tests;
