use serde::Deserialize;

use crate::types::TaskStatus;

/// Group suffix ECS services conventionally carry.
const SERVICE_SUFFIX: &str = "service";

/// An EventBridge "ECS Task State Change" event.
///
/// Only the fields the handler reads are modelled; everything else in the
/// payload is ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct TaskStateChangeEvent {
    pub account: String,
    pub detail: TaskStateChangeDetail,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskStateChangeDetail {
    pub cluster_arn: String,
    pub task_arn: String,
    /// `service:<name>` for service tasks, `family:<name>` for standalone ones.
    pub group: String,
    pub last_status: TaskStatus,
    pub desired_status: TaskStatus,
    #[serde(default)]
    pub stopping_at: Option<String>,
    #[serde(default)]
    pub stopped_reason: Option<String>,
    #[serde(default)]
    pub stop_code: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum EventError {
    #[error("Malformed task state change event: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("Cluster ARN {0:?} has no cluster name segment")]
    ClusterArn(String),
    #[error("Group {0:?} is not of the form <type>:<name>")]
    Group(String),
}

impl TaskStateChangeEvent {
    pub fn from_value(value: serde_json::Value) -> Result<Self, EventError> {
        Ok(serde_json::from_value(value)?)
    }

    /// `arn:aws:ecs:<region>:<account>:cluster/<name>` -> `<name>`
    pub fn cluster_name(&self) -> Result<&str, EventError> {
        self.detail
            .cluster_arn
            .split('/')
            .nth(1)
            .ok_or_else(|| EventError::ClusterArn(self.detail.cluster_arn.clone()))
    }

    pub fn service_name(&self) -> Result<String, EventError> {
        let name = self
            .detail
            .group
            .split(':')
            .nth(1)
            .ok_or_else(|| EventError::Group(self.detail.group.clone()))?;
        Ok(strip_service_suffix(name))
    }
}

/// Drops a trailing `-service` segment: `my-app-service` -> `my-app`.
pub fn strip_service_suffix(name: &str) -> String {
    let mut segments: Vec<&str> = name.split('-').collect();
    if segments.last() == Some(&SERVICE_SUFFIX) {
        segments.pop();
    }
    segments.join("-")
}
