//! Narrow views over the AWS APIs the handler needs.
//!
//! Each trait covers one capability so the handler can be driven by
//! in-memory fakes in tests. The SDK-backed implementations live in the
//! submodules.

pub mod ecs;
pub mod organizations;
pub mod sts;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use secrecy::SecretString;

use crate::types::{HealthStatus, TaskStatus};

#[derive(Debug, thiserror::Error)]
pub enum AwsError {
    #[error("ECS error: {0}")]
    Ecs(String),
    #[error("STS error: {0}")]
    Sts(String),
    #[error("Organizations error: {0}")]
    Organizations(String),
    #[error("{0} response is missing {1}")]
    MissingField(&'static str, &'static str),
    #[error("No task {task_arn} in cluster {cluster}")]
    TaskNotFound { cluster: String, task_arn: String },
    #[error("Task {0} has no containers")]
    NoContainers(String),
}

/// Short-lived credentials returned by a role assumption.
#[derive(Debug)]
pub struct TemporaryCredentials {
    pub access_key_id: String,
    pub secret_access_key: SecretString,
    pub session_token: SecretString,
}

/// The fields of a described task the stop rule looks at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDescription {
    pub health_status: HealthStatus,
    pub desired_status: Option<TaskStatus>,
    /// Exit code of the first container.
    pub exit_code: Option<i32>,
    /// Reason reported for the first container.
    pub container_reason: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
}

#[async_trait]
pub trait CallerIdentity: Send + Sync {
    /// Account id the handler itself runs under.
    async fn caller_account(&self) -> Result<String, AwsError>;
}

#[async_trait]
pub trait RoleAssumer: Send + Sync {
    async fn assume_role(
        &self,
        role_arn: &str,
        session_name: &str,
    ) -> Result<TemporaryCredentials, AwsError>;
}

#[async_trait]
pub trait AccountDirectory: Send + Sync {
    /// Human readable name of an organization member account.
    async fn account_name(&self, account_id: &str) -> Result<String, AwsError>;
}

#[async_trait]
pub trait TaskDescriber: Send + Sync {
    async fn describe_task(
        &self,
        cluster: &str,
        task_arn: &str,
    ) -> Result<TaskDescription, AwsError>;
}

/// Hands out task describers for the local account or for another account
/// reached through temporary credentials.
pub trait EcsConnector: Send + Sync {
    fn same_account(&self) -> Box<dyn TaskDescriber>;
    fn cross_account(
        &self,
        credentials: TemporaryCredentials,
        region: &str,
    ) -> Box<dyn TaskDescriber>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_credentials_debug_redacts_secrets() {
        let creds = TemporaryCredentials {
            access_key_id: "ASIAEXAMPLE".to_string(),
            secret_access_key: SecretString::from("wJalrXUtnFEMI".to_string()),
            session_token: SecretString::from("FwoGZXIvYXdzE".to_string()),
        };
        let printed = format!("{:?}", creds);
        assert!(printed.contains("ASIAEXAMPLE"));
        assert!(!printed.contains("wJalrXUtnFEMI"));
        assert!(!printed.contains("FwoGZXIvYXdzE"));

        // The values are still there for the SDK
        assert_eq!(creds.secret_access_key.expose_secret(), "wJalrXUtnFEMI");
        assert_eq!(creds.session_token.expose_secret(), "FwoGZXIvYXdzE");
    }
}
