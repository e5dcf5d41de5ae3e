use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_ecs::config::{Credentials, Region};
use aws_sdk_ecs::error::DisplayErrorContext;
use aws_sdk_ecs::types::Task;
use secrecy::ExposeSecret;

use super::{AwsError, EcsConnector, TaskDescriber, TaskDescription, TemporaryCredentials};
use crate::types::{HealthStatus, TaskStatus};

const CREDENTIALS_PROVIDER: &str = "ecs-state-check-assume-role";

pub struct EcsTaskDescriber {
    client: aws_sdk_ecs::Client,
}

impl EcsTaskDescriber {
    pub fn new(client: aws_sdk_ecs::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl TaskDescriber for EcsTaskDescriber {
    async fn describe_task(
        &self,
        cluster: &str,
        task_arn: &str,
    ) -> Result<TaskDescription, AwsError> {
        let response = self
            .client
            .describe_tasks()
            .cluster(cluster)
            .tasks(task_arn)
            .send()
            .await
            .map_err(|e| AwsError::Ecs(DisplayErrorContext(e).to_string()))?;

        // A single ARN was asked for, anything past the first match is ignored
        let task = response
            .tasks()
            .first()
            .ok_or_else(|| AwsError::TaskNotFound {
                cluster: cluster.to_string(),
                task_arn: task_arn.to_string(),
            })?;

        to_description(task, task_arn)
    }
}

fn to_description(task: &Task, task_arn: &str) -> Result<TaskDescription, AwsError> {
    let container = task
        .containers()
        .first()
        .ok_or_else(|| AwsError::NoContainers(task_arn.to_string()))?;

    let started_at = task
        .started_at()
        .and_then(|t| chrono::DateTime::from_timestamp(t.secs(), t.subsec_nanos()));

    Ok(TaskDescription {
        // A missing healthStatus maps to UNKNOWN instead of failing the invocation
        health_status: task
            .health_status()
            .map(|h| HealthStatus::from(h.as_str()))
            .unwrap_or(HealthStatus::Unknown),
        desired_status: task.desired_status().map(TaskStatus::from),
        exit_code: container.exit_code(),
        container_reason: container.reason().map(str::to_string),
        started_at,
    })
}

/// Builds ECS clients from the shared SDK configuration.
pub struct SdkEcsConnector {
    sdk_config: SdkConfig,
}

impl SdkEcsConnector {
    pub fn new(sdk_config: SdkConfig) -> Self {
        Self { sdk_config }
    }
}

impl EcsConnector for SdkEcsConnector {
    fn same_account(&self) -> Box<dyn TaskDescriber> {
        Box::new(EcsTaskDescriber::new(aws_sdk_ecs::Client::new(
            &self.sdk_config,
        )))
    }

    fn cross_account(
        &self,
        credentials: TemporaryCredentials,
        region: &str,
    ) -> Box<dyn TaskDescriber> {
        let credentials = Credentials::new(
            credentials.access_key_id,
            credentials.secret_access_key.expose_secret(),
            Some(credentials.session_token.expose_secret().to_string()),
            None,
            CREDENTIALS_PROVIDER,
        );
        let config = aws_sdk_ecs::config::Builder::from(&self.sdk_config)
            .credentials_provider(credentials)
            .region(Region::new(region.to_string()))
            .build();
        Box::new(EcsTaskDescriber::new(aws_sdk_ecs::Client::from_conf(config)))
    }
}
