use std::sync::Arc;

use log::info;
use serde::Serialize;

use crate::account::{account_alias, resolve_task_describer};
use crate::aws::{AccountDirectory, AwsError, CallerIdentity, EcsConnector, RoleAssumer};
use crate::classify::{StopSignals, SuppressReason, suppression};
use crate::config::Config;
use crate::event::{EventError, TaskStateChangeEvent};
use crate::notify::{Channel, Notification, Notifier, NotifyError, SlackMessage};

/// Result of one invocation, returned to the Lambda runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    /// The transition is not an abnormal stop.
    Normal,
    Suppressed { reason: SuppressReason },
    Notified,
}

#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    #[error(transparent)]
    Event(#[from] EventError),
    #[error(transparent)]
    Aws(#[from] AwsError),
    #[error(transparent)]
    Notify(#[from] NotifyError),
}

/// The outside world, as seen by the handler.
#[derive(Clone)]
pub struct Clients {
    pub identity: Arc<dyn CallerIdentity>,
    pub roles: Arc<dyn RoleAssumer>,
    pub directory: Arc<dyn AccountDirectory>,
    pub ecs: Arc<dyn EcsConnector>,
    pub notifier: Arc<dyn Notifier>,
}

pub struct EventHandler {
    config: Config,
    clients: Clients,
}

impl EventHandler {
    pub fn new(config: Config, clients: Clients) -> Self {
        Self { config, clients }
    }

    pub async fn handle(&self, raw: serde_json::Value) -> Result<Outcome, HandlerError> {
        // Every event is echoed before anything can reject it
        self.clients
            .notifier
            .send(Channel::Audit, &SlackMessage::audit(&raw))
            .await?;

        let event = TaskStateChangeEvent::from_value(raw)?;
        let cluster = event.cluster_name()?;
        let service_name = event.service_name()?;
        let detail = &event.detail;

        let caller_account = self.clients.identity.caller_account().await?;
        let alias = account_alias(
            self.clients.directory.as_ref(),
            &event.account,
            &self.config.alias_prefix,
        )
        .await?;

        let describer = resolve_task_describer(
            &caller_account,
            &event.account,
            self.clients.roles.as_ref(),
            self.clients.ecs.as_ref(),
            &self.config.cross_account,
        )
        .await?;
        let task = describer.describe_task(cluster, &detail.task_arn).await?;

        let signals = StopSignals {
            last_status: detail.last_status,
            health_status: task.health_status,
            desired_status: task.desired_status.unwrap_or(detail.desired_status),
            exit_code: task.exit_code,
        };

        info!(
            "environment: {} service: {} taskArn: {} taskLastStatus: {} taskHealthStatus: {} taskDesiredStatus: {}",
            alias,
            service_name,
            detail.task_arn,
            signals.last_status,
            signals.health_status,
            signals.desired_status
        );

        if !signals.is_abnormal() {
            return Ok(Outcome::Normal);
        }

        if let Some(reason) = suppression(detail.stopped_reason.as_deref(), &alias) {
            info!("Abnormal stop of {service_name} in {alias} suppressed: {reason:?}");
            return Ok(Outcome::Suppressed { reason });
        }

        info!("Abnormal stop of {service_name} in {alias}, notifying");
        let notification = Notification {
            service_name,
            account_alias: alias,
            stopping_at: detail.stopping_at.clone(),
            stopped_reason: detail.stopped_reason.clone(),
            stop_code: detail.stop_code.clone(),
            exit_code: task.exit_code,
            container_reason: task.container_reason,
            started_at: task.started_at,
        };
        self.clients
            .notifier
            .send(Channel::Alert, &notification.to_message())
            .await?;

        Ok(Outcome::Notified)
    }
}
