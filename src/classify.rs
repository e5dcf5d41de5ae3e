use serde::Serialize;

use crate::types::{HealthStatus, TaskStatus};

/// Exit codes of a container that shut down on request (143 is SIGTERM).
const EXPECTED_EXIT_CODES: [i32; 2] = [0, 143];
/// Stop reason token ECS uses for tasks replaced by a deployment.
const DEPLOYMENT_TOKEN: &str = "(deployment";
const SUPPRESSED_ENVIRONMENTS: [&str; 2] = ["test", "staging"];

/// The status fields the stop rule is evaluated over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StopSignals {
    pub last_status: TaskStatus,
    pub health_status: HealthStatus,
    pub desired_status: TaskStatus,
    pub exit_code: Option<i32>,
}

impl StopSignals {
    pub fn is_abnormal(&self) -> bool {
        let unhealthy_stop = self.last_status == TaskStatus::Stopping
            && self.health_status == HealthStatus::Unhealthy;

        let crashed = matches!(self.last_status, TaskStatus::Stopping | TaskStatus::Stopped)
            && self
                .exit_code
                .is_some_and(|code| !EXPECTED_EXIT_CODES.contains(&code));

        let unexpected_stop =
            self.last_status == TaskStatus::Stopped && self.desired_status != TaskStatus::Stopped;

        unhealthy_stop || crashed || unexpected_stop
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SuppressReason {
    /// The task was replaced by a service deployment.
    Deployment,
    /// The account is a non-production environment.
    Environment,
}

/// Decides whether an abnormal stop should stay silent.
pub fn suppression(stopped_reason: Option<&str>, account_alias: &str) -> Option<SuppressReason> {
    let deployment = stopped_reason
        .is_some_and(|reason| reason.split(' ').any(|token| token == DEPLOYMENT_TOKEN));
    if deployment {
        return Some(SuppressReason::Deployment);
    }
    if SUPPRESSED_ENVIRONMENTS.contains(&account_alias) {
        return Some(SuppressReason::Environment);
    }
    None
}
