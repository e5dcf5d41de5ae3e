use log::info;

use crate::aws::{AccountDirectory, AwsError, EcsConnector, RoleAssumer, TaskDescriber};
use crate::config::CrossAccountConfig;

const ROLE_SESSION_NAME: &str = "ecs-state-check";

/// Looks up the account name and drops the organization prefix.
pub async fn account_alias(
    directory: &dyn AccountDirectory,
    account_id: &str,
    prefix: &str,
) -> Result<String, AwsError> {
    let name = directory.account_name(account_id).await?;
    Ok(normalize_alias(&name, prefix))
}

/// `lifemote-prod` -> `prod`. Only an exact match on the first
/// `-`-separated segment is removed.
pub fn normalize_alias(name: &str, prefix: &str) -> String {
    let mut segments = name.split('-');
    match segments.next() {
        Some(first) if first == prefix => segments.collect::<Vec<_>>().join("-"),
        _ => name.to_string(),
    }
}

/// Picks the ECS client for the account that emitted the event.
pub async fn resolve_task_describer(
    caller_account: &str,
    target_account: &str,
    roles: &dyn RoleAssumer,
    ecs: &dyn EcsConnector,
    cross_account: &CrossAccountConfig,
) -> Result<Box<dyn TaskDescriber>, AwsError> {
    if caller_account == target_account {
        return Ok(ecs.same_account());
    }

    let role_arn = cross_account.role_arn(target_account);
    info!("Assuming {role_arn} for account {target_account}");
    let credentials = roles.assume_role(&role_arn, ROLE_SESSION_NAME).await?;
    Ok(ecs.cross_account(credentials, &cross_account.region))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aws::{TaskDescription, TemporaryCredentials};
    use crate::types::HealthStatus;
    use async_trait::async_trait;
    use secrecy::{ExposeSecret, SecretString};
    use std::sync::Mutex;

    #[test]
    fn test_normalize_alias() {
        assert_eq!(normalize_alias("lifemote-prod", "lifemote"), "prod");
        assert_eq!(normalize_alias("prod", "lifemote"), "prod");
        assert_eq!(normalize_alias("lifemote-eu-prod", "lifemote"), "eu-prod");
        assert_eq!(normalize_alias("lifemotes-prod", "lifemote"), "lifemotes-prod");
        assert_eq!(normalize_alias("prod-lifemote", "lifemote"), "prod-lifemote");
        assert_eq!(normalize_alias("lifemote", "lifemote"), "");
    }

    struct StaticDirectory(Result<String, ()>);

    #[async_trait]
    impl AccountDirectory for StaticDirectory {
        async fn account_name(&self, _account_id: &str) -> Result<String, AwsError> {
            self.0
                .clone()
                .map_err(|_| AwsError::Organizations("AccessDenied".to_string()))
        }
    }

    #[tokio::test]
    async fn test_account_alias_strips_prefix() {
        let directory = StaticDirectory(Ok("lifemote-staging".to_string()));
        let alias = account_alias(&directory, "111122223333", "lifemote")
            .await
            .unwrap();
        assert_eq!(alias, "staging");
    }

    #[tokio::test]
    async fn test_account_alias_propagates_lookup_failure() {
        let directory = StaticDirectory(Err(()));
        let res = account_alias(&directory, "111122223333", "lifemote").await;
        assert!(matches!(res, Err(AwsError::Organizations(_))));
    }

    #[derive(Default)]
    struct RecordingRoles {
        calls: Mutex<Vec<(String, String)>>,
        deny: bool,
    }

    #[async_trait]
    impl RoleAssumer for RecordingRoles {
        async fn assume_role(
            &self,
            role_arn: &str,
            session_name: &str,
        ) -> Result<TemporaryCredentials, AwsError> {
            self.calls
                .lock()
                .unwrap()
                .push((role_arn.to_string(), session_name.to_string()));
            if self.deny {
                return Err(AwsError::Sts("AccessDenied".to_string()));
            }
            Ok(TemporaryCredentials {
                access_key_id: "ASIA".to_string(),
                secret_access_key: SecretString::from("secret".to_string()),
                session_token: SecretString::from("token".to_string()),
            })
        }
    }

    struct NullDescriber;

    #[async_trait]
    impl TaskDescriber for NullDescriber {
        async fn describe_task(&self, _: &str, _: &str) -> Result<TaskDescription, AwsError> {
            Ok(TaskDescription {
                health_status: HealthStatus::Unknown,
                desired_status: None,
                exit_code: None,
                container_reason: None,
                started_at: None,
            })
        }
    }

    #[derive(Default)]
    struct RecordingConnector {
        same: Mutex<usize>,
        cross: Mutex<Vec<(TemporaryCredentials, String)>>,
    }

    impl EcsConnector for RecordingConnector {
        fn same_account(&self) -> Box<dyn TaskDescriber> {
            *self.same.lock().unwrap() += 1;
            Box::new(NullDescriber)
        }

        fn cross_account(
            &self,
            credentials: TemporaryCredentials,
            region: &str,
        ) -> Box<dyn TaskDescriber> {
            self.cross
                .lock()
                .unwrap()
                .push((credentials, region.to_string()));
            Box::new(NullDescriber)
        }
    }

    #[tokio::test]
    async fn test_same_account_skips_role_assumption() {
        let roles = RecordingRoles::default();
        let ecs = RecordingConnector::default();

        resolve_task_describer(
            "111122223333",
            "111122223333",
            &roles,
            &ecs,
            &CrossAccountConfig::default(),
        )
        .await
        .unwrap();

        assert!(roles.calls.lock().unwrap().is_empty());
        assert_eq!(*ecs.same.lock().unwrap(), 1);
        assert!(ecs.cross.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_cross_account_assumes_role_in_region() {
        let roles = RecordingRoles::default();
        let ecs = RecordingConnector::default();

        resolve_task_describer(
            "111122223333",
            "444455556666",
            &roles,
            &ecs,
            &CrossAccountConfig::default(),
        )
        .await
        .unwrap();

        let calls = roles.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(
            calls[0].0,
            "arn:aws:iam::444455556666:role/ecs-api-access-cross-account-role"
        );
        assert_eq!(calls[0].1, ROLE_SESSION_NAME);

        let cross = ecs.cross.lock().unwrap();
        assert_eq!(cross.len(), 1);
        assert_eq!(cross[0].0.session_token.expose_secret(), "token");
        assert_eq!(cross[0].1, "eu-central-1");
        assert_eq!(*ecs.same.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_denied_role_is_fatal() {
        let roles = RecordingRoles {
            deny: true,
            ..Default::default()
        };
        let ecs = RecordingConnector::default();

        let res = resolve_task_describer(
            "111122223333",
            "444455556666",
            &roles,
            &ecs,
            &CrossAccountConfig::default(),
        )
        .await;

        assert!(matches!(res, Err(AwsError::Sts(_))));
        assert!(ecs.cross.lock().unwrap().is_empty());
    }
}
