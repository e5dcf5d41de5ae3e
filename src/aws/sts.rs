use async_trait::async_trait;
use aws_sdk_sts::error::DisplayErrorContext;
use secrecy::SecretString;

use super::{AwsError, CallerIdentity, RoleAssumer, TemporaryCredentials};

pub struct StsClient {
    client: aws_sdk_sts::Client,
}

impl StsClient {
    pub fn new(client: aws_sdk_sts::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl CallerIdentity for StsClient {
    async fn caller_account(&self) -> Result<String, AwsError> {
        let response = self
            .client
            .get_caller_identity()
            .send()
            .await
            .map_err(|e| AwsError::Sts(DisplayErrorContext(e).to_string()))?;

        response
            .account()
            .map(|account| account.trim().to_string())
            .ok_or(AwsError::MissingField("GetCallerIdentity", "Account"))
    }
}

#[async_trait]
impl RoleAssumer for StsClient {
    async fn assume_role(
        &self,
        role_arn: &str,
        session_name: &str,
    ) -> Result<TemporaryCredentials, AwsError> {
        let response = self
            .client
            .assume_role()
            .role_arn(role_arn)
            .role_session_name(session_name)
            .send()
            .await
            .map_err(|e| AwsError::Sts(DisplayErrorContext(e).to_string()))?;

        let credentials = response
            .credentials()
            .ok_or(AwsError::MissingField("AssumeRole", "Credentials"))?;

        Ok(TemporaryCredentials {
            access_key_id: credentials.access_key_id().to_string(),
            secret_access_key: SecretString::from(credentials.secret_access_key().to_string()),
            session_token: SecretString::from(credentials.session_token().to_string()),
        })
    }
}
