use async_trait::async_trait;
use aws_sdk_organizations::error::DisplayErrorContext;

use super::{AccountDirectory, AwsError};

pub struct OrganizationsDirectory {
    client: aws_sdk_organizations::Client,
}

impl OrganizationsDirectory {
    pub fn new(client: aws_sdk_organizations::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl AccountDirectory for OrganizationsDirectory {
    async fn account_name(&self, account_id: &str) -> Result<String, AwsError> {
        let response = self
            .client
            .describe_account()
            .account_id(account_id)
            .send()
            .await
            .map_err(|e| AwsError::Organizations(DisplayErrorContext(e).to_string()))?;

        response
            .account()
            .and_then(|account| account.name())
            .map(str::to_string)
            .ok_or(AwsError::MissingField("DescribeAccount", "Account.Name"))
    }
}
