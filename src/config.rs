use secrecy::SecretString;

const DEFAULT_ROLE_NAME: &str = "ecs-api-access-cross-account-role";
const DEFAULT_REGION: &str = "eu-central-1";
const DEFAULT_ALIAS_PREFIX: &str = "lifemote";

/// Runtime settings, read once per cold start.
///
/// Slack webhook URLs carry their own credentials, so they are kept as
/// secrets.
#[derive(Debug)]
pub struct Config {
    /// Incoming webhook that receives every raw event.
    pub audit_webhook_url: SecretString,
    /// Incoming webhook that receives abnormal stop alerts.
    pub alert_webhook_url: SecretString,
    pub cross_account: CrossAccountConfig,
    /// Organization prefix stripped from account names.
    pub alias_prefix: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrossAccountConfig {
    pub role_name: String,
    pub region: String,
}

impl CrossAccountConfig {
    pub fn role_arn(&self, account_id: &str) -> String {
        format!("arn:aws:iam::{account_id}:role/{}", self.role_name)
    }
}

impl Default for CrossAccountConfig {
    fn default() -> Self {
        Self {
            role_name: DEFAULT_ROLE_NAME.to_string(),
            region: DEFAULT_REGION.to_string(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("required environment variable {0} is not set")]
    Missing(&'static str),
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let required = |name: &'static str| {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::Missing(name))
        };
        let optional = |name: &str, default: &str| {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        Ok(Self {
            audit_webhook_url: SecretString::from(required("AUDIT_WEBHOOK_URL")?),
            alert_webhook_url: SecretString::from(required("SLACK_WEBHOOK_URL")?),
            cross_account: CrossAccountConfig {
                role_name: optional("CROSS_ACCOUNT_ROLE_NAME", DEFAULT_ROLE_NAME),
                region: optional("CROSS_ACCOUNT_REGION", DEFAULT_REGION),
            },
            alias_prefix: optional("ACCOUNT_ALIAS_PREFIX", DEFAULT_ALIAS_PREFIX),
        })
    }
}
