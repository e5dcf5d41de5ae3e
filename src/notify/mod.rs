pub mod message;

use async_trait::async_trait;
use log::info;
use secrecy::{ExposeSecret, SecretString};

pub use message::{Notification, SlackMessage};

/// Where a message goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    /// Receives every raw event.
    Audit,
    /// Receives abnormal stop alerts.
    Alert,
}

impl Channel {
    pub fn name(self) -> &'static str {
        match self {
            Self::Audit => "audit",
            Self::Alert => "alert",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("Failed to post to the {channel} webhook: {source}")]
    Http {
        channel: &'static str,
        #[source]
        source: reqwest::Error,
    },
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, channel: Channel, message: &SlackMessage) -> Result<(), NotifyError>;
}

/// Posts messages to Slack incoming webhooks. Each call is a single
/// attempt.
pub struct SlackNotifier {
    client: reqwest::Client,
    audit_url: SecretString,
    alert_url: SecretString,
}

impl SlackNotifier {
    pub fn new(audit_url: SecretString, alert_url: SecretString) -> Self {
        Self {
            client: reqwest::Client::new(),
            audit_url,
            alert_url,
        }
    }

    fn url(&self, channel: Channel) -> &str {
        match channel {
            Channel::Audit => self.audit_url.expose_secret(),
            Channel::Alert => self.alert_url.expose_secret(),
        }
    }
}

#[async_trait]
impl Notifier for SlackNotifier {
    async fn send(&self, channel: Channel, message: &SlackMessage) -> Result<(), NotifyError> {
        let http_err = |source: reqwest::Error| NotifyError::Http {
            channel: channel.name(),
            source,
        };

        let response = self
            .client
            .post(self.url(channel))
            .json(message)
            .send()
            .await
            .map_err(http_err)?
            .error_for_status()
            .map_err(http_err)?;

        let status = response.status();
        let body = response.text().await.map_err(http_err)?;
        info!("{} webhook answered {}: {}", channel.name(), status, body);
        Ok(())
    }
}
