use chrono::{DateTime, Utc};
use serde::Serialize;

/// Rendered in place of any field the event or task did not carry.
pub const NOT_FOUND: &str = "NotFound";
/// `2024-05-14 09:00:00+00:00`
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%:z";
/// `2024-05-14 09:00:00.123000+00:00`
const TIMESTAMP_FORMAT_MICROS: &str = "%Y-%m-%d %H:%M:%S%.6f%:z";

/// A Slack Block Kit message body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlackMessage {
    pub blocks: Vec<Block>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    Header { text: Text },
    Section { text: Text },
    Divider,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "text", rename_all = "snake_case")]
pub enum Text {
    PlainText(String),
    Mrkdwn(String),
}

impl SlackMessage {
    /// The raw event, echoed verbatim.
    pub fn audit(event: &serde_json::Value) -> Self {
        Self {
            blocks: vec![
                Block::Section {
                    text: Text::Mrkdwn(event.to_string()),
                },
                Block::Divider,
            ],
        }
    }
}

/// Everything an abnormal stop alert shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub service_name: String,
    pub account_alias: String,
    pub stopping_at: Option<String>,
    pub stopped_reason: Option<String>,
    pub stop_code: Option<String>,
    pub exit_code: Option<i32>,
    pub container_reason: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
}

fn or_not_found(value: Option<&str>) -> &str {
    value.unwrap_or(NOT_FOUND)
}

/// Microseconds are only shown when there are any.
fn format_timestamp(t: &DateTime<Utc>) -> String {
    if t.timestamp_subsec_micros() == 0 {
        t.format(TIMESTAMP_FORMAT).to_string()
    } else {
        t.format(TIMESTAMP_FORMAT_MICROS).to_string()
    }
}

impl Notification {
    pub fn to_message(&self) -> SlackMessage {
        let exit_code = self
            .exit_code
            .map(|code| code.to_string())
            .unwrap_or_else(|| NOT_FOUND.to_string());
        let started_at = self
            .started_at
            .as_ref()
            .map(format_timestamp)
            .unwrap_or_else(|| NOT_FOUND.to_string());

        let details = format!(
            "Stop reason: *{}* \nStop code: *{}* \nExit code and reason: {}   {} \nStarted at: {} \nStopped at: {}",
            or_not_found(self.stopped_reason.as_deref()),
            or_not_found(self.stop_code.as_deref()),
            exit_code,
            or_not_found(self.container_reason.as_deref()),
            started_at,
            or_not_found(self.stopping_at.as_deref()),
        );

        SlackMessage {
            blocks: vec![
                Block::Header {
                    text: Text::PlainText(format!(
                        "{} -> {}",
                        self.account_alias, self.service_name
                    )),
                },
                Block::Section {
                    text: Text::Mrkdwn(details),
                },
            ],
        }
    }
}
