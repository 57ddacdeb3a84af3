//! Telegram Bot API notifications.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);
const TELEGRAM_API_URL: &str = "https://api.telegram.org";

/// Notification delivery errors.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// The bot token or chat id is unusable.
    #[error("invalid notifier settings: {reason}")]
    InvalidSettings { reason: &'static str },
    /// Failed to build HTTP client.
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),
    /// HTTP request failed.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// The Bot API rejected the message.
    #[error("telegram API error (HTTP {status}): {description}")]
    Api { status: u16, description: String },
}

/// How the message text should be rendered by the recipient.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageFormat {
    Markdown,
    Plain,
}

/// A message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub text: String,
    pub format: MessageFormat,
}

impl Notification {
    pub fn markdown(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            format: MessageFormat::Markdown,
        }
    }

    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            format: MessageFormat::Plain,
        }
    }
}

/// Something that can deliver notifications to the user.
pub trait Notifier {
    fn notify(
        &self,
        notification: &Notification,
    ) -> impl Future<Output = Result<(), NotifyError>> + Send;
}

/// Sends notifications to a Telegram chat through a bot.
pub struct TelegramNotifier {
    http: reqwest::Client,
    api_base: String,
    bot_token: String,
    chat_id: String,
}

impl fmt::Debug for TelegramNotifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelegramNotifier")
            .field("bot_token", &"[REDACTED]")
            .field("chat_id", &self.chat_id)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    parse_mode: Option<&'static str>,
}

impl TelegramNotifier {
    /// Creates a notifier for the given bot and chat.
    pub fn new(
        bot_token: impl Into<String>,
        chat_id: impl Into<String>,
    ) -> Result<Self, NotifyError> {
        Self::with_api_base(TELEGRAM_API_URL, bot_token, chat_id)
    }

    /// Creates a notifier against another Bot API host.
    pub fn with_api_base(
        api_base: impl Into<String>,
        bot_token: impl Into<String>,
        chat_id: impl Into<String>,
    ) -> Result<Self, NotifyError> {
        let bot_token = bot_token.into();
        let chat_id = chat_id.into();

        if bot_token.trim().is_empty() {
            return Err(NotifyError::InvalidSettings {
                reason: "bot token cannot be empty",
            });
        }
        if chat_id.trim().is_empty() {
            return Err(NotifyError::InvalidSettings {
                reason: "chat id cannot be empty",
            });
        }

        let http = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(NotifyError::ClientBuild)?;

        Ok(Self {
            http,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            bot_token,
            chat_id,
        })
    }

    async fn send(&self, notification: &Notification) -> Result<(), NotifyError> {
        let request = SendMessage {
            chat_id: &self.chat_id,
            text: &notification.text,
            parse_mode: match notification.format {
                MessageFormat::Markdown => Some("Markdown"),
                MessageFormat::Plain => None,
            },
        };

        let response = self
            .http
            .post(format!("{}/bot{}/sendMessage", self.api_base, self.bot_token))
            .json(&request)
            .send()
            .await
            .map_err(reqwest::Error::without_url)?;

        let status = response.status();
        if status.is_success() {
            tracing::debug!(chat_id = %self.chat_id, "telegram notification sent");
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(NotifyError::Api {
            status: status.as_u16(),
            description: parse_description(&body).unwrap_or(body),
        })
    }
}

impl Notifier for TelegramNotifier {
    fn notify(
        &self,
        notification: &Notification,
    ) -> impl Future<Output = Result<(), NotifyError>> + Send {
        self.send(notification)
    }
}

fn parse_description(body: &str) -> Option<String> {
    #[derive(Deserialize)]
    struct ErrorPayload {
        description: String,
    }

    serde_json::from_str::<ErrorPayload>(body)
        .ok()
        .map(|payload| payload.description)
}
