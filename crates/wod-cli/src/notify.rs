//! Notifier selection from configuration.

use std::future::Future;

use anyhow::{Context, Result};
use wod_client::{Notification, Notifier, NotifyError, TelegramNotifier};

use crate::Config;

/// The notifier a run reports to, as configured.
#[derive(Debug)]
pub enum ConfiguredNotifier {
    Telegram(TelegramNotifier),
    Disabled,
}

impl ConfiguredNotifier {
    pub fn from_config(config: &Config) -> Result<Self> {
        let Some(telegram) = &config.telegram else {
            return Ok(Self::Disabled);
        };
        let notifier = TelegramNotifier::new(&telegram.bot_token, &telegram.chat_id)
            .context("invalid telegram settings")?;
        tracing::info!("telegram notifications are enabled");
        Ok(Self::Telegram(notifier))
    }
}

impl Notifier for ConfiguredNotifier {
    fn notify(
        &self,
        notification: &Notification,
    ) -> impl Future<Output = Result<(), NotifyError>> + Send {
        async move {
            match self {
                Self::Telegram(notifier) => notifier.notify(notification).await,
                Self::Disabled => Ok(()),
            }
        }
    }
}

/// Delivers messages in order. Failures are logged and do not affect the run.
pub async fn deliver<N: Notifier + Sync>(notifier: &N, notifications: &[Notification]) {
    for notification in notifications {
        if let Err(err) = notifier.notify(notification).await {
            tracing::warn!(error = %err, "failed to send notification");
        }
    }
}
