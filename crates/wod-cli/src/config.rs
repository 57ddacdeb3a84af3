//! Configuration loading and management.

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use wod_core::{BookingGoal, GoalTime, ValidationError, parse_weekday, weekday_from_index};

/// Hours of advance notice used when neither the goal nor the file sets one.
pub const DEFAULT_HOURS_IN_ADVANCE: u32 = 48;

/// Text settings taken verbatim from the environment.
///
/// The generic `WODBOT_*` layer parses values, so `007` would arrive as `7`.
const TEXT_ENV_KEYS: [(&str, &str); 5] = [
    ("WODBOT_EMAIL", "email"),
    ("WODBOT_PASSWORD", "password"),
    ("WODBOT_BOX_NAME", "box_name"),
    ("WODBOT_TELEGRAM__BOT_TOKEN", "telegram.bot_token"),
    ("WODBOT_TELEGRAM__CHAT_ID", "telegram.chat_id"),
];

/// Application configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct Config {
    /// Account email.
    #[serde(default, deserialize_with = "text::deserialize_option")]
    pub email: Option<String>,
    /// Account password.
    #[serde(default, deserialize_with = "text::deserialize_option")]
    pub password: Option<String>,
    /// Box subdomain on aimharder.com.
    #[serde(default, deserialize_with = "text::deserialize_option")]
    pub box_name: Option<String>,
    /// Numeric box id.
    pub box_id: Option<u64>,
    /// Default advance notice for goals that do not set their own.
    pub hours_in_advance: u32,
    /// Classes to book, checked in order.
    pub goals: Vec<GoalConfig>,
    /// Optional Telegram notifications.
    pub telegram: Option<TelegramConfig>,
}

/// One booking goal as written in the config file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoalConfig {
    pub day: DaySpec,
    pub time: String,
    pub name: String,
    pub hours_in_advance: Option<u32>,
}

/// A weekday given either by name or by Monday-based index.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DaySpec {
    Index(u8),
    Name(String),
}

/// Telegram bot settings.
#[derive(Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    #[serde(deserialize_with = "text::deserialize")]
    pub bot_token: String,
    /// Numeric chat ids may be written as plain integers.
    #[serde(deserialize_with = "text::deserialize")]
    pub chat_id: String,
}

/// Login credentials.
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("email", &self.email)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .field("box_name", &self.box_name)
            .field("box_id", &self.box_id)
            .field("hours_in_advance", &self.hours_in_advance)
            .field("goals", &self.goals)
            .field("telegram", &self.telegram)
            .finish()
    }
}

impl fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("bot_token", &"[REDACTED]")
            .field("chat_id", &self.chat_id)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            email: None,
            password: None,
            box_name: None,
            box_id: None,
            hours_in_advance: DEFAULT_HOURS_IN_ADVANCE,
            goals: Vec::new(),
            telegram: None,
        }
    }
}

impl DaySpec {
    fn to_weekday(&self) -> Result<chrono::Weekday, ValidationError> {
        match self {
            Self::Index(index) => {
                weekday_from_index(*index).ok_or_else(|| ValidationError::InvalidWeekday {
                    value: index.to_string(),
                })
            }
            Self::Name(name) => parse_weekday(name),
        }
    }
}

impl Config {
    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Load from default config location
        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        // Load from specified config file
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // Load from environment variables (WODBOT_*, nested with `__`)
        figment = figment.merge(Env::prefixed("WODBOT_").split("__"));
        for (var, key) in TEXT_ENV_KEYS {
            if let Ok(value) = std::env::var(var) {
                figment = figment.merge(Serialized::default(key, value));
            }
        }

        figment.extract()
    }

    /// Returns the login credentials, failing if either is missing.
    pub fn credentials(&self) -> Result<Credentials> {
        let email = non_blank(self.email.as_deref())
            .context("missing email (set `email` in config.toml or WODBOT_EMAIL)")?;
        let password = self
            .password
            .as_deref()
            .filter(|value| !value.is_empty())
            .context("missing password (set `password` in config.toml or WODBOT_PASSWORD)")?;
        Ok(Credentials {
            email: email.to_string(),
            password: password.to_string(),
        })
    }

    /// Returns the box subdomain and id, failing if either is missing.
    pub fn box_target(&self) -> Result<(&str, u64)> {
        let name = non_blank(self.box_name.as_deref())
            .context("missing box name (set `box_name` in config.toml or WODBOT_BOX_NAME)")?;
        let id = self
            .box_id
            .context("missing box id (set `box_id` in config.toml or WODBOT_BOX_ID)")?;
        Ok((name, id))
    }

    /// Converts the configured goals, applying the default advance notice.
    pub fn booking_goals(&self) -> Result<Vec<BookingGoal>> {
        if self.goals.is_empty() {
            anyhow::bail!("no booking goals configured (add [[goals]] entries to config.toml)");
        }
        self.goals
            .iter()
            .enumerate()
            .map(|(index, goal)| {
                goal.to_booking_goal(self.hours_in_advance)
                    .with_context(|| format!("invalid booking goal #{}", index + 1))
            })
            .collect()
    }
}

impl GoalConfig {
    fn to_booking_goal(&self, default_hours: u32) -> Result<BookingGoal, ValidationError> {
        let day = self.day.to_weekday()?;
        let time: GoalTime = self.time.parse()?;
        BookingGoal::new(
            day,
            time,
            self.name.clone(),
            self.hours_in_advance.unwrap_or(default_hours),
        )
    }
}

/// Strings that may be written as bare integers.
mod text {
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum TextOrInteger {
        Text(String),
        Signed(i64),
        Unsigned(u64),
    }

    impl From<TextOrInteger> for String {
        fn from(value: TextOrInteger) -> Self {
            match value {
                TextOrInteger::Text(text) => text,
                TextOrInteger::Signed(n) => n.to_string(),
                TextOrInteger::Unsigned(n) => n.to_string(),
            }
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        TextOrInteger::deserialize(deserializer).map(String::from)
    }

    pub fn deserialize_option<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<String>, D::Error> {
        Option::<TextOrInteger>::deserialize(deserializer).map(|value| value.map(String::from))
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

/// Returns the platform-specific config directory for wodbot.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("wodbot"))
}
