//! Core type definitions with validation.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveTime, Timelike, Weekday};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Longest advance notice a goal may declare: one leap year.
pub const MAX_ADVANCE_NOTICE_HOURS: u32 = 24 * 366;

/// Validation errors for core types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The provided value was empty.
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },

    /// The goal time was not a valid 24h `HH:MM` value.
    #[error("invalid class time: {value} (expected HH:MM or HHMM)")]
    InvalidTime { value: String },

    /// The goal day was neither a weekday name nor an index in 0..=6.
    #[error("invalid weekday: {value} (expected a name like 'mon' or an index 0-6)")]
    InvalidWeekday { value: String },

    /// The advance notice exceeds [`MAX_ADVANCE_NOTICE_HOURS`].
    #[error(
        "advance notice of {hours}h is out of range (at most {max}h)",
        max = MAX_ADVANCE_NOTICE_HOURS
    )]
    InvalidAdvanceNotice { hours: u32 },
}

/// Generates a remote identifier newtype.
///
/// The booking service sends ids as JSON numbers or strings depending on the
/// endpoint, so deserialization accepts both and keeps the decimal text.
macro_rules! define_remote_id {
    (
        $(#[$meta:meta])*
        $name:ident, $field_name:literal
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
        #[serde(into = "String")]
        pub struct $name(String);

        impl $name {
            /// Creates a new ID after validation.
            pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
                let id = id.into();
                if id.trim().is_empty() {
                    return Err(ValidationError::Empty { field: $field_name });
                }
                Ok(Self(id))
            }

            /// Returns the ID as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: Deserializer<'de>,
            {
                let raw = NumberOrString::deserialize(deserializer)?;
                Self::new(raw.into_string()).map_err(serde::de::Error::custom)
            }
        }

        impl FromStr for $name {
            type Err = ValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_remote_id!(
    /// Identifier of a scheduled class, as issued by the booking service.
    ClassId, "class ID"
);

define_remote_id!(
    /// Identifier of an existing reservation.
    BookingId, "booking ID"
);

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Int(i64),
    Text(String),
}

impl NumberOrString {
    fn into_string(self) -> String {
        match self {
            Self::Int(value) => value.to_string(),
            Self::Text(value) => value,
        }
    }
}

/// Accepts `12`, `"12"` or `null` for counters the service sometimes quotes.
fn lenient_count<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<NumberOrString>::deserialize(deserializer)? {
        None => Ok(0),
        Some(NumberOrString::Int(value)) => Ok(value),
        Some(NumberOrString::Text(text)) => text
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("invalid count: {text}"))),
    }
}

/// Time of day a goal class starts, at minute precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GoalTime(NaiveTime);

impl GoalTime {
    /// Creates a goal time from an hour and minute.
    pub fn from_hm(hour: u32, minute: u32) -> Result<Self, ValidationError> {
        NaiveTime::from_hms_opt(hour, minute, 0)
            .map(Self)
            .ok_or_else(|| ValidationError::InvalidTime {
                value: format!("{hour:02}:{minute:02}"),
            })
    }

    /// Returns the wall-clock time.
    #[must_use]
    pub const fn time(self) -> NaiveTime {
        self.0
    }

    /// The `HHMM` form the service embeds in a class's `timeid`.
    #[must_use]
    pub fn time_id_fragment(self) -> String {
        format!("{:02}{:02}", self.0.hour(), self.0.minute())
    }
}

impl fmt::Display for GoalTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.0.hour(), self.0.minute())
    }
}

impl FromStr for GoalTime {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ValidationError::InvalidTime {
            value: s.to_string(),
        };
        let trimmed = s.trim();
        let (hours, minutes) = match trimmed.split_once(':') {
            Some((h, m)) => (h, m),
            None if trimmed.len() == 4 && trimmed.is_ascii() => trimmed.split_at(2),
            None => return Err(invalid()),
        };
        if hours.len() != 2 || minutes.len() != 2 {
            return Err(invalid());
        }
        let hour: u32 = hours.parse().map_err(|_| invalid())?;
        let minute: u32 = minutes.parse().map_err(|_| invalid())?;
        Self::from_hm(hour, minute).map_err(|_| invalid())
    }
}

impl Serialize for GoalTime {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for GoalTime {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Parses a weekday from a name (`mon`, `Monday`) or an index where Monday is 0.
pub fn parse_weekday(value: &str) -> Result<Weekday, ValidationError> {
    let trimmed = value.trim();
    if let Ok(index) = trimmed.parse::<u8>() {
        return weekday_from_index(index).ok_or_else(|| ValidationError::InvalidWeekday {
            value: value.to_string(),
        });
    }
    trimmed
        .parse::<Weekday>()
        .map_err(|_| ValidationError::InvalidWeekday {
            value: value.to_string(),
        })
}

/// Maps a Monday-based index (0..=6) to a weekday.
#[must_use]
pub fn weekday_from_index(index: u8) -> Option<Weekday> {
    Weekday::try_from(index).ok()
}

/// A class the user wants booked automatically.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingGoal {
    /// Day of the week the class takes place.
    pub day: Weekday,
    /// Start time of the class.
    pub time: GoalTime,
    /// Fragment of the class name, e.g. `CrossFit` or `OPEN`.
    pub name_pattern: String,
    /// Hours before class start at which the service opens booking, at most
    /// [`MAX_ADVANCE_NOTICE_HOURS`].
    pub advance_notice_hours: u32,
}

impl BookingGoal {
    pub fn new(
        day: Weekday,
        time: GoalTime,
        name_pattern: impl Into<String>,
        advance_notice_hours: u32,
    ) -> Result<Self, ValidationError> {
        let name_pattern = name_pattern.into();
        if name_pattern.trim().is_empty() {
            return Err(ValidationError::Empty {
                field: "class name",
            });
        }
        if advance_notice_hours > MAX_ADVANCE_NOTICE_HOURS {
            return Err(ValidationError::InvalidAdvanceNotice {
                hours: advance_notice_hours,
            });
        }
        Ok(Self {
            day,
            time,
            name_pattern,
            advance_notice_hours,
        })
    }
}

/// Reservation state of a class for the logged-in user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BookState {
    Waitlisted,
    Booked,
    Other(i64),
}

impl BookState {
    #[must_use]
    pub const fn from_code(code: i64) -> Self {
        match code {
            0 => Self::Waitlisted,
            1 => Self::Booked,
            other => Self::Other(other),
        }
    }

    #[must_use]
    pub const fn code(self) -> i64 {
        match self {
            Self::Waitlisted => 0,
            Self::Booked => 1,
            Self::Other(code) => code,
        }
    }
}

impl fmt::Display for BookState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Waitlisted => write!(f, "waitlisted"),
            Self::Booked => write!(f, "booked"),
            Self::Other(code) => write!(f, "state {code}"),
        }
    }
}

impl Serialize for BookState {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_i64(self.code())
    }
}

impl<'de> Deserialize<'de> for BookState {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        i64::deserialize(deserializer).map(Self::from_code)
    }
}

/// A class on the day's schedule, as listed by the booking service.
///
/// Field names follow the service's payload, including its `ocupation`
/// spelling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassRecord {
    pub id: ClassId,
    #[serde(rename = "timeid")]
    pub time_id: String,
    #[serde(rename = "className")]
    pub class_name: String,
    #[serde(rename = "ocupation", default, deserialize_with = "lenient_count")]
    pub occupation: i64,
    #[serde(default, deserialize_with = "lenient_count")]
    pub limit: i64,
    #[serde(rename = "bookState", default)]
    pub book_state: Option<BookState>,
}
