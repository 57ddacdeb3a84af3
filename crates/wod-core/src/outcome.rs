//! Outcome of a single booking attempt.

use std::fmt;

use crate::matcher::{MatchCriterion, MatchError};

/// `bookState` the service returns when the user has no credits left.
pub const BOOK_STATE_NO_CREDIT: i64 = -2;

/// `bookState` the service returns when the class is already reserved.
pub const BOOK_STATE_ALREADY_BOOKED: i64 = -12;

/// How a booking attempt ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookingOutcome {
    /// The reservation was accepted.
    Success,
    /// The user already holds a reservation for this class.
    AlreadyBooked,
    /// No credits left on the user's plan.
    NoCredit,
    /// No classes scheduled on the target day.
    BoxClosed,
    /// The schedule had no class for the goal's time or name.
    NoMatchingClass {
        criterion: MatchCriterion,
        value: String,
    },
    /// The service answered with something we could not interpret.
    UnknownFailure { status: u16, body: String },
}

impl BookingOutcome {
    /// Whether the user ends up holding a reservation.
    pub const fn is_booked(&self) -> bool {
        matches!(self, Self::Success | Self::AlreadyBooked)
    }

    /// Whether the outcome points at a problem rather than a business answer.
    pub const fn is_failure(&self) -> bool {
        matches!(self, Self::UnknownFailure { .. })
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::AlreadyBooked => "already_booked",
            Self::NoCredit => "no_credit",
            Self::BoxClosed => "box_closed",
            Self::NoMatchingClass { .. } => "no_matching_class",
            Self::UnknownFailure { .. } => "unknown_failure",
        }
    }
}

impl fmt::Display for BookingOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "booked"),
            Self::AlreadyBooked => write!(f, "already booked"),
            Self::NoCredit => write!(f, "no credit available"),
            Self::BoxClosed => write!(f, "box closed"),
            Self::NoMatchingClass { criterion, value } => {
                write!(f, "no class found for {criterion} ({value})")
            }
            Self::UnknownFailure { status, body } => {
                write!(f, "unexpected response (HTTP {status}): {body}")
            }
        }
    }
}

impl From<MatchError> for BookingOutcome {
    fn from(err: MatchError) -> Self {
        match err {
            MatchError::BoxClosed => Self::BoxClosed,
            MatchError::NoBookingGoal { criterion, value } => {
                Self::NoMatchingClass { criterion, value }
            }
        }
    }
}
