//! Core domain logic for wodbot.
//!
//! This crate contains the decision logic of a booking run, free of I/O:
//! - Schedule: deciding whether a goal's booking window is open
//! - Matcher: picking the class to book from a day's schedule
//! - Outcome: the possible endings of a booking attempt

pub mod matcher;
mod outcome;
pub mod schedule;
mod types;

pub use matcher::{MatchCriterion, MatchError, select_class};
pub use outcome::{BOOK_STATE_ALREADY_BOOKED, BOOK_STATE_NO_CREDIT, BookingOutcome};
pub use schedule::{Evaluation, GoalEvaluation, NoTrainingDay, evaluate, evaluate_goals};
pub use types::{
    BookState, BookingGoal, BookingId, ClassId, ClassRecord, GoalTime, MAX_ADVANCE_NOTICE_HOURS,
    ValidationError, parse_weekday, weekday_from_index,
};
