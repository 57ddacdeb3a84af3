//! Notification texts for booking runs.

use chrono::NaiveDateTime;
use wod_client::Notification;
use wod_core::{BookingGoal, BookingOutcome, ClassRecord, MatchCriterion};

const BOOKED: char = '\u{2705}';
const NOTHING_TO_DO: char = '\u{2714}';
const FAILED: char = '\u{274C}';

/// `Oct-CW43 _Wednesday - 2026-10-21_ at 10:00 - CrossFit`
fn goal_line(target_day: NaiveDateTime, goal: &BookingGoal) -> String {
    format!(
        "{} at {} - {}",
        target_day.format("%b-CW%V _%A - %Y-%m-%d_"),
        goal.time,
        goal.name_pattern
    )
}

/// `Wednesday - 21 Oct 2026`
fn short_day(target_day: NaiveDateTime) -> String {
    target_day.format("%A - %d %b %Y").to_string()
}

/// Messages for a finished booking attempt.
pub fn for_outcome(
    target_day: NaiveDateTime,
    goal: &BookingGoal,
    class: Option<&ClassRecord>,
    outcome: &BookingOutcome,
) -> Vec<Notification> {
    let line = goal_line(target_day, goal);
    match outcome {
        BookingOutcome::Success => {
            let seats = class
                .map(|class| format!(" [{} / {}]", class.occupation, class.limit))
                .unwrap_or_default();
            vec![Notification::markdown(format!(
                "{BOOKED} Booked! :) {line}{seats}"
            ))]
        }
        BookingOutcome::AlreadyBooked => vec![Notification::markdown(format!(
            "{BOOKED} Already Booked! :) {line}"
        ))],
        BookingOutcome::NoCredit => vec![Notification::markdown(format!(
            "{FAILED} No credit available: {line}"
        ))],
        BookingOutcome::BoxClosed => vec![Notification::markdown(format!(
            "{NOTHING_TO_DO} The box is closed. Target: {}",
            short_day(target_day)
        ))],
        BookingOutcome::NoMatchingClass { criterion, value } => {
            let what = match criterion {
                MatchCriterion::Time => format!("Time {value}"),
                MatchCriterion::Name => format!("Class {value}"),
            };
            vec![Notification::markdown(format!(
                "{FAILED} {what} was not found!: {line}"
            ))]
        }
        BookingOutcome::UnknownFailure { status, body } => {
            failure(Some(target_day), &format!("HTTP {status}: {body}"))
        }
    }
}

/// Message for a run where no goal falls on the target day.
pub fn no_training_day(target_day: Option<NaiveDateTime>) -> Notification {
    let target = target_day.map_or_else(|| "none".to_string(), short_day);
    Notification::markdown(format!("{NOTHING_TO_DO} No training day. Target: {target}"))
}

/// Messages for a run stopped because the service refused the credentials.
pub fn login_failure(target_day: Option<NaiveDateTime>, detail: &str) -> Vec<Notification> {
    let target = target_day.map_or_else(|| "unknown".to_string(), short_day);
    vec![
        Notification::markdown(format!("{FAILED} Could not log in. Target: {target}")),
        Notification::plain(detail),
    ]
}

/// Messages for a run that ended in an error. The detail goes out as plain
/// text so error payloads cannot break Markdown parsing.
pub fn failure(target_day: Option<NaiveDateTime>, detail: &str) -> Vec<Notification> {
    let target = target_day.map_or_else(|| "unknown".to_string(), short_day);
    vec![
        Notification::markdown(format!("{FAILED} Something went wrong. Target: {target}")),
        Notification::plain(detail),
    ]
}
