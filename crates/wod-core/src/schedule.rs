//! Booking window evaluation.
//!
//! The booking service opens reservations a fixed number of hours before a
//! class starts. Given the current local time, these functions decide which
//! configured goal is relevant and whether its window is open yet.
//!
//! # Window rule
//!
//! 1. `target_day = now + advance_notice`
//! 2. The goal only applies if `target_day` falls on the goal's weekday
//! 3. `diff = (target_day's date at goal time) - now`, split into whole hours
//!    (truncated toward zero) and a remainder
//! 4. Open iff `hours < advance_notice`, or `hours == advance_notice` with a
//!    remainder of exactly zero
//!
//! The window therefore opens at the exact instant `advance_notice` hours
//! before class, at full sub-second precision.

use chrono::{Datelike, NaiveDateTime, TimeDelta};
use thiserror::Error;

use crate::types::BookingGoal;

/// Result of evaluating one goal against the clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Evaluation {
    /// `now` shifted forward by the goal's advance notice.
    pub target_day: NaiveDateTime,
    /// Start of the goal class on `target_day`, when the weekday matches.
    pub class_start: Option<NaiveDateTime>,
    /// Whether a booking attempt should fire now.
    pub eligible_now: bool,
}

/// A goal whose weekday matched, with its evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GoalEvaluation<'a> {
    pub goal: &'a BookingGoal,
    pub evaluation: Evaluation,
}

/// No configured goal falls on the day a booking would target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("no training day configured for target {}", describe(.target_day.as_ref()))]
pub struct NoTrainingDay {
    /// Last computed target day, absent only when no goals were given.
    pub target_day: Option<NaiveDateTime>,
}

fn describe(target_day: Option<&NaiveDateTime>) -> String {
    target_day.map_or_else(
        || "(no goals)".to_string(),
        |day| day.format("%A %Y-%m-%d").to_string(),
    )
}

/// Evaluates a single goal at `now`.
pub fn evaluate(now: NaiveDateTime, goal: &BookingGoal) -> Evaluation {
    let notice_hours = i64::from(goal.advance_notice_hours);
    let target_day = now + TimeDelta::hours(notice_hours);

    if target_day.weekday() != goal.day {
        return Evaluation {
            target_day,
            class_start: None,
            eligible_now: false,
        };
    }

    let class_start = target_day.date().and_time(goal.time.time());
    let diff = class_start - now;
    let whole_hours = diff.num_hours();
    let remainder = diff - TimeDelta::hours(whole_hours);
    let eligible_now = whole_hours < notice_hours
        || (whole_hours == notice_hours && remainder == TimeDelta::zero());

    Evaluation {
        target_day,
        class_start: Some(class_start),
        eligible_now,
    }
}

/// Picks the first goal (in configured order) whose weekday matches its own
/// target day and returns its evaluation.
pub fn evaluate_goals(
    now: NaiveDateTime,
    goals: &[BookingGoal],
) -> Result<GoalEvaluation<'_>, NoTrainingDay> {
    let mut last_target = None;
    for goal in goals {
        let evaluation = evaluate(now, goal);
        tracing::debug!(
            day = %goal.day,
            time = %goal.time,
            target_day = %evaluation.target_day,
            "evaluated booking goal"
        );
        if let Some(class_start) = evaluation.class_start {
            tracing::info!(
                target_day = %evaluation.target_day,
                class_start = %class_start,
                hours_until_class = (class_start - now).num_hours(),
                advance_notice_hours = goal.advance_notice_hours,
                eligible = evaluation.eligible_now,
                "found booking goal for target day"
            );
            return Ok(GoalEvaluation { goal, evaluation });
        }
        last_target = Some(evaluation.target_day);
    }

    Err(NoTrainingDay {
        target_day: last_target,
    })
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, Weekday};

    use super::*;
    use crate::types::GoalTime;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    fn goal(day: Weekday, time: &str, hours: u32) -> BookingGoal {
        BookingGoal::new(day, time.parse().unwrap(), "CrossFit", hours).unwrap()
    }

    // 2026-10-21 is a Wednesday.
    fn wednesday_ten() -> NaiveDateTime {
        at(2026, 10, 21, 10, 0)
    }

    #[test]
    fn exact_boundary_is_eligible() {
        let goal = goal(Weekday::Wed, "10:00", 49);
        let now = wednesday_ten() - TimeDelta::hours(49);

        let result = evaluate(now, &goal);
        assert!(result.eligible_now);
        assert_eq!(result.class_start, Some(wednesday_ten()));
        assert_eq!(result.target_day, wednesday_ten());
    }

    #[test]
    fn one_microsecond_early_is_not_eligible() {
        let goal = goal(Weekday::Wed, "10:00", 49);
        let now = wednesday_ten() - TimeDelta::hours(49) - TimeDelta::microseconds(1);

        let result = evaluate(now, &goal);
        assert!(result.class_start.is_some());
        assert!(!result.eligible_now);
    }

    #[test]
    fn one_microsecond_late_is_eligible() {
        let goal = goal(Weekday::Wed, "10:00", 49);
        let now = wednesday_ten() - TimeDelta::hours(49) + TimeDelta::microseconds(1);

        assert!(evaluate(now, &goal).eligible_now);
    }

    #[test]
    fn whole_minutes_early_is_not_eligible() {
        let goal = goal(Weekday::Wed, "10:00", 49);
        let now = wednesday_ten() - TimeDelta::hours(49) - TimeDelta::minutes(5);

        assert!(!evaluate(now, &goal).eligible_now);
    }

    #[test]
    fn later_the_same_window_day_stays_eligible() {
        let goal = goal(Weekday::Wed, "10:00", 49);
        let now = wednesday_ten() - TimeDelta::hours(40);

        assert!(evaluate(now, &goal).eligible_now);
    }

    #[test]
    fn other_weekday_is_never_eligible() {
        let goal = goal(Weekday::Thu, "10:00", 49);
        let now = wednesday_ten() - TimeDelta::hours(49);

        let result = evaluate(now, &goal);
        assert!(!result.eligible_now);
        assert_eq!(result.class_start, None);
        assert_eq!(result.target_day, wednesday_ten());
    }

    #[test]
    fn evaluation_is_pure() {
        let goal = goal(Weekday::Wed, "10:00", 49);
        let now = wednesday_ten() - TimeDelta::hours(49);

        assert_eq!(evaluate(now, &goal), evaluate(now, &goal));
    }

    #[test]
    fn evaluate_goals_picks_matching_weekday() {
        let goals = vec![
            goal(Weekday::Mon, "07:00", 49),
            goal(Weekday::Wed, "10:00", 49),
        ];
        let now = wednesday_ten() - TimeDelta::hours(49);

        let found = evaluate_goals(now, &goals).unwrap();
        assert_eq!(found.goal.day, Weekday::Wed);
        assert!(found.evaluation.eligible_now);
    }

    #[test]
    fn evaluate_goals_reports_first_match_even_when_too_early() {
        let goals = vec![
            goal(Weekday::Wed, "20:00", 49),
            goal(Weekday::Wed, "10:00", 49),
        ];
        let now = wednesday_ten() - TimeDelta::hours(49);

        let found = evaluate_goals(now, &goals).unwrap();
        assert_eq!(found.goal.time, GoalTime::from_hm(20, 0).unwrap());
        assert!(!found.evaluation.eligible_now);
    }

    #[test]
    fn evaluate_goals_without_match_carries_last_target() {
        let goals = vec![goal(Weekday::Mon, "07:00", 49)];
        let now = wednesday_ten() - TimeDelta::hours(49);

        let err = evaluate_goals(now, &goals).unwrap_err();
        assert_eq!(err.target_day, Some(wednesday_ten()));
        assert_eq!(
            err.to_string(),
            "no training day configured for target Wednesday 2026-10-21"
        );
    }

    #[test]
    fn evaluate_goals_with_no_goals() {
        let err = evaluate_goals(wednesday_ten(), &[]).unwrap_err();
        assert_eq!(err.target_day, None);
    }
}
