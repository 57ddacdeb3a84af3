//! Class selection from a day's schedule.

use std::fmt;

use thiserror::Error;

use crate::types::ClassRecord;

/// Marker the service puts in the name of open-gym slots.
pub const OPEN_GYM_MARKER: &str = "OPEN";

/// Which part of a goal failed to match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchCriterion {
    Time,
    Name,
}

impl fmt::Display for MatchCriterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Time => write!(f, "time"),
            Self::Name => write!(f, "name"),
        }
    }
}

/// Why no class could be selected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatchError {
    /// The schedule for the day is empty.
    #[error("the box is closed: no classes scheduled")]
    BoxClosed,

    /// No class matched the goal's time or name.
    #[error("no class found for {criterion} ({value})")]
    NoBookingGoal {
        criterion: MatchCriterion,
        value: String,
    },
}

/// Selects the class to book.
///
/// Keeps classes whose `timeid` contains `target_time`, drops open-gym slots
/// unless the pattern asks for them, and disambiguates by name when more than
/// one candidate is left. The first surviving record in input order wins;
/// there is no ranking.
pub fn select_class<'a>(
    classes: &'a [ClassRecord],
    target_time: &str,
    name_pattern: &str,
) -> Result<&'a ClassRecord, MatchError> {
    if classes.is_empty() {
        tracing::warn!("no classes scheduled, box is closed");
        return Err(MatchError::BoxClosed);
    }

    let at_time: Vec<&ClassRecord> = classes
        .iter()
        .filter(|class| class.time_id.contains(target_time))
        .collect();
    if at_time.is_empty() {
        tracing::warn!(target_time, "no class found for time");
        return Err(no_match(MatchCriterion::Time, target_time));
    }
    tracing::info!(target_time, candidates = at_time.len(), "class found for time");

    let wants_open_gym = name_pattern.contains(OPEN_GYM_MARKER);
    let mut candidates: Vec<&ClassRecord> = at_time
        .into_iter()
        .filter(|class| wants_open_gym || !class.class_name.contains(OPEN_GYM_MARKER))
        .collect();

    if candidates.len() > 1 {
        candidates.retain(|class| class.class_name.contains(name_pattern));
        if candidates.is_empty() {
            tracing::warn!(name_pattern, "no class found for name");
            return Err(no_match(MatchCriterion::Name, name_pattern));
        }
        tracing::info!(name_pattern, "class found for name");
    }

    let Some(selected) = candidates.first().copied() else {
        tracing::warn!(name_pattern, "only open-gym slots at the target time");
        return Err(no_match(MatchCriterion::Name, name_pattern));
    };

    tracing::info!(
        id = %selected.id,
        time_id = %selected.time_id,
        class_name = %selected.class_name,
        occupation = selected.occupation,
        limit = selected.limit,
        "class selected"
    );
    Ok(selected)
}

fn no_match(criterion: MatchCriterion, value: &str) -> MatchError {
    MatchError::NoBookingGoal {
        criterion,
        value: value.to_string(),
    }
}
