//! Book command: one scheduled booking run.
//!
//! Sequence: evaluate goals against the clock, log in, list the target day's
//! classes, select the goal class, submit the booking. Every reportable
//! ending is mapped once, here, to a log line and a notification.

use std::io::Write;

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use clap::Args;
use wod_client::{Client, ClientError, Notifier};
use wod_core::{BookingGoal, BookingOutcome, ClassRecord, evaluate_goals, select_class};

use crate::Config;
use crate::commands::util;
use crate::config::Credentials;
use crate::messages;
use crate::notify::{self, ConfiguredNotifier};

#[derive(Debug, Args)]
pub struct BookArgs {
    /// Stop after selecting the class, without booking it.
    #[arg(long)]
    pub dry_run: bool,

    /// Evaluate as if it were this local time (e.g. "2026-10-19 09:00").
    #[arg(long, value_parser = util::parse_local_datetime)]
    pub now: Option<NaiveDateTime>,
}

/// How a booking run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunReport {
    /// No goal falls on the day a booking would target.
    NoTrainingDay { target_day: Option<NaiveDateTime> },
    /// A goal matched but its booking window is not open yet.
    NotYetOpen {
        goal: BookingGoal,
        target_day: NaiveDateTime,
    },
    /// A class was selected; booking was skipped on request.
    DryRun {
        goal: BookingGoal,
        target_day: NaiveDateTime,
        class: ClassRecord,
    },
    /// A booking attempt ran to an outcome.
    Finished {
        goal: BookingGoal,
        target_day: NaiveDateTime,
        class: Option<ClassRecord>,
        outcome: BookingOutcome,
    },
}

impl RunReport {
    /// Whether the run should end with a failing exit status.
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Finished { outcome, .. } if outcome.is_failure())
    }

    /// One-line human summary.
    pub fn summary(&self) -> String {
        match self {
            Self::NoTrainingDay { target_day } => match target_day {
                Some(day) => format!("No training day for {}", day.format("%A %Y-%m-%d")),
                None => "No training day".to_string(),
            },
            Self::NotYetOpen { goal, target_day } => format!(
                "Booking for {} at {} not open yet (target {})",
                goal.name_pattern,
                goal.time,
                target_day.format("%Y-%m-%d %H:%M")
            ),
            Self::DryRun {
                target_day, class, ..
            } => format!(
                "Would book {} ({}) on {} [{} / {}]",
                class.class_name,
                class.id,
                target_day.format("%Y-%m-%d"),
                class.occupation,
                class.limit
            ),
            Self::Finished {
                goal,
                target_day,
                outcome,
                ..
            } => format!(
                "{} at {} on {}: {outcome}",
                goal.name_pattern,
                goal.time,
                target_day.format("%Y-%m-%d")
            ),
        }
    }
}

/// Inputs of one run.
#[derive(Debug)]
pub struct Plan<'a> {
    pub now: NaiveDateTime,
    pub goals: &'a [BookingGoal],
    pub credentials: &'a Credentials,
    pub dry_run: bool,
}

pub fn run<W: Write>(writer: &mut W, args: &BookArgs, config: &Config) -> Result<()> {
    let goals = config.booking_goals()?;
    let credentials = config.credentials()?;
    let (box_name, box_id) = config.box_target()?;
    let notifier = ConfiguredNotifier::from_config(config)?;
    let client = Client::new(box_name, box_id).context("failed to create booking client")?;

    let plan = Plan {
        now: util::now_or(args.now),
        goals: &goals,
        credentials: &credentials,
        dry_run: args.dry_run,
    };
    let runtime = tokio::runtime::Runtime::new().context("failed to initialize tokio runtime")?;
    let report = runtime.block_on(execute(client, &plan, &notifier))?;

    writeln!(writer, "{}", report.summary())?;
    if report.is_failure() {
        anyhow::bail!("booking failed: {}", report.summary());
    }
    Ok(())
}

/// Runs one booking attempt and reports it through `notifier`.
///
/// Business endings (not open yet, box closed, already booked, ...) come back
/// as a [`RunReport`]. Login and transport errors are notified and returned.
pub async fn execute<N: Notifier + Sync>(
    client: Client,
    plan: &Plan<'_>,
    notifier: &N,
) -> Result<RunReport> {
    let found = match evaluate_goals(plan.now, plan.goals) {
        Ok(found) => found,
        Err(no_day) => {
            tracing::info!(target_day = ?no_day.target_day, "no training day");
            notify::deliver(notifier, &[messages::no_training_day(no_day.target_day)]).await;
            return Ok(RunReport::NoTrainingDay {
                target_day: no_day.target_day,
            });
        }
    };
    let goal = found.goal.clone();
    let target_day = found.evaluation.target_day;

    if !found.evaluation.eligible_now {
        tracing::info!(
            target_day = %target_day,
            "booking window not open yet or already missed"
        );
        return Ok(RunReport::NotYetOpen { goal, target_day });
    }

    let (class, outcome) = match attempt(client, plan, &goal, target_day).await {
        Ok(result) => result,
        Err(err) => {
            tracing::error!(error = ?err, "booking run failed");
            let detail = format!("{err:#}");
            let failure = if is_authentication_failure(&err) {
                messages::login_failure(Some(target_day), &detail)
            } else {
                messages::failure(Some(target_day), &detail)
            };
            notify::deliver(notifier, &failure).await;
            return Err(err);
        }
    };

    let Some(outcome) = outcome else {
        let class = class.context("dry run ended without a class")?;
        return Ok(RunReport::DryRun {
            goal,
            target_day,
            class,
        });
    };

    if outcome.is_booked() {
        tracing::info!(
            identity = %plan.credentials.email,
            target_day = %target_day,
            outcome = outcome.as_str(),
            "booking run finished"
        );
    } else {
        tracing::warn!(
            identity = %plan.credentials.email,
            target_day = %target_day,
            outcome = outcome.as_str(),
            "booking run finished without a reservation"
        );
    }
    notify::deliver(
        notifier,
        &messages::for_outcome(target_day, &goal, class.as_ref(), &outcome),
    )
    .await;

    Ok(RunReport::Finished {
        goal,
        target_day,
        class,
        outcome,
    })
}

fn is_authentication_failure(err: &anyhow::Error) -> bool {
    err.chain()
        .filter_map(|cause| cause.downcast_ref::<ClientError>())
        .any(ClientError::is_authentication)
}

/// Login, list, select and book. `None` outcome means a dry run stopped
/// after selection.
async fn attempt(
    client: Client,
    plan: &Plan<'_>,
    goal: &BookingGoal,
    target_day: NaiveDateTime,
) -> Result<(Option<ClassRecord>, Option<BookingOutcome>)> {
    let session = client
        .login(&plan.credentials.email, &plan.credentials.password)
        .await
        .context("login failed")?;

    let day = target_day.date();
    let classes = session
        .list_classes(day)
        .await
        .with_context(|| format!("failed to list classes for {day}"))?;

    let class = match select_class(&classes, &goal.time.time_id_fragment(), &goal.name_pattern) {
        Ok(class) => class.clone(),
        Err(err) => return Ok((None, Some(err.into()))),
    };

    if plan.dry_run {
        tracing::info!(
            identity = session.identity(),
            id = %class.id,
            "dry run, skipping booking"
        );
        return Ok((Some(class), None));
    }

    let outcome = session
        .book(day, &class.id)
        .await
        .with_context(|| format!("failed to submit booking for class {}", class.id))?;
    Ok((Some(class), Some(outcome)))
}
