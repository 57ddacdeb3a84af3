//! Window command: show each goal's booking window without touching the network.

use std::io::Write;

use anyhow::Result;
use chrono::{NaiveDateTime, TimeDelta};
use clap::Args;
use wod_core::{BookingGoal, evaluate};

use crate::Config;
use crate::commands::util;

#[derive(Debug, Args)]
pub struct WindowArgs {
    /// Evaluate as if it were this local time (e.g. "2026-10-19 09:00").
    #[arg(long, value_parser = util::parse_local_datetime)]
    pub now: Option<NaiveDateTime>,
}

pub fn run<W: Write>(writer: &mut W, args: &WindowArgs, config: &Config) -> Result<()> {
    let goals = config.booking_goals()?;
    let now = util::now_or(args.now);
    write_windows(writer, now, &goals)
}

fn write_windows<W: Write>(
    writer: &mut W,
    now: NaiveDateTime,
    goals: &[BookingGoal],
) -> Result<()> {
    writeln!(writer, "Now: {}", now.format("%a %Y-%m-%d %H:%M:%S"))?;
    for goal in goals {
        let evaluation = evaluate(now, goal);
        let status = match evaluation.class_start {
            None => "not a training day".to_string(),
            Some(class_start) if evaluation.eligible_now => {
                format!("open (class {})", class_start.format("%a %Y-%m-%d %H:%M"))
            }
            Some(class_start) => {
                let opens_at =
                    class_start - TimeDelta::hours(i64::from(goal.advance_notice_hours));
                format!(
                    "opens {} (class {})",
                    opens_at.format("%a %Y-%m-%d %H:%M"),
                    class_start.format("%a %Y-%m-%d %H:%M")
                )
            }
        };
        writeln!(
            writer,
            "- {} {} {} ({}h): target {} -> {status}",
            goal.day,
            goal.time,
            goal.name_pattern,
            goal.advance_notice_hours,
            evaluation.target_day.format("%a %Y-%m-%d"),
        )?;
    }
    Ok(())
}
