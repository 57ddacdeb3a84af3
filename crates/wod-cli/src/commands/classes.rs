//! Classes command: list a day's schedule.

use std::io::Write;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Args;
use wod_client::Client;
use wod_core::ClassRecord;

use crate::Config;
use crate::commands::util;

#[derive(Debug, Args)]
pub struct ClassesArgs {
    /// Day to list (YYYY-MM-DD).
    #[arg(long, value_parser = util::parse_day)]
    pub day: NaiveDate,

    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}

pub fn run<W: Write>(writer: &mut W, args: &ClassesArgs, config: &Config) -> Result<()> {
    let credentials = config.credentials()?;
    let (box_name, box_id) = config.box_target()?;
    let client = Client::new(box_name, box_id).context("failed to create booking client")?;

    let runtime = tokio::runtime::Runtime::new().context("failed to initialize tokio runtime")?;
    let classes = runtime.block_on(async {
        let session = client
            .login(&credentials.email, &credentials.password)
            .await
            .context("login failed")?;
        session
            .list_classes(args.day)
            .await
            .with_context(|| format!("failed to list classes for {}", args.day))
    })?;

    if args.json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&classes)?)?;
    } else {
        write_table(writer, args.day, &classes)?;
    }
    Ok(())
}

fn write_table<W: Write>(writer: &mut W, day: NaiveDate, classes: &[ClassRecord]) -> Result<()> {
    if classes.is_empty() {
        writeln!(writer, "No classes on {day}.")?;
        return Ok(());
    }

    writeln!(writer, "Classes on {day}:")?;
    for class in classes {
        let state = class
            .book_state
            .map(|state| format!(" ({state})"))
            .unwrap_or_default();
        writeln!(
            writer,
            "- {} {} [{} / {}] id={}{state}",
            class.time_id, class.class_name, class.occupation, class.limit, class.id
        )?;
    }
    Ok(())
}
