//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::commands::book::BookArgs;
use crate::commands::cancel::CancelArgs;
use crate::commands::classes::ClassesArgs;
use crate::commands::window::WindowArgs;

/// Automatic class booking for AimHarder boxes.
///
/// Meant to be run periodically (e.g. from cron): each run checks whether a
/// configured class has just become bookable and, if so, books it.
#[derive(Debug, Parser)]
#[command(name = "wodbot", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Book the configured class if its booking window is open.
    Book(BookArgs),

    /// Show the booking window of every configured goal.
    Window(WindowArgs),

    /// List the classes scheduled on a day.
    Classes(ClassesArgs),

    /// Cancel an existing booking.
    Cancel(CancelArgs),
}
