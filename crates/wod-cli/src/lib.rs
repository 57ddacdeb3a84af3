//! wodbot CLI library.
//!
//! This crate provides the CLI interface and the booking run orchestration.

mod cli;
pub mod commands;
mod config;
mod messages;
mod notify;

pub use cli::{Cli, Commands};
pub use config::{Config, Credentials};
pub use notify::ConfiguredNotifier;
