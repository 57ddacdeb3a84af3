//! CLI subcommand implementations.

pub mod book;
pub mod cancel;
pub mod classes;
pub mod util;
pub mod window;
