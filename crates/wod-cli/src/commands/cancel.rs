//! Cancel command: drop an existing reservation.

use std::io::Write;

use anyhow::{Context, Result, bail};
use clap::Args;
use wod_client::{CancelOutcome, Client};
use wod_core::BookingId;

use crate::Config;

#[derive(Debug, Args)]
pub struct CancelArgs {
    /// Id of the reservation to cancel.
    #[arg(long)]
    pub id: BookingId,
}

pub fn run<W: Write>(writer: &mut W, args: &CancelArgs, config: &Config) -> Result<()> {
    let credentials = config.credentials()?;
    let (box_name, box_id) = config.box_target()?;
    let client = Client::new(box_name, box_id).context("failed to create booking client")?;

    let runtime = tokio::runtime::Runtime::new().context("failed to initialize tokio runtime")?;
    let outcome = runtime.block_on(async {
        let session = client
            .login(&credentials.email, &credentials.password)
            .await
            .context("login failed")?;
        session
            .cancel(&args.id)
            .await
            .with_context(|| format!("failed to cancel booking {}", args.id))
    })?;

    match outcome {
        CancelOutcome::Cancelled => {
            writeln!(writer, "Cancelled booking {}", args.id)?;
            Ok(())
        }
        CancelOutcome::UnknownFailure { status, body } => {
            bail!("cancellation of {} failed (HTTP {status}): {body}", args.id)
        }
    }
}
