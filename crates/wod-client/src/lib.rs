//! Remote collaborators for wodbot.
//!
//! - [`aimharder`]: the booking service session protocol (login, class
//!   listing, booking, cancellation)
//! - [`telegram`]: outcome notifications through a Telegram bot

pub mod aimharder;
pub mod telegram;

pub use aimharder::{CancelOutcome, Client, ClientError, Endpoints, Session};
pub use telegram::{MessageFormat, Notification, Notifier, NotifyError, TelegramNotifier};
