//! Concrete approval channels.
//!
//! Each channel implements [`ApprovalChannel`](crate::approval::ApprovalChannel)
//! for delivery and brings its own way of feeding decisions back to the
//! correlator.

pub mod telegram;

pub use telegram::{CallbackAction, TelegramChannel, TelegramConfig, TelegramPoller};
