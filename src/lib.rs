pub mod approval;
pub mod channels;
pub mod conversation;
pub mod error;
pub mod hook;
pub mod server;
pub mod settings;

#[cfg(feature = "cli")]
pub mod cli;

pub use approval::{
    ApprovalChannel, ApprovalCorrelator, ApprovalOrchestrator, ApprovalRequest, ApprovalResponse,
    ApprovalStatus, NotificationDispatcher,
};
pub use error::{ApprovalError, Result};
