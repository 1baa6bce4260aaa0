//! CLI module for running askgate as a standalone server.
//!
//! ```text
//! +-----------+     +--------------+     +----------------------+
//! | args.rs   | --> | bootstrap.rs | --> | runner.rs            |
//! | (clap)    |     | (settings,   |     | (HTTP server,        |
//! |           |     |  channels)   |     |  poller, shutdown)   |
//! +-----------+     +--------------+     +----------------------+
//! ```

mod args;
mod bootstrap;
mod runner;

pub use args::Args;
pub use bootstrap::{initialize, AppContext};
pub use runner::run;
