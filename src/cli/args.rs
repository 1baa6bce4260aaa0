//! CLI argument parsing using clap.
//!
//! Defines the command-line interface for the askgate server.

use clap::Parser;
use std::path::PathBuf;

/// askgate - Human-in-the-loop approval gateway for agent tool calls
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "askgate")]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Settings file (default: ~/.askgate/settings.toml)
    #[arg(short = 'c', long, env = "ASKGATE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Interface to bind (overrides settings)
    #[arg(long, env = "ASKGATE_HOST")]
    pub host: Option<String>,

    /// Port to listen on (overrides settings)
    #[arg(short = 'p', long, env = "ASKGATE_PORT")]
    pub port: Option<u16>,

    /// Default approval timeout in seconds (overrides settings)
    #[arg(short = 't', long, env = "ASKGATE_TIMEOUT_SECS")]
    pub timeout_secs: Option<u64>,

    /// Run without the Telegram channel even if it is configured
    #[arg(long)]
    pub no_telegram: bool,

    /// Show verbose output (debug logging)
    #[arg(short = 'v', long)]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_default_values() {
        let args = Args::parse_from(["askgate"]);
        assert!(args.host.is_none());
        assert!(args.timeout_secs.is_none());
        assert!(!args.no_telegram);
        assert!(!args.verbose);
    }

    #[test]
    fn test_args_server_overrides() {
        let args = Args::parse_from(["askgate", "--host", "0.0.0.0", "-p", "9000"]);
        assert_eq!(args.host.as_deref(), Some("0.0.0.0"));
        assert_eq!(args.port, Some(9000));
    }

    #[test]
    fn test_args_timeout_and_config() {
        let args = Args::parse_from(["askgate", "-t", "60", "--config", "/tmp/askgate.toml"]);
        assert_eq!(args.timeout_secs, Some(60));
        assert_eq!(args.config, Some(PathBuf::from("/tmp/askgate.toml")));
    }

    #[test]
    fn test_args_flags() {
        let args = Args::parse_from(["askgate", "--no-telegram", "-v"]);
        assert!(args.no_telegram);
        assert!(args.verbose);
    }

    #[test]
    fn test_args_invalid_port() {
        assert!(Args::try_parse_from(["askgate", "--port", "99999"]).is_err());
    }
}
