use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use tracing::Level;

macro_rules! env_prefix {
    () => {
        "DDNS_"
    };
}

/// Keep a Cloudflare DNS record pointed at this host's public address
#[derive(Debug, Clone, PartialEq, Eq, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the JSON config file
    #[arg(
        short = 'c',
        long,
        default_value = "config.json",
        value_name = "PATH",
        env = concat!(env_prefix!(), "CONFIG")
    )]
    pub config: PathBuf,

    /// Print an example config file and exit
    #[arg(long, default_value_t = false, action)]
    pub generate_config: bool,

    /// Set the loglevel of the daemon
    #[arg(
        value_enum,
        short = 'l',
        long,
        default_value_t = Loglevel::Info,
        value_name = "LEVEL",
        env = concat!(env_prefix!(), "LOG_LEVEL")
    )]
    pub log_level: Loglevel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Loglevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<Loglevel> for Level {
    fn from(level: Loglevel) -> Self {
        match level {
            Loglevel::Trace => Level::TRACE,
            Loglevel::Debug => Level::DEBUG,
            Loglevel::Info => Level::INFO,
            Loglevel::Warn => Level::WARN,
            Loglevel::Error => Level::ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["ddnsd"]).unwrap();
        assert_eq!(cli.config, PathBuf::from("config.json"));
        assert!(!cli.generate_config);
        assert_eq!(cli.log_level, Loglevel::Info);
    }

    #[test]
    fn test_flags() {
        let cli = Cli::try_parse_from([
            "ddnsd",
            "-c",
            "/etc/ddns/config.json",
            "--generate-config",
            "--log-level",
            "debug",
        ])
        .unwrap();
        assert_eq!(cli.config, PathBuf::from("/etc/ddns/config.json"));
        assert!(cli.generate_config);
        assert_eq!(Level::from(cli.log_level), Level::DEBUG);
    }

    #[test]
    fn test_unknown_log_level_is_rejected() {
        assert!(Cli::try_parse_from(["ddnsd", "--log-level", "loud"]).is_err());
    }
}
