//! CLI argument definitions for the Courier application.
//!
//! Priority resolution: CLI args > env vars > config file > defaults.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use courier_core::config::ExtractionStrategy;

const CONFIG_ENV: &str = "COURIER_CONFIG";
const PORT_ENV: &str = "COURIER_PORT";
const DEFAULT_PORT: u16 = 8000;

/// Courier - collects shipment origin, destination and date through chat.
#[derive(Parser, Debug)]
#[command(name = "courier", version, about)]
pub struct CliArgs {
    /// Path to the configuration file.
    #[arg(short = 'c', long = "config", global = true)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short = 'l', long = "log-level", global = true)]
    pub log_level: Option<String>,

    /// Extraction strategy (pattern, remote, gemini).
    #[arg(short = 'e', long = "extractor", global = true, value_parser = parse_strategy)]
    pub extractor: Option<ExtractionStrategy>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Run the HTTP API server.
    Serve {
        /// API server port.
        #[arg(short = 'p', long = "port")]
        port: Option<u16>,
    },
    /// Chat in the terminal.
    Chat,
    /// Write a default config file to the resolved config path.
    Init {
        /// Overwrite an existing file.
        #[arg(long = "force")]
        force: bool,
    },
}

fn parse_strategy(s: &str) -> Result<ExtractionStrategy, String> {
    s.parse().map_err(|e: courier_core::CourierError| e.to_string())
}

impl CliArgs {
    /// Resolve the configuration file path.
    ///
    /// Priority: --config flag > COURIER_CONFIG env var > ~/.courier/config.toml
    /// > ./config.toml.
    pub fn resolve_config_path(&self) -> PathBuf {
        pick_config_path(
            self.config.clone(),
            std::env::var(CONFIG_ENV).ok(),
            default_config_path(),
        )
    }

    /// Resolve the API server port.
    ///
    /// Priority: --port flag > COURIER_PORT env var > config file value > 8000.
    pub fn resolve_port(&self, config_port: u16) -> u16 {
        let flag = match self.command {
            Command::Serve { port } => port,
            Command::Chat | Command::Init { .. } => None,
        };
        pick_port(flag, std::env::var(PORT_ENV).ok(), config_port)
    }

    /// Resolve the log level. `None` means use the config file value.
    pub fn resolve_log_level(&self) -> Option<String> {
        self.log_level.clone()
    }
}

fn pick_config_path(flag: Option<PathBuf>, env: Option<String>, fallback: PathBuf) -> PathBuf {
    flag.or_else(|| env.filter(|p| !p.is_empty()).map(PathBuf::from))
        .unwrap_or(fallback)
}

fn pick_port(flag: Option<u16>, env: Option<String>, config_port: u16) -> u16 {
    if let Some(p) = flag {
        return p;
    }
    if let Some(p) = env.and_then(|v| v.trim().parse::<u16>().ok()) {
        return p;
    }
    if config_port != 0 {
        return config_port;
    }
    DEFAULT_PORT
}

/// Default config file path for the current platform.
fn default_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    if let Ok(home) = std::env::var("USERPROFILE") {
        return PathBuf::from(home).join(".courier").join("config.toml");
    }
    #[cfg(not(target_os = "windows"))]
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".courier").join("config.toml");
    }
    PathBuf::from("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_serve_with_port() {
        let args = CliArgs::try_parse_from(["courier", "-e", "remote", "serve", "-p", "9000"])
            .unwrap();
        assert_eq!(args.command, Command::Serve { port: Some(9000) });
        assert_eq!(args.extractor, Some(ExtractionStrategy::Remote));
        assert_eq!(args.resolve_port(8000), 9000);
    }

    #[test]
    fn test_parse_chat_with_global_flags_after_subcommand() {
        let args =
            CliArgs::try_parse_from(["courier", "chat", "-l", "debug", "-c", "/tmp/c.toml"])
                .unwrap();
        assert_eq!(args.command, Command::Chat);
        assert_eq!(args.resolve_log_level().as_deref(), Some("debug"));
        assert_eq!(args.resolve_config_path(), PathBuf::from("/tmp/c.toml"));
    }

    #[test]
    fn test_parse_init() {
        let args = CliArgs::try_parse_from(["courier", "init"]).unwrap();
        assert_eq!(args.command, Command::Init { force: false });
        assert_eq!(args.resolve_port(8123), 8123);

        let args = CliArgs::try_parse_from(["courier", "init", "--force", "-c", "x.toml"]).unwrap();
        assert_eq!(args.command, Command::Init { force: true });
        assert_eq!(args.resolve_config_path(), PathBuf::from("x.toml"));
    }

    #[test]
    fn test_unknown_extractor_is_rejected() {
        assert!(CliArgs::try_parse_from(["courier", "-e", "magic", "chat"]).is_err());
    }

    #[test]
    fn test_subcommand_is_required() {
        assert!(CliArgs::try_parse_from(["courier"]).is_err());
    }

    #[test]
    fn test_port_priority() {
        assert_eq!(pick_port(Some(1), Some("2".into()), 3), 1);
        assert_eq!(pick_port(None, Some("2".into()), 3), 2);
        assert_eq!(pick_port(None, Some("junk".into()), 3), 3);
        assert_eq!(pick_port(None, None, 3), 3);
        assert_eq!(pick_port(None, None, 0), DEFAULT_PORT);
    }

    #[test]
    fn test_config_path_priority() {
        let fallback = PathBuf::from("/home/x/.courier/config.toml");
        assert_eq!(
            pick_config_path(Some("a.toml".into()), Some("b.toml".into()), fallback.clone()),
            PathBuf::from("a.toml")
        );
        assert_eq!(
            pick_config_path(None, Some("b.toml".into()), fallback.clone()),
            PathBuf::from("b.toml")
        );
        assert_eq!(
            pick_config_path(None, Some(String::new()), fallback.clone()),
            fallback
        );
        assert_eq!(pick_config_path(None, None, fallback.clone()), fallback);
    }
}
