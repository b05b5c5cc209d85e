//! Courier application binary - composition root.
//!
//! 1. Parse CLI arguments and load configuration from TOML
//! 2. Build the configured extractor and the dialogue engine
//! 3. Either serve the HTTP API or run a terminal chat

mod cli;

use std::path::Path;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, reload, EnvFilter, Registry};

use courier_api::state::AppState;
use courier_core::config::CourierConfig;
use courier_core::CourierError;
use courier_dialogue::{build_extractor, Conversation, DialogueEngine};

use crate::cli::{CliArgs, Command};

type LogFilterHandle = reload::Handle<EnvFilter, Registry>;

/// Install the global subscriber.
///
/// Returns a handle for swapping the level once the config file has been
/// read, or `None` when `RUST_LOG` is set and must be left alone.
fn init_tracing(level: &str) -> Option<LogFilterHandle> {
    let (filter, from_env) = match EnvFilter::try_from_default_env() {
        Ok(filter) => (filter, true),
        Err(_) => (EnvFilter::new(level), false),
    };
    let (filter, handle) = reload::Layer::new(filter);
    tracing_subscriber::registry()
        .with(filter)
        // Keep stdout for the chat transcript.
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
    (!from_env).then_some(handle)
}

/// Read the config file, or use defaults when there is none.
fn load_config(path: &Path) -> CourierConfig {
    if path.exists() {
        CourierConfig::load_or_default(path)
    } else {
        tracing::info!(path = %path.display(), "No config file, using defaults");
        CourierConfig::default()
    }
}

/// Write a default config file. An existing file is only replaced with `force`.
fn write_default_config(path: &Path, force: bool) -> Result<(), CourierError> {
    if path.exists() && !force {
        return Err(CourierError::Config(format!(
            "{} already exists, pass --force to overwrite it",
            path.display()
        )));
    }
    CourierConfig::default().save(path)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl-C");
        return;
    }
    tracing::info!("Shutdown signal received");
}

/// Interactive terminal loop over one conversation at a time.
async fn run_chat(engine: &DialogueEngine, config: &CourierConfig) -> std::io::Result<()> {
    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    let mut convo = Conversation::with_limits(config.dialogue.clone());
    stdout
        .write_all(b"Type /reset to start over, /quit to exit.\n")
        .await?;
    let greeting = convo.greeting(engine).await;
    stdout.write_all(format!("> {}\n", greeting).as_bytes()).await?;

    loop {
        stdout.write_all(b"you: ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();
        match line {
            "" => continue,
            "/quit" => break,
            "/reset" => {
                convo = Conversation::with_limits(config.dialogue.clone());
                tracing::debug!(conversation_id = %convo.id(), "Conversation reset");
                let greeting = convo.greeting(engine).await;
                stdout.write_all(format!("> {}\n", greeting).as_bytes()).await?;
                continue;
            }
            _ => {}
        }

        match convo.submit(engine, line).await {
            Ok(advance) => {
                stdout
                    .write_all(format!("> {}\n", advance.reply).as_bytes())
                    .await?;
            }
            Err(e) => {
                stdout.write_all(format!("! {}\n", e).as_bytes()).await?;
            }
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    let flag_level = args.resolve_log_level();
    let log_filter = init_tracing(flag_level.as_deref().unwrap_or("info"));

    tracing::info!("Starting Courier v{}", env!("CARGO_PKG_VERSION"));

    let config_file = args.resolve_config_path();
    if let Command::Init { force } = args.command {
        write_default_config(&config_file, force)?;
        println!("Wrote {}", config_file.display());
        return Ok(());
    }

    let mut config = load_config(&config_file);
    tracing::info!(path = %config_file.display(), "Configuration resolved");

    // The --log-level flag already applied; otherwise use the config level.
    if let (None, Some(handle)) = (flag_level, log_filter) {
        if let Err(e) = handle.reload(EnvFilter::new(&config.general.log_level)) {
            tracing::warn!(error = %e, "Failed to apply configured log level");
        }
    }

    if let Some(strategy) = args.extractor {
        config.extraction.strategy = strategy;
    }
    config.server.port = args.resolve_port(config.server.port);

    let extractor = build_extractor(&config.extraction)?;
    let engine = DialogueEngine::new(extractor);

    match args.command {
        Command::Serve { .. } => {
            let state = AppState::new(config.clone(), engine);
            courier_api::start_server(&config, state, shutdown_signal()).await?;
        }
        Command::Chat => {
            run_chat(&engine, &config).await?;
        }
        Command::Init { .. } => {}
    }

    Ok(())
}
