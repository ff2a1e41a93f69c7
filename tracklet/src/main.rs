//! tracklet - send analytics events from the command line
//!
//! This tool provides commands for:
//! - Sending a single event to the ingestion endpoint
//! - Checking client configuration
//!
//! Uses XDG Base Directory specification for file locations:
//! - Config: $XDG_CONFIG_HOME/tracklet/config.toml (~/.config/tracklet/config.toml)
//! - Logs: $XDG_STATE_HOME/tracklet/ (~/.local/state/tracklet/), with --verbose
//!
//! `TRACKLET_BASE_URL`, `TRACKLET_SECRET` and `TRACKLET_SUBJECT_ID` override
//! the `[client]` table of the config file.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::{DateTime, FixedOffset, Utc};
use clap::{Parser, Subcommand};
use serde_json::{Map, Value};
use tracklet_core::{Config, EventClient, TrackEvent};

#[derive(Parser)]
#[command(name = "tracklet")]
#[command(about = "Send analytics events to an ingestion endpoint")]
#[command(version)]
struct Args {
    /// Write logs to the state directory
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (default: $XDG_CONFIG_HOME/tracklet/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Send one event
    Track {
        /// Event name, e.g. "signup"
        event: String,

        /// Subject the event is attributed to (default: client.default_subject_id)
        #[arg(short, long)]
        user: Option<String>,

        /// Event property; VALUE is parsed as JSON, else taken as a string
        #[arg(short, long = "prop", value_name = "KEY=VALUE")]
        props: Vec<String>,

        /// Properties as a JSON object; --prop entries win on conflicts
        #[arg(long, value_name = "JSON")]
        properties: Option<String>,

        /// When the event happened (RFC 3339, or "now")
        #[arg(long, value_name = "TIMESTAMP")]
        at: Option<String>,
    },

    /// Show client configuration
    Status,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = load_config(args.config.as_deref()).context("failed to load configuration")?;

    // Keep the guard alive until exit so buffered log lines get flushed
    let _log_guard = if args.verbose {
        let guard =
            tracklet_core::logging::init(&config.logging).context("failed to initialize logging")?;
        eprintln!("Logging to {}", guard.log_dir().display());
        Some(guard)
    } else {
        None
    };

    match args.command {
        Command::Track {
            event,
            user,
            props,
            properties,
            at,
        } => cmd_track(config, event, user, &props, properties.as_deref(), at.as_deref()),
        Command::Status => cmd_status(&config),
    }
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    let mut config = match path {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    config.client.apply_env();
    Ok(config)
}

fn cmd_track(
    config: Config,
    name: String,
    user: Option<String>,
    props: &[String],
    properties: Option<&str>,
    at: Option<&str>,
) -> Result<()> {
    let mut event = TrackEvent::new(name);
    if let Some(user) = user {
        event = event.subject_id(user);
    }
    if let Some(json) = properties {
        event = event.properties(parse_properties(json)?);
    }
    for prop in props {
        let (key, value) = parse_prop(prop)?;
        event = event.property(key, value);
    }
    if let Some(at) = at {
        event = event.occurred_at(parse_timestamp(at)?);
    }

    let client = EventClient::new(config.client).context("invalid client configuration")?;

    tracing::info!(event = %event.event, base_url = %client.base_url(), "Sending event");

    client
        .track(&event)
        .with_context(|| format!("failed to track event '{}'", event.event))?;

    println!("Event '{}' delivered", event.event);
    Ok(())
}

fn cmd_status(config: &Config) -> Result<()> {
    println!("Tracklet Client Configuration");
    println!("=============================");
    println!();

    let client = &config.client;

    println!(
        "Base URL:        {}",
        client.base_url.as_deref().unwrap_or("<not set>")
    );
    println!(
        "Secret:          {}",
        if client.secret.as_deref().is_some_and(|s| !s.is_empty()) {
            "<set>"
        } else {
            "<not set>"
        }
    );
    println!(
        "Default Subject: {}",
        client.default_subject_id.as_deref().unwrap_or("<not set>")
    );
    println!("Timeout:         {}s", client.timeout_secs);

    println!();
    match client.validate().and_then(|()| client.endpoint()) {
        Ok(endpoint) => {
            println!("Endpoint:        {}", endpoint);
            println!();
            println!("Status: Ready to send");
        }
        Err(e) => {
            println!("Status: Not ready ({})", e);
            println!();
            println!("Configure the client in config.toml:");
            println!();
            println!("  [client]");
            println!("  base_url = \"https://your-ingestion-server.com\"");
            println!("  secret = \"sdk_xxxxxxxxxxxx\"");
            println!();
            println!("or set TRACKLET_BASE_URL and TRACKLET_SECRET.");
        }
    }

    Ok(())
}

/// Split `KEY=VALUE`; VALUE is JSON if it parses, else a plain string
fn parse_prop(raw: &str) -> Result<(String, Value)> {
    let Some((key, value)) = raw.split_once('=') else {
        bail!("invalid --prop {:?}: expected KEY=VALUE", raw);
    };
    if key.is_empty() {
        bail!("invalid --prop {:?}: key must not be empty", raw);
    }

    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((key.to_string(), value))
}

fn parse_properties(raw: &str) -> Result<Map<String, Value>> {
    match serde_json::from_str::<Value>(raw).context("--properties is not valid JSON")? {
        Value::Object(map) => Ok(map),
        _ => bail!("--properties must be a JSON object"),
    }
}

fn parse_timestamp(raw: &str) -> Result<DateTime<FixedOffset>> {
    if raw.eq_ignore_ascii_case("now") {
        return Ok(Utc::now().into());
    }
    DateTime::parse_from_rfc3339(raw)
        .with_context(|| format!("invalid --at {:?}: expected an RFC 3339 timestamp", raw))
}
