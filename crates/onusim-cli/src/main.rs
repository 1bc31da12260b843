//! Command-line driver for the onusim OMCI responder.

mod driver;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use onusim_omci::{OmciConfig, OmciResponder};

use crate::driver::{catalogue_rows, frame_at, run_upload};

/// Environment variable selecting JSON log output.
const LOG_JSON_ENV: &str = "ONUSIM_LOG_JSON";

/// OnuSim - answer OLT OMCI requests for emulated ONUs.
#[derive(Parser, Debug)]
#[command(name = "onusim")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Action to perform.
    #[command(subcommand)]
    command: Command,

    /// TOML configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Command {
    /// Provision a batch of ONUs through a full MIB upload.
    Upload {
        /// Number of PON ports.
        #[arg(long, default_value_t = 1)]
        pon_ports: u32,
        /// ONUs per PON port.
        #[arg(long, default_value_t = 4)]
        onus: u32,
        /// Print summaries as JSON.
        #[arg(long)]
        json: bool,
    },
    /// List the MIB upload catalogue.
    Catalogue {
        /// Print the listing as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Hex dump of the upload next frame a fresh ONU returns at an index.
    Frame {
        /// Upload next command number.
        #[arg(short, long)]
        index: u16,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging();

    let config = load_config(args.config.as_deref())?;

    match args.command {
        Command::Upload {
            pon_ports,
            onus,
            json,
        } => upload(config, pon_ports, onus, json).await,
        Command::Catalogue { json } => print_catalogue(json),
        Command::Frame { index } => print_frame(config, index),
    }
}

fn init_logging() {
    // Check if JSON logging is requested (for container environments)
    let json_logging = std::env::var(LOG_JSON_ENV)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(false);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("onusim=info"));

    // Logs go to stderr so that stdout stays machine readable.
    if json_logging {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
            .compact()
            .with_writer(std::io::stderr)
            .init();
    }
}

/// Config file when given, defaults otherwise. Environment overrides apply
/// on top of either.
fn load_config(path: Option<&std::path::Path>) -> Result<OmciConfig> {
    let config = match path {
        Some(path) => OmciConfig::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => OmciConfig::from_env().context("Invalid environment configuration")?,
    };
    Ok(config)
}

async fn upload(config: OmciConfig, pon_ports: u32, onus: u32, json: bool) -> Result<()> {
    let responder = Arc::new(OmciResponder::new(config).context("Invalid configuration")?);
    let summaries = run_upload(responder, pon_ports, onus).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
        return Ok(());
    }

    println!(
        "{:<24} {:>7} {:>8} {:<10} {:>8}",
        "ONU", "UPLOADS", "OVERFLOW", "LIFECYCLE", "GEM PORT"
    );
    for summary in &summaries {
        let gem_port = summary
            .gem_port_id
            .map(|id| id.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<24} {:>7} {:>8} {:<10} {:>8}",
            summary.onu.to_string(),
            summary.uploads,
            summary.overflow,
            format!("{:?}", summary.lifecycle),
            gem_port
        );
    }
    Ok(())
}

fn print_catalogue(json: bool) -> Result<()> {
    let rows = catalogue_rows();
    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }
    for row in rows {
        println!(
            "{:>3}  {:<36} {:>5}  {}",
            row.index, row.name, row.class, row.rule
        );
    }
    Ok(())
}

fn print_frame(config: OmciConfig, index: u16) -> Result<()> {
    let frame = frame_at(config, index)?;
    for chunk in frame.as_bytes().chunks(16) {
        println!("{}", hex::encode(chunk));
    }
    Ok(())
}
