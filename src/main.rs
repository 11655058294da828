// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-air-quality project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

// Main entry point for the air quality monitor

use anyhow::Result;
use clap::Parser;
use log::info;
use std::path::PathBuf;
use tokio::signal;

use rust_air_quality::config::{self, Config, TransportKind};
use rust_air_quality::daemon::Daemon;
use rust_air_quality::dashboard::FreshnessStatus;

/// Air quality monitor reading a Modbus sensor and serving AQI dashboards
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Web server port
    #[arg(short = 'p', long)]
    web_port: Option<u16>,

    /// Web server address
    #[arg(short, long)]
    web_address: Option<String>,

    /// Link used to reach the sensor
    #[arg(long, value_enum)]
    transport: Option<TransportKind>,

    /// Serial device of the RS-485 adapter
    #[arg(long)]
    serial_port: Option<String>,

    #[arg(long)]
    baud_rate: Option<u32>,

    /// Modbus unit identifier of the sensor
    #[arg(long)]
    slave_id: Option<u8>,

    /// Start the built-in Modbus TCP sensor simulator
    #[arg(long)]
    simulator: Option<bool>,

    /// Configuration file (default: config.yaml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Validate a configuration file and exit
    #[arg(long)]
    validate_config: Option<PathBuf>,

    /// Print the configuration JSON schema and exit
    #[arg(long)]
    show_config_schema: bool,

    /// Poll the sensor once, print the dashboard snapshot as JSON and exit
    #[arg(long)]
    once: bool,

    /// Enable debug logging
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,

    /// Disable logging
    #[arg(short = 'q', long = "quiet")]
    quiet: bool,
}

#[rocket::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = if args.quiet {
        log::LevelFilter::Off
    } else if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    if args.show_config_schema {
        return config::output_config_schema();
    }

    if let Some(validate_path) = args.validate_config {
        if !validate_path.exists() {
            return Err(anyhow::anyhow!(
                "Configuration file does not exist: {}",
                validate_path.display()
            ));
        }

        Config::from_file(&validate_path)
            .map_err(|err| anyhow::anyhow!("Configuration validation failed: {:#}", err))?;
        println!("Configuration file is valid: {}", validate_path.display());
        return Ok(());
    }

    let config_path = args
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from("config.yaml"));
    let mut config = Config::from_file(&config_path)?;

    config.apply_args(
        args.web_port,
        args.web_address.clone(),
        args.transport,
        args.serial_port.clone(),
        args.baud_rate,
        args.slave_id,
        args.simulator,
    );

    if args.once {
        return poll_once(config).await;
    }

    info!("Starting in daemon mode");
    let mut daemon = Daemon::new();
    daemon.launch(&config).await?;

    match signal::ctrl_c().await {
        Ok(()) => {
            info!("Received shutdown signal, terminating daemon");
        }
        Err(err) => {
            eprintln!("Error waiting for shutdown signal: {}", err);
        }
    }
    daemon.shutdown();
    daemon.join().await?;

    Ok(())
}

/// Single dashboard refresh printed on stdout.
async fn poll_once(mut config: Config) -> Result<()> {
    config.visualization.enabled = false;
    config.acquisition.enabled = false;

    let mut daemon = Daemon::new();
    daemon.launch(&config).await?;
    let dashboard = daemon
        .dashboard()
        .ok_or_else(|| anyhow::anyhow!("Daemon did not create a dashboard"))?;

    let snapshot = dashboard.refresh().await;
    println!("{}", serde_json::to_string_pretty(&snapshot)?);

    daemon.shutdown();
    daemon.join().await?;

    if snapshot.status != FreshnessStatus::Live {
        anyhow::bail!(
            "Poll failed: {}",
            snapshot.error.unwrap_or_else(|| "unknown error".to_string())
        );
    }
    Ok(())
}
