// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-air-quality project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

use clap::Parser;
use std::error::Error;
use std::time::Duration;

use rust_air_quality::aqi::estimate_aqi;
use rust_air_quality::config::{ModbusConfig, TransportKind};
use rust_air_quality::sensor::{transport, value_of, Parameter, RegisterReader};

/// Modbus client reading the eight registers of an air quality sensor once
#[derive(Parser, Debug)]
#[clap(author, version, about)]
struct Args {
    /// Link to the sensor
    #[clap(long, value_enum, default_value = "tcp")]
    transport: TransportKind,

    /// Modbus TCP host
    #[clap(long, default_value = "127.0.0.1")]
    address: String,

    /// Modbus TCP port
    #[clap(long, default_value = "502")]
    port: u16,

    /// Serial device for the rtu transport
    #[clap(long, default_value = "/dev/ttyAMA3")]
    serial_port: String,

    #[clap(long, default_value = "9600")]
    baud_rate: u32,

    /// Modbus unit identifier
    #[clap(long, default_value = "1")]
    slave_id: u8,

    /// Give up on the poll after this many milliseconds
    #[clap(long, default_value = "10000")]
    timeout_ms: u64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init_from_env(
        env_logger::Env::default().filter_or(env_logger::DEFAULT_FILTER_ENV, "info"),
    );

    let args = Args::parse();
    let config = ModbusConfig {
        transport: args.transport,
        serial_port: args.serial_port,
        baud_rate: args.baud_rate,
        slave_id: args.slave_id,
        tcp_address: args.address,
        tcp_port: args.port,
        timeout_ms: args.timeout_ms,
        ..ModbusConfig::default()
    };

    let transport = transport::connect(&config).await?;
    println!("Connected to {}", transport.endpoint());
    let reader = RegisterReader::new(transport);

    let readings = reader
        .read_all_within(Duration::from_millis(config.timeout_ms))
        .await?;

    println!("{:<12} {:>8} {:>6} {:>10}  unit", "parameter", "register", "raw", "value");
    for reading in &readings {
        let spec = reading.parameter.spec();
        println!(
            "{:<12} {:>8} {:>6} {:>10}  {}",
            reading.parameter.title(),
            spec.address,
            reading
                .raw
                .map_or_else(|| "-".to_string(), |r| r.to_string()),
            reading
                .value
                .map_or_else(|| "-".to_string(), |v| format!("{:.1}", v)),
            spec.unit
        );
    }

    let aqi = estimate_aqi(
        value_of(&readings, Parameter::Pm2_5),
        value_of(&readings, Parameter::Pm10),
        value_of(&readings, Parameter::O2),
    );
    match aqi.value() {
        Some(value) => println!("AQI: {:.2} ({})", value, aqi.health()),
        None => println!("AQI: undetermined"),
    }

    reader.disconnect().await?;
    Ok(())
}
