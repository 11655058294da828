// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-air-quality project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

use anyhow::Result;
use rust_air_quality::aqi::OutOfRangePolicy;
use rust_air_quality::config::{Config, SerialParity, TransportKind};
use std::fs;
use std::path::Path;
use std::sync::Once;
use tempfile::tempdir;

static INIT: Once = Once::new();

fn setup() {
    INIT.call_once(|| {
        let _ = env_logger::builder()
            .filter_level(log::LevelFilter::Debug)
            .is_test(true)
            .try_init();
    });
}

#[test]
fn test_config_load_and_save() -> Result<()> {
    setup();
    let temp_dir = tempdir()?;
    let config_path = temp_dir.path().join("config.yaml");

    let mut config = Config::default();
    config.visualization.port = 8081;
    config.visualization.address = "0.0.0.0".to_string();
    config.modbus.transport = TransportKind::Tcp;
    config.modbus.tcp_address = "192.168.1.50".to_string();
    config.modbus.parity = SerialParity::Even;
    config.aqi.out_of_range = OutOfRangePolicy::Clamp;
    config.save_to_file(&config_path)?;

    let loaded_config = Config::from_file(&config_path)?;
    assert_eq!(loaded_config.visualization.port, 8081);
    assert_eq!(loaded_config.visualization.address, "0.0.0.0");
    assert_eq!(loaded_config.modbus.transport, TransportKind::Tcp);
    assert_eq!(loaded_config.modbus.tcp_address, "192.168.1.50");
    assert_eq!(loaded_config.modbus.parity, SerialParity::Even);
    assert_eq!(loaded_config.aqi.out_of_range, OutOfRangePolicy::Clamp);

    Ok(())
}

#[test]
fn test_missing_file_is_created_with_defaults() -> Result<()> {
    setup();
    let temp_dir = tempdir()?;
    let config_path = temp_dir.path().join("non_existent.yaml");

    let config = Config::from_file(&config_path)?;
    assert!(config_path.exists());
    assert_eq!(config.visualization.port, 5500);
    assert_eq!(config.modbus.serial_port, "/dev/ttyAMA3");
    assert_eq!(config.acquisition.refresh_interval_ms, 30_000);

    Ok(())
}

#[test]
fn test_minimal_file_uses_defaults() -> Result<()> {
    setup();
    let temp_dir = tempdir()?;
    let config_path = temp_dir.path().join("config.yaml");
    fs::write(&config_path, "modbus:\n  transport: mock\n")?;

    let config = Config::from_file(&config_path)?;
    assert_eq!(config.modbus.transport, TransportKind::Mock);
    assert_eq!(config.modbus.baud_rate, 9600);
    assert_eq!(config.acquisition.history_size, 15);

    Ok(())
}

#[test]
fn test_schema_error_creates_sample_file() -> Result<()> {
    setup();
    let temp_dir = tempdir()?;
    let config_path = temp_dir.path().join("config.yaml");

    let invalid_yaml = r#"
visualization:
  port: "not-an-integer"
modbus:
  parity: sometimes
"#;
    fs::write(&config_path, invalid_yaml)?;

    let result = Config::from_file(&config_path);
    assert!(result.is_err(), "Config loading should have failed");

    let sample_path = config_path.with_extension("sample.yaml");
    assert!(
        Path::new(&sample_path).exists(),
        "Sample config file was not created"
    );

    let sample_config = Config::from_file(&sample_path)?;
    assert_eq!(sample_config.visualization.port, 5500);

    Ok(())
}

#[test]
fn test_specific_rule_violation_is_rejected() -> Result<()> {
    setup();
    let temp_dir = tempdir()?;
    let config_path = temp_dir.path().join("config.yaml");

    // Valid for the schema, but the poll would outlive the refresh period
    let yaml = r#"
modbus:
  timeout_ms: 60000
acquisition:
  refresh_interval_ms: 30000
"#;
    fs::write(&config_path, yaml)?;

    let result = Config::from_file(&config_path);
    assert!(result.is_err());
    assert!(config_path.with_extension("sample.yaml").exists());

    Ok(())
}

#[test]
fn test_unknown_section_is_rejected() -> Result<()> {
    setup();
    let yaml = "photoacoustic:\n  frequency: 2000\n";
    assert!(Config::validate_yaml(yaml).is_err());
    Ok(())
}
