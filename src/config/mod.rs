// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-air-quality project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Configuration management for the air quality application
//!
//! The configuration is backed by a YAML file and validated against an
//! embedded JSON schema before it is deserialized.
//!
//! ## Configuration Structure
//!
//! - `visualization`: web server settings
//! - `modbus`: how to reach the sensor (RTU, TCP or mock)
//! - `acquisition`: background dashboard refresh timing
//! - `aqi`: AQI estimation settings
//! - `simulator`: built-in Modbus TCP sensor simulator
//!
//! ## Usage
//!
//! ```no_run
//! use rust_air_quality::config::{Config, TransportKind};
//!
//! // Load config from file, creates a default if not found
//! let mut config = Config::from_file("config.yaml").unwrap();
//!
//! // Apply command line overrides if needed
//! config.apply_args(
//!     Some(8081),                    // Web port
//!     Some("0.0.0.0".to_string()),   // Web address
//!     Some(TransportKind::Tcp),      // Transport
//!     None,                          // Serial port
//!     None,                          // Baud rate
//!     Some(2),                       // Slave id
//!     Some(true),                    // Enable simulator
//! );
//!
//! println!("Server port: {}", config.visualization.port);
//! ```

pub mod acquisition;
pub mod aqi;
pub mod modbus;
pub mod simulator;
pub mod utils;
pub mod visualization;

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use log::{debug, error};
use serde::{Deserialize, Serialize};

pub use acquisition::AcquisitionConfig;
pub use aqi::AqiConfig;
pub use modbus::{ModbusConfig, SerialParity, TransportKind};
pub use simulator::SimulatorConfig;
pub use utils::{is_valid_ip_address, output_config_schema, validate_specific_rules};
pub use visualization::VisualizationConfig;

/// Embedded JSON schema (draft 2020-12) of the YAML configuration.
pub const CONFIG_SCHEMA: &str = include_str!("../../resources/config.schema.json");

/// Root configuration structure.
///
/// Every section falls back to its defaults when absent from the file, so an
/// empty YAML document is a valid configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Settings for the web server.
    #[serde(default)]
    pub visualization: VisualizationConfig,

    /// Settings for the link to the sensor.
    #[serde(default)]
    pub modbus: ModbusConfig,

    /// Timing of the background dashboard refresh.
    #[serde(default)]
    pub acquisition: AcquisitionConfig,

    #[serde(default)]
    pub aqi: AqiConfig,

    /// Built-in sensor simulator.
    #[serde(default)]
    pub simulator: SimulatorConfig,
}

impl Config {
    /// Helper method to create a sample config file when validation fails
    fn create_sample_config<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        let sample_path = path.with_extension("sample.yaml");
        debug!("Original path: {:?}, Sample path: {:?}", path, sample_path);

        if let Some(parent) = sample_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                debug!("Creating parent directory: {:?}", parent);
                fs::create_dir_all(parent).with_context(|| {
                    format!(
                        "Failed to create parent directory for sample config at {:?}",
                        parent
                    )
                })?;
            }
        }

        Self::default()
            .save_to_file(&sample_path)
            .with_context(|| format!("Failed to save sample config to {:?}", sample_path))?;

        error!(
            "Sample configuration file created at {:?}\nPlease edit and rename it",
            sample_path
        );
        Ok(())
    }

    /// Validate YAML text against the embedded schema.
    pub fn validate_yaml(contents: &str) -> Result<()> {
        if contents.trim().is_empty() {
            return Ok(());
        }

        // Validation works on JSON values
        let yaml_value: serde_yml::Value =
            serde_yml::from_str(contents).context("Failed to parse YAML configuration")?;
        let json_value = serde_json::to_value(&yaml_value)
            .context("Failed to convert YAML to JSON for validation")?;

        let schema: serde_json::Value =
            serde_json::from_str(CONFIG_SCHEMA).context("Failed to parse JSON schema")?;
        let validator = jsonschema::draft202012::options()
            .should_validate_formats(true)
            .build(&schema)?;

        if let Err(error) = validator.validate(&json_value) {
            anyhow::bail!("Configuration validation failed: {}", error);
        }
        Ok(())
    }

    /// Load configuration from a file.
    ///
    /// A missing file is created with the default configuration. When the file
    /// does not pass validation, a `.sample.yaml` file with the defaults is
    /// written next to it and an error is returned.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            debug!(
                "Configuration file not found at {:?}, creating default",
                path
            );
            let default_config = Self::default();
            default_config.save_to_file(path)?;
            return Ok(default_config);
        }

        debug!("Loading configuration from {:?}", path);
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file at {:?}", path))?;

        debug!("Validating {} configuration against schema", path.display());
        if let Err(err) = Self::validate_yaml(&contents) {
            error!("Configuration validation error before deserialization");
            Self::create_sample_config(path)?;
            return Err(err.context(format!("Invalid configuration in {}", path.display())));
        }

        // An empty document deserializes to null; treat it as all defaults
        let config: Config = if contents.trim().is_empty() {
            Self::default()
        } else {
            match serde_yml::from_str(&contents) {
                Ok(config) => config,
                Err(err) => {
                    error!("Configuration deserialization error: {}", err);
                    if let Err(e) = Self::create_sample_config(path) {
                        error!("Failed to create sample config: {}", e);
                    }
                    return Err(anyhow::anyhow!(
                        "Failed to deserialize configuration from {}: {}",
                        path.display(),
                        err
                    ));
                }
            }
        };

        if let Err(err) = validate_specific_rules(&config) {
            error!("Configuration specific validation error: {}", err);
            Self::create_sample_config(path)?;
            return Err(err);
        }

        Ok(config)
    }

    /// Save the configuration to a file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let yaml =
            serde_yml::to_string(self).context("Failed to serialize configuration to YAML")?;

        let mut file = File::create(path.as_ref())
            .with_context(|| format!("Failed to create config file at {:?}", path.as_ref()))?;

        file.write_all(yaml.as_bytes())
            .with_context(|| format!("Failed to write configuration to {:?}", path.as_ref()))?;

        Ok(())
    }

    /// Apply command line arguments to override configuration values.
    ///
    /// Only the arguments actually provided override the loaded values.
    ///
    /// # Parameters
    ///
    /// * `web_port` - TCP port for the web server
    /// * `web_address` - Network address for the web server to bind to
    /// * `transport` - Link used to reach the sensor
    /// * `serial_port` - Serial device for the RTU transport
    /// * `baud_rate` - Serial speed for the RTU transport
    /// * `slave_id` - Modbus unit identifier of the sensor
    /// * `simulator_enabled` - Start the built-in Modbus TCP simulator
    pub fn apply_args(
        &mut self,
        web_port: Option<u16>,
        web_address: Option<String>,
        transport: Option<TransportKind>,
        serial_port: Option<String>,
        baud_rate: Option<u32>,
        slave_id: Option<u8>,
        simulator_enabled: Option<bool>,
    ) {
        if let Some(web_port) = web_port {
            debug!("Overriding port from command line: {}", web_port);
            self.visualization.port = web_port;
        }

        if let Some(web_address) = web_address {
            debug!("Overriding address from command line: {}", web_address);
            self.visualization.address = web_address;
        }

        if let Some(transport) = transport {
            debug!("Overriding transport from command line: {}", transport);
            self.modbus.transport = transport;
        }
        if let Some(serial_port) = serial_port {
            debug!("Overriding serial port from command line: {}", serial_port);
            self.modbus.serial_port = serial_port;
        }
        if let Some(baud_rate) = baud_rate {
            debug!("Overriding baud rate from command line: {}", baud_rate);
            self.modbus.baud_rate = baud_rate;
        }
        if let Some(slave_id) = slave_id {
            debug!("Overriding slave id from command line: {}", slave_id);
            self.modbus.slave_id = slave_id;
        }

        if let Some(enabled) = simulator_enabled {
            debug!("Overriding simulator enabled from command line: {}", enabled);
            self.simulator.enabled = enabled;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_reference_installation() {
        let config = Config::default();
        assert_eq!(config.modbus.transport, TransportKind::Rtu);
        assert_eq!(config.modbus.serial_port, "/dev/ttyAMA3");
        assert_eq!(config.modbus.baud_rate, 9600);
        assert_eq!(config.modbus.slave_id, 1);
        assert_eq!(config.modbus.parity, SerialParity::None);
        assert_eq!(config.visualization.port, 5500);
        assert_eq!(config.acquisition.history_size, 15);
        assert!(!config.simulator.enabled);
    }

    #[test]
    fn default_config_passes_the_schema() {
        let yaml = serde_yml::to_string(&Config::default()).unwrap();
        Config::validate_yaml(&yaml).unwrap();
    }

    #[test]
    fn schema_rejects_unknown_transport() {
        let yaml = "modbus:\n  transport: carrier-pigeon\n";
        assert!(Config::validate_yaml(yaml).is_err());
    }

    #[test]
    fn partial_sections_fall_back_to_defaults() {
        let yaml = "modbus:\n  transport: tcp\n  tcp_address: 10.0.0.7\naqi:\n  out_of_range: clamp\n";
        Config::validate_yaml(yaml).unwrap();
        let config: Config = serde_yml::from_str(yaml).unwrap();
        assert_eq!(config.modbus.transport, TransportKind::Tcp);
        assert_eq!(config.modbus.tcp_address, "10.0.0.7");
        assert_eq!(config.modbus.tcp_port, 502);
        assert_eq!(
            config.aqi.out_of_range,
            crate::aqi::OutOfRangePolicy::Clamp
        );
    }

    #[test]
    fn apply_args_only_overrides_given_values() {
        let mut config = Config::default();
        config.apply_args(
            Some(8081),
            None,
            Some(TransportKind::Mock),
            None,
            Some(19200),
            None,
            Some(true),
        );
        assert_eq!(config.visualization.port, 8081);
        assert_eq!(config.visualization.address, "127.0.0.1");
        assert_eq!(config.modbus.transport, TransportKind::Mock);
        assert_eq!(config.modbus.baud_rate, 19200);
        assert_eq!(config.modbus.slave_id, 1);
        assert!(config.simulator.enabled);
    }
}
