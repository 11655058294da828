// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-air-quality project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Daemon task manager
//!
//! Each service runs as an independent Tokio task. Tasks watch a shared
//! `running` flag and stop once [`Daemon::shutdown`] clears it.

use anyhow::{Context, Result};
use log::{debug, error, info, warn};
use rocket::config::LogLevel;
use std::net::SocketAddr;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio::time;

use crate::config::Config;
use crate::dashboard::{Dashboard, FreshnessStatus};
use crate::modbus::SimulatedAirQualitySensor;
use crate::sensor::{transport, RegisterReader};
use crate::visualization::server::build_rocket;

/// Longest a task sleeps before checking the `running` flag again.
const POLL_SLICE: Duration = Duration::from_millis(250);

/// Interval of the simulator drift updates.
const SIMULATOR_TICK: Duration = Duration::from_secs(1);

const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(60);

/// Coordinates the background services.
///
/// The dashboard is created by [`Daemon::launch`] and shared with the web
/// server and the refresher.
pub struct Daemon {
    tasks: Vec<JoinHandle<Result<()>>>,
    running: Arc<AtomicBool>,
    dashboard: Option<Arc<Dashboard>>,
    simulator: Option<(SimulatedAirQualitySensor, SocketAddr)>,
    web_shutdown: Option<rocket::Shutdown>,
}

impl Default for Daemon {
    fn default() -> Self {
        Self::new()
    }
}

impl Daemon {
    /// Create a daemon with no task and the running flag set.
    pub fn new() -> Self {
        Daemon {
            tasks: Vec::new(),
            running: Arc::new(AtomicBool::new(true)),
            dashboard: None,
            simulator: None,
            web_shutdown: None,
        }
    }

    /// Launch all configured services.
    ///
    /// The simulator starts first so that a `tcp` transport pointed at it can
    /// connect. Connecting the transport is the only step that touches the
    /// sensor; a failure there aborts the launch.
    pub async fn launch(&mut self, config: &Config) -> Result<()> {
        if config.simulator.enabled {
            self.start_simulator(config).await?;
        }

        let transport = transport::connect(&config.modbus)
            .await
            .context("Failed to connect to the air quality sensor")?;
        let reader = Arc::new(RegisterReader::new(transport));
        let dashboard = Arc::new(Dashboard::from_config(reader, config));
        self.dashboard = Some(dashboard.clone());

        if config.visualization.enabled {
            self.start_visualization_server(config, dashboard.clone())
                .await?;
        }

        if config.acquisition.enabled {
            self.start_dashboard_refresher(config, dashboard)?;
        }

        self.start_heartbeat()?;

        Ok(())
    }

    /// Start the built-in Modbus TCP sensor simulator.
    ///
    /// The listener is bound before returning, so bind errors surface here.
    async fn start_simulator(&mut self, config: &Config) -> Result<()> {
        let socket_addr: SocketAddr =
            format!("{}:{}", config.simulator.address, config.simulator.port)
                .parse()
                .context("Invalid simulator socket address")?;
        let listener = TcpListener::bind(socket_addr)
            .await
            .with_context(|| format!("Failed to bind simulator on {}", socket_addr))?;
        let local_addr = listener.local_addr()?;
        info!("Starting sensor simulator on {}", local_addr);

        let sensor = SimulatedAirQualitySensor::new();
        self.simulator = Some((sensor.clone(), local_addr));

        let server_handle = tokio::spawn(sensor.clone().serve(listener));
        let running = self.running.clone();
        let task = tokio::spawn(async move {
            let started = Instant::now();
            while running.load(Ordering::SeqCst) {
                sensor.drift(started.elapsed());
                time::sleep(SIMULATOR_TICK).await;
            }

            info!("Shutting down sensor simulator...");
            server_handle.abort();
            match time::timeout(Duration::from_secs(5), server_handle).await {
                Ok(_) => info!("Sensor simulator shut down successfully"),
                Err(_) => warn!("Sensor simulator shutdown timed out, forcing termination"),
            }
            Ok(())
        });

        self.tasks.push(task);
        Ok(())
    }

    /// Start the Rocket web server.
    async fn start_visualization_server(
        &mut self,
        config: &Config,
        dashboard: Arc<Dashboard>,
    ) -> Result<()> {
        info!(
            "Starting web server on {}:{}",
            config.visualization.address, config.visualization.port
        );

        let figment = rocket::Config::figment()
            .merge(("ident", config.visualization.name.clone()))
            .merge(("address", config.visualization.address.clone()))
            .merge(("port", config.visualization.port))
            .merge(("log_level", LogLevel::Normal))
            .merge(("shutdown.ctrlc", false));

        let ignited = build_rocket(figment, dashboard)
            .ignite()
            .await
            .context("Failed to configure the web server")?;
        self.web_shutdown = Some(ignited.shutdown());

        let task = tokio::spawn(async move {
            ignited.launch().await?;
            Ok(())
        });

        self.tasks.push(task);
        Ok(())
    }

    /// Refresh the dashboard every `refresh_interval`.
    fn start_dashboard_refresher(
        &mut self,
        config: &Config,
        dashboard: Arc<Dashboard>,
    ) -> Result<()> {
        let interval = config.acquisition.refresh_interval();
        info!("Starting dashboard refresher every {:?}", interval);

        let running = self.running.clone();
        let task = tokio::spawn(async move {
            while running.load(Ordering::SeqCst) {
                let snapshot = dashboard.refresh().await;
                match snapshot.status {
                    FreshnessStatus::Live => info!(
                        "AQI {} ({})",
                        snapshot
                            .aqi
                            .value()
                            .map_or_else(|| "undetermined".to_string(), |v| format!("{:.2}", v)),
                        snapshot.health
                    ),
                    FreshnessStatus::Stale => {
                        warn!("Sensor unavailable, serving readings from cache")
                    }
                    FreshnessStatus::NoData => error!("Sensor unavailable, no readings to serve"),
                }
                sleep_while_running(&running, interval).await;
            }
            Ok(())
        });

        self.tasks.push(task);
        Ok(())
    }

    /// Start a heartbeat task that logs system status periodically
    fn start_heartbeat(&mut self) -> Result<()> {
        info!("Starting heartbeat monitor");

        let running = self.running.clone();
        let task = tokio::spawn(async move {
            while running.load(Ordering::SeqCst) {
                debug!("Daemon heartbeat: running");
                sleep_while_running(&running, HEARTBEAT_INTERVAL).await;
            }
            Ok(())
        });

        self.tasks.push(task);
        Ok(())
    }

    /// Dashboard shared with the web server, once launched.
    pub fn dashboard(&self) -> Option<Arc<Dashboard>> {
        self.dashboard.clone()
    }

    /// Running simulator and the address it listens on.
    pub fn simulator(&self) -> Option<&(SimulatedAirQualitySensor, SocketAddr)> {
        self.simulator.as_ref()
    }

    /// Signal all tasks to stop.
    pub fn shutdown(&self) {
        info!("Shutting down daemon tasks");
        self.running.store(false, Ordering::SeqCst);
        if let Some(shutdown) = &self.web_shutdown {
            shutdown.clone().notify();
        }
    }

    /// Wait for all tasks to complete, then close the sensor connection.
    ///
    /// Call [`Daemon::shutdown`] first. Task failures are logged, not
    /// returned.
    pub async fn join(self) -> Result<()> {
        for task in self.tasks {
            match time::timeout(Duration::from_secs(5), task).await {
                Ok(Ok(Ok(()))) => {}
                Ok(Ok(Err(e))) => error!("Task failed: {:#}", e),
                Ok(Err(e)) => error!("Task panicked: {}", e),
                Err(_) => warn!("Task did not complete within timeout period, may be hung"),
            }
        }

        // A pass still waiting on the device holds the bus
        if let Some(dashboard) = self.dashboard {
            match time::timeout(Duration::from_secs(5), dashboard.reader().disconnect()).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => warn!("Failed to close the sensor connection: {}", e),
                Err(_) => warn!("Sensor still busy, dropping the connection without closing it"),
            }
        }
        Ok(())
    }
}

/// Sleep for `duration`, returning early once `running` is cleared.
async fn sleep_while_running(running: &AtomicBool, duration: Duration) {
    let deadline = Instant::now() + duration;
    while running.load(Ordering::SeqCst) {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            break;
        }
        time::sleep(remaining.min(POLL_SLICE)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TransportKind;

    fn mock_config() -> Config {
        let mut config = Config::default();
        config.modbus.transport = TransportKind::Mock;
        config.visualization.enabled = false;
        config.acquisition.refresh_interval_ms = 50;
        config.modbus.timeout_ms = 40;
        config
    }

    #[tokio::test]
    async fn refresher_publishes_snapshots() {
        let mut daemon = Daemon::new();
        daemon.launch(&mock_config()).await.unwrap();
        let dashboard = daemon.dashboard().unwrap();

        time::sleep(Duration::from_millis(120)).await;
        let snapshot = dashboard.latest().await.unwrap();
        assert_eq!(snapshot.status, FreshnessStatus::Live);

        daemon.shutdown();
        daemon.join().await.unwrap();
    }

    #[tokio::test]
    async fn simulator_feeds_the_tcp_transport() {
        let mut config = mock_config();
        config.simulator.enabled = true;
        config.simulator.port = 0;
        // Bind to an ephemeral port, then point the transport at it
        let mut daemon = Daemon::new();
        daemon.start_simulator(&config).await.unwrap();
        let (_, addr) = daemon.simulator().cloned().unwrap();

        config.modbus.transport = TransportKind::Tcp;
        config.modbus.tcp_address = addr.ip().to_string();
        config.modbus.tcp_port = addr.port();
        config.modbus.timeout_ms = 2_000;
        let transport = transport::connect(&config.modbus).await.unwrap();
        let reader = RegisterReader::new(transport);
        let readings = reader.read_all().await.unwrap();
        assert_eq!(readings.len(), 8);
        assert!(readings.iter().all(|r| r.value.is_some()));

        reader.disconnect().await.unwrap();
        daemon.shutdown();
        daemon.join().await.unwrap();
    }

    #[tokio::test]
    async fn sleep_returns_early_on_shutdown() {
        let running = Arc::new(AtomicBool::new(true));
        let flag = running.clone();
        tokio::spawn(async move {
            time::sleep(Duration::from_millis(50)).await;
            flag.store(false, Ordering::SeqCst);
        });

        let started = Instant::now();
        sleep_while_running(&running, Duration::from_secs(30)).await;
        assert!(started.elapsed() < Duration::from_secs(5));
    }
}
