// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-air-quality project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Register reader
//!
//! Polls the eight sensor registers in a single sequential pass and scales
//! them into engineering units.

use log::{debug, warn};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Mutex;
use tokio::time::{timeout_at, Instant};

use super::transport::{RegisterTransport, TransportError};
use super::{Parameter, Reading};

/// Failure of a complete poll.
#[derive(Error, Debug)]
pub enum ReadError {
    #[error("Failed to read {parameter} (register {address}): {source}")]
    Transport {
        parameter: Parameter,
        address: u16,
        #[source]
        source: TransportError,
    },

    /// Raised by [`RegisterReader::read_all_within`], never by
    /// [`RegisterReader::read_all`] itself.
    #[error("Poll did not complete within {0:?}")]
    Timeout(Duration),

    #[error("Poll task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Reader owning the connection to the sensor.
///
/// The transport sits behind an async mutex held for a whole pass, so two
/// polls never interleave their transactions on the bus.
pub struct RegisterReader {
    transport: Arc<Mutex<Box<dyn RegisterTransport>>>,
}

impl RegisterReader {
    pub fn new(transport: Box<dyn RegisterTransport>) -> Self {
        Self {
            transport: Arc::new(Mutex::new(transport)),
        }
    }

    /// Read every parameter once, in [`Parameter::ALL`] order.
    ///
    /// A register answering without a value yields a reading with no value.
    /// Any transport failure aborts the pass: either all eight readings are
    /// returned or none.
    pub async fn read_all(&self) -> Result<Vec<Reading>, ReadError> {
        let mut transport = self.transport.lock().await;
        read_pass(&mut **transport).await
    }

    /// Read every parameter once, giving up waiting after `limit`.
    ///
    /// Waiting for the bus counts against `limit`. Once the bus is acquired
    /// the pass runs on its own task and keeps the bus until its last
    /// transaction completes, even when the caller has already returned
    /// [`ReadError::Timeout`]. A late response is therefore consumed by the
    /// pass that requested it and never seen by the next one.
    pub async fn read_all_within(&self, limit: Duration) -> Result<Vec<Reading>, ReadError> {
        let deadline = Instant::now() + limit;

        let mut transport = timeout_at(deadline, self.transport.clone().lock_owned())
            .await
            .map_err(|_| ReadError::Timeout(limit))?;
        let pass = tokio::spawn(async move { read_pass(&mut **transport).await });

        match timeout_at(deadline, pass).await {
            Ok(result) => result?,
            Err(_) => {
                warn!("Poll exceeded {:?}, letting the pass finish in the background", limit);
                Err(ReadError::Timeout(limit))
            }
        }
    }

    /// Close the connection to the sensor.
    pub async fn disconnect(&self) -> Result<(), TransportError> {
        self.transport.lock().await.disconnect().await
    }
}

/// One sequential pass over the register map.
async fn read_pass(transport: &mut dyn RegisterTransport) -> Result<Vec<Reading>, ReadError> {
    let mut readings = Vec::with_capacity(Parameter::ALL.len());

    for parameter in Parameter::ALL {
        let address = parameter.address();
        let raw = transport
            .read_holding_register(address)
            .await
            .map_err(|source| {
                warn!("Read of {} at register {} failed: {}", parameter, address, source);
                ReadError::Transport {
                    parameter,
                    address,
                    source,
                }
            })?;

        let reading = Reading::from_raw(parameter, raw);
        debug!("{} raw={:?} value={:?}", parameter, raw, reading.value);
        readings.push(reading);
    }

    Ok(readings)
}
