//! Sensor definition persistence.
//!
//! The registry is stored as one postcard blob: a varint count followed by
//! that many `(id, pin, pull_up)` records in creation order.  Debounced
//! state is not persisted; every sensor restarts inactive.
//!
//! When to load and store is the caller's decision.

use heapless::Vec;
use log::info;
use serde::{Deserialize, Serialize};

use super::scanner::SensorScanner;
use crate::app::ports::{PinPort, StoragePort, Vpin};
use crate::error::{Error, StorageError};

pub const SENSOR_NAMESPACE: &str = "sensors";
pub const SENSOR_KEY: &str = "defs";

/// Encoded size bound per record: two varint u16 plus a bool.
const MAX_RECORD_BYTES: usize = 7;

/// The persisted part of a sensor record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensorDef {
    pub id: u16,
    pub pin: Vpin,
    pub pull_up: bool,
}

/// Write every definition to storage.  Returns the number stored.
pub fn store<const N: usize>(
    scanner: &SensorScanner<N>,
    storage: &mut impl StoragePort,
) -> Result<usize, StorageError> {
    let mut defs: Vec<SensorDef, N> = Vec::new();
    for record in scanner.iter() {
        defs.push(SensorDef {
            id: record.id,
            pin: record.pin,
            pull_up: record.pull_up,
        })
        .map_err(|_| StorageError::Full)?;
    }
    let bytes = postcard::to_allocvec(&defs).map_err(|_| StorageError::Io)?;
    storage.write(SENSOR_NAMESPACE, SENSOR_KEY, &bytes)?;
    info!("Sensors: stored {} definitions ({} bytes)", defs.len(), bytes.len());
    Ok(defs.len())
}

/// Recreate every stored definition.  A missing blob loads nothing.
pub fn load<const N: usize, P: PinPort>(
    scanner: &mut SensorScanner<N>,
    pins: &mut P,
    storage: &impl StoragePort,
) -> Result<usize, Error> {
    if !storage.exists(SENSOR_NAMESPACE, SENSOR_KEY) {
        info!("Sensors: no stored definitions");
        return Ok(0);
    }

    let mut buf = vec![0u8; 5 + N * MAX_RECORD_BYTES];
    let len = storage.read(SENSOR_NAMESPACE, SENSOR_KEY, &mut buf)?;
    let defs: Vec<SensorDef, N> =
        postcard::from_bytes(&buf[..len]).map_err(|_| StorageError::Corrupted)?;

    for def in &defs {
        scanner.create(pins, def.id, def.pin, def.pull_up)?;
    }
    info!("Sensors: loaded {} definitions", defs.len());
    Ok(defs.len())
}
