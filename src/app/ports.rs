//! Port traits: the boundary between the polling core and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ PollContext (core)
//! ```
//!
//! Driven adapters (bus transport, pin access, change sinks, storage)
//! implement these traits.  The [`PollContext`](super::service::PollContext)
//! and the drivers consume them via generics, so the core never touches
//! hardware directly.
//!
//! ## Timing notes
//!
//! - **BusPort** queued requests MUST return immediately; completion is
//!   observed on a later tick through the request's busy flag.
//! - No port method may block for longer than one bus transaction.

use super::events::SensorEvent;
use crate::drivers::request::RequestBlock;
use crate::error::{BusError, StorageError};

/// Logical pin number.  Each device owns a contiguous range of these.
pub type Vpin = u16;

// ───────────────────────────────────────────────────────────────
// Bus port (driven adapter: core ↔ I2C transaction queue)
// ───────────────────────────────────────────────────────────────

/// The bus transaction queue the expander drivers talk through.
///
/// Each device owns one [`RequestBlock`] and reuses it for every cycle.
/// The transport takes the block by reference when it is queued and again
/// when it is polled, and updates its status in place.
pub trait BusPort {
    /// Set the bus clock.  Transports that cannot retune may ignore this.
    fn set_clock(&mut self, hz: u32);

    /// Check whether a device answers at `address`.
    fn exists(&mut self, address: u8) -> bool;

    /// Queue a request.  Marks it busy and returns without waiting.
    fn queue_request(&mut self, request: &mut RequestBlock);

    /// Give the transport a chance to progress `request`.  Completion is
    /// signalled by the request leaving its busy state.
    fn poll_request(&mut self, request: &mut RequestBlock);

    /// Write `data` to the device.  Returns once the bytes are on the bus.
    fn write(&mut self, address: u8, data: &[u8]) -> Result<(), BusError>;

    /// Write `data`, then read `buffer.len()` bytes back.
    fn write_read(&mut self, address: u8, data: &[u8], buffer: &mut [u8])
    -> Result<(), BusError>;
}

// ───────────────────────────────────────────────────────────────
// Pin port (driven adapter: core ↔ digital line access)
// ───────────────────────────────────────────────────────────────

/// Digital line access used by the sensor scanner.
pub trait PinPort {
    /// Sample the instantaneous electrical level of `pin` (`true` = high).
    fn read_pin(&mut self, pin: Vpin) -> bool;

    /// Configure `pin` as an input.  Returns `false` if the hardware
    /// rejects the requested pull-up setting.
    fn configure_input(&mut self, pin: Vpin, pull_up: bool) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Change sink (driven adapter: core → serial / telemetry)
// ───────────────────────────────────────────────────────────────

/// Receives sensor change and status events.
///
/// The core takes the sink as `Option<&mut S>`; passing `None` runs the
/// scanner in quiet mode where state is still tracked.
pub trait SensorEventSink {
    fn emit(&mut self, event: &SensorEvent);
}

// ───────────────────────────────────────────────────────────────
// Auxiliary sensor bus (block-oriented shift-register bus)
// ───────────────────────────────────────────────────────────────

/// A second, independent sensor bus that shares the change sink and id
/// namespace.  The core only invokes it; it never looks inside.
pub trait AuxSensorBus {
    /// Advance the bus' own state machine by one step.
    fn poll(&mut self);

    /// Report any changes detected since the last call.
    fn report_changes<S: SensorEventSink + ?Sized>(&mut self, sink: Option<&mut S>);

    /// Report the current state of every input on the bus.
    fn report_status<S: SensorEventSink + ?Sized>(&mut self, sink: Option<&mut S>);
}

/// Placeholder for builds without an auxiliary bus.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAuxBus;

impl AuxSensorBus for NoAuxBus {
    fn poll(&mut self) {}

    fn report_changes<S: SensorEventSink + ?Sized>(&mut self, _sink: Option<&mut S>) {}

    fn report_status<S: SensorEventSink + ?Sized>(&mut self, _sink: Option<&mut S>) {}
}

// ───────────────────────────────────────────────────────────────
// Storage port (driven adapter: core ↔ EEPROM / flash)
// ───────────────────────────────────────────────────────────────

/// Persistent key-value storage for sensor definitions.
///
/// - Keys are namespaced to prevent collisions between subsystems.
/// - Write operations MUST be atomic, with no partial writes on power loss.
pub trait StoragePort {
    /// Read a value.  Returns the number of bytes written to `buf`.
    fn read(&self, namespace: &str, key: &str, buf: &mut [u8]) -> Result<usize, StorageError>;

    /// Write a value atomically.
    fn write(&mut self, namespace: &str, key: &str, data: &[u8]) -> Result<(), StorageError>;

    /// Delete a key.  Returns `Ok(())` even if the key didn't exist.
    fn delete(&mut self, namespace: &str, key: &str) -> Result<(), StorageError>;

    /// Check whether a key exists without reading it.
    fn exists(&self, namespace: &str, key: &str) -> bool;
}
