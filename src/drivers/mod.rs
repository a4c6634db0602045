//! Device drivers and the bus request descriptor they share.

pub mod pcf8574;
pub mod request;

use crate::app::ports::{BusPort, Vpin};
use crate::error::ConfigError;

/// Requested pin mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinConfig {
    Input { pull_up: bool },
    Output,
}

/// A device that owns a contiguous range of logical pins.
///
/// Every method is non-blocking with respect to the scheduler tick; bus
/// access goes through the injected [`BusPort`].
pub trait IoDevice {
    /// First logical pin owned by this device.
    fn first_vpin(&self) -> Vpin;

    /// Number of logical pins owned.
    fn pin_count(&self) -> u8;

    /// Whether `vpin` falls inside this device's range.
    fn owns(&self, vpin: Vpin) -> bool {
        vpin >= self.first_vpin() && vpin - self.first_vpin() < u16::from(self.pin_count())
    }

    /// Configure one line.  Rejected configurations leave state untouched.
    fn configure(&mut self, vpin: Vpin, config: PinConfig) -> Result<(), ConfigError>;

    /// Drive one line.
    fn write<B: BusPort>(&mut self, bus: &mut B, vpin: Vpin, value: bool);

    /// Sample one line.
    fn read<B: BusPort>(&mut self, bus: &mut B, vpin: Vpin) -> bool;

    /// Background work; call once per scheduler tick.
    fn poll<B: BusPort>(&mut self, bus: &mut B, now_us: u64);

    /// Log a one-line description.
    fn display(&self);
}
