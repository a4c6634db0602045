//! Sensor subsystem: the registry of digital inputs, the debounced
//! round-robin scanner, and persistence of sensor definitions.
//!
//! A sensor is active when external circuitry pulls its line low.  The
//! scanner samples one sensor per call and reports committed changes as
//! [`SensorEvent`](crate::app::events::SensorEvent)s.

pub mod persist;
pub mod registry;
pub mod scanner;

pub use registry::{SensorHandle, SensorRecord, SensorRegistry, Upsert};
pub use scanner::SensorScanner;
