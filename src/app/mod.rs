//! Application core: polling orchestration, zero direct I/O.
//!
//! This module holds the process-owned [`PollContext`](service::PollContext)
//! that drives every expander and the sensor scanner once per scheduler
//! tick.  All interaction with hardware happens through **port traits**
//! defined in [`ports`], keeping this layer fully testable without real
//! peripherals.

pub mod events;
pub mod ports;
pub mod service;
