//! Log-based event sink adapter.
//!
//! Implements [`SensorEventSink`] by writing each sensor event to the
//! logger.  Handy when no command stream is attached but changes should
//! still show up on the console.

use log::info;

use crate::app::events::SensorEvent;
use crate::app::ports::SensorEventSink;

/// Adapter that logs every [`SensorEvent`].
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl SensorEventSink for LogEventSink {
    fn emit(&mut self, event: &SensorEvent) {
        info!(
            "SENSOR | id={} | {} | {}",
            event.id,
            if event.is_active() { "ACTIVE" } else { "inactive" },
            event
        );
    }
}
