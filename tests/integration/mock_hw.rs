//! Mock adapters for integration tests.
//!
//! Records every pin access and every emitted event so tests can assert on
//! the full history without a bus.

use std::collections::HashMap;

use iopoll::app::events::SensorEvent;
use iopoll::app::ports::{AuxSensorBus, PinPort, SensorEventSink, Vpin};

// ── MockPins ──────────────────────────────────────────────────

/// Lines read high unless held low.  Configuration can be made to fail.
#[derive(Default)]
pub struct MockPins {
    low: HashMap<Vpin, bool>,
    pub reads: Vec<Vpin>,
    pub configured: Vec<(Vpin, bool)>,
    pub reject_config: bool,
}

#[allow(dead_code)]
impl MockPins {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pins whose hardware refuses every input configuration.
    pub fn rejecting() -> Self {
        Self {
            reject_config: true,
            ..Self::default()
        }
    }

    pub fn hold_low(&mut self, pin: Vpin, low: bool) {
        self.low.insert(pin, low);
    }
}

impl PinPort for MockPins {
    fn read_pin(&mut self, pin: Vpin) -> bool {
        self.reads.push(pin);
        !self.low.get(&pin).copied().unwrap_or(false)
    }

    fn configure_input(&mut self, pin: Vpin, pull_up: bool) -> bool {
        self.configured.push((pin, pull_up));
        !self.reject_config
    }
}

// ── EventLog ──────────────────────────────────────────────────

#[derive(Default)]
pub struct EventLog {
    pub events: Vec<SensorEvent>,
}

#[allow(dead_code)]
impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count_for(&self, id: u16) -> usize {
        self.events.iter().filter(|e| e.id == id).count()
    }
}

impl SensorEventSink for EventLog {
    fn emit(&mut self, event: &SensorEvent) {
        self.events.push(*event);
    }
}

// ── MockAux ───────────────────────────────────────────────────

/// Auxiliary bus that reports one pending change per poll.
#[derive(Default)]
pub struct MockAux {
    pub polls: usize,
    pub pending: Vec<SensorEvent>,
    pub status: Vec<SensorEvent>,
}

impl AuxSensorBus for MockAux {
    fn poll(&mut self) {
        self.polls += 1;
    }

    fn report_changes<S: SensorEventSink + ?Sized>(&mut self, sink: Option<&mut S>) {
        if let Some(sink) = sink {
            for event in self.pending.drain(..) {
                sink.emit(&event);
            }
        }
    }

    fn report_status<S: SensorEventSink + ?Sized>(&mut self, sink: Option<&mut S>) {
        if let Some(sink) = sink {
            for event in &self.status {
                sink.emit(event);
            }
        }
    }
}
