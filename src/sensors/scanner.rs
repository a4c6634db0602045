//! Round-robin debounced sensor scanner.
//!
//! Each call to [`SensorScanner::check_next`] samples exactly one sensor,
//! runs it through the jitter-count filter, emits at most one change event,
//! and parks the cursor on the next record.  Correctness does not depend on
//! the call rate; only the debounce latency does:
//!
//! ```text
//!  latency ≈ (threshold + 1) × sensors / scan rate
//! ```
//!
//! The auxiliary bus, if fitted, gets its turn from [`SensorScanner::check_all`]
//! before the line-level sensor is sampled.

use log::{debug, info, warn};

use super::registry::{Iter, SensorRecord, SensorRegistry, Upsert};
use crate::app::events::SensorEvent;
use crate::app::ports::{AuxSensorBus, PinPort, SensorEventSink, Vpin};
use crate::config::MAX_DEBOUNCE_THRESHOLD;
use crate::error::RegistryError;

pub struct SensorScanner<const N: usize> {
    registry: SensorRegistry<N>,
    threshold: u8,
}

impl<const N: usize> Default for SensorScanner<N> {
    fn default() -> Self {
        Self::new(MAX_DEBOUNCE_THRESHOLD)
    }
}

impl<const N: usize> SensorScanner<N> {
    pub fn new(threshold: u8) -> Self {
        Self {
            registry: SensorRegistry::new(),
            threshold: threshold.min(MAX_DEBOUNCE_THRESHOLD),
        }
    }

    pub fn threshold(&self) -> u8 {
        self.threshold
    }

    pub fn registry(&self) -> &SensorRegistry<N> {
        &self.registry
    }

    // ── Configuration intake ──────────────────────────────────

    /// Create or update sensor `id` and configure its line as an input.
    pub fn create<P: PinPort>(
        &mut self,
        pins: &mut P,
        id: u16,
        pin: Vpin,
        pull_up: bool,
    ) -> Result<Upsert, RegistryError> {
        let outcome = self.registry.upsert(id, pin, pull_up)?;
        if !pins.configure_input(pin, pull_up) {
            warn!("Sensor {}: pin {} rejected input config (pull_up={})", id, pin, pull_up);
        }
        match outcome {
            Upsert::Created(_) => info!("Sensor {}: created on pin {}", id, pin),
            Upsert::Updated(_) => info!("Sensor {}: updated to pin {}", id, pin),
        }
        Ok(outcome)
    }

    pub fn remove(&mut self, id: u16) -> Result<(), RegistryError> {
        self.registry.remove(id)?;
        info!("Sensor {}: removed", id);
        Ok(())
    }

    pub fn get(&self, id: u16) -> Option<&SensorRecord> {
        self.registry.lookup(id)
    }

    /// Every record in creation order.
    pub fn iter(&self) -> Iter<'_, N> {
        self.registry.iter()
    }

    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    // ── Scanning ──────────────────────────────────────────────

    /// Sample one sensor and advance the cursor.  Returns the committed
    /// change, if any; it has already been sent to `sink`.
    pub fn check_next<P, S>(&mut self, pins: &mut P, sink: Option<&mut S>) -> Option<SensorEvent>
    where
        P: PinPort,
        S: SensorEventSink + ?Sized,
    {
        let handle = self.registry.advance_cursor()?;
        let threshold = self.threshold;
        let record = self.registry.get_mut(handle)?;

        let level = pins.read_pin(record.pin);
        let edge = record.sample(level, threshold)?;
        let event = SensorEvent::new(edge, record.id);
        debug!("Sensor {}: {:?}", record.id, edge);

        if let Some(sink) = sink {
            sink.emit(&event);
        }
        Some(event)
    }

    /// Give the auxiliary bus its turn, then sample one sensor.
    pub fn check_all<P, A, S>(
        &mut self,
        pins: &mut P,
        aux: &mut A,
        mut sink: Option<&mut S>,
    ) -> Option<SensorEvent>
    where
        P: PinPort,
        A: AuxSensorBus,
        S: SensorEventSink + ?Sized,
    {
        aux.poll();
        aux.report_changes(sink.as_deref_mut());
        self.check_next(pins, sink)
    }

    /// Emit the current state of every sensor, auxiliary bus first.
    pub fn report_all<A, S>(&self, aux: &mut A, sink: &mut S)
    where
        A: AuxSensorBus,
        S: SensorEventSink + ?Sized,
    {
        aux.report_status(Some(&mut *sink));
        for record in self.registry.iter() {
            sink.emit(&SensorEvent::state(record.id, record.is_active()));
        }
    }
}
