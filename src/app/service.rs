//! Poll context, the core that drives every tick.
//!
//! [`PollContext`] owns the expanders, the sensor scanner and the optional
//! auxiliary bus.  It is hardware-agnostic: the bus, the pin port and the
//! change sink are injected at call sites, so the whole loop runs against
//! the simulated adapters in tests.
//!
//! ```text
//!   BusPort ──▶ ┌──────────────────────────┐ ──▶ SensorEventSink
//!               │        PollContext        │
//!   PinPort ──▶ │ Expanders · Scanner · Aux │
//!               └──────────────────────────┘
//! ```
//!
//! One call to [`PollContext::tick`] does a bounded amount of work: every
//! expander gets one poll, the auxiliary bus gets one step, and exactly one
//! sensor is sampled.

use heapless::Vec;
use log::{info, warn};

use crate::adapters::expander_pins::ExpanderPins;
use crate::config::PollConfig;
use crate::drivers::IoDevice;
use crate::drivers::pcf8574::{PCF8574_CLOCK_HZ, Pcf8574};
use crate::error::{ConfigError, Error, RegistryError, Result, StorageError};
use crate::sensors::persist;
use crate::sensors::registry::{Iter, SensorRecord, Upsert};
use crate::sensors::scanner::SensorScanner;

use super::events::SensorEvent;
use super::ports::{AuxSensorBus, BusPort, NoAuxBus, PinPort, SensorEventSink, StoragePort, Vpin};

/// Expander slots per context.
pub const MAX_EXPANDERS: usize = 8;

pub struct PollContext<const N: usize, A: AuxSensorBus = NoAuxBus> {
    config: PollConfig,
    expanders: Vec<Pcf8574, MAX_EXPANDERS>,
    scanner: SensorScanner<N>,
    aux: A,
    tick_count: u64,
}

impl<const N: usize> PollContext<N, NoAuxBus> {
    /// Context without an auxiliary bus.
    pub fn with_config(config: PollConfig) -> Result<Self> {
        Self::new(config, NoAuxBus)
    }
}

impl<const N: usize, A: AuxSensorBus> PollContext<N, A> {
    /// Build a context.  The configuration is validated first, the same
    /// way [`PollConfig::from_json`] does.
    pub fn new(config: PollConfig, aux: A) -> Result<Self> {
        if let Err(e) = config.validate() {
            warn!("PollContext: invalid config: {}", e);
            return Err(e.into());
        }
        let scanner = SensorScanner::new(config.debounce_threshold);
        info!(
            "PollContext: {} sensor slots, debounce threshold {}",
            N,
            scanner.threshold()
        );
        Ok(Self {
            config,
            expanders: Vec::new(),
            scanner,
            aux,
            tick_count: 0,
        })
    }

    pub fn config(&self) -> &PollConfig {
        &self.config
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn aux(&self) -> &A {
        &self.aux
    }

    pub fn aux_mut(&mut self) -> &mut A {
        &mut self.aux
    }

    // ── Expander intake ───────────────────────────────────────

    /// Register a PCF8574 at `address` owning `pin_count` pins from
    /// `first_vpin`.  Returns the new device's index.
    pub fn add_expander<B: BusPort>(
        &mut self,
        bus: &mut B,
        first_vpin: Vpin,
        pin_count: u8,
        address: u8,
    ) -> Result<usize> {
        let last = u32::from(first_vpin) + u32::from(pin_count);
        let overlaps = self.expanders.iter().any(|d| {
            let start = u32::from(d.first_vpin());
            let end = start + u32::from(d.pin_count());
            u32::from(first_vpin) < end && start < last
        });
        if overlaps {
            return Err(ConfigError::Invalid("vpin range overlaps an expander").into());
        }
        if self.expanders.is_full() {
            return Err(RegistryError::Full.into());
        }

        let device = Pcf8574::new(first_vpin, pin_count, address, self.config.expander_tick_us, bus);
        bus.set_clock(self.config.bus_clock_hz.min(PCF8574_CLOCK_HZ));
        device.display();
        self.expanders
            .push(device)
            .map_err(|_| Error::Registry(RegistryError::Full))?;
        Ok(self.expanders.len() - 1)
    }

    pub fn expanders(&self) -> &[Pcf8574] {
        &self.expanders
    }

    pub fn expanders_mut(&mut self) -> &mut [Pcf8574] {
        &mut self.expanders
    }

    // ── Sensor intake ─────────────────────────────────────────

    /// Create or update sensor `id`, configuring its line through `pins`.
    pub fn create_sensor<P: PinPort>(
        &mut self,
        pins: &mut P,
        id: u16,
        pin: Vpin,
        pull_up: bool,
    ) -> Result<Upsert> {
        Ok(self.scanner.create(pins, id, pin, pull_up)?)
    }

    /// Create or update sensor `id` on an expander line.
    pub fn create_expander_sensor<B: BusPort>(
        &mut self,
        bus: &mut B,
        id: u16,
        pin: Vpin,
        pull_up: bool,
    ) -> Result<Upsert> {
        let mut pins = ExpanderPins::new(&mut self.expanders, bus);
        Ok(self.scanner.create(&mut pins, id, pin, pull_up)?)
    }

    pub fn remove_sensor(&mut self, id: u16) -> Result<()> {
        Ok(self.scanner.remove(id)?)
    }

    pub fn get_sensor(&self, id: u16) -> Option<&SensorRecord> {
        self.scanner.get(id)
    }

    /// Every sensor in creation order.
    pub fn sensors(&self) -> Iter<'_, N> {
        self.scanner.iter()
    }

    pub fn scanner(&self) -> &SensorScanner<N> {
        &self.scanner
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one cycle with sensors read through `pins`.
    pub fn tick<B, P, S>(
        &mut self,
        now_us: u64,
        bus: &mut B,
        pins: &mut P,
        sink: Option<&mut S>,
    ) -> Option<SensorEvent>
    where
        B: BusPort,
        P: PinPort,
        S: SensorEventSink + ?Sized,
    {
        self.tick_count += 1;
        for device in self.expanders.iter_mut() {
            device.poll(bus, now_us);
        }
        self.scanner.check_all(pins, &mut self.aux, sink)
    }

    /// Run one cycle with sensors read from the context's own expanders.
    pub fn tick_expanders<B, S>(
        &mut self,
        now_us: u64,
        bus: &mut B,
        sink: Option<&mut S>,
    ) -> Option<SensorEvent>
    where
        B: BusPort,
        S: SensorEventSink + ?Sized,
    {
        self.tick_count += 1;
        for device in self.expanders.iter_mut() {
            device.poll(bus, now_us);
        }
        let mut pins = ExpanderPins::new(&mut self.expanders, bus);
        self.scanner.check_all(&mut pins, &mut self.aux, sink)
    }

    /// Emit the current state of every input, auxiliary bus first.
    pub fn report_all<S: SensorEventSink + ?Sized>(&mut self, sink: &mut S) {
        self.scanner.report_all(&mut self.aux, sink);
    }

    // ── Persistence ───────────────────────────────────────────

    pub fn store_sensors(&self, storage: &mut impl StoragePort) -> core::result::Result<usize, StorageError> {
        persist::store(&self.scanner, storage)
    }

    /// Recreate stored sensors on expander lines.
    pub fn load_sensors<B: BusPort>(
        &mut self,
        bus: &mut B,
        storage: &impl StoragePort,
    ) -> Result<usize> {
        let mut pins = ExpanderPins::new(&mut self.expanders, bus);
        persist::load(&mut self.scanner, &mut pins, storage)
    }
}
