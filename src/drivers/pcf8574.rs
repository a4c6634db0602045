//! PCF8574 8-bit quasi-bidirectional I2C port expander.
//!
//! ## Hardware
//!
//! The device has one port register and no direction register.  Writing a
//! 0 drives the line low; writing a 1 releases it to a weak pull-up, after
//! which external circuitry can pull it low and a read returns the real
//! level.  A line can therefore only be an input if its latch bit is 1,
//! and "input without pull-up" is electrically impossible.
//!
//! ## Poll state machine
//!
//! | State      | Meaning                                   | Next                          |
//! |------------|-------------------------------------------|-------------------------------|
//! | `Dormant`  | Presumed unreachable                      | tick → queue probe → `Probing`|
//! | `Probing`  | Zero-length write in flight               | ok → `Normal`, err → `Dormant`|
//! | `Normal`   | Idle, ready to start a read               | tick → queue read → `Scanning`|
//! | `Scanning` | Port read in flight                       | ok → `Normal`, err → `Dormant`|
//!
//! Exactly one request is outstanding per device.  Completion is checked
//! every call; new cycles are admitted at most once per tick interval, so a
//! dead device is re-probed at that pace and never floods the bus.

use log::{debug, info, warn};

use super::request::{RequestBlock, RequestStatus};
use super::{IoDevice, PinConfig};
use crate::app::ports::{BusPort, Vpin};
use crate::error::ConfigError;

/// Physical port width.
pub const PORT_WIDTH: u8 = 8;

/// Rated maximum clock for the part.
pub const PCF8574_CLOCK_HZ: u32 = 100_000;

/// Input value reported while the device cannot be read.
pub const UNREADABLE: u8 = 0xFF;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceState {
    Dormant,
    Probing,
    Normal,
    Scanning,
}

pub struct Pcf8574 {
    first_vpin: Vpin,
    pin_count: u8,
    address: u8,
    /// Last commanded level per line.  A 1 also releases the line for input.
    output_latch: u8,
    /// Last successfully read port value.
    input_sample: u8,
    /// Lines that have been driven with `write` and read back their latch.
    output_lines: u8,
    state: DeviceState,
    request: RequestBlock,
    tick_us: u64,
    last_tick_us: u64,
}

impl Pcf8574 {
    /// Create a device at `address` owning `pin_count` pins from
    /// `first_vpin`.  The count is clamped to the port width and to the
    /// vpins left above `first_vpin`.
    pub fn new<B: BusPort>(
        first_vpin: Vpin,
        pin_count: u8,
        address: u8,
        tick_us: u32,
        bus: &mut B,
    ) -> Self {
        let room = u32::from(Vpin::MAX) - u32::from(first_vpin) + 1;
        let pin_count = u32::from(pin_count.min(PORT_WIDTH)).min(room) as u8;
        bus.set_clock(PCF8574_CLOCK_HZ);

        if bus.exists(address) {
            info!(
                "PCF8574 I2C:x{:x} configured Vpins:{}-{}",
                address,
                first_vpin,
                last_vpin(first_vpin, pin_count)
            );
        }

        Self {
            first_vpin,
            pin_count,
            address,
            output_latch: 0x00,
            input_sample: 0x00,
            output_lines: 0x00,
            state: DeviceState::Dormant,
            request: RequestBlock::probe(address),
            tick_us: u64::from(tick_us),
            last_tick_us: 0,
        }
    }

    pub fn address(&self) -> u8 {
        self.address
    }

    pub fn state(&self) -> DeviceState {
        self.state
    }

    pub fn output_latch(&self) -> u8 {
        self.output_latch
    }

    pub fn input_sample(&self) -> u8 {
        self.input_sample
    }

    fn mask(&self, vpin: Vpin) -> Option<u8> {
        self.owns(vpin).then(|| 1u8 << (vpin - self.first_vpin))
    }

    /// Handle a finished request.  Only called when nothing is in flight.
    fn complete(&mut self, bus: &mut impl BusPort) {
        let status = self.request.status();
        match self.state {
            DeviceState::Scanning => {
                let previous = self.input_sample;
                if status == RequestStatus::Ok {
                    self.input_sample = self.request.data().first().copied().unwrap_or(UNREADABLE);
                    self.state = DeviceState::Normal;
                } else {
                    self.input_sample = UNREADABLE;
                    warn!("PCF8574 I2C:x{:x} Error {:?}", self.address, status);
                    self.state = DeviceState::Dormant;
                }
                if self.input_sample != previous {
                    debug!(
                        "PCF8574 I2C:x{:x} Port Change:x{:x}",
                        self.address, self.input_sample
                    );
                }
            }
            DeviceState::Probing => {
                if status == RequestStatus::Ok {
                    info!("PCF8574 I2C:x{:x} Active", self.address);
                    // The part may have reset while unreachable; restore
                    // the output and pull-up state before scanning.
                    if let Err(e) = bus.write(self.address, &[self.output_latch]) {
                        warn!("PCF8574 I2C:x{:x} latch restore failed: {}", self.address, e);
                    }
                    self.request.set_read_params(self.address, 1);
                    self.state = DeviceState::Normal;
                } else {
                    self.state = DeviceState::Dormant;
                }
            }
            DeviceState::Normal | DeviceState::Dormant => {}
        }
    }

    /// Start a new cycle if the tick interval has elapsed.
    fn admit(&mut self, bus: &mut impl BusPort, now_us: u64) {
        if now_us.wrapping_sub(self.last_tick_us) <= self.tick_us {
            return;
        }
        match self.state {
            DeviceState::Normal => {
                bus.queue_request(&mut self.request);
                self.state = DeviceState::Scanning;
            }
            DeviceState::Dormant => {
                self.request.set_write_params(self.address, &[]);
                bus.queue_request(&mut self.request);
                self.state = DeviceState::Probing;
            }
            DeviceState::Probing | DeviceState::Scanning => {}
        }
        self.last_tick_us = now_us;
    }
}

fn last_vpin(first_vpin: Vpin, pin_count: u8) -> Vpin {
    first_vpin
        .saturating_add(u16::from(pin_count))
        .saturating_sub(1)
}

impl IoDevice for Pcf8574 {
    fn first_vpin(&self) -> Vpin {
        self.first_vpin
    }

    fn pin_count(&self) -> u8 {
        self.pin_count
    }

    /// Only inputs with pull-up are accepted; the part cannot do anything
    /// else.  Outputs need no configuration, they are set up by `write`.
    fn configure(&mut self, vpin: Vpin, config: PinConfig) -> Result<(), ConfigError> {
        let mask = self.mask(vpin).ok_or(ConfigError::PinOutOfRange)?;
        match config {
            PinConfig::Input { pull_up: true } => {
                self.output_lines &= !mask;
                Ok(())
            }
            PinConfig::Input { pull_up: false } | PinConfig::Output => {
                Err(ConfigError::Unsupported)
            }
        }
    }

    fn write<B: BusPort>(&mut self, bus: &mut B, vpin: Vpin, value: bool) {
        let Some(mask) = self.mask(vpin) else {
            warn!("PCF8574 I2C:x{:x} write to foreign Vpin:{}", self.address, vpin);
            return;
        };
        debug!(
            "PCF8574 Write I2C:x{:x} Pin:{} Value:{}",
            self.address, vpin, value as u8
        );
        if value {
            self.output_latch |= mask;
        } else {
            self.output_latch &= !mask;
        }
        self.output_lines |= mask;
        if let Err(e) = bus.write(self.address, &[self.output_latch]) {
            warn!("PCF8574 I2C:x{:x} write failed: {}", self.address, e);
        }
    }

    /// Returns the last scanned level.  A line still driven low is released
    /// and sampled immediately so the first read is meaningful.
    fn read<B: BusPort>(&mut self, bus: &mut B, vpin: Vpin) -> bool {
        let Some(mask) = self.mask(vpin) else {
            return true; // released
        };
        if self.output_lines & mask != 0 {
            return self.output_latch & mask != 0;
        }
        if self.output_latch & mask == 0 {
            self.output_latch |= mask;
            let mut port = [0u8; 1];
            self.input_sample = match bus.write_read(self.address, &[self.output_latch], &mut port) {
                Ok(()) => port[0],
                Err(_) => UNREADABLE,
            };
        }
        self.input_sample & mask != 0
    }

    fn poll<B: BusPort>(&mut self, bus: &mut B, now_us: u64) {
        bus.poll_request(&mut self.request);
        if self.request.is_busy() {
            return;
        }
        self.complete(bus);
        self.admit(bus, now_us);
    }

    fn display(&self) {
        info!(
            "PCF8574 I2C:x{:x} VPins:{}-{} {:?}",
            self.address,
            self.first_vpin,
            last_vpin(self.first_vpin, self.pin_count),
            self.state
        );
    }
}
