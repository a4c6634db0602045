//! Simulated I2C bus populated with PCF8574-style devices.
//!
//! Used by the host binary and by tests.  Each device is a single port
//! register: the line level seen on a read is the latch ANDed with
//! whatever the outside world is pulling low.
//!
//! - **Latency**: a queued request completes after `latency` extra polls.
//! - **Faults**: a device marked offline NACKs every transaction.
//! - **Log**: every transaction is recorded in issue order.

use std::collections::HashMap;

use crate::app::ports::BusPort;
use crate::drivers::request::{RequestBlock, Transfer};
use crate::error::BusError;

/// One simulated port expander.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimDevice {
    pub online: bool,
    /// Last byte written by the host.
    pub latch: u8,
    /// Lines held low by external circuitry.
    pub pulled_low: u8,
}

impl SimDevice {
    fn port_level(&self) -> u8 {
        self.latch & !self.pulled_low
    }
}

/// A transaction as seen on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transaction {
    Probe { address: u8 },
    Write { address: u8, data: u8 },
    Read { address: u8 },
    WriteRead { address: u8, data: u8 },
}

pub struct SimulatedBus {
    devices: HashMap<u8, SimDevice>,
    /// Polls remaining before the in-flight request at each address completes.
    in_flight: HashMap<u8, u32>,
    latency: u32,
    clock_hz: u32,
    log: Vec<Transaction>,
}

impl Default for SimulatedBus {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedBus {
    /// Bus whose queued requests complete on the next poll.
    pub fn new() -> Self {
        Self::with_latency(0)
    }

    pub fn with_latency(latency: u32) -> Self {
        Self {
            devices: HashMap::new(),
            in_flight: HashMap::new(),
            latency,
            clock_hz: 0,
            log: Vec::new(),
        }
    }

    /// Attach an online device with all lines released externally.
    pub fn add_device(&mut self, address: u8) {
        self.devices.insert(
            address,
            SimDevice {
                online: true,
                latch: 0xFF,
                pulled_low: 0,
            },
        );
    }

    pub fn device(&self, address: u8) -> Option<&SimDevice> {
        self.devices.get(&address)
    }

    /// Take a device off the bus or bring it back.  A device coming back
    /// has lost its latch, as after a power cycle.
    pub fn set_online(&mut self, address: u8, online: bool) {
        if let Some(dev) = self.devices.get_mut(&address) {
            if online && !dev.online {
                dev.latch = 0xFF;
            }
            dev.online = online;
        }
    }

    pub fn set_pulled_low(&mut self, address: u8, mask: u8) {
        if let Some(dev) = self.devices.get_mut(&address) {
            dev.pulled_low = mask;
        }
    }

    pub fn clock_hz(&self) -> u32 {
        self.clock_hz
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.log
    }

    pub fn clear_log(&mut self) {
        self.log.clear();
    }

    fn online_device(&mut self, address: u8) -> Result<&mut SimDevice, BusError> {
        self.devices
            .get_mut(&address)
            .filter(|dev| dev.online)
            .ok_or(BusError::Nack)
    }
}

impl BusPort for SimulatedBus {
    fn set_clock(&mut self, hz: u32) {
        self.clock_hz = hz;
    }

    fn exists(&mut self, address: u8) -> bool {
        self.online_device(address).is_ok()
    }

    fn queue_request(&mut self, request: &mut RequestBlock) {
        let address = request.address();
        self.log.push(match request.transfer() {
            Transfer::Write { len: 0 } => Transaction::Probe { address },
            Transfer::Write { .. } => Transaction::Write {
                address,
                data: request.data()[0],
            },
            Transfer::Read { .. } => Transaction::Read { address },
        });
        self.in_flight.insert(address, self.latency);
        request.mark_pending();
    }

    fn poll_request(&mut self, request: &mut RequestBlock) {
        if !request.is_busy() {
            return;
        }
        let address = request.address();
        match self.in_flight.get(&address).copied() {
            Some(remaining) if remaining > 0 => {
                self.in_flight.insert(address, remaining - 1);
                return;
            }
            Some(_) => {
                self.in_flight.remove(&address);
            }
            None => {
                request.complete(Err(BusError::Timeout));
                return;
            }
        }

        let result = match self.online_device(address) {
            Ok(dev) => {
                match request.transfer() {
                    Transfer::Write { len: 0 } => {}
                    Transfer::Write { .. } => dev.latch = request.data()[0],
                    Transfer::Read { .. } => {
                        let level = dev.port_level();
                        request.read_buffer_mut().fill(level);
                    }
                }
                Ok(())
            }
            Err(e) => Err(e),
        };
        request.complete(result);
    }

    fn write(&mut self, address: u8, data: &[u8]) -> Result<(), BusError> {
        self.log.push(Transaction::Write {
            address,
            data: data.first().copied().unwrap_or(0),
        });
        let dev = self.online_device(address)?;
        if let Some(&byte) = data.first() {
            dev.latch = byte;
        }
        Ok(())
    }

    fn write_read(
        &mut self,
        address: u8,
        data: &[u8],
        buffer: &mut [u8],
    ) -> Result<(), BusError> {
        self.log.push(Transaction::WriteRead {
            address,
            data: data.first().copied().unwrap_or(0),
        });
        let dev = self.online_device(address)?;
        if let Some(&byte) = data.first() {
            dev.latch = byte;
        }
        buffer.fill(dev.port_level());
        Ok(())
    }
}
