//! Bus adapter over any blocking `embedded-hal` I2C peripheral.
//!
//! Queued requests are accepted immediately and executed on the owner's
//! next poll, so the caller still sees one tick of latency and never waits
//! inside `queue_request`.  Each executed transfer blocks for one bus
//! transaction, which is the only wait this adapter introduces.

use embedded_hal::i2c::{Error as _, ErrorKind, I2c};
use log::debug;

use crate::app::ports::BusPort;
use crate::drivers::request::{RequestBlock, Transfer};
use crate::error::BusError;

pub struct I2cBus<I> {
    i2c: I,
    clock_hz: u32,
}

impl<I: I2c> I2cBus<I> {
    pub fn new(i2c: I) -> Self {
        Self { i2c, clock_hz: 0 }
    }

    /// Clock most recently requested by a driver.  The peripheral itself is
    /// clocked by the HAL at construction.
    pub fn requested_clock_hz(&self) -> u32 {
        self.clock_hz
    }

    /// Give the peripheral back.
    pub fn release(self) -> I {
        self.i2c
    }
}

fn map_error(kind: ErrorKind) -> BusError {
    match kind {
        ErrorKind::NoAcknowledge(_) => BusError::Nack,
        ErrorKind::ArbitrationLoss | ErrorKind::Bus => BusError::Arbitration,
        ErrorKind::Overrun => BusError::Other(1),
        _ => BusError::Other(0),
    }
}

impl<I: I2c> BusPort for I2cBus<I> {
    fn set_clock(&mut self, hz: u32) {
        debug!("I2cBus: clock {} Hz requested", hz);
        self.clock_hz = hz;
    }

    fn exists(&mut self, address: u8) -> bool {
        self.i2c.write(address, &[]).is_ok()
    }

    fn queue_request(&mut self, request: &mut RequestBlock) {
        request.mark_pending();
    }

    fn poll_request(&mut self, request: &mut RequestBlock) {
        if !request.is_busy() {
            return;
        }
        let address = request.address();
        let result = match request.transfer() {
            Transfer::Write { .. } => self.i2c.write(address, request.data()),
            Transfer::Read { .. } => self.i2c.read(address, request.read_buffer_mut()),
        };
        request.complete(result.map_err(|e| map_error(e.kind())));
    }

    fn write(&mut self, address: u8, data: &[u8]) -> Result<(), BusError> {
        self.i2c
            .write(address, data)
            .map_err(|e| map_error(e.kind()))
    }

    fn write_read(
        &mut self,
        address: u8,
        data: &[u8],
        buffer: &mut [u8],
    ) -> Result<(), BusError> {
        self.i2c
            .write_read(address, data, buffer)
            .map_err(|e| map_error(e.kind()))
    }
}
