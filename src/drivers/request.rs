//! Bus request descriptor.
//!
//! One [`RequestBlock`] is owned by each device and reused for every
//! transaction it issues.  The transport marks it busy when queued and
//! records the completion status in place, so the owner can poll
//! [`RequestBlock::is_busy`] on later ticks instead of waiting.

use crate::error::BusError;

/// Largest transfer a request block can carry.
pub const REQUEST_BUFFER_LEN: usize = 4;

/// Direction and length of the transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transfer {
    /// Write the first `len` bytes of the buffer.  `len == 0` is a probe.
    Write { len: u8 },
    /// Read `len` bytes into the buffer.
    Read { len: u8 },
}

/// Lifecycle of the most recent transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestStatus {
    /// Never queued.
    Idle,
    /// Queued or in flight.
    Pending,
    Ok,
    Failed(BusError),
}

#[derive(Debug, Clone)]
pub struct RequestBlock {
    address: u8,
    transfer: Transfer,
    buffer: [u8; REQUEST_BUFFER_LEN],
    status: RequestStatus,
}

impl RequestBlock {
    /// A zero-length write (probe) to `address`.
    pub fn probe(address: u8) -> Self {
        Self {
            address,
            transfer: Transfer::Write { len: 0 },
            buffer: [0; REQUEST_BUFFER_LEN],
            status: RequestStatus::Idle,
        }
    }

    /// Prepare a write of `data` (truncated to the buffer size).
    pub fn set_write_params(&mut self, address: u8, data: &[u8]) {
        let len = data.len().min(REQUEST_BUFFER_LEN);
        self.buffer[..len].copy_from_slice(&data[..len]);
        self.address = address;
        self.transfer = Transfer::Write { len: len as u8 };
    }

    /// Prepare a read of `len` bytes (clamped to the buffer size).
    pub fn set_read_params(&mut self, address: u8, len: usize) {
        self.address = address;
        self.transfer = Transfer::Read {
            len: len.min(REQUEST_BUFFER_LEN) as u8,
        };
    }

    pub fn address(&self) -> u8 {
        self.address
    }

    pub fn transfer(&self) -> Transfer {
        self.transfer
    }

    pub fn status(&self) -> RequestStatus {
        self.status
    }

    pub fn is_busy(&self) -> bool {
        self.status == RequestStatus::Pending
    }

    /// Bytes to write, or bytes read by the last successful read.
    pub fn data(&self) -> &[u8] {
        let len = match self.transfer {
            Transfer::Write { len } | Transfer::Read { len } => len as usize,
        };
        &self.buffer[..len]
    }

    /// Transport side: the read destination, sized to the transfer.
    pub fn read_buffer_mut(&mut self) -> &mut [u8] {
        let len = match self.transfer {
            Transfer::Read { len } => len as usize,
            Transfer::Write { .. } => 0,
        };
        &mut self.buffer[..len]
    }

    /// Transport side: the request has been accepted.
    pub fn mark_pending(&mut self) {
        self.status = RequestStatus::Pending;
    }

    /// Transport side: record the outcome.
    pub fn complete(&mut self, result: Result<(), BusError>) {
        self.status = match result {
            Ok(()) => RequestStatus::Ok,
            Err(e) => RequestStatus::Failed(e),
        };
    }
}
