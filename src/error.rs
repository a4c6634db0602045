//! Unified error types for the I/O polling core.
//!
//! A single `Error` enum that every subsystem can convert into, keeping
//! configuration-time error handling uniform.  All variants are `Copy` so
//! they can be passed around the tick loop without allocation.
//!
//! Bus failures inside the polling loop never reach the caller as `Err`:
//! they demote the affected device and force its inputs to a fail-safe
//! value.  Only configuration-time operations return these types.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Every fallible configuration-time operation funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A bus transaction failed.
    Bus(BusError),
    /// A pin or tunable configuration was rejected.
    Config(ConfigError),
    /// The sensor registry could not satisfy the request.
    Registry(RegistryError),
    /// Persistent storage failed.
    Storage(StorageError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bus(e) => write!(f, "bus: {e}"),
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Registry(e) => write!(f, "registry: {e}"),
            Self::Storage(e) => write!(f, "storage: {e}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Bus errors
// ---------------------------------------------------------------------------

/// Completion status of a failed bus transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusError {
    /// Address or data byte was not acknowledged (device absent or reset).
    Nack,
    /// The transport gave up waiting for the transaction.
    Timeout,
    /// Lost arbitration or saw a bus error condition.
    Arbitration,
    /// Transport-specific status code.
    Other(u8),
}

impl fmt::Display for BusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nack => write!(f, "no acknowledge"),
            Self::Timeout => write!(f, "timeout"),
            Self::Arbitration => write!(f, "arbitration lost"),
            Self::Other(code) => write!(f, "status {code}"),
        }
    }
}

impl From<BusError> for Error {
    fn from(e: BusError) -> Self {
        Self::Bus(e)
    }
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// The device cannot electrically support the requested pin mode.
    Unsupported,
    /// The pin does not belong to the addressed device.
    PinOutOfRange,
    /// A tunable failed range validation.
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unsupported => write!(f, "unsupported pin configuration"),
            Self::PinOutOfRange => write!(f, "pin out of range"),
            Self::Invalid(msg) => write!(f, "invalid: {msg}"),
        }
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

// ---------------------------------------------------------------------------
// Registry errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryError {
    /// No free slot left for a new record.
    Full,
    /// No record with the requested id.
    NotFound,
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Full => write!(f, "registry full"),
            Self::NotFound => write!(f, "sensor not found"),
        }
    }
}

impl From<RegistryError> for Error {
    fn from(e: RegistryError) -> Self {
        Self::Registry(e)
    }
}

// ---------------------------------------------------------------------------
// Storage errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageError {
    /// Requested key does not exist.
    NotFound,
    /// Storage partition is full.
    Full,
    /// Generic I/O error.
    Io,
    /// Stored blob failed to decode.
    Corrupted,
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "key not found"),
            Self::Full => write!(f, "storage full"),
            Self::Io => write!(f, "I/O error"),
            Self::Corrupted => write!(f, "stored data corrupted"),
        }
    }
}

impl From<StorageError> for Error {
    fn from(e: StorageError) -> Self {
        Self::Storage(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
