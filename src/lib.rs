//! iopoll library.
//!
//! Cooperative polling core for I2C port expanders and debounced digital
//! sensors.  Everything runs from a single scheduler tick; hardware is
//! reached only through the port traits in [`app::ports`].

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod drivers;
pub mod error;
pub mod sensors;
