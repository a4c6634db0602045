//! Polling configuration parameters
//!
//! All tunable parameters for the expander poll loop and the sensor scanner.
//! Values can be loaded from JSON or from a stored postcard blob.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Highest jitter count the debounce counter can hold.
pub const MAX_DEBOUNCE_THRESHOLD: u8 = 127;

/// Core polling configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PollConfig {
    // --- Expanders ---
    /// Minimum interval between expander cycle admissions (microseconds)
    pub expander_tick_us: u32,
    /// I2C clock for PCF8574 modules (Hz)
    pub bus_clock_hz: u32,

    // --- Sensors ---
    /// Consecutive disagreeing samples tolerated before a change commits
    pub debounce_threshold: u8,
    /// Scheduler tick period used by the host loop (microseconds)
    pub scan_interval_us: u32,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            // Expanders
            expander_tick_us: 4_000,
            bus_clock_hz: 100_000, // PCF8574 rated maximum

            // Sensors
            debounce_threshold: MAX_DEBOUNCE_THRESHOLD,
            scan_interval_us: 1_000,
        }
    }
}

impl PollConfig {
    /// Range-check every field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.expander_tick_us == 0 {
            return Err(ConfigError::Invalid("expander_tick_us must be > 0"));
        }
        if !(10_000..=1_000_000).contains(&self.bus_clock_hz) {
            return Err(ConfigError::Invalid(
                "bus_clock_hz must be 10000–1000000",
            ));
        }
        if !(1..=MAX_DEBOUNCE_THRESHOLD).contains(&self.debounce_threshold) {
            return Err(ConfigError::Invalid("debounce_threshold must be 1–127"));
        }
        if self.scan_interval_us == 0 {
            return Err(ConfigError::Invalid("scan_interval_us must be > 0"));
        }
        Ok(())
    }

    /// Parse a JSON document and validate it.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let cfg: Self =
            serde_json::from_str(json).map_err(|_| ConfigError::Invalid("malformed JSON"))?;
        cfg.validate()?;
        Ok(cfg)
    }
}
