//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that exercises a specific subsystem
//! against the simulated adapters.  All tests run on the host with no real
//! hardware required.

mod expander_tests;
mod mock_hw;
mod scanner_tests;
mod service_tests;
