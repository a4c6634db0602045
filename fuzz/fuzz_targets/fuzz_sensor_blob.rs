//! Fuzz target: loading stored sensor definitions
//!
//! Arbitrary bytes in the definitions slot must either load or fail with a
//! typed error, never panic or overflow the registry.
//!
//! cargo fuzz run fuzz_sensor_blob

#![no_main]

use iopoll::adapters::memory_store::MemoryStore;
use iopoll::app::ports::{PinPort, StoragePort, Vpin};
use iopoll::sensors::{SensorScanner, persist};
use libfuzzer_sys::fuzz_target;

struct Released;

impl PinPort for Released {
    fn read_pin(&mut self, _pin: Vpin) -> bool {
        true
    }

    fn configure_input(&mut self, _pin: Vpin, _pull_up: bool) -> bool {
        true
    }
}

fuzz_target!(|data: &[u8]| {
    let mut mem = MemoryStore::new();
    if mem.write(persist::SENSOR_NAMESPACE, persist::SENSOR_KEY, data).is_err() {
        return;
    }
    let mut scanner = SensorScanner::<8>::default();
    if let Ok(count) = persist::load(&mut scanner, &mut Released, &mem) {
        assert!(count <= 8);
        assert!(scanner.len() <= count);
    }
});
