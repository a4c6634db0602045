//! Fuzz target: `SensorRegistry` upsert / remove / cursor walk
//!
//! Each input byte pair is one operation.  After every step the cursor must
//! name a live record and iteration must agree with `len()`.
//!
//! cargo fuzz run fuzz_registry_ops

#![no_main]

use iopoll::sensors::SensorRegistry;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut registry = SensorRegistry::<8>::new();

    for op in data.chunks_exact(2) {
        let id = u16::from(op[1] & 0x0F);
        match op[0] % 3 {
            0 => {
                let _ = registry.upsert(id, id, true);
            }
            1 => {
                let _ = registry.remove(id);
            }
            _ => {
                let _ = registry.advance_cursor();
            }
        }

        assert_eq!(registry.iter().count(), registry.len());
        assert!(registry.len() <= registry.capacity());
        if let Some(cursor) = registry.cursor() {
            assert!(registry.get(cursor).is_some(), "cursor names a freed slot");
        }
    }
});
