//! PollContext driving expanders, scanner and sinks together.

use crate::mock_hw::{EventLog, MockAux, MockPins};

use iopoll::adapters::memory_store::MemoryStore;
use iopoll::adapters::sim_bus::SimulatedBus;
use iopoll::adapters::text_sink::TextEventSink;
use iopoll::app::events::{Edge, SensorEvent};
use iopoll::app::ports::StoragePort;
use iopoll::app::service::PollContext;
use iopoll::config::PollConfig;
use iopoll::drivers::pcf8574::DeviceState;
use iopoll::error::{Error, StorageError};

const ADDR: u8 = 0x20;

fn config(threshold: u8) -> PollConfig {
    PollConfig {
        expander_tick_us: 50,
        debounce_threshold: threshold,
        ..PollConfig::default()
    }
}

fn expander_context(bus: &mut SimulatedBus, threshold: u8) -> PollContext<8> {
    bus.add_device(ADDR);
    let mut ctx = PollContext::<8>::with_config(config(threshold)).unwrap();
    ctx.add_expander(bus, 0, 8, ADDR).unwrap();
    ctx
}

#[test]
fn expander_sensor_writes_text_events() {
    let mut bus = SimulatedBus::with_latency(1);
    let mut ctx = expander_context(&mut bus, 127);
    ctx.create_expander_sensor(&mut bus, 5, 3, true).unwrap();
    bus.set_pulled_low(ADDR, 1 << 3);

    let mut sink = TextEventSink::new(String::new());
    for t in 1..=400u64 {
        ctx.tick_expanders(t * 10, &mut bus, Some(&mut sink));
    }
    assert_eq!(sink.get_ref(), "<Q 5>\n");

    bus.set_pulled_low(ADDR, 0);
    for t in 401..=800u64 {
        ctx.tick_expanders(t * 10, &mut bus, Some(&mut sink));
    }
    assert_eq!(sink.into_inner(), "<Q 5>\n<q 5>\n");
}

#[test]
fn offline_expander_releases_its_sensors() {
    let mut bus = SimulatedBus::new();
    let mut ctx = expander_context(&mut bus, 4);
    ctx.create_expander_sensor(&mut bus, 1, 0, true).unwrap();
    bus.set_pulled_low(ADDR, 0b0000_0001);

    let mut log = EventLog::new();
    for t in 1..=20u64 {
        ctx.tick_expanders(t * 10, &mut bus, Some(&mut log));
    }
    assert_eq!(log.events, [SensorEvent::new(Edge::Rising, 1)]);

    // A failed scan reads all ones, so the sensor falls back to inactive.
    bus.set_online(ADDR, false);
    for t in 21..=60u64 {
        ctx.tick_expanders(t * 10, &mut bus, Some(&mut log));
    }
    assert_eq!(
        log.events,
        [SensorEvent::new(Edge::Rising, 1), SensorEvent::new(Edge::Falling, 1)]
    );
    assert_eq!(ctx.expanders()[0].input_sample(), 0xFF);
    assert_ne!(ctx.expanders()[0].state(), DeviceState::Normal);
}

#[test]
fn external_pins_and_aux_bus_share_the_sink() {
    let mut bus = SimulatedBus::new();
    let aux = MockAux {
        pending: vec![SensorEvent::new(Edge::Rising, 700)],
        ..MockAux::default()
    };
    let mut ctx = PollContext::<4, MockAux>::new(config(1), aux).unwrap();
    let mut pins = MockPins::new();
    ctx.create_sensor(&mut pins, 2, 40, true).unwrap();
    pins.hold_low(40, true);

    let mut log = EventLog::new();
    for t in 1..=3u64 {
        ctx.tick(t, &mut bus, &mut pins, Some(&mut log));
    }
    assert_eq!(ctx.aux().polls, 3);
    assert_eq!(log.count_for(700), 1);
    assert_eq!(log.count_for(2), 1);
    assert_eq!(pins.reads, [40, 40, 40]);
}

#[test]
fn removing_sensor_stops_its_scans() {
    let mut bus = SimulatedBus::new();
    let mut ctx = PollContext::<4>::with_config(config(1)).unwrap();
    let mut pins = MockPins::new();
    ctx.create_sensor(&mut pins, 1, 10, true).unwrap();
    ctx.create_sensor(&mut pins, 2, 20, true).unwrap();
    ctx.tick(1, &mut bus, &mut pins, None::<&mut EventLog>);
    ctx.remove_sensor(2).unwrap();
    ctx.tick(2, &mut bus, &mut pins, None::<&mut EventLog>);
    ctx.tick(3, &mut bus, &mut pins, None::<&mut EventLog>);

    assert_eq!(pins.reads, [10, 10, 10]);
    assert!(ctx.get_sensor(2).is_none());
}

#[test]
fn definitions_round_trip_through_storage() {
    let mut bus = SimulatedBus::new();
    let mut ctx = expander_context(&mut bus, 127);
    for (id, pin) in [(3u16, 1u16), (1, 2), (2, 7)] {
        ctx.create_expander_sensor(&mut bus, id, pin, true).unwrap();
    }
    let mut mem = MemoryStore::new();
    ctx.store_sensors(&mut mem).unwrap();

    let mut restored = expander_context(&mut bus, 127);
    assert_eq!(restored.load_sensors(&mut bus, &mem).unwrap(), 3);
    let defs: Vec<(u16, u16)> = restored.sensors().map(|r| (r.id, r.pin)).collect();
    assert_eq!(defs, [(3, 1), (1, 2), (2, 7)]);
}

#[test]
fn corrupted_storage_is_reported() {
    let mut bus = SimulatedBus::new();
    let mut ctx = expander_context(&mut bus, 127);
    let mut mem = MemoryStore::new();
    mem.write("sensors", "defs", &[0xFF, 0xFF, 0xFF]).unwrap();

    assert_eq!(
        ctx.load_sensors(&mut bus, &mem),
        Err(Error::Storage(StorageError::Corrupted))
    );
    assert_eq!(ctx.sensors().count(), 0);
}
