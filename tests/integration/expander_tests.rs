//! PCF8574 poll state machine against the simulated bus.

use iopoll::adapters::sim_bus::{SimulatedBus, Transaction};
use iopoll::drivers::pcf8574::{DeviceState, Pcf8574};
use iopoll::drivers::{IoDevice, PinConfig};
use iopoll::error::ConfigError;

const ADDR: u8 = 0x20;
const TICK: u32 = 100;

fn online_device(latency: u32) -> (SimulatedBus, Pcf8574) {
    let mut bus = SimulatedBus::with_latency(latency);
    bus.add_device(ADDR);
    let dev = Pcf8574::new(0, 8, ADDR, TICK, &mut bus);
    (bus, dev)
}

/// Poll every microsecond from `from` until the device settles in Normal.
fn settle(bus: &mut SimulatedBus, dev: &mut Pcf8574, from: u64) -> u64 {
    let mut now = from;
    while dev.state() != DeviceState::Normal {
        now += 1;
        dev.poll(bus, now);
        assert!(now < from + 10_000, "device never settled");
    }
    now
}

#[test]
fn line_three_accepted_line_four_without_pull_up_rejected() {
    let (_bus, mut dev) = online_device(0);
    assert_eq!(dev.configure(3, PinConfig::Input { pull_up: true }), Ok(()));

    let latch = dev.output_latch();
    let sample = dev.input_sample();
    assert_eq!(
        dev.configure(4, PinConfig::Input { pull_up: false }),
        Err(ConfigError::Unsupported)
    );
    assert_eq!(dev.output_latch(), latch);
    assert_eq!(dev.input_sample(), sample);
    assert_eq!(dev.state(), DeviceState::Dormant);
}

#[test]
fn output_value_reads_back() {
    let (mut bus, mut dev) = online_device(0);
    settle(&mut bus, &mut dev, u64::from(TICK));
    for value in [true, false, true] {
        dev.write(&mut bus, 6, value);
        assert_eq!(dev.read(&mut bus, 6), value);
    }
}

#[test]
fn released_line_is_not_rewritten_before_read() {
    let (mut bus, mut dev) = online_device(0);
    settle(&mut bus, &mut dev, u64::from(TICK));

    assert!(dev.read(&mut bus, 2));
    bus.clear_log();
    assert!(dev.read(&mut bus, 2));
    assert!(bus.transactions().is_empty());
}

#[test]
fn latency_keeps_request_in_flight() {
    let (mut bus, mut dev) = online_device(3);
    dev.poll(&mut bus, 101);
    assert_eq!(dev.state(), DeviceState::Probing);
    for now in 102..105 {
        dev.poll(&mut bus, now);
        assert_eq!(dev.state(), DeviceState::Probing);
    }
    dev.poll(&mut bus, 105);
    assert_eq!(dev.state(), DeviceState::Normal);
}

#[test]
fn recovers_after_power_cycle_and_restores_latch() {
    let (mut bus, mut dev) = online_device(0);
    let now = settle(&mut bus, &mut dev, u64::from(TICK));
    dev.write(&mut bus, 0, true);
    dev.write(&mut bus, 1, false);
    let latch = dev.output_latch();

    bus.set_online(ADDR, false);
    let scan_at = now + u64::from(TICK) + 1;
    dev.poll(&mut bus, scan_at);
    assert_eq!(dev.state(), DeviceState::Scanning);
    dev.poll(&mut bus, scan_at + 1);
    assert_eq!(dev.state(), DeviceState::Dormant);
    assert_eq!(dev.input_sample(), 0xFF);

    // No probe before a full interval has passed.
    bus.clear_log();
    dev.poll(&mut bus, scan_at + u64::from(TICK));
    assert!(bus.transactions().is_empty());

    bus.set_online(ADDR, true);
    assert_eq!(bus.device(ADDR).unwrap().latch, 0xFF);
    let probe_at = scan_at + u64::from(TICK) + 1;
    dev.poll(&mut bus, probe_at);
    assert_eq!(bus.transactions(), &[Transaction::Probe { address: ADDR }]);
    dev.poll(&mut bus, probe_at + 1);

    assert_eq!(dev.state(), DeviceState::Normal);
    assert_eq!(bus.device(ADDR).unwrap().latch, latch);
    assert!(dev.read(&mut bus, 0));
    assert!(!dev.read(&mut bus, 1));
}
