//! Debounced sensor scanning end to end with mock pins.

use crate::mock_hw::{EventLog, MockAux, MockPins};

use iopoll::app::events::{Edge, SensorEvent};
use iopoll::app::ports::NoAuxBus;
use iopoll::error::RegistryError;
use iopoll::sensors::{SensorScanner, Upsert};

const PIN: u16 = 22;

#[test]
fn sustained_trigger_for_128_scans_emits_one_event() {
    let mut pins = MockPins::new();
    let mut scanner = SensorScanner::<8>::new(127);
    scanner.create(&mut pins, 5, PIN, true).unwrap();
    pins.hold_low(PIN, true);

    let mut log = EventLog::new();
    for _ in 0..128 {
        scanner.check_all(&mut pins, &mut NoAuxBus, Some(&mut log));
    }
    assert_eq!(log.events, [SensorEvent::new(Edge::Rising, 5)]);
    assert!(scanner.get(5).unwrap().is_active());

    for _ in 0..500 {
        scanner.check_all(&mut pins, &mut NoAuxBus, Some(&mut log));
    }
    assert_eq!(log.events.len(), 1);
}

#[test]
fn one_short_of_threshold_emits_nothing() {
    let mut pins = MockPins::new();
    let mut scanner = SensorScanner::<8>::new(127);
    scanner.create(&mut pins, 5, PIN, true).unwrap();

    let mut log = EventLog::new();
    pins.hold_low(PIN, true);
    for _ in 0..127 {
        scanner.check_next(&mut pins, Some(&mut log));
    }
    pins.hold_low(PIN, false);
    scanner.check_next(&mut pins, Some(&mut log));

    assert!(log.events.is_empty());
    assert!(!scanner.get(5).unwrap().is_active());
    assert_eq!(scanner.get(5).unwrap().jitter(), 0);
}

#[test]
fn quiet_mode_tracks_state_without_events() {
    let mut pins = MockPins::new();
    let mut scanner = SensorScanner::<8>::new(2);
    scanner.create(&mut pins, 1, PIN, true).unwrap();
    pins.hold_low(PIN, true);

    for _ in 0..3 {
        scanner.check_next(&mut pins, None::<&mut EventLog>);
    }
    assert!(scanner.get(1).unwrap().is_active());
}

#[test]
fn release_after_trigger_emits_falling() {
    let mut pins = MockPins::new();
    let mut scanner = SensorScanner::<8>::new(1);
    scanner.create(&mut pins, 3, PIN, true).unwrap();

    let mut log = EventLog::new();
    pins.hold_low(PIN, true);
    for _ in 0..2 {
        scanner.check_next(&mut pins, Some(&mut log));
    }
    pins.hold_low(PIN, false);
    for _ in 0..2 {
        scanner.check_next(&mut pins, Some(&mut log));
    }
    assert_eq!(
        log.events,
        [SensorEvent::new(Edge::Rising, 3), SensorEvent::new(Edge::Falling, 3)]
    );
}

#[test]
fn aux_bus_gets_its_turn_before_line_sensors() {
    let mut pins = MockPins::new();
    let mut scanner = SensorScanner::<8>::new(0);
    scanner.create(&mut pins, 1, PIN, true).unwrap();
    pins.hold_low(PIN, true);

    let mut aux = MockAux {
        pending: vec![SensorEvent::new(Edge::Rising, 900)],
        ..MockAux::default()
    };
    let mut log = EventLog::new();
    scanner.check_all(&mut pins, &mut aux, Some(&mut log));

    assert_eq!(aux.polls, 1);
    assert_eq!(
        log.events,
        [SensorEvent::new(Edge::Rising, 900), SensorEvent::new(Edge::Rising, 1)]
    );
}

#[test]
fn report_all_puts_aux_status_first() {
    let mut pins = MockPins::new();
    let mut scanner = SensorScanner::<8>::default();
    scanner.create(&mut pins, 4, 10, true).unwrap();
    scanner.create(&mut pins, 2, 11, true).unwrap();

    let mut aux = MockAux {
        status: vec![SensorEvent::state(900, true)],
        ..MockAux::default()
    };
    let mut log = EventLog::new();
    scanner.report_all(&mut aux, &mut log);

    assert_eq!(
        log.events,
        [
            SensorEvent::state(900, true),
            SensorEvent::state(4, false),
            SensorEvent::state(2, false),
        ]
    );
}

#[test]
fn rejected_line_config_still_records_sensor() {
    let mut pins = MockPins::rejecting();
    let mut scanner = SensorScanner::<8>::default();
    let outcome = scanner.create(&mut pins, 8, PIN, false).unwrap();
    assert!(matches!(outcome, Upsert::Created(_)));
    assert_eq!(pins.configured, [(PIN, false)]);
}

#[test]
fn full_registry_reports_exhaustion() {
    let mut pins = MockPins::new();
    let mut scanner = SensorScanner::<2>::default();
    scanner.create(&mut pins, 1, 1, true).unwrap();
    scanner.create(&mut pins, 2, 2, true).unwrap();
    assert_eq!(scanner.create(&mut pins, 3, 3, true), Err(RegistryError::Full));
    assert!(matches!(scanner.create(&mut pins, 2, 9, true), Ok(Upsert::Updated(_))));
    assert_eq!(scanner.len(), 2);
}
