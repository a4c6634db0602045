//! iopoll host simulation.
//!
//! Drives the full tick loop against a simulated PCF8574 so the expander
//! state machine and the debounce scanner can be watched on a desktop.
//!
//! ```text
//!   SimulatedBus ──▶ Pcf8574 ──▶ ExpanderPins ──▶ SensorScanner ──▶ TextEventSink
//! ```
//!
//! Set `IOPOLL_CONFIG` to a JSON file to override the defaults and
//! `RUST_LOG=debug` to see the driver diagnostics.

use anyhow::{Context, Result, anyhow};
use log::{info, warn};

use iopoll::adapters::log_sink::LogEventSink;
use iopoll::adapters::memory_store::MemoryStore;
use iopoll::adapters::sim_bus::SimulatedBus;
use iopoll::adapters::text_sink::TextEventSink;
use iopoll::app::ports::SensorEventSink;
use iopoll::app::service::PollContext;
use iopoll::config::PollConfig;

const EXPANDER_ADDRESS: u8 = 0x20;
const FIRST_VPIN: u16 = 100;
const MAX_SENSORS: usize = 16;

/// Forwards every event to the text stream and the log.
struct Tee {
    text: TextEventSink<String>,
    log: LogEventSink,
}

impl SensorEventSink for Tee {
    fn emit(&mut self, event: &iopoll::app::events::SensorEvent) {
        self.text.emit(event);
        self.log.emit(event);
    }
}

fn load_config() -> Result<PollConfig> {
    let Ok(path) = std::env::var("IOPOLL_CONFIG") else {
        return Ok(PollConfig::default());
    };
    let json = std::fs::read_to_string(&path).with_context(|| format!("reading {path}"))?;
    PollConfig::from_json(&json).map_err(|e| anyhow!("{path}: {e}"))
}

fn main() -> Result<()> {
    env_logger::init();

    let config = load_config()?;
    let step_us = u64::from(config.scan_interval_us);
    info!("iopoll simulation starting: {:?}", config);

    let mut bus = SimulatedBus::with_latency(1);
    bus.add_device(EXPANDER_ADDRESS);

    let mut ctx = PollContext::<MAX_SENSORS>::with_config(config)
        .map_err(|e| anyhow!("building poll context: {e}"))?;
    ctx.add_expander(&mut bus, FIRST_VPIN, 8, EXPANDER_ADDRESS)
        .map_err(|e| anyhow!("adding expander: {e}"))?;

    for (id, line) in [(1u16, 0u16), (2, 3), (5, 5)] {
        ctx.create_expander_sensor(&mut bus, id, FIRST_VPIN + line, true)
            .map_err(|e| anyhow!("creating sensor {id}: {e}"))?;
    }

    let mut sink = Tee {
        text: TextEventSink::new(String::new()),
        log: LogEventSink::new(),
    };
    let mut now_us = 0u64;
    let mut run = |ctx: &mut PollContext<MAX_SENSORS>, bus: &mut SimulatedBus, ticks: u32| {
        for _ in 0..ticks {
            now_us += step_us;
            ctx.tick_expanders(now_us, bus, Some(&mut sink));
        }
    };

    // Settle, then hold sensor 5 active.
    run(&mut ctx, &mut bus, 200);
    bus.set_pulled_low(EXPANDER_ADDRESS, 1 << 5);
    run(&mut ctx, &mut bus, 1_000);

    // Lose the expander; its inputs read as released.
    warn!("taking expander offline");
    bus.set_online(EXPANDER_ADDRESS, false);
    run(&mut ctx, &mut bus, 1_000);

    bus.set_online(EXPANDER_ADDRESS, true);
    run(&mut ctx, &mut bus, 1_000);

    let mut mem = MemoryStore::new();
    let stored = ctx
        .store_sensors(&mut mem)
        .map_err(|e| anyhow!("storing sensors: {e}"))?;
    info!("stored {} sensor definitions", stored);

    ctx.report_all(&mut sink);
    print!("{}", sink.text.get_ref());
    Ok(())
}
