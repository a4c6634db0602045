//! Line-oriented text sink.
//!
//! Writes one `<Q id>` / `<q id>` line per event to any
//! `core::fmt::Write`, such as a serial port wrapper or a `String`.

use core::fmt::Write;

use log::warn;

use crate::app::events::SensorEvent;
use crate::app::ports::SensorEventSink;

pub struct TextEventSink<W> {
    out: W,
}

impl<W: Write> TextEventSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn get_ref(&self) -> &W {
        &self.out
    }

    pub fn get_mut(&mut self) -> &mut W {
        &mut self.out
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> SensorEventSink for TextEventSink<W> {
    fn emit(&mut self, event: &SensorEvent) {
        if writeln!(self.out, "{}", event).is_err() {
            warn!("TextEventSink: dropped {}", event);
        }
    }
}
