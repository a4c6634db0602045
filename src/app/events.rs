//! Outbound sensor events.
//!
//! The scanner emits these through the
//! [`SensorEventSink`](super::ports::SensorEventSink) port.  Adapters on the
//! other side decide what to do with them: write a text line to the
//! command stream, log them, forward them over a network link, etc.
//!
//! The text form follows the command-station convention: `<Q id>` when a
//! sensor is (or becomes) active, `<q id>` when it is (or becomes) inactive.

use core::fmt;

/// Direction of a committed change.  `Rising` means the sensor became
/// active (its line was pulled low).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Rising,
    Falling,
}

impl Edge {
    /// The edge that leads into the given debounced state.
    pub fn into_state(active: bool) -> Self {
        if active { Self::Rising } else { Self::Falling }
    }

    /// Protocol tag: `Q` for active, `q` for inactive.
    pub fn tag(self) -> char {
        match self {
            Self::Rising => 'Q',
            Self::Falling => 'q',
        }
    }
}

/// One sensor transition, or one line of a state report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorEvent {
    pub edge: Edge,
    pub id: u16,
}

impl SensorEvent {
    pub fn new(edge: Edge, id: u16) -> Self {
        Self { edge, id }
    }

    /// Event describing the current debounced state of sensor `id`.
    pub fn state(id: u16, active: bool) -> Self {
        Self::new(Edge::into_state(active), id)
    }

    /// Whether the sensor is active after this event.
    pub fn is_active(&self) -> bool {
        self.edge == Edge::Rising
    }
}

impl fmt::Display for SensorEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{} {}>", self.edge.tag(), self.id)
    }
}
