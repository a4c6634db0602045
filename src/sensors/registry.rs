//! Fixed-capacity sensor registry.
//!
//! Records live in an arena of slots addressed by [`SensorHandle`].  The
//! slots are threaded into a singly linked sequence in insertion order, and
//! the round-robin read cursor is just an optional handle into that
//! sequence.  Removal re-links the cursor to the removed record's successor
//! before the slot is freed, so the cursor never refers to a dead record.
//!
//! ```text
//!  slots:  [ 0: id 7 ]──next──▶[ 2: id 3 ]──next──▶[ 1: id 9 ]──▶ None
//!            ▲ head                ▲ cursor            ▲ tail
//! ```

use heapless::Vec;

use crate::app::events::Edge;
use crate::app::ports::Vpin;
use crate::error::RegistryError;

/// Stable address of a record inside the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SensorHandle(u16);

impl SensorHandle {
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// One sensor definition plus its debounced state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SensorRecord {
    pub id: u16,
    pub pin: Vpin,
    pub pull_up: bool,
    active: bool,
    jitter: u8,
}

impl SensorRecord {
    fn new(id: u16, pin: Vpin, pull_up: bool) -> Self {
        Self {
            id,
            pin,
            pull_up,
            active: false,
            jitter: 0,
        }
    }

    /// Debounced state.  `true` while the line is held low.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Consecutive samples that disagreed with the published state.
    pub fn jitter(&self) -> u8 {
        self.jitter
    }

    /// Feed one raw line level through the debounce filter.
    ///
    /// The line is active low.  A sample that agrees with the published
    /// state clears the jitter count.  A disagreeing sample bumps the count
    /// until it reaches `threshold`; the next disagreeing sample after that
    /// commits the change and returns its edge.
    pub fn sample(&mut self, level: bool, threshold: u8) -> Option<Edge> {
        let triggered = !level;
        if triggered == self.active {
            self.jitter = 0;
            None
        } else if self.jitter < threshold {
            self.jitter += 1;
            None
        } else {
            self.active = triggered;
            self.jitter = 0;
            Some(Edge::into_state(triggered))
        }
    }
}

/// Outcome of [`SensorRegistry::upsert`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    Created(SensorHandle),
    Updated(SensorHandle),
}

impl Upsert {
    pub fn handle(self) -> SensorHandle {
        match self {
            Self::Created(h) | Self::Updated(h) => h,
        }
    }
}

#[derive(Debug, Clone)]
struct Slot {
    record: SensorRecord,
    next: Option<SensorHandle>,
}

pub struct SensorRegistry<const N: usize> {
    slots: Vec<Option<Slot>, N>,
    head: Option<SensorHandle>,
    tail: Option<SensorHandle>,
    cursor: Option<SensorHandle>,
    len: usize,
}

impl<const N: usize> Default for SensorRegistry<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> SensorRegistry<N> {
    pub fn new() -> Self {
        const { assert!(N <= u16::MAX as usize + 1, "SensorHandle addresses at most 65536 slots") };
        Self {
            slots: Vec::new(),
            head: None,
            tail: None,
            cursor: None,
            len: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn capacity(&self) -> usize {
        N
    }

    /// Create a record, or update pin and pull-up of an existing one in
    /// place.  Either way the debounced state restarts from inactive.
    pub fn upsert(&mut self, id: u16, pin: Vpin, pull_up: bool) -> Result<Upsert, RegistryError> {
        if let Some(handle) = self.find(id) {
            if let Some(slot) = self.slot_mut(handle) {
                slot.record = SensorRecord::new(id, pin, pull_up);
            }
            return Ok(Upsert::Updated(handle));
        }

        let slot = Slot {
            record: SensorRecord::new(id, pin, pull_up),
            next: None,
        };
        let handle = match self.slots.iter().position(Option::is_none) {
            Some(index) => {
                self.slots[index] = Some(slot);
                SensorHandle(index as u16)
            }
            None => {
                let index = self.slots.len();
                self.slots.push(Some(slot)).map_err(|_| RegistryError::Full)?;
                SensorHandle(index as u16)
            }
        };

        match self.tail {
            Some(tail) => {
                if let Some(slot) = self.slot_mut(tail) {
                    slot.next = Some(handle);
                }
            }
            None => self.head = Some(handle),
        }
        self.tail = Some(handle);
        self.len += 1;
        Ok(Upsert::Created(handle))
    }

    /// Unlink and free the record with `id`.
    pub fn remove(&mut self, id: u16) -> Result<SensorRecord, RegistryError> {
        let mut prev: Option<SensorHandle> = None;
        let mut current = self.head;
        while let Some(handle) = current {
            let (record_id, next) = match self.slot(handle) {
                Some(slot) => (slot.record.id, slot.next),
                None => break,
            };
            if record_id != id {
                prev = Some(handle);
                current = next;
                continue;
            }

            match prev {
                Some(p) => {
                    if let Some(slot) = self.slot_mut(p) {
                        slot.next = next;
                    }
                }
                None => self.head = next,
            }
            if self.tail == Some(handle) {
                self.tail = prev;
            }
            if self.cursor == Some(handle) {
                self.cursor = next;
            }
            self.len -= 1;
            let slot = self.slots[handle.index()].take();
            return slot.map(|s| s.record).ok_or(RegistryError::NotFound);
        }
        Err(RegistryError::NotFound)
    }

    /// Handle of the record with `id`, by linear scan.
    pub fn find(&self, id: u16) -> Option<SensorHandle> {
        self.handles().find(|&h| self.get(h).is_some_and(|r| r.id == id))
    }

    pub fn get(&self, handle: SensorHandle) -> Option<&SensorRecord> {
        self.slot(handle).map(|s| &s.record)
    }

    pub fn get_mut(&mut self, handle: SensorHandle) -> Option<&mut SensorRecord> {
        self.slot_mut(handle).map(|s| &mut s.record)
    }

    /// Record with `id`, if present.
    pub fn lookup(&self, id: u16) -> Option<&SensorRecord> {
        self.find(id).and_then(|h| self.get(h))
    }

    /// Records in insertion order.  Each call starts from the head.
    pub fn iter(&self) -> Iter<'_, N> {
        Iter {
            registry: self,
            next: self.head,
        }
    }

    /// Where the next scan will start, if the cursor is parked on a record.
    pub fn cursor(&self) -> Option<SensorHandle> {
        self.cursor
    }

    /// Return the record due for scanning and step the cursor past it,
    /// wrapping to the head after the tail.
    pub fn advance_cursor(&mut self) -> Option<SensorHandle> {
        let current = self.cursor.or(self.head)?;
        self.cursor = self.slot(current).and_then(|s| s.next);
        Some(current)
    }

    fn handles(&self) -> impl Iterator<Item = SensorHandle> + '_ {
        core::iter::successors(self.head, |&h| self.slot(h).and_then(|s| s.next))
    }

    fn slot(&self, handle: SensorHandle) -> Option<&Slot> {
        self.slots.get(handle.index()).and_then(Option::as_ref)
    }

    fn slot_mut(&mut self, handle: SensorHandle) -> Option<&mut Slot> {
        self.slots.get_mut(handle.index()).and_then(Option::as_mut)
    }
}

/// Insertion-order iterator over registry records.
pub struct Iter<'a, const N: usize> {
    registry: &'a SensorRegistry<N>,
    next: Option<SensorHandle>,
}

impl<'a, const N: usize> Iterator for Iter<'a, N> {
    type Item = &'a SensorRecord;

    fn next(&mut self) -> Option<Self::Item> {
        let slot = self.registry.slot(self.next?)?;
        self.next = slot.next;
        Some(&slot.record)
    }
}
