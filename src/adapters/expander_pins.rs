//! Pin port backed by expander devices.
//!
//! Routes each logical pin to the device whose range contains it, so
//! sensors can sit on expander lines.  Pins that no device owns read as
//! released (high) and refuse configuration.

use log::debug;

use crate::app::ports::{BusPort, PinPort, Vpin};
use crate::drivers::{IoDevice, PinConfig};

pub struct ExpanderPins<'a, D, B> {
    devices: &'a mut [D],
    bus: &'a mut B,
}

impl<'a, D: IoDevice, B: BusPort> ExpanderPins<'a, D, B> {
    pub fn new(devices: &'a mut [D], bus: &'a mut B) -> Self {
        Self { devices, bus }
    }

    fn device_for(&mut self, pin: Vpin) -> Option<&mut D> {
        self.devices.iter_mut().find(|d| d.owns(pin))
    }
}

impl<D: IoDevice, B: BusPort> PinPort for ExpanderPins<'_, D, B> {
    fn read_pin(&mut self, pin: Vpin) -> bool {
        let bus = &mut *self.bus;
        match self.devices.iter_mut().find(|d| d.owns(pin)) {
            Some(device) => device.read(bus, pin),
            None => {
                debug!("ExpanderPins: Vpin {} has no device", pin);
                true
            }
        }
    }

    fn configure_input(&mut self, pin: Vpin, pull_up: bool) -> bool {
        self.device_for(pin)
            .is_some_and(|d| d.configure(pin, PinConfig::Input { pull_up }).is_ok())
    }
}
