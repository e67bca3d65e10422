//! Driver station backed by real gamepads through `gilrs`.
//!
//! Connected gamepads are assigned to joystick ports in the order gilrs
//! reports them. Buttons use the 1-based numbering of a flight stick.

use color_eyre::{Result, eyre::eyre};
use gilrs::{Axis, Button, GamepadId, Gilrs};
use tlb_core::utils::input::{DriverStation, PORT_COUNT, RobotMode, Y_AXIS};
use tracing::{debug, info, warn};

/// Button numbers 1..=12 in order.
const BUTTONS: [Button; 12] = [
    Button::South,
    Button::East,
    Button::West,
    Button::North,
    Button::LeftTrigger,
    Button::RightTrigger,
    Button::LeftTrigger2,
    Button::RightTrigger2,
    Button::Select,
    Button::Start,
    Button::LeftThumb,
    Button::RightThumb,
];

pub struct GamepadStation {
    gilrs: Gilrs,
    ports: Vec<GamepadId>,
    mode: RobotMode,
}

impl GamepadStation {
    pub fn new(mode: RobotMode) -> Result<Self> {
        info!("Initializing gilrs controller interface");
        let gilrs = Gilrs::new().map_err(|e| eyre!("Failed to initialize gilrs: {}", e))?;
        let mut station = Self {
            gilrs,
            ports: Vec::new(),
            mode,
        };
        station.assign_ports();
        if station.ports.is_empty() {
            warn!("No gamepads connected; sticks will read as centered");
        }
        Ok(station)
    }

    /// Drain pending events so the cached gamepad state is current.
    pub fn refresh(&mut self) {
        let mut changed = false;
        while let Some(event) = self.gilrs.next_event() {
            debug!("Processing gilrs event: {:?}", event.event);
            changed = true;
        }
        if changed {
            self.assign_ports();
        }
    }

    fn assign_ports(&mut self) {
        let ports: Vec<GamepadId> = self
            .gilrs
            .gamepads()
            .filter(|(_, pad)| pad.is_connected())
            .map(|(id, _)| id)
            .take(PORT_COUNT as usize)
            .collect();
        if ports != self.ports {
            info!(count = ports.len(), "Gamepad ports assigned");
            self.ports = ports;
        }
    }
}

impl DriverStation for GamepadStation {
    fn axis(
        &self,
        port: u8,
        axis: u8,
    ) -> f32 {
        let Some(&id) = self.ports.get(port as usize) else {
            return 0.0;
        };
        let pad = self.gilrs.gamepad(id);
        match axis {
            0 => pad.value(Axis::LeftStickX),
            // gilrs reports up as positive; joystick Y is positive toward the operator
            Y_AXIS => -pad.value(Axis::LeftStickY),
            _ => 0.0,
        }
    }

    fn button(
        &self,
        port: u8,
        button: u8,
    ) -> bool {
        let Some(&id) = self.ports.get(port as usize) else {
            return false;
        };
        match button.checked_sub(1).and_then(|i| BUTTONS.get(i as usize)) {
            Some(&b) => self.gilrs.gamepad(id).is_pressed(b),
            None => false,
        }
    }

    fn mode(&self) -> RobotMode {
        self.mode
    }
}
