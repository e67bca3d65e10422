//! Operator input for the Tank-Leg Bot.
//!
//! - `bindings`: edge-triggered button actions
//! - `teleop`: stick-to-drivetrain mapping and the operator mode flags
//!
//! Joysticks are read through a [`DriverStation`], which also reports the
//! current [`RobotMode`]. Devices that are not plugged in read as zero / released.

pub mod bindings;
pub mod teleop;

use serde::{Deserialize, Serialize};

/// Joystick port of the left (driver) stick.
pub const LEFT_PORT: u8 = 0;
/// Joystick port of the right stick, which also carries the button bindings.
pub const RIGHT_PORT: u8 = 1;
/// Joystick port of the auxiliary stick.
pub const ALT_PORT: u8 = 2;
/// Number of joystick ports read by the robot.
pub const PORT_COUNT: u8 = 3;

/// Axis index of a stick's Y axis (positive when pulled toward the operator).
pub const Y_AXIS: u8 = 1;

/// Operating state reported by the driver station.
#[derive(Debug, Default, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RobotMode {
    #[default]
    Disabled,
    Autonomous,
    Teleop,
    Test,
}

impl RobotMode {
    pub fn is_enabled(self) -> bool {
        self != RobotMode::Disabled
    }

    pub fn is_teleop_enabled(self) -> bool {
        self == RobotMode::Teleop
    }
}

/// Source of joystick state and robot mode, polled once per tick.
pub trait DriverStation {
    /// Analog value of `axis` on the stick at `port`, in `[-1.0, 1.0]`.
    fn axis(
        &self,
        port: u8,
        axis: u8,
    ) -> f32;

    /// Whether `button` (1-based) on the stick at `port` is held.
    fn button(
        &self,
        port: u8,
        button: u8,
    ) -> bool;

    fn mode(&self) -> RobotMode;
}

/// A single button on a joystick port.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct JoystickButton {
    pub port: u8,
    pub button: u8,
}

impl JoystickButton {
    pub const fn new(
        port: u8,
        button: u8,
    ) -> Self {
        Self { port, button }
    }

    pub fn get<D: DriverStation>(
        &self,
        ds: &D,
    ) -> bool {
        ds.button(self.port, self.button)
    }
}
