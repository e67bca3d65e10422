//! Scripted driver station.
//!
//! A script is a JSON list of steps. Each step holds the robot mode, stick
//! positions and held buttons for a number of ticks:
//!
//! ```json
//! { "steps": [
//!     { "ticks": 25, "mode": "disabled" },
//!     { "ticks": 100, "mode": "teleop", "left_y": -0.6, "right_y": 0.6 },
//!     { "ticks": 5, "mode": "teleop", "buttons": [{ "port": 1, "button": 1 }] }
//! ] }
//! ```

use serde::{Deserialize, Serialize};
use tlb_core::utils::input::{DriverStation, JoystickButton, LEFT_PORT, RIGHT_PORT, RobotMode, Y_AXIS};

#[derive(Debug, Default, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct Step {
    pub ticks: u32,
    pub mode: RobotMode,
    pub left_y: f32,
    pub right_y: f32,
    pub buttons: Vec<JoystickButton>,
}

#[derive(Debug, Default, Serialize, Deserialize, Clone, PartialEq)]
pub struct Script {
    pub steps: Vec<Step>,
}

impl Script {
    /// Drive forward, kick, toggle coast, go full power, stop.
    pub fn demo() -> Self {
        let right = |button| JoystickButton::new(RIGHT_PORT, button);
        let teleop = |ticks, y: f32, buttons: Vec<JoystickButton>| Step {
            ticks,
            mode: RobotMode::Teleop,
            left_y: -y,
            right_y: y,
            buttons,
        };
        Self {
            steps: vec![
                Step {
                    ticks: 25,
                    ..Default::default()
                },
                teleop(100, 0.6, vec![]),
                teleop(5, 0.0, vec![right(1)]),
                teleop(5, 0.0, vec![]),
                teleop(5, 0.0, vec![right(11)]),
                teleop(5, 0.0, vec![right(5), right(6)]),
                teleop(100, 1.0, vec![]),
                Step {
                    ticks: 25,
                    ..Default::default()
                },
            ],
        }
    }

    pub fn total_ticks(&self) -> u64 {
        self.steps.iter().map(|s| u64::from(s.ticks)).sum()
    }
}

/// Driver station replaying one [`Step`] at a time.
#[derive(Debug, Default)]
pub struct ScriptedStation {
    current: Step,
}

impl ScriptedStation {
    pub fn load(
        &mut self,
        step: &Step,
    ) {
        self.current = step.clone();
    }
}

impl DriverStation for ScriptedStation {
    fn axis(
        &self,
        port: u8,
        axis: u8,
    ) -> f32 {
        match (port, axis) {
            (LEFT_PORT, Y_AXIS) => self.current.left_y,
            (RIGHT_PORT, Y_AXIS) => self.current.right_y,
            _ => 0.0,
        }
    }

    fn button(
        &self,
        port: u8,
        button: u8,
    ) -> bool {
        self.current
            .buttons
            .contains(&JoystickButton::new(port, button))
    }

    fn mode(&self) -> RobotMode {
        self.current.mode
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_partial_steps() {
        let script: Script = serde_json::from_str(
            r#"{ "steps": [
                { "ticks": 3, "mode": "teleop", "left_y": 0.5,
                  "buttons": [{ "port": 1, "button": 1 }] },
                { "ticks": 2 }
            ] }"#,
        )
        .unwrap();
        assert_eq!(script.total_ticks(), 5);

        let mut ds = ScriptedStation::default();
        ds.load(&script.steps[0]);
        assert_eq!(ds.mode(), RobotMode::Teleop);
        assert_eq!(ds.axis(LEFT_PORT, Y_AXIS), 0.5);
        assert_eq!(ds.axis(RIGHT_PORT, Y_AXIS), 0.0);
        assert!(ds.button(RIGHT_PORT, 1));
        assert!(!ds.button(LEFT_PORT, 1));

        ds.load(&script.steps[1]);
        assert_eq!(ds.mode(), RobotMode::Disabled);
    }

    #[test]
    fn demo_is_nonempty() {
        assert!(Script::demo().total_ticks() > 0);
    }
}
