//! Edge-triggered button bindings.
//!
//! Each [`ButtonBinding`] pairs a [`Signal`] with the value it had on the
//! previous tick and the [`Action`] to run when the signal goes from released
//! to held. Holding a button fires its action once.

use serde::{Deserialize, Serialize};

use super::{DriverStation, JoystickButton, RIGHT_PORT};

/// Boolean input a binding watches.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Signal {
    Button { button: JoystickButton },
    /// Both buttons held at once.
    Both {
        first: JoystickButton,
        second: JoystickButton,
    },
}

impl Signal {
    pub fn get<D: DriverStation>(
        &self,
        ds: &D,
    ) -> bool {
        match self {
            Signal::Button { button } => button.get(ds),
            Signal::Both { first, second } => first.get(ds) && second.get(ds),
        }
    }
}

/// Operator actions bound to buttons.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    ToggleLeg,
    ToggleCoast,
    ToggleLimiter,
}

/// Button numbers for the operator actions, all on the right stick.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct ButtonMap {
    pub kick: u8,
    pub limiter: (u8, u8),
    pub coast: u8,
}

impl Default for ButtonMap {
    fn default() -> Self {
        Self {
            kick: 1,
            limiter: (5, 6),
            coast: 11,
        }
    }
}

/// A signal, its last sampled value, and the action fired on its rising edge.
#[derive(Debug, Clone, Copy)]
pub struct ButtonBinding {
    signal: Signal,
    last: bool,
    action: Action,
}

impl ButtonBinding {
    pub fn new(
        signal: Signal,
        action: Action,
    ) -> Self {
        Self {
            signal,
            last: false,
            action,
        }
    }

    /// Sample the signal; returns the action if it just became held.
    pub fn poll<D: DriverStation>(
        &mut self,
        ds: &D,
    ) -> Option<Action> {
        let now = self.signal.get(ds);
        let rising = now && !self.last;
        self.last = now;
        rising.then_some(self.action)
    }
}

/// The operator binding table.
pub fn default_bindings(map: &ButtonMap) -> [ButtonBinding; 3] {
    let button = |b| JoystickButton::new(RIGHT_PORT, b);
    [
        ButtonBinding::new(
            Signal::Button {
                button: button(map.kick),
            },
            Action::ToggleLeg,
        ),
        ButtonBinding::new(
            Signal::Button {
                button: button(map.coast),
            },
            Action::ToggleCoast,
        ),
        ButtonBinding::new(
            Signal::Both {
                first: button(map.limiter.0),
                second: button(map.limiter.1),
            },
            Action::ToggleLimiter,
        ),
    ]
}
