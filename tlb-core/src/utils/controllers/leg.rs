//! Pneumatic leg control for the Tank-Leg Bot.
//!
//! The leg is a double-acting cylinder behind a double solenoid valve: one
//! digital output pressurises the extend side, the other the retract side.

use embedded_hal::digital::OutputPin;
use serde::{Deserialize, Serialize};

/// The two positions of the leg cylinder.
#[derive(Debug, Default, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LegPosition {
    #[default]
    Retracted,
    Extended,
}

impl LegPosition {
    pub fn toggled(self) -> Self {
        match self {
            LegPosition::Retracted => LegPosition::Extended,
            LegPosition::Extended => LegPosition::Retracted,
        }
    }
}

/// Two-position leg actuator over a pair of valve outputs.
///
/// The position is assumed `Retracted` until [`init`](Self::init) drives the
/// valve there; the valve has no position feedback.
pub struct Leg<Pin> {
    forward: Pin,
    reverse: Pin,
    position: LegPosition,
}

impl<Pin, E> Leg<Pin>
where
    Pin: OutputPin<Error = E>,
{
    /// Create a new `Leg` over the forward (extend) and reverse (retract) outputs.
    pub fn new(
        forward: Pin,
        reverse: Pin,
    ) -> Self {
        Self {
            forward,
            reverse,
            position: LegPosition::Retracted,
        }
    }

    /// Drive the valve to the assumed startup position.
    pub fn init(&mut self) -> Result<(), E> {
        self.set(LegPosition::Retracted)
    }

    pub fn toggle(&mut self) -> Result<LegPosition, E> {
        let next = self.position.toggled();
        self.set(next)?;
        Ok(next)
    }

    pub fn set(
        &mut self,
        position: LegPosition,
    ) -> Result<(), E> {
        match position {
            LegPosition::Extended => {
                self.reverse.set_low()?;
                self.forward.set_high()?;
            }
            LegPosition::Retracted => {
                self.forward.set_low()?;
                self.reverse.set_high()?;
            }
        }
        self.position = position;
        Ok(())
    }

    pub fn position(&self) -> LegPosition {
        self.position
    }

    /// Give back the valve outputs.
    pub fn release(self) -> (Pin, Pin) {
        (self.forward, self.reverse)
    }
}
