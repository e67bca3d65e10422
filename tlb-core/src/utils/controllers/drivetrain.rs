//! Tank drivetrain binding.
//!
//! Four motors (front/back x left/right) are driven as two sides. Both motors on
//! a side always receive the same setpoint, and all four share one idle mode.

use serde::{Deserialize, Serialize};

/// Behaviour of a motor output when its setpoint is zero.
#[derive(Debug, Default, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum IdleMode {
    /// Outputs float; the wheels spin down freely.
    #[default]
    Coast,
    /// Outputs are shorted; the wheels resist motion.
    Brake,
}

impl IdleMode {
    pub fn from_coast(coast: bool) -> Self {
        if coast {
            IdleMode::Coast
        } else {
            IdleMode::Brake
        }
    }
}

/// A single motor controller channel.
pub trait MotorController {
    type Error: core::fmt::Debug;

    /// Command a normalized setpoint in `[-1.0, 1.0]`.
    fn set(
        &mut self,
        speed: f32,
    ) -> Result<(), Self::Error>;

    fn set_idle_mode(
        &mut self,
        mode: IdleMode,
    ) -> Result<(), Self::Error>;

    /// Return the controller to its factory configuration.
    fn restore_factory_defaults(&mut self) -> Result<(), Self::Error>;

    fn idle_mode(&self) -> IdleMode;
}

/// Four-motor skid-steer drivetrain.
pub struct TankDrive<M> {
    front_left: M,
    front_right: M,
    back_left: M,
    back_right: M,
}

impl<M> TankDrive<M>
where
    M: MotorController,
{
    pub fn new(
        front_left: M,
        front_right: M,
        back_left: M,
        back_right: M,
    ) -> Self {
        Self {
            front_left,
            front_right,
            back_left,
            back_right,
        }
    }

    /// Drive the left side at `left` and the right side at `right`.
    pub fn spin(
        &mut self,
        left: f32,
        right: f32,
    ) -> Result<(), M::Error> {
        self.front_left.set(left)?;
        self.back_left.set(left)?;
        self.front_right.set(right)?;
        self.back_right.set(right)?;
        Ok(())
    }

    /// Apply coast or brake to every motor, in order.
    ///
    /// Stops at the first failing motor; motors already updated keep the new mode.
    pub fn set_idle_mode(
        &mut self,
        coast: bool,
    ) -> Result<(), M::Error> {
        let mode = IdleMode::from_coast(coast);
        for motor in self.motors_mut() {
            motor.set_idle_mode(mode)?;
        }
        Ok(())
    }

    pub fn reset_to_factory_defaults(&mut self) -> Result<(), M::Error> {
        for motor in self.motors_mut() {
            motor.restore_factory_defaults()?;
        }
        Ok(())
    }

    /// Factory reset followed by the requested idle mode.
    pub fn configure(
        &mut self,
        coast: bool,
    ) -> Result<(), M::Error> {
        self.reset_to_factory_defaults()?;
        self.set_idle_mode(coast)
    }

    /// Idle modes in front-left, front-right, back-left, back-right order.
    pub fn idle_modes(&self) -> [IdleMode; 4] {
        [
            self.front_left.idle_mode(),
            self.front_right.idle_mode(),
            self.back_left.idle_mode(),
            self.back_right.idle_mode(),
        ]
    }

    pub fn motors(&self) -> [&M; 4] {
        [
            &self.front_left,
            &self.front_right,
            &self.back_left,
            &self.back_right,
        ]
    }

    fn motors_mut(&mut self) -> [&mut M; 4] {
        [
            &mut self.front_left,
            &mut self.front_right,
            &mut self.back_left,
            &mut self.back_right,
        ]
    }
}
