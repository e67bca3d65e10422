//! Module Exports
//!
//! This file exports the hardware bindings and the robot container that wires
//! them to operator input.
//!
//! - `drivetrain`: four-motor tank drive and the motor controller trait
//! - `i2c`: PCA9685 motor outputs and gyro on the shared I2C bus
//! - `leg`: double-solenoid pneumatic leg

pub mod drivetrain;
/// Module for managing I2C-connected devices.
pub mod i2c;
pub mod leg;

use embedded_hal::digital::OutputPin;

pub use drivetrain::{IdleMode, MotorController, TankDrive};
pub use leg::{Leg, LegPosition};

use crate::utils::input::{
    bindings::{default_bindings, Action, ButtonBinding, ButtonMap},
    teleop::{DriveCommand, DriveConfig, ModeFlags, TeleopDrive},
    DriverStation, LEFT_PORT, RIGHT_PORT, Y_AXIS,
};

/// Everything the robot owns, evaluated once per scheduler tick.
///
/// Construction only stores the handles; [`init`](Self::init) touches hardware.
pub struct Robot<M, P> {
    drive: TankDrive<M>,
    leg: Leg<P>,
    teleop: TeleopDrive,
    modes: ModeFlags,
    bindings: [ButtonBinding; 3],
}

impl<M, P, PE> Robot<M, P>
where
    M: MotorController,
    P: OutputPin<Error = PE>,
    PE: core::fmt::Debug,
{
    pub fn new(
        drive: TankDrive<M>,
        leg: Leg<P>,
        config: DriveConfig,
        buttons: ButtonMap,
    ) -> Self {
        Self {
            drive,
            leg,
            teleop: TeleopDrive::new(config),
            modes: ModeFlags::default(),
            bindings: default_bindings(&buttons),
        }
    }

    /// Bring the hardware to a known state.
    pub fn init(&mut self) {
        self.configure_drive();
        if let Err(e) = self.leg.init() {
            tracing::error!("Failed to retract leg: {:?}", e);
        }
        tracing::info!(modes = ?self.modes, "Robot initialized");
    }

    /// Run one scheduler cycle: button bindings, then the drive command.
    pub fn tick<D: DriverStation>(
        &mut self,
        ds: &D,
    ) -> DriveCommand {
        let mode = ds.mode();

        for i in 0..self.bindings.len() {
            if let Some(action) = self.bindings[i].poll(ds) {
                if mode.is_enabled() {
                    self.run(action);
                } else {
                    tracing::debug!(?action, "Ignoring binding while disabled");
                }
            }
        }

        let left = ds.axis(LEFT_PORT, Y_AXIS);
        let right = -ds.axis(RIGHT_PORT, Y_AXIS);
        let command = self
            .teleop
            .calculate(left, right, &self.modes, mode.is_teleop_enabled());

        if let Err(e) = self.drive.spin(command.left, command.right) {
            tracing::error!("Drive command failed: {:?}", e);
        }
        command
    }

    pub fn run(
        &mut self,
        action: Action,
    ) {
        match action {
            Action::ToggleLeg => match self.leg.toggle() {
                Ok(position) => tracing::info!(?position, "Leg toggled"),
                Err(e) => tracing::error!("Leg toggle failed: {:?}", e),
            },
            Action::ToggleCoast => {
                self.modes.coast_enabled = !self.modes.coast_enabled;
                tracing::info!("Coast Enabled: {}", self.modes.coast_enabled);
                self.configure_drive();
            }
            Action::ToggleLimiter => {
                self.modes.limiter_enabled = !self.modes.limiter_enabled;
                tracing::info!("Limiter Enabled: {}", self.modes.limiter_enabled);
            }
        }
    }

    /// Factory reset every motor, then apply the current idle mode.
    fn configure_drive(&mut self) {
        if let Err(e) = self.drive.configure(self.modes.coast_enabled) {
            tracing::error!("Drivetrain configuration failed: {:?}", e);
        }
    }

    pub fn modes(&self) -> ModeFlags {
        self.modes
    }

    pub fn drive(&self) -> &TankDrive<M> {
        &self.drive
    }

    pub fn leg(&self) -> &Leg<P> {
        &self.leg
    }

    /// Take the drivetrain and leg back out of the robot.
    pub fn into_parts(self) -> (TankDrive<M>, Leg<P>) {
        (self.drive, self.leg)
    }
}
