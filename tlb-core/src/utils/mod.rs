//! Utility re-exports for the Tank-Leg Bot.
//!
//! - `controllers`: drivetrain, leg and I2C hardware bindings plus the robot container
//! - `input`: driver station access, button bindings and teleop mapping
//! - `math`: deadband and slew-rate filters

pub mod controllers;
pub mod input;
pub mod math;

pub use controllers::Robot;
pub use input::{DriverStation, RobotMode};
pub use math::filters::{deadband, SlewRateLimiter};
