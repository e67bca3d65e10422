//! Stick-to-drivetrain mapping for teleoperated driving.

use serde::{Deserialize, Serialize};

use crate::utils::math::filters::{deadband, SlewRateLimiter};

/// Drive tuning.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct DriveConfig {
    /// Stick values below this magnitude are treated as zero.
    pub deadband: f32,
    /// Output scale while the speed limiter is on.
    pub precision_scale: f32,
    /// Output scale while the speed limiter is off.
    pub full_scale: f32,
    /// Maximum command change, in units per second.
    pub slew_rate: f32,
    /// Scheduler tick period in seconds.
    pub period: f32,
}

impl Default for DriveConfig {
    fn default() -> Self {
        Self {
            deadband: 0.1,
            precision_scale: 0.3,
            full_scale: 0.8,
            slew_rate: 6.0,
            period: 0.02,
        }
    }
}

/// A [`DriveConfig`] field holding a value the mapper cannot run with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// Must be finite and greater than zero.
    Period,
    /// Must be finite, and `slew_rate * period` must be finite.
    SlewRate,
    /// Must be finite and within `[0.0, 1.0]`.
    Deadband,
    PrecisionScale,
    FullScale,
}

impl core::fmt::Display for ConfigError {
    fn fmt(
        &self,
        f: &mut core::fmt::Formatter<'_>,
    ) -> core::fmt::Result {
        match self {
            ConfigError::Period => write!(f, "period must be finite and > 0"),
            ConfigError::SlewRate => write!(f, "slew_rate must be finite"),
            ConfigError::Deadband => write!(f, "deadband must be within [0, 1]"),
            ConfigError::PrecisionScale => write!(f, "precision_scale must be within [0, 1]"),
            ConfigError::FullScale => write!(f, "full_scale must be within [0, 1]"),
        }
    }
}

fn unit(value: f32) -> bool {
    value.is_finite() && (0.0..=1.0).contains(&value)
}

impl DriveConfig {
    /// Check every field against the range the mapper relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.period.is_finite() && self.period > 0.0) {
            return Err(ConfigError::Period);
        }
        if !(self.slew_rate.is_finite() && (self.slew_rate * self.period).is_finite()) {
            return Err(ConfigError::SlewRate);
        }
        if !unit(self.deadband) {
            return Err(ConfigError::Deadband);
        }
        if !unit(self.precision_scale) {
            return Err(ConfigError::PrecisionScale);
        }
        if !unit(self.full_scale) {
            return Err(ConfigError::FullScale);
        }
        Ok(())
    }
}

/// Operator-toggled modes.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct ModeFlags {
    pub limiter_enabled: bool,
    pub coast_enabled: bool,
}

impl Default for ModeFlags {
    fn default() -> Self {
        Self {
            limiter_enabled: true,
            coast_enabled: false,
        }
    }
}

/// Left/right side setpoints for one tick.
#[derive(Debug, Default, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct DriveCommand {
    pub left: f32,
    pub right: f32,
}

/// Deadband, speed cap and slew limiting for the two drive axes.
pub struct TeleopDrive {
    config: DriveConfig,
    left: SlewRateLimiter,
    right: SlewRateLimiter,
}

impl TeleopDrive {
    pub fn new(config: DriveConfig) -> Self {
        Self {
            config,
            left: SlewRateLimiter::new(config.slew_rate, config.period),
            right: SlewRateLimiter::new(config.slew_rate, config.period),
        }
    }

    pub fn scale(
        &self,
        modes: &ModeFlags,
    ) -> f32 {
        if modes.limiter_enabled {
            self.config.precision_scale
        } else {
            self.config.full_scale
        }
    }

    /// Map raw stick values to a drive command.
    ///
    /// `right` is expected already sign-corrected. Outside teleop the command is
    /// zero and both limiters are reset to rest.
    pub fn calculate(
        &mut self,
        left: f32,
        right: f32,
        modes: &ModeFlags,
        teleop_enabled: bool,
    ) -> DriveCommand {
        if !teleop_enabled {
            self.left.reset(0.0);
            self.right.reset(0.0);
            return DriveCommand::default();
        }

        let scale = self.scale(modes);
        DriveCommand {
            left: self.left.calculate(deadband(left, self.config.deadband) * scale),
            right: self.right.calculate(deadband(right, self.config.deadband) * scale),
        }
    }
}
