//! I2C device management for the Tank-Leg Bot.
//!
//! The drive board carries a PCA9685 PWM expander feeding four IN1/IN2 H-bridges
//! and an ICM-42670 gyro, both on one shared I2C bus. [`PcaMotor`] exposes a
//! channel pair of the expander as a [`MotorController`].

use core::cell::RefCell;

use embedded_hal::i2c::I2c;
use embedded_hal_bus::i2c::RefCellDevice;
use icm42670::{Address as ImuAddress, Error as ImuError, Icm42670};
use pwm_pca9685::{Address as PwmAddress, Channel, Error as PwmError, Pca9685};

use super::drivetrain::{IdleMode, MotorController, TankDrive};

/// I2C address of the PWM expander.
pub const PWM_ADDRESS: u8 = 0x40;
/// I2C address of the gyro (AD0 low).
pub const GYRO_ADDRESS: u8 = 0x68;
/// Prescale for ~1.5 kHz motor PWM (smallest value the chip accepts).
pub const PWM_PRESCALE: u8 = 3;
/// Full-scale duty for a 12-bit PCA9685 channel.
pub const MAX_DUTY: u16 = 4095;

/// H-bridge inputs as (IN1, IN2): front-left, front-right, back-left, back-right.
pub const MOTOR_CHANNELS: [(Channel, Channel); 4] = [
    (Channel::C0, Channel::C1),
    (Channel::C2, Channel::C3),
    (Channel::C4, Channel::C5),
    (Channel::C6, Channel::C7),
];

/// Errors that can occur when interacting with I2C-based devices.
#[derive(Debug)]
pub enum DeviceError<E: core::fmt::Debug> {
    PwmError(PwmError<E>),
    ImuError(ImuError<E>),
    ImuNotInitialized,
    PwmNotInitialized,
}

/// Compute the (IN1, IN2) duty pair for a setpoint.
///
/// A zero setpoint maps to both inputs low for coast and both high for brake.
/// A non-finite setpoint is treated as zero.
pub fn duty_pair(
    speed: f32,
    idle: IdleMode,
) -> (u16, u16) {
    if speed == 0.0 || !speed.is_finite() {
        return match idle {
            IdleMode::Coast => (0, 0),
            IdleMode::Brake => (MAX_DUTY, MAX_DUTY),
        };
    }
    let duty = (libm::fabsf(speed).min(1.0) * MAX_DUTY as f32) as u16;
    if speed > 0.0 {
        (duty, 0)
    } else {
        (0, duty)
    }
}

/// Drive one channel; [`MAX_DUTY`] uses the full-on bit so the output never drops low.
fn write_duty<D, E>(
    pca: &mut Pca9685<D>,
    channel: Channel,
    duty: u16,
) -> Result<(), DeviceError<E>>
where
    D: I2c<Error = E>,
    E: core::fmt::Debug,
{
    let written = if duty >= MAX_DUTY {
        pca.set_channel_full_on(channel, 0)
    } else {
        pca.set_channel_on_off(channel, 0, duty)
    };
    written.map_err(DeviceError::PwmError)
}

/// One brushed motor on two channels of a shared PCA9685.
pub struct PcaMotor<'b, D> {
    pwm: &'b RefCell<Pca9685<D>>,
    channels: (Channel, Channel),
    idle: IdleMode,
    speed: f32,
}

impl<'b, D, E> PcaMotor<'b, D>
where
    D: I2c<Error = E>,
    E: core::fmt::Debug,
{
    pub fn new(
        pwm: &'b RefCell<Pca9685<D>>,
        channels: (Channel, Channel),
    ) -> Self {
        Self {
            pwm,
            channels,
            idle: IdleMode::default(),
            speed: 0.0,
        }
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    fn apply(&mut self) -> Result<(), DeviceError<E>> {
        let (in1, in2) = duty_pair(self.speed, self.idle);
        let mut pca = self.pwm.borrow_mut();
        write_duty(&mut pca, self.channels.0, in1)?;
        write_duty(&mut pca, self.channels.1, in2)
    }
}

impl<'b, D, E> MotorController for PcaMotor<'b, D>
where
    D: I2c<Error = E>,
    E: core::fmt::Debug,
{
    type Error = DeviceError<E>;

    fn set(
        &mut self,
        speed: f32,
    ) -> Result<(), Self::Error> {
        self.speed = if speed.is_finite() { speed.clamp(-1.0, 1.0) } else { 0.0 };
        self.apply()
    }

    fn set_idle_mode(
        &mut self,
        mode: IdleMode,
    ) -> Result<(), Self::Error> {
        self.idle = mode;
        if self.speed == 0.0 {
            self.apply()?;
        }
        Ok(())
    }

    fn restore_factory_defaults(&mut self) -> Result<(), Self::Error> {
        self.idle = IdleMode::default();
        self.speed = 0.0;
        self.apply()
    }

    fn idle_mode(&self) -> IdleMode {
        self.idle
    }
}

/// One gyro sample: angular rate per axis in deg/s and die temperature in °C.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GyroSample {
    pub rate: (f32, f32, f32),
    pub temperature: f32,
}

/// PWM expander and gyro sharing one I2C bus.
pub struct DriveBoard<'a, I2C: 'static> {
    i2c: &'a RefCell<I2C>,
    pub pwm: Option<RefCell<Pca9685<RefCellDevice<'a, I2C>>>>,
    imu: Option<Icm42670<RefCellDevice<'a, I2C>>>,
}

impl<'a, I2C, E> DriveBoard<'a, I2C>
where
    I2C: I2c<Error = E> + 'static,
    E: core::fmt::Debug,
{
    pub fn new(i2c_bus: &'a RefCell<I2C>) -> Self {
        DriveBoard {
            i2c: i2c_bus,
            pwm: None,
            imu: None,
        }
    }

    /// Attach the PWM expander and the gyro.
    ///
    /// The expander is required. A gyro that fails to respond is logged and left out.
    pub fn init_devices(&mut self) -> Result<(), DeviceError<E>> {
        let pwm = Pca9685::new(RefCellDevice::new(self.i2c), PwmAddress::from(PWM_ADDRESS))
            .map_err(DeviceError::PwmError)?;
        self.pwm = Some(RefCell::new(pwm));

        match Icm42670::new(RefCellDevice::new(self.i2c), ImuAddress::Primary) {
            Ok(imu) => self.imu = Some(imu),
            Err(e) => tracing::warn!("Gyro init failed, continuing without it: {:?}", e),
        }
        Ok(())
    }

    /// Address every 7-bit device on the bus and log the ones that acknowledge.
    ///
    /// Run when the board fails to come up. Returns how many devices answered.
    pub fn scan_bus(&self) -> usize {
        let mut bus = self.i2c.borrow_mut();
        let mut found = 0;
        for addr in 0x08..=0x77 {
            if bus.write(addr, &[]).is_err() {
                continue;
            }
            found += 1;
            let device = match addr {
                PWM_ADDRESS => "PWM expander",
                GYRO_ADDRESS => "gyro",
                _ => "unknown",
            };
            tracing::warn!("I2C 0x{:02X} answered ({})", addr, device);
        }
        found
    }

    /// Wake the PWM expander and set the motor PWM frequency.
    pub fn configure_pwm(&self) -> Result<(), DeviceError<E>> {
        let pwm = self.pwm.as_ref().ok_or(DeviceError::PwmNotInitialized)?;
        let mut pca = pwm.borrow_mut();
        pca.enable().map_err(DeviceError::PwmError)?;
        tracing::info!("PWM enabled");
        pca.set_prescale(PWM_PRESCALE).map_err(DeviceError::PwmError)?;
        tracing::info!("PWM prescale set to {}", PWM_PRESCALE);
        Ok(())
    }

    pub fn read_gyro(&mut self) -> Result<GyroSample, DeviceError<E>> {
        let imu = self.imu.as_mut().ok_or(DeviceError::ImuNotInitialized)?;
        let rate = imu.gyro_norm().map_err(DeviceError::ImuError)?;
        let temperature = imu.temperature().map_err(DeviceError::ImuError)?;
        Ok(GyroSample {
            rate: (rate.x, rate.y, rate.z),
            temperature,
        })
    }

    /// Log one gyro sample at startup. The drive code never reads the gyro.
    pub fn log_gyro_startup(&mut self) {
        match self.read_gyro() {
            Ok(sample) => tracing::info!(
                "Gyro at rest: {:?} deg/s, {} C",
                sample.rate,
                sample.temperature
            ),
            Err(DeviceError::ImuNotInitialized) => tracing::warn!("Drive board has no gyro"),
            Err(e) => tracing::warn!("Gyro read failed: {:?}", e),
        }
    }

    pub fn has_gyro(&self) -> bool {
        self.imu.is_some()
    }

    /// Build the four drivetrain motors on [`MOTOR_CHANNELS`].
    #[allow(clippy::type_complexity)]
    pub fn tank_drive(&self) -> Result<TankDrive<PcaMotor<'_, RefCellDevice<'a, I2C>>>, DeviceError<E>> {
        let pwm = self.pwm.as_ref().ok_or(DeviceError::PwmNotInitialized)?;
        let [fl, fr, bl, br] = MOTOR_CHANNELS;
        Ok(TankDrive::new(
            PcaMotor::new(pwm, fl),
            PcaMotor::new(pwm, fr),
            PcaMotor::new(pwm, bl),
            PcaMotor::new(pwm, br),
        ))
    }
}
