//! Simulated bus and outputs that log instead of touching hardware.

use std::convert::Infallible;

use embedded_hal::{
    digital::{ErrorType as PinErrorType, OutputPin},
    i2c::{ErrorType as I2cErrorType, I2c, Operation},
};
use tracing::{debug, trace};

const IMU_ADDRESS: u8 = 0x68;
const IMU_WHO_AM_I: u8 = 0x75;
const IMU_DEVICE_ID: u8 = 0x67;

/// I2C bus that acknowledges every write and answers the gyro's identity probe.
#[derive(Debug, Default)]
pub struct SimI2c {
    pub writes: usize,
}

impl I2cErrorType for SimI2c {
    type Error = Infallible;
}

impl I2c for SimI2c {
    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        let mut register = None;
        for op in operations.iter_mut() {
            match op {
                Operation::Write(bytes) => {
                    self.writes += 1;
                    register = bytes.first().copied();
                    trace!("i2c write 0x{:02X}: {:02X?}", address, bytes);
                }
                Operation::Read(buf) => {
                    buf.fill(0);
                    if address == IMU_ADDRESS && register == Some(IMU_WHO_AM_I) {
                        if let Some(first) = buf.first_mut() {
                            *first = IMU_DEVICE_ID;
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

/// Digital output that logs level changes.
#[derive(Debug)]
pub struct SimPin {
    name: &'static str,
    high: bool,
}

impl SimPin {
    pub fn new(name: &'static str) -> Self {
        Self { name, high: false }
    }

    pub fn is_high(&self) -> bool {
        self.high
    }

    fn drive(
        &mut self,
        high: bool,
    ) {
        if self.high != high {
            debug!(pin = self.name, high, "valve output");
        }
        self.high = high;
    }
}

impl PinErrorType for SimPin {
    type Error = Infallible;
}

impl OutputPin for SimPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.drive(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.drive(true);
        Ok(())
    }
}
