//! Sensor traits and the raw-hardware traits the generic drivers build on

use crate::core::error::DeviceError;
use crate::core::traits::time::{Micros, Millis};

/// Wheel encoder
pub trait Encoder {
    /// Sample the hardware counter and accumulate the change
    fn update(&mut self, now_us: Micros) -> Result<(), DeviceError>;

    /// Accumulated position in counts
    fn position(&self) -> i32;

    /// Velocity over the last update in counts per second
    fn velocity(&self) -> f32;

    /// Restart position counting at zero
    fn zero(&mut self) -> Result<(), DeviceError>;
}

/// Reflectance sensor array under the robot
pub trait LineArray {
    /// Record the current readings as the white (floor) reference
    fn capture_white(&mut self) -> Result<(), DeviceError>;

    /// Record the current readings as the black (line) reference
    fn capture_black(&mut self) -> Result<(), DeviceError>;

    /// Line position as a fractional sensor index, `None` if no sensor
    /// sees the line
    fn centroid(&mut self) -> Result<Option<f32>, DeviceError>;
}

/// Contact switch on the bumper
pub trait BumpSwitch {
    /// Debounced contact state
    fn pressed(&mut self, now: Millis) -> Result<bool, DeviceError>;
}

/// Per-subsystem calibration levels reported by a fusion IMU (0-3 each)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CalibrationStatus {
    pub system: u8,
    pub gyro: u8,
    pub accel: u8,
    pub mag: u8,
}

impl CalibrationStatus {
    /// Decode the packed calibration byte (2 bits per subsystem)
    pub const fn from_register(status: u8) -> Self {
        Self {
            system: (status >> 6) & 0x03,
            gyro: (status >> 4) & 0x03,
            accel: (status >> 2) & 0x03,
            mag: status & 0x03,
        }
    }

    /// True if gyro, accelerometer and magnetometer all reached `min`
    pub const fn sensors_at_least(&self, min: u8) -> bool {
        self.gyro >= min && self.accel >= min && self.mag >= min
    }
}

/// Absolute heading source
pub trait HeadingSensor {
    /// Heading in degrees, [0, 360)
    fn heading_deg(&mut self) -> Result<f32, DeviceError>;

    /// Calibration state
    fn calibration(&mut self) -> Result<CalibrationStatus, DeviceError>;
}

/// Hardware quadrature counter (timer in encoder mode)
pub trait Counter {
    /// Current counter value, in `0..=auto_reload`
    fn count(&mut self) -> Result<u32, DeviceError>;

    /// Value at which the counter wraps back to 0
    fn auto_reload(&self) -> u32;
}

/// Single ADC input
pub trait AdcChannel {
    /// Raw conversion result
    fn read_raw(&mut self) -> Result<u16, DeviceError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn calibration_register_decode() {
        let status = CalibrationStatus::from_register(0b11_10_01_11);
        assert_eq!(
            status,
            CalibrationStatus {
                system: 3,
                gyro: 2,
                accel: 1,
                mag: 3
            }
        );
        assert!(status.sensors_at_least(1));
        assert!(!status.sensors_at_least(2));
    }
}
