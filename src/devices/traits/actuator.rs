//! Actuator traits

use core::cell::RefCell;

use crate::core::error::DeviceError;

/// Largest effort magnitude a motor accepts (percent duty)
pub const EFFORT_RANGE: f32 = 100.0;

/// Motor driver interface
///
/// Effort is a signed duty cycle in percent:
/// - `+100.0` = full forward
/// - `0.0` = stopped (driver asleep)
/// - `-100.0` = full reverse
pub trait MotorDriver {
    /// Wake the driver
    fn enable(&mut self) -> Result<(), DeviceError>;

    /// Put the driver to sleep; the motor coasts
    fn disable(&mut self) -> Result<(), DeviceError>;

    /// Set signed effort.
    ///
    /// # Errors
    ///
    /// Returns `DeviceError::InvalidReading` if effort is outside
    /// [-100, 100] or not finite; the output is left unchanged.
    fn set_effort(&mut self, effort: f32) -> Result<(), DeviceError>;
}

/// A motor shared between the task that drives it and the safety action
/// that cuts it off.
///
/// Tasks and the supervisor never run at the same time, so the borrow is
/// always free; a conflicting borrow is reported as a bus error instead of
/// panicking.
impl<M: MotorDriver> MotorDriver for &RefCell<M> {
    fn enable(&mut self) -> Result<(), DeviceError> {
        self.try_borrow_mut()
            .map_err(|_| DeviceError::Bus)?
            .enable()
    }

    fn disable(&mut self) -> Result<(), DeviceError> {
        self.try_borrow_mut()
            .map_err(|_| DeviceError::Bus)?
            .disable()
    }

    fn set_effort(&mut self, effort: f32) -> Result<(), DeviceError> {
        self.try_borrow_mut()
            .map_err(|_| DeviceError::Bus)?
            .set_effort(effort)
    }
}

/// Check an effort command
pub fn check_effort(effort: f32) -> Result<f32, DeviceError> {
    if effort.is_finite() && (-EFFORT_RANGE..=EFFORT_RANGE).contains(&effort) {
        Ok(effort)
    } else {
        Err(DeviceError::InvalidReading)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn effort_range() {
        assert_eq!(check_effort(100.0), Ok(100.0));
        assert_eq!(check_effort(-100.0), Ok(-100.0));
        assert_eq!(check_effort(100.5), Err(DeviceError::InvalidReading));
        assert_eq!(check_effort(f32::NAN), Err(DeviceError::InvalidReading));
    }
}
