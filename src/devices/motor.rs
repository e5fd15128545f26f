//! Phase/enable motor driver
//!
//! Drives a DC motor through an H-bridge in phase/enable mode, as on the
//! Romi motor driver board (DRV8838):
//!
//! | nSLEEP | DIR | PWM  | Motor State                 |
//! |--------|-----|------|-----------------------------|
//! | 0      | x   | x    | Coast (driver asleep)       |
//! | 1      | 0   | duty | Forward (speed = duty)      |
//! | 1      | 1   | duty | Reverse (speed = duty)      |
//!
//! Pins are any embedded-hal 1.0 implementation.

use embedded_hal::digital::OutputPin;
use embedded_hal::pwm::SetDutyCycle;
use libm::fabsf;

use super::traits::{check_effort, MotorDriver};
use crate::core::error::DeviceError;

/// Phase/enable H-bridge motor
pub struct PhaseEnableMotor<P, D, S>
where
    P: SetDutyCycle,
    D: OutputPin,
    S: OutputPin,
{
    pwm: P,
    dir: D,
    sleep: S,
    effort: f32,
}

impl<P, D, S> PhaseEnableMotor<P, D, S>
where
    P: SetDutyCycle,
    D: OutputPin,
    S: OutputPin,
{
    /// Take the pins and put the driver to sleep with zero duty
    pub fn new(pwm: P, dir: D, sleep: S) -> Result<Self, DeviceError> {
        let mut motor = Self {
            pwm,
            dir,
            sleep,
            effort: 0.0,
        };
        motor.sleep.set_low().map_err(|_| DeviceError::Pin)?;
        motor.dir.set_low().map_err(|_| DeviceError::Pin)?;
        motor
            .pwm
            .set_duty_cycle_fully_off()
            .map_err(|_| DeviceError::Pin)?;
        Ok(motor)
    }

    /// Last effort applied
    pub fn effort(&self) -> f32 {
        self.effort
    }

    /// Release the pins
    pub fn release(self) -> (P, D, S) {
        (self.pwm, self.dir, self.sleep)
    }

    fn set_duty_percent(&mut self, percent: f32) -> Result<(), DeviceError> {
        let max = self.pwm.max_duty_cycle() as f32;
        let duty = (percent / 100.0 * max) as u16;
        self.pwm.set_duty_cycle(duty).map_err(|_| DeviceError::Pin)
    }
}

impl<P, D, S> MotorDriver for PhaseEnableMotor<P, D, S>
where
    P: SetDutyCycle,
    D: OutputPin,
    S: OutputPin,
{
    fn enable(&mut self) -> Result<(), DeviceError> {
        self.sleep.set_high().map_err(|_| DeviceError::Pin)
    }

    fn disable(&mut self) -> Result<(), DeviceError> {
        self.sleep.set_low().map_err(|_| DeviceError::Pin)?;
        self.pwm
            .set_duty_cycle_fully_off()
            .map_err(|_| DeviceError::Pin)?;
        self.effort = 0.0;
        Ok(())
    }

    fn set_effort(&mut self, effort: f32) -> Result<(), DeviceError> {
        let effort = check_effort(effort)?;

        if effort == 0.0 {
            self.sleep.set_low().map_err(|_| DeviceError::Pin)?;
            self.set_duty_percent(0.0)?;
        } else {
            self.sleep.set_high().map_err(|_| DeviceError::Pin)?;
            if effort > 0.0 {
                self.dir.set_low().map_err(|_| DeviceError::Pin)?;
            } else {
                self.dir.set_high().map_err(|_| DeviceError::Pin)?;
            }
            self.set_duty_percent(fabsf(effort))?;
        }
        self.effort = effort;
        Ok(())
    }
}
