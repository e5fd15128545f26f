//! Motor cutoff run when the loop stops

use crate::core::supervisor::{SafetyAction, StopReason};
use crate::devices::traits::MotorDriver;

use super::shares::RoverShares;

/// Zeroes the effort shares and puts both motor drivers to sleep.
///
/// The motors are normally shared with [`MotorControlTask`] through
/// `&RefCell<M>`; the supervisor only engages this after the scheduler has
/// returned, so the borrow is free.
///
/// [`MotorControlTask`]: super::tasks::MotorControlTask
pub struct ActuatorCutoff<'a, L: MotorDriver, R: MotorDriver> {
    shares: &'a RoverShares,
    left: L,
    right: R,
    engaged: u32,
}

impl<'a, L: MotorDriver, R: MotorDriver> ActuatorCutoff<'a, L, R> {
    /// Cut off `left` and `right` and zero the effort shares in `shares`
    pub fn new(shares: &'a RoverShares, left: L, right: R) -> Self {
        Self {
            shares,
            left,
            right,
            engaged: 0,
        }
    }

    /// Times the cutoff has been engaged
    pub fn engaged_count(&self) -> u32 {
        self.engaged
    }
}

impl<L: MotorDriver, R: MotorDriver> SafetyAction for ActuatorCutoff<'_, L, R> {
    fn engage(&mut self, reason: StopReason) {
        self.engaged += 1;
        self.shares.stop_efforts();
        self.shares.line_following.put(false);

        // Both drivers get their disable call even if the first one fails.
        let left = self.left.disable();
        let right = self.right.disable();
        if let Err(e) = left {
            crate::log_error!("Left motor cutoff failed: {}", e);
        }
        if let Err(e) = right {
            crate::log_error!("Right motor cutoff failed: {}", e);
        }
        crate::log_warn!("Motors cut off: {}", reason);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::DeviceError;
    use crate::devices::mock::MockMotor;
    use core::cell::RefCell;

    #[test]
    fn cutoff_stops_everything() {
        let shares = RoverShares::new();
        let left = RefCell::new(MockMotor::new());
        let right = RefCell::new(MockMotor::new());
        left.borrow_mut().enable().unwrap();
        right.borrow_mut().enable().unwrap();
        left.borrow_mut().set_effort(40.0).unwrap();
        shares.left_effort.put(40.0);
        shares.line_following.put(true);

        let mut cutoff = ActuatorCutoff::new(&shares, &left, &right);
        cutoff.engage(StopReason::Shutdown);

        assert_eq!(cutoff.engaged_count(), 1);
        assert_eq!(shares.left_effort.get(), 0.0);
        assert!(!shares.line_following.get());
        assert!(!left.borrow().is_enabled());
        assert_eq!(left.borrow().effort(), 0.0);
        assert!(!right.borrow().is_enabled());
    }

    #[test]
    fn failing_left_motor_still_cuts_right() {
        let shares = RoverShares::new();
        let left = RefCell::new(MockMotor::new());
        let right = RefCell::new(MockMotor::new());
        right.borrow_mut().enable().unwrap();
        left.borrow_mut().fail_with(Some(DeviceError::Pin));

        let mut cutoff = ActuatorCutoff::new(&shares, &left, &right);
        cutoff.engage(StopReason::PassLimit);
        assert!(!right.borrow().is_enabled());
    }
}
