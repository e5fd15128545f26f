//! Motor control task
//!
//! Applies the effort shares to the two motor drivers.
//!
//! ```text
//! Init ──▶ Standby ──(any effort != 0)──▶ Run
//!             ▲                            │
//!             └──────(both efforts 0)──────┘
//! Recover (effort rejected by a driver) ──▶ Standby
//! ```

use crate::core::error::FaultCause;
use crate::core::scheduler::{Resumable, Step};
use crate::core::share::Share;
use crate::core::traits::time::Millis;
use crate::devices::traits::MotorDriver;

use super::recoverable;

/// Motor control states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MotorState {
    /// Drivers not yet enabled
    Init,
    /// Both efforts zero, drivers idle
    Standby,
    /// Efforts applied every resumption
    Run,
    /// A driver rejected an effort
    Recover,
}

impl MotorState {
    /// Short name for logs
    pub const fn label(self) -> &'static str {
        match self {
            MotorState::Init => "init",
            MotorState::Standby => "standby",
            MotorState::Run => "run",
            MotorState::Recover => "recover",
        }
    }
}

/// Drives the left and right motors from the effort shares
pub struct MotorControlTask<'a, L: MotorDriver, R: MotorDriver> {
    left: L,
    right: R,
    left_effort: &'a Share<f32>,
    right_effort: &'a Share<f32>,
    state: MotorState,
}

impl<'a, L: MotorDriver, R: MotorDriver> MotorControlTask<'a, L, R> {
    /// Create the task; the drivers are enabled on the first resumption
    pub fn new(
        left: L,
        right: R,
        left_effort: &'a Share<f32>,
        right_effort: &'a Share<f32>,
    ) -> Self {
        Self {
            left,
            right,
            left_effort,
            right_effort,
            state: MotorState::Init,
        }
    }

    /// Current state
    pub fn state(&self) -> MotorState {
        self.state
    }

    fn transition(&mut self, next: MotorState) {
        crate::log_debug!("Motor control: {} -> {}", self.state.label(), next.label());
        self.state = next;
    }

    fn apply(&mut self, left: f32, right: f32) -> Result<bool, FaultCause> {
        let left_ok = recoverable(self.left.set_effort(left))?.is_some();
        let right_ok = recoverable(self.right.set_effort(right))?.is_some();
        Ok(left_ok && right_ok)
    }
}

impl<L: MotorDriver, R: MotorDriver> Resumable for MotorControlTask<'_, L, R> {
    fn resume(&mut self, _now: Millis) -> Result<Step, FaultCause> {
        match self.state {
            MotorState::Init => {
                self.left.enable()?;
                self.right.enable()?;
                crate::log_info!("Motor control started");
                self.transition(MotorState::Standby);
            }
            MotorState::Standby => {
                if self.left_effort.get() != 0.0 || self.right_effort.get() != 0.0 {
                    self.transition(MotorState::Run);
                }
            }
            MotorState::Run => {
                let left = self.left_effort.get();
                let right = self.right_effort.get();
                if !self.apply(left, right)? {
                    self.transition(MotorState::Recover);
                } else if left == 0.0 && right == 0.0 {
                    self.transition(MotorState::Standby);
                }
            }
            MotorState::Recover => {
                crate::log_warn!(
                    "Motor control: effort rejected ({}, {}), stopping",
                    self.left_effort.get(),
                    self.right_effort.get()
                );
                self.left_effort.put(0.0);
                self.right_effort.put(0.0);
                self.left.set_effort(0.0)?;
                self.right.set_effort(0.0)?;
                self.transition(MotorState::Standby);
            }
        }
        Ok(Step::Yield)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::DeviceError;
    use crate::devices::mock::MockMotor;
    use core::cell::RefCell;

    fn efforts() -> (Share<f32>, Share<f32>) {
        (
            Share::new("Left Effort", 0.0, false).unwrap(),
            Share::new("Right Effort", 0.0, false).unwrap(),
        )
    }

    #[test]
    fn enables_motors_then_idles() {
        let (l, r) = efforts();
        let left = RefCell::new(MockMotor::new());
        let right = RefCell::new(MockMotor::new());
        let mut task = MotorControlTask::new(&left, &right, &l, &r);

        task.resume(0).unwrap();
        assert_eq!(task.state(), MotorState::Standby);
        assert!(left.borrow().is_enabled());
        assert!(right.borrow().is_enabled());

        task.resume(25).unwrap();
        assert_eq!(task.state(), MotorState::Standby);
        assert_eq!(left.borrow().commands(), 0);
    }

    #[test]
    fn runs_while_effort_nonzero() {
        let (l, r) = efforts();
        let left = RefCell::new(MockMotor::new());
        let right = RefCell::new(MockMotor::new());
        let mut task = MotorControlTask::new(&left, &right, &l, &r);
        task.resume(0).unwrap();

        // Reverse alone also starts the motors
        l.put(-20.0);
        task.resume(25).unwrap();
        assert_eq!(task.state(), MotorState::Run);
        task.resume(50).unwrap();
        assert_eq!(left.borrow().effort(), -20.0);
        assert_eq!(right.borrow().effort(), 0.0);

        l.put(0.0);
        task.resume(75).unwrap();
        assert_eq!(task.state(), MotorState::Standby);
        assert_eq!(left.borrow().effort(), 0.0);
    }

    #[test]
    fn rejected_effort_recovers() {
        let (l, r) = efforts();
        let left = RefCell::new(MockMotor::new());
        let right = RefCell::new(MockMotor::new());
        let mut task = MotorControlTask::new(&left, &right, &l, &r);
        task.resume(0).unwrap();

        l.put(30.0);
        r.put(250.0);
        task.resume(25).unwrap();
        task.resume(50).unwrap();
        assert_eq!(task.state(), MotorState::Recover);

        task.resume(75).unwrap();
        assert_eq!(task.state(), MotorState::Standby);
        assert_eq!(l.get(), 0.0);
        assert_eq!(r.get(), 0.0);
        assert_eq!(left.borrow().effort(), 0.0);
    }

    #[test]
    fn driver_failure_is_a_fault() {
        let (l, r) = efforts();
        let left = RefCell::new(MockMotor::new());
        let right = RefCell::new(MockMotor::new());
        let mut task = MotorControlTask::new(&left, &right, &l, &r);
        task.resume(0).unwrap();

        l.put(30.0);
        task.resume(25).unwrap();
        left.borrow_mut().fail_with(Some(DeviceError::Pin));
        assert_eq!(
            task.resume(50),
            Err(FaultCause::Device(DeviceError::Pin))
        );
    }
}
