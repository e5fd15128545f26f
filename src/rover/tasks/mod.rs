//! Rover tasks
//!
//! Each task is a small state machine implementing [`Resumable`]: one
//! resumption evaluates the current state once, performs at most one
//! transition and yields. Tasks talk to each other only through
//! [`RoverShares`](super::RoverShares).
//!
//! Driver errors split two ways. An out-of-range reading or command
//! (`DeviceError::InvalidReading`) sends the task to its `Recover` state,
//! which logs, zeroes its outputs and returns to a safe state. Any other
//! driver error is a fault: it leaves the task through `?` and stops the
//! loop.
//!
//! [`Resumable`]: crate::core::scheduler::Resumable

pub mod bump;
pub mod heading;
pub mod line;
pub mod motor;
pub mod planner;
pub mod ui;

pub use bump::{BumpState, BumpTask};
pub use heading::{HeadingState, HeadingTask};
pub use line::{LineSensorTask, LineState};
pub use motor::{MotorControlTask, MotorState};
pub use planner::{Leg, Mission, PlannerState, PlannerTask, COURSE_LEG_COUNTS, ROMI_COURSE};
pub use ui::{button_pressed, UiState, UserInterfaceTask};

use crate::core::error::{DeviceError, FaultCause};

/// `Ok(None)` for a bad reading, `Err` for a fault
fn recoverable<T>(result: Result<T, DeviceError>) -> Result<Option<T>, FaultCause> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(DeviceError::InvalidReading) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_reading_is_recoverable() {
        assert_eq!(recoverable::<u8>(Err(DeviceError::InvalidReading)), Ok(None));
        assert_eq!(recoverable(Ok(3u8)), Ok(Some(3)));
        assert_eq!(
            recoverable::<u8>(Err(DeviceError::Bus)),
            Err(FaultCause::Device(DeviceError::Bus))
        );
    }
}
