//! Line sensor task
//!
//! ```text
//! CalibrateWhite ──▶ CalibrateBlack ──(button)──▶ Standby
//!        │                                         ▲  │ line_following
//!        └────────(already calibrated)─────────────┘  ▼
//!                                     Search ◀──(lost)── Follow
//!                                        └──(found)──────▶
//! ```
//!
//! Calibration: the white reference is captured on the first resumption
//! with the robot on bare floor. The black reference is captured once the
//! operator has placed the sensor over the line and pressed the user
//! button; that press is consumed (the `started` flag is put back to
//! false) so the next press starts the run.

use crate::core::error::FaultCause;
use crate::core::scheduler::{Resumable, Step};
use crate::core::share::Share;
use crate::core::traits::time::Millis;
use crate::devices::traits::LineArray;

use super::recoverable;

/// Line sensor states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LineState {
    CalibrateWhite,
    CalibrateBlack,
    Standby,
    Follow,
    Search,
    Recover,
}

impl LineState {
    /// Short name for logs
    pub const fn label(self) -> &'static str {
        match self {
            LineState::CalibrateWhite => "calibrate-white",
            LineState::CalibrateBlack => "calibrate-black",
            LineState::Standby => "standby",
            LineState::Follow => "follow",
            LineState::Search => "search",
            LineState::Recover => "recover",
        }
    }
}

enum Reading {
    Line(f32),
    Lost,
    Bad,
}

/// Publishes the line position while line following is enabled
pub struct LineSensorTask<'a, A: LineArray> {
    array: A,
    started: &'a Share<bool>,
    calibrated: &'a Share<bool>,
    following: &'a Share<bool>,
    position: &'a Share<f32>,
    state: LineState,
}

impl<'a, A: LineArray> LineSensorTask<'a, A> {
    /// Create the task, starting with the white calibration
    pub fn new(
        array: A,
        started: &'a Share<bool>,
        calibrated: &'a Share<bool>,
        following: &'a Share<bool>,
        position: &'a Share<f32>,
    ) -> Self {
        Self {
            array,
            started,
            calibrated,
            following,
            position,
            state: LineState::CalibrateWhite,
        }
    }

    /// Current state
    pub fn state(&self) -> LineState {
        self.state
    }

    fn transition(&mut self, next: LineState) {
        crate::log_debug!("Line sensor: {} -> {}", self.state.label(), next.label());
        self.state = next;
    }

    fn read_line(&mut self) -> Result<Reading, FaultCause> {
        Ok(match recoverable(self.array.centroid())? {
            Some(Some(c)) if c.is_finite() => Reading::Line(c),
            Some(None) => Reading::Lost,
            _ => Reading::Bad,
        })
    }
}

impl<A: LineArray> Resumable for LineSensorTask<'_, A> {
    fn resume(&mut self, _now: Millis) -> Result<Step, FaultCause> {
        match self.state {
            LineState::CalibrateWhite => {
                if self.calibrated.get() {
                    self.transition(LineState::Standby);
                } else {
                    self.array.capture_white()?;
                    crate::log_info!("Line sensor: white captured, place over line and press button");
                    self.transition(LineState::CalibrateBlack);
                }
            }
            LineState::CalibrateBlack => {
                if self.started.get() {
                    self.array.capture_black()?;
                    self.started.put(false);
                    self.calibrated.put(true);
                    crate::log_info!("Line sensor: calibration complete");
                    self.transition(LineState::Standby);
                }
            }
            LineState::Standby => {
                if self.following.get() {
                    self.transition(LineState::Follow);
                }
            }
            LineState::Follow => {
                if !self.following.get() {
                    self.transition(LineState::Standby);
                } else {
                    match self.read_line()? {
                        Reading::Line(c) => self.position.put(c),
                        Reading::Lost => {
                            crate::log_info!("Line sensor: line lost");
                            self.transition(LineState::Search);
                        }
                        Reading::Bad => self.transition(LineState::Recover),
                    }
                }
            }
            LineState::Search => {
                if !self.following.get() {
                    self.transition(LineState::Standby);
                } else {
                    match self.read_line()? {
                        Reading::Line(c) => {
                            crate::log_info!("Line sensor: line found at {}", c);
                            self.position.put(c);
                            self.transition(LineState::Follow);
                        }
                        Reading::Lost => {}
                        Reading::Bad => self.transition(LineState::Recover),
                    }
                }
            }
            LineState::Recover => {
                crate::log_warn!("Line sensor: bad reading, back to standby");
                self.transition(LineState::Standby);
            }
        }
        Ok(Step::Yield)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::DeviceError;
    use crate::devices::mock::MockLineArray;
    use crate::rover::RoverShares;

    fn task<'a>(
        array: &'a MockLineArray,
        shares: &'a RoverShares,
    ) -> LineSensorTask<'a, &'a MockLineArray> {
        LineSensorTask::new(
            array,
            &shares.started,
            &shares.line_calibrated,
            &shares.line_following,
            &shares.line_position,
        )
    }

    #[test]
    fn calibration_consumes_button_press() {
        let array = MockLineArray::new();
        let shares = RoverShares::new();
        let mut line = task(&array, &shares);

        line.resume(0).unwrap();
        assert_eq!(line.state(), LineState::CalibrateBlack);
        assert_eq!(array.white_captures(), 1);

        line.resume(20).unwrap();
        assert_eq!(line.state(), LineState::CalibrateBlack);

        shares.started.put(true);
        line.resume(40).unwrap();
        assert_eq!(line.state(), LineState::Standby);
        assert_eq!(array.black_captures(), 1);
        assert!(shares.line_calibrated.get());
        assert!(!shares.started.get());
    }

    #[test]
    fn skips_calibration_when_already_done() {
        let array = MockLineArray::new();
        let shares = RoverShares::new();
        shares.line_calibrated.put(true);
        let mut line = task(&array, &shares);
        line.resume(0).unwrap();
        assert_eq!(line.state(), LineState::Standby);
        assert_eq!(array.white_captures(), 0);
    }

    #[test]
    fn follow_search_follow() {
        let array = MockLineArray::new();
        let shares = RoverShares::new();
        shares.line_calibrated.put(true);
        let mut line = task(&array, &shares);
        line.resume(0).unwrap();

        shares.line_following.put(true);
        line.resume(20).unwrap();
        assert_eq!(line.state(), LineState::Follow);

        array.set_centroid(Some(4.25));
        line.resume(40).unwrap();
        assert_eq!(shares.line_position.get(), 4.25);

        array.set_centroid(None);
        line.resume(60).unwrap();
        assert_eq!(line.state(), LineState::Search);
        line.resume(80).unwrap();
        assert_eq!(line.state(), LineState::Search);
        assert_eq!(shares.line_position.get(), 4.25);

        array.set_centroid(Some(3.0));
        line.resume(100).unwrap();
        assert_eq!(line.state(), LineState::Follow);
        assert_eq!(shares.line_position.get(), 3.0);

        shares.line_following.put(false);
        line.resume(120).unwrap();
        assert_eq!(line.state(), LineState::Standby);
    }

    #[test]
    fn bad_reading_recovers_to_standby() {
        let array = MockLineArray::new();
        let shares = RoverShares::new();
        shares.line_calibrated.put(true);
        shares.line_following.put(true);
        let mut line = task(&array, &shares);
        line.resume(0).unwrap();
        line.resume(20).unwrap();

        array.fail_with(Some(DeviceError::InvalidReading));
        line.resume(40).unwrap();
        assert_eq!(line.state(), LineState::Recover);
        line.resume(60).unwrap();
        assert_eq!(line.state(), LineState::Standby);

        array.fail_with(Some(DeviceError::Bus));
        line.resume(80).unwrap();
        assert_eq!(
            line.resume(100),
            Err(FaultCause::Device(DeviceError::Bus))
        );
    }
}
