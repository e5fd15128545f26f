//! Planner task
//!
//! Runs the course as a list of [`Leg`]s. Progress along a leg is the
//! average of the two wheel encoders since the leg began; both encoders
//! are zeroed at every leg change.
//!
//! ```text
//! Standby ──(started && line calibrated)──▶ Leg(0) ──▶ Leg(1) ──▶ ... ──▶ Finished
//!    ▲                                        │
//!    └──────────(button pressed again)────────┘
//! Recover (bad encoder / share value) ──▶ Standby (started cleared)
//! ```
//!
//! Line following steers with `base ± correction` around a fixed base
//! effort; the correction is recomputed every `pid_update_interval`
//! resumptions and held in between.

use libm::fabsf;

use crate::core::error::{ConfigError, ConfigResult, FaultCause};
use crate::core::scheduler::{Resumable, Step};
use crate::core::traits::time::Millis;
use crate::devices::traits::Encoder;
use crate::libraries::pid::{clamp_abs, wrap_180, PidController, ThrottledPid};
use crate::parameters::ControlParams;
use crate::rover::RoverShares;

use super::recoverable;

/// Encoder counts driven by each distance leg of the course
pub const COURSE_LEG_COUNTS: i32 = 1000;

/// One leg of a mission
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Leg {
    /// Follow the line for `counts` encoder counts
    FollowLine { counts: i32 },
    /// Drive forward at the straight-drive effort
    Straight { counts: i32 },
    /// Turn in place to an absolute heading
    Turn { heading_deg: f32 },
    /// Follow the line until the bumper reports an impact
    FollowUntilBump,
    /// Drive backward at the straight-drive effort
    Reverse { counts: i32 },
}

impl Leg {
    /// Short name for logs
    pub const fn label(&self) -> &'static str {
        match self {
            Leg::FollowLine { .. } => "follow-line",
            Leg::Straight { .. } => "straight",
            Leg::Turn { .. } => "turn",
            Leg::FollowUntilBump => "follow-until-bump",
            Leg::Reverse { .. } => "reverse",
        }
    }

    /// Whether the line sensor task must be following during this leg
    pub const fn follows_line(&self) -> bool {
        matches!(self, Leg::FollowLine { .. } | Leg::FollowUntilBump)
    }

    fn validate(&self) -> ConfigResult<()> {
        let ok = match *self {
            Leg::FollowLine { counts } | Leg::Straight { counts } | Leg::Reverse { counts } => {
                counts > 0
            }
            Leg::Turn { heading_deg } => heading_deg.is_finite() && (0.0..360.0).contains(&heading_deg),
            Leg::FollowUntilBump => true,
        };
        if ok {
            Ok(())
        } else {
            Err(ConfigError::InvalidParameter("mission leg"))
        }
    }
}

/// The Romi course: line, straight, line, straight, turn to 50°, straight,
/// line until the wall, back off, turn around, drive home.
pub const ROMI_COURSE: [Leg; 10] = [
    Leg::FollowLine { counts: COURSE_LEG_COUNTS },
    Leg::Straight { counts: COURSE_LEG_COUNTS },
    Leg::FollowLine { counts: COURSE_LEG_COUNTS },
    Leg::Straight { counts: COURSE_LEG_COUNTS },
    Leg::Turn { heading_deg: 50.0 },
    Leg::Straight { counts: COURSE_LEG_COUNTS },
    Leg::FollowUntilBump,
    Leg::Reverse { counts: COURSE_LEG_COUNTS },
    Leg::Turn { heading_deg: 230.0 },
    Leg::Straight { counts: COURSE_LEG_COUNTS },
];

/// Validated, non-empty list of legs
#[derive(Debug, Clone, Copy)]
pub struct Mission<'m> {
    legs: &'m [Leg],
}

impl<'m> Mission<'m> {
    /// Validate `legs`; an empty list or a bad leg is rejected
    pub fn new(legs: &'m [Leg]) -> ConfigResult<Self> {
        if legs.is_empty() {
            return Err(ConfigError::InvalidParameter("mission"));
        }
        for leg in legs {
            leg.validate()?;
        }
        Ok(Self { legs })
    }

    /// Legs in execution order
    pub fn legs(&self) -> &'m [Leg] {
        self.legs
    }

    /// Number of legs
    pub fn len(&self) -> usize {
        self.legs.len()
    }

    /// Always false for a validated mission
    pub fn is_empty(&self) -> bool {
        self.legs.is_empty()
    }
}

/// Planner states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PlannerState {
    /// Waiting for the start button
    Standby,
    /// Executing the leg at this index
    Leg(usize),
    /// Every leg done
    Finished,
    /// Bad input, stopping
    Recover,
}

impl PlannerState {
    /// Short name for logs
    pub const fn label(self) -> &'static str {
        match self {
            PlannerState::Standby => "standby",
            PlannerState::Leg(_) => "leg",
            PlannerState::Finished => "finished",
            PlannerState::Recover => "recover",
        }
    }
}

/// Drives the mission by writing the effort shares
pub struct PlannerTask<'a, EL: Encoder, ER: Encoder> {
    left_encoder: EL,
    right_encoder: ER,
    shares: &'a RoverShares,
    mission: Mission<'a>,
    params: ControlParams,
    line_pid: ThrottledPid,
    turn_pid: PidController,
    state: PlannerState,
}

impl<'a, EL: Encoder, ER: Encoder> PlannerTask<'a, EL, ER> {
    /// Create the planner with the default control parameters
    pub fn new(
        left_encoder: EL,
        right_encoder: ER,
        shares: &'a RoverShares,
        mission: Mission<'a>,
    ) -> Self {
        Self::with_params(left_encoder, right_encoder, shares, mission, ControlParams::default())
    }

    /// Create the planner with explicit control parameters
    pub fn with_params(
        left_encoder: EL,
        right_encoder: ER,
        shares: &'a RoverShares,
        mission: Mission<'a>,
        params: ControlParams,
    ) -> Self {
        Self {
            left_encoder,
            right_encoder,
            shares,
            mission,
            line_pid: ThrottledPid::new(
                PidController::from_gains(params.line_gains),
                params.pid_update_interval,
            ),
            turn_pid: PidController::from_gains(params.turn_gains),
            params,
            state: PlannerState::Standby,
        }
    }

    /// Current state
    pub fn state(&self) -> PlannerState {
        self.state
    }

    /// Leg currently executing
    pub fn current_leg(&self) -> Option<Leg> {
        match self.state {
            PlannerState::Leg(i) => self.mission.legs().get(i).copied(),
            _ => None,
        }
    }

    fn transition(&mut self, next: PlannerState) {
        crate::log_debug!("Planner: {} -> {}", self.state.label(), next.label());
        self.state = next;
    }

    fn put_efforts(&self, left: f32, right: f32) {
        let limit = self.params.effort_limit;
        self.shares.left_effort.put(clamp_abs(left, limit));
        self.shares.right_effort.put(clamp_abs(right, limit));
    }

    fn stop(&self) {
        self.shares.stop_efforts();
        self.shares.line_following.put(false);
    }

    /// Zero the encoders and start leg `index`, or finish
    fn enter_leg(&mut self, index: usize) -> Result<(), FaultCause> {
        self.shares.stop_efforts();
        self.left_encoder.zero()?;
        self.right_encoder.zero()?;
        self.line_pid.reset();
        self.turn_pid.reset();

        match self.mission.legs().get(index).copied() {
            Some(leg) => {
                self.shares.line_following.put(leg.follows_line());
                if let Leg::Turn { heading_deg } = leg {
                    self.shares.target_heading.put(heading_deg);
                }
                crate::log_info!("Planner: leg {} {}", index, leg.label());
                self.transition(PlannerState::Leg(index));
            }
            None => {
                self.stop();
                crate::log_info!("Planner: mission complete");
                self.transition(PlannerState::Finished);
            }
        }
        Ok(())
    }

    /// Average distance of both wheels since the leg began, `None` for a
    /// bad encoder reading
    fn distance(&mut self, now: Millis) -> Result<Option<i32>, FaultCause> {
        let now_us = now.wrapping_mul(1000);
        if recoverable(self.left_encoder.update(now_us))?.is_none()
            || recoverable(self.right_encoder.update(now_us))?.is_none()
        {
            return Ok(None);
        }
        let sum = self.left_encoder.position() as i64 + self.right_encoder.position() as i64;
        Ok(Some((sum / 2).unsigned_abs().min(i32::MAX as u64) as i32))
    }

    /// One line-follow step; false if the line position is unusable
    fn follow_line(&mut self) -> bool {
        let position = self.shares.line_position.get();
        if !position.is_finite() {
            return false;
        }
        let error = position - self.params.line_center;
        let correction = self.line_pid.update(error);
        let base = self.params.line_effort;
        self.put_efforts(base + correction, base - correction);
        true
    }

    /// One turn step; `Some(true)` once the heading is reached
    fn turn(&mut self, target: f32) -> Option<bool> {
        if !self.shares.imu_calibrated.get() {
            self.shares.stop_efforts();
            return Some(false);
        }
        let heading = self.shares.current_heading.get();
        if !heading.is_finite() {
            return None;
        }
        let error = wrap_180(target - heading);
        if fabsf(error) < self.params.turn_tolerance_deg && self.shares.headed.get() {
            return Some(true);
        }
        let effort = clamp_abs(self.turn_pid.compute(error), self.params.turn_max_effort);
        self.put_efforts(effort, -effort);
        Some(false)
    }

    /// Run leg `index` once; `Some(true)` when it is complete
    fn run_leg(&mut self, index: usize, now: Millis) -> Result<Option<bool>, FaultCause> {
        let leg = match self.mission.legs().get(index).copied() {
            Some(leg) => leg,
            None => return Ok(Some(true)),
        };
        let distance = match self.distance(now)? {
            Some(d) => d,
            None => return Ok(None),
        };
        let drive = self.params.drive_effort;

        Ok(match leg {
            Leg::FollowLine { counts } => {
                if distance <= counts {
                    self.follow_line().then_some(false)
                } else {
                    Some(true)
                }
            }
            Leg::Straight { counts } => {
                if distance <= counts {
                    self.put_efforts(drive, drive);
                    Some(false)
                } else {
                    Some(true)
                }
            }
            Leg::Reverse { counts } => {
                if distance <= counts {
                    self.put_efforts(-drive, -drive);
                    Some(false)
                } else {
                    Some(true)
                }
            }
            Leg::Turn { heading_deg } => self.turn(heading_deg),
            Leg::FollowUntilBump => {
                if self.shares.impact_detected.get() {
                    self.shares.impact_detected.put(false);
                    crate::log_info!("Planner: impact acknowledged");
                    Some(true)
                } else {
                    self.follow_line().then_some(false)
                }
            }
        })
    }
}

impl<EL: Encoder, ER: Encoder> Resumable for PlannerTask<'_, EL, ER> {
    fn resume(&mut self, now: Millis) -> Result<Step, FaultCause> {
        match self.state {
            PlannerState::Standby => {
                if self.shares.started.get() && self.shares.line_calibrated.get() {
                    crate::log_info!("Planner: mission start, {} legs", self.mission.len());
                    self.shares.impact_detected.put(false);
                    self.enter_leg(0)?;
                }
            }
            PlannerState::Leg(index) => {
                if !self.shares.started.get() {
                    crate::log_info!("Planner: stopped by button during leg {}", index);
                    self.stop();
                    self.transition(PlannerState::Standby);
                } else {
                    match self.run_leg(index, now)? {
                        Some(true) => self.enter_leg(index + 1)?,
                        Some(false) => {}
                        None => self.transition(PlannerState::Recover),
                    }
                }
            }
            PlannerState::Finished => {}
            PlannerState::Recover => {
                crate::log_warn!("Planner: bad input, stopping and waiting for start");
                self.stop();
                self.shares.started.put(false);
                self.transition(PlannerState::Standby);
            }
        }

        if self.state == PlannerState::Finished {
            Ok(Step::Done)
        } else {
            Ok(Step::Yield)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::DeviceError;
    use crate::devices::mock::MockEncoder;

    struct Rig {
        left: MockEncoder,
        right: MockEncoder,
        shares: RoverShares,
    }

    impl Rig {
        fn new() -> Self {
            let shares = RoverShares::new();
            shares.line_calibrated.put(true);
            Self {
                left: MockEncoder::new(),
                right: MockEncoder::new(),
                shares,
            }
        }

        fn planner<'a>(
            &'a self,
            legs: &'a [Leg],
        ) -> PlannerTask<'a, &'a MockEncoder, &'a MockEncoder> {
            PlannerTask::new(&self.left, &self.right, &self.shares, Mission::new(legs).unwrap())
        }

        fn drive(&self, counts: i32) {
            self.left.advance(counts);
            self.right.advance(counts);
        }
    }

    #[test]
    fn mission_validation() {
        assert!(Mission::new(&[]).is_err());
        assert!(Mission::new(&[Leg::Straight { counts: 0 }]).is_err());
        assert!(Mission::new(&[Leg::Turn { heading_deg: 360.0 }]).is_err());
        assert_eq!(Mission::new(&ROMI_COURSE).unwrap().len(), 10);
    }

    #[test]
    fn waits_for_start_and_calibration() {
        let rig = Rig::new();
        rig.shares.line_calibrated.put(false);
        rig.shares.started.put(true);
        let legs = [Leg::Straight { counts: 100 }];
        let mut planner = rig.planner(&legs);

        planner.resume(0).unwrap();
        assert_eq!(planner.state(), PlannerState::Standby);

        rig.shares.line_calibrated.put(true);
        planner.resume(30).unwrap();
        assert_eq!(planner.state(), PlannerState::Leg(0));
        assert_eq!(rig.left.zeros(), 1);
    }

    #[test]
    fn straight_leg_runs_for_distance_then_finishes() {
        let rig = Rig::new();
        rig.shares.started.put(true);
        let legs = [Leg::Straight { counts: 100 }];
        let mut planner = rig.planner(&legs);

        planner.resume(0).unwrap();
        assert_eq!(planner.resume(30), Ok(Step::Yield));
        assert_eq!(rig.shares.left_effort.get(), 30.0);
        assert_eq!(rig.shares.right_effort.get(), 30.0);

        rig.drive(101);
        assert_eq!(planner.resume(60), Ok(Step::Done));
        assert_eq!(planner.state(), PlannerState::Finished);
        assert_eq!(rig.shares.left_effort.get(), 0.0);
    }

    #[test]
    fn line_follow_steers_around_base_effort() {
        let rig = Rig::new();
        rig.shares.started.put(true);
        let legs = [Leg::FollowLine { counts: 500 }, Leg::Straight { counts: 10 }];
        let mut planner = rig.planner(&legs);
        planner.resume(0).unwrap();
        assert!(rig.shares.line_following.get());

        // error = 4.5 - 3.5 = 1.0, kp = 2
        rig.shares.line_position.put(4.5);
        planner.resume(30).unwrap();
        assert_eq!(rig.shares.left_effort.get(), 27.0);
        assert_eq!(rig.shares.right_effort.get(), 23.0);

        // Correction held between recomputations; efforts do not accumulate
        rig.shares.line_position.put(3.5);
        planner.resume(60).unwrap();
        assert_eq!(rig.shares.left_effort.get(), 27.0);
        assert_eq!(rig.shares.right_effort.get(), 23.0);

        rig.drive(501);
        planner.resume(90).unwrap();
        assert_eq!(planner.current_leg(), Some(Leg::Straight { counts: 10 }));
        assert!(!rig.shares.line_following.get());
        assert_eq!(rig.shares.left_effort.get(), 0.0);
    }

    #[test]
    fn turn_waits_for_heading() {
        let rig = Rig::new();
        rig.shares.started.put(true);
        rig.shares.imu_calibrated.put(true);
        rig.shares.current_heading.put(40.0);
        let legs = [Leg::Turn { heading_deg: 50.0 }];
        let mut planner = rig.planner(&legs);
        planner.resume(0).unwrap();
        assert_eq!(rig.shares.target_heading.get(), 50.0);

        planner.resume(30).unwrap();
        assert_eq!(rig.shares.left_effort.get(), 20.0);
        assert_eq!(rig.shares.right_effort.get(), -20.0);

        // Far off: correction saturates at the turn limit
        rig.shares.current_heading.put(300.0);
        planner.resume(60).unwrap();
        assert_eq!(rig.shares.left_effort.get(), 50.0);

        rig.shares.current_heading.put(49.0);
        rig.shares.headed.put(true);
        assert_eq!(planner.resume(90), Ok(Step::Done));
    }

    #[test]
    fn follow_until_bump_acknowledges_impact() {
        let rig = Rig::new();
        rig.shares.started.put(true);
        rig.shares.line_position.put(3.5);
        let legs = [Leg::FollowUntilBump, Leg::Reverse { counts: 50 }];
        let mut planner = rig.planner(&legs);
        planner.resume(0).unwrap();

        rig.drive(5000);
        planner.resume(30).unwrap();
        assert_eq!(planner.state(), PlannerState::Leg(0));

        rig.shares.impact_detected.put(true);
        planner.resume(60).unwrap();
        assert_eq!(planner.state(), PlannerState::Leg(1));
        assert!(!rig.shares.impact_detected.get());

        planner.resume(90).unwrap();
        assert_eq!(rig.shares.left_effort.get(), -30.0);
        rig.drive(-51);
        assert_eq!(planner.resume(120), Ok(Step::Done));
    }

    #[test]
    fn button_stops_mission() {
        let rig = Rig::new();
        rig.shares.started.put(true);
        let legs = [Leg::Straight { counts: 100 }];
        let mut planner = rig.planner(&legs);
        planner.resume(0).unwrap();
        planner.resume(30).unwrap();

        rig.shares.started.put(false);
        planner.resume(60).unwrap();
        assert_eq!(planner.state(), PlannerState::Standby);
        assert_eq!(rig.shares.left_effort.get(), 0.0);
    }

    #[test]
    fn bad_encoder_recovers_and_clears_start() {
        let rig = Rig::new();
        rig.shares.started.put(true);
        let legs = [Leg::Straight { counts: 100 }];
        let mut planner = rig.planner(&legs);
        planner.resume(0).unwrap();

        rig.right.fail_with(Some(DeviceError::InvalidReading));
        planner.resume(30).unwrap();
        assert_eq!(planner.state(), PlannerState::Recover);
        planner.resume(60).unwrap();
        assert_eq!(planner.state(), PlannerState::Standby);
        assert!(!rig.shares.started.get());
    }
}
