//! IMU heading task
//!
//! Waits until the fusion IMU has calibrated its gyro, accelerometer and
//! magnetometer, then publishes the heading every resumption together with
//! whether it is within tolerance of the target heading.

use libm::fabsf;

use crate::core::error::FaultCause;
use crate::core::scheduler::{Resumable, Step};
use crate::core::share::Share;
use crate::core::traits::time::Millis;
use crate::devices::traits::{CalibrationStatus, HeadingSensor};
use crate::libraries::pid::wrap_180;

use super::recoverable;

/// Heading task states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HeadingState {
    Calibrating,
    Running,
    Recover,
}

impl HeadingState {
    /// Short name for logs
    pub const fn label(self) -> &'static str {
        match self {
            HeadingState::Calibrating => "calibrating",
            HeadingState::Running => "running",
            HeadingState::Recover => "recover",
        }
    }
}

/// Publishes the current heading and the headed flag
pub struct HeadingTask<'a, H: HeadingSensor> {
    sensor: H,
    calibrated: &'a Share<bool>,
    current: &'a Share<f32>,
    target: &'a Share<f32>,
    headed: &'a Share<bool>,
    cal_min: u8,
    tolerance_deg: f32,
    last_status: Option<CalibrationStatus>,
    state: HeadingState,
}

impl<'a, H: HeadingSensor> HeadingTask<'a, H> {
    /// Create the task, starting in calibration
    pub fn new(
        sensor: H,
        calibrated: &'a Share<bool>,
        current: &'a Share<f32>,
        target: &'a Share<f32>,
        headed: &'a Share<bool>,
    ) -> Self {
        Self {
            sensor,
            calibrated,
            current,
            target,
            headed,
            cal_min: crate::parameters::control::DEFAULT_IMU_CAL_MIN,
            tolerance_deg: crate::parameters::control::DEFAULT_HEADING_TOLERANCE,
            last_status: None,
            state: HeadingState::Calibrating,
        }
    }

    /// Calibration level required of gyro, accelerometer and magnetometer
    pub fn with_calibration_min(mut self, level: u8) -> Self {
        self.cal_min = level;
        self
    }

    /// Tolerance for the headed flag
    pub fn with_tolerance(mut self, deg: f32) -> Self {
        self.tolerance_deg = deg;
        self
    }

    /// Current state
    pub fn state(&self) -> HeadingState {
        self.state
    }

    fn transition(&mut self, next: HeadingState) {
        crate::log_debug!("IMU heading: {} -> {}", self.state.label(), next.label());
        self.state = next;
    }
}

impl<H: HeadingSensor> Resumable for HeadingTask<'_, H> {
    fn resume(&mut self, _now: Millis) -> Result<Step, FaultCause> {
        match self.state {
            HeadingState::Calibrating => {
                let status = self.sensor.calibration()?;
                if self.last_status != Some(status) {
                    crate::log_info!(
                        "IMU calibration sys={} gyro={} acc={} mag={}",
                        status.system,
                        status.gyro,
                        status.accel,
                        status.mag
                    );
                    self.last_status = Some(status);
                }
                if status.sensors_at_least(self.cal_min) {
                    self.calibrated.put(true);
                    crate::log_info!("IMU calibrated");
                    self.transition(HeadingState::Running);
                }
            }
            HeadingState::Running => match recoverable(self.sensor.heading_deg())? {
                Some(heading) if heading.is_finite() && (0.0..=360.0).contains(&heading) => {
                    self.current.put(heading);
                    let error = wrap_180(self.target.get() - heading);
                    self.headed.put(fabsf(error) < self.tolerance_deg);
                }
                _ => self.transition(HeadingState::Recover),
            },
            HeadingState::Recover => {
                crate::log_warn!("IMU heading: bad reading, recalibrating");
                self.headed.put(false);
                self.calibrated.put(false);
                self.last_status = None;
                self.transition(HeadingState::Calibrating);
            }
        }
        Ok(Step::Yield)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::DeviceError;
    use crate::devices::mock::MockHeading;
    use crate::rover::RoverShares;

    fn task<'a>(imu: &'a MockHeading, shares: &'a RoverShares) -> HeadingTask<'a, &'a MockHeading> {
        HeadingTask::new(
            imu,
            &shares.imu_calibrated,
            &shares.current_heading,
            &shares.target_heading,
            &shares.headed,
        )
    }

    #[test]
    fn waits_for_calibration() {
        let imu = MockHeading::new();
        let shares = RoverShares::new();
        let mut heading = task(&imu, &shares);

        heading.resume(0).unwrap();
        assert_eq!(heading.state(), HeadingState::Calibrating);
        assert!(!shares.imu_calibrated.get());

        imu.set_calibration(CalibrationStatus::from_register(0b00_01_01_01));
        heading.resume(40).unwrap();
        assert_eq!(heading.state(), HeadingState::Running);
        assert!(shares.imu_calibrated.get());
    }

    #[test]
    fn headed_flag_wraps_around_north() {
        let imu = MockHeading::new();
        imu.calibrate_fully();
        let shares = RoverShares::new();
        let mut heading = task(&imu, &shares);
        heading.resume(0).unwrap();

        shares.target_heading.put(2.0);
        imu.set_heading(358.5);
        heading.resume(40).unwrap();
        assert_eq!(shares.current_heading.get(), 358.5);
        assert!(shares.headed.get());

        imu.set_heading(20.0);
        heading.resume(80).unwrap();
        assert!(!shares.headed.get());
    }

    #[test]
    fn bad_heading_recalibrates() {
        let imu = MockHeading::new();
        imu.calibrate_fully();
        let shares = RoverShares::new();
        let mut heading = task(&imu, &shares);
        heading.resume(0).unwrap();

        imu.set_heading(f32::NAN);
        heading.resume(40).unwrap();
        assert_eq!(heading.state(), HeadingState::Recover);
        heading.resume(80).unwrap();
        assert_eq!(heading.state(), HeadingState::Calibrating);
        assert!(!shares.imu_calibrated.get());
        assert!(!shares.headed.get());
    }

    #[test]
    fn bus_error_faults() {
        let imu = MockHeading::new();
        let shares = RoverShares::new();
        let mut heading = task(&imu, &shares);
        imu.fail_with(Some(DeviceError::Bus));
        assert_eq!(
            heading.resume(0),
            Err(FaultCause::Device(DeviceError::Bus))
        );
    }
}
