//! Control Parameter Definitions
//!
//! Gains, efforts and tolerances used by the rover tasks.
//!
//! # Parameters
//!
//! - `LINE_KP` / `LINE_KI` / `LINE_KD` - Line-follow PID gains
//! - `LINE_PID_INTVL` - Recompute the line-follow correction every N resumptions
//! - `LINE_CENTER` - Sensor index the line should sit under (8 sensors: 3.5)
//! - `LINE_EFFORT` - Base effort while following the line (%)
//! - `DRV_EFFORT` - Effort for straight legs (%)
//! - `TURN_KP` / `TURN_KI` / `TURN_KD` - Heading-turn PID gains
//! - `TURN_TOL` - Turn is complete inside this error (deg)
//! - `TURN_MAX_EFF` - Effort limit while turning (%)
//! - `HDG_TOL` - Heading counts as reached inside this error (deg)
//! - `IMU_CAL_MIN` - Minimum gyro/accel/mag calibration level (0-3)
//! - `EFFORT_LIMIT` - Absolute effort clamp for every command (%)

use super::storage::{ParamValue, ParameterStore};
use crate::core::error::{ConfigError, ConfigResult};

/// Default line-follow proportional gain
pub const DEFAULT_LINE_KP: f32 = 2.0;
/// Default line-follow integral gain
pub const DEFAULT_LINE_KI: f32 = 0.0;
/// Default line-follow derivative gain
pub const DEFAULT_LINE_KD: f32 = 0.0;
/// Default PID update interval (resumptions)
pub const DEFAULT_PID_INTERVAL: u32 = 5;
/// Default line centre (8-sensor array)
pub const DEFAULT_LINE_CENTER: f32 = 3.5;
/// Default base effort while following the line
pub const DEFAULT_LINE_EFFORT: f32 = 25.0;
/// Default straight-drive effort
pub const DEFAULT_DRIVE_EFFORT: f32 = 30.0;
/// Default turn proportional gain
pub const DEFAULT_TURN_KP: f32 = 2.0;
/// Default turn integral gain
pub const DEFAULT_TURN_KI: f32 = 0.0;
/// Default turn derivative gain
pub const DEFAULT_TURN_KD: f32 = 0.0;
/// Default turn completion tolerance (deg)
pub const DEFAULT_TURN_TOLERANCE: f32 = 2.0;
/// Default turn effort limit
pub const DEFAULT_TURN_MAX_EFFORT: f32 = 50.0;
/// Default heading-reached tolerance (deg)
pub const DEFAULT_HEADING_TOLERANCE: f32 = 5.0;
/// Default minimum IMU calibration level
pub const DEFAULT_IMU_CAL_MIN: u8 = 1;
/// Default effort clamp
pub const DEFAULT_EFFORT_LIMIT: f32 = 100.0;

/// Largest effort a motor accepts
pub const MAX_EFFORT: f32 = 100.0;

/// Control parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlParams {
    /// Line-follow gains (kp, ki, kd)
    pub line_gains: (f32, f32, f32),
    /// Line-follow correction recompute interval (>= 1)
    pub pid_update_interval: u32,
    /// Target line position (sensor index)
    pub line_center: f32,
    /// Base effort while following the line
    pub line_effort: f32,
    /// Effort for straight legs
    pub drive_effort: f32,
    /// Turn gains (kp, ki, kd)
    pub turn_gains: (f32, f32, f32),
    /// Turn completion tolerance (deg)
    pub turn_tolerance_deg: f32,
    /// Effort limit while turning
    pub turn_max_effort: f32,
    /// Heading-reached tolerance (deg)
    pub heading_tolerance_deg: f32,
    /// Minimum gyro/accel/mag calibration level
    pub imu_cal_min: u8,
    /// Absolute effort clamp
    pub effort_limit: f32,
}

impl Default for ControlParams {
    fn default() -> Self {
        Self {
            line_gains: (DEFAULT_LINE_KP, DEFAULT_LINE_KI, DEFAULT_LINE_KD),
            pid_update_interval: DEFAULT_PID_INTERVAL,
            line_center: DEFAULT_LINE_CENTER,
            line_effort: DEFAULT_LINE_EFFORT,
            drive_effort: DEFAULT_DRIVE_EFFORT,
            turn_gains: (DEFAULT_TURN_KP, DEFAULT_TURN_KI, DEFAULT_TURN_KD),
            turn_tolerance_deg: DEFAULT_TURN_TOLERANCE,
            turn_max_effort: DEFAULT_TURN_MAX_EFFORT,
            heading_tolerance_deg: DEFAULT_HEADING_TOLERANCE,
            imu_cal_min: DEFAULT_IMU_CAL_MIN,
            effort_limit: DEFAULT_EFFORT_LIMIT,
        }
    }
}

impl ControlParams {
    /// Register control parameters with default values
    pub fn register_defaults(store: &mut ParameterStore) -> ConfigResult<()> {
        store.register("LINE_KP", ParamValue::Float(DEFAULT_LINE_KP))?;
        store.register("LINE_KI", ParamValue::Float(DEFAULT_LINE_KI))?;
        store.register("LINE_KD", ParamValue::Float(DEFAULT_LINE_KD))?;
        store.register(
            "LINE_PID_INTVL",
            ParamValue::Int(DEFAULT_PID_INTERVAL as i32),
        )?;
        store.register("LINE_CENTER", ParamValue::Float(DEFAULT_LINE_CENTER))?;
        store.register("LINE_EFFORT", ParamValue::Float(DEFAULT_LINE_EFFORT))?;
        store.register("DRV_EFFORT", ParamValue::Float(DEFAULT_DRIVE_EFFORT))?;
        store.register("TURN_KP", ParamValue::Float(DEFAULT_TURN_KP))?;
        store.register("TURN_KI", ParamValue::Float(DEFAULT_TURN_KI))?;
        store.register("TURN_KD", ParamValue::Float(DEFAULT_TURN_KD))?;
        store.register("TURN_TOL", ParamValue::Float(DEFAULT_TURN_TOLERANCE))?;
        store.register("TURN_MAX_EFF", ParamValue::Float(DEFAULT_TURN_MAX_EFFORT))?;
        store.register("HDG_TOL", ParamValue::Float(DEFAULT_HEADING_TOLERANCE))?;
        store.register("IMU_CAL_MIN", ParamValue::Int(DEFAULT_IMU_CAL_MIN as i32))?;
        store.register("EFFORT_LIMIT", ParamValue::Float(DEFAULT_EFFORT_LIMIT))?;
        Ok(())
    }

    /// Load control parameters, falling back to defaults, and validate them
    pub fn from_store(store: &ParameterStore) -> ConfigResult<Self> {
        let d = Self::default();
        let f = |name: &str, default: f32| store.get_f32(name).unwrap_or(default);

        let params = Self {
            line_gains: (
                f("LINE_KP", d.line_gains.0),
                f("LINE_KI", d.line_gains.1),
                f("LINE_KD", d.line_gains.2),
            ),
            pid_update_interval: match store.get_i32("LINE_PID_INTVL") {
                Some(v) if v >= 1 => v as u32,
                Some(_) => return Err(ConfigError::InvalidParameter("LINE_PID_INTVL")),
                None => d.pid_update_interval,
            },
            line_center: f("LINE_CENTER", d.line_center),
            line_effort: f("LINE_EFFORT", d.line_effort),
            drive_effort: f("DRV_EFFORT", d.drive_effort),
            turn_gains: (
                f("TURN_KP", d.turn_gains.0),
                f("TURN_KI", d.turn_gains.1),
                f("TURN_KD", d.turn_gains.2),
            ),
            turn_tolerance_deg: f("TURN_TOL", d.turn_tolerance_deg),
            turn_max_effort: f("TURN_MAX_EFF", d.turn_max_effort),
            heading_tolerance_deg: f("HDG_TOL", d.heading_tolerance_deg),
            imu_cal_min: match store.get_i32("IMU_CAL_MIN") {
                Some(v) if (0..=3).contains(&v) => v as u8,
                Some(_) => return Err(ConfigError::InvalidParameter("IMU_CAL_MIN")),
                None => d.imu_cal_min,
            },
            effort_limit: f("EFFORT_LIMIT", d.effort_limit),
        };
        params.validate()?;
        Ok(params)
    }

    /// Check ranges
    pub fn validate(&self) -> ConfigResult<()> {
        let effort_ok = |e: f32| e.is_finite() && (0.0..=MAX_EFFORT).contains(&e.abs());

        if self.pid_update_interval == 0 {
            return Err(ConfigError::InvalidParameter("LINE_PID_INTVL"));
        }
        if !(0.0..=7.0).contains(&self.line_center) {
            return Err(ConfigError::InvalidParameter("LINE_CENTER"));
        }
        if !effort_ok(self.effort_limit) || self.effort_limit <= 0.0 {
            return Err(ConfigError::InvalidParameter("EFFORT_LIMIT"));
        }
        if !effort_ok(self.line_effort) || self.line_effort.abs() > self.effort_limit {
            return Err(ConfigError::InvalidParameter("LINE_EFFORT"));
        }
        if !effort_ok(self.drive_effort) || self.drive_effort.abs() > self.effort_limit {
            return Err(ConfigError::InvalidParameter("DRV_EFFORT"));
        }
        if !effort_ok(self.turn_max_effort) || self.turn_max_effort <= 0.0 {
            return Err(ConfigError::InvalidParameter("TURN_MAX_EFF"));
        }
        if !(self.turn_tolerance_deg > 0.0 && self.turn_tolerance_deg < 180.0) {
            return Err(ConfigError::InvalidParameter("TURN_TOL"));
        }
        if !(self.heading_tolerance_deg > 0.0 && self.heading_tolerance_deg < 180.0) {
            return Err(ConfigError::InvalidParameter("HDG_TOL"));
        }
        if self.imu_cal_min > 3 {
            return Err(ConfigError::InvalidParameter("IMU_CAL_MIN"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let params = ControlParams::default();
        assert!(params.validate().is_ok());
        assert_eq!(params.pid_update_interval, 5);
        assert_eq!(params.line_center, 3.5);
        assert_eq!(params.turn_max_effort, 50.0);
    }

    #[test]
    fn from_store_uses_defaults() {
        let mut store = ParameterStore::new();
        ControlParams::register_defaults(&mut store).unwrap();
        assert_eq!(ControlParams::from_store(&store), Ok(ControlParams::default()));
    }

    #[test]
    fn from_store_applies_overrides() {
        let mut store = ParameterStore::new();
        ControlParams::register_defaults(&mut store).unwrap();
        store.set("LINE_PID_INTVL", ParamValue::Int(1)).unwrap();
        store.set("TURN_KP", ParamValue::Float(1.5)).unwrap();

        let params = ControlParams::from_store(&store).unwrap();
        assert_eq!(params.pid_update_interval, 1);
        assert_eq!(params.turn_gains.0, 1.5);
    }

    #[test]
    fn zero_interval_rejected() {
        let mut store = ParameterStore::new();
        ControlParams::register_defaults(&mut store).unwrap();
        store.set("LINE_PID_INTVL", ParamValue::Int(0)).unwrap();
        assert_eq!(
            ControlParams::from_store(&store),
            Err(ConfigError::InvalidParameter("LINE_PID_INTVL"))
        );
    }

    #[test]
    fn effort_above_limit_rejected() {
        let params = ControlParams {
            drive_effort: 80.0,
            effort_limit: 60.0,
            ..ControlParams::default()
        };
        assert_eq!(
            params.validate(),
            Err(ConfigError::InvalidParameter("DRV_EFFORT"))
        );
    }
}
