//! Shares wiring the rover tasks together
//!
//! | Share                   | Writer(s)                  | Reader(s)                 | Protected |
//! |-------------------------|----------------------------|---------------------------|-----------|
//! | `started`               | button ISR, line sensor    | planner, line sensor      | yes       |
//! | `Left Effort`           | planner, cutoff            | motor control             | no        |
//! | `Right Effort`          | planner, cutoff            | motor control             | no        |
//! | `line_following`        | planner                    | line sensor               | no        |
//! | `line_sensor_calibrate` | line sensor                | planner                   | no        |
//! | `line_position`         | line sensor                | planner                   | no        |
//! | `IMU Calibrated`        | heading                    | planner                   | yes       |
//! | `Current Heading`       | heading                    | planner                   | no        |
//! | `Target Heading`        | planner                    | heading                   | no        |
//! | `Headed`                | heading                    | planner                   | yes       |
//! | `Impact Detected`       | bump                       | planner (clears)          | yes       |
//!
//! `started` is toggled by the user button interrupt and therefore must be
//! protected. The other protected shares match the deployed firmware.

use crate::core::error::ConfigResult;
use crate::core::share::{Share, ShareInfo, ShareRegistry};

/// Every share of the rover
pub struct RoverShares {
    pub started: Share<bool>,
    pub left_effort: Share<f32>,
    pub right_effort: Share<f32>,
    pub line_following: Share<bool>,
    pub line_calibrated: Share<bool>,
    pub line_position: Share<f32>,
    pub imu_calibrated: Share<bool>,
    pub current_heading: Share<f32>,
    pub target_heading: Share<f32>,
    pub headed: Share<bool>,
    pub impact_detected: Share<bool>,
}

impl RoverShares {
    /// All shares at rest: not started, not calibrated, zero effort
    pub const fn new() -> Self {
        Self {
            started: Share::new_static("started", false, true),
            left_effort: Share::new_static("Left Effort", 0.0, false),
            right_effort: Share::new_static("Right Effort", 0.0, false),
            line_following: Share::new_static("line_following", false, false),
            line_calibrated: Share::new_static("line_sensor_calibrate", false, false),
            line_position: Share::new_static("line_position", 0.0, false),
            imu_calibrated: Share::new_static("IMU Calibrated", false, true),
            current_heading: Share::new_static("Current Heading", 0.0, false),
            target_heading: Share::new_static("Target Heading", 0.0, false),
            headed: Share::new_static("Headed", false, true),
            impact_detected: Share::new_static("Impact Detected", false, true),
        }
    }

    /// Zero both effort shares
    pub fn stop_efforts(&self) {
        self.left_effort.put(0.0);
        self.right_effort.put(0.0);
    }

    /// Every share, for diagnostics
    pub fn all(&self) -> [&dyn ShareInfo; 11] {
        [
            &self.started,
            &self.left_effort,
            &self.right_effort,
            &self.line_following,
            &self.line_calibrated,
            &self.line_position,
            &self.imu_calibrated,
            &self.current_heading,
            &self.target_heading,
            &self.headed,
            &self.impact_detected,
        ]
    }

    /// Directory of every share
    pub fn registry(&self) -> ConfigResult<ShareRegistry<'_>> {
        let mut registry = ShareRegistry::new();
        for share in self.all() {
            registry.register(share)?;
        }
        Ok(registry)
    }
}

impl Default for RoverShares {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_unique() {
        let shares = RoverShares::new();
        let registry = shares.registry().unwrap();
        assert_eq!(registry.len(), 11);
        assert!(registry.find("Impact Detected").is_some());
    }

    #[test]
    fn interrupt_facing_shares_are_protected() {
        let shares = RoverShares::new();
        assert!(shares.started.is_protected());
        assert!(shares.headed.is_protected());
        assert!(shares.impact_detected.is_protected());
        assert!(!shares.left_effort.is_protected());
    }

    #[test]
    fn stop_efforts_zeroes_both() {
        let shares = RoverShares::new();
        shares.left_effort.put(30.0);
        shares.right_effort.put(-30.0);
        shares.stop_efforts();
        assert_eq!(shares.left_effort.get(), 0.0);
        assert_eq!(shares.right_effort.get(), 0.0);
    }

    #[test]
    fn show_all_lists_values() {
        let shares = RoverShares::new();
        shares.line_position.put(3.25);
        let registry = shares.registry().unwrap();
        let text = registry.show_all();
        assert!(text.contains("line_position"));
        assert!(text.contains("value=3.25\n"));
        assert_eq!(text.lines().count(), 11);
    }
}
