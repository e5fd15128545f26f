//! Task Plan
//!
//! Priority, period and diagnostics flags of every rover task.
//!
//! | Task           | Priority | Period | Profile | Trace |
//! |----------------|----------|--------|---------|-------|
//! | Planner        | 3        | 30 ms  | yes     | yes   |
//! | Line Sensor    | 2        | 20 ms  | yes     | yes   |
//! | IMU Heading    | 1        | 40 ms  | yes     | yes   |
//! | Bump Sensor    | 3        | 20 ms  | yes     | yes   |
//! | Motor Control  | 4        | 25 ms  | yes     | yes   |
//! | User Interface | 1        | 30 ms  | no      | no    |
//!
//! Planner and Bump Sensor share priority 3; the planner is registered
//! first and wins ties.

use crate::core::error::{ConfigError, ConfigResult};
use crate::core::scheduler::TaskConfig;

/// Planner task name
pub const PLANNER: &str = "Planner";
/// Line sensor task name
pub const LINE_SENSOR: &str = "Line Sensor";
/// IMU heading task name
pub const IMU_HEADING: &str = "IMU Heading";
/// Bump sensor task name
pub const BUMP_SENSOR: &str = "Bump Sensor";
/// Motor control task name
pub const MOTOR_CONTROL: &str = "Motor Control";
/// User interface task name
pub const USER_INTERFACE: &str = "User Interface";

/// Number of rover tasks
pub const ROVER_TASKS: usize = 6;

/// Scheduling configuration of the rover task set
#[derive(Debug, Clone, Copy)]
pub struct TaskPlan {
    pub planner: TaskConfig,
    pub line_sensor: TaskConfig,
    pub heading: TaskConfig,
    pub bump: TaskConfig,
    pub motor: TaskConfig,
    pub ui: TaskConfig,
}

impl Default for TaskPlan {
    fn default() -> Self {
        Self {
            planner: TaskConfig::new(PLANNER, 3, 30).trace(true),
            line_sensor: TaskConfig::new(LINE_SENSOR, 2, 20).trace(true),
            heading: TaskConfig::new(IMU_HEADING, 1, 40).trace(true),
            bump: TaskConfig::new(BUMP_SENSOR, 3, 20).trace(true),
            motor: TaskConfig::new(MOTOR_CONTROL, 4, 25).trace(true),
            ui: TaskConfig::new(USER_INTERFACE, 1, 30).profile(false),
        }
    }
}

impl TaskPlan {
    /// All configurations in registration order
    pub fn configs(&self) -> [TaskConfig; ROVER_TASKS] {
        [
            self.planner,
            self.line_sensor,
            self.heading,
            self.bump,
            self.motor,
            self.ui,
        ]
    }

    /// Validate every entry and reject duplicate names
    pub fn validate(&self) -> ConfigResult<()> {
        let configs = self.configs();
        for (i, config) in configs.iter().enumerate() {
            config.validate()?;
            if configs[..i].iter().any(|c| c.name == config.name) {
                return Err(ConfigError::DuplicateTaskName(config.name));
            }
        }
        Ok(())
    }
}
