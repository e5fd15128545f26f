//! Error types
//!
//! Three kinds of failure exist in this crate:
//! - [`ConfigError`]: rejected at construction/registration time
//! - [`DeviceError`]: reported by a driver to the task that called it
//! - [`TaskFault`]: a task gave up during a resumption; escapes `run_pass`
//!   and must be handled by the top-level loop

use core::fmt;

/// Result type for configuration operations
pub type ConfigResult<T> = core::result::Result<T, ConfigError>;

/// Configuration errors detected while building the system
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Task name is empty
    EmptyTaskName,
    /// Share name is empty
    EmptyShareName,
    /// A task with this name is already registered
    DuplicateTaskName(&'static str),
    /// A share with this name is already registered
    DuplicateShareName(&'static str),
    /// Period cannot be represented by the wrapping millisecond clock
    PeriodOutOfRange {
        task: &'static str,
        period_ms: u32,
    },
    /// Fixed-capacity registry has no free slot
    RegistryFull { capacity: usize },
    /// Parameter outside its valid range
    InvalidParameter(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::EmptyTaskName => write!(f, "task name must not be empty"),
            ConfigError::EmptyShareName => write!(f, "share name must not be empty"),
            ConfigError::DuplicateTaskName(name) => write!(f, "duplicate task name '{}'", name),
            ConfigError::DuplicateShareName(name) => {
                write!(f, "duplicate share name '{}'", name)
            }
            ConfigError::PeriodOutOfRange { task, period_ms } => {
                write!(f, "task '{}': period {}ms out of range", task, period_ms)
            }
            ConfigError::RegistryFull { capacity } => {
                write!(f, "registry full ({} entries)", capacity)
            }
            ConfigError::InvalidParameter(name) => write!(f, "invalid parameter {}", name),
        }
    }
}

/// Driver-level errors
///
/// Driver implementations map their HAL-specific errors to these variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DeviceError {
    /// Bus transfer (I2C, ADC) failed
    Bus,
    /// Device did not answer in time
    Timeout,
    /// Reading requested before calibration completed
    NotCalibrated,
    /// Device returned or was given a value outside its range
    InvalidReading,
    /// GPIO or PWM pin operation failed
    Pin,
}

impl fmt::Display for DeviceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceError::Bus => write!(f, "bus error"),
            DeviceError::Timeout => write!(f, "device timeout"),
            DeviceError::NotCalibrated => write!(f, "device not calibrated"),
            DeviceError::InvalidReading => write!(f, "invalid reading"),
            DeviceError::Pin => write!(f, "pin error"),
        }
    }
}

/// Why a task computation stopped with a fault
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FaultCause {
    /// A driver call failed and the task cannot continue
    Device(DeviceError),
    /// The task detected an internal inconsistency
    Invariant(&'static str),
}

impl From<DeviceError> for FaultCause {
    fn from(err: DeviceError) -> Self {
        FaultCause::Device(err)
    }
}

impl fmt::Display for FaultCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FaultCause::Device(e) => write!(f, "device: {}", e),
            FaultCause::Invariant(what) => write!(f, "invariant violated: {}", what),
        }
    }
}

/// Unrecoverable fault raised by a task during `run_once`
///
/// The scheduler never catches this; it propagates to the caller of
/// `run_pass`, which owns the safety action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TaskFault {
    /// Name of the faulted task
    pub task: &'static str,
    /// What went wrong
    pub cause: FaultCause,
}

impl fmt::Display for TaskFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "task '{}' faulted: {}", self.task, self.cause)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_error_converts_into_fault_cause() {
        let cause: FaultCause = DeviceError::Timeout.into();
        assert_eq!(cause, FaultCause::Device(DeviceError::Timeout));
    }

    #[test]
    fn task_fault_display_names_task_and_cause() {
        let fault = TaskFault {
            task: "IMU Heading",
            cause: FaultCause::Device(DeviceError::Bus),
        };
        assert_eq!(
            format!("{}", fault),
            "task 'IMU Heading' faulted: device: bus error"
        );
    }

    #[test]
    fn config_error_display() {
        let err = ConfigError::PeriodOutOfRange {
            task: "UI",
            period_ms: u32::MAX,
        };
        assert_eq!(
            format!("{}", err),
            "task 'UI': period 4294967295ms out of range"
        );
        assert_eq!(
            format!("{}", ConfigError::DuplicateTaskName("Motor Control")),
            "duplicate task name 'Motor Control'"
        );
    }
}
