//! Core types for the task scheduler
//!
//! This module defines the fundamental types used by the task scheduler:
//! - Task configuration (validated at construction)
//! - Task statistics (runtime monitoring)
//! - Pass outcomes

use crate::core::error::{ConfigError, ConfigResult};
use crate::core::traits::time::Millis;

/// Longest period the wrapping millisecond clock can compare safely
pub const MAX_PERIOD_MS: u32 = i32::MAX as u32;

/// Index of a task in registration order
pub type TaskId = usize;

/// When a task becomes eligible for its first run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StartPolicy {
    /// Ready on the first pass
    #[default]
    Immediate,
    /// Ready one period after the first pass the scheduler runs
    AfterPeriod,
}

/// Per-task configuration
///
/// Each task in the scheduler has associated configuration that defines its
/// execution characteristics.
#[derive(Debug, Clone, Copy)]
pub struct TaskConfig {
    /// Human-readable task name for logging and diagnostics
    pub name: &'static str,

    /// Priority (higher = served first, equal priorities resolved by
    /// registration order)
    pub priority: u8,

    /// Minimum milliseconds between successive resumptions (0 = every pass)
    pub period_ms: u32,

    /// Initial eligibility
    pub start: StartPolicy,

    /// Measure runtime of each resumption
    pub profile: bool,

    /// Record scheduling events in the trace buffer
    pub trace: bool,
}

impl TaskConfig {
    /// Configuration with immediate start, profiling on and tracing off
    pub const fn new(name: &'static str, priority: u8, period_ms: u32) -> Self {
        Self {
            name,
            priority,
            period_ms,
            start: StartPolicy::Immediate,
            profile: true,
            trace: false,
        }
    }

    /// Set the start policy
    pub const fn start(mut self, start: StartPolicy) -> Self {
        self.start = start;
        self
    }

    /// Enable or disable runtime profiling
    pub const fn profile(mut self, profile: bool) -> Self {
        self.profile = profile;
        self
    }

    /// Enable or disable event tracing
    pub const fn trace(mut self, trace: bool) -> Self {
        self.trace = trace;
        self
    }

    /// Check the configuration before a task is built from it
    pub fn validate(&self) -> ConfigResult<()> {
        if self.name.is_empty() {
            return Err(ConfigError::EmptyTaskName);
        }
        if self.period_ms > MAX_PERIOD_MS {
            return Err(ConfigError::PeriodOutOfRange {
                task: self.name,
                period_ms: self.period_ms,
            });
        }
        Ok(())
    }
}

/// Lifecycle of a task inside the scheduler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TaskState {
    /// Waiting for its period to elapse or for its turn
    Waiting,
    /// Computation returned `Step::Done`; never scheduled again
    Finished,
    /// Computation raised a fault; never scheduled again
    Faulted,
}

impl TaskState {
    /// Short label for status tables
    pub const fn label(self) -> &'static str {
        match self {
            TaskState::Waiting => "wait",
            TaskState::Finished => "done",
            TaskState::Faulted => "FAULT",
        }
    }
}

/// What a single resumption ended with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Step {
    /// Suspended at a yield point; resume again next period
    Yield,
    /// Computation finished; the task retires
    Done,
}

/// Result of one scheduling pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PassOutcome {
    /// No task was ready
    Idle,
    /// Exactly one task was resumed
    Ran { task: TaskId, step: Step },
}

/// Runtime statistics for a single task
///
/// These statistics are updated after each resumption and can be queried
/// for monitoring and tuning of periods and priorities.
#[derive(Debug, Clone, Copy, Default)]
pub struct TaskStats {
    /// Total number of resumptions
    pub runs: u32,

    /// Last runtime in microseconds
    pub last_runtime_us: u32,

    /// Shortest runtime observed (0 until the first profiled run)
    pub min_runtime_us: u32,

    /// Longest runtime observed
    pub max_runtime_us: u32,

    /// Average runtime (exponential moving average, alpha = 0.1)
    pub avg_runtime_us: u32,

    /// Releases that fell at least one whole period behind
    pub late_releases: u32,

    /// Consecutive passes the task was ready but another task was chosen
    pub starved_passes: u32,

    /// Longest such streak observed
    pub max_starved_passes: u32,

    /// Pass time of the last resumption
    pub last_run_ms: Option<Millis>,
}

impl TaskStats {
    /// Record a resumption at `now`
    pub fn record_run(&mut self, now: Millis) {
        self.runs = self.runs.saturating_add(1);
        self.last_run_ms = Some(now);
        self.starved_passes = 0;
    }

    /// Record the measured runtime of the last resumption
    pub fn record_runtime(&mut self, runtime_us: u32) {
        self.last_runtime_us = runtime_us;

        // EMA formula with alpha = 0.1 in fixed point:
        // avg_new = (value + 9 * avg_old) / 10
        if self.runs <= 1 {
            self.avg_runtime_us = runtime_us;
            self.min_runtime_us = runtime_us;
        } else {
            let avg = (runtime_us as u64 + 9 * self.avg_runtime_us as u64) / 10;
            self.avg_runtime_us = avg as u32;
            self.min_runtime_us = self.min_runtime_us.min(runtime_us);
        }

        if runtime_us > self.max_runtime_us {
            self.max_runtime_us = runtime_us;
        }
    }

    /// Record a pass in which the task was ready but not selected
    pub fn record_starved(&mut self) {
        self.starved_passes = self.starved_passes.saturating_add(1);
        if self.starved_passes > self.max_starved_passes {
            self.max_starved_passes = self.starved_passes;
        }
    }

    /// Record a release that fell behind by a whole period
    pub fn record_late(&mut self) {
        self.late_releases = self.late_releases.saturating_add(1);
    }

    /// Reset all statistics to initial state
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_builder() {
        let config = TaskConfig::new("Motor Control", 4, 25)
            .start(StartPolicy::AfterPeriod)
            .profile(false)
            .trace(true);

        assert_eq!(config.name, "Motor Control");
        assert_eq!(config.priority, 4);
        assert_eq!(config.period_ms, 25);
        assert_eq!(config.start, StartPolicy::AfterPeriod);
        assert!(!config.profile);
        assert!(config.trace);
    }

    #[test]
    fn config_validation() {
        assert!(TaskConfig::new("ok", 1, 0).validate().is_ok());
        assert!(TaskConfig::new("ok", 1, MAX_PERIOD_MS).validate().is_ok());
        assert_eq!(
            TaskConfig::new("", 1, 10).validate(),
            Err(ConfigError::EmptyTaskName)
        );
        assert_eq!(
            TaskConfig::new("slow", 1, MAX_PERIOD_MS + 1).validate(),
            Err(ConfigError::PeriodOutOfRange {
                task: "slow",
                period_ms: MAX_PERIOD_MS + 1
            })
        );
    }

    #[test]
    fn stats_runtime_tracking() {
        let mut stats = TaskStats::default();

        stats.record_run(0);
        stats.record_runtime(1500);
        assert_eq!(stats.runs, 1);
        assert_eq!(stats.avg_runtime_us, 1500);
        assert_eq!(stats.min_runtime_us, 1500);
        assert_eq!(stats.max_runtime_us, 1500);

        stats.record_run(10);
        stats.record_runtime(500);
        assert_eq!(stats.avg_runtime_us, (500 + 9 * 1500) / 10);
        assert_eq!(stats.min_runtime_us, 500);
        assert_eq!(stats.max_runtime_us, 1500);
        assert_eq!(stats.last_run_ms, Some(10));

        stats.record_run(20);
        stats.record_runtime(2100);
        assert_eq!(stats.max_runtime_us, 2100);
        assert_eq!(stats.min_runtime_us, 500);
        assert_eq!(stats.runs, 3);
    }

    #[test]
    fn stats_starvation_streak() {
        let mut stats = TaskStats::default();
        stats.record_starved();
        stats.record_starved();
        stats.record_starved();
        assert_eq!(stats.starved_passes, 3);

        stats.record_run(5);
        assert_eq!(stats.starved_passes, 0);
        assert_eq!(stats.max_starved_passes, 3);

        stats.record_starved();
        assert_eq!(stats.max_starved_passes, 3);
    }

    #[test]
    fn stats_reset() {
        let mut stats = TaskStats::default();
        stats.record_run(1);
        stats.record_late();
        stats.reset();
        assert_eq!(stats.runs, 0);
        assert_eq!(stats.late_releases, 0);
        assert_eq!(stats.last_run_ms, None);
    }
}
