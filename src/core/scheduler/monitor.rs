//! Scheduler health monitoring
//!
//! Aggregates per-task statistics into a summary, logs it, and warns about
//! tasks that are being starved or keep falling behind their period.
//! Intended to be called periodically from the top-level loop or from a
//! low-priority task.

use super::registry::Scheduler;
use crate::core::traits::time::TimeSource;

/// A task ready for this many consecutive passes without running is reported
pub const STARVATION_WARN_PASSES: u32 = 20;

/// Aggregated scheduler health
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SchedulerSummary {
    /// Registered tasks
    pub tasks: usize,
    /// Tasks still waiting to run
    pub active: usize,
    /// Sum of late releases over all tasks
    pub total_late_releases: u32,
    /// Tasks whose longest starvation streak exceeded the threshold
    pub starved_tasks: usize,
    /// Estimated CPU load in percent (0-100)
    pub cpu_load_percent: u8,
}

/// Estimated CPU load from average runtimes and periods.
///
/// Sums `avg_runtime_us / period` over all periodic tasks, the same way a
/// rate-based load estimate works. Tasks with period 0 run whenever nothing
/// else is ready and are left out.
pub fn cpu_load_percent<C: TimeSource, const N: usize>(scheduler: &Scheduler<'_, C, N>) -> u8 {
    let mut load_permille: u64 = 0;
    for (_, task) in scheduler.iter_tasks() {
        let period_us = task.period_ms() as u64 * 1000;
        if period_us == 0 {
            continue;
        }
        load_permille += task.stats().avg_runtime_us as u64 * 1000 / period_us;
    }
    (load_permille / 10).min(100) as u8
}

/// Build a summary without logging
pub fn summarize<C: TimeSource, const N: usize>(
    scheduler: &Scheduler<'_, C, N>,
) -> SchedulerSummary {
    let mut summary = SchedulerSummary {
        tasks: scheduler.task_count(),
        cpu_load_percent: cpu_load_percent(scheduler),
        ..SchedulerSummary::default()
    };

    for (_, task) in scheduler.iter_tasks() {
        let stats = task.stats();
        if task.state() == super::types::TaskState::Waiting {
            summary.active += 1;
        }
        summary.total_late_releases = summary
            .total_late_releases
            .saturating_add(stats.late_releases);
        if stats.max_starved_passes > STARVATION_WARN_PASSES {
            summary.starved_tasks += 1;
        }
    }
    summary
}

/// Log the scheduler summary and per-task warnings, returning the summary
pub fn report_stats<C: TimeSource, const N: usize>(
    scheduler: &Scheduler<'_, C, N>,
) -> SchedulerSummary {
    let summary = summarize(scheduler);

    crate::log_info!(
        "Scheduler: {} tasks ({} active), {} passes ({} idle), load ~{}%",
        summary.tasks,
        summary.active,
        scheduler.pass_count(),
        scheduler.idle_passes(),
        summary.cpu_load_percent
    );

    for (_, task) in scheduler.iter_tasks() {
        let stats = task.stats();
        crate::log_debug!(
            "  {}: runs={} avg={}us max={}us",
            task.name(),
            stats.runs,
            stats.avg_runtime_us,
            stats.max_runtime_us
        );
        if stats.max_starved_passes > STARVATION_WARN_PASSES {
            crate::log_warn!(
                "Task '{}' starved for {} consecutive passes",
                task.name(),
                stats.max_starved_passes
            );
        }
        if stats.late_releases > 0 {
            crate::log_warn!(
                "Task '{}' fell a period behind {} times",
                task.name(),
                stats.late_releases
            );
        }
    }

    summary
}
