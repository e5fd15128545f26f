//! Priority scheduler over a fixed-capacity task list
//!
//! Tasks are registered once during initialization, in a chosen order, and
//! live for the rest of the program. Each call to [`Scheduler::run_pass`]
//! resumes at most one task: the highest-priority task whose period has
//! elapsed. Equal priorities are resolved by registration order.
//!
//! A low-priority task can therefore be delayed for as long as
//! higher-priority tasks keep becoming ready. This is accepted; the
//! `starved_passes` statistic makes it visible without changing selection.

use core::fmt::{self, Write};

use heapless::{String, Vec};

use super::task::Task;
use super::trace::{TraceBuffer, TraceEvent, TraceKind};
use super::types::{PassOutcome, Step, TaskId};
use crate::core::error::{ConfigError, ConfigResult, TaskFault};
use crate::core::traits::time::{set_pass_time_ms, Millis, TimeSource};

/// Default number of task slots
pub const MAX_TASKS: usize = 16;

/// Capacity of the rendered status table
pub const STATUS_TEXT_LEN: usize = 2048;

/// Cooperative priority scheduler
pub struct Scheduler<'a, C: TimeSource, const N: usize = MAX_TASKS> {
    clock: C,
    tasks: Vec<Task<'a>, N>,
    trace: TraceBuffer,
    passes: u32,
    idle_passes: u32,
}

impl<'a, C: TimeSource, const N: usize> Scheduler<'a, C, N> {
    /// Create an empty scheduler driven by `clock`
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            tasks: Vec::new(),
            trace: TraceBuffer::new(),
            passes: 0,
            idle_passes: 0,
        }
    }

    /// Add a task. Returns its id (registration index).
    ///
    /// Registration order is the tie-break between equal priorities.
    pub fn register(&mut self, task: Task<'a>) -> ConfigResult<TaskId> {
        if self.find_task_by_name(task.name()).is_some() {
            return Err(ConfigError::DuplicateTaskName(task.name()));
        }

        let id = self.tasks.len();
        let (name, priority, period_ms) = (task.name(), task.priority(), task.period_ms());
        self.tasks
            .push(task)
            .map_err(|_| ConfigError::RegistryFull { capacity: N })?;

        crate::log_debug!(
            "Registered task '{}' id={} prio={} period={}ms",
            name,
            id,
            priority,
            period_ms
        );
        Ok(id)
    }

    /// Run one scheduling pass at time `now`.
    ///
    /// Resumes at most one task. A task fault is not handled here: the task
    /// is marked faulted and the fault is returned to the caller, which must
    /// put the robot in a safe state.
    pub fn run_pass(&mut self, now: Millis) -> Result<PassOutcome, TaskFault> {
        set_pass_time_ms(now);
        self.passes = self.passes.wrapping_add(1);

        for task in self.tasks.iter_mut() {
            task.arm(now);
        }

        let mut chosen: Option<(TaskId, u8)> = None;
        for (id, task) in self.tasks.iter().enumerate() {
            if !task.is_ready(now) {
                continue;
            }
            match chosen {
                Some((_, best)) if best >= task.priority() => {}
                _ => chosen = Some((id, task.priority())),
            }
        }

        let Some((id, _)) = chosen else {
            self.idle_passes = self.idle_passes.wrapping_add(1);
            return Ok(PassOutcome::Idle);
        };

        for (other, task) in self.tasks.iter_mut().enumerate() {
            if other != id && task.is_ready(now) {
                task.stats_mut().record_starved();
            }
        }

        let task = &mut self.tasks[id];
        let name = task.name();
        let traced = task.config().trace;
        let result = task.run_once(now, &self.clock);

        match result {
            Ok((step, late)) => {
                if late {
                    crate::log_trace!("Task '{}' re-anchored at {}ms", name, now);
                }
                if traced {
                    if late {
                        self.trace.push(TraceEvent {
                            at_ms: now,
                            task: id,
                            name,
                            kind: TraceKind::Late,
                        });
                    }
                    let kind = match step {
                        Step::Yield => TraceKind::Resumed,
                        Step::Done => TraceKind::Finished,
                    };
                    self.trace.push(TraceEvent {
                        at_ms: now,
                        task: id,
                        name,
                        kind,
                    });
                }
                Ok(PassOutcome::Ran { task: id, step })
            }
            Err(fault) => {
                if traced {
                    self.trace.push(TraceEvent {
                        at_ms: now,
                        task: id,
                        name,
                        kind: TraceKind::Faulted,
                    });
                }
                crate::log_error!("{} at {}ms", fault, now);
                Err(fault)
            }
        }
    }

    /// Run one pass at the clock's current time
    pub fn tick(&mut self) -> Result<PassOutcome, TaskFault> {
        let now = self.clock.now_ms();
        self.run_pass(now)
    }

    /// Task by id
    pub fn task(&self, id: TaskId) -> Option<&Task<'a>> {
        self.tasks.get(id)
    }

    /// Task by name (linear search)
    pub fn find_task_by_name(&self, name: &str) -> Option<(TaskId, &Task<'a>)> {
        self.iter_tasks().find(|(_, task)| task.name() == name)
    }

    /// Iterate `(id, task)` in registration order
    pub fn iter_tasks(&self) -> impl Iterator<Item = (TaskId, &Task<'a>)> {
        self.tasks.iter().enumerate()
    }

    /// Number of registered tasks
    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }

    /// Passes run so far (wrapping)
    pub fn pass_count(&self) -> u32 {
        self.passes
    }

    /// Passes in which no task was ready
    pub fn idle_passes(&self) -> u32 {
        self.idle_passes
    }

    /// Recent events of traced tasks
    pub fn trace(&self) -> &TraceBuffer {
        &self.trace
    }

    /// Time source driving `tick`
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Clear every task's statistics and the pass counters
    pub fn reset_stats(&mut self) {
        for task in self.tasks.iter_mut() {
            task.stats_mut().reset();
        }
        self.passes = 0;
        self.idle_passes = 0;
    }

    /// Write the status table into a caller-owned sink
    pub fn write_status(&self, out: &mut dyn Write) -> fmt::Result {
        writeln!(
            out,
            "{:<18} {:>4} {:>6} {:>5} {:>7} {:>7} {:>7} {:>7} {:>5} {:>6}",
            "task", "prio", "period", "state", "runs", "avg_us", "min_us", "max_us", "late", "starve"
        )?;
        for (_, task) in self.iter_tasks() {
            write_task_line(task, out)?;
        }
        writeln!(
            out,
            "passes={} idle={}",
            self.passes, self.idle_passes
        )
    }

    /// Render the status table into a fixed-capacity string.
    ///
    /// Tasks that do not fit are left out; the text always ends on a
    /// complete line.
    pub fn dump_status(&self) -> String<STATUS_TEXT_LEN> {
        let mut text = String::new();
        let mut header: String<128> = String::new();
        let _ = writeln!(
            header,
            "{:<18} {:>4} {:>6} {:>5} {:>7} {:>7} {:>7} {:>7} {:>5} {:>6}",
            "task", "prio", "period", "state", "runs", "avg_us", "min_us", "max_us", "late", "starve"
        );
        let _ = text.push_str(&header);

        for (_, task) in self.iter_tasks() {
            let mut line: String<256> = String::new();
            if write_task_line(task, &mut line).is_err() || text.push_str(&line).is_err() {
                break;
            }
        }

        let mut footer: String<64> = String::new();
        if writeln!(footer, "passes={} idle={}", self.passes, self.idle_passes).is_ok() {
            let _ = text.push_str(&footer);
        }
        text
    }
}

fn write_task_line(task: &Task<'_>, out: &mut dyn Write) -> fmt::Result {
    let stats = task.stats();
    write!(
        out,
        "{:<18} {:>4} {:>6} {:>5} {:>7} {:>7} {:>7} {:>7} {:>5} {:>6}",
        task.name(),
        task.priority(),
        task.period_ms(),
        task.state().label(),
        stats.runs,
        stats.avg_runtime_us,
        stats.min_runtime_us,
        stats.max_runtime_us,
        stats.late_releases,
        stats.max_starved_passes
    )?;

    let shares = task.shares();
    if !shares.is_empty() {
        out.write_str("  [")?;
        for (i, share) in shares.iter().enumerate() {
            if i > 0 {
                out.write_str(", ")?;
            }
            out.write_str(share.name())?;
        }
        out.write_str("]")?;
    }
    out.write_str("\n")
}
