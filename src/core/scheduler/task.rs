//! Tasks: a resumable computation plus its scheduling bookkeeping
//!
//! A task's computation is an object that keeps everything a suspended
//! generator frame would keep (FSM state, counters, partial results) in its
//! own fields and exposes a single [`Resumable::resume`] step. The scheduler
//! knows nothing about what happens inside; it only sees whether the step
//! yielded, finished or faulted.
//!
//! Every `resume` must return within a bounded number of steps. There is no
//! preemption: a computation that loops waiting for a share to change hangs
//! every other task in the system.

use super::types::{Step, TaskConfig, TaskState, TaskStats};
use crate::core::error::{ConfigResult, FaultCause, TaskFault};
use crate::core::share::ShareInfo;
use crate::core::traits::time::{ticks_diff, Millis, TimeSource};

use super::types::StartPolicy;

/// A computation that runs one bounded step per resumption
pub trait Resumable {
    /// Run from the last yield point to the next one.
    ///
    /// `now` is the time of the scheduling pass.
    fn resume(&mut self, now: Millis) -> Result<Step, FaultCause>;
}

impl<F> Resumable for F
where
    F: FnMut(Millis) -> Result<Step, FaultCause>,
{
    fn resume(&mut self, now: Millis) -> Result<Step, FaultCause> {
        self(now)
    }
}

/// A registered unit of cooperative work
pub struct Task<'a> {
    config: TaskConfig,
    body: &'a mut dyn Resumable,
    shares: &'a [&'a dyn ShareInfo],
    release_ms: Option<Millis>,
    state: TaskState,
    stats: TaskStats,
}

impl<'a> Task<'a> {
    /// Build a task from a computation and a validated configuration
    pub fn new(body: &'a mut dyn Resumable, config: TaskConfig) -> ConfigResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            body,
            shares: &[],
            release_ms: None,
            state: TaskState::Waiting,
            stats: TaskStats::default(),
        })
    }

    /// Record the shares this task's computation uses (diagnostics only)
    pub fn with_shares(mut self, shares: &'a [&'a dyn ShareInfo]) -> Self {
        self.shares = shares;
        self
    }

    /// Task name
    pub fn name(&self) -> &'static str {
        self.config.name
    }

    /// Task priority
    pub fn priority(&self) -> u8 {
        self.config.priority
    }

    /// Task period in milliseconds
    pub fn period_ms(&self) -> u32 {
        self.config.period_ms
    }

    /// Full configuration
    pub fn config(&self) -> &TaskConfig {
        &self.config
    }

    /// Shares the task declared
    pub fn shares(&self) -> &'a [&'a dyn ShareInfo] {
        self.shares
    }

    /// Lifecycle state
    pub fn state(&self) -> TaskState {
        self.state
    }

    /// Runtime statistics
    pub fn stats(&self) -> &TaskStats {
        &self.stats
    }

    pub(crate) fn stats_mut(&mut self) -> &mut TaskStats {
        &mut self.stats
    }

    /// Pass time of the last resumption
    pub fn last_run_ms(&self) -> Option<Millis> {
        self.stats.last_run_ms
    }

    /// Anchor the release schedule on the first pass the scheduler runs.
    pub(crate) fn arm(&mut self, now: Millis) {
        if self.release_ms.is_none() {
            self.release_ms = Some(match self.config.start {
                StartPolicy::Immediate => now.wrapping_sub(self.config.period_ms),
                StartPolicy::AfterPeriod => now,
            });
        }
    }

    /// True if at least one period has elapsed since the last release.
    ///
    /// A period of 0 means ready on every pass. Finished and faulted tasks
    /// are never ready.
    pub fn is_ready(&self, now: Millis) -> bool {
        if self.state != TaskState::Waiting {
            return false;
        }
        match self.release_ms {
            Some(release) => ticks_diff(now, release) >= self.config.period_ms,
            None => self.config.start == StartPolicy::Immediate || self.config.period_ms == 0,
        }
    }

    /// Resume the computation once and update the bookkeeping.
    ///
    /// Returns `Ok(true)` in the second field when the release had fallen a
    /// whole period behind and was re-anchored.
    pub fn run_once<C: TimeSource>(
        &mut self,
        now: Millis,
        clock: &C,
    ) -> Result<(Step, bool), TaskFault> {
        let late = self.advance_release(now);

        let start_us = self.config.profile.then(|| clock.now_us());
        let result = self.body.resume(now);
        self.stats.record_run(now);
        if let Some(start_us) = start_us {
            self.stats.record_runtime(ticks_diff(clock.now_us(), start_us));
        }

        match result {
            Ok(Step::Yield) => Ok((Step::Yield, late)),
            Ok(Step::Done) => {
                self.state = TaskState::Finished;
                crate::log_info!("Task '{}' finished", self.config.name);
                Ok((Step::Done, late))
            }
            Err(cause) => {
                self.state = TaskState::Faulted;
                Err(TaskFault {
                    task: self.config.name,
                    cause,
                })
            }
        }
    }

    /// Move the release point forward by one period.
    ///
    /// The schedule is anchored: a task released at 0 with period 20 is due
    /// at 20, 40, 60 even if it actually ran at 5 or 45. A task that fell a
    /// whole period behind is re-anchored at `now` instead of bursting to
    /// catch up.
    fn advance_release(&mut self, now: Millis) -> bool {
        let period = self.config.period_ms;
        let release = match self.release_ms {
            Some(release) if period > 0 => release,
            _ => {
                self.release_ms = Some(now);
                return false;
            }
        };

        let elapsed = ticks_diff(now, release);
        if elapsed >= period.saturating_mul(2) {
            self.release_ms = Some(now);
            self.stats.record_late();
            true
        } else if elapsed >= period {
            self.release_ms = Some(release.wrapping_add(period));
            false
        } else {
            // Resumed before it was due (direct call outside the scheduler)
            self.release_ms = Some(now);
            false
        }
    }
}
