//! Top-level run loop and safe stop
//!
//! The scheduler never catches task faults. The supervisor owns the loop
//! around it: it keeps ticking the scheduler until a shutdown is requested,
//! a pass limit is reached, or a task faults. In every case it engages the
//! [`SafetyAction`] (motors off) exactly once before returning, so actuators
//! are never left driven after the loop ends. On a fault the safety action
//! runs first; the fault and the status dump are logged after it.

use core::fmt;

use crate::core::error::TaskFault;
use crate::core::scheduler::Scheduler;
use crate::core::share::Share;
use crate::core::traits::time::TimeSource;

/// Why the loop is stopping
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StopReason {
    /// The shutdown share was set
    Shutdown,
    /// A task faulted
    Fault(TaskFault),
    /// The configured number of passes ran
    PassLimit,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopReason::Shutdown => write!(f, "shutdown requested"),
            StopReason::Fault(fault) => write!(f, "{}", fault),
            StopReason::PassLimit => write!(f, "pass limit reached"),
        }
    }
}

/// Brings the robot to a safe state
pub trait SafetyAction {
    /// Disable every actuator. Called once when the loop stops.
    fn engage(&mut self, reason: StopReason);
}

impl<F: FnMut(StopReason)> SafetyAction for F {
    fn engage(&mut self, reason: StopReason) {
        self(reason)
    }
}

/// How the loop ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RunOutcome {
    /// Stopped on request
    Shutdown,
    /// Stopped because a task faulted
    Faulted(TaskFault),
    /// Stopped after the configured number of passes
    PassLimit,
}

/// Owner of the top-level loop
pub struct Supervisor<'s, S: SafetyAction> {
    safety: S,
    shutdown: Option<&'s Share<bool>>,
    pass_limit: Option<u32>,
    passes: u32,
    outcome: Option<RunOutcome>,
}

impl<'s, S: SafetyAction> Supervisor<'s, S> {
    /// Create a supervisor that runs until a fault
    pub fn new(safety: S) -> Self {
        Self {
            safety,
            shutdown: None,
            pass_limit: None,
            passes: 0,
            outcome: None,
        }
    }

    /// Stop cleanly when `flag` becomes true
    pub fn with_shutdown(mut self, flag: &'s Share<bool>) -> Self {
        self.shutdown = Some(flag);
        self
    }

    /// Stop after `passes` scheduling passes
    pub fn with_pass_limit(mut self, passes: u32) -> Self {
        self.pass_limit = Some(passes);
        self
    }

    /// Whether the safety action has run
    pub fn is_engaged(&self) -> bool {
        self.outcome.is_some()
    }

    /// Passes run by this supervisor
    pub fn passes(&self) -> u32 {
        self.passes
    }

    /// The safety action
    pub fn safety(&self) -> &S {
        &self.safety
    }

    /// Run one pass, or stop.
    ///
    /// Returns `None` while the loop should continue. Once an outcome has
    /// been returned the safety action has been engaged; later calls return
    /// the same outcome without ticking the scheduler.
    pub fn poll<C: TimeSource, const N: usize>(
        &mut self,
        scheduler: &mut Scheduler<'_, C, N>,
    ) -> Option<RunOutcome> {
        if self.outcome.is_some() {
            return self.outcome;
        }
        if self.shutdown.is_some_and(|flag| flag.get()) {
            return Some(self.stop(StopReason::Shutdown, scheduler));
        }
        if self.pass_limit.is_some_and(|limit| self.passes >= limit) {
            return Some(self.stop(StopReason::PassLimit, scheduler));
        }

        self.passes = self.passes.wrapping_add(1);
        match scheduler.tick() {
            Ok(_) => None,
            Err(fault) => Some(self.stop(StopReason::Fault(fault), scheduler)),
        }
    }

    /// Tick `scheduler` until it has to stop
    pub fn run<C: TimeSource, const N: usize>(
        &mut self,
        scheduler: &mut Scheduler<'_, C, N>,
    ) -> RunOutcome {
        loop {
            if let Some(outcome) = self.poll(scheduler) {
                return outcome;
            }
        }
    }

    fn stop<C: TimeSource, const N: usize>(
        &mut self,
        reason: StopReason,
        scheduler: &Scheduler<'_, C, N>,
    ) -> RunOutcome {
        let outcome = match reason {
            StopReason::Shutdown => RunOutcome::Shutdown,
            StopReason::Fault(fault) => RunOutcome::Faulted(fault),
            StopReason::PassLimit => RunOutcome::PassLimit,
        };
        self.outcome = Some(outcome);

        // Actuators go off before any logging or status formatting
        self.safety.engage(reason);

        match reason {
            StopReason::Fault(fault) => {
                crate::log_error!("Stopping: {}", fault);
                let status = scheduler.dump_status();
                crate::log_error!("{}", status.as_str());
            }
            _ => crate::log_info!(
                "Stopping after {} passes: {}",
                scheduler.pass_count(),
                reason
            ),
        }
        outcome
    }
}
