//! Cooperative priority scheduler
//!
//! Tasks are resumable computations with a priority and a period. A
//! scheduling pass picks the single highest-priority task whose period has
//! elapsed and resumes it; the task runs to its next yield point and hands
//! control back. Nothing is preempted, so each resumption must be short.
//!
//! ## Architecture
//!
//! - `types`: task configuration, lifecycle state, statistics
//! - `task`: the `Resumable` computation and per-task bookkeeping
//! - `registry`: the `Scheduler` itself
//! - `trace`: ring buffer of recent scheduling events
//! - `monitor`: aggregated health reporting
//!
//! ## Usage
//!
//! ```
//! use romi_tasks::core::error::FaultCause;
//! use romi_tasks::core::scheduler::{Scheduler, Step, Task, TaskConfig};
//! use romi_tasks::core::traits::MockTime;
//!
//! let mut blink = |_now: u32| -> Result<Step, FaultCause> { Ok(Step::Yield) };
//!
//! let mut scheduler: Scheduler<'_, MockTime> = Scheduler::new(MockTime::new());
//! scheduler
//!     .register(Task::new(&mut blink, TaskConfig::new("Blink", 1, 500)).unwrap())
//!     .unwrap();
//!
//! assert!(scheduler.run_pass(0).is_ok());
//! assert_eq!(scheduler.task(0).unwrap().stats().runs, 1);
//! ```

pub mod monitor;
pub mod registry;
pub mod task;
pub mod trace;
pub mod types;

pub use monitor::{report_stats, SchedulerSummary, STARVATION_WARN_PASSES};
pub use registry::{Scheduler, MAX_TASKS, STATUS_TEXT_LEN};
pub use task::{Resumable, Task};
pub use trace::{TraceBuffer, TraceEvent, TraceKind, TRACE_DEPTH};
pub use types::{
    PassOutcome, StartPolicy, Step, TaskConfig, TaskId, TaskState, TaskStats, MAX_PERIOD_MS,
};
