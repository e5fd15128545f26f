//! Parameter System
//!
//! Tuning values and the task plan of the rover.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────┐
//! │   Application startup                  │
//! │   (register defaults, apply overrides) │
//! └──────────────┬─────────────────────────┘
//!                │
//!                ▼
//! ┌────────────────────────────────────────┐
//! │        ParameterStore                  │
//! │  - Fixed-capacity name → value map     │
//! │  - Type-checked overrides              │
//! └──────────────┬─────────────────────────┘
//!                │ from_store + validate
//!                ▼
//! ┌────────────────────────────────────────┐
//! │  ControlParams     TaskPlan            │
//! │  (gains, efforts)  (prio, period)      │
//! └────────────────────────────────────────┘
//! ```

pub mod control;
pub mod storage;
pub mod tasks;

pub use control::ControlParams;
pub use storage::{ParamValue, ParameterStore};
pub use tasks::TaskPlan;
