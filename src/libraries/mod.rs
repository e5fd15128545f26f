//! Common libraries
//!
//! Vehicle-agnostic algorithms used by the rover tasks.
//!
//! ## Libraries
//!
//! - `pid`: discrete PID controller, throttled variant and angle helpers

pub mod pid;

pub use pid::{PidController, ThrottledPid};
