//! Core traits for platform-agnostic scheduling.
//!
//! This module provides trait abstractions that decouple the scheduler and
//! the tasks from platform-specific implementations (Embassy, mock, etc.).
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │  Scheduler / Supervisor / rover tasks                │
//! │                      │                               │
//! │                      ▼                               │
//! │  ┌────────────────────────────────────────────────┐  │
//! │  │ TimeSource                                     │  │
//! │  │ + now_ms()  (wrapping u32)                     │  │
//! │  │ + now_us()  (wrapping u32, profiling)          │  │
//! │  └────────────────────────────────────────────────┘  │
//! │          ┌───────────┴───────────┐                   │
//! │          ▼                       ▼                   │
//! │  ┌───────────────────┐   ┌──────────────────────┐   │
//! │  │ EmbassyTime       │   │ MockTime             │   │
//! │  │ #[cfg(feature =   │   │ (always available)   │   │
//! │  │   "embassy")]     │   │                      │   │
//! │  └───────────────────┘   └──────────────────────┘   │
//! └──────────────────────────────────────────────────────┘
//! ```

pub mod time;

pub use time::{pass_time_ms, ticks_diff, Micros, Millis, MockTime, TimeSource};

#[cfg(feature = "embassy")]
pub use time::EmbassyTime;
