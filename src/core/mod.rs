//! Core scheduling functionality
//!
//! This module contains the cooperative scheduler, the share primitive tasks
//! use for communication, and the supporting time, error and logging
//! infrastructure.

pub mod error;
pub mod logging;
pub mod scheduler;
pub mod share;
pub mod supervisor;
pub mod traits;
