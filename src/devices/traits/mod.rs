//! Device traits
//!
//! This module contains hardware-independent trait definitions for device drivers.
//! These traits enable:
//! - Unit testing with mock implementations
//! - Sensor independence for the rover tasks
//! - Hardware changes without touching the task state machines

pub mod actuator;
pub mod sensor;

pub use actuator::{check_effort, MotorDriver, EFFORT_RANGE};
pub use sensor::{
    AdcChannel, BumpSwitch, CalibrationStatus, Counter, Encoder, HeadingSensor, LineArray,
};
