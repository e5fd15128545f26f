//! Rover task set
//!
//! The Romi line-following robot built on the core scheduler: the shares
//! its tasks communicate through, the task state machines, and the safety
//! action that cuts the motors when the loop stops.
//!
//! ## Modules
//!
//! - `shares`: every share of the robot, with its name and protection
//! - `tasks`: planner, line sensor, IMU heading, bump sensor, motor
//!   control and user interface
//! - `safety`: motor cutoff engaged by the supervisor

pub mod safety;
pub mod shares;
pub mod tasks;

pub use safety::ActuatorCutoff;
pub use shares::RoverShares;
