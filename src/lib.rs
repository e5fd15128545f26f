#![cfg_attr(not(test), no_std)]

//! romi_tasks - Cooperative task scheduling for a Romi line-following robot
//!
//! This library provides the priority-based cooperative scheduler, the typed
//! share mechanism tasks use to talk to each other, and the rover task set
//! (motor control, line sensing, heading, bump detection, path planning)
//! built on top of them. Nothing here allocates; all containers are
//! fixed-capacity.

// Core systems: time source, shares, scheduler, supervisor
pub mod core;

// Tunable parameters and the task table
pub mod parameters;

// Control algorithms (PID)
pub mod libraries;

// Driver traits, small generic drivers and host mocks
pub mod devices;

// Rover task set and safety action
pub mod rover;
