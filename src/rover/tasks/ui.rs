//! User interface: the start/stop button
//!
//! The button interrupt handler calls [`button_pressed`], which toggles the
//! protected `started` share. The task side only follows the flag and
//! reports changes.

use crate::core::error::FaultCause;
use crate::core::scheduler::{Resumable, Step};
use crate::core::share::Share;
use crate::core::traits::time::Millis;

/// Toggle `started` from the button interrupt; returns the new value.
///
/// The read and the write happen in one critical section, so this is safe
/// against the task context reading or writing the flag at the same time.
pub fn button_pressed(started: &Share<bool>) -> bool {
    started.modify(|active| !active)
}

/// UI states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum UiState {
    /// Waiting for the button
    Idle,
    /// Robot running
    Active,
}

/// Follows the started flag
pub struct UserInterfaceTask<'a> {
    started: &'a Share<bool>,
    changes: u32,
    state: UiState,
}

impl<'a> UserInterfaceTask<'a> {
    /// Create the task, idle until `started` is set
    pub fn new(started: &'a Share<bool>) -> Self {
        Self {
            started,
            changes: 0,
            state: UiState::Idle,
        }
    }

    /// Current UI state
    pub fn state(&self) -> UiState {
        self.state
    }

    /// Number of flag changes seen
    pub fn changes(&self) -> u32 {
        self.changes
    }
}

impl Resumable for UserInterfaceTask<'_> {
    fn resume(&mut self, now: Millis) -> Result<Step, FaultCause> {
        let active = self.started.get();
        match (self.state, active) {
            (UiState::Idle, true) => {
                crate::log_info!("Robot active at {}ms", now);
                self.changes += 1;
                self.state = UiState::Active;
            }
            (UiState::Active, false) => {
                crate::log_info!("Robot stopped at {}ms", now);
                self.changes += 1;
                self.state = UiState::Idle;
            }
            _ => {}
        }
        Ok(Step::Yield)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn button_toggles_started() {
        static STARTED: Share<bool> = Share::new_static("started", false, true);
        assert!(button_pressed(&STARTED));
        assert!(STARTED.get());
        assert!(!button_pressed(&STARTED));
        assert!(!STARTED.get());
    }

    #[test]
    fn task_follows_flag() {
        let started = Share::new("started", false, true).unwrap();
        let mut ui = UserInterfaceTask::new(&started);

        ui.resume(0).unwrap();
        assert_eq!(ui.state(), UiState::Idle);

        button_pressed(&started);
        ui.resume(30).unwrap();
        assert_eq!(ui.state(), UiState::Active);

        button_pressed(&started);
        ui.resume(60).unwrap();
        assert_eq!(ui.state(), UiState::Idle);
        assert_eq!(ui.changes(), 2);
    }

    #[test]
    fn presses_from_interrupt_are_never_lost() {
        const PRESSES: u32 = 1_001;
        static STARTED: Share<bool> = Share::new_static("started", false, true);
        let mut ui = UserInterfaceTask::new(&STARTED);

        std::thread::scope(|s| {
            let isr = s.spawn(|| {
                for _ in 0..PRESSES {
                    button_pressed(&STARTED);
                }
            });
            let mut now = 0;
            while !isr.is_finished() {
                ui.resume(now).unwrap();
                now += 1;
            }
        });

        // An odd number of toggles from false
        assert!(STARTED.get());
        assert_eq!(STARTED.write_count(), PRESSES);
        ui.resume(u32::MAX).unwrap();
        assert_eq!(ui.state(), UiState::Active);
    }
}
