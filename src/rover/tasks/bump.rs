//! Bump sensor task
//!
//! Raises `Impact Detected` when any bumper switch closes. The flag stays
//! set until the planner acknowledges it by putting it back to false.

use crate::core::error::FaultCause;
use crate::core::scheduler::{Resumable, Step};
use crate::core::share::Share;
use crate::core::traits::time::Millis;
use crate::devices::traits::BumpSwitch;

use super::recoverable;

/// Bump task states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BumpState {
    /// Watching the switches
    Clear,
    /// Impact reported, waiting for acknowledgement
    Bumped,
    /// A switch returned a bad reading
    Recover,
}

impl BumpState {
    /// Short name for logs
    pub const fn label(self) -> &'static str {
        match self {
            BumpState::Clear => "clear",
            BumpState::Bumped => "bumped",
            BumpState::Recover => "recover",
        }
    }
}

/// Watches `N` bumper switches
pub struct BumpTask<'a, B: BumpSwitch, const N: usize> {
    switches: [B; N],
    impact: &'a Share<bool>,
    state: BumpState,
}

impl<'a, B: BumpSwitch, const N: usize> BumpTask<'a, B, N> {
    /// Create the task with every switch assumed released
    pub fn new(switches: [B; N], impact: &'a Share<bool>) -> Self {
        Self {
            switches,
            impact,
            state: BumpState::Clear,
        }
    }

    /// Current state
    pub fn state(&self) -> BumpState {
        self.state
    }

    fn transition(&mut self, next: BumpState) {
        crate::log_debug!("Bump sensor: {} -> {}", self.state.label(), next.label());
        self.state = next;
    }

    /// Poll every switch so each keeps its debounce state current.
    /// `None` if any reading was bad.
    fn any_pressed(&mut self, now: Millis) -> Result<Option<bool>, FaultCause> {
        let mut pressed = false;
        let mut valid = true;
        for switch in self.switches.iter_mut() {
            match recoverable(switch.pressed(now))? {
                Some(p) => pressed |= p,
                None => valid = false,
            }
        }
        Ok(valid.then_some(pressed))
    }
}

impl<B: BumpSwitch, const N: usize> Resumable for BumpTask<'_, B, N> {
    fn resume(&mut self, now: Millis) -> Result<Step, FaultCause> {
        match self.state {
            BumpState::Clear => match self.any_pressed(now)? {
                Some(true) => {
                    self.impact.put(true);
                    crate::log_warn!("Bump detected at {}ms", now);
                    self.transition(BumpState::Bumped);
                }
                Some(false) => {}
                None => self.transition(BumpState::Recover),
            },
            BumpState::Bumped => {
                if !self.impact.get() {
                    self.transition(BumpState::Clear);
                }
            }
            BumpState::Recover => {
                crate::log_warn!("Bump sensor: bad reading, watching again");
                self.transition(BumpState::Clear);
            }
        }
        Ok(Step::Yield)
    }
}
