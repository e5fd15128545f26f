//! Typed single-slot shares for inter-task communication
//!
//! A [`Share`] holds the latest value of one quantity (an effort, a flag, a
//! heading). Tasks poll it; there is no queue and no notification. A `put`
//! unconditionally overwrites, so a reader that skips a pass only sees the
//! newer value.
//!
//! A `Share` is `Sync`, so nothing stops one from ending up in a `static`
//! that an interrupt handler or a second thread also reaches. Every access
//! therefore runs inside a `critical_section::with` section and a
//! multi-word value is never seen half written. The `protected` flag marks
//! the shares an interrupt handler is expected to write; it shows up in the
//! diagnostics and changes nothing about how the slot is accessed.
//!
//! # Example
//!
//! ```
//! use romi_tasks::core::share::Share;
//!
//! let effort = Share::new("Left Effort", 0.0f32, false).unwrap();
//! effort.put(30.0);
//! effort.put(45.0);
//! assert_eq!(effort.get(), 45.0);
//! assert_eq!(effort.write_count(), 2);
//! ```

pub mod registry;

pub use registry::{ShareRegistry, MAX_SHARES};

use core::cell::Cell;
use core::fmt;

use critical_section::Mutex;

use super::error::{ConfigError, ConfigResult};
use super::traits::time::{pass_time_ms, Millis};

/// Value plus write bookkeeping, stored and loaded as one unit
#[derive(Clone, Copy)]
struct Slot<T> {
    value: T,
    written_at: Option<Millis>,
    writes: u32,
}

/// Named, last-write-wins variable shared between tasks
pub struct Share<T> {
    name: &'static str,
    protected: bool,
    slot: Mutex<Cell<Slot<T>>>,
}

impl<T: Copy> Share<T> {
    /// Create a share, rejecting an empty name.
    pub fn new(name: &'static str, initial: T, protected: bool) -> ConfigResult<Self> {
        if name.is_empty() {
            return Err(ConfigError::EmptyShareName);
        }
        Ok(Self::new_static(name, initial, protected))
    }

    /// Create a share in a `static` (required for shares an interrupt
    /// handler reaches). An empty name fails const evaluation.
    pub const fn new_static(name: &'static str, initial: T, protected: bool) -> Self {
        assert!(!name.is_empty(), "share name must not be empty");
        Self {
            name,
            protected,
            slot: Mutex::new(Cell::new(Slot {
                value: initial,
                written_at: None,
                writes: 0,
            })),
        }
    }

    /// Diagnostic name
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Whether an interrupt handler is expected to write this share
    pub fn is_protected(&self) -> bool {
        self.protected
    }

    /// Store `value` as the current value. Never fails.
    pub fn put(&self, value: T) {
        let stamp = pass_time_ms();
        self.with_slot(|cell| {
            cell.set(Slot {
                value,
                written_at: Some(stamp),
                writes: cell.get().writes.wrapping_add(1),
            })
        });
    }

    /// Most recently stored value. Never blocks.
    pub fn get(&self) -> T {
        self.with_slot(|cell| cell.get().value)
    }

    /// Read-modify-write as one access, returning the stored value.
    ///
    /// The whole update runs in one critical section, so an interrupt
    /// handler cannot slip a write in between the read and the store.
    pub fn modify<F>(&self, f: F) -> T
    where
        F: FnOnce(T) -> T,
    {
        let stamp = pass_time_ms();
        self.with_slot(|cell| {
            let slot = cell.get();
            let value = f(slot.value);
            cell.set(Slot {
                value,
                written_at: Some(stamp),
                writes: slot.writes.wrapping_add(1),
            });
            value
        })
    }

    /// Pass time of the last write, `None` if only the initial value was seen
    pub fn written_at(&self) -> Option<Millis> {
        self.with_slot(|cell| cell.get().written_at)
    }

    /// Number of writes since creation (wrapping)
    pub fn write_count(&self) -> u32 {
        self.with_slot(|cell| cell.get().writes)
    }

    fn with_slot<R, F>(&self, f: F) -> R
    where
        F: FnOnce(&Cell<Slot<T>>) -> R,
    {
        critical_section::with(|cs| f(self.slot.borrow(cs)))
    }
}

/// Type-erased view of a share for diagnostics
pub trait ShareInfo {
    /// Diagnostic name
    fn name(&self) -> &'static str;

    /// Whether an interrupt handler is expected to write the share
    fn is_protected(&self) -> bool;

    /// Number of writes since creation
    fn write_count(&self) -> u32;

    /// Pass time of the last write
    fn written_at(&self) -> Option<Millis>;

    /// Format the current value
    fn write_value(&self, out: &mut dyn fmt::Write) -> fmt::Result;
}

impl<T: Copy + fmt::Debug> ShareInfo for Share<T> {
    fn name(&self) -> &'static str {
        Share::name(self)
    }

    fn is_protected(&self) -> bool {
        Share::is_protected(self)
    }

    fn write_count(&self) -> u32 {
        Share::write_count(self)
    }

    fn written_at(&self) -> Option<Millis> {
        Share::written_at(self)
    }

    fn write_value(&self, out: &mut dyn fmt::Write) -> fmt::Result {
        write!(out, "{:?}", self.get())
    }
}
