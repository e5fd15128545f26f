//! Time abstraction traits for platform-agnostic timing operations.
//!
//! This module provides the `TimeSource` trait that abstracts over different
//! time providers (Embassy, mock, etc.) to enable host testing without
//! embedded dependencies.
//!
//! Tick counts are `u32` and wrap, like a hardware millisecond counter.
//! All interval arithmetic goes through [`ticks_diff`], which stays correct
//! across the wrap as long as the real interval is shorter than 2^32 ticks.

use core::cell::Cell;
use core::sync::atomic::{AtomicU32, Ordering};

/// Wrapping millisecond tick count
pub type Millis = u32;

/// Wrapping microsecond tick count
pub type Micros = u32;

/// Elapsed ticks from `earlier` to `later`, wraparound-safe.
#[inline]
pub const fn ticks_diff(later: u32, earlier: u32) -> u32 {
    later.wrapping_sub(earlier)
}

/// Platform-agnostic time source for the scheduler and profiling.
///
/// This trait abstracts over different time providers:
/// - `EmbassyTime` for embedded targets using Embassy
/// - `MockTime` for host testing with controllable time
///
/// # Example
///
/// ```
/// use romi_tasks::core::traits::{MockTime, TimeSource};
///
/// fn due<T: TimeSource>(time: &T, last_ms: u32, period_ms: u32) -> bool {
///     time.elapsed_ms_since(last_ms) >= period_ms
/// }
///
/// let time = MockTime::new();
/// time.advance_ms(20);
/// assert!(due(&time, 0, 20));
/// ```
pub trait TimeSource {
    /// Returns current time in milliseconds since system start (wrapping).
    fn now_ms(&self) -> Millis;

    /// Returns current time in microseconds since system start (wrapping).
    fn now_us(&self) -> Micros;

    /// Returns elapsed milliseconds since a reference point.
    fn elapsed_ms_since(&self, reference_ms: Millis) -> u32 {
        ticks_diff(self.now_ms(), reference_ms)
    }
}

impl<T: TimeSource + ?Sized> TimeSource for &T {
    fn now_ms(&self) -> Millis {
        (**self).now_ms()
    }

    fn now_us(&self) -> Micros {
        (**self).now_us()
    }
}

// ============================================================================
// Pass clock
// ============================================================================

static PASS_TIME_MS: AtomicU32 = AtomicU32::new(0);

/// Time of the most recent scheduling pass.
///
/// Shares stamp their writes with this value, so a write made by a task (or
/// by an interrupt handler between passes) is attributed to the pass it
/// happened in.
pub fn pass_time_ms() -> Millis {
    PASS_TIME_MS.load(Ordering::Relaxed)
}

/// Publish the time of the pass that is about to run.
pub(crate) fn set_pass_time_ms(now: Millis) {
    PASS_TIME_MS.store(now, Ordering::Relaxed);
}

// ============================================================================
// Embassy Implementation
// ============================================================================

/// Embassy-based time source using the Embassy time driver.
#[cfg(feature = "embassy")]
#[derive(Clone, Copy, Default)]
pub struct EmbassyTime;

#[cfg(feature = "embassy")]
impl TimeSource for EmbassyTime {
    fn now_ms(&self) -> Millis {
        embassy_time::Instant::now().as_millis() as Millis
    }

    fn now_us(&self) -> Micros {
        embassy_time::Instant::now().as_micros() as Micros
    }
}

// ============================================================================
// Mock Implementation (always available for testing)
// ============================================================================

/// Mock time source for testing with controllable time advancement.
///
/// Internally counts microseconds in 64 bits; the trait methods truncate to
/// the wrapping 32-bit tick counts a hardware timer would deliver.
///
/// # Example
///
/// ```
/// use romi_tasks::core::traits::{MockTime, TimeSource};
///
/// let time = MockTime::new();
/// assert_eq!(time.now_ms(), 0);
///
/// time.advance_us(1500);
/// assert_eq!(time.now_us(), 1500);
/// assert_eq!(time.now_ms(), 1);
/// ```
#[derive(Default)]
pub struct MockTime {
    current_us: Cell<u64>,
}

impl MockTime {
    /// Creates a new `MockTime` starting at time 0.
    pub fn new() -> Self {
        Self {
            current_us: Cell::new(0),
        }
    }

    /// Creates a new `MockTime` starting at the specified millisecond.
    pub fn with_initial_ms(ms: u64) -> Self {
        Self {
            current_us: Cell::new(ms * 1000),
        }
    }

    /// Sets the current time to an absolute millisecond value.
    pub fn set_ms(&self, ms: u64) {
        self.current_us.set(ms * 1000);
    }

    /// Advances the current time by whole milliseconds.
    pub fn advance_ms(&self, ms: u64) {
        self.advance_us(ms * 1000);
    }

    /// Advances the current time by microseconds.
    pub fn advance_us(&self, us: u64) {
        self.current_us.set(self.current_us.get() + us);
    }
}

impl TimeSource for MockTime {
    fn now_ms(&self) -> Millis {
        (self.current_us.get() / 1000) as Millis
    }

    fn now_us(&self) -> Micros {
        self.current_us.get() as Micros
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
