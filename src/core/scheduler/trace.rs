//! Scheduling event trace
//!
//! Fixed-capacity ring of the most recent scheduling events for tasks that
//! were configured with `trace(true)`. Uses heapless HistoryBuf, so the
//! oldest event is evicted when the ring is full.

use core::fmt::{self, Write};

use heapless::{HistoryBuf, String};

use super::types::TaskId;
use crate::core::traits::time::Millis;

/// Number of events kept
pub const TRACE_DEPTH: usize = 32;

/// Capacity of the rendered trace text
pub const TRACE_TEXT_LEN: usize = 1024;

/// What happened to a traced task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TraceKind {
    /// Resumed and yielded
    Resumed,
    /// Resumed and finished
    Finished,
    /// Resumed and faulted
    Faulted,
    /// Release re-anchored after falling a period behind
    Late,
}

impl TraceKind {
    fn label(self) -> &'static str {
        match self {
            TraceKind::Resumed => "run",
            TraceKind::Finished => "done",
            TraceKind::Faulted => "fault",
            TraceKind::Late => "late",
        }
    }
}

/// One trace record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TraceEvent {
    /// Pass time of the event
    pub at_ms: Millis,
    /// Registration index of the task
    pub task: TaskId,
    /// Task name
    pub name: &'static str,
    /// Event kind
    pub kind: TraceKind,
}

/// Ring buffer of recent scheduling events
pub struct TraceBuffer {
    events: HistoryBuf<TraceEvent, TRACE_DEPTH>,
    overflow_count: u32,
}

impl TraceBuffer {
    /// Create an empty trace
    pub const fn new() -> Self {
        Self {
            events: HistoryBuf::new(),
            overflow_count: 0,
        }
    }

    /// Append an event, evicting the oldest when full
    pub fn push(&mut self, event: TraceEvent) {
        if self.events.len() == TRACE_DEPTH {
            self.overflow_count = self.overflow_count.saturating_add(1);
        }
        self.events.write(event);
    }

    /// Number of stored events
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Return true if no event is stored
    pub fn is_empty(&self) -> bool {
        self.events.len() == 0
    }

    /// Events evicted since creation
    pub fn overflow_count(&self) -> u32 {
        self.overflow_count
    }

    /// Iterate oldest first
    pub fn iter(&self) -> impl Iterator<Item = &TraceEvent> {
        self.events.oldest_ordered()
    }

    /// Drop all events; the overflow count is kept
    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// Write one line per event, oldest first
    pub fn write_to(&self, out: &mut dyn Write) -> fmt::Result {
        for event in self.iter() {
            writeln!(
                out,
                "{:>10} {:<18} {}",
                event.at_ms,
                event.name,
                event.kind.label()
            )?;
        }
        if self.overflow_count > 0 {
            writeln!(out, "({} older events dropped)", self.overflow_count)?;
        }
        Ok(())
    }

    /// Render the trace into a fixed-capacity string, cut at the last line
    /// that fits.
    pub fn render(&self) -> String<TRACE_TEXT_LEN> {
        let mut text = String::new();
        for event in self.iter() {
            let mut line: String<64> = String::new();
            let rendered = writeln!(
                line,
                "{:>10} {:<18} {}",
                event.at_ms,
                event.name,
                event.kind.label()
            );
            if rendered.is_err() || text.push_str(&line).is_err() {
                break;
            }
        }
        text
    }
}

impl Default for TraceBuffer {
    fn default() -> Self {
        Self::new()
    }
}
