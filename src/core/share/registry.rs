//! Share directory for diagnostics
//!
//! Shares are passed to tasks by reference at construction time; nothing
//! looks them up by name at runtime. The registry exists only so telemetry
//! can list every share and find one by name.

use core::fmt::{self, Write};

use heapless::{String, Vec};

use super::ShareInfo;
use crate::core::error::{ConfigError, ConfigResult};

/// Default registry capacity
pub const MAX_SHARES: usize = 24;

/// Capacity of the rendered `show_all` text
pub const SHOW_ALL_LEN: usize = 1536;

/// Fixed-capacity list of shares, in registration order
pub struct ShareRegistry<'a, const N: usize = MAX_SHARES> {
    entries: Vec<&'a dyn ShareInfo, N>,
}

impl<'a, const N: usize> ShareRegistry<'a, N> {
    /// Create an empty registry
    pub const fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// Add a share; names must be unique.
    pub fn register(&mut self, share: &'a dyn ShareInfo) -> ConfigResult<()> {
        if self.find(share.name()).is_some() {
            return Err(ConfigError::DuplicateShareName(share.name()));
        }
        self.entries
            .push(share)
            .map_err(|_| ConfigError::RegistryFull { capacity: N })
    }

    /// Look a share up by name (linear search)
    pub fn find(&self, name: &str) -> Option<&'a dyn ShareInfo> {
        self.entries.iter().copied().find(|s| s.name() == name)
    }

    /// Number of registered shares
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Return true if nothing is registered
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate in registration order
    pub fn iter(&self) -> impl Iterator<Item = &'a dyn ShareInfo> + '_ {
        self.entries.iter().copied()
    }

    /// Write one line per share into `out`
    pub fn write_all(&self, out: &mut dyn Write) -> fmt::Result {
        for share in self.iter() {
            write_line(share, out)?;
        }
        Ok(())
    }

    /// Render every share into a fixed-capacity string.
    ///
    /// Output that does not fit is cut off at the last complete line.
    pub fn show_all(&self) -> String<SHOW_ALL_LEN> {
        let mut text = String::new();
        for share in self.iter() {
            let mut line: String<128> = String::new();
            if write_line(share, &mut line).is_err() || text.push_str(&line).is_err() {
                break;
            }
        }
        text
    }
}

impl<const N: usize> Default for ShareRegistry<'_, N> {
    fn default() -> Self {
        Self::new()
    }
}

fn write_line(share: &dyn ShareInfo, out: &mut dyn Write) -> fmt::Result {
    let guard = if share.is_protected() { "prot" } else { "----" };
    write!(out, "{:<18} {} writes={:<6} at=", share.name(), guard, share.write_count())?;
    match share.written_at() {
        Some(t) => write!(out, "{:<8}", t)?,
        None => write!(out, "{:<8}", "-")?,
    }
    out.write_str(" value=")?;
    share.write_value(out)?;
    out.write_str("\n")
}
