//! Fixed pit slots and the board that holds them together with the logs.

use crate::time::Timestamp;

/// Number of pits. Fixed for the lifetime of the process.
pub const SLOT_COUNT: usize = 5;

/// Rendering of a slot without an occupant.
pub const EMPTY_LABEL: &str = "Empty";

/// One pit: current occupant label and entry time.
///
/// `occupant` and `since` are set and cleared together.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Slot {
    occupant: Option<String>,
    since: Option<Timestamp>,
}

impl Slot {
    /// True when nobody occupies the pit.
    pub fn is_empty(&self) -> bool {
        self.occupant.is_none()
    }

    /// Current occupant label.
    pub fn occupant(&self) -> Option<&str> {
        self.occupant.as_deref()
    }

    /// Entry time of the current occupant.
    pub fn since(&self) -> Option<&Timestamp> {
        self.since.as_ref()
    }

    pub(crate) fn occupy(&mut self, label: String, now: Timestamp) {
        self.occupant = Some(label);
        self.since = Some(now);
    }

    /// Removes the occupant, returning its label and entry time.
    pub(crate) fn vacate(&mut self) -> Option<(String, Option<Timestamp>)> {
        let label = self.occupant.take()?;
        Some((label, self.since.take()))
    }
}

/// Slots plus the append-only event and summary logs.
///
/// The rotate cursor lives here too because only the assignment policy moves it.
#[derive(Debug, Clone, Default)]
pub struct PitBoard {
    pub(crate) slots: [Slot; SLOT_COUNT],
    pub(crate) summary: Vec<String>,
    pub(crate) log: Vec<String>,
    pub(crate) cursor: u64,
}

impl PitBoard {
    /// Positional view of the pits.
    pub fn slots(&self) -> &[Slot; SLOT_COUNT] {
        &self.slots
    }

    /// Full summary log.
    pub fn summary(&self) -> &[String] {
        &self.summary
    }

    /// Full event log.
    pub fn log(&self) -> &[String] {
        &self.log
    }

    /// Monotonic rotate cursor; the next rotate target is `cursor % SLOT_COUNT`.
    pub fn cursor(&self) -> u64 {
        self.cursor
    }

    /// True when every pit has an occupant.
    pub fn all_occupied(&self) -> bool {
        self.slots.iter().all(|s| !s.is_empty())
    }

    pub(crate) fn push_log(&mut self, line: String) {
        self.log.push(line);
    }
}

/// Last `n` entries of `lines` (all of them when shorter).
pub(crate) fn tail(lines: &[String], n: usize) -> Vec<String> {
    lines[lines.len().saturating_sub(n)..].to_vec()
}
