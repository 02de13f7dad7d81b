//! Slot assignment policies.
//!
//! * `Fill`: first empty pit wins; results are dropped once every pit is taken.
//! * `Rotate`: round-robin over the pits, evicting and timing the previous occupant.
//!
//! Log and summary line formats are consumed by existing frontends and must not change.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::slot::{PitBoard, SLOT_COUNT};
use crate::time::{clock_label, elapsed_secs, format_duration, Timestamp};

/// Which assignment policy the simulation runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyKind {
    /// One-shot fill to capacity, then the simulation finishes.
    Fill,
    /// Continuous rotation with turnover tracking.
    #[default]
    Rotate,
}

impl PolicyKind {
    /// Stable lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Fill => "fill",
            Self::Rotate => "rotate",
        }
    }
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown policy name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown policy '{0}' (expected 'fill' or 'rotate')")]
pub struct ParsePolicyError(pub String);

impl FromStr for PolicyKind {
    type Err = ParsePolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fill" | "a" => Ok(Self::Fill),
            "rotate" | "b" => Ok(Self::Rotate),
            other => Err(ParsePolicyError(other.to_string())),
        }
    }
}

/// Previous occupant pushed out by a rotate assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Eviction {
    /// Label of the evicted occupant.
    pub label: String,
    /// How long it stayed, in whole seconds.
    pub occupied_secs: i64,
}

/// What one policy application did to the board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Assignment {
    /// The label was written into `slot` (0-based).
    Placed {
        /// Target pit index.
        slot: usize,
        /// Previous occupant, rotate only.
        evicted: Option<Eviction>,
    },
    /// No pit was free (fill only); the label was discarded.
    Dropped,
}

/// Applies one recognized `label` for `image` to the board at time `now`.
pub fn apply(
    kind: PolicyKind,
    board: &mut PitBoard,
    image: &str,
    label: &str,
    now: &Timestamp,
) -> Assignment {
    match kind {
        PolicyKind::Fill => fill(board, image, label, now),
        PolicyKind::Rotate => rotate(board, image, label, now),
    }
}

fn fill(board: &mut PitBoard, image: &str, label: &str, now: &Timestamp) -> Assignment {
    let ts = clock_label(now);
    board.push_log(format!("[{ts}] Upload diproses: {image}"));

    let Some(index) = board.slots.iter().position(|s| s.is_empty()) else {
        return Assignment::Dropped;
    };

    board.slots[index].occupy(label.to_string(), *now);
    let pit = index + 1;
    board.summary.push(format!("PIT {pit}: {ts} - {label}"));
    board.push_log(format!("[{ts}] PIT {pit} ⬅ {label}"));
    Assignment::Placed {
        slot: index,
        evicted: None,
    }
}

fn rotate(board: &mut PitBoard, image: &str, label: &str, now: &Timestamp) -> Assignment {
    let ts = clock_label(now);
    board.push_log(format!("[{ts}] Diproses: {image} ➜ {label}"));

    let index = (board.cursor % SLOT_COUNT as u64) as usize;
    board.cursor += 1;
    let pit = index + 1;

    let evicted = board.slots[index].vacate().map(|(previous, since)| Eviction {
        label: previous,
        occupied_secs: since.map(|t| elapsed_secs(&t, now)).unwrap_or(0),
    });

    if let Some(out) = &evicted {
        board.summary.push(format!(
            "PIT {pit}: {ts} - OUT: {} (Durasi: {})",
            out.label,
            format_duration(out.occupied_secs)
        ));
        board.push_log(format!("[{ts}] PIT {pit} digantikan"));
    }

    board.slots[index].occupy(label.to_string(), *now);
    board.push_log(format!("[{ts}] PIT {pit} ⬅ {label}"));
    Assignment::Placed {
        slot: index,
        evicted,
    }
}
