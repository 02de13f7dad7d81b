#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! Pit tracker core: slot model, assignment policies and the simulation state machine.
//!
//! Everything here is synchronous and takes the current time as an argument; the
//! daemon owns the clock, the lock and the background loop.

pub mod api;
pub mod policy;
pub mod recognition;
pub mod simulation;
pub mod slot;
pub mod time;

pub use policy::{Assignment, Eviction, PolicyKind};
pub use recognition::{PlateRecognizer, RecognitionOutcome};
pub use simulation::{Simulation, TickDecision, TickOutcome, TickTicket, LOG_WINDOW, SUMMARY_WINDOW};
pub use slot::{PitBoard, Slot, EMPTY_LABEL, SLOT_COUNT};
pub use time::Timestamp;
