//! The single simulation state and its control operations.
//!
//! `Simulation` is a plain owned value. The daemon puts exactly one of them behind a
//! mutex; the drain loop splits a tick into [`Simulation::begin_tick`] and
//! [`Simulation::complete_tick`] so recognition runs with the lock released.

use std::collections::VecDeque;

use chrono::Duration;

use crate::api::StateResponse;
use crate::policy::{self, Assignment, PolicyKind};
use crate::recognition::RecognitionOutcome;
use crate::slot::{tail, PitBoard, Slot, EMPTY_LABEL};
use crate::time::{clock_label, elapsed_secs, format_duration, Timestamp};

/// Number of summary lines exposed by [`Simulation::snapshot`].
pub const SUMMARY_WINDOW: usize = 10;

/// Number of event-log lines exposed by [`Simulation::snapshot`].
pub const LOG_WINDOW: usize = 20;

/// Default time between two processed images.
pub const DEFAULT_PROCESS_INTERVAL_SECS: i64 = 120;

/// Result of the first half of a drain tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickDecision {
    /// Not running, or force-stopped.
    Idle,
    /// Every pit is occupied under the fill policy; the simulation just finished.
    Finished,
    /// Running, but the processing interval has not elapsed yet.
    NotDue,
    /// Interval elapsed and the queue was empty. The interval restarts anyway.
    QueueEmpty,
    /// Head of the queue was popped and must be recognized.
    Process(TickTicket),
}

/// A popped image waiting for recognition.
///
/// Carries the tick start time, which stamps every line the tick writes, and the
/// reset epoch it was taken in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickTicket {
    image: String,
    started_at: Timestamp,
    epoch: u64,
}

impl TickTicket {
    /// Stored file name of the image.
    pub fn image(&self) -> &str {
        &self.image
    }

    /// Time the tick began.
    pub fn started_at(&self) -> &Timestamp {
        &self.started_at
    }
}

/// Result of the second half of a drain tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// The label went through the assignment policy.
    Applied {
        /// Label handed to the policy.
        label: String,
        /// What the policy did.
        assignment: Assignment,
    },
    /// A reset happened while the image was being recognized; the result was dropped.
    Stale,
}

/// Process-wide simulation state.
#[derive(Debug, Clone)]
pub struct Simulation {
    policy: PolicyKind,
    interval: Duration,
    board: PitBoard,
    queue: VecDeque<String>,
    running: bool,
    force_stopped: bool,
    finished: bool,
    last_processed_at: Option<Timestamp>,
    epoch: u64,
}

impl Simulation {
    /// Fresh idle simulation: empty pits, logs and queue.
    pub fn new(policy: PolicyKind, interval: Duration) -> Self {
        Self {
            policy,
            interval,
            board: PitBoard::default(),
            queue: VecDeque::new(),
            running: false,
            force_stopped: false,
            finished: false,
            last_processed_at: None,
            epoch: 0,
        }
    }

    /// Simulation with the default 120 s processing interval.
    pub fn with_policy(policy: PolicyKind) -> Self {
        Self::new(policy, Duration::seconds(DEFAULT_PROCESS_INTERVAL_SECS))
    }

    /// Appends an image to the pending queue.
    pub fn enqueue(&mut self, image: impl Into<String>, now: &Timestamp) {
        let image = image.into();
        self.board
            .push_log(format!("[{}] Upload: {image}", clock_label(now)));
        self.queue.push_back(image);
    }

    /// Starts draining. The queue is sorted once, and the next wake is due immediately.
    pub fn start(&mut self, now: &Timestamp) {
        self.running = true;
        self.force_stopped = false;
        self.finished = false;
        self.last_processed_at = Some(*now - self.interval);
        self.queue.make_contiguous().sort();
        self.board
            .push_log(format!("[{}] Simulasi dimulai", clock_label(now)));
    }

    /// Stops draining. Queue and pits are kept.
    pub fn stop(&mut self, now: &Timestamp) {
        self.running = false;
        self.force_stopped = true;
        self.board
            .push_log(format!("[{}] Simulasi dihentikan", clock_label(now)));
    }

    /// Back to the initial idle state. Policy and interval are kept; in-flight ticks
    /// from before the reset become stale.
    pub fn reset(&mut self) {
        let epoch = self.epoch.wrapping_add(1);
        *self = Self::new(self.policy, self.interval);
        self.epoch = epoch;
    }

    /// First half of a drain wake: decides whether to process and pops the queue head.
    pub fn begin_tick(&mut self, now: &Timestamp) -> TickDecision {
        if !self.running || self.force_stopped {
            return TickDecision::Idle;
        }
        if self.check_completion(now) {
            return TickDecision::Finished;
        }

        let due = match self.last_processed_at {
            Some(last) => now.signed_duration_since(last) >= self.interval,
            None => true,
        };
        if !due {
            return TickDecision::NotDue;
        }

        self.last_processed_at = Some(*now);
        match self.queue.pop_front() {
            Some(image) => TickDecision::Process(TickTicket {
                image,
                started_at: *now,
                epoch: self.epoch,
            }),
            None => TickDecision::QueueEmpty,
        }
    }

    /// Second half of a drain wake: feeds the recognition result to the policy.
    pub fn complete_tick(&mut self, ticket: TickTicket, outcome: &RecognitionOutcome) -> TickOutcome {
        if ticket.epoch != self.epoch {
            return TickOutcome::Stale;
        }

        let label = outcome.label();
        let now = ticket.started_at;
        let assignment = policy::apply(self.policy, &mut self.board, &ticket.image, &label, &now);
        self.check_completion(&now);
        TickOutcome::Applied { label, assignment }
    }

    /// Marks the fill policy finished once every pit is taken. Returns true if it did.
    fn check_completion(&mut self, now: &Timestamp) -> bool {
        if self.policy != PolicyKind::Fill || !self.board.all_occupied() || self.finished {
            return false;
        }
        self.finished = true;
        self.running = false;
        self.board.push_log(format!(
            "[{}] Semua PIT terisi. Simulasi selesai.",
            clock_label(now)
        ));
        true
    }

    /// Polling view: rendered pits, trailing summary and log windows, finished flag.
    pub fn snapshot(&self, now: &Timestamp) -> StateResponse {
        StateResponse {
            pit_log: self
                .board
                .slots()
                .iter()
                .map(|slot| self.render_slot(slot, now))
                .collect(),
            summary: tail(self.board.summary(), SUMMARY_WINDOW),
            log: tail(self.board.log(), LOG_WINDOW),
            finished: self.finished,
        }
    }

    fn render_slot(&self, slot: &Slot, now: &Timestamp) -> String {
        let (Some(label), Some(since)) = (slot.occupant(), slot.since()) else {
            return EMPTY_LABEL.to_string();
        };
        match self.policy {
            PolicyKind::Fill => format!("{} - {label}", clock_label(since)),
            PolicyKind::Rotate => {
                format!("{label} ({})", format_duration(elapsed_secs(since, now)))
            }
        }
    }

    /// Active assignment policy.
    pub fn policy(&self) -> PolicyKind {
        self.policy
    }

    /// Time between processed images.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Pits, logs and rotate cursor.
    pub fn board(&self) -> &PitBoard {
        &self.board
    }

    /// Pending images in processing order.
    pub fn queue(&self) -> &VecDeque<String> {
        &self.queue
    }

    /// True while draining.
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// True after an explicit stop, until the next start or reset.
    pub fn is_force_stopped(&self) -> bool {
        self.force_stopped
    }

    /// True once the fill policy has occupied every pit.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Time of the last due wake.
    pub fn last_processed_at(&self) -> Option<&Timestamp> {
        self.last_processed_at.as_ref()
    }

    /// Number of resets so far.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }
}

impl Default for Simulation {
    fn default() -> Self {
        Self::with_policy(PolicyKind::default())
    }
}
