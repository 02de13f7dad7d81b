use std::sync::Arc;

use axum::body::Bytes;
use pit_core::api::StateResponse;
use pit_core::{Assignment, RecognitionOutcome, Simulation, TickDecision, TickOutcome};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::recognizer::SharedRecognizer;
use crate::uploads::{stored_name, UploadError, UploadStore};

/// What a single drain-loop wake did. Mostly for logs and tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Wake {
    Idle,
    Finished,
    NotDue,
    QueueEmpty,
    /// The queued file was gone; the entry is consumed and not retried.
    MissingFile(String),
    Applied {
        image: String,
        label: String,
        assignment: Assignment,
    },
    /// A reset landed while the image was being recognized.
    Stale(String),
}

/// Owns the one simulation state and serializes every access to it.
///
/// The simulation lock is never held across file I/O or recognition. Changes to
/// the upload directory that must stay in step with the queue (upload, reset)
/// are serialized by `files`, always taken before `sim`.
pub struct PitService {
    sim: Mutex<Simulation>,
    files: Mutex<()>,
    uploads: UploadStore,
    recognizer: SharedRecognizer,
    clock: Arc<dyn Clock>,
}

impl PitService {
    pub fn new(
        sim: Simulation,
        uploads: UploadStore,
        recognizer: SharedRecognizer,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            sim: Mutex::new(sim),
            files: Mutex::new(()),
            uploads,
            recognizer,
            clock,
        }
    }

    pub fn uploads(&self) -> &UploadStore {
        &self.uploads
    }

    /// Stores every file, then enqueues all of them in arrival order.
    ///
    /// Names are checked up front, so a rejected request writes nothing.
    pub async fn upload(&self, files: Vec<(String, Bytes)>) -> Result<Vec<String>, UploadError> {
        for (name, _) in &files {
            stored_name(name)?;
        }

        let _files = self.files.lock().await;
        let mut stored = Vec::with_capacity(files.len());
        for (name, bytes) in &files {
            stored.push(self.uploads.save(name, bytes).await?);
        }

        let now = self.clock.now();
        let mut sim = self.sim.lock().await;
        for name in &stored {
            sim.enqueue(name.clone(), &now);
            info!(file = %name, queued = sim.queue().len(), "upload queued");
        }
        Ok(stored)
    }

    pub async fn start(&self) {
        let now = self.clock.now();
        let mut sim = self.sim.lock().await;
        sim.start(&now);
        info!(queue = ?sim.queue(), policy = %sim.policy(), "simulation started");
    }

    pub async fn stop(&self) {
        let now = self.clock.now();
        self.sim.lock().await.stop(&now);
        info!("simulation stopped");
    }

    /// Resets the state, then deletes every stored upload. Returns the deleted count.
    pub async fn reset(&self) -> Result<usize, UploadError> {
        let _files = self.files.lock().await;
        self.sim.lock().await.reset();
        let removed = self.uploads.clear().await?;
        info!(removed, "simulation reset");
        Ok(removed)
    }

    pub async fn state(&self) -> StateResponse {
        let now = self.clock.now();
        self.sim.lock().await.snapshot(&now)
    }

    /// Read access for callers that need more than the snapshot.
    pub async fn with_simulation<R>(&self, f: impl FnOnce(&Simulation) -> R) -> R {
        f(&*self.sim.lock().await)
    }

    /// One drain-loop wake.
    pub async fn drain_once(&self) -> Wake {
        let now = self.clock.now();
        let decision = self.sim.lock().await.begin_tick(&now);

        let ticket = match decision {
            TickDecision::Process(ticket) => ticket,
            TickDecision::Idle => return Wake::Idle,
            TickDecision::NotDue => return Wake::NotDue,
            TickDecision::QueueEmpty => {
                debug!("queue empty");
                return Wake::QueueEmpty;
            }
            TickDecision::Finished => {
                info!("all pits occupied; simulation finished");
                return Wake::Finished;
            }
        };

        let image = ticket.image().to_string();
        if !self.uploads.exists(&image).await {
            warn!(file = %image, "queued file not found; skipping");
            return Wake::MissingFile(image);
        }

        let path = self.uploads.path_of(&image);
        let recognizer = Arc::clone(&self.recognizer);
        let outcome = tokio::task::spawn_blocking(move || recognizer.recognize(&path))
            .await
            .unwrap_or_else(|e| {
                warn!(file = %image, error = %e, "recognizer task failed");
                RecognitionOutcome::InternalError(e.to_string())
            });

        let done = self.sim.lock().await.complete_tick(ticket, &outcome);
        match done {
            TickOutcome::Applied { label, assignment } => {
                match &assignment {
                    Assignment::Placed { slot, evicted } => info!(
                        file = %image,
                        pit = slot + 1,
                        plate = %label,
                        evicted = ?evicted.as_ref().map(|e| &e.label),
                        "pit assigned"
                    ),
                    Assignment::Dropped => info!(file = %image, plate = %label, "no empty pit; dropped"),
                }
                Wake::Applied {
                    image,
                    label,
                    assignment,
                }
            }
            TickOutcome::Stale => {
                debug!(file = %image, "reset during recognition; result discarded");
                Wake::Stale(image)
            }
        }
    }
}
