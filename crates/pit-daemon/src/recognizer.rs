//! Recognition adapters.
//!
//! Plate detection and OCR live outside this process. `CommandRecognizer` shells out
//! to a detector program per image; `FileNameRecognizer` is an offline stand-in.

use std::io::Read;
use std::path::Path;
use std::process::{Command, Stdio};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use pit_core::{PlateRecognizer, RecognitionOutcome};
use tracing::{debug, warn};

use crate::config::{RecognizerConfig, RecognizerKind};

pub type SharedRecognizer = Arc<dyn PlateRecognizer>;

const POLL_EVERY: Duration = Duration::from_millis(20);

pub fn from_config(cfg: &RecognizerConfig) -> SharedRecognizer {
    match cfg.kind {
        RecognizerKind::Command => Arc::new(CommandRecognizer::new(
            cfg.program.clone(),
            cfg.args.clone(),
            cfg.timeout,
        )),
        RecognizerKind::Filename => Arc::new(FileNameRecognizer),
    }
}

/// Runs `<program> <args..> <image>` and reads the plate from the first non-empty
/// stdout line.
///
/// Exit status mapping:
/// - 0 with text: `Plate`
/// - 0 without text, or non-zero without text: `NoDetection`
/// - non-zero with text: `InternalError` (stderr preferred)
/// - spawn failure or timeout: `InternalError`
///
/// Images that do not decode never reach the program and yield `ReadFailure`.
#[derive(Debug, Clone)]
pub struct CommandRecognizer {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl CommandRecognizer {
    pub fn new(program: impl Into<String>, args: Vec<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            args,
            timeout,
        }
    }

    fn run(&self, image: &Path) -> RecognitionOutcome {
        let mut child = match Command::new(&self.program)
            .args(&self.args)
            .arg(image)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
        {
            Ok(ch) => ch,
            Err(e) => return RecognitionOutcome::InternalError(format!("spawn {}: {e}", self.program)),
        };

        // Drain pipes on their own threads so a chatty detector cannot block on a full pipe.
        let stdout = child.stdout.take().map(spawn_reader);
        let stderr = child.stderr.take().map(spawn_reader);

        let deadline = Instant::now() + self.timeout;
        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) if Instant::now() >= deadline => {
                    let _ = child.kill();
                    let _ = child.wait();
                    return RecognitionOutcome::InternalError(format!(
                        "detector timed out after {:?}",
                        self.timeout
                    ));
                }
                Ok(None) => thread::sleep(POLL_EVERY),
                Err(e) => return RecognitionOutcome::InternalError(format!("wait: {e}")),
            }
        };

        let stdout = stdout.and_then(|h| h.join().ok()).unwrap_or_default();
        let stderr = stderr.and_then(|h| h.join().ok()).unwrap_or_default();
        let text = stdout.lines().map(str::trim).find(|l| !l.is_empty());

        match (status.success(), text) {
            (true, Some(line)) => RecognitionOutcome::from_text(line),
            (true, None) => RecognitionOutcome::NoDetection,
            (false, line) => {
                let detail = stderr.trim();
                let detail = if !detail.is_empty() {
                    detail.to_string()
                } else if let Some(line) = line {
                    line.to_string()
                } else {
                    status.to_string()
                };
                RecognitionOutcome::InternalError(detail)
            }
        }
    }
}

impl PlateRecognizer for CommandRecognizer {
    fn recognize(&self, image: &Path) -> RecognitionOutcome {
        if let Err(e) = decode_check(image) {
            debug!(image = %image.display(), error = %e, "image does not decode");
            return RecognitionOutcome::ReadFailure;
        }
        let outcome = self.run(image);
        if let RecognitionOutcome::InternalError(detail) = &outcome {
            warn!(image = %image.display(), %detail, "detector failed");
        }
        outcome
    }
}

fn spawn_reader<R: Read + Send + 'static>(mut pipe: R) -> thread::JoinHandle<String> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = pipe.read_to_end(&mut buf);
        String::from_utf8_lossy(&buf).into_owned()
    })
}

/// Fully decodes the image, the same check a detector would hit first.
fn decode_check(image: &Path) -> image::ImageResult<()> {
    image::ImageReader::open(image)?
        .with_guessed_format()?
        .decode()
        .map(|_| ())
}

/// Uses the file stem as the plate: `b 1234-xy.jpg` reads as `B1234XY`.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileNameRecognizer;

impl PlateRecognizer for FileNameRecognizer {
    fn recognize(&self, image: &Path) -> RecognitionOutcome {
        if std::fs::File::open(image).is_err() {
            return RecognitionOutcome::ReadFailure;
        }
        let plate: String = image
            .file_stem()
            .map(|s| s.to_string_lossy())
            .unwrap_or_default()
            .chars()
            .filter(char::is_ascii_alphanumeric)
            .map(|c| c.to_ascii_uppercase())
            .collect();
        RecognitionOutcome::from_text(&plate)
    }
}
