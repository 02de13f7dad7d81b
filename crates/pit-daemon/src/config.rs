use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context};
use chrono::FixedOffset;
use clap::{Parser, ValueEnum};
use pit_core::time::{offset_from_hours, DEFAULT_UTC_OFFSET_HOURS};
use pit_core::PolicyKind;

/// Which recognition adapter the drain loop calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RecognizerKind {
    /// Run an external detector program per image.
    Command,
    /// Derive the plate from the file name (demos, offline runs).
    Filename,
}

#[derive(Parser, Debug)]
#[command(name = "pit-daemon", version, about = "Pit tracker: queued plate recognition into fixed pits")]
pub struct Args {
    /// Listen address, e.g. 0.0.0.0:7860
    #[arg(long, default_value = "0.0.0.0:7860")]
    pub listen: SocketAddr,

    /// Flat directory holding uploaded images. Cleared by /reset.
    #[arg(long, default_value = "uploads")]
    pub upload_dir: PathBuf,

    /// HTML page served on `GET /` when present.
    #[arg(long, default_value = "frontend.html")]
    pub frontend: PathBuf,

    /// Slot assignment policy: `fill` (first empty pit, finishes when full) or `rotate`.
    #[arg(long, default_value_t = PolicyKind::Rotate)]
    pub policy: PolicyKind,

    /// Seconds between two processed images.
    #[arg(long, default_value_t = 120)]
    pub process_interval_secs: u64,

    /// Drain loop wake interval in milliseconds.
    #[arg(long, default_value_t = 1_000)]
    pub wake_interval_ms: u64,

    /// UTC offset (whole hours) used for every timestamp.
    #[arg(long, default_value_t = DEFAULT_UTC_OFFSET_HOURS, allow_negative_numbers = true)]
    pub utc_offset_hours: i32,

    /// Recognition adapter.
    #[arg(long, value_enum, default_value_t = RecognizerKind::Command)]
    pub recognizer: RecognizerKind,

    /// Detector program for `--recognizer command`. The image path is appended as the last argument.
    #[arg(long, default_value = "detect-plate")]
    pub recognizer_program: String,

    /// Extra arguments passed before the image path (repeatable).
    #[arg(long = "recognizer-arg")]
    pub recognizer_args: Vec<String>,

    /// Kill the detector after this many seconds.
    #[arg(long, default_value_t = 30)]
    pub recognizer_timeout_secs: u64,

    /// Max request body bytes for uploads.
    #[arg(long, default_value_t = 64 * 1024 * 1024)]
    pub max_upload_bytes: usize,

    /// Log level (env-filter syntax).
    #[arg(long, default_value = "info")]
    pub log: String,
}

#[derive(Debug, Clone)]
pub struct RecognizerConfig {
    pub kind: RecognizerKind,
    pub program: String,
    pub args: Vec<String>,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct DaemonConfig {
    pub listen: SocketAddr,
    pub upload_dir: PathBuf,
    pub frontend: PathBuf,

    pub policy: PolicyKind,
    pub process_interval: Duration,
    pub wake_interval: Duration,
    pub utc_offset: FixedOffset,

    pub recognizer: RecognizerConfig,
    pub max_upload_bytes: usize,
}

impl Args {
    pub fn into_config(self) -> anyhow::Result<DaemonConfig> {
        if self.wake_interval_ms == 0 {
            bail!("--wake-interval-ms must be positive");
        }
        let utc_offset = offset_from_hours(self.utc_offset_hours)
            .with_context(|| format!("invalid --utc-offset-hours {}", self.utc_offset_hours))?;

        Ok(DaemonConfig {
            listen: self.listen,
            upload_dir: self.upload_dir,
            frontend: self.frontend,
            policy: self.policy,
            process_interval: Duration::from_secs(self.process_interval_secs),
            wake_interval: Duration::from_millis(self.wake_interval_ms),
            utc_offset,
            recognizer: RecognizerConfig {
                kind: self.recognizer,
                program: self.recognizer_program,
                args: self.recognizer_args,
                timeout: Duration::from_secs(self.recognizer_timeout_secs),
            },
            max_upload_bytes: self.max_upload_bytes,
        })
    }
}

impl DaemonConfig {
    /// Processing interval as a chrono span for the core.
    pub fn process_interval_delta(&self) -> anyhow::Result<chrono::Duration> {
        chrono::Duration::from_std(self.process_interval).context("process interval out of range")
    }
}
