//! Recognition port: image in, best-effort plate label out.

use std::path::Path;

/// Label used when the image cannot be read at all.
pub const READ_FAILURE_LABEL: &str = "Gagal Membaca";

/// Label used when no plate was found or OCR produced nothing.
pub const NO_DETECTION_LABEL: &str = "Tidak Terbaca";

/// Closed set of recognition results.
///
/// Slot assignment treats every variant as an opaque label; see [`RecognitionOutcome::label`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognitionOutcome {
    /// A plate string was read.
    Plate(String),
    /// The image could not be opened or decoded.
    ReadFailure,
    /// No plate region, an empty crop, or empty OCR output.
    NoDetection,
    /// The detector itself failed.
    InternalError(String),
}

impl RecognitionOutcome {
    /// Builds an outcome from raw detector text; blank text means no detection.
    pub fn from_text(text: &str) -> Self {
        let text = text.trim();
        if text.is_empty() {
            Self::NoDetection
        } else {
            Self::Plate(text.to_string())
        }
    }

    /// The label written into a slot and into the logs.
    pub fn label(&self) -> String {
        match self {
            Self::Plate(p) => p.clone(),
            Self::ReadFailure => READ_FAILURE_LABEL.to_string(),
            Self::NoDetection => NO_DETECTION_LABEL.to_string(),
            Self::InternalError(detail) => format!("Error: {detail}"),
        }
    }

    /// True only for [`RecognitionOutcome::Plate`].
    pub fn is_plate(&self) -> bool {
        matches!(self, Self::Plate(_))
    }
}

/// Anything that can turn an image file into a [`RecognitionOutcome`].
///
/// Implementations must not panic and must return in bounded time; failures are
/// reported through the outcome. Calls may be slow, so callers run them off the
/// request path.
pub trait PlateRecognizer: Send + Sync {
    /// Recognizes the plate in the image at `image`.
    fn recognize(&self, image: &Path) -> RecognitionOutcome;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinel_labels() {
        assert_eq!(RecognitionOutcome::ReadFailure.label(), "Gagal Membaca");
        assert_eq!(RecognitionOutcome::NoDetection.label(), "Tidak Terbaca");
        assert_eq!(
            RecognitionOutcome::InternalError("boom".into()).label(),
            "Error: boom"
        );
        assert_eq!(RecognitionOutcome::Plate("B 1234 XY".into()).label(), "B 1234 XY");
    }

    #[test]
    fn blank_text_is_no_detection() {
        assert_eq!(RecognitionOutcome::from_text("  \n"), RecognitionOutcome::NoDetection);
        assert_eq!(
            RecognitionOutcome::from_text(" D5678AB\n"),
            RecognitionOutcome::Plate("D5678AB".into())
        );
        assert!(!RecognitionOutcome::NoDetection.is_plate());
    }
}
