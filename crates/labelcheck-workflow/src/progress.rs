//! Progress reporting for long-running workflow stages.
//!
//! Percentages mirror the stage weights users already know from the web
//! dashboard: upload is quick, extraction and embedding dominate.

use std::fmt;

/// Percent reached when a primary document stage starts.
pub const PRIMARY_UPLOAD_PCT: u8 = 10;
pub const PRIMARY_EXTRACT_PCT: u8 = 40;
pub const PRIMARY_MARKDOWN_PCT: u8 = 70;
pub const PRIMARY_INDEX_PCT: u8 = 90;

/// Percent reached when a secondary document stage starts.
pub const SECONDARY_UPLOAD_PCT: u8 = 20;
pub const SECONDARY_EXTRACT_PCT: u8 = 80;

/// Percent reached when the verification call is sent.
pub const VERIFY_PCT: u8 = 50;

pub const DONE_PCT: u8 = 100;

/// Something worth telling the user while a stage runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    StageStarted { label: String, percent: u8 },
    DocumentCompleted { index: usize, filename: String },
    SecondaryCompleted,
    VerificationCompleted,
    /// The progress bar for the current action can be cleared.
    Finished,
}

impl fmt::Display for ProgressEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StageStarted { label, percent } => write!(f, "[{:>3}%] {}", percent, label),
            Self::DocumentCompleted { index, .. } => {
                write!(f, "PI File {} Processed Successfully", index)
            }
            Self::SecondaryCompleted => write!(f, "Asset Extraction Completed"),
            Self::VerificationCompleted => write!(f, "Claim Verification Completed"),
            Self::Finished => write!(f, "[{:>3}%] done", DONE_PCT),
        }
    }
}

/// Receiver for progress events.
pub trait ProgressSink: Send + Sync {
    fn report(&self, event: ProgressEvent);
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopProgress;

impl ProgressSink for NoopProgress {
    fn report(&self, _event: ProgressEvent) {}
}

pub(crate) fn stage(sink: &dyn ProgressSink, label: impl Into<String>, percent: u8) {
    sink.report(ProgressEvent::StageStarted {
        label: label.into(),
        percent,
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primary_percentages_increase() {
        let steps = [
            PRIMARY_UPLOAD_PCT,
            PRIMARY_EXTRACT_PCT,
            PRIMARY_MARKDOWN_PCT,
            PRIMARY_INDEX_PCT,
            DONE_PCT,
        ];
        assert!(steps.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_event_display() {
        let started = ProgressEvent::StageStarted {
            label: "Extracting PI content...".to_string(),
            percent: 40,
        };
        assert_eq!(started.to_string(), "[ 40%] Extracting PI content...");
        assert_eq!(
            ProgressEvent::DocumentCompleted {
                index: 2,
                filename: "b.pdf".to_string()
            }
            .to_string(),
            "PI File 2 Processed Successfully"
        );
    }

    #[test]
    fn test_noop_accepts_events() {
        NoopProgress.report(ProgressEvent::Finished);
    }
}
