//! Claim verification request/response handling.

use std::time::Instant;

use tracing::{debug, info, instrument, trace, warn};

use labelcheck_core::{
    CollectionBinding, CollectionStrategy, Error, LabelBackend, Result, VerificationResult,
    WorkflowState,
};

use crate::progress::{self, NoopProgress, ProgressEvent, ProgressSink};

/// Message for a blank claim sentence.
pub const EMPTY_CLAIM: &str = "Please enter a claim sentence to verify";

/// Collection a claim should be checked against.
///
/// The session binding wins; a user-selected collection covers sessions that
/// have not ingested anything yet.
pub fn collection_for<'s>(
    state: &'s WorkflowState,
    strategy: &'s CollectionStrategy,
) -> Result<&'s CollectionBinding> {
    state
        .binding()
        .or_else(|| strategy.preselected())
        .ok_or(Error::MissingCollection)
}

/// Issues verification calls and normalizes their responses.
pub struct Verifier<'a> {
    backend: &'a dyn LabelBackend,
    progress: &'a dyn ProgressSink,
}

impl<'a> Verifier<'a> {
    pub fn new(backend: &'a dyn LabelBackend) -> Self {
        Self {
            backend,
            progress: &NoopProgress,
        }
    }

    pub fn with_progress(mut self, progress: &'a dyn ProgressSink) -> Self {
        self.progress = progress;
        self
    }

    /// Verify `sentence` against `collection_id`.
    ///
    /// A sentence that is blank after trimming is rejected before any network
    /// call. The sentence is otherwise sent exactly as given.
    #[instrument(skip(self, sentence), fields(subsystem = "workflow", component = "verify", collection = %collection_id))]
    pub async fn verify(&self, sentence: &str, collection_id: &str) -> Result<VerificationResult> {
        if sentence.trim().is_empty() {
            warn!("Blank claim sentence, nothing sent");
            return Err(Error::EmptyInput(EMPTY_CLAIM.to_string()));
        }

        let start = Instant::now();
        progress::stage(self.progress, "Verifying Claim...", progress::VERIFY_PCT);

        let raw = match self.backend.verify_claim(sentence, collection_id).await {
            Ok(raw) => raw,
            Err(e) => {
                self.progress.report(ProgressEvent::Finished);
                return Err(e);
            }
        };
        trace!(response = %raw, "Raw verification response");

        self.progress.report(ProgressEvent::Finished);
        let result = VerificationResult::from_value(&raw)?;
        self.progress.report(ProgressEvent::VerificationCompleted);

        debug!(
            duration_ms = start.elapsed().as_millis() as u64,
            result_count = result.structured_sources.len(),
            "Verification response normalized"
        );
        info!(
            validity = ?result.validity,
            reported_valid = ?result.reported_valid,
            "Claim verified"
        );
        Ok(result)
    }
}
