//! One interactive session: its id, workflow state, and collaborators.

use std::mem;

use tracing::{info, instrument, warn};
use uuid::Uuid;

use labelcheck_core::{
    logging, CollectionBinding, CollectionStrategy, Error, LabelBackend, Result,
    VerificationResult, WorkflowPhase, WorkflowState,
};

use crate::ingest::{IngestBatch, IngestController, IngestReport};
use crate::progress::{NoopProgress, ProgressSink};
use crate::verify::{collection_for, Verifier, EMPTY_CLAIM};

/// Owns the [`WorkflowState`] for as long as the user keeps working.
///
/// Nothing here is shared: every action borrows the session mutably and runs
/// to completion before the next one starts.
pub struct Session<'a> {
    id: Uuid,
    backend: &'a dyn LabelBackend,
    strategy: CollectionStrategy,
    state: WorkflowState,
    progress: &'a dyn ProgressSink,
}

impl<'a> Session<'a> {
    pub fn new(backend: &'a dyn LabelBackend, strategy: CollectionStrategy) -> Self {
        Self {
            id: Uuid::now_v7(),
            backend,
            strategy,
            state: WorkflowState::new(),
            progress: &NoopProgress,
        }
    }

    pub fn with_progress(mut self, progress: &'a dyn ProgressSink) -> Self {
        self.progress = progress;
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn state(&self) -> &WorkflowState {
        &self.state
    }

    pub fn phase(&self) -> WorkflowPhase {
        self.state.phase()
    }

    /// Collection verification would currently use, if any.
    pub fn collection(&self) -> Option<&CollectionBinding> {
        collection_for(&self.state, &self.strategy).ok()
    }

    /// Run one ingestion action. The session keeps whatever state the
    /// controller hands back, including after a failure.
    #[instrument(skip_all, fields(session_id = %self.id, subsystem = "workflow", component = "session"))]
    pub async fn ingest(&mut self, batch: IngestBatch<'_>) -> Result<IngestReport> {
        let controller =
            IngestController::new(self.backend, &self.strategy).with_progress(self.progress);
        let state = mem::take(&mut self.state);
        let (state, result) = controller.run(state, batch).await.into_parts();
        self.state = state;

        match &result {
            Ok(report) => info!(
                { logging::SESSION_ID } = %self.id,
                { logging::SUCCESS } = true,
                phase = %self.state.phase(),
                ?report,
                "Ingest action finished"
            ),
            Err(e) => warn!(
                { logging::SESSION_ID } = %self.id,
                { logging::SUCCESS } = false,
                { logging::ERROR_MSG } = %e,
                phase = %self.state.phase(),
                "Ingest action failed"
            ),
        }
        result
    }

    /// Verify one claim against the session's collection.
    ///
    /// A blank sentence is reported as empty input even when no collection
    /// is bound yet.
    #[instrument(skip_all, fields(session_id = %self.id, subsystem = "workflow", component = "session"))]
    pub async fn verify(&self, sentence: &str) -> Result<VerificationResult> {
        if sentence.trim().is_empty() {
            return Err(Error::EmptyInput(EMPTY_CLAIM.to_string()));
        }
        let binding = collection_for(&self.state, &self.strategy)?;
        Verifier::new(self.backend)
            .with_progress(self.progress)
            .verify(sentence, &binding.collection_id)
            .await
    }
}
