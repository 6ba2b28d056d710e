//! Ingestion workflow controller.
//!
//! Primary documents go through upload → extract → markdown → index, one
//! document at a time. Once the whole primary batch has succeeded, a single
//! secondary document goes through upload → claim extraction.
//!
//! ```text
//! Idle ──▶ PrimaryInProgress ──▶ PrimaryDone ──▶ SecondaryInProgress ──▶ SecondaryDone
//! ```
//!
//! The controller owns no state. Each entry point takes a [`WorkflowState`]
//! by value and returns the updated one inside an [`Advance`], whether the
//! stage succeeded or not. Flags only advance on success, so a failed action
//! can simply be retried with the returned state.

use serde::Serialize;
use tracing::{debug, error, info};

use labelcheck_core::defaults::SECONDARY_START_PAGE;
use labelcheck_core::logging;
use labelcheck_core::{
    CollectionStrategy, Error, LabelBackend, Result, UploadedDocument, WorkflowPhase,
    WorkflowState,
};

use crate::progress::{self, NoopProgress, ProgressEvent, ProgressSink};

/// Documents supplied for one user action.
#[derive(Debug, Clone, Copy, Default)]
pub struct IngestBatch<'a> {
    pub primary: &'a [UploadedDocument],
    pub secondary: Option<&'a UploadedDocument>,
}

impl<'a> IngestBatch<'a> {
    pub fn new(primary: &'a [UploadedDocument], secondary: Option<&'a UploadedDocument>) -> Self {
        Self { primary, secondary }
    }
}

/// What a stage did during one invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum StageOutcome {
    /// Every document in the stage went through all its calls.
    Completed { documents: usize },
    /// The stage had already completed earlier in the session; no calls made.
    AlreadyDone,
    /// No document was supplied for this stage.
    NothingSupplied,
    /// Secondary document supplied before the primary batch completed.
    AwaitingPrimary,
}

/// Outcome of both stages for one invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    pub primary: StageOutcome,
    pub secondary: StageOutcome,
}

/// Updated session state plus the result of the action that produced it.
#[derive(Debug)]
pub struct Advance<T> {
    pub state: WorkflowState,
    pub result: Result<T>,
}

impl<T> Advance<T> {
    fn ok(state: WorkflowState, value: T) -> Self {
        Self {
            state,
            result: Ok(value),
        }
    }

    fn err(state: WorkflowState, error: Error) -> Self {
        Self {
            state,
            result: Err(error),
        }
    }

    pub fn into_parts(self) -> (WorkflowState, Result<T>) {
        (self.state, self.result)
    }
}

/// Sequences backend calls for primary and secondary documents.
pub struct IngestController<'a> {
    backend: &'a dyn LabelBackend,
    strategy: &'a CollectionStrategy,
    progress: &'a dyn ProgressSink,
}

impl<'a> IngestController<'a> {
    pub fn new(backend: &'a dyn LabelBackend, strategy: &'a CollectionStrategy) -> Self {
        Self {
            backend,
            strategy,
            progress: &NoopProgress,
        }
    }

    pub fn with_progress(mut self, progress: &'a dyn ProgressSink) -> Self {
        self.progress = progress;
        self
    }

    /// Run the primary stage, then the secondary stage if it is unblocked.
    ///
    /// A primary failure ends the invocation; the secondary document is not
    /// touched.
    pub async fn run(&self, state: WorkflowState, batch: IngestBatch<'_>) -> Advance<IngestReport> {
        let (state, primary) = self.run_primary(state, batch.primary).await.into_parts();
        let primary = match primary {
            Ok(outcome) => outcome,
            Err(e) => return Advance::err(state, e),
        };

        let (state, secondary) = self.run_secondary(state, batch.secondary).await.into_parts();
        match secondary {
            Ok(secondary) => Advance::ok(state, IngestReport { primary, secondary }),
            Err(e) => Advance::err(state, e),
        }
    }

    /// Process every primary document in order.
    pub async fn run_primary(
        &self,
        mut state: WorkflowState,
        documents: &[UploadedDocument],
    ) -> Advance<StageOutcome> {
        if state.primary_done() {
            debug!("Primary batch already processed, skipping");
            return Advance::ok(state, StageOutcome::AlreadyDone);
        }
        let Some(first) = documents.first() else {
            return Advance::ok(state, StageOutcome::NothingSupplied);
        };

        let collection = state
            .bind_collection(self.strategy.binding_for(first.filename()))
            .collection_id
            .clone();

        info!(
            from = %state.phase(),
            to = %WorkflowPhase::PrimaryInProgress,
            { logging::COLLECTION } = %collection,
            { logging::RESULT_COUNT } = documents.len(),
            "Starting primary batch"
        );

        for (position, document) in documents.iter().enumerate() {
            let index = position + 1;
            if let Err(e) = self.process_primary(index, document, &collection).await {
                error!(
                    { logging::DOCUMENT } = %document.filename(),
                    { logging::ERROR_MSG } = %e,
                    "Primary batch aborted"
                );
                self.progress.report(ProgressEvent::Finished);
                return Advance::err(state, e);
            }
        }

        state.mark_primary_done();
        info!(
            to = %state.phase(),
            result_count = documents.len(),
            "Primary batch complete"
        );
        Advance::ok(
            state,
            StageOutcome::Completed {
                documents: documents.len(),
            },
        )
    }

    /// Process the secondary document once the primary batch is done.
    pub async fn run_secondary(
        &self,
        mut state: WorkflowState,
        document: Option<&UploadedDocument>,
    ) -> Advance<StageOutcome> {
        let Some(document) = document else {
            return Advance::ok(state, StageOutcome::NothingSupplied);
        };
        if !state.primary_done() {
            debug!(document = %document.filename(), "Secondary document waiting on primary batch");
            return Advance::ok(state, StageOutcome::AwaitingPrimary);
        }
        if state.secondary_done() {
            debug!("Secondary document already processed, skipping");
            return Advance::ok(state, StageOutcome::AlreadyDone);
        }
        let Some(end_page) = state.binding().map(|b| b.end_page) else {
            return Advance::err(state, Error::MissingCollection);
        };

        info!(
            from = %state.phase(),
            to = %WorkflowPhase::SecondaryInProgress,
            document = %document.filename(),
            "Starting secondary document"
        );

        if let Err(e) = self.process_secondary(document, end_page).await {
            error!(document = %document.filename(), error = %e, "Secondary stage aborted");
            self.progress.report(ProgressEvent::Finished);
            return Advance::err(state, e);
        }

        if let Err(e) = state.mark_secondary_done() {
            return Advance::err(state, e);
        }
        info!(to = %state.phase(), "Secondary document complete");
        Advance::ok(state, StageOutcome::Completed { documents: 1 })
    }

    async fn process_primary(
        &self,
        index: usize,
        document: &UploadedDocument,
        collection: &str,
    ) -> Result<()> {
        let backend = self.backend;

        progress::stage(
            self.progress,
            format!("Uploading PI document {}...", index),
            progress::PRIMARY_UPLOAD_PCT,
        );
        let key = backend.upload(document).await?;

        progress::stage(
            self.progress,
            "Extracting PI content...",
            progress::PRIMARY_EXTRACT_PCT,
        );
        let processed_key = backend.extract_primary(&key).await?;

        progress::stage(
            self.progress,
            "Generating Markdown...",
            progress::PRIMARY_MARKDOWN_PCT,
        );
        let markdown_key = backend.render_markdown(&processed_key).await?;

        progress::stage(
            self.progress,
            format!("Creating Embeddings PI File {}...", index),
            progress::PRIMARY_INDEX_PCT,
        );
        backend.index_embeddings(&markdown_key, collection).await?;

        self.progress.report(ProgressEvent::Finished);
        self.progress.report(ProgressEvent::DocumentCompleted {
            index,
            filename: document.filename().to_string(),
        });
        info!(
            document = %document.filename(),
            stage = "index_embeddings",
            collection = %collection,
            "Primary document processed"
        );
        Ok(())
    }

    async fn process_secondary(&self, document: &UploadedDocument, end_page: u32) -> Result<()> {
        progress::stage(
            self.progress,
            "Uploading Asset Document...",
            progress::SECONDARY_UPLOAD_PCT,
        );
        let key = self.backend.upload(document).await?;

        progress::stage(
            self.progress,
            "Extracting Asset Claims...",
            progress::SECONDARY_EXTRACT_PCT,
        );
        self.backend
            .extract_secondary(&key, SECONDARY_START_PAGE, end_page)
            .await?;

        self.progress.report(ProgressEvent::Finished);
        self.progress.report(ProgressEvent::SecondaryCompleted);
        Ok(())
    }
}
