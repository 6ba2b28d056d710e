//! Ingestion state machine tests against the mock backend.

use std::sync::Mutex;

use labelcheck_client::mock::MockBackend;
use labelcheck_core::{
    CollectionBinding, CollectionStrategy, Endpoint, Error, UploadedDocument, WorkflowPhase,
    WorkflowState,
};
use labelcheck_workflow::{
    IngestBatch, IngestController, ProgressEvent, ProgressSink, StageOutcome,
};

fn doc(name: &str) -> UploadedDocument {
    UploadedDocument::new(name, b"%PDF-1.7\n%test".to_vec()).unwrap()
}

#[derive(Default)]
struct RecordingProgress {
    events: Mutex<Vec<ProgressEvent>>,
}

impl RecordingProgress {
    fn events(&self) -> Vec<ProgressEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl ProgressSink for RecordingProgress {
    fn report(&self, event: ProgressEvent) {
        self.events.lock().unwrap().push(event);
    }
}

// =============================================================================
// Primary batch
// =============================================================================

#[tokio::test]
async fn test_primary_calls_run_in_order_per_document() {
    let backend = MockBackend::new();
    let strategy = CollectionStrategy::default();
    let controller = IngestController::new(&backend, &strategy);
    let primary = [doc("Braftovi_label.pdf"), doc("Mektovi_label.pdf")];

    let (state, result) = controller
        .run(WorkflowState::new(), IngestBatch::new(&primary, None))
        .await
        .into_parts();

    let report = result.unwrap();
    assert_eq!(report.primary, StageOutcome::Completed { documents: 2 });
    assert_eq!(report.secondary, StageOutcome::NothingSupplied);
    assert!(state.primary_done());
    assert!(!state.secondary_done());
    assert_eq!(state.phase(), WorkflowPhase::PrimaryDone);

    let per_doc = [
        Endpoint::Upload,
        Endpoint::ExtractPrimary,
        Endpoint::RenderMarkdown,
        Endpoint::IndexEmbeddings,
    ];
    let expected: Vec<Endpoint> = per_doc.iter().chain(per_doc.iter()).copied().collect();
    assert_eq!(backend.endpoints(), expected);
}

#[tokio::test]
async fn test_keys_flow_between_stages() {
    let backend = MockBackend::new();
    let strategy = CollectionStrategy::default();
    let controller = IngestController::new(&backend, &strategy);
    let primary = [doc("Prolia_PI.pdf")];

    let (_, result) = controller
        .run_primary(WorkflowState::new(), &primary)
        .await
        .into_parts();
    result.unwrap();

    let calls = backend.calls();
    assert_eq!(calls[1].args, vec!["uploads/Prolia_PI.pdf"]);
    assert_eq!(calls[2].args, vec!["uploads/Prolia_PI.pdf.processed"]);
    assert_eq!(
        calls[3].args,
        vec!["uploads/Prolia_PI.pdf.processed.md", "label_poc_3"]
    );
}

#[tokio::test]
async fn test_binding_comes_from_first_document_only() {
    let backend = MockBackend::new();
    let strategy = CollectionStrategy::default();
    let controller = IngestController::new(&backend, &strategy);
    let primary = [doc("Cibinqo_label.pdf"), doc("Prolia_label.pdf")];

    let (state, result) = controller
        .run_primary(WorkflowState::new(), &primary)
        .await
        .into_parts();
    result.unwrap();

    assert_eq!(
        state.binding(),
        Some(&CollectionBinding::new("label_poc_2", 1))
    );
    for call in backend
        .calls()
        .iter()
        .filter(|c| c.endpoint == Endpoint::IndexEmbeddings)
    {
        assert_eq!(call.args[1], "label_poc_2");
    }
}

#[tokio::test]
async fn test_fixed_strategy_overrides_keywords() {
    let backend = MockBackend::new();
    let strategy = CollectionStrategy::Fixed(CollectionBinding::new("custom_collection", 3));
    let controller = IngestController::new(&backend, &strategy);
    let primary = [doc("Braftovi_label.pdf")];

    let (state, result) = controller
        .run_primary(WorkflowState::new(), &primary)
        .await
        .into_parts();
    result.unwrap();
    assert_eq!(state.binding().unwrap().collection_id, "custom_collection");
    assert_eq!(backend.calls()[3].args[1], "custom_collection");
}

#[tokio::test]
async fn test_extract_failure_aborts_batch() {
    let backend = MockBackend::new().with_failure(Endpoint::ExtractPrimary, 500);
    let strategy = CollectionStrategy::default();
    let controller = IngestController::new(&backend, &strategy);
    let primary = [doc("Braftovi_label.pdf"), doc("Mektovi_label.pdf")];

    let (state, result) = controller
        .run(WorkflowState::new(), IngestBatch::new(&primary, None))
        .await
        .into_parts();

    match result.unwrap_err() {
        Error::RemoteCall {
            endpoint, status, ..
        } => {
            assert_eq!(endpoint, Endpoint::ExtractPrimary);
            assert_eq!(status, Some(500));
        }
        other => panic!("Expected RemoteCall, got {:?}", other),
    }
    assert!(!state.primary_done());
    assert_eq!(backend.call_count(Endpoint::RenderMarkdown), 0);
    assert_eq!(backend.call_count(Endpoint::IndexEmbeddings), 0);
    assert_eq!(backend.call_count(Endpoint::Upload), 1);
}

#[tokio::test]
async fn test_second_document_failure_leaves_primary_pending() {
    let backend = MockBackend::new().with_failure_after(Endpoint::IndexEmbeddings, 1, 503);
    let strategy = CollectionStrategy::default();
    let controller = IngestController::new(&backend, &strategy);
    let primary = [doc("Imlygic_a.pdf"), doc("Imlygic_b.pdf"), doc("Imlygic_c.pdf")];

    let (state, result) = controller
        .run_primary(WorkflowState::new(), &primary)
        .await
        .into_parts();

    assert!(result.is_err());
    assert!(!state.primary_done());
    // Third document never started.
    assert_eq!(backend.call_count(Endpoint::Upload), 2);
    assert_eq!(backend.call_count(Endpoint::IndexEmbeddings), 2);
}

#[tokio::test]
async fn test_retry_after_failure_reuses_binding() {
    let backend = MockBackend::new().with_failure(Endpoint::Upload, 502);
    let strategy = CollectionStrategy::default();
    let controller = IngestController::new(&backend, &strategy);
    let primary = [doc("Prolia.pdf")];

    let (state, result) = controller
        .run_primary(WorkflowState::new(), &primary)
        .await
        .into_parts();
    assert!(result.is_err());
    assert_eq!(state.binding().unwrap().collection_id, "label_poc_3");

    backend.clear_failures();
    // A differently named batch on retry keeps the original binding.
    let retry = [doc("Braftovi.pdf")];
    let (state, result) = controller.run_primary(state, &retry).await.into_parts();
    assert_eq!(result.unwrap(), StageOutcome::Completed { documents: 1 });
    assert!(state.primary_done());
    assert_eq!(state.binding().unwrap().collection_id, "label_poc_3");
}

#[tokio::test]
async fn test_rerun_after_completion_is_noop() {
    let backend = MockBackend::new();
    let strategy = CollectionStrategy::default();
    let controller = IngestController::new(&backend, &strategy);
    let primary = [doc("Prolia.pdf")];
    let secondary = doc("Prolia_ad.docx");

    let (state, result) = controller
        .run(WorkflowState::new(), IngestBatch::new(&primary, Some(&secondary)))
        .await
        .into_parts();
    result.unwrap();
    assert_eq!(state.phase(), WorkflowPhase::SecondaryDone);

    backend.clear_calls();
    let (after, result) = controller
        .run(state.clone(), IngestBatch::new(&primary, Some(&secondary)))
        .await
        .into_parts();
    let report = result.unwrap();
    assert_eq!(report.primary, StageOutcome::AlreadyDone);
    assert_eq!(report.secondary, StageOutcome::AlreadyDone);
    assert_eq!(backend.total_calls(), 0);
    assert_eq!(after, state);
}

#[tokio::test]
async fn test_empty_batch_makes_no_calls() {
    let backend = MockBackend::new();
    let strategy = CollectionStrategy::default();
    let controller = IngestController::new(&backend, &strategy);

    let (state, result) = controller
        .run(WorkflowState::new(), IngestBatch::default())
        .await
        .into_parts();
    let report = result.unwrap();
    assert_eq!(report.primary, StageOutcome::NothingSupplied);
    assert_eq!(state, WorkflowState::new());
    assert_eq!(backend.total_calls(), 0);
}

// =============================================================================
// Secondary document
// =============================================================================

#[tokio::test]
async fn test_secondary_waits_for_primary() {
    let backend = MockBackend::new();
    let strategy = CollectionStrategy::default();
    let controller = IngestController::new(&backend, &strategy);
    let secondary = doc("asset.pdf");

    let (state, result) = controller
        .run(WorkflowState::new(), IngestBatch::new(&[], Some(&secondary)))
        .await
        .into_parts();
    assert_eq!(result.unwrap().secondary, StageOutcome::AwaitingPrimary);
    assert!(!state.secondary_done());
    assert_eq!(backend.total_calls(), 0);
}

#[tokio::test]
async fn test_secondary_skipped_when_primary_fails() {
    let backend = MockBackend::new().with_failure(Endpoint::RenderMarkdown, 500);
    let strategy = CollectionStrategy::default();
    let controller = IngestController::new(&backend, &strategy);
    let primary = [doc("Prolia.pdf")];
    let secondary = doc("asset.pdf");

    let (state, result) = controller
        .run(WorkflowState::new(), IngestBatch::new(&primary, Some(&secondary)))
        .await
        .into_parts();
    assert!(result.is_err());
    assert!(!state.secondary_done());
    assert_eq!(backend.call_count(Endpoint::ExtractSecondary), 0);
    assert_eq!(backend.call_count(Endpoint::Upload), 1);
}

#[tokio::test]
async fn test_secondary_uses_binding_end_page() {
    let backend = MockBackend::new();
    let strategy = CollectionStrategy::Fixed(CollectionBinding::new("label_poc_2", 4));
    let controller = IngestController::new(&backend, &strategy);
    let primary = [doc("Cibinqo.pdf")];
    let secondary = doc("Cibinqo_banner.pdf");

    let (state, result) = controller
        .run(WorkflowState::new(), IngestBatch::new(&primary, Some(&secondary)))
        .await
        .into_parts();
    let report = result.unwrap();
    assert_eq!(report.secondary, StageOutcome::Completed { documents: 1 });
    assert!(state.secondary_done());

    let calls = backend.calls();
    let extract = calls.last().unwrap();
    assert_eq!(extract.endpoint, Endpoint::ExtractSecondary);
    assert_eq!(
        extract.args,
        vec!["uploads/Cibinqo_banner.pdf", "1", "4"]
    );
}

#[tokio::test]
async fn test_secondary_failure_keeps_primary_done() {
    let backend = MockBackend::new().with_failure(Endpoint::ExtractSecondary, 500);
    let strategy = CollectionStrategy::default();
    let controller = IngestController::new(&backend, &strategy);
    let primary = [doc("Prolia.pdf")];
    let secondary = doc("asset.pdf");

    let (state, result) = controller
        .run(WorkflowState::new(), IngestBatch::new(&primary, Some(&secondary)))
        .await
        .into_parts();
    assert!(result.is_err());
    assert!(state.primary_done());
    assert!(!state.secondary_done());

    backend.clear_failures();
    backend.clear_calls();
    let (state, result) = controller.run(state, IngestBatch::new(&primary, Some(&secondary))).await.into_parts();
    let report = result.unwrap();
    assert_eq!(report.primary, StageOutcome::AlreadyDone);
    assert_eq!(report.secondary, StageOutcome::Completed { documents: 1 });
    assert!(state.secondary_done());
    assert_eq!(
        backend.endpoints(),
        vec![Endpoint::Upload, Endpoint::ExtractSecondary]
    );
}

// =============================================================================
// Progress events
// =============================================================================

#[tokio::test]
async fn test_progress_events_for_primary_document() {
    let backend = MockBackend::new();
    let strategy = CollectionStrategy::default();
    let progress = RecordingProgress::default();
    let controller = IngestController::new(&backend, &strategy).with_progress(&progress);
    let primary = [doc("Prolia.pdf")];

    let (_, result) = controller
        .run_primary(WorkflowState::new(), &primary)
        .await
        .into_parts();
    result.unwrap();

    let started: Vec<(String, u8)> = progress
        .events()
        .into_iter()
        .filter_map(|e| match e {
            ProgressEvent::StageStarted { label, percent } => Some((label, percent)),
            _ => None,
        })
        .collect();
    assert_eq!(
        started,
        vec![
            ("Uploading PI document 1...".to_string(), 10),
            ("Extracting PI content...".to_string(), 40),
            ("Generating Markdown...".to_string(), 70),
            ("Creating Embeddings PI File 1...".to_string(), 90),
        ]
    );
    assert!(progress.events().contains(&ProgressEvent::DocumentCompleted {
        index: 1,
        filename: "Prolia.pdf".to_string()
    }));
}

#[tokio::test]
async fn test_progress_finished_on_failure() {
    let backend = MockBackend::new().with_failure(Endpoint::Upload, 500);
    let strategy = CollectionStrategy::default();
    let progress = RecordingProgress::default();
    let controller = IngestController::new(&backend, &strategy).with_progress(&progress);
    let primary = [doc("Prolia.pdf")];

    let (_, result) = controller
        .run_primary(WorkflowState::new(), &primary)
        .await
        .into_parts();
    assert!(result.is_err());
    assert_eq!(progress.events().last(), Some(&ProgressEvent::Finished));
    assert!(!progress
        .events()
        .iter()
        .any(|e| matches!(e, ProgressEvent::DocumentCompleted { .. })));
}
