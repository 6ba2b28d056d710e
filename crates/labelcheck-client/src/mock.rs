//! Mock backend for deterministic workflow tests.
//!
//! Records every call in order and can be told to fail specific endpoints.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use labelcheck_client::mock::MockBackend;
//! use labelcheck_core::Endpoint;
//!
//! let backend = MockBackend::new().with_failure(Endpoint::ExtractPrimary, 500);
//! // ... run the workflow ...
//! assert_eq!(backend.call_count(Endpoint::RenderMarkdown), 0);
//! ```

use async_trait::async_trait;
use serde_json::{json, Value as JsonValue};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use labelcheck_core::{Endpoint, Error, LabelBackend, Result, UploadedDocument};

/// One recorded backend call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockCall {
    pub endpoint: Endpoint,
    pub args: Vec<String>,
}

#[derive(Debug, Clone, Copy)]
struct Failure {
    status: u16,
    /// Calls that succeed before the failure kicks in.
    after: usize,
}

#[derive(Debug, Default)]
struct MockState {
    calls: Vec<MockCall>,
    failures: HashMap<Endpoint, Failure>,
    verify_response: Option<JsonValue>,
}

/// In-memory [`LabelBackend`].
///
/// Keys are derived from their inputs so tests can assert on the exact
/// values passed between stages: uploads return `uploads/<filename>`,
/// extraction appends `.processed`, markdown lookup appends `.md`.
#[derive(Clone, Default)]
pub struct MockBackend {
    state: Arc<Mutex<MockState>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every call to `endpoint` with `status`.
    pub fn with_failure(self, endpoint: Endpoint, status: u16) -> Self {
        self.set_failure(endpoint, status, 0);
        self
    }

    /// Let `after` calls to `endpoint` succeed, then fail with `status`.
    pub fn with_failure_after(self, endpoint: Endpoint, after: usize, status: u16) -> Self {
        self.set_failure(endpoint, status, after);
        self
    }

    /// Body returned by `verify_claim`.
    pub fn with_verify_response(self, response: JsonValue) -> Self {
        self.lock().verify_response = Some(response);
        self
    }

    pub fn set_failure(&self, endpoint: Endpoint, status: u16, after: usize) {
        self.lock()
            .failures
            .insert(endpoint, Failure { status, after });
    }

    /// Remove every configured failure, as if the backend recovered.
    pub fn clear_failures(&self) {
        self.lock().failures.clear();
    }

    /// All calls in the order they were made.
    pub fn calls(&self) -> Vec<MockCall> {
        self.lock().calls.clone()
    }

    /// Endpoint sequence of all calls.
    pub fn endpoints(&self) -> Vec<Endpoint> {
        self.lock().calls.iter().map(|c| c.endpoint).collect()
    }

    pub fn call_count(&self, endpoint: Endpoint) -> usize {
        self.lock()
            .calls
            .iter()
            .filter(|c| c.endpoint == endpoint)
            .count()
    }

    pub fn total_calls(&self) -> usize {
        self.lock().calls.len()
    }

    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        // A panicking test thread cannot leave the log half-written.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Log the call, then apply any configured failure.
    fn record(&self, endpoint: Endpoint, args: &[&str]) -> Result<()> {
        let mut state = self.lock();
        let previous = state
            .calls
            .iter()
            .filter(|c| c.endpoint == endpoint)
            .count();
        state.calls.push(MockCall {
            endpoint,
            args: args.iter().map(|a| a.to_string()).collect(),
        });

        match state.failures.get(&endpoint) {
            Some(failure) if previous >= failure.after => Err(Error::remote_status(
                endpoint,
                failure.status,
                "mock failure",
            )),
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl LabelBackend for MockBackend {
    async fn upload(&self, document: &UploadedDocument) -> Result<String> {
        self.record(Endpoint::Upload, &[document.filename()])?;
        Ok(format!("uploads/{}", document.filename()))
    }

    async fn extract_primary(&self, key: &str) -> Result<String> {
        self.record(Endpoint::ExtractPrimary, &[key])?;
        Ok(format!("{}.processed", key))
    }

    async fn render_markdown(&self, processed_key: &str) -> Result<String> {
        self.record(Endpoint::RenderMarkdown, &[processed_key])?;
        Ok(format!("{}.md", processed_key))
    }

    async fn index_embeddings(&self, markdown_key: &str, collection: &str) -> Result<()> {
        self.record(Endpoint::IndexEmbeddings, &[markdown_key, collection])
    }

    async fn extract_secondary(&self, key: &str, start_page: u32, end_page: u32) -> Result<()> {
        self.record(
            Endpoint::ExtractSecondary,
            &[key, &start_page.to_string(), &end_page.to_string()],
        )
    }

    async fn verify_claim(&self, sentence: &str, collection: &str) -> Result<JsonValue> {
        self.record(Endpoint::VerifyClaim, &[sentence, collection])?;
        let response = self.lock().verify_response.clone();
        Ok(response.unwrap_or_else(|| {
            json!({
                "sentence": sentence,
                "superscripts": [],
                "valid": true,
                "replacement_text": sentence,
                "explanation": "Mock explanation",
                "reasoning": "Mock reasoning",
                "sources": [],
                "struc_sources": []
            })
        }))
    }
}
