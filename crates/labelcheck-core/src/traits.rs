//! Backend trait: the six remote operations the workflow depends on.
//!
//! The HTTP implementation lives in `labelcheck-client`; tests use the mock
//! backend from the same crate.

use async_trait::async_trait;
use serde_json::Value as JsonValue;

use crate::error::Result;
use crate::models::UploadedDocument;

/// Remote document-processing service.
///
/// Every method is a single attempt. Implementations map non-success
/// responses and transport failures to `Error::RemoteCall` tagged with the
/// matching `Endpoint`.
#[async_trait]
pub trait LabelBackend: Send + Sync {
    /// Upload a file; returns the storage key.
    async fn upload(&self, document: &UploadedDocument) -> Result<String>;

    /// Extract a primary document; returns the processed key.
    async fn extract_primary(&self, key: &str) -> Result<String>;

    /// Look up the markdown key for a processed primary document.
    async fn render_markdown(&self, processed_key: &str) -> Result<String>;

    /// Embed and index markdown into `collection`.
    async fn index_embeddings(&self, markdown_key: &str, collection: &str) -> Result<()>;

    /// Extract claims from pages `start_page..=end_page` of a secondary document.
    async fn extract_secondary(&self, key: &str, start_page: u32, end_page: u32) -> Result<()>;

    /// Verify one claim sentence against `collection`; returns the raw JSON body.
    async fn verify_claim(&self, sentence: &str, collection: &str) -> Result<JsonValue>;
}
