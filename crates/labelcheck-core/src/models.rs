//! Domain models: backend endpoints, uploaded documents, collection
//! bindings, and the per-session workflow state.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::file_safety::{detect_media_type, ensure_supported_extension};

// =============================================================================
// ENDPOINTS
// =============================================================================

/// Logical backend operation. Carried by `Error::RemoteCall` and log events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Endpoint {
    Upload,
    ExtractPrimary,
    RenderMarkdown,
    IndexEmbeddings,
    ExtractSecondary,
    VerifyClaim,
}

impl Endpoint {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Upload => "upload",
            Self::ExtractPrimary => "extract_primary",
            Self::RenderMarkdown => "render_markdown",
            Self::IndexEmbeddings => "index_embeddings",
            Self::ExtractSecondary => "extract_secondary",
            Self::VerifyClaim => "verify_claim",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// DOCUMENTS
// =============================================================================

/// A primary or secondary file supplied by the user.
///
/// Construction runs the extension check, so every value of this type is
/// uploadable.
#[derive(Clone, PartialEq, Eq)]
pub struct UploadedDocument {
    filename: String,
    bytes: Vec<u8>,
    media_type: String,
}

impl UploadedDocument {
    /// Create a document from raw bytes, detecting its media type.
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Result<Self> {
        let filename = filename.into();
        ensure_supported_extension(&filename)?;
        if bytes.is_empty() {
            return Err(Error::InvalidInput(format!("{} is empty", filename)));
        }
        let media_type = detect_media_type(&filename, &bytes);
        Ok(Self {
            filename,
            bytes,
            media_type,
        })
    }

    /// Read a document from disk. The stored filename is the path's final
    /// component, which is what the collection resolver sees.
    pub fn from_path(path: &Path) -> Result<Self> {
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| Error::InvalidInput(format!("{} has no filename", path.display())))?
            .to_string();
        ensure_supported_extension(&filename)?;
        let bytes = std::fs::read(path)?;
        Self::new(filename, bytes)
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn media_type(&self) -> &str {
        &self.media_type
    }
}

impl fmt::Debug for UploadedDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadedDocument")
            .field("filename", &self.filename)
            .field("len", &self.bytes.len())
            .field("media_type", &self.media_type)
            .finish()
    }
}

// =============================================================================
// COLLECTION BINDING
// =============================================================================

/// Resolved target for indexing and verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionBinding {
    pub collection_id: String,
    pub end_page: u32,
}

impl CollectionBinding {
    pub fn new(collection_id: impl Into<String>, end_page: u32) -> Self {
        Self {
            collection_id: collection_id.into(),
            end_page,
        }
    }
}

// =============================================================================
// WORKFLOW STATE
// =============================================================================

/// Phase of the ingestion state machine.
///
/// The `*InProgress` phases only exist while a controller call is running;
/// a stored `WorkflowState` always reports one of the rest phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowPhase {
    Idle,
    PrimaryInProgress,
    PrimaryDone,
    SecondaryInProgress,
    SecondaryDone,
}

impl fmt::Display for WorkflowPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Idle => "idle",
            Self::PrimaryInProgress => "primary_in_progress",
            Self::PrimaryDone => "primary_done",
            Self::SecondaryInProgress => "secondary_in_progress",
            Self::SecondaryDone => "secondary_done",
        };
        f.write_str(s)
    }
}

/// Session-scoped gating flags plus the session's collection binding.
///
/// Flags only ever move from `false` to `true`, and the binding is set at
/// most once. The workflow controller takes this by value and hands back
/// the updated copy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowState {
    primary_done: bool,
    secondary_done: bool,
    binding: Option<CollectionBinding>,
}

impl WorkflowState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn primary_done(&self) -> bool {
        self.primary_done
    }

    pub fn secondary_done(&self) -> bool {
        self.secondary_done
    }

    pub fn binding(&self) -> Option<&CollectionBinding> {
        self.binding.as_ref()
    }

    /// Rest phase derived from the flags.
    pub fn phase(&self) -> WorkflowPhase {
        match (self.primary_done, self.secondary_done) {
            (_, true) => WorkflowPhase::SecondaryDone,
            (true, false) => WorkflowPhase::PrimaryDone,
            (false, false) => WorkflowPhase::Idle,
        }
    }

    /// Bind the session to a collection unless it is already bound.
    ///
    /// Returns the binding in effect afterwards, which is the earlier one if
    /// there was one.
    pub fn bind_collection(&mut self, binding: CollectionBinding) -> &CollectionBinding {
        self.binding.get_or_insert(binding)
    }

    pub fn mark_primary_done(&mut self) {
        self.primary_done = true;
    }

    /// Record secondary completion. Refused while the primary batch is not done.
    pub fn mark_secondary_done(&mut self) -> Result<()> {
        if !self.primary_done {
            return Err(Error::Internal(
                "secondary stage completed before primary batch".to_string(),
            ));
        }
        self.secondary_done = true;
        Ok(())
    }
}
