//! Centralized default constants for labelcheck.
//!
//! **This module is the single source of truth** for shared default values.
//! Client, workflow, and CLI crates reference these constants instead of
//! defining their own.

// =============================================================================
// BACKEND API
// =============================================================================

/// Default base URL of the document-processing backend.
pub const API_BASE_URL: &str = "http://127.0.0.1:8000";

/// Multipart file upload.
pub const PATH_UPLOAD: &str = "/files/upload";

/// Primary (prescribing information) document extraction.
pub const PATH_EXTRACT_PRIMARY: &str = "/process/process-PI-mistral";

/// Markdown key lookup for a processed primary document.
pub const PATH_RENDER_MARKDOWN: &str = "/processed/llm-key";

/// Embedding index build for a primary document.
pub const PATH_INDEX_EMBEDDINGS: &str = "/rag/index-pi";

/// Secondary (asset) document claim extraction.
pub const PATH_EXTRACT_SECONDARY: &str = "/process/process-asset";

/// Hybrid-retrieval claim verification.
pub const PATH_VERIFY_HYBRID: &str = "/rag/hybrid-single-verify-claim";

/// Dense-retrieval claim verification.
pub const PATH_VERIFY_SINGLE: &str = "/rag/single-verify-claim";

// =============================================================================
// TIMEOUTS
// =============================================================================

/// Timeout for the claim verification call (seconds).
pub const VERIFY_TIMEOUT_SECS: u64 = 60;

/// Timeout for every other backend call (seconds).
///
/// Extraction of a long label can take minutes, so this is generous; it only
/// exists so a hung backend cannot block a session forever.
pub const REQUEST_TIMEOUT_SECS: u64 = 300;

/// Calls slower than this are logged with `slow = true` (milliseconds).
pub const SLOW_CALL_MS: u64 = 30_000;

// =============================================================================
// COLLECTIONS & PAGES
// =============================================================================

/// Collection used when no product keyword matches the filename.
pub const DEFAULT_COLLECTION: &str = "label_poc_default";

/// End page bound for secondary extraction.
pub const DEFAULT_END_PAGE: u32 = 1;

/// First page of secondary extraction.
pub const SECONDARY_START_PAGE: u32 = 1;

// =============================================================================
// UPLOADS
// =============================================================================

/// File extensions accepted for primary and secondary documents.
pub const ALLOWED_EXTENSIONS: &[&str] = &["pdf", "docx"];

// =============================================================================
// ENVIRONMENT VARIABLES
// =============================================================================

/// Path to a TOML configuration file.
pub const ENV_CONFIG: &str = "LABELCHECK_CONFIG";

/// Backend base URL override.
pub const ENV_API_BASE_URL: &str = "LABELCHECK_API_BASE_URL";

/// Verification endpoint selection (`hybrid` or `single`).
pub const ENV_VERIFY_ENDPOINT: &str = "LABELCHECK_VERIFY_ENDPOINT";

/// Optional `top_k` sent with verification requests.
pub const ENV_TOP_K: &str = "LABELCHECK_TOP_K";

/// Timeout for non-verification calls.
pub const ENV_REQUEST_TIMEOUT_SECS: &str = "LABELCHECK_REQUEST_TIMEOUT_SECS";

/// Timeout for verification calls.
pub const ENV_VERIFY_TIMEOUT_SECS: &str = "LABELCHECK_VERIFY_TIMEOUT_SECS";

/// Fixed collection id; switches collection selection to fixed mode.
pub const ENV_COLLECTION: &str = "LABELCHECK_COLLECTION";

/// End page bound used together with a fixed collection.
pub const ENV_END_PAGE: &str = "LABELCHECK_END_PAGE";
