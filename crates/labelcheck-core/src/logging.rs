//! Structured logging schema and field name constants for labelcheck.
//!
//! All crates use these constants for consistent structured logging fields,
//! so a session can be followed end to end by filtering on `session_id`.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Stage aborted and surfaced to the user |
//! | WARN  | Backend call failed or was slow |
//! | INFO  | Workflow transitions, stage completions |
//! | DEBUG | Individual backend calls, resolved configuration |
//! | TRACE | Raw response payloads |

// ─── Identity fields ───────────────────────────────────────────────────────

/// Session identifier shared by every event of one interactive session.
/// Format: UUIDv7 (time-ordered).
pub const SESSION_ID: &str = "session_id";

/// Subsystem originating the log event.
/// Values: "client", "workflow", "cli"
pub const SUBSYSTEM: &str = "subsystem";

/// Component within a subsystem.
/// Examples: "http", "ingest", "verify", "render"
pub const COMPONENT: &str = "component";

/// Logical operation name.
pub const OPERATION: &str = "op";

// ─── Entity fields ─────────────────────────────────────────────────────────

/// Backend endpoint name (see `Endpoint`).
pub const ENDPOINT: &str = "endpoint";

/// Collection a document is indexed into or a claim is checked against.
pub const COLLECTION: &str = "collection";

/// Filename of the document being processed.
pub const DOCUMENT: &str = "document";

/// Workflow stage label.
pub const STAGE: &str = "stage";

// ─── Measurement fields ────────────────────────────────────────────────────

/// HTTP status code returned by the backend.
pub const STATUS: &str = "status";

/// Wall-clock duration in milliseconds.
pub const DURATION_MS: &str = "duration_ms";

/// Number of items returned (sources, documents).
pub const RESULT_COUNT: &str = "result_count";

// ─── Outcome fields ────────────────────────────────────────────────────────

/// Boolean success/failure indicator.
pub const SUCCESS: &str = "success";

/// Error message when an operation fails.
pub const ERROR_MSG: &str = "error";

/// Slow operation threshold exceeded.
pub const SLOW: &str = "slow";
