//! # labelcheck-workflow
//!
//! Staged document ingestion, claim verification, and result rendering.
//!
//! - [`ingest`]: the primary/secondary ingestion state machine
//! - [`verify`]: verification calls and collection selection
//! - [`render`]: turns a verification result into display sections
//! - [`session`]: ties the above to one long-lived [`labelcheck_core::WorkflowState`]

pub mod ingest;
pub mod progress;
pub mod render;
pub mod session;
pub mod verify;

pub use ingest::{Advance, IngestBatch, IngestController, IngestReport, StageOutcome};
pub use progress::{NoopProgress, ProgressEvent, ProgressSink};
pub use render::{render, CalloutStyle, Report, Section, SourceCard};
pub use session::Session;
pub use verify::{collection_for, Verifier};
