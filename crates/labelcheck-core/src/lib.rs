//! # labelcheck-core
//!
//! Core types, traits, and pure rules for labelcheck.
//!
//! This crate provides the data model shared by the HTTP client, the
//! ingestion workflow, and the CLI: collection resolution, the workflow
//! state value, the backend trait, and verdict normalization.

pub mod collection;
pub mod defaults;
pub mod error;
pub mod file_safety;
pub mod logging;
pub mod models;
pub mod traits;
pub mod verdict;

// Re-export commonly used types at crate root
pub use collection::{CollectionResolver, CollectionStrategy, KeywordRule};
pub use error::{Error, Result};
pub use file_safety::{detect_media_type, ensure_supported_extension};
pub use models::*;
pub use traits::*;
pub use verdict::{
    classify, meaningful_replacement, StructuredSource, Validity, VerificationResult,
};
