//! # labelcheck-client
//!
//! Backend access for labelcheck.
//!
//! This crate provides:
//! - [`HttpBackend`], the reqwest implementation of `LabelBackend`
//! - [`config::Config`], loaded from TOML or `LABELCHECK_*` environment variables
//! - a mock backend for tests (feature `mock`)
//!
//! # Feature Flags
//!
//! - `mock`: Enable [`mock::MockBackend`] for use in other crates' tests
//!
//! # Example
//!
//! ```rust,no_run
//! use labelcheck_client::{config::Config, HttpBackend};
//! use labelcheck_core::LabelBackend;
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = Config::load().unwrap();
//!     let backend = HttpBackend::new(config.api).unwrap();
//!     let raw = backend.verify_claim("Prolia is given every 6 months.", "label_poc_3").await.unwrap();
//! }
//! ```

pub mod config;
pub mod http;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use config::{ApiConfig, CollectionConfig, CollectionMode, Config, ConfigError, VerifyEndpoint};
pub use http::HttpBackend;
