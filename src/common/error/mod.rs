//! Unified error types for the pbix reader.
//!
//! Container-level failures abort [`crate::ContentLoader::open`] and are
//! reported through [`Error`]. Failures that only affect a single logical
//! part are not errors at this level; they are recorded on the returned
//! document as [`crate::container::PartIssue`] values.

// Submodule declarations
pub mod types;
pub mod conversions;

// Re-exports
pub use types::{Error, Result};
