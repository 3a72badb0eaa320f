//! pbix - a reader for Power BI `.pbix` report containers
//!
//! A `.pbix` file is a ZIP archive whose members hold UTF-16LE encoded JSON.
//! Many string values inside that JSON are themselves JSON documents,
//! sometimes nested several levels deep. This crate opens such a container,
//! loads each logical part independently and resolves all of the embedded
//! JSON into plain [`serde_json::Value`] trees.
//!
//! # Features
//!
//! - **Fault isolation**: a missing or undecodable part is reported on the
//!   document instead of failing the whole open
//! - **Deep normalization**: stringified JSON is resolved recursively, while
//!   numeric strings such as `"007"` are kept exactly as written
//! - **Bounded work**: recursion depth is capped and extraction can be given
//!   a deadline or a cancellation token
//! - **Immutable documents**: accessors hand out copies
//!
//! # Example
//!
//! ```no_run
//! use pbix::PartName;
//!
//! # async fn run() -> pbix::Result<()> {
//! let doc = pbix::open("sales.pbix").await?;
//!
//! println!("version: {:?}", doc.version());
//! for page in doc.sections().unwrap_or_default() {
//!     println!("page: {page}");
//! }
//! if doc.get(PartName::Connections).is_none() {
//!     println!("no connections part");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Example - Normalizing JSON directly
//!
//! ```
//! use pbix::normalize::normalize;
//! use serde_json::json;
//!
//! let value = normalize(json!("{\"query\":\"[1,2]\",\"id\":\"007\"}"));
//! assert_eq!(value, json!({ "query": [1, 2], "id": "007" }));
//! ```

/// Shared error type and text decoding
pub mod common;

/// Container loading: part table, extraction, loader and document
pub mod container;

/// Recursive resolution of stringified JSON
pub mod normalize;

pub use common::{Error, Result};
pub use container::{
    CancellationToken, ContentLoader, Document, LoaderOptions, PartDiagnostic, PartIssue,
    PartName, open,
};
pub use normalize::{NormalizeOptions, Normalizer};
