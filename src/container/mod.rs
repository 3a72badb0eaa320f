//! pbix container support.
//!
//! A pbix file is a ZIP archive with a fixed internal layout:
//!
//! | logical name    | member           |
//! |-----------------|------------------|
//! | `version`       | `Version`        |
//! | `layout`        | `Report/Layout`  |
//! | `metadata`      | `Metadata`       |
//! | `settings`      | `Settings`       |
//! | `diagramLayout` | `DiagramLayout`  |
//! | `connections`   | `Connections`    |
//!
//! Every member is UTF-16LE text holding JSON (or, for `Version`, a bare
//! version number). [`ContentLoader`] stages the archive, loads each member
//! independently through the deep normalizer and returns an immutable
//! [`Document`].

pub mod content_map;
pub mod document;
pub mod extract;
pub mod layout;
pub mod loader;
pub mod options;


pub use content_map::{CONTENT_MAP, PartName, UnknownPartName};
pub use document::{Document, DocumentBuilder, PartDiagnostic, PartIssue};
pub use extract::{ArchiveExtractor, CancellationToken, Staging, ZipExtractor, copy_with_cancel};
pub use layout::{LayoutSection, ReportLayout, ReportMetadata, VisualContainer};
pub use loader::{ContentLoader, open};
pub use options::LoaderOptions;
