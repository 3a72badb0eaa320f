//! The immutable result of opening a container.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use crate::container::content_map::PartName;

/// Why a part is absent or only partially resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartIssue {
    /// The part's file does not exist in the container
    Missing { path: PathBuf },
    /// The part's file exists but could not be read
    Io(String),
    /// The part's bytes are not valid UTF-16LE text
    Decode(String),
    /// The part loaded, but some nested values were left unresolved
    DepthLimitExceeded { truncated: usize },
    /// The part loaded, but the JSON parser failed on some values for a
    /// reason other than invalid syntax
    Unresolved { reasons: Vec<String> },
}

impl PartIssue {
    /// Whether the part is absent from the document because of this issue.
    #[inline]
    pub fn is_absent(&self) -> bool {
        !matches!(
            self,
            PartIssue::DepthLimitExceeded { .. } | PartIssue::Unresolved { .. }
        )
    }
}

impl fmt::Display for PartIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PartIssue::Missing { path } => write!(f, "not found at {}", path.display()),
            PartIssue::Io(msg) => write!(f, "read failed: {msg}"),
            PartIssue::Decode(msg) => write!(f, "decode failed: {msg}"),
            PartIssue::DepthLimitExceeded { truncated } => {
                write!(f, "{truncated} value(s) left unresolved at the depth limit")
            },
            PartIssue::Unresolved { reasons } => {
                write!(f, "value(s) left unresolved: {}", reasons.join("; "))
            },
        }
    }
}

/// A per-part condition reported while loading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartDiagnostic {
    pub part: PartName,
    pub issue: PartIssue,
}

impl fmt::Display for PartDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "content [{}] {}", self.part.as_str().to_uppercase(), self.issue)
    }
}

/// All logical parts of one opened container.
///
/// A `Document` is built once and never changes afterwards. Every accessor
/// returns an owned copy (copy-on-access), so callers may freely mutate what
/// they get back without affecting later reads.
#[derive(Debug, Clone)]
pub struct Document {
    path: PathBuf,
    parts: HashMap<PartName, Value>,
    diagnostics: Vec<PartDiagnostic>,
}

impl Document {
    /// Path of the container this document was read from.
    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A copy of the part's normalized value, or `None` if it failed to load.
    #[inline]
    pub fn get(&self, part: PartName) -> Option<Value> {
        self.parts.get(&part).cloned()
    }

    /// Like [`Document::get`], addressing the part by its logical name.
    pub fn get_by_name(&self, name: &str) -> Option<Value> {
        PartName::from_name(name).and_then(|part| self.get(part))
    }

    /// Whether the part loaded.
    #[inline]
    pub fn contains(&self, part: PartName) -> bool {
        self.parts.contains_key(&part)
    }

    /// Loaded parts in table order.
    pub fn present_parts(&self) -> Vec<PartName> {
        PartName::ALL
            .into_iter()
            .filter(|part| self.parts.contains_key(part))
            .collect()
    }

    /// Per-part conditions, in table order.
    #[inline]
    pub fn diagnostics(&self) -> &[PartDiagnostic] {
        &self.diagnostics
    }

    /// Whether every part loaded and resolved fully.
    #[inline]
    pub fn is_complete(&self) -> bool {
        self.diagnostics.is_empty() && self.parts.len() == PartName::ALL.len()
    }

    pub fn version(&self) -> Option<Value> {
        self.get(PartName::Version)
    }

    pub fn layout(&self) -> Option<Value> {
        self.get(PartName::Layout)
    }

    pub fn metadata(&self) -> Option<Value> {
        self.get(PartName::Metadata)
    }

    pub fn settings(&self) -> Option<Value> {
        self.get(PartName::Settings)
    }

    pub fn diagram_layout(&self) -> Option<Value> {
        self.get(PartName::DiagramLayout)
    }

    pub fn connections(&self) -> Option<Value> {
        self.get(PartName::Connections)
    }

    /// Borrow a part without copying, for read-only projections.
    #[inline]
    pub(crate) fn part_ref(&self, part: PartName) -> Option<&Value> {
        self.parts.get(&part)
    }

    /// All present parts as one JSON object keyed by logical name.
    pub fn to_json(&self) -> Value {
        let mut out = Map::new();
        for part in PartName::ALL {
            if let Some(value) = self.parts.get(&part) {
                out.insert(part.as_str().to_string(), value.clone());
            }
        }
        Value::Object(out)
    }
}

/// Assembles a [`Document`]; each part may be set at most once.
#[derive(Debug)]
pub struct DocumentBuilder {
    path: PathBuf,
    parts: HashMap<PartName, Value>,
    diagnostics: Vec<PartDiagnostic>,
}

impl DocumentBuilder {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            parts: HashMap::with_capacity(PartName::ALL.len()),
            diagnostics: Vec::new(),
        }
    }

    /// Store a loaded part. A part that is already set is kept as is.
    ///
    /// Returns `false` if the part was already present.
    #[must_use]
    pub fn part(&mut self, part: PartName, value: Value) -> bool {
        if self.parts.contains_key(&part) {
            return false;
        }
        self.parts.insert(part, value);
        true
    }

    /// Record a per-part condition.
    pub fn diagnostic(&mut self, part: PartName, issue: PartIssue) {
        self.diagnostics.push(PartDiagnostic { part, issue });
    }

    pub fn build(mut self) -> Document {
        // Workers finish in any order
        self.diagnostics.sort_by_key(|d| d.part);
        Document {
            path: self.path,
            parts: self.parts,
            diagnostics: self.diagnostics,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Document {
        let mut builder = DocumentBuilder::new("sample.pbix");
        assert!(builder.part(PartName::Version, json!("1.28")));
        assert!(builder.part(PartName::Layout, json!({ "sections": [{ "displayName": "Page 1" }] })));
        builder.diagnostic(
            PartName::Connections,
            PartIssue::Missing {
                path: PathBuf::from("Connections"),
            },
        );
        builder.build()
    }

    #[test]
    fn test_get_returns_independent_copies() {
        let doc = sample();
        let mut layout = doc.get(PartName::Layout).unwrap();
        layout["sections"] = json!([]);
        layout["injected"] = json!(true);

        let again = doc.layout().unwrap();
        assert_eq!(again, json!({ "sections": [{ "displayName": "Page 1" }] }));
    }

    #[test]
    fn test_absent_part() {
        let doc = sample();
        assert_eq!(doc.connections(), None);
        assert_eq!(doc.get_by_name("connections"), None);
        assert_eq!(doc.get_by_name("version"), Some(json!("1.28")));
        assert_eq!(doc.get_by_name("nonsense"), None);
        assert!(!doc.is_complete());
        assert_eq!(doc.present_parts(), vec![PartName::Version, PartName::Layout]);
    }

    #[test]
    fn test_part_set_once() {
        let mut builder = DocumentBuilder::new("x.pbix");
        assert!(builder.part(PartName::Version, json!("1")));
        assert!(!builder.part(PartName::Version, json!("2")));
        assert_eq!(builder.build().version(), Some(json!("1")));
    }

    #[test]
    fn test_diagnostics_sorted_and_displayed() {
        let mut builder = DocumentBuilder::new("x.pbix");
        builder.diagnostic(PartName::Connections, PartIssue::Io("denied".to_string()));
        builder.diagnostic(PartName::Version, PartIssue::Decode("odd".to_string()));
        let doc = builder.build();

        let parts: Vec<_> = doc.diagnostics().iter().map(|d| d.part).collect();
        assert_eq!(parts, vec![PartName::Version, PartName::Connections]);
        assert_eq!(
            doc.diagnostics()[1].to_string(),
            "content [CONNECTIONS] read failed: denied"
        );
    }

    #[test]
    fn test_to_json_uses_logical_names() {
        let doc = sample();
        assert_eq!(
            doc.to_json(),
            json!({
                "version": "1.28",
                "layout": { "sections": [{ "displayName": "Page 1" }] }
            })
        );
    }
}
