//! Deep JSON normalization.
//!
//! Report parts of a pbix container are JSON documents whose string values
//! frequently contain further JSON text, sometimes several levels deep (a
//! visual's `config` is a string holding an object whose `query` is again a
//! string, and so on). [`Normalizer`] resolves all of those layers into one
//! live [`Value`] tree.
//!
//! # Rules
//!
//! - numbers, booleans and `null` are returned unchanged
//! - a string matching [`is_numeric_literal`] stays a string, so leading
//!   zeros and values beyond `f64` precision survive
//! - any other string is parsed as JSON text; on success the parsed value is
//!   normalized recursively, otherwise the string is a genuine leaf
//! - arrays and objects are rebuilt with every element normalized
//!
//! Recursion is bounded by [`NormalizeOptions::max_depth`]. Once the bound
//! is reached values are returned as they are and the event is counted in
//! the [`NormalizeReport`].
//!
//! # Examples
//!
//! ```
//! use pbix::normalize::normalize;
//! use serde_json::json;
//!
//! let raw = json!({ "config": "{\"name\":\"card\",\"z\":\"007\"}" });
//! assert_eq!(
//!     normalize(raw),
//!     json!({ "config": { "name": "card", "z": "007" } })
//! );
//! ```

mod numeric;

pub use numeric::is_numeric_literal;

use serde_json::error::Category;
use serde_json::{Map, Value};

/// Default bound on nesting, counting both container levels and decoded strings.
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Options controlling deep normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizeOptions {
    /// Maximum nesting depth before values are returned unresolved
    pub max_depth: usize,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl NormalizeOptions {
    /// Create a new `NormalizeOptions` with default values.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum nesting depth.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use pbix::normalize::NormalizeOptions;
    ///
    /// let options = NormalizeOptions::new().with_max_depth(16);
    /// assert_eq!(options.max_depth, 16);
    /// ```
    #[inline]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

/// Conditions met during one normalization pass.
///
/// A string that simply is not JSON is never recorded here; only values that
/// were left unresolved for another reason are.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizeReport {
    /// Values left unresolved because the depth bound was reached
    pub truncated: usize,
    /// JSON texts rejected by the parser's own nesting limit
    pub parser_limit_hits: usize,
    /// Parser failures that were neither syntax errors nor limit hits
    pub failures: Vec<String>,
}

impl NormalizeReport {
    /// Whether every parseable value was fully resolved.
    #[inline]
    pub fn is_clean(&self) -> bool {
        self.truncated == 0 && self.parser_limit_hits == 0 && self.failures.is_empty()
    }
}

/// Outcome of probing a string for JSON content.
enum Probe {
    Parsed(Value),
    NotJson,
    ParserLimit,
    Failed(String),
}

/// Recursive resolver for stringified JSON.
#[derive(Debug, Clone, Copy, Default)]
pub struct Normalizer {
    options: NormalizeOptions,
}

impl Normalizer {
    /// Create a normalizer with the given options.
    #[inline]
    pub fn new(options: NormalizeOptions) -> Self {
        Self { options }
    }

    /// The options this normalizer was built with.
    #[inline]
    pub fn options(&self) -> &NormalizeOptions {
        &self.options
    }

    /// Normalize a value, discarding the report.
    pub fn normalize(&self, value: Value) -> Value {
        self.normalize_with_report(value).0
    }

    /// Normalize a value and return what was left unresolved.
    pub fn normalize_with_report(&self, value: Value) -> (Value, NormalizeReport) {
        let mut report = NormalizeReport::default();
        let value = self.walk(value, 0, &mut report);
        (value, report)
    }

    /// Normalize raw part text.
    ///
    /// Equivalent to normalizing `Value::String(text)`.
    pub fn normalize_text(&self, text: &str) -> (Value, NormalizeReport) {
        self.normalize_with_report(Value::String(text.to_owned()))
    }

    fn walk(&self, value: Value, depth: usize, report: &mut NormalizeReport) -> Value {
        match value {
            Value::String(s) => self.walk_string(s, depth, report),
            Value::Array(items) => {
                if depth >= self.options.max_depth {
                    report.truncated += 1;
                    return Value::Array(items);
                }
                Value::Array(
                    items
                        .into_iter()
                        .map(|item| self.walk(item, depth + 1, report))
                        .collect(),
                )
            },
            Value::Object(map) => {
                if depth >= self.options.max_depth {
                    report.truncated += 1;
                    return Value::Object(map);
                }
                let mut out = Map::with_capacity(map.len());
                for (key, item) in map {
                    let item = self.walk(item, depth + 1, report);
                    out.insert(key, item);
                }
                Value::Object(out)
            },
            scalar => scalar,
        }
    }

    fn walk_string(&self, s: String, depth: usize, report: &mut NormalizeReport) -> Value {
        if is_numeric_literal(&s) {
            return Value::String(s);
        }

        match probe_json(&s) {
            Probe::NotJson => Value::String(s),
            Probe::Parsed(parsed) => {
                if depth >= self.options.max_depth {
                    report.truncated += 1;
                    Value::String(s)
                } else {
                    self.walk(parsed, depth + 1, report)
                }
            },
            Probe::ParserLimit => {
                report.parser_limit_hits += 1;
                Value::String(s)
            },
            Probe::Failed(reason) => {
                report.failures.push(reason);
                Value::String(s)
            },
        }
    }
}

/// Normalize a value with default options.
pub fn normalize(value: Value) -> Value {
    Normalizer::default().normalize(value)
}

/// Parse `s` as JSON text without treating "not JSON" as an error.
fn probe_json(s: &str) -> Probe {
    if !may_start_json(s) {
        return Probe::NotJson;
    }

    match serde_json::from_str::<Value>(s) {
        Ok(value) => Probe::Parsed(value),
        Err(err) if err.classify() == Category::Eof => Probe::NotJson,
        Err(err) => {
            let message = err.to_string();
            if message.starts_with("recursion limit exceeded") {
                Probe::ParserLimit
            } else if err.classify() == Category::Syntax {
                Probe::NotJson
            } else {
                Probe::Failed(message)
            }
        },
    }
}

/// Cheap rejection of strings whose first significant byte cannot begin a JSON value.
#[inline]
fn may_start_json(s: &str) -> bool {
    match s.trim_start().as_bytes().first() {
        Some(b) => matches!(b, b'{' | b'[' | b'"' | b'-' | b't' | b'f' | b'n' | b'0'..=b'9'),
        None => false,
    }
}
