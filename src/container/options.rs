/// Configuration for opening containers.
///
/// This module defines the options that control where a container is staged,
/// how long extraction may take and how parts are normalized.
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::container::extract::CancellationToken;
use crate::normalize::NormalizeOptions;

/// Extension accepted by default.
pub const DEFAULT_EXTENSION: &str = "pbix";

/// Configuration options for [`crate::ContentLoader`].
///
/// # Examples
///
/// ```rust
/// use std::time::Duration;
/// use pbix::LoaderOptions;
///
/// // Create with defaults
/// let options = LoaderOptions::default();
///
/// // Or customize
/// let options = LoaderOptions::new()
///     .with_staging_dir(".pbix-content")
///     .with_deadline(Duration::from_secs(30))
///     .with_max_depth(64);
/// ```
#[derive(Debug, Clone)]
pub struct LoaderOptions {
    /// Accepted container extensions, compared ASCII case-insensitively
    pub extensions: Vec<String>,
    /// Fixed staging directory; a fresh temporary directory when `None`
    pub staging_dir: Option<PathBuf>,
    /// Whether to leave the staged content on disk after loading
    pub keep_staging: bool,
    /// Upper bound on the time spent extracting
    pub deadline: Option<Duration>,
    /// Caller-supplied cancellation signal for extraction
    pub cancellation: Option<CancellationToken>,
    /// Whether parts are loaded on parallel workers
    pub parallel: bool,
    /// Options for deep normalization of every part
    pub normalize: NormalizeOptions,
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self {
            extensions: vec![DEFAULT_EXTENSION.to_string()],
            staging_dir: None,
            keep_staging: false,
            deadline: None,
            cancellation: None,
            parallel: true,
            normalize: NormalizeOptions::default(),
        }
    }
}

impl LoaderOptions {
    /// Create a new `LoaderOptions` with default values.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the accepted container extensions.
    ///
    /// Extensions are given without the leading dot.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use pbix::LoaderOptions;
    ///
    /// let options = LoaderOptions::new().with_extensions(["pbix", "pbit"]);
    /// ```
    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    /// Stage containers into `dir` instead of a temporary directory.
    ///
    /// The directory is removed and recreated before every extraction.
    #[inline]
    pub fn with_staging_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.staging_dir = Some(dir.into());
        self
    }

    /// Set whether staged content stays on disk after loading.
    #[inline]
    pub fn with_keep_staging(mut self, keep: bool) -> Self {
        self.keep_staging = keep;
        self
    }

    /// Abort extraction once `deadline` has elapsed.
    #[inline]
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Abort extraction when `token` is cancelled.
    #[inline]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Set whether parts load on parallel workers.
    #[inline]
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Set the normalization depth bound.
    #[inline]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.normalize = self.normalize.with_max_depth(max_depth);
        self
    }

    /// Whether `path` carries one of the accepted extensions.
    pub fn accepts(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
    }

    /// The primary extension, used in error messages.
    pub(crate) fn primary_extension(&self) -> &str {
        self.extensions
            .first()
            .map(String::as_str)
            .unwrap_or(DEFAULT_EXTENSION)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_default_extension() {
        let options = LoaderOptions::default();
        assert!(options.accepts(Path::new("sales.pbix")));
        assert!(options.accepts(Path::new("dir/SALES.PBIX")));
        assert!(!options.accepts(Path::new("sales.zip")));
        assert!(!options.accepts(Path::new("sales.pbix.txt")));
        assert!(!options.accepts(Path::new("pbix")));
    }

    #[test]
    fn test_custom_extensions() {
        let options = LoaderOptions::new().with_extensions(["pbit"]);
        assert!(options.accepts(Path::new("template.pbit")));
        assert!(!options.accepts(Path::new("report.pbix")));
        assert_eq!(options.primary_extension(), "pbit");
    }

    #[test]
    fn test_builder_chain() {
        let options = LoaderOptions::new()
            .with_staging_dir("stage")
            .with_keep_staging(true)
            .with_parallel(false)
            .with_max_depth(8);
        assert_eq!(options.staging_dir.as_deref(), Some(Path::new("stage")));
        assert!(options.keep_staging);
        assert!(!options.parallel);
        assert_eq!(options.normalize.max_depth, 8);
    }
}
