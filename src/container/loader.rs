//! Fault-isolated loading of every logical part of a container.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use rayon::prelude::*;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::common::encoding::decode_utf16le;
use crate::common::{Error, Result};
use crate::container::content_map::{CONTENT_MAP, PartName};
use crate::container::document::{Document, DocumentBuilder, PartIssue};
use crate::container::extract::{ArchiveExtractor, CancellationToken, Staging, ZipExtractor};
use crate::container::options::LoaderOptions;
use crate::normalize::{NormalizeReport, Normalizer};

/// Opens pbix containers into [`Document`]s.
///
/// Each call to [`ContentLoader::open`] is independent: the container is
/// staged into a fresh (or freshly reset) directory, every part in
/// [`CONTENT_MAP`] is loaded on its own, and the staging directory is removed
/// again. Only container-level problems fail the call; a part that cannot be
/// loaded is left out of the document and reported in
/// [`Document::diagnostics`].
///
/// # Examples
///
/// ```rust,no_run
/// use pbix::{ContentLoader, LoaderOptions, PartName};
///
/// # async fn run() -> pbix::Result<()> {
/// let loader = ContentLoader::new(LoaderOptions::default());
/// let doc = loader.open("sales.pbix").await?;
///
/// if let Some(pages) = doc.sections() {
///     println!("pages: {}", pages.join(", "));
/// }
/// for diagnostic in doc.diagnostics() {
///     eprintln!("{diagnostic}");
/// }
/// let layout = doc.get(PartName::Layout);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ContentLoader<E: ArchiveExtractor = ZipExtractor> {
    options: LoaderOptions,
    extractor: Arc<E>,
}

impl ContentLoader<ZipExtractor> {
    /// Create a loader using the built-in ZIP extractor.
    pub fn new(options: LoaderOptions) -> Self {
        Self::with_extractor(options, ZipExtractor)
    }
}

impl Default for ContentLoader<ZipExtractor> {
    fn default() -> Self {
        Self::new(LoaderOptions::default())
    }
}

impl<E: ArchiveExtractor> ContentLoader<E> {
    /// Create a loader staging containers with `extractor`.
    pub fn with_extractor(options: LoaderOptions, extractor: E) -> Self {
        Self {
            options,
            extractor: Arc::new(extractor),
        }
    }

    #[inline]
    pub fn options(&self) -> &LoaderOptions {
        &self.options
    }

    /// Open the container at `path`.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidInput`] if the extension is not accepted; nothing is
    ///   touched on disk in that case
    /// - [`Error::ExtractionFailed`] if the archive cannot be staged
    /// - [`Error::DeadlineExceeded`] / [`Error::Cancelled`] if extraction was
    ///   cut short
    ///
    /// On every error the staging directory is cleared.
    pub async fn open(&self, path: impl AsRef<Path>) -> Result<Document> {
        let path = path.as_ref().to_path_buf();
        if !self.options.accepts(&path) {
            return Err(Error::InvalidInput {
                path,
                expected: self.options.primary_extension().to_string(),
            });
        }

        let cancel = match &self.options.cancellation {
            Some(token) => token.child(),
            None => CancellationToken::new(),
        };
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        info!(path = %path.display(), "opening container");
        let staging = match &self.options.staging_dir {
            Some(dir) => Staging::fixed(dir),
            None => Staging::temporary(),
        }
        .map_err(|err| Error::ExtractionFailed(format!("cannot prepare staging directory: {err}")))?;

        if let Err(err) = self.stage(&path, staging.root(), &cancel).await {
            warn!(path = %path.display(), error = %err, "could not extract container content");
            if let Err(clear_err) = staging.clear() {
                warn!(error = %clear_err, "could not clear staging directory");
            }
            return Err(err);
        }

        let root = staging.root().to_path_buf();
        let normalizer = Normalizer::new(self.options.normalize);
        let parallel = self.options.parallel;
        let source = path.clone();
        let loaded =
            tokio::task::spawn_blocking(move || load_parts(&root, source, normalizer, parallel))
                .await;

        if self.options.keep_staging {
            let kept = staging.persist();
            debug!(staging = %kept.display(), "staged content kept");
        } else if let Err(err) = staging.clear() {
            warn!(error = %err, "could not clear staging directory");
        }

        let document = loaded?;
        info!(
            path = %path.display(),
            parts = document.present_parts().len(),
            diagnostics = document.diagnostics().len(),
            "container loaded"
        );
        Ok(document)
    }

    /// Run the extractor on a blocking thread, bounded by the deadline.
    async fn stage(&self, archive: &Path, destination: &Path, cancel: &CancellationToken) -> Result<()> {
        let extractor = Arc::clone(&self.extractor);
        let archive = archive.to_path_buf();
        let destination = destination.to_path_buf();
        let token = cancel.clone();
        let mut task =
            tokio::task::spawn_blocking(move || extractor.extract(&archive, &destination, &token));

        let joined = match self.options.deadline {
            Some(deadline) => match tokio::time::timeout(deadline, &mut task).await {
                Ok(joined) => joined,
                Err(_) => {
                    cancel.cancel();
                    // The extractor must stop writing before staging is cleared
                    if let Err(join_err) = task.await {
                        warn!(error = %join_err, "extractor task failed after the deadline");
                    }
                    return Err(Error::DeadlineExceeded(deadline));
                },
            },
            None => task.await,
        };
        joined?
    }
}

/// Open the container at `path` with default options.
pub async fn open(path: impl AsRef<Path>) -> Result<Document> {
    ContentLoader::default().open(path).await
}

/// Load every part under `root` into a document.
fn load_parts(root: &Path, source: PathBuf, normalizer: Normalizer, parallel: bool) -> Document {
    let builder = Mutex::new(DocumentBuilder::new(source));

    let load = |&(part, _): &(PartName, &'static [&'static str])| {
        match load_part(root, part, &normalizer) {
            Ok((value, report)) => {
                let issues = report_issues(part, &report);
                let mut builder = builder.lock();
                for issue in issues {
                    builder.diagnostic(part, issue);
                }
                let inserted = builder.part(part, value);
                debug_assert!(inserted, "part {part} loaded twice");
                debug!(part = %part, "content loaded");
            },
            Err(issue) => {
                warn!(part = %part, %issue, "content not loaded");
                builder.lock().diagnostic(part, issue);
            },
        }
    };

    if parallel {
        CONTENT_MAP.par_iter().for_each(&load);
    } else {
        CONTENT_MAP.iter().for_each(&load);
    }

    builder.into_inner().build()
}

/// Read, decode and normalize one part.
fn load_part(
    root: &Path,
    part: PartName,
    normalizer: &Normalizer,
) -> std::result::Result<(Value, NormalizeReport), PartIssue> {
    let path = part.resolve(root);

    let bytes = match fs::read(&path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(PartIssue::Missing { path });
        },
        Err(e) => return Err(PartIssue::Io(e.to_string())),
    };
    let text = decode_utf16le(&bytes).map_err(|e| PartIssue::Decode(e.to_string()))?;
    Ok(normalizer.normalize_text(&text))
}

/// Issues for a part that loaded but was not fully resolved.
fn report_issues(part: PartName, report: &NormalizeReport) -> Vec<PartIssue> {
    let mut issues = Vec::new();
    if report.is_clean() {
        return issues;
    }

    let truncated = report.truncated + report.parser_limit_hits;
    if truncated > 0 {
        warn!(
            part = %part,
            truncated = report.truncated,
            parser_limit_hits = report.parser_limit_hits,
            "content only partially resolved"
        );
        issues.push(PartIssue::DepthLimitExceeded { truncated });
    }
    if !report.failures.is_empty() {
        for failure in &report.failures {
            warn!(part = %part, reason = %failure, "value left unresolved");
        }
        issues.push(PartIssue::Unresolved {
            reasons: report.failures.clone(),
        });
    }
    issues
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_report_has_no_issues() {
        assert!(report_issues(PartName::Layout, &NormalizeReport::default()).is_empty());
    }

    #[test]
    fn test_limits_and_failures_are_kept_apart() {
        let report = NormalizeReport {
            truncated: 2,
            parser_limit_hits: 1,
            failures: vec!["invalid type: map".to_string()],
        };
        assert_eq!(
            report_issues(PartName::Settings, &report),
            vec![
                PartIssue::DepthLimitExceeded { truncated: 3 },
                PartIssue::Unresolved {
                    reasons: vec!["invalid type: map".to_string()],
                },
            ]
        );
    }

    #[test]
    fn test_failures_alone_are_not_depth_issues() {
        let report = NormalizeReport {
            failures: vec!["io".to_string()],
            ..NormalizeReport::default()
        };
        let issues = report_issues(PartName::Metadata, &report);
        assert_eq!(issues.len(), 1);
        assert!(matches!(issues[0], PartIssue::Unresolved { .. }));
        assert!(!issues[0].is_absent());
    }

    #[test]
    fn test_load_part_uses_part_location() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_part(dir.path(), PartName::Layout, &Normalizer::default()).unwrap_err();
        assert_eq!(
            err,
            PartIssue::Missing {
                path: dir.path().join("Report").join("Layout"),
            }
        );
    }
}
