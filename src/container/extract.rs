//! Archive extraction and staging.
//!
//! The loader never reads parts straight from the compressed container.
//! Instead an [`ArchiveExtractor`] stages the archive into a working
//! directory managed by [`Staging`], and parts are read from there.

use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tempfile::TempDir;
use tracing::debug;
use zip::ZipArchive;

use crate::common::{Error, Result};

/// Cooperative cancellation signal.
///
/// Clones share the same flag. A token created with [`CancellationToken::child`]
/// observes its parent's cancellation, but cancelling the child leaves the
/// parent untouched.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
    parent: Option<Arc<AtomicBool>>,
}

impl CancellationToken {
    /// Create a new, uncancelled token.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Derive a token that is cancelled when either it or `self` is.
    pub fn child(&self) -> Self {
        Self {
            flag: Arc::new(AtomicBool::new(false)),
            parent: Some(Arc::clone(&self.flag)),
        }
    }

    /// Request cancellation.
    #[inline]
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Release);
    }

    /// Whether cancellation was requested on this token or its parent.
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Acquire)
            || self
                .parent
                .as_ref()
                .is_some_and(|parent| parent.load(Ordering::Acquire))
    }
}

/// Stages the contents of a container archive into a directory.
///
/// Implementations run on a blocking thread and should check `cancel`
/// between entries, returning [`Error::Cancelled`] once it is set.
pub trait ArchiveExtractor: Send + Sync + 'static {
    /// Extract `archive` into the existing, empty directory `destination`.
    fn extract(&self, archive: &Path, destination: &Path, cancel: &CancellationToken)
    -> Result<()>;
}

/// Default extractor for ZIP-compatible containers.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZipExtractor;

impl ArchiveExtractor for ZipExtractor {
    fn extract(
        &self,
        archive: &Path,
        destination: &Path,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let file = File::open(archive).map_err(|e| {
            Error::ExtractionFailed(format!("cannot open {}: {}", archive.display(), e))
        })?;
        let mut zip = ZipArchive::new(file)?;

        for i in 0..zip.len() {
            if cancel.is_cancelled() {
                return Err(Error::Cancelled);
            }

            let mut entry = zip.by_index(i)?;
            // Entries escaping the destination are skipped
            let Some(relative) = entry.enclosed_name() else {
                debug!(entry = entry.name(), "skipping entry with unsafe path");
                continue;
            };
            let target = destination.join(relative);

            if entry.is_dir() {
                fs::create_dir_all(&target).map_err(extraction_io)?;
                continue;
            }
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent).map_err(extraction_io)?;
            }
            let mut out = File::create(&target).map_err(extraction_io)?;
            copy_with_cancel(&mut entry, &mut out, cancel)?;
        }

        debug!(entries = zip.len(), destination = %destination.display(), "archive staged");
        Ok(())
    }
}

#[inline]
fn extraction_io(err: io::Error) -> Error {
    Error::ExtractionFailed(err.to_string())
}

/// Chunk size for [`copy_with_cancel`].
const COPY_CHUNK: usize = 64 * 1024;

/// Copy `reader` into `writer`, checking `cancel` between chunks.
///
/// A single archive member (the data model in particular) can inflate to
/// hundreds of megabytes, so cancellation is observed inside an entry and
/// not only between entries. Returns the number of bytes written.
pub fn copy_with_cancel<R: Read, W: Write>(
    reader: &mut R,
    writer: &mut W,
    cancel: &CancellationToken,
) -> Result<u64> {
    let mut buf = vec![0u8; COPY_CHUNK];
    let mut written = 0u64;
    loop {
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }
        let n = match reader.read(&mut buf) {
            Ok(0) => return Ok(written),
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(extraction_io(e)),
        };
        writer.write_all(&buf[..n]).map_err(extraction_io)?;
        written += n as u64;
    }
}

/// The working directory a container is extracted into.
#[derive(Debug)]
pub enum Staging {
    /// A fresh temporary directory, removed on drop
    Temporary(TempDir),
    /// A caller-chosen directory, reset before every extraction
    Fixed(PathBuf),
}

impl Staging {
    /// Create a fresh temporary staging directory.
    pub fn temporary() -> Result<Self> {
        let dir = tempfile::Builder::new().prefix(".pbix-content").tempdir()?;
        Ok(Staging::Temporary(dir))
    }

    /// Reset `dir` to an empty directory and use it for staging.
    ///
    /// Anything already at `dir` is removed, so content left by an earlier,
    /// interrupted extraction can never be read back.
    pub fn fixed(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        remove_dir_if_exists(&dir)?;
        fs::create_dir_all(&dir)?;
        Ok(Staging::Fixed(dir))
    }

    /// Root of the staged content.
    pub fn root(&self) -> &Path {
        match self {
            Staging::Temporary(dir) => dir.path(),
            Staging::Fixed(dir) => dir,
        }
    }

    /// Remove the staged content.
    pub fn clear(self) -> Result<()> {
        match self {
            Staging::Temporary(dir) => dir.close()?,
            Staging::Fixed(dir) => remove_dir_if_exists(&dir)?,
        }
        Ok(())
    }

    /// Keep the staged content on disk and return its location.
    pub fn persist(self) -> PathBuf {
        match self {
            Staging::Temporary(dir) => dir.keep(),
            Staging::Fixed(dir) => dir,
        }
    }
}

fn remove_dir_if_exists(dir: &Path) -> io::Result<()> {
    match fs::remove_dir_all(dir) {
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}
