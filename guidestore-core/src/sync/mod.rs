//! Guide synchronization into the local store
//!
//! Two variants share one post-condition: every candidate file either ends
//! up with a manifest entry whose hash matches the bytes on disk, or is
//! reported as failed.
//!
//! # Architecture
//!
//! ```text
//! base_url/<file> ──▶ RemoteSync ──┐
//!                                  ├──▶ resources/<ns>/<file>
//! ./docs/*.md ─────▶ LocalImport ──┘          │
//!                                             ▼
//!                              resources/<ns>/manifest.yaml
//! ```
//!
//! Per-file failures are caught at the file and recorded in the
//! [`SyncReport`]; the manifest is saved once at the end of a run.

pub mod fetch;
mod import;
mod remote;

pub use fetch::{FetchError, FetchResponse, Fetcher};
#[cfg(feature = "remote")]
pub use fetch::HttpFetcher;
pub use import::{is_markdown, normalize_filename, LocalImport};
pub use remote::RemoteSync;

use serde::Serialize;
use std::fmt;
use std::io::Write;
use std::path::{Component, Path};

/// Result of processing one candidate file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    Downloaded,
    Imported,
    Skipped,
    Failed { reason: String },
}

impl FileOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, FileOutcome::Failed { .. })
    }
}

impl fmt::Display for FileOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileOutcome::Downloaded => write!(f, "downloaded"),
            FileOutcome::Imported => write!(f, "imported"),
            FileOutcome::Skipped => write!(f, "skipped"),
            FileOutcome::Failed { reason } => write!(f, "failed: {reason}"),
        }
    }
}

/// Per-file status line of a sync run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReport {
    /// Stored filename (manifest key)
    pub filename: String,
    /// Source name for imports, when it differs from the stored name
    pub source: Option<String>,
    pub outcome: FileOutcome,
}

impl fmt::Display for FileReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.source {
            Some(source) if source != &self.filename => {
                write!(f, "{} -> {}: {}", source, self.filename, self.outcome)
            }
            _ => write!(f, "{}: {}", self.filename, self.outcome),
        }
    }
}

/// Aggregate counts of a remote sync
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DownloadCounts {
    pub downloaded: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Aggregate counts of a local import
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportCounts {
    pub imported: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Outcome of a whole sync run
#[derive(Debug, Clone, Default)]
pub struct SyncReport {
    pub namespace: String,
    pub files: Vec<FileReport>,
    verbose: bool,
}

impl SyncReport {
    pub fn new(namespace: &str, verbose: bool) -> Self {
        Self {
            namespace: namespace.to_string(),
            files: Vec::new(),
            verbose,
        }
    }

    /// Record and log one file's outcome
    pub fn record(&mut self, filename: &str, source: Option<&str>, outcome: FileOutcome) {
        let report = FileReport {
            filename: filename.to_string(),
            source: source.map(str::to_string),
            outcome,
        };

        match &report.outcome {
            FileOutcome::Failed { .. } => {
                tracing::warn!("[{}] {}", self.namespace, report);
            }
            _ if self.verbose => {
                tracing::info!("[{}] {}", self.namespace, report);
            }
            _ => {
                tracing::debug!("[{}] {}", self.namespace, report);
            }
        }

        self.files.push(report);
    }

    fn count(&self, predicate: impl Fn(&FileOutcome) -> bool) -> usize {
        self.files.iter().filter(|f| predicate(&f.outcome)).count()
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| *o == FileOutcome::Skipped)
    }

    pub fn failed(&self) -> usize {
        self.count(FileOutcome::is_failed)
    }

    pub fn download_counts(&self) -> DownloadCounts {
        DownloadCounts {
            downloaded: self.count(|o| *o == FileOutcome::Downloaded),
            skipped: self.skipped(),
            failed: self.failed(),
        }
    }

    pub fn import_counts(&self) -> ImportCounts {
        ImportCounts {
            imported: self.count(|o| *o == FileOutcome::Imported),
            skipped: self.skipped(),
            failed: self.failed(),
        }
    }

    pub fn failures(&self) -> impl Iterator<Item = &FileReport> {
        self.files.iter().filter(|f| f.outcome.is_failed())
    }
}

/// Reject absolute paths and `..` so stored files stay inside the namespace
pub(crate) fn is_safe_relative(filename: &str) -> bool {
    let path = Path::new(filename);
    !filename.is_empty()
        && path
            .components()
            .all(|component| matches!(component, Component::Normal(_)))
}

/// Write a document via a temporary sibling so a failed write never leaves
/// a truncated file behind.
pub(crate) fn write_document(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let parent = path.parent().ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("no parent directory for {}", path.display()),
        )
    })?;
    std::fs::create_dir_all(parent)?;

    let mut temp = tempfile::NamedTempFile::new_in(parent)?;
    temp.write_all(bytes)?;
    temp.flush()?;
    temp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_counts() {
        let mut report = SyncReport::new("rails", false);
        report.record("a.md", None, FileOutcome::Downloaded);
        report.record("b.md", None, FileOutcome::Skipped);
        report.record(
            "c.md",
            None,
            FileOutcome::Failed {
                reason: "HTTP 404".to_string(),
            },
        );
        report.record("d.md", Some("D.md"), FileOutcome::Imported);

        assert_eq!(
            report.download_counts(),
            DownloadCounts {
                downloaded: 1,
                skipped: 1,
                failed: 1
            }
        );
        assert_eq!(report.import_counts().imported, 1);
        assert_eq!(report.failures().count(), 1);
    }

    #[test]
    fn test_file_report_display() {
        let report = FileReport {
            filename: "my_guide.md".to_string(),
            source: Some("My Guide.md".to_string()),
            outcome: FileOutcome::Imported,
        };
        assert_eq!(report.to_string(), "My Guide.md -> my_guide.md: imported");

        let report = FileReport {
            filename: "routing.md".to_string(),
            source: None,
            outcome: FileOutcome::Failed {
                reason: "HTTP 404".to_string(),
            },
        };
        assert_eq!(report.to_string(), "routing.md: failed: HTTP 404");
    }

    #[test]
    fn test_is_safe_relative() {
        assert!(is_safe_relative("routing.md"));
        assert!(is_safe_relative("handbook/02_drive.md"));
        assert!(!is_safe_relative("../escape.md"));
        assert!(!is_safe_relative("handbook/../../escape.md"));
        assert!(!is_safe_relative("/etc/passwd"));
        assert!(!is_safe_relative(""));
    }

    #[test]
    fn test_write_document_creates_parents() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("handbook/intro.md");
        write_document(&path, b"# Intro\n").unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"# Intro\n");

        write_document(&path, b"# Intro v2\n").unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"# Intro v2\n");
    }
}
