//! Local import: copy markdown files into a local namespace
//!
//! Imported files are stored under a normalized filename; the original
//! name is kept in the manifest entry.

use chrono::Utc;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::{write_document, FileOutcome, SyncReport};
use crate::config::NamespaceDefinition;
use crate::error::{Result, StoreError};
use crate::hasher::{hash_bytes, hash_existing};
use crate::manifest::{FileEntry, Manifest, ManifestStore, LOCAL_ORIGIN};
use crate::metadata::{self, strip_ordering_prefix};

/// True for `.md` files (case-insensitive)
pub fn is_markdown(path: impl AsRef<Path>) -> bool {
    path.as_ref()
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("md"))
        .unwrap_or(false)
}

/// Normalize a source filename into its stored form.
///
/// `"01 - API Overview.md"` becomes `"api_overview.md"` and a name with
/// nothing usable becomes `"untitled.md"`.
pub fn normalize_filename(filename: &str) -> String {
    let path = Path::new(filename);
    let extension = path
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy().to_lowercase()))
        .unwrap_or_default();
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();

    let replaced: String = strip_ordering_prefix(&stem)
        .to_lowercase()
        .chars()
        .map(|c| match c {
            'a'..='z' | '0'..='9' | '_' | '.' | '-' => c,
            _ => '_',
        })
        .collect();

    let mut collapsed = String::with_capacity(replaced.len());
    for c in replaced.chars() {
        if c == '_' && collapsed.ends_with('_') {
            continue;
        }
        collapsed.push(c);
    }

    let base = collapsed.trim_matches('_');
    let base = if base.is_empty() { "untitled" } else { base };

    format!("{base}{extension}")
}

/// Imports local markdown files into an import-only namespace
pub struct LocalImport<'a> {
    store: &'a ManifestStore,
    verbose: bool,
}

impl<'a> LocalImport<'a> {
    pub fn new(store: &'a ManifestStore) -> Self {
        Self {
            store,
            verbose: false,
        }
    }

    /// Log each per-file outcome at info level
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Import a single file, or the markdown files directly inside a directory
    pub fn run(
        &self,
        definition: &NamespaceDefinition,
        source: &Path,
        force: bool,
    ) -> Result<SyncReport> {
        if definition.is_remote() {
            return Err(StoreError::NotImportable {
                namespace: definition.name.clone(),
            });
        }

        let namespace = definition.name.as_str();
        let mut manifest = self.store.load(namespace)?;
        manifest.source_origin = LOCAL_ORIGIN.to_string();
        if manifest.description.is_none() {
            manifest.description = definition.description.clone();
        }
        if manifest.version.is_none() {
            manifest.version = definition.version.clone();
        }

        tracing::info!(
            "Importing into '{}' from {}{}",
            namespace,
            source.display(),
            if force { " (forced)" } else { "" }
        );

        let mut report = SyncReport::new(namespace, self.verbose);
        for candidate in self.collect_candidates(source, &mut report) {
            let original = candidate
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            let normalized = normalize_filename(&original);
            let outcome =
                self.import_file(&mut manifest, &candidate, &original, &normalized, force);
            report.record(&normalized, Some(&original), outcome);
        }

        self.store.save(&mut manifest)?;

        let counts = report.import_counts();
        tracing::info!(
            "Imported into '{}': {} imported, {} skipped, {} failed",
            namespace,
            counts.imported,
            counts.skipped,
            counts.failed
        );
        Ok(report)
    }

    /// Markdown files at `source`; unusable sources are recorded as failures
    fn collect_candidates(&self, source: &Path, report: &mut SyncReport) -> Vec<PathBuf> {
        let label = source.display().to_string();

        if !source.exists() {
            report.record(
                &label,
                None,
                FileOutcome::Failed {
                    reason: "source path does not exist".to_string(),
                },
            );
            return Vec::new();
        }

        if source.is_file() {
            if is_markdown(source) {
                return vec![source.to_path_buf()];
            }
            report.record(
                &label,
                None,
                FileOutcome::Failed {
                    reason: "not a markdown file".to_string(),
                },
            );
            return Vec::new();
        }

        let mut candidates = Vec::new();
        let walker = WalkDir::new(source)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name();

        for entry in walker {
            match entry {
                Ok(entry) => {
                    let hidden = entry.file_name().to_string_lossy().starts_with('.');
                    if entry.file_type().is_file() && !hidden && is_markdown(entry.path()) {
                        candidates.push(entry.into_path());
                    }
                }
                Err(e) => {
                    let path = e
                        .path()
                        .map(|p| p.display().to_string())
                        .unwrap_or_else(|| label.clone());
                    report.record(
                        &path,
                        None,
                        FileOutcome::Failed {
                            reason: e.to_string(),
                        },
                    );
                }
            }
        }

        if candidates.is_empty() {
            tracing::warn!("No markdown files found in {}", source.display());
        }
        candidates
    }

    fn import_file(
        &self,
        manifest: &mut Manifest,
        source: &Path,
        original: &str,
        normalized: &str,
        force: bool,
    ) -> FileOutcome {
        let bytes = match std::fs::read(source) {
            Ok(bytes) => bytes,
            Err(e) => {
                return FileOutcome::Failed {
                    reason: format!("Failed to read {}: {}", source.display(), e),
                }
            }
        };

        let source_hash = hash_bytes(&bytes);
        let destination = self.store.resolve_path(&manifest.resource_name, normalized);

        if !force
            && hash_existing(&destination).as_deref() == Some(source_hash.as_str())
            && manifest.is_current(normalized, &source_hash)
        {
            return FileOutcome::Skipped;
        }

        if let Err(e) = write_document(&destination, &bytes) {
            return FileOutcome::Failed {
                reason: format!("Failed to write {}: {}", destination.display(), e),
            };
        }

        let meta = metadata::extract(&String::from_utf8_lossy(&bytes), original);
        manifest.upsert(
            normalized,
            FileEntry {
                hash: source_hash,
                size: bytes.len() as u64,
                title: Some(meta.title),
                description: meta.description,
                original_filename: Some(original.to_string()),
                downloaded_at: None,
                imported_at: Some(Utc::now()),
            },
        );

        FileOutcome::Imported
    }
}
