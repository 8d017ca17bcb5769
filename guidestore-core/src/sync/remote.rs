//! Remote sync: fetch a namespace's files from its base URL

use chrono::Utc;

use super::fetch::{join_url, Fetcher};
use super::{is_markdown, is_safe_relative, write_document, FileOutcome, SyncReport};
use crate::config::NamespaceDefinition;
use crate::error::{Result, StoreError};
use crate::hasher::{hash_bytes, hash_existing};
use crate::manifest::{FileEntry, Manifest, ManifestStore};
use crate::metadata;

/// Downloads a namespace's file list, skipping files whose on-disk hash
/// still matches the manifest.
pub struct RemoteSync<'a, F: Fetcher + ?Sized> {
    store: &'a ManifestStore,
    fetcher: &'a F,
    verbose: bool,
}

impl<'a, F: Fetcher + ?Sized> RemoteSync<'a, F> {
    pub fn new(store: &'a ManifestStore, fetcher: &'a F) -> Self {
        Self {
            store,
            fetcher,
            verbose: false,
        }
    }

    /// Log each per-file outcome at info level
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Sync every file listed in the namespace definition
    pub fn run(&self, definition: &NamespaceDefinition, force: bool) -> Result<SyncReport> {
        let base_url = definition
            .base_url
            .as_deref()
            .ok_or_else(|| StoreError::NotDownloadable {
                namespace: definition.name.clone(),
            })?;

        self.sync_files(definition, base_url, &definition.files, force)
    }

    /// Sync an explicit list of files from `base_url`
    pub fn sync_files(
        &self,
        definition: &NamespaceDefinition,
        base_url: &str,
        filenames: &[String],
        force: bool,
    ) -> Result<SyncReport> {
        let namespace = definition.name.as_str();
        let mut manifest = self.store.load(namespace)?;
        manifest.source_origin = base_url.to_string();
        manifest.description = definition.description.clone();
        manifest.version = definition.version.clone();

        tracing::info!(
            "Syncing {} file(s) for '{}' from {}{}",
            filenames.len(),
            namespace,
            base_url,
            if force { " (forced)" } else { "" }
        );

        let mut report = SyncReport::new(namespace, self.verbose);
        for filename in filenames {
            let outcome = self.sync_file(&mut manifest, base_url, filename, force);
            report.record(filename, None, outcome);
        }

        self.store.save(&mut manifest)?;

        let counts = report.download_counts();
        tracing::info!(
            "Synced '{}': {} downloaded, {} skipped, {} failed",
            namespace,
            counts.downloaded,
            counts.skipped,
            counts.failed
        );
        Ok(report)
    }

    fn sync_file(
        &self,
        manifest: &mut Manifest,
        base_url: &str,
        filename: &str,
        force: bool,
    ) -> FileOutcome {
        if !is_safe_relative(filename) {
            return FileOutcome::Failed {
                reason: "filename escapes the namespace directory".to_string(),
            };
        }

        let path = self.store.resolve_path(&manifest.resource_name, filename);

        if !force {
            if let Some(disk_hash) = hash_existing(&path) {
                if manifest.is_current(filename, &disk_hash) {
                    return FileOutcome::Skipped;
                }
            }
        }

        let url = join_url(base_url, filename);
        let response = match self.fetcher.get(&url) {
            Ok(response) => response,
            Err(e) => {
                return FileOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        };

        if !response.is_success() {
            return FileOutcome::Failed {
                reason: format!("HTTP {} from {}", response.status, url),
            };
        }

        if let Err(e) = write_document(&path, &response.body) {
            return FileOutcome::Failed {
                reason: format!("Failed to write {}: {}", path.display(), e),
            };
        }

        let (title, description) = if is_markdown(filename) {
            let meta = metadata::extract(&String::from_utf8_lossy(&response.body), filename);
            (Some(meta.title), meta.description)
        } else {
            (None, None)
        };

        manifest.upsert(
            filename,
            FileEntry {
                hash: hash_bytes(&response.body),
                size: response.body.len() as u64,
                title,
                description,
                original_filename: None,
                downloaded_at: Some(Utc::now()),
                imported_at: None,
            },
        );

        FileOutcome::Downloaded
    }
}
