//! Namespace manifest (resources/<namespace>/manifest.yaml)
//!
//! Tracks every stored document of a namespace with its content hash,
//! size, extracted metadata and sync timestamp. Only the synchronizers
//! mutate a manifest; resolution and rendering only read it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Write;
use std::path::PathBuf;

use crate::config::StoreContext;
use crate::error::{Result, StoreError};

/// Source origin marker for imported namespaces
pub const LOCAL_ORIGIN: &str = "local";

/// Persisted index of a namespace's documents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    /// Namespace identifier
    #[serde(rename = "resource")]
    pub resource_name: String,

    /// Base URL for remote namespaces, or "local"
    #[serde(rename = "base_url")]
    pub source_origin: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub version: Option<String>,

    /// Stored filename (relative path) to entry
    #[serde(default)]
    pub files: BTreeMap<String, FileEntry>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

/// Manifest record for a single stored document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileEntry {
    /// SHA-256 hex digest of the stored bytes
    pub hash: String,

    /// Byte length of the stored file
    pub size: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Pre-normalization name of an imported file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_filename: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub downloaded_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub imported_at: Option<DateTime<Utc>>,
}

impl FileEntry {
    /// Time of the last successful download or import
    pub fn synced_at(&self) -> Option<DateTime<Utc>> {
        self.downloaded_at.or(self.imported_at)
    }
}

impl Manifest {
    /// Create an empty manifest for a namespace
    pub fn new(resource_name: &str, source_origin: &str) -> Self {
        let now = Utc::now();
        Self {
            resource_name: resource_name.to_string(),
            source_origin: source_origin.to_string(),
            description: None,
            version: None,
            files: BTreeMap::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_local(&self) -> bool {
        self.source_origin == LOCAL_ORIGIN
    }

    pub fn entry(&self, filename: &str) -> Option<&FileEntry> {
        self.files.get(filename)
    }

    /// Add or replace the entry for a stored filename
    pub fn upsert(&mut self, filename: &str, entry: FileEntry) {
        self.files.insert(filename.to_string(), entry);
    }

    /// True if the recorded hash for `filename` equals `disk_hash`
    pub fn is_current(&self, filename: &str, disk_hash: &str) -> bool {
        self.files
            .get(filename)
            .map(|entry| entry.hash == disk_hash)
            .unwrap_or(false)
    }

    /// Markdown entries, in key order
    pub fn markdown_files(&self) -> impl Iterator<Item = (&String, &FileEntry)> {
        self.files.iter().filter(|(name, _)| name.ends_with(".md"))
    }
}

/// Reads and writes namespace manifests under a config root
#[derive(Debug, Clone)]
pub struct ManifestStore {
    ctx: StoreContext,
}

impl ManifestStore {
    pub fn new(ctx: StoreContext) -> Self {
        Self { ctx }
    }

    pub fn context(&self) -> &StoreContext {
        &self.ctx
    }

    /// Load a namespace manifest, or a fresh empty one if none exists.
    ///
    /// A file that exists but does not parse is a [`StoreError::ManifestCorrupt`].
    pub fn load(&self, namespace: &str) -> Result<Manifest> {
        let path = self.ctx.manifest_path(namespace);

        if !path.exists() {
            tracing::debug!("No manifest for '{}', starting empty", namespace);
            return Ok(Manifest::new(namespace, LOCAL_ORIGIN));
        }

        let content = std::fs::read_to_string(&path).map_err(|source| StoreError::ManifestRead {
            path: path.clone(),
            source,
        })?;

        serde_yaml_ng::from_str(&content).map_err(|source| {
            let err = StoreError::ManifestCorrupt { path, source };
            err.log_if_integrity_error();
            err
        })
    }

    /// Load a manifest only if one has been saved
    pub fn load_existing(&self, namespace: &str) -> Result<Option<Manifest>> {
        if !self.exists(namespace) {
            return Ok(None);
        }
        self.load(namespace).map(Some)
    }

    pub fn exists(&self, namespace: &str) -> bool {
        self.ctx.manifest_path(namespace).exists()
    }

    /// Persist a manifest, refreshing `updated_at` first.
    ///
    /// The file is written to a temporary sibling and renamed over the
    /// manifest, so concurrent readers see the old or the new version.
    pub fn save(&self, manifest: &mut Manifest) -> Result<()> {
        manifest.updated_at = Utc::now();

        let path = self.ctx.manifest_path(&manifest.resource_name);
        let dir = self.ctx.namespace_dir(&manifest.resource_name);
        let write_err = |source: std::io::Error| StoreError::ManifestWrite {
            path: path.clone(),
            source,
        };

        std::fs::create_dir_all(&dir).map_err(write_err)?;

        let content = serde_yaml_ng::to_string(manifest)
            .map_err(|e| write_err(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))?;

        let mut temp = tempfile::NamedTempFile::new_in(&dir).map_err(write_err)?;
        temp.write_all(content.as_bytes()).map_err(write_err)?;
        temp.flush().map_err(write_err)?;
        temp.persist(&path).map_err(|e| write_err(e.error))?;

        tracing::debug!(
            "Saved manifest for '{}' ({} files) to {}",
            manifest.resource_name,
            manifest.files.len(),
            path.display()
        );
        Ok(())
    }

    /// On-disk location of a stored document. No I/O.
    pub fn resolve_path(&self, namespace: &str, filename: &str) -> PathBuf {
        self.ctx.namespace_dir(namespace).join(filename)
    }
}
