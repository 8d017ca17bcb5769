//! Store error types with clear, actionable messages

use std::path::PathBuf;
use thiserror::Error;

use crate::sync::fetch::FetchError;

/// Errors that abort an operation on a namespace.
///
/// Per-file sync failures are not represented here; they are recorded as
/// [`crate::sync::FileOutcome::Failed`] in the run report.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The requested namespace is not defined
    #[error("Unknown namespace '{name}'.\n\nValid namespaces: {}", .valid.join(", "))]
    UnknownNamespace { name: String, valid: Vec<String> },

    /// The namespace has no remote source to download from
    #[error("Namespace '{namespace}' has no base_url and cannot be downloaded.\n\nTo add documents to it, run:\n  guidestore import <path> --namespace {namespace}")]
    NotDownloadable { namespace: String },

    /// The namespace is backed by a remote source and does not accept imports
    #[error("Namespace '{namespace}' is synced from a remote source and does not accept local imports.\n\nImport into the 'custom' namespace instead.")]
    NotImportable { namespace: String },

    /// The namespace definition file could not be parsed
    #[error("Failed to parse namespace definitions at {path}")]
    InvalidDefinitions {
        path: PathBuf,
        #[source]
        source: serde_yaml_ng::Error,
    },

    /// The persisted manifest is not valid YAML for a manifest
    #[error("Manifest is corrupted: {path}\n\nThe file could not be parsed and was not treated as empty.\n\nTo rebuild it, remove the file and sync the namespace again.")]
    ManifestCorrupt {
        path: PathBuf,
        #[source]
        source: serde_yaml_ng::Error,
    },

    /// Failed to read a manifest or definition file
    #[error("Failed to read {path}")]
    ManifestRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write the manifest
    #[error("Failed to write manifest to {path}")]
    ManifestWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A manifest entry points at a document that cannot be read
    #[error("Failed to read document {path}\n\nThe manifest lists this file but it is missing or unreadable. Re-run the sync for this namespace.")]
    DocumentRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// No configuration directory could be determined
    #[error("Could not determine config directory. Set GUIDESTORE_HOME or pass --config-root.")]
    ConfigRoot,

    /// A URI template is malformed
    #[error("Invalid URI template '{template}': expected 'scheme://collection' or 'scheme://collection/{{name}}', where the scheme starts with a lowercase letter followed by lowercase letters, digits, '+', '.' or '-'")]
    InvalidTemplate { template: String },

    /// The HTTP client could not be built
    #[error(transparent)]
    Fetch(#[from] FetchError),
}

impl StoreError {
    /// True for errors that indicate damaged on-disk state rather than a bad request.
    pub fn is_integrity_error(&self) -> bool {
        matches!(
            self,
            StoreError::ManifestCorrupt { .. } | StoreError::DocumentRead { .. }
        )
    }

    /// Log integrity errors at error level
    pub fn log_if_integrity_error(&self) {
        if self.is_integrity_error() {
            tracing::error!(target: "integrity", "{}", self);
        }
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
