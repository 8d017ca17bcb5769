//! Guidestore library exports
//!
//! Synchronizes framework guide sets into a local, hash-tracked store and
//! resolves loosely typed guide names against it.

pub mod config;
pub mod error;
pub mod hasher;
pub mod manifest;
pub mod metadata;
pub mod resolver;
pub mod resources;
pub mod service;
pub mod sync;

pub use config::{Layout, NamespaceCatalog, NamespaceDefinition, ResolverHooks, StoreContext};
pub use error::{Result, StoreError};
pub use manifest::{FileEntry, Manifest, ManifestStore};
pub use resolver::Resolution;
pub use resources::AmbiguityPolicy;
pub use service::{GuideService, NamespaceStatus};
pub use sync::{DownloadCounts, FileOutcome, ImportCounts, SyncReport};
