//! Service facade consumed by the CLI
//!
//! Owns the store context, the namespace catalog, the fetcher and the
//! resource registry for the lifetime of the process.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use crate::config::{NamespaceCatalog, NamespaceDefinition, StoreContext};
use crate::error::{Result, StoreError};
use crate::manifest::ManifestStore;
use crate::resources::{AmbiguityPolicy, GuideCollection, GuideTemplate, ResourceRegistry};
use crate::sync::{Fetcher, LocalImport, RemoteSync, SyncReport};

/// Local state of one namespace
#[derive(Debug, Clone)]
pub struct NamespaceStatus {
    pub definition: NamespaceDefinition,
    /// A manifest has been saved for this namespace
    pub synced: bool,
    /// Number of stored files
    pub file_count: usize,
}

pub struct GuideService {
    catalog: NamespaceCatalog,
    store: ManifestStore,
    fetcher: Box<dyn Fetcher>,
    collections: HashMap<String, Arc<GuideCollection>>,
    registry: ResourceRegistry,
}

impl GuideService {
    /// Service over the discovered catalog using the HTTP fetcher
    #[cfg(feature = "remote")]
    pub fn new(ctx: StoreContext) -> Result<Self> {
        let catalog = NamespaceCatalog::load(&ctx)?;
        let fetcher = crate::sync::HttpFetcher::new()?;
        Self::with_fetcher(ctx, catalog, Box::new(fetcher), AmbiguityPolicy::default())
    }

    /// Service with an explicit catalog, fetcher and ambiguity policy
    pub fn with_fetcher(
        ctx: StoreContext,
        catalog: NamespaceCatalog,
        fetcher: Box<dyn Fetcher>,
        policy: AmbiguityPolicy,
    ) -> Result<Self> {
        let store = ManifestStore::new(ctx);
        let mut collections = HashMap::new();
        let mut registry = ResourceRegistry::new();

        for definition in catalog.iter() {
            let collection = Arc::new(GuideCollection::new(
                store.clone(),
                definition.clone(),
                policy,
            ));
            registry.register(Box::new(GuideTemplate::index(Arc::clone(&collection))?));
            registry.register(Box::new(GuideTemplate::guide(Arc::clone(&collection))?));
            collections.insert(definition.name.clone(), collection);
        }

        tracing::debug!(
            "Guide service ready at {} with {} namespace(s)",
            store.context().root().display(),
            collections.len()
        );

        Ok(Self {
            catalog,
            store,
            fetcher,
            collections,
            registry,
        })
    }

    pub fn context(&self) -> &StoreContext {
        self.store.context()
    }

    pub fn catalog(&self) -> &NamespaceCatalog {
        &self.catalog
    }

    pub fn store(&self) -> &ManifestStore {
        &self.store
    }

    pub fn registry(&self) -> &ResourceRegistry {
        &self.registry
    }

    /// Fetch a remote namespace's files
    pub fn download(&self, namespace: &str, force: bool, verbose: bool) -> Result<SyncReport> {
        let definition = self.catalog.get(namespace)?;
        RemoteSync::new(&self.store, self.fetcher.as_ref())
            .verbose(verbose)
            .run(definition, force)
    }

    /// Import local markdown into an import-only namespace
    pub fn import(
        &self,
        namespace: &str,
        source: &Path,
        force: bool,
        verbose: bool,
    ) -> Result<SyncReport> {
        let definition = self.catalog.get(namespace)?;
        LocalImport::new(&self.store)
            .verbose(verbose)
            .run(definition, source, force)
    }

    /// Render the guide(s) a name resolves to
    pub fn resolve_and_render(&self, namespace: &str, name: &str) -> Result<String> {
        self.collection(namespace)?.render_guide(name)
    }

    /// Render a namespace's index
    pub fn render_index(&self, namespace: &str) -> Result<String> {
        self.collection(namespace)?.render_index()
    }

    /// Read any registered URI; failures come back as documents
    pub fn read_uri(&self, uri: &str) -> String {
        self.registry.read(uri)
    }

    /// Every catalog namespace with its local sync state
    pub fn namespaces(&self) -> Result<Vec<NamespaceStatus>> {
        self.catalog
            .iter()
            .map(|definition| {
                let manifest = self.store.load_existing(&definition.name)?;
                Ok(NamespaceStatus {
                    definition: definition.clone(),
                    synced: manifest.is_some(),
                    file_count: manifest.map(|m| m.files.len()).unwrap_or(0),
                })
            })
            .collect()
    }

    fn collection(&self, namespace: &str) -> Result<&GuideCollection> {
        self.collections
            .get(namespace)
            .map(Arc::as_ref)
            .ok_or_else(|| StoreError::UnknownNamespace {
                name: namespace.to_string(),
                valid: self.catalog.names(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::{FetchError, FetchResponse};
    use tempfile::TempDir;

    struct OfflineFetcher;

    impl Fetcher for OfflineFetcher {
        fn get(&self, url: &str) -> std::result::Result<FetchResponse, FetchError> {
            Err(FetchError::Transport {
                url: url.to_string(),
                message: "offline".to_string(),
            })
        }
    }

    fn service(temp_dir: &TempDir) -> GuideService {
        GuideService::with_fetcher(
            StoreContext::new(temp_dir.path()),
            NamespaceCatalog::builtin().unwrap(),
            Box::new(OfflineFetcher),
            AmbiguityPolicy::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_unknown_namespace_is_config_error() {
        let temp_dir = TempDir::new().unwrap();
        let service = service(&temp_dir);

        for result in [
            service.resolve_and_render("django", "models").map(|_| ()),
            service.render_index("django").map(|_| ()),
            service.download("django", false, false).map(|_| ()),
        ] {
            assert!(matches!(result, Err(StoreError::UnknownNamespace { .. })));
        }
    }

    #[test]
    fn test_offline_download_records_failures() {
        let temp_dir = TempDir::new().unwrap();
        let service = service(&temp_dir);
        let expected = service.catalog().get("stimulus").unwrap().files.len();

        let report = service.download("stimulus", false, false).unwrap();
        assert_eq!(report.download_counts().failed, expected);
        assert_eq!(report.download_counts().downloaded, 0);
    }

    #[test]
    fn test_registry_covers_every_namespace() {
        let temp_dir = TempDir::new().unwrap();
        let service = service(&temp_dir);

        let templates = service.registry().templates();
        assert_eq!(templates.len(), service.catalog().names().len() * 2);
        assert!(templates.contains(&"custom://guides/{name}".to_string()));
        assert!(service.read_uri("custom://guides").contains("No guides are stored"));
        assert!(service
            .read_uri("django://guides/models")
            .contains("Resource not found"));
    }

    #[test]
    fn test_namespaces_status() {
        let temp_dir = TempDir::new().unwrap();
        let service = service(&temp_dir);
        let source = temp_dir.path().join("notes.md");
        std::fs::write(&source, "# Notes\n").unwrap();
        service.import("custom", &source, false, false).unwrap();

        let statuses = service.namespaces().unwrap();
        let custom = statuses
            .iter()
            .find(|s| s.definition.name == "custom")
            .unwrap();
        assert!(custom.synced);
        assert_eq!(custom.file_count, 1);

        let rails = statuses.iter().find(|s| s.definition.name == "rails").unwrap();
        assert!(!rails.synced);
        assert_eq!(rails.file_count, 0);
    }

    #[test]
    fn test_bad_user_namespace_name_does_not_block_startup() {
        let temp_dir = TempDir::new().unwrap();
        let ctx = StoreContext::new(temp_dir.path());
        std::fs::write(
            ctx.definitions_path(),
            "namespaces:\n  - name: my_docs\n    label: My Docs\n  - name: notes\n    label: Notes\n",
        )
        .unwrap();
        let catalog = NamespaceCatalog::load(&ctx).unwrap();

        let service = GuideService::with_fetcher(
            ctx,
            catalog,
            Box::new(OfflineFetcher),
            AmbiguityPolicy::default(),
        )
        .unwrap();
        let names: Vec<String> = service
            .namespaces()
            .unwrap()
            .into_iter()
            .map(|status| status.definition.name)
            .collect();
        assert!(names.contains(&"notes".to_string()));
        assert!(!names.contains(&"my_docs".to_string()));
        assert!(matches!(
            service.render_index("my_docs"),
            Err(StoreError::UnknownNamespace { .. })
        ));
    }
}
