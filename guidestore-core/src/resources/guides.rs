//! Guide resources: `<namespace>://guides` and `<namespace>://guides/{name}`

use std::sync::Arc;

use super::render::{self, AmbiguityPolicy};
use super::template::{Resource, ResourceTemplate, UriTemplate};
use crate::config::NamespaceDefinition;
use crate::error::{Result, StoreError};
use crate::manifest::ManifestStore;
use crate::resolver::{self, Resolution};

/// Collection name shared by every namespace's URIs
pub const GUIDES_COLLECTION: &str = "guides";

/// One namespace's stored guides, read through its manifest.
///
/// The manifest is re-read on every render; nothing here writes to it.
#[derive(Debug, Clone)]
pub struct GuideCollection {
    store: ManifestStore,
    definition: NamespaceDefinition,
    policy: AmbiguityPolicy,
}

impl GuideCollection {
    pub fn new(
        store: ManifestStore,
        definition: NamespaceDefinition,
        policy: AmbiguityPolicy,
    ) -> Self {
        Self {
            store,
            definition,
            policy,
        }
    }

    pub fn definition(&self) -> &NamespaceDefinition {
        &self.definition
    }

    pub fn namespace(&self) -> &str {
        &self.definition.name
    }

    /// Resolve a name and render the matching guide(s), a miss or a candidate list
    pub fn render_guide(&self, name: &str) -> Result<String> {
        let manifest = match self.store.load_existing(self.namespace())? {
            Some(manifest) => manifest,
            None => return Ok(render::empty_namespace(&self.definition)),
        };

        match resolver::resolve(name, &manifest, &self.definition.hooks()) {
            Resolution::Unique { filename, entry } => {
                let content = self.read_document(&filename)?;
                Ok(render::guide(&self.definition, &filename, &entry, &content))
            }
            Resolution::NotFound => {
                let suggestions = resolver::suggest(name, &manifest);
                tracing::debug!(
                    "No guide '{}' in '{}', {} suggestion(s)",
                    name,
                    self.namespace(),
                    suggestions.len()
                );
                Ok(render::not_found(&self.definition, name, &suggestions))
            }
            Resolution::Ambiguous(candidates) if self.policy.auto_loads(candidates.len()) => {
                let mut documents = Vec::with_capacity(candidates.len());
                for filename in &candidates {
                    let content = self.read_document(filename)?;
                    if let Some(entry) = manifest.entry(filename) {
                        documents.push(render::guide(&self.definition, filename, entry, &content));
                    }
                }
                Ok(render::concatenated(&self.definition, name, &documents))
            }
            Resolution::Ambiguous(candidates) => Ok(render::disambiguation(
                &self.definition,
                name,
                &manifest,
                &candidates,
            )),
        }
    }

    /// Render the index of every stored guide
    pub fn render_index(&self) -> Result<String> {
        match self.store.load_existing(self.namespace())? {
            Some(manifest) => Ok(render::index(&self.definition, &manifest)),
            None => Ok(render::empty_namespace(&self.definition)),
        }
    }

    fn read_document(&self, filename: &str) -> Result<String> {
        let path = self.store.resolve_path(self.namespace(), filename);
        std::fs::read(&path)
            .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
            .map_err(|source| {
                let err = StoreError::DocumentRead { path, source };
                err.log_if_integrity_error();
                err
            })
    }
}

/// Index resource for a namespace
pub struct GuideIndexResource {
    uri: String,
    collection: Arc<GuideCollection>,
}

impl Resource for GuideIndexResource {
    fn uri(&self) -> &str {
        &self.uri
    }

    fn name(&self) -> &str {
        &self.collection.definition.label
    }

    fn description(&self) -> String {
        format!("Index of {}", self.collection.definition.label)
    }

    fn content(&self) -> String {
        self.collection
            .render_index()
            .unwrap_or_else(|e| render::error(&self.uri, &e.to_string()))
    }
}

/// Single guide addressed by a loosely typed name
pub struct GuideResource {
    uri: String,
    name: String,
    collection: Arc<GuideCollection>,
}

impl Resource for GuideResource {
    fn uri(&self) -> &str {
        &self.uri
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> String {
        format!("'{}' from {}", self.name, self.collection.definition.label)
    }

    fn content(&self) -> String {
        self.collection
            .render_guide(&self.name)
            .unwrap_or_else(|e| render::error(&self.uri, &e.to_string()))
    }
}

/// Template producing index or guide resources for one namespace
pub struct GuideTemplate {
    template: UriTemplate,
    collection: Arc<GuideCollection>,
}

impl GuideTemplate {
    /// `<namespace>://guides`
    pub fn index(collection: Arc<GuideCollection>) -> Result<Self> {
        Ok(Self {
            template: UriTemplate::list(collection.namespace(), GUIDES_COLLECTION)?,
            collection,
        })
    }

    /// `<namespace>://guides/{name}`
    pub fn guide(collection: Arc<GuideCollection>) -> Result<Self> {
        Ok(Self {
            template: UriTemplate::item(collection.namespace(), GUIDES_COLLECTION)?,
            collection,
        })
    }
}

impl ResourceTemplate for GuideTemplate {
    fn template(&self) -> &UriTemplate {
        &self.template
    }

    fn instance(&self, uri: &str) -> Option<Arc<dyn Resource>> {
        let name = self.template.extract(uri)?;
        let collection = Arc::clone(&self.collection);

        if self.template.is_list() {
            Some(Arc::new(GuideIndexResource {
                uri: self.template.expand(""),
                collection,
            }))
        } else {
            Some(Arc::new(GuideResource {
                uri: self.template.expand(&name),
                name,
                collection,
            }))
        }
    }
}
