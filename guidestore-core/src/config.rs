//! Store configuration: config root, namespace definitions and resolver hooks
//!
//! Namespace definitions are YAML. A built-in set ships with the crate and
//! may be extended or overridden by `<config_root>/resources.yaml`.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Result, StoreError};

/// Environment variable overriding the config root
pub const HOME_ENV_VAR: &str = "GUIDESTORE_HOME";

/// Manifest file name inside each namespace directory
pub const MANIFEST_FILE: &str = "manifest.yaml";

/// User namespace definition file name inside the config root
pub const DEFINITIONS_FILE: &str = "resources.yaml";

const BUILTIN_DEFINITIONS: &str = include_str!("../resources/namespaces.yaml");

/// Namespace names double as URI schemes and directory names
static NAMESPACE_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z][a-z0-9+.\-]*$").expect("valid regex"));

/// Top-level section folders probed for hierarchical namespaces
const HIERARCHICAL_SECTIONS: &[&str] = &[
    "installation",
    "configuration",
    "commands",
    "hooks",
    "upgrading",
];

/// Explicit context passed to every sync, resolve and render call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreContext {
    root: PathBuf,
}

impl StoreContext {
    /// Use an explicit config root
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolve the config root from `GUIDESTORE_HOME` or the platform config dir
    pub fn discover() -> Result<Self> {
        if let Some(home) = std::env::var_os(HOME_ENV_VAR).filter(|v| !v.is_empty()) {
            return Ok(Self::new(PathBuf::from(home)));
        }

        let root = directories::ProjectDirs::from("io", "guidestore", "guidestore")
            .map(|dirs| dirs.config_dir().to_path_buf())
            .or_else(|| dirs::config_dir().map(|d| d.join("guidestore")))
            .ok_or(StoreError::ConfigRoot)?;

        Ok(Self::new(root))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn resources_dir(&self) -> PathBuf {
        self.root.join("resources")
    }

    pub fn namespace_dir(&self, namespace: &str) -> PathBuf {
        self.resources_dir().join(namespace)
    }

    pub fn manifest_path(&self, namespace: &str) -> PathBuf {
        self.namespace_dir(namespace).join(MANIFEST_FILE)
    }

    pub fn definitions_path(&self) -> PathBuf {
        self.root.join(DEFINITIONS_FILE)
    }
}

/// Directory convention a namespace's documents follow
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    /// All documents at the top level
    #[default]
    Flat,
    /// `handbook/` and `reference/` sections
    Sectioned,
    /// Arbitrary top-level section folders with `index.md` pages
    Hierarchical,
}

/// Capabilities a namespace declares to the resolver up front.
#[derive(Debug, Clone, Copy)]
pub struct ResolverHooks {
    /// Section folders probed during the exact phase
    pub sections: &'static [&'static str],
    /// Extra exact-phase candidates for a normalized name
    pub filename_variants: Option<fn(&str) -> Vec<String>>,
    /// Fuzzy phase also matches on the full relative path
    pub match_full_path: bool,
}

impl ResolverHooks {
    pub const FLAT: ResolverHooks = ResolverHooks {
        sections: &[],
        filename_variants: None,
        match_full_path: false,
    };

    pub fn has_sections(&self) -> bool {
        !self.sections.is_empty() || self.match_full_path
    }
}

impl Default for ResolverHooks {
    fn default() -> Self {
        Self::FLAT
    }
}

impl Layout {
    pub fn hooks(self) -> ResolverHooks {
        match self {
            Layout::Flat => ResolverHooks::FLAT,
            Layout::Sectioned => ResolverHooks {
                sections: &["handbook", "reference"],
                filename_variants: None,
                match_full_path: false,
            },
            Layout::Hierarchical => ResolverHooks {
                sections: &[],
                filename_variants: Some(hierarchical_variants),
                match_full_path: true,
            },
        }
    }
}

fn hierarchical_variants(name: &str) -> Vec<String> {
    let mut candidates: Vec<String> = HIERARCHICAL_SECTIONS
        .iter()
        .map(|section| format!("{section}/{name}.md"))
        .collect();
    candidates.push(format!("{name}/index.md"));
    candidates
}

/// A documentation namespace
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamespaceDefinition {
    /// Namespace identifier, also the URI scheme
    pub name: String,

    /// Human label used in rendered headers
    pub label: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// Remote source; absent for import-only namespaces
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    #[serde(default)]
    pub layout: Layout,

    /// Files fetched by a remote sync
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<String>,
}

impl NamespaceDefinition {
    pub fn is_remote(&self) -> bool {
        self.base_url.is_some()
    }

    pub fn hooks(&self) -> ResolverHooks {
        self.layout.hooks()
    }

    /// Lowercase letter first, then lowercase letters, digits, `+`, `.` or `-`
    pub fn has_valid_name(&self) -> bool {
        NAMESPACE_NAME.is_match(&self.name)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct DefinitionsFile {
    #[serde(default)]
    namespaces: Vec<NamespaceDefinition>,
}

/// The set of known namespaces, in definition order
#[derive(Debug, Clone)]
pub struct NamespaceCatalog {
    namespaces: Vec<NamespaceDefinition>,
}

impl NamespaceCatalog {
    /// Built-in namespaces only
    pub fn builtin() -> Result<Self> {
        let file: DefinitionsFile = serde_yaml_ng::from_str(BUILTIN_DEFINITIONS).map_err(
            |source| StoreError::InvalidDefinitions {
                path: PathBuf::from("<builtin>"),
                source,
            },
        )?;
        Ok(Self {
            namespaces: file.namespaces,
        })
    }

    /// Built-in namespaces merged with the user's definitions file, if any
    pub fn load(ctx: &StoreContext) -> Result<Self> {
        let mut catalog = Self::builtin()?;
        let path = ctx.definitions_path();

        if !path.exists() {
            return Ok(catalog);
        }

        let content = std::fs::read_to_string(&path).map_err(|source| {
            StoreError::ManifestRead {
                path: path.clone(),
                source,
            }
        })?;
        let file: DefinitionsFile = serde_yaml_ng::from_str(&content)
            .map_err(|source| StoreError::InvalidDefinitions { path, source })?;

        tracing::debug!(
            "Loaded {} namespace definition(s) from {}",
            file.namespaces.len(),
            ctx.definitions_path().display()
        );

        for definition in file.namespaces {
            if !definition.has_valid_name() {
                tracing::warn!(
                    "Skipping namespace '{}' in {}: names must start with a lowercase letter \
                     and contain only lowercase letters, digits, '+', '.' or '-'",
                    definition.name,
                    ctx.definitions_path().display()
                );
                continue;
            }
            catalog.insert(definition);
        }
        Ok(catalog)
    }

    /// Build a catalog from explicit definitions
    pub fn from_definitions(namespaces: Vec<NamespaceDefinition>) -> Self {
        let mut catalog = Self {
            namespaces: Vec::new(),
        };
        for definition in namespaces {
            catalog.insert(definition);
        }
        catalog
    }

    /// Add a definition, replacing any existing one with the same name
    pub fn insert(&mut self, definition: NamespaceDefinition) {
        match self
            .namespaces
            .iter_mut()
            .find(|existing| existing.name == definition.name)
        {
            Some(existing) => *existing = definition,
            None => self.namespaces.push(definition),
        }
    }

    /// Look up a namespace, failing with the list of valid names
    pub fn get(&self, name: &str) -> Result<&NamespaceDefinition> {
        self.namespaces
            .iter()
            .find(|ns| ns.name == name)
            .ok_or_else(|| StoreError::UnknownNamespace {
                name: name.to_string(),
                valid: self.names(),
            })
    }

    pub fn names(&self) -> Vec<String> {
        self.namespaces.iter().map(|ns| ns.name.clone()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &NamespaceDefinition> {
        self.namespaces.iter()
    }
}
