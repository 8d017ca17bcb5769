//! Registry of resource templates with a per-URI instance cache

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use super::render;
use super::template::{Resource, ResourceTemplate};

/// Default number of resource instances kept by a registry
pub const DEFAULT_CACHE_CAPACITY: usize = 256;

/// Instances keyed by URI, oldest evicted first once full
struct InstanceCache {
    capacity: usize,
    entries: HashMap<String, Arc<dyn Resource>>,
    order: VecDeque<String>,
}

impl InstanceCache {
    fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: HashMap::new(),
            order: VecDeque::new(),
        }
    }

    fn get(&self, uri: &str) -> Option<Arc<dyn Resource>> {
        self.entries.get(uri).map(Arc::clone)
    }

    fn insert(&mut self, uri: String, resource: Arc<dyn Resource>) {
        while self.entries.len() >= self.capacity {
            let Some(oldest) = self.order.pop_front() else {
                break;
            };
            self.entries.remove(&oldest);
        }
        self.order.push_back(uri.clone());
        self.entries.insert(uri, resource);
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Routes concrete URIs to the first template that matches them.
///
/// Instances are cached by expanded URI, so repeated look-ups of one URI
/// return the same resource. The cache holds at most its capacity and
/// drops the oldest instance first.
pub struct ResourceRegistry {
    templates: Vec<Box<dyn ResourceTemplate>>,
    instances: Mutex<InstanceCache>,
}

impl Default for ResourceRegistry {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CACHE_CAPACITY)
    }
}

impl ResourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry caching at most `capacity` instances
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            templates: Vec::new(),
            instances: Mutex::new(InstanceCache::new(capacity)),
        }
    }

    /// Number of cached instances
    pub fn cached(&self) -> usize {
        self.lock_instances().len()
    }

    fn lock_instances(&self) -> std::sync::MutexGuard<'_, InstanceCache> {
        self.instances
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn register(&mut self, template: Box<dyn ResourceTemplate>) {
        tracing::debug!("Registered resource template {}", template.template());
        self.templates.push(template);
    }

    /// Registered template strings, in registration order
    pub fn templates(&self) -> Vec<String> {
        self.templates
            .iter()
            .map(|t| t.template().to_string())
            .collect()
    }

    pub fn matches(&self, uri: &str) -> bool {
        self.templates.iter().any(|t| t.matches(uri))
    }

    /// Resource for a URI, created on first use
    pub fn lookup(&self, uri: &str) -> Option<Arc<dyn Resource>> {
        let key = uri.trim_end_matches('/');
        let mut instances = self.lock_instances();

        if let Some(resource) = instances.get(key) {
            return Some(resource);
        }

        let resource = self.templates.iter().find_map(|t| t.instance(key))?;
        instances.insert(key.to_string(), Arc::clone(&resource));
        Some(resource)
    }

    /// Content of the resource at `uri`, or a "resource not found" document
    pub fn read(&self, uri: &str) -> String {
        match self.lookup(uri) {
            Some(resource) => resource.content(),
            None => {
                tracing::debug!("No resource template matches {}", uri);
                render::unknown_uri(uri, &self.templates())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::template::UriTemplate;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct EchoResource {
        uri: String,
    }

    impl Resource for EchoResource {
        fn uri(&self) -> &str {
            &self.uri
        }

        fn name(&self) -> &str {
            "echo"
        }

        fn description(&self) -> String {
            "Echoes its URI".to_string()
        }

        fn content(&self) -> String {
            format!("content of {}", self.uri)
        }
    }

    struct EchoTemplate {
        template: UriTemplate,
        created: Arc<AtomicUsize>,
    }

    impl ResourceTemplate for EchoTemplate {
        fn template(&self) -> &UriTemplate {
            &self.template
        }

        fn instance(&self, uri: &str) -> Option<Arc<dyn Resource>> {
            if !self.matches(uri) {
                return None;
            }
            self.created.fetch_add(1, Ordering::SeqCst);
            Some(Arc::new(EchoResource {
                uri: uri.to_string(),
            }))
        }
    }

    fn registry() -> (ResourceRegistry, Arc<AtomicUsize>) {
        registry_with_capacity(DEFAULT_CACHE_CAPACITY)
    }

    fn registry_with_capacity(capacity: usize) -> (ResourceRegistry, Arc<AtomicUsize>) {
        let created = Arc::new(AtomicUsize::new(0));
        let mut registry = ResourceRegistry::with_capacity(capacity);
        registry.register(Box::new(EchoTemplate {
            template: UriTemplate::item("echo", "things").unwrap(),
            created: Arc::clone(&created),
        }));
        (registry, created)
    }

    #[test]
    fn test_lookup_caches_instances() {
        let (registry, created) = registry();

        let first = registry.lookup("echo://things/a").unwrap();
        let second = registry.lookup("echo://things/a/").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(created.load(Ordering::SeqCst), 1);

        registry.lookup("echo://things/b").unwrap();
        assert_eq!(created.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_cache_is_bounded() {
        let (registry, created) = registry_with_capacity(2);

        let first = registry.lookup("echo://things/a").unwrap();
        registry.lookup("echo://things/b").unwrap();
        registry.lookup("echo://things/c").unwrap();
        assert_eq!(registry.cached(), 2);
        assert_eq!(created.load(Ordering::SeqCst), 3);

        // "a" was evicted first and is rebuilt on the next look-up
        let again = registry.lookup("echo://things/a").unwrap();
        assert!(!Arc::ptr_eq(&first, &again));
        assert_eq!(again.content(), first.content());
        assert_eq!(created.load(Ordering::SeqCst), 4);
        assert_eq!(registry.cached(), 2);
    }

    #[test]
    fn test_unmatched_uris_are_not_cached() {
        let (registry, _) = registry();
        for i in 0..10 {
            registry.read(&format!("other://things/{i}"));
        }
        assert_eq!(registry.cached(), 0);
    }

    #[test]
    fn test_read_unknown_uri() {
        let (registry, _) = registry();
        assert!(!registry.matches("other://things/a"));

        let doc = registry.read("other://things/a");
        assert!(doc.contains("Resource not found: other://things/a"));
        assert!(doc.contains("echo://things/{name}"));
    }

    #[test]
    fn test_read_known_uri() {
        let (registry, _) = registry();
        assert_eq!(registry.read("echo://things/a"), "content of echo://things/a");
    }
}
