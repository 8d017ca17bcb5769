//! Test helper functions for integration tests
//!
//! Shared across the test files using the tests/common/ pattern.

#![allow(dead_code)]

use guidestore_core::config::{Layout, NamespaceCatalog, NamespaceDefinition, StoreContext};
use guidestore_core::sync::{FetchError, FetchResponse, Fetcher};
use guidestore_core::{AmbiguityPolicy, GuideService};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::Once;
use tempfile::TempDir;

pub const TEST_BASE_URL: &str = "https://guides.test/source";

/// Initialize logging for tests (only once per test run)
static INIT: Once = Once::new();

pub fn init_test_logging() {
    INIT.call_once(|| {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let _ = tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .with_test_writer()
                    .with_target(true)
                    .with_level(true),
            )
            .with(tracing_subscriber::filter::EnvFilter::from_default_env())
            .try_init();
    });
}

/// In-memory fetcher serving fixed pages and recording every request
#[derive(Clone, Default)]
pub struct StaticFetcher {
    pages: Rc<RefCell<HashMap<String, Vec<u8>>>>,
    requests: Rc<RefCell<Vec<String>>>,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `content` for `<TEST_BASE_URL>/<filename>`
    pub fn serve(&self, filename: &str, content: &str) {
        self.pages.borrow_mut().insert(
            format!("{TEST_BASE_URL}/{filename}"),
            content.as_bytes().to_vec(),
        );
    }

    pub fn request_count(&self) -> usize {
        self.requests.borrow().len()
    }
}

impl Fetcher for StaticFetcher {
    fn get(&self, url: &str) -> Result<FetchResponse, FetchError> {
        self.requests.borrow_mut().push(url.to_string());
        Ok(match self.pages.borrow().get(url) {
            Some(body) => FetchResponse {
                status: 200,
                body: body.clone(),
            },
            None => FetchResponse {
                status: 404,
                body: Vec::new(),
            },
        })
    }
}

/// Remote namespace definition pointing at [`TEST_BASE_URL`]
pub fn remote_namespace(name: &str, layout: Layout, files: &[&str]) -> NamespaceDefinition {
    NamespaceDefinition {
        name: name.to_string(),
        label: format!("{} Test Guides", name),
        description: Some(format!("{} guides served from memory", name)),
        version: Some("1.0".to_string()),
        base_url: Some(TEST_BASE_URL.to_string()),
        layout,
        files: files.iter().map(|f| f.to_string()).collect(),
    }
}

/// Import-only namespace
pub fn local_namespace(name: &str) -> NamespaceDefinition {
    NamespaceDefinition {
        name: name.to_string(),
        label: "Custom Guides".to_string(),
        description: Some("Locally imported documentation".to_string()),
        version: None,
        base_url: None,
        layout: Layout::Flat,
        files: Vec::new(),
    }
}

/// Service rooted in a fresh temp dir
pub fn test_service(
    definitions: Vec<NamespaceDefinition>,
    fetcher: &StaticFetcher,
    policy: AmbiguityPolicy,
) -> (TempDir, GuideService) {
    init_test_logging();
    let temp_dir = TempDir::new().expect("temp dir");
    let service = GuideService::with_fetcher(
        StoreContext::new(temp_dir.path().join("config")),
        NamespaceCatalog::from_definitions(definitions),
        Box::new(fetcher.clone()),
        policy,
    )
    .expect("service");
    (temp_dir, service)
}
