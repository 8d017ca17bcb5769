//! URI templates and the resource traits built on them

use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;

use crate::error::{Result, StoreError};

/// Placeholder accepted in item templates
pub const NAME_PLACEHOLDER: &str = "{name}";

static TEMPLATE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([a-z][a-z0-9+.\-]*)://([A-Za-z0-9_.\-]+)(/\{name\})?$").expect("valid regex")
});

/// A `scheme://collection` or `scheme://collection/{name}` template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UriTemplate {
    raw: String,
    scheme: String,
    collection: String,
    has_placeholder: bool,
}

impl UriTemplate {
    pub fn parse(template: &str) -> Result<Self> {
        let caps = TEMPLATE_PATTERN
            .captures(template)
            .ok_or_else(|| StoreError::InvalidTemplate {
                template: template.to_string(),
            })?;

        Ok(Self {
            raw: template.to_string(),
            scheme: caps[1].to_string(),
            collection: caps[2].to_string(),
            has_placeholder: caps.get(3).is_some(),
        })
    }

    /// Index form of a collection
    pub fn list(scheme: &str, collection: &str) -> Result<Self> {
        Self::parse(&format!("{scheme}://{collection}"))
    }

    /// Single-item form of a collection
    pub fn item(scheme: &str, collection: &str) -> Result<Self> {
        Self::parse(&format!("{scheme}://{collection}/{NAME_PLACEHOLDER}"))
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// True for the placeholder-free index form
    pub fn is_list(&self) -> bool {
        !self.has_placeholder
    }

    fn base(&self) -> String {
        format!("{}://{}", self.scheme, self.collection)
    }

    /// Placeholder value of a matching URI.
    ///
    /// For the list form a match yields an empty string. The name may
    /// contain slashes (`turbo://guides/handbook/drive`).
    pub fn extract(&self, uri: &str) -> Option<String> {
        let base = self.base();
        let uri = uri.trim_end_matches('/');

        if self.is_list() {
            return (uri == base).then(String::new);
        }

        uri.strip_prefix(&base)
            .and_then(|rest| rest.strip_prefix('/'))
            .filter(|name| !name.is_empty())
            .map(str::to_string)
    }

    pub fn matches(&self, uri: &str) -> bool {
        self.extract(uri).is_some()
    }

    /// Concrete URI for a name; list templates ignore it
    pub fn expand(&self, name: &str) -> String {
        if self.is_list() {
            self.base()
        } else {
            format!("{}/{}", self.base(), name)
        }
    }
}

impl std::fmt::Display for UriTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw)
    }
}

/// A readable document addressed by a concrete URI.
///
/// `content` never fails: errors are rendered into the returned document.
pub trait Resource: Send + Sync {
    fn uri(&self) -> &str;

    fn name(&self) -> &str;

    fn description(&self) -> String;

    fn mime_type(&self) -> &str {
        "text/markdown"
    }

    fn content(&self) -> String;
}

/// A family of resources sharing one URI template
pub trait ResourceTemplate: Send + Sync {
    fn template(&self) -> &UriTemplate;

    fn matches(&self, uri: &str) -> bool {
        self.template().matches(uri)
    }

    /// Build the resource for a concrete URI, or `None` if it does not match
    fn instance(&self, uri: &str) -> Option<Arc<dyn Resource>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_item_template() {
        let template = UriTemplate::parse("rails://guides/{name}").unwrap();
        assert_eq!(template.scheme(), "rails");
        assert_eq!(template.collection(), "guides");
        assert!(!template.is_list());
        assert_eq!(template.to_string(), "rails://guides/{name}");
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for bad in [
            "rails://guides/{name}/{name}",
            "rails://guides/{slug}",
            "rails:/guides",
            "://guides",
        ] {
            assert!(
                matches!(UriTemplate::parse(bad), Err(StoreError::InvalidTemplate { .. })),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn test_bad_scheme_message_names_the_rule() {
        let err = UriTemplate::list("my_docs", "guides").unwrap_err();
        let message = err.to_string();
        assert!(message.contains("'my_docs://guides'"));
        assert!(message.contains("scheme starts with a lowercase letter"));
        assert!(!message.contains("at most one"));
    }

    #[test]
    fn test_item_matching() {
        let template = UriTemplate::item("turbo", "guides").unwrap();
        assert_eq!(
            template.extract("turbo://guides/handbook/drive").as_deref(),
            Some("handbook/drive")
        );
        assert_eq!(template.extract("turbo://guides/frames/").as_deref(), Some("frames"));
        assert!(!template.matches("turbo://guides"));
        assert!(!template.matches("turbo://guides/"));
        assert!(!template.matches("rails://guides/routing"));
        assert!(!template.matches("turbo://guidesx/drive"));
    }

    #[test]
    fn test_list_matching() {
        let template = UriTemplate::list("custom", "guides").unwrap();
        assert!(template.is_list());
        assert!(template.matches("custom://guides"));
        assert!(template.matches("custom://guides/"));
        assert!(!template.matches("custom://guides/api_overview"));
    }

    #[test]
    fn test_expand() {
        let item = UriTemplate::item("rails", "guides").unwrap();
        assert_eq!(item.expand("routing"), "rails://guides/routing");

        let list = UriTemplate::list("rails", "guides").unwrap();
        assert_eq!(list.expand("ignored"), "rails://guides");
    }
}
