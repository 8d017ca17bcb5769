//! Addressable resources
//!
//! Maps `<namespace>://guides` and `<namespace>://guides/{name}` URIs onto
//! the resolver and the manifest store, and renders every outcome as a
//! markdown document.

pub mod guides;
mod registry;
pub mod render;
pub mod template;

pub use guides::{GuideCollection, GuideTemplate, GUIDES_COLLECTION};
pub use registry::ResourceRegistry;
pub use render::AmbiguityPolicy;
pub use template::{Resource, ResourceTemplate, UriTemplate};
