//! Markdown documents returned to resource readers
//!
//! Every outcome of a lookup, including failures, becomes a document here.

use std::fmt::Write;

use crate::config::NamespaceDefinition;
use crate::manifest::{FileEntry, Manifest};
use crate::metadata::humanize_filename;

/// How many fuzzy matches are loaded together instead of listed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AmbiguityPolicy {
    /// Upper bound for concatenating ambiguous matches; 0 always lists
    pub auto_load_max: usize,
}

impl AmbiguityPolicy {
    pub const DEFAULT_AUTO_LOAD_MAX: usize = 3;

    /// Never concatenate, always list candidates
    pub fn list_only() -> Self {
        Self { auto_load_max: 0 }
    }

    pub fn auto_loads(&self, matches: usize) -> bool {
        matches >= 2 && matches <= self.auto_load_max
    }
}

impl Default for AmbiguityPolicy {
    fn default() -> Self {
        Self {
            auto_load_max: Self::DEFAULT_AUTO_LOAD_MAX,
        }
    }
}

/// `<namespace>://guides/<name>` for a manifest key
pub fn guide_uri(namespace: &str, filename: &str) -> String {
    format!("{}://guides/{}", namespace, filename.trim_end_matches(".md"))
}

/// Title recorded for an entry, or one derived from its filename
pub fn entry_title(filename: &str, entry: Option<&FileEntry>) -> String {
    entry
        .and_then(|e| e.title.clone())
        .unwrap_or_else(|| humanize_filename(filename))
}

/// Section folder of a key in a namespace that uses sections
fn section_of<'a>(definition: &NamespaceDefinition, filename: &'a str) -> Option<&'a str> {
    if !definition.hooks().has_sections() {
        return None;
    }
    filename.split_once('/').map(|(section, _)| section)
}

/// Header block followed by the raw document
pub fn guide(
    definition: &NamespaceDefinition,
    filename: &str,
    entry: &FileEntry,
    content: &str,
) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# {}", entry_title(filename, Some(entry)));
    out.push('\n');
    let _ = writeln!(out, "**Source:** {}", definition.label);
    if let Some(section) = section_of(definition, filename) {
        let _ = writeln!(out, "**Section:** {}", section);
    }
    if let Some(original) = &entry.original_filename {
        let _ = writeln!(out, "**Original file:** {}", original);
    }
    out.push_str("\n---\n\n");
    out.push_str(content);
    out
}

/// Several matching guides loaded together
pub fn concatenated(definition: &NamespaceDefinition, name: &str, documents: &[String]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Found {} guides in {} matching '{}'. Showing all of them.",
        documents.len(),
        definition.label,
        name
    );
    for document in documents {
        out.push_str("\n\n---\n\n");
        out.push_str(document);
    }
    out
}

/// Candidate list for an ambiguous name
pub fn disambiguation(
    definition: &NamespaceDefinition,
    name: &str,
    manifest: &Manifest,
    candidates: &[String],
) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# Multiple guides match '{}'", name);
    out.push('\n');
    let _ = writeln!(
        out,
        "{} guides in {} match this name. Request one of them directly:",
        candidates.len(),
        definition.label
    );
    out.push('\n');

    for filename in candidates {
        let _ = writeln!(
            out,
            "- `{}` ({})",
            guide_uri(&definition.name, filename),
            entry_title(filename, manifest.entry(filename))
        );
    }

    if let Some(first) = candidates.first() {
        out.push('\n');
        let _ = writeln!(
            out,
            "For example: `guidestore show {} {}`",
            definition.name,
            first.trim_end_matches(".md")
        );
    }
    out
}

/// Miss, with "did you mean" hints
pub fn not_found(definition: &NamespaceDefinition, name: &str, suggestions: &[String]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# Guide not found: {}", name);
    out.push('\n');
    let _ = writeln!(out, "No guide matching '{}' exists in {}.", name, definition.label);

    if !suggestions.is_empty() {
        out.push_str("\n## Did you mean?\n\n");
        for suggestion in suggestions {
            let _ = writeln!(out, "- `{}`", guide_uri(&definition.name, suggestion));
        }
    }

    out.push('\n');
    let _ = writeln!(
        out,
        "See `{}://guides` for every available guide.",
        definition.name
    );
    out
}

/// Namespace that has never been synced
pub fn empty_namespace(definition: &NamespaceDefinition) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# {}", definition.label);
    out.push('\n');
    out.push_str("No guides are stored for this namespace yet.\n\n");
    if definition.is_remote() {
        let _ = writeln!(out, "Run `guidestore download {}` first.", definition.name);
    } else {
        let _ = writeln!(
            out,
            "Run `guidestore import <path> --namespace {}` first.",
            definition.name
        );
    }
    out
}

/// Listing of every markdown entry with its title and description
pub fn index(definition: &NamespaceDefinition, manifest: &Manifest) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# {}", definition.label);
    out.push('\n');

    if let Some(description) = manifest
        .description
        .as_ref()
        .or(definition.description.as_ref())
    {
        let _ = writeln!(out, "{}", description);
        out.push('\n');
    }
    if let Some(version) = manifest.version.as_ref().or(definition.version.as_ref()) {
        let _ = writeln!(out, "**Version:** {}", version);
        out.push('\n');
    }

    let entries: Vec<_> = manifest.markdown_files().collect();
    let _ = writeln!(
        out,
        "{} guide(s) available. Read one with `{}://guides/<name>`.",
        entries.len(),
        definition.name
    );

    let mut current_section: Option<&str> = None;
    let mut first = true;
    for (filename, entry) in entries {
        let section = section_of(definition, filename);
        if first || section != current_section {
            out.push('\n');
            if let Some(section) = section {
                let _ = writeln!(out, "## {}", section);
                out.push('\n');
            }
            current_section = section;
            first = false;
        }

        let _ = write!(
            out,
            "- **{}** (`{}`)",
            entry_title(filename, Some(entry)),
            guide_uri(&definition.name, filename)
        );
        if let Some(description) = &entry.description {
            let _ = write!(out, ": {}", description);
        }
        out.push('\n');
    }
    out
}

/// Failure reached through a resource read
pub fn error(uri: &str, message: &str) -> String {
    format!("# Error reading {uri}\n\n{message}\n")
}

/// URI that no registered template matches
pub fn unknown_uri(uri: &str, templates: &[String]) -> String {
    let mut out = format!("# Resource not found: {uri}\n\nAvailable resource templates:\n\n");
    for template in templates {
        let _ = writeln!(out, "- `{}`", template);
    }
    out
}
