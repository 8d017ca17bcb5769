//! Guide name resolution
//!
//! Turns a loosely typed name into a manifest key in two phases:
//!
//! 1. **Exact**: probe an ordered list of candidate keys (`{name}.md`,
//!    section folders, namespace-specific variants). Case-sensitive.
//! 2. **Fuzzy**: containment matching on lowercased basenames, with
//!    separators optionally ignored. Hierarchical namespaces also match on
//!    the full relative path. In sectioned and hierarchical namespaces a
//!    query like `handbook/drive` narrows to keys under the named folder.
//!
//! The resolver never picks among several fuzzy matches; it reports them
//! as [`Resolution::Ambiguous`] and leaves the policy to the caller.

use crate::config::ResolverHooks;
use crate::manifest::{FileEntry, Manifest};

/// Maximum number of "did you mean" hints
pub const MAX_SUGGESTIONS: usize = 5;

/// Minimum prefix length compared by the suggestion predicate
const SUGGESTION_PREFIX_CHARS: usize = 4;

/// Outcome of resolving a name against a manifest
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Unique { filename: String, entry: FileEntry },
    NotFound,
    /// Sorted manifest keys that all matched
    Ambiguous(Vec<String>),
}

impl Resolution {
    pub fn is_unique(&self) -> bool {
        matches!(self, Resolution::Unique { .. })
    }
}

/// Keep only `[A-Za-z0-9_/.-]`, drop surrounding slashes and a trailing `.md`
pub fn normalize_query(raw_name: &str) -> String {
    let kept: String = raw_name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '/' | '.' | '-'))
        .collect();

    let trimmed = kept.trim_matches('/');
    trimmed
        .strip_suffix(".md")
        .unwrap_or(trimmed)
        .to_string()
}

/// Resolve `raw_name` against a namespace manifest
pub fn resolve(raw_name: &str, manifest: &Manifest, hooks: &ResolverHooks) -> Resolution {
    let name = normalize_query(raw_name);
    if name.is_empty() {
        return Resolution::NotFound;
    }

    if let Some(filename) = exact_candidates(&name, hooks)
        .into_iter()
        .find(|candidate| manifest.files.contains_key(candidate))
    {
        tracing::debug!("'{}' resolved exactly to {}", raw_name, filename);
        return unique(manifest, filename);
    }

    let mut matches = fuzzy_matches(&name, manifest, hooks);
    tracing::debug!("'{}' fuzzy-matched {} file(s)", raw_name, matches.len());

    match matches.len() {
        0 => Resolution::NotFound,
        1 => unique(manifest, matches.remove(0)),
        _ => Resolution::Ambiguous(matches),
    }
}

/// "Did you mean" hints for a name that resolved to nothing.
///
/// Returned names are manifest keys without the `.md` extension.
pub fn suggest(raw_name: &str, manifest: &Manifest) -> Vec<String> {
    let name = normalize_query(raw_name);
    let term = last_segment(&name).to_lowercase();
    if term.is_empty() {
        return Vec::new();
    }

    manifest
        .markdown_files()
        .filter(|(key, _)| {
            let base = basename(key);
            loosely_matches(&term, &base) || basename_matches(&term, &base)
        })
        .map(|(key, _)| key.trim_end_matches(".md").to_string())
        .take(MAX_SUGGESTIONS)
        .collect()
}

/// Ordered exact-phase candidate keys for a normalized name
pub fn exact_candidates(name: &str, hooks: &ResolverHooks) -> Vec<String> {
    let mut candidates = vec![format!("{name}.md")];
    candidates.extend(
        hooks
            .sections
            .iter()
            .map(|section| format!("{section}/{name}.md")),
    );
    if let Some(variants) = hooks.filename_variants {
        candidates.extend(variants(name));
    }
    candidates
}

fn unique(manifest: &Manifest, filename: String) -> Resolution {
    match manifest.files.get(&filename) {
        Some(entry) => Resolution::Unique {
            entry: entry.clone(),
            filename,
        },
        None => Resolution::NotFound,
    }
}

fn fuzzy_matches(name: &str, manifest: &Manifest, hooks: &ResolverHooks) -> Vec<String> {
    let term = last_segment(name).to_lowercase();
    let full_query = name.to_lowercase();
    // Folder part of a path-qualified query, e.g. `handbook` in `handbook/drive`
    let section = full_query
        .rsplit_once('/')
        .map(|(dir, _)| dir.to_string())
        .filter(|_| hooks.has_sections());

    let mut by_basename = Vec::new();
    let mut by_path = Vec::new();

    for (key, _) in manifest.markdown_files() {
        let path_hit = hooks.match_full_path
            && key.trim_end_matches(".md").to_lowercase().contains(&full_query);
        let base_hit = basename_matches(&term, &basename(key));
        let section_hit = base_hit
            && section
                .as_deref()
                .is_some_and(|dir| directory(key).contains(dir));

        if path_hit || section_hit {
            by_path.push(key.clone());
        }
        if path_hit || base_hit {
            by_basename.push(key.clone());
        }
    }

    // A path-qualified query narrows to the keys whose path matched
    if section.is_some() && !by_path.is_empty() {
        return by_path;
    }
    by_basename
}

fn basename_matches(term: &str, base: &str) -> bool {
    if contains_either(term, base) {
        return true;
    }
    contains_either(&strip_separators(term), &strip_separators(base))
}

fn loosely_matches(term: &str, base: &str) -> bool {
    let term = alphanumeric(term);
    let base = alphanumeric(base);
    if term.is_empty() || base.is_empty() {
        return false;
    }
    base.contains(prefix(&term, SUGGESTION_PREFIX_CHARS))
        || term.contains(prefix(&base, SUGGESTION_PREFIX_CHARS))
}

fn contains_either(a: &str, b: &str) -> bool {
    !a.is_empty() && !b.is_empty() && (a.contains(b) || b.contains(a))
}

fn last_segment(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

fn directory(key: &str) -> String {
    key.rsplit_once('/')
        .map(|(dir, _)| dir.to_lowercase())
        .unwrap_or_default()
}

fn basename(key: &str) -> String {
    last_segment(key).trim_end_matches(".md").to_lowercase()
}

fn strip_separators(s: &str) -> String {
    s.chars().filter(|c| !matches!(c, '_' | '-')).collect()
}

fn alphanumeric(s: &str) -> String {
    s.chars().filter(|c| c.is_alphanumeric()).collect()
}

fn prefix(s: &str, chars: usize) -> &str {
    match s.char_indices().nth(chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
