//! Title and description extraction for stored documents
//!
//! Deterministic and side-effect free; both sync variants call [`extract`]
//! for every markdown file they write.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::path::Path;

/// Maximum description length before truncation
pub const MAX_DESCRIPTION_CHARS: usize = 200;

static H1_HEADING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#[ \t]+(\S.*?)(?:[ \t]+#+)?[ \t]*$").expect("valid regex"));

static ANY_HEADING: Lazy<Regex> = Lazy::new(|| Regex::new(r"^#{1,6}(\s|$)").expect("valid regex"));

static ORDERING_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+(?:\.\d+)*[\s._)\-]+").expect("valid regex"));

static ACRONYMS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(api|html|css|js|ui|url|rest|json|xml|sql)\b").expect("valid regex")
});

/// Metadata derived from a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentMetadata {
    pub title: String,
    pub description: Option<String>,
}

/// Derive a title and short description from document text.
///
/// Title priority: first `# Heading` line, then the first underline-style
/// heading (`Title` over `=====`), then the humanized `fallback_name`.
pub fn extract(content: &str, fallback_name: &str) -> DocumentMetadata {
    let body = strip_front_matter(content);
    let lines: Vec<&str> = body.lines().collect();

    let title = find_h1(&lines)
        .or_else(|| find_underlined(&lines))
        .unwrap_or_else(|| humanize_filename(fallback_name));

    DocumentMetadata {
        title,
        description: describe(&lines),
    }
}

/// Turn a filename like `01_json_api.md` into `JSON API`.
pub fn humanize_filename(filename: &str) -> String {
    let path = Path::new(filename);
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| filename.to_string());

    let spaced = strip_ordering_prefix(&stem).replace(['_', '-'], " ");

    let title_cased = spaced
        .split_whitespace()
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ");

    if title_cased.is_empty() {
        return "Untitled".to_string();
    }

    ACRONYMS
        .replace_all(&title_cased, |caps: &Captures| acronym(&caps[1]).to_string())
        .into_owned()
}

/// Drop a leading ordering prefix such as `01 - `, `1.2_` or `03.`.
///
/// The prefix is kept if removing it would leave nothing alphanumeric.
pub(crate) fn strip_ordering_prefix(stem: &str) -> &str {
    match ORDERING_PREFIX.find(stem) {
        Some(m) => {
            let rest = &stem[m.end()..];
            if rest.chars().any(|c| c.is_alphanumeric()) {
                rest
            } else {
                stem
            }
        }
        None => stem,
    }
}

fn acronym(word: &str) -> &'static str {
    match word.to_ascii_lowercase().as_str() {
        "api" => "API",
        "html" => "HTML",
        "css" => "CSS",
        "js" => "JavaScript",
        "ui" => "UI",
        "url" => "URL",
        "rest" => "REST",
        "json" => "JSON",
        "xml" => "XML",
        _ => "SQL",
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

fn strip_front_matter(content: &str) -> &str {
    let mut lines = content.split_inclusive('\n');
    let mut offset = match lines.next() {
        Some(first) if first.trim_end() == "---" => first.len(),
        _ => return content,
    };

    for line in lines {
        offset += line.len();
        if line.trim_end() == "---" {
            return &content[offset..];
        }
    }

    // Unterminated fence: treat as ordinary content
    content
}

fn find_h1(lines: &[&str]) -> Option<String> {
    lines.iter().find_map(|line| {
        H1_HEADING
            .captures(line.trim_end())
            .map(|caps| caps[1].trim().to_string())
    })
}

fn find_underlined(lines: &[&str]) -> Option<String> {
    lines.windows(2).find_map(|pair| {
        let text = pair[0].trim();
        if !text.is_empty() && !text.starts_with('#') && is_underline(pair[1], '=') {
            Some(text.to_string())
        } else {
            None
        }
    })
}

fn is_underline(line: &str, marker: char) -> bool {
    let trimmed = line.trim();
    !trimmed.is_empty() && trimmed.chars().all(|c| c == marker)
}

fn describe(lines: &[&str]) -> Option<String> {
    let mut kept: Vec<&str> = Vec::with_capacity(lines.len());

    for (i, line) in lines.iter().enumerate() {
        if ANY_HEADING.is_match(line.trim_start()) {
            continue;
        }
        if is_underline(line, '=') || is_underline(line, '-') {
            continue;
        }
        let next_is_underline = lines
            .get(i + 1)
            .map(|next| is_underline(next, '=') || is_underline(next, '-'))
            .unwrap_or(false);
        if next_is_underline && !line.trim().is_empty() {
            continue;
        }
        kept.push(line);
    }

    let collapsed = kept
        .iter()
        .flat_map(|line| line.split_whitespace())
        .collect::<Vec<_>>()
        .join(" ");

    if collapsed.is_empty() {
        None
    } else {
        Some(truncate_at_word(&collapsed, MAX_DESCRIPTION_CHARS))
    }
}

fn truncate_at_word(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }

    let cut = text
        .char_indices()
        .nth(max_chars)
        .map(|(idx, _)| idx)
        .unwrap_or(text.len());
    let head = &text[..cut];

    // Back off to the last word boundary unless the cut already sits on one
    let head = if text[cut..].starts_with(' ') {
        head
    } else {
        match head.rfind(' ') {
            Some(space) => &head[..space],
            None => head,
        }
    };

    format!("{}...", head.trim_end())
}
