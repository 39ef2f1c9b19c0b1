//! Markdown codec for file skeletons, plus index (table of contents) upkeep.

use crate::md_lexer::{lex, parse_inlines, Inline, Token};
use crate::skeleton::{FileSkeleton, Skeleton};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt::Write as _;

/// Heading depth of a signature line, shared by encoder and decoder.
pub const SIGNATURE_DEPTH: u8 = 3;

const FRONT_MATTER_KEY: &str = "description: >-";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedDoc {
    pub filename: String,
    pub content: String,
}

impl RenderedDoc {
    pub fn decode(&self) -> FileSkeleton {
        decode(&self.content)
    }
}

// ---------------------------------------------------------------------------
// Encode
// ---------------------------------------------------------------------------

/// Renders `file` as Markdown.
///
/// Empty docs are omitted, so they come back as `None`.
pub fn encode(file: &FileSkeleton) -> String {
    let mut out = String::new();

    if let Some(top) = &file.top_comment {
        let _ = write!(out, "---\n{FRONT_MATTER_KEY}\n{top}\n---\n\n");
    }
    if let Some(name) = &file.filename {
        let _ = write!(out, "# {name}\n\n");
    }

    let hashes = "#".repeat(SIGNATURE_DEPTH as usize);
    for skeleton in &file.skeletons {
        let url = skeleton.url.as_deref().unwrap_or("");
        let _ = write!(out, "{hashes} [{}]({url})\n\n", skeleton.signature);
        if let Some(doc) = skeleton.doc.as_deref().filter(|d| !d.trim().is_empty()) {
            let _ = write!(out, "{doc}\n\n");
        }
    }

    let trimmed = out.trim_end_matches('\n').len();
    out.truncate(trimmed);
    out.push('\n');
    out
}

/// Where the doc for `filename` is stored: `<namespace>/<filename>.md`.
pub fn target_filename(namespace: &str, filename: &str) -> String {
    let namespace = namespace.trim_matches('/');
    let filename = filename.trim_start_matches("./").trim_start_matches('/');
    if namespace.is_empty() {
        format!("{filename}.md")
    } else {
        format!("{namespace}/{filename}.md")
    }
}

/// Encodes `file` under its target filename. Files without a name have no
/// target and yield `None`.
pub fn render(file: &FileSkeleton, namespace: &str) -> Option<RenderedDoc> {
    let name = file.filename.as_deref()?;
    Some(RenderedDoc {
        filename: target_filename(namespace, name),
        content: encode(file),
    })
}

// ---------------------------------------------------------------------------
// Decode
// ---------------------------------------------------------------------------

/// Recovers a skeleton from Markdown produced by [`encode`].
///
/// Anything that does not fit the encoder's layout is skipped. Line ranges
/// and raw comments are not recoverable.
pub fn decode(content: &str) -> FileSkeleton {
    let tokens = lex(content);

    let filename = tokens.iter().find_map(|t| match t {
        Token::Heading { depth: 1, text, .. } => Some(text.clone()),
        _ => None,
    });

    let mut skeletons = Vec::new();
    let mut iter = tokens.iter().peekable();
    while let Some(token) = iter.next() {
        let Some((signature, href)) = signature_heading(token) else { continue };
        // A doc spans every paragraph up to the next non-paragraph block.
        let mut paragraphs = Vec::new();
        while let Some(Token::Paragraph { text }) = iter.next_if(|t| matches!(t, Token::Paragraph { .. })) {
            paragraphs.push(text.as_str());
        }
        let doc = (!paragraphs.is_empty()).then(|| paragraphs.join("\n\n"));
        skeletons.push(Skeleton {
            signature: signature.to_string(),
            url: (!href.is_empty()).then(|| href.to_string()),
            doc,
            ..Skeleton::default()
        });
    }

    FileSkeleton {
        filename,
        top_comment: top_comment(&tokens),
        skeletons,
    }
}

/// `(link text, link target)` when `token` is a signature heading.
fn signature_heading(token: &Token) -> Option<(&str, &str)> {
    match token {
        Token::Heading { depth, inlines, .. } if *depth == SIGNATURE_DEPTH => match inlines.first()? {
            Inline::Link { text, href } => Some((text.as_str(), href.as_str())),
            Inline::Text(_) => None,
        },
        _ => None,
    }
}

/// Reads the front matter written by [`encode`]; nothing else is YAML-parsed.
fn top_comment(tokens: &[Token]) -> Option<String> {
    if tokens.first() != Some(&Token::ThematicBreak) {
        return None;
    }
    let text = tokens.get(1)?.text()?;
    if text == FRONT_MATTER_KEY {
        // An empty description leaves the key alone in its paragraph.
        return Some(String::new());
    }
    text.strip_prefix(FRONT_MATTER_KEY)?
        .strip_prefix('\n')
        .map(str::to_string)
}

// ---------------------------------------------------------------------------
// Index
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct IndexSettings<'a> {
    /// Filename of the index document (`SUMMARY.md`).
    pub file: &'a str,
    /// Section header written once before the first generated entry.
    pub sentinel: &'a str,
    /// Namespace the docs were rendered under; stripped for display names.
    pub namespace: &'a str,
}

/// Appends one bullet per doc to `existing`, adding the sentinel header first
/// when it is not there yet.
///
/// Append-only: listing a doc twice produces two bullets. Filter with
/// [`unlisted_docs`] first.
pub fn update_index(existing: &str, docs: &[RenderedDoc], settings: &IndexSettings<'_>) -> RenderedDoc {
    let mut content = existing.to_string();

    if !content.contains(settings.sentinel) {
        if !content.is_empty() {
            let trimmed = content.trim_end_matches('\n').len();
            content.truncate(trimmed);
            content.push_str("\n\n");
        }
        content.push_str(settings.sentinel);
        content.push_str("\n\n");
    } else if !content.is_empty() && !content.ends_with('\n') {
        content.push('\n');
    }

    for doc in docs {
        let _ = writeln!(content, "* [{}]({})", display_name(&doc.filename, settings.namespace), doc.filename);
    }

    RenderedDoc {
        filename: settings.file.to_string(),
        content,
    }
}

/// The original source filename behind a rendered doc name.
fn display_name<'a>(rendered: &'a str, namespace: &str) -> &'a str {
    let name = rendered.strip_suffix(".md").unwrap_or(rendered);
    let namespace = namespace.trim_matches('/');
    if namespace.is_empty() {
        return name;
    }
    name.strip_prefix(namespace)
        .and_then(|rest| rest.strip_prefix('/'))
        .unwrap_or(name)
}

/// Docs not yet linked from a list item in `existing`, first occurrence only.
pub fn unlisted_docs<'d>(existing: &str, docs: &'d [RenderedDoc]) -> Vec<&'d RenderedDoc> {
    let mut listed: HashSet<String> = lex(existing)
        .into_iter()
        .filter_map(|t| match t {
            Token::List { items } => Some(items),
            _ => None,
        })
        .flatten()
        .flat_map(|item| parse_inlines(&item))
        .filter_map(|inline| match inline {
            Inline::Link { href, .. } => Some(href),
            Inline::Text(_) => None,
        })
        .collect();

    docs.iter()
        .filter(|doc| listed.insert(doc.filename.clone()))
        .collect()
}
