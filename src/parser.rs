//! Parser collaborators: turn source text into a [`ParseResult`].

use crate::language::LanguageId;
use crate::tree::{NodeId, ParseResult, SyntaxTree};
use anyhow::{anyhow, bail, Context, Result};
use serde::Deserialize;
use tree_sitter::{Node, Parser};

/// Produces one syntax tree per (source, language) pair.
pub trait SourceParser: Send + Sync {
    fn parse(&self, source: &str, language: LanguageId) -> Result<ParseResult>;
}

/// Comment tokens lose trailing line breaks so adjacency is measured from the
/// last comment character.
fn trimmed_end(kind: &str, source: &str, start: usize, end: usize) -> usize {
    if !kind.contains("comment") {
        return end;
    }
    match source.get(start..end) {
        Some(text) => start + text.trim_end_matches(['\n', '\r']).len(),
        None => end,
    }
}

// ---------------------------------------------------------------------------
// tree-sitter
// ---------------------------------------------------------------------------

/// Built-in grammars. Dart has none; its trees come in as JSON.
#[derive(Debug, Default, Clone, Copy)]
pub struct TreeSitterParser;

impl TreeSitterParser {
    pub fn new() -> Self {
        Self
    }

    pub fn supports(language: LanguageId) -> bool {
        grammar(language).is_ok()
    }
}

fn grammar(language: LanguageId) -> Result<tree_sitter::Language> {
    let lang: tree_sitter::Language = match language {
        LanguageId::Rust => tree_sitter_rust::LANGUAGE.into(),
        LanguageId::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
        LanguageId::Tsx => tree_sitter_typescript::LANGUAGE_TSX.into(),
        LanguageId::JavaScript => tree_sitter_javascript::LANGUAGE.into(),
        #[cfg(feature = "lang-go")]
        LanguageId::Go => tree_sitter_go::LANGUAGE.into(),
        #[cfg(feature = "lang-ruby")]
        LanguageId::Ruby => tree_sitter_ruby::LANGUAGE.into(),
        #[cfg(feature = "lang-csharp")]
        LanguageId::CSharp => tree_sitter_c_sharp::LANGUAGE.into(),
        #[cfg(feature = "lang-php")]
        LanguageId::Php => tree_sitter_php::LANGUAGE_PHP.into(),
        #[allow(unreachable_patterns)]
        other => bail!("no built-in grammar for {other}; supply the tree as JSON instead"),
    };
    Ok(lang)
}

impl SourceParser for TreeSitterParser {
    fn parse(&self, source: &str, language: LanguageId) -> Result<ParseResult> {
        let grammar = grammar(language)?;
        let mut parser = Parser::new();
        parser
            .set_language(&grammar)
            .with_context(|| format!("Failed to set tree-sitter language for {language}"))?;
        let tree = parser
            .parse(source, None)
            .ok_or_else(|| anyhow!("tree-sitter returned no tree for {language}"))?;
        let root = tree.root_node();
        let converted = convert_tree_sitter(root, source);
        Ok(ParseResult {
            has_error: root.has_error() || converted.contains_error(),
            tree: converted,
        })
    }
}

/// Copies every node (named and anonymous) into the arena.
fn convert_tree_sitter(root: Node<'_>, source: &str) -> SyntaxTree {
    let mut tree = SyntaxTree::with_root(source, root.kind(), root.start_byte(), root.end_byte(), root.is_error());
    let mut stack = vec![(root, tree.root().id())];

    while let Some((node, id)) = stack.pop() {
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            let kind = child.kind();
            let start = child.start_byte();
            let end = trimmed_end(kind, source, start, child.end_byte());
            let child_id = tree.push_child(id, kind, start, end, child.is_error() || child.is_missing());
            stack.push((child, child_id));
        }
    }

    tree
}

// ---------------------------------------------------------------------------
// JSON wire format
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireParse {
    #[serde(default)]
    has_error: bool,
    root_node: WireNode,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireNode {
    #[serde(rename = "type")]
    kind: String,
    start_index: usize,
    end_index: usize,
    #[serde(default)]
    is_error: bool,
    #[serde(default)]
    children: Vec<WireNode>,
}

/// Reads a parse tree serialized by an external parser service:
/// `{ "hasError", "rootNode": { "type", "startIndex", "endIndex", "isError", "children" } }`.
///
/// Indices are byte offsets into `source`.
pub fn parse_json_tree(source: &str, json: &str) -> Result<ParseResult> {
    let wire: WireParse = serde_json::from_str(json).context("Failed to parse JSON syntax tree")?;
    let root = &wire.root_node;
    if root.start_index > root.end_index || root.end_index > source.len() {
        bail!(
            "root node extent {}..{} does not fit a source of {} bytes",
            root.start_index,
            root.end_index,
            source.len()
        );
    }

    let mut tree = SyntaxTree::with_root(source, &root.kind, root.start_index, root.end_index, root.is_error);
    let mut stack: Vec<(&WireNode, NodeId)> = vec![(root, tree.root().id())];
    while let Some((node, id)) = stack.pop() {
        for child in &node.children {
            let end = trimmed_end(&child.kind, source, child.start_index, child.end_index);
            let child_id = tree.push_child(id, &child.kind, child.start_index, end, child.is_error);
            stack.push((child, child_id));
        }
    }

    Ok(ParseResult {
        has_error: wire.has_error || tree.contains_error(),
        tree,
    })
}

/// Parses with the JSON tree when one is given, otherwise with `parser`.
pub fn parse_with(parser: &dyn SourceParser, source: &str, language: LanguageId, json_tree: Option<&str>) -> Result<ParseResult> {
    match json_tree {
        Some(json) => parse_json_tree(source, json),
        None => parser.parse(source, language),
    }
}
