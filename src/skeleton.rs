//! Skeleton builder: declarations, their doc comments and the file's top comment.

use crate::comment::CommentDialect;
use crate::language::LanguageId;
use crate::query::{is_immediately_next_line, tree_contains_kind};
use crate::shapes::{shape_table, ShapeTable};
use crate::tree::{NodeId, ParseResult, SyntaxNode};
use serde::{Deserialize, Serialize};

/// 0-indexed, inclusive line span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LineRange {
    pub start: usize,
    pub end: usize,
}

impl LineRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn overlaps(&self, other: &LineRange) -> bool {
        self.start <= other.end && other.start <= self.end
    }
}

/// One declaration: signature, attached documentation and location.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Skeleton {
    pub signature: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_range: Option<LineRange>,

    /// The comment token exactly as written.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_doc: Option<String>,

    /// The comment text after dialect normalization.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSkeleton {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_comment: Option<String>,

    #[serde(default)]
    pub skeletons: Vec<Skeleton>,
}

impl FileSkeleton {
    /// Keeps skeletons overlapping any of `ranges`. Skeletons without a line
    /// range cannot be placed and are kept.
    pub fn retain_overlapping(&mut self, ranges: &[LineRange]) {
        self.skeletons.retain(|s| match s.line_range {
            Some(r) => ranges.iter().any(|c| r.overlaps(c)),
            None => true,
        });
    }

    /// `(signature, url, doc)` triples, the part of a skeleton that survives a
    /// Markdown round trip.
    pub fn triples(&self) -> Vec<(&str, Option<&str>, Option<&str>)> {
        self.skeletons
            .iter()
            .map(|s| (s.signature.as_str(), s.url.as_deref(), s.doc.as_deref()))
            .collect()
    }
}

/// How strictly a comment must touch the declaration it documents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Adjacency {
    /// The declaration starts exactly one byte after the comment ends.
    #[default]
    Strict,
    /// Like `Strict`, but spaces and tabs may follow the newline.
    AllowIndent,
}

#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    pub adjacency: Adjacency,
}

// ---------------------------------------------------------------------------
// Line index
// ---------------------------------------------------------------------------

struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    fn new(text: &str) -> Self {
        let mut starts = vec![0];
        starts.extend(text.match_indices('\n').map(|(i, _)| i + 1));
        Self { starts }
    }

    /// Number of newlines before `offset`.
    fn line_of(&self, offset: usize) -> usize {
        self.starts.partition_point(|&s| s <= offset).saturating_sub(1)
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

pub struct SkeletonBuilder<'a> {
    dialect: CommentDialect,
    table: &'a ShapeTable,
    source: &'a str,
    lines: LineIndex,
    options: BuildOptions,
}

impl<'a> SkeletonBuilder<'a> {
    pub fn new(language: LanguageId, source: &'a str, options: BuildOptions) -> Self {
        Self::with_table(language, shape_table(language), source, options)
    }

    /// Uses a custom declaration-shape table instead of the built-in one.
    pub fn with_table(language: LanguageId, table: &'a ShapeTable, source: &'a str, options: BuildOptions) -> Self {
        Self {
            dialect: CommentDialect::for_language(language),
            table,
            source,
            lines: LineIndex::new(source),
            options,
        }
    }

    pub fn build(&self, parsed: &ParseResult, filename: Option<&str>) -> FileSkeleton {
        if parsed.has_error {
            crate::debug_log!(
                "[skeleton] {}: parse tree has errors, skeleton may be partial",
                filename.unwrap_or("<anonymous>")
            );
        }

        let root = parsed.root();
        let (top_comment, claimed) = match self.top_comment(root) {
            Some((text, node)) => (Some(text), Some(node)),
            None => (None, None),
        };

        let mut skeletons = Vec::new();
        self.walk(root, claimed, &mut skeletons);

        FileSkeleton {
            filename: filename.map(str::to_string),
            top_comment,
            skeletons,
        }
    }

    /// The leading comment of the file, unless it documents the declaration
    /// right below it.
    fn top_comment(&self, root: SyntaxNode<'_>) -> Option<(String, NodeId)> {
        let first = root.child(0)?;
        let comment = self.dialect.extract_comment(first)?;
        if let Some(second) = root.child(1) {
            if self.adjacent(first, second) && self.table.claims_leading_comment(second, Some(root)) {
                return None;
            }
        }
        Some((comment, first.id()))
    }

    /// Pre-order walk over every node below `root`. Iterative, so tree depth
    /// is bounded by memory rather than the thread stack.
    fn walk(&self, root: SyntaxNode<'_>, claimed: Option<NodeId>, out: &mut Vec<Skeleton>) {
        // (parent, next child index, previous sibling)
        let mut stack = vec![(root, 0usize, None)];
        while let Some((parent, index, before)) = stack.pop() {
            let Some(node) = parent.child(index) else { continue };
            stack.push((parent, index + 1, Some(node)));

            if let Some(m) = self.table.match_node(node, Some(parent)) {
                let signature = m.signature();
                if signature.is_empty() {
                    crate::debug_log!("[skeleton] shape `{}` matched {:?} but produced no signature", m.shape.name, node);
                } else {
                    out.push(self.skeleton_for(node, before, claimed, signature));
                }
            }
            stack.push((node, 0, None));
        }
    }

    fn skeleton_for(
        &self,
        node: SyntaxNode<'_>,
        before: Option<SyntaxNode<'_>>,
        claimed: Option<NodeId>,
        signature: String,
    ) -> Skeleton {
        if node.is_error() || tree_contains_kind(node, "ERROR", None) == Some(true) {
            crate::debug_log!("[skeleton] `{signature}` contains a syntax error");
        }

        let mut skeleton = Skeleton {
            signature,
            line_range: Some(self.line_range(node)),
            ..Skeleton::default()
        };

        let Some(before) = before else { return skeleton };
        if claimed == Some(before.id()) || !self.adjacent(before, node) {
            return skeleton;
        }
        // An empty comment (`//`) documents nothing.
        if let Some(doc) = self.dialect.extract_comment(before).filter(|d| !d.trim().is_empty()) {
            skeleton.raw_doc = Some(before.text().to_string());
            skeleton.doc = Some(doc);
        }
        skeleton
    }

    fn line_range(&self, node: SyntaxNode<'_>) -> LineRange {
        LineRange::new(self.lines.line_of(node.start()), self.lines.line_of(node.end()))
    }

    fn adjacent(&self, a: SyntaxNode<'_>, b: SyntaxNode<'_>) -> bool {
        match self.options.adjacency {
            Adjacency::Strict => is_immediately_next_line(a, b),
            Adjacency::AllowIndent => {
                let Some(gap) = self.source.get(a.end()..b.start()) else { return false };
                let rest = gap.strip_prefix("\r\n").or_else(|| gap.strip_prefix('\n'));
                rest.is_some_and(|r| r.chars().all(|c| c == ' ' || c == '\t'))
            }
        }
    }
}

/// Builds the skeleton of one parsed file with default options.
pub fn build_file_skeleton(parsed: &ParseResult, language: LanguageId, filename: Option<&str>) -> FileSkeleton {
    SkeletonBuilder::new(language, parsed.source(), BuildOptions::default()).build(parsed, filename)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::TreeBuilder;

    fn ts_file(source: &str, comment: &str) -> ParseResult {
        let tree = TreeBuilder::new(source)
            .open("program")
            .leaf("comment", comment)
            .open("function_declaration")
            .leaf("function", "function")
            .leaf("identifier", "add")
            .leaf("formal_parameters", "(a: number, b: number)")
            .leaf("type_annotation", ": number")
            .leaf("statement_block", "{ return a + b; }")
            .close()
            .close()
            .finish()
            .unwrap();
        ParseResult::new(tree)
    }

    // ── top comment ───────────────────────────────────────────────────────

    #[test]
    fn leading_comment_followed_by_blank_line_is_top_comment() {
        let src = "// Math helpers.\n\nfunction add(a: number, b: number): number { return a + b; }";
        let parsed = ts_file(src, "// Math helpers.");
        let file = build_file_skeleton(&parsed, LanguageId::TypeScript, Some("math.ts"));

        assert_eq!(file.top_comment.as_deref(), Some("Math helpers."));
        assert_eq!(file.skeletons.len(), 1);
        let add = &file.skeletons[0];
        assert_eq!(add.signature, "add(a: number, b: number): number");
        assert_eq!(add.doc, None);
        assert_eq!(add.raw_doc, None);
        assert_eq!(add.line_range, Some(LineRange::new(2, 2)));
    }

    #[test]
    fn adjacent_leading_comment_documents_the_function() {
        let src = "/** Adds. */\nfunction add(a: number, b: number): number { return a + b; }";
        let parsed = ts_file(src, "/** Adds. */");
        let file = build_file_skeleton(&parsed, LanguageId::TypeScript, None);

        assert_eq!(file.top_comment, None);
        let add = &file.skeletons[0];
        assert_eq!(add.doc.as_deref(), Some("Adds."));
        assert_eq!(add.raw_doc.as_deref(), Some("/** Adds. */"));
        assert_eq!(add.line_range, Some(LineRange::new(1, 1)));
    }

    #[test]
    fn top_comment_is_never_also_a_class_doc() {
        let src = "// Shapes.\nclass Circle {}";
        let tree = TreeBuilder::new(src)
            .open("program")
            .leaf("comment", "// Shapes.")
            .open("class_declaration")
            .leaf("class", "class")
            .leaf("type_identifier", "Circle")
            .leaf("class_body", "{}")
            .close()
            .close()
            .finish()
            .unwrap();
        let file = build_file_skeleton(&ParseResult::new(tree), LanguageId::TypeScript, None);
        assert_eq!(file.top_comment.as_deref(), Some("Shapes."));
        assert_eq!(file.skeletons[0].signature, "Circle");
        assert_eq!(file.skeletons[0].doc, None);
    }

    #[test]
    fn lone_comment_file_has_top_comment_only() {
        let tree = TreeBuilder::new("# frozen_string_literal: true")
            .open("program")
            .leaf("comment", "# frozen_string_literal: true")
            .close()
            .finish()
            .unwrap();
        let file = build_file_skeleton(&ParseResult::new(tree), LanguageId::Ruby, None);
        assert_eq!(file.top_comment.as_deref(), Some("frozen_string_literal: true"));
        assert!(file.skeletons.is_empty());
    }

    // ── walk ──────────────────────────────────────────────────────────────

    fn rust_impl() -> ParseResult {
        let src = "// Point type.\nstruct Point;\nimpl Point {\n// Origin.\nfn origin() -> Point { Point }\n\n// Detached.\n\nfn far() {}\n}";
        let tree = TreeBuilder::new(src)
            .open("source_file")
            .leaf("line_comment", "// Point type.")
            .open("struct_item")
            .leaf("struct", "struct")
            .leaf("type_identifier", "Point")
            .leaf(";", ";")
            .close()
            .open("impl_item")
            .leaf("impl", "impl")
            .leaf("type_identifier", "Point")
            .open("declaration_list")
            .leaf("{", "{")
            .leaf("line_comment", "// Origin.")
            .open("function_item")
            .leaf("fn", "fn")
            .leaf("identifier", "origin")
            .leaf("parameters", "()")
            .leaf("->", "->")
            .leaf("type_identifier", "Point")
            .leaf("block", "{ Point }")
            .close()
            .leaf("line_comment", "// Detached.")
            .open("function_item")
            .leaf("fn", "fn")
            .leaf("identifier", "far")
            .leaf("parameters", "()")
            .leaf("block", "{}")
            .close()
            .leaf("}", "}")
            .close()
            .close()
            .close()
            .finish()
            .unwrap();
        ParseResult::new(tree)
    }

    #[test]
    fn walk_emits_nested_declarations_in_pre_order() {
        let file = build_file_skeleton(&rust_impl(), LanguageId::Rust, Some("point.rs"));
        let sigs: Vec<&str> = file.skeletons.iter().map(|s| s.signature.as_str()).collect();
        assert_eq!(sigs, ["Point", "origin() -> Point", "far()"]);

        // The struct is not a function shape, so the comment stays with the file.
        assert_eq!(file.top_comment.as_deref(), Some("Point type."));
        assert_eq!(file.skeletons[0].doc, None);

        assert_eq!(file.skeletons[1].doc.as_deref(), Some("Origin."));
        assert_eq!(file.skeletons[1].line_range, Some(LineRange::new(4, 4)));
        assert_eq!(file.skeletons[2].doc, None, "blank line detaches the comment");
    }

    #[test]
    fn each_comment_documents_at_most_one_declaration() {
        let file = build_file_skeleton(&rust_impl(), LanguageId::Rust, None);
        let with_origin = file
            .skeletons
            .iter()
            .filter(|s| s.doc.as_deref() == Some("Origin."))
            .count();
        assert_eq!(with_origin, 1);
    }

    #[test]
    fn deep_nesting_is_walked_without_recursion() {
        let depth = 200_000;
        let mut builder = TreeBuilder::new("fn deep() {}").open("source_file");
        for _ in 0..depth {
            builder = builder.open("block");
        }
        builder = builder
            .open("function_item")
            .leaf("fn", "fn")
            .leaf("identifier", "deep")
            .leaf("parameters", "()")
            .leaf("block", "{}")
            .close();
        for _ in 0..depth {
            builder = builder.close();
        }
        let tree = builder.close().finish().unwrap();
        let file = build_file_skeleton(&ParseResult::new(tree), LanguageId::Rust, None);
        assert_eq!(file.triples(), vec![("deep()", None, None)]);
    }

    #[test]
    fn empty_comment_is_not_a_doc() {
        let src = "//\nfunction add(a: number, b: number): number { return a + b; }";
        let file = build_file_skeleton(&ts_file(src, "//"), LanguageId::TypeScript, None);
        let add = &file.skeletons[0];
        assert_eq!(add.doc, None);
        assert_eq!(add.raw_doc, None);
        assert_eq!(crate::markdown::decode(&crate::markdown::encode(&file)).triples(), file.triples());
    }

    #[test]
    fn allow_indent_accepts_indented_members() {
        let src = "class A {\n  // Runs.\n  run() {}\n}";
        let tree = TreeBuilder::new(src)
            .open("program")
            .open("class_declaration")
            .leaf("class", "class")
            .leaf("type_identifier", "A")
            .open("class_body")
            .leaf("{", "{")
            .leaf("comment", "// Runs.")
            .open("method_definition")
            .leaf("property_identifier", "run")
            .leaf("formal_parameters", "()")
            .leaf("statement_block", "{}")
            .close()
            .leaf("}", "}")
            .close()
            .close()
            .close()
            .finish()
            .unwrap();
        let parsed = ParseResult::new(tree);

        let strict = build_file_skeleton(&parsed, LanguageId::TypeScript, None);
        assert_eq!(strict.skeletons[1].signature, "run()");
        assert_eq!(strict.skeletons[1].doc, None);

        let options = BuildOptions {
            adjacency: Adjacency::AllowIndent,
        };
        let relaxed = SkeletonBuilder::new(LanguageId::TypeScript, parsed.source(), options).build(&parsed, None);
        assert_eq!(relaxed.skeletons[1].doc.as_deref(), Some("Runs."));
    }

    #[test]
    fn error_trees_still_yield_partial_skeletons() {
        let src = "fn ok() {}\nfn broken(";
        let tree = TreeBuilder::new(src)
            .open("source_file")
            .open("function_item")
            .leaf("fn", "fn")
            .leaf("identifier", "ok")
            .leaf("parameters", "()")
            .leaf("block", "{}")
            .close()
            .open("ERROR")
            .error()
            .leaf("fn", "fn")
            .leaf("identifier", "broken")
            .leaf("(", "(")
            .close()
            .close()
            .finish()
            .unwrap();
        let parsed = ParseResult::new(tree);
        assert!(parsed.has_error);
        let file = build_file_skeleton(&parsed, LanguageId::Rust, None);
        let sigs: Vec<&str> = file.skeletons.iter().map(|s| s.signature.as_str()).collect();
        assert_eq!(sigs, ["ok()"]);
    }

    #[test]
    fn signatures_are_never_empty() {
        // A function item with no name matches the shape but yields no signature.
        let tree = TreeBuilder::new("fn () {}")
            .open("source_file")
            .open("function_item")
            .leaf("fn", "fn")
            .leaf("parameters", "()")
            .leaf("block", "{}")
            .close()
            .close()
            .finish()
            .unwrap();
        let file = build_file_skeleton(&ParseResult::new(tree), LanguageId::Rust, None);
        assert!(file.skeletons.is_empty());
    }

    // ── helpers ───────────────────────────────────────────────────────────

    #[test]
    fn line_index_counts_newlines_before_offset() {
        let idx = LineIndex::new("a\nbc\n\nd");
        assert_eq!(idx.line_of(0), 0);
        assert_eq!(idx.line_of(1), 0);
        assert_eq!(idx.line_of(2), 1);
        assert_eq!(idx.line_of(5), 2);
        assert_eq!(idx.line_of(6), 3);
        assert_eq!(idx.line_of(100), 3);
    }

    #[test]
    fn retain_overlapping_filters_by_changed_lines() {
        let mut file = FileSkeleton {
            filename: None,
            top_comment: None,
            skeletons: vec![
                Skeleton {
                    signature: "a()".into(),
                    line_range: Some(LineRange::new(0, 4)),
                    ..Skeleton::default()
                },
                Skeleton {
                    signature: "b()".into(),
                    line_range: Some(LineRange::new(6, 9)),
                    ..Skeleton::default()
                },
                Skeleton {
                    signature: "c()".into(),
                    ..Skeleton::default()
                },
            ],
        };
        file.retain_overlapping(&[LineRange::new(4, 5)]);
        let sigs: Vec<&str> = file.skeletons.iter().map(|s| s.signature.as_str()).collect();
        assert_eq!(sigs, ["a()", "c()"]);
    }
}
