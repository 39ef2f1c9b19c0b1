//! Per-language comment dialects.
//!
//! Each dialect turns a raw comment token into its semantic text, or reports
//! that the node is not a comment it recognizes.

use crate::language::LanguageId;
use crate::tree::SyntaxNode;

const GENERIC_COMMENT_KINDS: &[&str] = &["comment", "block_comment"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentDialect {
    /// `//` line comments only (Go, Rust). Holds the language's comment kind.
    LineSlash(&'static str),
    /// `#` line comments.
    Hash,
    /// `///` documentation comments, plain comments via the block/line splitter.
    Dart,
    /// `#`, `//` and `/* */`, all under one comment kind.
    Php,
    /// Block/line splitter (C#, JavaScript, TypeScript).
    Generic,
}

impl CommentDialect {
    pub fn for_language(language: LanguageId) -> Self {
        match language {
            LanguageId::Go => Self::LineSlash("comment"),
            LanguageId::Rust => Self::LineSlash("line_comment"),
            LanguageId::Ruby => Self::Hash,
            LanguageId::Dart => Self::Dart,
            LanguageId::Php => Self::Php,
            LanguageId::CSharp | LanguageId::JavaScript | LanguageId::TypeScript | LanguageId::Tsx => Self::Generic,
        }
    }

    pub fn extract_comment(&self, node: SyntaxNode<'_>) -> Option<String> {
        self.extract(node.kind(), node.text())
    }

    /// Same as [`CommentDialect::extract_comment`] for a detached token.
    pub fn extract(&self, kind: &str, text: &str) -> Option<String> {
        match *self {
            Self::LineSlash(comment_kind) => {
                if kind != comment_kind {
                    return None;
                }
                text.strip_prefix("//").map(|rest| rest.trim().to_string())
            }
            Self::Hash => (kind == "comment").then(|| drop_chars(text, 1, 0).trim().to_string()),
            Self::Dart => match kind {
                "documentation_comment" if !text.starts_with("/*") => Some(drop_chars(text, 3, 0).trim().to_string()),
                "documentation_comment" | "comment" => first_fragment(text),
                _ => None,
            },
            Self::Php => {
                if !GENERIC_COMMENT_KINDS.contains(&kind) {
                    return None;
                }
                let body = if text.starts_with('#') {
                    drop_chars(text, 1, 0)
                } else if text.starts_with("//") {
                    drop_chars(text, 2, 0)
                } else if text.starts_with("/*") {
                    drop_chars(text, 2, 2)
                } else {
                    return None;
                };
                Some(body.trim().to_string())
            }
            Self::Generic => {
                if !GENERIC_COMMENT_KINDS.contains(&kind) {
                    return None;
                }
                first_fragment(text)
            }
        }
    }
}

/// Convenience for [`CommentDialect::for_language`] + `extract_comment`.
pub fn extract_comment(language: LanguageId, node: SyntaxNode<'_>) -> Option<String> {
    CommentDialect::for_language(language).extract_comment(node)
}

fn first_fragment(text: &str) -> Option<String> {
    scan_comment_fragments(text)
        .into_iter()
        .next()
        .map(|f| f.text.trim().to_string())
}

/// Drops `front` chars from the start and `back` chars from the end.
fn drop_chars(text: &str, front: usize, back: usize) -> &str {
    let start = text.char_indices().nth(front).map_or(text.len(), |(i, _)| i);
    let rest = &text[start..];
    if back == 0 {
        return rest;
    }
    let end = rest.char_indices().rev().nth(back - 1).map_or(0, |(i, _)| i);
    &rest[..end]
}

// ---------------------------------------------------------------------------
// Comment fragment scanner
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FragmentStyle {
    Line,
    Block,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentFragment {
    pub style: FragmentStyle,
    /// Byte range of the whole fragment, delimiters included.
    pub start: usize,
    pub end: usize,
    /// Content with delimiters (and JSDoc `*` gutters) removed. Not trimmed.
    pub text: String,
}

/// Splits `input` into `//…` and `/*…*/` fragments, in source order.
///
/// Inside a block comment, `//` and further `/*` are content; inside a line
/// comment, `/*` is content. An unterminated block runs to the end of input.
pub fn scan_comment_fragments(input: &str) -> Vec<CommentFragment> {
    let bytes = input.as_bytes();
    let mut out = Vec::new();
    let mut i = 0;

    while i + 1 < bytes.len() {
        if bytes[i] != b'/' {
            i += 1;
            continue;
        }
        match bytes[i + 1] {
            b'/' => {
                let body_start = i + 2;
                let end = input[body_start..].find('\n').map_or(input.len(), |p| body_start + p);
                out.push(CommentFragment {
                    style: FragmentStyle::Line,
                    start: i,
                    end,
                    text: input[body_start..end].trim_end_matches('\r').to_string(),
                });
                i = end;
            }
            b'*' => {
                let body_start = i + 2;
                let (body_end, end) = match input[body_start..].find("*/") {
                    Some(p) => (body_start + p, body_start + p + 2),
                    None => (input.len(), input.len()),
                };
                out.push(CommentFragment {
                    style: FragmentStyle::Block,
                    start: i,
                    end,
                    text: strip_block_gutter(&input[body_start..body_end]),
                });
                i = end;
            }
            _ => i += 1,
        }
    }

    out
}

/// Removes the JSDoc opening `*` run and the leading `*` on continuation lines.
fn strip_block_gutter(body: &str) -> String {
    let body = body.trim_start_matches('*');
    let mut lines = Vec::new();
    for (idx, line) in body.lines().enumerate() {
        if idx == 0 {
            lines.push(line);
            continue;
        }
        let t = line.trim_start();
        match t.strip_prefix('*') {
            Some(rest) => lines.push(rest.strip_prefix(' ').unwrap_or(rest)),
            None => lines.push(line),
        }
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dialect(lang: LanguageId) -> CommentDialect {
        CommentDialect::for_language(lang)
    }

    // ── line-comment dialects ─────────────────────────────────────────────

    #[test]
    fn double_slash_comment_normalizes_to_hello_everywhere() {
        let cases = [
            (LanguageId::Go, "comment"),
            (LanguageId::Rust, "line_comment"),
            (LanguageId::Php, "comment"),
            (LanguageId::Dart, "comment"),
            (LanguageId::CSharp, "comment"),
            (LanguageId::JavaScript, "comment"),
            (LanguageId::TypeScript, "comment"),
            (LanguageId::Tsx, "comment"),
        ];
        for (lang, kind) in cases {
            assert_eq!(
                dialect(lang).extract(kind, "// hello").as_deref(),
                Some("hello"),
                "{lang}"
            );
        }
    }

    #[test]
    fn line_slash_dialects_strip_exactly_two_chars() {
        let rust = dialect(LanguageId::Rust);
        assert_eq!(rust.extract("line_comment", "/// Adds one.").as_deref(), Some("/ Adds one."));
        assert_eq!(rust.extract("line_comment", "/* block */"), None);
        assert_eq!(rust.extract("block_comment", "// wrong kind"), None);
        assert_eq!(dialect(LanguageId::Go).extract("line_comment", "// x"), None);
    }

    #[test]
    fn ruby_strips_hash() {
        let ruby = dialect(LanguageId::Ruby);
        assert_eq!(ruby.extract("comment", "# note").as_deref(), Some("note"));
        assert_eq!(ruby.extract("comment", "#").as_deref(), Some(""));
        assert_eq!(ruby.extract("string", "# note"), None);
    }

    // ── dart ──────────────────────────────────────────────────────────────

    #[test]
    fn dart_documentation_comment_strips_triple_slash() {
        let dart = dialect(LanguageId::Dart);
        assert_eq!(
            dart.extract("documentation_comment", "/// Builds the widget.").as_deref(),
            Some("Builds the widget.")
        );
        assert_eq!(
            dart.extract("documentation_comment", "/** Block doc. */").as_deref(),
            Some("Block doc.")
        );
        assert_eq!(dart.extract("comment", "/* plain */").as_deref(), Some("plain"));
        assert_eq!(dart.extract("identifier", "/// nope"), None);
    }

    // ── php ───────────────────────────────────────────────────────────────

    #[test]
    fn php_handles_all_three_styles() {
        let php = dialect(LanguageId::Php);
        assert_eq!(php.extract("comment", "/* hi */").as_deref(), Some("hi"));
        assert_eq!(php.extract("comment", "# hash").as_deref(), Some("hash"));
        assert_eq!(php.extract("comment", "// slash").as_deref(), Some("slash"));
        assert_eq!(php.extract("block_comment", "/** doc */").as_deref(), Some("* doc"));
        assert_eq!(php.extract("comment", "-- sql"), None);
        assert_eq!(php.extract("text", "# hash"), None);
    }

    // ── generic splitter ──────────────────────────────────────────────────

    #[test]
    fn generic_takes_first_fragment() {
        let ts = dialect(LanguageId::TypeScript);
        assert_eq!(ts.extract("comment", "/* hi */").as_deref(), Some("hi"));
        assert_eq!(ts.extract("comment", "// one\n// two").as_deref(), Some("one"));
        assert_eq!(ts.extract("comment", "no delimiters"), None);
        assert_eq!(ts.extract("string", "// hi"), None);
    }

    #[test]
    fn generic_cleans_jsdoc_gutters() {
        let js = dialect(LanguageId::JavaScript);
        let token = "/**\n * Adds two numbers.\n * @param a first\n */";
        assert_eq!(
            js.extract("comment", token).as_deref(),
            Some("Adds two numbers.\n@param a first")
        );
    }

    #[test]
    fn scanner_splits_mixed_blob() {
        let frags = scan_comment_fragments("// a /* not block */\ncode /* b // not line */ tail /* open");
        let styles: Vec<FragmentStyle> = frags.iter().map(|f| f.style).collect();
        assert_eq!(styles, [FragmentStyle::Line, FragmentStyle::Block, FragmentStyle::Block]);
        assert_eq!(frags[0].text, " a /* not block */");
        assert_eq!(frags[1].text, " b // not line ");
        assert_eq!(frags[2].text, " open");
        assert_eq!(frags[2].end, "// a /* not block */\ncode /* b // not line */ tail /* open".len());
    }

    #[test]
    fn scanner_treats_nested_looking_open_as_content() {
        let frags = scan_comment_fragments("/* outer /* inner */");
        assert_eq!(frags.len(), 1);
        assert_eq!(frags[0].text.trim(), "outer /* inner");
    }

    #[test]
    fn drop_chars_is_char_boundary_safe() {
        assert_eq!(drop_chars("#é", 1, 0), "é");
        assert_eq!(drop_chars("/*é*/", 2, 2), "é");
        assert_eq!(drop_chars("/*", 2, 2), "");
    }
}
