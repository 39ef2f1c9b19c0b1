//! Minimal Markdown tokenizer.
//!
//! Covers the block structure the decoder needs: thematic breaks, ATX and
//! setext headings, fenced code, bullet/ordered lists and paragraphs. Inline
//! parsing only distinguishes links from plain text.

use regex::Regex;
use std::sync::OnceLock;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inline {
    Text(String),
    Link { text: String, href: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    ThematicBreak,
    Heading { depth: u8, text: String, inlines: Vec<Inline> },
    Paragraph { text: String },
    Code { info: String, text: String },
    List { items: Vec<String> },
}

impl Token {
    /// Raw text of headings, paragraphs and code blocks.
    pub fn text(&self) -> Option<&str> {
        match self {
            Token::Heading { text, .. } | Token::Paragraph { text } | Token::Code { text, .. } => Some(text.as_str()),
            Token::ThematicBreak | Token::List { .. } => None,
        }
    }
}

fn thematic_break() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^ {0,3}(?:(?:-[ \t]*){3,}|(?:\*[ \t]*){3,}|(?:_[ \t]*){3,})$").unwrap())
}

fn atx_heading() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^ {0,3}(#{1,6})(?:[ \t]+(.*?))?[ \t]*$").unwrap())
}

fn setext_underline() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^ {0,3}(=+|-+)[ \t]*$").unwrap())
}

fn list_item() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^ {0,3}(?:[-*+]|\d{1,9}[.)])(?:[ \t]+(.*))?$").unwrap())
}

fn code_fence() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^ {0,3}(`{3,}|~{3,})[ \t]*([^`]*?)[ \t]*$").unwrap())
}

enum Open {
    None,
    Paragraph(Vec<String>),
    List { items: Vec<String>, after_blank: bool },
}

struct Lexer {
    tokens: Vec<Token>,
    open: Open,
}

impl Lexer {
    fn flush(&mut self) {
        match std::mem::replace(&mut self.open, Open::None) {
            Open::None => {}
            Open::Paragraph(lines) => self.tokens.push(Token::Paragraph { text: lines.join("\n") }),
            Open::List { items, .. } => self.tokens.push(Token::List { items }),
        }
    }

    fn push(&mut self, token: Token) {
        self.flush();
        self.tokens.push(token);
    }
}

/// Splits `input` into block tokens. Blank lines produce no token.
pub fn lex(input: &str) -> Vec<Token> {
    let mut lx = Lexer {
        tokens: Vec::new(),
        open: Open::None,
    };
    let mut lines = input.lines();

    while let Some(line) = lines.next() {
        if line.trim().is_empty() {
            match &mut lx.open {
                Open::List { after_blank, .. } => *after_blank = true,
                _ => lx.flush(),
            }
            continue;
        }

        if let Some(caps) = code_fence().captures(line) {
            let fence = caps.get(1).map_or("```", |m| m.as_str());
            let info = caps.get(2).map_or("", |m| m.as_str()).to_string();
            let mut body = Vec::new();
            for inner in lines.by_ref() {
                let t = inner.trim();
                if t.starts_with(fence) && t.trim_start_matches(fence.chars().next().unwrap_or('`')).is_empty() {
                    break;
                }
                body.push(inner);
            }
            lx.push(Token::Code {
                info,
                text: body.join("\n"),
            });
            continue;
        }

        if let Open::Paragraph(para) = &lx.open {
            if let Some(caps) = setext_underline().captures(line) {
                let depth = if caps[1].starts_with('=') { 1 } else { 2 };
                let text = para.join("\n");
                lx.open = Open::None;
                let inlines = parse_inlines(&text);
                lx.tokens.push(Token::Heading { depth, text, inlines });
                continue;
            }
        }

        if thematic_break().is_match(line) {
            lx.push(Token::ThematicBreak);
            continue;
        }

        if let Some(caps) = atx_heading().captures(line) {
            let depth = caps[1].len() as u8;
            let text = strip_closing_hashes(caps.get(2).map_or("", |m| m.as_str())).to_string();
            let inlines = parse_inlines(&text);
            lx.push(Token::Heading { depth, text, inlines });
            continue;
        }

        if let Some(caps) = list_item().captures(line) {
            let item = caps.get(1).map_or("", |m| m.as_str()).trim().to_string();
            match &mut lx.open {
                Open::List { items, after_blank } => {
                    items.push(item);
                    *after_blank = false;
                }
                _ => {
                    lx.flush();
                    lx.open = Open::List {
                        items: vec![item],
                        after_blank: false,
                    };
                }
            }
            continue;
        }

        match &mut lx.open {
            Open::List { items, after_blank } if !*after_blank || line.starts_with([' ', '\t']) => {
                if let Some(last) = items.last_mut() {
                    last.push('\n');
                    last.push_str(line.trim());
                }
                *after_blank = false;
            }
            Open::Paragraph(para) => para.push(line.trim().to_string()),
            _ => {
                lx.flush();
                lx.open = Open::Paragraph(vec![line.trim().to_string()]);
            }
        }
    }

    lx.flush();
    lx.tokens
}

fn strip_closing_hashes(text: &str) -> &str {
    let trimmed = text.trim_end_matches('#');
    if trimmed.len() == text.len() {
        return text;
    }
    // `# Foo#` keeps its hash; only a space-separated run closes the heading.
    if trimmed.is_empty() || trimmed.ends_with([' ', '\t']) {
        trimmed.trim_end()
    } else {
        text
    }
}

/// Splits inline text into links and plain text runs.
///
/// Brackets in the link text and parentheses in the target may nest.
/// Backslash escapes are honored when looking for the closing delimiters.
pub fn parse_inlines(text: &str) -> Vec<Inline> {
    let mut out = Vec::new();
    let mut plain = String::new();
    let mut rest = text;

    while let Some(open) = rest.find('[') {
        plain.push_str(&rest[..open]);
        let after_open = &rest[open + 1..];
        let link = find_closing(after_open, '[', ']').and_then(|close| {
            let target = after_open[close + 1..].strip_prefix('(')?;
            let end = find_closing(target, '(', ')')?;
            let consumed = open + 1 + close + 1 + 1 + end + 1;
            Some((&after_open[..close], &target[..end], consumed))
        });
        match link {
            Some((label, href, consumed)) => {
                if !plain.is_empty() {
                    out.push(Inline::Text(std::mem::take(&mut plain)));
                }
                let href = href.trim();
                let href = href.strip_prefix('<').and_then(|h| h.strip_suffix('>')).unwrap_or(href);
                out.push(Inline::Link {
                    text: label.to_string(),
                    href: href.to_string(),
                });
                rest = &rest[consumed..];
            }
            None => {
                plain.push('[');
                rest = after_open;
            }
        }
    }

    plain.push_str(rest);
    if !plain.is_empty() {
        out.push(Inline::Text(plain));
    }
    out
}

/// Byte offset of the `close` that balances an already consumed `open`.
fn find_closing(text: &str, open: char, close: char) -> Option<usize> {
    let mut depth = 0usize;
    let mut escaped = false;
    for (i, c) in text.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        if c == '\\' {
            escaped = true;
        } else if c == open {
            depth += 1;
        } else if c == close {
            if depth == 0 {
                return Some(i);
            }
            depth -= 1;
        }
    }
    None
}
