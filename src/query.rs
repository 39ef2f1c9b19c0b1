//! Language-independent search and match primitives over [`SyntaxNode`]s.
//!
//! Everything here is pure: no shared state, no I/O, no allocation beyond the
//! returned collections.

use crate::tree::SyntaxNode;
use std::ops::Range;

/// True iff `node` is present and its kind is one of `kinds`.
pub fn has_kind(node: Option<SyntaxNode<'_>>, kinds: &[&str]) -> bool {
    node.is_some_and(|n| kinds.contains(&n.kind()))
}

pub fn first_child_of_kind<'t>(node: SyntaxNode<'t>, kinds: &[&str]) -> Option<SyntaxNode<'t>> {
    node.children().find(|c| kinds.contains(&c.kind()))
}

pub fn all_children_of_kind<'t>(node: SyntaxNode<'t>, kinds: &[&str]) -> Vec<SyntaxNode<'t>> {
    node.children().filter(|c| kinds.contains(&c.kind())).collect()
}

/// Text of the first matching child, or `""`.
pub fn child_value_of_kind<'t>(node: SyntaxNode<'t>, kinds: &[&str]) -> &'t str {
    first_child_of_kind(node, kinds).map_or("", |c| c.text())
}

/// Sibling immediately following the first child matching `kinds`.
///
/// Returns `None` when nothing matches or the match is the last child.
pub fn child_after_kind<'t>(node: SyntaxNode<'t>, kinds: &[&str]) -> Option<SyntaxNode<'t>> {
    let count = node.child_count();
    let idx = node.children().position(|c| kinds.contains(&c.kind()))?;
    if idx + 1 < count {
        node.child(idx + 1)
    } else {
        None
    }
}

/// Pre-order depth-first search: self, then children left to right.
pub fn first_node_with_kind<'t>(node: SyntaxNode<'t>, kind: &str) -> Option<SyntaxNode<'t>> {
    pre_order_find(node, &|n| n.kind() == kind)
}

/// Pre-order search for a node whose full text equals `text` (trimmed first).
pub fn first_node_with_text<'t>(node: SyntaxNode<'t>, text: &str) -> Option<SyntaxNode<'t>> {
    let wanted = text.trim();
    pre_order_find(node, &|n| n.text() == wanted)
}

/// Children are pushed in reverse so the leftmost is popped first.
fn pre_order_find<'t>(node: SyntaxNode<'t>, pred: &dyn Fn(SyntaxNode<'t>) -> bool) -> Option<SyntaxNode<'t>> {
    let mut stack = vec![node];
    while let Some(n) = stack.pop() {
        if pred(n) {
            return Some(n);
        }
        stack.extend(n.children().rev());
    }
    None
}

/// Every node under (and including) `root` whose kind is in `kinds`.
///
/// Uses an explicit stack, so siblings come out in reverse order relative to a
/// pre-order walk. Only membership and count are meaningful.
pub fn all_nodes_of_kind<'t>(root: SyntaxNode<'t>, kinds: &[&str]) -> Vec<SyntaxNode<'t>> {
    let mut out = Vec::new();
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if kinds.contains(&node.kind()) {
            out.push(node);
        }
        stack.extend(node.children());
    }
    out
}

/// Bounds for [`tree_contains_kind`].
#[derive(Debug, Clone, Default)]
pub struct ContainsOptions<'a> {
    /// Byte range of the declaration whose local scope is searched.
    pub root_range: Option<Range<usize>>,
    /// Subtrees rooted at one of these kinds are skipped when they fall
    /// outside `root_range`.
    pub excluded_kinds: &'a [&'a str],
}

/// Depth-first presence check for `kind` under `node`.
///
/// Returns `None` when the search was pruned everywhere it could have looked
/// (the start node itself was excluded), `Some(found)` otherwise.
pub fn tree_contains_kind(node: SyntaxNode<'_>, kind: &str, options: Option<&ContainsOptions<'_>>) -> Option<bool> {
    if is_pruned(node, options) {
        return None;
    }
    Some(contains_inner(node, kind, options))
}

fn contains_inner(node: SyntaxNode<'_>, kind: &str, options: Option<&ContainsOptions<'_>>) -> bool {
    let mut stack = vec![node];
    while let Some(n) = stack.pop() {
        if n.kind() == kind {
            return true;
        }
        stack.extend(n.children().rev().filter(|c| !is_pruned(*c, options)));
    }
    false
}

fn is_pruned(node: SyntaxNode<'_>, options: Option<&ContainsOptions<'_>>) -> bool {
    let Some(opts) = options else { return false };
    let Some(range) = opts.root_range.as_ref() else { return false };
    let outside = node.start() < range.start || node.end() > range.end;
    outside && opts.excluded_kinds.contains(&node.kind())
}

/// Exact adjacency: `b` starts one byte after `a` ends.
///
/// With exclusive ends that byte is the newline between the two, so any blank
/// line, indentation or same-line placement makes this false.
pub fn is_immediately_next_line(a: SyntaxNode<'_>, b: SyntaxNode<'_>) -> bool {
    b.start() == a.end() + 1
}

/// True when `path` can be walked from `node`; see [`match_path`].
pub fn is_node_on_path(node: SyntaxNode<'_>, path: &[&str]) -> bool {
    match_path(node, path).is_some()
}

/// Walks `path` from `node` and returns the node matched for each element.
///
/// At every step the current node is kept if its own kind is the expected tag;
/// otherwise the walk moves to the first immediate child with that kind. The
/// walk fails as soon as neither applies.
pub fn match_path<'t>(node: SyntaxNode<'t>, path: &[&str]) -> Option<Vec<SyntaxNode<'t>>> {
    let mut current = node;
    let mut chain = Vec::with_capacity(path.len());
    for &expected in path {
        if current.kind() != expected {
            current = first_child_of_kind(current, &[expected])?;
        }
        chain.push(current);
    }
    Some(chain)
}
