//! Syntax tree model shared by every other component.
//!
//! Trees are arenas: nodes live in one `Vec` and refer to their children by
//! [`NodeId`]. A tree is written once (by a parser collaborator or a
//! [`TreeBuilder`]) and only read afterwards.
//!
//! Offsets are byte offsets into [`SyntaxTree::source`]; `end` is exclusive.

use anyhow::{anyhow, bail, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone)]
struct NodeData {
    kind: String,
    start: usize,
    end: usize,
    is_error: bool,
    children: Vec<NodeId>,
}

#[derive(Debug, Clone)]
pub struct SyntaxTree {
    source: String,
    nodes: Vec<NodeData>,
}

impl SyntaxTree {
    /// Creates a tree holding only its root node.
    pub fn with_root(source: impl Into<String>, kind: &str, start: usize, end: usize, is_error: bool) -> Self {
        let mut tree = Self {
            source: source.into(),
            nodes: Vec::new(),
        };
        tree.alloc(kind, start, end, is_error);
        tree
    }

    /// Appends a child to `parent`; children keep insertion order.
    ///
    /// Extents are clamped to the source so [`SyntaxNode::text`] never panics.
    pub fn push_child(&mut self, parent: NodeId, kind: &str, start: usize, end: usize, is_error: bool) -> NodeId {
        let id = self.alloc(kind, start, end, is_error);
        self.nodes[parent.index()].children.push(id);
        id
    }

    fn alloc(&mut self, kind: &str, start: usize, end: usize, is_error: bool) -> NodeId {
        let len = self.source.len();
        let end = end.min(len);
        let start = start.min(end);
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(NodeData {
            kind: kind.to_string(),
            start,
            end,
            is_error,
            children: Vec::new(),
        });
        id
    }

    fn set_extent(&mut self, id: NodeId, start: usize, end: usize) {
        let len = self.source.len();
        let node = &mut self.nodes[id.index()];
        node.end = end.min(len);
        node.start = start.min(node.end);
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn root(&self) -> SyntaxNode<'_> {
        SyntaxNode {
            tree: self,
            id: NodeId(0),
        }
    }

    pub fn node(&self, id: NodeId) -> Option<SyntaxNode<'_>> {
        (id.index() < self.nodes.len()).then_some(SyntaxNode { tree: self, id })
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// True when any node in the tree carries the error flag.
    pub fn contains_error(&self) -> bool {
        self.nodes.iter().any(|n| n.is_error)
    }
}

/// Cheap, copyable handle to one node of a [`SyntaxTree`].
#[derive(Clone, Copy)]
pub struct SyntaxNode<'t> {
    tree: &'t SyntaxTree,
    id: NodeId,
}

impl<'t> SyntaxNode<'t> {
    fn data(&self) -> &'t NodeData {
        &self.tree.nodes[self.id.index()]
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn tree(&self) -> &'t SyntaxTree {
        self.tree
    }

    pub fn kind(&self) -> &'t str {
        &self.data().kind
    }

    /// Raw source slice covered by this node.
    pub fn text(&self) -> &'t str {
        let d = self.data();
        self.tree.source.get(d.start..d.end).unwrap_or("")
    }

    pub fn start(&self) -> usize {
        self.data().start
    }

    pub fn end(&self) -> usize {
        self.data().end
    }

    pub fn is_error(&self) -> bool {
        self.data().is_error
    }

    pub fn child_count(&self) -> usize {
        self.data().children.len()
    }

    pub fn child(&self, index: usize) -> Option<SyntaxNode<'t>> {
        self.data().children.get(index).map(|&id| SyntaxNode { tree: self.tree, id })
    }

    pub fn children(&self) -> impl DoubleEndedIterator<Item = SyntaxNode<'t>> + ExactSizeIterator + 't {
        let tree = self.tree;
        self.data().children.iter().map(move |&id| SyntaxNode { tree, id })
    }
}

impl PartialEq for SyntaxNode<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.id == other.id
    }
}

impl Eq for SyntaxNode<'_> {}

impl std::fmt::Debug for SyntaxNode<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}..{}", self.kind(), self.start(), self.end())?;
        if self.is_error() {
            f.write_str(" (error)")?;
        }
        Ok(())
    }
}

/// Output of the parser collaborator for one (source, language) pair.
#[derive(Debug, Clone)]
pub struct ParseResult {
    pub has_error: bool,
    pub tree: SyntaxTree,
}

impl ParseResult {
    pub fn new(tree: SyntaxTree) -> Self {
        Self {
            has_error: tree.contains_error(),
            tree,
        }
    }

    pub fn root(&self) -> SyntaxNode<'_> {
        self.tree.root()
    }

    pub fn source(&self) -> &str {
        self.tree.source()
    }
}

/// Sequential builder for hand-written trees.
///
/// Leaves are located by searching for their text after the previous leaf, so
/// an outline of `open`/`leaf`/`close` calls is enough to reproduce real parser
/// output. An interior node spans its first to last child; the outermost node
/// spans the whole source.
///
/// ```ignore
/// let tree = TreeBuilder::new("// hi\nfn a() {}")
///     .open("source_file")
///     .leaf("line_comment", "// hi")
///     .open("function_item")
///     .leaf("fn", "fn")
///     .leaf("identifier", "a")
///     .leaf("parameters", "()")
///     .leaf("block", "{}")
///     .close()
///     .close()
///     .finish()?;
/// ```
pub struct TreeBuilder {
    tree: Option<SyntaxTree>,
    source: String,
    stack: Vec<NodeId>,
    cursor: usize,
    closed_root: bool,
    failure: Option<String>,
}

impl TreeBuilder {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            tree: None,
            source: source.into(),
            stack: Vec::new(),
            cursor: 0,
            closed_root: false,
            failure: None,
        }
    }

    fn fail(&mut self, msg: String) {
        if self.failure.is_none() {
            self.failure = Some(msg);
        }
    }

    fn attach(&mut self, kind: &str, start: usize, end: usize) -> Option<NodeId> {
        if self.closed_root {
            self.fail(format!("node `{kind}` added after the root was closed"));
            return None;
        }
        let parent = self.stack.last().copied();
        match parent {
            Some(parent) => self
                .tree
                .as_mut()
                .map(|tree| tree.push_child(parent, kind, start, end, false)),
            None if self.tree.is_none() => {
                self.tree = Some(SyntaxTree::with_root(self.source.clone(), kind, start, end, false));
                Some(NodeId(0))
            }
            None => {
                self.fail(format!("node `{kind}` has no open parent"));
                None
            }
        }
    }

    pub fn open(mut self, kind: &str) -> Self {
        let at = self.cursor;
        if let Some(id) = self.attach(kind, at, at) {
            self.stack.push(id);
        }
        self
    }

    /// Adds a leaf whose text is the next occurrence of `text` after the cursor.
    pub fn leaf(mut self, kind: &str, text: &str) -> Self {
        let Some(pos) = self.source.get(self.cursor..).and_then(|rest| rest.find(text)) else {
            let msg = format!("leaf `{kind}` text {text:?} not found after byte {}", self.cursor);
            self.fail(msg);
            return self;
        };
        let start = self.cursor + pos;
        let end = start + text.len();
        self.cursor = end;
        self.attach(kind, start, end);
        self
    }

    /// Adds a leaf with an explicit extent.
    pub fn leaf_at(mut self, kind: &str, start: usize, end: usize) -> Self {
        self.cursor = self.cursor.max(end);
        self.attach(kind, start, end);
        self
    }

    /// Flags the innermost open node as an error node.
    pub fn error(mut self) -> Self {
        if let (Some(tree), Some(&id)) = (self.tree.as_mut(), self.stack.last()) {
            tree.nodes[id.index()].is_error = true;
        }
        self
    }

    pub fn close(mut self) -> Self {
        let Some(id) = self.stack.pop() else {
            self.fail("close() without a matching open()".to_string());
            return self;
        };
        let Some(tree) = self.tree.as_mut() else {
            return self;
        };
        if self.stack.is_empty() {
            let len = tree.source.len();
            tree.set_extent(id, 0, len);
            self.closed_root = true;
            return self;
        }
        let extent = {
            let node = &tree.nodes[id.index()];
            match (node.children.first(), node.children.last()) {
                (Some(first), Some(last)) => Some((tree.nodes[first.index()].start, tree.nodes[last.index()].end)),
                _ => None,
            }
        };
        let (start, end) = extent.unwrap_or((self.cursor, self.cursor));
        tree.set_extent(id, start, end);
        self
    }

    pub fn finish(self) -> Result<SyntaxTree> {
        if let Some(msg) = self.failure {
            bail!("invalid tree outline: {msg}");
        }
        if !self.stack.is_empty() {
            bail!("invalid tree outline: {} node(s) left open", self.stack.len());
        }
        self.tree.ok_or_else(|| anyhow!("invalid tree outline: no nodes"))
    }
}
