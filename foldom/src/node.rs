use std::sync::atomic::{AtomicU64, Ordering};

use crate::style::{Height, InlineStyle};

static NEXT_DOCUMENT: AtomicU64 = AtomicU64::new(0);

fn generate_document_id() -> u64 {
    NEXT_DOCUMENT.fetch_add(1, Ordering::Relaxed)
}

/// Handle to a node owned by a document.
///
/// Handles carry the id of the document that issued them, so a handle from
/// one document never names a node of another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    document: u64,
    index: usize,
}

impl NodeId {
    pub(crate) fn new(document: u64, index: usize) -> Self {
        Self { document, index }
    }

    pub fn document(self) -> u64 {
        self.document
    }

    pub fn index(self) -> usize {
        self.index
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "node-{}.{}", self.document, self.index)
    }
}

/// Ordered, duplicate-free class names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassList(Vec<String>);

impl ClassList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if the class was not present before.
    pub fn add(&mut self, class: &str) -> bool {
        if class.is_empty() || self.contains(class) {
            return false;
        }
        self.0.push(class.to_string());
        true
    }

    /// Returns true if the class was present.
    pub fn remove(&mut self, class: &str) -> bool {
        let before = self.0.len();
        self.0.retain(|c| c != class);
        self.0.len() != before
    }

    pub fn contains(&self, class: &str) -> bool {
        self.0.iter().any(|c| c == class)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// An element of the in-memory document.
#[derive(Debug, Clone)]
pub struct Node {
    pub tag: String,
    pub id: Option<String>,
    pub classes: ClassList,
    /// Natural height of the content (what `scrollHeight` reports when unconstrained).
    pub content_height: u32,
    pub style: InlineStyle,
    /// Inline `display: none`.
    pub display_none: bool,

    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
}

impl Node {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            id: None,
            classes: ClassList::new(),
            content_height: 0,
            style: InlineStyle::default(),
            display_none: false,
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn div() -> Self {
        Self::new("div")
    }

    pub fn button() -> Self {
        Self::new("button")
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn class(mut self, class: &str) -> Self {
        self.classes.add(class);
        self
    }

    pub fn content_height(mut self, height: u32) -> Self {
        self.content_height = height;
        self
    }

    pub fn height(mut self, height: Height) -> Self {
        self.style.height = Some(height);
        self
    }

    pub fn transition(mut self, declaration: impl Into<String>) -> Self {
        self.style.transition = Some(declaration.into());
        self
    }

    pub fn hidden(mut self, hidden: bool) -> Self {
        self.display_none = hidden;
        self
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

/// Flat storage for the nodes of one document.
#[derive(Debug)]
pub(crate) struct Arena {
    document: u64,
    nodes: Vec<Node>,
}

impl Default for Arena {
    fn default() -> Self {
        Self {
            document: generate_document_id(),
            nodes: Vec::new(),
        }
    }
}

impl Arena {
    pub fn document(&self) -> u64 {
        self.document
    }

    pub fn push(&mut self, node: Node) -> NodeId {
        self.nodes.push(node);
        NodeId::new(self.document, self.nodes.len() - 1)
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        if id.document != self.document {
            return None;
        }
        self.nodes.get(id.index)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        if id.document != self.document {
            return None;
        }
        self.nodes.get_mut(id.index)
    }

    /// The node followed by its ancestors, nearest first.
    pub fn ancestry(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.get(id).map(|_| id), move |current| {
            self.get(*current).and_then(|n| n.parent)
        })
    }
}
