//! Tree nodes and their children.

use crate::kind::NodeKind;
use rbjs_common::SourceLocation;
use std::sync::Arc;

/// An immutable typed node with ordered children.
///
/// Cloning is cheap (children are shared). Equality is structural: kind and
/// children are compared deeply, locations are ignored.
#[derive(Clone, Debug)]
pub struct Node {
    kind: NodeKind,
    children: Arc<[Child]>,
    location: Option<SourceLocation>,
}

/// A child slot: either a nested node or a literal value.
#[derive(Clone, Debug)]
pub enum Child {
    Node(Node),
    /// Absent child (`nil` in s-expressions, `null` in JSON).
    Nil,
    Sym(Arc<str>),
    Str(Arc<str>),
    Int(i64),
    Float(f64),
}

/// Floats compare by bit pattern so a `NaN` child equals itself.
impl PartialEq for Child {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Child::Node(a), Child::Node(b)) => a == b,
            (Child::Nil, Child::Nil) => true,
            (Child::Sym(a), Child::Sym(b)) | (Child::Str(a), Child::Str(b)) => a == b,
            (Child::Int(a), Child::Int(b)) => a == b,
            (Child::Float(a), Child::Float(b)) => a.to_bits() == b.to_bits(),
            _ => false,
        }
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
            && (Arc::ptr_eq(&self.children, &other.children) || self.children == other.children)
    }
}

impl Node {
    /// Build a node. Never fails; shape is validated by whoever consumes it.
    pub fn new(kind: NodeKind, children: Vec<Child>) -> Node {
        Node {
            kind,
            children: children.into(),
            location: None,
        }
    }

    #[must_use]
    pub fn with_location(mut self, location: Option<SourceLocation>) -> Node {
        self.location = location;
        self
    }

    /// A new node of the given kind and children that keeps this node's
    /// location.
    pub fn updated(&self, kind: NodeKind, children: Vec<Child>) -> Node {
        Node::new(kind, children).with_location(self.location)
    }

    /// Same kind and location, different children.
    pub fn with_children(&self, children: Vec<Child>) -> Node {
        self.updated(self.kind.clone(), children)
    }

    /// Same children and location, different kind.
    pub fn with_kind(&self, kind: NodeKind) -> Node {
        Node {
            kind,
            children: Arc::clone(&self.children),
            location: self.location,
        }
    }

    #[inline]
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    #[inline]
    pub fn is(&self, kind: &NodeKind) -> bool {
        &self.kind == kind
    }

    #[inline]
    pub fn children(&self) -> &[Child] {
        &self.children
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.children.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    #[inline]
    pub fn location(&self) -> Option<SourceLocation> {
        self.location
    }

    pub fn child(&self, index: usize) -> Option<&Child> {
        self.children.get(index)
    }

    /// The child at `index` if it is a node.
    pub fn node_at(&self, index: usize) -> Option<&Node> {
        self.children.get(index).and_then(Child::as_node)
    }

    /// The child at `index` if it is a symbol.
    pub fn sym_at(&self, index: usize) -> Option<&str> {
        self.children.get(index).and_then(Child::as_sym)
    }

    /// The child at `index` if it is a string literal.
    pub fn str_at(&self, index: usize) -> Option<&str> {
        self.children.get(index).and_then(Child::as_str)
    }

    pub fn int_at(&self, index: usize) -> Option<i64> {
        self.children.get(index).and_then(Child::as_int)
    }

    /// `true` when the child slot is absent or `nil`.
    pub fn is_nil_at(&self, index: usize) -> bool {
        self.children.get(index).is_none_or(Child::is_nil)
    }

    /// Nested node children, in order, skipping literals and `nil`.
    pub fn child_nodes(&self) -> impl Iterator<Item = &Node> {
        self.children.iter().filter_map(Child::as_node)
    }

    /// Whether a zero-argument call site should be emitted as a call.
    ///
    /// The parser marks call sites written with explicit parentheses. A
    /// location without that mark means a bare property-style access;
    /// synthesized nodes have no location and are always calls.
    pub fn is_method(&self) -> bool {
        match &self.kind {
            NodeKind::Attr => false,
            NodeKind::Call => true,
            _ => self.location.is_none_or(|loc| loc.parens),
        }
    }

    /// Rebuild this node with every nested node child mapped through `f`,
    /// keeping literals, kind and location.
    pub fn try_map_nodes<E>(
        &self,
        mut f: impl FnMut(&Node) -> Result<Node, E>,
    ) -> Result<Node, E> {
        let mut children = Vec::with_capacity(self.children.len());
        for child in self.children.iter() {
            children.push(match child {
                Child::Node(node) => Child::Node(f(node)?),
                other => other.clone(),
            });
        }
        Ok(self.with_children(children))
    }

    /// Count nodes in this subtree (including itself) that satisfy `pred`,
    /// not descending into nodes for which `prune` holds.
    pub fn count_where(&self, pred: &impl Fn(&Node) -> bool, prune: &impl Fn(&Node) -> bool) -> usize {
        let own = usize::from(pred(self));
        own + self
            .child_nodes()
            .filter(|child| !prune(child))
            .map(|child| child.count_where(pred, prune))
            .sum::<usize>()
    }

    /// Whether any node in this subtree satisfies `pred`.
    pub fn any(&self, pred: &impl Fn(&Node) -> bool) -> bool {
        pred(self) || self.child_nodes().any(|child| child.any(pred))
    }
}

impl Child {
    /// A string literal child.
    pub fn str(value: impl AsRef<str>) -> Child {
        Child::Str(Arc::from(value.as_ref()))
    }

    /// A symbol child.
    pub fn sym(value: impl AsRef<str>) -> Child {
        Child::Sym(Arc::from(value.as_ref()))
    }

    pub fn as_node(&self) -> Option<&Node> {
        match self {
            Child::Node(node) => Some(node),
            _ => None,
        }
    }

    pub fn as_sym(&self) -> Option<&str> {
        match self {
            Child::Sym(name) => Some(name),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Child::Str(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Child::Int(value) => Some(*value),
            _ => None,
        }
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Child::Nil)
    }

    /// Kind of the nested node, if this child is one.
    pub fn kind(&self) -> Option<&NodeKind> {
        self.as_node().map(Node::kind)
    }
}

impl From<Node> for Child {
    fn from(node: Node) -> Self {
        Child::Node(node)
    }
}

impl From<&Node> for Child {
    fn from(node: &Node) -> Self {
        Child::Node(node.clone())
    }
}

impl From<Option<Node>> for Child {
    fn from(node: Option<Node>) -> Self {
        node.map_or(Child::Nil, Child::Node)
    }
}

/// Bare string slices are symbols; see `Child::str` for string literals.
impl From<&str> for Child {
    fn from(name: &str) -> Self {
        Child::sym(name)
    }
}

impl From<Arc<str>> for Child {
    fn from(name: Arc<str>) -> Self {
        Child::Sym(name)
    }
}

impl From<i32> for Child {
    fn from(value: i32) -> Self {
        Child::Int(i64::from(value))
    }
}

impl From<i64> for Child {
    fn from(value: i64) -> Self {
        Child::Int(value)
    }
}

impl From<usize> for Child {
    fn from(value: usize) -> Self {
        Child::Int(i64::try_from(value).unwrap_or(i64::MAX))
    }
}

impl From<f64> for Child {
    fn from(value: f64) -> Self {
        Child::Float(value)
    }
}
