//! Small constructors for the replacement trees the filters build.

use rbjs_tree::{Child, Node, NodeKind, s};

/// `receiver.method(args...)`.
pub(crate) fn call(receiver: Node, method: &str, args: impl IntoIterator<Item = Node>) -> Node {
    let mut children = vec![Child::from(receiver), Child::sym(method)];
    children.extend(args.into_iter().map(Child::from));
    Node::new(NodeKind::Send, children)
}

/// A bare global name such as `process` or `__dirname`.
pub(crate) fn global(name: &str) -> Node {
    s!(Attr, Child::Nil, name)
}

/// `object.name` without a call.
pub(crate) fn property(object: Node, name: &str) -> Node {
    s!(Attr, object, name)
}

pub(crate) fn string(value: &str) -> Node {
    s!(Str, Child::str(value))
}

/// `{key: "value"}`.
pub(crate) fn option_hash(key: &str, value: &str) -> Node {
    s!(Hash, s!(Pair, s!(Sym, key), string(value)))
}

/// Statements in sequence.
pub(crate) fn sequence(statements: impl IntoIterator<Item = Node>) -> Node {
    Node::new(NodeKind::Begin, statements.into_iter().map(Child::from).collect())
}

/// Arguments of a `send`: every child after receiver and method.
pub(crate) fn call_args(node: &Node) -> Option<Vec<&Node>> {
    node.children().get(2..)?.iter().map(Child::as_node).collect()
}

/// `Name` of an unqualified `(const nil :Name)`.
pub(crate) fn top_const(node: &Node) -> Option<&str> {
    (node.is(&NodeKind::Const) && node.is_nil_at(0))
        .then(|| node.sym_at(1))
        .flatten()
}

/// The elements of an array literal, or the value itself.
pub(crate) fn list(value: &Node) -> Vec<&Node> {
    if value.is(&NodeKind::Array) {
        value.child_nodes().collect()
    } else {
        vec![value]
    }
}
