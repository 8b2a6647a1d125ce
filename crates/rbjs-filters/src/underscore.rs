//! Underscore.js collection mapping.
//!
//! Rewrites Ruby collection idioms that have no direct JavaScript method
//! onto the Underscore library (`_`): `a.compact` becomes `_.compact(a)`,
//! `a.sort_by { ... }` becomes `_.sortBy(a, ...)`, ranges become
//! `_.range(...)`, and the in-place bang methods splice their results back
//! into the receiver.
//!
//! Methods listed under `filterOptions.underscore.exclude` are left alone.

use crate::builders::{call_args, property};
use rbjs_emitter::{ConvertResult, Filter, FilterContext, Next};
use rbjs_tree::{Child, Node, NodeKind, s};
use tracing::trace;

#[derive(Clone, Copy, Debug, Default)]
pub struct UnderscoreFilter;

impl Filter for UnderscoreFilter {
    fn name(&self) -> &'static str {
        "underscore"
    }

    fn rewrite(&self, node: &Node, cx: &mut FilterContext<'_>, next: Next) -> ConvertResult<Node> {
        let replacement = match node.kind() {
            NodeKind::Send => rewrite_send(node, cx),
            NodeKind::Block => rewrite_block(node, cx),
            NodeKind::Irange | NodeKind::Erange => rewrite_range(node),
            NodeKind::For if node.node_at(1).is_some_and(is_range) => return keep_range_loop(node, cx),
            _ => None,
        };
        match replacement {
            Some(replacement) => {
                trace!(kind = %node.kind(), "underscore: rewritten");
                cx.process(&replacement)
            }
            None => next.run(node, cx),
        }
    }
}

fn underscore() -> Node {
    s!(Lvar, "_")
}

/// Already a call on `_`.
fn on_underscore(receiver: &Node) -> bool {
    receiver.children().last().and_then(Child::as_sym) == Some("_")
}

fn is_range(node: &Node) -> bool {
    matches!(node.kind(), NodeKind::Irange | NodeKind::Erange)
}

fn excluded(cx: &FilterContext<'_>, method: &str) -> bool {
    cx.options()
        .filter_option("underscore")
        .and_then(|options| options.get("exclude"))
        .and_then(serde_json::Value::as_array)
        .is_some_and(|names| names.iter().any(|name| name.as_str() == Some(method)))
}

/// `_.method(args...)`, keeping the location of `origin`.
fn library_call(origin: &Node, method: &str, args: impl IntoIterator<Item = Node>) -> Node {
    let mut children = vec![Child::from(underscore()), Child::sym(method)];
    children.extend(args.into_iter().map(Child::from));
    origin.updated(NodeKind::Send, children)
}

fn send(receiver: Node, method: &str, args: impl IntoIterator<Item = Node>) -> Node {
    let mut children = vec![Child::from(receiver), Child::sym(method)];
    children.extend(args.into_iter().map(Child::from));
    Node::new(NodeKind::Send, children)
}

/// `(block (send nil :proc) args body)`, a bare function value.
fn function(args: Node, body: Child) -> Node {
    s!(Block, s!(Send, Child::Nil, "proc"), args, body)
}

/// Wraps a block body so its last expression is returned.
fn returning(body: Option<&Node>) -> Child {
    body.map_or(Child::Nil, |body| Child::from(s!(Autoreturn, body)))
}

/// `receiver[0]`
fn first(receiver: &Node) -> Node {
    send(receiver.clone(), "[]", [s!(Int, 0)])
}

/// `(memo, item) => memo <operator> item`
fn fold(operator: &str) -> Node {
    let args = s!(Args, s!(Arg, "memo"), s!(Arg, "item"));
    let body = send(s!(Lvar, "memo"), operator, [s!(Lvar, "item")]);
    function(args, Child::from(s!(Autoreturn, body)))
}

fn underscore_name(method: &str) -> &'static str {
    match method {
        "sort_by" => "sortBy",
        "group_by" => "groupBy",
        "index_by" => "indexBy",
        "count_by" => "countBy",
        "find_by" => "findWhere",
        "has_key?" => "has",
        "merge" | "merge!" => "extend",
        "find" => "find",
        "reject" => "reject",
        "where" => "where",
        _ => "",
    }
}

fn rewrite_send(node: &Node, cx: &mut FilterContext<'_>) -> Option<Node> {
    let target = node.node_at(0)?;
    if on_underscore(target) {
        return None;
    }
    let method = node.sym_at(1)?;
    if excluded(cx, method) {
        return None;
    }
    let args = call_args(node)?;
    let rest = || args.iter().map(|&arg| arg.clone());

    let replacement = match (method, args.as_slice()) {
        ("clone" | "shuffle" | "size" | "compact" | "flatten" | "invert" | "values" | "uniq", [])
            if node.is_method() =>
        {
            library_call(node, method, [target.clone()])
        }
        ("sample", [] | [_]) => library_call(node, "sample", std::iter::once(target.clone()).chain(rest())),
        ("has_key?", [key]) => library_call(node, "has", [target.clone(), (*key).clone()]),
        ("sort", []) if node.is_method() => {
            library_call(node, "sortBy", [target.clone(), property(underscore(), "identity")])
        }
        ("map", [pass]) if pass.is(&NodeKind::BlockPass) => {
            library_call(node, "pluck", [target.clone(), pass.node_at(0)?.clone()])
        }
        ("merge", [_, ..]) => library_call(
            node,
            "extend",
            [s!(Hash), target.clone()].into_iter().chain(rest()),
        ),
        ("merge!" | "zip", [_, ..]) => {
            let name = if method == "zip" { "zip" } else { underscore_name(method) };
            library_call(node, name, std::iter::once(target.clone()).chain(rest()))
        }
        ("invoke", [leading @ .., pass]) if pass.is(&NodeKind::BlockPass) => library_call(
            node,
            "invoke",
            [target.clone(), pass.node_at(0)?.clone()]
                .into_iter()
                .chain(leading.iter().map(|&arg| arg.clone())),
        ),
        ("where" | "find_by", _) => {
            library_call(node, underscore_name(method), std::iter::once(target.clone()).chain(rest()))
        }
        ("reduce", [operator]) => {
            let operator = symbol_operand(operator)?;
            library_call(
                node,
                "reduce",
                [library_call(node, "rest", [target.clone()]), fold(operator), first(target)],
            )
        }
        ("reduce", [initial, operator]) => {
            let operator = symbol_operand(operator)?;
            library_call(node, "reduce", [target.clone(), fold(operator), (*initial).clone()])
        }
        ("compact!" | "flatten!" | "shuffle!" | "uniq!", _) if node.is_method() => {
            let base = method.trim_end_matches('!');
            let result = library_call(node, base, std::iter::once(target.clone()).chain(rest()));
            splice_into(target, result)
        }
        _ => return None,
    };
    Some(replacement)
}

/// `:+` or `&:+`.
fn symbol_operand(node: &Node) -> Option<&str> {
    let symbol = if node.is(&NodeKind::BlockPass) { node.node_at(0)? } else { node };
    symbol.is(&NodeKind::Sym).then(|| symbol.sym_at(0)).flatten()
}

/// `target.splice(0, target.length, ...values)`
fn splice_into(target: &Node, values: Node) -> Node {
    let length = s!(Attr, target.clone(), "length");
    s!(Call, target.clone(), "splice", s!(Int, 0), length, s!(Splat, values))
}

fn rewrite_block(node: &Node, cx: &mut FilterContext<'_>) -> Option<Node> {
    let call = node.node_at(0)?;
    if !call.is(&NodeKind::Send) {
        return None;
    }
    let target = call.node_at(0)?;
    if on_underscore(target) {
        return None;
    }
    let method = call.sym_at(1)?;
    if excluded(cx, method) {
        return None;
    }
    let call_args = call_args(call)?;
    let params = node.node_at(1)?.clone();
    let body = node.node_at(2);

    let replacement = match (method, call_args.as_slice()) {
        ("sort_by" | "group_by" | "index_by" | "count_by", _) | ("find" | "reject", []) => s!(
            Block,
            library_call(call, underscore_name(method), [target.clone()]),
            params,
            returning(body)
        ),
        ("times", []) => s!(
            Block,
            library_call(call, "times", [target.clone()]),
            params,
            body.cloned()
        ),
        ("reduce", []) => s!(
            Call,
            underscore(),
            "reduce",
            library_call(call, "rest", [target.clone()]),
            function(params, returning(body)),
            first(target)
        ),
        ("reduce", [initial]) => s!(
            Call,
            underscore(),
            "reduce",
            target.clone(),
            function(params, returning(body)),
            (*initial).clone()
        ),
        ("map!" | "reject!" | "select!" | "sort_by!", _) => {
            let base = method.trim_end_matches('!');
            let mut inner = vec![Child::from(target.clone()), Child::sym(base)];
            inner.extend(call_args.iter().map(|&arg| Child::from(arg)));
            let values = s!(Block, Node::new(NodeKind::Send, inner), params, body.cloned());
            let prefix = s!(Array, s!(Int, 0), s!(Attr, target.clone(), "length"));
            s!(Call, target.clone(), "splice", s!(Splat, send(prefix, "concat", [values])))
        }
        _ => return None,
    };
    Some(replacement)
}

/// `1..n` becomes `_.range(1, n + 1)`, `1...n` becomes `_.range(1, n)`.
fn rewrite_range(node: &Node) -> Option<Node> {
    let low = node.node_at(0)?.clone();
    let high = node.node_at(1)?;
    if node.is(&NodeKind::Erange) {
        return Some(library_call(node, "range", [low, high.clone()]));
    }
    let end = match high.int_at(0).and_then(|value| value.checked_add(1)) {
        Some(value) if high.is(&NodeKind::Int) => s!(Int, value),
        _ => send(high.clone(), "+", [s!(Int, 1)]),
    };
    Some(node.updated(
        NodeKind::Call,
        vec![Child::from(underscore()), Child::sym("range"), Child::from(low), Child::from(end)],
    ))
}

/// A `for` over a range keeps its range so the loop stays a counted loop.
fn keep_range_loop(node: &Node, cx: &mut FilterContext<'_>) -> ConvertResult<Node> {
    let mut children = Vec::with_capacity(node.len());
    for (index, child) in node.children().iter().enumerate() {
        children.push(match child {
            Child::Node(range) if index == 1 => Child::from(range.try_map_nodes(|bound| cx.process(bound))?),
            Child::Node(part) => Child::from(cx.process(part)?),
            other => other.clone(),
        });
    }
    Ok(node.with_children(children))
}

#[cfg(test)]
#[path = "../tests/underscore_unit.rs"]
mod tests;
