//! Multiple assignment.
//!
//! Block-scoped levels destructure: `let [a, b] = value`. Legacy levels have
//! no destructuring and lower the assignment to one statement per target,
//! either pairing targets with the elements of a literal array or indexing
//! into the value.

use super::calls::prec;
use super::{Converter, node_child, sym_child};
use crate::error::{ConvertError, ConvertResult};
use rbjs_tree::{Child, Node, NodeKind, s};

impl<'a> Converter<'a> {
    pub(super) fn emit_masgn(&mut self, node: &Node) -> ConvertResult<()> {
        let targets = node_child(node, 0, "(masgn (mlhs target...) value)")?;
        let value = node_child(node, 1, "(masgn (mlhs target...) value)")?;
        if !targets.is(&NodeKind::Mlhs) {
            return Err(ConvertError::malformed("(masgn (mlhs target...) value)", node));
        }
        if self.es2015() {
            self.emit_destructuring(targets, value)
        } else {
            let lowered = lower_masgn(node, targets, value)?;
            self.parse(&lowered, self.state)
        }
    }

    /// `[a, b, ...rest]` as a destructuring target.
    pub(super) fn emit_mlhs(&mut self, node: &Node) -> ConvertResult<()> {
        if !self.es2015() {
            return Err(ConvertError::unsupported("destructuring requires es2015", node));
        }
        self.put("[");
        let count = node.len();
        for (index, target) in node.children().iter().enumerate() {
            let target = target
                .as_node()
                .ok_or_else(|| ConvertError::malformed("(mlhs target...)", node))?;
            if target.is(&NodeKind::Splat) && target.is_empty() {
                if index + 1 == count {
                    break;
                }
                return Err(ConvertError::unsupported("anonymous splat before the last target", target));
            }
            if index > 0 {
                self.put(", ");
            }
            self.emit_destructure_target(target)?;
        }
        self.put("]");
        Ok(())
    }

    fn emit_destructure_target(&mut self, target: &Node) -> ConvertResult<()> {
        match target.kind() {
            NodeKind::Mlhs => self.emit_mlhs(target),
            NodeKind::Splat => {
                self.put("...");
                self.emit_destructure_target(node_child(target, 0, "(splat target)")?)
            }
            NodeKind::Send => {
                let method = sym_child(target, 1, "(send receiver method)")?;
                match (method, target.len()) {
                    ("[]=", 3) => {
                        let index_target = target.with_children(vec![
                            target.children()[0].clone(),
                            Child::from("[]"),
                            target.children()[2].clone(),
                        ]);
                        self.emit_target(&index_target)
                    }
                    (method, 2) if method.ends_with('=') => {
                        let name = &method[..method.len() - 1];
                        let attr = target.with_children(vec![target.children()[0].clone(), Child::from(name)]);
                        self.emit_target(&attr)
                    }
                    _ => Err(ConvertError::unsupported(
                        format!("destructuring into '{method}'"),
                        target,
                    )),
                }
            }
            _ => self.emit_target(target),
        }
    }

    fn emit_destructuring(&mut self, targets: &Node, value: &Node) -> ConvertResult<()> {
        let mut names = Vec::new();
        collect_locals(targets, &mut names);

        if !self.is_statement() {
            for name in &names {
                self.scope.assign(name, false);
            }
            self.emit_mlhs(targets)?;
            self.put(" = ");
            return self.parse_operand(value, prec::ASSIGN);
        }

        let (fresh, _) = self.scope.partition_new(&names);
        let declared: Vec<&str> = fresh
            .into_iter()
            .filter(|name| self.scope.assign(name, true).is_some())
            .collect();
        let keyword = self.es_level().local_keyword();
        if !declared.is_empty() {
            if declared.len() == names.len() && only_locals(targets) {
                self.put(keyword);
                self.put(" ");
            } else {
                self.put(keyword);
                self.put(" ");
                self.put(&declared.join(", "));
                self.put("; ");
            }
        }
        self.emit_mlhs(targets)?;
        self.put(" = ");
        self.parse_operand(value, prec::ASSIGN)
    }
}

/// Local variable names bound by a destructuring target, in order.
pub(super) fn collect_locals<'n>(node: &'n Node, out: &mut Vec<&'n str>) {
    match node.kind() {
        NodeKind::Lvasgn => {
            if let Some(name) = node.sym_at(0)
                && !out.contains(&name)
            {
                out.push(name);
            }
        }
        NodeKind::Mlhs | NodeKind::Splat => {
            for child in node.child_nodes() {
                collect_locals(child, out);
            }
        }
        _ => {}
    }
}

/// Every target is a local (possibly nested or splatted).
fn only_locals(node: &Node) -> bool {
    node.child_nodes().all(|target| match target.kind() {
        NodeKind::Lvasgn => true,
        NodeKind::Mlhs | NodeKind::Splat => only_locals(target),
        _ => false,
    }) && node.len() == node.child_nodes().count()
}

/// Rewrite a multiple assignment into a sequence of single assignments.
fn lower_masgn(node: &Node, targets: &Node, value: &Node) -> ConvertResult<Node> {
    let targets: Vec<&Node> = targets.child_nodes().collect();
    if let Some(splat) = targets.iter().find(|target| target.is(&NodeKind::Splat)) {
        return Err(ConvertError::unsupported("splat target requires es2015", splat));
    }

    let values: Vec<Node> = if value.is(&NodeKind::Array) {
        let items: Vec<&Node> = value.child_nodes().collect();
        if items.len() != targets.len() || items.iter().any(|item| item.is(&NodeKind::Splat)) {
            return Err(ConvertError::unsupported("unmatched assignment", node));
        }
        items.into_iter().cloned().collect()
    } else {
        (0..targets.len())
            .map(|index| s!(Send, value, "[]", s!(Int, index)))
            .collect()
    };

    let statements = targets
        .iter()
        .zip(values)
        .map(|(target, value)| {
            if target.is(&NodeKind::Mlhs) {
                s!(Masgn, *target, value)
            } else {
                let mut children = target.children().to_vec();
                children.push(Child::from(value));
                target.with_children(children)
            }
        })
        .map(Child::from)
        .collect();
    Ok(node.updated(NodeKind::Begin, statements))
}
