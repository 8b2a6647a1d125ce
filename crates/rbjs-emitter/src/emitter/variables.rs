use super::calls::prec;
use super::{Converter, State, is_identifier, node_child, optional_child, sym_child};
use crate::error::{ConvertError, ConvertResult};
use rbjs_tree::{Node, NodeKind};

/// Expression that evaluates to the global object in every environment.
const GLOBAL_OBJECT: &str = "Function(\"return this\")()";

impl<'a> Converter<'a> {
    // =========================================================================
    // Locals
    // =========================================================================

    pub(super) fn emit_lvar(&mut self, node: &Node) -> ConvertResult<()> {
        let name = sym_child(node, 0, "(lvar name)")?;
        self.put(name);
        Ok(())
    }

    /// `let x = value`, `x = value`, or the bare name when used as an
    /// assignment target (no value child).
    pub(super) fn emit_lvasgn(&mut self, node: &Node) -> ConvertResult<()> {
        let name = sym_child(node, 0, "(lvasgn name value)")?;
        let Some(value) = optional_child(node, 1, "(lvasgn name value)")? else {
            self.put(name);
            return Ok(());
        };
        let statement = self.is_statement();
        if let Some(keyword) = self.scope.assign(name, statement) {
            self.put(keyword);
            self.put(" ");
        }
        self.put(name);
        self.put(" = ");
        self.parse_operand(value, prec::ASSIGN)
    }

    // =========================================================================
    // Instance and global variables
    // =========================================================================

    pub(super) fn emit_ivar(&mut self, node: &Node) -> ConvertResult<()> {
        let name = sym_child(node, 0, "(ivar name)")?;
        self.put_ivar(node, name)
    }

    pub(super) fn emit_ivasgn(&mut self, node: &Node) -> ConvertResult<()> {
        let name = sym_child(node, 0, "(ivasgn name value)")?;
        self.put_ivar(node, name)?;
        if let Some(value) = optional_child(node, 1, "(ivasgn name value)")? {
            self.put(" = ");
            self.parse_operand(value, prec::ASSIGN)?;
        }
        Ok(())
    }

    /// `@name` becomes `this._name`.
    fn put_ivar(&mut self, node: &Node, name: &str) -> ConvertResult<()> {
        let bare = name.strip_prefix('@').unwrap_or(name);
        if !is_identifier(bare) {
            return Err(ConvertError::malformed("an instance variable name", node));
        }
        self.put("this._");
        self.put(bare);
        Ok(())
    }

    pub(super) fn emit_gvar(&mut self, node: &Node) -> ConvertResult<()> {
        let name = sym_child(node, 0, "(gvar name)")?;
        self.put_gvar(node, name)
    }

    pub(super) fn emit_gvasgn(&mut self, node: &Node) -> ConvertResult<()> {
        let name = sym_child(node, 0, "(gvasgn name value)")?;
        self.put_gvar(node, name)?;
        if let Some(value) = optional_child(node, 1, "(gvasgn name value)")? {
            self.put(" = ");
            self.parse_operand(value, prec::ASSIGN)?;
        }
        Ok(())
    }

    fn put_gvar(&mut self, node: &Node, name: &str) -> ConvertResult<()> {
        if !is_identifier(name) {
            return Err(ConvertError::unsupported(
                format!("global variable '{name}' has no JavaScript equivalent"),
                node,
            ));
        }
        self.put(name);
        Ok(())
    }

    // =========================================================================
    // Constants
    // =========================================================================

    pub(super) fn emit_const(&mut self, node: &Node) -> ConvertResult<()> {
        let scope = optional_child(node, 0, "(const scope name)")?;
        let name = sym_child(node, 1, "(const scope name)")?;
        let limit = self.rbstack.len();
        self.emit_qualified(scope, name, limit)
    }

    /// Emit a constant reference. Unqualified names are looked up in the
    /// enclosing class/module bodies `rbstack[..limit]`, innermost first.
    fn emit_qualified(&mut self, scope: Option<&Node>, name: &str, limit: usize) -> ConvertResult<()> {
        match scope {
            Some(scope) if scope.is(&NodeKind::Cbase) => {
                self.put(GLOBAL_OBJECT);
                self.put(".");
            }
            Some(scope) => {
                self.parse_operand(scope, prec::CALL)?;
                self.put(".");
            }
            None => {
                if let Some((index, owner)) = self.resolve_owner(name, limit) {
                    // The owner itself resolves only against bodies outside it.
                    let owner_scope = optional_child(&owner, 0, "(const scope name)")?;
                    let owner_name = sym_child(&owner, 1, "(const scope name)")?;
                    self.emit_qualified(owner_scope, owner_name, index)?;
                    self.put(".");
                }
            }
        }
        self.put(name);
        Ok(())
    }

    /// The innermost enclosing body among `rbstack[..limit]` that declares
    /// `name`, with its stack index.
    pub(crate) fn resolve_owner(&self, name: &str, limit: usize) -> Option<(usize, Node)> {
        self.rbstack[..limit.min(self.rbstack.len())]
            .iter()
            .enumerate()
            .rev()
            .find(|(_, body)| body.members.contains(name))
            .map(|(index, body)| (index, body.owner.clone()))
    }

    /// Whether an unqualified constant would render with an owner prefix.
    pub(crate) fn is_member_name(&self, name: &str) -> bool {
        self.resolve_owner(name, self.rbstack.len()).is_some()
    }

    pub(super) fn emit_casgn(&mut self, node: &Node) -> ConvertResult<()> {
        const SHAPE: &str = "(casgn scope name value)";
        let scope = optional_child(node, 0, SHAPE)?;
        let name = sym_child(node, 1, SHAPE)?;
        let value = optional_child(node, 2, SHAPE)?;

        let qualified = scope.is_some() || self.is_member_name(name);
        if value.is_some() && !qualified && self.is_statement() {
            self.put(self.es_level().constant_keyword());
            self.put(" ");
        }
        let limit = self.rbstack.len();
        self.emit_qualified(scope, name, limit)?;
        if let Some(value) = value {
            self.put(" = ");
            self.parse_operand(value, prec::ASSIGN)?;
        }
        Ok(())
    }

    // =========================================================================
    // Compound assignment
    // =========================================================================

    /// `(op_asgn target op value)` -> `target op= value`.
    pub(super) fn emit_op_asgn(&mut self, node: &Node) -> ConvertResult<()> {
        const SHAPE: &str = "(op_asgn target operator value)";
        let target = node_child(node, 0, SHAPE)?;
        let op = sym_child(node, 1, SHAPE)?;
        let value = node_child(node, 2, SHAPE)?;
        if !matches!(op, "+" | "-" | "*" | "/" | "%" | "**" | "<<" | ">>" | "&" | "|" | "^") {
            return Err(ConvertError::unsupported(
                format!("compound assignment with '{op}'"),
                node,
            ));
        }

        let target_text = self.capture(|this| this.emit_target(target))?;
        self.put(&target_text);
        if op == "**" && !self.es_level().has_exponent_operator() {
            self.put(" = Math.pow(");
            self.put(&target_text);
            self.put(", ");
            self.parse_operand(value, prec::ASSIGN)?;
            self.put(")");
            return Ok(());
        }
        self.put(" ");
        self.put(op);
        self.put("= ");
        self.parse_operand(value, prec::ASSIGN)
    }

    /// `a ||= b` and `a &&= b`.
    pub(super) fn emit_logical_asgn(&mut self, node: &Node) -> ConvertResult<()> {
        let target = node_child(node, 0, "(or_asgn target value)")?;
        let value = node_child(node, 1, "(or_asgn target value)")?;
        let (op, precedence) = if node.is(&NodeKind::OrAsgn) {
            ("||", prec::OR)
        } else {
            ("&&", prec::AND)
        };

        if target.is(&NodeKind::Lvasgn) {
            let name = sym_child(target, 0, "(lvasgn name)")?;
            if self.is_statement() {
                if let Some(keyword) = self.scope.hoist(name) {
                    self.put(keyword);
                    self.put(" ");
                    if self.es2015() {
                        // `let x = x || v` would read x before its declaration.
                        self.put(name);
                        self.put("; ");
                    }
                }
            } else {
                self.scope.assign(name, false);
            }
        }

        let target_text = self.capture(|this| this.emit_target(target))?;
        self.put(&target_text);
        if self.es_level().has_logical_assignment() {
            self.put(" ");
            self.put(op);
            self.put("= ");
            return self.parse_operand(value, prec::ASSIGN);
        }
        self.put(" = ");
        self.put(&target_text);
        self.put(" ");
        self.put(op);
        self.put(" ");
        self.parse_operand(value, precedence + 1)
    }

    /// Emit an assignment target without its value.
    pub(crate) fn emit_target(&mut self, target: &Node) -> ConvertResult<()> {
        match target.kind() {
            NodeKind::Lvasgn | NodeKind::Ivasgn | NodeKind::Gvasgn | NodeKind::Casgn => {
                let arity = if target.is(&NodeKind::Casgn) { 2 } else { 1 };
                let bare = target.with_children(target.children().iter().take(arity).cloned().collect::<Vec<_>>());
                self.parse(&bare, State::Expression)
            }
            NodeKind::Send if !target.is_nil_at(0) && target.len() == 2 => {
                let receiver = node_child(target, 0, "(send receiver name)")?;
                let name = sym_child(target, 1, "(send receiver name)")?;
                if !is_identifier(name) {
                    return Err(ConvertError::unsupported(
                        format!("method '{name}' has no JavaScript equivalent"),
                        target,
                    ));
                }
                self.parse_operand(receiver, prec::CALL)?;
                self.put(".");
                self.put(name);
                Ok(())
            }
            NodeKind::Send if target.sym_at(1) == Some("[]") && target.len() == 3 => {
                let receiver = node_child(target, 0, "(send receiver :[] index)")?;
                let index = node_child(target, 2, "(send receiver :[] index)")?;
                self.parse_operand(receiver, prec::CALL)?;
                self.put("[");
                self.parse(index, State::Expression)?;
                self.put("]");
                Ok(())
            }
            NodeKind::Attr => self.parse(target, State::Expression),
            _ => Err(ConvertError::unsupported(
                format!("assignment to {}", target.kind()),
                target,
            )),
        }
    }
}
