//! Method calls, operators and precedence-aware grouping.

use super::{Converter, State, is_identifier, node_child, optional_child, sym_child};
use crate::error::{ConvertError, ConvertResult};
use rbjs_tree::{Child, Node, NodeKind, s};

/// JavaScript operator precedence, loosest first.
pub(crate) mod prec {
    /// Assignment, arrow functions, `yield`.
    pub const ASSIGN: u8 = 2;
    pub const CONDITIONAL: u8 = 3;
    pub const OR: u8 = 4;
    pub const AND: u8 = 5;
    pub const BIT_OR: u8 = 6;
    pub const BIT_XOR: u8 = 7;
    pub const BIT_AND: u8 = 8;
    pub const EQUALITY: u8 = 9;
    pub const RELATIONAL: u8 = 10;
    pub const SHIFT: u8 = 11;
    pub const ADDITIVE: u8 = 12;
    pub const MULTIPLICATIVE: u8 = 13;
    pub const EXPONENT: u8 = 14;
    pub const UNARY: u8 = 15;
    /// `new Foo` without an argument list.
    pub const NEW: u8 = 17;
    /// Calls, member access, `new Foo(...)`.
    pub const CALL: u8 = 18;
    pub const PRIMARY: u8 = 19;
}

/// Ruby binary operators that map onto a JavaScript operator of the same
/// spelling (equality is configurable and handled by the caller).
fn binary_precedence(op: &str) -> Option<u8> {
    Some(match op {
        "**" => prec::EXPONENT,
        "*" | "/" | "%" => prec::MULTIPLICATIVE,
        "+" | "-" => prec::ADDITIVE,
        "<<" | ">>" => prec::SHIFT,
        "<" | "<=" | ">" | ">=" => prec::RELATIONAL,
        "==" | "!=" => prec::EQUALITY,
        "&" => prec::BIT_AND,
        "^" => prec::BIT_XOR,
        "|" => prec::BIT_OR,
        _ => return None,
    })
}

/// `name=` with an identifier `name`.
fn setter_name(method: &str) -> Option<&str> {
    method.strip_suffix('=').filter(|name| is_identifier(name))
}

fn call_args(node: &Node) -> ConvertResult<Vec<&Node>> {
    node.children()
        .iter()
        .skip(2)
        .map(|child| {
            child
                .as_node()
                .ok_or_else(|| ConvertError::malformed(format!("({} receiver method arg...)", node.kind()), node))
        })
        .collect()
}

impl<'a> Converter<'a> {
    // =========================================================================
    // Precedence
    // =========================================================================

    /// Binding strength of the expression `node` will emit as.
    pub(crate) fn precedence(&self, node: &Node) -> u8 {
        match node.kind() {
            NodeKind::Int => match node.int_at(0) {
                Some(value) if value < 0 => prec::UNARY,
                _ => prec::PRIMARY,
            },
            NodeKind::Float => match node.child(0) {
                Some(Child::Float(value)) if value.is_sign_negative() => prec::UNARY,
                _ => prec::PRIMARY,
            },
            NodeKind::Send => self.send_precedence(node),
            NodeKind::Csend => {
                if self.es_level().has_optional_chaining() {
                    prec::CALL
                } else {
                    prec::AND
                }
            }
            NodeKind::Attr | NodeKind::Call | NodeKind::Super | NodeKind::Zsuper => prec::CALL,
            NodeKind::And => prec::AND,
            NodeKind::Or => prec::OR,
            NodeKind::Not => prec::UNARY,
            NodeKind::If => prec::CONDITIONAL,
            NodeKind::Lvasgn
            | NodeKind::Ivasgn
            | NodeKind::Gvasgn
            | NodeKind::Casgn
            | NodeKind::Masgn
            | NodeKind::OpAsgn
            | NodeKind::OrAsgn
            | NodeKind::AndAsgn => prec::ASSIGN,
            NodeKind::Begin | NodeKind::Kwbegin if node.len() == 1 => {
                node.node_at(0).map_or(prec::PRIMARY, |child| self.precedence(child))
            }
            NodeKind::Block => {
                if is_lambda_block(node) {
                    if self.es2015() { prec::ASSIGN } else { prec::PRIMARY }
                } else {
                    prec::CALL
                }
            }
            NodeKind::Dstr | NodeKind::Dsym if !self.es2015() && node.len() > 1 => prec::ADDITIVE,
            _ => prec::PRIMARY,
        }
    }

    fn send_precedence(&self, node: &Node) -> u8 {
        let has_receiver = !node.is_nil_at(0);
        let args = node.len().saturating_sub(2);
        match (node.sym_at(1), has_receiver, args) {
            (Some("!" | "-@" | "+@" | "~"), true, 0) => prec::UNARY,
            (Some("await" | "typeof"), false, 1) => prec::UNARY,
            (Some("async"), false, 1) => match node.node_at(2) {
                Some(arg) if arg.is(&NodeKind::Block) => self.precedence(arg),
                _ => prec::PRIMARY,
            },
            (Some("[]="), true, 2) => prec::ASSIGN,
            (Some("**"), true, 1) if !self.es_level().has_exponent_operator() => prec::CALL,
            (Some("new"), true, 0) if !node.is_method() => prec::NEW,
            (Some(op), true, 1) => match binary_precedence(op) {
                Some(precedence) => precedence,
                None if setter_name(op).is_some() => prec::ASSIGN,
                None => prec::CALL,
            },
            _ => prec::CALL,
        }
    }

    /// Emit `node` as an expression, parenthesized when it binds looser than
    /// `min`.
    pub(crate) fn parse_operand(&mut self, node: &Node, min: u8) -> ConvertResult<()> {
        if self.precedence(node) < min {
            self.put("(");
            self.parse(node, State::Expression)?;
            self.put(")");
            Ok(())
        } else {
            self.parse(node, State::Expression)
        }
    }

    /// Emit the receiver of a member access.
    fn parse_receiver(&mut self, receiver: &Node) -> ConvertResult<()> {
        if matches!(receiver.kind(), NodeKind::Int | NodeKind::Float) {
            self.put("(");
            self.parse(receiver, State::Expression)?;
            self.put(")");
            return Ok(());
        }
        self.parse_operand(receiver, prec::CALL)
    }

    /// Comma-separated argument list, spreading splats.
    pub(crate) fn emit_arguments(&mut self, items: &[&Node]) -> ConvertResult<()> {
        for (index, item) in items.iter().enumerate() {
            if index > 0 {
                self.put(", ");
            }
            if item.is(&NodeKind::Splat) {
                if !self.es2015() {
                    return Err(ConvertError::unsupported("splat requires es2015 here", item));
                }
                self.put("...");
                self.parse_operand(node_child(item, 0, "(splat value)")?, prec::ASSIGN)?;
            } else {
                self.parse_operand(item, prec::ASSIGN)?;
            }
        }
        Ok(())
    }

    // =========================================================================
    // Calls
    // =========================================================================

    pub(super) fn emit_send(&mut self, node: &Node) -> ConvertResult<()> {
        const SHAPE: &str = "(send receiver method arg...)";
        let receiver = optional_child(node, 0, SHAPE)?;
        let method = sym_child(node, 1, SHAPE)?;
        let args = call_args(node)?;

        match node.kind() {
            NodeKind::Csend => return self.emit_csend(node, receiver, method, &args),
            NodeKind::Attr => {
                if !args.is_empty() {
                    return Err(ConvertError::malformed("(attr receiver name)", node));
                }
                return self.emit_call(node, receiver, method, &args, false);
            }
            NodeKind::Call => return self.emit_call(node, receiver, method, &args, true),
            _ => {}
        }

        match (receiver, method, args.as_slice()) {
            (None, "async", [target]) => self.emit_async(node, target),
            (None, "await", [value]) => {
                if !self.es_level().has_async() {
                    return Err(ConvertError::unsupported("await requires es2017", node));
                }
                self.put("await ");
                self.parse_operand(value, prec::UNARY)
            }
            (None, "typeof", [value]) => {
                self.put("typeof ");
                self.parse_operand(value, prec::UNARY)
            }
            (None, "raise", _) => self.emit_raise(node, &args),
            (Some(receiver), "new", _) => self.emit_new(node, receiver, &args),
            (Some(receiver), "!", []) => {
                self.put("!");
                self.parse_operand(receiver, prec::UNARY)
            }
            (Some(receiver), "-@" | "+@" | "~", []) => {
                self.put(&method[..1]);
                self.parse_operand(receiver, prec::UNARY + 1)
            }
            (Some(receiver), "[]", [index]) => {
                self.parse_receiver(receiver)?;
                self.put("[");
                self.parse(index, State::Expression)?;
                self.put("]");
                Ok(())
            }
            (Some(receiver), "[]=", [index, value]) => {
                self.parse_receiver(receiver)?;
                self.put("[");
                self.parse(index, State::Expression)?;
                self.put("] = ");
                self.parse_operand(value, prec::ASSIGN)
            }
            (Some(receiver), op, [right]) if binary_precedence(op).is_some() => {
                self.emit_binary(receiver, op, right)
            }
            (Some(receiver), method, [value]) if setter_name(method).is_some() => {
                self.parse_receiver(receiver)?;
                self.put(".");
                self.put(setter_name(method).unwrap_or(method));
                self.put(" = ");
                self.parse_operand(value, prec::ASSIGN)
            }
            _ => self.emit_call(node, receiver, method, &args, false),
        }
    }

    fn emit_binary(&mut self, left: &Node, op: &str, right: &Node) -> ConvertResult<()> {
        if op == "**" && !self.es_level().has_exponent_operator() {
            self.put("Math.pow(");
            self.parse_operand(left, prec::ASSIGN)?;
            self.put(", ");
            self.parse_operand(right, prec::ASSIGN)?;
            self.put(")");
            return Ok(());
        }
        let precedence = binary_precedence(op).unwrap_or(prec::PRIMARY);
        let symbol = match op {
            "==" => self.options.comparison.equal(),
            "!=" => self.options.comparison.not_equal(),
            other => other,
        };
        if op == "**" {
            // Right-associative; a unary operand on the left must be wrapped.
            self.parse_operand(left, prec::UNARY + 1)?;
            self.put(" ** ");
            self.parse_operand(right, precedence)
        } else {
            self.parse_operand(left, precedence)?;
            self.put(" ");
            self.put(symbol);
            self.put(" ");
            self.parse_operand(right, precedence + 1)
        }
    }

    /// `receiver.method(args)`, `method(args)`, or a property read when the
    /// call site had no arguments and no parentheses.
    fn emit_call(
        &mut self,
        node: &Node,
        receiver: Option<&Node>,
        method: &str,
        args: &[&Node],
        force_call: bool,
    ) -> ConvertResult<()> {
        if !is_identifier(method) {
            return Err(ConvertError::unsupported(
                format!("method '{method}' has no JavaScript equivalent"),
                node,
            ));
        }

        if !self.es2015() && args.iter().any(|arg| arg.is(&NodeKind::Splat)) {
            return self.emit_apply(node, receiver, method, args);
        }

        if let Some(receiver) = receiver {
            self.parse_receiver(receiver)?;
            self.put(".");
        }
        self.put(method);
        if force_call || !args.is_empty() || node.is_method() {
            self.put("(");
            self.emit_arguments(args)?;
            self.put(")");
        }
        Ok(())
    }

    /// Legacy splat call: `receiver.method.apply(receiver, [a].concat(b))`.
    fn emit_apply(&mut self, node: &Node, receiver: Option<&Node>, method: &str, args: &[&Node]) -> ConvertResult<()> {
        let this_arg = match receiver {
            Some(receiver) => {
                let text = self.capture(|this| this.parse_receiver(receiver))?;
                self.put(&text);
                self.put(".");
                text
            }
            None => "null".to_string(),
        };
        self.put(method);
        self.put(".apply(");
        self.put(&this_arg);
        self.put(", ");
        self.emit_elements(args, node)?;
        self.put(")");
        Ok(())
    }

    fn emit_csend(&mut self, node: &Node, receiver: Option<&Node>, method: &str, args: &[&Node]) -> ConvertResult<()> {
        let Some(receiver) = receiver else {
            return Err(ConvertError::malformed("(csend receiver method arg...)", node));
        };
        if self.es_level().has_optional_chaining() {
            if !is_identifier(method) {
                return Err(ConvertError::unsupported(
                    format!("method '{method}' has no JavaScript equivalent"),
                    node,
                ));
            }
            self.parse_receiver(receiver)?;
            self.put("?.");
            self.put(method);
            if !args.is_empty() || node.is_method() {
                self.put("(");
                self.emit_arguments(args)?;
                self.put(")");
            }
            return Ok(());
        }

        // receiver && receiver.method(...)
        self.parse_operand(receiver, prec::AND)?;
        self.put(" && ");
        let call = node.with_kind(NodeKind::Send);
        self.emit_call(&call, Some(receiver), method, args, false)
    }

    fn emit_new(&mut self, node: &Node, receiver: &Node, args: &[&Node]) -> ConvertResult<()> {
        if !self.es2015() && args.iter().any(|arg| arg.is(&NodeKind::Splat)) {
            return Err(ConvertError::unsupported("splat in constructor call requires es2015", node));
        }
        self.put("new ");
        let plain = matches!(
            receiver.kind(),
            NodeKind::Const | NodeKind::Lvar | NodeKind::Ivar | NodeKind::Gvar | NodeKind::SelfRef | NodeKind::Attr
        ) || (receiver.is(&NodeKind::Send) && receiver.len() == 2 && !receiver.is_method());
        if plain {
            self.parse(receiver, State::Expression)?;
        } else {
            self.put("(");
            self.parse(receiver, State::Expression)?;
            self.put(")");
        }
        if !args.is_empty() || node.is_method() {
            self.put("(");
            self.emit_arguments(args)?;
            self.put(")");
        }
        Ok(())
    }

    /// `raise value` and `raise Class, message`.
    fn emit_raise(&mut self, node: &Node, args: &[&Node]) -> ConvertResult<()> {
        if !self.is_statement() {
            return Err(ConvertError::unsupported("raise in expression position", node));
        }
        match args {
            [value] => {
                self.put("throw ");
                self.parse(value, State::Expression)
            }
            [class, message] => {
                self.put("throw new ");
                self.parse_operand(class, prec::CALL)?;
                self.put("(");
                self.parse_operand(message, prec::ASSIGN)?;
                self.put(")");
                Ok(())
            }
            _ => Err(ConvertError::unsupported("raise without an exception", node)),
        }
    }

    fn emit_async(&mut self, node: &Node, target: &Node) -> ConvertResult<()> {
        if !self.es_level().has_async() {
            return Err(ConvertError::unsupported("async requires es2017", node));
        }
        match target.kind() {
            NodeKind::Def | NodeKind::Defs => self.emit_def(target, true),
            NodeKind::Block if is_lambda_block(target) => {
                self.put("async ");
                self.emit_block(target)
            }
            _ => Err(ConvertError::unsupported("async applied to something other than a method or lambda", node)),
        }
    }

    pub(super) fn emit_block_pass(&mut self, node: &Node) -> ConvertResult<()> {
        let Some(value) = node.node_at(0) else {
            return Err(ConvertError::unsupported("anonymous block forwarding", node));
        };
        if value.is(&NodeKind::Sym) {
            // &:name  ->  item => item.name()
            let method = sym_child(value, 0, "(sym name)")?;
            let lambda = s!(
                Block,
                s!(Send, Child::Nil, "proc"),
                s!(Args, s!(Arg, "item")),
                s!(Send, s!(Lvar, "item"), method)
            );
            return self.emit_block(&lambda);
        }
        self.parse_operand(value, prec::ASSIGN)
    }

    // =========================================================================
    // Logic
    // =========================================================================

    pub(super) fn emit_logical(&mut self, node: &Node) -> ConvertResult<()> {
        let (symbol, precedence) = if node.is(&NodeKind::And) {
            ("&&", prec::AND)
        } else {
            ("||", prec::OR)
        };
        let left = node_child(node, 0, "(and|or left right)")?;
        let right = node_child(node, 1, "(and|or left right)")?;
        self.parse_operand(left, precedence)?;
        self.put(" ");
        self.put(symbol);
        self.put(" ");
        self.parse_operand(right, precedence + 1)
    }

    pub(super) fn emit_not(&mut self, node: &Node) -> ConvertResult<()> {
        let value = node_child(node, 0, "(not value)")?;
        self.put("!");
        self.parse_operand(value, prec::UNARY)
    }

    /// Emit the negation of a condition, inside parentheses the caller
    /// writes (`if (...)`, `while (...)`).
    pub(crate) fn emit_negated_condition(&mut self, condition: &Node) -> ConvertResult<()> {
        let negated = match condition.kind() {
            NodeKind::Send if condition.sym_at(1) == Some("!") && condition.len() == 2 => condition.node_at(0),
            NodeKind::Not => condition.node_at(0),
            _ => None,
        };
        match negated {
            Some(inner) => self.parse(inner, State::Expression),
            None => {
                self.put("!");
                self.parse_operand(condition, prec::UNARY)
            }
        }
    }
}

/// `(block (send nil :lambda|:proc) args body)`
pub(crate) fn is_lambda_block(node: &Node) -> bool {
    node.node_at(0).is_some_and(|call| {
        call.is(&NodeKind::Send) && call.is_nil_at(0) && call.len() == 2 && matches!(call.sym_at(1), Some("lambda" | "proc"))
    })
}
