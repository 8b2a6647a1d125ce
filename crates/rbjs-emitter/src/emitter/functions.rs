//! Methods, blocks, parameter lists and implicit return.

use super::calls::{is_lambda_block, prec};
use super::{Converter, NextToken, State, is_identifier, node_child, optional_child, sym_child};
use crate::error::{ConvertError, ConvertResult};
use rbjs_tree::{Child, Node, NodeKind, s};

/// Rewrite `node` so that the value of its last evaluated expression is
/// returned.
pub(crate) fn autoreturn(node: &Node) -> Node {
    match node.kind() {
        NodeKind::Begin | NodeKind::Kwbegin => {
            let Some(last) = node.node_at(node.len().saturating_sub(1)) else {
                return node.clone();
            };
            let mut children = node.children().to_vec();
            let end = children.len() - 1;
            children[end] = Child::from(autoreturn(last));
            node.with_children(children)
        }
        NodeKind::If => {
            let mut children = node.children().to_vec();
            for index in 1..children.len().min(3) {
                if let Some(branch) = children[index].as_node() {
                    children[index] = Child::from(autoreturn(branch));
                }
            }
            node.with_children(children)
        }
        NodeKind::Rescue => {
            let mut children = node.children().to_vec();
            if let Some(body) = children.first().and_then(Child::as_node) {
                children[0] = Child::from(autoreturn(body));
            }
            for child in children.iter_mut().skip(1) {
                let Some(handler) = child.as_node().filter(|handler| handler.is(&NodeKind::Resbody)) else {
                    continue;
                };
                if let Some(body) = handler.node_at(2) {
                    let mut parts = handler.children().to_vec();
                    parts[2] = Child::from(autoreturn(body));
                    *child = Child::from(handler.with_children(parts));
                }
            }
            node.with_children(children)
        }
        NodeKind::Ensure => match node.node_at(0) {
            Some(body) => {
                let mut children = node.children().to_vec();
                children[0] = Child::from(autoreturn(body));
                node.with_children(children)
            }
            None => node.clone(),
        },
        NodeKind::Lvasgn | NodeKind::Ivasgn | NodeKind::Gvasgn if node.len() == 2 => {
            let read = match node.kind() {
                NodeKind::Lvasgn => NodeKind::Lvar,
                NodeKind::Ivasgn => NodeKind::Ivar,
                _ => NodeKind::Gvar,
            };
            let name = node.children()[0].clone();
            s!(Begin, node, s!(Return, Node::new(read, vec![name])))
        }
        NodeKind::Return
        | NodeKind::Next
        | NodeKind::Break
        | NodeKind::While
        | NodeKind::Until
        | NodeKind::WhilePost
        | NodeKind::UntilPost
        | NodeKind::For
        | NodeKind::Def
        | NodeKind::Defs
        | NodeKind::Class
        | NodeKind::Module
        | NodeKind::Casgn
        | NodeKind::Masgn
        | NodeKind::Autoreturn => node.clone(),
        NodeKind::Send if node.is_nil_at(0) && node.sym_at(1) == Some("raise") => node.clone(),
        _ => s!(Return, node),
    }
}

/// How a function body relates to its surroundings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum FunctionForm {
    /// A method or named function: sees only its own parameters.
    Method,
    /// A constructor or setter: no implicit return.
    Constructor,
    /// A `function` expression closing over the enclosing locals.
    Closure,
    /// `(params) => {...}`, closing over the enclosing locals.
    Arrow,
}

impl FunctionForm {
    fn inherits(self) -> bool {
        matches!(self, FunctionForm::Closure | FunctionForm::Arrow)
    }
}

/// The name of the only parameter when it is a plain positional one.
fn single_param(args: &Node) -> Option<&str> {
    match args.node_at(0) {
        Some(param) if args.len() == 1 && param.is(&NodeKind::Arg) => param.sym_at(0),
        _ => None,
    }
}

/// Names bound by a parameter list, in order.
fn param_names(args: &Node) -> Vec<&str> {
    let mut names = Vec::new();
    for param in args.child_nodes() {
        match param.kind() {
            NodeKind::Mlhs => names.extend(param_names(param)),
            _ => names.extend(param.sym_at(0)),
        }
    }
    names
}

/// A statement-free body that fits an arrow function's expression form.
fn is_expression_body(body: &Node) -> bool {
    let statement_only = matches!(
        body.kind(),
        NodeKind::Begin
            | NodeKind::Kwbegin
            | NodeKind::Rescue
            | NodeKind::Ensure
            | NodeKind::While
            | NodeKind::Until
            | NodeKind::WhilePost
            | NodeKind::UntilPost
            | NodeKind::For
            | NodeKind::Return
            | NodeKind::Next
            | NodeKind::Break
            | NodeKind::Def
            | NodeKind::Defs
            | NodeKind::Class
            | NodeKind::Module
            | NodeKind::Casgn
    ) || (body.is(&NodeKind::Send) && body.is_nil_at(0) && body.sym_at(1) == Some("raise"));
    if statement_only && !(body.is(&NodeKind::Begin) && body.len() == 1) {
        return false;
    }
    !body.any(&|node: &Node| node.is(&NodeKind::Lvasgn) || node.kind().opens_scope() || node.is(&NodeKind::If) && !is_expression_if(node))
}

/// An `if` whose branches are all expressions.
fn is_expression_if(node: &Node) -> bool {
    node.child_nodes().skip(1).all(|branch| is_expression_body(branch))
}

impl<'a> Converter<'a> {
    // =========================================================================
    // Methods
    // =========================================================================

    /// A method outside of a class body: `function name(...) {...}`, or
    /// `receiver.name = function(...) {...}` for a singleton method.
    pub(super) fn emit_def(&mut self, node: &Node, is_async: bool) -> ConvertResult<()> {
        let offset = usize::from(node.is(&NodeKind::Defs));
        let shape = if offset == 1 {
            "(defs receiver name (args ...) body)"
        } else {
            "(def name (args ...) body)"
        };
        let name = sym_child(node, offset, shape)?;
        let args = node_child(node, offset + 1, shape)?;
        let body = optional_child(node, offset + 2, shape)?;
        if !is_identifier(name) {
            return Err(ConvertError::unsupported(
                format!("method name '{name}' outside of a class"),
                node,
            ));
        }

        if offset == 1 {
            let receiver = node_child(node, 0, shape)?;
            if receiver.is(&NodeKind::SelfRef) {
                self.put("this");
            } else {
                self.parse_operand(receiver, prec::CALL)?;
            }
            self.put(".");
            self.put(name);
            self.put(" = ");
            if is_async {
                self.put("async ");
            }
            self.put("function");
        } else {
            if is_async {
                self.put("async ");
            }
            self.put("function ");
            self.put(name);
        }
        self.emit_function_tail(args, body, FunctionForm::Method)
    }

    /// `(params) {body}` for a function whose header the caller wrote.
    pub(crate) fn emit_function_tail(
        &mut self,
        args: &Node,
        body: Option<&Node>,
        form: FunctionForm,
    ) -> ConvertResult<()> {
        if !args.is(&NodeKind::Args) {
            return Err(ConvertError::malformed("(args param...)", args));
        }
        let names = param_names(args);
        self.scope.enter_function(body.unwrap_or(args), names, form.inherits());
        let result = self.with_next_token(NextToken::Return, |this| this.emit_params_and_body(args, body, form));
        let pending = self.scope.exit_function();
        let mark = result?;
        self.declare_pending(mark, &pending);
        Ok(())
    }

    /// Returns the offset just inside the body's opening brace.
    fn emit_params_and_body(&mut self, args: &Node, body: Option<&Node>, form: FunctionForm) -> ConvertResult<usize> {
        let prologue = match single_param(args) {
            Some(name) if form == FunctionForm::Arrow => {
                self.put(name);
                Vec::new()
            }
            _ => {
                self.put("(");
                let prologue = self.emit_params(args)?;
                self.put(")");
                prologue
            }
        };
        self.put(if form == FunctionForm::Arrow { " => {" } else { " {" });
        let mark = self.writer.len();
        self.put(&prologue.join("; "));
        if let Some(body) = body {
            let separator = self.writer.len();
            if !prologue.is_empty() {
                self.put("; ");
            }
            let before_len = self.writer.len();
            let body = if form == FunctionForm::Constructor { body.clone() } else { autoreturn(body) };
            self.parse(&body, State::Statement)?;
            if self.writer.len() == before_len {
                self.writer.truncate(separator);
            }
        }
        self.put("}");
        Ok(mark)
    }

    /// Write the parameter list and return the statements legacy levels
    /// need at the top of the body to emulate defaults and rest parameters.
    fn emit_params(&mut self, args: &Node) -> ConvertResult<Vec<String>> {
        let params: Vec<&Node> = args.child_nodes().collect();
        let mut prologue = Vec::new();
        let mut written = 0usize;
        for (index, param) in params.iter().enumerate() {
            let name = param.sym_at(0);
            let rest_follows = index + 1 < params.len();
            match param.kind() {
                NodeKind::Arg | NodeKind::Blockarg => {
                    let name = sym_child(param, 0, "(arg name)")?;
                    if written > 0 {
                        self.put(", ");
                    }
                    self.put(name);
                    written += 1;
                }
                NodeKind::Optarg => {
                    let name = sym_child(param, 0, "(optarg name default)")?;
                    let default = node_child(param, 1, "(optarg name default)")?;
                    if written > 0 {
                        self.put(", ");
                    }
                    self.put(name);
                    written += 1;
                    if self.es2015() {
                        self.put(" = ");
                        self.parse_operand(default, prec::ASSIGN)?;
                    } else {
                        let value = self.capture(|this| this.parse_operand(default, prec::ASSIGN))?;
                        prologue.push(format!("if (typeof {name} === \"undefined\") {name} = {value}"));
                    }
                }
                NodeKind::Restarg => {
                    if rest_follows && !params[index + 1..].iter().all(|p| p.is(&NodeKind::Blockarg)) {
                        return Err(ConvertError::unsupported("parameters after a rest parameter", param));
                    }
                    let Some(name) = name else { continue };
                    if self.es2015() {
                        if written > 0 {
                            self.put(", ");
                        }
                        self.put("...");
                        self.put(name);
                        written += 1;
                    } else {
                        if rest_follows {
                            return Err(ConvertError::unsupported("block parameter after a rest parameter requires es2015", param));
                        }
                        prologue.push(format!(
                            "{} {name} = Array.prototype.slice.call(arguments, {written})",
                            self.es_level().local_keyword()
                        ));
                    }
                }
                NodeKind::Mlhs => {
                    if written > 0 {
                        self.put(", ");
                    }
                    self.emit_mlhs_param(param)?;
                    written += 1;
                }
                _ => return Err(ConvertError::unsupported(format!("parameter of type {}", param.kind()), param)),
            }
        }
        Ok(prologue)
    }

    /// `[a, [b, ...c]]` in a parameter list.
    fn emit_mlhs_param(&mut self, param: &Node) -> ConvertResult<()> {
        if !self.es2015() {
            return Err(ConvertError::unsupported("destructuring parameter requires es2015", param));
        }
        self.put("[");
        for (index, part) in param.child_nodes().enumerate() {
            if index > 0 {
                self.put(", ");
            }
            match part.kind() {
                NodeKind::Mlhs => self.emit_mlhs_param(part)?,
                NodeKind::Restarg => {
                    self.put("...");
                    self.put(sym_child(part, 0, "(restarg name)")?);
                }
                _ => self.put(sym_child(part, 0, "(arg name)")?),
            }
        }
        self.put("]");
        Ok(())
    }

    // =========================================================================
    // Blocks
    // =========================================================================

    /// A lambda becomes an arrow function (or a function expression on
    /// legacy levels); any other block is passed as the call's last
    /// argument.
    pub(super) fn emit_block(&mut self, node: &Node) -> ConvertResult<()> {
        const SHAPE: &str = "(block call (args ...) body)";
        let call = node_child(node, 0, SHAPE)?;
        let args = node_child(node, 1, SHAPE)?;
        let body = optional_child(node, 2, SHAPE)?;

        if !is_lambda_block(node) {
            if call.is(&NodeKind::Zsuper) {
                return Err(ConvertError::unsupported("block passed to an implicit super call", node));
            }
            let lambda = s!(Block, s!(Send, Child::Nil, "proc"), args, body.cloned());
            let mut children = call.children().to_vec();
            children.push(Child::from(lambda));
            let call = call.with_children(children);
            return self.parse(&call, self.state);
        }

        if !self.es2015() {
            self.put("function");
            return self.emit_function_tail(args, body, FunctionForm::Closure);
        }
        self.emit_arrow(args, body)
    }

    fn emit_arrow(&mut self, args: &Node, body: Option<&Node>) -> ConvertResult<()> {
        // An arrow body already returns its value.
        let body = match body {
            Some(body) if body.is(&NodeKind::Autoreturn) && body.len() == 1 => body.node_at(0),
            other => other,
        };
        let Some(expression) = body.filter(|body| is_expression_body(body)) else {
            return self.emit_function_tail(args, body, FunctionForm::Arrow);
        };
        if !args.is(&NodeKind::Args) {
            return Err(ConvertError::malformed("(args param...)", args));
        }

        let names = param_names(args);
        self.scope.enter_function(expression, names, true);
        let result = self.with_next_token(NextToken::Return, |this| {
            match single_param(args) {
                Some(name) => this.put(name),
                None => {
                    this.put("(");
                    this.emit_params(args)?;
                    this.put(")");
                }
            }
            this.put(" => ");
            if expression.is(&NodeKind::Hash) {
                this.put("(");
                this.parse(expression, State::Expression)?;
                this.put(")");
                Ok(())
            } else {
                this.parse_operand(expression, prec::ASSIGN)
            }
        });
        self.scope.exit_function();
        result
    }
}
