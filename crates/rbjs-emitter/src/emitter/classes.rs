//! Classes, modules and `super`.
//!
//! Block-scoped levels emit `class` declarations; legacy levels emit a
//! constructor function followed by prototype assignments. Modules become
//! object literals. Constants, classes and modules defined in a body are
//! assigned onto the owner after the body, with the body's frame on the
//! name-resolution stack so references inside resolve to `Owner.Name`.

use super::calls::prec;
use super::functions::FunctionForm;
use super::{BodyScope, Converter, MethodFrame, State, is_identifier, node_child, optional_child, statements, sym_child};
use crate::error::{ConvertError, ConvertResult};
use rbjs_tree::{Node, NodeKind, s};
use rustc_hash::FxHashSet;
use std::sync::Arc;

/// How a method definition is exposed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum MethodShape {
    Constructor,
    Getter,
    Setter,
    Plain,
}

/// A method definition inside a class or module body.
struct MethodDef<'n> {
    node: &'n Node,
    name: &'n str,
    args: &'n Node,
    body: Option<&'n Node>,
    shape: MethodShape,
    singleton: bool,
    is_async: bool,
}

impl<'n> MethodDef<'n> {
    /// Recognize `def`, `def self.x` and `async def`.
    fn parse(statement: &'n Node, in_class: bool) -> ConvertResult<Option<MethodDef<'n>>> {
        let (node, is_async) = match statement.kind() {
            NodeKind::Send
                if statement.is_nil_at(0)
                    && statement.sym_at(1) == Some("async")
                    && statement.node_at(2).is_some_and(|def| matches!(def.kind(), NodeKind::Def | NodeKind::Defs)) =>
            {
                (node_child(statement, 2, "(send nil :async (def ...))")?, true)
            }
            NodeKind::Def | NodeKind::Defs => (statement, false),
            _ => return Ok(None),
        };

        let singleton = node.is(&NodeKind::Defs);
        let offset = usize::from(singleton);
        const SHAPE: &str = "(def name (args ...) body)";
        if singleton && !node_child(node, 0, SHAPE)?.is(&NodeKind::SelfRef) {
            return Err(ConvertError::unsupported("singleton method on an object other than self", node));
        }
        let name = sym_child(node, offset, SHAPE)?;
        let args = node_child(node, offset + 1, SHAPE)?;
        let body = optional_child(node, offset + 2, SHAPE)?;

        let shape = if in_class && !singleton && name == "initialize" {
            MethodShape::Constructor
        } else if name.strip_suffix('=').is_some_and(is_identifier) && args.len() == 1 {
            MethodShape::Setter
        } else if args.is_empty() && !node.is_method() {
            MethodShape::Getter
        } else {
            MethodShape::Plain
        };
        if matches!(shape, MethodShape::Getter | MethodShape::Plain) && !is_identifier(name) {
            return Err(ConvertError::unsupported(
                format!("method name '{name}' has no JavaScript equivalent"),
                node,
            ));
        }
        Ok(Some(MethodDef {
            node,
            name,
            args,
            body,
            shape,
            singleton,
            is_async,
        }))
    }

    /// The JavaScript member name.
    fn js_name(&self) -> &'n str {
        match self.shape {
            MethodShape::Constructor => "constructor",
            MethodShape::Setter => self.name.strip_suffix('=').unwrap_or(self.name),
            _ => self.name,
        }
    }

    fn form(&self) -> FunctionForm {
        match self.shape {
            MethodShape::Constructor | MethodShape::Setter => FunctionForm::Constructor,
            _ => FunctionForm::Method,
        }
    }
}

/// `attr_reader`/`attr_writer`/`attr_accessor` declarations.
fn accessors(statement: &Node) -> Option<(bool, bool, Vec<&str>)> {
    if !statement.is(&NodeKind::Send) || !statement.is_nil_at(0) {
        return None;
    }
    let (reader, writer) = match statement.sym_at(1)? {
        "attr_reader" => (true, false),
        "attr_writer" => (false, true),
        "attr_accessor" => (true, true),
        _ => return None,
    };
    let names = statement
        .child_nodes()
        .map(|name| name.sym_at(0).filter(|name| is_identifier(name)))
        .collect::<Option<Vec<_>>>()?;
    (names.len() + 2 == statement.len()).then_some((reader, writer, names))
}

/// Statements assigned onto the owner after the body.
fn is_owner_assignment(statement: &Node) -> bool {
    matches!(statement.kind(), NodeKind::Casgn | NodeKind::Class | NodeKind::Module)
}

/// Names defined directly in a body.
fn body_members(statements: &[&Node]) -> FxHashSet<Arc<str>> {
    statements
        .iter()
        .filter_map(|statement| match statement.kind() {
            NodeKind::Casgn if statement.is_nil_at(0) => statement.sym_at(1),
            NodeKind::Class | NodeKind::Module => statement
                .node_at(0)
                .filter(|name| name.is(&NodeKind::Const) && name.is_nil_at(0))
                .and_then(|name| name.sym_at(1)),
            _ => None,
        })
        .map(Arc::from)
        .collect()
}

/// `super` arguments implied by a method's own parameters.
fn forwarded_params(params: &[Node]) -> Vec<Node> {
    params
        .iter()
        .filter_map(|param| {
            let name = param.sym_at(0)?;
            Some(match param.kind() {
                NodeKind::Restarg => s!(Splat, s!(Lvar, name)),
                _ => s!(Lvar, name),
            })
        })
        .collect()
}

impl<'a> Converter<'a> {
    // =========================================================================
    // Classes
    // =========================================================================

    pub(super) fn emit_class(&mut self, node: &Node) -> ConvertResult<()> {
        const SHAPE: &str = "(class (const scope name) superclass body)";
        let name_node = node_child(node, 0, SHAPE)?;
        let name = owner_name(name_node)?;
        let superclass = optional_child(node, 1, SHAPE)?;
        let body = statements(optional_child(node, 2, SHAPE)?);

        // Resolved before the class's own frame is pushed.
        let reference = self.capture(|this| this.parse(name_node, State::Expression))?;
        self.rbstack.push(BodyScope {
            owner: name_node.clone(),
            members: body_members(&body),
        });
        let result = if self.es2015() {
            self.emit_class_es2015(name, &reference, superclass, &body)
        } else {
            self.emit_class_legacy(name, &reference, superclass, &body)
        };
        self.rbstack.pop();
        result
    }

    fn emit_class_es2015(
        &mut self,
        name: &str,
        reference: &str,
        superclass: Option<&Node>,
        body: &[&Node],
    ) -> ConvertResult<()> {
        if reference != name {
            self.put(reference);
            self.put(" = ");
        }
        self.put("class ");
        self.put(name);
        if let Some(superclass) = superclass {
            self.put(" extends ");
            self.parse_operand(superclass, prec::CALL)?;
        }
        self.put(" {");
        let mut first = true;
        for statement in body.iter().filter(|statement| !is_owner_assignment(statement)) {
            if !first {
                self.put("; ");
            }
            first = false;
            if let Some((reader, writer, names)) = accessors(statement) {
                let members: Vec<String> = names
                    .iter()
                    .flat_map(|name| {
                        let get = reader.then(|| format!("get {name}() {{return this._{name}}}"));
                        let set = writer.then(|| format!("set {name}({name}) {{this._{name} = {name}}}"));
                        get.into_iter().chain(set)
                    })
                    .collect();
                self.put(&members.join("; "));
                continue;
            }
            let Some(method) = MethodDef::parse(statement, true)? else {
                return Err(ConvertError::unsupported("statement in a class body", statement));
            };
            if method.singleton {
                self.put("static ");
            }
            if method.is_async {
                self.put("async ");
            }
            match method.shape {
                MethodShape::Getter => self.put("get "),
                MethodShape::Setter => self.put("set "),
                _ => {}
            }
            self.put(method.js_name());
            self.emit_method_body(&method, superclass)?;
        }
        self.put("}");
        self.emit_owner_assignments(body)
    }

    fn emit_class_legacy(
        &mut self,
        name: &str,
        reference: &str,
        superclass: Option<&Node>,
        body: &[&Node],
    ) -> ConvertResult<()> {
        let mut methods = Vec::new();
        for statement in body.iter().filter(|statement| !is_owner_assignment(statement)) {
            if accessors(statement).is_some() {
                continue;
            }
            match MethodDef::parse(statement, true)? {
                Some(method) if method.is_async => {
                    return Err(ConvertError::unsupported("async requires es2017", method.node));
                }
                Some(method) => methods.push(method),
                None => return Err(ConvertError::unsupported("statement in a class body", statement)),
            }
        }

        let parent = match superclass {
            Some(superclass) => Some(self.capture(|this| this.parse_operand(superclass, prec::CALL))?),
            None => None,
        };

        if reference == name {
            self.put("function ");
            self.put(name);
        } else {
            self.put(reference);
            self.put(" = function");
        }
        match methods.iter().find(|method| method.shape == MethodShape::Constructor) {
            Some(constructor) => self.emit_method_body(constructor, superclass)?,
            None => match &parent {
                Some(parent) => {
                    self.put("() {");
                    self.put(parent);
                    self.put(".apply(this, arguments)}");
                }
                None => self.put("() {}"),
            },
        }

        if let Some(parent) = &parent {
            self.put(&format!(
                "; {reference}.prototype = Object.create({parent}.prototype); {reference}.prototype.constructor = {reference}"
            ));
        }

        for statement in body.iter().filter(|statement| !is_owner_assignment(statement)) {
            if let Some((reader, writer, names)) = accessors(statement) {
                for name in names {
                    let mut parts = Vec::new();
                    if reader {
                        parts.push(format!("get: function() {{return this._{name}}}"));
                    }
                    if writer {
                        parts.push(format!("set: function({name}) {{this._{name} = {name}}}"));
                    }
                    self.put(&format!(
                        "; Object.defineProperty({reference}.prototype, \"{name}\", {{enumerable: true, configurable: true, {}}})",
                        parts.join(", ")
                    ));
                }
                continue;
            }
            let Some(method) = MethodDef::parse(statement, true)? else {
                continue;
            };
            let target = if method.singleton {
                reference.to_string()
            } else {
                format!("{reference}.prototype")
            };
            match method.shape {
                MethodShape::Constructor => continue,
                MethodShape::Plain => {
                    self.put(&format!("; {target}.{} = function", method.js_name()));
                    self.emit_method_body(&method, superclass)?;
                }
                MethodShape::Getter | MethodShape::Setter => {
                    let accessor = if method.shape == MethodShape::Getter { "get" } else { "set" };
                    self.put(&format!(
                        "; Object.defineProperty({target}, \"{}\", {{enumerable: true, configurable: true, {accessor}: function",
                        method.js_name()
                    ));
                    self.emit_method_body(&method, superclass)?;
                    self.put("})");
                }
            }
        }
        self.emit_owner_assignments(body)
    }

    /// `(params) {body}` of a method, with its frame available to `super`.
    fn emit_method_body(&mut self, method: &MethodDef<'_>, superclass: Option<&Node>) -> ConvertResult<()> {
        self.methods.push(MethodFrame {
            name: Arc::from(method.js_name()),
            params: method.args.child_nodes().cloned().collect(),
            superclass: superclass.cloned(),
            constructor: method.shape == MethodShape::Constructor,
            singleton: method.singleton,
        });
        let result = self.emit_function_tail(method.args, method.body, method.form());
        self.methods.pop();
        result
    }

    /// `; Owner.X = ...` for the constants and nested bodies of a body.
    fn emit_owner_assignments(&mut self, body: &[&Node]) -> ConvertResult<()> {
        for statement in body.iter().filter(|statement| is_owner_assignment(statement)) {
            let mark = self.writer.len();
            self.put("; ");
            let before_len = self.writer.len();
            self.parse(statement, State::Statement)?;
            if self.writer.len() == before_len {
                self.writer.truncate(mark);
            }
        }
        Ok(())
    }

    // =========================================================================
    // Modules
    // =========================================================================

    pub(super) fn emit_module(&mut self, node: &Node) -> ConvertResult<()> {
        const SHAPE: &str = "(module (const scope name) body)";
        let name_node = node_child(node, 0, SHAPE)?;
        let name = owner_name(name_node)?;
        let body = statements(optional_child(node, 1, SHAPE)?);

        let reference = self.capture(|this| this.parse(name_node, State::Expression))?;
        if reference == name && self.is_statement() {
            self.put(self.es_level().constant_keyword());
            self.put(" ");
        }
        self.put(&reference);
        self.put(" = ");

        self.rbstack.push(BodyScope {
            owner: name_node.clone(),
            members: body_members(&body),
        });
        let result = self.emit_module_body(&body);
        self.rbstack.pop();
        result
    }

    fn emit_module_body(&mut self, body: &[&Node]) -> ConvertResult<()> {
        self.put("{");
        let mut first = true;
        for statement in body.iter().filter(|statement| !is_owner_assignment(statement)) {
            if statement.is(&NodeKind::Send) && statement.is_nil_at(0) && statement.sym_at(1) == Some("module_function") {
                continue;
            }
            let Some(method) = MethodDef::parse(statement, false)? else {
                return Err(ConvertError::unsupported("statement in a module body", statement));
            };
            if !first {
                self.put(", ");
            }
            first = false;
            if method.is_async {
                self.put("async ");
            }
            match method.shape {
                MethodShape::Getter => self.put("get "),
                MethodShape::Setter => self.put("set "),
                _ => {}
            }
            self.put(method.js_name());
            if method.shape == MethodShape::Plain && !self.es2015() {
                self.put(": function");
            }
            self.emit_method_body(&method, None)?;
        }
        self.put("}");
        self.emit_owner_assignments(body)
    }

    // =========================================================================
    // super
    // =========================================================================

    pub(super) fn emit_super(&mut self, node: &Node) -> ConvertResult<()> {
        let Some(frame) = self.methods.last().cloned() else {
            return Err(ConvertError::unsupported("super outside of a method", node));
        };
        let Some(superclass) = frame.superclass.as_ref() else {
            return Err(ConvertError::unsupported("super in a class without a superclass", node));
        };

        let implicit = node.is(&NodeKind::Zsuper);
        let forwarded = if implicit { forwarded_params(&frame.params) } else { Vec::new() };
        let args: Vec<&Node> = if implicit {
            forwarded.iter().collect()
        } else {
            node.children()
                .iter()
                .map(|child| child.as_node().ok_or_else(|| ConvertError::malformed("(super arg...)", node)))
                .collect::<ConvertResult<_>>()?
        };

        if self.es2015() {
            self.put("super");
            if !frame.constructor {
                self.put(".");
                self.put(&frame.name);
            }
            self.put("(");
            self.emit_arguments(&args)?;
            self.put(")");
            return Ok(());
        }

        self.parse_operand(superclass, prec::CALL)?;
        if !frame.constructor {
            if !frame.singleton {
                self.put(".prototype");
            }
            self.put(".");
            self.put(&frame.name);
        }
        if implicit {
            self.put(".apply(this, arguments)");
            return Ok(());
        }
        if args.iter().any(|arg| arg.is(&NodeKind::Splat)) {
            self.put(".apply(this, ");
            self.emit_elements(&args, node)?;
            self.put(")");
            return Ok(());
        }
        self.put(".call(this");
        for arg in &args {
            self.put(", ");
            self.parse_operand(arg, prec::ASSIGN)?;
        }
        self.put(")");
        Ok(())
    }
}

/// The simple name of a class or module, from its `(const scope name)`.
fn owner_name(name: &Node) -> ConvertResult<&str> {
    if !name.is(&NodeKind::Const) {
        return Err(ConvertError::malformed("(const scope name)", name));
    }
    let text = sym_child(name, 1, "(const scope name)")?;
    if !is_identifier(text) {
        return Err(ConvertError::malformed("(const scope name)", name));
    }
    Ok(text)
}
