//! Code generator.
//!
//! One handler per node type. A handler receives its node with children
//! unconverted and explicitly asks for each child it wants emitted, which
//! lets it choose the order, drop a child, or splice it into a different
//! surrounding expression.
//!
//! Output is compact: statements are joined with `; `, blocks are written
//! `{...}` and there are no trailing semicolons.
//!
//! Handlers are split by concern:
//! - `literals` - numbers, strings, symbols, arrays, hashes, interpolation
//! - `variables` - locals, instance/global variables, constants, compound assignment
//! - `masgn` - multiple assignment strategies
//! - `calls` - method calls, operators and precedence
//! - `control_flow` - sequences, conditionals, loops, jumps, exceptions
//! - `functions` - methods, blocks, parameters, implicit return
//! - `classes` - classes, modules, `super`
//! - `regexp` - regular expression literals

mod calls;
mod classes;
mod control_flow;
mod functions;
mod literals;
mod masgn;
mod regexp;
mod variables;

pub(crate) use functions::autoreturn;

use crate::error::{ConvertError, ConvertResult};
use crate::options::ConvertOptions;
use crate::scope::ScopeTracker;
use crate::writer::Writer;
use rbjs_common::EsLevel;
use rbjs_common::limits::MAX_EMIT_DEPTH;
use rbjs_tree::{Node, NodeKind};
use rustc_hash::FxHashSet;
use std::sync::Arc;
use tracing::debug;

/// Whether a node is being emitted where a statement or an expression is
/// expected.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum State {
    Statement,
    Expression,
}

/// What a local next-iteration jump (`next`) turns into.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum NextToken {
    /// Inside a loop body.
    Continue,
    /// Inside a block, which becomes a function.
    Return,
}

/// An enclosing class or module body, for qualified-name resolution.
#[derive(Clone, Debug)]
pub(crate) struct BodyScope {
    /// The body's own name, as a `const` node.
    pub(crate) owner: Node,
    /// Constants, classes and modules defined directly in the body.
    pub(crate) members: FxHashSet<Arc<str>>,
}

/// The method being emitted, for `super`.
#[derive(Clone, Debug)]
pub(crate) struct MethodFrame {
    pub(crate) name: Arc<str>,
    pub(crate) params: Vec<Node>,
    pub(crate) superclass: Option<Node>,
    pub(crate) constructor: bool,
    pub(crate) singleton: bool,
}

/// Converts one normalized tree into target text.
///
/// All state (output, scope table, name-resolution stack) is owned by the
/// converter and dropped with it.
pub struct Converter<'a> {
    options: &'a ConvertOptions,
    writer: Writer,
    scope: ScopeTracker,
    state: State,
    next_token: NextToken,
    rbstack: Vec<BodyScope>,
    methods: Vec<MethodFrame>,
    depth: u32,
}

impl<'a> Converter<'a> {
    pub fn new(options: &'a ConvertOptions) -> Self {
        Converter {
            options,
            writer: Writer::new(),
            scope: ScopeTracker::new(options.es_level),
            state: State::Statement,
            next_token: NextToken::Return,
            rbstack: Vec::new(),
            methods: Vec::new(),
            depth: 0,
        }
    }

    /// Emit `program` as a sequence of top-level statements.
    #[tracing::instrument(level = "debug", skip_all, fields(es_level = %self.options.es_level))]
    pub fn convert(mut self, program: &Node) -> ConvertResult<String> {
        self.scope.enter_function(program, [], false);
        let result = self.parse(program, State::Statement);
        let pending = self.scope.exit_function();
        result?;
        self.declare_pending(0, &pending);
        let output = self.writer.into_string();
        debug!(bytes = output.len(), "conversion finished");
        Ok(output)
    }

    // =========================================================================
    // Dispatch
    // =========================================================================

    /// Emit `node` in the given state. Every handler goes through here.
    pub(crate) fn parse(&mut self, node: &Node, state: State) -> ConvertResult<()> {
        if self.depth >= MAX_EMIT_DEPTH {
            return Err(ConvertError::TooDeep {
                node: Box::new(node.clone()),
            });
        }
        self.depth += 1;
        let saved = std::mem::replace(&mut self.state, state);
        let result = self.dispatch(node);
        self.state = saved;
        self.depth -= 1;
        result
    }

    fn dispatch(&mut self, node: &Node) -> ConvertResult<()> {
        match node.kind() {
            NodeKind::Int => self.emit_int(node),
            NodeKind::Float => self.emit_float(node),
            NodeKind::Str | NodeKind::Sym => self.emit_str(node),
            NodeKind::Dstr | NodeKind::Dsym => self.emit_dstr(node),
            NodeKind::Nil => self.put_literal("null"),
            NodeKind::True => self.put_literal("true"),
            NodeKind::False => self.put_literal("false"),
            NodeKind::SelfRef => self.put_literal("this"),
            NodeKind::Array => self.emit_array(node),
            NodeKind::Hash => self.emit_hash(node),
            NodeKind::Octal => self.emit_octal(node),
            NodeKind::Regexp => self.emit_regexp(node),

            NodeKind::Lvar => self.emit_lvar(node),
            NodeKind::Lvasgn => self.emit_lvasgn(node),
            NodeKind::Ivar => self.emit_ivar(node),
            NodeKind::Ivasgn => self.emit_ivasgn(node),
            NodeKind::Gvar => self.emit_gvar(node),
            NodeKind::Gvasgn => self.emit_gvasgn(node),
            NodeKind::Const => self.emit_const(node),
            NodeKind::Casgn => self.emit_casgn(node),
            NodeKind::Masgn => self.emit_masgn(node),
            NodeKind::Mlhs => self.emit_mlhs(node),
            NodeKind::OpAsgn => self.emit_op_asgn(node),
            NodeKind::OrAsgn | NodeKind::AndAsgn => self.emit_logical_asgn(node),

            NodeKind::Send | NodeKind::Csend | NodeKind::Attr | NodeKind::Call => self.emit_send(node),
            NodeKind::BlockPass => self.emit_block_pass(node),
            NodeKind::Block => self.emit_block(node),
            NodeKind::Super | NodeKind::Zsuper => self.emit_super(node),

            NodeKind::And | NodeKind::Or => self.emit_logical(node),
            NodeKind::Not => self.emit_not(node),
            NodeKind::Begin | NodeKind::Kwbegin => self.emit_begin(node),
            NodeKind::Rescue | NodeKind::Ensure => self.emit_try(node),
            NodeKind::If => self.emit_if(node),
            NodeKind::While | NodeKind::Until => self.emit_while(node),
            NodeKind::WhilePost | NodeKind::UntilPost => self.emit_while_post(node),
            NodeKind::For => self.emit_for(node),
            NodeKind::Next => self.emit_next(node),
            NodeKind::Break => self.emit_break(node),
            NodeKind::Return => self.emit_return(node),
            NodeKind::Autoreturn => self.emit_autoreturn(node),

            NodeKind::Def | NodeKind::Defs => self.emit_def(node, false),
            NodeKind::Class => self.emit_class(node),
            NodeKind::Module => self.emit_module(node),

            NodeKind::Irange | NodeKind::Erange => {
                Err(ConvertError::unsupported("range outside of a for loop", node))
            }
            NodeKind::Splat => Err(ConvertError::unsupported(
                "splat outside of an array or argument list",
                node,
            )),
            NodeKind::Xstr => Err(ConvertError::unsupported("backtick command", node)),
            NodeKind::FileMacro => Err(ConvertError::unsupported("__FILE__", node)),
            NodeKind::Cbase => Err(ConvertError::malformed("(const (cbase) name)", node)),
            NodeKind::Pair => Err(ConvertError::malformed("pair inside (hash ...)", node)),
            NodeKind::Regopt => Err(ConvertError::malformed("regopt inside (regexp ...)", node)),
            NodeKind::Resbody => Err(ConvertError::malformed("resbody inside (rescue ...)", node)),
            NodeKind::Args
            | NodeKind::Arg
            | NodeKind::Optarg
            | NodeKind::Restarg
            | NodeKind::Blockarg => Err(ConvertError::malformed("arguments inside a method or block", node)),
            NodeKind::Custom(name) => Err(ConvertError::unsupported(
                format!("unknown node type '{name}'"),
                node,
            )),
        }
    }

    // =========================================================================
    // Output helpers
    // =========================================================================

    #[inline]
    pub(crate) fn put(&mut self, text: &str) {
        self.writer.put(text);
    }

    fn put_literal(&mut self, text: &str) -> ConvertResult<()> {
        self.put(text);
        Ok(())
    }

    /// Run `emit` and return what it wrote instead of keeping it in the
    /// output.
    pub(crate) fn capture(&mut self, emit: impl FnOnce(&mut Self) -> ConvertResult<()>) -> ConvertResult<String> {
        let mark = self.writer.len();
        let result = emit(self);
        let text = self.writer.split_off(mark);
        result.map(|()| text)
    }

    /// Insert the declaration of still-pending names at `mark`.
    fn declare_pending(&mut self, mark: usize, pending: &[Arc<str>]) {
        if pending.is_empty() {
            return;
        }
        let names: Vec<&str> = pending.iter().map(|name| &**name).collect();
        let declaration = format!("{} {}; ", self.es_level().local_keyword(), names.join(", "));
        self.writer.insert(mark, &declaration);
    }

    /// Run `emit` with `token` as the meaning of `next`, restoring the
    /// previous meaning on every exit path.
    pub(crate) fn with_next_token<T>(
        &mut self,
        token: NextToken,
        emit: impl FnOnce(&mut Self) -> ConvertResult<T>,
    ) -> ConvertResult<T> {
        let saved = std::mem::replace(&mut self.next_token, token);
        let result = emit(self);
        self.next_token = saved;
        result
    }

    /// Emit `{body}` as a nested block with its own scope frame.
    pub(crate) fn emit_block_body(&mut self, body: Option<&Node>, owner: &Node) -> ConvertResult<()> {
        self.put("{");
        self.scope.enter_block(body.unwrap_or(owner));
        let result = match body {
            Some(body) => self.parse(body, State::Statement),
            None => Ok(()),
        };
        self.scope.exit_block();
        result?;
        self.put("}");
        Ok(())
    }

    #[inline]
    pub(crate) fn es_level(&self) -> EsLevel {
        self.options.es_level
    }

    #[inline]
    pub(crate) fn es2015(&self) -> bool {
        self.options.es2015()
    }

    #[inline]
    pub(crate) fn is_statement(&self) -> bool {
        self.state == State::Statement
    }
}

// =============================================================================
// Shape helpers
// =============================================================================

/// The node child at `index`, or a malformed-input error.
pub(crate) fn node_child<'n>(node: &'n Node, index: usize, expected: &str) -> ConvertResult<&'n Node> {
    node.node_at(index)
        .ok_or_else(|| ConvertError::malformed(expected, node))
}

/// The child at `index` when it is a node, `None` when it is `nil` or
/// absent, and an error for any other literal.
pub(crate) fn optional_child<'n>(node: &'n Node, index: usize, expected: &str) -> ConvertResult<Option<&'n Node>> {
    if node.is_nil_at(index) {
        Ok(None)
    } else {
        node_child(node, index, expected).map(Some)
    }
}

/// The symbol child at `index`, or a malformed-input error.
pub(crate) fn sym_child<'n>(node: &'n Node, index: usize, expected: &str) -> ConvertResult<&'n str> {
    node.sym_at(index)
        .ok_or_else(|| ConvertError::malformed(expected, node))
}

/// Statements of a body: the children of a `begin`, or the node itself.
pub(crate) fn statements(body: Option<&Node>) -> Vec<&Node> {
    match body {
        None => Vec::new(),
        Some(body) if body.is(&NodeKind::Begin) => body.child_nodes().collect(),
        Some(body) => vec![body],
    }
}

/// A plain JavaScript identifier.
pub(crate) fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}
