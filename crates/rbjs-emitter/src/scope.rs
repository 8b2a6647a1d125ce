//! Scope tracking and declaration-keyword selection.
//!
//! The tracker owns the table of names bound in the function scope being
//! emitted. Each entry is either committed (its declaration has been
//! emitted) or pending (it still needs one; pending names are declared in a
//! single `let a, b; ` / `var a, b; ` statement inserted at the top of the
//! function body when the body is done).
//!
//! Legacy levels only have function-scoped `var`: blocks share the function's
//! table and only the first assignment of a name declares it.
//!
//! With block scoping, entering a block copies the table (every entry
//! committed from the block's point of view) and leaving it discards names
//! declared inside, keeping only pending ones. A first assignment inside a
//! block of a name that is also referenced outside the block is made pending
//! instead of getting `let`, so the declaration lands where every use can
//! see it.
//!
//! The tracker is conversion-local and never shared.

use indexmap::IndexMap;
use rbjs_common::EsLevel;
use rbjs_tree::{Node, NodeKind};
use rustc_hash::FxBuildHasher;
use std::sync::Arc;
use tracing::trace;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BindingState {
    /// Needs a declaration at the top of the enclosing function.
    Pending,
    /// Declared (or a parameter).
    Committed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScopeEntry {
    pub state: BindingState,
    /// Lexical depth (functions and blocks) where the entry was created.
    pub depth: u32,
}

type VarMap = IndexMap<Arc<str>, ScopeEntry, FxBuildHasher>;

struct SavedFrame {
    /// `None` for legacy blocks, which share the function's table.
    vars: Option<VarMap>,
    inner: Option<Node>,
    function: bool,
}

pub struct ScopeTracker {
    es_level: EsLevel,
    vars: VarMap,
    saved: Vec<SavedFrame>,
    /// Bodies of the enclosing function scopes, innermost last.
    roots: Vec<Node>,
    /// Innermost block inside the current function scope.
    inner: Option<Node>,
    depth: u32,
}

impl ScopeTracker {
    pub fn new(es_level: EsLevel) -> Self {
        ScopeTracker {
            es_level,
            vars: VarMap::default(),
            saved: Vec::new(),
            roots: Vec::new(),
            inner: None,
            depth: 0,
        }
    }

    #[inline]
    pub fn es_level(&self) -> EsLevel {
        self.es_level
    }

    #[inline]
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Enter a function body. Closures (`inherit`) see every name bound in
    /// the enclosing scope; methods start with only their parameters.
    pub fn enter_function<'n>(&mut self, body: &Node, params: impl IntoIterator<Item = &'n str>, inherit: bool) {
        let mut vars = if inherit {
            self.vars
                .iter()
                .map(|(name, entry)| {
                    let entry = ScopeEntry {
                        state: BindingState::Committed,
                        depth: entry.depth,
                    };
                    (Arc::clone(name), entry)
                })
                .collect()
        } else {
            VarMap::default()
        };
        self.depth += 1;
        for param in params {
            vars.insert(Arc::from(param), self.committed());
        }
        self.saved.push(SavedFrame {
            vars: Some(std::mem::replace(&mut self.vars, vars)),
            inner: self.inner.take(),
            function: true,
        });
        self.roots.push(body.clone());
    }

    /// Leave a function body, returning the names that still need a
    /// declaration at its top, in first-use order.
    pub fn exit_function(&mut self) -> Vec<Arc<str>> {
        let pending = self.pending_names();
        // Unwind any blocks left open by an aborted body.
        while let Some(frame) = self.saved.pop() {
            let function = frame.function;
            self.restore(frame);
            if function {
                break;
            }
        }
        self.roots.pop();
        pending
    }

    /// Enter a nested block (a branch, loop or `try` body).
    pub fn enter_block(&mut self, block: &Node) {
        let vars = if self.es_level.is_block_scoped() {
            let copy = self
                .vars
                .iter()
                .map(|(name, entry)| {
                    let entry = ScopeEntry {
                        state: BindingState::Committed,
                        depth: entry.depth,
                    };
                    (Arc::clone(name), entry)
                })
                .collect();
            Some(std::mem::replace(&mut self.vars, copy))
        } else {
            None
        };
        self.saved.push(SavedFrame {
            vars,
            inner: self.inner.replace(block.clone()),
            function: false,
        });
        self.depth += 1;
    }

    /// Leave a nested block. Names that went pending inside it stay pending
    /// in the enclosing scope.
    pub fn exit_block(&mut self) {
        if let Some(frame) = self.saved.pop() {
            self.restore(frame);
        }
    }

    fn restore(&mut self, frame: SavedFrame) {
        if let Some(outer) = frame.vars {
            let inner = std::mem::replace(&mut self.vars, outer);
            if !frame.function {
                for (name, entry) in inner {
                    if entry.state == BindingState::Pending {
                        self.vars.insert(name, entry);
                    }
                }
            }
        }
        self.inner = frame.inner;
        self.depth = self.depth.saturating_sub(1);
    }

    pub fn is_declared(&self, name: &str) -> bool {
        self.vars.contains_key(name)
    }

    pub fn entry(&self, name: &str) -> Option<ScopeEntry> {
        self.vars.get(name).copied()
    }

    /// Bind a name that needs no keyword of its own (parameters, `catch`
    /// bindings, loop variables declared in the loop header).
    pub fn declare(&mut self, name: &str) {
        let entry = self.committed();
        self.vars.insert(Arc::from(name), entry);
    }

    /// Decide the declaration keyword for an assignment to `name`.
    ///
    /// Returns the keyword to emit in front of the assignment, or `None`
    /// when the name is already bound or has been deferred to the top of the
    /// function. Assignments in expression position never carry a keyword.
    pub fn assign(&mut self, name: &str, statement: bool) -> Option<&'static str> {
        if self.vars.contains_key(name) {
            return None;
        }
        if !statement {
            trace!(name, "binding deferred: assignment in expression position");
            self.mark_pending(name);
            return None;
        }
        if self.es_level.is_block_scoped() && self.inner.is_some() && self.referenced_outside_block(name) {
            trace!(name, "binding deferred: referenced outside the current block");
            self.mark_pending(name);
            return None;
        }
        trace!(name, keyword = self.es_level.local_keyword(), "binding declared");
        let entry = self.committed();
        self.vars.insert(Arc::from(name), entry);
        Some(self.es_level.local_keyword())
    }

    /// Declare `name` ahead of a construct that assigns it where no keyword
    /// may appear (a loop condition). Returns the keyword if a declaration
    /// is needed.
    pub fn hoist(&mut self, name: &str) -> Option<&'static str> {
        if self.vars.contains_key(name) {
            return None;
        }
        trace!(name, "binding hoisted");
        let entry = self.committed();
        self.vars.insert(Arc::from(name), entry);
        Some(self.es_level.local_keyword())
    }

    /// Split `names` into those not yet bound anywhere visible and those
    /// already bound, preserving order.
    pub fn partition_new<'n>(&self, names: &[&'n str]) -> (Vec<&'n str>, Vec<&'n str>) {
        names.iter().copied().partition(|name| !self.vars.contains_key(*name))
    }

    /// Names currently waiting for a declaration.
    pub fn pending_names(&self) -> Vec<Arc<str>> {
        self.vars
            .iter()
            .filter(|(_, entry)| entry.state == BindingState::Pending)
            .map(|(name, _)| Arc::clone(name))
            .collect()
    }

    fn mark_pending(&mut self, name: &str) {
        let depth = self.depth;
        self.vars.insert(
            Arc::from(name),
            ScopeEntry {
                state: BindingState::Pending,
                depth,
            },
        );
    }

    fn committed(&self) -> ScopeEntry {
        ScopeEntry {
            state: BindingState::Committed,
            depth: self.depth,
        }
    }

    /// Whether the current function body mentions `name` outside the
    /// innermost block. Nested method, class and module bodies are separate
    /// scopes and are not searched.
    fn referenced_outside_block(&self, name: &str) -> bool {
        let (Some(root), Some(inner)) = (self.roots.last(), self.inner.as_ref()) else {
            return false;
        };
        let mentions = |node: &Node| {
            matches!(node.kind(), NodeKind::Lvar | NodeKind::Lvasgn) && node.sym_at(0) == Some(name)
        };
        let prune = |node: &Node| node.kind().opens_scope();
        root.count_where(&mentions, &prune) > inner.count_where(&mentions, &prune)
    }
}

#[cfg(test)]
#[path = "../tests/scope_tests.rs"]
mod tests;
