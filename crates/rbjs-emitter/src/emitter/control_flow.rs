//! Sequences, conditionals, loops, jumps and exception handling.

use super::calls::prec;
use super::masgn::collect_locals;
use super::{Converter, NextToken, State, autoreturn, node_child, optional_child, sym_child};
use crate::error::{ConvertError, ConvertResult};
use rbjs_tree::{Child, Node, NodeKind};

/// Binding used for the caught value when dispatching on exception classes.
const EXCEPTION: &str = "$EXCEPTION";

impl<'a> Converter<'a> {
    // =========================================================================
    // Sequences
    // =========================================================================

    pub(super) fn emit_begin(&mut self, node: &Node) -> ConvertResult<()> {
        let children: Vec<&Node> = node.child_nodes().collect();
        if children.len() != node.len() {
            return Err(ConvertError::malformed(format!("({} statement...)", node.kind()), node));
        }

        if self.is_statement() {
            let mut wrote = false;
            for child in children {
                let mark = self.writer.len();
                if wrote {
                    self.put("; ");
                }
                let before_len = self.writer.len();
                self.parse(child, State::Statement)?;
                if self.writer.len() == before_len {
                    self.writer.truncate(mark);
                } else {
                    wrote = true;
                }
            }
            return Ok(());
        }

        match children.as_slice() {
            [] => self.put("null"),
            [only] => self.parse(only, State::Expression)?,
            many => {
                self.put("(");
                for (index, child) in many.iter().enumerate() {
                    if index > 0 {
                        self.put(", ");
                    }
                    self.parse_operand(child, prec::ASSIGN)?;
                }
                self.put(")");
            }
        }
        Ok(())
    }

    /// `{body}` with `bound` names visible inside the block and `prologue`
    /// written before the body.
    fn emit_bound_block(
        &mut self,
        body: Option<&Node>,
        owner: &Node,
        bound: &[&str],
        prologue: Option<&str>,
    ) -> ConvertResult<()> {
        self.put("{");
        self.scope.enter_block(body.unwrap_or(owner));
        for name in bound {
            self.scope.declare(name);
        }
        if let Some(prologue) = prologue {
            self.put(prologue);
        }
        let result = match body {
            Some(body) => {
                let mark = self.writer.len();
                if prologue.is_some() {
                    self.put("; ");
                }
                let before_len = self.writer.len();
                let result = self.parse(body, State::Statement);
                if self.writer.len() == before_len {
                    self.writer.truncate(mark);
                }
                result
            }
            None => Ok(()),
        };
        self.scope.exit_block();
        result?;
        self.put("}");
        Ok(())
    }

    // =========================================================================
    // Exceptions
    // =========================================================================

    /// `rescue`/`ensure` become `try {...} catch (e) {...} finally {...}`.
    pub(super) fn emit_try(&mut self, node: &Node) -> ConvertResult<()> {
        if !self.is_statement() {
            return Err(ConvertError::unsupported("exception handling in expression position", node));
        }

        let (main, finally) = if node.is(&NodeKind::Ensure) {
            (optional_child(node, 0, "(ensure body ensure)")?, Some(optional_child(node, 1, "(ensure body ensure)")?))
        } else {
            (Some(node), None)
        };

        let (body, handlers) = match main {
            Some(rescue) if rescue.is(&NodeKind::Rescue) => {
                const SHAPE: &str = "(rescue body resbody... else)";
                if rescue.len() < 2 {
                    return Err(ConvertError::malformed(SHAPE, rescue));
                }
                if let Some(else_body) = optional_child(rescue, rescue.len() - 1, SHAPE)? {
                    return Err(ConvertError::unsupported("else clause of a rescue", else_body));
                }
                let handlers = rescue.children()[1..rescue.len() - 1]
                    .iter()
                    .map(|child| {
                        child
                            .as_node()
                            .filter(|handler| handler.is(&NodeKind::Resbody))
                            .ok_or_else(|| ConvertError::malformed(SHAPE, rescue))
                    })
                    .collect::<ConvertResult<Vec<_>>>()?;
                (optional_child(rescue, 0, SHAPE)?, handlers)
            }
            other => (other, Vec::new()),
        };

        self.put("try ");
        self.emit_block_body(body, node)?;
        if !handlers.is_empty() {
            self.emit_catch(node, &handlers)?;
        }
        if let Some(finally) = finally {
            self.put(" finally ");
            self.emit_block_body(finally, node)?;
        }
        Ok(())
    }

    fn emit_catch(&mut self, node: &Node, handlers: &[&Node]) -> ConvertResult<()> {
        const SHAPE: &str = "(resbody classes variable body)";
        let parts = handlers
            .iter()
            .map(|handler| {
                let classes: Vec<&Node> = match optional_child(handler, 0, SHAPE)? {
                    Some(list) if list.is(&NodeKind::Array) => list.child_nodes().collect(),
                    Some(single) => vec![single],
                    None => Vec::new(),
                };
                let variable = match optional_child(handler, 1, SHAPE)? {
                    Some(target) => Some(sym_child(target, 0, "(lvasgn name)")?),
                    None => None,
                };
                Ok((classes, variable, optional_child(handler, 2, SHAPE)?))
            })
            .collect::<ConvertResult<Vec<_>>>()?;

        // A single catch-all handler binds its variable directly.
        if let [(classes, variable, body)] = parts.as_slice()
            && classes.is_empty()
        {
            let name = variable.unwrap_or(EXCEPTION);
            self.put(" catch (");
            self.put(name);
            self.put(") ");
            return self.emit_bound_block(*body, node, &[name], None);
        }

        self.put(" catch (");
        self.put(EXCEPTION);
        self.put(") {");
        let mut catch_all = false;
        for (index, (classes, variable, body)) in parts.iter().enumerate() {
            if index > 0 {
                self.put(" else ");
            }
            if classes.is_empty() {
                catch_all = true;
            } else {
                self.put("if (");
                for (position, class) in classes.iter().enumerate() {
                    if position > 0 {
                        self.put(" || ");
                    }
                    self.put(EXCEPTION);
                    self.put(" instanceof ");
                    self.parse_operand(class, prec::RELATIONAL + 1)?;
                }
                self.put(") ");
            }
            let prologue = variable.map(|name| {
                format!("{} {name} = {EXCEPTION}", self.es_level().local_keyword())
            });
            let bound: Vec<&str> = variable.iter().copied().collect();
            self.emit_bound_block(*body, node, &bound, prologue.as_deref())?;
            if catch_all {
                break;
            }
        }
        if !catch_all {
            self.put(" else {throw ");
            self.put(EXCEPTION);
            self.put("}");
        }
        self.put("}");
        Ok(())
    }

    // =========================================================================
    // Conditionals
    // =========================================================================

    pub(super) fn emit_if(&mut self, node: &Node) -> ConvertResult<()> {
        const SHAPE: &str = "(if condition then else)";
        let condition = node_child(node, 0, SHAPE)?;
        let then_branch = optional_child(node, 1, SHAPE)?;
        let else_branch = optional_child(node, 2, SHAPE)?;

        if !self.is_statement() {
            self.parse_operand(condition, prec::OR)?;
            self.put(" ? ");
            match then_branch {
                Some(branch) => self.parse_operand(branch, prec::ASSIGN)?,
                None => self.put("null"),
            }
            self.put(" : ");
            match else_branch {
                Some(branch) => self.parse_operand(branch, prec::ASSIGN)?,
                None => self.put("null"),
            }
            return Ok(());
        }

        self.put("if (");
        match (then_branch, else_branch) {
            (None, Some(else_branch)) => {
                self.emit_negated_condition(condition)?;
                self.put(") ");
                return self.emit_block_body(Some(else_branch), node);
            }
            _ => self.parse(condition, State::Expression)?,
        }
        self.put(") ");
        self.emit_block_body(then_branch, node)?;

        if let Some(else_branch) = else_branch {
            self.put(" else ");
            if else_branch.is(&NodeKind::If) {
                self.parse(else_branch, State::Statement)?;
            } else {
                self.emit_block_body(Some(else_branch), node)?;
            }
        }
        Ok(())
    }

    // =========================================================================
    // Loops
    // =========================================================================

    pub(super) fn emit_while(&mut self, node: &Node) -> ConvertResult<()> {
        const SHAPE: &str = "(while condition body)";
        let mut condition = node_child(node, 0, SHAPE)?;
        let body = optional_child(node, 1, SHAPE)?;
        if condition.is(&NodeKind::Begin) && condition.len() == 1 {
            condition = node_child(condition, 0, "(begin condition)")?;
        }

        // `while (x = next())` needs x declared before the loop.
        if condition.is(&NodeKind::Lvasgn) {
            let name = sym_child(condition, 0, "(lvasgn name value)")?;
            if let Some(keyword) = self.scope.hoist(name) {
                self.put(keyword);
                self.put(" ");
                self.put(name);
                self.put("; ");
            }
        }

        self.put("while (");
        if node.is(&NodeKind::Until) {
            self.emit_negated_condition(condition)?;
        } else {
            self.parse(condition, State::Expression)?;
        }
        self.put(") ");
        self.with_next_token(NextToken::Continue, |this| this.emit_block_body(body, node))
    }

    /// `begin ... end while cond` runs the body at least once.
    pub(super) fn emit_while_post(&mut self, node: &Node) -> ConvertResult<()> {
        const SHAPE: &str = "(while_post condition body)";
        let condition = node_child(node, 0, SHAPE)?;
        let body = optional_child(node, 1, SHAPE)?;

        self.put("do ");
        self.with_next_token(NextToken::Continue, |this| this.emit_block_body(body, node))?;
        self.put(" while (");
        if node.is(&NodeKind::UntilPost) {
            self.emit_negated_condition(condition)?;
        } else {
            self.parse(condition, State::Expression)?;
        }
        self.put(")");
        Ok(())
    }

    pub(super) fn emit_for(&mut self, node: &Node) -> ConvertResult<()> {
        const SHAPE: &str = "(for variable iterable body)";
        let variable = node_child(node, 0, SHAPE)?;
        let iterable = node_child(node, 1, SHAPE)?;
        let body = optional_child(node, 2, SHAPE)?;

        let mut bound = Vec::new();
        self.put("for (");
        if matches!(iterable.kind(), NodeKind::Irange | NodeKind::Erange) {
            if !variable.is(&NodeKind::Lvasgn) {
                return Err(ConvertError::unsupported("destructuring over a range", variable));
            }
            let name = sym_child(variable, 0, "(lvasgn name)")?;
            let low = node_child(iterable, 0, "(irange low high)")?;
            let high = node_child(iterable, 1, "(irange low high)")?;
            if self.es2015() {
                self.put("let ");
                bound.push(name);
            } else if let Some(keyword) = self.scope.assign(name, true) {
                self.put(keyword);
                self.put(" ");
            }
            self.put(name);
            self.put(" = ");
            self.parse_operand(low, prec::ASSIGN)?;
            self.put("; ");
            self.put(name);
            self.put(if iterable.is(&NodeKind::Irange) { " <= " } else { " < " });
            self.parse_operand(high, prec::RELATIONAL + 1)?;
            self.put("; ");
            self.put(name);
            self.put("++");
        } else {
            if !self.es2015() {
                return Err(ConvertError::unsupported("for loop over a non-range requires es2015", node));
            }
            collect_locals(variable, &mut bound);
            if bound.is_empty() && !matches!(variable.kind(), NodeKind::Lvasgn | NodeKind::Mlhs) {
                self.emit_target(variable)?;
            } else {
                self.put("let ");
                self.parse(variable, State::Expression)?;
            }
            self.put(" of ");
            self.parse_operand(iterable, prec::ASSIGN)?;
        }
        self.put(") ");
        self.with_next_token(NextToken::Continue, |this| this.emit_bound_block(body, node, &bound, None))
    }

    // =========================================================================
    // Jumps
    // =========================================================================

    pub(super) fn emit_next(&mut self, node: &Node) -> ConvertResult<()> {
        match self.next_token {
            NextToken::Continue => {
                if !node.is_empty() {
                    return Err(ConvertError::unsupported("next with a value inside a loop", node));
                }
                self.put("continue");
                Ok(())
            }
            NextToken::Return => self.emit_return(node),
        }
    }

    pub(super) fn emit_break(&mut self, node: &Node) -> ConvertResult<()> {
        if !node.is_empty() {
            return Err(ConvertError::unsupported("break with a value", node));
        }
        self.put("break");
        Ok(())
    }

    pub(super) fn emit_return(&mut self, node: &Node) -> ConvertResult<()> {
        if !self.is_statement() {
            return Err(ConvertError::unsupported("return in expression position", node));
        }
        let values: Vec<&Node> = node.child_nodes().collect();
        match values.as_slice() {
            [] => self.put("return"),
            [value] => {
                self.put("return ");
                self.parse(value, State::Expression)?;
            }
            many => {
                self.put("return ");
                self.emit_elements(many, node)?;
            }
        }
        Ok(())
    }

    /// `(autoreturn statement...)` returns the value of its last statement.
    pub(super) fn emit_autoreturn(&mut self, node: &Node) -> ConvertResult<()> {
        let body = match node.len() {
            0 => return Ok(()),
            1 => node_child(node, 0, "(autoreturn statement...)")?.clone(),
            _ => node.updated(NodeKind::Begin, node.children().iter().cloned().collect::<Vec<Child>>()),
        };
        let body = autoreturn(&body);
        self.parse(&body, self.state)
    }
}
