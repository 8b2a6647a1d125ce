use super::calls::prec;
use super::{Converter, State, is_identifier, node_child};
use crate::error::{ConvertError, ConvertResult};
use rbjs_tree::{Child, Node, NodeKind};
use std::fmt::Write as _;

/// A piece of an interpolated string.
enum Segment<'n> {
    Text(&'n str),
    Expr(&'n Node),
}

impl<'a> Converter<'a> {
    // =========================================================================
    // Scalars
    // =========================================================================

    pub(super) fn emit_int(&mut self, node: &Node) -> ConvertResult<()> {
        let value = node
            .int_at(0)
            .ok_or_else(|| ConvertError::malformed("(int value)", node))?;
        self.put(&value.to_string());
        Ok(())
    }

    pub(super) fn emit_float(&mut self, node: &Node) -> ConvertResult<()> {
        let value = match node.child(0) {
            Some(Child::Float(value)) => *value,
            Some(Child::Int(value)) => *value as f64,
            _ => return Err(ConvertError::malformed("(float value)", node)),
        };
        let text = if value.is_nan() {
            "NaN".to_string()
        } else if value.is_infinite() {
            if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
        } else {
            format!("{value:?}")
        };
        self.put(&text);
        Ok(())
    }

    /// Strings and symbols both become double-quoted string literals.
    pub(super) fn emit_str(&mut self, node: &Node) -> ConvertResult<()> {
        let text = node
            .str_at(0)
            .or_else(|| node.sym_at(0))
            .ok_or_else(|| ConvertError::malformed(format!("({} value)", node.kind()), node))?;
        self.put_string_literal(text);
        Ok(())
    }

    pub(crate) fn put_string_literal(&mut self, text: &str) {
        let mut out = String::with_capacity(text.len() + 2);
        out.push('"');
        for c in text.chars() {
            match c {
                '"' => out.push_str("\\\""),
                '\\' => out.push_str("\\\\"),
                '\n' => out.push_str("\\n"),
                '\r' => out.push_str("\\r"),
                '\t' => out.push_str("\\t"),
                '\u{2028}' | '\u{2029}' => {
                    let _ = write!(out, "\\u{:04x}", c as u32);
                }
                c if c.is_control() => {
                    let _ = write!(out, "\\u{:04x}", c as u32);
                }
                c => out.push(c),
            }
        }
        out.push('"');
        self.put(&out);
    }

    pub(super) fn emit_octal(&mut self, node: &Node) -> ConvertResult<()> {
        let digits = match node.child(0) {
            Some(Child::Str(digits)) => digits.to_string(),
            Some(Child::Int(value)) => format!("{value:o}"),
            _ => return Err(ConvertError::malformed("(octal digits)", node)),
        };
        if digits.is_empty() || !digits.bytes().all(|b| (b'0'..=b'7').contains(&b)) {
            return Err(ConvertError::malformed("(octal digits)", node));
        }
        let prefix = if self.es2015() { "0o" } else { "0" };
        self.put(prefix);
        self.put(&digits);
        Ok(())
    }

    // =========================================================================
    // Interpolation
    // =========================================================================

    pub(super) fn emit_dstr(&mut self, node: &Node) -> ConvertResult<()> {
        let mut segments = Vec::new();
        collect_segments(node, &mut segments)?;

        if self.es2015() {
            let mut text = String::from("`");
            for segment in &segments {
                match segment {
                    Segment::Text(part) => push_template_text(&mut text, part),
                    Segment::Expr(expr) => {
                        text.push_str("${");
                        text.push_str(&self.capture(|this| this.parse(expr, State::Expression))?);
                        text.push('}');
                    }
                }
            }
            text.push('`');
            self.put(&text);
            return Ok(());
        }

        // Legacy: string concatenation, forced to string by a leading "".
        match segments.first() {
            None => {
                self.put("\"\"");
                return Ok(());
            }
            Some(Segment::Expr(_)) => self.put("\"\" + "),
            Some(Segment::Text(_)) => {}
        }
        for (index, segment) in segments.iter().enumerate() {
            if index > 0 {
                self.put(" + ");
            }
            match segment {
                Segment::Text(part) => self.put_string_literal(part),
                Segment::Expr(expr) => self.parse_operand(expr, prec::ADDITIVE + 1)?,
            }
        }
        Ok(())
    }

    // =========================================================================
    // Collections
    // =========================================================================

    pub(super) fn emit_array(&mut self, node: &Node) -> ConvertResult<()> {
        let items: Vec<&Node> = node.child_nodes().collect();
        if items.len() != node.len() {
            return Err(ConvertError::malformed("(array element...)", node));
        }
        self.emit_elements(&items, node)
    }

    /// `[a, b]`, with splats spread (or concatenated on legacy levels).
    pub(crate) fn emit_elements(&mut self, items: &[&Node], owner: &Node) -> ConvertResult<()> {
        let has_splat = items.iter().any(|item| item.is(&NodeKind::Splat));
        if !has_splat || self.es2015() {
            self.put("[");
            self.emit_arguments(items)?;
            self.put("]");
            return Ok(());
        }

        // [a].concat(b, [c])
        let mut chunks: Vec<Vec<&Node>> = Vec::new();
        let mut splats: Vec<Option<&Node>> = Vec::new();
        let mut literal: Vec<&Node> = Vec::new();
        for item in items {
            if item.is(&NodeKind::Splat) {
                if !literal.is_empty() {
                    chunks.push(std::mem::take(&mut literal));
                    splats.push(None);
                }
                splats.push(Some(node_child(item, 0, "(splat value)")?));
                chunks.push(Vec::new());
            } else {
                literal.push(item);
            }
        }
        if !literal.is_empty() {
            chunks.push(literal);
            splats.push(None);
        }

        let mut parts = chunks.into_iter().zip(splats);
        let Some((first_chunk, first_splat)) = parts.next() else {
            return Err(ConvertError::malformed("(array element...)", owner));
        };
        match first_splat {
            Some(_) => self.put("[].concat("),
            None => {
                self.put("[");
                self.emit_arguments(&first_chunk)?;
                self.put("].concat(");
            }
        }
        let mut wrote = false;
        if let Some(splat) = first_splat {
            self.parse_operand(splat, prec::ASSIGN)?;
            wrote = true;
        }
        for (chunk, splat) in parts {
            if wrote {
                self.put(", ");
            }
            match splat {
                Some(splat) => self.parse_operand(splat, prec::ASSIGN)?,
                None => {
                    self.put("[");
                    self.emit_arguments(&chunk)?;
                    self.put("]");
                }
            }
            wrote = true;
        }
        self.put(")");
        Ok(())
    }

    pub(super) fn emit_hash(&mut self, node: &Node) -> ConvertResult<()> {
        let wrap = self.is_statement();
        if wrap {
            self.put("(");
        }
        if node.is_empty() {
            self.put("{}");
        } else {
            self.put("{");
            for (index, pair) in node.children().iter().enumerate() {
                let pair = pair
                    .as_node()
                    .filter(|pair| pair.is(&NodeKind::Pair))
                    .ok_or_else(|| ConvertError::malformed("(hash (pair key value)...)", node))?;
                if index > 0 {
                    self.put(", ");
                }
                self.emit_pair(pair)?;
            }
            self.put("}");
        }
        if wrap {
            self.put(")");
        }
        Ok(())
    }

    fn emit_pair(&mut self, pair: &Node) -> ConvertResult<()> {
        let key = node_child(pair, 0, "(pair key value)")?;
        let value = node_child(pair, 1, "(pair key value)")?;
        match key.kind() {
            NodeKind::Sym | NodeKind::Str => {
                let name = key
                    .sym_at(0)
                    .or_else(|| key.str_at(0))
                    .ok_or_else(|| ConvertError::malformed(format!("({} value)", key.kind()), key))?;
                if is_identifier(name) {
                    self.put(name);
                } else {
                    self.put_string_literal(name);
                }
            }
            NodeKind::Int => self.emit_int(key)?,
            _ if self.es2015() => {
                self.put("[");
                self.parse(key, State::Expression)?;
                self.put("]");
            }
            _ => {
                return Err(ConvertError::unsupported(
                    "computed hash key requires es2015",
                    pair,
                ));
            }
        }
        self.put(": ");
        self.parse_operand(value, prec::ASSIGN)
    }
}

fn collect_segments<'n>(node: &'n Node, out: &mut Vec<Segment<'n>>) -> ConvertResult<()> {
    for child in node.children() {
        match child {
            Child::Str(text) => out.push(Segment::Text(text)),
            Child::Node(part) => match part.kind() {
                NodeKind::Str => {
                    let text = part
                        .str_at(0)
                        .ok_or_else(|| ConvertError::malformed("(str value)", part))?;
                    out.push(Segment::Text(text));
                }
                NodeKind::Dstr => collect_segments(part, out)?,
                NodeKind::Begin if part.is_empty() => {}
                NodeKind::Begin if part.len() == 1 => {
                    out.push(Segment::Expr(node_child(part, 0, "(begin expr)")?));
                }
                _ => out.push(Segment::Expr(part)),
            },
            _ => return Err(ConvertError::malformed("(dstr part...)", node)),
        }
    }
    Ok(())
}

fn push_template_text(out: &mut String, text: &str) {
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '`' => out.push_str("\\`"),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '$' if chars.peek() == Some(&'{') => out.push_str("\\$"),
            c => out.push(c),
        }
    }
}
