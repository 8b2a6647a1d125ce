//! Regular expression literals.
//!
//! A pattern made only of literal text with few embedded slashes is written
//! as `/.../flags`; anything else goes through `new RegExp(text, flags)`.

use super::{Converter, State};
use crate::error::{ConvertError, ConvertResult};
use rbjs_tree::{Child, Node, NodeKind};
use smallvec::SmallVec;

/// A pattern segment after flag processing.
enum Part<'n> {
    Text(String),
    Interpolated(&'n Node),
}

/// Escape every unescaped `/` in `pattern` and count them.
///
/// A slash is escaped when an odd number of backslashes precede it, so in
/// `\\/` the slash still needs escaping.
pub(crate) fn escape_slashes(pattern: &str) -> (String, usize) {
    if memchr::memchr(b'/', pattern.as_bytes()).is_none() {
        return (pattern.to_string(), 0);
    }
    let mut escaped = String::with_capacity(pattern.len() + 4);
    let mut count = 0;
    let mut after_backslash = false;
    for ch in pattern.chars() {
        match ch {
            '/' if !after_backslash => {
                escaped.push_str("\\/");
                count += 1;
            }
            _ => escaped.push(ch),
        }
        after_backslash = ch == '\\' && !after_backslash;
    }
    (escaped, count)
}

/// Drop free-spacing whitespace and ` #` comments.
fn strip_extended(text: &str) -> String {
    text.lines()
        .map(|line| line.find(" #").map_or(line, |at| &line[..at]))
        .flat_map(str::chars)
        .filter(|c| !c.is_whitespace())
        .collect()
}

impl<'a> Converter<'a> {
    pub(super) fn emit_regexp(&mut self, node: &Node) -> ConvertResult<()> {
        const SHAPE: &str = "(regexp part... (regopt flag...))";
        let (options, segments) = node
            .children()
            .split_last()
            .ok_or_else(|| ConvertError::malformed(SHAPE, node))?;
        let options = options
            .as_node()
            .filter(|options| options.is(&NodeKind::Regopt))
            .ok_or_else(|| ConvertError::malformed(SHAPE, node))?;

        let mut flags: SmallVec<[char; 4]> = SmallVec::new();
        let mut extended = false;
        for flag in options.children() {
            let flag = flag
                .as_sym()
                .and_then(|flag| flag.chars().next())
                .ok_or_else(|| ConvertError::malformed("(regopt flag...)", options))?;
            if flag == 'x' {
                extended = true;
            } else if !flags.contains(&flag) {
                flags.push(flag);
            }
        }

        let mut parts = segments
            .iter()
            .map(|segment| match segment {
                Child::Str(text) => Ok(Part::Text(text.to_string())),
                Child::Node(part) if part.is(&NodeKind::Str) => part
                    .str_at(0)
                    .map(|text| Part::Text(text.to_string()))
                    .ok_or_else(|| ConvertError::malformed("(str value)", part)),
                Child::Node(part) => Ok(Part::Interpolated(part)),
                _ => Err(ConvertError::malformed(SHAPE, node)),
            })
            .collect::<ConvertResult<Vec<_>>>()?;

        if extended {
            for part in &mut parts {
                if let Part::Text(text) = part {
                    *text = strip_extended(text);
                }
            }
        }

        // Ruby anchors match at line boundaries.
        let line_anchored = matches!(parts.first(), Some(Part::Text(text)) if text.starts_with('^'))
            || matches!(parts.last(), Some(Part::Text(text)) if text.ends_with('$'));
        if line_anchored && !flags.contains(&'m') {
            flags.push('m');
        }

        if let Some(Part::Text(text)) = parts.first_mut()
            && let Some(rest) = text.strip_prefix("\\A")
        {
            *text = format!("^{rest}");
        }
        if let Some(Part::Text(text)) = parts.last_mut()
            && let Some(rest) = text.strip_suffix("\\z")
        {
            *text = format!("{rest}$");
        }

        let flags: String = flags.into_iter().collect();
        if parts.iter().all(|part| matches!(part, Part::Text(_))) {
            let pattern: String = parts
                .iter()
                .filter_map(|part| match part {
                    Part::Text(text) => Some(text.as_str()),
                    Part::Interpolated(_) => None,
                })
                .collect();
            let (escaped, slashes) = escape_slashes(&pattern);
            if slashes <= self.options.regexp_slash_limit {
                let body = if pattern.is_empty() {
                    // `//` would start a comment.
                    "(?:)".to_string()
                } else {
                    escaped
                };
                self.put("/");
                self.put(&body);
                self.put("/");
                self.put(&flags);
                return Ok(());
            }
        }

        self.put("new RegExp(");
        match parts.as_slice() {
            [Part::Text(text)] => self.put_string_literal(text),
            [Part::Interpolated(part)] => self.parse(part, State::Expression)?,
            _ => {
                let children = parts
                    .iter()
                    .map(|part| match part {
                        Part::Text(text) => Child::from(Node::new(NodeKind::Str, vec![Child::str(text)])),
                        Part::Interpolated(part) => Child::from(*part),
                    })
                    .collect();
                let pattern = node.updated(NodeKind::Dstr, children);
                self.parse(&pattern, State::Expression)?;
            }
        }
        if !flags.is_empty() {
            self.put(", ");
            self.put_string_literal(&flags);
        }
        self.put(")");
        Ok(())
    }
}
