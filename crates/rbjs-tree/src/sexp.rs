//! S-expression text form.
//!
//! ```text
//! (send@1:0() nil :puts (str "hi"))
//! ```
//!
//! A node is `(tag child*)`. The tag may be followed by a location suffix
//! `@line:column`, and `()` after it marks a call site written with explicit
//! parentheses. Children are nested nodes, `nil`, symbols (`:name` or
//! `:"quoted name"`), double-quoted strings with JSON escapes, integers and
//! floats. `#` starts a comment that runs to the end of the line.

use crate::error::TreeError;
use crate::kind::NodeKind;
use crate::node::{Child, Node};
use rbjs_common::SourceLocation;
use std::fmt::{self, Write as _};

// =============================================================================
// Writer
// =============================================================================

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_char('(')?;
        f.write_str(self.kind().as_str())?;
        if let Some(loc) = self.location() {
            write!(f, "@{}:{}", loc.line, loc.column)?;
            if loc.parens {
                f.write_str("()")?;
            }
        }
        for child in self.children() {
            f.write_char(' ')?;
            write!(f, "{child}")?;
        }
        f.write_char(')')
    }
}

impl fmt::Display for Child {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Child::Node(node) => write!(f, "{node}"),
            Child::Nil => f.write_str("nil"),
            Child::Sym(name) => {
                f.write_char(':')?;
                if is_bare_symbol(name) {
                    f.write_str(name)
                } else {
                    write_quoted(f, name)
                }
            }
            Child::Str(value) => write_quoted(f, value),
            Child::Int(value) => write!(f, "{value}"),
            Child::Float(value) => write!(f, "{value:?}"),
        }
    }
}

fn is_bare_symbol(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| !c.is_whitespace() && !c.is_control() && !matches!(c, '(' | ')' | '"' | '\\' | '#' | ','))
}

/// Write `value` as a double-quoted string with JSON escapes.
pub fn write_quoted(out: &mut impl fmt::Write, value: &str) -> fmt::Result {
    out.write_char('"')?;
    for c in value.chars() {
        match c {
            '"' => out.write_str("\\\"")?,
            '\\' => out.write_str("\\\\")?,
            '\n' => out.write_str("\\n")?,
            '\r' => out.write_str("\\r")?,
            '\t' => out.write_str("\\t")?,
            c if c.is_control() => write!(out, "\\u{:04x}", c as u32)?,
            c => out.write_char(c)?,
        }
    }
    out.write_char('"')
}

// =============================================================================
// Reader
// =============================================================================

/// Parse a single node from s-expression text.
pub fn parse_sexp(text: &str) -> Result<Node, TreeError> {
    let mut reader = Reader { text, pos: 0 };
    reader.skip_trivia();
    let node = reader.read_node()?;
    reader.skip_trivia();
    if reader.pos < text.len() {
        return Err(TreeError::TrailingInput { offset: reader.pos });
    }
    Ok(node)
}

struct Reader<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Reader<'a> {
    fn peek(&self) -> Option<char> {
        self.text[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn expect(&mut self, expected: char) -> Result<(), TreeError> {
        match self.bump() {
            Some(c) if c == expected => Ok(()),
            Some(found) => Err(TreeError::UnexpectedChar {
                found,
                offset: self.pos - found.len_utf8(),
            }),
            None => Err(TreeError::UnexpectedEof),
        }
    }

    fn skip_trivia(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_whitespace() || c == ',' {
                self.pos += c.len_utf8();
            } else if c == '#' {
                match self.text[self.pos..].find('\n') {
                    Some(end) => self.pos += end + 1,
                    None => self.pos = self.text.len(),
                }
            } else {
                break;
            }
        }
    }

    /// Consume characters up to a delimiter.
    fn take_atom(&mut self, stop_at_at: bool) -> &'a str {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c.is_whitespace() || matches!(c, '(' | ')' | ',' | '#') || (stop_at_at && c == '@') {
                break;
            }
            self.pos += c.len_utf8();
        }
        &self.text[start..self.pos]
    }

    fn read_node(&mut self) -> Result<Node, TreeError> {
        self.expect('(')?;
        let tag_offset = self.pos;
        let tag = self.take_atom(true);
        if tag.is_empty() {
            return match self.peek() {
                Some(found) => Err(TreeError::UnexpectedChar {
                    found,
                    offset: tag_offset,
                }),
                None => Err(TreeError::UnexpectedEof),
            };
        }
        let kind = NodeKind::from_name(tag);
        let location = if self.peek() == Some('@') {
            self.pos += 1;
            Some(self.read_location()?)
        } else {
            None
        };

        let mut children = Vec::new();
        loop {
            self.skip_trivia();
            match self.peek() {
                Some(')') => {
                    self.pos += 1;
                    break;
                }
                Some(_) => children.push(self.read_child()?),
                None => return Err(TreeError::UnexpectedEof),
            }
        }
        Ok(Node::new(kind, children).with_location(location))
    }

    fn read_location(&mut self) -> Result<SourceLocation, TreeError> {
        let offset = self.pos;
        let line = self.read_digits().ok_or(TreeError::InvalidLocation { offset })?;
        if self.bump() != Some(':') {
            return Err(TreeError::InvalidLocation { offset });
        }
        let column = self.read_digits().ok_or(TreeError::InvalidLocation { offset })?;
        let mut location = SourceLocation::new(line, column);
        if self.text[self.pos..].starts_with("()") {
            self.pos += 2;
            location = location.with_parens();
        }
        Ok(location)
    }

    fn read_digits(&mut self) -> Option<u32> {
        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.pos += 1;
        }
        self.text[start..self.pos].parse().ok()
    }

    fn read_child(&mut self) -> Result<Child, TreeError> {
        let offset = self.pos;
        match self.peek() {
            Some('(') => Ok(Child::Node(self.read_node()?)),
            Some('"') => Ok(Child::str(self.read_string()?)),
            Some(':') => {
                self.pos += 1;
                if self.peek() == Some('"') {
                    Ok(Child::sym(self.read_string()?))
                } else {
                    let name = self.take_atom(false);
                    if name.is_empty() {
                        return Err(self.unexpected(offset));
                    }
                    Ok(Child::sym(name))
                }
            }
            Some(_) => {
                let atom = self.take_atom(false);
                if atom == "nil" {
                    return Ok(Child::Nil);
                }
                if atom.is_empty() {
                    return Err(self.unexpected(offset));
                }
                parse_number(atom).ok_or_else(|| TreeError::InvalidNumber {
                    text: atom.to_string(),
                    offset,
                })
            }
            None => Err(TreeError::UnexpectedEof),
        }
    }

    fn unexpected(&self, offset: usize) -> TreeError {
        match self.text[offset..].chars().next() {
            Some(found) => TreeError::UnexpectedChar { found, offset },
            None => TreeError::UnexpectedEof,
        }
    }

    fn read_string(&mut self) -> Result<String, TreeError> {
        self.expect('"')?;
        let mut out = String::new();
        loop {
            let offset = self.pos;
            match self.bump() {
                None => return Err(TreeError::UnexpectedEof),
                Some('"') => return Ok(out),
                Some('\\') => {
                    let c = match self.bump() {
                        Some('"') => '"',
                        Some('\\') => '\\',
                        Some('/') => '/',
                        Some('n') => '\n',
                        Some('r') => '\r',
                        Some('t') => '\t',
                        Some('b') => '\u{8}',
                        Some('f') => '\u{c}',
                        Some('u') => self.read_unicode_escape(offset)?,
                        Some(_) => return Err(TreeError::InvalidEscape { offset }),
                        None => return Err(TreeError::UnexpectedEof),
                    };
                    out.push(c);
                }
                Some(c) => out.push(c),
            }
        }
    }

    fn read_unicode_escape(&mut self, offset: usize) -> Result<char, TreeError> {
        let high = self.read_hex4(offset)?;
        if !(0xD800..0xDC00).contains(&high) {
            return char::from_u32(high).ok_or(TreeError::InvalidEscape { offset });
        }
        // Surrogate pair: a second \uXXXX must follow.
        if !self.text[self.pos..].starts_with("\\u") {
            return Err(TreeError::InvalidEscape { offset });
        }
        self.pos += 2;
        let low = self.read_hex4(offset)?;
        if !(0xDC00..0xE000).contains(&low) {
            return Err(TreeError::InvalidEscape { offset });
        }
        let code = 0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00);
        char::from_u32(code).ok_or(TreeError::InvalidEscape { offset })
    }

    fn read_hex4(&mut self, offset: usize) -> Result<u32, TreeError> {
        let digits = self
            .text
            .get(self.pos..self.pos + 4)
            .ok_or(TreeError::InvalidEscape { offset })?;
        let value = u32::from_str_radix(digits, 16).map_err(|_| TreeError::InvalidEscape { offset })?;
        self.pos += 4;
        Ok(value)
    }
}

fn parse_number(atom: &str) -> Option<Child> {
    if atom.contains(['.', 'e', 'E']) {
        atom.parse::<f64>().ok().map(Child::Float)
    } else {
        atom.parse::<i64>().ok().map(Child::Int)
    }
}
