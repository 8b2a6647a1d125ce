//! JSON form of the tree.
//!
//! A node is either an array `["send", null, ":puts", ["str", "hi"]]` or an
//! object `{"type": "send", "children": [...], "loc": {...}}`. Strings that
//! start with `:` are symbols; any other JSON string is a string literal.
//! A string literal that itself starts with `:` is written `{"str": ":x"}`,
//! and `{"sym": "name"}` is accepted for symbols.

use crate::error::TreeError;
use crate::kind::NodeKind;
use crate::node::{Child, Node};
use rbjs_common::SourceLocation;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Number, Value, json};

/// Parse a node from JSON text.
pub fn from_json_str(text: &str) -> Result<Node, TreeError> {
    let value: Value = serde_json::from_str(text).map_err(|err| TreeError::json("$", err.to_string()))?;
    from_value(&value)
}

/// Convert a JSON value into a node.
pub fn from_value(value: &Value) -> Result<Node, TreeError> {
    node_from_value(value, "$")
}

/// Convert a node into its JSON value. Nodes with a location use the object
/// form, all others the array form.
pub fn to_value(node: &Node) -> Value {
    let children: Vec<Value> = node.children().iter().map(child_to_value).collect();
    match node.location() {
        None => {
            let mut items = Vec::with_capacity(children.len() + 1);
            items.push(Value::String(node.kind().as_str().to_string()));
            items.extend(children);
            Value::Array(items)
        }
        Some(loc) => json!({
            "type": node.kind().as_str(),
            "children": children,
            "loc": loc,
        }),
    }
}

fn child_to_value(child: &Child) -> Value {
    match child {
        Child::Node(node) => to_value(node),
        Child::Nil => Value::Null,
        Child::Sym(name) => Value::String(format!(":{name}")),
        Child::Str(value) if value.starts_with(':') => json!({ "str": &**value }),
        Child::Str(value) => Value::String(value.to_string()),
        Child::Int(value) => Value::Number(Number::from(*value)),
        Child::Float(value) => Number::from_f64(*value).map_or(Value::Null, Value::Number),
    }
}

fn node_from_value(value: &Value, path: &str) -> Result<Node, TreeError> {
    match value {
        Value::Array(items) => {
            let (tag, rest) = items
                .split_first()
                .ok_or_else(|| TreeError::json(path, "empty node array"))?;
            let tag = tag
                .as_str()
                .ok_or_else(|| TreeError::json(&format!("{path}[0]"), "node type must be a string"))?;
            let children = rest
                .iter()
                .enumerate()
                .map(|(i, item)| child_from_value(item, &format!("{path}[{}]", i + 1)))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Node::new(NodeKind::from_name(tag), children))
        }
        Value::Object(object) => node_from_object(object, path),
        _ => Err(TreeError::json(path, "expected a node (array or object)")),
    }
}

fn node_from_object(object: &Map<String, Value>, path: &str) -> Result<Node, TreeError> {
    let tag = object
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| TreeError::json(path, "node object needs a string \"type\""))?;
    let children = match object.get("children") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items
            .iter()
            .enumerate()
            .map(|(i, item)| child_from_value(item, &format!("{path}.children[{i}]")))
            .collect::<Result<Vec<_>, _>>()?,
        Some(_) => return Err(TreeError::json(&format!("{path}.children"), "expected an array")),
    };
    let location = match object.get("loc") {
        None | Some(Value::Null) => None,
        Some(loc) => Some(
            SourceLocation::deserialize(loc)
                .map_err(|err| TreeError::json(&format!("{path}.loc"), err.to_string()))?,
        ),
    };
    Ok(Node::new(NodeKind::from_name(tag), children).with_location(location))
}

fn child_from_value(value: &Value, path: &str) -> Result<Child, TreeError> {
    match value {
        Value::Null => Ok(Child::Nil),
        Value::String(text) => Ok(match text.strip_prefix(':') {
            Some(name) => Child::sym(name),
            None => Child::str(text),
        }),
        Value::Number(number) => number
            .as_i64()
            .map(Child::Int)
            .or_else(|| number.as_f64().map(Child::Float))
            .ok_or_else(|| TreeError::json(path, "number out of range")),
        Value::Array(_) => node_from_value(value, path).map(Child::Node),
        Value::Object(object) => {
            if let Some(text) = single_string_field(object, "str") {
                Ok(Child::str(text))
            } else if let Some(name) = single_string_field(object, "sym") {
                Ok(Child::sym(name))
            } else {
                node_from_object(object, path).map(Child::Node)
            }
        }
        Value::Bool(_) => Err(TreeError::json(path, "booleans are nodes: use [\"true\"] or [\"false\"]")),
    }
}

fn single_string_field<'a>(object: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    if object.len() == 1 {
        object.get(key).and_then(Value::as_str)
    } else {
        None
    }
}

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        to_value(self).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Node {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        from_value(&value).map_err(serde::de::Error::custom)
    }
}
