//! Field values for configuration items.

use crate::{ConfigItem, ParseError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single field value in a [`ConfigItem`].
///
/// The remote control plane models rule fields as strings, integers,
/// booleans, and sub-lists (for example the protocol list of a geo-block
/// rule, or the nested header-match entries of a precision policy).
/// Sub-list ordering is not preserved by the remote system; the engine
/// compares lists as multisets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Boolean flag (e.g. "enabled").
    Bool(bool),
    /// Integer value (ports, thresholds, priorities).
    Int(i64),
    /// String value (actions, protocols, CIDR blocks).
    Str(String),
    /// Sub-list of values; compared order-insensitively.
    List(Vec<Value>),
    /// Nested configuration item.
    Item(Box<ConfigItem>),
}

impl Value {
    /// Returns the string value, if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the integer value, if this is an integer.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the boolean value, if this is a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the sub-list elements, if this is a list.
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the nested item, if this is one.
    pub fn as_item(&self) -> Option<&ConfigItem> {
        match self {
            Value::Item(item) => Some(item),
            _ => None,
        }
    }

    /// Parses a wire string into an integer value.
    ///
    /// Remote list responses carry numeric fields as decimal strings.
    pub fn parse_int(s: &str) -> Result<Self, ParseError> {
        s.parse::<i64>()
            .map(Value::Int)
            .map_err(|_| ParseError::InvalidInt(s.to_string()))
    }

    /// Parses a wire string into a boolean value.
    ///
    /// Accepts "true"/"false" and the "0"/"1" encoding some list
    /// endpoints use.
    pub fn parse_bool(s: &str) -> Result<Self, ParseError> {
        match s {
            "true" | "1" => Ok(Value::Bool(true)),
            "false" | "0" => Ok(Value::Bool(false)),
            _ => Err(ParseError::InvalidBool(s.to_string())),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Str(s) => write!(f, "{}", s),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Value::Item(item) => write!(f, "{{{} fields}}", item.len()),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<u16> for Value {
    fn from(i: u16) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

impl From<ConfigItem> for Value {
    fn from(item: ConfigItem) -> Self {
        Value::Item(Box::new(item))
    }
}
