//! Runtime values and their types.
//!
//! Values are what variables hold and what the data stack carries. They are
//! immutable: every opcode produces a fresh value.

use std::fmt;

/// The type of a runtime value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    /// 64-bit signed integer.
    Int,
    /// Boolean.
    Bool,
    /// Unicode string.
    String,
    /// The unit value `nil`.
    Nil,
}

/// All data types, in definition order.
pub const ALL_DATA_TYPES: [DataType; 4] =
    [DataType::Int, DataType::Bool, DataType::String, DataType::Nil];

impl DataType {
    /// Returns the source name of this type, as written by TYPE.
    pub fn name(&self) -> &'static str {
        match self {
            DataType::Int => "int",
            DataType::Bool => "bool",
            DataType::String => "string",
            DataType::Nil => "nil",
        }
    }

    /// Look up a type by its source name.
    pub fn from_name(name: &str) -> Option<DataType> {
        ALL_DATA_TYPES.iter().find(|t| t.name() == name).copied()
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Runtime value representation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Value {
    /// Signed 64-bit integer.
    Int(i64),
    /// Boolean value.
    Bool(bool),
    /// Decoded string.
    Str(String),
    /// The unit value.
    Nil,
}

impl Value {
    /// Returns the type of this value.
    pub fn data_type(&self) -> DataType {
        match self {
            Value::Int(_) => DataType::Int,
            Value::Bool(_) => DataType::Bool,
            Value::Str(_) => DataType::String,
            Value::Nil => DataType::Nil,
        }
    }

    /// Convenience constructor for string values.
    pub fn string(s: impl Into<String>) -> Self {
        Value::Str(s.into())
    }
}

/// Output rendering used by WRITE and DPRINT: `nil` is empty, booleans are
/// lowercase, strings are printed verbatim.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{n}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Str(s) => f.write_str(s),
            Value::Nil => Ok(()),
        }
    }
}
