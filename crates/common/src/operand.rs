//! Instruction operands.
//!
//! The loader hands over [`Argument`] records: a declared type, the raw
//! literal text and the lexical position. [`Operand::from_argument`] turns
//! them into the closed [`Operand`] union the engine matches on. This is the
//! only place literal text is escape-decoded and type-converted.

use std::fmt;

use crate::error::LoadError;
use crate::escape;
use crate::value::{DataType, Value};

/// The frame a variable reference addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameKind {
    /// `GF`, the global frame.
    Global,
    /// `LF`, the top of the local-frame stack.
    Local,
    /// `TF`, the temporary frame.
    Temporary,
}

impl FrameKind {
    /// Returns the source tag for this frame.
    pub fn tag(&self) -> &'static str {
        match self {
            FrameKind::Global => "GF",
            FrameKind::Local => "LF",
            FrameKind::Temporary => "TF",
        }
    }

    /// Look up a frame by its source tag.
    pub fn from_tag(tag: &str) -> Option<FrameKind> {
        match tag {
            "GF" => Some(FrameKind::Global),
            "LF" => Some(FrameKind::Local),
            "TF" => Some(FrameKind::Temporary),
            _ => None,
        }
    }
}

impl fmt::Display for FrameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// A `FRAME@name` variable reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VarRef {
    /// Addressed frame.
    pub frame: FrameKind,
    /// Variable name within the frame.
    pub name: String,
}

impl VarRef {
    /// Create a new variable reference.
    pub fn new(frame: FrameKind, name: impl Into<String>) -> Self {
        Self {
            frame,
            name: name.into(),
        }
    }

    /// Parse `FRAME@name`, splitting on the first `@`.
    pub fn parse(text: &str) -> Result<Self, LoadError> {
        let (tag, name) = text
            .split_once('@')
            .ok_or_else(|| LoadError::InvalidVar(text.to_string()))?;
        let frame = FrameKind::from_tag(tag).ok_or_else(|| LoadError::UnknownFrame(tag.to_string()))?;
        if name.is_empty() {
            return Err(LoadError::InvalidVar(text.to_string()));
        }
        Ok(Self::new(frame, name))
    }
}

impl fmt::Display for VarRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.frame, self.name)
    }
}

/// Declared type of a loader argument record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArgType {
    Int,
    Bool,
    String,
    Nil,
    Label,
    Type,
    Var,
}

/// All argument types, in definition order.
pub const ALL_ARG_TYPES: [ArgType; 7] = [
    ArgType::Int,
    ArgType::Bool,
    ArgType::String,
    ArgType::Nil,
    ArgType::Label,
    ArgType::Type,
    ArgType::Var,
];

impl ArgType {
    /// Returns the source name of this argument type.
    pub fn name(&self) -> &'static str {
        match self {
            ArgType::Int => "int",
            ArgType::Bool => "bool",
            ArgType::String => "string",
            ArgType::Nil => "nil",
            ArgType::Label => "label",
            ArgType::Type => "type",
            ArgType::Var => "var",
        }
    }

    /// Look up an argument type by its source name.
    pub fn from_name(name: &str) -> Option<ArgType> {
        ALL_ARG_TYPES.iter().find(|t| t.name() == name).copied()
    }
}

/// A raw argument record as produced by a loader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Argument {
    /// Declared argument type.
    pub arg_type: ArgType,
    /// Literal text, not yet decoded.
    pub text: String,
    /// Lexical position, 1 to 3.
    pub position: u8,
}

impl Argument {
    /// Create a new argument record.
    pub fn new(arg_type: ArgType, text: impl Into<String>, position: u8) -> Self {
        Self {
            arg_type,
            text: text.into(),
            position,
        }
    }
}

/// A typed instruction operand.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Operand {
    /// A constant of type int, bool, string or nil.
    Literal(Value),
    /// A variable reference.
    Var(VarRef),
    /// A label name.
    Label(String),
    /// A type name.
    Type(DataType),
}

impl Operand {
    /// Convert a loader record into an operand.
    pub fn from_argument(arg: &Argument) -> Result<Operand, LoadError> {
        let text = arg.text.as_str();
        match arg.arg_type {
            ArgType::Int => parse_int(text).map(|n| Operand::Literal(Value::Int(n))),
            ArgType::Bool => match text {
                "true" => Ok(Operand::Literal(Value::Bool(true))),
                "false" => Ok(Operand::Literal(Value::Bool(false))),
                _ => Err(LoadError::InvalidBool(text.to_string())),
            },
            ArgType::Nil => match text {
                "nil" => Ok(Operand::Literal(Value::Nil)),
                _ => Err(LoadError::InvalidNil(text.to_string())),
            },
            ArgType::String => escape::decode(text).map(|s| Operand::Literal(Value::Str(s))),
            ArgType::Label => {
                if text.is_empty() {
                    Err(LoadError::EmptyLabel)
                } else {
                    Ok(Operand::Label(text.to_string()))
                }
            }
            ArgType::Type => DataType::from_name(text)
                .map(Operand::Type)
                .ok_or_else(|| LoadError::InvalidType(text.to_string())),
            ArgType::Var => VarRef::parse(text).map(Operand::Var),
        }
    }

    /// Returns true for operands usable where a symbol is expected.
    pub fn is_symbol(&self) -> bool {
        matches!(self, Operand::Literal(_) | Operand::Var(_))
    }
}

/// Canonical source form: `int@5`, `string@a\032b`, `GF@x`, a bare label
/// name, or a bare type name.
impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Literal(Value::Int(n)) => write!(f, "int@{n}"),
            Operand::Literal(Value::Bool(b)) => write!(f, "bool@{b}"),
            Operand::Literal(Value::Str(s)) => write!(f, "string@{}", escape::encode(s)),
            Operand::Literal(Value::Nil) => f.write_str("nil@nil"),
            Operand::Var(var) => write!(f, "{var}"),
            Operand::Label(label) => f.write_str(label),
            Operand::Type(t) => f.write_str(t.name()),
        }
    }
}

/// Parse an integer literal: optional sign, then decimal digits, `0x` hex
/// digits, or `0o` octal digits.
fn parse_int(text: &str) -> Result<i64, LoadError> {
    let invalid = || LoadError::InvalidInt(text.to_string());

    let (negative, unsigned) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };

    let (radix, digits) = if let Some(hex) = unsigned
        .strip_prefix("0x")
        .or_else(|| unsigned.strip_prefix("0X"))
    {
        (16, hex)
    } else if let Some(oct) = unsigned
        .strip_prefix("0o")
        .or_else(|| unsigned.strip_prefix("0O"))
    {
        (8, oct)
    } else {
        (10, unsigned)
    };

    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return Err(invalid());
    }

    let magnitude = u64::from_str_radix(digits, radix).map_err(|_| invalid())? as i128;
    let value = if negative { -magnitude } else { magnitude };
    i64::try_from(value).map_err(|_| invalid())
}
