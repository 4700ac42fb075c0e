//! Error taxonomy shared by every IPPcode23 crate.
//!
//! Each failure maps onto exactly one [`ErrorKind`], and each kind onto the
//! numeric process exit status the host reports.

use thiserror::Error;

/// Category of a fatal error, identifying the process exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Invalid command-line usage of the host.
    Args,
    /// Source or input file could not be opened or read.
    InputFile,
    /// Output stream could not be written.
    OutputFile,
    /// Missing or malformed `.IPPcode23` header.
    Header,
    /// Unknown instruction mnemonic in source text.
    UnknownOpcode,
    /// Lexical or syntactic error in source text.
    Syntax,
    /// Source representation is not well formed.
    XmlFormat,
    /// Instruction or argument records have an invalid shape.
    XmlStruct,
    /// Redefinition, duplicate label or unknown jump target.
    Semantic,
    /// Operand type mismatch.
    OpTypes,
    /// Access to a variable that does not exist.
    NoVar,
    /// Access to a frame that does not exist.
    NoFrame,
    /// Missing value: uninitialized variable, empty data or call stack.
    MissingValue,
    /// Operand value outside the legal domain.
    OpValue,
    /// Bad string index or character code.
    StringIndex,
}

/// All kinds, in exit-code order.
pub const ALL_ERROR_KINDS: [ErrorKind; 15] = [
    ErrorKind::Args,
    ErrorKind::InputFile,
    ErrorKind::OutputFile,
    ErrorKind::Header,
    ErrorKind::UnknownOpcode,
    ErrorKind::Syntax,
    ErrorKind::XmlFormat,
    ErrorKind::XmlStruct,
    ErrorKind::Semantic,
    ErrorKind::OpTypes,
    ErrorKind::NoVar,
    ErrorKind::NoFrame,
    ErrorKind::MissingValue,
    ErrorKind::OpValue,
    ErrorKind::StringIndex,
];

impl ErrorKind {
    /// The process exit status for this kind.
    pub fn code(&self) -> i32 {
        match self {
            ErrorKind::Args => 10,
            ErrorKind::InputFile => 11,
            ErrorKind::OutputFile => 12,
            ErrorKind::Header => 21,
            ErrorKind::UnknownOpcode => 22,
            ErrorKind::Syntax => 23,
            ErrorKind::XmlFormat => 31,
            ErrorKind::XmlStruct => 32,
            ErrorKind::Semantic => 52,
            ErrorKind::OpTypes => 53,
            ErrorKind::NoVar => 54,
            ErrorKind::NoFrame => 55,
            ErrorKind::MissingValue => 56,
            ErrorKind::OpValue => 57,
            ErrorKind::StringIndex => 58,
        }
    }
}

/// Errors converting loader argument records into typed operands.
///
/// All of these are structural: the record does not describe a valid
/// operand of its declared type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    /// Integer literal failed to parse or does not fit in 64 bits.
    #[error("invalid int literal '{0}'")]
    InvalidInt(String),

    /// Boolean literal other than `true` or `false`.
    #[error("invalid bool literal '{0}'")]
    InvalidBool(String),

    /// Nil literal other than `nil`.
    #[error("invalid nil literal '{0}'")]
    InvalidNil(String),

    /// Backslash not followed by three decimal digits, or an escape that
    /// names no Unicode scalar value.
    #[error("invalid escape sequence in string '{0}'")]
    InvalidEscape(String),

    /// Empty label name.
    #[error("empty label")]
    EmptyLabel,

    /// Type name other than `int`, `bool`, `string` or `nil`.
    #[error("invalid type name '{0}'")]
    InvalidType(String),

    /// Variable reference without `FRAME@name` shape.
    #[error("invalid variable reference '{0}'")]
    InvalidVar(String),

    /// Frame tag other than `GF`, `LF` or `TF`.
    #[error("unknown frame '{0}'")]
    UnknownFrame(String),

    /// Argument position outside 1..=3, duplicated, or leaving a gap.
    #[error("argument position {0} is invalid")]
    InvalidPosition(u8),
}

impl LoadError {
    /// Every load error is a structural defect of the input records.
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::XmlStruct
    }
}
