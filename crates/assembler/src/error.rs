//! Error types for the IPPcode23 assembler.

use ippcode_common::{ErrorKind, LoadError, Opcode, OperandKind};
use thiserror::Error;

/// Errors produced while assembling source text into a program.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AsmError {
    /// The first code line is not the `.IPPcode23` header.
    #[error("line {line}: expected header '.IPPcode23'")]
    MissingHeader { line: usize },

    /// An unrecognized opcode mnemonic was encountered.
    #[error("line {line}: unknown opcode '{token}'")]
    UnknownOpcode { line: usize, token: String },

    /// An opcode had the wrong number of operands.
    #[error("line {line}: {opcode} expects {expected} operand(s), found {found}")]
    OperandCount {
        line: usize,
        opcode: Opcode,
        expected: usize,
        found: usize,
    },

    /// A token does not have the lexical shape its position requires.
    #[error("line {line}: '{token}' is not a valid {}", .expected.name())]
    InvalidOperand {
        line: usize,
        token: String,
        expected: OperandKind,
    },

    /// A well-shaped token carries an unusable value, e.g. an int out of
    /// range or a bad escape.
    #[error("line {line}: {source}")]
    InvalidValue {
        line: usize,
        #[source]
        source: LoadError,
    },
}

impl AsmError {
    /// The taxonomy kind, which decides the process exit code.
    pub fn kind(&self) -> ErrorKind {
        match self {
            AsmError::MissingHeader { .. } => ErrorKind::Header,
            AsmError::UnknownOpcode { .. } => ErrorKind::UnknownOpcode,
            AsmError::OperandCount { .. }
            | AsmError::InvalidOperand { .. }
            | AsmError::InvalidValue { .. } => ErrorKind::Syntax,
        }
    }

    /// The 1-based source line the error refers to.
    pub fn line(&self) -> usize {
        match self {
            AsmError::MissingHeader { line }
            | AsmError::UnknownOpcode { line, .. }
            | AsmError::OperandCount { line, .. }
            | AsmError::InvalidOperand { line, .. }
            | AsmError::InvalidValue { line, .. } => *line,
        }
    }
}
