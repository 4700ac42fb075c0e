//! Runtime errors for the IPPcode23 VM.
//!
//! Every error raised while linking or executing carries the declared
//! `order` of the offending instruction. [`RuntimeError::kind`] maps each
//! variant onto the shared exit-code taxonomy.

use ippcode_common::{ErrorKind, FrameKind, Opcode, OperandKind, VarRef};
use thiserror::Error;

/// Errors that occur while linking or executing a program.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuntimeError {
    // --- Linking ---
    /// Two instructions declare the same order.
    #[error("duplicate instruction order {order}")]
    DuplicateOrder { order: u64 },

    /// An instruction has the wrong number of operands.
    #[error("{opcode} at order {order} expects {expected} operand(s), found {found}")]
    OperandCount {
        order: u64,
        opcode: Opcode,
        expected: usize,
        found: usize,
    },

    /// An operand is not of the kind the opcode requires.
    #[error("{opcode} at order {order}: operand {position} must be a {}", .expected.name())]
    WrongOperand {
        order: u64,
        opcode: Opcode,
        position: usize,
        expected: OperandKind,
    },

    /// A label is defined more than once.
    #[error("duplicate label '{label}' at order {order}")]
    DuplicateLabel { order: u64, label: String },

    // --- Semantic ---
    /// A jump or call names a label that does not exist.
    #[error("undefined label '{label}' at order {order}")]
    UndefinedLabel { order: u64, label: String },

    /// DEFVAR of a name already declared in that frame.
    #[error("variable {var} redefined at order {order}")]
    Redefinition { order: u64, var: VarRef },

    // --- Operand types ---
    /// Operand types do not fit the opcode.
    #[error("wrong operand types for {opcode} at order {order}")]
    TypeMismatch { order: u64, opcode: Opcode },

    // --- Variables and frames ---
    /// The variable is not declared in the addressed frame.
    #[error("undefined variable {var} at order {order}")]
    UndefinedVariable { order: u64, var: VarRef },

    /// The addressed frame does not exist.
    #[error("frame {frame} does not exist at order {order}")]
    FrameNotFound { order: u64, frame: FrameKind },

    // --- Missing values ---
    /// Read of a declared but never assigned variable.
    #[error("variable {var} read before assignment at order {order}")]
    Uninitialized { order: u64, var: VarRef },

    /// POPS with an empty data stack.
    #[error("data stack is empty at order {order}")]
    DataStackEmpty { order: u64 },

    /// RETURN with an empty call stack.
    #[error("call stack is empty at order {order}")]
    CallStackEmpty { order: u64 },

    // --- Operand values ---
    /// IDIV by zero.
    #[error("division by zero at order {order}")]
    DivisionByZero { order: u64 },

    /// EXIT with a code outside 0..=49.
    #[error("exit code {code} out of range 0..=49 at order {order}")]
    InvalidExitCode { order: u64, code: i64 },

    // --- Strings ---
    /// String index outside the string.
    #[error("string index {index} out of bounds (length {length}) at order {order}")]
    StringIndexOutOfBounds {
        order: u64,
        index: i64,
        length: usize,
    },

    /// INT2CHAR of a value that is not a Unicode scalar value.
    #[error("invalid code point {code} at order {order}")]
    InvalidCodePoint { order: u64, code: i64 },

    /// SETCHAR with an empty replacement string.
    #[error("empty replacement string at order {order}")]
    EmptyReplacement { order: u64 },

    // --- Host ---
    /// Writing to the output or diagnostic stream failed.
    #[error("cannot write output: {message}")]
    Output { message: String },
}

impl RuntimeError {
    /// The taxonomy kind, which decides the process exit code.
    pub fn kind(&self) -> ErrorKind {
        match self {
            RuntimeError::DuplicateOrder { .. }
            | RuntimeError::OperandCount { .. }
            | RuntimeError::WrongOperand { .. } => ErrorKind::XmlStruct,

            RuntimeError::DuplicateLabel { .. }
            | RuntimeError::UndefinedLabel { .. }
            | RuntimeError::Redefinition { .. } => ErrorKind::Semantic,

            RuntimeError::TypeMismatch { .. } => ErrorKind::OpTypes,
            RuntimeError::UndefinedVariable { .. } => ErrorKind::NoVar,
            RuntimeError::FrameNotFound { .. } => ErrorKind::NoFrame,

            RuntimeError::Uninitialized { .. }
            | RuntimeError::DataStackEmpty { .. }
            | RuntimeError::CallStackEmpty { .. } => ErrorKind::MissingValue,

            RuntimeError::DivisionByZero { .. } | RuntimeError::InvalidExitCode { .. } => {
                ErrorKind::OpValue
            }

            RuntimeError::StringIndexOutOfBounds { .. }
            | RuntimeError::InvalidCodePoint { .. }
            | RuntimeError::EmptyReplacement { .. } => ErrorKind::StringIndex,

            RuntimeError::Output { .. } => ErrorKind::OutputFile,
        }
    }

    /// Shorthand for `self.kind().code()`.
    pub fn exit_code(&self) -> i32 {
        self.kind().code()
    }
}
