//! Verification errors for the IPPcode23 verifier.
//!
//! Every error carries the `order` of the offending instruction. The
//! verifier collects ALL errors, not just the first.

use ippcode_common::{ErrorKind, Opcode, OperandKind};
use thiserror::Error;

/// Errors found during static verification.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerifyError {
    // --- Structural ---
    /// Two or more instructions share an order value.
    #[error("duplicate instruction order {order}")]
    DuplicateOrder { order: u64 },

    /// Operand count does not match the opcode signature.
    #[error("{opcode} at order {order} expects {expected} operand(s), found {found}")]
    OperandCount {
        order: u64,
        opcode: Opcode,
        expected: usize,
        found: usize,
    },

    /// Operand at `position` (1-based) is not of the required kind.
    #[error("{opcode} at order {order}: operand {position} must be a {}", .expected.name())]
    WrongOperand {
        order: u64,
        opcode: Opcode,
        position: usize,
        expected: OperandKind,
    },

    // --- Labels ---
    /// A label is defined more than once.
    #[error("duplicate label '{label}' at order {order} (first defined at order {first})")]
    DuplicateLabel {
        order: u64,
        first: u64,
        label: String,
    },

    /// A jump or call targets a label that no LABEL defines.
    #[error("undefined label '{label}' at order {order}")]
    UndefinedLabel { order: u64, label: String },
}

impl VerifyError {
    /// The taxonomy kind, which decides the process exit code.
    pub fn kind(&self) -> ErrorKind {
        match self {
            VerifyError::DuplicateOrder { .. }
            | VerifyError::OperandCount { .. }
            | VerifyError::WrongOperand { .. } => ErrorKind::XmlStruct,
            VerifyError::DuplicateLabel { .. } | VerifyError::UndefinedLabel { .. } => {
                ErrorKind::Semantic
            }
        }
    }

    /// The order of the instruction the error points at.
    pub fn order(&self) -> u64 {
        match self {
            VerifyError::DuplicateOrder { order }
            | VerifyError::OperandCount { order, .. }
            | VerifyError::WrongOperand { order, .. }
            | VerifyError::DuplicateLabel { order, .. }
            | VerifyError::UndefinedLabel { order, .. } => *order,
        }
    }
}
