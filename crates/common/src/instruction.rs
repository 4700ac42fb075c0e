//! Instruction representation.
//!
//! An instruction is an opcode, a declared execution order and up to three
//! positional operands. The order is unique within a program and decides
//! both execution sequence and label positions.

use crate::error::LoadError;
use crate::opcode::{Opcode, OperandKind};
use crate::operand::{Argument, Operand};

/// A single IPPcode23 instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    /// The operation to perform.
    pub opcode: Opcode,
    /// Declared execution order.
    pub order: u64,
    /// Operands in position order.
    pub operands: Vec<Operand>,
}

/// How an instruction's operands fail to match its opcode's signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureViolation {
    /// Wrong number of operands.
    Count { expected: usize, found: usize },
    /// Operand at 1-based `position` is not of the `expected` kind.
    Kind {
        position: usize,
        expected: OperandKind,
    },
}

impl Instruction {
    /// Create a new instruction.
    pub fn new(opcode: Opcode, order: u64, operands: Vec<Operand>) -> Self {
        Self {
            opcode,
            order,
            operands,
        }
    }

    /// Build an instruction from loader argument records.
    ///
    /// Records may arrive in any order; they are placed by `position`, which
    /// must cover `1..=n` exactly once each.
    pub fn from_arguments(
        opcode: Opcode,
        order: u64,
        mut args: Vec<Argument>,
    ) -> Result<Self, LoadError> {
        args.sort_by_key(|a| a.position);
        for (idx, arg) in args.iter().enumerate() {
            if arg.position as usize != idx + 1 {
                return Err(LoadError::InvalidPosition(arg.position));
            }
        }

        let operands = args
            .iter()
            .map(Operand::from_argument)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self::new(opcode, order, operands))
    }

    /// Check the operands against the opcode's signature.
    ///
    /// Returns the first violation, or `None` if the instruction is well formed.
    pub fn signature_violation(&self) -> Option<SignatureViolation> {
        let expected = self.opcode.operands();
        if expected.len() != self.operands.len() {
            return Some(SignatureViolation::Count {
                expected: expected.len(),
                found: self.operands.len(),
            });
        }

        expected
            .iter()
            .zip(&self.operands)
            .position(|(kind, operand)| !kind.accepts(operand))
            .map(|idx| SignatureViolation::Kind {
                position: idx + 1,
                expected: expected[idx],
            })
    }

    /// The label this instruction defines (LABEL) or targets (jumps, CALL).
    pub fn label(&self) -> Option<&str> {
        if self.opcode != Opcode::Label && !self.opcode.is_jump() {
            return None;
        }
        match self.operands.first() {
            Some(Operand::Label(name)) => Some(name),
            _ => None,
        }
    }
}
