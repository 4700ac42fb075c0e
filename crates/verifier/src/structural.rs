//! Structural validation pass for IPPcode23 programs.
//!
//! Checks every instruction against its opcode signature (operand count
//! and operand kinds) and rejects duplicate order values.

use std::collections::HashSet;

use crate::error::VerifyError;
use ippcode_common::{Instruction, SignatureViolation};

/// Run the structural validation pass.
///
/// Instructions are checked in the sequence given. A duplicated order value
/// is reported once, at its second occurrence.
pub fn check_structural(instrs: &[Instruction]) -> Vec<VerifyError> {
    let mut errors = Vec::new();
    let mut seen = HashSet::new();
    let mut reported = HashSet::new();

    for instr in instrs {
        if !seen.insert(instr.order) && reported.insert(instr.order) {
            errors.push(VerifyError::DuplicateOrder { order: instr.order });
        }

        match instr.signature_violation() {
            Some(SignatureViolation::Count { expected, found }) => {
                errors.push(VerifyError::OperandCount {
                    order: instr.order,
                    opcode: instr.opcode,
                    expected,
                    found,
                });
            }
            Some(SignatureViolation::Kind { position, expected }) => {
                errors.push(VerifyError::WrongOperand {
                    order: instr.order,
                    opcode: instr.opcode,
                    position,
                    expected,
                });
            }
            None => {}
        }
    }

    errors
}
