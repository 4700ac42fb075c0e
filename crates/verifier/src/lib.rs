//! IPPcode23 verifier: static well-formedness checks for programs.
//!
//! The verifier checks a `Program` BEFORE execution, covering what the
//! engine would otherwise only discover while linking or mid-run. It
//! collects ALL errors (not just the first) and returns them.
//!
//! # Usage
//!
//! ```
//! use ippcode_common::{Instruction, Opcode, Operand, Program};
//! use ippcode_verifier::verify;
//!
//! let program = Program::new(vec![
//!     Instruction::new(Opcode::Label, 1, vec![Operand::Label("end".into())]),
//!     Instruction::new(Opcode::Jump, 2, vec![Operand::Label("end".into())]),
//! ]);
//!
//! assert!(verify(&program).is_ok());
//! ```
//!
//! # Passes
//!
//! 1. **Structural**: operand count and kind per opcode, duplicate orders
//! 2. **Labels**: duplicate labels, jump and call targets with no LABEL

pub mod error;
pub mod labels;
pub mod structural;

pub use error::VerifyError;

use ippcode_common::Program;

/// Verify a program for well-formedness.
///
/// Returns `Ok(())` if the program passes all checks, or
/// `Err(Vec<VerifyError>)` with all errors found, structural errors first.
pub fn verify(program: &Program) -> Result<(), Vec<VerifyError>> {
    let mut all_errors = structural::check_structural(&program.instructions);
    all_errors.extend(labels::check_labels(&program.sorted()));

    if all_errors.is_empty() {
        Ok(())
    } else {
        Err(all_errors)
    }
}
