//! IPPcode23 common types.
//!
//! This crate provides the vocabulary shared by the loader, the verifier
//! and the virtual machine:
//!
//! - [`Opcode`]: the 35 instructions and their operand signatures
//! - [`Operand`]: typed operands, built from loader [`Argument`] records
//! - [`Value`] / [`DataType`]: runtime values and their types
//! - [`Instruction`] / [`Program`]: ordered instruction records
//! - [`ErrorKind`]: the error taxonomy and its process exit codes
//! - [`escape`]: `\DDD` escape decoding and encoding
//!
//! # Dependencies
//!
//! This crate uses `thiserror` (compile-time proc-macro, zero runtime cost)
//! and has no other dependencies.

pub mod error;
pub mod escape;
pub mod instruction;
pub mod opcode;
pub mod operand;
pub mod program;
pub mod value;

// Re-export commonly used types at the crate root.
pub use error::{ErrorKind, LoadError};
pub use instruction::{Instruction, SignatureViolation};
pub use opcode::{Opcode, OperandKind};
pub use operand::{ArgType, Argument, FrameKind, Operand, VarRef};
pub use program::Program;
pub use value::{DataType, Value};

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    /// Strategy that generates a random valid Opcode.
    fn arb_opcode() -> impl Strategy<Value = Opcode> {
        prop::sample::select(&opcode::ALL_OPCODES[..])
    }

    fn arb_frame() -> impl Strategy<Value = FrameKind> {
        prop::sample::select(vec![FrameKind::Global, FrameKind::Local, FrameKind::Temporary])
    }

    proptest! {
        /// Every int literal that fits in 64 bits converts exactly.
        #[test]
        fn int_argument_converts(n in any::<i64>()) {
            let arg = Argument::new(ArgType::Int, n.to_string(), 1);
            prop_assert_eq!(Operand::from_argument(&arg), Ok(Operand::Literal(Value::Int(n))));
        }

        /// Variable references survive display and re-parsing.
        #[test]
        fn var_ref_display_parse(frame in arb_frame(), name in "[a-zA-Z_$&%*!?-][a-zA-Z0-9_$&%*!?-]{0,12}") {
            let var = VarRef::new(frame, name);
            prop_assert_eq!(VarRef::parse(&var.to_string()), Ok(var));
        }

        /// An instruction whose operands are generated from its own
        /// signature never reports a violation.
        #[test]
        fn generated_operands_conform(op in arb_opcode()) {
            let operands = op
                .operands()
                .iter()
                .map(|kind| match kind {
                    OperandKind::Var | OperandKind::Symb => {
                        Operand::Var(VarRef::new(FrameKind::Global, "v"))
                    }
                    OperandKind::Label => Operand::Label("l".to_string()),
                    OperandKind::Type => Operand::Type(DataType::Int),
                })
                .collect();
            let instr = Instruction::new(op, 1, operands);
            prop_assert_eq!(instr.signature_violation(), None);
        }
    }
}
