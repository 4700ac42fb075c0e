//! IPPcode23 virtual machine: executes loaded instruction sequences.
//!
//! The machine keeps:
//! - a global frame, an optional temporary frame and a stack of local frames
//! - a data stack for PUSHS/POPS
//! - a call stack of return positions for CALL/RETURN
//! - a label table built by a linking pass before the first instruction runs
//!
//! # Usage
//!
//! ```
//! use ippcode_common::{Instruction, Opcode, Operand, Program, Value};
//! use ippcode_vm::{run, Io};
//!
//! let program = Program::new(vec![Instruction::new(
//!     Opcode::Write,
//!     1,
//!     vec![Operand::Literal(Value::string("hi"))],
//! )]);
//!
//! let mut out = Vec::new();
//! let code = run(&program, Io::new(&b""[..], &mut out, std::io::sink())).unwrap();
//! assert_eq!(code, 0);
//! assert_eq!(out, b"hi");
//! ```

pub mod error;
pub mod execute;
pub mod frames;
pub mod machine;

pub use error::RuntimeError;
pub use frames::{FrameError, FrameStore};
pub use machine::{Io, VM};

use ippcode_common::Program;

/// Execute a program against the given streams.
///
/// Instructions are sorted by order, labels are linked, and execution
/// starts at the lowest order. Returns the exit status: `0` when execution
/// runs off the end, or the operand of an EXIT instruction.
///
/// # Errors
///
/// Returns [`RuntimeError`] for linking faults (duplicate orders or labels,
/// malformed operands) and for every runtime fault. Use
/// [`RuntimeError::exit_code`] to obtain the process exit status.
pub fn run(program: &Program, io: Io<'_>) -> Result<i32, RuntimeError> {
    let mut vm = VM::new(program, io);
    vm.execute()
}
