//! IPPcode23 assembler: source text to [`Program`] and back.
//!
//! The assembler is the loader in front of the VM. It checks the header,
//! the mnemonics and the lexical shape of every operand, and numbers the
//! instructions 1, 2, 3, … in source order.
//!
//! # Usage
//!
//! ```
//! use ippcode_assembler::{assemble, disassemble};
//!
//! let text = ".IPPcode23\nDEFVAR GF@x\nMOVE GF@x string@hello\\032world\nWRITE GF@x\n";
//! let program = assemble(text).unwrap();
//! assert_eq!(program.len(), 3);
//! assert_eq!(disassemble(&program), text);
//! ```
//!
//! # Roundtrip Guarantee
//!
//! `assemble(disassemble(program)) == program` holds for every program whose
//! orders are `1..=n`. The disassembler outputs canonical text; the
//! assembler also accepts non-canonical input (lowercase mnemonics, hex
//! ints, comments, extra whitespace).

pub mod error;

mod disassembler;
mod lexer;
mod parser;

pub use error::AsmError;

use ippcode_common::Program;
use lexer::{is_header, tokenize_line};
use parser::parse_line;
use tracing::debug;

/// Assemble source text into a program.
///
/// Returns the first error encountered.
pub fn assemble(text: &str) -> Result<Program, AsmError> {
    let mut instructions = Vec::new();
    let mut seen_header = false;
    let mut last_line = 0;

    for (idx, line) in text.lines().enumerate() {
        let line_num = idx + 1;
        last_line = line_num;
        let tokens = tokenize_line(line);
        if tokens.is_empty() {
            continue;
        }

        if !seen_header {
            if !is_header(&tokens) {
                return Err(AsmError::MissingHeader { line: line_num });
            }
            seen_header = true;
            continue;
        }

        let order = instructions.len() as u64 + 1;
        instructions.push(parse_line(&tokens, line_num, order)?);
    }

    if !seen_header {
        return Err(AsmError::MissingHeader {
            line: last_line.max(1),
        });
    }

    debug!(instructions = instructions.len(), "assembled program");
    Ok(Program::new(instructions))
}

/// Disassemble a program into canonical source text.
///
/// The output is the header plus one line per instruction, in order.
pub fn disassemble(program: &Program) -> String {
    disassembler::disassemble(program)
}
