//! Disassembler: program to canonical IPPcode23 source text.
//!
//! Output is the header followed by one instruction per line in order.
//! No indentation, no comments, no blank lines.

use crate::lexer::HEADER;
use ippcode_common::{Instruction, Program};

/// Disassemble a program into canonical source text.
///
/// Instructions are written in ascending order; the order values
/// themselves are implied by line position.
pub fn disassemble(program: &Program) -> String {
    let mut out = String::with_capacity(HEADER.len() + 1 + program.len() * 16);
    out.push_str(HEADER);
    out.push('\n');

    for instr in program.sorted() {
        out.push_str(&format_instruction(&instr));
        out.push('\n');
    }

    out
}

/// One canonical line: uppercase mnemonic, then operands in source form.
pub(crate) fn format_instruction(instr: &Instruction) -> String {
    let mut line = instr.opcode.mnemonic().to_string();
    for operand in &instr.operands {
        line.push(' ');
        line.push_str(&operand.to_string());
    }
    line
}
