//! Program representation: the instruction records handed to the engine.

use crate::instruction::Instruction;

/// An IPPcode23 program: instructions in the order the loader produced them.
///
/// The engine sorts by declared order before execution; the loader is free
/// to emit instructions in any sequence.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Program {
    /// The instruction records.
    pub instructions: Vec<Instruction>,
}

impl Program {
    /// Create a new program from a vector of instructions.
    pub fn new(instructions: Vec<Instruction>) -> Self {
        Self { instructions }
    }

    /// Number of instructions in the program.
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    /// Returns true if the program has no instructions.
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// The instructions sorted by declared order.
    ///
    /// The sort is stable, so instructions sharing an order keep their
    /// relative position; callers reject such duplicates.
    pub fn sorted(&self) -> Vec<Instruction> {
        let mut instructions = self.instructions.clone();
        instructions.sort_by_key(|i| i.order);
        instructions
    }
}
