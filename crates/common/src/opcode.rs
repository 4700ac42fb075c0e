//! Opcode definitions for the IPPcode23 instruction set.

use crate::operand::Operand;

/// Identifies the operation to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    // Frames and function calls
    /// Copy a symbol into a variable.
    Move,
    /// Replace the temporary frame with a fresh empty one.
    CreateFrame,
    /// Move the temporary frame onto the local-frame stack.
    PushFrame,
    /// Move the top local frame into the temporary frame slot.
    PopFrame,
    /// Declare a variable in a frame.
    DefVar,
    /// Push the return position and jump to a label.
    Call,
    /// Resume after the most recent CALL.
    Return,

    // Data stack
    /// Push a symbol onto the data stack.
    Pushs,
    /// Pop the data stack into a variable.
    Pops,

    // Arithmetic, relational, boolean and conversion
    /// Integer addition.
    Add,
    /// Integer subtraction.
    Sub,
    /// Integer multiplication.
    Mul,
    /// Floor division of integers.
    Idiv,
    /// Less-than on two values of the same type.
    Lt,
    /// Greater-than on two values of the same type.
    Gt,
    /// Equality; `nil` is comparable with everything.
    Eq,
    /// Boolean conjunction.
    And,
    /// Boolean disjunction.
    Or,
    /// Boolean negation.
    Not,
    /// Integer code point to single-character string.
    Int2Char,
    /// Code point of the character at an index.
    Stri2Int,

    // Input/output
    /// Read one line of input as the requested type.
    Read,
    /// Print a symbol to standard output.
    Write,

    // Strings
    /// Concatenate two strings.
    Concat,
    /// Length of a string in characters.
    Strlen,
    /// Character at an index as a string.
    GetChar,
    /// Replace the character at an index.
    SetChar,

    // Types
    /// Name of a symbol's type as a string.
    Type,

    // Control flow
    /// Jump target. No effect at execution time.
    Label,
    /// Unconditional jump.
    Jump,
    /// Jump if two symbols are equal.
    JumpIfEq,
    /// Jump if two symbols are not equal.
    JumpIfNeq,
    /// Terminate with an exit code in 0..=49.
    Exit,

    // Debugging
    /// Print a symbol to the diagnostic stream.
    Dprint,
    /// Dump interpreter state to the diagnostic stream.
    Break,
}

/// All opcodes, in definition order.
pub const ALL_OPCODES: [Opcode; 35] = [
    Opcode::Move,
    Opcode::CreateFrame,
    Opcode::PushFrame,
    Opcode::PopFrame,
    Opcode::DefVar,
    Opcode::Call,
    Opcode::Return,
    Opcode::Pushs,
    Opcode::Pops,
    Opcode::Add,
    Opcode::Sub,
    Opcode::Mul,
    Opcode::Idiv,
    Opcode::Lt,
    Opcode::Gt,
    Opcode::Eq,
    Opcode::And,
    Opcode::Or,
    Opcode::Not,
    Opcode::Int2Char,
    Opcode::Stri2Int,
    Opcode::Read,
    Opcode::Write,
    Opcode::Concat,
    Opcode::Strlen,
    Opcode::GetChar,
    Opcode::SetChar,
    Opcode::Type,
    Opcode::Label,
    Opcode::Jump,
    Opcode::JumpIfEq,
    Opcode::JumpIfNeq,
    Opcode::Exit,
    Opcode::Dprint,
    Opcode::Break,
];

/// Shape of a single operand slot in an opcode's signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperandKind {
    /// A variable reference (destination).
    Var,
    /// A variable reference or a literal constant.
    Symb,
    /// A label name.
    Label,
    /// A type name.
    Type,
}

impl OperandKind {
    /// Returns true if `operand` may occupy a slot of this kind.
    pub fn accepts(&self, operand: &Operand) -> bool {
        match self {
            OperandKind::Var => matches!(operand, Operand::Var(_)),
            OperandKind::Symb => operand.is_symbol(),
            OperandKind::Label => matches!(operand, Operand::Label(_)),
            OperandKind::Type => matches!(operand, Operand::Type(_)),
        }
    }

    /// Lowercase name used in diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            OperandKind::Var => "var",
            OperandKind::Symb => "symb",
            OperandKind::Label => "label",
            OperandKind::Type => "type",
        }
    }
}

use OperandKind::{Label as L, Symb as S, Type as T, Var as V};

impl Opcode {
    /// Returns the source mnemonic for this opcode.
    pub fn mnemonic(&self) -> &'static str {
        match self {
            Opcode::Move => "MOVE",
            Opcode::CreateFrame => "CREATEFRAME",
            Opcode::PushFrame => "PUSHFRAME",
            Opcode::PopFrame => "POPFRAME",
            Opcode::DefVar => "DEFVAR",
            Opcode::Call => "CALL",
            Opcode::Return => "RETURN",
            Opcode::Pushs => "PUSHS",
            Opcode::Pops => "POPS",
            Opcode::Add => "ADD",
            Opcode::Sub => "SUB",
            Opcode::Mul => "MUL",
            Opcode::Idiv => "IDIV",
            Opcode::Lt => "LT",
            Opcode::Gt => "GT",
            Opcode::Eq => "EQ",
            Opcode::And => "AND",
            Opcode::Or => "OR",
            Opcode::Not => "NOT",
            Opcode::Int2Char => "INT2CHAR",
            Opcode::Stri2Int => "STRI2INT",
            Opcode::Read => "READ",
            Opcode::Write => "WRITE",
            Opcode::Concat => "CONCAT",
            Opcode::Strlen => "STRLEN",
            Opcode::GetChar => "GETCHAR",
            Opcode::SetChar => "SETCHAR",
            Opcode::Type => "TYPE",
            Opcode::Label => "LABEL",
            Opcode::Jump => "JUMP",
            Opcode::JumpIfEq => "JUMPIFEQ",
            Opcode::JumpIfNeq => "JUMPIFNEQ",
            Opcode::Exit => "EXIT",
            Opcode::Dprint => "DPRINT",
            Opcode::Break => "BREAK",
        }
    }

    /// Look up an opcode by mnemonic, ignoring ASCII case.
    pub fn from_mnemonic(name: &str) -> Option<Opcode> {
        ALL_OPCODES
            .iter()
            .find(|op| op.mnemonic().eq_ignore_ascii_case(name))
            .copied()
    }

    /// The operand signature: one entry per required operand, in position order.
    pub fn operands(&self) -> &'static [OperandKind] {
        match self {
            Opcode::CreateFrame
            | Opcode::PushFrame
            | Opcode::PopFrame
            | Opcode::Return
            | Opcode::Break => &[],

            Opcode::DefVar | Opcode::Pops => &[V],

            Opcode::Call | Opcode::Label | Opcode::Jump => &[L],

            Opcode::Pushs | Opcode::Write | Opcode::Exit | Opcode::Dprint => &[S],

            Opcode::Move | Opcode::Not | Opcode::Int2Char | Opcode::Strlen | Opcode::Type => {
                &[V, S]
            }

            Opcode::Read => &[V, T],

            Opcode::Add
            | Opcode::Sub
            | Opcode::Mul
            | Opcode::Idiv
            | Opcode::Lt
            | Opcode::Gt
            | Opcode::Eq
            | Opcode::And
            | Opcode::Or
            | Opcode::Stri2Int
            | Opcode::Concat
            | Opcode::GetChar
            | Opcode::SetChar => &[V, S, S],

            Opcode::JumpIfEq | Opcode::JumpIfNeq => &[L, S, S],
        }
    }

    /// Returns true if this opcode may transfer control to a label.
    pub fn is_jump(&self) -> bool {
        matches!(
            self,
            Opcode::Call | Opcode::Jump | Opcode::JumpIfEq | Opcode::JumpIfNeq
        )
    }
}

impl std::fmt::Display for Opcode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.mnemonic())
    }
}
