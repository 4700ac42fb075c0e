//! Parser for IPPcode23 tokens into instructions.
//!
//! Each operand token is checked against the lexical shape its signature
//! slot requires, turned into an [`Argument`] record, and the records are
//! converted through [`Instruction::from_arguments`].

use crate::error::AsmError;
use ippcode_common::{ArgType, Argument, DataType, FrameKind, Instruction, Opcode, OperandKind};

/// Parse the tokens of one code line into the instruction with `order`.
///
/// `tokens` must be non-empty.
pub(crate) fn parse_line(tokens: &[&str], line: usize, order: u64) -> Result<Instruction, AsmError> {
    let (mnemonic, operands) = match tokens.split_first() {
        Some(split) => split,
        None => {
            return Err(AsmError::UnknownOpcode {
                line,
                token: String::new(),
            })
        }
    };

    let opcode = Opcode::from_mnemonic(mnemonic).ok_or_else(|| AsmError::UnknownOpcode {
        line,
        token: mnemonic.to_string(),
    })?;

    let signature = opcode.operands();
    if signature.len() != operands.len() {
        return Err(AsmError::OperandCount {
            line,
            opcode,
            expected: signature.len(),
            found: operands.len(),
        });
    }

    let args = signature
        .iter()
        .zip(operands)
        .zip(1u8..)
        .map(|((&kind, token), position)| parse_argument(kind, token, position, line))
        .collect::<Result<Vec<_>, _>>()?;

    Instruction::from_arguments(opcode, order, args)
        .map_err(|source| AsmError::InvalidValue { line, source })
}

/// Turn one operand token into an argument record for a slot of `kind`.
fn parse_argument(
    kind: OperandKind,
    token: &str,
    position: u8,
    line: usize,
) -> Result<Argument, AsmError> {
    let invalid = || AsmError::InvalidOperand {
        line,
        token: token.to_string(),
        expected: kind,
    };

    match kind {
        OperandKind::Var if is_var(token) => Ok(Argument::new(ArgType::Var, token, position)),
        OperandKind::Label if is_identifier(token) => {
            Ok(Argument::new(ArgType::Label, token, position))
        }
        OperandKind::Type if DataType::from_name(token).is_some() => {
            Ok(Argument::new(ArgType::Type, token, position))
        }
        OperandKind::Symb if is_var(token) => Ok(Argument::new(ArgType::Var, token, position)),
        OperandKind::Symb => {
            let (prefix, text) = token.split_once('@').ok_or_else(invalid)?;
            match ArgType::from_name(prefix) {
                Some(
                    arg_type @ (ArgType::Int | ArgType::Bool | ArgType::String | ArgType::Nil),
                ) => Ok(Argument::new(arg_type, text, position)),
                _ => Err(invalid()),
            }
        }
        _ => Err(invalid()),
    }
}

/// `FRAME@name` with a known frame tag and an identifier name.
fn is_var(token: &str) -> bool {
    match token.split_once('@') {
        Some((frame, name)) => FrameKind::from_tag(frame).is_some() && is_identifier(name),
        None => false,
    }
}

fn is_special(c: char) -> bool {
    matches!(c, '_' | '-' | '$' | '&' | '%' | '*' | '!' | '?')
}

/// Label and variable names: a letter or special character, then letters,
/// digits or special characters.
pub(crate) fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || is_special(first) => {
            chars.all(|c| c.is_ascii_alphanumeric() || is_special(c))
        }
        _ => false,
    }
}
