//! Label pass: duplicate definitions and dangling jump targets.

use std::collections::HashMap;

use crate::error::VerifyError;
use ippcode_common::{Instruction, Opcode};

/// Run the label pass over instructions sorted by order.
///
/// Instructions whose label operand is malformed are left to the
/// structural pass.
pub fn check_labels(instrs: &[Instruction]) -> Vec<VerifyError> {
    let mut errors = Vec::new();
    let mut defined: HashMap<&str, u64> = HashMap::new();

    for instr in instrs.iter().filter(|i| i.opcode == Opcode::Label) {
        let Some(label) = instr.label() else { continue };
        match defined.get(label) {
            Some(&first) => errors.push(VerifyError::DuplicateLabel {
                order: instr.order,
                first,
                label: label.to_string(),
            }),
            None => {
                defined.insert(label, instr.order);
            }
        }
    }

    for instr in instrs.iter().filter(|i| i.opcode.is_jump()) {
        let Some(label) = instr.label() else { continue };
        if !defined.contains_key(label) {
            errors.push(VerifyError::UndefinedLabel {
                order: instr.order,
                label: label.to_string(),
            });
        }
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use ippcode_common::Operand;

    fn with_label(opcode: Opcode, order: u64, name: &str) -> Instruction {
        Instruction::new(opcode, order, vec![Operand::Label(name.to_string())])
    }

    #[test]
    fn backward_and_forward_targets_resolve() {
        let instrs = vec![
            with_label(Opcode::Label, 1, "top"),
            with_label(Opcode::Jump, 2, "bottom"),
            with_label(Opcode::Call, 3, "top"),
            with_label(Opcode::Label, 4, "bottom"),
        ];
        assert!(check_labels(&instrs).is_empty());
    }

    #[test]
    fn duplicate_label_names_first_definition() {
        let instrs = vec![
            with_label(Opcode::Label, 1, "a"),
            with_label(Opcode::Label, 7, "a"),
        ];
        assert_eq!(
            check_labels(&instrs),
            vec![VerifyError::DuplicateLabel {
                order: 7,
                first: 1,
                label: "a".to_string()
            }]
        );
    }

    #[test]
    fn every_dangling_target_is_reported() {
        let instrs = vec![
            with_label(Opcode::Jump, 1, "x"),
            with_label(Opcode::Call, 2, "y"),
        ];
        let errors = check_labels(&instrs);
        assert_eq!(errors.len(), 2);
        assert!(errors
            .iter()
            .all(|e| matches!(e, VerifyError::UndefinedLabel { .. })));
    }

    #[test]
    fn labels_are_case_sensitive() {
        let instrs = vec![
            with_label(Opcode::Label, 1, "Loop"),
            with_label(Opcode::Jump, 2, "loop"),
        ];
        assert_eq!(check_labels(&instrs).len(), 1);
    }
}
