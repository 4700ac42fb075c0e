//! IPPcode23 XML loader: program documents to [`Program`].
//!
//! The XML form is the usual IPPcode23 program document:
//!
//! ```xml
//! <program language="IPPcode23">
//!   <instruction order="1" opcode="WRITE">
//!     <arg1 type="string">hi</arg1>
//!   </instruction>
//! </program>
//! ```
//!
//! Documents that are not well-formed XML fail with
//! [`ErrorKind::XmlFormat`](ippcode_common::ErrorKind::XmlFormat). Documents
//! of the wrong shape fail with
//! [`ErrorKind::XmlStruct`](ippcode_common::ErrorKind::XmlStruct). Duplicate
//! orders and operand signatures are left to the VM's linking pass.
//!
//! # Usage
//!
//! ```
//! let doc = r#"<program language="IPPcode23">
//!   <instruction order="1" opcode="WRITE"><arg1 type="int">7</arg1></instruction>
//! </program>"#;
//! let program = ippcode_xml::load(doc).unwrap();
//! assert_eq!(program.len(), 1);
//! ```

pub mod error;

pub use error::XmlError;

use ippcode_common::{ArgType, Argument, Instruction, Opcode, Program};
use roxmltree::{Document, Node};
use tracing::debug;

const LANGUAGE: &str = "IPPcode23";

/// Load a program from an XML document.
///
/// Instructions keep document order; the VM sorts them by `order`.
pub fn load(text: &str) -> Result<Program, XmlError> {
    let doc = Document::parse(text)?;
    let root = doc.root_element();
    if root.tag_name().name() != "program" || root.attribute("language") != Some(LANGUAGE) {
        return Err(XmlError::BadRoot {
            tag: root.tag_name().name().to_string(),
        });
    }

    let instructions = root
        .children()
        .filter(|n| n.is_element())
        .map(load_instruction)
        .collect::<Result<Vec<_>, _>>()?;

    debug!(instructions = instructions.len(), "loaded XML program");
    Ok(Program::new(instructions))
}

/// Returns true if `text` should be read as an XML document rather than
/// source text: its first non-blank character is `<`.
pub fn looks_like_xml(text: &str) -> bool {
    text.trim_start_matches('\u{feff}')
        .trim_start()
        .starts_with('<')
}

fn load_instruction(node: Node) -> Result<Instruction, XmlError> {
    if node.tag_name().name() != "instruction" {
        return Err(XmlError::UnexpectedElement {
            tag: node.tag_name().name().to_string(),
        });
    }

    let order_text = node
        .attribute("order")
        .ok_or(XmlError::MissingAttribute { attribute: "order" })?;
    let order = parse_order(order_text).ok_or_else(|| XmlError::InvalidOrder {
        text: order_text.to_string(),
    })?;

    let name = node
        .attribute("opcode")
        .ok_or(XmlError::MissingAttribute { attribute: "opcode" })?;
    let opcode = Opcode::from_mnemonic(name).ok_or_else(|| XmlError::UnknownOpcode {
        order,
        name: name.to_string(),
    })?;

    let args = node
        .children()
        .filter(|n| n.is_element())
        .map(|arg| load_argument(arg, order))
        .collect::<Result<Vec<_>, _>>()?;

    Instruction::from_arguments(opcode, order, args)
        .map_err(|source| XmlError::InvalidArgument { order, source })
}

fn load_argument(node: Node, order: u64) -> Result<Argument, XmlError> {
    let tag = node.tag_name().name();
    let position = match tag {
        "arg1" => 1,
        "arg2" => 2,
        "arg3" => 3,
        _ => {
            return Err(XmlError::UnexpectedArgument {
                order,
                tag: tag.to_string(),
            })
        }
    };

    let type_name = node.attribute("type").unwrap_or_default();
    let arg_type = ArgType::from_name(type_name).ok_or_else(|| XmlError::InvalidArgType {
        order,
        tag: tag.to_string(),
        type_name: type_name.to_string(),
    })?;

    Ok(Argument::new(arg_type, node.text().unwrap_or_default(), position))
}

/// Parse an order attribute: a decimal integer without sign or leading zero.
fn parse_order(text: &str) -> Option<u64> {
    let mut chars = text.chars();
    match chars.next() {
        Some('1'..='9') if chars.all(|c| c.is_ascii_digit()) => text.parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_accepts_positive_decimal() {
        assert_eq!(parse_order("1"), Some(1));
        assert_eq!(parse_order("907"), Some(907));
    }

    #[test]
    fn order_rejects_other_forms() {
        for text in ["", "0", "01", "-1", "+3", "1a", " 1", "0x10"] {
            assert_eq!(parse_order(text), None, "{text:?}");
        }
        assert_eq!(parse_order("99999999999999999999999"), None);
    }

    #[test]
    fn detects_xml() {
        assert!(looks_like_xml("<?xml version=\"1.0\"?><program/>"));
        assert!(looks_like_xml("\n  <program language=\"IPPcode23\"/>"));
        assert!(!looks_like_xml(".IPPcode23\nBREAK\n"));
        assert!(!looks_like_xml("# <comment>\n.IPPcode23\n"));
        assert!(!looks_like_xml(""));
    }
}
