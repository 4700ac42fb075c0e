//! Error types for the XML program loader.

use ippcode_common::{ErrorKind, LoadError};
use thiserror::Error;

/// Errors produced while loading an XML program document.
#[derive(Error, Debug)]
pub enum XmlError {
    /// The document is not well-formed XML.
    #[error("malformed XML: {0}")]
    Malformed(#[from] roxmltree::Error),

    /// The root element is not `<program language="IPPcode23">`.
    #[error("root element must be <program language=\"IPPcode23\">, found <{tag}>")]
    BadRoot { tag: String },

    /// A child of `<program>` is not an `<instruction>` element.
    #[error("unexpected element <{tag}> in program")]
    UnexpectedElement { tag: String },

    /// An `<instruction>` lacks a required attribute.
    #[error("instruction is missing the '{attribute}' attribute")]
    MissingAttribute { attribute: &'static str },

    /// The `order` attribute is not a positive decimal integer.
    #[error("invalid instruction order '{text}'")]
    InvalidOrder { text: String },

    /// The `opcode` attribute names no instruction.
    #[error("order {order}: unknown opcode '{name}'")]
    UnknownOpcode { order: u64, name: String },

    /// A child of `<instruction>` is not `arg1`, `arg2` or `arg3`.
    #[error("order {order}: unexpected element <{tag}>")]
    UnexpectedArgument { order: u64, tag: String },

    /// An argument element has no `type` attribute, or an unknown one.
    #[error("order {order}: <{tag}> has an invalid type '{type_name}'")]
    InvalidArgType {
        order: u64,
        tag: String,
        type_name: String,
    },

    /// The argument records do not form a valid operand list.
    #[error("order {order}: {source}")]
    InvalidArgument {
        order: u64,
        #[source]
        source: LoadError,
    },
}

impl XmlError {
    /// The taxonomy kind, which decides the process exit code.
    pub fn kind(&self) -> ErrorKind {
        match self {
            XmlError::Malformed(_) => ErrorKind::XmlFormat,
            XmlError::BadRoot { .. }
            | XmlError::UnexpectedElement { .. }
            | XmlError::MissingAttribute { .. }
            | XmlError::InvalidOrder { .. }
            | XmlError::UnknownOpcode { .. }
            | XmlError::UnexpectedArgument { .. }
            | XmlError::InvalidArgType { .. }
            | XmlError::InvalidArgument { .. } => ErrorKind::XmlStruct,
        }
    }
}
