//! Frame and variable storage.
//!
//! The store owns one global frame, at most one temporary frame and a stack
//! of local frames. Frames move between the temporary slot and the local
//! stack by value, so a pushed frame can never still be visible as `TF`.

use std::collections::BTreeMap;

use ippcode_common::{DataType, FrameKind, Value, VarRef};
use thiserror::Error;
use tracing::debug;

use crate::error::RuntimeError;

/// A frame: variable name to slot. `None` marks a declared but never
/// assigned variable.
pub type Frame = BTreeMap<String, Option<Value>>;

/// Frame-level failures, before the instruction order is known.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameError {
    #[error("frame {0} does not exist")]
    NoFrame(FrameKind),

    #[error("undefined variable {0}")]
    NoVar(VarRef),

    #[error("variable {0} redefined")]
    Redefined(VarRef),

    #[error("variable {0} read before assignment")]
    Uninitialized(VarRef),
}

impl FrameError {
    /// Attach the order of the instruction that triggered this error.
    pub fn at(self, order: u64) -> RuntimeError {
        match self {
            FrameError::NoFrame(frame) => RuntimeError::FrameNotFound { order, frame },
            FrameError::NoVar(var) => RuntimeError::UndefinedVariable { order, var },
            FrameError::Redefined(var) => RuntimeError::Redefinition { order, var },
            FrameError::Uninitialized(var) => RuntimeError::Uninitialized { order, var },
        }
    }
}

/// Global, temporary and local frames.
#[derive(Debug, Clone, Default)]
pub struct FrameStore {
    global: Frame,
    temporary: Option<Frame>,
    locals: Vec<Frame>,
}

impl FrameStore {
    /// A store with an empty global frame and nothing else.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the temporary frame with a fresh empty one. An unpushed
    /// previous frame is discarded.
    pub fn create_temporary_frame(&mut self) {
        self.temporary = Some(Frame::new());
    }

    /// Move the temporary frame onto the local stack.
    pub fn push_to_locals(&mut self) -> Result<(), FrameError> {
        let frame = self
            .temporary
            .take()
            .ok_or(FrameError::NoFrame(FrameKind::Temporary))?;
        self.locals.push(frame);
        debug!(depth = self.locals.len(), "local frame pushed");
        Ok(())
    }

    /// Move the top local frame into the temporary slot.
    pub fn pop_to_temporary(&mut self) -> Result<(), FrameError> {
        let frame = self
            .locals
            .pop()
            .ok_or(FrameError::NoFrame(FrameKind::Local))?;
        self.temporary = Some(frame);
        debug!(depth = self.locals.len(), "local frame popped");
        Ok(())
    }

    /// The frame addressed by `kind`.
    pub fn resolve(&self, kind: FrameKind) -> Result<&Frame, FrameError> {
        match kind {
            FrameKind::Global => Ok(&self.global),
            FrameKind::Temporary => self.temporary.as_ref().ok_or(FrameError::NoFrame(kind)),
            FrameKind::Local => self.locals.last().ok_or(FrameError::NoFrame(kind)),
        }
    }

    fn resolve_mut(&mut self, kind: FrameKind) -> Result<&mut Frame, FrameError> {
        match kind {
            FrameKind::Global => Ok(&mut self.global),
            FrameKind::Temporary => self.temporary.as_mut().ok_or(FrameError::NoFrame(kind)),
            FrameKind::Local => self.locals.last_mut().ok_or(FrameError::NoFrame(kind)),
        }
    }

    /// Declare `var` in its frame, uninitialized.
    pub fn declare(&mut self, var: &VarRef) -> Result<(), FrameError> {
        let frame = self.resolve_mut(var.frame)?;
        if frame.contains_key(&var.name) {
            return Err(FrameError::Redefined(var.clone()));
        }
        frame.insert(var.name.clone(), None);
        Ok(())
    }

    /// Assign `value` to an already declared variable.
    pub fn write(&mut self, var: &VarRef, value: Value) -> Result<(), FrameError> {
        let slot = self
            .resolve_mut(var.frame)?
            .get_mut(&var.name)
            .ok_or_else(|| FrameError::NoVar(var.clone()))?;
        *slot = Some(value);
        Ok(())
    }

    /// The current value of `var`.
    pub fn read(&self, var: &VarRef) -> Result<Value, FrameError> {
        match self.slot(var)? {
            Some(value) => Ok(value.clone()),
            None => Err(FrameError::Uninitialized(var.clone())),
        }
    }

    /// The type of `var`'s value, or `None` if it was never assigned.
    pub fn read_type(&self, var: &VarRef) -> Result<Option<DataType>, FrameError> {
        Ok(self.slot(var)?.as_ref().map(Value::data_type))
    }

    fn slot(&self, var: &VarRef) -> Result<&Option<Value>, FrameError> {
        self.resolve(var.frame)?
            .get(&var.name)
            .ok_or_else(|| FrameError::NoVar(var.clone()))
    }

    /// The global frame.
    pub fn global(&self) -> &Frame {
        &self.global
    }

    /// The temporary frame, if one exists.
    pub fn temporary(&self) -> Option<&Frame> {
        self.temporary.as_ref()
    }

    /// The local frames, bottom first.
    pub fn locals(&self) -> &[Frame] {
        &self.locals
    }
}
