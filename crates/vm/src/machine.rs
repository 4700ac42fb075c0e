//! VM state management: instructions, label table, frames, stacks, streams.

use std::collections::HashMap;
use std::fmt::Write as _;
use std::io::{self, BufRead, BufWriter, Write};

use ippcode_common::{
    DataType, Instruction, Opcode, Operand, Program, SignatureViolation, Value, VarRef,
};
use tracing::debug;

use crate::error::RuntimeError;
use crate::frames::{Frame, FrameStore};

/// The streams a program talks to.
///
/// `input` feeds READ, `stdout` receives WRITE, `stderr` receives DPRINT
/// and BREAK dumps.
pub struct Io<'io> {
    pub input: Box<dyn BufRead + 'io>,
    pub stdout: Box<dyn Write + 'io>,
    pub stderr: Box<dyn Write + 'io>,
}

impl<'io> Io<'io> {
    /// Bundle arbitrary streams.
    pub fn new(
        input: impl BufRead + 'io,
        stdout: impl Write + 'io,
        stderr: impl Write + 'io,
    ) -> Self {
        Self {
            input: Box::new(input),
            stdout: Box::new(stdout),
            stderr: Box::new(stderr),
        }
    }
}

impl Io<'static> {
    /// The process streams. Standard output is buffered and flushed when
    /// execution ends.
    pub fn stdio() -> Self {
        Self::new(
            io::stdin().lock(),
            BufWriter::new(io::stdout()),
            io::stderr(),
        )
    }
}

/// The IPPcode23 virtual machine.
pub struct VM<'io> {
    /// Instructions sorted by declared order.
    pub(crate) instructions: Vec<Instruction>,
    /// Label name to instruction position.
    pub(crate) labels: HashMap<String, usize>,
    /// Global, temporary and local frames.
    pub(crate) frames: FrameStore,
    /// Data stack for PUSHS/POPS.
    pub(crate) data_stack: Vec<Value>,
    /// Positions of executed CALL instructions.
    pub(crate) call_stack: Vec<usize>,
    /// Position of the next instruction to fetch.
    pub(crate) pc: usize,
    /// Number of instructions executed so far (LABEL excluded).
    pub(crate) executed: u64,
    /// Opcode of the most recently executed instruction.
    pub(crate) last: Option<Opcode>,
    pub(crate) io: Io<'io>,
}

impl<'io> VM<'io> {
    /// Create a new VM for the given program, talking to `io`.
    pub fn new(program: &Program, io: Io<'io>) -> Self {
        Self {
            instructions: program.sorted(),
            labels: HashMap::new(),
            frames: FrameStore::new(),
            data_stack: Vec::new(),
            call_stack: Vec::new(),
            pc: 0,
            executed: 0,
            last: None,
            io,
        }
    }

    /// Linking pre-pass: reject duplicate orders and malformed operand
    /// lists, then record every LABEL's position.
    ///
    /// Runs before any instruction executes, so a program that fails here
    /// produces no output.
    pub(crate) fn link(&mut self) -> Result<(), RuntimeError> {
        for pair in self.instructions.windows(2) {
            if pair[0].order == pair[1].order {
                return Err(RuntimeError::DuplicateOrder {
                    order: pair[1].order,
                });
            }
        }

        self.labels.clear();
        for (pos, instr) in self.instructions.iter().enumerate() {
            match instr.signature_violation() {
                None => {}
                Some(SignatureViolation::Count { expected, found }) => {
                    return Err(RuntimeError::OperandCount {
                        order: instr.order,
                        opcode: instr.opcode,
                        expected,
                        found,
                    });
                }
                Some(SignatureViolation::Kind { position, expected }) => {
                    return Err(RuntimeError::WrongOperand {
                        order: instr.order,
                        opcode: instr.opcode,
                        position,
                        expected,
                    });
                }
            }

            if instr.opcode == Opcode::Label {
                if let Some(Operand::Label(name)) = instr.operands.first() {
                    if self.labels.insert(name.clone(), pos).is_some() {
                        return Err(RuntimeError::DuplicateLabel {
                            order: instr.order,
                            label: name.clone(),
                        });
                    }
                }
            }
        }

        debug!(
            instructions = self.instructions.len(),
            labels = self.labels.len(),
            "program linked"
        );
        Ok(())
    }

    /// The instruction at the current pc, or `None` once execution has run
    /// off the end.
    pub(crate) fn fetch(&self) -> Option<&Instruction> {
        self.instructions.get(self.pc)
    }

    /// Position of `label`.
    pub(crate) fn label_position(&self, instr: &Instruction) -> Result<usize, RuntimeError> {
        let label = match instr.operands.first() {
            Some(Operand::Label(name)) => name,
            _ => return Err(self.type_mismatch(instr)),
        };
        self.labels
            .get(label)
            .copied()
            .ok_or_else(|| RuntimeError::UndefinedLabel {
                order: instr.order,
                label: label.clone(),
            })
    }

    /// Resolve a symbol operand to its value: literals directly, variables
    /// through the frame store.
    pub(crate) fn resolve(&self, instr: &Instruction, idx: usize) -> Result<Value, RuntimeError> {
        match instr.operands.get(idx) {
            Some(Operand::Literal(value)) => Ok(value.clone()),
            Some(Operand::Var(var)) => self.frames.read(var).map_err(|e| e.at(instr.order)),
            _ => Err(self.type_mismatch(instr)),
        }
    }

    /// The type of a symbol operand, or `None` for an unassigned variable.
    pub(crate) fn resolve_type(
        &self,
        instr: &Instruction,
        idx: usize,
    ) -> Result<Option<DataType>, RuntimeError> {
        match instr.operands.get(idx) {
            Some(Operand::Literal(value)) => Ok(Some(value.data_type())),
            Some(Operand::Var(var)) => self.frames.read_type(var).map_err(|e| e.at(instr.order)),
            _ => Err(self.type_mismatch(instr)),
        }
    }

    /// The variable operand at `idx`.
    pub(crate) fn var_operand<'i>(
        &self,
        instr: &'i Instruction,
        idx: usize,
    ) -> Result<&'i VarRef, RuntimeError> {
        match instr.operands.get(idx) {
            Some(Operand::Var(var)) => Ok(var),
            _ => Err(self.type_mismatch(instr)),
        }
    }

    /// Assign to the destination variable (operand 0).
    pub(crate) fn store(&mut self, instr: &Instruction, value: Value) -> Result<(), RuntimeError> {
        let var = self.var_operand(instr, 0)?;
        self.frames.write(var, value).map_err(|e| e.at(instr.order))
    }

    pub(crate) fn type_mismatch(&self, instr: &Instruction) -> RuntimeError {
        RuntimeError::TypeMismatch {
            order: instr.order,
            opcode: instr.opcode,
        }
    }

    pub(crate) fn write_stdout(&mut self, text: &str) -> Result<(), RuntimeError> {
        self.io.stdout.write_all(text.as_bytes()).map_err(output_error)
    }

    pub(crate) fn write_stderr(&mut self, text: &str) -> Result<(), RuntimeError> {
        self.io.stderr.write_all(text.as_bytes()).map_err(output_error)
    }

    pub(crate) fn flush(&mut self) -> Result<(), RuntimeError> {
        self.io.stdout.flush().map_err(output_error)?;
        self.io.stderr.flush().map_err(output_error)
    }

    /// Read one line of input without its terminator. `None` on end of
    /// input or a read failure.
    pub(crate) fn read_line(&mut self) -> Option<String> {
        let mut line = String::new();
        match self.io.input.read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => {
                if line.ends_with('\n') {
                    line.pop();
                    if line.ends_with('\r') {
                        line.pop();
                    }
                }
                Some(line)
            }
        }
    }

    /// Human-readable state dump for BREAK.
    pub(crate) fn dump_state(&self, current: &Instruction) -> String {
        let mut out = String::new();
        let last = self.last.map(|op| op.mnemonic()).unwrap_or("none");

        // Writing to a String cannot fail.
        let _ = writeln!(
            out,
            "BREAK at position {} (order {})",
            self.pc.saturating_sub(1),
            current.order
        );
        let _ = writeln!(out, "last executed: {last}");
        let _ = writeln!(out, "executed instructions: {}", self.executed);
        let _ = writeln!(out, "GF: {}", describe_frame(self.frames.global()));
        match self.frames.locals().last() {
            Some(frame) => {
                let _ = writeln!(
                    out,
                    "LF (depth {}): {}",
                    self.frames.locals().len(),
                    describe_frame(frame)
                );
            }
            None => {
                let _ = writeln!(out, "LF: undefined");
            }
        }
        match self.frames.temporary() {
            Some(frame) => {
                let _ = writeln!(out, "TF: {}", describe_frame(frame));
            }
            None => {
                let _ = writeln!(out, "TF: undefined");
            }
        }
        let stack: Vec<String> = self.data_stack.iter().map(describe_value).collect();
        let _ = writeln!(out, "data stack: [{}]", stack.join(", "));
        let calls: Vec<String> = self.call_stack.iter().map(|p| p.to_string()).collect();
        let _ = writeln!(out, "call stack: [{}]", calls.join(", "));
        out
    }
}

fn output_error(err: io::Error) -> RuntimeError {
    RuntimeError::Output {
        message: err.to_string(),
    }
}

fn describe_value(value: &Value) -> String {
    match value {
        Value::Str(s) => format!("string@{s:?}"),
        Value::Nil => "nil@nil".to_string(),
        other => format!("{}@{}", other.data_type(), other),
    }
}

fn describe_frame(frame: &Frame) -> String {
    let vars: Vec<String> = frame
        .iter()
        .map(|(name, slot)| match slot {
            Some(value) => format!("{name}={}", describe_value(value)),
            None => format!("{name}=<uninitialized>"),
        })
        .collect();
    format!("{{{}}}", vars.join(", "))
}
