//! Main execution loop and opcode dispatch for the IPPcode23 VM.

use std::cmp::Ordering;

use ippcode_common::{DataType, Instruction, Opcode, Operand, Value};
use tracing::trace;

use crate::error::RuntimeError;
use crate::machine::VM;

/// What the loop does after an instruction completes.
pub(crate) enum Flow {
    /// Fetch the instruction at the (possibly retargeted) pc.
    Next,
    /// Stop with the given exit status.
    Exit(i32),
}

impl<'io> VM<'io> {
    /// Link the program, then execute until the pc runs off the end or an
    /// EXIT instruction fires.
    ///
    /// Returns the exit status: `0` on normal completion, otherwise EXIT's
    /// operand. Standard output is flushed in every case, so text written
    /// before a fault is not lost.
    pub fn execute(&mut self) -> Result<i32, RuntimeError> {
        let result = self.link().and_then(|()| self.run_loop());
        let flushed = self.flush();
        let code = result?;
        flushed?;
        Ok(code)
    }

    fn run_loop(&mut self) -> Result<i32, RuntimeError> {
        self.pc = 0;

        while let Some(instr) = self.fetch().cloned() {
            self.pc += 1;
            trace!(order = instr.order, opcode = %instr.opcode, "dispatch");

            let flow = self.step(&instr)?;
            if instr.opcode != Opcode::Label {
                self.executed += 1;
            }
            self.last = Some(instr.opcode);

            if let Flow::Exit(code) = flow {
                return Ok(code);
            }
        }

        Ok(0)
    }

    fn step(&mut self, instr: &Instruction) -> Result<Flow, RuntimeError> {
        match instr.opcode {
            // Frames and function calls
            Opcode::Move => self.exec_move(instr)?,
            Opcode::CreateFrame => self.frames.create_temporary_frame(),
            Opcode::PushFrame => self
                .frames
                .push_to_locals()
                .map_err(|e| e.at(instr.order))?,
            Opcode::PopFrame => self
                .frames
                .pop_to_temporary()
                .map_err(|e| e.at(instr.order))?,
            Opcode::DefVar => self.exec_defvar(instr)?,
            Opcode::Call => self.exec_call(instr)?,
            Opcode::Return => self.exec_return(instr)?,

            // Data stack
            Opcode::Pushs => self.exec_pushs(instr)?,
            Opcode::Pops => self.exec_pops(instr)?,

            // Arithmetic
            Opcode::Add => self.exec_int_binary(instr, i64::wrapping_add)?,
            Opcode::Sub => self.exec_int_binary(instr, i64::wrapping_sub)?,
            Opcode::Mul => self.exec_int_binary(instr, i64::wrapping_mul)?,
            Opcode::Idiv => self.exec_idiv(instr)?,

            // Relational and boolean
            Opcode::Lt => self.exec_relational(instr, Ordering::Less)?,
            Opcode::Gt => self.exec_relational(instr, Ordering::Greater)?,
            Opcode::Eq => self.exec_eq(instr)?,
            Opcode::And => self.exec_bool_binary(instr, |a, b| a && b)?,
            Opcode::Or => self.exec_bool_binary(instr, |a, b| a || b)?,
            Opcode::Not => self.exec_not(instr)?,

            // Conversions
            Opcode::Int2Char => self.exec_int2char(instr)?,
            Opcode::Stri2Int => self.exec_stri2int(instr)?,

            // Input/output
            Opcode::Read => self.exec_read(instr)?,
            Opcode::Write => {
                let value = self.resolve(instr, 0)?;
                self.write_stdout(&value.to_string())?;
            }

            // Strings
            Opcode::Concat => self.exec_concat(instr)?,
            Opcode::Strlen => self.exec_strlen(instr)?,
            Opcode::GetChar => self.exec_getchar(instr)?,
            Opcode::SetChar => self.exec_setchar(instr)?,

            // Types
            Opcode::Type => self.exec_type(instr)?,

            // Control flow
            Opcode::Label => {} // Resolved during linking
            Opcode::Jump => self.pc = self.label_position(instr)?,
            Opcode::JumpIfEq => self.exec_jump_if(instr, true)?,
            Opcode::JumpIfNeq => self.exec_jump_if(instr, false)?,
            Opcode::Exit => return self.exec_exit(instr),

            // Debugging
            Opcode::Dprint => {
                let value = self.resolve(instr, 0)?;
                self.write_stderr(&value.to_string())?;
            }
            Opcode::Break => {
                let dump = self.dump_state(instr);
                self.write_stderr(&dump)?;
            }
        }

        Ok(Flow::Next)
    }

    // ---- Frames and function calls ----

    fn exec_move(&mut self, instr: &Instruction) -> Result<(), RuntimeError> {
        let value = self.resolve(instr, 1)?;
        self.store(instr, value)
    }

    fn exec_defvar(&mut self, instr: &Instruction) -> Result<(), RuntimeError> {
        let var = self.var_operand(instr, 0)?;
        self.frames.declare(var).map_err(|e| e.at(instr.order))
    }

    fn exec_call(&mut self, instr: &Instruction) -> Result<(), RuntimeError> {
        let target = self.label_position(instr)?;
        // pc already points past the CALL; remember the CALL itself.
        self.call_stack.push(self.pc - 1);
        self.pc = target;
        Ok(())
    }

    fn exec_return(&mut self, instr: &Instruction) -> Result<(), RuntimeError> {
        let call_pos = self
            .call_stack
            .pop()
            .ok_or(RuntimeError::CallStackEmpty { order: instr.order })?;
        self.pc = call_pos + 1;
        Ok(())
    }

    // ---- Data stack ----

    fn exec_pushs(&mut self, instr: &Instruction) -> Result<(), RuntimeError> {
        let value = self.resolve(instr, 0)?;
        self.data_stack.push(value);
        Ok(())
    }

    fn exec_pops(&mut self, instr: &Instruction) -> Result<(), RuntimeError> {
        self.check_destination(instr)?;
        let value = self
            .data_stack
            .pop()
            .ok_or(RuntimeError::DataStackEmpty { order: instr.order })?;
        self.store(instr, value)
    }

    // ---- Arithmetic ----

    /// Integer binary operation: both operands must be int.
    fn exec_int_binary(
        &mut self,
        instr: &Instruction,
        op: fn(i64, i64) -> i64,
    ) -> Result<(), RuntimeError> {
        let a = self.resolve(instr, 1)?;
        let b = self.resolve(instr, 2)?;

        match (a, b) {
            (Value::Int(x), Value::Int(y)) => self.store(instr, Value::Int(op(x, y))),
            _ => Err(self.type_mismatch(instr)),
        }
    }

    fn exec_idiv(&mut self, instr: &Instruction) -> Result<(), RuntimeError> {
        let a = self.resolve(instr, 1)?;
        let b = self.resolve(instr, 2)?;

        match (a, b) {
            (Value::Int(_), Value::Int(0)) => {
                Err(RuntimeError::DivisionByZero { order: instr.order })
            }
            (Value::Int(x), Value::Int(y)) => self.store(instr, Value::Int(floor_div(x, y))),
            _ => Err(self.type_mismatch(instr)),
        }
    }

    // ---- Relational and boolean ----

    /// LT/GT: same non-nil type on both sides.
    fn exec_relational(&mut self, instr: &Instruction, want: Ordering) -> Result<(), RuntimeError> {
        let a = self.resolve(instr, 1)?;
        let b = self.resolve(instr, 2)?;

        let ordering = match (&a, &b) {
            (Value::Int(x), Value::Int(y)) => x.cmp(y),
            (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
            (Value::Str(x), Value::Str(y)) => x.cmp(y),
            _ => return Err(self.type_mismatch(instr)),
        };

        self.store(instr, Value::Bool(ordering == want))
    }

    fn exec_eq(&mut self, instr: &Instruction) -> Result<(), RuntimeError> {
        let a = self.resolve(instr, 1)?;
        let b = self.resolve(instr, 2)?;
        let equal = self.equals(instr, &a, &b)?;
        self.store(instr, Value::Bool(equal))
    }

    /// Equality shared by EQ, JUMPIFEQ and JUMPIFNEQ. `nil` compares with
    /// anything and equals only `nil`; otherwise the types must match.
    fn equals(&self, instr: &Instruction, a: &Value, b: &Value) -> Result<bool, RuntimeError> {
        let (ta, tb) = (a.data_type(), b.data_type());
        if ta == DataType::Nil || tb == DataType::Nil || ta == tb {
            Ok(a == b)
        } else {
            Err(self.type_mismatch(instr))
        }
    }

    fn exec_bool_binary(
        &mut self,
        instr: &Instruction,
        op: fn(bool, bool) -> bool,
    ) -> Result<(), RuntimeError> {
        let a = self.resolve(instr, 1)?;
        let b = self.resolve(instr, 2)?;

        match (a, b) {
            (Value::Bool(x), Value::Bool(y)) => self.store(instr, Value::Bool(op(x, y))),
            _ => Err(self.type_mismatch(instr)),
        }
    }

    fn exec_not(&mut self, instr: &Instruction) -> Result<(), RuntimeError> {
        match self.resolve(instr, 1)? {
            Value::Bool(x) => self.store(instr, Value::Bool(!x)),
            _ => Err(self.type_mismatch(instr)),
        }
    }

    // ---- Conversions ----

    fn exec_int2char(&mut self, instr: &Instruction) -> Result<(), RuntimeError> {
        let code = match self.resolve(instr, 1)? {
            Value::Int(code) => code,
            _ => return Err(self.type_mismatch(instr)),
        };

        let c = u32::try_from(code)
            .ok()
            .and_then(char::from_u32)
            .ok_or(RuntimeError::InvalidCodePoint {
                order: instr.order,
                code,
            })?;
        self.store(instr, Value::Str(c.to_string()))
    }

    fn exec_stri2int(&mut self, instr: &Instruction) -> Result<(), RuntimeError> {
        let (s, index) = self.string_and_index(instr)?;
        let c = char_at(instr, &s, index)?;
        self.store(instr, Value::Int(c as i64))
    }

    // ---- Input/output ----

    fn exec_read(&mut self, instr: &Instruction) -> Result<(), RuntimeError> {
        let requested = match instr.operands.get(1) {
            Some(Operand::Type(t)) if *t != DataType::Nil => *t,
            _ => return Err(self.type_mismatch(instr)),
        };
        self.check_destination(instr)?;

        let value = match self.read_line() {
            Some(line) => convert_input(requested, line),
            None => Value::Nil,
        };
        self.store(instr, value)
    }

    // ---- Strings ----

    fn exec_concat(&mut self, instr: &Instruction) -> Result<(), RuntimeError> {
        let a = self.resolve(instr, 1)?;
        let b = self.resolve(instr, 2)?;

        match (a, b) {
            (Value::Str(mut x), Value::Str(y)) => {
                x.push_str(&y);
                self.store(instr, Value::Str(x))
            }
            _ => Err(self.type_mismatch(instr)),
        }
    }

    fn exec_strlen(&mut self, instr: &Instruction) -> Result<(), RuntimeError> {
        match self.resolve(instr, 1)? {
            Value::Str(s) => self.store(instr, Value::Int(s.chars().count() as i64)),
            _ => Err(self.type_mismatch(instr)),
        }
    }

    fn exec_getchar(&mut self, instr: &Instruction) -> Result<(), RuntimeError> {
        let (s, index) = self.string_and_index(instr)?;
        let c = char_at(instr, &s, index)?;
        self.store(instr, Value::Str(c.to_string()))
    }

    fn exec_setchar(&mut self, instr: &Instruction) -> Result<(), RuntimeError> {
        let target = self.resolve(instr, 0)?;
        let index = self.resolve(instr, 1)?;
        let replacement = self.resolve(instr, 2)?;

        let (target, index, replacement) = match (target, index, replacement) {
            (Value::Str(t), Value::Int(i), Value::Str(r)) => (t, i, r),
            _ => return Err(self.type_mismatch(instr)),
        };

        char_at(instr, &target, index)?;
        let new_char = replacement
            .chars()
            .next()
            .ok_or(RuntimeError::EmptyReplacement { order: instr.order })?;

        let updated: String = target
            .chars()
            .enumerate()
            .map(|(i, c)| if i as i64 == index { new_char } else { c })
            .collect();
        self.store(instr, Value::Str(updated))
    }

    /// Operands 1 and 2 as (string, int), for GETCHAR and STRI2INT.
    fn string_and_index(&self, instr: &Instruction) -> Result<(String, i64), RuntimeError> {
        let s = self.resolve(instr, 1)?;
        let index = self.resolve(instr, 2)?;

        match (s, index) {
            (Value::Str(s), Value::Int(i)) => Ok((s, i)),
            _ => Err(self.type_mismatch(instr)),
        }
    }

    // ---- Types ----

    fn exec_type(&mut self, instr: &Instruction) -> Result<(), RuntimeError> {
        let name = self
            .resolve_type(instr, 1)?
            .map(|t| t.name())
            .unwrap_or("");
        self.store(instr, Value::string(name))
    }

    // ---- Control flow ----

    fn exec_jump_if(&mut self, instr: &Instruction, want_equal: bool) -> Result<(), RuntimeError> {
        let target = self.label_position(instr)?;
        let a = self.resolve(instr, 1)?;
        let b = self.resolve(instr, 2)?;

        if self.equals(instr, &a, &b)? == want_equal {
            self.pc = target;
        }
        Ok(())
    }

    fn exec_exit(&mut self, instr: &Instruction) -> Result<Flow, RuntimeError> {
        match self.resolve(instr, 0)? {
            Value::Int(code @ 0..=49) => Ok(Flow::Exit(code as i32)),
            Value::Int(code) => Err(RuntimeError::InvalidExitCode {
                order: instr.order,
                code,
            }),
            _ => Err(self.type_mismatch(instr)),
        }
    }

    /// Fail before consuming input or the data stack if the destination
    /// variable cannot be written.
    fn check_destination(&self, instr: &Instruction) -> Result<(), RuntimeError> {
        let var = self.var_operand(instr, 0)?;
        self.frames
            .read_type(var)
            .map(|_| ())
            .map_err(|e| e.at(instr.order))
    }
}

/// Integer division rounding toward negative infinity.
///
/// `i64::MIN / -1` wraps to `i64::MIN`.
pub(crate) fn floor_div(a: i64, b: i64) -> i64 {
    let q = a.wrapping_div(b);
    if a.wrapping_rem(b) != 0 && ((a < 0) != (b < 0)) {
        q - 1
    } else {
        q
    }
}

/// The character at `index`, counted in Unicode scalar values.
fn char_at(instr: &Instruction, s: &str, index: i64) -> Result<char, RuntimeError> {
    let out_of_bounds = || RuntimeError::StringIndexOutOfBounds {
        order: instr.order,
        index,
        length: s.chars().count(),
    };
    let idx = usize::try_from(index).map_err(|_| out_of_bounds())?;
    s.chars().nth(idx).ok_or_else(out_of_bounds)
}

/// Convert one line of input to the requested type. Unparsable input
/// becomes `nil`. An empty bool line is `nil`; a blank but non-empty one
/// is `false`.
fn convert_input(requested: DataType, line: String) -> Value {
    match requested {
        DataType::Int => line.trim().parse().map(Value::Int).unwrap_or(Value::Nil),
        DataType::Bool if line.is_empty() => Value::Nil,
        DataType::Bool => Value::Bool(line.trim().eq_ignore_ascii_case("true")),
        DataType::String => Value::Str(line),
        DataType::Nil => Value::Nil,
    }
}
