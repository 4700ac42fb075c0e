//! Integration tests for the IPPcode23 VM.
//!
//! Organized by instruction group. Programs are built directly from
//! operands; orders are assigned 1..n unless a test needs otherwise.

use ippcode_common::{DataType, ErrorKind, FrameKind, Instruction, Opcode, Operand, Program, Value, VarRef};
use ippcode_vm::{run, Io, RuntimeError};

// ============================================================
// Helper functions
// ============================================================

fn var(text: &str) -> Operand {
    Operand::Var(VarRef::parse(text).unwrap())
}

fn int(n: i64) -> Operand {
    Operand::Literal(Value::Int(n))
}

fn boolean(b: bool) -> Operand {
    Operand::Literal(Value::Bool(b))
}

fn string(s: &str) -> Operand {
    Operand::Literal(Value::string(s))
}

fn nil() -> Operand {
    Operand::Literal(Value::Nil)
}

fn label(name: &str) -> Operand {
    Operand::Label(name.to_string())
}

fn ty(t: DataType) -> Operand {
    Operand::Type(t)
}

/// Number instructions 1..n in the given sequence.
fn program(ops: Vec<(Opcode, Vec<Operand>)>) -> Program {
    Program::new(
        ops.into_iter()
            .enumerate()
            .map(|(i, (op, operands))| Instruction::new(op, i as u64 + 1, operands))
            .collect(),
    )
}

/// Everything a run produced.
struct Outcome {
    result: Result<i32, RuntimeError>,
    stdout: String,
    stderr: String,
}

fn run_program_with_input(program: &Program, input: &str) -> Outcome {
    let mut stdout = Vec::new();
    let mut stderr = Vec::new();
    let result = run(program, Io::new(input.as_bytes(), &mut stdout, &mut stderr));
    Outcome {
        result,
        stdout: String::from_utf8(stdout).unwrap(),
        stderr: String::from_utf8(stderr).unwrap(),
    }
}

fn run_ops(ops: Vec<(Opcode, Vec<Operand>)>) -> Outcome {
    run_program_with_input(&program(ops), "")
}

fn run_ops_with_input(ops: Vec<(Opcode, Vec<Operand>)>, input: &str) -> Outcome {
    run_program_with_input(&program(ops), input)
}

/// Declare GF@r, run `op GF@r a b`, and return the stored value written out.
fn binary(op: Opcode, a: Operand, b: Operand) -> Outcome {
    run_ops(vec![
        (Opcode::DefVar, vec![var("GF@r")]),
        (op, vec![var("GF@r"), a, b]),
        (Opcode::Write, vec![var("GF@r")]),
    ])
}

fn kind_of(outcome: &Outcome) -> ErrorKind {
    outcome.result.as_ref().unwrap_err().kind()
}

// ============================================================
// Program shape and exit status
// ============================================================

#[test]
fn empty_program_exits_zero() {
    let outcome = run_ops(vec![]);
    assert_eq!(outcome.result, Ok(0));
    assert_eq!(outcome.stdout, "");
}

#[test]
fn hello_world() {
    let outcome = run_ops(vec![(Opcode::Write, vec![string("Hello, world!")])]);
    assert_eq!(outcome.result, Ok(0));
    assert_eq!(outcome.stdout, "Hello, world!");
}

#[test]
fn instructions_run_in_order_not_in_sequence() {
    let program = Program::new(vec![
        Instruction::new(Opcode::Write, 30, vec![string("c")]),
        Instruction::new(Opcode::Write, 2, vec![string("a")]),
        Instruction::new(Opcode::Write, 10, vec![string("b")]),
    ]);
    let outcome = run_program_with_input(&program, "");
    assert_eq!(outcome.stdout, "abc");
}

#[test]
fn duplicate_order_fails_before_any_output() {
    let program = Program::new(vec![
        Instruction::new(Opcode::Write, 1, vec![string("x")]),
        Instruction::new(Opcode::Write, 1, vec![string("y")]),
    ]);
    let outcome = run_program_with_input(&program, "");
    assert_eq!(outcome.result, Err(RuntimeError::DuplicateOrder { order: 1 }));
    assert_eq!(kind_of(&outcome), ErrorKind::XmlStruct);
    assert_eq!(outcome.stdout, "");
}

#[test]
fn wrong_operand_kind_is_structural() {
    let outcome = run_ops(vec![(Opcode::DefVar, vec![int(1)])]);
    assert_eq!(kind_of(&outcome), ErrorKind::XmlStruct);
}

#[test]
fn exit_returns_code_and_stops() {
    let outcome = run_ops(vec![
        (Opcode::Write, vec![string("before")]),
        (Opcode::Exit, vec![int(7)]),
        (Opcode::Write, vec![string("after")]),
    ]);
    assert_eq!(outcome.result, Ok(7));
    assert_eq!(outcome.stdout, "before");
}

#[test]
fn exit_range_bounds() {
    assert_eq!(run_ops(vec![(Opcode::Exit, vec![int(0)])]).result, Ok(0));
    assert_eq!(run_ops(vec![(Opcode::Exit, vec![int(49)])]).result, Ok(49));

    let too_big = run_ops(vec![(Opcode::Exit, vec![int(50)])]);
    assert_eq!(kind_of(&too_big), ErrorKind::OpValue);
    let negative = run_ops(vec![(Opcode::Exit, vec![int(-1)])]);
    assert_eq!(kind_of(&negative), ErrorKind::OpValue);
}

#[test]
fn exit_with_non_int_is_type_error() {
    let outcome = run_ops(vec![(Opcode::Exit, vec![string("3")])]);
    assert_eq!(kind_of(&outcome), ErrorKind::OpTypes);
}

#[test]
fn output_before_fault_is_kept() {
    let outcome = run_ops(vec![
        (Opcode::Write, vec![string("partial")]),
        (Opcode::Write, vec![var("GF@ghost")]),
    ]);
    assert_eq!(outcome.stdout, "partial");
    assert_eq!(kind_of(&outcome), ErrorKind::NoVar);
}

// ============================================================
// Variables and frames
// ============================================================

#[test]
fn defvar_move_write() {
    let outcome = run_ops(vec![
        (Opcode::DefVar, vec![var("GF@x")]),
        (Opcode::Move, vec![var("GF@x"), int(42)]),
        (Opcode::Write, vec![var("GF@x")]),
    ]);
    assert_eq!(outcome.stdout, "42");
}

#[test]
fn write_renders_each_type() {
    let outcome = run_ops(vec![
        (Opcode::Write, vec![int(-3)]),
        (Opcode::Write, vec![boolean(true)]),
        (Opcode::Write, vec![boolean(false)]),
        (Opcode::Write, vec![nil()]),
        (Opcode::Write, vec![string("a b\n")]),
    ]);
    assert_eq!(outcome.stdout, "-3truefalsea b\n");
}

#[test]
fn undeclared_variable_is_no_var() {
    let outcome = run_ops(vec![(Opcode::Write, vec![var("GF@ghost")])]);
    assert_eq!(kind_of(&outcome), ErrorKind::NoVar);
}

#[test]
fn uninitialized_read_is_missing_value() {
    let outcome = run_ops(vec![
        (Opcode::DefVar, vec![var("GF@x")]),
        (Opcode::Write, vec![var("GF@x")]),
    ]);
    assert_eq!(kind_of(&outcome), ErrorKind::MissingValue);
}

#[test]
fn redefinition_is_semantic() {
    let outcome = run_ops(vec![
        (Opcode::DefVar, vec![var("GF@x")]),
        (Opcode::DefVar, vec![var("GF@x")]),
    ]);
    assert!(matches!(
        outcome.result,
        Err(RuntimeError::Redefinition { order: 2, .. })
    ));
    assert_eq!(kind_of(&outcome), ErrorKind::Semantic);
}

#[test]
fn temporary_redefinition_is_semantic() {
    let outcome = run_ops(vec![
        (Opcode::CreateFrame, vec![]),
        (Opcode::DefVar, vec![var("TF@x")]),
        (Opcode::DefVar, vec![var("TF@x")]),
    ]);
    assert_eq!(kind_of(&outcome), ErrorKind::Semantic);
}

#[test]
fn temporary_frame_missing() {
    let outcome = run_ops(vec![(Opcode::DefVar, vec![var("TF@x")])]);
    assert_eq!(
        outcome.result,
        Err(RuntimeError::FrameNotFound {
            order: 1,
            frame: FrameKind::Temporary
        })
    );
    assert_eq!(kind_of(&outcome), ErrorKind::NoFrame);
}

#[test]
fn local_frame_missing() {
    let outcome = run_ops(vec![(Opcode::DefVar, vec![var("LF@x")])]);
    assert_eq!(kind_of(&outcome), ErrorKind::NoFrame);
}

#[test]
fn pushframe_without_temporary() {
    let outcome = run_ops(vec![(Opcode::PushFrame, vec![])]);
    assert_eq!(kind_of(&outcome), ErrorKind::NoFrame);
}

#[test]
fn popframe_without_locals() {
    let outcome = run_ops(vec![(Opcode::PopFrame, vec![])]);
    assert_eq!(kind_of(&outcome), ErrorKind::NoFrame);
}

#[test]
fn frame_lifecycle() {
    let outcome = run_ops(vec![
        (Opcode::CreateFrame, vec![]),
        (Opcode::DefVar, vec![var("TF@x")]),
        (Opcode::Move, vec![var("TF@x"), string("kept")]),
        (Opcode::PushFrame, vec![]),
        (Opcode::Write, vec![var("LF@x")]),
        (Opcode::PopFrame, vec![]),
        (Opcode::Write, vec![var("TF@x")]),
    ]);
    assert_eq!(outcome.result, Ok(0));
    assert_eq!(outcome.stdout, "keptkept");
}

#[test]
fn pushframe_consumes_temporary() {
    let outcome = run_ops(vec![
        (Opcode::CreateFrame, vec![]),
        (Opcode::PushFrame, vec![]),
        (Opcode::DefVar, vec![var("TF@x")]),
    ]);
    assert_eq!(kind_of(&outcome), ErrorKind::NoFrame);
}

#[test]
fn nested_locals_only_top_visible() {
    let outcome = run_ops(vec![
        (Opcode::CreateFrame, vec![]),
        (Opcode::DefVar, vec![var("TF@outer")]),
        (Opcode::PushFrame, vec![]),
        (Opcode::CreateFrame, vec![]),
        (Opcode::PushFrame, vec![]),
        (Opcode::Move, vec![var("LF@outer"), int(1)]),
    ]);
    assert_eq!(kind_of(&outcome), ErrorKind::NoVar);
}

#[test]
fn move_overwrites_with_any_type() {
    let outcome = run_ops(vec![
        (Opcode::DefVar, vec![var("GF@x")]),
        (Opcode::Move, vec![var("GF@x"), int(1)]),
        (Opcode::Move, vec![var("GF@x"), string("now a string")]),
        (Opcode::Write, vec![var("GF@x")]),
    ]);
    assert_eq!(outcome.stdout, "now a string");
}

// ============================================================
// Calls and the data stack
// ============================================================

#[test]
fn call_and_return() {
    let outcome = run_ops(vec![
        (Opcode::Call, vec![label("f")]),
        (Opcode::Write, vec![string("back")]),
        (Opcode::Exit, vec![int(0)]),
        (Opcode::Label, vec![label("f")]),
        (Opcode::Write, vec![string("in f;")]),
        (Opcode::Return, vec![]),
    ]);
    assert_eq!(outcome.result, Ok(0));
    assert_eq!(outcome.stdout, "in f;back");
}

#[test]
fn recursive_countdown() {
    // f(n): write n; if n != 0 { f(n - 1) }
    let outcome = run_ops(vec![
        (Opcode::DefVar, vec![var("GF@n")]),
        (Opcode::Move, vec![var("GF@n"), int(3)]),
        (Opcode::Call, vec![label("f")]),
        (Opcode::Exit, vec![int(0)]),
        (Opcode::Label, vec![label("f")]),
        (Opcode::Write, vec![var("GF@n")]),
        (Opcode::JumpIfEq, vec![label("done"), var("GF@n"), int(0)]),
        (Opcode::Sub, vec![var("GF@n"), var("GF@n"), int(1)]),
        (Opcode::Call, vec![label("f")]),
        (Opcode::Label, vec![label("done")]),
        (Opcode::Return, vec![]),
    ]);
    assert_eq!(outcome.result, Ok(0));
    assert_eq!(outcome.stdout, "3210");
}

#[test]
fn return_with_empty_call_stack() {
    let outcome = run_ops(vec![(Opcode::Return, vec![])]);
    assert_eq!(outcome.result, Err(RuntimeError::CallStackEmpty { order: 1 }));
    assert_eq!(kind_of(&outcome), ErrorKind::MissingValue);
}

#[test]
fn call_undefined_label() {
    let outcome = run_ops(vec![(Opcode::Call, vec![label("nowhere")])]);
    assert_eq!(kind_of(&outcome), ErrorKind::Semantic);
}

#[test]
fn pushs_pops_is_lifo() {
    let outcome = run_ops(vec![
        (Opcode::DefVar, vec![var("GF@a")]),
        (Opcode::DefVar, vec![var("GF@b")]),
        (Opcode::Pushs, vec![int(1)]),
        (Opcode::Pushs, vec![string("two")]),
        (Opcode::Pops, vec![var("GF@a")]),
        (Opcode::Pops, vec![var("GF@b")]),
        (Opcode::Write, vec![var("GF@a")]),
        (Opcode::Write, vec![var("GF@b")]),
    ]);
    assert_eq!(outcome.stdout, "two1");
}

#[test]
fn pushs_pops_keeps_nil_type() {
    let outcome = run_ops(vec![
        (Opcode::DefVar, vec![var("GF@v")]),
        (Opcode::DefVar, vec![var("GF@t")]),
        (Opcode::Pushs, vec![nil()]),
        (Opcode::Pops, vec![var("GF@v")]),
        (Opcode::Type, vec![var("GF@t"), var("GF@v")]),
        (Opcode::Write, vec![var("GF@t")]),
    ]);
    assert_eq!(outcome.stdout, "nil");
}

#[test]
fn pops_on_empty_stack() {
    let outcome = run_ops(vec![
        (Opcode::DefVar, vec![var("GF@a")]),
        (Opcode::Pops, vec![var("GF@a")]),
    ]);
    assert_eq!(kind_of(&outcome), ErrorKind::MissingValue);
}

#[test]
fn pops_to_undeclared_variable_keeps_stack() {
    let outcome = run_ops(vec![
        (Opcode::Pushs, vec![int(1)]),
        (Opcode::Pops, vec![var("GF@missing")]),
    ]);
    assert_eq!(kind_of(&outcome), ErrorKind::NoVar);
}

#[test]
fn pushs_uninitialized_variable() {
    let outcome = run_ops(vec![
        (Opcode::DefVar, vec![var("GF@a")]),
        (Opcode::Pushs, vec![var("GF@a")]),
    ]);
    assert_eq!(kind_of(&outcome), ErrorKind::MissingValue);
}

// ============================================================
// Arithmetic
// ============================================================

#[test]
fn add_sub_mul() {
    assert_eq!(binary(Opcode::Add, int(2), int(3)).stdout, "5");
    assert_eq!(binary(Opcode::Sub, int(2), int(3)).stdout, "-1");
    assert_eq!(binary(Opcode::Mul, int(-4), int(3)).stdout, "-12");
}

#[test]
fn arithmetic_wraps() {
    assert_eq!(
        binary(Opcode::Add, int(i64::MAX), int(1)).stdout,
        i64::MIN.to_string()
    );
}

#[test]
fn idiv_floors() {
    assert_eq!(binary(Opcode::Idiv, int(7), int(2)).stdout, "3");
    assert_eq!(binary(Opcode::Idiv, int(-7), int(2)).stdout, "-4");
    assert_eq!(binary(Opcode::Idiv, int(7), int(-2)).stdout, "-4");
    assert_eq!(binary(Opcode::Idiv, int(-7), int(-2)).stdout, "3");
}

#[test]
fn idiv_by_zero() {
    let outcome = binary(Opcode::Idiv, int(1), int(0));
    assert_eq!(outcome.result, Err(RuntimeError::DivisionByZero { order: 2 }));
    assert_eq!(kind_of(&outcome), ErrorKind::OpValue);
}

#[test]
fn arithmetic_rejects_non_int() {
    assert_eq!(kind_of(&binary(Opcode::Add, int(1), string("1"))), ErrorKind::OpTypes);
    assert_eq!(kind_of(&binary(Opcode::Mul, boolean(true), int(1))), ErrorKind::OpTypes);
    assert_eq!(kind_of(&binary(Opcode::Sub, nil(), int(1))), ErrorKind::OpTypes);
}

// ============================================================
// Relational and boolean
// ============================================================

#[test]
fn lt_gt_on_each_type() {
    assert_eq!(binary(Opcode::Lt, int(1), int(2)).stdout, "true");
    assert_eq!(binary(Opcode::Gt, int(1), int(2)).stdout, "false");
    assert_eq!(binary(Opcode::Lt, boolean(false), boolean(true)).stdout, "true");
    assert_eq!(binary(Opcode::Gt, string("b"), string("abc")).stdout, "true");
    assert_eq!(binary(Opcode::Lt, string("a"), string("a")).stdout, "false");
}

#[test]
fn lt_with_nil_is_type_error() {
    let outcome = binary(Opcode::Lt, nil(), int(1));
    assert_eq!(kind_of(&outcome), ErrorKind::OpTypes);
}

#[test]
fn lt_mixed_types_is_type_error() {
    assert_eq!(kind_of(&binary(Opcode::Gt, int(1), string("1"))), ErrorKind::OpTypes);
}

#[test]
fn eq_rules() {
    assert_eq!(binary(Opcode::Eq, int(1), int(1)).stdout, "true");
    assert_eq!(binary(Opcode::Eq, string("a"), string("b")).stdout, "false");
    assert_eq!(binary(Opcode::Eq, nil(), nil()).stdout, "true");
    assert_eq!(binary(Opcode::Eq, nil(), int(0)).stdout, "false");
    assert_eq!(binary(Opcode::Eq, string(""), nil()).stdout, "false");
    assert_eq!(kind_of(&binary(Opcode::Eq, int(1), boolean(true))), ErrorKind::OpTypes);
}

#[test]
fn and_or_not() {
    assert_eq!(binary(Opcode::And, boolean(true), boolean(false)).stdout, "false");
    assert_eq!(binary(Opcode::Or, boolean(true), boolean(false)).stdout, "true");
    assert_eq!(kind_of(&binary(Opcode::And, int(1), boolean(true))), ErrorKind::OpTypes);

    let outcome = run_ops(vec![
        (Opcode::DefVar, vec![var("GF@r")]),
        (Opcode::Not, vec![var("GF@r"), boolean(false)]),
        (Opcode::Write, vec![var("GF@r")]),
    ]);
    assert_eq!(outcome.stdout, "true");
}

// ============================================================
// Conversions and strings
// ============================================================

#[test]
fn int2char_and_back() {
    let outcome = run_ops(vec![
        (Opcode::DefVar, vec![var("GF@c")]),
        (Opcode::DefVar, vec![var("GF@n")]),
        (Opcode::Int2Char, vec![var("GF@c"), int(0x17E)]),
        (Opcode::Write, vec![var("GF@c")]),
        (Opcode::Stri2Int, vec![var("GF@n"), string("ažb"), int(1)]),
        (Opcode::Write, vec![var("GF@n")]),
    ]);
    assert_eq!(outcome.stdout, "ž382");
}

#[test]
fn int2char_invalid_code_point() {
    let outcome = run_ops(vec![
        (Opcode::DefVar, vec![var("GF@c")]),
        (Opcode::Int2Char, vec![var("GF@c"), int(-1)]),
    ]);
    assert_eq!(kind_of(&outcome), ErrorKind::StringIndex);

    let surrogate = run_ops(vec![
        (Opcode::DefVar, vec![var("GF@c")]),
        (Opcode::Int2Char, vec![var("GF@c"), int(0xD800)]),
    ]);
    assert_eq!(kind_of(&surrogate), ErrorKind::StringIndex);
}

#[test]
fn stri2int_out_of_range() {
    assert_eq!(
        kind_of(&binary(Opcode::Stri2Int, string("abc"), int(3))),
        ErrorKind::StringIndex
    );
    assert_eq!(
        kind_of(&binary(Opcode::Stri2Int, string("abc"), int(-1))),
        ErrorKind::StringIndex
    );
}

#[test]
fn concat_strlen_getchar() {
    assert_eq!(binary(Opcode::Concat, string("ab"), string("cd")).stdout, "abcd");
    assert_eq!(binary(Opcode::GetChar, string("abc"), int(2)).stdout, "c");
    assert_eq!(kind_of(&binary(Opcode::Concat, string("a"), int(1))), ErrorKind::OpTypes);

    let outcome = run_ops(vec![
        (Opcode::DefVar, vec![var("GF@n")]),
        (Opcode::Strlen, vec![var("GF@n"), string("příliš")]),
        (Opcode::Write, vec![var("GF@n")]),
    ]);
    assert_eq!(outcome.stdout, "6");
}

#[test]
fn getchar_empty_string() {
    assert_eq!(
        kind_of(&binary(Opcode::GetChar, string(""), int(0))),
        ErrorKind::StringIndex
    );
}

fn setchar(target: &str, index: i64, replacement: &str) -> Outcome {
    run_ops(vec![
        (Opcode::DefVar, vec![var("GF@s")]),
        (Opcode::Move, vec![var("GF@s"), string(target)]),
        (Opcode::SetChar, vec![var("GF@s"), int(index), string(replacement)]),
        (Opcode::Write, vec![var("GF@s")]),
    ])
}

#[test]
fn setchar_replaces_one_character() {
    assert_eq!(setchar("abc", 1, "X").stdout, "aXc");
    assert_eq!(setchar("abc", 0, "XYZ").stdout, "Xbc");
}

#[test]
fn setchar_out_of_range() {
    let outcome = setchar("abc", 3, "X");
    assert_eq!(kind_of(&outcome), ErrorKind::StringIndex);
    assert_eq!(outcome.stdout, "");
}

#[test]
fn setchar_empty_replacement() {
    let outcome = setchar("abc", 0, "");
    assert_eq!(outcome.result, Err(RuntimeError::EmptyReplacement { order: 3 }));
    assert_eq!(kind_of(&outcome), ErrorKind::StringIndex);
}

#[test]
fn setchar_uninitialized_target() {
    let outcome = run_ops(vec![
        (Opcode::DefVar, vec![var("GF@s")]),
        (Opcode::SetChar, vec![var("GF@s"), int(0), string("x")]),
    ]);
    assert_eq!(kind_of(&outcome), ErrorKind::MissingValue);
}

// ============================================================
// Types
// ============================================================

#[test]
fn type_names() {
    assert_eq!(binary_type(int(1)), "int");
    assert_eq!(binary_type(boolean(false)), "bool");
    assert_eq!(binary_type(string("")), "string");
    assert_eq!(binary_type(nil()), "nil");
}

fn binary_type(operand: Operand) -> String {
    run_ops(vec![
        (Opcode::DefVar, vec![var("GF@t")]),
        (Opcode::Type, vec![var("GF@t"), operand]),
        (Opcode::Write, vec![var("GF@t")]),
    ])
    .stdout
}

#[test]
fn type_of_uninitialized_is_empty_string() {
    let outcome = run_ops(vec![
        (Opcode::DefVar, vec![var("GF@t")]),
        (Opcode::DefVar, vec![var("GF@x")]),
        (Opcode::Type, vec![var("GF@t"), var("GF@x")]),
        (Opcode::Concat, vec![var("GF@t"), string("["), var("GF@t")]),
        (Opcode::Write, vec![var("GF@t")]),
    ]);
    assert_eq!(outcome.result, Ok(0));
    assert_eq!(outcome.stdout, "[");
}

#[test]
fn type_of_undeclared_is_no_var() {
    let outcome = run_ops(vec![
        (Opcode::DefVar, vec![var("GF@t")]),
        (Opcode::Type, vec![var("GF@t"), var("GF@x")]),
    ]);
    assert_eq!(kind_of(&outcome), ErrorKind::NoVar);
}

// ============================================================
// Input
// ============================================================

fn read_each(t: DataType, input: &str, lines: usize) -> Outcome {
    let mut ops = vec![(Opcode::DefVar, vec![var("GF@x")])];
    for _ in 0..lines {
        ops.push((Opcode::Read, vec![var("GF@x"), ty(t)]));
        ops.push((Opcode::Type, vec![var("GF@x"), var("GF@x")]));
        ops.push((Opcode::Write, vec![var("GF@x")]));
        ops.push((Opcode::Write, vec![string(";")]));
    }
    run_ops_with_input(ops, input)
}

#[test]
fn read_int() {
    let outcome = run_ops_with_input(
        vec![
            (Opcode::DefVar, vec![var("GF@x")]),
            (Opcode::Read, vec![var("GF@x"), ty(DataType::Int)]),
            (Opcode::Add, vec![var("GF@x"), var("GF@x"), int(1)]),
            (Opcode::Write, vec![var("GF@x")]),
        ],
        "41\n",
    );
    assert_eq!(outcome.stdout, "42");
}

#[test]
fn read_types_of_bad_input() {
    // Empty line, garbage, then end of input.
    assert_eq!(read_each(DataType::Int, "\nabc\n", 3).stdout, "nil;nil;nil;");
    assert_eq!(read_each(DataType::Bool, "\nTRUE\n", 3).stdout, "nil;bool;nil;");
    assert_eq!(read_each(DataType::String, "\nabc\n", 3).stdout, "string;string;nil;");
}

#[test]
fn read_bool_values() {
    let outcome = run_ops_with_input(
        vec![
            (Opcode::DefVar, vec![var("GF@x")]),
            (Opcode::Read, vec![var("GF@x"), ty(DataType::Bool)]),
            (Opcode::Write, vec![var("GF@x")]),
            (Opcode::Read, vec![var("GF@x"), ty(DataType::Bool)]),
            (Opcode::Write, vec![var("GF@x")]),
        ],
        "true\nyes\n",
    );
    assert_eq!(outcome.stdout, "truefalse");
}

#[test]
fn read_bool_blank_line_is_false() {
    assert_eq!(read_each(DataType::Bool, "   \n\t\n", 2).stdout, "bool;bool;");

    let outcome = run_ops_with_input(
        vec![
            (Opcode::DefVar, vec![var("GF@x")]),
            (Opcode::Read, vec![var("GF@x"), ty(DataType::Bool)]),
            (Opcode::Write, vec![var("GF@x")]),
        ],
        "   \n",
    );
    assert_eq!(outcome.stdout, "false");
}

#[test]
fn read_string_keeps_content() {
    let outcome = run_ops_with_input(
        vec![
            (Opcode::DefVar, vec![var("GF@x")]),
            (Opcode::Read, vec![var("GF@x"), ty(DataType::String)]),
            (Opcode::Write, vec![var("GF@x")]),
        ],
        "  two words  \r\n",
    );
    assert_eq!(outcome.stdout, "  two words  ");
}

#[test]
fn read_into_temporary_frame_on_empty_input() {
    let outcome = run_ops(vec![
        (Opcode::CreateFrame, vec![]),
        (Opcode::DefVar, vec![var("TF@x")]),
        (Opcode::Read, vec![var("TF@x"), ty(DataType::Int)]),
        (Opcode::Type, vec![var("TF@x"), var("TF@x")]),
        (Opcode::Write, vec![var("TF@x")]),
    ]);
    assert_eq!(outcome.result, Ok(0));
    assert_eq!(outcome.stdout, "nil");
}

#[test]
fn read_nil_type_is_rejected() {
    let outcome = run_ops(vec![
        (Opcode::DefVar, vec![var("GF@x")]),
        (Opcode::Read, vec![var("GF@x"), ty(DataType::Nil)]),
    ]);
    assert_eq!(kind_of(&outcome), ErrorKind::OpTypes);
}

// ============================================================
// Control flow
// ============================================================

#[test]
fn jump_skips_forward() {
    let outcome = run_ops(vec![
        (Opcode::Jump, vec![label("end")]),
        (Opcode::Write, vec![string("skipped")]),
        (Opcode::Label, vec![label("end")]),
        (Opcode::Write, vec![string("done")]),
    ]);
    assert_eq!(outcome.stdout, "done");
}

#[test]
fn loop_with_conditional_jump() {
    let outcome = run_ops(vec![
        (Opcode::DefVar, vec![var("GF@i")]),
        (Opcode::Move, vec![var("GF@i"), int(0)]),
        (Opcode::Label, vec![label("loop")]),
        (Opcode::Write, vec![var("GF@i")]),
        (Opcode::Add, vec![var("GF@i"), var("GF@i"), int(1)]),
        (Opcode::JumpIfNeq, vec![label("loop"), var("GF@i"), int(5)]),
    ]);
    assert_eq!(outcome.stdout, "01234");
}

#[test]
fn jumpifeq_with_nil() {
    let outcome = run_ops(vec![
        (Opcode::JumpIfEq, vec![label("l"), nil(), string("")]),
        (Opcode::Write, vec![string("not equal")]),
        (Opcode::Label, vec![label("l")]),
    ]);
    assert_eq!(outcome.stdout, "not equal");
}

#[test]
fn jumpifeq_mixed_types() {
    let outcome = run_ops(vec![
        (Opcode::JumpIfEq, vec![label("l"), int(1), string("1")]),
        (Opcode::Label, vec![label("l")]),
    ]);
    assert_eq!(kind_of(&outcome), ErrorKind::OpTypes);
}

#[test]
fn jumpifeq_undefined_label_checked_before_operands() {
    let outcome = run_ops(vec![(
        Opcode::JumpIfEq,
        vec![label("nowhere"), int(1), string("1")],
    )]);
    assert_eq!(kind_of(&outcome), ErrorKind::Semantic);
}

#[test]
fn duplicate_label() {
    let outcome = run_ops(vec![
        (Opcode::Label, vec![label("a")]),
        (Opcode::Write, vec![string("x")]),
        (Opcode::Label, vec![label("a")]),
    ]);
    assert_eq!(kind_of(&outcome), ErrorKind::Semantic);
    assert_eq!(outcome.stdout, "");
}

// ============================================================
// Debugging
// ============================================================

#[test]
fn dprint_goes_to_stderr() {
    let outcome = run_ops(vec![(Opcode::Dprint, vec![string("debug")])]);
    assert_eq!(outcome.stdout, "");
    assert_eq!(outcome.stderr, "debug");
}

#[test]
fn break_dumps_state() {
    let outcome = run_ops(vec![
        (Opcode::DefVar, vec![var("GF@x")]),
        (Opcode::Move, vec![var("GF@x"), int(3)]),
        (Opcode::Label, vec![label("here")]),
        (Opcode::Pushs, vec![string("s")]),
        (Opcode::Break, vec![]),
    ]);
    assert_eq!(outcome.result, Ok(0));
    assert_eq!(outcome.stdout, "");
    assert!(outcome.stderr.contains("BREAK at position 4 (order 5)"));
    assert!(outcome.stderr.contains("last executed: PUSHS"));
    assert!(outcome.stderr.contains("executed instructions: 3"));
    assert!(outcome.stderr.contains("x=int@3"));
    assert!(outcome.stderr.contains("LF: undefined"));
    assert!(outcome.stderr.contains("TF: undefined"));
}

// ============================================================
// Determinism
// ============================================================

#[test]
fn same_program_same_output() {
    let ops = || {
        vec![
            (Opcode::DefVar, vec![var("GF@x")]),
            (Opcode::Read, vec![var("GF@x"), ty(DataType::Int)]),
            (Opcode::Mul, vec![var("GF@x"), var("GF@x"), int(3)]),
            (Opcode::Write, vec![var("GF@x")]),
            (Opcode::Exit, vec![int(3)]),
        ]
    };
    let first = run_ops_with_input(ops(), "14\n");
    let second = run_ops_with_input(ops(), "14\n");
    assert_eq!(first.result, second.result);
    assert_eq!(first.stdout, second.stdout);
    assert_eq!(first.stdout, "42");
}

mod properties {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Values pushed in sequence pop out reversed.
        #[test]
        fn pushs_pops_reverses(values in prop::collection::vec(any::<i64>(), 1..20)) {
            let mut ops = vec![(Opcode::DefVar, vec![var("GF@v")])];
            for &v in &values {
                ops.push((Opcode::Pushs, vec![int(v)]));
            }
            for _ in &values {
                ops.push((Opcode::Pops, vec![var("GF@v")]));
                ops.push((Opcode::Write, vec![var("GF@v")]));
                ops.push((Opcode::Write, vec![string(",")]));
            }
            let expected: String = values.iter().rev().map(|v| format!("{v},")).collect();
            prop_assert_eq!(run_ops(ops).stdout, expected);
        }

        /// WRITE of a string literal emits it unchanged.
        #[test]
        fn write_is_verbatim(text in "\\PC*") {
            let outcome = run_ops(vec![(Opcode::Write, vec![string(&text)])]);
            prop_assert_eq!(outcome.stdout, text);
        }

        /// STRLEN agrees with the character count.
        #[test]
        fn strlen_counts_chars(text in "\\PC{0,40}") {
            let outcome = binary_strlen(&text);
            prop_assert_eq!(outcome, text.chars().count().to_string());
        }
    }

    fn binary_strlen(text: &str) -> String {
        run_ops(vec![
            (Opcode::DefVar, vec![var("GF@n")]),
            (Opcode::Strlen, vec![var("GF@n"), string(text)]),
            (Opcode::Write, vec![var("GF@n")]),
        ])
        .stdout
    }
}
