//! CLI command implementations.
//!
//! Each command returns `Ok(exit_code)` or `Err(exit_code)` after printing
//! its diagnostics to stderr.

use std::fmt::Display;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

use ippcode_common::{ErrorKind, Program};
use ippcode_vm::Io;
use tracing::{debug, info};

/// Load and execute a program.
pub fn run(source: Option<&Path>, input: Option<&Path>) -> Result<i32, i32> {
    if source.is_none() && input.is_none() {
        return Err(fail(
            "at least one of --source and --input is required",
            ErrorKind::Args,
        ));
    }

    let program = load(source)?;

    let streams = match input {
        Some(path) => {
            let file = File::open(path).map_err(|e| {
                fail(
                    format!("cannot read '{}': {e}", path.display()),
                    ErrorKind::InputFile,
                )
            })?;
            Io::new(
                BufReader::new(file),
                BufWriter::new(io::stdout().lock()),
                io::stderr(),
            )
        }
        None => Io::stdio(),
    };

    match ippcode_vm::run(&program, streams) {
        Ok(code) => {
            info!(code, "program finished");
            Ok(code)
        }
        Err(e) => Err(fail(&e, e.kind())),
    }
}

/// Load and verify a program, reporting every verifier error.
pub fn check(source: Option<&Path>) -> Result<i32, i32> {
    let program = load(source)?;

    match ippcode_verifier::verify(&program) {
        Ok(()) => {
            println!("OK: {} instructions", program.len());
            Ok(0)
        }
        Err(errors) => {
            for e in &errors {
                eprintln!("error: {e}");
            }
            let first = errors.first().map(|e| e.kind()).unwrap_or(ErrorKind::XmlStruct);
            Err(first.code())
        }
    }
}

/// Print the canonical disassembly of a program.
pub fn fmt(source: Option<&Path>) -> Result<i32, i32> {
    let program = load(source)?;
    let text = ippcode_assembler::disassemble(&program);
    let mut stdout = io::stdout().lock();
    stdout
        .write_all(text.as_bytes())
        .and_then(|()| stdout.flush())
        .map_err(|e| fail(format!("cannot write output: {e}"), ErrorKind::OutputFile))?;
    Ok(0)
}

/// Read and load the source, from `path` or standard input.
///
/// A source whose first non-blank character is `<` is an XML program
/// document; anything else is IPPcode23 source text.
fn load(path: Option<&Path>) -> Result<Program, i32> {
    let text = match path {
        Some(path) => fs::read_to_string(path).map_err(|e| {
            fail(
                format!("cannot read '{}': {e}", path.display()),
                ErrorKind::InputFile,
            )
        })?,
        None => {
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .map_err(|e| fail(format!("cannot read stdin: {e}"), ErrorKind::InputFile))?;
            text
        }
    };

    let program = if ippcode_xml::looks_like_xml(&text) {
        ippcode_xml::load(&text).map_err(|e| fail(&e, e.kind()))?
    } else {
        ippcode_assembler::assemble(&text).map_err(|e| fail(&e, e.kind()))?
    };
    debug!(instructions = program.len(), "source loaded");
    Ok(program)
}

/// Report `message` and return the exit code for `kind`.
fn fail(message: impl Display, kind: ErrorKind) -> i32 {
    eprintln!("error: {message}");
    kind.code()
}
