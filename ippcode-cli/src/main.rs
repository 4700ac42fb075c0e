//! ippvm: load, check, format and run IPPcode23 programs.
//!
//! Exit codes:
//! - 0: Success, or the operand of an EXIT instruction (0-49)
//! - 10: Bad command line
//! - 11: Source or input file cannot be read
//! - 12: Output cannot be written
//! - 21, 22, 23: Header, opcode and syntax errors in the source
//! - 31: Source is not well-formed XML
//! - 32: Malformed XML program structure or instruction records
//! - 52-58: Semantic and runtime errors

mod commands;

use std::io;
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use ippcode_common::ErrorKind;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "ippvm", version)]
#[command(about = "Interpreter for the IPPcode23 three-address language")]
struct Cli {
    /// Log at debug level (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Execute a program. Whichever of --source/--input is omitted is read
    /// from standard input.
    Run {
        /// Program source file, XML or IPPcode23 text
        #[arg(long)]
        source: Option<PathBuf>,

        /// File feeding READ instructions
        #[arg(long)]
        input: Option<PathBuf>,
    },

    /// Load and verify a program without running it
    Check {
        /// Program source file (default: standard input)
        #[arg(long)]
        source: Option<PathBuf>,
    },

    /// Print the canonical form of a program
    Fmt {
        /// Program source file (default: standard input)
        #[arg(long)]
        source: Option<PathBuf>,
    },
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // --help and --version are reported through the same path.
            let code = if e.use_stderr() {
                ErrorKind::Args.code()
            } else {
                0
            };
            let _ = e.print();
            process::exit(code);
        }
    };

    init_logging(cli.verbose);

    let result = match cli.command {
        Command::Run { source, input } => commands::run(source.as_deref(), input.as_deref()),
        Command::Check { source } => commands::check(source.as_deref()),
        Command::Fmt { source } => commands::fmt(source.as_deref()),
    };

    let code = match result {
        Ok(code) | Err(code) => code,
    };
    process::exit(code);
}

/// Install the stderr log subscriber.
///
/// `RUST_LOG` wins when set; otherwise the level is `warn`, or `debug` with
/// `--verbose`. Logs never go to stdout, which belongs to WRITE.
fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}
