//! seatvm CLI: run, trace and validate seat-array programs.
//!
//! Exit codes:
//! - 0: Success
//! - 1: Input/load error
//! - 2: Validation failure
//! - 3: Runtime error

use std::process;

use clap::{Parser, Subcommand};
use seatvm_cli::commands::{self, ChallengesArgs, RunArgs, TraceArgs, ValidateArgs, EXIT_INPUT};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "seatvm")]
#[command(about = "Run seat-array programs against challenges")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a program and report whether it solves the challenge
    Run(RunArgs),
    /// Print the machine state after every step as JSON lines
    Trace(TraceArgs),
    /// Run a program and print the validation result as JSON
    Validate(ValidateArgs),
    /// List the built-in challenges
    Challenges(ChallengesArgs),
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = if e.use_stderr() { EXIT_INPUT } else { 0 };
            let _ = e.print();
            process::exit(code);
        }
    };

    // Logs go to stderr; stdout carries command output only.
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_env("SEATVM_LOG")
                .or_else(|_| EnvFilter::try_from_default_env())
                .unwrap_or_else(|_| "seatvm=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let result = match &cli.command {
        Command::Run(args) => commands::run(args),
        Command::Trace(args) => commands::trace(args),
        Command::Validate(args) => commands::validate(args),
        Command::Challenges(args) => commands::challenges(args),
    };

    if let Err(code) = result {
        process::exit(code);
    }
}
