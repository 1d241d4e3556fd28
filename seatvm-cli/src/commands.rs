//! CLI command implementations.
//!
//! Each command returns `Err(code)` after printing its own diagnostic;
//! `main` turns the code into the process exit status.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use clap::Args;
use seatvm_common::{catalog, Challenge, Difficulty, Program};
use seatvm_vm::{
    execute_step, BoundaryPolicy, ErrorPolicy, ExecError, ExecutionState, RunOutcome, Session,
    Severity, StateView, StepOutcome, ValidationResult,
};
use serde::Serialize;
use tracing::{debug, warn};

use crate::ledger::Ledger;
use crate::sink::ProgressSink;

pub const EXIT_INPUT: i32 = 1;
pub const EXIT_VALIDATION: i32 = 2;
pub const EXIT_RUNTIME: i32 = 3;

/// Which challenge to play.
#[derive(Args, Debug, Clone)]
pub struct ChallengeArgs {
    /// Built-in challenge id (see `seatvm challenges`)
    #[arg(long, conflicts_with = "challenge_file")]
    pub challenge: Option<String>,

    /// Challenge definition JSON file
    #[arg(long, value_name = "FILE")]
    pub challenge_file: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Program JSON file
    pub program: PathBuf,

    #[command(flatten)]
    pub challenge: ChallengeArgs,

    /// Delay between steps (0 = run as fast as possible)
    #[arg(long, default_value = "0")]
    pub interval_ms: u64,

    /// Keep at most this many snapshots for rewind
    #[arg(long)]
    pub history_limit: Option<usize>,

    /// Progress ledger to update on success
    #[arg(long, value_name = "FILE")]
    pub progress: Option<PathBuf>,

    /// Give up after this many steps when running without a delay
    #[arg(long, default_value = "100000")]
    pub step_limit: u64,
}

#[derive(Args, Debug, Clone)]
pub struct ValidateArgs {
    /// Program JSON file
    pub program: PathBuf,

    #[command(flatten)]
    pub challenge: ChallengeArgs,

    /// Progress ledger to update on success
    #[arg(long, value_name = "FILE")]
    pub progress: Option<PathBuf>,

    /// Give up after this many steps
    #[arg(long, default_value = "100000")]
    pub step_limit: u64,
}

#[derive(Args, Debug, Clone)]
pub struct TraceArgs {
    /// Program JSON file
    pub program: PathBuf,

    #[command(flatten)]
    pub challenge: ChallengeArgs,

    /// Give up after this many steps
    #[arg(long, default_value = "10000")]
    pub step_limit: u64,
}

#[derive(Args, Debug, Clone)]
pub struct ChallengesArgs {
    /// Print the full definitions as JSON
    #[arg(long)]
    pub json: bool,

    /// Mark challenges completed in this progress ledger
    #[arg(long, value_name = "FILE")]
    pub progress: Option<PathBuf>,
}

/// Run a program against a challenge and print the verdict.
pub fn run(args: &RunArgs) -> Result<(), i32> {
    let mut session = load_session(&args.program, &args.challenge)?
        .with_sink(ProgressSink::new(args.progress.clone()));
    if let Some(limit) = args.history_limit {
        session = session.with_history_limit(limit);
    }

    let outcome = if args.interval_ms == 0 {
        run_immediate(&mut session, args.step_limit)
    } else {
        run_paced(&mut session, Duration::from_millis(args.interval_ms))?
    };

    let result = finished(&session, outcome)?;
    println!("{}", result.message);
    println!("steps: {}", result.step_count);
    println!("array: {:?}", session.state().array);
    if result.success {
        Ok(())
    } else {
        Err(EXIT_VALIDATION)
    }
}

/// Run a program to the end and print the validation result as JSON.
pub fn validate(args: &ValidateArgs) -> Result<(), i32> {
    let mut session = load_session(&args.program, &args.challenge)?
        .with_sink(ProgressSink::new(args.progress.clone()));
    let outcome = run_immediate(&mut session, args.step_limit);
    let result = finished(&session, outcome)?;
    print_json(&result)?;
    if result.success {
        Ok(())
    } else {
        Err(EXIT_VALIDATION)
    }
}

/// One line of `trace` output.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TraceLine<'a> {
    instruction: Option<&'static str>,
    #[serde(flatten)]
    state: StateView,
    completed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a ExecError>,
}

/// Step a program one instruction at a time, printing the state after
/// every step as a JSON line.
pub fn trace(args: &TraceArgs) -> Result<(), i32> {
    let program = load_program(&args.program)?;
    let challenge = load_challenge(&args.challenge)?;
    let mut state = ExecutionState::new(challenge.initial_array, Arc::new(program));

    for _ in 0..args.step_limit {
        let instruction = state.current_instruction().map(|i| i.name());
        let result = execute_step(&state);
        print_json(&TraceLine {
            instruction,
            state: result.state.view(),
            completed: result.completed,
            error: result.error.as_ref(),
        })?;

        if result.completed {
            return Ok(());
        }
        if let Some(error) = &result.error {
            return match BoundaryPolicy.severity(error) {
                Severity::Soft => Ok(()),
                Severity::Hard => {
                    eprintln!("runtime error: {error}");
                    Err(EXIT_RUNTIME)
                }
            };
        }
        state = result.state;
    }

    eprintln!("error: step limit of {} reached", args.step_limit);
    Err(EXIT_RUNTIME)
}

/// List the built-in challenges.
pub fn challenges(args: &ChallengesArgs) -> Result<(), i32> {
    let all = catalog::challenges();
    if args.json {
        return print_json(&all);
    }

    let ledger = match &args.progress {
        Some(path) => Ledger::load(path).map_err(|e| {
            eprintln!("error: {e}");
            EXIT_INPUT
        })?,
        None => Ledger::default(),
    };

    for challenge in &all {
        let budget = challenge
            .max_steps
            .map_or_else(|| "-".to_string(), |n| n.to_string());
        let mark = match ledger.get(&challenge.id).and_then(|e| e.best_step_count) {
            Some(best) => format!("  done ({best} steps)"),
            None if ledger.is_completed(&challenge.id) => "  done".to_string(),
            None if !challenge.unlocked => "  locked".to_string(),
            None => String::new(),
        };
        println!(
            "{:<13} {:<6} {:>5}  {}{mark}",
            challenge.id,
            difficulty_label(challenge.difficulty),
            budget,
            challenge.title
        );
    }
    Ok(())
}

// --- Helpers ---

fn run_immediate(session: &mut Session, step_limit: u64) -> RunOutcome {
    session.start();
    for _ in 0..step_limit {
        match session.tick() {
            Some(StepOutcome::Advanced) => {}
            Some(StepOutcome::Finished(result)) => return RunOutcome::Finished(result),
            Some(StepOutcome::Faulted(error)) => return RunOutcome::Faulted(error),
            Some(StepOutcome::Busy) | None => break,
        }
    }
    session.pause();
    RunOutcome::Paused
}

/// Step on a timer until the attempt ends or Ctrl-C pauses it.
fn run_paced(session: &mut Session, interval: Duration) -> Result<RunOutcome, i32> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| {
            eprintln!("error: cannot start runtime: {e}");
            EXIT_INPUT
        })?;

    let on_interrupt = session.pause_handle();
    Ok(runtime.block_on(async {
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                on_interrupt.cancel();
            }
        });
        session.run(interval).await
    }))
}

/// The validation result of a finished attempt, or the exit code for one
/// that faulted or never finished.
fn finished(session: &Session, outcome: RunOutcome) -> Result<ValidationResult, i32> {
    match outcome {
        RunOutcome::Finished(result) => Ok(result),
        RunOutcome::Faulted(error) => {
            eprintln!("runtime error: {error}");
            Err(EXIT_RUNTIME)
        }
        RunOutcome::Paused => {
            eprintln!(
                "error: stopped after {} steps without finishing",
                session.state().step_count
            );
            Err(EXIT_RUNTIME)
        }
    }
}

fn load_session(program: &Path, challenge: &ChallengeArgs) -> Result<Session, i32> {
    let program = load_program(program)?;
    let challenge = load_challenge(challenge)?;
    if !challenge.unlocked {
        warn!(challenge = %challenge.id, "challenge is locked");
    }
    debug!(
        challenge = %challenge.id,
        instructions = program.instruction_count(),
        "loaded"
    );
    Ok(Session::new(challenge, program))
}

fn load_program(path: &Path) -> Result<Program, i32> {
    let text = read_text(path)?;
    Program::from_json(&text).map_err(|e| {
        eprintln!("error: {e}");
        EXIT_INPUT
    })
}

fn load_challenge(args: &ChallengeArgs) -> Result<Challenge, i32> {
    let loaded = match (&args.challenge, &args.challenge_file) {
        (Some(id), _) => catalog::find(id),
        (None, Some(path)) => Challenge::from_json(&read_text(path)?),
        (None, None) => {
            eprintln!("error: a challenge is required (--challenge <ID> or --challenge-file <FILE>)");
            return Err(EXIT_INPUT);
        }
    };
    loaded.map_err(|e| {
        eprintln!("error: {e}");
        EXIT_INPUT
    })
}

fn read_text(path: &Path) -> Result<String, i32> {
    fs::read_to_string(path).map_err(|e| {
        eprintln!("error: cannot read '{}': {e}", path.display());
        EXIT_INPUT
    })
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), i32> {
    let json = serde_json::to_string(value).map_err(|e| {
        eprintln!("error: cannot encode output: {e}");
        EXIT_INPUT
    })?;
    println!("{json}");
    Ok(())
}

fn difficulty_label(difficulty: Difficulty) -> &'static str {
    match difficulty {
        Difficulty::Easy => "easy",
        Difficulty::Medium => "medium",
        Difficulty::Hard => "hard",
    }
}
