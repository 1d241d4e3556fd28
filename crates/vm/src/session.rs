//! Run controller: drives the interpreter for one challenge attempt.
//!
//! A [`Session`] owns the live [`ExecutionState`] and decides what a step
//! result means for the attempt: keep going, validate, or stop on a fault.
//! It holds no interpreter invariants of its own; those live in
//! [`execute_step`].

use std::sync::Arc;
use std::time::Duration;

use seatvm_common::{Challenge, Program};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::{BoundaryPolicy, ErrorPolicy, ExecError, Severity};
use crate::execute::execute_step;
use crate::history;
use crate::state::ExecutionState;
use crate::validator::{validate, ValidationResult};

/// Where the attempt stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Freshly initialised; nothing has run.
    Ready,
    Running,
    Paused,
    /// Completed or stopped by a soft error; the array has been validated.
    Finished,
    /// Stopped by a hard error.
    Faulted,
}

/// How the player drove the attempt since the last reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    Step,
    Run,
    Mixed,
}

/// Reported once per successful validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionEvent {
    pub challenge_id: String,
    pub step_count: u64,
    pub instruction_count: usize,
    pub execution_mode: ExecutionMode,
}

pub type SinkError = Box<dyn std::error::Error + Send + Sync>;

/// Receives completion events. Failures are logged and otherwise ignored.
pub trait CompletionSink: Send + Sync {
    fn record(&self, event: &CompletionEvent) -> Result<(), SinkError>;
}

/// Result of a single [`Session::step`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// The step succeeded and there is more to run.
    Advanced,
    /// The attempt ended and was validated.
    Finished(ValidationResult),
    /// A hard error stopped the attempt.
    Faulted(ExecError),
    /// A run is active; the step was refused.
    Busy,
}

/// Why [`Session::run`] returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Paused,
    Finished(ValidationResult),
    Faulted(ExecError),
}

pub struct Session {
    challenge: Challenge,
    program: Arc<Program>,
    state: ExecutionState,
    policy: Box<dyn ErrorPolicy + Send + Sync>,
    sink: Option<Box<dyn CompletionSink>>,
    history_limit: Option<usize>,
    status: Status,
    last_error: Option<ExecError>,
    validation: Option<ValidationResult>,
    pause: CancellationToken,
    stepped: bool,
    ran: bool,
}

impl Session {
    pub fn new(challenge: Challenge, program: Program) -> Self {
        let program = Arc::new(program);
        let state = ExecutionState::new(challenge.initial_array.clone(), program.clone());
        Self {
            challenge,
            program,
            state,
            policy: Box::new(BoundaryPolicy),
            sink: None,
            history_limit: None,
            status: Status::Ready,
            last_error: None,
            validation: None,
            pause: CancellationToken::new(),
            stepped: false,
            ran: false,
        }
    }

    /// Replace the soft/hard error classification.
    pub fn with_policy(mut self, policy: impl ErrorPolicy + Send + Sync + 'static) -> Self {
        self.policy = Box::new(policy);
        self
    }

    /// Keep at most `limit` snapshots for rewind. Reinitialises the state.
    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = Some(limit);
        self.reset();
        self
    }

    pub fn with_sink(mut self, sink: impl CompletionSink + 'static) -> Self {
        self.sink = Some(Box::new(sink));
        self
    }

    pub fn challenge(&self) -> &Challenge {
        &self.challenge
    }

    pub fn program(&self) -> &Arc<Program> {
        &self.program
    }

    pub fn state(&self) -> &ExecutionState {
        &self.state
    }

    pub fn status(&self) -> Status {
        self.status
    }

    /// The hard error that stopped the attempt, if any.
    pub fn last_error(&self) -> Option<&ExecError> {
        self.last_error.as_ref()
    }

    pub fn validation(&self) -> Option<&ValidationResult> {
        self.validation.as_ref()
    }

    pub fn execution_mode(&self) -> Option<ExecutionMode> {
        match (self.stepped, self.ran) {
            (false, false) => None,
            (true, false) => Some(ExecutionMode::Step),
            (false, true) => Some(ExecutionMode::Run),
            (true, true) => Some(ExecutionMode::Mixed),
        }
    }

    /// Execute one step on behalf of the player.
    ///
    /// Refused while a run is active. Once the attempt has finished or
    /// faulted, returns the stored outcome without stepping.
    pub fn step(&mut self) -> StepOutcome {
        if self.status == Status::Running {
            return StepOutcome::Busy;
        }
        if let Some(outcome) = self.settled() {
            return outcome;
        }
        self.stepped = true;
        self.advance()
    }

    /// Enter the running state. Pair with [`Session::tick`] when the host
    /// owns the timer. Has no effect on a finished or faulted attempt.
    pub fn start(&mut self) {
        if self.settled().is_some() {
            return;
        }
        self.ran = true;
        self.status = Status::Running;
        info!(challenge = %self.challenge.id, "run started");
    }

    /// One timer tick: a step while running, `None` otherwise.
    pub fn tick(&mut self) -> Option<StepOutcome> {
        if self.status != Status::Running {
            return None;
        }
        Some(self.advance())
    }

    /// Stop the active run. Handles taken so far are cancelled and later
    /// ones belong to the next run.
    pub fn pause(&mut self) {
        self.pause.cancel();
        self.pause = CancellationToken::new();
        if self.status == Status::Running {
            self.status = Status::Paused;
            info!(steps = self.state.step_count, "run paused");
        }
    }

    /// A token that pauses the run when cancelled. Take it before calling
    /// [`Session::run`], which borrows the session for its whole duration.
    pub fn pause_handle(&self) -> CancellationToken {
        self.pause.clone()
    }

    /// Step every `interval` until the attempt ends or the pause handle
    /// fires.
    ///
    /// The pause handle is checked once per tick, before the step, so a
    /// pause never interrupts a step half way.
    pub async fn run(&mut self, interval: Duration) -> RunOutcome {
        self.start();
        match self.settled() {
            Some(StepOutcome::Finished(result)) => return RunOutcome::Finished(result),
            Some(StepOutcome::Faulted(error)) => return RunOutcome::Faulted(error),
            _ => {}
        }
        let cancel = self.pause.clone();
        let mut ticker = tokio::time::interval(interval.max(Duration::from_millis(1)));
        // The first tick completes immediately; the first step waits one period.
        ticker.tick().await;

        loop {
            ticker.tick().await;
            if cancel.is_cancelled() {
                self.pause();
                return RunOutcome::Paused;
            }
            match self.tick() {
                Some(StepOutcome::Advanced) => {}
                Some(StepOutcome::Finished(result)) => return RunOutcome::Finished(result),
                Some(StepOutcome::Faulted(error)) => return RunOutcome::Faulted(error),
                Some(StepOutcome::Busy) | None => return RunOutcome::Paused,
            }
        }
    }

    /// Step back once. Returns `false` when there is nothing to rewind.
    pub fn rewind(&mut self) -> bool {
        match history::rewind(&self.state) {
            Some(previous) => {
                self.state = previous;
                self.last_error = None;
                self.validation = None;
                if self.status != Status::Ready {
                    self.status = Status::Paused;
                }
                debug!(steps = self.state.step_count, "rewound");
                true
            }
            None => false,
        }
    }

    /// Start the attempt over from the challenge's initial array.
    pub fn reset(&mut self) {
        let state =
            ExecutionState::new(self.challenge.initial_array.clone(), self.program.clone());
        self.state = match self.history_limit {
            Some(limit) => state.with_history_limit(limit),
            None => state,
        };
        self.status = Status::Ready;
        self.last_error = None;
        self.validation = None;
        if self.pause.is_cancelled() {
            self.pause = CancellationToken::new();
        }
        self.stepped = false;
        self.ran = false;
    }

    /// Validate the live state against the challenge.
    pub fn validate(&self) -> ValidationResult {
        validate(&self.challenge, &self.state)
    }

    /// The stored outcome of an attempt that has already ended.
    fn settled(&self) -> Option<StepOutcome> {
        match self.status {
            Status::Finished => self.validation.clone().map(StepOutcome::Finished),
            Status::Faulted => self.last_error.clone().map(StepOutcome::Faulted),
            _ => None,
        }
    }

    fn advance(&mut self) -> StepOutcome {
        let result = execute_step(&self.state);
        self.state = result.state;

        if result.completed
            || (result.success && self.state.current_line() >= self.program.len())
        {
            return self.finish();
        }

        let Some(error) = result.error else {
            self.last_error = None;
            if self.status != Status::Running {
                self.status = Status::Paused;
            }
            return StepOutcome::Advanced;
        };

        match self.policy.severity(&error) {
            Severity::Soft => {
                debug!(%error, "soft stop");
                self.finish()
            }
            Severity::Hard => {
                info!(%error, "attempt faulted");
                self.status = Status::Faulted;
                self.last_error = Some(error.clone());
                StepOutcome::Faulted(error)
            }
        }
    }

    fn finish(&mut self) -> StepOutcome {
        self.status = Status::Finished;
        let result = self.validate();
        info!(
            success = result.success,
            optimized = result.optimized,
            steps = result.step_count,
            "attempt finished"
        );
        if result.success {
            self.report_completion(result.step_count);
        }
        self.validation = Some(result.clone());
        StepOutcome::Finished(result)
    }

    fn report_completion(&self, step_count: u64) {
        let Some(sink) = &self.sink else {
            return;
        };
        let event = CompletionEvent {
            challenge_id: self.challenge.id.clone(),
            step_count,
            instruction_count: self.program.instruction_count(),
            execution_mode: self.execution_mode().unwrap_or(ExecutionMode::Step),
        };
        if let Err(error) = sink.record(&event) {
            warn!(%error, "completion sink failed");
        }
    }
}
