use std::collections::VecDeque;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::error::{EngineError, Result};
use crate::process::{
    CancelToken, CommandRunner, ExecutionResult, Invocation, LineStream, OutputLine, OutputSource,
};

use super::candidates::CandidateList;
use super::classify::{CompatibilityClassifier, FallbackPolicy};

/// What a buffered run does with a non-zero exit that is not retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCheck {
    /// Surface it as [`EngineError::CommandFailed`].
    Enforce,
    /// Return the failing [`ExecutionResult`] as data.
    Report,
}

/// Run candidates in order until one exits zero.
///
/// Failures the policy deems retryable move on to the next candidate. Any
/// other failure stops immediately: start failures are returned as errors,
/// non-zero exits per `check`. When every candidate has been tried, the last
/// recorded failure is returned, or [`EngineError::NoCandidateSucceeded`]
/// for an empty list. Under [`ExitCheck::Report`] the last failing result is
/// returned as data instead.
pub fn run_candidates<R>(
    runner: &R,
    base: &Invocation,
    candidates: &CandidateList,
    policy: &FallbackPolicy,
    check: ExitCheck,
) -> Result<ExecutionResult>
where
    R: CommandRunner + ?Sized,
{
    let total = candidates.len();
    let mut last_error = None;
    let mut last_result = None;

    for (index, args) in candidates.iter().enumerate() {
        debug!(attempt = index + 1, total, args = ?args, "trying candidate");
        let inv = base.with_args(args.to_vec());

        let result = match runner.run(&inv, None) {
            Ok(result) => result,
            Err(err) if policy.should_try_next(&err) => {
                info!(args = ?args, error = %err, "candidate failed to start, trying next");
                last_error = Some(err);
                continue;
            }
            Err(err) => return Err(err),
        };

        if result.success() {
            return Ok(result);
        }

        let err = result.failure();
        if policy.should_try_next(&err) {
            info!(args = ?args, exit_code = result.exit_code, "candidate rejected, trying next");
            last_error = Some(err);
            last_result = Some(result);
            continue;
        }

        return match check {
            ExitCheck::Enforce => {
                warn!(args = ?args, exit_code = result.exit_code, "candidate failed");
                Err(err)
            }
            ExitCheck::Report => Ok(result),
        };
    }

    if check == ExitCheck::Report {
        if let Some(result) = last_result {
            return Ok(result);
        }
    }
    Err(last_error.unwrap_or(EngineError::NoCandidateSucceeded))
}

/// [`run_candidates`] for hand-written per-action lists: any failure moves
/// on and a non-zero exit is an error.
pub fn run_first_successful<R>(
    runner: &R,
    base: &Invocation,
    candidates: &CandidateList,
) -> Result<ExecutionResult>
where
    R: CommandRunner + ?Sized,
{
    run_candidates(
        runner,
        base,
        candidates,
        &FallbackPolicy::AnyFailure,
        ExitCheck::Enforce,
    )
}

/// Stream the first candidate that gets going.
///
/// Nothing starts until the first call to `next`.
pub fn stream_candidates<R>(
    runner: Arc<R>,
    base: Invocation,
    candidates: CandidateList,
    policy: FallbackPolicy,
) -> CandidateStream<R>
where
    R: CommandRunner + ?Sized,
{
    CandidateStream {
        runner,
        base,
        remaining: candidates.into_inner().into(),
        classifier: policy.classifier(),
        policy,
        cancel: CancelToken::new(),
        current: None,
        executed: None,
        ready: VecDeque::new(),
        pending_error: None,
        last_error: None,
        done: false,
    }
}

/// [`stream_candidates`] with [`FallbackPolicy::AnyFailure`].
pub fn stream_first_successful<R>(
    runner: Arc<R>,
    base: Invocation,
    candidates: CandidateList,
) -> CandidateStream<R>
where
    R: CommandRunner + ?Sized,
{
    stream_candidates(runner, base, candidates, FallbackPolicy::AnyFailure)
}

struct Attempt {
    args: Vec<String>,
    lines: LineStream,
    /// Diagnostics withheld while the candidate is on probation.
    held: Vec<OutputLine>,
    committed: bool,
}

enum Start {
    Started(Attempt),
    Retry,
    Fail(EngineError),
}

/// Live output of whichever candidate was accepted.
///
/// A candidate is on probation until it prints something other than a
/// compatibility diagnostic on stderr; such lines are held back meanwhile.
/// Failing on probation in a way the policy retries discards the held
/// lines and starts the next candidate. Anything else commits: held lines
/// are released and the stream is never retried, so a consumer never sees
/// output from two candidates.
pub struct CandidateStream<R: CommandRunner + ?Sized> {
    runner: Arc<R>,
    base: Invocation,
    remaining: VecDeque<Vec<String>>,
    policy: FallbackPolicy,
    classifier: CompatibilityClassifier,
    cancel: CancelToken,
    current: Option<Attempt>,
    executed: Option<Vec<String>>,
    ready: VecDeque<OutputLine>,
    pending_error: Option<EngineError>,
    last_error: Option<EngineError>,
    done: bool,
}

impl<R: CommandRunner + ?Sized> CandidateStream<R> {
    /// Stop the running candidate and end the stream quietly.
    pub fn cancel(&mut self) {
        self.cancel.cancel();
        self.current = None;
        self.ready.clear();
        self.done = true;
    }

    /// A handle that cancels this stream from another thread.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Arguments of the candidate whose output is being delivered, once one
    /// has been committed.
    pub fn executed(&self) -> Option<&[String]> {
        self.executed.as_deref()
    }

    fn start_next(&mut self) -> Start {
        let Some(args) = self.remaining.pop_front() else {
            return Start::Fail(
                self.last_error
                    .take()
                    .unwrap_or(EngineError::NoCandidateSucceeded),
            );
        };
        debug!(args = ?args, "streaming candidate");

        let inv = self.base.with_args(args.clone());
        match self.runner.stream(&inv, self.cancel.clone()) {
            Ok(lines) => Start::Started(Attempt {
                args,
                lines,
                held: Vec::new(),
                committed: false,
            }),
            Err(err) if self.policy.should_try_next(&err) => {
                info!(args = ?args, error = %err, "candidate failed to start, trying next");
                self.last_error = Some(err);
                Start::Retry
            }
            Err(err) => Start::Fail(err),
        }
    }

    fn commit(&mut self, attempt: &mut Attempt) {
        attempt.committed = true;
        self.executed = Some(attempt.args.clone());
        self.ready.extend(attempt.held.drain(..));
    }

    fn on_probation_hold(&self, line: &OutputLine) -> bool {
        line.source == OutputSource::Stderr && self.classifier.matches(&line.text)
    }
}

impl<R: CommandRunner + ?Sized> Iterator for CandidateStream<R> {
    type Item = Result<OutputLine>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.cancel.is_cancelled() {
                self.cancel();
                return None;
            }
            if let Some(line) = self.ready.pop_front() {
                return Some(Ok(line));
            }
            if let Some(err) = self.pending_error.take() {
                return Some(Err(err));
            }
            if self.done {
                return None;
            }

            let mut attempt = match self.current.take() {
                Some(attempt) => attempt,
                None => match self.start_next() {
                    Start::Started(attempt) => attempt,
                    Start::Retry => continue,
                    Start::Fail(err) => {
                        self.done = true;
                        return Some(Err(err));
                    }
                },
            };

            match attempt.lines.next() {
                Some(Ok(line)) if attempt.committed => {
                    self.current = Some(attempt);
                    return Some(Ok(line));
                }
                Some(Ok(line)) => {
                    if self.on_probation_hold(&line) {
                        attempt.held.push(line);
                    } else {
                        self.commit(&mut attempt);
                        self.ready.push_back(line);
                    }
                    self.current = Some(attempt);
                }
                Some(Err(err)) if !attempt.committed && self.policy.should_try_next(&err) => {
                    info!(args = ?attempt.args, error = %err, "candidate rejected, trying next");
                    self.last_error = Some(err);
                }
                Some(Err(err)) => {
                    if !attempt.committed {
                        warn!(args = ?attempt.args, error = %err, "candidate failed");
                        self.commit(&mut attempt);
                    }
                    self.pending_error = Some(err);
                    self.done = true;
                }
                None => {
                    if !attempt.committed {
                        self.commit(&mut attempt);
                    }
                    self.done = true;
                }
            }
        }
    }
}
