use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crate::error::EngineError;

/// Cooperative cancellation token backed by an `AtomicBool`.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Signal cancellation. Idempotent.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// One backend invocation: arguments plus optional working directory and
/// environment overrides merged over the inherited environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Invocation {
    pub args: Vec<String>,
    pub working_dir: Option<PathBuf>,
    pub env: BTreeMap<String, String>,
}

impl Invocation {
    pub fn new<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            args: args.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    pub fn working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Same directory and environment, different arguments.
    pub fn with_args(&self, args: Vec<String>) -> Self {
        Self {
            args,
            working_dir: self.working_dir.clone(),
            env: self.env.clone(),
        }
    }
}

/// Outcome of a completed, non-streaming run. A non-zero exit is data here,
/// not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    pub command: String,
    pub arguments: Vec<String>,
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
    pub duration: Duration,
}

impl ExecutionResult {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// The error describing this result's failure.
    pub fn failure(&self) -> EngineError {
        EngineError::CommandFailed {
            command: self.command.clone(),
            args: self.arguments.clone(),
            exit_code: self.exit_code,
            stderr: self.stderr.clone(),
        }
    }

    /// Turn a non-zero exit into [`EngineError::CommandFailed`].
    pub fn into_checked(self) -> Result<Self, EngineError> {
        if self.success() {
            Ok(self)
        } else {
            Err(self.failure())
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputSource {
    Stdout,
    Stderr,
}

impl OutputSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputSource::Stdout => "stdout",
            OutputSource::Stderr => "stderr",
        }
    }
}

/// A single line of streamed output, without its terminator.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OutputLine {
    pub source: OutputSource,
    pub text: String,
}

impl OutputLine {
    pub fn stdout(text: impl Into<String>) -> Self {
        Self {
            source: OutputSource::Stdout,
            text: text.into(),
        }
    }

    pub fn stderr(text: impl Into<String>) -> Self {
        Self {
            source: OutputSource::Stderr,
            text: text.into(),
        }
    }
}

/// Items flowing from a stream supervisor to its consumer.
#[derive(Debug)]
pub(crate) enum StreamEvent {
    Line(OutputLine),
    Failed(EngineError),
}
