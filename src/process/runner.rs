use crate::error::Result;

use super::run::Executor;
use super::stream::LineStream;
use super::types::{CancelToken, ExecutionResult, Invocation};

/// Something that can execute backend invocations.
///
/// [`Executor`] spawns real processes; tests and embedders can supply their
/// own implementation to simulate a backend.
pub trait CommandRunner: Send + Sync {
    /// Run to completion. A non-zero exit is not an error.
    fn run(&self, inv: &Invocation, stdin: Option<&[u8]>) -> Result<ExecutionResult>;

    /// Start streaming. Only start failures are returned as `Err` here.
    /// Firing `cancel` must stop the child and end the stream quietly.
    fn stream(&self, inv: &Invocation, cancel: CancelToken) -> Result<LineStream>;
}

impl CommandRunner for Executor {
    fn run(&self, inv: &Invocation, stdin: Option<&[u8]>) -> Result<ExecutionResult> {
        Executor::run(self, inv, stdin)
    }

    fn stream(&self, inv: &Invocation, cancel: CancelToken) -> Result<LineStream> {
        self.stream_with_cancel(inv, cancel)
    }
}

#[cfg(test)]
pub(crate) mod scripted {
    //! An in-memory backend that records every invocation.

    use std::sync::Mutex;
    use std::time::Duration;

    use crate::error::{EngineError, Result};
    use crate::process::{CancelToken, ExecutionResult, Invocation, LineStream, OutputLine};

    use super::CommandRunner;

    /// What the simulated backend does for one argument vector.
    pub(crate) enum Reply {
        Exit {
            code: i32,
            stdout: String,
            stderr: String,
        },
        Stream(Vec<Result<OutputLine>>),
        StartFailure(EngineError),
    }

    impl Reply {
        pub(crate) fn ok(stdout: &str) -> Self {
            Reply::Exit {
                code: 0,
                stdout: stdout.into(),
                stderr: String::new(),
            }
        }

        pub(crate) fn fail(code: i32, stderr: &str) -> Self {
            Reply::Exit {
                code,
                stdout: String::new(),
                stderr: stderr.into(),
            }
        }

        pub(crate) fn unknown_command(verb: &str) -> Self {
            Self::fail(125, &format!("Error: unknown command \"{verb}\""))
        }
    }

    type Script = Box<dyn Fn(&[String]) -> Reply + Send + Sync>;

    pub(crate) struct ScriptedRunner {
        script: Script,
        calls: Mutex<Vec<Vec<String>>>,
    }

    impl ScriptedRunner {
        pub(crate) fn new(script: impl Fn(&[String]) -> Reply + Send + Sync + 'static) -> Self {
            Self {
                script: Box::new(script),
                calls: Mutex::new(Vec::new()),
            }
        }

        /// A backend that accepts everything with empty output.
        pub(crate) fn accepting() -> Self {
            Self::new(|_| Reply::ok(""))
        }

        pub(crate) fn calls(&self) -> Vec<Vec<String>> {
            self.calls.lock().map(|c| c.clone()).unwrap_or_default()
        }

        fn record(&self, inv: &Invocation) -> Reply {
            if let Ok(mut calls) = self.calls.lock() {
                calls.push(inv.args.clone());
            }
            (self.script)(&inv.args)
        }
    }

    impl CommandRunner for ScriptedRunner {
        fn run(&self, inv: &Invocation, _stdin: Option<&[u8]>) -> Result<ExecutionResult> {
            match self.record(inv) {
                Reply::Exit {
                    code,
                    stdout,
                    stderr,
                } => Ok(ExecutionResult {
                    command: "/usr/local/bin/container".into(),
                    arguments: inv.args.clone(),
                    stdout,
                    stderr,
                    exit_code: code,
                    duration: Duration::from_millis(5),
                }),
                Reply::Stream(_) => panic!("scripted stream reply used for a buffered run"),
                Reply::StartFailure(err) => Err(err),
            }
        }

        fn stream(&self, inv: &Invocation, cancel: CancelToken) -> Result<LineStream> {
            match self.record(inv) {
                Reply::Stream(items) => Ok(LineStream::from_results(items, cancel)),
                Reply::Exit {
                    code,
                    stdout,
                    stderr,
                } => {
                    let mut items: Vec<Result<OutputLine>> = stdout
                        .lines()
                        .map(OutputLine::stdout)
                        .map(Ok)
                        .chain(stderr.lines().map(OutputLine::stderr).map(Ok))
                        .collect();
                    if code != 0 {
                        items.push(Err(EngineError::CommandFailed {
                            command: "/usr/local/bin/container".into(),
                            args: inv.args.clone(),
                            exit_code: code,
                            stderr,
                        }));
                    }
                    Ok(LineStream::from_results(items, cancel))
                }
                Reply::StartFailure(err) => Err(err),
            }
        }
    }
}
