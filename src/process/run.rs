use std::collections::BTreeMap;
use std::ffi::OsString;
use std::io::{ErrorKind, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, SyncSender, TrySendError};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{EngineError, Result};

use super::lines::{LineBuffer, decode_utf8};
use super::resolve::resolve_executable;
use super::stream::LineStream;
use super::types::{
    CancelToken, ExecutionResult, Invocation, OutputLine, OutputSource, StreamEvent,
};

const POLL_INTERVAL: Duration = Duration::from_millis(50);
const TERMINATE_GRACE: Duration = Duration::from_secs(2);
const READ_CHUNK: usize = 8 * 1024;
/// Lines buffered between the readers and a slow consumer before the
/// readers stop draining the pipes.
const STREAM_CAPACITY: usize = 1024;

/// Runs the configured backend executable.
///
/// The program, search directories and default environment are fixed at
/// construction; every call gets its own child process and buffers.
#[derive(Debug, Clone)]
pub struct Executor {
    program: String,
    search_dirs: Vec<PathBuf>,
    default_env: BTreeMap<String, String>,
    default_dir: Option<PathBuf>,
}

impl Executor {
    pub fn new(program: impl Into<String>) -> Self {
        Self::from_config(&Config {
            backend: program.into(),
            ..Config::default()
        })
    }

    pub fn from_config(cfg: &Config) -> Self {
        Self {
            program: cfg.backend.clone(),
            search_dirs: cfg.search_dirs.clone(),
            default_env: cfg.environment.clone(),
            default_dir: cfg.working_dir.clone(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn resolve(&self) -> Result<PathBuf> {
        let search_path: Option<OsString> = std::env::var_os("PATH");
        resolve_executable(&self.program, search_path.as_deref(), &self.search_dirs)
    }

    /// Run to completion and capture both channels.
    ///
    /// Fails only when the executable cannot be found or started; a non-zero
    /// exit is reported through [`ExecutionResult::exit_code`].
    pub fn run(&self, inv: &Invocation, stdin: Option<&[u8]>) -> Result<ExecutionResult> {
        let program = self.resolve()?;
        let start = Instant::now();
        debug!(program = %program.display(), args = ?inv.args, "running backend");

        let mut cmd = self.command(&program, inv);
        cmd.stdin(if stdin.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        })
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

        let mut child = cmd.spawn().map_err(|e| start_error(&program, e))?;

        // Feed stdin from its own thread so a chatty child cannot deadlock
        // against us while we wait for its output.
        let feeder = match (stdin, child.stdin.take()) {
            (Some(bytes), Some(mut pipe)) => {
                let bytes = bytes.to_vec();
                Some(std::thread::spawn(move || {
                    let _ = pipe.write_all(&bytes);
                }))
            }
            _ => None,
        };

        let output = child
            .wait_with_output()
            .map_err(|e| EngineError::FailedToStart(e.to_string()))?;
        if let Some(handle) = feeder {
            let _ = handle.join();
        }

        Ok(ExecutionResult {
            command: program.display().to_string(),
            arguments: inv.args.clone(),
            stdout: decode_utf8(&output.stdout),
            stderr: decode_utf8(&output.stderr),
            exit_code: exit_code(output.status),
            duration: start.elapsed(),
        })
    }

    /// Start the child and stream its output line by line.
    ///
    /// Start failures are returned immediately; a later non-zero exit ends
    /// the stream with [`EngineError::CommandFailed`].
    pub fn stream(&self, inv: &Invocation) -> Result<LineStream> {
        self.stream_with_cancel(inv, CancelToken::new())
    }

    /// Like [`Executor::stream`], but the child is terminated as soon as
    /// `cancel` fires, whoever holds it.
    pub fn stream_with_cancel(&self, inv: &Invocation, cancel: CancelToken) -> Result<LineStream> {
        let program = self.resolve()?;
        debug!(program = %program.display(), args = ?inv.args, "streaming backend");

        let mut child = self
            .command(&program, inv)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| start_error(&program, e))?;

        let (Some(stdout), Some(stderr)) = (child.stdout.take(), child.stderr.take()) else {
            terminate(&mut child);
            return Err(EngineError::FailedToStart(
                "child output was not captured".into(),
            ));
        };

        let (tx, rx) = mpsc::sync_channel(STREAM_CAPACITY);
        let supervisor = Supervisor {
            command: program.display().to_string(),
            args: inv.args.clone(),
            cancel: cancel.clone(),
        };

        let out_reader = spawn_reader(stdout, OutputSource::Stdout, tx.clone(), cancel.clone());
        let err_reader = spawn_reader(stderr, OutputSource::Stderr, tx.clone(), cancel.clone());
        std::thread::spawn(move || supervisor.watch(child, out_reader, err_reader, tx));

        Ok(LineStream::new(rx, cancel))
    }

    fn command(&self, program: &Path, inv: &Invocation) -> Command {
        let mut cmd = Command::new(program);
        cmd.args(&inv.args)
            .envs(&self.default_env)
            .envs(&inv.env);
        if let Some(dir) = inv.working_dir.as_ref().or(self.default_dir.as_ref()) {
            cmd.current_dir(dir);
        }
        cmd
    }
}

/// Owns the child for the lifetime of a stream.
struct Supervisor {
    command: String,
    args: Vec<String>,
    cancel: CancelToken,
}

impl Supervisor {
    fn watch(
        self,
        mut child: Child,
        out_reader: JoinHandle<Vec<u8>>,
        err_reader: JoinHandle<Vec<u8>>,
        tx: SyncSender<StreamEvent>,
    ) {
        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break Some(status),
                Ok(None) => {}
                Err(e) => {
                    warn!(command = %self.command, error = %e, "lost track of child");
                    break None;
                }
            }

            if self.cancel.is_cancelled() {
                debug!(command = %self.command, args = ?self.args, "stream cancelled");
                terminate(&mut child);
                // Readers see EOF once the child is gone and exit on their own.
                return;
            }

            std::thread::sleep(POLL_INTERVAL);
        };

        let _ = out_reader.join();
        let stderr = err_reader.join().map(|b| decode_utf8(&b)).unwrap_or_default();

        if self.cancel.is_cancelled() {
            return;
        }

        let exit_code = status.map(exit_code).unwrap_or(-1);
        if exit_code != 0 {
            // Receiver may already be gone.
            let _ = tx.send(StreamEvent::Failed(EngineError::CommandFailed {
                command: self.command,
                args: self.args,
                exit_code,
                stderr,
            }));
        }
    }
}

/// Read one channel in raw chunks, emitting a line per terminator.
///
/// Returns every byte read, so the supervisor can report the complete
/// stderr of a failed run. After a cancel the reader keeps draining the
/// pipe but stops delivering, so it never waits on a consumer that has
/// stopped polling.
fn spawn_reader<R>(
    mut pipe: R,
    source: OutputSource,
    tx: SyncSender<StreamEvent>,
    cancel: CancelToken,
) -> JoinHandle<Vec<u8>>
where
    R: Read + Send + 'static,
{
    std::thread::spawn(move || {
        let mut lines = LineBuffer::default();
        let mut seen = Vec::new();
        let mut chunk = [0u8; READ_CHUNK];
        let mut consumer_gone = false;

        let emit = |text: String, consumer_gone: &mut bool| {
            if !*consumer_gone
                && !deliver(&tx, StreamEvent::Line(OutputLine { source, text }), &cancel)
            {
                *consumer_gone = true;
            }
        };

        loop {
            let n = match pipe.read(&mut chunk) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(_) => break,
            };
            if source == OutputSource::Stderr {
                seen.extend_from_slice(&chunk[..n]);
            }
            for line in lines.push(&chunk[..n]) {
                emit(line, &mut consumer_gone);
            }
        }

        if let Some(tail) = lines.finish() {
            emit(tail, &mut consumer_gone);
        }
        seen
    })
}

/// Send one event, waiting while the channel is full.
///
/// Returns `false` once the receiver is gone or `cancel` has fired.
fn deliver(tx: &SyncSender<StreamEvent>, event: StreamEvent, cancel: &CancelToken) -> bool {
    let mut event = event;
    loop {
        if cancel.is_cancelled() {
            return false;
        }
        match tx.try_send(event) {
            Ok(()) => return true,
            Err(TrySendError::Disconnected(_)) => return false,
            Err(TrySendError::Full(back)) => {
                event = back;
                std::thread::sleep(POLL_INTERVAL);
            }
        }
    }
}

fn start_error(program: &Path, err: std::io::Error) -> EngineError {
    if err.kind() == ErrorKind::NotFound {
        EngineError::ExecutableNotFound(program.display().to_string())
    } else {
        EngineError::FailedToStart(format!("{}: {err}", program.display()))
    }
}

/// Ask the child to exit, then kill it if it lingers.
fn terminate(child: &mut Child) {
    #[cfg(unix)]
    {
        if let Ok(pid) = libc::pid_t::try_from(child.id()) {
            // SAFETY: kill(2) with a pid we spawned and still own; at worst it fails with ESRCH.
            unsafe {
                libc::kill(pid, libc::SIGTERM);
            }
            let deadline = Instant::now() + TERMINATE_GRACE;
            while Instant::now() < deadline {
                if let Ok(Some(_)) = child.try_wait() {
                    return;
                }
                std::thread::sleep(POLL_INTERVAL);
            }
        }
    }

    let _ = child.kill();
    let _ = child.wait();
}

#[cfg(unix)]
fn exit_code(status: ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;
    match (status.code(), status.signal()) {
        (Some(code), _) => code,
        (None, Some(signal)) => 128 + signal,
        (None, None) => -1,
    }
}

#[cfg(not(unix))]
fn exit_code(status: ExitStatus) -> i32 {
    status.code().unwrap_or(-1)
}
