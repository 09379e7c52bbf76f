use thiserror::Error;

pub type Result<T> = std::result::Result<T, EngineError>;

/// Everything that can go wrong between a caller and the backend CLI.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("Executable not found: {0}")]
    ExecutableNotFound(String),

    #[error("Failed to start process: {0}")]
    FailedToStart(String),

    /// The child ran and exited non-zero. `stderr` holds everything the
    /// child wrote to standard error, not just the last chunk.
    #[error("{}", describe_failure(.command, .args, *.exit_code, .stderr))]
    CommandFailed {
        command: String,
        args: Vec<String>,
        exit_code: i32,
        stderr: String,
    },

    #[error("Unterminated quoted string ({0}).")]
    UnterminatedQuote(char),

    #[error("Enter a Docker command.")]
    EmptyCommand,

    #[error("No candidate command succeeded.")]
    NoCandidateSucceeded,
}

impl EngineError {
    /// Captured stderr of a failed command, if this is one.
    pub fn stderr(&self) -> Option<&str> {
        match self {
            Self::CommandFailed { stderr, .. } => Some(stderr),
            _ => None,
        }
    }
}

fn describe_failure(command: &str, args: &[String], exit_code: i32, stderr: &str) -> String {
    let head = if args.is_empty() {
        format!("Command failed ({exit_code}): {command}")
    } else {
        format!(
            "Command failed ({exit_code}): {command} {}",
            shell_words::join(args)
        )
    };
    let tail = stderr.trim();
    if tail.is_empty() {
        head
    } else {
        format!("{head}\n\n{tail}")
    }
}
