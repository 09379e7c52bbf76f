// Backend process execution: one-shot capture and cancellable line streaming.

pub mod lines;
pub mod resolve;
mod run;
mod runner;
mod stream;
mod types;

pub use resolve::{DEFAULT_SEARCH_DIRS, resolve_executable};
pub use run::Executor;
pub use runner::CommandRunner;
#[cfg(test)]
pub(crate) use runner::scripted;
pub use stream::{LineStream, collect_lines};
pub use types::{CancelToken, ExecutionResult, Invocation, OutputLine, OutputSource};
