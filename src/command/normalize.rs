use crate::error::{EngineError, Result};

use super::tokenize;

/// Words that may prefix a pasted command line and are not part of the
/// arguments themselves.
const CLI_PREFIXES: [&str; 2] = ["docker", "container"];

/// Turn a free-text command line into backend arguments.
///
/// A leading `docker` or `container` word is dropped so that commands can be
/// pasted straight from documentation.
pub fn normalized_arguments(input: &str) -> Result<Vec<String>> {
    strip_cli_prefix(tokenize(input)?)
}

/// Drop a leading `docker` or `container` word from arguments that are
/// already split, such as a process's own argv.
pub fn strip_cli_prefix(mut args: Vec<String>) -> Result<Vec<String>> {
    let Some(head) = args.first() else {
        return Err(EngineError::EmptyCommand);
    };

    if CLI_PREFIXES.iter().any(|p| head.eq_ignore_ascii_case(p)) {
        args.remove(0);
        if args.is_empty() {
            return Err(EngineError::EmptyCommand);
        }
    }

    Ok(args)
}
