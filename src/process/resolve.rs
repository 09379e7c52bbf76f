use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use crate::error::{EngineError, Result};

/// Conventional install locations searched after `PATH`. GUI launchers often
/// start with a minimal `PATH`, so Homebrew and friends are listed here too.
pub const DEFAULT_SEARCH_DIRS: [&str; 6] = [
    "/usr/bin",
    "/bin",
    "/usr/sbin",
    "/sbin",
    "/usr/local/bin",
    "/opt/homebrew/bin",
];

/// Locate the backend executable.
///
/// A program containing a path separator is checked as-is. A bare name is
/// searched in each `PATH` entry in order, then in `fallback_dirs`.
pub fn resolve_executable(
    program: &str,
    search_path: Option<&OsStr>,
    fallback_dirs: &[PathBuf],
) -> Result<PathBuf> {
    if program.is_empty() {
        return Err(EngineError::ExecutableNotFound(program.to_string()));
    }

    if program.contains('/') || program.contains(std::path::MAIN_SEPARATOR) {
        let path = Path::new(program);
        return if is_executable(path) {
            Ok(path.to_path_buf())
        } else {
            Err(EngineError::ExecutableNotFound(program.to_string()))
        };
    }

    let path_dirs = search_path
        .map(|p| std::env::split_paths(p).collect::<Vec<_>>())
        .unwrap_or_default();

    path_dirs
        .iter()
        .chain(fallback_dirs.iter())
        .filter(|dir| !dir.as_os_str().is_empty())
        .map(|dir| dir.join(program))
        .find(|candidate| is_executable(candidate))
        .ok_or_else(|| EngineError::ExecutableNotFound(program.to_string()))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    match std::fs::metadata(path) {
        Ok(meta) => meta.is_file() && meta.permissions().mode() & 0o111 != 0,
        Err(_) => false,
    }
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
