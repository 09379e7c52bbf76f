use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::process::DEFAULT_SEARCH_DIRS;

/// Backend settings, fixed for the lifetime of an engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Executable name (searched for) or path (used as is).
    pub backend: String,
    /// Directories searched after `PATH`.
    pub search_dirs: Vec<PathBuf>,
    /// Merged over the inherited environment; per-call overrides win.
    pub environment: BTreeMap<String, String>,
    pub working_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: "container".to_string(),
            search_dirs: DEFAULT_SEARCH_DIRS.iter().map(PathBuf::from).collect(),
            environment: BTreeMap::new(),
            working_dir: None,
        }
    }
}
