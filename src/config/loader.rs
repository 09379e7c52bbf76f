use std::path::Path;

use anyhow::Context;

use super::types::Config;

pub const CONFIG_FILE: &str = ".containerdesk.yaml";
pub const BACKEND_ENV: &str = "CONTAINERDESK_BACKEND";

/// Load `.containerdesk.yaml` from `dir`, falling back to defaults when the
/// file does not exist, then apply `CONTAINERDESK_BACKEND`.
pub fn load(dir: &Path) -> anyhow::Result<Config> {
    let mut config = read_file(dir)?.unwrap_or_default();
    apply_backend_override(&mut config, std::env::var(BACKEND_ENV).ok().as_deref());
    Ok(config)
}

fn read_file(dir: &Path) -> anyhow::Result<Option<Config>> {
    let path = dir.join(CONFIG_FILE);
    if !path.exists() {
        return Ok(None);
    }
    let contents =
        std::fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))?;
    let config: Config = serde_yaml::from_str(&contents)
        .with_context(|| format!("parsing {}", path.display()))?;
    Ok(Some(config))
}

fn apply_backend_override(config: &mut Config, value: Option<&str>) {
    if let Some(backend) = value.map(str::trim).filter(|v| !v.is_empty()) {
        config.backend = backend.to_string();
    }
}
