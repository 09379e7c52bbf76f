use serde::Serialize;
use serde_json::Value;

use crate::output::{FieldLookup, decode_object};

const RUNNING_KEYS: &[&str] = &["running", "isrunning", "active", "started"];
const MESSAGE_KEYS: &[&str] = &["message", "status", "state"];

/// Whether the backend's system services are up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SystemStatusRecord {
    pub running: bool,
    pub message: String,
}

impl SystemStatusRecord {
    pub fn unknown() -> Self {
        Self {
            running: false,
            message: "Unknown".into(),
        }
    }

    /// Interpret `system status` output, JSON or plain text.
    pub fn from_output(stdout: &str) -> Self {
        if let Some(obj) = decode_object(stdout) {
            let running = obj.first_bool(RUNNING_KEYS).unwrap_or(false);
            let message = obj
                .first_string(MESSAGE_KEYS)
                .unwrap_or_else(|| running_word(running).into());
            return Self { running, message };
        }

        let lower = stdout.to_lowercase();
        let running = (lower.contains("running") || lower.contains("started"))
            && !lower.contains("not running")
            && !lower.contains("stopped");
        Self {
            running,
            message: text_message(stdout, running),
        }
    }
}

/// Whether the image builder is up, with the backend's raw answer when it
/// was JSON.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuilderStatusRecord {
    pub running: bool,
    pub message: String,
    pub raw: Option<Value>,
}

impl BuilderStatusRecord {
    pub fn from_output(stdout: &str) -> Self {
        if let Some(obj) = decode_object(stdout) {
            let running = obj.first_bool(RUNNING_KEYS).unwrap_or(false);
            let message = obj
                .first_string(MESSAGE_KEYS)
                .unwrap_or_else(|| running_word(running).into());
            return Self {
                running,
                message,
                raw: Some(Value::Object(obj)),
            };
        }

        let lower = stdout.to_lowercase();
        let running = lower.contains("running") && !lower.contains("stopped");
        Self {
            running,
            message: text_message(stdout, running),
            raw: None,
        }
    }
}

fn running_word(running: bool) -> &'static str {
    if running { "Running" } else { "Stopped" }
}

fn text_message(stdout: &str, running: bool) -> String {
    let trimmed = stdout.trim();
    if trimmed.is_empty() {
        running_word(running).to_string()
    } else {
        trimmed.to_string()
    }
}
