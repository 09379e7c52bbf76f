use std::fmt;

use serde::Serialize;

use crate::output::{FieldLookup, RawRecord};

const ID_KEYS: &[&str] = &["id", "containerid", "container_id", "uuid"];
const NAME_KEYS: &[&str] = &["name", "names", "container", "containername"];
const IMAGE_KEYS: &[&str] = &["image", "image_ref", "imageref", "imageid"];
const STATUS_KEYS: &[&str] = &["status", "state", "runningstate", "health"];
const STATE_KEYS: &[&str] = &["state"];
const CREATED_KEYS: &[&str] = &[
    "createdat",
    "created_at",
    "created",
    "age",
    "createdsince",
    "runningfor",
];
const PORTS_KEYS: &[&str] = &["ports", "publishedports", "publish", "published"];
const IP_KEYS: &[&str] = &["ip", "ipaddress", "ip_address", "address"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerState {
    Running,
    Stopped,
    Unknown,
}

impl ContainerState {
    /// Classify free-form status text from any backend.
    pub fn classify(status: &str) -> Self {
        let lowered = status.trim().to_lowercase();
        if lowered.contains("running") || lowered == "run" || lowered == "up" {
            Self::Running
        } else if lowered.contains("stopped")
            || lowered.contains("exited")
            || lowered == "stop"
            || lowered == "down"
        {
            Self::Stopped
        } else {
            Self::Unknown
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Stopped => "stopped",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ContainerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A container as listed by the backend.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContainerRecord {
    pub id: String,
    pub name: String,
    pub image: String,
    pub status: String,
    pub state: ContainerState,
    pub created_at: Option<String>,
    pub ports: Option<String>,
    pub ip_address: Option<String>,
    /// Everything the backend reported, including fields not modeled above.
    pub raw: RawRecord,
}

impl ContainerRecord {
    /// Map an arbitrary backend object, degrading gracefully when fields are
    /// missing or renamed. A missing identifier gets a fresh UUID.
    pub fn from_raw(raw: RawRecord) -> Self {
        let id = raw
            .first_string(ID_KEYS)
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        let name = raw
            .first_string(NAME_KEYS)
            .unwrap_or_else(|| id.chars().take(12).collect());
        let image = raw
            .first_string(IMAGE_KEYS)
            .unwrap_or_else(|| "(unknown)".to_string());
        let status = raw.first_string(STATUS_KEYS).unwrap_or_default();

        let state_text = if status.is_empty() {
            raw.first_string(STATE_KEYS).unwrap_or_default()
        } else {
            status.clone()
        };
        let state = ContainerState::classify(&state_text);
        let status = if status.is_empty() {
            state_text.to_lowercase()
        } else {
            status
        };

        Self {
            created_at: raw.first_string(CREATED_KEYS),
            ports: raw.first_string(PORTS_KEYS),
            ip_address: raw.first_string(IP_KEYS),
            id,
            name,
            image,
            status,
            state,
            raw,
        }
    }

    pub fn is_running(&self) -> bool {
        self.state == ContainerState::Running
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};

    use super::*;

    fn raw(v: Value) -> RawRecord {
        match v {
            Value::Object(m) => m,
            _ => unreachable!(),
        }
    }

    #[test]
    fn maps_docker_style_fields() {
        let c = ContainerRecord::from_raw(raw(json!({
            "ID": "abc123",
            "Name": "web",
            "Image": "nginx:latest",
            "Status": "Running",
            "Ports": "127.0.0.1:8080->80/tcp"
        })));
        assert_eq!(c.id, "abc123");
        assert_eq!(c.name, "web");
        assert_eq!(c.image, "nginx:latest");
        assert_eq!(c.state, ContainerState::Running);
        assert_eq!(c.ports.as_deref(), Some("127.0.0.1:8080->80/tcp"));
        assert!(c.is_running());
    }

    #[test]
    fn maps_alternate_synonyms() {
        let c = ContainerRecord::from_raw(raw(json!({
            "container_id": "f00",
            "Names": ["db"],
            "ImageRef": "postgres:16",
            "State": "exited",
            "RunningFor": "3 hours",
            "IPAddress": "192.168.64.3"
        })));
        assert_eq!(c.id, "f00");
        assert_eq!(c.name, "db");
        assert_eq!(c.image, "postgres:16");
        assert_eq!(c.status, "exited");
        assert_eq!(c.state, ContainerState::Stopped);
        assert_eq!(c.created_at.as_deref(), Some("3 hours"));
        assert_eq!(c.ip_address.as_deref(), Some("192.168.64.3"));
    }

    #[test]
    fn missing_fields_degrade_gracefully() {
        let c = ContainerRecord::from_raw(raw(json!({"weird": 1})));
        assert!(uuid::Uuid::parse_str(&c.id).is_ok());
        assert_eq!(c.name.chars().count(), 12);
        assert_eq!(c.image, "(unknown)");
        assert_eq!(c.status, "");
        assert_eq!(c.state, ContainerState::Unknown);
        assert_eq!(c.raw["weird"], 1);
    }

    #[test]
    fn classify_covers_synonyms() {
        for s in ["running", "Running (healthy)", "up", "RUN"] {
            assert_eq!(ContainerState::classify(s), ContainerState::Running, "{s}");
        }
        for s in ["stopped", "Exited (0) 2 minutes ago", "stop", "down"] {
            assert_eq!(ContainerState::classify(s), ContainerState::Stopped, "{s}");
        }
        for s in ["", "paused", "Up 3 hours", "created"] {
            assert_eq!(ContainerState::classify(s), ContainerState::Unknown, "{s}");
        }
    }
}
