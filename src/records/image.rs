use serde::Serialize;

use crate::output::{FieldLookup, RawRecord};

const ID_KEYS: &[&str] = &["id", "imageid", "digest", "sha", "hash"];
const REPOSITORY_KEYS: &[&str] = &["repository", "repo", "name", "image", "reference"];
const TAG_KEYS: &[&str] = &["tag", "tags"];
const SIZE_KEYS: &[&str] = &["size", "virtualsize", "disk"];
const CREATED_KEYS: &[&str] = &["createdat", "created_at", "created", "age", "createdsince"];

/// An image as listed by the backend.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageRecord {
    pub id: String,
    pub repository: String,
    pub tag: String,
    pub size: Option<String>,
    pub created_at: Option<String>,
    pub raw: RawRecord,
}

impl ImageRecord {
    pub fn from_raw(raw: RawRecord) -> Self {
        Self {
            id: raw
                .first_string(ID_KEYS)
                .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
            repository: raw.first_string(REPOSITORY_KEYS).unwrap_or_default(),
            tag: raw.first_string(TAG_KEYS).unwrap_or_default(),
            size: raw.first_string(SIZE_KEYS),
            created_at: raw.first_string(CREATED_KEYS),
            raw,
        }
    }

    /// What to pass back to the backend to address this image.
    pub fn reference(&self) -> String {
        if self.repository.is_empty() {
            self.id.clone()
        } else if self.tag.is_empty() {
            self.repository.clone()
        } else {
            format!("{}:{}", self.repository, self.tag)
        }
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
    fn reference_joins_repository_and_tag() {
        let img = ImageRecord::from_raw(raw(json!({
            "Repository": "nginx",
            "Tag": "latest",
            "ID": "sha256:deadbeef",
            "Size": "100MB"
        })));
        assert_eq!(img.reference(), "nginx:latest");
        assert_eq!(img.size.as_deref(), Some("100MB"));
        assert_eq!(img.id, "sha256:deadbeef");
    }

    #[test]
    fn reference_without_tag_is_repository() {
        let img = ImageRecord::from_raw(raw(json!({"name": "docker.io/library/alpine"})));
        assert_eq!(img.reference(), "docker.io/library/alpine");
    }

    #[test]
    fn reference_without_repository_is_id() {
        let img = ImageRecord::from_raw(raw(json!({"Digest": "sha256:cafe", "Tag": "v1"})));
        assert_eq!(img.reference(), "sha256:cafe");
    }

    #[test]
    fn numeric_size_renders_as_text() {
        let img = ImageRecord::from_raw(raw(json!({"repo": "x", "VirtualSize": 1048576})));
        assert_eq!(img.size.as_deref(), Some("1048576"));
        assert!(img.created_at.is_none());
    }
}
