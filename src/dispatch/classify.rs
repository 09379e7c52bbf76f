use crate::error::EngineError;

/// Stderr fragments that mean "this spelling is unsupported here".
pub const COMPATIBILITY_MARKERS: &[&str] = &[
    "unknown command",
    "no such command",
    "unknown shorthand flag",
    "unknown flag",
    "flag provided but not defined",
];

/// Decides whether a failure is a dialect mismatch rather than a real error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompatibilityClassifier {
    markers: Vec<String>,
}

impl Default for CompatibilityClassifier {
    fn default() -> Self {
        Self {
            markers: COMPATIBILITY_MARKERS.iter().map(|m| m.to_string()).collect(),
        }
    }
}

impl CompatibilityClassifier {
    /// Recognize an additional backend-specific diagnostic.
    pub fn with_marker(mut self, marker: impl Into<String>) -> Self {
        self.markers.push(marker.into().to_lowercase());
        self
    }

    pub fn matches(&self, stderr: &str) -> bool {
        let lower = stderr.to_lowercase();
        self.markers.iter().any(|m| lower.contains(m.as_str()))
    }

    /// True for a `CommandFailed` whose stderr matches.
    pub fn is_compatibility_failure(&self, err: &EngineError) -> bool {
        matches!(err, EngineError::CommandFailed { stderr, .. } if self.matches(stderr))
    }
}

/// When to move on to the next candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackPolicy {
    /// Any start failure or non-zero exit tries the next candidate.
    AnyFailure,
    /// Only compatibility failures try the next candidate.
    Compatibility(CompatibilityClassifier),
}

impl FallbackPolicy {
    pub fn compatibility() -> Self {
        Self::Compatibility(CompatibilityClassifier::default())
    }

    /// Classifier used to spot diagnostics in live output.
    pub fn classifier(&self) -> CompatibilityClassifier {
        match self {
            FallbackPolicy::AnyFailure => CompatibilityClassifier::default(),
            FallbackPolicy::Compatibility(classifier) => classifier.clone(),
        }
    }

    /// A missing executable is never retried: every candidate would hit it.
    pub fn should_try_next(&self, err: &EngineError) -> bool {
        match (self, err) {
            (_, EngineError::ExecutableNotFound(_)) => false,
            (FallbackPolicy::AnyFailure, EngineError::FailedToStart(_)) => true,
            (FallbackPolicy::AnyFailure, EngineError::CommandFailed { .. }) => true,
            (FallbackPolicy::Compatibility(classifier), err) => {
                classifier.is_compatibility_failure(err)
            }
            _ => false,
        }
    }
}
