// Candidate dispatch: ordered spellings tried with failure-aware fallback.

mod candidates;
mod classify;
pub mod dialect;
mod runner;

pub use candidates::CandidateList;
pub use classify::{COMPATIBILITY_MARKERS, CompatibilityClassifier, FallbackPolicy};
pub use dialect::docker_compatible_candidates;
pub use runner::{
    CandidateStream, ExitCheck, run_candidates, run_first_successful, stream_candidates,
    stream_first_successful,
};
