//! Decision logic of a sync run: which releases to build and which tags they get

pub mod candidates;
pub mod orchestrator;
pub mod tag_plan;

pub use candidates::{BuildCandidate, BuildCandidateSet, CandidateStatus, compute_candidates};
pub use orchestrator::{SyncReport, run_sync};
pub use tag_plan::{TagOperation, derive_tag_plan};
