//! Reconciliation of upstream releases against published images

use std::collections::HashSet;

use indexmap::IndexMap;
use tracing::{debug, info};

use crate::version::semver::{Version, parse};

/// Where a candidate is in the build, test and publish pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateStatus {
    Pending,
    Built,
    TestPassed,
    /// Every tag of the plan was pushed
    Published,
    /// Terminal; no further steps run for this candidate
    Failed,
}

/// An upstream release with no published image yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildCandidate {
    pub version: Version,
    status: CandidateStatus,
    pushed_tags: Vec<String>,
}

impl BuildCandidate {
    pub fn new(version: Version) -> Self {
        Self {
            version,
            status: CandidateStatus::Pending,
            pushed_tags: Vec::new(),
        }
    }

    pub fn status(&self) -> CandidateStatus {
        self.status
    }

    pub fn is_failed(&self) -> bool {
        self.status == CandidateStatus::Failed
    }

    /// Destination tags pushed so far, in push order
    pub fn pushed_tags(&self) -> &[String] {
        &self.pushed_tags
    }

    pub fn mark_built(&mut self) {
        self.advance(CandidateStatus::Pending, CandidateStatus::Built);
    }

    pub fn mark_test_passed(&mut self) {
        self.advance(CandidateStatus::Built, CandidateStatus::TestPassed);
    }

    pub fn mark_published(&mut self) {
        self.advance(CandidateStatus::TestPassed, CandidateStatus::Published);
    }

    pub fn mark_failed(&mut self) {
        self.status = CandidateStatus::Failed;
    }

    pub fn record_pushed(&mut self, tag: impl Into<String>) {
        self.pushed_tags.push(tag.into());
    }

    fn advance(&mut self, from: CandidateStatus, to: CandidateStatus) {
        if self.status == from {
            self.status = to;
        } else {
            debug!(
                "Ignoring transition {:?} -> {:?} for {} in state {:?}",
                from, to, self.version, self.status
            );
        }
    }
}

/// Candidates keyed by exact version, in upstream tag order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildCandidateSet {
    candidates: IndexMap<String, BuildCandidate>,
}

impl BuildCandidateSet {
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn get(&self, exact_key: &str) -> Option<&BuildCandidate> {
        self.candidates.get(exact_key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.candidates.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = &BuildCandidate> {
        self.candidates.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut BuildCandidate> {
        self.candidates.values_mut()
    }

    /// Exact versions that finished in [`CandidateStatus::Failed`]
    pub fn failed(&self) -> Vec<String> {
        self.candidates
            .iter()
            .filter(|(_, c)| c.is_failed())
            .map(|(key, _)| key.clone())
            .collect()
    }

    /// Exact versions that passed the smoke test, whether or not they were published yet
    pub fn passed_versions(&self) -> Vec<String> {
        self.candidates
            .iter()
            .filter(|(_, c)| {
                matches!(
                    c.status,
                    CandidateStatus::TestPassed | CandidateStatus::Published
                )
            })
            .map(|(key, _)| key.clone())
            .collect()
    }
}

/// Upstream releases lacking an image in `existing_image_versions`.
///
/// Tags that are not releases are skipped. A release listed twice (for example
/// `v1.2.3` and `1.2.3`) yields one candidate.
pub fn compute_candidates<I, S>(
    upstream_tags: I,
    existing_image_versions: &HashSet<String>,
) -> BuildCandidateSet
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut candidates = IndexMap::new();

    for tag in upstream_tags {
        let Some(version) = parse(tag.as_ref()) else {
            debug!("Skipping upstream tag {:?}: not a release", tag.as_ref());
            continue;
        };

        let key = version.exact_key();
        info!("Checking upstream tag {:?}", key);
        if existing_image_versions.contains(&key) {
            info!("{} image already exists in the registry", key);
            continue;
        }
        if candidates.contains_key(&key) {
            continue;
        }

        info!("{} image does not exist in the registry, building", key);
        candidates.insert(key, BuildCandidate::new(version));
    }

    BuildCandidateSet { candidates }
}
