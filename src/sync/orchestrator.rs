//! Sequencing of one sync run
//!
//! Fetch failures abort the run. Build, test and push failures only fail the
//! candidate they belong to; every other candidate is still processed.

use std::collections::HashSet;

use indexmap::IndexMap;
use tracing::{info, warn};

use crate::config::SyncConfig;
use crate::sync::candidates::{BuildCandidateSet, CandidateStatus, compute_candidates};
use crate::sync::tag_plan::derive_tag_plan;
use crate::tools::ImageTool;
use crate::version::error::FetchError;
use crate::version::index::{VersionGroupMap, select_global_latest};
use crate::version::semver::Version;
use crate::version::source::{ImageRegistry, TagSource};

/// Outcome of a sync run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
    pub candidates: BuildCandidateSet,
    /// Highest version across the registry and this run's tested builds
    pub global_latest: Option<Version>,
}

impl SyncReport {
    /// Exact versions that failed, in upstream order
    pub fn failed(&self) -> Vec<String> {
        self.candidates.failed()
    }

    /// Tags pushed per candidate, including candidates that failed midway
    pub fn pushed_tags(&self) -> IndexMap<String, Vec<String>> {
        self.candidates
            .iter()
            .filter(|c| !c.pushed_tags().is_empty())
            .map(|c| (c.version.exact_key(), c.pushed_tags().to_vec()))
            .collect()
    }

    pub fn is_success(&self) -> bool {
        self.candidates.iter().all(|c| !c.is_failed())
    }
}

/// Build, test and publish images for upstream releases missing from the registry
pub async fn run_sync(
    config: &SyncConfig,
    tag_source: &dyn TagSource,
    registry: &dyn ImageRegistry,
    tool: &dyn ImageTool,
) -> Result<SyncReport, FetchError> {
    let upstream = tag_source.list_release_tags(&config.project).await?;
    info!("Found {} upstream tags in {}", upstream.len(), config.project);

    let existing = registry
        .list_image_tags(&config.repository, &config.distro)
        .await?;
    info!(
        "Found {} published {} images in {}",
        existing.len(),
        config.distro,
        config.repository
    );

    let groups = VersionGroupMap::new().fold(&existing);
    let existing: HashSet<String> = existing.into_iter().collect();
    let mut candidates = compute_candidates(&upstream, &existing);

    if candidates.is_empty() {
        info!("Every upstream release already has a {} image", config.distro);
        return Ok(SyncReport {
            candidates,
            global_latest: select_global_latest(groups.values()),
        });
    }

    build_all(config, tool, &mut candidates).await;
    test_all(config, tool, &mut candidates).await;

    let groups = groups.fold(candidates.passed_versions());
    let global_latest = select_global_latest(groups.values());
    if let Some(latest) = &global_latest {
        info!("Latest version is {}", latest);
    }

    tag_all(config, tool, &mut candidates, &groups, global_latest.as_ref()).await;

    Ok(SyncReport {
        candidates,
        global_latest,
    })
}

async fn build_all(
    config: &SyncConfig,
    tool: &dyn ImageTool,
    candidates: &mut BuildCandidateSet,
) {
    for candidate in candidates.iter_mut() {
        let version = candidate.version.exact_key();
        info!("Building {}:{}-{}", config.repository, version, config.distro);
        match tool
            .build(&version, &config.repository, &config.distro)
            .await
        {
            Ok(()) => candidate.mark_built(),
            Err(e) => {
                warn!("Build of {} failed: {}", version, e);
                candidate.mark_failed();
            }
        }
    }
}

async fn test_all(
    config: &SyncConfig,
    tool: &dyn ImageTool,
    candidates: &mut BuildCandidateSet,
) {
    for candidate in candidates.iter_mut() {
        if candidate.status() != CandidateStatus::Built {
            continue;
        }
        let version = candidate.version.exact_key();
        info!("Testing {}:{}-{}", config.repository, version, config.distro);
        match tool
            .run_and_verify_version(&config.repository, &version, &config.distro)
            .await
        {
            Ok(()) => candidate.mark_test_passed(),
            Err(e) => {
                warn!("Smoke test of {} failed: {}", version, e);
                candidate.mark_failed();
            }
        }
    }
}

async fn tag_all(
    config: &SyncConfig,
    tool: &dyn ImageTool,
    candidates: &mut BuildCandidateSet,
    groups: &VersionGroupMap,
    global_latest: Option<&Version>,
) {
    for candidate in candidates.iter_mut() {
        if candidate.status() != CandidateStatus::TestPassed {
            continue;
        }

        let plan = derive_tag_plan(
            &candidate.version,
            &config.distro,
            groups,
            global_latest,
            config.move_latest,
        );

        let mut pushed_all = true;
        for op in &plan {
            info!(
                "Publishing {}:{} from {}",
                config.repository, op.destination_tag, op.source_tag
            );
            match tool
                .retag_and_push(&config.repository, &op.source_tag, &op.destination_tag)
                .await
            {
                Ok(()) => candidate.record_pushed(op.destination_tag.clone()),
                Err(e) => {
                    warn!(
                        "Publishing {} as {} failed: {}",
                        candidate.version, op.destination_tag, e
                    );
                    candidate.mark_failed();
                    pushed_all = false;
                    break;
                }
            }
        }

        if pushed_all {
            candidate.mark_published();
        }
    }
}
