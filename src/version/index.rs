//! Grouping of versions by minor line and selection of the overall latest

use std::collections::BTreeMap;

use tracing::debug;

use crate::version::semver::{Version, parse};

/// Highest patch release seen so far for every `major.minor` line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VersionGroupMap {
    groups: BTreeMap<String, Version>,
}

impl VersionGroupMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold raw version strings into the map.
    ///
    /// Unparseable strings are skipped. A group's entry is only replaced by a
    /// strictly greater patch, so on a tie the first version seen stays.
    pub fn fold<I, S>(mut self, versions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for raw in versions {
            let Some(version) = parse(raw.as_ref()) else {
                debug!("Skipping non-release tag {:?}", raw.as_ref());
                continue;
            };

            let key = version.major_minor_key();
            let replace = self
                .groups
                .get(&key)
                .is_none_or(|best| version.patch() > best.patch());
            if replace {
                self.groups.insert(key, version);
            }
        }
        self
    }

    /// The best release recorded for `version`'s minor line
    pub fn best_in_group(&self, version: &Version) -> Option<&Version> {
        self.groups.get(&version.major_minor_key())
    }

    /// Whether `version` is the highest patch of its minor line
    pub fn is_group_best(&self, version: &Version) -> bool {
        self.best_in_group(version) == Some(version)
    }

    pub fn get(&self, major_minor_key: &str) -> Option<&Version> {
        self.groups.get(major_minor_key)
    }

    pub fn values(&self) -> impl Iterator<Item = &Version> {
        self.groups.values()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// Select the highest version across all minor lines.
///
/// Compares major, then minor, then patch numerically. Returns `None` for an
/// empty input; on equal versions the first one wins.
pub fn select_global_latest<'a, I>(versions: I) -> Option<Version>
where
    I: IntoIterator<Item = &'a Version>,
{
    let mut versions = versions.into_iter();
    let mut latest = versions.next()?;
    for version in versions {
        if version.to_semver() > latest.to_semver() {
            latest = version;
        }
    }
    Some(latest.clone())
}

/// [`select_global_latest`] over raw tags, returning the original text.
///
/// Tags that are not releases are ignored.
pub fn select_global_latest_raw(versions: &[String]) -> Option<String> {
    let parsed: Vec<Version> = versions.iter().filter_map(|v| parse(v)).collect();
    select_global_latest(&parsed).map(|v| v.raw().to_string())
}
