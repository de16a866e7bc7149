use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::LazyLock;

use regex::Regex;

static RELEASE_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^v?([0-9]+)\.([0-9]+)\.([0-9]+)$").expect("valid release tag regex")
});

/// A `major.minor.patch` release parsed from a tag.
///
/// Equality, hashing and ordering only look at the numeric fields, so
/// `v1.2.3` and `1.2.3` are the same release. `raw` keeps the original text.
#[derive(Debug, Clone)]
pub struct Version {
    major: u64,
    minor: u64,
    patch: u64,
    raw: String,
}

impl Version {
    pub fn major(&self) -> u64 {
        self.major
    }

    pub fn minor(&self) -> u64 {
        self.minor
    }

    pub fn patch(&self) -> u64 {
        self.patch
    }

    /// Tag text this version was parsed from
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Key of the minor line this release belongs to, e.g. `"2.10"`.
    pub fn major_minor_key(&self) -> String {
        format!("{}.{}", self.major, self.minor)
    }

    /// Exact version without any prefix, e.g. `"2.10.3"`.
    pub fn exact_key(&self) -> String {
        format!("{}.{}.{}", self.major, self.minor, self.patch)
    }

    pub fn to_semver(&self) -> semver::Version {
        semver::Version::new(self.major, self.minor, self.patch)
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl Hash for Version {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (self.major, self.minor, self.patch).hash(state);
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.to_semver().cmp(&other.to_semver())
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Parse a release tag into a [`Version`].
///
/// Accepts an optional leading `v` followed by exactly three numeric
/// components. Everything else (pre-releases, partial versions, branch names)
/// is not a release and yields `None`.
///
/// Examples:
/// - "v1.2.3" -> Version(1, 2, 3)
/// - "1.2" -> None
/// - "1.2.3-rc1" -> None
pub fn parse(raw: &str) -> Option<Version> {
    let caps = RELEASE_TAG.captures(raw)?;
    let component = |i: usize| caps.get(i)?.as_str().parse::<u64>().ok();

    Some(Version {
        major: component(1)?,
        minor: component(2)?,
        patch: component(3)?,
        raw: raw.to_string(),
    })
}
