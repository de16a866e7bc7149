use serde::Deserialize;
use std::path::PathBuf;

// =============================================================================
// Defaults
// =============================================================================

/// Default Docker Hub repository the images are published to
pub const DEFAULT_REPOSITORY: &str = "sbocinec/ansible";

/// Default GitHub project whose tags are tracked
pub const DEFAULT_PROJECT: &str = "ansible/ansible";

/// Default base URL for GitHub API
pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";

/// Default Docker Hub registry API
pub const DEFAULT_REGISTRY_URL: &str = "https://registry-1.docker.io";

/// Default Docker Hub token service
pub const DEFAULT_AUTH_URL: &str = "https://auth.docker.io";

/// Build argument carrying the upstream version into the Dockerfile
pub const DEFAULT_BUILD_ARG: &str = "ANSIBLE_VERSION";

/// Line prefix under which the image prints its tool version
pub const DEFAULT_VERSION_MARKER: &str = "ansible-playbook";

/// Timeout for fetch operations in milliseconds (30 seconds)
pub const FETCH_TIMEOUT_MS: u64 = 30_000;

/// Page size requested from the GitHub tags API (its maximum)
pub const TAGS_PER_PAGE: usize = 100;

/// Upper bound on tag pages fetched in one run
pub const MAX_TAG_PAGES: u32 = 20;

/// Settings for one sync run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    /// Base image variant, e.g. `slim` or `alpine`
    pub distro: String,
    /// Whether this run may move `latest`, `<distro>` and unsuffixed tags
    pub move_latest: bool,
    pub repository: String,
    pub project: String,
    pub dry_run: bool,
}

impl SyncConfig {
    pub fn new(distro: impl Into<String>) -> Self {
        Self {
            distro: distro.into(),
            move_latest: false,
            repository: DEFAULT_REPOSITORY.to_string(),
            project: DEFAULT_PROJECT.to_string(),
            dry_run: false,
        }
    }
}

/// Remote API locations
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct Endpoints {
    pub github_api: String,
    pub registry: String,
    pub auth: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            github_api: DEFAULT_GITHUB_API_URL.to_string(),
            registry: DEFAULT_REGISTRY_URL.to_string(),
            auth: DEFAULT_AUTH_URL.to_string(),
        }
    }
}

impl Endpoints {
    /// Defaults overridden by `RELEASE_SYNC_GITHUB_API`,
    /// `RELEASE_SYNC_REGISTRY_URL` and `RELEASE_SYNC_AUTH_URL`.
    pub fn from_env() -> Self {
        Self::with_env(|key| std::env::var(key).ok())
    }

    fn with_env(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            github_api: lookup("RELEASE_SYNC_GITHUB_API").unwrap_or(defaults.github_api),
            registry: lookup("RELEASE_SYNC_REGISTRY_URL").unwrap_or(defaults.registry),
            auth: lookup("RELEASE_SYNC_AUTH_URL").unwrap_or(defaults.auth),
        }
    }
}

/// How the docker CLI is driven
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct DockerConfig {
    /// Binary to invoke
    pub program: String,
    pub build_arg: String,
    /// Directory holding one build context per distro
    pub context_root: PathBuf,
    pub version_marker: String,
    /// Log commands instead of running them
    pub dry_run: bool,
}

impl Default for DockerConfig {
    fn default() -> Self {
        Self {
            program: "docker".to_string(),
            build_arg: DEFAULT_BUILD_ARG.to_string(),
            context_root: PathBuf::from("."),
            version_marker: DEFAULT_VERSION_MARKER.to_string(),
            dry_run: false,
        }
    }
}
