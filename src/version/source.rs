//! Traits for the remote sources a sync run reads from

#[cfg(test)]
use mockall::automock;

use crate::version::error::FetchError;

/// Source of upstream release tags
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait TagSource: Send + Sync {
    /// Fetches every tag name published by the upstream project
    ///
    /// # Arguments
    /// * `project` - Project identifier on the host (e.g., "ansible/ansible")
    ///
    /// # Returns
    /// * `Ok(Vec<String>)` - Raw tag names in the order the host lists them
    /// * `Err(FetchError)` - If the fetch fails
    async fn list_release_tags(&self, project: &str) -> Result<Vec<String>, FetchError>;
}

/// Registry holding the already published images
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait ImageRegistry: Send + Sync {
    /// Fetches the exact versions already published for `distro`
    ///
    /// Only tags shaped like `<major>.<minor>.<patch>-<distro>` are kept, and
    /// they are returned with the `-<distro>` suffix removed.
    async fn list_image_tags(
        &self,
        repository: &str,
        distro: &str,
    ) -> Result<Vec<String>, FetchError>;
}
