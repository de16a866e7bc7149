//! Trait for building, verifying and publishing images

#[cfg(test)]
use mockall::automock;

use crate::version::error::ToolError;

/// Build, smoke-test and publish operations on container images.
///
/// Tags passed to these methods are bare tags (`2.10.3-slim`, `latest`);
/// implementations prefix them with `repository`.
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait ImageTool: Send + Sync {
    /// Build the image `<repository>:<version>-<distro>`
    async fn build(&self, version: &str, repository: &str, distro: &str) -> Result<(), ToolError>;

    /// Run the freshly built image and check it reports `version`
    async fn run_and_verify_version(
        &self,
        repository: &str,
        version: &str,
        distro: &str,
    ) -> Result<(), ToolError>;

    /// Point `destination_tag` at `source_tag` and push it.
    ///
    /// When both tags are equal this is a plain push.
    async fn retag_and_push(
        &self,
        repository: &str,
        source_tag: &str,
        destination_tag: &str,
    ) -> Result<(), ToolError>;
}
