//! In-memory collaborators for sync tests

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;

use release_sync::tools::ImageTool;
use release_sync::version::error::{FetchError, ToolError};
use release_sync::version::source::{ImageRegistry, TagSource};

/// Tag source returning a fixed list
pub struct FakeTagSource {
    tags: Vec<String>,
}

impl FakeTagSource {
    pub fn new(tags: &[&str]) -> Self {
        Self {
            tags: tags.iter().map(|t| t.to_string()).collect(),
        }
    }
}

#[async_trait]
impl TagSource for FakeTagSource {
    async fn list_release_tags(&self, _project: &str) -> Result<Vec<String>, FetchError> {
        Ok(self.tags.clone())
    }
}

/// Registry holding a fixed set of already stripped versions
pub struct FakeRegistry {
    versions: Vec<String>,
}

impl FakeRegistry {
    pub fn new(versions: &[&str]) -> Self {
        Self {
            versions: versions.iter().map(|v| v.to_string()).collect(),
        }
    }
}

#[async_trait]
impl ImageRegistry for FakeRegistry {
    async fn list_image_tags(
        &self,
        _repository: &str,
        _distro: &str,
    ) -> Result<Vec<String>, FetchError> {
        Ok(self.versions.clone())
    }
}

/// Image tool that records every call and fails on request
#[derive(Default)]
pub struct RecordingTool {
    failing_builds: HashSet<String>,
    failing_tests: HashSet<String>,
    failing_pushes: HashSet<String>,
    calls: Mutex<Vec<String>>,
}

impl RecordingTool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_build(mut self, version: &str) -> Self {
        self.failing_builds.insert(version.to_string());
        self
    }

    pub fn fail_test(mut self, version: &str) -> Self {
        self.failing_tests.insert(version.to_string());
        self
    }

    /// Fail any push to `destination_tag`
    pub fn fail_push(mut self, destination_tag: &str) -> Self {
        self.failing_pushes.insert(destination_tag.to_string());
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl ImageTool for RecordingTool {
    async fn build(&self, version: &str, repository: &str, distro: &str) -> Result<(), ToolError> {
        self.record(format!("build {}:{}-{}", repository, version, distro));
        if self.failing_builds.contains(version) {
            return Err(ToolError::Failed {
                command: format!("docker build {}", version),
                code: Some(1),
            });
        }
        Ok(())
    }

    async fn run_and_verify_version(
        &self,
        repository: &str,
        version: &str,
        distro: &str,
    ) -> Result<(), ToolError> {
        self.record(format!("test {}:{}-{}", repository, version, distro));
        if self.failing_tests.contains(version) {
            return Err(ToolError::VersionMismatch {
                expected: version.to_string(),
                image: format!("{}:{}-{}", repository, version, distro),
            });
        }
        Ok(())
    }

    async fn retag_and_push(
        &self,
        _repository: &str,
        source_tag: &str,
        destination_tag: &str,
    ) -> Result<(), ToolError> {
        self.record(format!("push {} <- {}", destination_tag, source_tag));
        if self.failing_pushes.contains(destination_tag) {
            return Err(ToolError::Failed {
                command: format!("docker push {}", destination_tag),
                code: Some(1),
            });
        }
        Ok(())
    }
}
