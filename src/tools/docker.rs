//! docker CLI implementation of [`ImageTool`]
//!
//! Every invocation passes its arguments as a discrete list; nothing goes
//! through a shell. In dry-run mode commands are logged and treated as
//! successful without spawning anything.

use std::process::Stdio;

use tokio::process::Command;
use tracing::{debug, info};

use crate::config::DockerConfig;
use crate::tools::image_tool::ImageTool;
use crate::version::error::ToolError;

pub struct DockerCli {
    config: DockerConfig,
}

impl DockerCli {
    pub fn new(config: DockerConfig) -> Self {
        Self { config }
    }

    pub fn build_args(&self, version: &str, repository: &str, distro: &str) -> Vec<String> {
        let context = self.config.context_root.join(distro);
        vec![
            "build".to_string(),
            format!("--build-arg={}={}", self.config.build_arg, version),
            "-t".to_string(),
            image_ref(repository, &format!("{}-{}", version, distro)),
            context.to_string_lossy().into_owned(),
        ]
    }

    pub fn run_args(&self, repository: &str, version: &str, distro: &str) -> Vec<String> {
        vec![
            "run".to_string(),
            "--rm".to_string(),
            image_ref(repository, &format!("{}-{}", version, distro)),
        ]
    }

    pub fn tag_args(
        &self,
        repository: &str,
        source_tag: &str,
        destination_tag: &str,
    ) -> Vec<String> {
        vec![
            "tag".to_string(),
            image_ref(repository, source_tag),
            image_ref(repository, destination_tag),
        ]
    }

    pub fn push_args(&self, repository: &str, tag: &str) -> Vec<String> {
        vec!["push".to_string(), image_ref(repository, tag)]
    }

    fn display(&self, args: &[String]) -> String {
        format!("{} {}", self.config.program, args.join(" "))
    }

    /// Run a command with inherited output and require a zero exit status
    async fn execute(&self, args: &[String]) -> Result<(), ToolError> {
        let command = self.display(args);
        if self.config.dry_run {
            info!("[dry-run] {}", command);
            return Ok(());
        }

        info!("Running: {}", command);
        let status = Command::new(&self.config.program)
            .args(args)
            .status()
            .await
            .map_err(|source| ToolError::Spawn {
                program: self.config.program.clone(),
                source,
            })?;

        if status.success() {
            Ok(())
        } else {
            Err(ToolError::Failed {
                command,
                code: status.code(),
            })
        }
    }

    /// Run a command and return its stdout, or `None` in dry-run mode
    async fn capture(&self, args: &[String]) -> Result<Option<String>, ToolError> {
        let command = self.display(args);
        if self.config.dry_run {
            info!("[dry-run] {}", command);
            return Ok(None);
        }

        info!("Running: {}", command);
        let output = Command::new(&self.config.program)
            .args(args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|source| ToolError::Spawn {
                program: self.config.program.clone(),
                source,
            })?;

        if !output.status.success() {
            debug!("stderr: {}", String::from_utf8_lossy(&output.stderr));
            return Err(ToolError::Failed {
                command,
                code: output.status.code(),
            });
        }

        Ok(Some(String::from_utf8_lossy(&output.stdout).into_owned()))
    }
}

impl Default for DockerCli {
    fn default() -> Self {
        Self::new(DockerConfig::default())
    }
}

fn image_ref(repository: &str, tag: &str) -> String {
    format!("{}:{}", repository, tag)
}

/// Whether the image output has a `marker` line mentioning `version`.
///
/// e.g. `ansible-playbook [core 2.11.1]` reports `2.11.1` for marker
/// `ansible-playbook`.
pub fn reports_version(output: &str, marker: &str, version: &str) -> bool {
    output
        .lines()
        .map(str::trim_start)
        .filter(|line| line.starts_with(marker))
        .any(|line| {
            line[marker.len()..]
                .split(|c: char| c.is_whitespace() || c == '[' || c == ']')
                .any(|token| token == version)
        })
}

#[async_trait::async_trait]
impl ImageTool for DockerCli {
    async fn build(&self, version: &str, repository: &str, distro: &str) -> Result<(), ToolError> {
        self.execute(&self.build_args(version, repository, distro))
            .await
    }

    async fn run_and_verify_version(
        &self,
        repository: &str,
        version: &str,
        distro: &str,
    ) -> Result<(), ToolError> {
        let Some(output) = self
            .capture(&self.run_args(repository, version, distro))
            .await?
        else {
            return Ok(());
        };

        if reports_version(&output, &self.config.version_marker, version) {
            Ok(())
        } else {
            Err(ToolError::VersionMismatch {
                expected: version.to_string(),
                image: image_ref(repository, &format!("{}-{}", version, distro)),
            })
        }
    }

    async fn retag_and_push(
        &self,
        repository: &str,
        source_tag: &str,
        destination_tag: &str,
    ) -> Result<(), ToolError> {
        if source_tag != destination_tag {
            self.execute(&self.tag_args(repository, source_tag, destination_tag))
                .await?;
        }
        self.execute(&self.push_args(repository, destination_tag))
            .await
    }
}
