use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use release_sync::config::{
    DEFAULT_BUILD_ARG, DEFAULT_PROJECT, DEFAULT_REPOSITORY, DEFAULT_VERSION_MARKER, DockerConfig,
    Endpoints, SyncConfig,
};
use release_sync::sync::run_sync;
use release_sync::tools::DockerCli;
use release_sync::version::registries::{DockerHubRegistry, GitHubTagSource};

/// Exit status when one or more versions failed to build, test or publish
const EXIT_CANDIDATES_FAILED: u8 = 1;

/// Exit status when the run could not start, e.g. a fetch failed
const EXIT_FATAL: u8 = 2;

#[derive(Parser)]
#[command(name = "release-sync")]
#[command(version, about = "Build and push docker images for upstream releases")]
struct Cli {
    /// Name of the distro to build, e.g. slim, alpine
    #[arg(short = 'o', long = "os")]
    distro: String,

    /// Also apply the default docker tags (latest, <distro>, unsuffixed versions)
    #[arg(short, long)]
    latest: bool,

    /// Docker repository name
    #[arg(short, long, default_value = DEFAULT_REPOSITORY)]
    repo_name: String,

    /// Upstream GitHub repository name
    #[arg(short = 'a', long, default_value = DEFAULT_PROJECT)]
    ansible_name: String,

    /// Print the commands instead of running them
    #[arg(short, long)]
    dry_run: bool,

    /// Build argument receiving the upstream version
    #[arg(long, default_value = DEFAULT_BUILD_ARG)]
    build_arg: String,

    /// Directory holding one build context per distro
    #[arg(long, default_value = ".")]
    context_root: PathBuf,

    /// Output line prefix under which the image reports its version
    #[arg(long, default_value = DEFAULT_VERSION_MARKER)]
    version_marker: String,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

fn init_tracing(verbose: u8, quiet: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if quiet {
            EnvFilter::new("error")
        } else {
            match verbose {
                0 => EnvFilter::new("info"),
                1 => EnvFilter::new("debug"),
                _ => EnvFilter::new("trace"),
            }
        }
    });

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

async fn run(cli: Cli) -> anyhow::Result<Vec<String>> {
    let endpoints = Endpoints::from_env();
    let config = SyncConfig {
        distro: cli.distro,
        move_latest: cli.latest,
        repository: cli.repo_name,
        project: cli.ansible_name,
        dry_run: cli.dry_run,
    };
    let docker = DockerCli::new(DockerConfig {
        build_arg: cli.build_arg,
        context_root: cli.context_root,
        version_marker: cli.version_marker,
        dry_run: config.dry_run,
        ..DockerConfig::default()
    });

    let tag_source = GitHubTagSource::new(&endpoints.github_api)
        .context("Failed to create GitHub client")?
        .with_token(std::env::var("GITHUB_TOKEN").ok());
    let registry = DockerHubRegistry::new(&endpoints.registry, &endpoints.auth)
        .context("Failed to create registry client")?;

    if config.dry_run {
        info!("Dry run: no image will be built, tagged or pushed");
    }

    let report = run_sync(&config, &tag_source, &registry, &docker)
        .await
        .with_context(|| format!("Failed to fetch versions for {}", config.repository))?;

    for (version, tags) in report.pushed_tags() {
        info!("Published {}: {}", version, tags.join(", "));
    }

    Ok(report.failed())
}

/// Exit status and failure summary for the outcome of a run
fn exit_status(result: &anyhow::Result<Vec<String>>) -> (u8, Option<String>) {
    match result {
        Ok(failed) if failed.is_empty() => (0, None),
        Ok(failed) => (
            EXIT_CANDIDATES_FAILED,
            Some(format!(
                "Failed to build docker images for following versions: {}",
                failed.join(", ")
            )),
        ),
        Err(_) => (EXIT_FATAL, None),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    let result = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")
        .and_then(|runtime| runtime.block_on(run(cli)));

    if let Err(e) = &result {
        error!("{:#}", e);
    }

    let (code, summary) = exit_status(&result);
    if let Some(summary) = summary {
        error!("{}", summary);
        println!("{}", summary);
    }

    ExitCode::from(code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Ok(vec![]), 0, None)]
    #[case(
        Ok(vec!["2.10.2".to_string()]),
        1,
        Some("Failed to build docker images for following versions: 2.10.2")
    )]
    #[case(
        Ok(vec!["2.10.2".to_string(), "2.11.0".to_string()]),
        1,
        Some("Failed to build docker images for following versions: 2.10.2, 2.11.0")
    )]
    #[case(Err(anyhow::anyhow!("Failed to fetch versions")), 2, None)]
    fn exit_status_maps_run_outcome(
        #[case] result: anyhow::Result<Vec<String>>,
        #[case] expected_code: u8,
        #[case] expected_summary: Option<&str>,
    ) {
        let (code, summary) = exit_status(&result);

        assert_eq!(code, expected_code);
        assert_eq!(summary.as_deref(), expected_summary);
    }

    #[test]
    fn cli_requires_distro_and_applies_defaults() {
        assert!(Cli::try_parse_from(["release-sync"]).is_err());

        let cli = Cli::try_parse_from(["release-sync", "-o", "slim", "-l", "-d"]).unwrap();

        assert_eq!(cli.distro, "slim");
        assert!(cli.latest);
        assert!(cli.dry_run);
        assert_eq!(cli.repo_name, DEFAULT_REPOSITORY);
        assert_eq!(cli.ansible_name, DEFAULT_PROJECT);
    }

    #[test]
    fn cli_rejects_quiet_with_verbose() {
        assert!(Cli::try_parse_from(["release-sync", "-o", "slim", "-q", "-v"]).is_err());
    }
}
