//! Remote sources of version information

pub mod docker_hub;
pub mod github;

pub use docker_hub::DockerHubRegistry;
pub use github::GitHubTagSource;
