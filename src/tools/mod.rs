//! External image tooling driven by a sync run

pub mod docker;
pub mod image_tool;

pub use docker::DockerCli;
pub use image_tool::ImageTool;
