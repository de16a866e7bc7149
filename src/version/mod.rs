//! Version layer: parsing release tags and reading them from remote sources
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  TagSource  │────▶│   semver    │────▶│    index    │
//! │ (GitHub)    │     │  (parse)    │     │(group/max)  │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!        ▲                   ▲
//! ┌─────────────┐            │
//! │ImageRegistry│────────────┘
//! │(Docker Hub) │
//! └─────────────┘
//! ```
//!
//! # Modules
//!
//! - [`semver`]: `Version` and the release tag parser
//! - [`index`]: `VersionGroupMap` and global latest selection
//! - [`source`]: traits for the tag source and the image registry
//! - [`registries`]: GitHub and Docker Hub implementations
//! - [`error`]: Error types for fetches and tool invocations

pub mod error;
pub mod index;
pub mod registries;
pub mod semver;
pub mod source;
