pub mod config;
pub mod sync;
pub mod tools;
pub mod version;
