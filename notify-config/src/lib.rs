//! Configuration loading and shared configuration types for the notification services.
//!
//! Both binaries load their configuration through [`load_config`], which layers a base
//! file, an environment-specific file, and `APP_`-prefixed environment variable
//! overrides on top of each other.

mod environment;
mod load;
pub mod shared;

pub use environment::Environment;
pub use load::{LoadConfigError, load_config};
