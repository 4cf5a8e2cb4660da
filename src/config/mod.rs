//! Registry configuration types
//!
//! - `RegistryConfig` - where descriptors come from and how settings are overridden
//! - `EnvSource` - pluggable environment lookup for setting overrides

mod types;

pub use types::{DefaultEnvSource, EnvSource, RegistryConfig, RegistryConfigBuilder};
