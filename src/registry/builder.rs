//! Builder for SchemaRegistry
//!
//! This module contains [`RegistryBuilder`] which provides a fluent API
//! for creating a [`SchemaRegistry`](super::SchemaRegistry).

use crate::config::{EnvSource, RegistryConfigBuilder};
use crate::descriptor::ModuleDescriptor;
use crate::error::Result;
use std::path::PathBuf;

use super::SchemaRegistry;

/// Builder for creating a [`SchemaRegistry`] with a fluent API.
///
/// # Example
///
/// ```rust,no_run
/// use pbxdesc::SchemaRegistry;
///
/// let registry = SchemaRegistry::builder()
///     .descriptor_dir("~/.local/share/pbx/modules")
///     .with_builtin_modules()
///     .with_env_prefix("PBX")
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    config_builder: RegistryConfigBuilder,
    descriptors: Vec<ModuleDescriptor>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scan a directory for descriptor files.
    ///
    /// Supports `~` expansion for home directory. Files are loaded in
    /// file-name order; files with unknown extensions are skipped.
    pub fn descriptor_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_builder = self.config_builder.descriptor_dir(path);
        self
    }

    /// Register the descriptors shipped with this crate.
    pub fn with_builtin_modules(mut self) -> Self {
        self.config_builder = self.config_builder.with_builtin_modules();
        self
    }

    /// Enable environment variable overrides for default settings.
    ///
    /// The format is: `{PREFIX}_{CATEGORY}_{SUBCATEGORY}` (all uppercase)
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config_builder = self.config_builder.with_env_prefix(prefix);
        self
    }

    /// Read environment overrides from a custom source instead of the
    /// process environment.
    pub fn with_env_source(mut self, source: impl EnvSource + 'static) -> Self {
        self.config_builder = self.config_builder.with_env_source(source);
        self
    }

    /// Register a descriptor built in code. It is validated on [`build`](Self::build).
    pub fn with_descriptor(mut self, descriptor: ModuleDescriptor) -> Self {
        self.descriptors.push(descriptor);
        self
    }

    /// Build the registry.
    ///
    /// Built-in modules come first, then directories in the order they were
    /// added, then explicit descriptors.
    ///
    /// # Errors
    ///
    /// Returns an error if a directory cannot be read, a descriptor fails to
    /// load or validate, or two descriptors collide.
    pub fn build(self) -> Result<SchemaRegistry> {
        SchemaRegistry::with_descriptors(self.config_builder.build(), self.descriptors)
    }
}
