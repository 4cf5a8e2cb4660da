//! Registry configuration

use std::path::PathBuf;
use std::sync::Arc;

/// Source of environment variables
///
/// Defaults to the process environment; tests inject their own.
pub trait EnvSource: Send + Sync {
    fn var(&self, key: &str) -> Result<String, std::env::VarError>;
}

/// Reads from `std::env`
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultEnvSource;

impl EnvSource for DefaultEnvSource {
    fn var(&self, key: &str) -> Result<String, std::env::VarError> {
        std::env::var(key)
    }
}

/// Configuration for building a [`SchemaRegistry`](crate::SchemaRegistry)
pub struct RegistryConfig {
    /// Directories scanned for descriptor files
    pub descriptor_dirs: Vec<PathBuf>,

    /// Register the descriptors shipped with this crate
    pub include_builtin: bool,

    /// Environment variable prefix for setting overrides (e.g., "PBX" -> PBX_CDR_LIMIT)
    /// If None, env var overrides are disabled
    pub env_prefix: Option<String>,

    /// Where environment variables are read from
    pub env_source: Arc<dyn EnvSource>,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            descriptor_dirs: Vec::new(),
            include_builtin: false,
            env_prefix: None,
            env_source: Arc::new(DefaultEnvSource),
        }
    }
}

impl std::fmt::Debug for RegistryConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistryConfig")
            .field("descriptor_dirs", &self.descriptor_dirs)
            .field("include_builtin", &self.include_builtin)
            .field("env_prefix", &self.env_prefix)
            .finish_non_exhaustive()
    }
}

impl RegistryConfig {
    /// Create a new builder for RegistryConfig
    ///
    /// # Example
    /// ```rust
    /// use pbxdesc::RegistryConfig;
    ///
    /// let config = RegistryConfig::builder()
    ///     .descriptor_dir("/usr/share/pbx/modules")
    ///     .with_builtin_modules()
    ///     .build();
    /// assert!(config.include_builtin);
    /// ```
    pub fn builder() -> RegistryConfigBuilder {
        RegistryConfigBuilder::new()
    }
}

/// Builder for creating RegistryConfig with a fluent API
#[derive(Clone, Default)]
pub struct RegistryConfigBuilder {
    descriptor_dirs: Vec<PathBuf>,
    include_builtin: bool,
    env_prefix: Option<String>,
    env_source: Option<Arc<dyn EnvSource>>,
}

impl std::fmt::Debug for RegistryConfigBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistryConfigBuilder")
            .field("descriptor_dirs", &self.descriptor_dirs)
            .field("include_builtin", &self.include_builtin)
            .field("env_prefix", &self.env_prefix)
            .field("env_source", &self.env_source.as_ref().map(|_| "Some(EnvSource)"))
            .finish()
    }
}

impl RegistryConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a directory to scan for descriptor files
    ///
    /// Supports `~` expansion for home directory.
    pub fn descriptor_dir(mut self, path: impl Into<PathBuf>) -> Self {
        let path: PathBuf = path.into();
        let expanded = if path.starts_with("~") {
            if let Some(home) = dirs::home_dir() {
                home.join(path.strip_prefix("~").unwrap_or(&path))
            } else {
                path
            }
        } else {
            path
        };
        self.descriptor_dirs.push(expanded);
        self
    }

    /// Register the descriptors shipped with this crate (XML CDR)
    pub fn with_builtin_modules(mut self) -> Self {
        self.include_builtin = true;
        self
    }

    /// Enable environment variable overrides for default settings
    ///
    /// The format is: `{PREFIX}_{CATEGORY}_{SUBCATEGORY}` (all uppercase)
    ///
    /// # Example
    /// ```rust
    /// use pbxdesc::RegistryConfig;
    ///
    /// let config = RegistryConfig::builder()
    ///     .with_env_prefix("PBX")
    ///     .build();
    ///
    /// // Now PBX_CDR_LIMIT=1000 overrides the "cdr.limit" default
    /// assert_eq!(config.env_prefix.as_deref(), Some("PBX"));
    /// ```
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = Some(prefix.into());
        self
    }

    /// Read environment overrides from a custom source
    pub fn with_env_source(mut self, source: impl EnvSource + 'static) -> Self {
        self.env_source = Some(Arc::new(source));
        self
    }

    pub fn build(self) -> RegistryConfig {
        RegistryConfig {
            descriptor_dirs: self.descriptor_dirs,
            include_builtin: self.include_builtin,
            env_prefix: self.env_prefix,
            env_source: self
                .env_source
                .unwrap_or_else(|| Arc::new(DefaultEnvSource)),
        }
    }
}
