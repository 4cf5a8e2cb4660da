//! Descriptor format trait and implementations

use crate::error::{Error, Result};
use serde::{Serialize, de::DeserializeOwned};
use std::path::Path;

/// Trait for descriptor format implementations
///
/// Descriptors are plain serde documents, so the same typed records can be
/// read from JSON, TOML or YAML.
pub trait DescriptorFormat: Send + Sync {
    /// File extensions handled by this format (e.g., `["yaml", "yml"]`)
    fn extensions(&self) -> &[&'static str];

    /// Serialize data to string
    fn serialize<T: Serialize>(&self, data: &T) -> Result<String>;

    /// Deserialize data from string
    fn deserialize<T: DeserializeOwned>(&self, content: &str) -> Result<T>;

    /// Read and deserialize from file
    fn read<T: DeserializeOwned>(&self, path: &Path) -> Result<T> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        self.deserialize(&content)
    }
}

// =============================================================================
// JSON
// =============================================================================

/// JSON descriptor format (default)
#[derive(Debug, Clone, Default)]
pub struct JsonFormat {
    /// Pretty print JSON output
    pretty: bool,
}

impl JsonFormat {
    /// Create a JSON format with pretty printing enabled
    pub fn new() -> Self {
        Self { pretty: true }
    }

    /// Create a compact JSON format (no pretty printing)
    pub fn compact() -> Self {
        Self { pretty: false }
    }
}

impl DescriptorFormat for JsonFormat {
    fn extensions(&self) -> &[&'static str] {
        &["json"]
    }

    fn serialize<T: Serialize>(&self, data: &T) -> Result<String> {
        if self.pretty {
            serde_json::to_string_pretty(data).map_err(Error::from)
        } else {
            serde_json::to_string(data).map_err(Error::from)
        }
    }

    fn deserialize<T: DeserializeOwned>(&self, content: &str) -> Result<T> {
        serde_json::from_str(content).map_err(|e| Error::Parse(e.to_string()))
    }
}

// =============================================================================
// TOML
// =============================================================================

/// TOML descriptor format
#[cfg(feature = "toml")]
#[derive(Debug, Clone, Default)]
pub struct TomlFormat;

#[cfg(feature = "toml")]
impl DescriptorFormat for TomlFormat {
    fn extensions(&self) -> &[&'static str] {
        &["toml"]
    }

    fn serialize<T: Serialize>(&self, data: &T) -> Result<String> {
        toml::to_string_pretty(data).map_err(|e| Error::Serialize(e.to_string()))
    }

    fn deserialize<T: DeserializeOwned>(&self, content: &str) -> Result<T> {
        toml::from_str(content).map_err(|e| Error::Parse(e.to_string()))
    }
}

// =============================================================================
// YAML
// =============================================================================

/// YAML descriptor format
#[cfg(feature = "yaml")]
#[derive(Debug, Clone, Default)]
pub struct YamlFormat;

#[cfg(feature = "yaml")]
impl DescriptorFormat for YamlFormat {
    fn extensions(&self) -> &[&'static str] {
        &["yaml", "yml"]
    }

    fn serialize<T: Serialize>(&self, data: &T) -> Result<String> {
        serde_yaml::to_string(data).map_err(|e| Error::Serialize(e.to_string()))
    }

    fn deserialize<T: DeserializeOwned>(&self, content: &str) -> Result<T> {
        serde_yaml::from_str(content).map_err(|e| Error::Parse(e.to_string()))
    }
}

/// Whether a file extension maps to a format compiled into this build
pub(crate) fn is_supported_extension(ext: &str) -> bool {
    match ext {
        "json" => true,
        #[cfg(feature = "toml")]
        "toml" => true,
        #[cfg(feature = "yaml")]
        "yaml" | "yml" => true,
        _ => false,
    }
}

// =============================================================================
// Tests
// =============================================================================
