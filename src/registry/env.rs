//! Environment variable overrides for default settings

use crate::config::EnvSource;
use crate::descriptor::{DefaultSetting, SettingKind, parse_value};
use crate::error::Result;
use serde_json::Value;
use std::sync::Arc;

/// Handles environment variable lookups and parsing
pub(crate) struct EnvironmentHandler {
    prefix: Option<String>,
    source: Arc<dyn EnvSource>,
}

impl EnvironmentHandler {
    pub fn new(prefix: Option<String>, source: Arc<dyn EnvSource>) -> Self {
        Self { prefix, source }
    }

    /// Get the environment variable name for a setting
    ///
    /// Returns None if env var overrides are disabled.
    /// Format: {PREFIX}_{CATEGORY}_{SUBCATEGORY} (all uppercase)
    pub fn var_name(&self, category: &str, subcategory: &str) -> Option<String> {
        self.prefix.as_ref().map(|prefix| {
            let key = format!("{category}_{subcategory}")
                .chars()
                .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
                .collect::<String>()
                .to_uppercase();
            format!("{}_{key}", prefix.to_uppercase())
        })
    }

    /// Overridden value for a setting, parsed according to its kind
    ///
    /// Array overrides are comma separated.
    pub fn get_override(&self, setting: &DefaultSetting) -> Option<Result<Value>> {
        let name = self.var_name(&setting.category, &setting.subcategory)?;
        let raw = self.source.var(&name).ok()?;

        Some(match setting.kind {
            SettingKind::Array => Ok(Value::Array(
                raw.split(',')
                    .map(str::trim)
                    .filter(|item| !item.is_empty())
                    .map(|item| Value::String(item.to_string()))
                    .collect(),
            )),
            kind => parse_value(kind, &raw, &name),
        })
    }
}
