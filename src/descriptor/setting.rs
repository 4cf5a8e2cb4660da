//! Default settings seeded by a module

use super::serde_ext::{flag, is_false};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;

/// Value-type tag of a default setting
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SettingKind {
    /// One entry of a multi-valued setting; every row with the same
    /// category/subcategory contributes one element
    Array,
    #[default]
    Text,
    Numeric,
    Boolean,
}

impl SettingKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SettingKind::Array => "array",
            SettingKind::Text => "text",
            SettingKind::Numeric => "numeric",
            SettingKind::Boolean => "boolean",
        }
    }
}

/// A default setting row
///
/// Values are kept as text, the way the settings subsystem stores them;
/// [`DefaultSetting::typed_value`] converts according to [`SettingKind`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefaultSetting {
    #[serde(default)]
    pub uuid: String,

    #[serde(default)]
    pub category: String,

    #[serde(default)]
    pub subcategory: String,

    #[serde(rename = "type", default)]
    pub kind: SettingKind,

    #[serde(default)]
    pub value: String,

    #[serde(default, deserialize_with = "flag", skip_serializing_if = "is_false")]
    pub enabled: bool,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
}

impl DefaultSetting {
    /// Create an enabled setting
    pub fn new(
        uuid: impl Into<String>,
        category: impl Into<String>,
        subcategory: impl Into<String>,
        kind: SettingKind,
        value: impl Into<String>,
    ) -> Self {
        Self {
            uuid: uuid.into(),
            category: category.into(),
            subcategory: subcategory.into(),
            kind,
            value: value.into(),
            enabled: true,
            description: String::new(),
        }
    }

    #[must_use]
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Dotted key, e.g. `cdr.format`
    pub fn key(&self) -> String {
        format!("{}.{}", self.category, self.subcategory)
    }

    /// The value converted according to the value-type tag
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSettingValue`] when a numeric or boolean
    /// setting does not parse.
    pub fn typed_value(&self) -> Result<Value> {
        parse_value(self.kind, &self.value, &self.key())
    }
}

/// Convert a textual setting value to JSON
pub(crate) fn parse_value(kind: SettingKind, raw: &str, key: &str) -> Result<Value> {
    match kind {
        SettingKind::Text | SettingKind::Array => Ok(Value::String(raw.to_string())),
        SettingKind::Numeric => {
            let trimmed = raw.trim();
            if let Ok(n) = trimmed.parse::<i64>() {
                return Ok(Value::Number(n.into()));
            }
            trimmed
                .parse::<f64>()
                .ok()
                .and_then(serde_json::Number::from_f64)
                .map(Value::Number)
                .ok_or_else(|| Error::InvalidSettingValue {
                    key: key.to_string(),
                    reason: format!("'{raw}' is not numeric"),
                })
        }
        SettingKind::Boolean => match raw.trim().to_ascii_lowercase().as_str() {
            "true" => Ok(Value::Bool(true)),
            "false" => Ok(Value::Bool(false)),
            _ => Err(Error::InvalidSettingValue {
                key: key.to_string(),
                reason: format!("'{raw}' is not a boolean"),
            }),
        },
    }
}

/// Fold settings of one category into a subcategory-keyed object
///
/// `override_for` is consulted first for every setting; an override replaces
/// the whole subcategory (including every element of an array setting) and
/// applies even when the default is disabled.
pub(crate) fn resolve<'a, I, F>(settings: I, mut override_for: F) -> Result<Map<String, Value>>
where
    I: IntoIterator<Item = &'a DefaultSetting>,
    F: FnMut(&DefaultSetting) -> Option<Result<Value>>,
{
    let mut resolved = Map::new();
    let mut overridden: HashSet<String> = HashSet::new();

    for setting in settings {
        if overridden.contains(&setting.subcategory) {
            continue;
        }
        if let Some(value) = override_for(setting) {
            resolved.insert(setting.subcategory.clone(), value?);
            overridden.insert(setting.subcategory.clone());
            continue;
        }
        if !setting.enabled {
            continue;
        }

        let value = setting.typed_value()?;
        let existing = resolved.get_mut(&setting.subcategory);
        match (setting.kind, existing) {
            (SettingKind::Array, Some(Value::Array(items))) => items.push(value),
            (SettingKind::Array, None) => {
                resolved.insert(setting.subcategory.clone(), Value::Array(vec![value]));
            }
            (_, None) => {
                resolved.insert(setting.subcategory.clone(), value);
            }
            (kind, Some(_)) => {
                return Err(Error::InvalidSettingValue {
                    key: setting.key(),
                    reason: format!("{} row conflicts with an earlier value", kind.as_str()),
                });
            }
        }
    }

    Ok(resolved)
}
