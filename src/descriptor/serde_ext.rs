//! Serde helpers for loosely typed descriptor fields
//!
//! Descriptors exported from older admin tools write flags as `"true"` /
//! `"false"` strings and use `""` for "no value".

use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum LooseFlag {
    Bool(bool),
    Text(String),
}

/// Accept `true`, `false`, `"true"`, `"false"` and `""` (false)
pub(crate) fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    match LooseFlag::deserialize(deserializer)? {
        LooseFlag::Bool(value) => Ok(value),
        LooseFlag::Text(text) => match text.trim().to_ascii_lowercase().as_str() {
            "true" => Ok(true),
            "false" | "" => Ok(false),
            other => Err(serde::de::Error::custom(format!(
                "expected a boolean flag, got \"{other}\""
            ))),
        },
    }
}

/// Treat blank strings as absent
pub(crate) fn non_empty<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}

#[allow(clippy::trivially_copy_pass_by_ref)]
pub(crate) fn is_false(value: &bool) -> bool {
    !*value
}
