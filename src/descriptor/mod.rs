//! Module descriptors
//!
//! A [`ModuleDescriptor`] is the typed form of one module's declarative
//! bundle: identity, localized descriptions, permissions, default settings
//! and table definitions.
//!
//! Descriptors are validated on load and never change afterwards. Share them
//! behind an `Arc` (the [`SchemaRegistry`](crate::SchemaRegistry) does) and
//! read them from any thread.
//!
//! ```rust
//! let descriptor = pbxdesc::load(r#"{
//!     "name": "Call Block",
//!     "uuid": "9ed63276-e085-4897-839c-4f2e36d92d6c",
//!     "permissions": [{"name": "call_block_view", "groups": ["admin", "superadmin"]}],
//!     "tables": [{
//!         "name": "v_call_block",
//!         "columns": [
//!             {"name": "call_block_uuid", "type": {"pgsql": "uuid", "sqlite": "text", "mysql": "char(36)"},
//!              "key": {"type": "primary"}},
//!             {"name": "call_block_name", "type": "text", "search": true}
//!         ]
//!     }]
//! }"#)?;
//!
//! assert_eq!(descriptor.permissions_for("admin").len(), 1);
//! assert!(descriptor.ddl_for("pgsql")?.contains("call_block_uuid uuid PRIMARY KEY"));
//! # Ok::<(), pbxdesc::Error>(())
//! ```

mod permission;
mod serde_ext;
mod setting;
mod table;

pub use permission::{MenuRef, Permission, groups};
pub use setting::{DefaultSetting, SettingKind};
pub use table::{
    ColumnDefinition, ColumnName, ColumnType, ForeignReference, KeyRole, TableDefinition,
};

pub(crate) use setting::{parse_value, resolve};

use crate::ddl::{self, DdlOptions, Dialect};
use crate::error::{Error, Result};
use crate::format::{DescriptorFormat, JsonFormat};
use log::debug;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use serde_ext::non_empty;
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;
use std::sync::LazyLock;

/// Locale used when a translation is missing
pub const DEFAULT_LOCALE: &str = "en-us";

static UUID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$")
        .expect("uuid pattern is valid")
});

static IDENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier pattern is valid"));

// =============================================================================
// Localized Text
// =============================================================================

/// Text keyed by locale (`en-us`, `de-de`, ...)
///
/// Locale keys are stored lowercase, however they were written.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    from = "BTreeMap<String, String>",
    into = "BTreeMap<String, String>"
)]
pub struct LocalizedText(BTreeMap<String, String>);

impl LocalizedText {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, locale: impl Into<String>, text: impl Into<String>) {
        self.0
            .insert(locale.into().to_ascii_lowercase(), text.into());
    }

    /// Translation for `locale`, falling back to [`DEFAULT_LOCALE`]
    ///
    /// Blank translations count as missing.
    pub fn get(&self, locale: &str) -> Option<&str> {
        let lookup = |key: &str| {
            self.0
                .get(&key.to_ascii_lowercase())
                .map(String::as_str)
                .filter(|s| !s.trim().is_empty())
        };
        lookup(locale).or_else(|| lookup(DEFAULT_LOCALE))
    }

    pub fn locales(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for LocalizedText {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into().to_ascii_lowercase(), v.into()))
                .collect(),
        )
    }
}

impl From<BTreeMap<String, String>> for LocalizedText {
    fn from(map: BTreeMap<String, String>) -> Self {
        map.into_iter().collect()
    }
}

impl From<LocalizedText> for BTreeMap<String, String> {
    fn from(text: LocalizedText) -> Self {
        text.0
    }
}

// =============================================================================
// Module Descriptor
// =============================================================================

/// Declarative metadata of one application module
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleDescriptor {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub uuid: String,

    #[serde(default)]
    pub category: String,

    #[serde(default, deserialize_with = "non_empty", skip_serializing_if = "Option::is_none")]
    pub subcategory: Option<String>,

    #[serde(default)]
    pub version: String,

    #[serde(default, deserialize_with = "non_empty", skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,

    #[serde(default, deserialize_with = "non_empty", skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(default, skip_serializing_if = "LocalizedText::is_empty")]
    pub description: LocalizedText,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub permissions: Vec<Permission>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub default_settings: Vec<DefaultSetting>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tables: Vec<TableDefinition>,
}

impl ModuleDescriptor {
    /// Start a descriptor in code
    ///
    /// Call [`validate`](Self::validate) (or hand it to the registry, which
    /// does) before relying on it.
    pub fn new(name: impl Into<String>, uuid: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            uuid: uuid.into(),
            category: String::new(),
            subcategory: None,
            version: String::new(),
            license: None,
            url: None,
            description: LocalizedText::default(),
            permissions: Vec::new(),
            default_settings: Vec::new(),
            tables: Vec::new(),
        }
    }

    #[must_use]
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    #[must_use]
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    #[must_use]
    pub fn describe(mut self, locale: impl Into<String>, text: impl Into<String>) -> Self {
        self.description.insert(locale, text);
        self
    }

    #[must_use]
    pub fn permission(mut self, permission: Permission) -> Self {
        self.permissions.push(permission);
        self
    }

    #[must_use]
    pub fn default_setting(mut self, setting: DefaultSetting) -> Self {
        self.default_settings.push(setting);
        self
    }

    #[must_use]
    pub fn table(mut self, table: TableDefinition) -> Self {
        self.tables.push(table);
        self
    }

    // =========================================================================
    // Loading
    // =========================================================================

    /// Parse and validate a descriptor in the given format
    ///
    /// # Errors
    ///
    /// [`Error::Parse`] for syntax errors, [`Error::MalformedDescriptor`]
    /// when required fields are missing or invariants are broken.
    pub fn from_str_with<F: DescriptorFormat>(content: &str, format: &F) -> Result<Self> {
        let descriptor: Self = format.deserialize(content)?;
        descriptor.validate()?;
        debug!(
            "Loaded module '{}' ({} permissions, {} settings, {} tables)",
            descriptor.name,
            descriptor.permissions.len(),
            descriptor.default_settings.len(),
            descriptor.tables.len()
        );
        Ok(descriptor)
    }

    /// Load a descriptor file, picking the format from its extension
    pub fn load_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        let content = std::fs::read_to_string(path).map_err(|e| Error::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;

        match ext.as_str() {
            "json" => Self::from_str_with(&content, &JsonFormat::new()),
            #[cfg(feature = "toml")]
            "toml" => Self::from_str_with(&content, &crate::format::TomlFormat),
            #[cfg(feature = "yaml")]
            "yaml" | "yml" => Self::from_str_with(&content, &crate::format::YamlFormat),
            _ => Err(Error::UnsupportedFormat(path.display().to_string())),
        }
    }

    /// Serialize in the given format
    pub fn to_string_with<F: DescriptorFormat>(&self, format: &F) -> Result<String> {
        format.serialize(self)
    }

    /// Check required fields and uniqueness invariants
    ///
    /// Foreign-key targets are not checked here; they usually live in other
    /// modules (see [`SchemaRegistry::dangling_references`](crate::SchemaRegistry::dangling_references)).
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::malformed("name", "module name is required"));
        }
        check_uuid("uuid", &self.uuid)?;

        let mut seen = HashSet::new();
        for (i, permission) in self.permissions.iter().enumerate() {
            if permission.name.trim().is_empty() {
                return Err(Error::malformed(
                    format!("permissions[{i}].name"),
                    "permission name is required",
                ));
            }
            if !seen.insert(permission.name.as_str()) {
                return Err(Error::malformed(
                    format!("permissions[{i}].name"),
                    format!("duplicate permission '{}'", permission.name),
                ));
            }
        }

        let mut kinds = HashMap::new();
        for (i, setting) in self.default_settings.iter().enumerate() {
            check_uuid(&format!("default_settings[{i}].uuid"), &setting.uuid)?;
            if setting.category.trim().is_empty() || setting.subcategory.trim().is_empty() {
                return Err(Error::malformed(
                    format!("default_settings[{i}]"),
                    "category and subcategory are required",
                ));
            }
            // every row of one setting shares a value type
            let kind = *kinds
                .entry((setting.category.as_str(), setting.subcategory.as_str()))
                .or_insert(setting.kind);
            if kind != setting.kind {
                return Err(Error::malformed(
                    format!("default_settings[{i}].type"),
                    format!(
                        "{} is declared as both {} and {}",
                        setting.key(),
                        kind.as_str(),
                        setting.kind.as_str()
                    ),
                ));
            }
        }

        let mut table_names = HashSet::new();
        for (i, table) in self.tables.iter().enumerate() {
            validate_table(i, table)?;
            if !table_names.insert(table.name.to_ascii_lowercase()) {
                return Err(Error::malformed(
                    format!("tables[{i}].name"),
                    format!("duplicate table '{}'", table.name),
                ));
            }
        }

        Ok(())
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Localized description with fallback to [`DEFAULT_LOCALE`]
    pub fn description(&self, locale: &str) -> Option<&str> {
        self.description.get(locale)
    }

    pub fn get_permission(&self, name: &str) -> Option<&Permission> {
        self.permissions.iter().find(|p| p.name == name)
    }

    /// Permissions granted to `group`, in declaration order
    pub fn permissions_for(&self, group: &str) -> Vec<&Permission> {
        self.permissions
            .iter()
            .filter(|p| p.is_granted_to(group))
            .collect()
    }

    /// Whether `group` holds `permission` by default
    pub fn is_granted(&self, group: &str, permission: &str) -> bool {
        self.get_permission(permission)
            .is_some_and(|p| p.is_granted_to(group))
    }

    /// Default settings of a category, in declaration order
    pub fn default_settings_for(&self, category: &str) -> Vec<&DefaultSetting> {
        self.default_settings
            .iter()
            .filter(|s| s.category == category)
            .collect()
    }

    /// Enabled defaults of a category keyed by subcategory
    ///
    /// `array` settings are collected into JSON arrays.
    pub fn resolve_settings(&self, category: &str) -> Result<Map<String, Value>> {
        resolve(self.default_settings_for(category), |_| None)
    }

    pub fn get_table(&self, name: &str) -> Option<&TableDefinition> {
        self.tables
            .iter()
            .find(|t| t.name.eq_ignore_ascii_case(name))
    }

    // =========================================================================
    // DDL
    // =========================================================================

    /// `CREATE TABLE` statements for every table, for a dialect named by
    /// string (`pgsql`, `mysql`, `sqlite`)
    ///
    /// # Errors
    ///
    /// [`Error::UnsupportedDialect`] when the dialect is unknown or a column
    /// has neither a type for it nor a generic type.
    pub fn ddl_for(&self, dialect: &str) -> Result<String> {
        let dialect: Dialect = dialect.parse()?;
        self.ddl_for_with(dialect, &DdlOptions::default())
    }

    pub fn ddl_for_with(&self, dialect: Dialect, options: &DdlOptions) -> Result<String> {
        let ordered = ddl::creation_order(self.tables.iter().collect())?;
        ddl::render_tables(ordered, dialect, options)
    }

    /// SHA-256 over the canonical JSON of the tables
    ///
    /// Changes whenever a table, column, type or key changes; descriptions
    /// and permissions do not affect it.
    pub fn schema_fingerprint(&self) -> Result<String> {
        let canonical = serde_json::to_vec(&self.tables)?;
        let mut hasher = Sha256::new();
        hasher.update(&canonical);
        Ok(format!("{:x}", hasher.finalize()))
    }
}

fn check_uuid(field: &str, uuid: &str) -> Result<()> {
    if uuid.trim().is_empty() {
        return Err(Error::malformed(field, "uuid is required"));
    }
    if !UUID_RE.is_match(uuid) {
        return Err(Error::malformed(field, format!("'{uuid}' is not a uuid")));
    }
    Ok(())
}

fn check_identifier(field: &str, name: &str) -> Result<()> {
    if !IDENT_RE.is_match(name) {
        return Err(Error::malformed(
            field,
            format!("'{name}' is not a valid SQL identifier"),
        ));
    }
    Ok(())
}

fn validate_table(index: usize, table: &TableDefinition) -> Result<()> {
    if table.name.trim().is_empty() {
        return Err(Error::malformed(
            format!("tables[{index}].name"),
            "table name is required",
        ));
    }
    check_identifier(&format!("tables[{index}].name"), &table.name)?;
    if let Some(parent) = &table.parent {
        check_identifier(&format!("tables[{index}].parent"), parent)?;
    }
    if table.active_columns().next().is_none() {
        return Err(Error::malformed(
            format!("tables[{index}].columns"),
            format!("{} has no columns to create", table.name),
        ));
    }

    let mut names = HashSet::new();
    for (i, column) in table.columns.iter().enumerate() {
        let field = format!("tables[{index}].columns[{i}]");
        check_identifier(&format!("{field}.name"), &column.name.text)?;
        if !names.insert(column.name.text.to_ascii_lowercase()) {
            return Err(Error::malformed(
                format!("{field}.name"),
                format!("duplicate column '{}' in {}", column.name.text, table.name),
            ));
        }
        if let Some(old) = &column.name.deprecated {
            check_identifier(&format!("{field}.name.deprecated"), old)?;
        }
        if let Some(reference) = column.key.reference() {
            check_identifier(&format!("{field}.key.reference.table"), &reference.table)?;
            check_identifier(&format!("{field}.key.reference.field"), &reference.field)?;
        }
    }

    // an old name may not shadow another column's current name
    for (i, column) in table.columns.iter().enumerate() {
        if let Some(old) = &column.name.deprecated {
            if table
                .columns
                .iter()
                .any(|other| other.name.text.eq_ignore_ascii_case(old))
            {
                return Err(Error::malformed(
                    format!("tables[{index}].columns[{i}].name.deprecated"),
                    format!("'{old}' is already a column of {}", table.name),
                ));
            }
        }
    }

    Ok(())
}
