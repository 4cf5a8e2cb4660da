//! Table and column definitions

use super::LocalizedText;
use super::serde_ext::{flag, is_false, non_empty};
use crate::ddl::{self, DdlOptions, Dialect};
use crate::error::Result;
use serde::{Deserialize, Serialize};

// =============================================================================
// Column Name
// =============================================================================

/// Current column name plus the name it had in older schemas, if renamed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawColumnName", into = "RawColumnName")]
pub struct ColumnName {
    pub text: String,
    pub deprecated: Option<String>,
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum RawColumnName {
    Plain(String),
    Aliased {
        text: String,
        #[serde(default, deserialize_with = "non_empty", skip_serializing_if = "Option::is_none")]
        deprecated: Option<String>,
    },
}

impl From<RawColumnName> for ColumnName {
    fn from(raw: RawColumnName) -> Self {
        match raw {
            RawColumnName::Plain(text) => Self {
                text,
                deprecated: None,
            },
            RawColumnName::Aliased { text, deprecated } => Self { text, deprecated },
        }
    }
}

impl From<ColumnName> for RawColumnName {
    fn from(name: ColumnName) -> Self {
        match name.deprecated {
            None => RawColumnName::Plain(name.text),
            Some(deprecated) => RawColumnName::Aliased {
                text: name.text,
                deprecated: Some(deprecated),
            },
        }
    }
}

impl From<&str> for ColumnName {
    fn from(text: &str) -> Self {
        Self {
            text: text.to_string(),
            deprecated: None,
        }
    }
}

// =============================================================================
// Column Type
// =============================================================================

/// Column type per dialect with an optional generic fallback
///
/// Written either as a single string (generic) or as a map keyed by
/// `pgsql` / `mysql` / `sqlite` / `generic`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawColumnType", into = "RawColumnType")]
pub struct ColumnType {
    pub generic: Option<String>,
    pub pgsql: Option<String>,
    pub mysql: Option<String>,
    pub sqlite: Option<String>,
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum RawColumnType {
    Generic(String),
    PerDialect(DialectTypes),
}

#[derive(Default, Serialize, Deserialize)]
struct DialectTypes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    generic: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pgsql: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    mysql: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    sqlite: Option<String>,
}

impl From<RawColumnType> for ColumnType {
    fn from(raw: RawColumnType) -> Self {
        match raw {
            RawColumnType::Generic(generic) => Self {
                generic: Some(generic),
                ..Default::default()
            },
            RawColumnType::PerDialect(types) => Self {
                generic: types.generic,
                pgsql: types.pgsql,
                mysql: types.mysql,
                sqlite: types.sqlite,
            },
        }
    }
}

impl From<ColumnType> for RawColumnType {
    fn from(ty: ColumnType) -> Self {
        match ty {
            ColumnType {
                generic: Some(generic),
                pgsql: None,
                mysql: None,
                sqlite: None,
            } => RawColumnType::Generic(generic),
            ColumnType {
                generic,
                pgsql,
                mysql,
                sqlite,
            } => RawColumnType::PerDialect(DialectTypes {
                generic,
                pgsql,
                mysql,
                sqlite,
            }),
        }
    }
}

impl ColumnType {
    /// Same type on every dialect
    pub fn generic(ty: impl Into<String>) -> Self {
        Self {
            generic: Some(ty.into()),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn pgsql(mut self, ty: impl Into<String>) -> Self {
        self.pgsql = Some(ty.into());
        self
    }

    #[must_use]
    pub fn mysql(mut self, ty: impl Into<String>) -> Self {
        self.mysql = Some(ty.into());
        self
    }

    #[must_use]
    pub fn sqlite(mut self, ty: impl Into<String>) -> Self {
        self.sqlite = Some(ty.into());
        self
    }

    /// Dialect-specific type, falling back to the generic one
    pub fn for_dialect(&self, dialect: Dialect) -> Option<&str> {
        let specific = match dialect {
            Dialect::Pgsql => self.pgsql.as_deref(),
            Dialect::Mysql => self.mysql.as_deref(),
            Dialect::Sqlite => self.sqlite.as_deref(),
        };
        specific.or(self.generic.as_deref())
    }

    pub fn is_empty(&self) -> bool {
        self.generic.is_none()
            && self.pgsql.is_none()
            && self.mysql.is_none()
            && self.sqlite.is_none()
    }
}

// =============================================================================
// Keys
// =============================================================================

/// Target of a foreign key
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ForeignReference {
    pub table: String,
    pub field: String,
}

/// Key role of a column
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum KeyRole {
    #[default]
    None,
    Primary,
    Foreign { reference: ForeignReference },
}

impl KeyRole {
    pub fn is_none(&self) -> bool {
        matches!(self, KeyRole::None)
    }

    pub fn is_primary(&self) -> bool {
        matches!(self, KeyRole::Primary)
    }

    pub fn reference(&self) -> Option<&ForeignReference> {
        match self {
            KeyRole::Foreign { reference } => Some(reference),
            _ => None,
        }
    }
}

// =============================================================================
// Column / Table
// =============================================================================

/// A single column of a table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDefinition {
    pub name: ColumnName,

    #[serde(rename = "type", default, skip_serializing_if = "ColumnType::is_empty")]
    pub column_type: ColumnType,

    #[serde(default, skip_serializing_if = "KeyRole::is_none")]
    pub key: KeyRole,

    /// Shown as a search field in list views
    #[serde(default, deserialize_with = "flag", skip_serializing_if = "is_false")]
    pub search: bool,

    /// Kept for old installs only, not created on new ones
    #[serde(default, deserialize_with = "flag", skip_serializing_if = "is_false")]
    pub deprecated: bool,

    #[serde(default, skip_serializing_if = "LocalizedText::is_empty")]
    pub description: LocalizedText,
}

impl ColumnDefinition {
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: ColumnName {
                text: name.into(),
                deprecated: None,
            },
            column_type,
            key: KeyRole::None,
            search: false,
            deprecated: false,
            description: LocalizedText::default(),
        }
    }

    /// Current name
    pub fn name(&self) -> &str {
        &self.name.text
    }

    /// Name used by older schemas
    #[must_use]
    pub fn renamed_from(mut self, old: impl Into<String>) -> Self {
        self.name.deprecated = Some(old.into());
        self
    }

    #[must_use]
    pub fn primary_key(mut self) -> Self {
        self.key = KeyRole::Primary;
        self
    }

    #[must_use]
    pub fn foreign_key(mut self, table: impl Into<String>, field: impl Into<String>) -> Self {
        self.key = KeyRole::Foreign {
            reference: ForeignReference {
                table: table.into(),
                field: field.into(),
            },
        };
        self
    }

    #[must_use]
    pub fn searchable(mut self) -> Self {
        self.search = true;
        self
    }

    #[must_use]
    pub fn deprecated(mut self) -> Self {
        self.deprecated = true;
        self
    }

    #[must_use]
    pub fn describe(mut self, locale: impl Into<String>, text: impl Into<String>) -> Self {
        self.description.insert(locale, text);
        self
    }

    /// Whether `name` is this column's current or deprecated name
    pub fn answers_to(&self, name: &str) -> bool {
        self.name.text.eq_ignore_ascii_case(name)
            || self
                .name
                .deprecated
                .as_deref()
                .is_some_and(|old| old.eq_ignore_ascii_case(name))
    }
}

/// A table and its ordered columns
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDefinition {
    #[serde(default)]
    pub name: String,

    #[serde(default, deserialize_with = "non_empty", skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,

    #[serde(default)]
    pub columns: Vec<ColumnDefinition>,
}

impl TableDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            columns: Vec::new(),
        }
    }

    #[must_use]
    pub fn parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    #[must_use]
    pub fn column(mut self, column: ColumnDefinition) -> Self {
        self.columns.push(column);
        self
    }

    /// Look up a column by current or deprecated name
    pub fn get_column(&self, name: &str) -> Option<&ColumnDefinition> {
        self.columns
            .iter()
            .find(|c| c.name.text.eq_ignore_ascii_case(name))
            .or_else(|| self.columns.iter().find(|c| c.answers_to(name)))
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(ColumnDefinition::name).collect()
    }

    pub fn primary_key(&self) -> Option<&ColumnDefinition> {
        self.columns.iter().find(|c| c.key.is_primary())
    }

    /// Columns flagged for search fields
    pub fn searchable_columns(&self) -> impl Iterator<Item = &ColumnDefinition> {
        self.columns.iter().filter(|c| c.search)
    }

    /// Columns created on a fresh install
    pub fn active_columns(&self) -> impl Iterator<Item = &ColumnDefinition> {
        self.columns.iter().filter(|c| !c.deprecated)
    }

    /// `(column, reference)` for every foreign key
    pub fn foreign_keys(&self) -> impl Iterator<Item = (&ColumnDefinition, &ForeignReference)> {
        self.columns
            .iter()
            .filter_map(|c| c.key.reference().map(|r| (c, r)))
    }

    /// `CREATE TABLE` statement for this table alone
    pub fn create_statement(&self, dialect: Dialect, options: &DdlOptions) -> Result<String> {
        ddl::create_table(self, dialect, options)
    }

    /// `ALTER TABLE` statements for a table that already exists with the
    /// given columns
    pub fn upgrade_statements(&self, dialect: Dialect, existing: &[&str]) -> Result<Vec<String>> {
        ddl::upgrade_statements(self, dialect, existing)
    }
}
