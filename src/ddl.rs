//! Dialect-specific DDL rendering
//!
//! Column types are substituted per [`Dialect`]: the dialect's own type when
//! the column declares one, the generic type otherwise. A column with
//! neither is an [`Error::UnsupportedDialect`].
//!
//! Statements are plain strings; executing them is up to the caller.

use crate::descriptor::{ColumnDefinition, TableDefinition};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::str::FromStr;

/// Supported database dialects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// PostgreSQL
    Pgsql,
    /// MySQL / MariaDB
    Mysql,
    /// SQLite
    Sqlite,
}

impl Dialect {
    pub const ALL: [Dialect; 3] = [Dialect::Pgsql, Dialect::Mysql, Dialect::Sqlite];

    pub fn as_str(self) -> &'static str {
        match self {
            Dialect::Pgsql => "pgsql",
            Dialect::Mysql => "mysql",
            Dialect::Sqlite => "sqlite",
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Dialect {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pgsql" | "postgres" | "postgresql" => Ok(Dialect::Pgsql),
            "mysql" | "mariadb" => Ok(Dialect::Mysql),
            "sqlite" | "sqlite3" => Ok(Dialect::Sqlite),
            _ => Err(Error::UnsupportedDialect {
                dialect: s.to_string(),
                reason: "column types are only declared for pgsql, mysql and sqlite".into(),
            }),
        }
    }
}

/// Rendering options
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DdlOptions {
    /// Emit `CREATE TABLE IF NOT EXISTS`
    pub if_not_exists: bool,
    /// Also create columns flagged deprecated
    pub include_deprecated: bool,
    /// Emit table-level `FOREIGN KEY ... REFERENCES` clauses
    pub foreign_keys: bool,
}

impl DdlOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn if_not_exists(mut self) -> Self {
        self.if_not_exists = true;
        self
    }

    #[must_use]
    pub fn include_deprecated(mut self) -> Self {
        self.include_deprecated = true;
        self
    }

    #[must_use]
    pub fn foreign_keys(mut self) -> Self {
        self.foreign_keys = true;
        self
    }
}

/// Resolved type of a column for a dialect
pub fn column_type<'a>(
    table: &TableDefinition,
    column: &'a ColumnDefinition,
    dialect: Dialect,
) -> Result<&'a str> {
    column
        .column_type
        .for_dialect(dialect)
        .ok_or_else(|| Error::UnsupportedDialect {
            dialect: dialect.to_string(),
            reason: format!(
                "column {}.{} has no {dialect} type and no generic type",
                table.name,
                column.name()
            ),
        })
}

/// `CREATE TABLE` statement for one table
pub fn create_table(
    table: &TableDefinition,
    dialect: Dialect,
    options: &DdlOptions,
) -> Result<String> {
    let columns: Vec<&ColumnDefinition> = table
        .columns
        .iter()
        .filter(|c| options.include_deprecated || !c.deprecated)
        .collect();

    if columns.is_empty() {
        return Err(Error::malformed(
            format!("{}.columns", table.name),
            "table has no columns to create",
        ));
    }

    let mut clauses = Vec::with_capacity(columns.len());
    for column in &columns {
        let ty = column_type(table, column, dialect)?;
        let mut clause = format!("{} {ty}", column.name());
        if column.key.is_primary() {
            clause.push_str(" PRIMARY KEY");
        }
        clauses.push(clause);
    }

    if options.foreign_keys {
        for column in &columns {
            if let Some(reference) = column.key.reference() {
                clauses.push(format!(
                    "FOREIGN KEY ({}) REFERENCES {} ({})",
                    column.name(),
                    reference.table,
                    reference.field
                ));
            }
        }
    }

    let head = if options.if_not_exists {
        "CREATE TABLE IF NOT EXISTS"
    } else {
        "CREATE TABLE"
    };
    Ok(format!(
        "{head} {} (\n\t{}\n);",
        table.name,
        clauses.join(",\n\t")
    ))
}

/// Statements that bring an existing table up to the declared columns
///
/// `existing` lists the column names currently in the database. Columns
/// found under their deprecated name are renamed, columns missing entirely
/// are added. Deprecated columns are left alone.
pub fn upgrade_statements(
    table: &TableDefinition,
    dialect: Dialect,
    existing: &[&str],
) -> Result<Vec<String>> {
    let present = |name: &str| existing.iter().any(|e| e.eq_ignore_ascii_case(name));
    let mut statements = Vec::new();

    for column in table.active_columns() {
        if present(column.name()) {
            continue;
        }
        match column.name.deprecated.as_deref() {
            Some(old) if present(old) => statements.push(format!(
                "ALTER TABLE {} RENAME COLUMN {old} TO {};",
                table.name,
                column.name()
            )),
            _ => statements.push(format!(
                "ALTER TABLE {} ADD COLUMN {} {};",
                table.name,
                column.name(),
                column_type(table, column, dialect)?
            )),
        }
    }

    Ok(statements)
}

/// Render tables in the given order, one statement per table
pub fn render_tables<'a, I>(tables: I, dialect: Dialect, options: &DdlOptions) -> Result<String>
where
    I: IntoIterator<Item = &'a TableDefinition>,
{
    let statements = tables
        .into_iter()
        .map(|t| create_table(t, dialect, options))
        .collect::<Result<Vec<_>>>()?;
    Ok(statements.join("\n\n"))
}

/// Order tables so parents and foreign-key targets come first
///
/// Only dependencies on tables in `tables` count; references to tables
/// defined elsewhere are ignored. Among tables that are ready, the input
/// order is kept.
pub fn creation_order(tables: Vec<&TableDefinition>) -> Result<Vec<&TableDefinition>> {
    let index: HashMap<String, usize> = tables
        .iter()
        .enumerate()
        .map(|(i, t)| (t.name.to_ascii_lowercase(), i))
        .collect();

    let mut in_degree = vec![0usize; tables.len()];
    let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); tables.len()];

    for (i, table) in tables.iter().enumerate() {
        let mut deps = BTreeSet::new();
        if let Some(parent) = &table.parent {
            deps.insert(parent.to_ascii_lowercase());
        }
        for (_, reference) in table.foreign_keys() {
            deps.insert(reference.table.to_ascii_lowercase());
        }
        for dep in deps {
            match index.get(&dep) {
                Some(&j) if j != i => {
                    in_degree[i] += 1;
                    dependents[j].push(i);
                }
                _ => {}
            }
        }
    }

    // Kahn's algorithm, smallest index first
    let mut ready: BTreeSet<usize> = (0..tables.len()).filter(|&i| in_degree[i] == 0).collect();
    let mut order = Vec::with_capacity(tables.len());

    while let Some(i) = ready.pop_first() {
        order.push(tables[i]);
        for &dependent in &dependents[i] {
            in_degree[dependent] -= 1;
            if in_degree[dependent] == 0 {
                ready.insert(dependent);
            }
        }
    }

    if order.len() != tables.len() {
        let stuck: Vec<&str> = (0..tables.len())
            .filter(|&i| in_degree[i] > 0)
            .map(|i| tables[i].name.as_str())
            .collect();
        return Err(Error::CircularDependency(stuck.join(", ")));
    }

    Ok(order)
}
