//! # pbxdesc - PBX module descriptors
//!
//! Typed, validated descriptors for the modules of a PBX admin framework, and
//! the dialect-specific DDL that creates their tables.
//!
//! ## Features
//!
//! - **Descriptors**: Module identity, localized descriptions, permissions,
//!   default settings and table definitions as plain Rust types
//! - **Validation**: Required fields, uuid and identifier format, uniqueness
//! - **DDL**: `CREATE TABLE` for PostgreSQL, MySQL and SQLite with per-column
//!   type substitution and rename-aware upgrades
//! - **Registry**: Many modules loaded once and shared read-only, with
//!   environment overrides for default settings
//! - **Formats**: JSON always; TOML and YAML behind the `toml` / `yaml` features
//!
//! ## Quick Start
//!
//! ```rust
//! use pbxdesc::SchemaRegistry;
//!
//! let registry = SchemaRegistry::builder()
//!     .with_builtin_modules()
//!     .build()?;
//!
//! // Permissions the admin group gets by default
//! let admin = registry.permissions_for("admin");
//! assert!(admin.iter().any(|p| p.name == "xml_cdr_view"));
//!
//! // Seed values for the "cdr" settings category
//! let cdr = registry.resolve_settings("cdr")?;
//! assert_eq!(cdr["limit"], 800);
//!
//! // Schema for a fresh PostgreSQL install
//! let ddl = registry.ddl_for("pgsql")?;
//! assert!(ddl.contains("xml_cdr_uuid uuid PRIMARY KEY"));
//! # Ok::<(), pbxdesc::Error>(())
//! ```
//!
//! ## Loading Descriptors
//!
//! ```rust,no_run
//! use pbxdesc::{Dialect, DdlOptions, ModuleDescriptor, SchemaRegistry};
//!
//! # fn example() -> pbxdesc::Result<()> {
//! // A single file; the format follows the extension
//! let module = ModuleDescriptor::load_file("modules/call_block.json")?;
//! println!("{}", module.ddl_for_with(Dialect::Sqlite, &DdlOptions::new().if_not_exists())?);
//!
//! // Every descriptor in a directory, plus the built-in ones
//! let registry = SchemaRegistry::builder()
//!     .descriptor_dir("~/.local/share/pbx/modules")
//!     .with_builtin_modules()
//!     .with_env_prefix("PBX") // PBX_CDR_LIMIT=1000 overrides cdr.limit
//!     .build()?;
//!
//! for dangling in registry.dangling_references() {
//!     println!("{}.{} -> {}", dangling.table, dangling.column, dangling.target_table);
//! }
//! # Ok(())
//! # }
//! ```

// Core modules
mod ddl;
mod descriptor;
mod docs;
mod error;
mod registry;

// Grouped modules
pub mod builtin;
pub mod config;
pub mod format;

// Re-exports from core
pub use ddl::{DdlOptions, Dialect};
pub use descriptor::{
    ColumnDefinition, ColumnName, ColumnType, DEFAULT_LOCALE, DefaultSetting, ForeignReference,
    KeyRole, LocalizedText, MenuRef, ModuleDescriptor, Permission, SettingKind, TableDefinition,
    groups,
};
pub use docs::{DocsConfig, generate_docs};
pub use error::{Error, Result};
pub use registry::{DanglingKind, DanglingReference, RegistryBuilder, SchemaRegistry};

// Re-exports from config
pub use config::{DefaultEnvSource, EnvSource, RegistryConfig, RegistryConfigBuilder};

// Format re-exports
pub use format::{DescriptorFormat, JsonFormat};
#[cfg(feature = "toml")]
pub use format::TomlFormat;
#[cfg(feature = "yaml")]
pub use format::YamlFormat;

/// Parse and validate a JSON descriptor
///
/// # Errors
///
/// [`Error::Parse`] for invalid JSON, [`Error::MalformedDescriptor`] when
/// the name, uuid or a table name is missing or an invariant is broken.
pub fn load(content: &str) -> Result<ModuleDescriptor> {
    ModuleDescriptor::from_str_with(content, &JsonFormat::new())
}
