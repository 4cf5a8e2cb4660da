//! Schema registry
//!
//! The registry owns every loaded [`ModuleDescriptor`] and answers the
//! host's questions across all of them: which permissions a group holds,
//! what the default settings of a category resolve to, and which DDL creates
//! the whole schema.
//!
//! It is built once at startup and never mutated, so an `Arc<SchemaRegistry>`
//! can be read from any number of threads without locking.

mod builder;
mod env;

pub use builder::RegistryBuilder;

use crate::builtin;
use crate::config::RegistryConfig;
use crate::ddl::{self, DdlOptions, Dialect};
use crate::descriptor::{DefaultSetting, ModuleDescriptor, Permission, TableDefinition, resolve};
use crate::error::{Error, Result};
use crate::format::is_supported_extension;
use env::EnvironmentHandler;
use log::{debug, info, warn};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Why a foreign key could not be resolved inside the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DanglingKind {
    MissingTable,
    MissingColumn,
}

/// A foreign key whose target is not registered
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DanglingReference {
    pub module: String,
    pub table: String,
    pub column: String,
    pub target_table: String,
    pub target_field: String,
    pub kind: DanglingKind,
}

/// Read-only collection of module descriptors
pub struct SchemaRegistry {
    modules: Vec<Arc<ModuleDescriptor>>,
    env: EnvironmentHandler,
}

impl std::fmt::Debug for SchemaRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaRegistry")
            .field(
                "modules",
                &self.modules.iter().map(|m| m.name.as_str()).collect::<Vec<_>>(),
            )
            .finish_non_exhaustive()
    }
}

impl SchemaRegistry {
    /// Create a new builder
    ///
    /// # Example
    ///
    /// ```rust
    /// use pbxdesc::SchemaRegistry;
    ///
    /// let registry = SchemaRegistry::builder()
    ///     .with_builtin_modules()
    ///     .with_env_prefix("PBX")
    ///     .build()?;
    ///
    /// assert!(registry.module("XML CDR").is_ok());
    /// # Ok::<(), pbxdesc::Error>(())
    /// ```
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// Load every descriptor the config points at
    ///
    /// # Errors
    ///
    /// Fails on the first descriptor that cannot be read or validated, and
    /// when two descriptors share a uuid or a table name.
    pub fn new(config: RegistryConfig) -> Result<Self> {
        Self::with_descriptors(config, Vec::new())
    }

    pub(crate) fn with_descriptors(
        config: RegistryConfig,
        extra: Vec<ModuleDescriptor>,
    ) -> Result<Self> {
        let mut descriptors = Vec::new();

        if config.include_builtin {
            descriptors.extend(builtin::modules()?);
        }
        for dir in &config.descriptor_dirs {
            descriptors.extend(load_dir(dir)?);
        }
        for descriptor in extra {
            descriptor.validate()?;
            descriptors.push(descriptor);
        }

        check_unique(&descriptors)?;

        info!("Schema registry ready with {} module(s)", descriptors.len());

        Ok(Self {
            modules: descriptors.into_iter().map(Arc::new).collect(),
            env: EnvironmentHandler::new(config.env_prefix, config.env_source),
        })
    }

    // =========================================================================
    // Modules
    // =========================================================================

    pub fn modules(&self) -> &[Arc<ModuleDescriptor>] {
        &self.modules
    }

    /// Look up a module by uuid or (case-insensitive) name
    pub fn module(&self, name_or_uuid: &str) -> Result<&Arc<ModuleDescriptor>> {
        self.modules
            .iter()
            .find(|m| m.uuid.eq_ignore_ascii_case(name_or_uuid))
            .or_else(|| {
                self.modules
                    .iter()
                    .find(|m| m.name.eq_ignore_ascii_case(name_or_uuid))
            })
            .ok_or_else(|| Error::ModuleNotFound(name_or_uuid.to_string()))
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    // =========================================================================
    // Permissions
    // =========================================================================

    /// Permissions granted to `group` across all modules
    pub fn permissions_for(&self, group: &str) -> Vec<&Permission> {
        self.modules
            .iter()
            .flat_map(|m| m.permissions_for(group))
            .collect()
    }

    pub fn is_granted(&self, group: &str, permission: &str) -> bool {
        self.modules.iter().any(|m| m.is_granted(group, permission))
    }

    // =========================================================================
    // Settings
    // =========================================================================

    /// Default settings of a category across all modules
    pub fn default_settings_for(&self, category: &str) -> Vec<&DefaultSetting> {
        self.modules
            .iter()
            .flat_map(|m| m.default_settings_for(category))
            .collect()
    }

    /// Effective settings of a category keyed by subcategory
    ///
    /// Enabled defaults, with environment overrides applied on top when an
    /// env prefix is configured. Descriptors are left untouched.
    pub fn resolve_settings(&self, category: &str) -> Result<Map<String, Value>> {
        resolve(self.default_settings_for(category), |setting| {
            let value = self.env.get_override(setting);
            if value.is_some() {
                debug!("Setting {} overridden from environment", setting.key());
            }
            value
        })
    }

    // =========================================================================
    // Schema
    // =========================================================================

    /// Every table of every module, in registration order
    pub fn tables(&self) -> impl Iterator<Item = &TableDefinition> {
        self.modules.iter().flat_map(|m| m.tables.iter())
    }

    pub fn get_table(&self, name: &str) -> Option<&TableDefinition> {
        self.tables().find(|t| t.name.eq_ignore_ascii_case(name))
    }

    /// `CREATE TABLE` statements for the whole schema
    ///
    /// Tables are ordered so that parents and foreign-key targets come first.
    pub fn ddl_for(&self, dialect: &str) -> Result<String> {
        let dialect: Dialect = dialect.parse()?;
        self.ddl_for_with(dialect, &DdlOptions::default())
    }

    pub fn ddl_for_with(&self, dialect: Dialect, options: &DdlOptions) -> Result<String> {
        let ordered = ddl::creation_order(self.tables().collect())?;
        ddl::render_tables(ordered, dialect, options)
    }

    /// Foreign keys pointing at tables or columns not in this registry
    pub fn dangling_references(&self) -> Vec<DanglingReference> {
        let mut dangling = Vec::new();

        for module in &self.modules {
            for table in &module.tables {
                for (column, reference) in table.foreign_keys() {
                    let kind = match self.get_table(&reference.table) {
                        None => DanglingKind::MissingTable,
                        Some(target) if target.get_column(&reference.field).is_none() => {
                            DanglingKind::MissingColumn
                        }
                        Some(_) => continue,
                    };
                    dangling.push(DanglingReference {
                        module: module.name.clone(),
                        table: table.name.clone(),
                        column: column.name().to_string(),
                        target_table: reference.table.clone(),
                        target_field: reference.field.clone(),
                        kind,
                    });
                }
            }
        }

        dangling
    }
}

/// Load every supported descriptor file in a directory, sorted by file name
fn load_dir(dir: &Path) -> Result<Vec<ModuleDescriptor>> {
    let entries = std::fs::read_dir(dir).map_err(|e| Error::DirectoryRead {
        path: dir.to_path_buf(),
        source: e,
    })?;

    let mut paths: Vec<PathBuf> = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| Error::DirectoryRead {
            path: dir.to_path_buf(),
            source: e,
        })?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let supported = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| is_supported_extension(&e.to_ascii_lowercase()));
        if supported {
            paths.push(path);
        } else {
            debug!("Skipping {}: not a descriptor file", path.display());
        }
    }
    paths.sort();

    let descriptors = paths
        .iter()
        .map(ModuleDescriptor::load_file)
        .collect::<Result<Vec<_>>>()?;

    if descriptors.is_empty() {
        warn!("No descriptors found in {}", dir.display());
    } else {
        debug!("Loaded {} descriptor(s) from {}", descriptors.len(), dir.display());
    }

    Ok(descriptors)
}

/// Module uuids and table names must be unique across the registry
fn check_unique(descriptors: &[ModuleDescriptor]) -> Result<()> {
    let mut uuids: HashMap<String, &str> = HashMap::new();
    let mut tables: HashMap<String, &str> = HashMap::new();

    for descriptor in descriptors {
        if uuids
            .insert(descriptor.uuid.to_ascii_lowercase(), &descriptor.name)
            .is_some()
        {
            return Err(Error::DuplicateModule {
                name: descriptor.name.clone(),
                uuid: descriptor.uuid.clone(),
            });
        }
        for table in &descriptor.tables {
            if let Some(owner) = tables.insert(table.name.to_ascii_lowercase(), &descriptor.name) {
                return Err(Error::malformed(
                    format!("{}.tables", descriptor.name),
                    format!("table '{}' is already declared by module '{owner}'", table.name),
                ));
            }
        }
    }

    Ok(())
}
