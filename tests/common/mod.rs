//! Common test utilities for pbxdesc integration tests
//!
//! Provides shared descriptors, an in-memory environment and helpers for
//! on-disk descriptor directories.

#![allow(dead_code)]

use pbxdesc::{
    ColumnDefinition, ColumnType, DefaultSetting, EnvSource, ModuleDescriptor, Permission,
    SettingKind, TableDefinition, groups,
};
use std::collections::HashMap;
use std::env::VarError;
use std::path::Path;
use tempfile::TempDir;

pub const DOMAINS_UUID: &str = "8b91605b-f6d2-42e6-a56d-5d1ded01bb44";
pub const CALL_BLOCK_UUID: &str = "9ed63276-e085-4897-839c-4f2e36d92d6c";

/// JSON form of the call block module
pub const CALL_BLOCK_JSON: &str = r#"{
    "name": "Call Block",
    "uuid": "9ed63276-e085-4897-839c-4f2e36d92d6c",
    "category": "Applications",
    "version": "1.1",
    "description": {"en-us": "Block calls by caller id.", "de-de": "Anrufe blockieren."},
    "permissions": [
        {"name": "call_block_view", "menu": {"uuid": "29295c90-b1b9-440b-9c7e-c8363c6e8975"},
         "groups": ["superadmin", "admin"]},
        {"name": "call_block_add", "groups": ["superadmin", "admin"]},
        {"name": "call_block_all", "groups": ["superadmin"]},
        {"name": "call_block_domain", "groups": []}
    ],
    "default_settings": [
        {"uuid": "5d7e1a2b-3c4d-4e5f-8a9b-0c1d2e3f4a5b", "category": "call_block",
         "subcategory": "action", "type": "text", "value": "reject", "enabled": "true"},
        {"uuid": "6e8f2b3c-4d5e-4f6a-9b0c-1d2e3f4a5b6c", "category": "call_block",
         "subcategory": "max_entries", "type": "numeric", "value": "500", "enabled": true}
    ],
    "tables": [{
        "name": "v_call_block",
        "columns": [
            {"name": "domain_uuid", "type": {"pgsql": "uuid", "sqlite": "text", "mysql": "char(36)"},
             "key": {"type": "foreign", "reference": {"table": "v_domains", "field": "domain_uuid"}}},
            {"name": {"text": "call_block_uuid", "deprecated": "blocked_caller_uuid"},
             "type": {"pgsql": "uuid", "sqlite": "text", "mysql": "char(36)"},
             "key": {"type": "primary"}},
            {"name": "call_block_name", "type": "text", "search": "true"},
            {"name": "call_block_count", "type": "numeric"},
            {"name": "blocked_caller_number", "type": "text", "deprecated": "true"}
        ]
    }]
}"#;

/// Minimal domains module that the other fixtures reference
pub fn domains() -> ModuleDescriptor {
    ModuleDescriptor::new("Domains", DOMAINS_UUID)
        .category("Core")
        .version("1.0")
        .permission(Permission::new("domain_view").group(groups::SUPERADMIN))
        .default_setting(DefaultSetting::new(
            "7f9a3c4d-5e6f-4a7b-8c9d-0e1f2a3b4c5d",
            "domain",
            "language",
            SettingKind::Text,
            "en-us",
        ))
        .table(
            TableDefinition::new("v_domains")
                .column(
                    ColumnDefinition::new(
                        "domain_uuid",
                        ColumnType::default()
                            .pgsql("uuid")
                            .sqlite("text")
                            .mysql("char(36)"),
                    )
                    .primary_key(),
                )
                .column(ColumnDefinition::new("domain_name", ColumnType::generic("text"))),
        )
}

pub fn call_block() -> ModuleDescriptor {
    pbxdesc::load(CALL_BLOCK_JSON).expect("call block fixture is valid")
}

/// Environment backed by a map
#[derive(Debug, Clone, Default)]
pub struct MapEnv(HashMap<String, String>);

impl MapEnv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, key: &str, value: &str) -> Self {
        self.0.insert(key.to_string(), value.to_string());
        self
    }
}

impl EnvSource for MapEnv {
    fn var(&self, key: &str) -> Result<String, VarError> {
        self.0.get(key).cloned().ok_or(VarError::NotPresent)
    }
}

/// Temporary directory holding descriptor files
pub struct DescriptorDir {
    pub temp_dir: TempDir,
}

impl DescriptorDir {
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().expect("Failed to create temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Write a file into the directory
    pub fn write(&self, name: &str, content: &str) -> &Self {
        std::fs::write(self.temp_dir.path().join(name), content).expect("Failed to write file");
        self
    }
}

impl Default for DescriptorDir {
    fn default() -> Self {
        Self::new()
    }
}
