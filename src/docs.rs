//! Documentation generator for module descriptors
//!
//! Generates a markdown reference page from a [`ModuleDescriptor`]:
//! permissions by group, default settings and the table layout.

use crate::ddl::Dialect;
use crate::descriptor::{
    ColumnDefinition, DEFAULT_LOCALE, DefaultSetting, KeyRole, ModuleDescriptor, groups,
};
use std::collections::BTreeMap;
use std::fmt::Write;

/// Configuration for docs generation
#[derive(Debug, Clone, Default)]
pub struct DocsConfig {
    /// Title for the documentation (defaults to the module name)
    pub title: Option<String>,
    /// Locale for descriptions (defaults to `en-us`)
    pub locale: Option<String>,
    /// Whether to list deprecated columns
    pub show_deprecated: bool,
}

impl DocsConfig {
    #[must_use]
    pub fn new() -> Self {
        Self {
            show_deprecated: true,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }

    #[must_use]
    pub fn hide_deprecated(mut self) -> Self {
        self.show_deprecated = false;
        self
    }
}

/// Generate markdown documentation for a module
#[must_use]
pub fn generate_docs(descriptor: &ModuleDescriptor, config: DocsConfig) -> String {
    let mut output = String::new();

    let title = config
        .title
        .unwrap_or_else(|| format!("{} Reference", descriptor.name));
    writeln!(output, "# {title}\n").unwrap();

    let locale = config.locale.as_deref().unwrap_or(DEFAULT_LOCALE);
    if let Some(desc) = descriptor.description(locale) {
        writeln!(output, "{desc}\n").unwrap();
    }

    writeln!(output, "| Property | Value |").unwrap();
    writeln!(output, "|----------|-------|").unwrap();
    writeln!(output, "| **UUID** | `{}` |", descriptor.uuid).unwrap();
    if !descriptor.category.is_empty() {
        writeln!(output, "| **Category** | {} |", descriptor.category).unwrap();
    }
    if !descriptor.version.is_empty() {
        writeln!(output, "| **Version** | {} |", descriptor.version).unwrap();
    }
    if let Some(license) = &descriptor.license {
        writeln!(output, "| **License** | {license} |").unwrap();
    }
    output.push('\n');

    if !descriptor.permissions.is_empty() {
        format_permissions(&mut output, descriptor);
    }
    if !descriptor.default_settings.is_empty() {
        format_settings(&mut output, &descriptor.default_settings);
    }
    for table in &descriptor.tables {
        writeln!(output, "## Table `{}`\n", table.name).unwrap();
        if let Some(parent) = &table.parent {
            writeln!(output, "Child of `{parent}`.\n").unwrap();
        }

        write!(output, "| Column |").unwrap();
        for dialect in Dialect::ALL {
            write!(output, " {dialect} |").unwrap();
        }
        output.push_str(" Key | Notes |\n|--------|");
        for _ in Dialect::ALL {
            output.push_str("------|");
        }
        output.push_str("-----|-------|\n");

        for column in &table.columns {
            if column.deprecated && !config.show_deprecated {
                continue;
            }
            format_column(&mut output, column, locale);
        }
        output.push('\n');
    }

    output
}

/// Permission matrix: one row per permission, one column per standard group
fn format_permissions(out: &mut String, descriptor: &ModuleDescriptor) {
    const GROUPS: [&str; 3] = [groups::SUPERADMIN, groups::ADMIN, groups::USER];

    out.push_str("## Permissions\n\n| Permission |");
    for group in GROUPS {
        write!(out, " {group} |").unwrap();
    }
    out.push_str("\n|------------|");
    for _ in GROUPS {
        out.push_str(":---:|");
    }
    out.push('\n');

    for permission in &descriptor.permissions {
        write!(out, "| `{}` |", permission.name).unwrap();
        for group in GROUPS {
            let mark = if permission.is_granted_to(group) { "x" } else { " " };
            write!(out, " {mark} |").unwrap();
        }
        out.push('\n');
    }
    out.push('\n');
}

fn format_settings(out: &mut String, settings: &[DefaultSetting]) {
    let mut by_category: BTreeMap<&str, Vec<&DefaultSetting>> = BTreeMap::new();
    for setting in settings {
        by_category
            .entry(setting.category.as_str())
            .or_default()
            .push(setting);
    }

    out.push_str("## Default Settings\n\n");
    for (category, settings) in by_category {
        writeln!(out, "### {}\n", capitalize(category)).unwrap();
        out.push_str("| Setting | Type | Default | Enabled |\n");
        out.push_str("|---------|------|---------|---------|\n");
        for setting in settings {
            writeln!(
                out,
                "| `{}` | {} | `{}` | {} |",
                setting.subcategory,
                setting.kind.as_str(),
                setting.value,
                if setting.enabled { "yes" } else { "no" }
            )
            .unwrap();
        }
        out.push('\n');
    }
}

fn format_column(out: &mut String, column: &ColumnDefinition, locale: &str) {
    write!(out, "| `{}` |", column.name()).unwrap();
    for dialect in Dialect::ALL {
        let ty = column.column_type.for_dialect(dialect).unwrap_or("-");
        write!(out, " {ty} |").unwrap();
    }

    let key = match &column.key {
        KeyRole::None => String::new(),
        KeyRole::Primary => "Primary".to_string(),
        KeyRole::Foreign { reference } => {
            format!("-> `{}.{}`", reference.table, reference.field)
        }
    };

    let mut notes = Vec::new();
    if column.search {
        notes.push("Search".to_string());
    }
    if column.deprecated {
        notes.push("Deprecated".to_string());
    }
    if let Some(old) = &column.name.deprecated {
        notes.push(format!("was `{old}`"));
    }
    if let Some(desc) = column.description.get(locale) {
        notes.push(desc.to_string());
    }

    writeln!(out, " {key} | {} |", notes.join(" • ")).unwrap();
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().chain(chars).collect(),
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{ColumnType, DefaultSetting, Permission, SettingKind, TableDefinition};

    fn descriptor() -> ModuleDescriptor {
        ModuleDescriptor::new("Call Block", "9ed63276-e085-4897-839c-4f2e36d92d6c")
            .category("Applications")
            .describe("en-us", "Block calls by caller id.")
            .describe("de-de", "Anrufe blockieren.")
            .permission(
                Permission::new("call_block_view")
                    .group(groups::ADMIN)
                    .group(groups::SUPERADMIN),
            )
            .default_setting(DefaultSetting::new(
                "8d4f2c1e-3a5b-4c6d-9e7f-0a1b2c3d4e5f",
                "call_block",
                "action",
                SettingKind::Text,
                "reject",
            ))
            .table(
                TableDefinition::new("v_call_block")
                    .column(
                        ColumnDefinition::new(
                            "call_block_uuid",
                            ColumnType::default()
                                .pgsql("uuid")
                                .sqlite("text")
                                .mysql("char(36)"),
                        )
                        .primary_key(),
                    )
                    .column(
                        ColumnDefinition::new("call_block_name", ColumnType::generic("text"))
                            .searchable()
                            .describe("en-us", "Name of the rule"),
                    )
                    .column(
                        ColumnDefinition::new("v_id", ColumnType::generic("text")).deprecated(),
                    ),
            )
    }

    #[test]
    fn test_generate_docs() {
        let docs = generate_docs(&descriptor(), DocsConfig::new());

        assert!(docs.contains("# Call Block Reference"));
        assert!(docs.contains("Block calls by caller id."));
        assert!(docs.contains("| `call_block_view` | x | x |   |"));
        assert!(docs.contains("### Call_block"));
        assert!(docs.contains("| `action` | text | `reject` | yes |"));
        assert!(docs.contains("| `call_block_uuid` | uuid | char(36) | text | Primary |"));
        assert!(docs.contains("Search • Name of the rule"));
        assert!(docs.contains("`v_id`"));
    }

    #[test]
    fn test_locale_and_title() {
        let docs = generate_docs(
            &descriptor(),
            DocsConfig::new().with_title("Blocking").with_locale("de-de"),
        );

        assert!(docs.starts_with("# Blocking\n"));
        assert!(docs.contains("Anrufe blockieren."));
    }

    #[test]
    fn test_hide_deprecated() {
        let docs = generate_docs(&descriptor(), DocsConfig::new().hide_deprecated());

        assert!(!docs.contains("`v_id`"));
        assert!(docs.contains("`call_block_name`"));
    }
}
