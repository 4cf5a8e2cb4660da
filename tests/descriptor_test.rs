//! Descriptor Integration Tests
//!
//! Loading and validating descriptors through the public API:
//! - Well-formed documents and loosely typed fields
//! - Missing required fields and broken invariants
//! - Permission, settings and description queries
//! - JSON round-trips and schema fingerprints

mod common;

use common::{CALL_BLOCK_JSON, CALL_BLOCK_UUID, DescriptorDir, call_block, domains};
use pbxdesc::{
    ColumnDefinition, ColumnType, DefaultSetting, Error, JsonFormat, KeyRole, ModuleDescriptor,
    SettingKind, groups,
};
use serde_json::json;

// =============================================================================
// Loading
// =============================================================================

#[test]
fn test_load_well_formed() {
    let descriptor = call_block();

    assert_eq!(descriptor.name, "Call Block");
    assert_eq!(descriptor.uuid, CALL_BLOCK_UUID);
    assert_eq!(descriptor.tables.len(), 1);

    let table = &descriptor.tables[0];
    assert_eq!(table.name, "v_call_block");
    assert_eq!(table.columns.len(), 5);
    assert_eq!(
        table.column_names(),
        vec![
            "domain_uuid",
            "call_block_uuid",
            "call_block_name",
            "call_block_count",
            "blocked_caller_number"
        ]
    );
}

#[test]
fn test_loose_flags() {
    let descriptor = call_block();
    let table = &descriptor.tables[0];

    assert!(table.get_column("call_block_name").unwrap().search);
    assert!(table.get_column("blocked_caller_number").unwrap().deprecated);
    assert!(descriptor.default_settings[0].enabled);
}

#[test]
fn test_column_lookup_by_old_name() {
    let descriptor = call_block();
    let table = descriptor.get_table("V_CALL_BLOCK").unwrap();

    let column = table.get_column("blocked_caller_uuid").unwrap();
    assert_eq!(column.name(), "call_block_uuid");
    assert_eq!(column.key, KeyRole::Primary);
}

#[test]
fn test_syntax_error_is_parse() {
    let err = pbxdesc::load("{ not json").unwrap_err();
    assert!(matches!(err, Error::Parse(_)));
    assert!(!err.is_schema_error());
}

#[test]
fn test_missing_fields_are_malformed() {
    let cases = [
        (json!({"uuid": CALL_BLOCK_UUID}), "name"),
        (json!({"name": "Call Block"}), "uuid"),
        (
            json!({"name": "Call Block", "uuid": CALL_BLOCK_UUID,
                   "tables": [{"columns": [{"name": "a", "type": "text"}]}]}),
            "tables[0].name",
        ),
    ];

    for (document, expected) in cases {
        let err = pbxdesc::load(&document.to_string()).unwrap_err();
        match err {
            Error::MalformedDescriptor { field, .. } => assert_eq!(field, expected),
            other => panic!("expected MalformedDescriptor for {expected}, got {other:?}"),
        }
    }
}

#[test]
fn test_invalid_uuid() {
    let err = pbxdesc::load(r#"{"name": "Call Block", "uuid": "call-block"}"#).unwrap_err();
    assert!(err.is_schema_error());
    assert!(err.to_string().contains("uuid"));
}

#[test]
fn test_setting_without_subcategory() {
    let descriptor = domains().default_setting(DefaultSetting::new(
        "1a2b3c4d-5e6f-4a7b-8c9d-0e1f2a3b4c5d",
        "domain",
        "",
        SettingKind::Text,
        "x",
    ));

    assert!(matches!(
        descriptor.validate(),
        Err(Error::MalformedDescriptor { .. })
    ));
}

#[test]
fn test_load_file_by_extension() {
    let dir = DescriptorDir::new();
    dir.write("call_block.json", CALL_BLOCK_JSON)
        .write("call_block.ini", "name = Call Block");

    let descriptor = ModuleDescriptor::load_file(dir.path().join("call_block.json")).unwrap();
    assert_eq!(descriptor, call_block());

    let err = ModuleDescriptor::load_file(dir.path().join("call_block.ini")).unwrap_err();
    assert!(matches!(err, Error::UnsupportedFormat(_)));

    let err = ModuleDescriptor::load_file(dir.path().join("missing.json")).unwrap_err();
    assert!(err.is_not_found());
}

// =============================================================================
// Queries
// =============================================================================

#[test]
fn test_permissions_for_group() {
    let descriptor = call_block();

    let superadmin: Vec<_> = descriptor
        .permissions_for(groups::SUPERADMIN)
        .iter()
        .map(|p| p.name.as_str())
        .collect();
    assert_eq!(
        superadmin,
        vec!["call_block_view", "call_block_add", "call_block_all"]
    );

    assert_eq!(descriptor.permissions_for(groups::ADMIN).len(), 2);
    assert!(descriptor.permissions_for(groups::USER).is_empty());
    assert!(descriptor.permissions_for("fax").is_empty());

    assert!(descriptor.is_granted(groups::ADMIN, "call_block_view"));
    assert!(!descriptor.is_granted(groups::ADMIN, "call_block_all"));
    assert!(!descriptor.is_granted(groups::SUPERADMIN, "call_block_domain"));
}

#[test]
fn test_permission_menu() {
    let descriptor = call_block();
    let view = descriptor.get_permission("call_block_view").unwrap();

    assert_eq!(
        view.menu.as_ref().map(|m| m.uuid.as_str()),
        Some("29295c90-b1b9-440b-9c7e-c8363c6e8975")
    );
    assert!(descriptor.get_permission("call_block_add").unwrap().menu.is_none());
}

#[test]
fn test_localized_description() {
    let descriptor = call_block();

    assert_eq!(descriptor.description("de-de"), Some("Anrufe blockieren."));
    assert_eq!(descriptor.description("DE-DE"), Some("Anrufe blockieren."));
    assert_eq!(descriptor.description("fr-fr"), Some("Block calls by caller id."));
}

#[test]
fn test_default_settings() {
    let descriptor = call_block();

    let settings = descriptor.default_settings_for("call_block");
    assert_eq!(settings.len(), 2);
    assert_eq!(settings[0].key(), "call_block.action");
    assert!(descriptor.default_settings_for("cdr").is_empty());

    let resolved = descriptor.resolve_settings("call_block").unwrap();
    assert_eq!(resolved["action"], "reject");
    assert_eq!(resolved["max_entries"], 500);
}

#[test]
fn test_invalid_numeric_setting() {
    let descriptor = domains().default_setting(DefaultSetting::new(
        "2b3c4d5e-6f7a-4b8c-9d0e-1f2a3b4c5d6e",
        "domain",
        "max_users",
        SettingKind::Numeric,
        "lots",
    ));

    let err = descriptor.resolve_settings("domain").unwrap_err();
    assert!(matches!(err, Error::InvalidSettingValue { .. }));
}

// =============================================================================
// Round Trip
// =============================================================================

#[test]
fn test_json_round_trip() {
    let original = call_block();

    for format in [JsonFormat::new(), JsonFormat::compact()] {
        let content = original.to_string_with(&format).unwrap();
        let reloaded = ModuleDescriptor::from_str_with(&content, &format).unwrap();
        assert_eq!(reloaded, original);
    }
}

#[test]
fn test_builtin_round_trip() {
    let original = pbxdesc::builtin::xml_cdr().unwrap();
    let content = original.to_string_with(&JsonFormat::new()).unwrap();

    assert_eq!(pbxdesc::load(&content).unwrap(), original);
}

#[test]
fn test_fingerprint_tracks_schema_only() {
    let original = call_block();
    let fingerprint = original.schema_fingerprint().unwrap();
    assert_eq!(fingerprint.len(), 64);

    let mut described = original.clone();
    described.description.insert("fr-fr", "Bloquer les appels.");
    assert_eq!(described.schema_fingerprint().unwrap(), fingerprint);

    let mut extended = original.clone();
    extended.tables[0].columns.push(ColumnDefinition::new(
        "call_block_enabled",
        ColumnType::generic("boolean"),
    ));
    assert_ne!(extended.schema_fingerprint().unwrap(), fingerprint);
}
