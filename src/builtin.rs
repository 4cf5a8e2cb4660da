//! Descriptors shipped with the crate
//!
//! Embedded at compile time and parsed on demand, so they go through the
//! same validation as descriptors loaded from disk.

use crate::descriptor::ModuleDescriptor;
use crate::error::Result;
use crate::format::JsonFormat;

const XML_CDR: &str = include_str!("../descriptors/xml_cdr.json");

/// The XML CDR (call detail records) module
///
/// ```rust
/// let cdr = pbxdesc::builtin::xml_cdr()?;
/// assert_eq!(cdr.name, "XML CDR");
/// # Ok::<(), pbxdesc::Error>(())
/// ```
pub fn xml_cdr() -> Result<ModuleDescriptor> {
    ModuleDescriptor::from_str_with(XML_CDR, &JsonFormat::new())
}

/// Every built-in module
pub fn modules() -> Result<Vec<ModuleDescriptor>> {
    Ok(vec![xml_cdr()?])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{KeyRole, groups};

    #[test]
    fn test_xml_cdr_identity() {
        let cdr = xml_cdr().unwrap();

        assert_eq!(cdr.uuid, "4a085c51-7635-ff03-f67b-86e834422848");
        assert_eq!(cdr.category, "Switch");
        assert_eq!(cdr.version, "1.0");
        assert_eq!(
            cdr.description("de-de"),
            Some("Detaillierte Historie mit informationen über alle Anrufe.")
        );
        // zh-cn has no translation
        assert_eq!(cdr.description("zh-cn"), cdr.description("en-us"));
    }

    #[test]
    fn test_xml_cdr_permissions() {
        let cdr = xml_cdr().unwrap();

        assert_eq!(cdr.permissions.len(), 45);
        assert_eq!(cdr.permissions_for(groups::SUPERADMIN).len(), 42);
        assert_eq!(cdr.permissions_for(groups::USER).len(), 18);

        let view = cdr.get_permission("xml_cdr_view").unwrap();
        assert_eq!(
            view.menu.as_ref().map(|m| m.uuid.as_str()),
            Some("8f80e71a-31a5-6432-47a0-7f5a7b271f05")
        );
        assert!(!cdr.is_granted(groups::SUPERADMIN, "xml_cdr_edit"));
    }

    #[test]
    fn test_xml_cdr_table() {
        let cdr = xml_cdr().unwrap();
        let table = cdr.get_table("v_xml_cdr").unwrap();

        assert_eq!(table.columns.len(), 67);
        assert_eq!(table.primary_key().map(|c| c.name()), Some("xml_cdr_uuid"));

        let domain = table.get_column("domain_uuid").unwrap();
        match &domain.key {
            KeyRole::Foreign { reference } => {
                assert_eq!(reference.table, "v_domains");
                assert_eq!(reference.field, "domain_uuid");
            }
            other => panic!("expected foreign key, got {other:?}"),
        }

        assert_eq!(table.get_column("xml_cdr").unwrap().name(), "xml");
        assert_eq!(table.searchable_columns().count(), 8);
    }

    #[test]
    fn test_xml_cdr_settings() {
        let cdr = xml_cdr().unwrap();
        assert_eq!(cdr.default_settings_for("cdr").len(), 15);

        let resolved = cdr.resolve_settings("cdr").unwrap();
        assert_eq!(resolved["format"], "json");
        assert_eq!(resolved["limit"], 800);
        assert_eq!(resolved["http_enabled"], true);
        assert!(!resolved.contains_key("b_leg"));
    }
}
