//! Permission declarations

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Well-known group names used by the admin framework.
///
/// Groups are plain strings, hosts may define their own.
pub mod groups {
    pub const USER: &str = "user";
    pub const ADMIN: &str = "admin";
    pub const SUPERADMIN: &str = "superadmin";
}

/// Menu item a permission is attached to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuRef {
    pub uuid: String,
}

/// A named permission and the groups it is granted to by default
///
/// A permission with no groups is still declared (so it can be assigned
/// manually) but nobody holds it out of the box.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    #[serde(default)]
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub menu: Option<MenuRef>,

    #[serde(default)]
    pub groups: BTreeSet<String>,
}

impl Permission {
    /// Create a permission granted to nobody
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            menu: None,
            groups: BTreeSet::new(),
        }
    }

    /// Grant to a group
    #[must_use]
    pub fn group(mut self, group: impl Into<String>) -> Self {
        self.groups.insert(group.into());
        self
    }

    /// Attach to a menu item
    #[must_use]
    pub fn menu(mut self, uuid: impl Into<String>) -> Self {
        self.menu = Some(MenuRef { uuid: uuid.into() });
        self
    }

    /// Whether `group` holds this permission by default
    pub fn is_granted_to(&self, group: &str) -> bool {
        self.groups.contains(group)
    }
}
