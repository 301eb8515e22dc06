//! Role to permission default table.
//!
//! The table is built once at start-up, either from the built-in grants or from
//! a [`RoleDefaultsConfig`] document, and then shared read-only (typically
//! behind an `Arc`) with every [`PermissionChecker`].
//!
//! [`PermissionChecker`]: crate::PermissionChecker

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

use crate::TRACING_TARGET_DEFAULTS;
use crate::error::ConfigurationError;
use crate::types::{Permission, Role};

/// Wildcard entry expanding to every permission.
const WILDCARD: &str = "*";

/// Immutable mapping from each role to its default set of permissions.
///
/// Each role's set is stored independently: the table does not assume that a
/// higher role inherits the grants of a lower one, so a custom document may
/// give `MEMBER` a permission that `MANAGER` lacks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RolePermissionDefaults {
    admin: BTreeSet<Permission>,
    manager: BTreeSet<Permission>,
    member: BTreeSet<Permission>,
}

impl RolePermissionDefaults {
    /// Builds the built-in table from [`Permission::minimum_role`].
    pub fn builtin() -> Self {
        let grants_for = |role: Role| -> BTreeSet<Permission> {
            Permission::iter()
                .filter(|perm| perm.is_granted_by_default(role))
                .collect()
        };

        Self {
            admin: grants_for(Role::Admin),
            manager: grants_for(Role::Manager),
            member: grants_for(Role::Member),
        }
    }

    /// Creates a table from explicit per-role sets.
    pub fn new(
        admin: BTreeSet<Permission>,
        manager: BTreeSet<Permission>,
        member: BTreeSet<Permission>,
    ) -> Self {
        Self {
            admin,
            manager,
            member,
        }
    }

    /// Parses and validates a JSON role-defaults document.
    pub fn from_json_str(document: &str) -> Result<Self, ConfigurationError> {
        let config: RoleDefaultsConfig = serde_json::from_str(document)
            .map_err(|err| ConfigurationError::MalformedDocument(err.to_string()))?;
        Self::try_from(config)
    }

    /// Returns the default permission set of `role`.
    #[inline]
    pub fn for_role(&self, role: Role) -> &BTreeSet<Permission> {
        match role {
            Role::Admin => &self.admin,
            Role::Manager => &self.manager,
            Role::Member => &self.member,
        }
    }

    /// Returns whether `role` is granted `permission` by default.
    #[inline]
    pub fn grants(&self, role: Role, permission: Permission) -> bool {
        self.for_role(role).contains(&permission)
    }

    /// Converts the table back into its document form.
    pub fn to_config(&self) -> RoleDefaultsConfig {
        let roles = Role::iter()
            .map(|role| {
                let perms = self
                    .for_role(role)
                    .iter()
                    .map(|perm| perm.as_str().to_owned())
                    .collect();
                (role.as_str().to_owned(), perms)
            })
            .collect();

        RoleDefaultsConfig { roles }
    }
}

impl Default for RolePermissionDefaults {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Loosely typed role-defaults document, as read from configuration.
///
/// ```json
/// {
///   "ADMIN": ["*"],
///   "MANAGER": ["task.assign", "task.view"],
///   "MEMBER": ["task.view"]
/// }
/// ```
///
/// Role keys are case-insensitive. Every role must be present; an empty list
/// is allowed. `"*"` expands to every permission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleDefaultsConfig {
    /// Permission identifiers keyed by role name.
    pub roles: BTreeMap<String, Vec<String>>,
}

impl TryFrom<RoleDefaultsConfig> for RolePermissionDefaults {
    type Error = ConfigurationError;

    fn try_from(config: RoleDefaultsConfig) -> Result<Self, Self::Error> {
        let mut parsed: BTreeMap<Role, BTreeSet<Permission>> = BTreeMap::new();

        for (name, identifiers) in config.roles {
            let role: Role = name.parse().map_err(|_| {
                tracing::error!(
                    target: TRACING_TARGET_DEFAULTS,
                    role = %name,
                    "unknown role in role defaults"
                );
                ConfigurationError::UnknownRole(name.clone())
            })?;

            let set = parsed.entry(role).or_default();
            for identifier in identifiers {
                if identifier == WILDCARD {
                    set.extend(Permission::iter());
                    continue;
                }

                let permission: Permission = identifier.parse().map_err(|_| {
                    tracing::error!(
                        target: TRACING_TARGET_DEFAULTS,
                        role = %role,
                        permission = %identifier,
                        "unknown permission in role defaults"
                    );
                    ConfigurationError::UnknownPermission(identifier.clone())
                })?;
                set.insert(permission);
            }
        }

        let mut take = |role: Role| {
            parsed
                .remove(&role)
                .ok_or(ConfigurationError::MissingRoleDefaults(role))
        };

        let defaults = Self {
            admin: take(Role::Admin)?,
            manager: take(Role::Manager)?,
            member: take(Role::Member)?,
        };

        tracing::debug!(
            target: TRACING_TARGET_DEFAULTS,
            admin = defaults.admin.len(),
            manager = defaults.manager.len(),
            member = defaults.member.len(),
            "role defaults loaded"
        );

        Ok(defaults)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_sizes() {
        let defaults = RolePermissionDefaults::builtin();
        assert_eq!(defaults.for_role(Role::Admin).len(), 30);
        assert_eq!(defaults.for_role(Role::Manager).len(), 25);
        assert_eq!(defaults.for_role(Role::Member).len(), 14);
    }

    #[test]
    fn test_builtin_grants() {
        let defaults = RolePermissionDefaults::default();
        assert!(defaults.grants(Role::Admin, Permission::TaskAssign));
        assert!(defaults.grants(Role::Manager, Permission::TaskAssign));
        assert!(!defaults.grants(Role::Member, Permission::TaskAssign));
        assert!(!defaults.grants(Role::Manager, Permission::MemberRemove));
    }

    #[test]
    fn test_builtin_sets_are_supersets() {
        let defaults = RolePermissionDefaults::builtin();
        let admin = defaults.for_role(Role::Admin);
        let manager = defaults.for_role(Role::Manager);
        let member = defaults.for_role(Role::Member);

        assert!(manager.is_subset(admin));
        assert!(member.is_subset(manager));
    }

    #[test]
    fn test_from_document() {
        let document = r#"{
            "admin": ["*"],
            "MANAGER": ["task.assign", "task.view"],
            "Member": ["task.view", "file.share"]
        }"#;

        let defaults = RolePermissionDefaults::from_json_str(document).unwrap();
        assert_eq!(defaults.for_role(Role::Admin).len(), 30);
        assert_eq!(defaults.for_role(Role::Manager).len(), 2);

        // Independent sets: MEMBER may hold a grant MANAGER lacks.
        assert!(defaults.grants(Role::Member, Permission::FileShare));
        assert!(!defaults.grants(Role::Manager, Permission::FileShare));
    }

    #[test]
    fn test_document_rejects_unknown_identifiers() {
        let err = RolePermissionDefaults::from_json_str(
            r#"{ "ADMIN": [], "MANAGER": [], "MEMBER": [], "OWNER": [] }"#,
        )
        .unwrap_err();
        assert_eq!(err, ConfigurationError::UnknownRole("OWNER".into()));

        let err = RolePermissionDefaults::from_json_str(
            r#"{ "ADMIN": ["project.explode"], "MANAGER": [], "MEMBER": [] }"#,
        )
        .unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::UnknownPermission("project.explode".into())
        );
    }

    #[test]
    fn test_document_requires_every_role() {
        let err = RolePermissionDefaults::from_json_str(r#"{ "ADMIN": ["*"], "MEMBER": [] }"#)
            .unwrap_err();
        assert_eq!(err, ConfigurationError::MissingRoleDefaults(Role::Manager));

        let err = RolePermissionDefaults::from_json_str("[1, 2]").unwrap_err();
        assert!(matches!(err, ConfigurationError::MalformedDocument(_)));
    }

    #[test]
    fn test_config_round_trip() {
        let defaults = RolePermissionDefaults::builtin();
        let config = defaults.to_config();
        assert_eq!(config.roles.len(), 3);
        assert_eq!(RolePermissionDefaults::try_from(config).unwrap(), defaults);
    }
}
