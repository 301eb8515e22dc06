//! Permission resolution for project members.

use std::collections::BTreeSet;
use std::sync::Arc;

use strum::IntoEnumIterator;

use crate::TRACING_TARGET_CHECKER;
use crate::defaults::RolePermissionDefaults;
use crate::error::{Error, Result};
use crate::types::{Permission, ProjectMember, Role};

/// Resolves whether a member may perform a permission-gated action.
///
/// The checker owns no member data: every call is evaluated against the member
/// supplied by the caller and the injected role defaults. Cloning is cheap and
/// the checker can be shared freely across threads.
#[derive(Debug, Clone, Default)]
pub struct PermissionChecker {
    defaults: Arc<RolePermissionDefaults>,
}

impl PermissionChecker {
    /// Creates a checker backed by the given role defaults.
    pub fn new(defaults: Arc<RolePermissionDefaults>) -> Self {
        Self { defaults }
    }

    /// Returns the role defaults this checker resolves against.
    #[inline]
    pub fn defaults(&self) -> &RolePermissionDefaults {
        &self.defaults
    }

    /// Returns whether `role` is granted `permission` by default.
    #[inline]
    pub fn role_grants(&self, role: Role, permission: Permission) -> bool {
        self.defaults.grants(role, permission)
    }

    /// Returns whether `member` holds `permission`.
    ///
    /// Inactive members are always denied. Otherwise an explicit override wins
    /// unconditionally, which can both narrow and widen the role default; with
    /// no override the role default applies.
    pub fn has_permission(&self, member: &ProjectMember, permission: Permission) -> bool {
        if !member.is_active {
            return false;
        }

        match member.custom_permissions.get(permission) {
            Some(granted) => granted,
            None => self.role_grants(member.role, permission),
        }
    }

    /// Same as [`PermissionChecker::has_permission`], but returns
    /// [`Error::Forbidden`] on denial.
    pub fn require(&self, member: &ProjectMember, permission: Permission) -> Result<()> {
        if self.has_permission(member, permission) {
            return Ok(());
        }

        tracing::debug!(
            target: TRACING_TARGET_CHECKER,
            project_id = %member.project_id,
            user_id = %member.user_id,
            role = %member.role,
            is_active = member.is_active,
            permission = %permission,
            "permission denied"
        );

        Err(Error::Forbidden {
            project_id: member.project_id,
            user_id: member.user_id,
            permission,
        })
    }

    /// Returns every permission `member` currently holds.
    pub fn effective_permissions(&self, member: &ProjectMember) -> BTreeSet<Permission> {
        Permission::iter()
            .filter(|perm| self.has_permission(member, *perm))
            .collect()
    }
}
