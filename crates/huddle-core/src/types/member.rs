//! Project member model.

use jiff::Timestamp;
#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{CustomPermissions, Permission, Role};

/// A user's membership in a project.
///
/// Membership is unique per `(project_id, user_id)`. Removal is soft: the
/// record stays with `is_active` cleared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct ProjectMember {
    /// Reference to the project.
    pub project_id: Uuid,
    /// Reference to the member's user account.
    pub user_id: Uuid,
    /// Member's role in the project.
    pub role: Role,
    /// Whether the membership is active.
    #[serde(default = "default_active")]
    pub is_active: bool,
    /// Per-member overrides of the role's default permissions.
    #[serde(default)]
    pub custom_permissions: CustomPermissions,
    /// Timestamp when membership was created.
    #[serde(default = "Timestamp::now")]
    pub created_at: Timestamp,
    /// Timestamp when membership was last updated.
    #[serde(default = "Timestamp::now")]
    pub updated_at: Timestamp,
}

const fn default_active() -> bool {
    true
}

impl ProjectMember {
    /// Creates an active member with no overrides.
    pub fn new(project_id: Uuid, user_id: Uuid, role: Role) -> Self {
        let now = Timestamp::now();
        Self {
            project_id,
            user_id,
            role,
            is_active: true,
            custom_permissions: CustomPermissions::default(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns a copy with the given active flag.
    #[must_use]
    pub fn with_active(mut self, is_active: bool) -> Self {
        self.is_active = is_active;
        self
    }

    /// Returns a copy with an explicit permission override.
    #[must_use]
    pub fn with_override(mut self, permission: Permission, granted: bool) -> Self {
        self.custom_permissions.set(permission, granted);
        self
    }

    /// Returns whether this record refers to the same membership as `other`.
    #[inline]
    pub fn is_same_membership(&self, other: &ProjectMember) -> bool {
        self.project_id == other.project_id && self.user_id == other.user_id
    }

    /// Returns whether the member is an active admin.
    #[inline]
    pub fn is_active_admin(&self) -> bool {
        self.is_active && self.role.is_admin()
    }

    /// Marks the record as modified now.
    pub fn touch(&mut self) {
        self.updated_at = Timestamp::now();
    }
}
