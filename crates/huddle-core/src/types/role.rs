//! Project role enumeration for member permissions and access control.

use std::cmp;

#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

/// Defines the role and privilege level of a project member.
///
/// Roles are totally ordered by [`Role::weight`]: a higher weight means more
/// privileges. The persisted form is the upper-case identifier (`ADMIN`,
/// `MANAGER`, `MEMBER`); parsing is case-insensitive.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[derive(Serialize, Deserialize, Display, EnumIter, EnumString, IntoStaticStr)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum Role {
    /// Full project management, including granting `ADMIN` to others.
    Admin,

    /// Manages tasks and invites members, but cannot grant `ADMIN`.
    Manager,

    /// Regular participant with no role assignment capability.
    #[default]
    Member,
}

impl Role {
    /// Returns the weight of this role (higher number = more privileges).
    #[inline]
    pub const fn weight(self) -> u8 {
        match self {
            Role::Member => 1,
            Role::Manager => 2,
            Role::Admin => 3,
        }
    }

    /// Returns whether this role has equal or higher weight than the other role.
    #[inline]
    pub const fn has_weight_of(self, other: Role) -> bool {
        self.weight() >= other.weight()
    }

    /// Returns whether this role has administrative privileges.
    #[inline]
    pub const fn is_admin(self) -> bool {
        matches!(self, Role::Admin)
    }

    /// Returns whether this role may assign roles to other members at all.
    #[inline]
    pub const fn can_assign_roles(self) -> bool {
        matches!(self, Role::Admin | Role::Manager)
    }

    /// Returns the persisted identifier of this role.
    #[inline]
    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

impl PartialOrd for Role {
    fn partial_cmp(&self, other: &Self) -> Option<cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Role {
    fn cmp(&self, other: &Self) -> cmp::Ordering {
        self.weight().cmp(&other.weight())
    }
}
