//! Error taxonomy for membership rule evaluation.
//!
//! Two kinds of failure exist. An [`InvariantViolation`] is a recoverable,
//! user-facing rejection: the requested mutation would break a project-wide
//! guarantee and nothing was changed. A [`ConfigurationError`] means an
//! identifier outside the closed role or permission set reached the evaluator;
//! it signals a defect in the caller or in persisted data and should abort the
//! operation rather than resolve to "permitted" or "denied".

use uuid::Uuid;

use crate::types::{Permission, Role};

/// Type alias for Results with the crate [`Error`] type.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// A rejected membership mutation that would violate a project-wide invariant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvariantViolation {
    /// Removing or demoting the member would leave the project without an active admin.
    #[error("cannot remove the last admin of project {project_id} (user {user_id})")]
    LastAdmin {
        /// Project whose admin count would reach zero.
        project_id: Uuid,
        /// The admin whose removal or demotion was rejected.
        user_id: Uuid,
    },
}

impl InvariantViolation {
    /// Returns a short message suitable for showing to an end user.
    pub const fn user_message(&self) -> &'static str {
        match self {
            Self::LastAdmin { .. } => {
                "Cannot remove the last admin. Promote another member to admin first."
            }
        }
    }
}

/// An identifier outside the enumerated role or permission set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigurationError {
    /// A role name that is not `ADMIN`, `MANAGER` or `MEMBER`.
    #[error("unknown role identifier: {0:?}")]
    UnknownRole(String),

    /// A permission identifier that is not part of the permission set.
    #[error("unknown permission identifier: {0:?}")]
    UnknownPermission(String),

    /// A permission override whose value is not a boolean.
    #[error("override for {permission} must be a boolean, got {value}")]
    InvalidOverrideValue {
        /// Permission the override was declared for.
        permission: Permission,
        /// The offending value as it was stored.
        value: String,
    },

    /// Custom permissions stored as something other than a JSON object.
    #[error("custom permissions must be a JSON object, got {0}")]
    InvalidOverrideShape(String),

    /// A role-defaults document that leaves a role without any entry.
    #[error("role defaults do not define role {0}")]
    MissingRoleDefaults(Role),

    /// A role-defaults document that could not be parsed.
    #[error("malformed role defaults document: {0}")]
    MalformedDocument(String),
}

/// Umbrella error for operations that may fail for more than one reason.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[must_use = "membership errors should be handled appropriately"]
pub enum Error {
    /// The mutation was rejected to preserve a project invariant.
    #[error(transparent)]
    Invariant(#[from] InvariantViolation),

    /// Malformed role or permission data reached the evaluator.
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// The acting member lacks the permission the operation requires.
    #[error("user {user_id} lacks {permission} in project {project_id}")]
    Forbidden {
        /// Project the check was evaluated in.
        project_id: Uuid,
        /// Member that was denied.
        user_id: Uuid,
        /// Permission that was required.
        permission: Permission,
    },

    /// The acting role may not grant the requested role.
    #[error("role {assigner} cannot assign role {target}")]
    RoleNotAssignable {
        /// Role of the member attempting the assignment.
        assigner: Role,
        /// Role being granted or revoked.
        target: Role,
    },
}

impl Error {
    /// Returns whether this error should be surfaced to the end user.
    ///
    /// Configuration errors are defects and should be logged and reported as
    /// internal failures instead.
    pub const fn is_user_facing(&self) -> bool {
        !matches!(self, Self::Configuration(_))
    }

    /// Returns the invariant violation, if this error is one.
    pub const fn as_invariant(&self) -> Option<&InvariantViolation> {
        match self {
            Self::Invariant(violation) => Some(violation),
            _ => None,
        }
    }
}
