//! Error types for membership storage and service operations.

use std::borrow::Cow;

use huddle_core::{ConfigurationError, InvariantViolation};
use uuid::Uuid;

/// Error type for repository and membership service operations.
#[derive(Debug, thiserror::Error)]
#[must_use = "store errors should be handled appropriately"]
pub enum StoreError {
    /// No membership exists for the given project and user.
    #[error("project member not found: project {project_id}, user {user_id}")]
    NotFound {
        /// Project that was searched.
        project_id: Uuid,
        /// User that was searched for.
        user_id: Uuid,
    },

    /// A membership already exists for the given project and user.
    #[error("user {user_id} is already a member of project {project_id}")]
    AlreadyExists {
        /// Project the insert targeted.
        project_id: Uuid,
        /// User that is already a member.
        user_id: Uuid,
    },

    /// An owner was bootstrapped into a project that already has members.
    #[error("project {0} already has members")]
    ProjectNotEmpty(Uuid),

    /// The rule evaluator rejected the operation.
    #[error(transparent)]
    Membership(#[from] huddle_core::Error),

    /// The storage backend failed.
    #[error("storage backend error: {0}")]
    Backend(Cow<'static, str>),
}

impl StoreError {
    /// Returns whether this error should be surfaced to the end user.
    pub fn is_user_facing(&self) -> bool {
        match self {
            Self::Membership(err) => err.is_user_facing(),
            Self::Backend(_) => false,
            _ => true,
        }
    }

    /// Returns the invariant violation, if this error is one.
    pub fn as_invariant(&self) -> Option<&InvariantViolation> {
        match self {
            Self::Membership(err) => err.as_invariant(),
            _ => None,
        }
    }
}

impl From<InvariantViolation> for StoreError {
    fn from(value: InvariantViolation) -> Self {
        Self::Membership(value.into())
    }
}

impl From<ConfigurationError> for StoreError {
    fn from(value: ConfigurationError) -> Self {
        Self::Membership(value.into())
    }
}

/// Specialized [`Result`] type for store operations.
pub type StoreResult<T, E = StoreError> = Result<T, E>;
