//! Prelude module for huddle-core.
//!
//! Re-exports the types most callers need with a single `use` statement.
//!
//! # Example
//!
//! ```rust
//! use huddle_core::prelude::*;
//!
//! let checker = PermissionChecker::default();
//! let member = ProjectMember::new(uuid::Uuid::nil(), uuid::Uuid::nil(), Role::Member);
//! assert!(checker.has_permission(&member, Permission::ChatSend));
//! ```

pub use strum::IntoEnumIterator;

pub use crate::{
    ConfigurationError, CustomPermissions, Error, InvariantViolation, Permission,
    PermissionCategory, PermissionChecker, ProjectMember, Result, Role, RolePermissionDefaults,
    RoleValidator,
};
