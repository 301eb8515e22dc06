#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

// Tracing target constants for consistent logging.

/// Tracing target for role transition checks.
pub const TRACING_TARGET_VALIDATOR: &str = "huddle_core::validator";

/// Tracing target for permission resolution.
pub const TRACING_TARGET_CHECKER: &str = "huddle_core::checker";

/// Tracing target for loading role defaults.
pub const TRACING_TARGET_DEFAULTS: &str = "huddle_core::defaults";

mod checker;
mod defaults;
mod error;
pub mod prelude;
pub mod types;
mod validator;

pub use crate::checker::PermissionChecker;
pub use crate::defaults::{RoleDefaultsConfig, RolePermissionDefaults};
pub use crate::error::{ConfigurationError, Error, InvariantViolation, Result};
pub use crate::types::{CustomPermissions, Permission, PermissionCategory, ProjectMember, Role};
pub use crate::validator::RoleValidator;
