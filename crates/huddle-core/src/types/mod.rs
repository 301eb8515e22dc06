//! Role, permission and membership types.

mod custom_permissions;
mod member;
mod permission;
mod role;

pub use custom_permissions::CustomPermissions;
pub use member::ProjectMember;
pub use permission::{Permission, PermissionCategory};
pub use role::Role;
