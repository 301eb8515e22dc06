#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

// Tracing target constants for consistent logging.

/// Tracing target for membership service operations.
pub const TRACING_TARGET_SERVICE: &str = "huddle_store::service";

/// Tracing target for repository operations.
pub const TRACING_TARGET_REPOSITORY: &str = "huddle_store::repository";

/// Tracing target for persisted row validation.
pub const TRACING_TARGET_RECORD: &str = "huddle_store::record";

mod error;
mod memory;
mod record;
mod repository;
mod service;

pub use crate::error::{StoreError, StoreResult};
pub use crate::memory::InMemoryMemberStore;
pub use crate::record::MemberRecord;
pub use crate::repository::{Pagination, ProjectMemberRepository};
pub use crate::service::MembershipService;
