//! Repository seam for project member storage.

use std::future::Future;

use uuid::Uuid;

use crate::error::StoreResult;
use crate::record::MemberRecord;

/// Offset-based pagination for list queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// Maximum number of rows to return.
    pub limit: usize,
    /// Number of rows to skip.
    pub offset: usize,
}

impl Pagination {
    /// Page size used when a caller needs every row.
    pub const PAGE_SIZE: usize = 1000;

    /// Creates a pagination window.
    pub const fn new(limit: usize, offset: usize) -> Self {
        Self { limit, offset }
    }

    /// Returns the window that follows this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self {
            limit: self.limit,
            offset: self.offset + self.limit,
        }
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(Self::PAGE_SIZE, 0)
    }
}

/// Repository for project member storage operations.
///
/// Implementations exchange raw [`MemberRecord`] rows; validation into typed
/// members happens in the caller. Membership is unique per
/// `(project_id, user_id)` and rows are never physically deleted.
pub trait ProjectMemberRepository: Send + Sync {
    /// Inserts a new membership row.
    ///
    /// Fails with [`StoreError::AlreadyExists`] if a row for the same project
    /// and user is present, active or not.
    ///
    /// [`StoreError::AlreadyExists`]: crate::StoreError::AlreadyExists
    fn insert_member(
        &self,
        record: MemberRecord,
    ) -> impl Future<Output = StoreResult<MemberRecord>> + Send;

    /// Finds a membership row by project and user IDs.
    fn find_member(
        &self,
        project_id: Uuid,
        user_id: Uuid,
    ) -> impl Future<Output = StoreResult<Option<MemberRecord>>> + Send;

    /// Replaces an existing membership row.
    ///
    /// Fails with [`StoreError::NotFound`] if no row exists.
    ///
    /// [`StoreError::NotFound`]: crate::StoreError::NotFound
    fn update_member(
        &self,
        record: MemberRecord,
    ) -> impl Future<Output = StoreResult<MemberRecord>> + Send;

    /// Lists membership rows of a project, active and inactive.
    ///
    /// Rows are ordered by creation time, then user ID.
    fn list_project_members(
        &self,
        project_id: Uuid,
        pagination: Pagination,
    ) -> impl Future<Output = StoreResult<Vec<MemberRecord>>> + Send;
}
