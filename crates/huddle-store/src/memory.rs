//! In-memory project member repository.

use std::collections::HashMap;

use tokio::sync::RwLock;
use uuid::Uuid;

use crate::TRACING_TARGET_REPOSITORY;
use crate::error::{StoreError, StoreResult};
use crate::record::MemberRecord;
use crate::repository::{Pagination, ProjectMemberRepository};

type MemberKey = (Uuid, Uuid);

/// Repository keeping membership rows in process memory.
#[derive(Debug, Default)]
pub struct InMemoryMemberStore {
    rows: RwLock<HashMap<MemberKey, MemberRecord>>,
}

impl InMemoryMemberStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store seeded with the given rows.
    ///
    /// Later rows replace earlier rows with the same project and user.
    pub fn with_records(records: impl IntoIterator<Item = MemberRecord>) -> Self {
        let rows = records
            .into_iter()
            .map(|record| ((record.project_id, record.user_id), record))
            .collect();

        Self {
            rows: RwLock::new(rows),
        }
    }

    /// Returns a copy of every stored row.
    pub async fn snapshot(&self) -> Vec<MemberRecord> {
        let rows = self.rows.read().await;
        let mut records: Vec<_> = rows.values().cloned().collect();
        records.sort_by(|a, b| {
            (a.project_id, a.created_at, a.user_id).cmp(&(b.project_id, b.created_at, b.user_id))
        });
        records
    }
}

impl ProjectMemberRepository for InMemoryMemberStore {
    async fn insert_member(&self, record: MemberRecord) -> StoreResult<MemberRecord> {
        let key = (record.project_id, record.user_id);
        let mut rows = self.rows.write().await;

        if rows.contains_key(&key) {
            return Err(StoreError::AlreadyExists {
                project_id: record.project_id,
                user_id: record.user_id,
            });
        }

        tracing::trace!(
            target: TRACING_TARGET_REPOSITORY,
            project_id = %record.project_id,
            user_id = %record.user_id,
            role = %record.role,
            "member row inserted"
        );

        rows.insert(key, record.clone());
        Ok(record)
    }

    async fn find_member(&self, project_id: Uuid, user_id: Uuid) -> StoreResult<Option<MemberRecord>> {
        let rows = self.rows.read().await;
        Ok(rows.get(&(project_id, user_id)).cloned())
    }

    async fn update_member(&self, record: MemberRecord) -> StoreResult<MemberRecord> {
        let mut rows = self.rows.write().await;
        let Some(row) = rows.get_mut(&(record.project_id, record.user_id)) else {
            return Err(StoreError::NotFound {
                project_id: record.project_id,
                user_id: record.user_id,
            });
        };

        tracing::trace!(
            target: TRACING_TARGET_REPOSITORY,
            project_id = %record.project_id,
            user_id = %record.user_id,
            role = %record.role,
            is_active = record.is_active,
            "member row updated"
        );

        *row = record.clone();
        Ok(record)
    }

    async fn list_project_members(
        &self,
        project_id: Uuid,
        pagination: Pagination,
    ) -> StoreResult<Vec<MemberRecord>> {
        let rows = self.rows.read().await;
        let mut records: Vec<_> = rows
            .values()
            .filter(|record| record.project_id == project_id)
            .cloned()
            .collect();
        records.sort_by(|a, b| (a.created_at, a.user_id).cmp(&(b.created_at, b.user_id)));

        Ok(records
            .into_iter()
            .skip(pagination.offset)
            .take(pagination.limit)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use huddle_core::{ProjectMember, Role};

    use super::*;

    fn record(project_id: Uuid, role: Role) -> MemberRecord {
        MemberRecord::from(ProjectMember::new(project_id, Uuid::now_v7(), role))
    }

    #[tokio::test]
    async fn test_insert_and_find() {
        let store = InMemoryMemberStore::new();
        let row = record(Uuid::now_v7(), Role::Admin);

        store.insert_member(row.clone()).await.unwrap();
        let found = store.find_member(row.project_id, row.user_id).await.unwrap();
        assert_eq!(found, Some(row.clone()));

        let err = store.insert_member(row).await.unwrap_err();
        assert!(matches!(err, StoreError::AlreadyExists { .. }));
    }

    #[tokio::test]
    async fn test_update_missing_row() {
        let store = InMemoryMemberStore::new();
        let err = store
            .update_member(record(Uuid::now_v7(), Role::Member))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_list_is_scoped_and_paginated() {
        let project_id = Uuid::now_v7();
        let rows: Vec<_> = (0..5).map(|_| record(project_id, Role::Member)).collect();
        let store = InMemoryMemberStore::with_records(
            rows.iter()
                .cloned()
                .chain([record(Uuid::now_v7(), Role::Admin)]),
        );

        let all = store
            .list_project_members(project_id, Pagination::default())
            .await
            .unwrap();
        assert_eq!(all.len(), 5);

        let first = Pagination::new(2, 0);
        let page = store.list_project_members(project_id, first).await.unwrap();
        assert_eq!(page.len(), 2);

        let last = first.next().next();
        let page = store.list_project_members(project_id, last).await.unwrap();
        assert_eq!(page.len(), 1);

        assert_eq!(store.snapshot().await.len(), 6);
    }
}
