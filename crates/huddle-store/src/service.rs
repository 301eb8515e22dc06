//! Membership service composing storage with rule evaluation.
//!
//! Every mutation follows the same sequence: lock the project, load all of its
//! members, authorize the actor, run the role and invariant checks, and write
//! only if every check passed. The per-project lock makes the
//! read-check-write sequence atomic with respect to other mutations issued
//! through the same service.

use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex as SyncMutex, PoisonError};

use huddle_core::{
    CustomPermissions, Error as MembershipError, Permission, PermissionChecker, ProjectMember,
    Role, RoleValidator,
};
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use crate::TRACING_TARGET_SERVICE;
use crate::error::{StoreError, StoreResult};
use crate::record::MemberRecord;
use crate::repository::{Pagination, ProjectMemberRepository};

/// Invariant-preserving membership operations over a repository.
pub struct MembershipService<R> {
    repository: Arc<R>,
    checker: PermissionChecker,
    project_locks: Arc<SyncMutex<ProjectLocks>>,
}

type ProjectLocks = HashMap<Uuid, Arc<Mutex<()>>>;

/// Held mutation lock of one project.
///
/// Dropping the guard releases the lock and forgets the project's entry once
/// no other caller holds or waits on it.
struct ProjectGuard {
    guard: Option<OwnedMutexGuard<()>>,
    locks: Arc<SyncMutex<ProjectLocks>>,
    project_id: Uuid,
}

impl Drop for ProjectGuard {
    fn drop(&mut self) {
        drop(self.guard.take());

        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        if locks
            .get(&self.project_id)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            locks.remove(&self.project_id);
        }
    }
}

impl<R> Clone for MembershipService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: self.repository.clone(),
            checker: self.checker.clone(),
            project_locks: self.project_locks.clone(),
        }
    }
}

impl<R> std::fmt::Debug for MembershipService<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MembershipService")
            .field("checker", &self.checker)
            .finish_non_exhaustive()
    }
}

impl<R> MembershipService<R>
where
    R: ProjectMemberRepository,
{
    /// Creates a service over `repository`, resolving permissions with `checker`.
    pub fn new(repository: Arc<R>, checker: PermissionChecker) -> Self {
        Self {
            repository,
            checker,
            project_locks: Arc::default(),
        }
    }

    /// Returns the permission checker used by this service.
    #[inline]
    pub fn checker(&self) -> &PermissionChecker {
        &self.checker
    }

    /// Returns the underlying repository.
    #[inline]
    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// Creates the first member of an empty project as its `ADMIN`.
    pub async fn bootstrap_owner(
        &self,
        project_id: Uuid,
        user_id: Uuid,
    ) -> StoreResult<ProjectMember> {
        let _guard = self.lock_project(project_id).await;

        let existing = self
            .repository
            .list_project_members(project_id, Pagination::new(1, 0))
            .await?;
        if !existing.is_empty() {
            return Err(StoreError::ProjectNotEmpty(project_id));
        }

        let owner = ProjectMember::new(project_id, user_id, Role::Admin);
        self.repository
            .insert_member(MemberRecord::from(&owner))
            .await?;

        tracing::info!(
            target: TRACING_TARGET_SERVICE,
            project_id = %project_id,
            user_id = %user_id,
            "project owner created"
        );

        Ok(owner)
    }

    /// Adds `user_id` to the project with `role`, on behalf of `actor_id`.
    ///
    /// Requires `member.invite`. Only an `ADMIN` may create a member with a
    /// role other than `MEMBER`. Re-adding a removed member reactivates the
    /// existing record with the new role and no overrides.
    pub async fn add_member(
        &self,
        project_id: Uuid,
        actor_id: Uuid,
        user_id: Uuid,
        role: Role,
    ) -> StoreResult<ProjectMember> {
        tracing::info!(
            target: TRACING_TARGET_SERVICE,
            project_id = %project_id,
            actor_id = %actor_id,
            user_id = %user_id,
            role = %role,
            "adding project member"
        );

        let _guard = self.lock_project(project_id).await;
        let members = self.load_members(project_id).await?;
        let actor = self.authorize(&members, project_id, actor_id, Permission::MemberInvite)?;

        if role != Role::Member && !actor.role.is_admin() {
            tracing::debug!(
                target: TRACING_TARGET_SERVICE,
                actor_role = %actor.role,
                role = %role,
                "only an admin may create a non-member role"
            );

            return Err(MembershipError::RoleNotAssignable {
                assigner: actor.role,
                target: role,
            }
            .into());
        }

        let member = match find_member(&members, user_id) {
            Some(existing) if existing.is_active => {
                return Err(StoreError::AlreadyExists {
                    project_id,
                    user_id,
                });
            }
            Some(existing) => {
                let mut member = existing.clone();
                member.role = role;
                member.is_active = true;
                member.custom_permissions = CustomPermissions::default();
                member.touch();
                self.repository
                    .update_member(MemberRecord::from(&member))
                    .await?;
                member
            }
            None => {
                let member = ProjectMember::new(project_id, user_id, role);
                self.repository
                    .insert_member(MemberRecord::from(&member))
                    .await?;
                member
            }
        };

        Ok(member)
    }

    /// Changes the role of `user_id` to `new_role`, on behalf of `actor_id`.
    ///
    /// Requires `member.assign_role`. The actor must be able to assign both the
    /// target's current role and the new role, so a `MANAGER` can neither
    /// promote to nor demote from `ADMIN`. Demoting the last active `ADMIN` is
    /// rejected.
    pub async fn change_role(
        &self,
        project_id: Uuid,
        actor_id: Uuid,
        user_id: Uuid,
        new_role: Role,
    ) -> StoreResult<ProjectMember> {
        tracing::info!(
            target: TRACING_TARGET_SERVICE,
            project_id = %project_id,
            actor_id = %actor_id,
            user_id = %user_id,
            new_role = %new_role,
            "changing project member role"
        );

        let _guard = self.lock_project(project_id).await;
        let members = self.load_members(project_id).await?;
        let actor = self.authorize(&members, project_id, actor_id, Permission::MemberAssignRole)?;
        let target = find_active_member(&members, project_id, user_id)?;

        ensure_assignable(actor.role, new_role)?;
        ensure_assignable(actor.role, target.role)?;

        if target.role == new_role {
            return Ok(target.clone());
        }

        RoleValidator::can_change_role(&members, target, new_role)?;

        let mut member = target.clone();
        member.role = new_role;
        member.touch();
        self.repository
            .update_member(MemberRecord::from(&member))
            .await?;

        tracing::info!(
            target: TRACING_TARGET_SERVICE,
            project_id = %project_id,
            user_id = %user_id,
            role = %new_role,
            "project member role changed"
        );

        Ok(member)
    }

    /// Deactivates the membership of `user_id`, on behalf of `actor_id`.
    ///
    /// A member may always leave a project on their own; removing someone else
    /// requires `member.remove` and the ability to assign the target's role.
    /// Removing the last active `ADMIN` is rejected either way.
    pub async fn remove_member(
        &self,
        project_id: Uuid,
        actor_id: Uuid,
        user_id: Uuid,
    ) -> StoreResult<ProjectMember> {
        tracing::info!(
            target: TRACING_TARGET_SERVICE,
            project_id = %project_id,
            actor_id = %actor_id,
            user_id = %user_id,
            "removing project member"
        );

        let _guard = self.lock_project(project_id).await;
        let members = self.load_members(project_id).await?;
        let target = find_active_member(&members, project_id, user_id)?;

        if actor_id != user_id {
            let actor = self.authorize(&members, project_id, actor_id, Permission::MemberRemove)?;
            ensure_assignable(actor.role, target.role)?;
        }

        RoleValidator::can_remove_member(&members, target)?;

        let mut member = target.clone();
        member.is_active = false;
        member.touch();
        self.repository
            .update_member(MemberRecord::from(&member))
            .await?;

        tracing::warn!(
            target: TRACING_TARGET_SERVICE,
            project_id = %project_id,
            actor_id = %actor_id,
            user_id = %user_id,
            "project member removed"
        );

        Ok(member)
    }

    /// Sets an explicit permission override on `user_id`, on behalf of `actor_id`.
    ///
    /// Requires `member.manage_permissions`. Granting (`true`) a permission the
    /// actor does not hold is rejected.
    pub async fn set_permission_override(
        &self,
        project_id: Uuid,
        actor_id: Uuid,
        user_id: Uuid,
        permission: Permission,
        granted: bool,
    ) -> StoreResult<ProjectMember> {
        self.update_override(project_id, actor_id, user_id, permission, Some(granted))
            .await
    }

    /// Removes an override on `user_id` so the role default applies again.
    pub async fn clear_permission_override(
        &self,
        project_id: Uuid,
        actor_id: Uuid,
        user_id: Uuid,
        permission: Permission,
    ) -> StoreResult<ProjectMember> {
        self.update_override(project_id, actor_id, user_id, permission, None)
            .await
    }

    /// Returns whether `user_id` holds `permission` in the project.
    ///
    /// Users without a membership record hold no permissions.
    pub async fn has_permission(
        &self,
        project_id: Uuid,
        user_id: Uuid,
        permission: Permission,
    ) -> StoreResult<bool> {
        let Some(record) = self.repository.find_member(project_id, user_id).await? else {
            return Ok(false);
        };

        let member = record.into_member()?;
        Ok(self.checker.has_permission(&member, permission))
    }

    /// Returns every permission `user_id` currently holds in the project.
    pub async fn effective_permissions(
        &self,
        project_id: Uuid,
        user_id: Uuid,
    ) -> StoreResult<BTreeSet<Permission>> {
        let member = self.member(project_id, user_id).await?;
        Ok(self.checker.effective_permissions(&member))
    }

    /// Returns the membership of `user_id`.
    pub async fn member(&self, project_id: Uuid, user_id: Uuid) -> StoreResult<ProjectMember> {
        let Some(record) = self.repository.find_member(project_id, user_id).await? else {
            return Err(StoreError::NotFound {
                project_id,
                user_id,
            });
        };

        Ok(record.into_member()?)
    }

    /// Lists a page of project members, active and inactive.
    pub async fn list_members(
        &self,
        project_id: Uuid,
        pagination: Pagination,
    ) -> StoreResult<Vec<ProjectMember>> {
        let records = self
            .repository
            .list_project_members(project_id, pagination)
            .await?;

        records
            .into_iter()
            .map(|record| record.into_member().map_err(StoreError::from))
            .collect()
    }

    async fn update_override(
        &self,
        project_id: Uuid,
        actor_id: Uuid,
        user_id: Uuid,
        permission: Permission,
        granted: Option<bool>,
    ) -> StoreResult<ProjectMember> {
        tracing::info!(
            target: TRACING_TARGET_SERVICE,
            project_id = %project_id,
            actor_id = %actor_id,
            user_id = %user_id,
            permission = %permission,
            granted = ?granted,
            "updating permission override"
        );

        let _guard = self.lock_project(project_id).await;
        let members = self.load_members(project_id).await?;
        let actor = self.authorize(
            &members,
            project_id,
            actor_id,
            Permission::MemberManagePermissions,
        )?;
        let target = find_active_member(&members, project_id, user_id)?;

        if actor_id != user_id {
            ensure_assignable(actor.role, target.role)?;
        }

        if granted == Some(true) {
            self.checker.require(actor, permission)?;
        }

        let mut member = target.clone();
        match granted {
            Some(granted) => member.custom_permissions.set(permission, granted),
            None => member.custom_permissions.clear(permission),
        };
        member.touch();
        self.repository
            .update_member(MemberRecord::from(&member))
            .await?;

        Ok(member)
    }

    /// Acquires the mutation lock of `project_id`.
    async fn lock_project(&self, project_id: Uuid) -> ProjectGuard {
        let lock = {
            let mut locks = self
                .project_locks
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            locks.entry(project_id).or_default().clone()
        };

        ProjectGuard {
            guard: Some(lock.lock_owned().await),
            locks: self.project_locks.clone(),
            project_id,
        }
    }

    /// Loads and validates every member row of `project_id`.
    async fn load_members(&self, project_id: Uuid) -> StoreResult<Vec<ProjectMember>> {
        let mut members = Vec::new();
        let mut pagination = Pagination::default();

        loop {
            let page = self
                .repository
                .list_project_members(project_id, pagination)
                .await?;
            let page_len = page.len();

            for record in page {
                members.push(record.into_member()?);
            }

            if page_len < pagination.limit {
                break;
            }
            pagination = pagination.next();
        }

        tracing::trace!(
            target: TRACING_TARGET_SERVICE,
            project_id = %project_id,
            count = members.len(),
            "project members loaded"
        );

        Ok(members)
    }

    /// Resolves the acting member and checks that it holds `permission`.
    fn authorize<'a>(
        &self,
        members: &'a [ProjectMember],
        project_id: Uuid,
        actor_id: Uuid,
        permission: Permission,
    ) -> StoreResult<&'a ProjectMember> {
        let Some(actor) = find_member(members, actor_id) else {
            tracing::debug!(
                target: TRACING_TARGET_SERVICE,
                project_id = %project_id,
                actor_id = %actor_id,
                permission = %permission,
                "actor is not a project member"
            );

            return Err(MembershipError::Forbidden {
                project_id,
                user_id: actor_id,
                permission,
            }
            .into());
        };

        self.checker.require(actor, permission)?;
        Ok(actor)
    }
}

fn find_member(members: &[ProjectMember], user_id: Uuid) -> Option<&ProjectMember> {
    members.iter().find(|member| member.user_id == user_id)
}

fn find_active_member(
    members: &[ProjectMember],
    project_id: Uuid,
    user_id: Uuid,
) -> StoreResult<&ProjectMember> {
    find_member(members, user_id)
        .filter(|member| member.is_active)
        .ok_or(StoreError::NotFound {
            project_id,
            user_id,
        })
}

fn ensure_assignable(assigner: Role, target: Role) -> StoreResult<()> {
    if RoleValidator::can_assign(assigner, target) {
        return Ok(());
    }

    tracing::debug!(
        target: TRACING_TARGET_SERVICE,
        assigner = %assigner,
        target_role = %target,
        "role not assignable"
    );

    Err(MembershipError::RoleNotAssignable { assigner, target }.into())
}

#[cfg(test)]
mod tests {
    use huddle_core::{ConfigurationError, InvariantViolation};
    use serde_json::json;

    use super::*;
    use crate::memory::InMemoryMemberStore;

    struct Fixture {
        service: MembershipService<InMemoryMemberStore>,
        project_id: Uuid,
        admin: Uuid,
    }

    async fn fixture() -> Fixture {
        let service = MembershipService::new(
            Arc::new(InMemoryMemberStore::new()),
            PermissionChecker::default(),
        );
        let project_id = Uuid::now_v7();
        let admin = Uuid::now_v7();
        service.bootstrap_owner(project_id, admin).await.unwrap();

        Fixture {
            service,
            project_id,
            admin,
        }
    }

    fn is_last_admin(err: &StoreError) -> bool {
        matches!(err.as_invariant(), Some(InvariantViolation::LastAdmin { .. }))
    }

    fn is_forbidden(err: &StoreError) -> bool {
        matches!(err, StoreError::Membership(MembershipError::Forbidden { .. }))
    }

    fn is_not_assignable(err: &StoreError) -> bool {
        matches!(
            err,
            StoreError::Membership(MembershipError::RoleNotAssignable { .. })
        )
    }

    #[tokio::test]
    async fn test_bootstrap_owner_requires_empty_project() {
        let Fixture {
            service,
            project_id,
            ..
        } = fixture().await;

        let err = service
            .bootstrap_owner(project_id, Uuid::now_v7())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::ProjectNotEmpty(id) if id == project_id));
    }

    #[tokio::test]
    async fn test_admin_and_manager_scenario() {
        let Fixture {
            service,
            project_id,
            admin,
        } = fixture().await;
        let manager = Uuid::now_v7();

        let added = service
            .add_member(project_id, admin, manager, Role::Manager)
            .await
            .unwrap();
        assert_eq!(added.role, Role::Manager);

        // The sole admin cannot leave.
        let err = service
            .remove_member(project_id, admin, admin)
            .await
            .unwrap_err();
        assert!(is_last_admin(&err));
        assert!(err.is_user_facing());

        // The admin can remove the manager.
        let removed = service
            .remove_member(project_id, admin, manager)
            .await
            .unwrap();
        assert!(!removed.is_active);
        assert!(
            !service
                .has_permission(project_id, manager, Permission::ChatRead)
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn test_manager_cannot_touch_admin_role() {
        let Fixture {
            service,
            project_id,
            admin,
        } = fixture().await;
        let manager = Uuid::now_v7();
        let member = Uuid::now_v7();
        service
            .add_member(project_id, admin, manager, Role::Manager)
            .await
            .unwrap();
        service
            .add_member(project_id, manager, member, Role::Member)
            .await
            .unwrap();

        let err = service
            .change_role(project_id, manager, member, Role::Admin)
            .await
            .unwrap_err();
        assert!(is_not_assignable(&err));

        let err = service
            .change_role(project_id, manager, admin, Role::Member)
            .await
            .unwrap_err();
        assert!(is_not_assignable(&err));

        let promoted = service
            .change_role(project_id, manager, member, Role::Manager)
            .await
            .unwrap();
        assert_eq!(promoted.role, Role::Manager);
    }

    #[tokio::test]
    async fn test_member_cannot_assign_roles() {
        let Fixture {
            service,
            project_id,
            admin,
        } = fixture().await;
        let member = Uuid::now_v7();
        let peer = Uuid::now_v7();
        service
            .add_member(project_id, admin, member, Role::Member)
            .await
            .unwrap();
        service
            .add_member(project_id, admin, peer, Role::Member)
            .await
            .unwrap();

        let err = service
            .change_role(project_id, member, peer, Role::Member)
            .await
            .unwrap_err();
        assert!(is_forbidden(&err));

        let err = service
            .add_member(project_id, member, Uuid::now_v7(), Role::Member)
            .await
            .unwrap_err();
        assert!(is_forbidden(&err));
    }

    #[tokio::test]
    async fn test_demoting_last_admin_is_rejected() {
        let Fixture {
            service,
            project_id,
            admin,
        } = fixture().await;
        let second = Uuid::now_v7();

        let err = service
            .change_role(project_id, admin, admin, Role::Manager)
            .await
            .unwrap_err();
        assert!(is_last_admin(&err));

        service
            .add_member(project_id, admin, second, Role::Admin)
            .await
            .unwrap();
        let demoted = service
            .change_role(project_id, second, admin, Role::Manager)
            .await
            .unwrap();
        assert_eq!(demoted.role, Role::Manager);

        let stored = service.member(project_id, admin).await.unwrap();
        assert_eq!(stored.role, Role::Manager);
    }

    #[tokio::test]
    async fn test_permission_overrides() {
        let Fixture {
            service,
            project_id,
            admin,
        } = fixture().await;
        let member = Uuid::now_v7();
        let manager = Uuid::now_v7();
        service
            .add_member(project_id, admin, member, Role::Member)
            .await
            .unwrap();
        service
            .add_member(project_id, admin, manager, Role::Manager)
            .await
            .unwrap();

        assert!(
            !service
                .has_permission(project_id, member, Permission::TaskAssign)
                .await
                .unwrap()
        );

        service
            .set_permission_override(project_id, admin, member, Permission::TaskAssign, true)
            .await
            .unwrap();
        assert!(
            service
                .has_permission(project_id, member, Permission::TaskAssign)
                .await
                .unwrap()
        );

        service
            .clear_permission_override(project_id, admin, member, Permission::TaskAssign)
            .await
            .unwrap();
        let effective = service
            .effective_permissions(project_id, member)
            .await
            .unwrap();
        assert!(!effective.contains(&Permission::TaskAssign));

        // Managers lack member.manage_permissions by default.
        let err = service
            .set_permission_override(project_id, manager, member, Permission::ChatPin, true)
            .await
            .unwrap_err();
        assert!(is_forbidden(&err));
    }

    #[tokio::test]
    async fn test_cannot_grant_permission_actor_lacks() {
        let Fixture {
            service,
            project_id,
            admin,
        } = fixture().await;
        let delegate = Uuid::now_v7();
        let member = Uuid::now_v7();
        service
            .add_member(project_id, admin, delegate, Role::Manager)
            .await
            .unwrap();
        service
            .add_member(project_id, admin, member, Role::Member)
            .await
            .unwrap();
        service
            .set_permission_override(
                project_id,
                admin,
                delegate,
                Permission::MemberManagePermissions,
                true,
            )
            .await
            .unwrap();

        // The delegate may narrow a grant but not hand out project.delete.
        service
            .set_permission_override(project_id, delegate, member, Permission::ChatSend, false)
            .await
            .unwrap();
        let err = service
            .set_permission_override(project_id, delegate, member, Permission::ProjectDelete, true)
            .await
            .unwrap_err();
        assert!(is_forbidden(&err));
    }

    #[tokio::test]
    async fn test_readding_reactivates_membership() {
        let Fixture {
            service,
            project_id,
            admin,
        } = fixture().await;
        let user = Uuid::now_v7();
        service
            .add_member(project_id, admin, user, Role::Manager)
            .await
            .unwrap();
        service
            .set_permission_override(project_id, admin, user, Permission::FileShare, false)
            .await
            .unwrap();

        let err = service
            .add_member(project_id, admin, user, Role::Member)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::AlreadyExists { .. }));

        service.remove_member(project_id, user, user).await.unwrap();
        let member = service
            .add_member(project_id, admin, user, Role::Member)
            .await
            .unwrap();
        assert!(member.is_active);
        assert_eq!(member.role, Role::Member);
        assert!(member.custom_permissions.is_empty());

        let all = service
            .list_members(project_id, Pagination::default())
            .await
            .unwrap();
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn test_only_admin_creates_elevated_members() {
        let Fixture {
            service,
            project_id,
            admin,
        } = fixture().await;
        let manager = Uuid::now_v7();
        service
            .add_member(project_id, admin, manager, Role::Manager)
            .await
            .unwrap();

        let invitee = Uuid::now_v7();
        let err = service
            .add_member(project_id, manager, invitee, Role::Manager)
            .await
            .unwrap_err();
        assert!(is_not_assignable(&err));
        assert!(
            service
                .repository()
                .find_member(project_id, invitee)
                .await
                .unwrap()
                .is_none()
        );

        let added = service
            .add_member(project_id, manager, invitee, Role::Member)
            .await
            .unwrap();
        assert_eq!(added.role, Role::Member);
    }

    #[tokio::test]
    async fn test_project_locks_are_released() {
        let Fixture {
            service,
            project_id,
            admin,
        } = fixture().await;

        for _ in 0..100 {
            let unknown = Uuid::now_v7();
            let err = service
                .remove_member(unknown, admin, Uuid::now_v7())
                .await
                .unwrap_err();
            assert!(matches!(err, StoreError::NotFound { .. }));
        }

        service
            .add_member(project_id, admin, Uuid::now_v7(), Role::Member)
            .await
            .unwrap();

        assert!(service.project_locks.lock().unwrap().is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_concurrent_departures_keep_one_admin() {
        let Fixture {
            service,
            project_id,
            admin,
        } = fixture().await;
        let second = Uuid::now_v7();
        service
            .add_member(project_id, admin, second, Role::Admin)
            .await
            .unwrap();

        let first_leave = {
            let service = service.clone();
            tokio::spawn(async move { service.remove_member(project_id, admin, admin).await })
        };
        let second_leave = {
            let service = service.clone();
            tokio::spawn(async move { service.remove_member(project_id, second, second).await })
        };

        let results = [first_leave.await.unwrap(), second_leave.await.unwrap()];
        let succeeded = results.iter().filter(|r| r.is_ok()).count();
        let rejected = results
            .iter()
            .filter(|r| r.as_ref().is_err_and(is_last_admin))
            .count();

        assert_eq!(succeeded, 1);
        assert_eq!(rejected, 1);

        let members = service
            .list_members(project_id, Pagination::default())
            .await
            .unwrap();
        assert_eq!(members.iter().filter(|m| m.is_active_admin()).count(), 1);
    }

    #[tokio::test]
    async fn test_malformed_row_is_configuration_error() {
        let project_id = Uuid::now_v7();
        let admin = Uuid::now_v7();
        let store = InMemoryMemberStore::with_records([
            MemberRecord::from(ProjectMember::new(project_id, admin, Role::Admin)),
            MemberRecord {
                role: "OWNER".into(),
                ..MemberRecord::from(ProjectMember::new(project_id, Uuid::now_v7(), Role::Member))
            },
        ]);
        let service = MembershipService::new(Arc::new(store), PermissionChecker::default());

        let err = service
            .add_member(project_id, admin, Uuid::now_v7(), Role::Member)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::Membership(MembershipError::Configuration(
                ConfigurationError::UnknownRole(_)
            ))
        ));
        assert!(!err.is_user_facing());

        let bad_overrides = MemberRecord {
            custom_permissions: json!({ "task.assign": 1 }),
            ..MemberRecord::from(ProjectMember::new(project_id, Uuid::now_v7(), Role::Member))
        };
        let user_id = bad_overrides.user_id;
        service.repository().insert_member(bad_overrides).await.unwrap();

        let err = service
            .has_permission(project_id, user_id, Permission::TaskAssign)
            .await
            .unwrap_err();
        assert!(!err.is_user_facing());
    }
}
