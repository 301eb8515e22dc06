//! Role transition rules.
//!
//! [`RoleValidator`] only vetoes transitions; it never creates or mutates
//! members. The member snapshot passed to it must be consistent with the
//! write that follows, otherwise two concurrent demotions can both observe a
//! second admin and both succeed.

use crate::TRACING_TARGET_VALIDATOR;
use crate::error::InvariantViolation;
use crate::types::{ProjectMember, Role};

/// Pure, side-effect-free decisions about role transitions.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RoleValidator;

impl RoleValidator {
    /// Returns whether a member with `assigner` role may grant `target` role.
    ///
    /// Assignment requires the assigner to outweigh or equal the target role,
    /// only `ADMIN` may grant `ADMIN`, and `MEMBER` has no assignment
    /// capability at all.
    ///
    /// | assigner \ target | ADMIN | MANAGER | MEMBER |
    /// |-------------------|-------|---------|--------|
    /// | ADMIN             | yes   | yes     | yes    |
    /// | MANAGER           | no    | yes     | yes    |
    /// | MEMBER            | no    | no      | no     |
    pub const fn can_assign(assigner: Role, target: Role) -> bool {
        if !assigner.can_assign_roles() {
            return false;
        }

        if target.is_admin() {
            return assigner.is_admin();
        }

        assigner.has_weight_of(target)
    }

    /// Checks that removing `target` leaves the project with an active admin.
    ///
    /// Only members of the target's project are counted, and the target itself
    /// is excluded. Removing a non-admin or an already inactive admin always
    /// succeeds.
    pub fn can_remove_member(
        members: &[ProjectMember],
        target: &ProjectMember,
    ) -> Result<(), InvariantViolation> {
        Self::ensure_admin_remains(members, target)
    }

    /// Checks that changing `target` to `new_role` leaves the project with an
    /// active admin.
    ///
    /// Promotions and lateral changes to `ADMIN` always succeed; demoting an
    /// active admin requires at least one other active admin.
    pub fn can_change_role(
        members: &[ProjectMember],
        target: &ProjectMember,
        new_role: Role,
    ) -> Result<(), InvariantViolation> {
        if new_role.is_admin() {
            return Ok(());
        }

        Self::ensure_admin_remains(members, target)
    }

    /// Counts active admins of `project_id` other than `excluded`.
    pub fn count_other_active_admins(members: &[ProjectMember], excluded: &ProjectMember) -> usize {
        members
            .iter()
            .filter(|member| member.project_id == excluded.project_id)
            .filter(|member| !member.is_same_membership(excluded))
            .filter(|member| member.is_active_admin())
            .count()
    }

    fn ensure_admin_remains(
        members: &[ProjectMember],
        target: &ProjectMember,
    ) -> Result<(), InvariantViolation> {
        if !target.is_active_admin() {
            return Ok(());
        }

        let remaining = Self::count_other_active_admins(members, target);
        if remaining == 0 {
            tracing::warn!(
                target: TRACING_TARGET_VALIDATOR,
                project_id = %target.project_id,
                user_id = %target.user_id,
                "rejected transition that would remove the last admin"
            );

            return Err(InvariantViolation::LastAdmin {
                project_id: target.project_id,
                user_id: target.user_id,
            });
        }

        tracing::trace!(
            target: TRACING_TARGET_VALIDATOR,
            project_id = %target.project_id,
            user_id = %target.user_id,
            remaining,
            "admin invariant holds"
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;

    fn member(project_id: Uuid, role: Role) -> ProjectMember {
        ProjectMember::new(project_id, Uuid::now_v7(), role)
    }

    #[test]
    fn test_can_assign_truth_table() {
        use Role::{Admin, Manager, Member};

        let table = [
            (Admin, Admin, true),
            (Admin, Manager, true),
            (Admin, Member, true),
            (Manager, Admin, false),
            (Manager, Manager, true),
            (Manager, Member, true),
            (Member, Admin, false),
            (Member, Manager, false),
            (Member, Member, false),
        ];

        for (assigner, target, expected) in table {
            assert_eq!(
                RoleValidator::can_assign(assigner, target),
                expected,
                "{assigner} -> {target}"
            );
        }
    }

    #[test]
    fn test_sole_admin_cannot_be_removed() {
        let project_id = Uuid::now_v7();
        let a = member(project_id, Role::Admin);
        let b = member(project_id, Role::Manager);
        let members = [a.clone(), b.clone()];

        assert_eq!(
            RoleValidator::can_remove_member(&members, &a),
            Err(InvariantViolation::LastAdmin {
                project_id,
                user_id: a.user_id,
            })
        );
        assert!(RoleValidator::can_remove_member(&members, &b).is_ok());
    }

    #[test]
    fn test_sole_admin_cannot_be_demoted() {
        let project_id = Uuid::now_v7();
        let a = member(project_id, Role::Admin);
        let members = [a.clone(), member(project_id, Role::Member)];

        for new_role in [Role::Manager, Role::Member] {
            assert!(matches!(
                RoleValidator::can_change_role(&members, &a, new_role),
                Err(InvariantViolation::LastAdmin { .. })
            ));
        }

        assert!(RoleValidator::can_change_role(&members, &a, Role::Admin).is_ok());
    }

    #[test]
    fn test_two_admins_allow_removal_and_demotion() {
        let project_id = Uuid::now_v7();
        let a = member(project_id, Role::Admin);
        let b = member(project_id, Role::Admin);
        let members = [a.clone(), b.clone()];

        for target in [&a, &b] {
            assert!(RoleValidator::can_remove_member(&members, target).is_ok());
            assert!(RoleValidator::can_change_role(&members, target, Role::Member).is_ok());
        }
    }

    #[test]
    fn test_inactive_admins_are_not_counted() {
        let project_id = Uuid::now_v7();
        let a = member(project_id, Role::Admin);
        let dormant = member(project_id, Role::Admin).with_active(false);
        let members = [a.clone(), dormant.clone()];

        assert!(RoleValidator::can_remove_member(&members, &a).is_err());

        // Dropping an inactive admin never lowers the active count.
        assert!(RoleValidator::can_remove_member(&members, &dormant).is_ok());
    }

    #[test]
    fn test_admins_of_other_projects_are_not_counted() {
        let project_id = Uuid::now_v7();
        let a = member(project_id, Role::Admin);
        let elsewhere = member(Uuid::now_v7(), Role::Admin);
        let members = [a.clone(), elsewhere];

        assert!(RoleValidator::can_remove_member(&members, &a).is_err());
    }

    #[test]
    fn test_target_matched_by_identity_not_value() {
        let project_id = Uuid::now_v7();
        let a = member(project_id, Role::Admin);

        // A stale copy of the target must still be excluded from the count.
        let mut stale = a.clone();
        stale.touch();
        let members = [stale];

        assert!(RoleValidator::can_remove_member(&members, &a).is_err());
    }
}
