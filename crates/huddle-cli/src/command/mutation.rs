//! Commands that change memberships.

use std::io::Write;

use huddle_core::{Permission, ProjectMember, Role};
use huddle_store::StoreResult;
use uuid::Uuid;

use super::{OverrideValue, Outcome, Session, deny_or_fail};

/// Creates the first `ADMIN` of a project.
pub(super) async fn init(
    session: &Session,
    user_id: Uuid,
    out: &mut impl Write,
) -> anyhow::Result<Outcome> {
    let project_id = session.project_id_or_new();
    let result = session.service().bootstrap_owner(project_id, user_id).await;
    report(result, out, |member| {
        format!(
            "created project {} owned by {}",
            member.project_id, member.user_id
        )
    })
}

/// Adds a user to the project on behalf of an existing member.
pub(super) async fn add(
    session: &Session,
    actor_id: Uuid,
    user_id: Uuid,
    role: Role,
    out: &mut impl Write,
) -> anyhow::Result<Outcome> {
    let project_id = session.project_id()?;
    let result = session
        .service()
        .add_member(project_id, actor_id, user_id, role)
        .await;
    report(result, out, |member| {
        format!("added {} as {}", member.user_id, member.role)
    })
}

/// Removes a member, or lets a member leave when actor and user match.
pub(super) async fn remove(
    session: &Session,
    actor_id: Uuid,
    user_id: Uuid,
    out: &mut impl Write,
) -> anyhow::Result<Outcome> {
    let project_id = session.project_id()?;
    let result = session
        .service()
        .remove_member(project_id, actor_id, user_id)
        .await;
    report(result, out, |member| format!("removed {}", member.user_id))
}

/// Changes the role of a member.
pub(super) async fn change_role(
    session: &Session,
    actor_id: Uuid,
    user_id: Uuid,
    role: Role,
    out: &mut impl Write,
) -> anyhow::Result<Outcome> {
    let project_id = session.project_id()?;
    let result = session
        .service()
        .change_role(project_id, actor_id, user_id, role)
        .await;
    report(result, out, |member| {
        format!("{} is now {}", member.user_id, member.role)
    })
}

/// Sets or clears a permission override on a member.
pub(super) async fn set_override(
    session: &Session,
    actor_id: Uuid,
    user_id: Uuid,
    permission: Permission,
    value: OverrideValue,
    out: &mut impl Write,
) -> anyhow::Result<Outcome> {
    let project_id = session.project_id()?;
    let service = session.service();

    let result = match value {
        OverrideValue::Allow | OverrideValue::Deny => {
            let granted = value == OverrideValue::Allow;
            service
                .set_permission_override(project_id, actor_id, user_id, permission, granted)
                .await
        }
        OverrideValue::Clear => {
            service
                .clear_permission_override(project_id, actor_id, user_id, permission)
                .await
        }
    };

    report(result, out, |member| {
        match member.custom_permissions.get(permission) {
            Some(granted) => format!("{permission} overridden to {granted} for {}", member.user_id),
            None => format!("{permission} follows the role default for {}", member.user_id),
        }
    })
}

fn report(
    result: StoreResult<ProjectMember>,
    out: &mut impl Write,
    describe: impl FnOnce(&ProjectMember) -> String,
) -> anyhow::Result<Outcome> {
    match result {
        Ok(member) => {
            writeln!(out, "{}", describe(&member))?;
            Ok(Outcome::Permitted)
        }
        Err(err) => deny_or_fail(err, out),
    }
}
