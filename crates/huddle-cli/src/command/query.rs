//! Read-only commands.

use std::io::Write;

use huddle_core::prelude::*;
use huddle_store::Pagination;
use uuid::Uuid;

use super::{Outcome, Session, deny_or_fail};

/// Prints the default permissions of every role, grouped by category.
pub(super) fn roles(session: &Session, out: &mut impl Write) -> anyhow::Result<Outcome> {
    let defaults = session.service().checker().defaults();

    for role in Role::iter() {
        let granted = defaults.for_role(role);
        writeln!(
            out,
            "{role} (weight {}, {} permissions)",
            role.weight(),
            granted.len()
        )?;

        for category in PermissionCategory::iter() {
            let names: Vec<&str> = granted
                .iter()
                .filter(|permission| permission.category() == category)
                .map(|permission| permission.as_str())
                .collect();

            if !names.is_empty() {
                writeln!(out, "  {category}: {}", names.join(", "))?;
            }
        }
    }

    Ok(Outcome::Permitted)
}

/// Reports whether `assigner` may grant `target`.
pub(super) fn can_assign(
    assigner: Role,
    target: Role,
    out: &mut impl Write,
) -> anyhow::Result<Outcome> {
    let outcome = Outcome::from_bool(RoleValidator::can_assign(assigner, target));
    let verdict = match outcome {
        Outcome::Permitted => "can",
        Outcome::Denied => "cannot",
    };

    writeln!(out, "{assigner} {verdict} assign {target}")?;
    Ok(outcome)
}

/// Reports whether `user_id` holds `permission`.
pub(super) async fn check(
    session: &Session,
    user_id: Uuid,
    permission: Permission,
    out: &mut impl Write,
) -> anyhow::Result<Outcome> {
    let project_id = session.project_id()?;
    let held = match session
        .service()
        .has_permission(project_id, user_id, permission)
        .await
    {
        Ok(held) => held,
        Err(err) => return deny_or_fail(err, out),
    };

    let verdict = if held { "holds" } else { "lacks" };
    writeln!(out, "{user_id} {verdict} {permission}")?;
    Ok(Outcome::from_bool(held))
}

/// Lists every permission `user_id` holds.
pub(super) async fn permissions(
    session: &Session,
    user_id: Uuid,
    out: &mut impl Write,
) -> anyhow::Result<Outcome> {
    let project_id = session.project_id()?;
    let service = session.service();

    let member = match service.member(project_id, user_id).await {
        Ok(member) => member,
        Err(err) => return deny_or_fail(err, out),
    };

    let effective = service.checker().effective_permissions(&member);
    let status = if member.is_active { "active" } else { "inactive" };
    writeln!(
        out,
        "{user_id} ({}, {status}) holds {} permissions",
        member.role,
        effective.len()
    )?;

    for permission in &effective {
        let marker = match member.custom_permissions.get(*permission) {
            Some(true) => " (override)",
            _ => "",
        };
        writeln!(out, "  {permission}{marker}")?;
    }

    let revoked: Vec<&str> = member
        .custom_permissions
        .iter()
        .filter(|(_, granted)| !**granted)
        .map(|(permission, _)| permission.as_str())
        .collect();
    if !revoked.is_empty() {
        writeln!(out, "  revoked: {}", revoked.join(", "))?;
    }

    Ok(Outcome::Permitted)
}

/// Lists the members of the project.
pub(super) async fn members(session: &Session, out: &mut impl Write) -> anyhow::Result<Outcome> {
    let project_id = session.project_id()?;
    let service = session.service();

    let mut pagination = Pagination::default();
    loop {
        let page = match service.list_members(project_id, pagination).await {
            Ok(page) => page,
            Err(err) => return deny_or_fail(err, out),
        };

        for member in &page {
            let status = if member.is_active { "active" } else { "inactive" };
            write!(out, "{}  {:<7}  {status}", member.user_id, member.role)?;
            if !member.custom_permissions.is_empty() {
                let overrides: Vec<String> = member
                    .custom_permissions
                    .iter()
                    .map(|(permission, granted)| format!("{permission}={granted}"))
                    .collect();
                write!(out, "  [{}]", overrides.join(", "))?;
            }
            writeln!(out)?;
        }

        if page.len() < pagination.limit {
            break;
        }
        pagination = pagination.next();
    }

    Ok(Outcome::Permitted)
}
