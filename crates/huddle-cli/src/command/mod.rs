//! Subcommands and their exit semantics.

mod mutation;
mod query;
mod session;

use std::io::Write;

use clap::{Subcommand, ValueEnum};
use huddle_core::{Permission, Role};
use huddle_store::StoreError;
use uuid::Uuid;

pub use self::session::Session;
use crate::TRACING_TARGET_COMMAND;

/// Result of a command that completed without an operational error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum Outcome {
    /// The action is permitted, or was applied.
    Permitted,
    /// The action is not permitted, or was rejected by a membership rule.
    Denied,
}

impl Outcome {
    /// Returns the process exit code for this outcome.
    pub const fn exit_code(self) -> i32 {
        match self {
            Self::Permitted => 0,
            Self::Denied => 1,
        }
    }

    fn from_bool(permitted: bool) -> Self {
        if permitted {
            Self::Permitted
        } else {
            Self::Denied
        }
    }
}

/// Value of a permission override.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OverrideValue {
    /// Grant the permission regardless of role.
    Allow,
    /// Revoke the permission regardless of role.
    Deny,
    /// Remove the override so the role default applies.
    Clear,
}

/// Available subcommands.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Prints the default permissions of every role.
    Roles,

    /// Checks whether a member with one role may assign another role.
    CanAssign {
        /// Role of the member making the assignment.
        assigner: Role,
        /// Role being assigned.
        target: Role,
    },

    /// Checks whether a user holds a permission in the project.
    Check {
        /// User to check.
        #[arg(long)]
        user: Uuid,
        /// Permission identifier, e.g. `task.assign`.
        permission: Permission,
    },

    /// Lists every permission a user holds in the project.
    Permissions {
        /// User to inspect.
        #[arg(long)]
        user: Uuid,
    },

    /// Lists the members of the project.
    Members,

    /// Creates a project owned by a single `ADMIN`.
    ///
    /// Uses `--project` when given, otherwise a freshly generated ID.
    Init {
        /// User becoming the project owner.
        #[arg(long)]
        user: Uuid,
    },

    /// Adds a user to the project.
    Add {
        /// Member performing the change.
        #[arg(long)]
        actor: Uuid,
        /// User to add.
        #[arg(long)]
        user: Uuid,
        /// Role to give the new member.
        #[arg(default_value_t = Role::Member)]
        role: Role,
    },

    /// Removes a member from the project.
    Remove {
        /// Member performing the change; defaults to the user leaving.
        #[arg(long)]
        actor: Option<Uuid>,
        /// Member to remove.
        #[arg(long)]
        user: Uuid,
    },

    /// Changes the role of a member.
    ChangeRole {
        /// Member performing the change.
        #[arg(long)]
        actor: Uuid,
        /// Member whose role changes.
        #[arg(long)]
        user: Uuid,
        /// New role.
        role: Role,
    },

    /// Sets or clears a permission override on a member.
    Override {
        /// Member performing the change.
        #[arg(long)]
        actor: Uuid,
        /// Member receiving the override.
        #[arg(long)]
        user: Uuid,
        /// Permission identifier, e.g. `file.share`.
        permission: Permission,
        /// Override value.
        #[arg(value_enum)]
        value: OverrideValue,
    },
}

impl Command {
    /// Returns the subcommand name as typed on the command line.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Roles => "roles",
            Self::CanAssign { .. } => "can-assign",
            Self::Check { .. } => "check",
            Self::Permissions { .. } => "permissions",
            Self::Members => "members",
            Self::Init { .. } => "init",
            Self::Add { .. } => "add",
            Self::Remove { .. } => "remove",
            Self::ChangeRole { .. } => "change-role",
            Self::Override { .. } => "override",
        }
    }

    /// Returns whether the command reads the member snapshot.
    pub fn needs_members(&self) -> bool {
        !matches!(self, Self::Roles | Self::CanAssign { .. })
    }

    /// Returns whether the command changes memberships.
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            Self::Init { .. }
                | Self::Add { .. }
                | Self::Remove { .. }
                | Self::ChangeRole { .. }
                | Self::Override { .. }
        )
    }

    /// Runs the command, writing its report to `out`.
    pub async fn execute(self, session: &Session, out: &mut impl Write) -> anyhow::Result<Outcome> {
        tracing::debug!(
            target: TRACING_TARGET_COMMAND,
            command = self.name(),
            "executing command"
        );

        let is_mutation = self.is_mutation();
        let outcome = match self {
            Self::Roles => query::roles(session, out),
            Self::CanAssign { assigner, target } => query::can_assign(assigner, target, out),
            Self::Check { user, permission } => query::check(session, user, permission, out).await,
            Self::Permissions { user } => query::permissions(session, user, out).await,
            Self::Members => query::members(session, out).await,
            Self::Init { user } => mutation::init(session, user, out).await,
            Self::Add { actor, user, role } => mutation::add(session, actor, user, role, out).await,
            Self::Remove { actor, user } => {
                mutation::remove(session, actor.unwrap_or(user), user, out).await
            }
            Self::ChangeRole { actor, user, role } => {
                mutation::change_role(session, actor, user, role, out).await
            }
            Self::Override {
                actor,
                user,
                permission,
                value,
            } => mutation::set_override(session, actor, user, permission, value, out).await,
        }?;

        if is_mutation && outcome == Outcome::Permitted {
            session.persist().await?;
        }

        Ok(outcome)
    }
}

/// Turns user-facing store errors into a denial, propagating the rest.
fn deny_or_fail(error: StoreError, out: &mut impl Write) -> anyhow::Result<Outcome> {
    if !error.is_user_facing() {
        return Err(error.into());
    }

    tracing::info!(
        target: TRACING_TARGET_COMMAND,
        error = %error,
        "operation denied"
    );

    match error.as_invariant() {
        Some(violation) => writeln!(out, "denied: {}", violation.user_message())?,
        None => writeln!(out, "denied: {error}")?,
    }

    Ok(Outcome::Denied)
}
