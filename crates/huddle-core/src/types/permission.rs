//! Permission identifiers and their categories.

#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

use super::Role;

/// Broad grouping of permissions, used for display and reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[derive(Serialize, Deserialize, Display, EnumIter, EnumString, IntoStaticStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PermissionCategory {
    /// Project metadata and lifecycle.
    Project,
    /// Task creation, assignment and completion.
    Task,
    /// Membership and role management.
    Member,
    /// Chat channels and messages.
    Chat,
    /// Shared files and attachments.
    File,
}

/// Granular project permission gating a single action.
///
/// The persisted identifier is the dotted form (`task.assign`, `member.remove`).
/// Permissions are a flat set: no permission implies another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[derive(Serialize, Deserialize, Display, EnumIter, EnumString, IntoStaticStr)]
pub enum Permission {
    // Project-level permissions
    /// Can view project information.
    #[serde(rename = "project.view")]
    #[strum(serialize = "project.view")]
    ProjectView,
    /// Can update project name and description.
    #[serde(rename = "project.update")]
    #[strum(serialize = "project.update")]
    ProjectUpdate,
    /// Can manage the project as a whole (ownership, integrations).
    #[serde(rename = "project.manage")]
    #[strum(serialize = "project.manage")]
    ProjectManage,
    /// Can archive and restore the project.
    #[serde(rename = "project.archive")]
    #[strum(serialize = "project.archive")]
    ProjectArchive,
    /// Can delete the entire project.
    #[serde(rename = "project.delete")]
    #[strum(serialize = "project.delete")]
    ProjectDelete,
    /// Can change project settings.
    #[serde(rename = "project.settings")]
    #[strum(serialize = "project.settings")]
    ProjectSettings,

    // Task permissions
    /// Can view tasks.
    #[serde(rename = "task.view")]
    #[strum(serialize = "task.view")]
    TaskView,
    /// Can create new tasks.
    #[serde(rename = "task.create")]
    #[strum(serialize = "task.create")]
    TaskCreate,
    /// Can edit existing tasks.
    #[serde(rename = "task.update")]
    #[strum(serialize = "task.update")]
    TaskUpdate,
    /// Can delete tasks.
    #[serde(rename = "task.delete")]
    #[strum(serialize = "task.delete")]
    TaskDelete,
    /// Can assign tasks to other members.
    #[serde(rename = "task.assign")]
    #[strum(serialize = "task.assign")]
    TaskAssign,
    /// Can mark tasks as complete.
    #[serde(rename = "task.complete")]
    #[strum(serialize = "task.complete")]
    TaskComplete,
    /// Can comment on tasks.
    #[serde(rename = "task.comment")]
    #[strum(serialize = "task.comment")]
    TaskComment,

    // Member management permissions
    /// Can view project members and their roles.
    #[serde(rename = "member.view")]
    #[strum(serialize = "member.view")]
    MemberView,
    /// Can invite new members.
    #[serde(rename = "member.invite")]
    #[strum(serialize = "member.invite")]
    MemberInvite,
    /// Can remove members from the project.
    #[serde(rename = "member.remove")]
    #[strum(serialize = "member.remove")]
    MemberRemove,
    /// Can change member roles.
    #[serde(rename = "member.assign_role")]
    #[strum(serialize = "member.assign_role")]
    MemberAssignRole,
    /// Can grant or revoke per-member permission overrides.
    #[serde(rename = "member.manage_permissions")]
    #[strum(serialize = "member.manage_permissions")]
    MemberManagePermissions,

    // Chat permissions
    /// Can read chat messages.
    #[serde(rename = "chat.read")]
    #[strum(serialize = "chat.read")]
    ChatRead,
    /// Can send chat messages.
    #[serde(rename = "chat.send")]
    #[strum(serialize = "chat.send")]
    ChatSend,
    /// Can edit own chat messages.
    #[serde(rename = "chat.edit")]
    #[strum(serialize = "chat.edit")]
    ChatEdit,
    /// Can delete any chat message.
    #[serde(rename = "chat.delete")]
    #[strum(serialize = "chat.delete")]
    ChatDelete,
    /// Can pin chat messages.
    #[serde(rename = "chat.pin")]
    #[strum(serialize = "chat.pin")]
    ChatPin,
    /// Can send voice messages.
    #[serde(rename = "chat.voice")]
    #[strum(serialize = "chat.voice")]
    ChatVoice,
    /// Can mention every member at once.
    #[serde(rename = "chat.mention_all")]
    #[strum(serialize = "chat.mention_all")]
    ChatMentionAll,

    // File permissions
    /// Can view the file list.
    #[serde(rename = "file.view")]
    #[strum(serialize = "file.view")]
    FileView,
    /// Can upload files.
    #[serde(rename = "file.upload")]
    #[strum(serialize = "file.upload")]
    FileUpload,
    /// Can download files.
    #[serde(rename = "file.download")]
    #[strum(serialize = "file.download")]
    FileDownload,
    /// Can delete files.
    #[serde(rename = "file.delete")]
    #[strum(serialize = "file.delete")]
    FileDelete,
    /// Can share files outside the project.
    #[serde(rename = "file.share")]
    #[strum(serialize = "file.share")]
    FileShare,
}

impl Permission {
    /// Returns the category this permission belongs to.
    pub const fn category(self) -> PermissionCategory {
        match self {
            Self::ProjectView
            | Self::ProjectUpdate
            | Self::ProjectManage
            | Self::ProjectArchive
            | Self::ProjectDelete
            | Self::ProjectSettings => PermissionCategory::Project,

            Self::TaskView
            | Self::TaskCreate
            | Self::TaskUpdate
            | Self::TaskDelete
            | Self::TaskAssign
            | Self::TaskComplete
            | Self::TaskComment => PermissionCategory::Task,

            Self::MemberView
            | Self::MemberInvite
            | Self::MemberRemove
            | Self::MemberAssignRole
            | Self::MemberManagePermissions => PermissionCategory::Member,

            Self::ChatRead
            | Self::ChatSend
            | Self::ChatEdit
            | Self::ChatDelete
            | Self::ChatPin
            | Self::ChatVoice
            | Self::ChatMentionAll => PermissionCategory::Chat,

            Self::FileView
            | Self::FileUpload
            | Self::FileDownload
            | Self::FileDelete
            | Self::FileShare => PermissionCategory::File,
        }
    }

    /// Returns the lowest role granted this permission by the built-in table.
    pub const fn minimum_role(self) -> Role {
        match self {
            Self::ProjectView
            | Self::TaskView
            | Self::TaskCreate
            | Self::TaskUpdate
            | Self::TaskComplete
            | Self::TaskComment
            | Self::MemberView
            | Self::ChatRead
            | Self::ChatSend
            | Self::ChatEdit
            | Self::ChatVoice
            | Self::FileView
            | Self::FileUpload
            | Self::FileDownload => Role::Member,

            Self::ProjectUpdate
            | Self::ProjectArchive
            | Self::TaskDelete
            | Self::TaskAssign
            | Self::MemberInvite
            | Self::MemberAssignRole
            | Self::ChatDelete
            | Self::ChatPin
            | Self::ChatMentionAll
            | Self::FileDelete
            | Self::FileShare => Role::Manager,

            Self::ProjectManage
            | Self::ProjectDelete
            | Self::ProjectSettings
            | Self::MemberRemove
            | Self::MemberManagePermissions => Role::Admin,
        }
    }

    /// Checks if the built-in table grants this permission to the given role.
    pub const fn is_granted_by_default(self, role: Role) -> bool {
        role.has_weight_of(self.minimum_role())
    }

    /// Returns true if this is a read-only permission that doesn't modify anything.
    #[must_use]
    pub const fn is_read_only(self) -> bool {
        matches!(
            self,
            Self::ProjectView | Self::TaskView | Self::MemberView | Self::ChatRead | Self::FileView
        )
    }

    /// Returns the persisted identifier of this permission.
    #[inline]
    pub fn as_str(self) -> &'static str {
        self.into()
    }

    /// Returns all permissions in the given category.
    pub fn in_category(category: PermissionCategory) -> impl Iterator<Item = Self> {
        Self::iter().filter(move |perm| perm.category() == category)
    }

    /// Returns a human-readable description of the permission.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::ProjectView => "View project information",
            Self::ProjectUpdate => "Update project name and description",
            Self::ProjectManage => "Manage ownership and integrations",
            Self::ProjectArchive => "Archive and restore the project",
            Self::ProjectDelete => "Delete the entire project",
            Self::ProjectSettings => "Change project settings",
            Self::TaskView => "View tasks",
            Self::TaskCreate => "Create new tasks",
            Self::TaskUpdate => "Edit existing tasks",
            Self::TaskDelete => "Delete tasks",
            Self::TaskAssign => "Assign tasks to members",
            Self::TaskComplete => "Mark tasks as complete",
            Self::TaskComment => "Comment on tasks",
            Self::MemberView => "View project members and their roles",
            Self::MemberInvite => "Invite new members",
            Self::MemberRemove => "Remove members from the project",
            Self::MemberAssignRole => "Change member roles",
            Self::MemberManagePermissions => "Grant or revoke member permission overrides",
            Self::ChatRead => "Read chat messages",
            Self::ChatSend => "Send chat messages",
            Self::ChatEdit => "Edit own chat messages",
            Self::ChatDelete => "Delete any chat message",
            Self::ChatPin => "Pin chat messages",
            Self::ChatVoice => "Send voice messages",
            Self::ChatMentionAll => "Mention every member at once",
            Self::FileView => "View shared files",
            Self::FileUpload => "Upload files",
            Self::FileDownload => "Download files",
            Self::FileDelete => "Delete files",
            Self::FileShare => "Share files outside the project",
        }
    }
}

// Compile-time assertions on the built-in table.
const _: () = {
    assert!(Permission::ProjectDelete.is_granted_by_default(Role::Admin));
    assert!(!Permission::ProjectDelete.is_granted_by_default(Role::Manager));
    assert!(Permission::TaskAssign.is_granted_by_default(Role::Manager));
    assert!(!Permission::TaskAssign.is_granted_by_default(Role::Member));
    assert!(!Permission::MemberRemove.is_granted_by_default(Role::Manager));
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permission_count_and_categories() {
        assert_eq!(Permission::iter().count(), 30);
        assert_eq!(Permission::in_category(PermissionCategory::Project).count(), 6);
        assert_eq!(Permission::in_category(PermissionCategory::Task).count(), 7);
        assert_eq!(Permission::in_category(PermissionCategory::Member).count(), 5);
        assert_eq!(Permission::in_category(PermissionCategory::Chat).count(), 7);
        assert_eq!(Permission::in_category(PermissionCategory::File).count(), 5);
    }

    #[test]
    fn test_identifiers_match_category_prefix() {
        for perm in Permission::iter() {
            let prefix = perm.category().to_string();
            assert!(
                perm.as_str().starts_with(&format!("{prefix}.")),
                "{perm} is not prefixed by {prefix}"
            );
        }
    }

    #[test]
    fn test_parse_identifier() {
        assert_eq!(
            "task.assign".parse::<Permission>().ok(),
            Some(Permission::TaskAssign)
        );
        assert_eq!(
            "member.remove".parse::<Permission>().ok(),
            Some(Permission::MemberRemove)
        );
        assert!("task.teleport".parse::<Permission>().is_err());
        assert!("TaskAssign".parse::<Permission>().is_err());
    }

    #[test]
    fn test_serde_matches_display() {
        for perm in Permission::iter() {
            let json = serde_json::to_string(&perm).unwrap();
            assert_eq!(json, format!("\"{perm}\""));
        }
    }

    #[test]
    fn test_default_grants_are_nested() {
        for perm in Permission::iter() {
            if perm.is_granted_by_default(Role::Member) {
                assert!(perm.is_granted_by_default(Role::Manager));
            }
            if perm.is_granted_by_default(Role::Manager) {
                assert!(perm.is_granted_by_default(Role::Admin));
            }
            assert!(perm.is_granted_by_default(Role::Admin));
        }
    }

    #[test]
    fn test_read_only_permissions_are_member_level() {
        for perm in Permission::iter().filter(|p| p.is_read_only()) {
            assert_eq!(perm.minimum_role(), Role::Member, "{perm}");
        }
    }

    #[test]
    fn test_permission_descriptions() {
        assert_eq!(Permission::TaskAssign.description(), "Assign tasks to members");
        assert_eq!(
            Permission::MemberRemove.description(),
            "Remove members from the project"
        );
    }
}
