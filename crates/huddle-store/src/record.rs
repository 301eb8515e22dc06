//! Persisted project member row.

use huddle_core::{ConfigurationError, CustomPermissions, ProjectMember, Role};
use jiff::Timestamp;
#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::TRACING_TARGET_RECORD;

/// A row of the `project_members` table, as stored.
///
/// The role is kept as text and `custom_permissions` as a JSON object, so a
/// row may hold identifiers outside the closed role and permission sets.
/// [`MemberRecord::into_member`] validates them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct MemberRecord {
    /// Reference to the project.
    pub project_id: Uuid,
    /// Reference to the member's user account.
    pub user_id: Uuid,
    /// Role identifier.
    pub role: String,
    /// Whether the membership is active.
    #[serde(default = "default_active")]
    pub is_active: bool,
    /// Permission overrides keyed by permission identifier.
    #[serde(default)]
    pub custom_permissions: serde_json::Value,
    /// Timestamp when membership was created.
    #[serde(default = "Timestamp::now")]
    pub created_at: Timestamp,
    /// Timestamp when membership was last updated.
    #[serde(default = "Timestamp::now")]
    pub updated_at: Timestamp,
}

const fn default_active() -> bool {
    true
}

impl MemberRecord {
    /// Validates the row and converts it into a typed member.
    pub fn into_member(self) -> Result<ProjectMember, ConfigurationError> {
        let role: Role = self.role.parse().map_err(|_| {
            tracing::error!(
                target: TRACING_TARGET_RECORD,
                project_id = %self.project_id,
                user_id = %self.user_id,
                role = %self.role,
                "stored member has an unknown role"
            );
            ConfigurationError::UnknownRole(self.role.clone())
        })?;

        let custom_permissions =
            CustomPermissions::from_json(&self.custom_permissions).inspect_err(|err| {
                tracing::error!(
                    target: TRACING_TARGET_RECORD,
                    project_id = %self.project_id,
                    user_id = %self.user_id,
                    error = %err,
                    "stored member has malformed permission overrides"
                );
            })?;

        Ok(ProjectMember {
            project_id: self.project_id,
            user_id: self.user_id,
            role,
            is_active: self.is_active,
            custom_permissions,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl From<&ProjectMember> for MemberRecord {
    fn from(member: &ProjectMember) -> Self {
        Self {
            project_id: member.project_id,
            user_id: member.user_id,
            role: member.role.as_str().to_owned(),
            is_active: member.is_active,
            custom_permissions: member.custom_permissions.to_json(),
            created_at: member.created_at,
            updated_at: member.updated_at,
        }
    }
}

impl From<ProjectMember> for MemberRecord {
    fn from(member: ProjectMember) -> Self {
        Self::from(&member)
    }
}

impl TryFrom<MemberRecord> for ProjectMember {
    type Error = ConfigurationError;

    fn try_from(record: MemberRecord) -> Result<Self, Self::Error> {
        record.into_member()
    }
}

#[cfg(test)]
mod tests {
    use huddle_core::Permission;
    use serde_json::json;

    use super::*;

    fn record(role: &str, custom_permissions: serde_json::Value) -> MemberRecord {
        MemberRecord {
            project_id: Uuid::now_v7(),
            user_id: Uuid::now_v7(),
            role: role.to_owned(),
            is_active: true,
            custom_permissions,
            created_at: Timestamp::now(),
            updated_at: Timestamp::now(),
        }
    }

    #[test]
    fn test_valid_record_converts() {
        let member = record("manager", json!({ "task.assign": false }))
            .into_member()
            .unwrap();

        assert_eq!(member.role, Role::Manager);
        assert_eq!(
            member.custom_permissions.get(Permission::TaskAssign),
            Some(false)
        );
    }

    #[test]
    fn test_unknown_role_is_configuration_error() {
        let err = record("OWNER", json!({})).into_member().unwrap_err();
        assert_eq!(err, ConfigurationError::UnknownRole("OWNER".into()));
    }

    #[test]
    fn test_unknown_permission_is_configuration_error() {
        let err = ProjectMember::try_from(record("MEMBER", json!({ "voice.transcribe": true })))
            .unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::UnknownPermission("voice.transcribe".into())
        );
    }

    #[test]
    fn test_member_to_record() {
        let member = ProjectMember::new(Uuid::now_v7(), Uuid::now_v7(), Role::Admin)
            .with_override(Permission::FileShare, false);
        let record = MemberRecord::from(&member);

        assert_eq!(record.role, "ADMIN");
        assert_eq!(record.custom_permissions, json!({ "file.share": false }));
        assert_eq!(record.into_member().unwrap(), member);
    }
}
