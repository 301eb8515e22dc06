//! Member snapshot and rule configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result as AnyhowResult, anyhow};
use clap::Args;
use huddle_core::RolePermissionDefaults;
use huddle_store::MemberRecord;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::TRACING_TARGET_CONFIG;

/// Inputs the evaluator works against.
///
/// # Environment Variables
///
/// - `HUDDLE_MEMBERS` - Path to a JSON array of `project_members` rows
/// - `HUDDLE_ROLE_DEFAULTS` - Path to a role-defaults document (default: built-in table)
/// - `HUDDLE_PROJECT` - Project to operate on when the snapshot holds several
/// - `HUDDLE_WRITE` - Write applied mutations back to the snapshot
///
/// # Examples
///
/// ```bash
/// huddle --members ./members.json --project 0190... check --user 0191... task.assign
///
/// HUDDLE_MEMBERS=./members.json HUDDLE_WRITE=true huddle remove --actor 0190... --user 0191...
/// ```
#[derive(Debug, Clone, Default, Args, Serialize, Deserialize)]
#[must_use = "config does nothing unless you use it"]
pub struct EvaluatorConfig {
    /// Path to the member snapshot (a JSON array of membership rows).
    #[arg(long, env = "HUDDLE_MEMBERS")]
    pub members: Option<PathBuf>,

    /// Path to a role-defaults document.
    ///
    /// The document maps every role to its permission identifiers, `"*"`
    /// standing for all permissions. The built-in table is used when absent.
    #[arg(long, env = "HUDDLE_ROLE_DEFAULTS")]
    pub role_defaults: Option<PathBuf>,

    /// Project to operate on.
    ///
    /// May be omitted when every row of the snapshot belongs to one project.
    #[arg(long, env = "HUDDLE_PROJECT")]
    pub project: Option<Uuid>,

    /// Writes the snapshot back after a mutation has been applied.
    #[arg(long, env = "HUDDLE_WRITE")]
    #[serde(default)]
    pub write: bool,
}

impl EvaluatorConfig {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if a configured path is not a file, or if `--write`
    /// is set without a member snapshot.
    pub fn validate(&self) -> AnyhowResult<()> {
        if let Some(path) = &self.members {
            ensure_file(path, "member snapshot")?;
        }

        if let Some(path) = &self.role_defaults {
            ensure_file(path, "role defaults")?;
        }

        if self.write && self.members.is_none() {
            return Err(anyhow!("--write requires a member snapshot (--members)"));
        }

        Ok(())
    }

    /// Loads the role-defaults table, falling back to the built-in one.
    pub async fn load_role_defaults(&self) -> AnyhowResult<RolePermissionDefaults> {
        let Some(path) = &self.role_defaults else {
            return Ok(RolePermissionDefaults::builtin());
        };

        let document = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read role defaults from {}", path.display()))?;

        RolePermissionDefaults::from_json_str(&document)
            .with_context(|| format!("invalid role defaults in {}", path.display()))
    }

    /// Loads the raw membership rows of the snapshot.
    ///
    /// Rows are validated later, when the evaluator reads them.
    pub async fn load_records(&self) -> AnyhowResult<Vec<MemberRecord>> {
        let Some(path) = &self.members else {
            return Ok(Vec::new());
        };

        let document = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read member snapshot from {}", path.display()))?;

        serde_json::from_str(&document)
            .with_context(|| format!("malformed member snapshot in {}", path.display()))
    }

    /// Writes `records` back to the member snapshot.
    pub async fn store_records(&self, records: &[MemberRecord]) -> AnyhowResult<()> {
        let Some(path) = &self.members else {
            return Err(anyhow!("no member snapshot configured"));
        };

        let document =
            serde_json::to_string_pretty(records).context("failed to encode member snapshot")?;
        tokio::fs::write(path, document)
            .await
            .with_context(|| format!("failed to write member snapshot to {}", path.display()))?;

        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            path = %path.display(),
            rows = records.len(),
            "member snapshot written"
        );

        Ok(())
    }

    /// Resolves the project to operate on.
    ///
    /// Uses `--project` when given, otherwise the only project present in
    /// `records`.
    pub fn resolve_project(&self, records: &[MemberRecord]) -> AnyhowResult<Uuid> {
        if let Some(project_id) = self.project {
            return Ok(project_id);
        }

        let mut projects = records.iter().map(|record| record.project_id);
        let Some(first) = projects.next() else {
            return Err(anyhow!("member snapshot is empty; pass --project"));
        };

        if projects.any(|project_id| project_id != first) {
            return Err(anyhow!(
                "member snapshot spans several projects; pass --project"
            ));
        }

        Ok(first)
    }

    /// Logs the configuration at debug level.
    pub fn log(&self) {
        tracing::debug!(
            target: TRACING_TARGET_CONFIG,
            members = ?self.members,
            role_defaults = ?self.role_defaults,
            project = ?self.project,
            write = self.write,
            "evaluator configuration"
        );
    }
}

fn ensure_file(path: &Path, what: &str) -> AnyhowResult<()> {
    if !path.is_file() {
        return Err(anyhow!("{what} path {} is not a file", path.display()));
    }

    Ok(())
}
