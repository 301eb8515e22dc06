//! Evaluation session over a loaded member snapshot.

use std::sync::Arc;

use anyhow::anyhow;
use huddle_core::PermissionChecker;
use huddle_store::{InMemoryMemberStore, MembershipService};
use uuid::Uuid;

use crate::TRACING_TARGET_COMMAND;
use crate::config::EvaluatorConfig;

/// Loaded snapshot, rule tables and the service operating on them.
#[derive(Debug)]
pub struct Session {
    config: EvaluatorConfig,
    project_id: anyhow::Result<Uuid>,
    service: MembershipService<InMemoryMemberStore>,
}

impl Session {
    /// Loads the role defaults and member snapshot named by `config`.
    pub async fn open(config: EvaluatorConfig) -> anyhow::Result<Self> {
        let defaults = config.load_role_defaults().await?;
        let records = config.load_records().await?;
        let project_id = config.resolve_project(&records);

        tracing::debug!(
            target: TRACING_TARGET_COMMAND,
            rows = records.len(),
            project_id = ?project_id.as_ref().ok(),
            "session opened"
        );

        let repository = Arc::new(InMemoryMemberStore::with_records(records));
        let checker = PermissionChecker::new(Arc::new(defaults));

        Ok(Self {
            config,
            project_id,
            service: MembershipService::new(repository, checker),
        })
    }

    /// Returns the membership service.
    #[inline]
    pub fn service(&self) -> &MembershipService<InMemoryMemberStore> {
        &self.service
    }

    /// Returns the project the session operates on.
    ///
    /// Fails with the reason the project could not be resolved.
    pub fn project_id(&self) -> anyhow::Result<Uuid> {
        match &self.project_id {
            Ok(project_id) => Ok(*project_id),
            Err(err) => Err(anyhow!("{err:#}")),
        }
    }

    /// Returns the session project, or a fresh project ID if there is none.
    pub fn project_id_or_new(&self) -> Uuid {
        self.project_id.as_ref().copied().unwrap_or_else(|_| Uuid::now_v7())
    }

    /// Writes the current rows back to the snapshot when `--write` is set.
    pub async fn persist(&self) -> anyhow::Result<()> {
        if !self.config.write {
            tracing::debug!(
                target: TRACING_TARGET_COMMAND,
                "snapshot left unchanged, --write not set"
            );
            return Ok(());
        }

        let records = self.service.repository().snapshot().await;
        self.config.store_records(&records).await
    }
}
