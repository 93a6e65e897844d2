//! Conservation project records: listing, creation and vote tallies.
//!
//! ## Votes
//!
//! [`ProjectStore::vote`] is the only operation that rewrites an existing
//! record. It reads the payload, bumps one counter and writes the whole
//! payload back, with no lock or version check in between. Two votes landing
//! on the same project at the same time can lose one increment, so tallies
//! are approximate under concurrent load. Nothing stops an identity from
//! voting more than once.

use serde::Serialize;
use tracing::info;

use crate::codec;
use crate::errors::{RegistryError, Result};
use crate::records::{
    new_project_id, now_secs, NewProject, Project, ProjectPayload, ProjectStatus,
    PROJECT_NAMESPACE,
};
use crate::registry::Registry;
use crate::store::OpaqueStore;

pub struct ProjectStore<S> {
    registry: Registry<S>,
}

impl<S: OpaqueStore> ProjectStore<S> {
    pub fn new(store: S) -> Self {
        Self {
            registry: Registry::new(store, PROJECT_NAMESPACE),
        }
    }

    /// All readable projects, newest first.
    pub async fn list(&self) -> Vec<Project> {
        let mut projects: Vec<Project> = self
            .registry
            .load_records::<ProjectPayload>()
            .await
            .into_iter()
            .map(|(id, payload)| Project::from_payload(id, payload))
            .collect();
        projects.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        projects
    }

    /// A single project, or `None` if nothing is stored under `id`.
    pub async fn get(&self, id: &str) -> Result<Option<Project>> {
        Ok(self
            .load_payload(id)
            .await?
            .map(|payload| Project::from_payload(id, payload)))
    }

    /// Seal the numeric fields, store a new `pending` project and list it.
    ///
    /// `name` and `location` must be non-blank and both numbers non-zero and
    /// finite; otherwise nothing is written.
    ///
    /// The record is written before its id is appended. If the append fails
    /// the record stays in the store unlisted and the error is returned.
    pub async fn create(&self, proposer: &str, fields: NewProject) -> Result<String> {
        validate_new_project(&fields)?;
        self.ensure_available().await?;

        let id = new_project_id();
        let payload = ProjectPayload {
            name: fields.name,
            location: fields.location,
            budget: codec::encode(fields.budget),
            species_count: codec::encode(fields.species_count),
            description: fields.description,
            timestamp: now_secs(),
            proposer: proposer.to_string(),
            status: ProjectStatus::Pending,
            votes_for: 0,
            votes_against: 0,
            extra: Default::default(),
        };

        self.registry
            .put_record(&id, &serde_json::to_vec(&payload)?)
            .await?;
        self.registry.append_key(&id).await?;

        info!("Project {id} submitted by {proposer}");
        Ok(id)
    }

    /// Add one vote for (`support == true`) or against the project `id`.
    ///
    /// Fails with [`RegistryError::NotFound`] before writing anything when
    /// the project does not exist.
    pub async fn vote(&self, id: &str, support: bool) -> Result<Project> {
        self.ensure_available().await?;

        let mut payload = self
            .load_payload(id)
            .await?
            .ok_or_else(|| RegistryError::NotFound {
                kind: "Project",
                id: id.to_string(),
            })?;

        if support {
            payload.votes_for = payload.votes_for.saturating_add(1);
        } else {
            payload.votes_against = payload.votes_against.saturating_add(1);
        }

        self.registry
            .put_record(id, &serde_json::to_vec(&payload)?)
            .await?;

        info!(
            "Vote {} on {id}: {} for / {} against",
            if support { "for" } else { "against" },
            payload.votes_for,
            payload.votes_against
        );
        Ok(Project::from_payload(id, payload))
    }

    async fn load_payload(&self, id: &str) -> Result<Option<ProjectPayload>> {
        match self.registry.get_record(id).await? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    async fn ensure_available(&self) -> Result<()> {
        if self.registry.is_available().await? {
            Ok(())
        } else {
            Err(RegistryError::Unavailable)
        }
    }
}

fn validate_new_project(fields: &NewProject) -> Result<()> {
    if fields.name.trim().is_empty() || fields.location.trim().is_empty() {
        return Err(RegistryError::InvalidInput(
            "project name and location are required".to_string(),
        ));
    }
    for (label, value) in [("budget", fields.budget), ("species count", fields.species_count)] {
        if value == 0.0 || !value.is_finite() {
            return Err(RegistryError::InvalidInput(format!(
                "project {label} must be a non-zero number"
            )));
        }
    }
    Ok(())
}

/// Dashboard counts by governance status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ProjectStats {
    pub total: usize,
    pub approved: usize,
    pub pending: usize,
    pub rejected: usize,
}

impl ProjectStats {
    pub fn from_projects(projects: &[Project]) -> Self {
        projects.iter().fold(
            ProjectStats {
                total: projects.len(),
                ..Default::default()
            },
            |mut stats, p| {
                match p.status {
                    ProjectStatus::Approved => stats.approved += 1,
                    ProjectStatus::Pending => stats.pending += 1,
                    ProjectStatus::Rejected => stats.rejected += 1,
                }
                stats
            },
        )
    }
}
