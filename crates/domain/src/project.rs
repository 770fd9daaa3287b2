//! Projects and their photos, as seen by dashboards.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::filter::Dated;
use crate::identity::id::ProfileId;
use crate::identity::profile::{Profile, Role};

/// Construction progress of a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProjectStatus {
    Planning,
    InProgress,
    OnHold,
    Completed,
}

/// A homeowner's build, optionally run by a builder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
    pub address: String,
    pub status: ProjectStatus,
    pub homeowner_id: ProfileId,
    pub homeowner_name: Option<String>,
    pub builder_id: Option<ProfileId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A photo attached to a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectImage {
    pub id: String,
    pub project_id: String,
    pub url: String,
    pub caption: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Dated for ProjectImage {
    fn date(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl Dated for Project {
    fn date(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Projects `viewer` may list. Builders only see the projects they run.
pub fn projects_visible_to<'a>(
    viewer: &Profile,
    projects: &'a [Project],
) -> Vec<&'a Project> {
    match viewer.role {
        Role::Builder => projects
            .iter()
            .filter(|project| project.builder_id.as_ref() == Some(&viewer.id))
            .collect(),
        Role::Admin | Role::Homeowner => projects.iter().collect(),
    }
}

/// Number of projects owned by `homeowner_id`.
pub fn project_count_for(
    homeowner_id: &ProfileId,
    projects: &[Project],
) -> usize {
    projects
        .iter()
        .filter(|project| &project.homeowner_id == homeowner_id)
        .count()
}
