use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use taskflow_core::{ProjectId, TaskId, UserId};
use taskflow_projects::{Project, Task};

use crate::app::errors;

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    pub email: String,
    pub password: String,
}

/// Body of project create/update. Any `ownerId` the client sends is ignored.
#[derive(Debug, Deserialize)]
pub struct ProjectRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub project_id: String,
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct WhoAmIResponse {
    pub user_id: UserId,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectResponse {
    pub id: ProjectId,
    pub name: String,
    pub description: Option<String>,
    pub owner_id: UserId,
    pub created_at: DateTime<Utc>,
}

impl From<Project> for ProjectResponse {
    fn from(p: Project) -> Self {
        Self {
            id: p.id,
            name: p.name,
            description: p.description,
            owner_id: p.owner_id,
            created_at: p.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskResponse {
    pub id: TaskId,
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    pub project_id: ProjectId,
    pub created_at: DateTime<Utc>,
}

impl From<Task> for TaskResponse {
    fn from(t: Task) -> Self {
        Self {
            id: t.id,
            title: t.title,
            description: t.description,
            completed: t.completed,
            project_id: t.project_id,
            created_at: t.created_at,
        }
    }
}

// -------------------------
// Helpers
// -------------------------

/// Parse a client-supplied id. An id that cannot exist is reported like one
/// that does not.
pub fn parse_id<T: std::str::FromStr>(raw: &str) -> Result<T, axum::response::Response> {
    raw.trim().parse::<T>().map_err(|_| {
        errors::json_error(axum::http::StatusCode::NOT_FOUND, "not_found", "not found")
    })
}
