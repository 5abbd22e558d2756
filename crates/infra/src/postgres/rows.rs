//! Row types and their mapping onto domain values.

use chrono::{DateTime, Utc};
use sqlx::Row;
use sqlx::postgres::PgRow;
use uuid::Uuid;

use taskflow_auth::User;
use taskflow_core::{ProjectId, TaskId, UserId};
use taskflow_projects::{Project, Task};

pub(super) const PROJECT_COLUMNS: &str = "id, owner_id, name, description, created_at";
pub(super) const TASK_COLUMNS: &str = "id, project_id, title, description, completed, created_at";

#[derive(Debug)]
pub(super) struct UserRow {
    id: Uuid,
    email: String,
    password_hash: String,
}

impl<'r> sqlx::FromRow<'r, PgRow> for UserRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(UserRow {
            id: row.try_get("id")?,
            email: row.try_get("email")?,
            password_hash: row.try_get("password_hash")?,
        })
    }
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: UserId::from_uuid(row.id),
            email: row.email,
            password_hash: row.password_hash,
        }
    }
}

#[derive(Debug)]
pub(super) struct ProjectRow {
    id: Uuid,
    owner_id: Uuid,
    name: String,
    description: Option<String>,
    created_at: DateTime<Utc>,
}

impl<'r> sqlx::FromRow<'r, PgRow> for ProjectRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(ProjectRow {
            id: row.try_get("id")?,
            owner_id: row.try_get("owner_id")?,
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

impl From<ProjectRow> for Project {
    fn from(row: ProjectRow) -> Self {
        Project {
            id: ProjectId::from_uuid(row.id),
            name: row.name,
            description: row.description,
            owner_id: UserId::from_uuid(row.owner_id),
            created_at: row.created_at,
        }
    }
}

#[derive(Debug)]
pub(super) struct TaskRow {
    id: Uuid,
    project_id: Uuid,
    title: String,
    description: Option<String>,
    completed: bool,
    created_at: DateTime<Utc>,
}

impl<'r> sqlx::FromRow<'r, PgRow> for TaskRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(TaskRow {
            id: row.try_get("id")?,
            project_id: row.try_get("project_id")?,
            title: row.try_get("title")?,
            description: row.try_get("description")?,
            completed: row.try_get("completed")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

impl From<TaskRow> for Task {
    fn from(row: TaskRow) -> Self {
        Task {
            id: TaskId::from_uuid(row.id),
            title: row.title,
            description: row.description,
            completed: row.completed,
            project_id: ProjectId::from_uuid(row.project_id),
            created_at: row.created_at,
        }
    }
}
