use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use taskflow_core::{DomainResult, ProjectId, TaskId, UserId};
use taskflow_projects::{Project, ProjectDraft, ProjectStore, Task};

use super::rows::{PROJECT_COLUMNS, ProjectRow, TASK_COLUMNS, TaskRow};
use crate::error::map_sqlx_error;

/// Project/task store backed by the `projects` and `tasks` tables.
#[derive(Debug, Clone)]
pub struct PostgresProjectStore {
    pool: PgPool,
}

impl PostgresProjectStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProjectStore for PostgresProjectStore {
    #[instrument(skip(self), fields(user_id = %owner), err)]
    async fn list_projects(&self, owner: UserId) -> DomainResult<Vec<Project>> {
        let sql = format!(
            "SELECT {PROJECT_COLUMNS} FROM projects WHERE owner_id = $1 \
             ORDER BY created_at DESC, id DESC"
        );
        let rows = sqlx::query_as::<_, ProjectRow>(&sql)
            .bind(owner.as_uuid())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_projects", e))?;

        Ok(rows.into_iter().map(Project::from).collect())
    }

    #[instrument(skip_all, fields(project_id = %project.id, user_id = %project.owner_id), err)]
    async fn insert_project(&self, project: &Project) -> DomainResult<()> {
        sqlx::query(
            "INSERT INTO projects (id, owner_id, name, description, created_at) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(project.id.as_uuid())
        .bind(project.owner_id.as_uuid())
        .bind(&project.name)
        .bind(&project.description)
        .bind(project.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_project", e))?;
        Ok(())
    }

    #[instrument(skip(self, draft), fields(user_id = %owner, project_id = %id), err)]
    async fn update_project(
        &self,
        owner: UserId,
        id: ProjectId,
        draft: &ProjectDraft,
    ) -> DomainResult<Option<Project>> {
        let sql = format!(
            "UPDATE projects SET name = $3, description = $4 \
             WHERE id = $1 AND owner_id = $2 \
             RETURNING {PROJECT_COLUMNS}"
        );
        let row = sqlx::query_as::<_, ProjectRow>(&sql)
            .bind(id.as_uuid())
            .bind(owner.as_uuid())
            .bind(draft.name())
            .bind(draft.description())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("update_project", e))?;

        Ok(row.map(Project::from))
    }

    #[instrument(skip(self), fields(user_id = %owner, project_id = %id), err)]
    async fn delete_project(&self, owner: UserId, id: ProjectId) -> DomainResult<bool> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("delete_project_begin", e))?;

        // Lock the parent so no task can be inserted under it mid-delete.
        let owned = sqlx::query("SELECT id FROM projects WHERE id = $1 AND owner_id = $2 FOR UPDATE")
            .bind(id.as_uuid())
            .bind(owner.as_uuid())
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("delete_project_lock", e))?;

        if owned.is_none() {
            tx.rollback()
                .await
                .map_err(|e| map_sqlx_error("delete_project_rollback", e))?;
            return Ok(false);
        }

        sqlx::query("DELETE FROM tasks WHERE project_id = $1")
            .bind(id.as_uuid())
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("delete_project_tasks", e))?;

        sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("delete_project", e))?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("delete_project_commit", e))?;
        Ok(true)
    }

    #[instrument(skip(self), fields(user_id = %owner, project_id = %project), err)]
    async fn list_tasks(&self, owner: UserId, project: ProjectId) -> DomainResult<Option<Vec<Task>>> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("list_tasks_begin", e))?;

        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ")
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("list_tasks_isolation", e))?;

        let owned = sqlx::query("SELECT id FROM projects WHERE id = $1 AND owner_id = $2")
            .bind(project.as_uuid())
            .bind(owner.as_uuid())
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("list_tasks_owner", e))?;

        if owned.is_none() {
            tx.rollback()
                .await
                .map_err(|e| map_sqlx_error("list_tasks_rollback", e))?;
            return Ok(None);
        }

        let sql = format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE project_id = $1 \
             ORDER BY created_at DESC, id DESC"
        );
        let rows = sqlx::query_as::<_, TaskRow>(&sql)
            .bind(project.as_uuid())
            .fetch_all(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("list_tasks", e))?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("list_tasks_commit", e))?;

        Ok(Some(rows.into_iter().map(Task::from).collect()))
    }

    /// The ownership check is part of the insert itself: the row is produced
    /// by a `SELECT` over the caller's projects, so nothing is written when
    /// the parent is missing or foreign.
    #[instrument(skip_all, fields(user_id = %owner, task_id = %task.id, project_id = %task.project_id), err)]
    async fn insert_task(&self, owner: UserId, task: &Task) -> DomainResult<bool> {
        let result = sqlx::query(
            "INSERT INTO tasks (id, project_id, title, description, completed, created_at) \
             SELECT $1, p.id, $3, $4, $5, $6 FROM projects p \
             WHERE p.id = $2 AND p.owner_id = $7",
        )
        .bind(task.id.as_uuid())
        .bind(task.project_id.as_uuid())
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.completed)
        .bind(task.created_at)
        .bind(owner.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_task", e))?;

        Ok(result.rows_affected() == 1)
    }

    #[instrument(skip(self), fields(user_id = %owner, task_id = %id), err)]
    async fn toggle_task(&self, owner: UserId, id: TaskId) -> DomainResult<Option<Task>> {
        let row = sqlx::query_as::<_, TaskRow>(
            "UPDATE tasks t SET completed = NOT t.completed \
             FROM projects p \
             WHERE t.id = $1 AND p.id = t.project_id AND p.owner_id = $2 \
             RETURNING t.id, t.project_id, t.title, t.description, t.completed, t.created_at",
        )
        .bind(id.as_uuid())
        .bind(owner.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("toggle_task", e))?;

        Ok(row.map(Task::from))
    }
}
