//! Ownership-scoped resource service.
//!
//! Every operation takes the authenticated caller's id. A project (or task)
//! that belongs to somebody else is indistinguishable from one that does not
//! exist: both surface as [`DomainError::NotFound`].

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, instrument};

use taskflow_core::{DomainError, DomainResult, ProjectId, TaskId, UserId};

use crate::{Project, ProjectDraft, ProjectStore, Task, TaskDraft};

#[derive(Clone)]
pub struct ProjectService {
    store: Arc<dyn ProjectStore>,
}

impl ProjectService {
    pub fn new(store: Arc<dyn ProjectStore>) -> Self {
        Self { store }
    }

    /// Projects owned by `user`, newest first.
    #[instrument(skip(self), fields(user_id = %user))]
    pub async fn list_projects(&self, user: UserId) -> DomainResult<Vec<Project>> {
        self.store.list_projects(user).await
    }

    #[instrument(skip(self, name, description), fields(user_id = %user))]
    pub async fn create_project(
        &self,
        user: UserId,
        name: &str,
        description: Option<&str>,
    ) -> DomainResult<Project> {
        let draft = ProjectDraft::new(name, description)?;
        let project = Project::create(user, draft, Utc::now());
        self.store.insert_project(&project).await?;

        info!(project_id = %project.id, "project created");
        Ok(project)
    }

    #[instrument(skip(self, name, description), fields(user_id = %user, project_id = %id))]
    pub async fn update_project(
        &self,
        user: UserId,
        id: ProjectId,
        name: &str,
        description: Option<&str>,
    ) -> DomainResult<Project> {
        let draft = ProjectDraft::new(name, description)?;
        let project = self
            .store
            .update_project(user, id, &draft)
            .await?
            .ok_or_else(|| not_visible("update_project"))?;

        info!("project updated");
        Ok(project)
    }

    /// Delete an owned project together with all of its tasks.
    #[instrument(skip(self), fields(user_id = %user, project_id = %id))]
    pub async fn delete_project(&self, user: UserId, id: ProjectId) -> DomainResult<()> {
        if !self.store.delete_project(user, id).await? {
            return Err(not_visible("delete_project"));
        }

        info!("project deleted");
        Ok(())
    }

    /// Tasks of an owned project, newest first.
    #[instrument(skip(self), fields(user_id = %user, project_id = %project))]
    pub async fn list_tasks(&self, user: UserId, project: ProjectId) -> DomainResult<Vec<Task>> {
        self.store
            .list_tasks(user, project)
            .await?
            .ok_or_else(|| not_visible("list_tasks"))
    }

    #[instrument(skip(self, title, description), fields(user_id = %user, project_id = %project))]
    pub async fn create_task(
        &self,
        user: UserId,
        project: ProjectId,
        title: &str,
        description: Option<&str>,
    ) -> DomainResult<Task> {
        let draft = TaskDraft::new(title, description)?;
        let task = Task::create(project, draft, Utc::now());
        if !self.store.insert_task(user, &task).await? {
            return Err(not_visible("create_task"));
        }

        info!(task_id = %task.id, "task created");
        Ok(task)
    }

    /// Flip a task between pending and completed.
    ///
    /// The task must sit under a project owned by `user`.
    #[instrument(skip(self), fields(user_id = %user, task_id = %id))]
    pub async fn toggle_task(&self, user: UserId, id: TaskId) -> DomainResult<Task> {
        let task = self
            .store
            .toggle_task(user, id)
            .await?
            .ok_or_else(|| not_visible("toggle_task"))?;

        info!(completed = task.completed, "task toggled");
        Ok(task)
    }
}

fn not_visible(operation: &'static str) -> DomainError {
    debug!(operation, "resource missing or owned by another user");
    DomainError::NotFound
}
