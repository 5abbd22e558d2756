//! In-memory stores for tests/dev.
//!
//! Projects and tasks share one lock, so a cascading delete, an ownership
//! check and the write it guards always happen as a single unit.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use taskflow_auth::{User, UserStore};
use taskflow_core::{DomainResult, Entity, ProjectId, TaskId, UserId};
use taskflow_projects::{Project, ProjectDraft, ProjectStore, Task, sort_newest_first};

use crate::error::StoreError;

fn read<'a, T>(lock: &'a RwLock<T>, operation: &'static str) -> Result<RwLockReadGuard<'a, T>, StoreError> {
    lock.read().map_err(|_| StoreError::Poisoned(operation))
}

fn write<'a, T>(lock: &'a RwLock<T>, operation: &'static str) -> Result<RwLockWriteGuard<'a, T>, StoreError> {
    lock.write().map_err(|_| StoreError::Poisoned(operation))
}

/// Users keyed by normalised email.
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    inner: RwLock<HashMap<String, User>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn find_by_email(&self, email: &str) -> DomainResult<Option<User>> {
        let map = read(&self.inner, "find_user_by_email")?;
        Ok(map.get(email).cloned())
    }

    async fn insert(&self, user: &User) -> DomainResult<()> {
        let mut map = write(&self.inner, "insert_user")?;
        if map.contains_key(&user.email) {
            return Err(StoreError::UniqueViolation {
                operation: "insert_user",
                message: "users_email_key".to_string(),
            }
            .into());
        }
        map.insert(user.email.clone(), user.clone());
        Ok(())
    }
}

#[derive(Debug, Default)]
struct Tables {
    projects: HashMap<ProjectId, Project>,
    tasks: HashMap<TaskId, Task>,
}

impl Tables {
    fn owned_project(&self, owner: UserId, id: ProjectId) -> Option<&Project> {
        self.projects.get(&id).filter(|p| p.is_owned_by(owner))
    }

    fn owns_task(&self, owner: UserId, task: &Task) -> bool {
        self.owned_project(owner, task.project_id).is_some()
    }
}

#[derive(Debug, Default)]
pub struct InMemoryProjectStore {
    inner: RwLock<Tables>,
}

impl InMemoryProjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw task count for a project id, ignoring ownership. Used to check
    /// that cascades leave no orphans behind.
    #[cfg(test)]
    pub(crate) fn task_count(&self, project: ProjectId) -> usize {
        self.inner
            .read()
            .map(|t| t.tasks.values().filter(|task| task.project_id == project).count())
            .unwrap_or_default()
    }
}

#[async_trait]
impl ProjectStore for InMemoryProjectStore {
    async fn list_projects(&self, owner: UserId) -> DomainResult<Vec<Project>> {
        let tables = read(&self.inner, "list_projects")?;
        let mut projects: Vec<Project> = tables
            .projects
            .values()
            .filter(|p| p.is_owned_by(owner))
            .cloned()
            .collect();
        sort_newest_first(&mut projects, |p| (p.created_at, p.id));
        Ok(projects)
    }

    async fn insert_project(&self, project: &Project) -> DomainResult<()> {
        let mut tables = write(&self.inner, "insert_project")?;
        tables.projects.insert(*project.id(), project.clone());
        Ok(())
    }

    async fn update_project(
        &self,
        owner: UserId,
        id: ProjectId,
        draft: &ProjectDraft,
    ) -> DomainResult<Option<Project>> {
        let mut tables = write(&self.inner, "update_project")?;
        let updated = tables
            .projects
            .get_mut(&id)
            .filter(|p| p.is_owned_by(owner))
            .map(|p| {
                p.apply(draft);
                p.clone()
            });
        Ok(updated)
    }

    async fn delete_project(&self, owner: UserId, id: ProjectId) -> DomainResult<bool> {
        let mut tables = write(&self.inner, "delete_project")?;
        if tables.owned_project(owner, id).is_none() {
            return Ok(false);
        }

        // Children first, then the parent; both under the same guard.
        tables.tasks.retain(|_, task| task.project_id != id);
        tables.projects.remove(&id);
        Ok(true)
    }

    async fn list_tasks(&self, owner: UserId, project: ProjectId) -> DomainResult<Option<Vec<Task>>> {
        let tables = read(&self.inner, "list_tasks")?;
        if tables.owned_project(owner, project).is_none() {
            return Ok(None);
        }

        let mut tasks: Vec<Task> = tables
            .tasks
            .values()
            .filter(|t| t.project_id == project)
            .cloned()
            .collect();
        sort_newest_first(&mut tasks, |t| (t.created_at, t.id));
        Ok(Some(tasks))
    }

    async fn insert_task(&self, owner: UserId, task: &Task) -> DomainResult<bool> {
        let mut tables = write(&self.inner, "insert_task")?;
        if !tables.owns_task(owner, task) {
            return Ok(false);
        }
        tables.tasks.insert(*task.id(), task.clone());
        Ok(true)
    }

    async fn toggle_task(&self, owner: UserId, id: TaskId) -> DomainResult<Option<Task>> {
        let mut tables = write(&self.inner, "toggle_task")?;
        let visible = tables.tasks.get(&id).is_some_and(|t| tables.owns_task(owner, t));
        if !visible {
            return Ok(None);
        }

        Ok(tables.tasks.get_mut(&id).map(|task| {
            task.toggle();
            task.clone()
        }))
    }
}
