//! Data-access port for projects and tasks.

use async_trait::async_trait;

use taskflow_core::{DomainResult, ProjectId, TaskId, UserId};

use crate::{Project, ProjectDraft, Task};

/// Project/task persistence.
///
/// Every method that touches an existing row takes the caller's `owner` and
/// must apply it inside the same atomic unit as the read or write, so an
/// ownership check can never race with the operation it guards. "Not owned"
/// and "does not exist" are reported the same way (`None` / `false`).
///
/// Listings come back newest first: `created_at` descending, ties broken by
/// id descending (see [`crate::sort_newest_first`]). Callers do not re-sort.
#[async_trait]
pub trait ProjectStore: Send + Sync {
    /// All projects owned by `owner`, newest first.
    async fn list_projects(&self, owner: UserId) -> DomainResult<Vec<Project>>;

    async fn insert_project(&self, project: &Project) -> DomainResult<()>;

    /// Apply `draft` to the project, returning the stored result.
    async fn update_project(
        &self,
        owner: UserId,
        id: ProjectId,
        draft: &ProjectDraft,
    ) -> DomainResult<Option<Project>>;

    /// Delete the project and every task under it as one unit.
    ///
    /// Returns `false` (and deletes nothing) if the project is not owned by
    /// `owner`.
    async fn delete_project(&self, owner: UserId, id: ProjectId) -> DomainResult<bool>;

    /// Tasks of an owned project, newest first, read from a single consistent
    /// snapshot.
    async fn list_tasks(&self, owner: UserId, project: ProjectId) -> DomainResult<Option<Vec<Task>>>;

    /// Insert `task` if its project is owned by `owner`.
    async fn insert_task(&self, owner: UserId, task: &Task) -> DomainResult<bool>;

    /// Flip `completed` on a task reachable by `owner`, returning the new state.
    async fn toggle_task(&self, owner: UserId, id: TaskId) -> DomainResult<Option<Task>>;
}
