use chrono::{DateTime, Utc};

use taskflow_core::{DomainResult, Entity, ProjectId, TaskId};

use crate::{optional_text, required_text};

pub const MAX_TITLE_LEN: usize = 200;
pub const MAX_TASK_DESCRIPTION_LEN: usize = 1000;

/// The two states a task can be in. `toggle` is the only transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    Pending,
    Completed,
}

/// A task inside a project.
///
/// Tasks carry no owner of their own: whoever owns `project_id` owns the task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    pub project_id: ProjectId,
    pub created_at: DateTime<Utc>,
}

impl Task {
    /// New tasks start out pending.
    pub fn create(project_id: ProjectId, draft: TaskDraft, now: DateTime<Utc>) -> Self {
        Self {
            id: TaskId::new(),
            title: draft.title,
            description: draft.description,
            completed: false,
            project_id,
            created_at: now,
        }
    }

    pub fn status(&self) -> TaskStatus {
        if self.completed {
            TaskStatus::Completed
        } else {
            TaskStatus::Pending
        }
    }

    pub fn toggle(&mut self) {
        self.completed = !self.completed;
    }
}

impl Entity for Task {
    type Id = TaskId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Validated title/description for a new task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDraft {
    title: String,
    description: Option<String>,
}

impl TaskDraft {
    pub fn new(title: &str, description: Option<&str>) -> DomainResult<Self> {
        Ok(Self {
            title: required_text("title", title, MAX_TITLE_LEN)?,
            description: optional_text("description", description, MAX_TASK_DESCRIPTION_LEN)?,
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }
}
