use chrono::{DateTime, Utc};

use taskflow_core::{DomainResult, Entity, ProjectId, UserId};

use crate::{optional_text, required_text};

pub const MAX_NAME_LEN: usize = 150;
pub const MAX_DESCRIPTION_LEN: usize = 500;

/// A project, owned by exactly one user for its whole life.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    pub description: Option<String>,
    /// Fixed at creation; never taken from client input.
    pub owner_id: UserId,
    pub created_at: DateTime<Utc>,
}

impl Project {
    /// Build a new project owned by `owner` with a server-generated id.
    pub fn create(owner: UserId, draft: ProjectDraft, now: DateTime<Utc>) -> Self {
        Self {
            id: ProjectId::new(),
            name: draft.name,
            description: draft.description,
            owner_id: owner,
            created_at: now,
        }
    }

    pub fn is_owned_by(&self, user: UserId) -> bool {
        self.owner_id == user
    }

    /// Overwrite the editable fields. Owner and id never change.
    pub fn apply(&mut self, draft: &ProjectDraft) {
        self.name = draft.name.clone();
        self.description = draft.description.clone();
    }
}

impl Entity for Project {
    type Id = ProjectId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Validated name/description pair used by create and update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectDraft {
    name: String,
    description: Option<String>,
}

impl ProjectDraft {
    pub fn new(name: &str, description: Option<&str>) -> DomainResult<Self> {
        Ok(Self {
            name: required_text("name", name, MAX_NAME_LEN)?,
            description: optional_text("description", description, MAX_DESCRIPTION_LEN)?,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}
