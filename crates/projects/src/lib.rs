//! Projects domain module.
//!
//! Business rules for projects and their tasks, plus the ownership-scoped
//! service every protected operation goes through. Storage is reached through
//! the [`ProjectStore`] port (no IO, no HTTP here).

pub mod project;
pub mod service;
pub mod store;
pub mod task;

pub use project::{MAX_DESCRIPTION_LEN, MAX_NAME_LEN, Project, ProjectDraft};
pub use service::ProjectService;
pub use store::ProjectStore;
pub use task::{MAX_TASK_DESCRIPTION_LEN, MAX_TITLE_LEN, Task, TaskDraft, TaskStatus};

use taskflow_core::{DomainError, DomainResult};

/// Control characters other than tab and line breaks (NUL in particular)
/// are refused by the SQL store, so they are rejected up front.
fn check_characters(field: &str, value: &str) -> DomainResult<()> {
    if value
        .chars()
        .any(|c| c.is_control() && !matches!(c, '\t' | '\n' | '\r'))
    {
        return Err(DomainError::validation(format!(
            "{field} must not contain control characters"
        )));
    }
    Ok(())
}

/// Trim `value` and check it is non-empty and at most `max` characters.
pub(crate) fn required_text(field: &str, value: &str, max: usize) -> DomainResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(DomainError::validation(format!("{field} cannot be empty")));
    }
    check_characters(field, value)?;
    if value.chars().count() > max {
        return Err(DomainError::validation(format!(
            "{field} must be at most {max} characters"
        )));
    }
    Ok(value.to_string())
}

pub(crate) fn optional_text(field: &str, value: Option<&str>, max: usize) -> DomainResult<Option<String>> {
    match value {
        Some(v) if v.chars().count() > max => Err(DomainError::validation(format!(
            "{field} must be at most {max} characters"
        ))),
        Some(v) => {
            check_characters(field, v)?;
            Ok(Some(v.to_string()))
        }
        None => Ok(None),
    }
}

/// Sort newest first. Keys are `(created_at, id)`; ids are time-ordered, so
/// equal timestamps still fall back to creation order.
pub fn sort_newest_first<T, K: Ord>(items: &mut [T], key: impl Fn(&T) -> K) {
    items.sort_by(|a, b| key(b).cmp(&key(a)));
}
