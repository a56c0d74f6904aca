//! Task store boundary.
//!
//! The chart engine never writes task records directly. It reads a project's
//! tasks through [`TaskStore::get_tasks`] and proposes every change as a
//! [`TaskPatch`] through [`TaskStore::update_task`].

pub mod file;
pub mod memory;

use std::fmt;

use crate::model::{ProjectId, Task, TaskId, TaskPatch};

pub use file::ProjectFileStore;
pub use memory::MemoryStore;

/// Authoritative holder of task records.
pub trait TaskStore {
    /// All tasks belonging to `project`, in display order.
    fn get_tasks(&self, project: ProjectId) -> Vec<Task>;

    /// Apply `patch` and return the updated record.
    fn update_task(&mut self, patch: TaskPatch) -> Result<Task, StoreError>;
}

#[derive(Debug)]
pub enum StoreError {
    NotFound(TaskId),
    Invalid(String),
    Io(std::io::Error),
    Serialization(serde_json::Error),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound(id) => write!(f, "task not found: {id}"),
            Self::Invalid(message) => write!(f, "rejected task update: {message}"),
            Self::Io(err) => write!(f, "task store I/O failed: {err}"),
            Self::Serialization(err) => write!(f, "task store serialization failed: {err}"),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Serialization(err) => Some(err),
            Self::NotFound(_) | Self::Invalid(_) => None,
        }
    }
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err)
    }
}

/// Apply `patch` to the matching task in `tasks`, refusing results that break
/// the per-task invariants. Shared by the bundled stores.
pub(crate) fn apply_patch(tasks: &mut [Task], patch: &TaskPatch) -> Result<Task, StoreError> {
    let task = tasks
        .iter_mut()
        .find(|t| t.id == patch.id)
        .ok_or(StoreError::NotFound(patch.id))?;

    let mut updated = task.clone();
    updated.apply(patch);
    updated
        .validate()
        .map_err(|err| StoreError::Invalid(err.to_string()))?;

    *task = updated.clone();
    Ok(updated)
}
