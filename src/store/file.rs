use std::path::{Path, PathBuf};

use crate::io::file::{load_project, save_project};
use crate::io::IoError;
use crate::model::{Project, ProjectId, Task, TaskPatch};

use super::{apply_patch, StoreError, TaskStore};

/// A single project document persisted as JSON. Every successful update is
/// written back before it is reported.
#[derive(Debug)]
pub struct ProjectFileStore {
    project: Project,
    path: PathBuf,
}

impl ProjectFileStore {
    /// Load `path`, or start an empty project there when the file does not exist yet.
    pub fn open(path: impl Into<PathBuf>, name: &str) -> Result<Self, StoreError> {
        let path = path.into();
        let project = if path.exists() {
            let project = load_project(&path)?;
            log::info!(
                "loaded project '{}' ({} tasks) from {}",
                project.name,
                project.tasks.len(),
                path.display()
            );
            project
        } else {
            log::info!("starting new project '{}' at {}", name, path.display());
            Project::new(name)
        };
        Ok(Self { project, path })
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Add a task and persist. Nothing is kept when the write fails.
    pub fn insert(&mut self, task: Task) -> Result<(), StoreError> {
        self.project.tasks.push(task);
        if let Err(err) = self.flush() {
            self.project.tasks.pop();
            return Err(err);
        }
        Ok(())
    }

    pub fn flush(&mut self) -> Result<(), StoreError> {
        self.project.touch();
        save_project(&self.project, &self.path)?;
        Ok(())
    }
}

impl TaskStore for ProjectFileStore {
    fn get_tasks(&self, project: ProjectId) -> Vec<Task> {
        self.project
            .tasks
            .iter()
            .filter(|t| t.project_id == project)
            .cloned()
            .collect()
    }

    fn update_task(&mut self, patch: TaskPatch) -> Result<Task, StoreError> {
        let previous = self.project.tasks.clone();
        let updated = apply_patch(&mut self.project.tasks, &patch)?;
        if let Err(err) = self.flush() {
            self.project.tasks = previous;
            return Err(err);
        }
        Ok(updated)
    }
}

impl From<IoError> for StoreError {
    fn from(err: IoError) -> Self {
        match err {
            IoError::Io(err) => StoreError::Io(err),
            IoError::Json(err) => StoreError::Serialization(err),
            other => StoreError::Invalid(other.to_string()),
        }
    }
}
