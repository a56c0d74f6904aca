use std::collections::BTreeSet;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type TaskId = Uuid;
pub type ProjectId = Uuid;

/// Task priority. Variant order is column order on a priority board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::High, Priority::Medium, Priority::Low];

    pub fn label(self) -> &'static str {
        match self {
            Priority::High => "High",
            Priority::Medium => "Medium",
            Priority::Low => "Low",
        }
    }
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Medium
    }
}

/// Where a task came from. Only timeline tasks get bars and dependency wiring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskSource {
    Timeline,
    AdHoc,
}

/// A single task as held by the task store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub project_id: ProjectId,
    pub title: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    /// Fallback end marker, only consulted when `end_date` is absent.
    pub deadline: Option<NaiveDate>,
    /// Predecessors of this task.
    #[serde(default)]
    pub dependencies: BTreeSet<TaskId>,
    pub completed: bool,
    /// Percent complete, 0..=100.
    pub progress: u8,
    pub priority: Priority,
    pub source: TaskSource,
}

impl Task {
    /// Create a new, unscheduled timeline task.
    pub fn new(project_id: ProjectId, title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            project_id,
            title: title.into(),
            start_date: None,
            end_date: None,
            deadline: None,
            dependencies: BTreeSet::new(),
            completed: false,
            progress: 0,
            priority: Priority::default(),
            source: TaskSource::Timeline,
        }
    }

    /// Create a timeline task spanning `start..=end`.
    pub fn scheduled(
        project_id: ProjectId,
        title: impl Into<String>,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Self {
        let mut task = Self::new(project_id, title);
        task.start_date = Some(start);
        task.end_date = Some(end);
        task
    }

    pub fn is_timeline(&self) -> bool {
        self.source == TaskSource::Timeline
    }

    pub fn is_scheduled(&self) -> bool {
        self.start_date.is_some()
    }

    /// End marker used for drawing: `end_date`, else `deadline`.
    pub fn bar_end(&self) -> Option<NaiveDate> {
        self.end_date.or(self.deadline)
    }

    /// Check the per-task invariants: no self-dependency and `start <= end`.
    pub fn validate(&self) -> Result<(), TaskValidationError> {
        if self.dependencies.contains(&self.id) {
            return Err(TaskValidationError::SelfDependency(self.id));
        }
        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            if start > end {
                return Err(TaskValidationError::InvertedRange { start, end });
            }
        }
        Ok(())
    }

    /// Apply a patch in place. Fields absent from the patch are left untouched.
    pub fn apply(&mut self, patch: &TaskPatch) {
        if let Some(title) = &patch.title {
            self.title = title.clone();
        }
        if let Some(start) = patch.start_date {
            self.start_date = Some(start);
        }
        if let Some(end) = patch.end_date {
            self.end_date = Some(end);
        }
        if let Some(deadline) = patch.deadline {
            self.deadline = Some(deadline);
        }
        if let Some(completed) = patch.completed {
            self.completed = completed;
        }
        if let Some(progress) = patch.progress {
            self.progress = progress.min(100);
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
        if let Some(deps) = &patch.dependencies {
            self.dependencies = deps.clone();
        }
    }
}

/// A partial update to a task, keyed by id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskPatch {
    pub id: TaskId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dependencies: Option<BTreeSet<TaskId>>,
}

impl TaskPatch {
    pub fn new(id: TaskId) -> Self {
        Self {
            id,
            ..Default::default()
        }
    }

    /// True when the patch carries no field changes.
    pub fn is_empty(&self) -> bool {
        *self == Self::new(self.id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskValidationError {
    SelfDependency(TaskId),
    InvertedRange { start: NaiveDate, end: NaiveDate },
}

impl fmt::Display for TaskValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SelfDependency(id) => write!(f, "task {id} depends on itself"),
            Self::InvertedRange { start, end } => {
                write!(f, "start date {start} is after end date {end}")
            }
        }
    }
}

impl std::error::Error for TaskValidationError {}
