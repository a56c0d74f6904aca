//! Pointer gesture state machine for task bars.
//!
//! A gesture runs from pointer-down to pointer-up. While it runs only the
//! pending day offset changes; the task record is untouched until release,
//! when [`resolve`] turns the gesture into at most one proposed change.

use std::fmt;

use chrono::NaiveDate;

use crate::model::timeline::{column_to_offset_days, shift};
use crate::model::{Task, TaskId, TaskPatch};

/// What the pointer went down on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GestureMode {
    /// The bar body.
    Move,
    /// The left resize handle.
    ResizeStart,
    /// The right resize handle.
    ResizeEnd,
    /// The connection handle.
    Connect,
}

/// The in-flight gesture. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActiveGesture {
    pub task_id: TaskId,
    pub mode: GestureMode,
    pub pointer_origin_x: f32,
    pub pending_day_offset: i64,
}

impl ActiveGesture {
    /// Dates to draw for `task` while this gesture is live. An offset that runs
    /// off the calendar draws the bar where it is.
    pub fn preview(&self, start: NaiveDate, end: NaiveDate) -> (NaiveDate, NaiveDate) {
        let offset = self.pending_day_offset;
        let moved = match self.mode {
            GestureMode::Move => shift(start, offset).zip(shift(end, offset)),
            GestureMode::ResizeStart => shift(start, offset).map(|s| (s, end)),
            GestureMode::ResizeEnd => shift(end, offset).map(|e| (start, e)),
            GestureMode::Connect => None,
        };
        moved.unwrap_or((start, end))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureError {
    AlreadyActive(TaskId),
    UnknownTask(TaskId),
    NotOnTimeline(TaskId),
    Unscheduled(TaskId),
}

impl fmt::Display for GestureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyActive(id) => write!(f, "a gesture on task {id} is already in progress"),
            Self::UnknownTask(id) => write!(f, "task {id} does not exist in this project"),
            Self::NotOnTimeline(id) => write!(f, "task {id} is not managed by the timeline"),
            Self::Unscheduled(id) => write!(f, "task {id} has no bar to drag"),
        }
    }
}

impl std::error::Error for GestureError {}

/// Why a released gesture committed nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    SelfDependency,
    CycleDetected,
    /// The new dates would put the start after the end, or off the calendar.
    InvalidRange,
    /// A connect gesture was released away from any other bar.
    NoTarget,
    UnknownTask(TaskId),
    Unscheduled(TaskId),
}

impl Rejection {
    /// Text for a transient notice, for the rejections worth telling the user about.
    pub fn user_message(&self) -> Option<&'static str> {
        match self {
            Rejection::CycleDetected => Some("cannot create circular dependency"),
            Rejection::SelfDependency => Some("a task cannot depend on itself"),
            _ => None,
        }
    }
}

/// What a released gesture asks for, before it touches the graph or the store.
#[derive(Debug, Clone, PartialEq)]
pub enum Proposal {
    Reschedule(TaskPatch),
    /// `dependent` should gain `predecessor`.
    Connect {
        dependent: TaskId,
        predecessor: TaskId,
    },
    Click(TaskId),
    Reject(Rejection),
}

/// Holder of the single optional gesture.
#[derive(Debug, Clone, Default)]
pub struct Interaction {
    active: Option<ActiveGesture>,
}

impl Interaction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> Option<&ActiveGesture> {
        self.active.as_ref()
    }

    pub fn is_idle(&self) -> bool {
        self.active.is_none()
    }

    pub fn begin(
        &mut self,
        task_id: TaskId,
        mode: GestureMode,
        pointer_x: f32,
    ) -> Result<(), GestureError> {
        if let Some(active) = &self.active {
            return Err(GestureError::AlreadyActive(active.task_id));
        }
        log::debug!("gesture {mode:?} started on {task_id} at x={pointer_x}");
        self.active = Some(ActiveGesture {
            task_id,
            mode,
            pointer_origin_x: pointer_x,
            pending_day_offset: 0,
        });
        Ok(())
    }

    /// Recompute the pending offset from the current pointer position.
    /// Returns the new offset, or `None` when idle.
    pub fn update(&mut self, pointer_x: f32, cell_width: f32) -> Option<i64> {
        let active = self.active.as_mut()?;
        active.pending_day_offset =
            column_to_offset_days(pointer_x - active.pointer_origin_x, cell_width);
        Some(active.pending_day_offset)
    }

    /// End the gesture, handing back its final state.
    pub fn finish(&mut self) -> Option<ActiveGesture> {
        self.active.take()
    }
}

/// Decide what a released gesture proposes for `task` (the gesture's own task).
/// `target` is the bar under the pointer at release, if any.
pub fn resolve(gesture: &ActiveGesture, task: &Task, target: Option<TaskId>) -> Proposal {
    let offset = gesture.pending_day_offset;
    let id = gesture.task_id;

    match gesture.mode {
        GestureMode::Connect => connect(id, offset, target),
        _ if offset == 0 => Proposal::Click(id),
        GestureMode::Move => move_bar(task, offset),
        GestureMode::ResizeStart => resize_start(task, offset),
        GestureMode::ResizeEnd => resize_end(task, offset),
    }
}

fn connect(origin: TaskId, offset: i64, target: Option<TaskId>) -> Proposal {
    // Convention: the bar the drag started on is the predecessor, the bar it
    // is released over becomes the dependent.
    match target {
        Some(dependent) if dependent != origin => Proposal::Connect {
            dependent,
            predecessor: origin,
        },
        _ if offset == 0 => Proposal::Click(origin),
        Some(_) => {
            log::warn!("connect gesture on {origin} released over itself");
            Proposal::Reject(Rejection::SelfDependency)
        }
        None => Proposal::Reject(Rejection::NoTarget),
    }
}

/// Shift both ends, keeping the duration. A deadline-only end is written as `end_date`.
fn move_bar(task: &Task, offset: i64) -> Proposal {
    let Some(start) = task.start_date else {
        return Proposal::Reject(Rejection::Unscheduled(task.id));
    };
    let Some(new_start) = shift(start, offset) else {
        return Proposal::Reject(Rejection::InvalidRange);
    };
    let new_end = match task.bar_end() {
        Some(end) => match shift(end, offset) {
            Some(end) => Some(end),
            None => return Proposal::Reject(Rejection::InvalidRange),
        },
        None => None,
    };
    let mut patch = TaskPatch::new(task.id);
    patch.start_date = Some(new_start);
    patch.end_date = new_end;
    Proposal::Reschedule(patch)
}

fn resize_start(task: &Task, offset: i64) -> Proposal {
    let Some(start) = task.start_date else {
        return Proposal::Reject(Rejection::Unscheduled(task.id));
    };
    let Some(new_start) = shift(start, offset) else {
        return Proposal::Reject(Rejection::InvalidRange);
    };
    if task.bar_end().is_some_and(|end| new_start > end) {
        return Proposal::Reject(Rejection::InvalidRange);
    }
    let mut patch = TaskPatch::new(task.id);
    patch.start_date = Some(new_start);
    Proposal::Reschedule(patch)
}

fn resize_end(task: &Task, offset: i64) -> Proposal {
    let (Some(start), Some(end)) = (task.start_date, task.bar_end()) else {
        return Proposal::Reject(Rejection::Unscheduled(task.id));
    };
    let Some(new_end) = shift(end, offset).filter(|e| *e >= start) else {
        return Proposal::Reject(Rejection::InvalidRange);
    };
    let mut patch = TaskPatch::new(task.id);
    patch.end_date = Some(new_end);
    Proposal::Reschedule(patch)
}
