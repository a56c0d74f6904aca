//! Interactive timeline and board for one project.
//!
//! [`GanttChart`] ties the pieces together: render queries read the store and
//! overlay the live gesture, event handlers drive the gesture state machine
//! and commit at most one [`TaskPatch`] per gesture or card drop.

pub mod board;
pub mod dependency_graph;
pub mod interaction;

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::config::Settings;
use crate::model::timeline::{MAX_CELL_WIDTH, MIN_CELL_WIDTH};
use crate::model::{ProjectId, Task, TaskId, TaskPatch, TimelineViewport};
use crate::store::{StoreError, TaskStore};

pub use board::{status, BoardLayout, BoardStatus, BucketKey, CardDrop, GroupBy};
pub use dependency_graph::{DependencyCurve, DependencyError, DependencyGraph, EdgeChange};
pub use interaction::{ActiveGesture, GestureError, GestureMode, Interaction, Proposal, Rejection};

/// A task bar positioned for drawing.
#[derive(Debug, Clone, PartialEq)]
pub struct VisibleBar {
    pub task: Task,
    /// Row on the timeline, shared with [`DependencyCurve`] rows.
    pub row: usize,
    /// Dates as drawn, including any live drag offset.
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub left: f32,
    pub width: f32,
}

/// How a gesture ended.
#[derive(Debug, Clone, PartialEq)]
pub enum GestureOutcome {
    /// The store accepted exactly one change.
    Committed(Task),
    /// Nothing moved: hand over to click-to-edit.
    Click(TaskId),
    /// The gesture was valid but asked for something already true.
    Unchanged,
    /// The change was refused; the bar snaps back.
    Rejected(Rejection),
    Cancelled,
    /// Pointer-up with no gesture in progress.
    NoGesture,
}

pub struct GanttChart<S> {
    store: S,
    project: ProjectId,
    interaction: Interaction,
    cell_width: f32,
}

impl<S: TaskStore> GanttChart<S> {
    pub fn new(store: S, project: ProjectId, cell_width: f32) -> Self {
        Self {
            store,
            project,
            interaction: Interaction::new(),
            cell_width: cell_width.clamp(MIN_CELL_WIDTH, MAX_CELL_WIDTH),
        }
    }

    /// Chart zoomed to the user's saved cell width.
    pub fn from_settings(store: S, project: ProjectId, settings: &Settings) -> Self {
        Self::new(store, project, settings.cell_width)
    }

    pub fn project(&self) -> ProjectId {
        self.project
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub fn cell_width(&self) -> f32 {
        self.cell_width
    }

    /// Change zoom. Ignored mid-gesture so the pending offset keeps its scale.
    pub fn set_cell_width(&mut self, cell_width: f32) {
        if self.interaction.is_idle() {
            self.cell_width = cell_width.clamp(MIN_CELL_WIDTH, MAX_CELL_WIDTH);
        }
    }

    pub fn active_gesture(&self) -> Option<&ActiveGesture> {
        self.interaction.active()
    }

    /// All of the project's tasks that take part in the timeline, in store order.
    pub fn timeline_tasks(&self) -> Vec<Task> {
        self.store
            .get_tasks(self.project)
            .into_iter()
            .filter(Task::is_timeline)
            .collect()
    }

    pub fn graph(&self) -> DependencyGraph {
        DependencyGraph::from_tasks(self.project, &self.store.get_tasks(self.project))
    }

    /// Viewport fitted around the current schedule.
    pub fn fit_viewport(&self, today: NaiveDate) -> TimelineViewport {
        TimelineViewport::fit_tasks(&self.timeline_tasks(), today).with_cell_width(self.cell_width)
    }

    // ── Render queries ──────────────────────────────────────────

    /// Bars overlapping `[range_start, range_end)`, with the active task drawn at its
    /// live position. Tasks without a start or an end marker have no bar.
    pub fn visible_bars(&self, range_start: NaiveDate, range_end: NaiveDate) -> Vec<VisibleBar> {
        let viewport = TimelineViewport {
            start: range_start,
            end: range_end,
            cell_width: self.cell_width,
        };
        let active = self.interaction.active();

        self.timeline_tasks()
            .into_iter()
            .enumerate()
            .filter_map(|(row, task)| {
                let (start, end) = (task.start_date?, task.bar_end()?);
                let (start, end) = match active {
                    Some(gesture) if gesture.task_id == task.id => gesture.preview(start, end),
                    _ => (start, end),
                };
                if !viewport.overlaps(start, end) {
                    return None;
                }
                let geometry = viewport.clamped_bar(start, end);
                Some(VisibleBar {
                    task,
                    row,
                    start,
                    end,
                    left: geometry.left,
                    width: geometry.width,
                })
            })
            .collect()
    }

    /// Connectors for every dependency between two timeline tasks of the project.
    pub fn dependency_curves(&self) -> Vec<DependencyCurve> {
        self.graph().curves()
    }

    /// Board cards grouped into every bucket of the requested board.
    pub fn board_buckets(&self, layout: BoardLayout) -> BTreeMap<BucketKey, Vec<Task>> {
        board::group(&self.store.get_tasks(self.project), layout)
    }

    // ── Event handlers ──────────────────────────────────────────

    /// Pointer-down on a bar or one of its handles.
    pub fn on_gesture_start(
        &mut self,
        task_id: TaskId,
        mode: GestureMode,
        pointer_x: f32,
    ) -> Result<(), GestureError> {
        if let Some(active) = self.interaction.active() {
            return Err(GestureError::AlreadyActive(active.task_id));
        }
        let task = self
            .find_task(task_id)
            .ok_or(GestureError::UnknownTask(task_id))?;
        if !task.is_timeline() {
            return Err(GestureError::NotOnTimeline(task_id));
        }
        if task.start_date.is_none() || task.bar_end().is_none() {
            return Err(GestureError::Unscheduled(task_id));
        }
        self.interaction.begin(task_id, mode, pointer_x)
    }

    /// Pointer moved. Returns the pending day offset, or `None` when idle.
    pub fn on_gesture_move(&mut self, pointer_x: f32) -> Option<i64> {
        self.interaction.update(pointer_x, self.cell_width)
    }

    /// Pointer-up, optionally over another task's bar. The gesture always ends here.
    ///
    /// Only store failures are returned as errors; refused changes come back as
    /// [`GestureOutcome::Rejected`].
    pub fn on_gesture_end(&mut self, target: Option<TaskId>) -> Result<GestureOutcome, StoreError> {
        let Some(gesture) = self.interaction.finish() else {
            return Ok(GestureOutcome::NoGesture);
        };
        let tasks = self.store.get_tasks(self.project);
        let Some(task) = tasks.iter().find(|t| t.id == gesture.task_id) else {
            log::warn!("gesture task {} disappeared before release", gesture.task_id);
            return Ok(GestureOutcome::Rejected(Rejection::UnknownTask(gesture.task_id)));
        };

        match interaction::resolve(&gesture, task, target) {
            Proposal::Reschedule(patch) => {
                log::debug!("committing {:?} on {}", gesture.mode, patch.id);
                let updated = self.store.update_task(patch)?;
                Ok(GestureOutcome::Committed(updated))
            }
            Proposal::Connect {
                dependent,
                predecessor,
            } => self.connect(&tasks, dependent, predecessor),
            Proposal::Click(id) => Ok(GestureOutcome::Click(id)),
            Proposal::Reject(rejection) => {
                log::debug!("gesture on {} rejected: {rejection:?}", gesture.task_id);
                Ok(GestureOutcome::Rejected(rejection))
            }
        }
    }

    /// Abandon the current gesture without committing anything.
    pub fn cancel_gesture(&mut self) -> GestureOutcome {
        match self.interaction.finish() {
            Some(gesture) => {
                log::debug!("gesture on {} cancelled", gesture.task_id);
                GestureOutcome::Cancelled
            }
            None => GestureOutcome::NoGesture,
        }
    }

    /// A board card was dropped. Returns the updated task, or `None` when the
    /// drop landed back on its own slot or names a task outside this project.
    pub fn on_card_dropped(&mut self, drop: CardDrop) -> Result<Option<Task>, StoreError> {
        if self.find_task(drop.task_id).is_none() {
            log::warn!(
                "ignoring drop of task {} which is not in project {}",
                drop.task_id,
                self.project
            );
            return Ok(None);
        }
        match board::drop_patch(&drop) {
            Some(patch) => self.store.update_task(patch).map(Some),
            None => Ok(None),
        }
    }

    /// Remove the edge `predecessor -> dependent`. Returns the updated task when an
    /// edge was actually removed.
    pub fn remove_dependency(
        &mut self,
        dependent: TaskId,
        predecessor: TaskId,
    ) -> Result<Option<Task>, StoreError> {
        let mut graph = self.graph();
        match graph.remove_dependency(dependent, predecessor) {
            EdgeChange::Removed => {
                let patch = dependencies_patch(&graph, dependent);
                self.store.update_task(patch).map(Some)
            }
            EdgeChange::Added | EdgeChange::Unchanged => Ok(None),
        }
    }

    fn connect(
        &mut self,
        tasks: &[Task],
        dependent: TaskId,
        predecessor: TaskId,
    ) -> Result<GestureOutcome, StoreError> {
        let mut graph = DependencyGraph::from_tasks(self.project, tasks);
        match graph.add_dependency(dependent, predecessor) {
            Ok(EdgeChange::Added) => {
                let updated = self
                    .store
                    .update_task(dependencies_patch(&graph, dependent))?;
                Ok(GestureOutcome::Committed(updated))
            }
            Ok(EdgeChange::Removed | EdgeChange::Unchanged) => Ok(GestureOutcome::Unchanged),
            Err(DependencyError::SelfDependency(_)) => {
                Ok(GestureOutcome::Rejected(Rejection::SelfDependency))
            }
            Err(DependencyError::CycleDetected { .. }) => {
                Ok(GestureOutcome::Rejected(Rejection::CycleDetected))
            }
            Err(DependencyError::UnknownTask(id)) => {
                Ok(GestureOutcome::Rejected(Rejection::UnknownTask(id)))
            }
        }
    }

    fn find_task(&self, id: TaskId) -> Option<Task> {
        self.store
            .get_tasks(self.project)
            .into_iter()
            .find(|t| t.id == id)
    }
}

fn dependencies_patch(graph: &DependencyGraph, dependent: TaskId) -> TaskPatch {
    let mut patch = TaskPatch::new(dependent);
    patch.dependencies = Some(graph.predecessors_of(dependent));
    patch
}
