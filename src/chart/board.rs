//! Board status projection.
//!
//! A card's column is always derived from `completed` and `progress`; dropping
//! a card into a column writes those fields back with a representative value.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::{Priority, Task, TaskId, TaskPatch};

/// Progress written when a card lands in the in-progress column.
pub const IN_PROGRESS_DROP_VALUE: u8 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoardStatus {
    Todo,
    InProgress,
    Done,
}

impl BoardStatus {
    pub const ALL: [BoardStatus; 3] = [BoardStatus::Todo, BoardStatus::InProgress, BoardStatus::Done];

    pub fn label(self) -> &'static str {
        match self {
            BoardStatus::Todo => "To Do",
            BoardStatus::InProgress => "In Progress",
            BoardStatus::Done => "Done",
        }
    }

    /// `(completed, progress)` a task takes on when moved into this column.
    pub fn fields(self) -> (bool, u8) {
        match self {
            BoardStatus::Todo => (false, 0),
            BoardStatus::InProgress => (false, IN_PROGRESS_DROP_VALUE),
            BoardStatus::Done => (true, 100),
        }
    }

    /// Parse free-form status text as found in imported sheets.
    pub fn parse(text: &str) -> Option<Self> {
        match text.trim().to_lowercase().as_str() {
            "done" | "finished" | "complete" | "completed" => Some(BoardStatus::Done),
            "in progress" | "in-progress" | "in_progress" | "active" | "started" | "doing" => {
                Some(BoardStatus::InProgress)
            }
            "todo" | "to do" | "to-do" | "not started" | "not-started" | "new" | "planned" => {
                Some(BoardStatus::Todo)
            }
            _ => None,
        }
    }
}

/// Derived board status. Depends on nothing but `completed` and `progress`.
pub fn status(task: &Task) -> BoardStatus {
    if task.completed {
        BoardStatus::Done
    } else if task.progress > 0 {
        BoardStatus::InProgress
    } else {
        BoardStatus::Todo
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupBy {
    Status,
    Priority,
}

/// Board shape. Swimlanes always cross status with priority, so only the
/// column board takes a grouping axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoardLayout {
    /// One row of columns along the grouping axis.
    Columns(GroupBy),
    /// A `(status, priority)` bucket for every combination.
    Swimlanes,
}

/// A board cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BucketKey {
    Status(BoardStatus),
    Priority(Priority),
    Swimlane(BoardStatus, Priority),
}

impl BucketKey {
    /// The bucket `task` falls into under the given grouping.
    pub fn of(task: &Task, layout: BoardLayout) -> Self {
        match layout {
            BoardLayout::Swimlanes => BucketKey::Swimlane(status(task), task.priority),
            BoardLayout::Columns(GroupBy::Status) => BucketKey::Status(status(task)),
            BoardLayout::Columns(GroupBy::Priority) => BucketKey::Priority(task.priority),
        }
    }

    /// Every bucket of a board, in display order.
    pub fn all(layout: BoardLayout) -> Vec<Self> {
        match layout {
            BoardLayout::Columns(GroupBy::Status) => {
                BoardStatus::ALL.into_iter().map(BucketKey::Status).collect()
            }
            BoardLayout::Columns(GroupBy::Priority) => {
                Priority::ALL.into_iter().map(BucketKey::Priority).collect()
            }
            BoardLayout::Swimlanes => BoardStatus::ALL
                .into_iter()
                .flat_map(|s| Priority::ALL.into_iter().map(move |p| BucketKey::Swimlane(s, p)))
                .collect(),
        }
    }

    pub fn status(self) -> Option<BoardStatus> {
        match self {
            BucketKey::Status(s) | BucketKey::Swimlane(s, _) => Some(s),
            BucketKey::Priority(_) => None,
        }
    }

    pub fn priority(self) -> Option<Priority> {
        match self {
            BucketKey::Priority(p) | BucketKey::Swimlane(_, p) => Some(p),
            BucketKey::Status(_) => None,
        }
    }
}

/// A card moved from one board slot to another.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CardDrop {
    pub task_id: TaskId,
    pub source: BucketKey,
    pub source_index: usize,
    pub target: BucketKey,
    pub target_index: usize,
}

impl CardDrop {
    pub fn is_noop(&self) -> bool {
        self.source == self.target && self.source_index == self.target_index
    }
}

/// Field updates implied by dropping a card, or `None` for a drop back onto its own slot.
///
/// Status buckets normalize progress to one of three values; priority buckets
/// also set the priority.
pub fn drop_patch(drop: &CardDrop) -> Option<TaskPatch> {
    if drop.is_noop() {
        return None;
    }

    let mut patch = TaskPatch::new(drop.task_id);
    if let Some(target) = drop.target.status() {
        let (completed, progress) = target.fields();
        patch.completed = Some(completed);
        patch.progress = Some(progress);
    }
    if let Some(priority) = drop.target.priority() {
        patch.priority = Some(priority);
    }
    Some(patch)
}

/// Group `tasks` into every bucket of the board. Empty buckets are present.
pub fn group<'a>(
    tasks: impl IntoIterator<Item = &'a Task>,
    layout: BoardLayout,
) -> BTreeMap<BucketKey, Vec<Task>> {
    let mut buckets: BTreeMap<BucketKey, Vec<Task>> = BucketKey::all(layout)
        .into_iter()
        .map(|key| (key, Vec::new()))
        .collect();
    for task in tasks {
        buckets
            .entry(BucketKey::of(task, layout))
            .or_default()
            .push(task.clone());
    }
    buckets
}
