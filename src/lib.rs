//! Interactive project timeline engine.
//!
//! Keeps a Gantt timeline and a task board consistent with one set of task
//! records: dependency wiring with cycle prevention, drag gestures turned into
//! validated date changes, and board columns derived from task progress.

pub mod chart;
pub mod config;
pub mod io;
pub mod logging;
pub mod model;
pub mod store;

pub use chart::{GanttChart, GestureOutcome, VisibleBar};
pub use config::Settings;
pub use model::{Priority, Project, ProjectId, Task, TaskId, TaskPatch, TaskSource};
pub use store::{MemoryStore, ProjectFileStore, StoreError, TaskStore};
