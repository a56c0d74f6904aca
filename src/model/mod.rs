pub mod project;
pub mod task;
pub mod timeline;

pub use project::Project;
pub use task::{Priority, ProjectId, Task, TaskId, TaskPatch, TaskSource, TaskValidationError};
pub use timeline::{BarGeometry, TimelineViewport};
