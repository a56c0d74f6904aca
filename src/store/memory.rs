use crate::model::{ProjectId, Task, TaskId, TaskPatch};

use super::{apply_patch, StoreError, TaskStore};

/// Vector-backed store. Task order is insertion order.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tasks: Vec<Task>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tasks(tasks: Vec<Task>) -> Self {
        Self { tasks }
    }

    pub fn insert(&mut self, task: Task) {
        self.tasks.push(task);
    }

    /// Delete a task. References to it held by other tasks are left in place.
    pub fn remove(&mut self, id: TaskId) -> Option<Task> {
        let index = self.tasks.iter().position(|t| t.id == id)?;
        Some(self.tasks.remove(index))
    }

    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }
}

impl TaskStore for MemoryStore {
    fn get_tasks(&self, project: ProjectId) -> Vec<Task> {
        self.tasks
            .iter()
            .filter(|t| t.project_id == project)
            .cloned()
            .collect()
    }

    fn update_task(&mut self, patch: TaskPatch) -> Result<Task, StoreError> {
        apply_patch(&mut self.tasks, &patch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use uuid::Uuid;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 2, d).unwrap()
    }

    #[test]
    fn get_tasks_is_scoped_to_project() {
        let (p1, p2) = (Uuid::new_v4(), Uuid::new_v4());
        let store = MemoryStore::with_tasks(vec![
            Task::new(p1, "one"),
            Task::new(p2, "two"),
            Task::new(p1, "three"),
        ]);

        let titles: Vec<_> = store.get_tasks(p1).into_iter().map(|t| t.title).collect();
        assert_eq!(titles, ["one", "three"]);
    }

    #[test]
    fn update_rejects_inverted_range_without_mutating() {
        let task = Task::scheduled(Uuid::new_v4(), "a", date(3), date(5));
        let id = task.id;
        let mut store = MemoryStore::with_tasks(vec![task]);

        let mut patch = TaskPatch::new(id);
        patch.start_date = Some(date(9));
        let err = store.update_task(patch).unwrap_err();

        assert!(matches!(err, StoreError::Invalid(_)));
        assert_eq!(store.get(id).unwrap().start_date, Some(date(3)));
    }

    #[test]
    fn update_unknown_task_is_not_found() {
        let mut store = MemoryStore::new();
        let id = Uuid::new_v4();
        assert!(matches!(
            store.update_task(TaskPatch::new(id)),
            Err(StoreError::NotFound(missing)) if missing == id
        ));
    }

    #[test]
    fn remove_leaves_dangling_references() {
        let project = Uuid::new_v4();
        let a = Task::new(project, "a");
        let mut b = Task::new(project, "b");
        b.dependencies.insert(a.id);
        let (a_id, b_id) = (a.id, b.id);
        let mut store = MemoryStore::with_tasks(vec![a, b]);

        assert!(store.remove(a_id).is_some());
        assert!(store.get(b_id).unwrap().dependencies.contains(&a_id));
    }
}
