//! Dependency graph over one project's timeline tasks.
//!
//! Edges are stored the way tasks store them: `dependent -> {predecessors}`.
//! Cycle checks walk predecessor edges on demand; project graphs are small.

use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};
use std::fmt;

use crate::model::{ProjectId, Task, TaskId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DependencyError {
    SelfDependency(TaskId),
    CycleDetected { dependent: TaskId, predecessor: TaskId },
    UnknownTask(TaskId),
}

impl fmt::Display for DependencyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SelfDependency(id) => write!(f, "task {id} cannot depend on itself"),
            Self::CycleDetected {
                dependent,
                predecessor,
            } => write!(
                f,
                "making {dependent} depend on {predecessor} would create a circular dependency"
            ),
            Self::UnknownTask(id) => write!(f, "task {id} is not on this timeline"),
        }
    }
}

impl std::error::Error for DependencyError {}

/// Result of a successful edge mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeChange {
    Added,
    Removed,
    Unchanged,
}

/// A connector between two bars, with the rows they sit on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DependencyCurve {
    pub from_task_id: TaskId,
    pub to_task_id: TaskId,
    pub from_row: usize,
    pub to_row: usize,
}

#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    /// Timeline tasks in display order.
    order: Vec<TaskId>,
    predecessors: HashMap<TaskId, BTreeSet<TaskId>>,
}

impl DependencyGraph {
    /// Build the graph from `project`'s timeline-sourced tasks. Tasks from other
    /// projects or sources are ignored.
    pub fn from_tasks<'a>(project: ProjectId, tasks: impl IntoIterator<Item = &'a Task>) -> Self {
        let mut graph = Self::default();
        for task in tasks {
            if task.project_id != project || !task.is_timeline() {
                continue;
            }
            graph.order.push(task.id);
            graph
                .predecessors
                .insert(task.id, task.dependencies.clone());
        }
        graph
    }

    pub fn contains(&self, id: TaskId) -> bool {
        self.predecessors.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Direct predecessors of `task`. Dangling ids are included as stored.
    pub fn predecessors_of(&self, task: TaskId) -> BTreeSet<TaskId> {
        self.predecessors.get(&task).cloned().unwrap_or_default()
    }

    /// Tasks that directly depend on `task`.
    pub fn dependents_of(&self, task: TaskId) -> BTreeSet<TaskId> {
        self.predecessors
            .iter()
            .filter(|(_, preds)| preds.contains(&task))
            .map(|(id, _)| *id)
            .collect()
    }

    /// Whether making `dependent` depend on `new_predecessor` would close a cycle,
    /// i.e. `dependent` is already reachable from `new_predecessor` by following
    /// predecessor edges.
    pub fn would_create_cycle(&self, dependent: TaskId, new_predecessor: TaskId) -> bool {
        if dependent == new_predecessor {
            return true;
        }

        let mut visited: HashSet<TaskId> = HashSet::new();
        let mut queue: VecDeque<TaskId> = VecDeque::new();
        queue.push_back(new_predecessor);

        while let Some(current) = queue.pop_front() {
            if current == dependent {
                return true;
            }
            if !visited.insert(current) {
                continue;
            }
            if let Some(preds) = self.predecessors.get(&current) {
                queue.extend(preds.iter().filter(|p| !visited.contains(*p)));
            }
        }

        false
    }

    /// Make `dependent` depend on `predecessor`. Adding an existing edge is a no-op.
    pub fn add_dependency(
        &mut self,
        dependent: TaskId,
        predecessor: TaskId,
    ) -> Result<EdgeChange, DependencyError> {
        if dependent == predecessor {
            log::warn!("refusing self-dependency on task {dependent}");
            return Err(DependencyError::SelfDependency(dependent));
        }
        for id in [dependent, predecessor] {
            if !self.contains(id) {
                return Err(DependencyError::UnknownTask(id));
            }
        }
        if self.predecessors_of(dependent).contains(&predecessor) {
            return Ok(EdgeChange::Unchanged);
        }
        if self.would_create_cycle(dependent, predecessor) {
            log::debug!("edge {predecessor} -> {dependent} would close a cycle");
            return Err(DependencyError::CycleDetected {
                dependent,
                predecessor,
            });
        }

        self.predecessors
            .entry(dependent)
            .or_default()
            .insert(predecessor);
        Ok(EdgeChange::Added)
    }

    /// Drop the edge if present. Never fails.
    pub fn remove_dependency(&mut self, dependent: TaskId, predecessor: TaskId) -> EdgeChange {
        let removed = self
            .predecessors
            .get_mut(&dependent)
            .is_some_and(|preds| preds.remove(&predecessor));
        if removed {
            EdgeChange::Removed
        } else {
            EdgeChange::Unchanged
        }
    }

    /// Row index for each task: its position in `tasks`.
    pub fn layout_positions<'a>(
        tasks: impl IntoIterator<Item = &'a Task>,
    ) -> HashMap<TaskId, usize> {
        tasks
            .into_iter()
            .enumerate()
            .map(|(row, task)| (task.id, row))
            .collect()
    }

    /// Connectors for every edge whose endpoints are both on the timeline.
    /// Edges to deleted or foreign tasks are skipped.
    pub fn curves(&self) -> Vec<DependencyCurve> {
        let rows: HashMap<TaskId, usize> = self
            .order
            .iter()
            .enumerate()
            .map(|(row, id)| (*id, row))
            .collect();

        let mut curves = Vec::new();
        for (to_row, id) in self.order.iter().enumerate() {
            for pred in self.predecessors_of(*id) {
                if let Some(&from_row) = rows.get(&pred) {
                    curves.push(DependencyCurve {
                        from_task_id: pred,
                        to_task_id: *id,
                        from_row,
                        to_row,
                    });
                }
            }
        }
        curves
    }

    /// Whether any directed cycle exists, checked from scratch by Kahn's algorithm
    /// over edges between known tasks.
    pub fn has_cycle(&self) -> bool {
        let mut in_degree: HashMap<TaskId, usize> =
            self.order.iter().map(|id| (*id, 0)).collect();
        for (id, preds) in &self.predecessors {
            let known = preds.iter().filter(|p| self.contains(**p)).count();
            in_degree.insert(*id, known);
        }

        let mut ready: VecDeque<TaskId> = in_degree
            .iter()
            .filter(|(_, degree)| **degree == 0)
            .map(|(id, _)| *id)
            .collect();
        let mut seen = 0;
        while let Some(id) = ready.pop_front() {
            seen += 1;
            for dependent in self.dependents_of(id) {
                if let Some(degree) = in_degree.get_mut(&dependent) {
                    *degree -= 1;
                    if *degree == 0 {
                        ready.push_back(dependent);
                    }
                }
            }
        }
        seen != in_degree.len()
    }
}
