use std::collections::HashMap;
use std::path::Path;

use chrono::NaiveDate;

use super::IoError;
use crate::chart::{BoardStatus, DependencyError, DependencyGraph};
use crate::model::{Priority, ProjectId, Task, TaskId};

/// Outcome of a CSV import.
#[derive(Debug, Clone)]
pub struct ImportReport {
    pub tasks: Vec<Task>,
    /// Data rows that could not be turned into a task.
    pub skipped_rows: usize,
    /// "Depends on" references that were unknown or would have broken the graph.
    pub skipped_edges: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Column {
    Title,
    Start,
    End,
    Deadline,
    Status,
    Priority,
    DependsOn,
}

/// Try parsing a date string with several common formats.
fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    for fmt in &["%Y-%m-%d", "%d/%m/%Y", "%m/%d/%Y", "%d-%m-%Y", "%d.%m.%Y", "%Y/%m/%d", "%m-%d-%Y"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }
    None
}

/// Detect delimiter by checking the first line for common separators.
fn detect_delimiter(first_line: &str) -> u8 {
    let semicolons = first_line.matches(';').count();
    let commas = first_line.matches(',').count();
    let tabs = first_line.matches('\t').count();

    if semicolons >= commas && semicolons >= tabs {
        b';'
    } else if tabs >= commas {
        b'\t'
    } else {
        b','
    }
}

/// Normalize a header string to a canonical column key.
fn normalize_header(h: &str) -> String {
    h.trim().to_lowercase().replace([' ', '-', '_'], "")
}

fn header_to_column(normalized: &str) -> Option<Column> {
    match normalized {
        "title" | "name" | "task" | "tasklabel" | "taskname" | "label" | "activity" => {
            Some(Column::Title)
        }
        "start" | "startdate" | "from" | "begin" | "begindate" => Some(Column::Start),
        "end" | "enddate" | "to" | "finish" | "finishdate" => Some(Column::End),
        "deadline" | "due" | "duedate" => Some(Column::Deadline),
        "status" | "state" | "stage" => Some(Column::Status),
        "priority" | "pri" | "importance" => Some(Column::Priority),
        "dependson" | "dependencies" | "predecessors" | "after" | "blockedby" => {
            Some(Column::DependsOn)
        }
        _ => None,
    }
}

fn parse_priority(s: &str) -> Option<Priority> {
    match s.trim().to_lowercase().as_str() {
        "critical" | "high" | "urgent" => Some(Priority::High),
        "medium" | "med" | "normal" => Some(Priority::Medium),
        "low" => Some(Priority::Low),
        _ => None,
    }
}

/// An optional date cell: empty is `Ok(None)`, unparsable is `Err` with the raw text.
fn date_cell(value: Option<&str>) -> Result<Option<NaiveDate>, String> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => parse_date(raw).map(Some).ok_or_else(|| raw.to_string()),
    }
}

/// Import timeline tasks for `project` from a CSV file.
///
/// Auto-detects delimiter (comma, semicolon, tab) and matches headers
/// flexibly. "Depends on" cells name predecessors by title, separated by `|`
/// only, so titles may contain commas. They are wired through the dependency
/// graph, so an import can never introduce a self-dependency or a cycle.
pub fn import_csv(path: &Path, project: ProjectId) -> Result<ImportReport, IoError> {
    let content = std::fs::read_to_string(path)?;

    let first_line = content.lines().next().unwrap_or("");
    let delimiter = detect_delimiter(first_line);

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let headers = reader.headers()?.clone();
    let columns: Vec<Option<Column>> = headers
        .iter()
        .map(|h| header_to_column(&normalize_header(h)))
        .collect();

    if !columns.contains(&Some(Column::Title)) {
        return Err(IoError::MissingColumns(
            headers.iter().map(str::to_string).collect(),
        ));
    }

    let mut tasks: Vec<Task> = Vec::new();
    // Raw predecessor titles per task; resolved once every row is loaded.
    let mut pending_deps: Vec<Vec<String>> = Vec::new();
    let mut skipped_rows = 0usize;

    for (i, result) in reader.records().enumerate() {
        let line = i + 2;
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                log::warn!("skipping CSV row {line}: {e}");
                skipped_rows += 1;
                continue;
            }
        };

        let mut cells: HashMap<Column, &str> = HashMap::new();
        for (field, column) in record.iter().zip(&columns) {
            if let Some(column) = column {
                cells.insert(*column, field);
            }
        }

        let title = match cells.get(&Column::Title) {
            Some(t) if !t.is_empty() => t.to_string(),
            _ => {
                skipped_rows += 1;
                continue;
            }
        };

        let dates = (
            date_cell(cells.get(&Column::Start).copied()),
            date_cell(cells.get(&Column::End).copied()),
            date_cell(cells.get(&Column::Deadline).copied()),
        );
        let (start, end, deadline) = match dates {
            (Ok(start), Ok(end), Ok(deadline)) => (start, end, deadline),
            (Err(raw), _, _) | (_, Err(raw), _) | (_, _, Err(raw)) => {
                log::warn!("skipping CSV row {line}: invalid date '{raw}'");
                skipped_rows += 1;
                continue;
            }
        };

        let mut task = Task::new(project, title);
        task.start_date = start;
        task.end_date = match (start, end) {
            (Some(start), Some(end)) => Some(end.max(start)),
            (_, end) => end,
        };
        task.deadline = deadline;

        if let Some(status) = cells.get(&Column::Status).and_then(|s| BoardStatus::parse(s)) {
            let (completed, progress) = status.fields();
            task.completed = completed;
            task.progress = progress;
        }
        if let Some(priority) = cells.get(&Column::Priority).and_then(|s| parse_priority(s)) {
            task.priority = priority;
        }

        let deps: Vec<String> = cells
            .get(&Column::DependsOn)
            .map(|cell| {
                cell.split('|')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        pending_deps.push(deps);
        tasks.push(task);
    }

    if tasks.is_empty() {
        return Err(IoError::Empty { skipped_rows });
    }

    let skipped_edges = resolve_dependencies(project, &mut tasks, &pending_deps);

    Ok(ImportReport {
        tasks,
        skipped_rows,
        skipped_edges,
    })
}

/// Second pass: turn predecessor titles into edges, refusing any that the graph
/// rejects. Returns how many references were dropped.
fn resolve_dependencies(project: ProjectId, tasks: &mut [Task], pending: &[Vec<String>]) -> usize {
    let name_to_id: HashMap<String, TaskId> = tasks
        .iter()
        .map(|t| (t.title.to_lowercase(), t.id))
        .collect();

    let mut graph = DependencyGraph::from_tasks(project, tasks.iter());
    let mut skipped = 0usize;

    for (task, names) in tasks.iter().zip(pending) {
        for name in names {
            let Some(&predecessor) = name_to_id.get(&name.to_lowercase()) else {
                log::warn!("predecessor '{}' not found for '{}'", name, task.title);
                skipped += 1;
                continue;
            };
            match graph.add_dependency(task.id, predecessor) {
                Ok(_) => {}
                Err(err @ (DependencyError::SelfDependency(_) | DependencyError::CycleDetected { .. })) => {
                    log::warn!("dropping dependency of '{}' on '{}': {err}", task.title, name);
                    skipped += 1;
                }
                Err(DependencyError::UnknownTask(id)) => {
                    log::warn!("dependency endpoint {id} is not an imported task");
                    skipped += 1;
                }
            }
        }
    }

    for task in tasks.iter_mut() {
        task.dependencies = graph.predecessors_of(task.id);
    }
    skipped
}
