use std::collections::HashMap;
use std::path::Path;

use chrono::NaiveDate;

use super::IoError;
use crate::chart::status;
use crate::model::{Task, TaskId};

fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%d/%m/%Y").to_string())
        .unwrap_or_default()
}

/// Export tasks to a semicolon-delimited CSV file matching the import format.
///
/// Columns: Title ; Start Date ; End Date ; Deadline ; Status ; Priority ; Depends On
/// Dates are formatted as DD/MM/YYYY, predecessors as `|`-separated titles.
/// Returns the number of tasks written.
pub fn export_csv(tasks: &[Task], path: &Path) -> Result<usize, IoError> {
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(b';')
        .has_headers(false)
        .from_path(path)?;

    wtr.write_record([
        "Title",
        "Start Date",
        "End Date",
        "Deadline",
        "Status",
        "Priority",
        "Depends On",
    ])?;

    let titles: HashMap<TaskId, &str> = tasks.iter().map(|t| (t.id, t.title.as_str())).collect();

    for task in tasks {
        // Predecessors outside the exported set have no title to refer to.
        let depends_on: Vec<&str> = task
            .dependencies
            .iter()
            .filter_map(|id| titles.get(id).copied())
            .collect();

        let start = format_date(task.start_date);
        let end = format_date(task.end_date);
        let deadline = format_date(task.deadline);
        let depends_on = depends_on.join("|");

        wtr.write_record([
            task.title.as_str(),
            start.as_str(),
            end.as_str(),
            deadline.as_str(),
            status(task).label(),
            task.priority.label(),
            depends_on.as_str(),
        ])?;
    }

    wtr.flush()?;
    Ok(tasks.len())
}
