pub mod csv_export;
pub mod csv_import;
pub mod file;

use std::fmt;

pub use csv_export::export_csv;
pub use csv_import::{import_csv, ImportReport};
pub use file::{load_project, save_project};

#[derive(Debug)]
pub enum IoError {
    Io(std::io::Error),
    Csv(csv::Error),
    Json(serde_json::Error),
    /// Required CSV columns were not found. Holds the headers that were.
    MissingColumns(Vec<String>),
    /// No usable rows.
    Empty { skipped_rows: usize },
}

impl fmt::Display for IoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "file access failed: {err}"),
            Self::Csv(err) => write!(f, "CSV error: {err}"),
            Self::Json(err) => write!(f, "JSON error: {err}"),
            Self::MissingColumns(found) => write!(
                f,
                "CSV has no task title column. Found headers: {found:?}. \
                 Expected one of: Title, Name, Task, Task Name, Label, Activity."
            ),
            Self::Empty { skipped_rows: 0 } => write!(f, "CSV file is empty or has no data rows"),
            Self::Empty { skipped_rows } => {
                write!(f, "No valid tasks found in CSV ({skipped_rows} rows skipped)")
            }
        }
    }
}

impl std::error::Error for IoError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Csv(err) => Some(err),
            Self::Json(err) => Some(err),
            Self::MissingColumns(_) | Self::Empty { .. } => None,
        }
    }
}

impl From<std::io::Error> for IoError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for IoError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

impl From<serde_json::Error> for IoError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err)
    }
}
