use std::fmt;
use std::io::Error;

use derive_setters::Setters;
use polars::error::PolarsError;
use tracing_error::SpanTrace;

pub const PAGE_SIZE_OPTIONS: [usize; 6] = [5, 10, 15, 20, 25, 50];

pub const HELP_TEXT: &str = "\
Navigation
  j / Down       next row
  k / Up         previous row
  h / Left       previous column
  l / Right      next column
  n / PageDown   next page
  p / PageUp     previous page
  g / G          first / last page
  + / -          larger / smaller page size

Table
  /              search
  s              sort by column (again to toggle)
  space          select row
  a              select page
  A              clear selection
  d              delete row
  c              copy selection (or row) as csv
  x              clear search, filters and sort

  ?              help
  Esc            close popup
  q              quit";

#[derive(Debug)]
pub enum DeskError {
    IoError(Error),
    PolarsError(PolarsError),
    CsvError(csv::Error),
    LoadingFailed(String),
    FileNotFound,
    PermissionDenied,
    UnknownFileType,
    RecordParse {
        row: usize,
        field: String,
        value: String,
        trace: SpanTrace,
    },
    DuplicateId {
        id: String,
        first_row: usize,
        row: usize,
    },
    InvalidPage {
        requested: usize,
        total: usize,
    },
    UnknownSortField(String),
    DeleteMiss(String),
}

impl DeskError {
    pub fn record_parse(row: usize, field: impl Into<String>, value: impl Into<String>) -> Self {
        DeskError::RecordParse {
            row,
            field: field.into(),
            value: value.into(),
            trace: SpanTrace::capture(),
        }
    }
}

impl fmt::Display for DeskError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeskError::IoError(e) => write!(f, "io error: {e}"),
            DeskError::PolarsError(e) => write!(f, "failed to read table: {e}"),
            DeskError::CsvError(e) => write!(f, "failed to write csv: {e}"),
            DeskError::LoadingFailed(reason) => write!(f, "loading failed: {reason}"),
            DeskError::FileNotFound => write!(f, "file not found"),
            DeskError::PermissionDenied => write!(f, "permission denied"),
            DeskError::UnknownFileType => write!(f, "unknown file type"),
            DeskError::RecordParse {
                row, field, value, ..
            } => write!(f, "row {row}: cannot read field \"{field}\" from \"{value}\""),
            DeskError::DuplicateId { id, first_row, row } => {
                write!(f, "row {row}: id \"{id}\" already used in row {first_row}")
            }
            DeskError::InvalidPage { requested, total } => {
                write!(f, "page {requested} outside of 1..={total}")
            }
            DeskError::UnknownSortField(field) => write!(f, "unknown sort field \"{field}\""),
            DeskError::DeleteMiss(key) => write!(f, "no record matches {key}"),
        }
    }
}

impl std::error::Error for DeskError {}

impl From<Error> for DeskError {
    fn from(err: Error) -> Self {
        DeskError::IoError(err)
    }
}

impl From<csv::Error> for DeskError {
    fn from(err: csv::Error) -> Self {
        DeskError::CsvError(err)
    }
}

impl From<PolarsError> for DeskError {
    fn from(err: PolarsError) -> Self {
        DeskError::PolarsError(err)
    }
}

/// Controller settings for one table instantiation.
#[derive(Debug, Clone, Setters)]
pub struct TableConfig {
    pub rows_per_page: usize,
    pub page_size_options: Vec<usize>,
}

impl Default for TableConfig {
    fn default() -> Self {
        TableConfig {
            rows_per_page: 10,
            page_size_options: PAGE_SIZE_OPTIONS.to_vec(),
        }
    }
}

#[derive(Debug, Clone, Setters)]
pub struct AppConfig {
    pub event_poll_time: u64,
    /// Seconds a status message stays visible.
    pub status_timeout: u64,
    pub table: TableConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            event_poll_time: 100,
            status_timeout: 4,
            table: TableConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CMDMode {
    Search,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Quit,
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    NextPage,
    PrevPage,
    FirstPage,
    LastPage,
    GrowPage,
    ShrinkPage,
    Search,
    Sort,
    ToggleSelect,
    SelectPage,
    ClearSelection,
    Delete,
    Copy,
    ClearFilters,
    Help,
    Exit,
    Resize(usize, usize),
    RawKey(ratatui::crossterm::event::KeyEvent),
}
