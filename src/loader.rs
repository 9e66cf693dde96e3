use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::NaiveDate;
use polars::prelude::*;
use rayon::prelude::*;
use tracing::{debug, info, instrument, trace};

use crate::domain::DeskError;
use crate::records::{DATE_FORMAT, Record};

#[derive(Debug, PartialEq)]
pub enum FileType {
    CSV,
    PARQUET,
    ARROW,
}

#[derive(Debug)]
pub struct FileInfo {
    pub path: PathBuf,
    pub file_size: u64,
    pub file_type: FileType,
}

/// Builds a typed record from one row of a loaded file.
pub trait FromRow: Sized {
    fn from_row(row: &RawRow<'_>) -> Result<Self, DeskError>;
}

/// One row of string cells, addressed by column name.
pub struct RawRow<'a> {
    index: usize,
    headers: &'a [String],
    columns: &'a [Vec<Option<String>>],
}

impl<'a> RawRow<'a> {
    pub fn new(index: usize, headers: &'a [String], columns: &'a [Vec<Option<String>>]) -> Self {
        RawRow {
            index,
            headers,
            columns,
        }
    }

    /// 1-based data row number, used in error messages.
    pub fn number(&self) -> usize {
        self.index + 1
    }

    fn raw(&self, field: &str) -> Option<&'a str> {
        let cidx = self.headers.iter().position(|h| h.trim() == field)?;
        self.columns[cidx][self.index]
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    fn parse_error(&self, field: &str) -> DeskError {
        DeskError::record_parse(self.number(), field, self.raw(field).unwrap_or_default())
    }

    pub fn opt_text(&self, field: &str) -> Option<String> {
        self.raw(field).map(str::to_string)
    }

    pub fn text(&self, field: &str) -> Result<String, DeskError> {
        self.opt_text(field).ok_or_else(|| self.parse_error(field))
    }

    pub fn decimal(&self, field: &str) -> Result<f64, DeskError> {
        self.raw(field)
            .and_then(|s| s.parse::<f64>().ok())
            .filter(|n| n.is_finite())
            .ok_or_else(|| self.parse_error(field))
    }

    // Integer columns can come back as "3.0" when the reader inferred floats.
    pub fn integer(&self, field: &str) -> Result<u32, DeskError> {
        let n = self.decimal(field)?;
        if n.fract() != 0.0 || n < 0.0 || n > u32::MAX as f64 {
            return Err(self.parse_error(field));
        }
        Ok(n as u32)
    }

    pub fn opt_date(&self, field: &str) -> Result<Option<NaiveDate>, DeskError> {
        match self.raw(field) {
            None => Ok(None),
            Some(s) => NaiveDate::parse_from_str(s, DATE_FORMAT)
                .map(Some)
                .map_err(|_| self.parse_error(field)),
        }
    }

    pub fn date(&self, field: &str) -> Result<NaiveDate, DeskError> {
        self.opt_date(field)?.ok_or_else(|| self.parse_error(field))
    }
}

/// Loads a csv, parquet or arrow file and converts every row into `R`.
/// Ids must be unique within the file.
#[instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn load_records<R: Record + FromRow>(path: impl AsRef<Path>) -> Result<Vec<R>, DeskError> {
    let file_info = get_file_info(path.as_ref())?;
    debug!("Loading {:?}", file_info);
    let frame = match file_info.file_type {
        FileType::CSV => load_csv(&file_info.path)?,
        FileType::PARQUET => load_parquet(&file_info.path)?,
        FileType::ARROW => load_arrow(&file_info.path)?,
    };

    let start_time = Instant::now();
    let df = frame.collect()?;
    let (headers, columns) = string_columns(&df)?;

    // Rows are parsed in parallel; collect keeps the file order.
    let records = (0..df.height())
        .into_par_iter()
        .map(|idx| R::from_row(&RawRow::new(idx, &headers, &columns)))
        .collect::<Result<Vec<R>, DeskError>>()?;
    check_unique_ids(&records)?;

    info!(
        "Loaded {} records from {} ({} bytes) in {}ms",
        records.len(),
        file_info.path.display(),
        file_info.file_size,
        start_time.elapsed().as_millis()
    );
    Ok(records)
}

/// Fails on the first id seen twice. Rows in the error are 1-based.
pub fn check_unique_ids<R: Record>(records: &[R]) -> Result<(), DeskError> {
    let mut seen: HashMap<R::Id, usize> = HashMap::with_capacity(records.len());
    for (idx, record) in records.iter().enumerate() {
        if let Some(first) = seen.insert(record.id(), idx) {
            return Err(DeskError::DuplicateId {
                id: record.id().to_string(),
                first_row: first + 1,
                row: idx + 1,
            });
        }
    }
    Ok(())
}

/// Expands `~` and environment variables in a user supplied path.
pub fn expand_path(path: &str) -> Result<PathBuf, DeskError> {
    shellexpand::full(path)
        .map(|p| PathBuf::from(p.as_ref()))
        .map_err(|e| DeskError::LoadingFailed(e.to_string()))
}

pub fn detect_file_type(path: &Path) -> Result<FileType, DeskError> {
    match path
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_uppercase())
        .as_deref()
    {
        Some("CSV") => Ok(FileType::CSV),
        Some("PARQUET") | Some("PQ") => Ok(FileType::PARQUET),
        Some("ARROW") | Some("IPC") | Some("FEATHER") => Ok(FileType::ARROW),
        _ => Err(DeskError::UnknownFileType),
    }
}

fn get_file_info(path: &Path) -> Result<FileInfo, DeskError> {
    let metadata = fs::metadata(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => DeskError::FileNotFound,
        ErrorKind::PermissionDenied => DeskError::PermissionDenied,
        _ => DeskError::IoError(e),
    })?;
    if !metadata.is_file() {
        return Err(DeskError::LoadingFailed("Not a file!".into()));
    }

    let file_type = detect_file_type(path)?;

    Ok(FileInfo {
        path: path.to_path_buf(),
        file_size: metadata.len(),
        file_type,
    })
}

// Every column is cast to strings, one column per rayon task.
fn string_columns(df: &DataFrame) -> Result<(Vec<String>, Vec<Vec<Option<String>>>), PolarsError> {
    let names: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|n| n.as_str().to_string())
        .collect();

    let columns = names
        .par_iter()
        .map(|name| -> Result<Vec<Option<String>>, PolarsError> {
            let col = df.column(name)?.cast(&DataType::String)?;
            let series = col.str()?;
            let data: Vec<Option<String>> = series
                .into_iter()
                .map(|value| value.map(|s| s.to_string()))
                .collect();
            trace!("Column \"{}\" with {} rows", name, data.len());
            Ok(data)
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok((names, columns))
}

fn load_csv(path: &Path) -> Result<LazyFrame, PolarsError> {
    LazyCsvReader::new(PlPath::Local(path.into()))
        .with_has_header(true)
        .finish()
}

fn load_parquet(path: &Path) -> Result<LazyFrame, PolarsError> {
    LazyFrame::scan_parquet(PlPath::Local(path.into()), ScanArgsParquet::default())
}

fn load_arrow(path: &Path) -> Result<LazyFrame, PolarsError> {
    LazyFrame::scan_ipc(
        PlPath::Local(path.into()),
        polars::io::ipc::IpcScanOptions,
        UnifiedScanArgs::default(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (Vec<String>, Vec<Vec<Option<String>>>) {
        let headers = vec!["id".to_string(), "amount".to_string(), "date".to_string()];
        let columns = vec![
            vec![Some("1".to_string()), Some("2.0".to_string())],
            vec![Some("10.5".to_string()), Some("abc".to_string())],
            vec![Some("2024-02-01".to_string()), None],
        ];
        (headers, columns)
    }

    #[test]
    fn raw_row_parses_typed_values() {
        let (headers, columns) = sample();
        let row = RawRow::new(0, &headers, &columns);
        assert_eq!(row.integer("id").unwrap(), 1);
        assert_eq!(row.decimal("amount").unwrap(), 10.5);
        assert_eq!(row.date("date").unwrap(), NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
    }

    #[test]
    fn raw_row_reports_bad_values() {
        let (headers, columns) = sample();
        let row = RawRow::new(1, &headers, &columns);
        assert_eq!(row.integer("id").unwrap(), 2);
        match row.decimal("amount") {
            Err(DeskError::RecordParse { row, field, value, .. }) => {
                assert_eq!(row, 2);
                assert_eq!(field, "amount");
                assert_eq!(value, "abc");
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(row.opt_date("date").unwrap().is_none());
        assert!(row.date("date").is_err());
        assert!(row.text("missing_column").is_err());
    }

    #[test]
    fn file_types_from_extension() {
        assert_eq!(detect_file_type(Path::new("a/b.CSV")).unwrap(), FileType::CSV);
        assert_eq!(detect_file_type(Path::new("b.pq")).unwrap(), FileType::PARQUET);
        assert_eq!(detect_file_type(Path::new("b.feather")).unwrap(), FileType::ARROW);
        assert!(matches!(
            detect_file_type(Path::new("b.xlsx")),
            Err(DeskError::UnknownFileType)
        ));
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let mut leaves = crate::records::LeaveRequest::sample();
        assert!(check_unique_ids(&leaves).is_ok());
        leaves[4].id = leaves[1].id;
        match check_unique_ids(&leaves) {
            Err(DeskError::DuplicateId { id, first_row, row }) => {
                assert_eq!(id, "2");
                assert_eq!(first_row, 2);
                assert_eq!(row, 5);
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
