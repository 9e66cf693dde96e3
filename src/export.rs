use std::io::{self, ErrorKind};
use std::path::Path;

use csv::Writer;
use tracing::info;

use crate::domain::DeskError;
use crate::records::Record;

/// Header of `R::columns()` followed by one record per row.
/// Returns the number of data rows written.
fn write_records<'a, W: io::Write, R: Record>(
    wtr: &mut Writer<W>,
    records: impl IntoIterator<Item = &'a R>,
) -> Result<usize, DeskError> {
    wtr.write_record(R::columns())?;
    let mut written = 0;
    for record in records {
        wtr.write_record(record.cells())?;
        written += 1;
    }
    wtr.flush()?;
    Ok(written)
}

/// Csv text of `records` together with the number of data rows.
pub fn to_csv<'a, R: Record>(
    records: impl IntoIterator<Item = &'a R>,
) -> Result<(String, usize), DeskError> {
    let mut wtr = Writer::from_writer(Vec::new());
    let written = write_records(&mut wtr, records)?;
    let bytes = wtr.into_inner().map_err(|e| e.into_error())?;
    let text = String::from_utf8(bytes).map_err(|e| io::Error::new(ErrorKind::InvalidData, e))?;
    Ok((text, written))
}

pub fn write_csv<'a, R: Record>(
    path: &Path,
    records: impl IntoIterator<Item = &'a R>,
) -> Result<usize, DeskError> {
    let mut wtr = Writer::from_path(path)?;
    let written = write_records(&mut wtr, records)?;
    info!("Exported {} {} to {}", written, R::KIND, path.display());
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{ExpenseLine, LeaveRequest};

    #[test]
    fn exports_header_and_rows() {
        let expenses = ExpenseLine::sample();
        let (text, rows) = to_csv(expenses.iter().take(2)).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(rows, 2);
        assert_eq!(lines[0], "id,description,category,submitted_by,amount,date,status");
        assert_eq!(lines[1], "1,Client dinner,Meals,Amelia Hart,182.40,2024-01-09,Reimbursed");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn quotes_separators_and_quotes() {
        let mut leave = LeaveRequest::sample().remove(0);
        leave.reason = Some("says \"hi\", twice".to_string());
        let (text, _) = to_csv([&leave]).unwrap();
        assert!(text.ends_with(",\"says \"\"hi\"\", twice\"\n"));
    }

    #[test]
    fn multiline_cells_count_as_one_row() {
        let mut leaves: Vec<LeaveRequest> = LeaveRequest::sample().into_iter().take(2).collect();
        leaves[1].reason = Some("line one\nline two".to_string());

        let (text, rows) = to_csv(leaves.iter()).unwrap();
        assert_eq!(rows, 2);
        assert!(text.contains("\"line one\nline two\""));

        let path = std::env::temp_dir().join(format!("hrdesk-multiline-{}.csv", std::process::id()));
        let written = write_csv(&path, leaves.iter()).unwrap();
        assert_eq!(written, 2);

        let mut rdr = csv::Reader::from_path(&path).unwrap();
        let read_back: Vec<csv::StringRecord> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(read_back.len(), 2);
        assert_eq!(&read_back[1][8], "line one\nline two");
        std::fs::remove_file(&path).unwrap();
    }
}
