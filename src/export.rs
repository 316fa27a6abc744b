use std::io::{Read, Write};
use std::path::Path;

use crate::error::ReportError;
use crate::models::FailingEmployeeRow;

pub const EXPORT_DELIMITER: u8 = b';';
pub const DEFAULT_EXPORT_FILE: &str = "failing_employees.csv";

const BOM: &[u8] = b"\xEF\xBB\xBF";
const HEADER: [&str; 8] = [
    "employee_name",
    "email",
    "manager_name",
    "department",
    "category",
    "total_trainings",
    "completed_count",
    "pass_rate",
];

pub fn write_failing_csv<W: Write>(
    mut writer: W,
    rows: &[FailingEmployeeRow],
) -> Result<(), ReportError> {
    writer.write_all(BOM).map_err(csv::Error::from)?;

    let mut csv_writer = csv::WriterBuilder::new()
        .delimiter(EXPORT_DELIMITER)
        .from_writer(writer);

    csv_writer.write_record(HEADER)?;
    for row in rows {
        let total = row.total_trainings.to_string();
        let completed = row.completed_count.to_string();
        let pass_rate = format!("{:.2}", row.pass_rate);
        csv_writer.write_record([
            row.employee_name.as_str(),
            row.email.as_str(),
            row.manager_name.as_str(),
            row.department.as_str(),
            row.category.label(),
            total.as_str(),
            completed.as_str(),
            pass_rate.as_str(),
        ])?;
    }
    csv_writer.flush().map_err(csv::Error::from)?;
    Ok(())
}

pub fn read_failing_csv<R: Read>(mut reader: R) -> Result<Vec<FailingEmployeeRow>, ReportError> {
    let mut contents = Vec::new();
    reader
        .read_to_end(&mut contents)
        .map_err(csv::Error::from)?;
    let body = contents.strip_prefix(BOM).unwrap_or(contents.as_slice());

    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(EXPORT_DELIMITER)
        .has_headers(true)
        .from_reader(body);

    let mut rows = Vec::new();
    for result in csv_reader.deserialize::<FailingEmployeeRow>() {
        rows.push(result?);
    }
    Ok(rows)
}

pub fn export_failing_file(path: &Path, rows: &[FailingEmployeeRow]) -> Result<(), ReportError> {
    let file = std::fs::File::create(path).map_err(|source| ReportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    write_failing_csv(std::io::BufWriter::new(file), rows)?;

    tracing::info!(path = %path.display(), rows = rows.len(), "exported failing employees");
    Ok(())
}
