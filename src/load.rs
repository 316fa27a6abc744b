use std::io::Read;
use std::path::{Path, PathBuf};

use crate::error::ReportError;
use crate::models::RawRecord;
use crate::normalize::NameStrategy;

pub const DEFAULT_DELIMITER: u8 = b';';

const EMAIL: &str = "email";
const FIRST_NAME: &str = "first_name";
const LAST_NAME: &str = "last_name";
const MANAGER_NAME: &str = "manager_name";
const DEPARTMENT: &str = "department";
const TRAINING_STATUS: &str = "training_status";

#[derive(Debug, Clone)]
pub struct Dataset {
    pub records: Vec<RawRecord>,
    pub name_strategy: NameStrategy,
}

pub fn normalize_header(name: &str) -> String {
    let mut output = String::with_capacity(name.len());
    let mut pending_separator = false;

    for c in name.trim().trim_start_matches('\u{feff}').chars() {
        if c.is_alphanumeric() {
            if pending_separator && !output.is_empty() {
                output.push('_');
            }
            pending_separator = false;
            output.extend(c.to_lowercase());
        } else {
            pending_separator = true;
        }
    }

    output
}

/// CSV files directly under `dir`, sorted by path.
pub fn discover_inputs(dir: &Path) -> Result<Vec<PathBuf>, ReportError> {
    let entries = std::fs::read_dir(dir).map_err(|source| ReportError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry
            .map_err(|source| ReportError::Io {
                path: dir.to_path_buf(),
                source,
            })?
            .path();
        let is_csv = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
        if is_csv && path.is_file() {
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}

/// An explicit file wins; otherwise the first CSV found in `dir`.
pub fn resolve_input(file: Option<PathBuf>, dir: &Path) -> Result<PathBuf, ReportError> {
    if let Some(file) = file {
        return Ok(file);
    }

    discover_inputs(dir)?
        .into_iter()
        .next()
        .ok_or_else(|| ReportError::NoInputFiles {
            dir: dir.to_path_buf(),
        })
}

struct Columns {
    email: usize,
    first_name: Option<usize>,
    last_name: Option<usize>,
    manager_name: Option<usize>,
    department: Option<usize>,
    training_status: Option<usize>,
}

impl Columns {
    fn resolve(headers: &csv::StringRecord) -> Result<Self, ReportError> {
        let names: Vec<String> = headers.iter().map(normalize_header).collect();
        let find = |wanted: &str| names.iter().position(|name| name == wanted);

        Ok(Self {
            email: find(EMAIL).ok_or_else(|| ReportError::MissingRequiredColumn {
                column: EMAIL.to_string(),
            })?,
            first_name: find(FIRST_NAME),
            last_name: find(LAST_NAME),
            manager_name: find(MANAGER_NAME),
            department: find(DEPARTMENT),
            training_status: find(TRAINING_STATUS),
        })
    }

    fn name_strategy(&self) -> NameStrategy {
        NameStrategy::from_columns(self.first_name.is_some(), self.last_name.is_some())
    }

    fn read(&self, row: &csv::StringRecord) -> RawRecord {
        let cell = |index: Option<usize>| {
            index
                .and_then(|i| row.get(i))
                .filter(|value| !value.trim().is_empty())
                .map(str::to_string)
        };

        RawRecord {
            email: cell(Some(self.email)),
            first_name: cell(self.first_name),
            last_name: cell(self.last_name),
            manager_name: cell(self.manager_name),
            department: cell(self.department),
            training_status: cell(self.training_status),
        }
    }
}

pub fn load_dataset<R: Read>(reader: R, delimiter: u8) -> Result<Dataset, ReportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let columns = Columns::resolve(csv_reader.headers()?)?;

    let mut records = Vec::new();
    for result in csv_reader.records() {
        records.push(columns.read(&result?));
    }

    Ok(Dataset {
        records,
        name_strategy: columns.name_strategy(),
    })
}

pub fn load_dataset_file(path: &Path, delimiter: u8) -> Result<Dataset, ReportError> {
    let file = std::fs::File::open(path).map_err(|source| ReportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let dataset = load_dataset(file, delimiter)?;

    tracing::info!(
        path = %path.display(),
        rows = dataset.records.len(),
        name_strategy = ?dataset.name_strategy,
        "loaded training records"
    );
    Ok(dataset)
}
