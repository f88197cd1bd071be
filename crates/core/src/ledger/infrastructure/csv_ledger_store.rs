use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::ledger::domain::attendance_record::{AttendanceRecord, AttendanceStatus};
use crate::ledger::domain::ledger_store::{LedgerStore, PersistError, StorageError};
use crate::roster::domain::identity::{Identity, RollNo};
use crate::shared::constants::{LEDGER_DATE_FORMAT, LEDGER_FILE_EXTENSION, LEDGER_FILE_PREFIX};

const HEADER: [&str; 5] = ["date", "name", "rollno", "total_recognized", "status"];

/// Stores each day's attendance as `Attendance-YYYY-MM-DD.csv` in one directory.
///
/// Saves go to a `.part` file that is renamed over the real one, so a failed
/// or interrupted write never damages the last committed table.
pub struct CsvLedgerStore {
    dir: PathBuf,
}

#[derive(Debug, Serialize, Deserialize)]
struct LedgerRow {
    date: NaiveDate,
    name: String,
    rollno: String,
    total_recognized: f64,
    status: AttendanceStatus,
}

impl CsvLedgerStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, date: NaiveDate) -> PathBuf {
        self.dir.join(format!(
            "{LEDGER_FILE_PREFIX}{}.{LEDGER_FILE_EXTENSION}",
            date.format(LEDGER_DATE_FORMAT)
        ))
    }

    fn write_table(path: &Path, records: &[AttendanceRecord]) -> Result<(), PersistError> {
        let encode_err = |e: csv::Error| PersistError::Encode {
            path: path.to_path_buf(),
            source: e,
        };
        let write_err = |e: std::io::Error| PersistError::Write {
            path: path.to_path_buf(),
            source: e,
        };

        let file = fs::File::create(path).map_err(write_err)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        writer.write_record(HEADER).map_err(encode_err)?;
        for record in records {
            writer.serialize(to_row(record)).map_err(encode_err)?;
        }
        writer.flush().map_err(write_err)?;
        let mut file = writer
            .into_inner()
            .map_err(|e| write_err(std::io::Error::other(e.to_string())))?;
        file.flush().map_err(write_err)?;
        file.sync_all().map_err(write_err)?;
        Ok(())
    }
}

impl LedgerStore for CsvLedgerStore {
    fn load(&self, date: NaiveDate) -> Result<Option<Vec<AttendanceRecord>>, StorageError> {
        let path = self.path_for(date);
        if !path.exists() {
            return Ok(None);
        }

        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(&path)
            .map_err(|e| StorageError::Read {
                path: path.clone(),
                source: e,
            })?;

        let mut records = Vec::new();
        for result in reader.deserialize::<LedgerRow>() {
            let row = result.map_err(|e| row_error(&path, e))?;
            if !(row.total_recognized.is_finite() && row.total_recognized >= 0.0) {
                return Err(StorageError::Corrupt {
                    path: path.clone(),
                    line: records.len() as u64 + 2,
                    reason: format!("total_recognized must be non-negative, got {}", row.total_recognized),
                });
            }
            records.push(from_row(row));
        }

        log::debug!("Loaded {} record(s) from {}", records.len(), path.display());
        Ok(Some(records))
    }

    fn save(&self, date: NaiveDate, records: &[AttendanceRecord]) -> Result<(), PersistError> {
        fs::create_dir_all(&self.dir).map_err(|e| PersistError::CreateDir {
            path: self.dir.clone(),
            source: e,
        })?;

        let path = self.path_for(date);
        let temp_path = path.with_extension(format!("{LEDGER_FILE_EXTENSION}.part"));

        if let Err(e) = Self::write_table(&temp_path, records) {
            let _ = fs::remove_file(&temp_path);
            return Err(e);
        }

        fs::rename(&temp_path, &path).map_err(|e| {
            let _ = fs::remove_file(&temp_path);
            PersistError::Write {
                path: path.clone(),
                source: e,
            }
        })?;

        log::debug!("Wrote {} record(s) to {}", records.len(), path.display());
        Ok(())
    }
}

fn row_error(path: &Path, e: csv::Error) -> StorageError {
    if matches!(e.kind(), csv::ErrorKind::Io(_)) {
        return StorageError::Read {
            path: path.to_path_buf(),
            source: e,
        };
    }
    StorageError::Corrupt {
        path: path.to_path_buf(),
        line: e.position().map(|p| p.line()).unwrap_or(0),
        reason: e.to_string(),
    }
}

fn to_row(record: &AttendanceRecord) -> LedgerRow {
    LedgerRow {
        date: record.date,
        name: record.identity.name().to_string(),
        rollno: record.roll_no().to_string(),
        total_recognized: record.observed_seconds,
        status: record.status,
    }
}

fn from_row(row: LedgerRow) -> AttendanceRecord {
    AttendanceRecord {
        date: row.date,
        identity: Identity::new(&row.name, RollNo::new(row.rollno)),
        observed_seconds: row.total_recognized,
        status: row.status,
    }
}
