use std::path::PathBuf;

use chrono::NaiveDate;
use thiserror::Error;

use super::attendance_record::AttendanceRecord;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("failed to read ledger {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("corrupt ledger {} at line {line}: {reason}", path.display())]
    Corrupt {
        path: PathBuf,
        line: u64,
        reason: String,
    },
}

#[derive(Error, Debug)]
pub enum PersistError {
    #[error("failed to create ledger directory {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write ledger {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode ledger {}: {source}", path.display())]
    Encode {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

/// Persistence for per-date attendance tables.
///
/// `save` replaces the whole table for `date`. Implementations must leave
/// the previously committed table intact when a save fails.
pub trait LedgerStore {
    /// Returns `Ok(None)` when nothing has been stored for `date`.
    fn load(&self, date: NaiveDate) -> Result<Option<Vec<AttendanceRecord>>, StorageError>;

    fn save(&self, date: NaiveDate, records: &[AttendanceRecord]) -> Result<(), PersistError>;
}
