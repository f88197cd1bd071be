use std::path::{Path, PathBuf};

use crate::roster::domain::identity::{Identity, RollNo};
use crate::roster::domain::roster::{Roster, RosterEntry, RosterLoadError};
use crate::roster::domain::roster_source::RosterSource;

const NAME_HEADERS: &[&str] = &["name"];
const ROLL_NO_HEADERS: &[&str] = &["rollno", "rollnumber"];
const LABEL_HEADERS: &[&str] = &["label"];

/// Reads the roster from a CSV file with `Name` and `Roll No` columns.
///
/// Header matching ignores case, spaces and underscores, so `RollNo`,
/// `Roll No` and `roll_no` all work. An optional `Label` column overrides
/// the detector label, which otherwise defaults to the lower-cased name.
pub struct CsvRosterSource {
    path: PathBuf,
}

impl CsvRosterSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_error(&self, source: csv::Error) -> RosterLoadError {
        RosterLoadError::Read {
            path: self.path.clone(),
            source,
        }
    }
}

impl RosterSource for CsvRosterSource {
    fn load(&self) -> Result<Roster, RosterLoadError> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_path(&self.path)
            .map_err(|e| self.read_error(e))?;

        let headers = reader.headers().map_err(|e| self.read_error(e))?.clone();
        let name_col = find_column(&headers, NAME_HEADERS).ok_or(RosterLoadError::MissingColumn("Name"))?;
        let roll_col =
            find_column(&headers, ROLL_NO_HEADERS).ok_or(RosterLoadError::MissingColumn("Roll No"))?;
        let label_col = find_column(&headers, LABEL_HEADERS);

        let mut entries = Vec::new();
        for result in reader.records() {
            let record = result.map_err(|e| self.read_error(e))?;
            let line = record.position().map(|p| p.line()).unwrap_or(0);

            let name = non_empty(record.get(name_col)).ok_or(RosterLoadError::MalformedRow {
                line,
                field: "name",
            })?;
            let roll_no = non_empty(record.get(roll_col)).ok_or(RosterLoadError::MalformedRow {
                line,
                field: "roll number",
            })?;

            let identity = Identity::new(name, RollNo::new(roll_no));
            let entry = match label_col.and_then(|col| non_empty(record.get(col))) {
                Some(label) => RosterEntry::labelled(identity, label),
                None => RosterEntry::named(identity),
            };
            entries.push(entry);
        }

        let roster = Roster::new(entries)?;
        log::info!(
            "Loaded {} roster entries from {}",
            roster.len(),
            self.path.display()
        );
        Ok(roster)
    }
}

fn find_column(headers: &csv::StringRecord, candidates: &[&str]) -> Option<usize> {
    headers
        .iter()
        .position(|h| candidates.contains(&canonical_header(h).as_str()))
}

fn canonical_header(header: &str) -> String {
    header
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
        .flat_map(char::to_lowercase)
        .collect()
}

fn non_empty(field: Option<&str>) -> Option<&str> {
    field.filter(|f| !f.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::fs;
    use tempfile::TempDir;

    fn write_roster(dir: &TempDir, contents: &str) -> PathBuf {
        let path = dir.path().join("students.csv");
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_loads_rows_in_order() {
        let tmp = TempDir::new().unwrap();
        let path = write_roster(&tmp, "Name,Roll No\nAlice,1\nBob,2\n");

        let roster = CsvRosterSource::new(path).load().unwrap();

        let names: Vec<_> = roster.identities().map(|i| i.name()).collect();
        assert_eq!(names, vec!["alice", "bob"]);
        assert_eq!(roster.by_label("bob").unwrap().roll_no().as_str(), "2");
    }

    #[rstest]
    #[case::spaced("Name,Roll No")]
    #[case::camel("Name,RollNo")]
    #[case::snake("name,roll_no")]
    #[case::lower("name,rollno")]
    fn test_roll_number_header_aliases(#[case] header: &str) {
        let tmp = TempDir::new().unwrap();
        let path = write_roster(&tmp, &format!("{header}\nAlice,1\n"));
        let roster = CsvRosterSource::new(path).load().unwrap();
        assert_eq!(roster.len(), 1);
    }

    #[test]
    fn test_extra_columns_are_ignored() {
        let tmp = TempDir::new().unwrap();
        let path = write_roster(&tmp, "Email,Name,Roll No\na@x.org,Alice,1\n");
        let roster = CsvRosterSource::new(path).load().unwrap();
        assert_eq!(roster.by_label("alice").unwrap().roll_no().as_str(), "1");
    }

    #[test]
    fn test_label_column_overrides_name() {
        let tmp = TempDir::new().unwrap();
        let path = write_roster(&tmp, "Name,Roll No,Label\nAlice,1,a_smith\nBob,2,\n");
        let roster = CsvRosterSource::new(path).load().unwrap();
        assert!(roster.by_label("a_smith").is_some());
        assert!(roster.by_label("bob").is_some());
    }

    #[test]
    fn test_missing_name_is_malformed() {
        let tmp = TempDir::new().unwrap();
        let path = write_roster(&tmp, "Name,Roll No\nAlice,1\n,2\n");
        let result = CsvRosterSource::new(path).load();
        assert!(matches!(
            result,
            Err(RosterLoadError::MalformedRow { line: 3, field: "name" })
        ));
    }

    #[test]
    fn test_short_row_is_malformed() {
        let tmp = TempDir::new().unwrap();
        let path = write_roster(&tmp, "Name,Roll No\nAlice\n");
        let result = CsvRosterSource::new(path).load();
        assert!(matches!(
            result,
            Err(RosterLoadError::MalformedRow { field: "roll number", .. })
        ));
    }

    #[test]
    fn test_missing_column() {
        let tmp = TempDir::new().unwrap();
        let path = write_roster(&tmp, "Name,Grade\nAlice,A\n");
        let result = CsvRosterSource::new(path).load();
        assert!(matches!(result, Err(RosterLoadError::MissingColumn("Roll No"))));
    }

    #[test]
    fn test_missing_file() {
        let tmp = TempDir::new().unwrap();
        let result = CsvRosterSource::new(tmp.path().join("absent.csv")).load();
        assert!(matches!(result, Err(RosterLoadError::Read { .. })));
    }

    #[test]
    fn test_duplicate_roll_numbers() {
        let tmp = TempDir::new().unwrap();
        let path = write_roster(&tmp, "Name,Roll No\nAlice,1\nBob,1\n");
        let result = CsvRosterSource::new(path).load();
        assert!(matches!(result, Err(RosterLoadError::DuplicateRollNo(_))));
    }
}
