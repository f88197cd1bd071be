use std::collections::HashMap;
use std::path::PathBuf;

use thiserror::Error;

use super::identity::{normalize_name, Identity, RollNo};

#[derive(Error, Debug)]
pub enum RosterLoadError {
    #[error("failed to read roster {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("roster is missing a {0} column")]
    MissingColumn(&'static str),
    #[error("roster row {line}: missing {field}")]
    MalformedRow { line: u64, field: &'static str },
    #[error("roll number {0} appears more than once in the roster")]
    DuplicateRollNo(RollNo),
    #[error("label '{0}' maps to more than one roster entry")]
    DuplicateLabel(String),
}

/// One roster member and the detector label that refers to them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterEntry {
    pub identity: Identity,
    pub label: String,
}

impl RosterEntry {
    /// Entry whose label is the normalized name.
    pub fn named(identity: Identity) -> Self {
        let label = identity.name().to_string();
        Self { identity, label }
    }

    pub fn labelled(identity: Identity, label: &str) -> Self {
        Self {
            identity,
            label: normalize_label(label),
        }
    }
}

/// Ordered set of known identities, indexed by roll number and by label.
///
/// Construction rejects duplicate roll numbers and duplicate labels, so both
/// indexes are injective.
#[derive(Debug, Clone, Default)]
pub struct Roster {
    entries: Vec<RosterEntry>,
    by_label: HashMap<String, usize>,
    by_roll_no: HashMap<RollNo, usize>,
}

impl Roster {
    pub fn new(entries: Vec<RosterEntry>) -> Result<Self, RosterLoadError> {
        let mut by_label = HashMap::with_capacity(entries.len());
        let mut by_roll_no = HashMap::with_capacity(entries.len());
        for (idx, entry) in entries.iter().enumerate() {
            if by_roll_no
                .insert(entry.identity.roll_no().clone(), idx)
                .is_some()
            {
                return Err(RosterLoadError::DuplicateRollNo(
                    entry.identity.roll_no().clone(),
                ));
            }
            if by_label.insert(entry.label.clone(), idx).is_some() {
                return Err(RosterLoadError::DuplicateLabel(entry.label.clone()));
            }
        }
        Ok(Self {
            entries,
            by_label,
            by_roll_no,
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[RosterEntry] {
        &self.entries
    }

    pub fn identities(&self) -> impl Iterator<Item = &Identity> {
        self.entries.iter().map(|e| &e.identity)
    }

    pub fn by_label(&self, label: &str) -> Option<&Identity> {
        self.by_label
            .get(&normalize_label(label))
            .map(|&idx| &self.entries[idx].identity)
    }

    pub fn by_roll_no(&self, roll_no: &RollNo) -> Option<&Identity> {
        self.by_roll_no
            .get(roll_no)
            .map(|&idx| &self.entries[idx].identity)
    }

    pub fn contains_label(&self, label: &str) -> bool {
        self.by_label.contains_key(&normalize_label(label))
    }
}

/// Labels compare the same way names do: trimmed and lower-cased.
pub fn normalize_label(label: &str) -> String {
    normalize_name(label)
}
