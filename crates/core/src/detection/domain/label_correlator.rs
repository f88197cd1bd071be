use std::collections::{HashMap, HashSet};

use thiserror::Error;

use super::detection::Detection;
use crate::roster::domain::identity::Identity;
use crate::roster::domain::roster::{normalize_label, Roster};
use crate::shared::region::Region;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CorrelationError {
    #[error("detector labels missing from the roster: {}", .0.join(", "))]
    UnknownLabels(Vec<String>),
    #[error("detector label '{0}' has no roster entry")]
    Unmatched(String),
}

/// A detection after its label has been resolved against the roster.
#[derive(Debug, Clone, PartialEq)]
pub enum Correlated {
    Known { identity: Identity, region: Region },
    Unknown { region: Region },
}

/// Explicit label → identity table, built once from the roster.
pub struct LabelCorrelator {
    by_label: HashMap<String, Identity>,
    warned: HashSet<String>,
}

impl LabelCorrelator {
    pub fn new(roster: &Roster) -> Self {
        let by_label = roster
            .entries()
            .iter()
            .map(|e| (e.label.clone(), e.identity.clone()))
            .collect();
        Self {
            by_label,
            warned: HashSet::new(),
        }
    }

    /// Fails unless every label in `labels` belongs to a roster entry.
    pub fn validate(&self, labels: &[String]) -> Result<(), CorrelationError> {
        let mut missing: Vec<String> = labels
            .iter()
            .filter(|l| !self.by_label.contains_key(&normalize_label(l)))
            .cloned()
            .collect();
        if missing.is_empty() {
            return Ok(());
        }
        missing.sort();
        missing.dedup();
        Err(CorrelationError::UnknownLabels(missing))
    }

    /// `Ok(None)` for an unlabelled detection.
    pub fn correlate(&self, label: Option<&str>) -> Result<Option<&Identity>, CorrelationError> {
        let Some(label) = label else {
            return Ok(None);
        };
        self.by_label
            .get(&normalize_label(label))
            .map(Some)
            .ok_or_else(|| CorrelationError::Unmatched(label.to_string()))
    }

    /// Resolves a frame's detections in order. Labels without a roster entry
    /// degrade to unknown faces and are warned about once.
    pub fn resolve(&mut self, detections: &[Detection]) -> Vec<Correlated> {
        let mut resolved = Vec::with_capacity(detections.len());
        for d in detections {
            let entry = match d.label.as_deref() {
                None => Correlated::Unknown { region: d.region },
                Some(label) => match self.by_label.get(&normalize_label(label)) {
                    Some(identity) => Correlated::Known {
                        identity: identity.clone(),
                        region: d.region,
                    },
                    None => {
                        if self.warned.insert(label.to_string()) {
                            log::warn!(
                                "{}; treating as unknown",
                                CorrelationError::Unmatched(label.to_string())
                            );
                        }
                        Correlated::Unknown { region: d.region }
                    }
                },
            };
            resolved.push(entry);
        }
        resolved
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::domain::identity::RollNo;
    use crate::roster::domain::roster::RosterEntry;

    fn roster() -> Roster {
        Roster::new(vec![
            RosterEntry::named(Identity::new("alice", RollNo::new("1"))),
            RosterEntry::labelled(Identity::new("bob", RollNo::new("2")), "bob_photo"),
        ])
        .unwrap()
    }

    fn region() -> Region {
        Region::new(10, 10, 40, 40)
    }

    #[test]
    fn test_validate_accepts_subset() {
        let correlator = LabelCorrelator::new(&roster());
        assert!(correlator.validate(&["alice".to_string()]).is_ok());
        assert!(correlator.validate(&[]).is_ok());
    }

    #[test]
    fn test_validate_reports_unknown_labels() {
        let correlator = LabelCorrelator::new(&roster());
        let result = correlator.validate(&[
            "zoe".to_string(),
            "alice".to_string(),
            "bob".to_string(),
        ]);
        assert_eq!(
            result,
            Err(CorrelationError::UnknownLabels(vec![
                "bob".to_string(),
                "zoe".to_string()
            ]))
        );
    }

    #[test]
    fn test_correlate() {
        let correlator = LabelCorrelator::new(&roster());
        assert_eq!(correlator.correlate(None), Ok(None));
        assert_eq!(
            correlator.correlate(Some("BOB_PHOTO")).unwrap().unwrap().name(),
            "bob"
        );
        assert_eq!(
            correlator.correlate(Some("carol")),
            Err(CorrelationError::Unmatched("carol".to_string()))
        );
    }

    #[test]
    fn test_resolve_keeps_order_and_degrades_unmatched() {
        let mut correlator = LabelCorrelator::new(&roster());
        let detections = vec![
            Detection::unknown(region()),
            Detection::known(region(), "carol"),
            Detection::known(region(), "alice"),
        ];

        let resolved = correlator.resolve(&detections);

        assert_eq!(resolved.len(), 3);
        assert!(matches!(resolved[0], Correlated::Unknown { .. }));
        assert!(matches!(resolved[1], Correlated::Unknown { .. }));
        assert!(matches!(
            &resolved[2],
            Correlated::Known { identity, .. } if identity.name() == "alice"
        ));
    }
}
