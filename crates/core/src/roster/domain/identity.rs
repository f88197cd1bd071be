use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque unique key of a roster member (a roll number).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RollNo(String);

impl RollNo {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into().trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RollNo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A known individual. Names are stored lower-cased.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identity {
    name: String,
    roll_no: RollNo,
}

impl Identity {
    pub fn new(name: &str, roll_no: RollNo) -> Self {
        Self {
            name: normalize_name(name),
            roll_no,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn roll_no(&self) -> &RollNo {
        &self.roll_no
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.roll_no)
    }
}

pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_is_case_normalized() {
        let identity = Identity::new("  Alice Smith ", RollNo::new("7"));
        assert_eq!(identity.name(), "alice smith");
    }

    #[test]
    fn test_roll_no_is_trimmed() {
        assert_eq!(RollNo::new(" 42 ").as_str(), "42");
    }

    #[test]
    fn test_display() {
        let identity = Identity::new("Bob", RollNo::new("2"));
        assert_eq!(identity.to_string(), "bob (2)");
    }
}
