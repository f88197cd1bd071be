use super::roster::{Roster, RosterLoadError};

/// Provides the roster once at startup.
pub trait RosterSource {
    fn load(&self) -> Result<Roster, RosterLoadError>;
}
