pub mod identity;
pub mod roster;
pub mod roster_source;
