pub mod capture;
pub mod detection;
pub mod display;
pub mod ledger;
pub mod roster;
pub mod session;
pub mod shared;
pub mod tracking;
