pub mod attendance_record;
pub mod daily_ledger;
pub mod ledger_store;
