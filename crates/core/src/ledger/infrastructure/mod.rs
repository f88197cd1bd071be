pub mod csv_ledger_store;
