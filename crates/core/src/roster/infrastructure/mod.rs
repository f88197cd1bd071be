pub mod csv_roster_source;
