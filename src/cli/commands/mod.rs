pub mod create_database;
pub mod select_sorted;
pub mod statement_hook;
pub mod update_records;
