//! countrygeo Store - Geodata table persistence
//!
//! The table is read once before a run and written once after it, either as
//! a standalone JSON document or as a block embedded in a larger source file.

pub mod table_file;

pub use table_file::{TableFile, TableLayout};
