//! Read CSV files with coordinate columns into GeoTables.

pub use reader::{read_csv, CsvReaderOptions};

mod reader;
