//! Read Parquet files into Arrow record batches.

pub use reader::read_parquet;

mod reader;
