//! Reader and writer implementations of dataset formats.

pub mod csv;
pub mod geojson;
pub mod ipc;
#[cfg(feature = "parquet")]
pub mod parquet;
pub mod wkt;
