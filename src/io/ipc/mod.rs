//! Read and write GeoTables in the Arrow IPC (Feather v2) format.

pub use reader::{read_ipc, read_ipc_stream};
pub use writer::{write_ipc, write_ipc_stream};

mod reader;
mod writer;
