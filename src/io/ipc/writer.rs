use std::io::Write;

use arrow_ipc::writer::{FileWriter, StreamWriter};

use crate::error::Result;
use crate::table::GeoTable;

/// Write a [GeoTable] to an Arrow IPC (Feather v2) file.
///
/// Batches are written uncompressed, one IPC record batch per table batch.
pub fn write_ipc<W: Write>(table: &GeoTable, writer: W) -> Result<()> {
    let mut writer = FileWriter::try_new(writer, table.schema())?;
    for batch in table.batches() {
        writer.write(batch)?;
    }
    writer.finish()?;
    Ok(())
}

/// Write a [GeoTable] to an Arrow IPC record batch stream.
pub fn write_ipc_stream<W: Write>(table: &GeoTable, writer: W) -> Result<()> {
    let mut writer = StreamWriter::try_new(writer, table.schema())?;
    for batch in table.batches() {
        writer.write(batch)?;
    }
    writer.finish()?;
    Ok(())
}
