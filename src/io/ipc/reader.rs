use std::io::{Read, Seek};

use arrow_array::RecordBatch;
use arrow_ipc::reader::{FileReader, StreamReader};
use arrow_schema::SchemaRef;

use crate::error::{GeoFeatherError, Result};
use crate::table::GeoTable;

fn geometry_column_index(schema: &SchemaRef) -> Result<usize> {
    schema
        .fields()
        .iter()
        .position(|field| {
            field
                .metadata()
                .get("ARROW:extension:name")
                .map(|name| name.starts_with("geoarrow."))
                .unwrap_or(false)
        })
        .ok_or(GeoFeatherError::General(
            "no geometry column found; expected a field tagged with a geoarrow extension name"
                .to_string(),
        ))
}

fn table_from_batches(schema: SchemaRef, batches: Vec<RecordBatch>) -> Result<GeoTable> {
    let geometry_column_index = geometry_column_index(&schema)?;
    GeoTable::try_new(schema, batches, geometry_column_index)
}

/// Read a [GeoTable] from an Arrow IPC (Feather v2) file.
///
/// The geometry column is located via its `ARROW:extension:name` field metadata.
pub fn read_ipc<R: Read + Seek>(reader: R) -> Result<GeoTable> {
    let reader = FileReader::try_new(reader, None)?;
    let schema = reader.schema();
    let batches = reader.collect::<std::result::Result<Vec<_>, _>>()?;
    table_from_batches(schema, batches)
}

/// Read a [GeoTable] from an Arrow IPC record batch stream.
pub fn read_ipc_stream<R: Read>(reader: R) -> Result<GeoTable> {
    let reader = StreamReader::try_new(reader, None)?;
    let schema = reader.schema();
    let batches = reader.collect::<std::result::Result<Vec<_>, _>>()?;
    table_from_batches(schema, batches)
}

#[cfg(test)]
mod test {
    use std::io::Cursor;
    use std::sync::Arc;

    use arrow_array::{ArrayRef, StringArray};
    use arrow_schema::{DataType, Field};

    use super::*;
    use crate::array::PointArray;
    use crate::datatypes::GeoDataType;
    use crate::io::ipc::{write_ipc, write_ipc_stream};
    use crate::test::point::{p0, p1, p2};

    fn test_table() -> GeoTable {
        let geometry: PointArray = vec![p0(), p1(), p2()].into();
        let names: ArrayRef = Arc::new(StringArray::from(vec!["a", "b", "c"]));
        GeoTable::from_arrow_and_geometry(
            vec![Field::new("name", DataType::Utf8, true).into()],
            vec![names],
            Arc::new(geometry),
        )
        .unwrap()
    }

    #[test]
    fn file_round_trip() {
        let table = test_table();
        let mut buffer = Vec::new();
        write_ipc(&table, &mut buffer).unwrap();

        let back = read_ipc(Cursor::new(buffer)).unwrap();
        assert_eq!(back.len(), 3);
        assert_eq!(back.geometry_data_type().unwrap(), GeoDataType::Point);
        assert_eq!(back.schema(), table.schema());
    }

    #[test]
    fn stream_round_trip() {
        let table = test_table();
        let mut buffer = Vec::new();
        write_ipc_stream(&table, &mut buffer).unwrap();

        let back = read_ipc_stream(Cursor::new(buffer)).unwrap();
        assert_eq!(back.len(), 3);
        assert_eq!(back.geometry_column_index(), table.geometry_column_index());
    }

    #[test]
    fn missing_geometry_column_rejected() {
        let schema: SchemaRef = Arc::new(arrow_schema::Schema::new(vec![Field::new(
            "name",
            DataType::Utf8,
            true,
        )]));
        let names: ArrayRef = Arc::new(StringArray::from(vec!["a"]));
        let batch = RecordBatch::try_new(schema.clone(), vec![names]).unwrap();

        let mut buffer = Vec::new();
        let mut writer = arrow_ipc::writer::FileWriter::try_new(&mut buffer, &schema).unwrap();
        writer.write(&batch).unwrap();
        writer.finish().unwrap();
        drop(writer);

        assert!(read_ipc(Cursor::new(buffer)).is_err());
    }
}
