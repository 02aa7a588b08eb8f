use arrow_array::RecordBatch;
use arrow_schema::SchemaRef;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::file::reader::ChunkReader;

use crate::error::Result;

/// Read a plain (non-geospatial) Parquet file into Arrow record batches.
///
/// Useful for datasets whose geometry arrives as a WKT string column rather than as
/// GeoArrow arrays; parse such a column with [`crate::io::wkt::parse_wkt`] afterwards.
pub fn read_parquet<R: ChunkReader + 'static>(
    reader: R,
    batch_size: usize,
) -> Result<(SchemaRef, Vec<RecordBatch>)> {
    let builder = ParquetRecordBatchReaderBuilder::try_new(reader)?.with_batch_size(batch_size);
    let schema = builder.schema().clone();
    let reader = builder.build()?;
    let batches = reader.collect::<std::result::Result<Vec<_>, _>>()?;
    Ok((schema, batches))
}

#[cfg(test)]
mod test {
    use std::fs::File;
    use std::sync::Arc;

    use arrow_array::{ArrayRef, Int64Array, StringArray};
    use arrow_schema::{DataType, Field, Schema};
    use parquet::arrow::ArrowWriter;

    use super::*;

    #[test]
    fn round_trip_through_file() {
        let schema = Arc::new(Schema::new(vec![
            Field::new("id", DataType::Int64, false),
            Field::new("wkt", DataType::Utf8, true),
        ]));
        let ids: ArrayRef = Arc::new(Int64Array::from(vec![1, 2]));
        let wkts: ArrayRef = Arc::new(StringArray::from(vec!["POINT(0 0)", "POINT(1 1)"]));
        let batch = RecordBatch::try_new(schema.clone(), vec![ids, wkts]).unwrap();

        let path = std::env::temp_dir().join("geofeather-parquet-reader-test.parquet");
        let file = File::create(&path).unwrap();
        let mut writer = ArrowWriter::try_new(file, schema.clone(), None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let (read_schema, batches) = read_parquet(File::open(&path).unwrap(), 1024).unwrap();
        assert_eq!(read_schema, schema);
        assert_eq!(batches.iter().map(|b| b.num_rows()).sum::<usize>(), 2);

        std::fs::remove_file(path).unwrap();
    }
}
