use std::io::{Read, Seek};
use std::sync::Arc;

use arrow::compute::concat_batches;
use arrow::csv::reader::Format;
use arrow::csv::ReaderBuilder;
use arrow_array::cast::AsArray;
use arrow_array::types::Float64Type;
use arrow_array::{Array, ArrayRef};
use arrow_cast::cast;
use arrow_schema::{DataType, FieldRef, SchemaRef};

use crate::array::PointBuilder;
use crate::error::Result;
use crate::table::GeoTable;
use crate::trait_::GeometryArrayBuilder;

/// Options for the CSV reader.
#[derive(Debug, Clone)]
pub struct CsvReaderOptions {
    /// The column holding the x coordinate of each row.
    pub longitude_column: String,

    /// The column holding the y coordinate of each row.
    pub latitude_column: String,

    /// The number of rows per decoded batch.
    pub batch_size: usize,

    /// Whether the first line is a header.
    pub has_header: bool,
}

impl Default for CsvReaderOptions {
    fn default() -> Self {
        Self {
            longitude_column: "longitude".to_string(),
            latitude_column: "latitude".to_string(),
            batch_size: 65_536,
            has_header: true,
        }
    }
}

/// Read a CSV file into a [GeoTable] with a Point geometry column.
///
/// The schema is inferred from the file contents. The coordinate columns are consumed
/// into the geometry and do not appear as attribute columns; rows where either
/// coordinate is null become null geometries.
pub fn read_csv<R: Read + Seek>(mut reader: R, options: &CsvReaderOptions) -> Result<GeoTable> {
    let format = Format::default().with_header(options.has_header);
    let (schema, _) = format.infer_schema(&mut reader, None)?;
    reader.rewind()?;

    let schema: SchemaRef = Arc::new(schema);
    let csv_reader = ReaderBuilder::new(schema.clone())
        .with_format(format)
        .with_batch_size(options.batch_size)
        .build(reader)?;
    let batches = csv_reader.collect::<std::result::Result<Vec<_>, _>>()?;
    let batch = concat_batches(&schema, &batches)?;

    let longitude_index = schema.index_of(&options.longitude_column)?;
    let latitude_index = schema.index_of(&options.latitude_column)?;

    let longitude = cast(batch.column(longitude_index), &DataType::Float64)?;
    let latitude = cast(batch.column(latitude_index), &DataType::Float64)?;
    let longitude = longitude.as_primitive::<Float64Type>();
    let latitude = latitude.as_primitive::<Float64Type>();

    let mut builder = PointBuilder::with_capacity(batch.num_rows());
    for row in 0..batch.num_rows() {
        if longitude.is_null(row) || latitude.is_null(row) {
            builder.push_null();
        } else {
            builder.push_xy(longitude.value(row), latitude.value(row));
        }
    }
    let geometry = GeometryArrayBuilder::finish(builder);

    let mut fields: Vec<FieldRef> = Vec::new();
    let mut columns: Vec<ArrayRef> = Vec::new();
    for (index, field) in schema.fields().iter().enumerate() {
        if index == longitude_index || index == latitude_index {
            continue;
        }
        fields.push(field.clone());
        columns.push(batch.column(index).clone());
    }

    GeoTable::from_arrow_and_geometry(fields, columns, geometry)
}

#[cfg(test)]
mod test {
    use std::io::Cursor;

    use super::*;
    use crate::array::PointArray;
    use crate::datatypes::GeoDataType;

    const CITIES: &str = "\
name,longitude,latitude
aalborg,9.92,57.05
copenhagen,12.57,55.69
";

    #[test]
    fn reads_points_from_coordinate_columns() {
        let table = read_csv(Cursor::new(CITIES), &Default::default()).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.geometry_data_type().unwrap(), GeoDataType::Point);

        let geometry = table.geometry(0).unwrap();
        let points = geometry.as_any().downcast_ref::<PointArray>().unwrap();
        assert_eq!(points.value_as_geo(0), geo::Point::new(9.92, 57.05));
    }

    #[test]
    fn coordinate_columns_are_consumed() {
        let table = read_csv(Cursor::new(CITIES), &Default::default()).unwrap();
        let schema = table.schema();
        assert!(schema.field_with_name("longitude").is_err());
        assert!(schema.field_with_name("name").is_ok());
    }

    #[test]
    fn custom_column_names() {
        let csv = "city,x,y\noslo,10.75,59.91\n";
        let options = CsvReaderOptions {
            longitude_column: "x".to_string(),
            latitude_column: "y".to_string(),
            ..Default::default()
        };
        let table = read_csv(Cursor::new(csv), &options).unwrap();
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn missing_coordinate_column_rejected() {
        let csv = "name,value\na,1\n";
        assert!(read_csv(Cursor::new(csv), &Default::default()).is_err());
    }
}
