//! An Arrow table with an attached geometry column.

use std::sync::Arc;

use arrow_array::{ArrayRef, RecordBatch};
use arrow_schema::{FieldRef, Fields, Schema, SchemaBuilder, SchemaRef};

use crate::array::from_arrow_array;
use crate::datatypes::GeoDataType;
use crate::error::{GeoFeatherError, Result};
use crate::GeometryArrayTrait;

/// A collection of Arrow record batches, one column of which is a GeoArrow geometry
/// array tagged with its extension name.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoTable {
    schema: SchemaRef,
    batches: Vec<RecordBatch>,
    geometry_column_index: usize,
}

impl GeoTable {
    /// Create a new table from parts.
    ///
    /// # Errors
    ///
    /// - if any batch's schema differs from `schema`
    /// - if `geometry_column_index` is out of bounds for `schema`
    pub fn try_new(
        schema: SchemaRef,
        batches: Vec<RecordBatch>,
        geometry_column_index: usize,
    ) -> Result<Self> {
        if geometry_column_index >= schema.fields().len() {
            return Err(GeoFeatherError::General(format!(
                "geometry column index {} out of bounds for schema with {} fields",
                geometry_column_index,
                schema.fields().len()
            )));
        }
        for batch in &batches {
            if batch.schema() != schema {
                return Err(GeoFeatherError::General(
                    "all batches must share the table schema".to_string(),
                ));
            }
        }
        Ok(Self {
            schema,
            batches,
            geometry_column_index,
        })
    }

    /// Create a single-batch table from attribute columns plus one geometry array.
    ///
    /// The geometry becomes the last column, tagged with its GeoArrow extension field.
    ///
    /// # Errors
    ///
    /// - if any attribute column's length differs from the geometry's
    pub fn from_arrow_and_geometry(
        fields: Vec<FieldRef>,
        columns: Vec<ArrayRef>,
        geometry: Arc<dyn GeometryArrayTrait>,
    ) -> Result<Self> {
        let num_rows = geometry.len();
        for (field, column) in fields.iter().zip(columns.iter()) {
            if column.len() != num_rows {
                return Err(GeoFeatherError::General(format!(
                    "column '{}' has {} rows but the geometry column has {}",
                    field.name(),
                    column.len(),
                    num_rows
                )));
            }
        }

        let mut builder = SchemaBuilder::from(Fields::from(fields));
        builder.push(geometry.extension_field());
        let schema: SchemaRef = Arc::new(builder.finish());

        let mut batch_columns = columns;
        batch_columns.push(geometry.to_array_ref());
        let batch = RecordBatch::try_new(schema.clone(), batch_columns)?;

        let geometry_column_index = schema.fields().len() - 1;
        Self::try_new(schema, vec![batch], geometry_column_index)
    }

    /// Create a single-batch table holding only a geometry column.
    pub fn from_geometry(geometry: Arc<dyn GeometryArrayTrait>) -> Result<Self> {
        Self::from_arrow_and_geometry(vec![], vec![], geometry)
    }

    /// Append a column to the end of this table.
    ///
    /// `columns` holds one array per existing batch, in batch order.
    ///
    /// # Errors
    ///
    /// - if `columns` does not have one entry per batch
    /// - if any array's length differs from its batch's row count
    pub fn append_column(&mut self, field: FieldRef, columns: Vec<ArrayRef>) -> Result<()> {
        if columns.len() != self.batches.len() {
            return Err(GeoFeatherError::General(format!(
                "expected {} arrays (one per batch), got {}",
                self.batches.len(),
                columns.len()
            )));
        }

        let mut builder = SchemaBuilder::from(self.schema.fields());
        builder.push(field);
        let new_schema: SchemaRef = Arc::new(builder.finish());

        let mut new_batches = Vec::with_capacity(self.batches.len());
        for (batch, column) in self.batches.iter().zip(columns) {
            if column.len() != batch.num_rows() {
                return Err(GeoFeatherError::General(format!(
                    "appended column has {} rows but the batch has {}",
                    column.len(),
                    batch.num_rows()
                )));
            }
            let mut batch_columns = batch.columns().to_vec();
            batch_columns.push(column);
            new_batches.push(RecordBatch::try_new(new_schema.clone(), batch_columns)?);
        }

        self.schema = new_schema;
        self.batches = new_batches;
        Ok(())
    }

    pub fn schema(&self) -> &SchemaRef {
        &self.schema
    }

    pub fn batches(&self) -> &Vec<RecordBatch> {
        &self.batches
    }

    /// The total number of rows across all batches.
    pub fn len(&self) -> usize {
        self.batches.iter().fold(0, |sum, batch| sum + batch.num_rows())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn geometry_column_index(&self) -> usize {
        self.geometry_column_index
    }

    /// The geometry family of the geometry column.
    pub fn geometry_data_type(&self) -> Result<GeoDataType> {
        let field = self.schema.field(self.geometry_column_index);
        let extension_name = field
            .metadata()
            .get("ARROW:extension:name")
            .ok_or(GeoFeatherError::General(
                "geometry column is missing an ARROW:extension:name".to_string(),
            ))?;
        GeoDataType::try_from(extension_name.as_str())
    }

    /// The geometry column of batch `batch_index` as a typed geometry array.
    pub fn geometry(&self, batch_index: usize) -> Result<Arc<dyn GeometryArrayTrait>> {
        let field = self.schema.field(self.geometry_column_index);
        let array = self.batches[batch_index].column(self.geometry_column_index);
        from_arrow_array(array.as_ref(), field)
    }

    pub fn into_inner(self) -> (SchemaRef, Vec<RecordBatch>, usize) {
        (self.schema, self.batches, self.geometry_column_index)
    }
}

impl From<GeoTable> for (Schema, Vec<RecordBatch>) {
    fn from(value: GeoTable) -> Self {
        ((*value.schema).clone(), value.batches)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use arrow_array::{Float64Array, StringArray};
    use arrow_schema::{DataType, Field};

    use crate::array::PointArray;
    use crate::test::point::{p0, p1, p2};
    use crate::test::properties;

    fn test_table() -> GeoTable {
        let geometry: PointArray = vec![p0(), p1(), p2()].into();
        let fields: Vec<FieldRef> = vec![
            Field::new("u8", DataType::UInt8, true).into(),
            Field::new("string", DataType::Utf8, true).into(),
        ];
        let columns: Vec<ArrayRef> = vec![
            Arc::new(properties::u8_array()),
            Arc::new(properties::string_array()),
        ];
        GeoTable::from_arrow_and_geometry(fields, columns, Arc::new(geometry)).unwrap()
    }

    #[test]
    fn row_count_preserved() {
        let table = test_table();
        assert_eq!(table.len(), 3);
        assert_eq!(table.geometry_data_type().unwrap(), GeoDataType::Point);
    }

    #[test]
    fn mismatched_column_length_rejected() {
        let geometry: PointArray = vec![p0(), p1(), p2()].into();
        let names: ArrayRef = Arc::new(StringArray::from(vec!["a", "b"]));
        assert!(GeoTable::from_arrow_and_geometry(
            vec![Field::new("name", DataType::Utf8, true).into()],
            vec![names],
            Arc::new(geometry)
        )
        .is_err());
    }

    #[test]
    fn append_column() {
        let mut table = test_table();
        let values: ArrayRef = Arc::new(Float64Array::from(vec![1.0, 2.0, 3.0]));
        table
            .append_column(
                Field::new("value", DataType::Float64, true).into(),
                vec![values],
            )
            .unwrap();
        assert_eq!(table.schema().fields().len(), 4);
        assert_eq!(table.len(), 3);
        // The geometry column index is unchanged by an append.
        assert_eq!(table.geometry_data_type().unwrap(), GeoDataType::Point);
    }

    #[test]
    fn append_column_length_mismatch_rejected() {
        let mut table = test_table();
        let values: ArrayRef = Arc::new(Float64Array::from(vec![1.0]));
        assert!(table
            .append_column(
                Field::new("value", DataType::Float64, true).into(),
                vec![values]
            )
            .is_err());
    }

    #[test]
    fn geometry_round_trip() {
        let table = test_table();
        let geometry = table.geometry(0).unwrap();
        let points = geometry.as_any().downcast_ref::<PointArray>().unwrap();
        assert_eq!(points.value_as_geo(0), p0());
        assert_eq!(points.value_as_geo(2), p2());
    }
}
