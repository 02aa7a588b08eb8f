use std::any::Any;
use std::sync::Arc;

use arrow_array::{Array, ArrayRef};
use arrow_buffer::NullBuffer;
use arrow_schema::{DataType, Field};

use crate::array::metadata::ArrayMetadata;
use crate::datatypes::GeoDataType;

/// A geometry array of a single family, backed by GeoArrow's in-memory representation.
pub trait GeometryArrayTrait: std::fmt::Debug + Send + Sync {
    /// Returns the array as [`Any`] so that it can be downcasted to a specific
    /// implementation.
    fn as_any(&self) -> &dyn Any;

    /// The geometry family of this array.
    fn data_type(&self) -> GeoDataType;

    /// The physical Arrow type of this array, without extension metadata.
    fn storage_type(&self) -> DataType {
        self.data_type().to_data_type()
    }

    /// An Arrow [Field] describing this array, tagged with the GeoArrow extension name.
    fn extension_field(&self) -> Arc<Field> {
        self.data_type()
            .to_field_with_metadata("geometry", true, &self.metadata())
            .into()
    }

    /// The `ARROW:extension:name` of this array.
    fn extension_name(&self) -> &'static str {
        self.data_type().extension_name()
    }

    /// The GeoArrow metadata attached to this array.
    fn metadata(&self) -> Arc<ArrayMetadata>;

    /// Convert into a generic Arrow array.
    fn to_array_ref(&self) -> ArrayRef;

    /// The number of geometries in this array.
    fn len(&self) -> usize;

    /// Whether this array is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The optional validity bitmap.
    fn nulls(&self) -> Option<&NullBuffer>;

    /// Whether slot `i` is null.
    fn is_null(&self, i: usize) -> bool {
        self.nulls().map(|n| n.is_null(i)).unwrap_or(false)
    }

    /// The number of null slots.
    fn null_count(&self) -> usize {
        self.nulls().map(|n| n.null_count()).unwrap_or(0)
    }
}

/// Convert a geometry array or builder to a concrete Arrow array type.
pub trait IntoArrow {
    type ArrowArray: Array;

    fn into_arrow(self) -> Self::ArrowArray;
}

/// A mutable geometry array of a single family.
pub trait GeometryArrayBuilder: std::fmt::Debug {
    /// The number of geometries pushed so far.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Consume the builder, returning an immutable geometry array. `O(1)`.
    fn finish(self) -> Arc<dyn GeometryArrayTrait>;

    /// Consume the builder, returning a generic Arrow array. `O(1)`.
    fn into_array_ref(self) -> ArrayRef;

    fn metadata(&self) -> Arc<ArrayMetadata>;

    fn set_metadata(&mut self, metadata: Arc<ArrayMetadata>);
}
