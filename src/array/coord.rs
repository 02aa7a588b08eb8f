//! Interleaved xy coordinate buffers, the innermost level of every geometry encoding.

use std::sync::Arc;

use arrow_array::{Array, FixedSizeListArray, Float64Array};
use arrow_buffer::ScalarBuffer;
use arrow_schema::DataType;

use crate::datatypes::{coord_data_type, coord_field};
use crate::error::{GeoFeatherError, Result};
use crate::trait_::IntoArrow;

/// An array of xy coordinates stored interleaved in a single `Float64` buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct CoordBuffer {
    pub(crate) coords: ScalarBuffer<f64>,
}

fn check(coords: &ScalarBuffer<f64>) -> Result<()> {
    if coords.len() % 2 != 0 {
        return Err(GeoFeatherError::General(
            "interleaved coordinate buffer must have an even number of values".to_string(),
        ));
    }

    Ok(())
}

impl CoordBuffer {
    /// Construct a new CoordBuffer.
    ///
    /// # Panics
    ///
    /// - if the buffer does not hold a whole number of xy pairs
    pub fn new(coords: ScalarBuffer<f64>) -> Self {
        Self::try_new(coords).unwrap()
    }

    /// Construct a new CoordBuffer.
    ///
    /// # Errors
    ///
    /// - if the buffer does not hold a whole number of xy pairs
    pub fn try_new(coords: ScalarBuffer<f64>) -> Result<Self> {
        check(&coords)?;
        Ok(Self { coords })
    }

    pub fn values_array(&self) -> Float64Array {
        Float64Array::new(self.coords.clone(), None)
    }

    /// The physical Arrow type of this buffer.
    pub fn storage_type(&self) -> DataType {
        coord_data_type()
    }

    /// The flat, interleaved coordinate values.
    pub fn values(&self) -> &[f64] {
        &self.coords
    }

    /// The number of coordinate pairs.
    pub fn len(&self) -> usize {
        self.coords.len() / 2
    }

    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }

    pub fn get_x(&self, i: usize) -> f64 {
        self.coords[i * 2]
    }

    pub fn get_y(&self, i: usize) -> f64 {
        self.coords[i * 2 + 1]
    }

    pub fn value_as_geo(&self, i: usize) -> geo::Coord {
        geo::coord! { x: self.get_x(i), y: self.get_y(i) }
    }

    /// Returns a zero-copy slice of this buffer by coordinate offset and length.
    pub fn slice(&self, offset: usize, length: usize) -> Self {
        assert!(
            offset + length <= self.len(),
            "offset + length may not exceed length of array"
        );
        Self {
            coords: self.coords.slice(offset * 2, length * 2),
        }
    }
}

impl IntoArrow for CoordBuffer {
    type ArrowArray = FixedSizeListArray;

    fn into_arrow(self) -> Self::ArrowArray {
        FixedSizeListArray::new(coord_field(), 2, Arc::new(self.values_array()), None)
    }
}

impl TryFrom<&FixedSizeListArray> for CoordBuffer {
    type Error = GeoFeatherError;

    fn try_from(value: &FixedSizeListArray) -> Result<Self> {
        if value.value_length() != 2 {
            return Err(GeoFeatherError::General(
                "expected a FixedSizeListArray of size 2".to_string(),
            ));
        }

        let coords = value
            .values()
            .as_any()
            .downcast_ref::<Float64Array>()
            .ok_or(GeoFeatherError::General(
                "expected Float64 coordinate values".to_string(),
            ))?;

        Self::try_new(coords.values().clone())
    }
}

impl TryFrom<Vec<f64>> for CoordBuffer {
    type Error = GeoFeatherError;

    fn try_from(value: Vec<f64>) -> Result<Self> {
        Self::try_new(value.into())
    }
}

/// A mutable, growable [CoordBuffer].
#[derive(Debug, Clone, Default)]
pub struct CoordBufferBuilder {
    coords: Vec<f64>,
}

impl CoordBufferBuilder {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Create with capacity for `capacity` coordinate pairs.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            coords: Vec::with_capacity(capacity * 2),
        }
    }

    pub fn reserve(&mut self, additional: usize) {
        self.coords.reserve(additional * 2);
    }

    pub fn reserve_exact(&mut self, additional: usize) {
        self.coords.reserve_exact(additional * 2);
    }

    /// The number of coordinate pairs pushed so far.
    pub fn len(&self) -> usize {
        self.coords.len() / 2
    }

    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }

    #[inline]
    pub fn push_xy(&mut self, x: f64, y: f64) {
        self.coords.push(x);
        self.coords.push(y);
    }

    #[inline]
    pub fn push_coord(&mut self, coord: &geo::Coord) {
        self.push_xy(coord.x, coord.y);
    }

    #[inline]
    pub fn push_point(&mut self, point: &geo::Point) {
        self.push_coord(&point.0);
    }

    pub fn finish(self) -> CoordBuffer {
        self.into()
    }
}

impl From<CoordBufferBuilder> for CoordBuffer {
    fn from(value: CoordBufferBuilder) -> Self {
        // An even number of values is guaranteed because coordinates are pushed in pairs.
        CoordBuffer {
            coords: value.coords.into(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn value_access() {
        let buf = CoordBuffer::new(vec![0., 3., 1., 4., 2., 5.].into());
        assert_eq!(buf.len(), 3);
        assert_eq!(buf.get_x(1), 1.);
        assert_eq!(buf.get_y(1), 4.);
        assert_eq!(buf.value_as_geo(2), geo::coord! { x: 2., y: 5. });
    }

    #[test]
    fn odd_length_rejected() {
        assert!(CoordBuffer::try_new(vec![0., 1., 2.].into()).is_err());
    }

    #[test]
    fn test_eq_slicing() {
        let buf1 = CoordBuffer::new(vec![0., 3., 1., 4., 2., 5.].into()).slice(1, 1);
        let buf2 = CoordBuffer::new(vec![1., 4.].into());
        assert_eq!(buf1, buf2);
    }

    #[test]
    fn arrow_round_trip() {
        let mut builder = CoordBufferBuilder::with_capacity(2);
        builder.push_xy(0., 0.);
        builder.push_xy(1., 2.);
        let buf = builder.finish();

        let arrow_array = buf.clone().into_arrow();
        let back = CoordBuffer::try_from(&arrow_array).unwrap();
        assert_eq!(buf, back);
    }
}
