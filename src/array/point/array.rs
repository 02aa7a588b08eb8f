use std::sync::Arc;

use arrow_array::{Array, ArrayRef, FixedSizeListArray};
use arrow_buffer::NullBuffer;
use arrow_schema::{DataType, Field};

use crate::array::metadata::ArrayMetadata;
use crate::array::{CoordBuffer, PointBuilder};
use crate::datatypes::GeoDataType;
use crate::error::{GeoFeatherError, Result};
use crate::trait_::{GeometryArrayTrait, IntoArrow};

/// An immutable array of Point geometries using GeoArrow's in-memory representation.
///
/// This is semantically equivalent to `Vec<Option<Point>>` due to the internal validity
/// bitmap.
#[derive(Debug, Clone, PartialEq)]
pub struct PointArray {
    pub(crate) metadata: Arc<ArrayMetadata>,
    pub(crate) coords: CoordBuffer,
    pub(crate) validity: Option<NullBuffer>,
}

pub(super) fn check(coords: &CoordBuffer, validity_len: Option<usize>) -> Result<()> {
    if validity_len.map_or(false, |len| len != coords.len()) {
        return Err(GeoFeatherError::General(
            "validity mask length must match the number of values".to_string(),
        ));
    }

    Ok(())
}

impl PointArray {
    /// Create a new PointArray from parts.
    ///
    /// # Implementation
    ///
    /// This function is `O(1)`.
    ///
    /// # Panics
    ///
    /// - if the validity is not `None` and its length is different from the number of
    ///   geometries
    pub fn new(
        coords: CoordBuffer,
        validity: Option<NullBuffer>,
        metadata: Arc<ArrayMetadata>,
    ) -> Self {
        Self::try_new(coords, validity, metadata).unwrap()
    }

    /// Create a new PointArray from parts.
    ///
    /// # Implementation
    ///
    /// This function is `O(1)`.
    ///
    /// # Errors
    ///
    /// - if the validity is not `None` and its length is different from the number of
    ///   geometries
    pub fn try_new(
        coords: CoordBuffer,
        validity: Option<NullBuffer>,
        metadata: Arc<ArrayMetadata>,
    ) -> Result<Self> {
        check(&coords, validity.as_ref().map(|v| v.len()))?;
        Ok(Self {
            metadata,
            coords,
            validity,
        })
    }

    pub fn coords(&self) -> &CoordBuffer {
        &self.coords
    }

    /// Access the value at slot `i` as a [`geo`] scalar, not considering validity.
    pub fn value_as_geo(&self, i: usize) -> geo::Point {
        geo::Point(self.coords.value_as_geo(i))
    }

    /// Access the value at slot `i` as a [`geo`] scalar, considering validity.
    pub fn get_as_geo(&self, i: usize) -> Option<geo::Point> {
        if self.is_null(i) {
            return None;
        }

        Some(self.value_as_geo(i))
    }

    /// Iterator over [`geo`] scalars, not considering validity.
    pub fn iter_geo_values(&self) -> impl ExactSizeIterator<Item = geo::Point> + '_ {
        (0..self.len()).map(|i| self.value_as_geo(i))
    }

    /// Iterator over [`geo`] scalars, considering validity.
    pub fn iter_geo(&self) -> impl ExactSizeIterator<Item = Option<geo::Point>> + '_ {
        (0..self.len()).map(|i| self.get_as_geo(i))
    }

    /// Slices this [`PointArray`] in place. `O(1)`.
    ///
    /// # Panics
    ///
    /// This function panics iff `offset + length > self.len()`.
    pub fn slice(&self, offset: usize, length: usize) -> Self {
        assert!(
            offset + length <= self.len(),
            "offset + length may not exceed length of array"
        );
        Self {
            metadata: self.metadata.clone(),
            coords: self.coords.slice(offset, length),
            validity: self.validity.as_ref().map(|v| v.slice(offset, length)),
        }
    }
}

impl GeometryArrayTrait for PointArray {
    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn data_type(&self) -> GeoDataType {
        GeoDataType::Point
    }

    fn metadata(&self) -> Arc<ArrayMetadata> {
        self.metadata.clone()
    }

    fn to_array_ref(&self) -> ArrayRef {
        Arc::new(self.clone().into_arrow())
    }

    #[inline]
    fn len(&self) -> usize {
        self.coords.len()
    }

    #[inline]
    fn nulls(&self) -> Option<&NullBuffer> {
        self.validity.as_ref()
    }
}

impl IntoArrow for PointArray {
    type ArrowArray = FixedSizeListArray;

    fn into_arrow(self) -> Self::ArrowArray {
        let validity = self.validity;
        let coord_array = self.coords.into_arrow();
        let (field, size, values, _) = coord_array.into_parts();
        FixedSizeListArray::new(field, size, values, validity)
    }
}

impl TryFrom<&FixedSizeListArray> for PointArray {
    type Error = GeoFeatherError;

    fn try_from(value: &FixedSizeListArray) -> Result<Self> {
        let coords: CoordBuffer = value.try_into()?;
        Self::try_new(coords, value.nulls().cloned(), Default::default())
    }
}

impl TryFrom<&dyn Array> for PointArray {
    type Error = GeoFeatherError;

    fn try_from(value: &dyn Array) -> Result<Self> {
        match value.data_type() {
            DataType::FixedSizeList(_, _) => {
                let arr = value.as_any().downcast_ref::<FixedSizeListArray>().unwrap();
                arr.try_into()
            }
            dt => Err(GeoFeatherError::General(format!(
                "Unexpected data type for PointArray: {dt:?}"
            ))),
        }
    }
}

impl TryFrom<(&dyn Array, &Field)> for PointArray {
    type Error = GeoFeatherError;

    fn try_from((arr, field): (&dyn Array, &Field)) -> Result<Self> {
        let mut arr: Self = arr.try_into()?;
        arr.metadata = Arc::new(ArrayMetadata::try_from(field)?);
        Ok(arr)
    }
}

impl From<Vec<geo::Point>> for PointArray {
    fn from(other: Vec<geo::Point>) -> Self {
        let builder: PointBuilder = other.as_slice().into();
        builder.into()
    }
}

impl From<&[geo::Point]> for PointArray {
    fn from(other: &[geo::Point]) -> Self {
        let builder: PointBuilder = other.into();
        builder.into()
    }
}

impl From<Vec<Option<geo::Point>>> for PointArray {
    fn from(other: Vec<Option<geo::Point>>) -> Self {
        let builder: PointBuilder = other.into();
        builder.into()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::test::point::{p0, p1, p2};

    #[test]
    fn geo_round_trip() {
        let arr: PointArray = vec![p0(), p1(), p2()].into();
        assert_eq!(arr.len(), 3);
        assert_eq!(arr.value_as_geo(0), p0());
        assert_eq!(arr.value_as_geo(1), p1());
        assert_eq!(arr.value_as_geo(2), p2());
    }

    #[test]
    fn geo_round_trip_option_vec() {
        let arr: PointArray = vec![Some(p0()), None, Some(p2())].into();
        assert_eq!(arr.get_as_geo(0), Some(p0()));
        assert_eq!(arr.get_as_geo(1), None);
        assert_eq!(arr.get_as_geo(2), Some(p2()));
    }

    #[test]
    fn flat_coordinate_buffer() {
        // Three points (0, 0), (1, 1), (2, 2) must flatten to [0, 0, 1, 1, 2, 2].
        let points = vec![
            geo::Point::new(0., 0.),
            geo::Point::new(1., 1.),
            geo::Point::new(2., 2.),
        ];
        let arr: PointArray = points.into();
        assert_eq!(arr.len(), 3);
        assert_eq!(arr.coords().values(), &[0., 0., 1., 1., 2., 2.]);
    }

    #[test]
    fn arrow_round_trip() {
        let arr: PointArray = vec![p0(), p1(), p2()].into();
        let arrow_arr = arr.clone().into_arrow();
        let back: PointArray = (&arrow_arr).try_into().unwrap();
        assert_eq!(arr, back);
    }

    #[test]
    fn slice() {
        let arr: PointArray = vec![p0(), p1(), p2()].into();
        let sliced = arr.slice(1, 1);
        assert_eq!(sliced.len(), 1);
        assert_eq!(sliced.get_as_geo(0), Some(p1()));
    }

    #[test]
    fn extension_field() {
        let arr: PointArray = vec![p0()].into();
        let field = arr.extension_field();
        assert_eq!(
            field.metadata().get("ARROW:extension:name").unwrap(),
            "geoarrow.point"
        );
        // Empty metadata must not be serialized.
        assert!(!field.metadata().contains_key("ARROW:extension:metadata"));
    }
}
