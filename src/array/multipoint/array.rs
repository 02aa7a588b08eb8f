use std::sync::Arc;

use arrow_array::{Array, ArrayRef, FixedSizeListArray, GenericListArray, ListArray};
use arrow_buffer::{NullBuffer, OffsetBuffer};
use arrow_schema::{DataType, Field};

use crate::array::metadata::ArrayMetadata;
use crate::array::util::OffsetBufferUtils;
use crate::array::{CoordBuffer, MultiPointBuilder};
use crate::datatypes::GeoDataType;
use crate::error::{GeoFeatherError, Result};
use crate::trait_::{GeometryArrayTrait, IntoArrow};

/// An immutable array of MultiPoint geometries using GeoArrow's in-memory
/// representation.
///
/// This is semantically equivalent to `Vec<Option<MultiPoint>>` due to the internal
/// validity bitmap.
#[derive(Debug, Clone, PartialEq)]
pub struct MultiPointArray {
    pub(crate) metadata: Arc<ArrayMetadata>,

    pub(crate) coords: CoordBuffer,

    /// Offsets into the coordinate array where each geometry starts
    pub(crate) geom_offsets: OffsetBuffer<i32>,

    /// Validity bitmap
    pub(crate) validity: Option<NullBuffer>,
}

impl MultiPointArray {
    /// Create a new MultiPointArray from parts.
    ///
    /// # Implementation
    ///
    /// This function is `O(1)`.
    ///
    /// # Panics
    ///
    /// - if the validity is not `None` and its length is different from the number of
    ///   geometries
    /// - if the largest geometry offset does not match the number of coordinates
    pub fn new(
        coords: CoordBuffer,
        geom_offsets: OffsetBuffer<i32>,
        validity: Option<NullBuffer>,
        metadata: Arc<ArrayMetadata>,
    ) -> Self {
        Self::try_new(coords, geom_offsets, validity, metadata).unwrap()
    }

    /// Create a new MultiPointArray from parts.
    ///
    /// # Implementation
    ///
    /// This function is `O(1)`.
    ///
    /// # Errors
    ///
    /// - if the validity is not `None` and its length is different from the number of
    ///   geometries
    /// - if the largest geometry offset does not match the number of coordinates
    pub fn try_new(
        coords: CoordBuffer,
        geom_offsets: OffsetBuffer<i32>,
        validity: Option<NullBuffer>,
        metadata: Arc<ArrayMetadata>,
    ) -> Result<Self> {
        // MultiPoint shares its layout with LineString, so the same invariants apply.
        crate::array::linestring::array_check(
            &coords,
            &geom_offsets,
            validity.as_ref().map(|v| v.len()),
        )?;
        Ok(Self {
            metadata,
            coords,
            geom_offsets,
            validity,
        })
    }

    fn points_field(&self) -> Arc<Field> {
        Field::new("points", self.coords.storage_type(), false).into()
    }

    pub fn coords(&self) -> &CoordBuffer {
        &self.coords
    }

    pub fn geom_offsets(&self) -> &OffsetBuffer<i32> {
        &self.geom_offsets
    }

    /// Access the value at slot `i` as a [`geo`] scalar, not considering validity.
    pub fn value_as_geo(&self, i: usize) -> geo::MultiPoint {
        let (start, end) = self.geom_offsets.start_end(i);
        let points = (start..end)
            .map(|c| geo::Point(self.coords.value_as_geo(c)))
            .collect::<Vec<_>>();
        geo::MultiPoint::new(points)
    }

    /// Access the value at slot `i` as a [`geo`] scalar, considering validity.
    pub fn get_as_geo(&self, i: usize) -> Option<geo::MultiPoint> {
        if self.is_null(i) {
            return None;
        }

        Some(self.value_as_geo(i))
    }

    /// Iterator over [`geo`] scalars, not considering validity.
    pub fn iter_geo_values(&self) -> impl ExactSizeIterator<Item = geo::MultiPoint> + '_ {
        (0..self.len()).map(|i| self.value_as_geo(i))
    }

    /// Iterator over [`geo`] scalars, considering validity.
    pub fn iter_geo(&self) -> impl ExactSizeIterator<Item = Option<geo::MultiPoint>> + '_ {
        (0..self.len()).map(|i| self.get_as_geo(i))
    }

    /// Slices this [`MultiPointArray`] in place. `O(1)`.
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
            coords: self.coords.clone(),
            geom_offsets: self.geom_offsets.slice(offset, length),
            validity: self.validity.as_ref().map(|v| v.slice(offset, length)),
        }
    }
}

impl GeometryArrayTrait for MultiPointArray {
    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn data_type(&self) -> GeoDataType {
        GeoDataType::MultiPoint
    }

    fn metadata(&self) -> Arc<ArrayMetadata> {
        self.metadata.clone()
    }

    fn to_array_ref(&self) -> ArrayRef {
        Arc::new(self.clone().into_arrow())
    }

    #[inline]
    fn len(&self) -> usize {
        self.geom_offsets.len_proxy()
    }

    #[inline]
    fn nulls(&self) -> Option<&NullBuffer> {
        self.validity.as_ref()
    }
}

impl IntoArrow for MultiPointArray {
    type ArrowArray = GenericListArray<i32>;

    fn into_arrow(self) -> Self::ArrowArray {
        let points_field = self.points_field();
        let validity = self.validity;
        let coord_array = Arc::new(self.coords.into_arrow());
        GenericListArray::new(points_field, self.geom_offsets, coord_array, validity)
    }
}

impl TryFrom<&GenericListArray<i32>> for MultiPointArray {
    type Error = GeoFeatherError;

    fn try_from(value: &GenericListArray<i32>) -> Result<Self> {
        let coords: CoordBuffer = value
            .values()
            .as_any()
            .downcast_ref::<FixedSizeListArray>()
            .ok_or(GeoFeatherError::General(
                "expected FixedSizeList points".to_string(),
            ))?
            .try_into()?;

        Self::try_new(
            coords,
            value.offsets().clone(),
            value.nulls().cloned(),
            Default::default(),
        )
    }
}

impl TryFrom<&dyn Array> for MultiPointArray {
    type Error = GeoFeatherError;

    fn try_from(value: &dyn Array) -> Result<Self> {
        match value.data_type() {
            DataType::List(_) => {
                let downcasted = value.as_any().downcast_ref::<ListArray>().unwrap();
                downcasted.try_into()
            }
            dt => Err(GeoFeatherError::General(format!(
                "Unexpected data type for MultiPointArray: {dt:?}"
            ))),
        }
    }
}

impl TryFrom<(&dyn Array, &Field)> for MultiPointArray {
    type Error = GeoFeatherError;

    fn try_from((arr, field): (&dyn Array, &Field)) -> Result<Self> {
        let mut arr: Self = arr.try_into()?;
        arr.metadata = Arc::new(ArrayMetadata::try_from(field)?);
        Ok(arr)
    }
}

impl From<&[geo::MultiPoint]> for MultiPointArray {
    fn from(other: &[geo::MultiPoint]) -> Self {
        let builder: MultiPointBuilder = other.into();
        builder.into()
    }
}

impl From<Vec<geo::MultiPoint>> for MultiPointArray {
    fn from(other: Vec<geo::MultiPoint>) -> Self {
        other.as_slice().into()
    }
}

impl From<Vec<Option<geo::MultiPoint>>> for MultiPointArray {
    fn from(other: Vec<Option<geo::MultiPoint>>) -> Self {
        let builder: MultiPointBuilder = other.into();
        builder.into()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::test::multipoint::{mp0, mp1};

    #[test]
    fn geo_round_trip() {
        let arr: MultiPointArray = vec![mp0(), mp1()].into();
        assert_eq!(arr.value_as_geo(0), mp0());
        assert_eq!(arr.value_as_geo(1), mp1());
    }

    #[test]
    fn geo_round_trip_option_vec() {
        let arr: MultiPointArray = vec![Some(mp0()), None].into();
        assert_eq!(arr.get_as_geo(0), Some(mp0()));
        assert_eq!(arr.get_as_geo(1), None);
    }

    #[test]
    fn arrow_round_trip() {
        let arr: MultiPointArray = vec![mp0(), mp1()].into();
        let arrow_arr = arr.clone().into_arrow();
        let back: MultiPointArray = (&arrow_arr).try_into().unwrap();
        assert_eq!(arr, back);
    }

    #[test]
    fn row_count_preserved() {
        let arr: MultiPointArray = vec![mp0(), mp1()].into();
        assert_eq!(arr.len(), 2);
        assert_eq!(arr.geom_offsets().len(), 3);
    }
}
