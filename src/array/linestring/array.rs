use std::sync::Arc;

use arrow_array::{Array, ArrayRef, FixedSizeListArray, GenericListArray, ListArray};
use arrow_buffer::{NullBuffer, OffsetBuffer};
use arrow_schema::{DataType, Field};

use crate::array::metadata::ArrayMetadata;
use crate::array::util::OffsetBufferUtils;
use crate::array::{CoordBuffer, LineStringBuilder};
use crate::datatypes::GeoDataType;
use crate::error::{GeoFeatherError, Result};
use crate::trait_::{GeometryArrayTrait, IntoArrow};

/// An immutable array of LineString geometries using GeoArrow's in-memory
/// representation.
///
/// This is semantically equivalent to `Vec<Option<LineString>>` due to the internal
/// validity bitmap.
#[derive(Debug, Clone, PartialEq)]
pub struct LineStringArray {
    pub(crate) metadata: Arc<ArrayMetadata>,

    pub(crate) coords: CoordBuffer,

    /// Offsets into the coordinate array where each geometry starts
    pub(crate) geom_offsets: OffsetBuffer<i32>,

    /// Validity bitmap
    pub(crate) validity: Option<NullBuffer>,
}

pub(crate) fn check(
    coords: &CoordBuffer,
    geom_offsets: &OffsetBuffer<i32>,
    validity_len: Option<usize>,
) -> Result<()> {
    if validity_len.map_or(false, |len| len != geom_offsets.len_proxy()) {
        return Err(GeoFeatherError::General(
            "validity mask length must match the number of values".to_string(),
        ));
    }

    if geom_offsets.last_offset() != coords.len() {
        return Err(GeoFeatherError::General(
            "largest geometry offset must match coords length".to_string(),
        ));
    }

    Ok(())
}

impl LineStringArray {
    /// Create a new LineStringArray from parts.
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

    /// Create a new LineStringArray from parts.
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
        check(&coords, &geom_offsets, validity.as_ref().map(|v| v.len()))?;
        Ok(Self {
            metadata,
            coords,
            geom_offsets,
            validity,
        })
    }

    fn vertices_field(&self) -> Arc<Field> {
        Field::new("vertices", self.coords.storage_type(), false).into()
    }

    pub fn coords(&self) -> &CoordBuffer {
        &self.coords
    }

    pub fn geom_offsets(&self) -> &OffsetBuffer<i32> {
        &self.geom_offsets
    }

    /// Access the value at slot `i` as a [`geo`] scalar, not considering validity.
    pub fn value_as_geo(&self, i: usize) -> geo::LineString {
        let (start, end) = self.geom_offsets.start_end(i);
        let coords = (start..end)
            .map(|c| self.coords.value_as_geo(c))
            .collect::<Vec<_>>();
        geo::LineString::new(coords)
    }

    /// Access the value at slot `i` as a [`geo`] scalar, considering validity.
    pub fn get_as_geo(&self, i: usize) -> Option<geo::LineString> {
        if self.is_null(i) {
            return None;
        }

        Some(self.value_as_geo(i))
    }

    /// Iterator over [`geo`] scalars, not considering validity.
    pub fn iter_geo_values(&self) -> impl ExactSizeIterator<Item = geo::LineString> + '_ {
        (0..self.len()).map(|i| self.value_as_geo(i))
    }

    /// Iterator over [`geo`] scalars, considering validity.
    pub fn iter_geo(&self) -> impl ExactSizeIterator<Item = Option<geo::LineString>> + '_ {
        (0..self.len()).map(|i| self.get_as_geo(i))
    }

    /// Slices this [`LineStringArray`] in place. `O(1)`.
    ///
    /// # Panics
    ///
    /// This function panics iff `offset + length > self.len()`.
    pub fn slice(&self, offset: usize, length: usize) -> Self {
        assert!(
            offset + length <= self.len(),
            "offset + length may not exceed length of array"
        );
        // Note: we only slice the geom_offsets and not the coords. Otherwise the
        // offsets would point into the wrong location of the coordinate buffer.
        Self {
            metadata: self.metadata.clone(),
            coords: self.coords.clone(),
            geom_offsets: self.geom_offsets.slice(offset, length),
            validity: self.validity.as_ref().map(|v| v.slice(offset, length)),
        }
    }
}

impl GeometryArrayTrait for LineStringArray {
    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn data_type(&self) -> GeoDataType {
        GeoDataType::LineString
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

impl IntoArrow for LineStringArray {
    type ArrowArray = GenericListArray<i32>;

    fn into_arrow(self) -> Self::ArrowArray {
        let vertices_field = self.vertices_field();
        let validity = self.validity;
        let coord_array = Arc::new(self.coords.into_arrow());
        GenericListArray::new(vertices_field, self.geom_offsets, coord_array, validity)
    }
}

impl TryFrom<&GenericListArray<i32>> for LineStringArray {
    type Error = GeoFeatherError;

    fn try_from(value: &GenericListArray<i32>) -> Result<Self> {
        let coords: CoordBuffer = value
            .values()
            .as_any()
            .downcast_ref::<FixedSizeListArray>()
            .ok_or(GeoFeatherError::General(
                "expected FixedSizeList vertices".to_string(),
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

impl TryFrom<&dyn Array> for LineStringArray {
    type Error = GeoFeatherError;

    fn try_from(value: &dyn Array) -> Result<Self> {
        match value.data_type() {
            DataType::List(_) => {
                let downcasted = value.as_any().downcast_ref::<ListArray>().unwrap();
                downcasted.try_into()
            }
            dt => Err(GeoFeatherError::General(format!(
                "Unexpected data type for LineStringArray: {dt:?}"
            ))),
        }
    }
}

impl TryFrom<(&dyn Array, &Field)> for LineStringArray {
    type Error = GeoFeatherError;

    fn try_from((arr, field): (&dyn Array, &Field)) -> Result<Self> {
        let mut arr: Self = arr.try_into()?;
        arr.metadata = Arc::new(ArrayMetadata::try_from(field)?);
        Ok(arr)
    }
}

impl From<&[geo::LineString]> for LineStringArray {
    fn from(other: &[geo::LineString]) -> Self {
        let builder: LineStringBuilder = other.into();
        builder.into()
    }
}

impl From<Vec<geo::LineString>> for LineStringArray {
    fn from(other: Vec<geo::LineString>) -> Self {
        other.as_slice().into()
    }
}

impl From<Vec<Option<geo::LineString>>> for LineStringArray {
    fn from(other: Vec<Option<geo::LineString>>) -> Self {
        let builder: LineStringBuilder = other.into();
        builder.into()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::test::linestring::{ls0, ls1};
    use geo::line_string;

    #[test]
    fn geo_round_trip() {
        let arr: LineStringArray = vec![ls0(), ls1()].into();
        assert_eq!(arr.value_as_geo(0), ls0());
        assert_eq!(arr.value_as_geo(1), ls1());
    }

    #[test]
    fn geo_round_trip_option_vec() {
        let arr: LineStringArray = vec![Some(ls0()), Some(ls1()), None].into();
        assert_eq!(arr.get_as_geo(0), Some(ls0()));
        assert_eq!(arr.get_as_geo(1), Some(ls1()));
        assert_eq!(arr.get_as_geo(2), None);
    }

    #[test]
    fn offsets_and_flat_buffer() {
        // Two linestrings of 2 and 3 coordinates: offsets [0, 2, 5], flat buffer
        // [0, 0, 1, 1, 2, 2, 3, 3, 4, 4].
        let lines = vec![
            line_string![(x: 0., y: 0.), (x: 1., y: 1.)],
            line_string![(x: 2., y: 2.), (x: 3., y: 3.), (x: 4., y: 4.)],
        ];
        let arr: LineStringArray = lines.into();

        assert_eq!(arr.len(), 2);
        assert_eq!(arr.geom_offsets().as_ref(), &[0, 2, 5]);
        assert_eq!(
            arr.coords().values(),
            &[0., 0., 1., 1., 2., 2., 3., 3., 4., 4.]
        );
    }

    #[test]
    fn arrow_round_trip() {
        let arr: LineStringArray = vec![ls0(), ls1()].into();
        let arrow_arr = arr.clone().into_arrow();
        let back: LineStringArray = (&arrow_arr).try_into().unwrap();
        assert_eq!(arr, back);
    }

    #[test]
    fn slice() {
        let arr: LineStringArray = vec![ls0(), ls1()].into();
        let sliced = arr.slice(1, 1);
        assert_eq!(sliced.len(), 1);
        assert_eq!(sliced.get_as_geo(0), Some(ls1()));
    }
}
