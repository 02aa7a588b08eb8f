use std::sync::Arc;

use arrow_array::{Array, ArrayRef, FixedSizeListArray, GenericListArray, ListArray};
use arrow_buffer::{NullBuffer, OffsetBuffer};
use arrow_schema::{DataType, Field};

use crate::array::metadata::ArrayMetadata;
use crate::array::util::OffsetBufferUtils;
use crate::array::{CoordBuffer, PolygonBuilder};
use crate::datatypes::GeoDataType;
use crate::error::{GeoFeatherError, Result};
use crate::trait_::{GeometryArrayTrait, IntoArrow};

/// An immutable array of Polygon geometries using GeoArrow's in-memory representation.
///
/// This is semantically equivalent to `Vec<Option<Polygon>>` due to the internal
/// validity bitmap.
#[derive(Debug, Clone, PartialEq)]
pub struct PolygonArray {
    pub(crate) metadata: Arc<ArrayMetadata>,

    pub(crate) coords: CoordBuffer,

    /// Offsets into the ring array where each geometry starts
    pub(crate) geom_offsets: OffsetBuffer<i32>,

    /// Offsets into the coordinate array where each ring starts
    pub(crate) ring_offsets: OffsetBuffer<i32>,

    /// Validity bitmap
    pub(crate) validity: Option<NullBuffer>,
}

pub(crate) fn check(
    coords: &CoordBuffer,
    geom_offsets: &OffsetBuffer<i32>,
    ring_offsets: &OffsetBuffer<i32>,
    validity_len: Option<usize>,
) -> Result<()> {
    if validity_len.map_or(false, |len| len != geom_offsets.len_proxy()) {
        return Err(GeoFeatherError::General(
            "validity mask length must match the number of values".to_string(),
        ));
    }

    if ring_offsets.last_offset() != coords.len() {
        return Err(GeoFeatherError::General(
            "largest ring offset must match coords length".to_string(),
        ));
    }

    if geom_offsets.last_offset() != ring_offsets.len_proxy() {
        return Err(GeoFeatherError::General(
            "largest geometry offset must match ring offsets length".to_string(),
        ));
    }

    Ok(())
}

impl PolygonArray {
    /// Create a new PolygonArray from parts.
    ///
    /// # Implementation
    ///
    /// This function is `O(1)`.
    ///
    /// # Panics
    ///
    /// - if the validity is not `None` and its length is different from the number of
    ///   geometries
    /// - if the largest ring offset does not match the number of coordinates
    /// - if the largest geometry offset does not match the size of ring offsets
    pub fn new(
        coords: CoordBuffer,
        geom_offsets: OffsetBuffer<i32>,
        ring_offsets: OffsetBuffer<i32>,
        validity: Option<NullBuffer>,
        metadata: Arc<ArrayMetadata>,
    ) -> Self {
        Self::try_new(coords, geom_offsets, ring_offsets, validity, metadata).unwrap()
    }

    /// Create a new PolygonArray from parts.
    ///
    /// # Implementation
    ///
    /// This function is `O(1)`.
    ///
    /// # Errors
    ///
    /// - if the validity is not `None` and its length is different from the number of
    ///   geometries
    /// - if the largest ring offset does not match the number of coordinates
    /// - if the largest geometry offset does not match the size of ring offsets
    pub fn try_new(
        coords: CoordBuffer,
        geom_offsets: OffsetBuffer<i32>,
        ring_offsets: OffsetBuffer<i32>,
        validity: Option<NullBuffer>,
        metadata: Arc<ArrayMetadata>,
    ) -> Result<Self> {
        check(
            &coords,
            &geom_offsets,
            &ring_offsets,
            validity.as_ref().map(|v| v.len()),
        )?;
        Ok(Self {
            metadata,
            coords,
            geom_offsets,
            ring_offsets,
            validity,
        })
    }

    fn vertices_field(&self) -> Arc<Field> {
        Field::new("vertices", self.coords.storage_type(), false).into()
    }

    fn rings_field(&self) -> Arc<Field> {
        Field::new_list("rings", self.vertices_field(), false).into()
    }

    pub fn coords(&self) -> &CoordBuffer {
        &self.coords
    }

    pub fn geom_offsets(&self) -> &OffsetBuffer<i32> {
        &self.geom_offsets
    }

    pub fn ring_offsets(&self) -> &OffsetBuffer<i32> {
        &self.ring_offsets
    }

    fn ring_as_geo(&self, ring_index: usize) -> geo::LineString {
        let (start, end) = self.ring_offsets.start_end(ring_index);
        let coords = (start..end)
            .map(|c| self.coords.value_as_geo(c))
            .collect::<Vec<_>>();
        geo::LineString::new(coords)
    }

    /// Access the value at slot `i` as a [`geo`] scalar, not considering validity.
    pub fn value_as_geo(&self, i: usize) -> geo::Polygon {
        let (start_ring, end_ring) = self.geom_offsets.start_end(i);
        let mut rings = (start_ring..end_ring).map(|r| self.ring_as_geo(r));

        // An empty polygon still has an (empty) exterior ring in geo's model.
        let exterior = rings.next().unwrap_or_else(|| geo::LineString::new(vec![]));
        geo::Polygon::new(exterior, rings.collect())
    }

    /// Access the value at slot `i` as a [`geo`] scalar, considering validity.
    pub fn get_as_geo(&self, i: usize) -> Option<geo::Polygon> {
        if self.is_null(i) {
            return None;
        }

        Some(self.value_as_geo(i))
    }

    /// Iterator over [`geo`] scalars, not considering validity.
    pub fn iter_geo_values(&self) -> impl ExactSizeIterator<Item = geo::Polygon> + '_ {
        (0..self.len()).map(|i| self.value_as_geo(i))
    }

    /// Iterator over [`geo`] scalars, considering validity.
    pub fn iter_geo(&self) -> impl ExactSizeIterator<Item = Option<geo::Polygon>> + '_ {
        (0..self.len()).map(|i| self.get_as_geo(i))
    }

    /// Slices this [`PolygonArray`] in place. `O(1)`.
    ///
    /// # Panics
    ///
    /// This function panics iff `offset + length > self.len()`.
    pub fn slice(&self, offset: usize, length: usize) -> Self {
        assert!(
            offset + length <= self.len(),
            "offset + length may not exceed length of array"
        );
        // Note: we only slice the geom_offsets and not any other buffer. Otherwise the
        // offsets would be in the wrong location.
        Self {
            metadata: self.metadata.clone(),
            coords: self.coords.clone(),
            geom_offsets: self.geom_offsets.slice(offset, length),
            ring_offsets: self.ring_offsets.clone(),
            validity: self.validity.as_ref().map(|v| v.slice(offset, length)),
        }
    }
}

impl GeometryArrayTrait for PolygonArray {
    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn data_type(&self) -> GeoDataType {
        GeoDataType::Polygon
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

impl IntoArrow for PolygonArray {
    type ArrowArray = GenericListArray<i32>;

    fn into_arrow(self) -> Self::ArrowArray {
        let vertices_field = self.vertices_field();
        let rings_field = self.rings_field();
        let validity = self.validity;
        let coord_array = Arc::new(self.coords.into_arrow());
        let ring_array = Arc::new(GenericListArray::new(
            vertices_field,
            self.ring_offsets,
            coord_array,
            None,
        ));
        GenericListArray::new(rings_field, self.geom_offsets, ring_array, validity)
    }
}

impl TryFrom<&GenericListArray<i32>> for PolygonArray {
    type Error = GeoFeatherError;

    fn try_from(geom_array: &GenericListArray<i32>) -> Result<Self> {
        let rings_array = geom_array
            .values()
            .as_any()
            .downcast_ref::<GenericListArray<i32>>()
            .ok_or(GeoFeatherError::General("expected List rings".to_string()))?;

        let coords: CoordBuffer = rings_array
            .values()
            .as_any()
            .downcast_ref::<FixedSizeListArray>()
            .ok_or(GeoFeatherError::General(
                "expected FixedSizeList vertices".to_string(),
            ))?
            .try_into()?;

        Self::try_new(
            coords,
            geom_array.offsets().clone(),
            rings_array.offsets().clone(),
            geom_array.nulls().cloned(),
            Default::default(),
        )
    }
}

impl TryFrom<&dyn Array> for PolygonArray {
    type Error = GeoFeatherError;

    fn try_from(value: &dyn Array) -> Result<Self> {
        match value.data_type() {
            DataType::List(_) => {
                let downcasted = value.as_any().downcast_ref::<ListArray>().unwrap();
                downcasted.try_into()
            }
            dt => Err(GeoFeatherError::General(format!(
                "Unexpected data type for PolygonArray: {dt:?}"
            ))),
        }
    }
}

impl TryFrom<(&dyn Array, &Field)> for PolygonArray {
    type Error = GeoFeatherError;

    fn try_from((arr, field): (&dyn Array, &Field)) -> Result<Self> {
        let mut arr: Self = arr.try_into()?;
        arr.metadata = Arc::new(ArrayMetadata::try_from(field)?);
        Ok(arr)
    }
}

impl From<&[geo::Polygon]> for PolygonArray {
    fn from(other: &[geo::Polygon]) -> Self {
        let builder: PolygonBuilder = other.into();
        builder.into()
    }
}

impl From<Vec<geo::Polygon>> for PolygonArray {
    fn from(other: Vec<geo::Polygon>) -> Self {
        other.as_slice().into()
    }
}

impl From<Vec<Option<geo::Polygon>>> for PolygonArray {
    fn from(other: Vec<Option<geo::Polygon>>) -> Self {
        let builder: PolygonBuilder = other.into();
        builder.into()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::test::polygon::{p0, p1};

    #[test]
    fn geo_round_trip() {
        let arr: PolygonArray = vec![p0(), p1()].into();
        assert_eq!(arr.value_as_geo(0), p0());
        assert_eq!(arr.value_as_geo(1), p1());
    }

    #[test]
    fn geo_round_trip_option_vec() {
        let arr: PolygonArray = vec![Some(p0()), Some(p1()), None].into();
        assert_eq!(arr.get_as_geo(0), Some(p0()));
        assert_eq!(arr.get_as_geo(1), Some(p1()));
        assert_eq!(arr.get_as_geo(2), None);
    }

    #[test]
    fn arrow_round_trip() {
        let arr: PolygonArray = vec![p0(), p1()].into();
        let arrow_arr = arr.clone().into_arrow();
        let back: PolygonArray = (&arrow_arr).try_into().unwrap();
        assert_eq!(arr, back);
    }

    #[test]
    fn rings_are_closed() {
        let arr: PolygonArray = vec![p0(), p1()].into();
        for ring_idx in 0..arr.ring_offsets().len_proxy() {
            let ring = arr.ring_as_geo(ring_idx);
            assert_eq!(ring.0.first(), ring.0.last());
        }
    }

    #[test]
    fn offsets_start_at_zero() {
        let arr: PolygonArray = vec![p0(), p1()].into();
        assert_eq!(arr.geom_offsets()[0], 0);
        assert_eq!(arr.ring_offsets()[0], 0);
    }

    #[test]
    fn slice() {
        let arr: PolygonArray = vec![p0(), p1()].into();
        let sliced = arr.slice(1, 1);
        assert_eq!(sliced.len(), 1);
        assert_eq!(sliced.get_as_geo(0), Some(p1()));
    }
}
