use std::sync::Arc;

use arrow_array::{Array, ArrayRef, FixedSizeListArray, GenericListArray, ListArray};
use arrow_buffer::{NullBuffer, OffsetBuffer};
use arrow_schema::{DataType, Field};

use crate::array::metadata::ArrayMetadata;
use crate::array::util::OffsetBufferUtils;
use crate::array::{CoordBuffer, MultiPolygonBuilder};
use crate::datatypes::GeoDataType;
use crate::error::{GeoFeatherError, Result};
use crate::trait_::{GeometryArrayTrait, IntoArrow};

/// An immutable array of MultiPolygon geometries using GeoArrow's in-memory
/// representation.
///
/// This is semantically equivalent to `Vec<Option<MultiPolygon>>` due to the internal
/// validity bitmap.
#[derive(Debug, Clone, PartialEq)]
pub struct MultiPolygonArray {
    pub(crate) metadata: Arc<ArrayMetadata>,

    pub(crate) coords: CoordBuffer,

    /// Offsets into the polygon array where each geometry starts
    pub(crate) geom_offsets: OffsetBuffer<i32>,

    /// Offsets into the ring array where each polygon starts
    pub(crate) polygon_offsets: OffsetBuffer<i32>,

    /// Offsets into the coordinate array where each ring starts
    pub(crate) ring_offsets: OffsetBuffer<i32>,

    /// Validity bitmap
    pub(crate) validity: Option<NullBuffer>,
}

pub(super) fn check(
    coords: &CoordBuffer,
    geom_offsets: &OffsetBuffer<i32>,
    polygon_offsets: &OffsetBuffer<i32>,
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

    if polygon_offsets.last_offset() != ring_offsets.len_proxy() {
        return Err(GeoFeatherError::General(
            "largest polygon offset must match ring offsets length".to_string(),
        ));
    }

    if geom_offsets.last_offset() != polygon_offsets.len_proxy() {
        return Err(GeoFeatherError::General(
            "largest geometry offset must match polygon offsets length".to_string(),
        ));
    }

    Ok(())
}

impl MultiPolygonArray {
    /// Create a new MultiPolygonArray from parts.
    ///
    /// # Implementation
    ///
    /// This function is `O(1)`.
    ///
    /// # Panics
    ///
    /// - if the validity is not `None` and its length is different from the number of
    ///   geometries
    /// - if any offset level does not line up with the buffer below it
    pub fn new(
        coords: CoordBuffer,
        geom_offsets: OffsetBuffer<i32>,
        polygon_offsets: OffsetBuffer<i32>,
        ring_offsets: OffsetBuffer<i32>,
        validity: Option<NullBuffer>,
        metadata: Arc<ArrayMetadata>,
    ) -> Self {
        Self::try_new(
            coords,
            geom_offsets,
            polygon_offsets,
            ring_offsets,
            validity,
            metadata,
        )
        .unwrap()
    }

    /// Create a new MultiPolygonArray from parts.
    ///
    /// # Implementation
    ///
    /// This function is `O(1)`.
    ///
    /// # Errors
    ///
    /// - if the validity is not `None` and its length is different from the number of
    ///   geometries
    /// - if any offset level does not line up with the buffer below it
    pub fn try_new(
        coords: CoordBuffer,
        geom_offsets: OffsetBuffer<i32>,
        polygon_offsets: OffsetBuffer<i32>,
        ring_offsets: OffsetBuffer<i32>,
        validity: Option<NullBuffer>,
        metadata: Arc<ArrayMetadata>,
    ) -> Result<Self> {
        check(
            &coords,
            &geom_offsets,
            &polygon_offsets,
            &ring_offsets,
            validity.as_ref().map(|v| v.len()),
        )?;
        Ok(Self {
            metadata,
            coords,
            geom_offsets,
            polygon_offsets,
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

    fn polygons_field(&self) -> Arc<Field> {
        Field::new_list("polygons", self.rings_field(), false).into()
    }

    pub fn coords(&self) -> &CoordBuffer {
        &self.coords
    }

    pub fn geom_offsets(&self) -> &OffsetBuffer<i32> {
        &self.geom_offsets
    }

    pub fn polygon_offsets(&self) -> &OffsetBuffer<i32> {
        &self.polygon_offsets
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

    fn polygon_as_geo(&self, polygon_index: usize) -> geo::Polygon {
        let (start_ring, end_ring) = self.polygon_offsets.start_end(polygon_index);
        let mut rings = (start_ring..end_ring).map(|r| self.ring_as_geo(r));
        let exterior = rings.next().unwrap_or_else(|| geo::LineString::new(vec![]));
        geo::Polygon::new(exterior, rings.collect())
    }

    /// Access the value at slot `i` as a [`geo`] scalar, not considering validity.
    pub fn value_as_geo(&self, i: usize) -> geo::MultiPolygon {
        let (start_polygon, end_polygon) = self.geom_offsets.start_end(i);
        let polygons = (start_polygon..end_polygon)
            .map(|p| self.polygon_as_geo(p))
            .collect::<Vec<_>>();
        geo::MultiPolygon::new(polygons)
    }

    /// Access the value at slot `i` as a [`geo`] scalar, considering validity.
    pub fn get_as_geo(&self, i: usize) -> Option<geo::MultiPolygon> {
        if self.is_null(i) {
            return None;
        }

        Some(self.value_as_geo(i))
    }

    /// Iterator over [`geo`] scalars, not considering validity.
    pub fn iter_geo_values(&self) -> impl ExactSizeIterator<Item = geo::MultiPolygon> + '_ {
        (0..self.len()).map(|i| self.value_as_geo(i))
    }

    /// Iterator over [`geo`] scalars, considering validity.
    pub fn iter_geo(&self) -> impl ExactSizeIterator<Item = Option<geo::MultiPolygon>> + '_ {
        (0..self.len()).map(|i| self.get_as_geo(i))
    }

    /// Slices this [`MultiPolygonArray`] in place. `O(1)`.
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
            polygon_offsets: self.polygon_offsets.clone(),
            ring_offsets: self.ring_offsets.clone(),
            validity: self.validity.as_ref().map(|v| v.slice(offset, length)),
        }
    }
}

impl GeometryArrayTrait for MultiPolygonArray {
    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn data_type(&self) -> GeoDataType {
        GeoDataType::MultiPolygon
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

impl IntoArrow for MultiPolygonArray {
    type ArrowArray = GenericListArray<i32>;

    fn into_arrow(self) -> Self::ArrowArray {
        let vertices_field = self.vertices_field();
        let rings_field = self.rings_field();
        let polygons_field = self.polygons_field();
        let validity = self.validity;
        let coord_array = Arc::new(self.coords.into_arrow());
        let ring_array = Arc::new(GenericListArray::new(
            vertices_field,
            self.ring_offsets,
            coord_array,
            None,
        ));
        let polygon_array = Arc::new(GenericListArray::new(
            rings_field,
            self.polygon_offsets,
            ring_array,
            None,
        ));
        GenericListArray::new(polygons_field, self.geom_offsets, polygon_array, validity)
    }
}

impl TryFrom<&GenericListArray<i32>> for MultiPolygonArray {
    type Error = GeoFeatherError;

    fn try_from(geom_array: &GenericListArray<i32>) -> Result<Self> {
        let polygons_array = geom_array
            .values()
            .as_any()
            .downcast_ref::<GenericListArray<i32>>()
            .ok_or(GeoFeatherError::General(
                "expected List polygons".to_string(),
            ))?;

        let rings_array = polygons_array
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
            polygons_array.offsets().clone(),
            rings_array.offsets().clone(),
            geom_array.nulls().cloned(),
            Default::default(),
        )
    }
}

impl TryFrom<&dyn Array> for MultiPolygonArray {
    type Error = GeoFeatherError;

    fn try_from(value: &dyn Array) -> Result<Self> {
        match value.data_type() {
            DataType::List(_) => {
                let downcasted = value.as_any().downcast_ref::<ListArray>().unwrap();
                downcasted.try_into()
            }
            dt => Err(GeoFeatherError::General(format!(
                "Unexpected data type for MultiPolygonArray: {dt:?}"
            ))),
        }
    }
}

impl TryFrom<(&dyn Array, &Field)> for MultiPolygonArray {
    type Error = GeoFeatherError;

    fn try_from((arr, field): (&dyn Array, &Field)) -> Result<Self> {
        let mut arr: Self = arr.try_into()?;
        arr.metadata = Arc::new(ArrayMetadata::try_from(field)?);
        Ok(arr)
    }
}

impl From<&[geo::MultiPolygon]> for MultiPolygonArray {
    fn from(other: &[geo::MultiPolygon]) -> Self {
        let builder: MultiPolygonBuilder = other.into();
        builder.into()
    }
}

impl From<Vec<geo::MultiPolygon>> for MultiPolygonArray {
    fn from(other: Vec<geo::MultiPolygon>) -> Self {
        other.as_slice().into()
    }
}

impl From<Vec<Option<geo::MultiPolygon>>> for MultiPolygonArray {
    fn from(other: Vec<Option<geo::MultiPolygon>>) -> Self {
        let builder: MultiPolygonBuilder = other.into();
        builder.into()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::test::multipolygon::{mp0, mp1};

    #[test]
    fn geo_round_trip() {
        let arr: MultiPolygonArray = vec![mp0(), mp1()].into();
        assert_eq!(arr.value_as_geo(0), mp0());
        assert_eq!(arr.value_as_geo(1), mp1());
    }

    #[test]
    fn geo_round_trip_option_vec() {
        let arr: MultiPolygonArray = vec![Some(mp0()), None, Some(mp1())].into();
        assert_eq!(arr.get_as_geo(0), Some(mp0()));
        assert_eq!(arr.get_as_geo(1), None);
        assert_eq!(arr.get_as_geo(2), Some(mp1()));
    }

    #[test]
    fn arrow_round_trip() {
        let arr: MultiPolygonArray = vec![mp0(), mp1()].into();
        let arrow_arr = arr.clone().into_arrow();
        let back: MultiPolygonArray = (&arrow_arr).try_into().unwrap();
        assert_eq!(arr, back);
    }

    #[test]
    fn three_offset_levels_line_up() {
        let arr: MultiPolygonArray = vec![mp0(), mp1()].into();
        assert_eq!(
            arr.geom_offsets().last_offset(),
            arr.polygon_offsets().len_proxy()
        );
        assert_eq!(
            arr.polygon_offsets().last_offset(),
            arr.ring_offsets().len_proxy()
        );
        assert_eq!(arr.ring_offsets().last_offset(), arr.coords().len());
    }

    #[test]
    fn rings_are_closed() {
        let arr: MultiPolygonArray = vec![mp0(), mp1()].into();
        for ring_idx in 0..arr.ring_offsets().len_proxy() {
            let ring = arr.ring_as_geo(ring_idx);
            assert_eq!(ring.0.first(), ring.0.last());
        }
    }
}
