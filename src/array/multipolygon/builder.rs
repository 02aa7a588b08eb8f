use std::sync::Arc;

use arrow_array::{ArrayRef, GenericListArray};
use arrow_buffer::NullBufferBuilder;

use crate::array::metadata::ArrayMetadata;
use crate::array::multipolygon::capacity::MultiPolygonCapacity;
use crate::array::offset_builder::OffsetsBuilder;
use crate::array::{CoordBufferBuilder, MultiPolygonArray};
use crate::error::{GeoFeatherError, Result};
use crate::trait_::{GeometryArrayBuilder, GeometryArrayTrait, IntoArrow};

/// The GeoArrow equivalent to `Vec<Option<MultiPolygon>>`: a mutable collection of
/// MultiPolygons.
///
/// Converting a [`MultiPolygonBuilder`] into a [`MultiPolygonArray`] is `O(1)`.
#[derive(Debug)]
pub struct MultiPolygonBuilder {
    metadata: Arc<ArrayMetadata>,

    pub(crate) coords: CoordBufferBuilder,

    /// Offsets into the polygon array where each geometry starts
    pub(crate) geom_offsets: OffsetsBuilder,

    /// Offsets into the ring array where each polygon starts
    pub(crate) polygon_offsets: OffsetsBuilder,

    /// Offsets into the coordinate array where each ring starts
    pub(crate) ring_offsets: OffsetsBuilder,

    /// Validity is only defined at the geometry level
    pub(crate) validity: NullBufferBuilder,
}

impl MultiPolygonBuilder {
    /// Creates a new empty [`MultiPolygonBuilder`].
    pub fn new() -> Self {
        Self::with_capacity(Default::default())
    }

    /// Creates a new [`MultiPolygonBuilder`] with a capacity.
    pub fn with_capacity(capacity: MultiPolygonCapacity) -> Self {
        Self::with_capacity_and_options(capacity, Default::default())
    }

    pub fn with_capacity_and_options(
        capacity: MultiPolygonCapacity,
        metadata: Arc<ArrayMetadata>,
    ) -> Self {
        Self {
            metadata,
            coords: CoordBufferBuilder::with_capacity(capacity.coord_capacity()),
            geom_offsets: OffsetsBuilder::with_capacity(capacity.geom_capacity()),
            polygon_offsets: OffsetsBuilder::with_capacity(capacity.polygon_capacity()),
            ring_offsets: OffsetsBuilder::with_capacity(capacity.ring_capacity()),
            validity: NullBufferBuilder::new(capacity.geom_capacity()),
        }
    }

    /// Reserves capacity for at least `additional` more MultiPolygons to be inserted.
    pub fn reserve(&mut self, additional: MultiPolygonCapacity) {
        self.coords.reserve(additional.coord_capacity());
        self.ring_offsets.reserve(additional.ring_capacity());
        self.polygon_offsets.reserve(additional.polygon_capacity());
        self.geom_offsets.reserve(additional.geom_capacity());
    }

    fn push_polygon_value(&mut self, polygon: &geo::Polygon) -> Result<()> {
        let exterior = polygon.exterior();
        for coord in &exterior.0 {
            self.coords.push_coord(coord);
        }
        self.ring_offsets.try_push_usize(exterior.0.len())?;

        for interior in polygon.interiors() {
            for coord in &interior.0 {
                self.coords.push_coord(coord);
            }
            self.ring_offsets.try_push_usize(interior.0.len())?;
        }

        // Total number of rings in this polygon
        self.polygon_offsets
            .try_push_usize(polygon.interiors().len() + 1)
    }

    /// Add a new MultiPolygon to the end of this array.
    ///
    /// # Errors
    ///
    /// This function errors iff the new last offset overflows `i32`.
    pub fn push_multi_polygon(&mut self, value: Option<&geo::MultiPolygon>) -> Result<()> {
        if let Some(multi_polygon) = value {
            for polygon in &multi_polygon.0 {
                self.push_polygon_value(polygon)?;
            }
            self.geom_offsets.try_push_usize(multi_polygon.0.len())?;
            self.validity.append(true);
        } else {
            self.push_null();
        }
        Ok(())
    }

    /// Add a new Polygon to the end of this array as a length-1 MultiPolygon.
    ///
    /// # Errors
    ///
    /// This function errors iff the new last offset overflows `i32`.
    pub fn push_polygon(&mut self, value: Option<&geo::Polygon>) -> Result<()> {
        if let Some(polygon) = value {
            self.push_polygon_value(polygon)?;
            self.geom_offsets.try_push_usize(1)?;
            self.validity.append(true);
        } else {
            self.push_null();
        }
        Ok(())
    }

    /// Add a new geometry to the end of this array, erroring on any family other than
    /// Polygon or MultiPolygon.
    #[inline]
    pub fn push_geometry(&mut self, value: Option<&geo::Geometry>) -> Result<()> {
        match value {
            Some(geo::Geometry::Polygon(g)) => self.push_polygon(Some(g)),
            Some(geo::Geometry::MultiPolygon(g)) => self.push_multi_polygon(Some(g)),
            Some(g) => Err(GeoFeatherError::IncorrectGeometryType(format!(
                "expected Polygon or MultiPolygon, got {g:?}"
            ))),
            None => {
                self.push_null();
                Ok(())
            }
        }
    }

    pub fn extend_from_iter<'a>(
        &mut self,
        geoms: impl Iterator<Item = Option<&'a geo::MultiPolygon>>,
    ) -> Result<()> {
        geoms
            .into_iter()
            .try_for_each(|maybe_multi_polygon| self.push_multi_polygon(maybe_multi_polygon))
    }

    #[inline]
    pub(crate) fn push_null(&mut self) {
        self.geom_offsets.extend_constant(1);
        self.validity.append(false);
    }

    pub fn from_multi_polygons(geoms: &[geo::MultiPolygon], metadata: Arc<ArrayMetadata>) -> Self {
        let mut array = Self::with_capacity_and_options(
            MultiPolygonCapacity::from_multi_polygons(geoms.iter().map(Some)),
            metadata,
        );
        array.extend_from_iter(geoms.iter().map(Some)).unwrap();
        array
    }

    pub fn from_nullable_multi_polygons(
        geoms: &[Option<geo::MultiPolygon>],
        metadata: Arc<ArrayMetadata>,
    ) -> Self {
        let mut array = Self::with_capacity_and_options(
            MultiPolygonCapacity::from_multi_polygons(geoms.iter().map(|x| x.as_ref())),
            metadata,
        );
        array
            .extend_from_iter(geoms.iter().map(|x| x.as_ref()))
            .unwrap();
        array
    }

    pub fn finish(self) -> MultiPolygonArray {
        self.into()
    }
}

impl GeometryArrayBuilder for MultiPolygonBuilder {
    fn len(&self) -> usize {
        self.geom_offsets.len_proxy()
    }

    fn finish(self) -> Arc<dyn GeometryArrayTrait> {
        Arc::new(MultiPolygonArray::from(self))
    }

    fn into_array_ref(self) -> ArrayRef {
        Arc::new(self.into_arrow())
    }

    fn metadata(&self) -> Arc<ArrayMetadata> {
        self.metadata.clone()
    }

    fn set_metadata(&mut self, metadata: Arc<ArrayMetadata>) {
        self.metadata = metadata;
    }
}

impl IntoArrow for MultiPolygonBuilder {
    type ArrowArray = GenericListArray<i32>;

    fn into_arrow(self) -> Self::ArrowArray {
        let arr: MultiPolygonArray = self.into();
        arr.into_arrow()
    }
}

impl Default for MultiPolygonBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl From<MultiPolygonBuilder> for MultiPolygonArray {
    fn from(mut other: MultiPolygonBuilder) -> Self {
        let validity = other.validity.finish();
        Self::new(
            other.coords.into(),
            other.geom_offsets.into(),
            other.polygon_offsets.into(),
            other.ring_offsets.into(),
            validity,
            other.metadata,
        )
    }
}

impl From<&[geo::MultiPolygon]> for MultiPolygonBuilder {
    fn from(geoms: &[geo::MultiPolygon]) -> Self {
        Self::from_multi_polygons(geoms, Default::default())
    }
}

impl From<Vec<Option<geo::MultiPolygon>>> for MultiPolygonBuilder {
    fn from(geoms: Vec<Option<geo::MultiPolygon>>) -> Self {
        Self::from_nullable_multi_polygons(&geoms, Default::default())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::test::multipolygon::{mp0, mp1};
    use crate::test::polygon::p0;

    #[test]
    fn polygon_pushed_as_single_member() {
        let mut builder = MultiPolygonBuilder::new();
        builder.push_polygon(Some(&p0())).unwrap();
        assert_eq!(builder.geom_offsets.as_slice(), &[0, 1]);
    }

    #[test]
    fn geom_offsets_count_polygons() {
        let builder = MultiPolygonBuilder::from_multi_polygons(&[mp0(), mp1()], Default::default());
        // mp0 has one polygon, mp1 has two.
        assert_eq!(builder.geom_offsets.as_slice(), &[0, 1, 3]);
    }

    #[test]
    fn mixed_family_rejected() {
        let mut builder = MultiPolygonBuilder::new();
        let line = geo::Geometry::LineString(geo::LineString::from(vec![(0., 0.), (1., 1.)]));
        assert!(builder.push_geometry(Some(&line)).is_err());
    }
}
