use std::sync::Arc;

use arrow_array::{ArrayRef, GenericListArray};
use arrow_buffer::NullBufferBuilder;

use crate::array::metadata::ArrayMetadata;
use crate::array::offset_builder::OffsetsBuilder;
use crate::array::polygon::capacity::PolygonCapacity;
use crate::array::{CoordBufferBuilder, PolygonArray};
use crate::error::{GeoFeatherError, Result};
use crate::trait_::{GeometryArrayBuilder, GeometryArrayTrait, IntoArrow};

/// The GeoArrow equivalent to `Vec<Option<Polygon>>`: a mutable collection of Polygons.
///
/// Converting a [`PolygonBuilder`] into a [`PolygonArray`] is `O(1)`.
#[derive(Debug)]
pub struct PolygonBuilder {
    metadata: Arc<ArrayMetadata>,

    pub(crate) coords: CoordBufferBuilder,

    /// Offsets into the ring array where each geometry starts
    pub(crate) geom_offsets: OffsetsBuilder,

    /// Offsets into the coordinate array where each ring starts
    pub(crate) ring_offsets: OffsetsBuilder,

    /// Validity is only defined at the geometry level
    pub(crate) validity: NullBufferBuilder,
}

impl PolygonBuilder {
    /// Creates a new empty [`PolygonBuilder`].
    pub fn new() -> Self {
        Self::with_capacity(Default::default())
    }

    /// Creates a new [`PolygonBuilder`] with a capacity.
    pub fn with_capacity(capacity: PolygonCapacity) -> Self {
        Self::with_capacity_and_options(capacity, Default::default())
    }

    pub fn with_capacity_and_options(
        capacity: PolygonCapacity,
        metadata: Arc<ArrayMetadata>,
    ) -> Self {
        Self {
            metadata,
            coords: CoordBufferBuilder::with_capacity(capacity.coord_capacity()),
            geom_offsets: OffsetsBuilder::with_capacity(capacity.geom_capacity()),
            ring_offsets: OffsetsBuilder::with_capacity(capacity.ring_capacity()),
            validity: NullBufferBuilder::new(capacity.geom_capacity()),
        }
    }

    /// Reserves capacity for at least `additional` more Polygons to be inserted.
    pub fn reserve(&mut self, additional: PolygonCapacity) {
        self.coords.reserve(additional.coord_capacity());
        self.ring_offsets.reserve(additional.ring_capacity());
        self.geom_offsets.reserve(additional.geom_capacity());
    }

    /// Add a new Polygon to the end of this array.
    ///
    /// The exterior ring is written first, then the interior rings; each ring is
    /// stored with its closing coordinate (first == last).
    ///
    /// # Errors
    ///
    /// This function errors iff the new last offset overflows `i32`.
    pub fn push_polygon(&mut self, value: Option<&geo::Polygon>) -> Result<()> {
        if let Some(polygon) = value {
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
            self.geom_offsets
                .try_push_usize(polygon.interiors().len() + 1)?;
            self.validity.append(true);
        } else {
            self.push_null();
        }
        Ok(())
    }

    /// Add a new geometry to the end of this array, erroring on any family other than
    /// Polygon.
    #[inline]
    pub fn push_geometry(&mut self, value: Option<&geo::Geometry>) -> Result<()> {
        match value {
            Some(geo::Geometry::Polygon(g)) => self.push_polygon(Some(g)),
            Some(g) => Err(GeoFeatherError::IncorrectGeometryType(format!(
                "expected Polygon, got {g:?}"
            ))),
            None => {
                self.push_null();
                Ok(())
            }
        }
    }

    pub fn extend_from_iter<'a>(
        &mut self,
        geoms: impl Iterator<Item = Option<&'a geo::Polygon>>,
    ) -> Result<()> {
        geoms
            .into_iter()
            .try_for_each(|maybe_polygon| self.push_polygon(maybe_polygon))
    }

    #[inline]
    pub(crate) fn push_null(&mut self) {
        self.geom_offsets.extend_constant(1);
        self.validity.append(false);
    }

    pub fn from_polygons(geoms: &[geo::Polygon], metadata: Arc<ArrayMetadata>) -> Self {
        let mut array = Self::with_capacity_and_options(
            PolygonCapacity::from_polygons(geoms.iter().map(Some)),
            metadata,
        );
        array.extend_from_iter(geoms.iter().map(Some)).unwrap();
        array
    }

    pub fn from_nullable_polygons(
        geoms: &[Option<geo::Polygon>],
        metadata: Arc<ArrayMetadata>,
    ) -> Self {
        let mut array = Self::with_capacity_and_options(
            PolygonCapacity::from_polygons(geoms.iter().map(|x| x.as_ref())),
            metadata,
        );
        array
            .extend_from_iter(geoms.iter().map(|x| x.as_ref()))
            .unwrap();
        array
    }

    pub fn finish(self) -> PolygonArray {
        self.into()
    }
}

impl GeometryArrayBuilder for PolygonBuilder {
    fn len(&self) -> usize {
        self.geom_offsets.len_proxy()
    }

    fn finish(self) -> Arc<dyn GeometryArrayTrait> {
        Arc::new(PolygonArray::from(self))
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

impl IntoArrow for PolygonBuilder {
    type ArrowArray = GenericListArray<i32>;

    fn into_arrow(self) -> Self::ArrowArray {
        let polygon_arr: PolygonArray = self.into();
        polygon_arr.into_arrow()
    }
}

impl Default for PolygonBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl From<PolygonBuilder> for PolygonArray {
    fn from(mut other: PolygonBuilder) -> Self {
        let validity = other.validity.finish();
        Self::new(
            other.coords.into(),
            other.geom_offsets.into(),
            other.ring_offsets.into(),
            validity,
            other.metadata,
        )
    }
}

impl From<&[geo::Polygon]> for PolygonBuilder {
    fn from(geoms: &[geo::Polygon]) -> Self {
        Self::from_polygons(geoms, Default::default())
    }
}

impl From<Vec<Option<geo::Polygon>>> for PolygonBuilder {
    fn from(geoms: Vec<Option<geo::Polygon>>) -> Self {
        Self::from_nullable_polygons(&geoms, Default::default())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::test::polygon::{p0, p1};

    #[test]
    fn interior_rings_counted() {
        let builder = PolygonBuilder::from_polygons(&[p0(), p1()], Default::default());
        // p0 has no interiors, p1 has one.
        assert_eq!(builder.geom_offsets.as_slice(), &[0, 1, 3]);
    }

    #[test]
    fn mixed_family_rejected() {
        let mut builder = PolygonBuilder::new();
        let point = geo::Geometry::Point(geo::Point::new(0., 0.));
        assert!(builder.push_geometry(Some(&point)).is_err());
    }
}
