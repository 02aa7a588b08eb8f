use std::sync::Arc;

use arrow_array::{ArrayRef, GenericListArray};
use arrow_buffer::NullBufferBuilder;

use crate::array::metadata::ArrayMetadata;
use crate::array::multipoint::capacity::MultiPointCapacity;
use crate::array::offset_builder::OffsetsBuilder;
use crate::array::{CoordBufferBuilder, MultiPointArray};
use crate::error::{GeoFeatherError, Result};
use crate::trait_::{GeometryArrayBuilder, GeometryArrayTrait, IntoArrow};

/// The GeoArrow equivalent to `Vec<Option<MultiPoint>>`: a mutable collection of
/// MultiPoints.
///
/// Converting a [`MultiPointBuilder`] into a [`MultiPointArray`] is `O(1)`.
#[derive(Debug)]
pub struct MultiPointBuilder {
    metadata: Arc<ArrayMetadata>,

    pub(crate) coords: CoordBufferBuilder,

    /// Offsets into the coordinate array where each geometry starts
    pub(crate) geom_offsets: OffsetsBuilder,

    /// Validity is only defined at the geometry level
    pub(crate) validity: NullBufferBuilder,
}

impl MultiPointBuilder {
    /// Creates a new empty [`MultiPointBuilder`].
    pub fn new() -> Self {
        Self::with_capacity(Default::default())
    }

    /// Creates a new [`MultiPointBuilder`] with a capacity.
    pub fn with_capacity(capacity: MultiPointCapacity) -> Self {
        Self::with_capacity_and_options(capacity, Default::default())
    }

    pub fn with_capacity_and_options(
        capacity: MultiPointCapacity,
        metadata: Arc<ArrayMetadata>,
    ) -> Self {
        Self {
            metadata,
            coords: CoordBufferBuilder::with_capacity(capacity.coord_capacity()),
            geom_offsets: OffsetsBuilder::with_capacity(capacity.geom_capacity()),
            validity: NullBufferBuilder::new(capacity.geom_capacity()),
        }
    }

    /// Reserves capacity for at least `additional` more MultiPoints to be inserted.
    pub fn reserve(&mut self, additional: MultiPointCapacity) {
        self.coords.reserve(additional.coord_capacity());
        self.geom_offsets.reserve(additional.geom_capacity());
    }

    /// Add a new MultiPoint to the end of this array.
    ///
    /// # Errors
    ///
    /// This function errors iff the new last offset overflows `i32`.
    #[inline]
    pub fn push_multi_point(&mut self, value: Option<&geo::MultiPoint>) -> Result<()> {
        if let Some(multi_point) = value {
            for point in &multi_point.0 {
                self.coords.push_point(point);
            }
            self.try_push_length(multi_point.0.len())?;
        } else {
            self.push_null();
        }
        Ok(())
    }

    /// Add a new Point to the end of this array, as a single-member MultiPoint.
    #[inline]
    pub fn push_point(&mut self, value: Option<&geo::Point>) -> Result<()> {
        if let Some(point) = value {
            self.coords.push_point(point);
            self.try_push_length(1)?;
        } else {
            self.push_null();
        }
        Ok(())
    }

    /// Add a new geometry to the end of this array, erroring on any family other than
    /// Point or MultiPoint.
    #[inline]
    pub fn push_geometry(&mut self, value: Option<&geo::Geometry>) -> Result<()> {
        match value {
            Some(geo::Geometry::Point(g)) => self.push_point(Some(g)),
            Some(geo::Geometry::MultiPoint(g)) => self.push_multi_point(Some(g)),
            Some(g) => Err(GeoFeatherError::IncorrectGeometryType(format!(
                "expected MultiPoint, got {g:?}"
            ))),
            None => {
                self.push_null();
                Ok(())
            }
        }
    }

    pub fn extend_from_iter<'a>(
        &mut self,
        geoms: impl Iterator<Item = Option<&'a geo::MultiPoint>>,
    ) -> Result<()> {
        geoms
            .into_iter()
            .try_for_each(|maybe_multi_point| self.push_multi_point(maybe_multi_point))
    }

    #[inline]
    pub(crate) fn try_push_length(&mut self, geom_offsets_length: usize) -> Result<()> {
        self.geom_offsets.try_push_usize(geom_offsets_length)?;
        self.validity.append(true);
        Ok(())
    }

    #[inline]
    pub(crate) fn push_null(&mut self) {
        self.geom_offsets.extend_constant(1);
        self.validity.append(false);
    }

    pub fn from_multi_points(geoms: &[geo::MultiPoint], metadata: Arc<ArrayMetadata>) -> Self {
        let mut array = Self::with_capacity_and_options(
            MultiPointCapacity::from_multi_points(geoms.iter().map(Some)),
            metadata,
        );
        array.extend_from_iter(geoms.iter().map(Some)).unwrap();
        array
    }

    pub fn from_nullable_multi_points(
        geoms: &[Option<geo::MultiPoint>],
        metadata: Arc<ArrayMetadata>,
    ) -> Self {
        let mut array = Self::with_capacity_and_options(
            MultiPointCapacity::from_multi_points(geoms.iter().map(|x| x.as_ref())),
            metadata,
        );
        array
            .extend_from_iter(geoms.iter().map(|x| x.as_ref()))
            .unwrap();
        array
    }

    pub fn finish(self) -> MultiPointArray {
        self.into()
    }
}

impl GeometryArrayBuilder for MultiPointBuilder {
    fn len(&self) -> usize {
        self.geom_offsets.len_proxy()
    }

    fn finish(self) -> Arc<dyn GeometryArrayTrait> {
        Arc::new(MultiPointArray::from(self))
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

impl IntoArrow for MultiPointBuilder {
    type ArrowArray = GenericListArray<i32>;

    fn into_arrow(self) -> Self::ArrowArray {
        let multipoint_arr: MultiPointArray = self.into();
        multipoint_arr.into_arrow()
    }
}

impl Default for MultiPointBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl From<MultiPointBuilder> for MultiPointArray {
    fn from(mut other: MultiPointBuilder) -> Self {
        let validity = other.validity.finish();
        Self::new(
            other.coords.into(),
            other.geom_offsets.into(),
            validity,
            other.metadata,
        )
    }
}

impl From<&[geo::MultiPoint]> for MultiPointBuilder {
    fn from(geoms: &[geo::MultiPoint]) -> Self {
        Self::from_multi_points(geoms, Default::default())
    }
}

impl From<Vec<Option<geo::MultiPoint>>> for MultiPointBuilder {
    fn from(geoms: Vec<Option<geo::MultiPoint>>) -> Self {
        Self::from_nullable_multi_points(&geoms, Default::default())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::test::point::{p0, p1};

    #[test]
    fn single_points_become_length_one_entries() {
        let mut builder = MultiPointBuilder::new();
        builder.push_point(Some(&p0())).unwrap();
        builder.push_point(Some(&p1())).unwrap();

        let arr = builder.finish();
        assert_eq!(arr.len(), 2);
        assert_eq!(arr.geom_offsets().as_ref(), &[0, 1, 2]);
    }

    #[test]
    fn mixed_family_rejected() {
        let mut builder = MultiPointBuilder::new();
        let poly = geo::Geometry::Polygon(crate::test::polygon::p0());
        assert!(builder.push_geometry(Some(&poly)).is_err());
    }
}
