use std::sync::Arc;

use arrow_array::{ArrayRef, FixedSizeListArray};
use arrow_buffer::NullBufferBuilder;

use crate::array::metadata::ArrayMetadata;
use crate::array::{CoordBufferBuilder, PointArray};
use crate::error::{GeoFeatherError, Result};
use crate::trait_::{GeometryArrayBuilder, GeometryArrayTrait, IntoArrow};

/// The GeoArrow equivalent to `Vec<Option<Point>>`: a mutable collection of Points.
///
/// Converting a [`PointBuilder`] into a [`PointArray`] is `O(1)`.
#[derive(Debug)]
pub struct PointBuilder {
    metadata: Arc<ArrayMetadata>,
    pub(crate) coords: CoordBufferBuilder,
    pub(crate) validity: NullBufferBuilder,
}

impl PointBuilder {
    /// Creates a new empty [`PointBuilder`].
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates a new [`PointBuilder`] with a capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_options(capacity, Default::default())
    }

    pub fn with_capacity_and_options(capacity: usize, metadata: Arc<ArrayMetadata>) -> Self {
        Self {
            metadata,
            coords: CoordBufferBuilder::with_capacity(capacity),
            validity: NullBufferBuilder::new(capacity),
        }
    }

    pub fn reserve(&mut self, additional: usize) {
        self.coords.reserve(additional);
    }

    /// Add a new Point to the end of this array.
    #[inline]
    pub fn push_point(&mut self, value: Option<&geo::Point>) {
        match value {
            Some(point) => {
                self.coords.push_point(point);
                self.validity.append(true);
            }
            None => self.push_null(),
        }
    }

    /// Add a new xy coordinate to the end of this array.
    #[inline]
    pub fn push_xy(&mut self, x: f64, y: f64) {
        self.coords.push_xy(x, y);
        self.validity.append(true);
    }

    /// Add a new geometry to the end of this array, erroring on any family other than
    /// Point.
    #[inline]
    pub fn push_geometry(&mut self, value: Option<&geo::Geometry>) -> Result<()> {
        match value {
            Some(geo::Geometry::Point(g)) => self.push_point(Some(g)),
            Some(g) => {
                return Err(GeoFeatherError::IncorrectGeometryType(format!(
                    "expected Point, got {g:?}"
                )))
            }
            None => self.push_null(),
        }
        Ok(())
    }

    /// Unlike the nested geometry types, a fixed-size list has no offsets to leave
    /// empty for a null slot, so a null point still occupies coordinate memory.
    #[inline]
    pub fn push_null(&mut self) {
        self.coords.push_xy(f64::NAN, f64::NAN);
        self.validity.append(false);
    }

    pub fn extend_from_iter<'a>(&mut self, geoms: impl Iterator<Item = Option<&'a geo::Point>>) {
        geoms.for_each(|maybe_point| self.push_point(maybe_point));
    }

    pub fn from_points(geoms: &[geo::Point], metadata: Arc<ArrayMetadata>) -> Self {
        let mut array = Self::with_capacity_and_options(geoms.len(), metadata);
        array.extend_from_iter(geoms.iter().map(Some));
        array
    }

    pub fn from_nullable_points(geoms: &[Option<geo::Point>], metadata: Arc<ArrayMetadata>) -> Self {
        let mut array = Self::with_capacity_and_options(geoms.len(), metadata);
        array.extend_from_iter(geoms.iter().map(|x| x.as_ref()));
        array
    }

    pub fn finish(self) -> PointArray {
        self.into()
    }
}

impl GeometryArrayBuilder for PointBuilder {
    fn len(&self) -> usize {
        self.coords.len()
    }

    fn finish(self) -> Arc<dyn GeometryArrayTrait> {
        Arc::new(PointArray::from(self))
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

impl IntoArrow for PointBuilder {
    type ArrowArray = FixedSizeListArray;

    fn into_arrow(self) -> Self::ArrowArray {
        let point_array: PointArray = self.into();
        point_array.into_arrow()
    }
}

impl Default for PointBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl From<PointBuilder> for PointArray {
    fn from(mut other: PointBuilder) -> Self {
        let validity = other.validity.finish();
        Self::new(other.coords.into(), validity, other.metadata)
    }
}

impl From<&[geo::Point]> for PointBuilder {
    fn from(geoms: &[geo::Point]) -> Self {
        Self::from_points(geoms, Default::default())
    }
}

impl From<Vec<Option<geo::Point>>> for PointBuilder {
    fn from(geoms: Vec<Option<geo::Point>>) -> Self {
        Self::from_nullable_points(&geoms, Default::default())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::test::point::{p0, p1};

    #[test]
    fn null_points_keep_coordinate_slots() {
        let mut builder = PointBuilder::new();
        builder.push_point(Some(&p0()));
        builder.push_null();
        builder.push_point(Some(&p1()));

        let arr = builder.finish();
        assert_eq!(arr.len(), 3);
        assert_eq!(arr.null_count(), 1);
        assert!(arr.coords().get_x(1).is_nan());
    }
}
