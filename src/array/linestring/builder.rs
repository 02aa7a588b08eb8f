use std::sync::Arc;

use arrow_array::{ArrayRef, GenericListArray};
use arrow_buffer::NullBufferBuilder;

use crate::array::linestring::capacity::LineStringCapacity;
use crate::array::metadata::ArrayMetadata;
use crate::array::offset_builder::OffsetsBuilder;
use crate::array::{CoordBufferBuilder, LineStringArray};
use crate::error::{GeoFeatherError, Result};
use crate::trait_::{GeometryArrayBuilder, GeometryArrayTrait, IntoArrow};

/// The GeoArrow equivalent to `Vec<Option<LineString>>`: a mutable collection of
/// LineStrings.
///
/// Converting a [`LineStringBuilder`] into a [`LineStringArray`] is `O(1)`.
#[derive(Debug)]
pub struct LineStringBuilder {
    metadata: Arc<ArrayMetadata>,

    pub(crate) coords: CoordBufferBuilder,

    /// Offsets into the coordinate array where each geometry starts
    pub(crate) geom_offsets: OffsetsBuilder,

    /// Validity is only defined at the geometry level
    pub(crate) validity: NullBufferBuilder,
}

impl LineStringBuilder {
    /// Creates a new empty [`LineStringBuilder`].
    pub fn new() -> Self {
        Self::with_capacity(Default::default())
    }

    /// Creates a new [`LineStringBuilder`] with a capacity.
    pub fn with_capacity(capacity: LineStringCapacity) -> Self {
        Self::with_capacity_and_options(capacity, Default::default())
    }

    pub fn with_capacity_and_options(
        capacity: LineStringCapacity,
        metadata: Arc<ArrayMetadata>,
    ) -> Self {
        Self {
            metadata,
            coords: CoordBufferBuilder::with_capacity(capacity.coord_capacity()),
            geom_offsets: OffsetsBuilder::with_capacity(capacity.geom_capacity()),
            validity: NullBufferBuilder::new(capacity.geom_capacity()),
        }
    }

    pub fn with_capacity_from_iter<'a>(
        geoms: impl Iterator<Item = Option<&'a geo::LineString>>,
    ) -> Self {
        let counter = LineStringCapacity::from_line_strings(geoms);
        Self::with_capacity(counter)
    }

    /// Reserves capacity for at least `additional` more LineStrings to be inserted.
    pub fn reserve(&mut self, additional: LineStringCapacity) {
        self.coords.reserve(additional.coord_capacity());
        self.geom_offsets.reserve(additional.geom_capacity());
    }

    /// Add a new LineString to the end of this array.
    ///
    /// # Errors
    ///
    /// This function errors iff the new last offset overflows `i32`.
    #[inline]
    pub fn push_line_string(&mut self, value: Option<&geo::LineString>) -> Result<()> {
        if let Some(line_string) = value {
            for coord in &line_string.0 {
                self.coords.push_coord(coord);
            }
            self.try_push_length(line_string.0.len())?;
        } else {
            self.push_null();
        }
        Ok(())
    }

    /// Add a new geometry to the end of this array, erroring on any family other than
    /// LineString.
    #[inline]
    pub fn push_geometry(&mut self, value: Option<&geo::Geometry>) -> Result<()> {
        match value {
            Some(geo::Geometry::LineString(g)) => self.push_line_string(Some(g)),
            Some(g) => Err(GeoFeatherError::IncorrectGeometryType(format!(
                "expected LineString, got {g:?}"
            ))),
            None => {
                self.push_null();
                Ok(())
            }
        }
    }

    pub fn extend_from_iter<'a>(
        &mut self,
        geoms: impl Iterator<Item = Option<&'a geo::LineString>>,
    ) -> Result<()> {
        geoms
            .into_iter()
            .try_for_each(|maybe_line_string| self.push_line_string(maybe_line_string))
    }

    /// Push a raw coordinate to the underlying coordinate array.
    ///
    /// # Safety
    ///
    /// This is marked as unsafe because care must be taken to ensure that pushing raw
    /// coordinates to the array upholds the necessary invariants of the array.
    #[inline]
    pub unsafe fn push_xy(&mut self, x: f64, y: f64) {
        self.coords.push_xy(x, y);
    }

    /// Needs to be called when a valid value was extended to this array.
    /// This is a relatively low level function, prefer `push_line_string` when you can.
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

    pub fn from_line_strings(geoms: &[geo::LineString], metadata: Arc<ArrayMetadata>) -> Self {
        let mut array =
            Self::with_capacity_and_options(
                LineStringCapacity::from_line_strings(geoms.iter().map(Some)),
                metadata,
            );
        array.extend_from_iter(geoms.iter().map(Some)).unwrap();
        array
    }

    pub fn from_nullable_line_strings(
        geoms: &[Option<geo::LineString>],
        metadata: Arc<ArrayMetadata>,
    ) -> Self {
        let mut array = Self::with_capacity_and_options(
            LineStringCapacity::from_line_strings(geoms.iter().map(|x| x.as_ref())),
            metadata,
        );
        array
            .extend_from_iter(geoms.iter().map(|x| x.as_ref()))
            .unwrap();
        array
    }

    pub fn finish(self) -> LineStringArray {
        self.into()
    }
}

impl GeometryArrayBuilder for LineStringBuilder {
    fn len(&self) -> usize {
        self.geom_offsets.len_proxy()
    }

    fn finish(self) -> Arc<dyn GeometryArrayTrait> {
        Arc::new(LineStringArray::from(self))
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

impl IntoArrow for LineStringBuilder {
    type ArrowArray = GenericListArray<i32>;

    fn into_arrow(self) -> Self::ArrowArray {
        let linestring_arr: LineStringArray = self.into();
        linestring_arr.into_arrow()
    }
}

impl Default for LineStringBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl From<LineStringBuilder> for LineStringArray {
    fn from(mut other: LineStringBuilder) -> Self {
        let validity = other.validity.finish();
        Self::new(
            other.coords.into(),
            other.geom_offsets.into(),
            validity,
            other.metadata,
        )
    }
}

impl From<&[geo::LineString]> for LineStringBuilder {
    fn from(geoms: &[geo::LineString]) -> Self {
        Self::from_line_strings(geoms, Default::default())
    }
}

impl From<Vec<Option<geo::LineString>>> for LineStringBuilder {
    fn from(geoms: Vec<Option<geo::LineString>>) -> Self {
        Self::from_nullable_line_strings(&geoms, Default::default())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::test::linestring::{ls0, ls1};

    #[test]
    fn mixed_family_rejected() {
        let mut builder = LineStringBuilder::new();
        let point = geo::Geometry::Point(geo::Point::new(0., 0.));
        assert!(builder.push_geometry(Some(&point)).is_err());
    }

    #[test]
    fn capacity_counting_matches_pushes() {
        let geoms = vec![ls0(), ls1()];
        let capacity = LineStringCapacity::from_line_strings(geoms.iter().map(Some));
        assert_eq!(capacity.geom_capacity(), 2);
        assert_eq!(capacity.coord_capacity(), 4);

        let builder = LineStringBuilder::from_line_strings(&geoms, Default::default());
        assert_eq!(builder.len(), capacity.geom_capacity());
    }
}
