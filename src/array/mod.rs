//! Implementations of GeoArrow geometry arrays and their builders.

pub use coord::{CoordBuffer, CoordBufferBuilder};
pub use linestring::{LineStringArray, LineStringBuilder, LineStringCapacity};
pub use metadata::{ArrayMetadata, Edges};
pub use multipoint::{MultiPointArray, MultiPointBuilder, MultiPointCapacity};
pub use multipolygon::{MultiPolygonArray, MultiPolygonBuilder, MultiPolygonCapacity};
pub use point::{PointArray, PointBuilder};
pub use polygon::{PolygonArray, PolygonBuilder, PolygonCapacity};

pub mod coord;
pub mod linestring;
pub mod metadata;
pub mod multipoint;
pub mod multipolygon;
pub mod offset_builder;
pub mod point;
pub mod polygon;
pub(crate) mod util;

use std::sync::Arc;

use arrow_array::Array;
use arrow_schema::Field;

use crate::datatypes::GeoDataType;
use crate::error::{GeoFeatherError, Result};
use crate::GeometryArrayTrait;

/// Convert an Arrow [Array] to a typed geometry array, dispatching on the
/// `ARROW:extension:name` metadata of `field`.
pub fn from_arrow_array(array: &dyn Array, field: &Field) -> Result<Arc<dyn GeometryArrayTrait>> {
    let extension_name = field
        .metadata()
        .get("ARROW:extension:name")
        .ok_or(GeoFeatherError::General(format!(
            "field '{}' is missing an ARROW:extension:name",
            field.name()
        )))?;

    let geom_arr: Arc<dyn GeometryArrayTrait> = match GeoDataType::try_from(
        extension_name.as_str(),
    )? {
        GeoDataType::Point => Arc::new(PointArray::try_from((array, field))?),
        GeoDataType::LineString => Arc::new(LineStringArray::try_from((array, field))?),
        GeoDataType::Polygon => Arc::new(PolygonArray::try_from((array, field))?),
        GeoDataType::MultiPoint => Arc::new(MultiPointArray::try_from((array, field))?),
        GeoDataType::MultiPolygon => Arc::new(MultiPolygonArray::try_from((array, field))?),
    };
    Ok(geom_arr)
}

/// Build the typed geometry array for a column of [`geo::Geometry`] values.
///
/// The family of the first non-null geometry decides the builder, and any later
/// geometry of another family is an
/// [`IncorrectGeometryType`][GeoFeatherError::IncorrectGeometryType] error. The Multi
/// builders accept their singular counterpart, so a column led by a MultiPolygon still
/// encodes plain Polygons as length-1 entries.
pub fn from_geometries(
    geoms: &[Option<geo::Geometry>],
    metadata: Arc<ArrayMetadata>,
) -> Result<Arc<dyn GeometryArrayTrait>> {
    use crate::trait_::GeometryArrayBuilder;

    let Some(first) = geoms.iter().flatten().next() else {
        return Err(GeoFeatherError::General(
            "cannot infer a geometry type from an all-null column".to_string(),
        ));
    };

    match first {
        geo::Geometry::Point(_) => {
            let mut builder = PointBuilder::with_capacity_and_options(geoms.len(), metadata);
            for geom in geoms {
                builder.push_geometry(geom.as_ref())?;
            }
            Ok(GeometryArrayBuilder::finish(builder))
        }
        geo::Geometry::LineString(_) => {
            let mut builder = LineStringBuilder::with_capacity_and_options(
                LineStringCapacity::from_line_strings(geoms.iter().map(|g| match g {
                    Some(geo::Geometry::LineString(ls)) => Some(ls),
                    _ => None,
                })),
                metadata,
            );
            for geom in geoms {
                builder.push_geometry(geom.as_ref())?;
            }
            Ok(GeometryArrayBuilder::finish(builder))
        }
        geo::Geometry::Polygon(_) => {
            let mut builder = PolygonBuilder::with_capacity_and_options(
                PolygonCapacity::from_polygons(geoms.iter().map(|g| match g {
                    Some(geo::Geometry::Polygon(p)) => Some(p),
                    _ => None,
                })),
                metadata,
            );
            for geom in geoms {
                builder.push_geometry(geom.as_ref())?;
            }
            Ok(GeometryArrayBuilder::finish(builder))
        }
        geo::Geometry::MultiPoint(_) => {
            let mut builder = MultiPointBuilder::with_capacity_and_options(
                MultiPointCapacity::from_multi_points(geoms.iter().map(|g| match g {
                    Some(geo::Geometry::MultiPoint(mp)) => Some(mp),
                    _ => None,
                })),
                metadata,
            );
            for geom in geoms {
                builder.push_geometry(geom.as_ref())?;
            }
            Ok(GeometryArrayBuilder::finish(builder))
        }
        geo::Geometry::MultiPolygon(_) => {
            let mut builder = MultiPolygonBuilder::with_capacity_and_options(
                MultiPolygonCapacity::from_multi_polygons(geoms.iter().map(|g| match g {
                    Some(geo::Geometry::MultiPolygon(mp)) => Some(mp),
                    _ => None,
                })),
                metadata,
            );
            for geom in geoms {
                builder.push_geometry(geom.as_ref())?;
            }
            Ok(GeometryArrayBuilder::finish(builder))
        }
        g => Err(GeoFeatherError::IncorrectGeometryType(format!(
            "unsupported geometry type {g:?}"
        ))),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::test::linestring::{ls0, ls1};
    use crate::test::point::{p0, p1, p2};
    use crate::trait_::GeometryArrayTrait;

    #[test]
    fn from_arrow_array_dispatches_on_extension_name() {
        let arr: PointArray = vec![p0(), p1(), p2()].into();
        let field = arr.extension_field();
        let arrow_arr = arr.to_array_ref();
        let round_tripped = from_arrow_array(arrow_arr.as_ref(), &field).unwrap();
        assert_eq!(round_tripped.data_type(), GeoDataType::Point);
        assert_eq!(round_tripped.len(), 3);
    }

    #[test]
    fn from_arrow_array_requires_extension_name() {
        let arr: PointArray = vec![p0()].into();
        let bare_field = Field::new("geometry", arr.storage_type(), true);
        let arrow_arr = arr.to_array_ref();
        assert!(from_arrow_array(arrow_arr.as_ref(), &bare_field).is_err());
    }

    #[test]
    fn from_geometries_infers_family() {
        let geoms = vec![
            Some(geo::Geometry::LineString(ls0())),
            None,
            Some(geo::Geometry::LineString(ls1())),
        ];
        let arr = from_geometries(&geoms, Default::default()).unwrap();
        assert_eq!(arr.data_type(), GeoDataType::LineString);
        assert_eq!(arr.len(), 3);
        assert_eq!(arr.null_count(), 1);
    }

    #[test]
    fn from_geometries_rejects_mixed_families() {
        let geoms = vec![
            Some(geo::Geometry::Point(p0())),
            Some(geo::Geometry::LineString(ls0())),
        ];
        assert!(from_geometries(&geoms, Default::default()).is_err());
    }
}
