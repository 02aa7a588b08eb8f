//! The closed set of geometry encodings supported by this crate.

use std::collections::HashMap;
use std::sync::Arc;

use arrow_schema::{DataType, Field};

use crate::array::metadata::ArrayMetadata;
use crate::error::{GeoFeatherError, Result};

/// The geometry family of an encoded array.
///
/// One array always holds a single family; mixed collections are unsupported and
/// rejected at build time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeoDataType {
    Point,
    LineString,
    Polygon,
    MultiPoint,
    MultiPolygon,
}

pub(crate) fn coord_field() -> Arc<Field> {
    Field::new("xy", DataType::Float64, false).into()
}

pub(crate) fn coord_data_type() -> DataType {
    DataType::FixedSizeList(coord_field(), 2)
}

impl GeoDataType {
    /// The `ARROW:extension:name` identifying this encoding.
    pub fn extension_name(&self) -> &'static str {
        use GeoDataType::*;
        match self {
            Point => "geoarrow.point",
            LineString => "geoarrow.linestring",
            Polygon => "geoarrow.polygon",
            MultiPoint => "geoarrow.multipoint",
            MultiPolygon => "geoarrow.multipolygon",
        }
    }

    /// The Arrow storage type of this encoding: a fixed-size list of interleaved xy
    /// coordinates, wrapped in one `List` level per level of nesting.
    pub fn to_data_type(&self) -> DataType {
        use GeoDataType::*;
        let coords = coord_data_type();
        match self {
            Point => coords,
            LineString => DataType::List(Field::new("vertices", coords, false).into()),
            MultiPoint => DataType::List(Field::new("points", coords, false).into()),
            Polygon => {
                let vertices = Field::new("vertices", coords, false);
                DataType::List(Field::new_list("rings", vertices, false).into())
            }
            MultiPolygon => {
                let vertices = Field::new("vertices", coords, false);
                let rings = Field::new_list("rings", vertices, false);
                DataType::List(Field::new_list("polygons", rings, false).into())
            }
        }
    }

    /// An Arrow [Field] with the extension name (and extension metadata, when
    /// non-empty) attached.
    pub fn to_field_with_metadata(
        &self,
        name: &str,
        nullable: bool,
        array_metadata: &ArrayMetadata,
    ) -> Field {
        let mut metadata = HashMap::with_capacity(2);
        metadata.insert(
            "ARROW:extension:name".to_string(),
            self.extension_name().to_string(),
        );
        if array_metadata.should_serialize() {
            metadata.insert(
                "ARROW:extension:metadata".to_string(),
                serde_json::to_string(array_metadata).unwrap(),
            );
        }
        Field::new(name, self.to_data_type(), nullable).with_metadata(metadata)
    }
}

impl TryFrom<&str> for GeoDataType {
    type Error = GeoFeatherError;

    fn try_from(value: &str) -> Result<Self> {
        use GeoDataType::*;
        match value {
            "geoarrow.point" => Ok(Point),
            "geoarrow.linestring" => Ok(LineString),
            "geoarrow.polygon" => Ok(Polygon),
            "geoarrow.multipoint" => Ok(MultiPoint),
            "geoarrow.multipolygon" => Ok(MultiPolygon),
            name => Err(GeoFeatherError::General(format!(
                "Unknown geoarrow extension name {name}"
            ))),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn extension_name_round_trip() {
        let types = [
            GeoDataType::Point,
            GeoDataType::LineString,
            GeoDataType::Polygon,
            GeoDataType::MultiPoint,
            GeoDataType::MultiPolygon,
        ];
        for t in types {
            assert_eq!(GeoDataType::try_from(t.extension_name()).unwrap(), t);
        }
    }

    #[test]
    fn nesting_depth() {
        fn depth(dt: &DataType) -> usize {
            match dt {
                DataType::List(inner) => 1 + depth(inner.data_type()),
                _ => 0,
            }
        }

        assert_eq!(depth(&GeoDataType::Point.to_data_type()), 0);
        assert_eq!(depth(&GeoDataType::LineString.to_data_type()), 1);
        assert_eq!(depth(&GeoDataType::Polygon.to_data_type()), 2);
        assert_eq!(depth(&GeoDataType::MultiPolygon.to_data_type()), 3);
    }
}
