//! Parse columns of WKT strings into geometries.

use arrow_array::cast::AsArray;
use arrow_array::{Array, StringArray};
use wkt::TryFromWkt;

use crate::error::{GeoFeatherError, Result};

/// Parse a single WKT string.
pub fn parse_wkt_str(value: &str) -> Result<geo::Geometry> {
    geo::Geometry::try_from_wkt_str(value).map_err(|err| GeoFeatherError::Wkt(err.to_string()))
}

/// Parse a `Utf8` column of WKT strings, preserving nulls.
///
/// Feed the output to [`crate::array::from_geometries`] to build a geometry array.
pub fn parse_wkt(array: &StringArray) -> Result<Vec<Option<geo::Geometry>>> {
    array
        .iter()
        .map(|value| value.map(parse_wkt_str).transpose())
        .collect()
}

/// [`parse_wkt`] for a dynamically typed column.
pub fn parse_wkt_column(array: &dyn Array) -> Result<Vec<Option<geo::Geometry>>> {
    let array = array
        .as_string_opt::<i32>()
        .ok_or(GeoFeatherError::General(format!(
            "expected a Utf8 column of WKT strings, got {:?}",
            array.data_type()
        )))?;
    parse_wkt(array)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parses_point_and_polygon() {
        let geoms = parse_wkt(&StringArray::from(vec![
            Some("POINT(1 2)"),
            None,
            Some("POLYGON((0 0,1 0,1 1,0 0))"),
        ]))
        .unwrap();

        assert_eq!(
            geoms[0],
            Some(geo::Geometry::Point(geo::Point::new(1.0, 2.0)))
        );
        assert_eq!(geoms[1], None);
        assert!(matches!(geoms[2], Some(geo::Geometry::Polygon(_))));
    }

    #[test]
    fn invalid_wkt_rejected() {
        assert!(parse_wkt_str("POINT(oops)").is_err());
    }

    #[test]
    fn non_utf8_column_rejected() {
        let ints = arrow_array::Int64Array::from(vec![1, 2]);
        assert!(parse_wkt_column(&ints).is_err());
    }
}
