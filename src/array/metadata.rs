//! Metadata contained within a GeoArrow geometry array.
//!
//! This metadata is [defined by the GeoArrow specification](https://geoarrow.org/extension-types).

use arrow_schema::Field;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::GeoFeatherError;

/// If present, instructs consumers that edges follow a spherical path rather than a
/// planar one. If this value is omitted, edges will be interpreted as planar.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Edges {
    #[serde(rename = "spherical")]
    Spherical,
}

/// A GeoArrow metadata object following the extension metadata [defined by the GeoArrow
/// specification](https://geoarrow.org/extension-types).
///
/// This is serialized to JSON on the geometry field's `ARROW:extension:metadata` key
/// when non-empty, and deserialized from the same key when importing an Arrow array.
#[derive(Default, Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ArrayMetadata {
    /// A JSON object describing the coordinate reference system (CRS) using PROJJSON.
    /// Omitted if the producer does not have any information about the CRS. Axis order
    /// is always (longitude, latitude) / (easting, northing) regardless of the axis
    /// order encoded in the CRS specification.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crs: Option<Value>,

    /// If present, instructs consumers that edges follow a spherical path rather than a
    /// planar one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edges: Option<Edges>,
}

impl ArrayMetadata {
    /// Decide whether this [ArrayMetadata] should be written to Arrow field metadata
    /// (aka if it is non-empty).
    pub fn should_serialize(&self) -> bool {
        self.crs.is_some() || self.edges.is_some()
    }
}

impl TryFrom<&Field> for ArrayMetadata {
    type Error = GeoFeatherError;

    fn try_from(value: &Field) -> Result<Self, Self::Error> {
        if let Some(ext_meta) = value.metadata().get("ARROW:extension:metadata") {
            Ok(serde_json::from_str(ext_meta)?)
        } else {
            Ok(Default::default())
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn empty_metadata_not_serialized() {
        assert!(!ArrayMetadata::default().should_serialize());
    }

    #[test]
    fn spherical_edges_round_trip() {
        let meta = ArrayMetadata {
            crs: None,
            edges: Some(Edges::Spherical),
        };
        let json = serde_json::to_string(&meta).unwrap();
        assert_eq!(json, r#"{"edges":"spherical"}"#);
        let back: ArrayMetadata = serde_json::from_str(&json).unwrap();
        assert_eq!(back, meta);
    }
}
