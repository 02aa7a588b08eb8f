//! Read GeoJSON FeatureCollections into GeoTables.

pub use reader::read_geojson;

mod reader;
