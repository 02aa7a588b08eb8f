//! Convert geospatial datasets into [GeoArrow](https://github.com/geoarrow/geoarrow)
//! columnar memory and write them as uncompressed Arrow IPC (Feather v2) files.
//!
//! Geometries are encoded as flat interleaved coordinate buffers plus one `i32` offset
//! level per nesting depth: Points as `FixedSizeList<Float64>[2]`, MultiPoints and
//! LineStrings with one offset level, Polygons with two, MultiPolygons with three. The
//! geometry column carries its `ARROW:extension:name` so readers can rebuild typed
//! arrays.

#![cfg_attr(docsrs, feature(doc_auto_cfg))]
#![cfg_attr(not(test), deny(unused_crate_dependencies))]

pub use trait_::GeometryArrayTrait;

pub mod algorithm;
pub mod array;
pub mod datatypes;
pub mod error;
pub mod io;
pub mod table;
#[cfg(test)]
pub(crate) mod test;
pub mod trait_;
