//! Helpers for using Polygon GeoArrow data

pub use array::PolygonArray;
pub use builder::PolygonBuilder;
pub use capacity::PolygonCapacity;

mod array;
mod builder;
mod capacity;
