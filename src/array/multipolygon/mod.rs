//! Helpers for using MultiPolygon GeoArrow data

pub use array::MultiPolygonArray;
pub use builder::MultiPolygonBuilder;
pub use capacity::MultiPolygonCapacity;

mod array;
mod builder;
mod capacity;
