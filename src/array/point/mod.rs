//! Helpers for using Point GeoArrow data

pub use array::PointArray;
pub use builder::PointBuilder;

mod array;
mod builder;
