//! Helpers for using LineString GeoArrow data

pub use array::LineStringArray;
pub use builder::LineStringBuilder;
pub use capacity::LineStringCapacity;

pub(crate) use array::check as array_check;

mod array;
mod builder;
mod capacity;
