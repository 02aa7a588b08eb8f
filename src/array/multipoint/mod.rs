//! Helpers for using MultiPoint GeoArrow data

pub use array::MultiPointArray;
pub use builder::MultiPointBuilder;
pub use capacity::MultiPointCapacity;

mod array;
mod builder;
mod capacity;
