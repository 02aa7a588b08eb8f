//! Shared geometry and attribute fixtures for unit tests.

pub(crate) mod linestring;
pub(crate) mod multipoint;
pub(crate) mod multipolygon;
pub(crate) mod point;
pub(crate) mod polygon;
pub(crate) mod properties;
