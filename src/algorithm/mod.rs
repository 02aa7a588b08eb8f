//! Vectorized operations over Arrow columns.

pub mod colormap;
