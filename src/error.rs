//! Defines [`GeoFeatherError`], representing all errors returned by this crate.

use arrow_schema::ArrowError;
use thiserror::Error;

/// Enum with all errors in this crate.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum GeoFeatherError {
    /// Incorrect geometry type was passed to an operation.
    ///
    /// Each array holds a single geometry family; pushing a geometry of another family
    /// is rejected rather than silently encoded.
    #[error("Incorrect geometry type passed to operation: {0}")]
    IncorrectGeometryType(String),

    /// General error.
    #[error("General error: {0}")]
    General(String),

    /// Whenever pushing to a container fails because it does not support more entries.
    ///
    /// The solution is usually to use a higher-capacity container-backing type.
    #[error("Overflow")]
    Overflow,

    /// [ArrowError]
    #[error(transparent)]
    Arrow(#[from] ArrowError),

    /// [geojson::Error]
    #[error(transparent)]
    GeoJson(#[from] Box<geojson::Error>),

    /// [parquet::errors::ParquetError]
    #[cfg(feature = "parquet")]
    #[error(transparent)]
    Parquet(#[from] parquet::errors::ParquetError),

    /// [std::io::Error]
    #[error(transparent)]
    IOError(#[from] std::io::Error),

    /// [serde_json::Error]
    #[error(transparent)]
    SerdeJsonError(#[from] serde_json::Error),

    /// WKT parse error.
    #[error("WKT error: {0}")]
    Wkt(String),
}

impl From<geojson::Error> for GeoFeatherError {
    fn from(err: geojson::Error) -> Self {
        Self::GeoJson(Box::new(err))
    }
}

/// Crate-specific result type.
pub type Result<T> = std::result::Result<T, GeoFeatherError>;

impl From<GeoFeatherError> for ArrowError {
    fn from(err: GeoFeatherError) -> Self {
        match err {
            GeoFeatherError::Arrow(err) => err,
            _ => ArrowError::ExternalError(Box::new(err)),
        }
    }
}
