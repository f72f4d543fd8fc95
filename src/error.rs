use std::fmt::Debug;
use thiserror::Error;

/// Enum with all errors in this crate.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KdIndexError {
    /// A flat coordinate buffer did not hold a whole number of points.
    #[error("Coordinate buffer of length {len} is not a multiple of {dims} dimensions.")]
    InvalidCoordinateLength { len: usize, dims: usize },

    /// A coordinate could not be ordered (floating point NaN).
    #[error("Coordinate on axis {axis} of item {index} is NaN.")]
    NanCoordinate { index: usize, axis: usize },
}

pub type Result<T> = std::result::Result<T, KdIndexError>;
