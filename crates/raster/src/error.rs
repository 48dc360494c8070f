use thiserror::Error;

/// The rasterizer's result type.
pub type RasterResult<T> = Result<T, RasterError>;

/// An input the rasterizer refuses to work with.
#[derive(Error, Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum UnsupportedParameter {
    #[error("Position is not a finite number")]
    PositionIsNaN,
    #[error("Tolerance threshold is not a number")]
    ToleranceIsNaN,
    #[error("Line width is not a finite number")]
    InvalidLineWidth,
}

/// The rasterizer's error enumeration.
#[derive(Error, Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum RasterError {
    #[error("Unsupported parameter: {0}")]
    UnsupportedParameter(#[from] UnsupportedParameter),
    /// Spans handed to `Rle::from_spans` are empty, unsorted or overlapping.
    #[error("Span #{index} is empty, overlaps its predecessor or is out of order")]
    InvalidSpans { index: usize },
}
