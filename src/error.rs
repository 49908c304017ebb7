//! Error types for tile decoding, grid assembly and viewshed computation

use std::fmt;

/// Errors raised while decoding a single elevation tile
///
/// A decode failure is fatal for that tile only. The assembler recovers by
/// treating the tile as absent, so these usually surface as log warnings.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodeError {
    /// File length does not match `side² * 2` bytes
    SizeMismatch {
        /// Expected byte length
        expected: usize,
        /// Actual byte length
        actual: usize,
    },
    /// Filename does not follow the `{N|S}dd{E|W}ddd.hgt` convention
    InvalidTileName(String),
    /// The file could not be read
    Io(String),
    /// The resolution has no samples per degree
    InvalidResolution(u32),
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::SizeMismatch { expected, actual } => write!(
                f,
                "tile size mismatch: expected {} bytes, got {}",
                expected, actual
            ),
            DecodeError::InvalidTileName(name) => write!(f, "invalid tile name: {}", name),
            DecodeError::Io(msg) => write!(f, "tile i/o error: {}", msg),
            DecodeError::InvalidResolution(r) => {
                write!(f, "invalid tile resolution: {} samples per degree", r)
            }
        }
    }
}

impl std::error::Error for DecodeError {}

impl From<std::io::Error> for DecodeError {
    fn from(err: std::io::Error) -> Self {
        DecodeError::Io(err.to_string())
    }
}

/// Errors that can occur while assembling grids or computing viewsheds
#[derive(Debug, Clone, PartialEq)]
pub enum ViewshedError {
    /// A tile could not be decoded
    Decode(DecodeError),
    /// Configuration validation failed
    InvalidConfig(String),
    /// Bounding box is inverted, empty or degenerate
    InvalidBoundingBox(String),
    /// Region crosses the antimeridian or a pole
    UnsupportedRegion(String),
    /// Quadrant assignment cannot be mapped to a perimeter arc
    InvalidPartition {
        /// Requested number of quadrants
        number_of_quadrants: u8,
        /// Requested quadrant (1-based)
        which_quadrant: u8,
    },
    /// Observer is outside the height field, on a void sample, or has no radius
    InvalidObserver(String),
    /// Two visibility grids of different shape were combined
    GridMismatch {
        /// Side length of the receiving grid
        expected: usize,
        /// Side length of the incoming grid
        actual: usize,
    },
    /// A merged result was requested before every quadrant reported
    IncompleteMerge {
        /// Partial grids received so far
        received: usize,
        /// Partial grids required
        expected: usize,
    },
    /// The same quadrant reported twice
    DuplicateQuadrant(u8),
}

impl fmt::Display for ViewshedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewshedError::Decode(err) => write!(f, "decode failed: {}", err),
            ViewshedError::InvalidConfig(msg) => write!(f, "invalid configuration: {}", msg),
            ViewshedError::InvalidBoundingBox(msg) => write!(f, "invalid bounding box: {}", msg),
            ViewshedError::UnsupportedRegion(msg) => write!(f, "unsupported region: {}", msg),
            ViewshedError::InvalidPartition {
                number_of_quadrants,
                which_quadrant,
            } => write!(
                f,
                "invalid partition: quadrant {} of {} (quadrant count must be 1, 2 or 4)",
                which_quadrant, number_of_quadrants
            ),
            ViewshedError::InvalidObserver(msg) => write!(f, "invalid observer: {}", msg),
            ViewshedError::GridMismatch { expected, actual } => write!(
                f,
                "visibility grid mismatch: expected side {}, got {}",
                expected, actual
            ),
            ViewshedError::IncompleteMerge { received, expected } => write!(
                f,
                "incomplete merge: {} of {} partial results received",
                received, expected
            ),
            ViewshedError::DuplicateQuadrant(q) => {
                write!(f, "quadrant {} already reported", q)
            }
        }
    }
}

impl std::error::Error for ViewshedError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ViewshedError::Decode(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DecodeError> for ViewshedError {
    fn from(err: DecodeError) -> Self {
        ViewshedError::Decode(err)
    }
}

/// Result type alias for viewshed operations
pub type Result<T> = std::result::Result<T, ViewshedError>;
