//! Error types and handling

use std::fmt;

/// Errors raised while setting up a scan.
///
/// Scanning itself never fails: a line without a decodable barcode simply
/// yields no results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Pixel buffer length does not match `width * height`
    InvalidDimensions { width: u32, height: u32, len: usize },
    /// Image has no pixels
    EmptyImage,
    /// Unrecognized barcode type name
    UnknownCodeType(String),
    /// Unrecognized scan direction name
    UnknownDirection(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidDimensions { width, height, len } => write!(
                f,
                "buffer of {len} bytes does not match a {width}x{height} image"
            ),
            Self::EmptyImage => write!(f, "image is empty"),
            Self::UnknownCodeType(name) => write!(f, "unknown barcode type: {name}"),
            Self::UnknownDirection(name) => write!(f, "unknown scan direction: {name}"),
        }
    }
}

impl std::error::Error for Error {}

pub type Result<T, E = Error> = std::result::Result<T, E>;
