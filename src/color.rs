//! Bar/space colors
//!
//! This module provides color definitions used during 1D barcode decoding.

/// Color of element: bar or space
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    Space = 0, // light area or space between bars
    Bar = 1,   // dark area or colored bar segment
}

impl Color {
    /// Whether this is a dark element
    #[inline]
    pub fn is_bar(self) -> bool {
        self == Self::Bar
    }

    /// The opposite color
    #[inline]
    pub fn flip(self) -> Self {
        match self {
            Self::Space => Self::Bar,
            Self::Bar => Self::Space,
        }
    }

    /// Classify a luminance sample against a binarization threshold
    #[inline]
    pub(crate) fn classify(luminance: u8, threshold: u8) -> Self {
        if luminance < threshold {
            Self::Bar
        } else {
            Self::Space
        }
    }

    /// Whichever of two luminances is more typical of this color: the darker
    /// for bars, the brighter for spaces
    #[inline]
    pub(crate) fn purest(self, a: u8, b: u8) -> u8 {
        match self {
            Self::Bar => a.min(b),
            Self::Space => a.max(b),
        }
    }
}

impl From<bool> for Color {
    fn from(black: bool) -> Self {
        if black {
            Self::Bar
        } else {
            Self::Space
        }
    }
}

impl From<Color> for bool {
    fn from(color: Color) -> Self {
        color.is_bar()
    }
}
