//! Scan directions
//!
//! Every decoder reads bars strictly in forward order. Direction only
//! decides which raster axis a scan line follows and whether it is walked
//! backwards, so a barcode rotated by 90/180/270 degrees is found by the
//! same decoding code.

use std::fmt;
use std::ops::{BitOr, BitOrAssign};
use std::str::FromStr;

use crate::image::LuminanceSource;
use crate::{Error, Result};

/// Traversal order of a scan line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Direction {
    LeftRight = 1,
    RightLeft = 2,
    TopDown = 4,
    BottomUp = 8,
}

impl Direction {
    pub const ALL: [Self; 4] = [
        Self::LeftRight,
        Self::RightLeft,
        Self::TopDown,
        Self::BottomUp,
    ];

    /// Scan lines run along image columns
    #[inline]
    pub fn is_vertical(self) -> bool {
        matches!(self, Self::TopDown | Self::BottomUp)
    }

    /// Scan lines are walked from the far edge back to the origin
    #[inline]
    pub fn is_reversed(self) -> bool {
        matches!(self, Self::RightLeft | Self::BottomUp)
    }

    #[inline]
    fn bit(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::LeftRight => "left-right",
            Self::RightLeft => "right-left",
            Self::TopDown => "top-down",
            Self::BottomUp => "bottom-up",
        })
    }
}

impl FromStr for Direction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lr" | "left-right" => Ok(Self::LeftRight),
            "rl" | "right-left" => Ok(Self::RightLeft),
            "tb" | "td" | "top-down" => Ok(Self::TopDown),
            "bt" | "bu" | "bottom-up" => Ok(Self::BottomUp),
            _ => Err(Error::UnknownDirection(s.to_string())),
        }
    }
}

/// A set of scan directions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Directions(u8);

impl Directions {
    pub const NONE: Self = Self(0);
    pub const ALL: Self = Self(0x0f);
    pub const HORIZONTAL: Self = Self(0x03);
    pub const VERTICAL: Self = Self(0x0c);

    #[inline]
    pub fn contains(self, direction: Direction) -> bool {
        self.0 & direction.bit() != 0
    }

    #[inline]
    pub fn insert(&mut self, direction: Direction) {
        self.0 |= direction.bit();
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Members in fixed scan order
    pub fn iter(self) -> impl Iterator<Item = Direction> {
        Direction::ALL.into_iter().filter(move |&d| self.contains(d))
    }

    /// Parse a comma separated list such as `lr,tb` or `any`
    pub fn parse_list(list: &str) -> Result<Self> {
        let mut set = Self::NONE;
        for name in list.split(',').filter(|s| !s.trim().is_empty()) {
            match name.trim().to_ascii_lowercase().as_str() {
                "any" | "all" => set = Self::ALL,
                "horizontal" => set |= Self::HORIZONTAL,
                "vertical" => set |= Self::VERTICAL,
                _ => set |= name.parse::<Direction>()?,
            }
        }
        if set.is_empty() {
            return Err(Error::UnknownDirection(list.to_string()));
        }
        Ok(set)
    }
}

impl From<Direction> for Directions {
    fn from(direction: Direction) -> Self {
        Self(direction.bit())
    }
}

impl BitOr for Direction {
    type Output = Directions;

    fn bitor(self, rhs: Self) -> Directions {
        Directions(self.bit() | rhs.bit())
    }
}

impl BitOr<Direction> for Directions {
    type Output = Self;

    fn bitor(self, rhs: Direction) -> Self {
        Self(self.0 | rhs.bit())
    }
}

impl BitOr for Directions {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign<Direction> for Directions {
    fn bitor_assign(&mut self, rhs: Direction) {
        self.insert(rhs);
    }
}

impl BitOrAssign for Directions {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// Maps (scan line, position along line) to image coordinates for one direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Axis {
    direction: Direction,
    width: u32,
    height: u32,
}

impl Axis {
    pub(crate) fn new(direction: Direction, width: u32, height: u32) -> Self {
        Self {
            direction,
            width,
            height,
        }
    }

    pub(crate) fn direction(&self) -> Direction {
        self.direction
    }

    /// Pixels along one scan line
    #[inline]
    pub(crate) fn length(&self) -> u32 {
        if self.direction.is_vertical() {
            self.height
        } else {
            self.width
        }
    }

    /// Raster lines across the scan axis
    #[inline]
    pub(crate) fn lines(&self) -> u32 {
        if self.direction.is_vertical() {
            self.width
        } else {
            self.height
        }
    }

    /// Image coordinates of `pos` on raster line `line`
    #[inline]
    pub(crate) fn point(&self, line: u32, pos: u32) -> (u32, u32) {
        let along = if self.direction.is_reversed() {
            self.length() - 1 - pos
        } else {
            pos
        };
        if self.direction.is_vertical() {
            (line, along)
        } else {
            (along, line)
        }
    }

    /// Fill `out` with the luminance of a logical scan line
    ///
    /// A logical line averages `concurrent` adjacent raster lines starting
    /// at `line`, clamped to the image.
    pub(crate) fn sample<S: LuminanceSource + ?Sized>(
        &self,
        source: &S,
        line: u32,
        concurrent: u32,
        out: &mut Vec<u8>,
    ) {
        let last = line.saturating_add(concurrent.max(1)).min(self.lines());
        let n = (last - line).max(1);
        out.clear();
        out.extend((0..self.length()).map(|pos| {
            let sum: u32 = (line..last)
                .map(|l| {
                    let (x, y) = self.point(l, pos);
                    source.luminance(x, y) as u32
                })
                .sum();
            ((sum + n / 2) / n) as u8
        }));
    }
}
