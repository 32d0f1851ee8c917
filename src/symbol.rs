//! Barcode types and scan results

use std::fmt::{self, Display};
use std::ops::{BitOr, BitOrAssign};
use std::str::FromStr;

use crate::{Error, Result};

/// Barcode symbology of a decoded result
///
/// Discriminants are single bits so that requests can combine several
/// types into a [`CodeTypes`] set with `|`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CodeType {
    Ean8 = 1 << 0,
    Ean13 = 1 << 1,
    Upca = 1 << 2,
    /// Declared for requests; never produced by the EAN decoder
    Upce = 1 << 3,
    Code128 = 1 << 4,
    Gs1_128 = 1 << 5,
    Code39 = 1 << 6,
    Code39Mod43 = 1 << 7,
    Code39Ext = 1 << 8,
    Code25i = 1 << 9,
}

impl CodeType {
    pub const ALL: [Self; 10] = [
        Self::Ean8,
        Self::Ean13,
        Self::Upca,
        Self::Upce,
        Self::Code128,
        Self::Gs1_128,
        Self::Code39,
        Self::Code39Mod43,
        Self::Code39Ext,
        Self::Code25i,
    ];

    #[inline]
    pub(crate) fn bit(self) -> u32 {
        self as u32
    }

    /// Short lowercase name, as accepted by [`FromStr`]
    pub fn name(self) -> &'static str {
        match self {
            Self::Ean8 => "ean8",
            Self::Ean13 => "ean13",
            Self::Upca => "upca",
            Self::Upce => "upce",
            Self::Code128 => "code128",
            Self::Gs1_128 => "gs1-128",
            Self::Code39 => "code39",
            Self::Code39Mod43 => "code39-mod43",
            Self::Code39Ext => "code39-ext",
            Self::Code25i => "code25i",
        }
    }
}

impl Display for CodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CodeType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let name = s.trim().to_ascii_lowercase().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|t| t.name() == name)
            .or(match name.as_str() {
                "upc-a" => Some(Self::Upca),
                "upc-e" => Some(Self::Upce),
                "ean-8" => Some(Self::Ean8),
                "ean-13" => Some(Self::Ean13),
                "i25" | "itf" => Some(Self::Code25i),
                _ => None,
            })
            .ok_or_else(|| Error::UnknownCodeType(s.to_string()))
    }
}

/// A set of [`CodeType`]s
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CodeTypes(u32);

impl CodeTypes {
    pub const NONE: Self = Self(0);
    pub const EAN: Self = Self(
        CodeType::Ean8 as u32 | CodeType::Ean13 as u32 | CodeType::Upca as u32 | CodeType::Upce as u32,
    );
    pub const CODE128: Self = Self(CodeType::Code128 as u32 | CodeType::Gs1_128 as u32);
    pub const CODE39: Self = Self(
        CodeType::Code39 as u32 | CodeType::Code39Mod43 as u32 | CodeType::Code39Ext as u32,
    );
    pub const CODE25I: Self = Self(CodeType::Code25i as u32);
    pub const ANY: Self = Self(Self::EAN.0 | Self::CODE128.0 | Self::CODE39.0 | Self::CODE25I.0);
    /// Every type except the Code 39 refinements, which reinterpret plain
    /// Code 39 data and are only enabled by name
    pub const DEFAULT: Self =
        Self(Self::ANY.0 & !(CodeType::Code39Mod43 as u32 | CodeType::Code39Ext as u32));

    #[inline]
    pub fn contains(self, code_type: CodeType) -> bool {
        self.0 & code_type.bit() != 0
    }

    /// Whether any member of `other` is also in `self`
    #[inline]
    pub fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    #[inline]
    pub fn insert(&mut self, code_type: CodeType) {
        self.0 |= code_type.bit();
    }

    #[inline]
    pub fn remove(&mut self, code_type: CodeType) {
        self.0 &= !code_type.bit();
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn iter(self) -> impl Iterator<Item = CodeType> {
        CodeType::ALL.into_iter().filter(move |&t| self.contains(t))
    }

    /// Parse a comma separated list of type names or family names
    ///
    /// Families: `any` (the [`DEFAULT`](Self::DEFAULT) set), `ean` (EAN/UPC)
    /// and `code128` with `gs1-128`. `code39` is plain Code 39; the
    /// `code39-mod43` and `code39-ext` refinements must be named.
    pub fn parse_list(list: &str) -> Result<Self> {
        let mut set = Self::NONE;
        for name in list.split(',').filter(|s| !s.trim().is_empty()) {
            set |= match name.trim().to_ascii_lowercase().as_str() {
                "any" | "all" => Self::DEFAULT,
                "ean" | "upc" => Self::EAN,
                "code128" => Self::CODE128,
                _ => Self::from(name.parse::<CodeType>()?),
            };
        }
        if set.is_empty() {
            return Err(Error::UnknownCodeType(list.to_string()));
        }
        Ok(set)
    }
}

impl From<CodeType> for CodeTypes {
    fn from(code_type: CodeType) -> Self {
        Self(code_type.bit())
    }
}

impl BitOr for CodeType {
    type Output = CodeTypes;

    fn bitor(self, rhs: Self) -> CodeTypes {
        CodeTypes(self.bit() | rhs.bit())
    }
}

impl BitOr<CodeType> for CodeTypes {
    type Output = Self;

    fn bitor(self, rhs: CodeType) -> Self {
        Self(self.0 | rhs.bit())
    }
}

impl BitOr for CodeTypes {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for CodeTypes {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitOrAssign<CodeType> for CodeTypes {
    fn bitor_assign(&mut self, rhs: CodeType) {
        self.insert(rhs);
    }
}

/// A decoded barcode
///
/// `x`/`y` is the image position where the first bar of the symbol starts
/// on the scan line that decoded it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ScannerResult {
    pub code_type: CodeType,
    pub text: String,
    pub x: u32,
    pub y: u32,
}

impl ScannerResult {
    /// Identity used to collapse repeated reads of the same barcode
    pub fn key(&self) -> (CodeType, &str) {
        (self.code_type, &self.text)
    }
}

impl Display for ScannerResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.code_type, self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for t in CodeType::ALL {
            assert_eq!(t.name().parse::<CodeType>().unwrap(), t);
        }
        assert_eq!("GS1_128".parse::<CodeType>().unwrap(), CodeType::Gs1_128);
        assert_eq!("UPC-A".parse::<CodeType>().unwrap(), CodeType::Upca);
        assert!("qr".parse::<CodeType>().is_err());
    }

    #[test]
    fn sets_combine_with_or() {
        let set = CodeType::Ean13 | CodeType::Code39;
        assert!(set.contains(CodeType::Ean13));
        assert!(set.contains(CodeType::Code39));
        assert!(!set.contains(CodeType::Code128));
        assert!(set.intersects(CodeTypes::EAN));
        assert!(!set.intersects(CodeTypes::CODE25I));
        assert_eq!(set.iter().count(), 2);
    }

    #[test]
    fn parse_families() {
        let set = CodeTypes::parse_list("ean,code128").unwrap();
        assert_eq!(set, CodeTypes::EAN | CodeTypes::CODE128);
        assert_eq!(CodeTypes::parse_list("any").unwrap(), CodeTypes::DEFAULT);
        assert!(!CodeTypes::DEFAULT.contains(CodeType::Code39Ext));
        assert!(CodeTypes::DEFAULT.contains(CodeType::Code25i));
        assert_eq!(
            CodeTypes::parse_list("code39-mod43").unwrap(),
            CodeTypes::from(CodeType::Code39Mod43)
        );
    }

    #[test]
    fn code39_family_excludes_refinements() {
        let set = CodeTypes::parse_list("code39").unwrap();
        assert_eq!(set, CodeTypes::from(CodeType::Code39));
        assert!(!set.contains(CodeType::Code39Mod43));

        let set = CodeTypes::parse_list("code39,code39-ext").unwrap();
        assert!(set.contains(CodeType::Code39Ext));
        assert!(!set.contains(CodeType::Code39Mod43));
        assert!(CodeTypes::parse_list("aztec").is_err());
    }

    #[test]
    fn results_order_by_type_then_text() {
        let a = ScannerResult {
            code_type: CodeType::Ean13,
            text: "2".into(),
            x: 9,
            y: 9,
        };
        let b = ScannerResult {
            code_type: CodeType::Code39,
            text: "1".into(),
            x: 0,
            y: 0,
        };
        assert!(a.key() < b.key());
        assert_eq!(b.to_string(), "code39:1");
    }
}
