//! Type-safe scan configuration
//!
//! Symbologies are named by zero-sized marker types, so options that only
//! make sense for some of them are rejected at compile time.
//!
//! # Examples
//!
//! ```
//! use barline::config::*;
//! use barline::{Direction, ScanConfig};
//!
//! let config = ScanConfig::new()
//!     .disable_all()
//!     .enable(Ean13)
//!     .enable(Code39)
//!     .set_length_limits(Code39, 4, 20)
//!     .directions(Direction::LeftRight | Direction::RightLeft)
//!     .threshold(140);
//! assert!(config.is_enabled(barline::CodeType::Code39));
//! ```
//!
//! EAN-13 has a fixed length, so this does not compile:
//!
//! ```compile_fail
//! # use barline::config::*;
//! # use barline::ScanConfig;
//! ScanConfig::new().set_length_limits(Ean13, 1, 20);
//! ```

use crate::{CodeType, CodeTypes, Directions};
use std::collections::HashMap;

pub(crate) mod internal;
pub mod symbologies;

pub use symbologies::*;

// ============================================================================
// Capability Traits
// ============================================================================

/// Base trait that all symbology markers implement
pub trait Symbology: Sized {
    /// The corresponding [`CodeType`]
    const TYPE: CodeType;

    /// Human-readable name
    const NAME: &'static str;
}

/// Marker trait for symbologies that support variable length limits
pub trait SupportsLengthLimits: Symbology {}

// ============================================================================
// User-Facing Configuration Builder
// ============================================================================

/// Upper bound for any length limit
pub const MAX_LENGTH: u32 = 256;

/// Configuration builder for [`BarcodeScanner`](crate::BarcodeScanner)
#[derive(Debug, Clone)]
pub struct ScanConfig {
    pub(crate) enabled: CodeTypes,
    pub(crate) directions: Directions,
    pub(crate) threshold: u8,
    pub(crate) concurrent_lines: u32,
    pub(crate) line_skip: u32,
    pub(crate) min_quiet: u32,

    /// Length limits: (min, max) in decoded characters
    pub(crate) length_limits: HashMap<CodeType, (u32, u32)>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl ScanConfig {
    /// Create a configuration with the default settings
    ///
    /// - every symbology is requested except the Code 39 refinements
    ///   ([`Code39Mod43`], [`Code39Ext`]), which would otherwise reinterpret
    ///   plain Code 39 data
    /// - all four directions are scanned
    /// - initial threshold 150
    /// - 4 concurrent lines averaged per scan line, one scan line every 8 rows
    /// - quiet zones must be at least 7 pixels
    pub fn new() -> Self {
        let mut length_limits = HashMap::new();
        for sym in CodeTypes::CODE39.iter().chain(CodeTypes::CODE128.iter()) {
            length_limits.insert(sym, (1, MAX_LENGTH));
        }
        length_limits.insert(CodeType::Code25i, (4, MAX_LENGTH));

        Self {
            enabled: CodeTypes::DEFAULT,
            directions: Directions::ALL,
            threshold: 150,
            concurrent_lines: 4,
            line_skip: 8,
            min_quiet: 7,
            length_limits,
        }
    }

    // ========================================================================
    // Per-Symbology Configuration
    // ========================================================================

    /// Enable a symbology
    pub fn enable<S: Symbology>(mut self, _: S) -> Self {
        self.enabled.insert(S::TYPE);
        self
    }

    /// Disable a symbology
    pub fn disable<S: Symbology>(mut self, _: S) -> Self {
        self.enabled.remove(S::TYPE);
        self
    }

    /// Disable all symbologies
    ///
    /// ```
    /// use barline::config::*;
    ///
    /// let config = barline::ScanConfig::new().disable_all().enable(Code128);
    /// assert!(!config.is_enabled(barline::CodeType::Ean13));
    /// ```
    pub fn disable_all(mut self) -> Self {
        self.enabled = CodeTypes::NONE;
        self
    }

    /// Replace the requested set of symbologies
    pub fn types(mut self, types: impl Into<CodeTypes>) -> Self {
        self.enabled = types.into();
        self
    }

    /// Check if a symbology is enabled
    pub fn is_enabled(&self, sym: CodeType) -> bool {
        self.enabled.contains(sym)
    }

    /// Set minimum and maximum decoded length
    ///
    /// Only valid for variable-length symbologies.
    pub fn set_length_limits<S: Symbology + SupportsLengthLimits>(
        mut self,
        _: S,
        min: u32,
        max: u32,
    ) -> Self {
        assert!(min <= max, "{}: min length must be <= max length", S::NAME);
        assert!(max <= MAX_LENGTH, "{}: max length must be <= {MAX_LENGTH}", S::NAME);
        self.length_limits.insert(S::TYPE, (min, max));
        self
    }

    // ========================================================================
    // Scanner Configuration
    // ========================================================================

    /// Set the scan directions
    pub fn directions(mut self, directions: impl Into<Directions>) -> Self {
        self.directions = directions.into();
        self
    }

    /// Set the initial binarization threshold
    ///
    /// Pixels darker than the threshold are bars. The tokenizer adapts it
    /// along each line.
    pub fn threshold(mut self, threshold: u8) -> Self {
        self.threshold = threshold;
        self
    }

    /// Set how many adjacent raster lines are averaged into one scan line
    pub fn concurrent_lines(mut self, lines: u32) -> Self {
        assert!(lines > 0, "concurrent lines must be > 0");
        self.concurrent_lines = lines;
        self
    }

    /// Set the stride between scan lines
    pub fn line_skip(mut self, skip: u32) -> Self {
        assert!(skip > 0, "line skip must be > 0");
        self.line_skip = skip;
        self
    }

    /// Set the minimum quiet zone width in pixels
    pub fn min_quiet(mut self, pixels: u32) -> Self {
        self.min_quiet = pixels.max(1);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Direction;

    #[test]
    fn test_default_config() {
        let config = ScanConfig::new();
        for sym in CodeType::ALL {
            let refinement = matches!(sym, CodeType::Code39Mod43 | CodeType::Code39Ext);
            assert_eq!(config.is_enabled(sym), !refinement);
        }
        assert_eq!(config.directions, Directions::ALL);
        assert_eq!(config.threshold, 150);
        assert_eq!(config.concurrent_lines, 4);
        assert_eq!(config.line_skip, 8);
        assert_eq!(config.min_quiet, 7);
        assert_eq!(config.length_limits.get(&CodeType::Code25i), Some(&(4, 256)));
        assert_eq!(config.length_limits.get(&CodeType::Code39Ext), Some(&(1, 256)));
    }

    #[test]
    fn test_builder_pattern() {
        let config = ScanConfig::new()
            .disable(Code39)
            .directions(Direction::TopDown)
            .threshold(90)
            .line_skip(2);

        assert!(config.is_enabled(CodeType::Ean13));
        assert!(!config.is_enabled(CodeType::Code39));
        assert!(config.is_enabled(CodeType::Code25i));
        assert!(config.directions.contains(Direction::TopDown));
        assert!(!config.directions.contains(Direction::LeftRight));
        assert_eq!(config.threshold, 90);
        assert_eq!(config.line_skip, 2);
    }

    #[test]
    fn test_types_replaces_set() {
        let config = ScanConfig::new().types(CodeTypes::EAN | CodeType::Code128);
        assert!(config.is_enabled(CodeType::Upca));
        assert!(config.is_enabled(CodeType::Code128));
        assert!(!config.is_enabled(CodeType::Gs1_128));
        assert!(!config.is_enabled(CodeType::Code25i));
    }

    #[test]
    fn test_type_safe_length_limits() {
        let config = ScanConfig::new()
            .set_length_limits(Code39, 5, 20)
            .set_length_limits(Code128, 1, 50)
            .set_length_limits(Code25i, 6, 30);

        assert_eq!(config.length_limits.get(&CodeType::Code39), Some(&(5, 20)));
        assert_eq!(config.length_limits.get(&CodeType::Code128), Some(&(1, 50)));
        assert_eq!(config.length_limits.get(&CodeType::Code25i), Some(&(6, 30)));
    }

    #[test]
    #[should_panic(expected = "Code 39: min length")]
    fn test_inverted_limits_panic() {
        let _ = ScanConfig::new().set_length_limits(Code39, 9, 3);
    }

    #[test]
    #[should_panic(expected = "Interleaved 2 of 5: max length must be <= 256")]
    fn test_oversized_limit_names_symbology() {
        let _ = ScanConfig::new().set_length_limits(Code25i, 4, 300);
    }

    #[test]
    fn test_config_to_state_conversion() {
        let config = ScanConfig::new()
            .disable_all()
            .enable(Ean13)
            .set_length_limits(Code128, 2, 8)
            .concurrent_lines(2);

        let state: internal::DecoderState = (&config).into();

        assert!(state.is_enabled(CodeType::Ean13));
        assert!(state.any_enabled(CodeTypes::EAN));
        assert!(!state.any_enabled(CodeTypes::CODE39));
        assert!(state.length_ok(CodeType::Code128, 2));
        assert!(!state.length_ok(CodeType::Code128, 9));
        assert_eq!(state.scanner.concurrent_lines, 2);
    }
}
