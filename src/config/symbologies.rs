//! Symbology marker types and capability implementations

use super::*;

// ============================================================================
// Symbology Type Definitions
// ============================================================================

/// EAN-8 barcode
#[derive(Debug, Clone, Copy)]
pub struct Ean8;

/// EAN-13 barcode
#[derive(Debug, Clone, Copy)]
pub struct Ean13;

/// UPC-A barcode (EAN-13 with a leading zero)
#[derive(Debug, Clone, Copy)]
pub struct Upca;

/// UPC-E barcode
///
/// Accepted in requests; the scanner does not decode the zero-suppressed
/// form.
#[derive(Debug, Clone, Copy)]
pub struct Upce;

/// Code 128
#[derive(Debug, Clone, Copy)]
pub struct Code128;

/// GS1-128 (Code 128 with a leading FNC1)
#[derive(Debug, Clone, Copy)]
#[allow(non_camel_case_types)]
pub struct Gs1_128;

/// Code 39
#[derive(Debug, Clone, Copy)]
pub struct Code39;

/// Code 39 with a trailing mod-43 check character
#[derive(Debug, Clone, Copy)]
pub struct Code39Mod43;

/// Code 39 full ASCII
#[derive(Debug, Clone, Copy)]
pub struct Code39Ext;

/// Interleaved 2 of 5
#[derive(Debug, Clone, Copy)]
pub struct Code25i;

// ============================================================================
// Symbology Trait Implementations
// ============================================================================

impl Symbology for Ean8 {
    const TYPE: CodeType = CodeType::Ean8;
    const NAME: &'static str = "EAN-8";
}

impl Symbology for Ean13 {
    const TYPE: CodeType = CodeType::Ean13;
    const NAME: &'static str = "EAN-13";
}

impl Symbology for Upca {
    const TYPE: CodeType = CodeType::Upca;
    const NAME: &'static str = "UPC-A";
}

impl Symbology for Upce {
    const TYPE: CodeType = CodeType::Upce;
    const NAME: &'static str = "UPC-E";
}

impl Symbology for Code128 {
    const TYPE: CodeType = CodeType::Code128;
    const NAME: &'static str = "Code 128";
}

impl Symbology for Gs1_128 {
    const TYPE: CodeType = CodeType::Gs1_128;
    const NAME: &'static str = "GS1-128";
}

impl Symbology for Code39 {
    const TYPE: CodeType = CodeType::Code39;
    const NAME: &'static str = "Code 39";
}

impl Symbology for Code39Mod43 {
    const TYPE: CodeType = CodeType::Code39Mod43;
    const NAME: &'static str = "Code 39 mod 43";
}

impl Symbology for Code39Ext {
    const TYPE: CodeType = CodeType::Code39Ext;
    const NAME: &'static str = "Code 39 full ASCII";
}

impl Symbology for Code25i {
    const TYPE: CodeType = CodeType::Code25i;
    const NAME: &'static str = "Interleaved 2 of 5";
}

// ============================================================================
// Capability Implementations
// ============================================================================

// SupportsLengthLimits - variable-length symbologies only
impl SupportsLengthLimits for Code128 {}
impl SupportsLengthLimits for Gs1_128 {}
impl SupportsLengthLimits for Code39 {}
impl SupportsLengthLimits for Code39Mod43 {}
impl SupportsLengthLimits for Code39Ext {}
impl SupportsLengthLimits for Code25i {}
