//! Symbology decoder implementations

use crate::decoder::SymbologyDecoder;

#[cfg(feature = "code128")]
pub(crate) mod code128;
#[cfg(feature = "code39")]
pub(crate) mod code39;
#[cfg(feature = "ean")]
pub(crate) mod ean;
#[cfg(feature = "i25")]
pub(crate) mod i25;

/// Decoders compiled into this build, in the order they are tried at each
/// candidate position
pub(crate) fn registry() -> Vec<&'static dyn SymbologyDecoder> {
    let mut decoders: Vec<&'static dyn SymbologyDecoder> = Vec::with_capacity(4);
    #[cfg(feature = "code39")]
    decoders.push(&code39::Code39);
    #[cfg(feature = "i25")]
    decoders.push(&i25::I25);
    #[cfg(feature = "code128")]
    decoders.push(&code128::Code128);
    #[cfg(feature = "ean")]
    decoders.push(&ean::Ean);
    decoders
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CodeTypes;

    #[test]
    #[cfg(all(feature = "ean", feature = "code128", feature = "code39", feature = "i25"))]
    fn test_priority_order() {
        let families: Vec<CodeTypes> = registry().iter().map(|d| d.family()).collect();
        assert_eq!(
            families,
            [
                CodeTypes::CODE39,
                CodeTypes::CODE25I,
                CodeTypes::CODE128,
                CodeTypes::EAN
            ]
        );
    }
}
