//! Resolved configuration handed to the scanner and decoders

use super::ScanConfig;
use crate::{CodeType, CodeTypes, Directions};
use std::collections::HashMap;

/// Immutable form of a [`ScanConfig`]
#[derive(Debug, Clone)]
pub(crate) struct DecoderState {
    enabled: CodeTypes,

    /// Length limits for variable-length symbologies
    limits: HashMap<CodeType, LengthLimits>,

    /// Scanner-level configuration
    pub(crate) scanner: ScannerConfig,
}

/// Length limit constraints for variable-length symbologies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct LengthLimits {
    pub(crate) min: u32,
    pub(crate) max: u32,
}

impl LengthLimits {
    fn contains(self, len: usize) -> bool {
        (self.min as usize..=self.max as usize).contains(&len)
    }
}

/// Scanner-level configuration
#[derive(Debug, Clone, Copy)]
pub(crate) struct ScannerConfig {
    pub(crate) directions: Directions,
    pub(crate) threshold: u8,
    pub(crate) concurrent_lines: u32,
    pub(crate) line_skip: u32,
    pub(crate) min_quiet: u32,
}

impl Default for DecoderState {
    fn default() -> Self {
        (&ScanConfig::new()).into()
    }
}

impl From<&ScanConfig> for DecoderState {
    fn from(config: &ScanConfig) -> Self {
        let limits = config
            .length_limits
            .iter()
            .map(|(&sym, &(min, max))| (sym, LengthLimits { min, max }))
            .collect();

        Self {
            enabled: config.enabled,
            limits,
            scanner: ScannerConfig {
                directions: config.directions,
                threshold: config.threshold,
                concurrent_lines: config.concurrent_lines,
                line_skip: config.line_skip,
                min_quiet: config.min_quiet,
            },
        }
    }
}

impl DecoderState {
    /// Check if a symbology is enabled
    pub(crate) fn is_enabled(&self, sym: CodeType) -> bool {
        self.enabled.contains(sym)
    }

    /// Check if any member of a family is enabled
    pub(crate) fn any_enabled(&self, family: CodeTypes) -> bool {
        self.enabled.intersects(family)
    }

    /// Whether a decoded length is acceptable for `sym`
    ///
    /// Fixed-length symbologies have no limits and always pass.
    pub(crate) fn length_ok(&self, sym: CodeType, len: usize) -> bool {
        self.limits.get(&sym).map_or(true, |l| l.contains(len))
    }
}
