//! Barcode scanner: finds and decodes 1-D barcodes along scan lines

use std::collections::{HashSet, VecDeque};

use tracing::{debug, trace};

use crate::config::internal::DecoderState;
use crate::decoder::{SymbologyDecoder, TokenCursor};
use crate::decoders::registry;
use crate::image::LuminanceSource;
use crate::tokenizer::{Token, Tokenizer};
use crate::{Direction, ScanConfig, ScannerResult};

/// Smallest symbol, in multiples of the first bar, that can follow a quiet zone
const MIN_SYMBOL_WIDTHS: u32 = 14;

/// Lazy iterator over the barcodes in a [`LuminanceSource`]
///
/// Each requested direction is scanned in turn, line by line. A decode is
/// attempted after every quiet zone; decoders are tried in a fixed order and
/// the first one that succeeds wins the position.
///
/// The same barcode is usually read on many lines, so results repeat;
/// [`unique`](Self::unique) collapses them by type and text.
///
/// # Example
/// ```
/// use barline::{synth, BarcodeScanner, CodeType, ScanConfig};
///
/// let widths = synth::ean_widths("4006381333931").unwrap();
/// let image = synth::render_image(&widths, 2, 10, 20);
///
/// let results = BarcodeScanner::with_config(&image, &ScanConfig::new()).unique();
/// assert_eq!(results.len(), 1);
/// assert_eq!(results[0].code_type, CodeType::Ean13);
/// assert_eq!(results[0].text, "4006381333931");
/// ```
pub struct BarcodeScanner<'a, S: ?Sized> {
    source: &'a S,
    state: DecoderState,
    decoders: Vec<&'static dyn SymbologyDecoder>,
    directions: std::vec::IntoIter<Direction>,
    tokenizer: Option<Tokenizer<'a, S>>,

    /// Tokens of the current line and the pixel offset each one starts at
    tokens: Vec<Token>,
    starts: Vec<u32>,

    pending: VecDeque<ScannerResult>,
}

impl<'a, S: LuminanceSource + ?Sized> BarcodeScanner<'a, S> {
    /// Create a scanner with the default configuration
    pub fn new(source: &'a S) -> Self {
        Self::with_config(source, &ScanConfig::new())
    }

    /// Create a scanner with custom configuration
    ///
    /// ```
    /// use barline::config::*;
    /// use barline::{BarcodeScanner, Direction, Image, ScanConfig};
    ///
    /// let config = ScanConfig::new()
    ///     .disable_all()
    ///     .enable(Ean13)
    ///     .enable(Code128)
    ///     .directions(Direction::LeftRight);
    ///
    /// let image = Image::from_gray(&[255; 64], 8, 8).unwrap();
    /// assert_eq!(BarcodeScanner::with_config(&image, &config).count(), 0);
    /// ```
    pub fn with_config(source: &'a S, config: &ScanConfig) -> Self {
        let state = DecoderState::from(config);
        let decoders = registry()
            .into_iter()
            .filter(|d| state.any_enabled(d.family()))
            .collect();
        let directions: Vec<Direction> = state.scanner.directions.iter().collect();

        Self {
            source,
            state,
            decoders,
            directions: directions.into_iter(),
            tokenizer: None,
            tokens: Vec::new(),
            starts: Vec::new(),
            pending: VecDeque::new(),
        }
    }

    /// Drain the scanner, keeping the first result for each (type, text)
    pub fn unique(self) -> Vec<ScannerResult> {
        let mut seen = HashSet::new();
        self.filter(|r| seen.insert((r.code_type, r.text.clone())))
            .collect()
    }

    /// Tokenize the next scan line, moving to the next direction as needed
    fn advance_line(&mut self) -> bool {
        loop {
            if let Some(tokenizer) = self.tokenizer.as_mut() {
                if tokenizer.next_line().is_some() {
                    self.tokens.clear();
                    self.starts.clear();
                    loop {
                        let start = tokenizer.position();
                        let Some(token) = tokenizer.next_token() else {
                            break;
                        };
                        self.starts.push(start);
                        self.tokens.push(token);
                    }
                    return true;
                }
            }

            let Some(direction) = self.directions.next() else {
                self.tokenizer = None;
                return false;
            };
            debug!(%direction, "scanning");
            let cfg = &self.state.scanner;
            self.tokenizer = Some(Tokenizer::new(
                self.source,
                direction,
                cfg.threshold,
                cfg.concurrent_lines,
                cfg.line_skip,
            ));
        }
    }

    /// Decode every barcode on the current line into `pending`
    fn scan_line(&mut self) {
        let Some(tokenizer) = self.tokenizer.as_ref() else {
            return;
        };
        let tokens = &self.tokens;
        let line_length = tokenizer.line_length();
        let min_quiet = self.state.scanner.min_quiet;

        let mut i = 0;
        while i < tokens.len() {
            let quiet = tokens[i];
            if quiet.color.is_bar() || quiet.width < min_quiet {
                i += 1;
                continue;
            }
            let Some(&first) = tokens.get(i + 1) else {
                break;
            };
            let start = self.starts[i + 1];
            if first.width * 3 > quiet.width
                || line_length.saturating_sub(start) < MIN_SYMBOL_WIDTHS * first.width
            {
                trace!(pos = start, quiet = quiet.width, "quiet zone rejected");
                i += 1;
                continue;
            }

            let snapshot = TokenCursor::new(tokens, i + 1);
            let mut decoded = None;
            for decoder in &self.decoders {
                let mut cursor = snapshot;
                if let Some(d) = decoder.scan(&mut cursor, &self.state) {
                    decoded = Some((d, cursor.position()));
                    break;
                }
            }

            match decoded {
                Some((d, end)) => {
                    let (x, y) = tokenizer.point(start);
                    debug!(code_type = %d.code_type, text = %d.text, x, y, "decoded");
                    self.pending.push_back(ScannerResult {
                        code_type: d.code_type,
                        text: d.text,
                        x,
                        y,
                    });
                    i = end.max(i + 1);
                }
                None => i += 1,
            }
        }
    }
}

impl<S: LuminanceSource + ?Sized> Iterator for BarcodeScanner<'_, S> {
    type Item = ScannerResult;

    fn next(&mut self) -> Option<ScannerResult> {
        loop {
            if let Some(result) = self.pending.pop_front() {
                return Some(result);
            }
            if !self.advance_line() {
                return None;
            }
            self.scan_line();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{synth, CodeType, Image};

    fn config() -> ScanConfig {
        ScanConfig::new()
            .directions(Direction::LeftRight)
            .line_skip(1)
            .concurrent_lines(1)
    }

    #[test]
    fn test_blank_image_yields_nothing() {
        let image = Image::from_gray(&[255; 400], 40, 10).unwrap();
        assert_eq!(BarcodeScanner::new(&image).count(), 0);
    }

    #[test]
    fn test_every_line_reports() {
        let widths = synth::code128_widths("ABC").unwrap();
        let image = synth::render_image(&widths, 1, 10, 3);
        let results: Vec<_> = BarcodeScanner::with_config(&image, &config()).collect();
        assert_eq!(results.len(), 3);
        assert!(results.iter().all(|r| r.text == "ABC" && r.x == 10));
        assert_eq!(results.iter().map(|r| r.y).collect::<Vec<_>>(), [0, 1, 2]);
    }

    #[test]
    fn test_two_codes_on_one_line() {
        let mut widths = synth::code39_widths("AB", 3).unwrap();
        widths.push(20);
        widths.extend(synth::ean_widths("96385074").unwrap());
        let image = synth::render_image(&widths, 1, 10, 1);
        let mut results: Vec<_> = BarcodeScanner::with_config(&image, &config())
            .map(|r| (r.code_type, r.text))
            .collect();
        results.sort();
        assert_eq!(
            results,
            [
                (CodeType::Ean8, "96385074".to_string()),
                (CodeType::Code39, "AB".to_string())
            ]
        );
    }

    #[test]
    fn test_disabled_family_not_tried() {
        let widths = synth::code128_widths("ABC").unwrap();
        let image = synth::render_image(&widths, 1, 10, 1);
        let config = config().disable(crate::config::Code128);
        assert_eq!(BarcodeScanner::with_config(&image, &config).count(), 0);
    }

    #[test]
    fn test_reversed_direction_reads_mirrored_code() {
        let mut widths = synth::code128_widths("ABC").unwrap();
        widths.reverse();
        let image = synth::render_image(&widths, 1, 10, 1);

        assert_eq!(BarcodeScanner::with_config(&image, &config()).count(), 0);
        let config = config().directions(Direction::RightLeft);
        let results: Vec<_> = BarcodeScanner::with_config(&image, &config).collect();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].text, "ABC");
        assert_eq!(results[0].x, image.width() - 11);
    }
}
