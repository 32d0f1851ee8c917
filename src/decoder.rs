//! Decoder plumbing shared by all symbologies
//!
//! A scan line arrives here as a slice of [`Token`]s. Decoders walk it with a
//! [`TokenCursor`], take fixed-size [`BarVector`] windows off it, and turn a
//! window into a [`ModuleWord`] once a [`UnitWidth`] is known.

use crate::config::internal::DecoderState;
use crate::tokenizer::Token;
use crate::{CodeType, CodeTypes};

/// Relative deviation allowed when a unit width estimate is refined
const UNIT_TOLERANCE: f32 = 0.4;

/// Text and type produced by a successful decode
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Decoded {
    pub(crate) code_type: CodeType,
    pub(crate) text: String,
}

impl Decoded {
    pub(crate) fn new(code_type: CodeType, text: impl Into<String>) -> Self {
        Self {
            code_type,
            text: text.into(),
        }
    }
}

/// A symbology decoder
///
/// `scan` is called with the cursor positioned on the first bar after an
/// admissible quiet zone. On success the cursor is left on the token
/// following the symbol. On failure the cursor position is unspecified; the
/// caller restores its own copy.
pub(crate) trait SymbologyDecoder {
    /// Code types this decoder can produce
    fn family(&self) -> CodeTypes;

    fn scan(&self, cursor: &mut TokenCursor<'_>, state: &DecoderState) -> Option<Decoded>;
}

// ============================================================================
// Token cursor
// ============================================================================

/// Position in the token stream of one scan line
///
/// The cursor is `Copy`: taking a snapshot before a decode attempt and
/// assigning it back afterwards is a full rollback.
#[derive(Debug, Clone, Copy)]
pub(crate) struct TokenCursor<'t> {
    tokens: &'t [Token],
    pos: usize,
}

impl<'t> TokenCursor<'t> {
    pub(crate) fn new(tokens: &'t [Token], pos: usize) -> Self {
        Self {
            tokens,
            pos: pos.min(tokens.len()),
        }
    }

    /// Index of the next token
    #[inline]
    pub(crate) fn position(&self) -> usize {
        self.pos
    }

    /// Token `offset` places ahead, without consuming
    #[inline]
    pub(crate) fn peek(&self, offset: usize) -> Option<Token> {
        self.tokens.get(self.pos + offset).copied()
    }

    /// Consume one token
    pub(crate) fn next(&mut self) -> Option<Token> {
        let token = self.peek(0)?;
        self.pos += 1;
        Some(token)
    }

    /// Consume `n` tokens as a window, or nothing if fewer are left
    pub(crate) fn take(&mut self, n: usize) -> Option<BarVector<'t>> {
        let bars = self.tokens.get(self.pos..self.pos + n)?;
        self.pos += n;
        Some(BarVector::new(bars))
    }

    /// Look at the next `n` tokens as a window without consuming them
    pub(crate) fn window(&self, n: usize) -> Option<BarVector<'t>> {
        self.tokens.get(self.pos..self.pos + n).map(BarVector::new)
    }
}

// ============================================================================
// Bar vectors and module words
// ============================================================================

/// A window of consecutive tokens with their total pixel width
#[derive(Debug, Clone, Copy)]
pub(crate) struct BarVector<'t> {
    bars: &'t [Token],
    psize: u32,
}

impl<'t> BarVector<'t> {
    pub(crate) fn new(bars: &'t [Token]) -> Self {
        Self {
            bars,
            psize: bars.iter().map(|t| t.width).sum(),
        }
    }

    /// Total pixel width
    #[inline]
    pub(crate) fn psize(&self) -> u32 {
        self.psize
    }

    #[inline]
    pub(crate) fn width(&self, i: usize) -> u32 {
        self.bars[i].width
    }

    pub(crate) fn widths(&self) -> impl Iterator<Item = u32> + 't {
        self.bars.iter().map(|t| t.width)
    }

    /// Whether the first token is a bar
    pub(crate) fn starts_with_bar(&self) -> bool {
        self.bars.first().is_some_and(|t| t.color.is_bar())
    }

    /// Quantize to whole modules of width `u`
    ///
    /// Fails when any run rounds to zero modules or the total differs from
    /// `modules`.
    pub(crate) fn module_word(&self, u: UnitWidth, modules: u32) -> Option<ModuleWord> {
        ModuleWord::from_bars(self, u, modules)
    }
}

/// Packed module pattern of a [`BarVector`]
///
/// The first module is the most significant bit. Bars are 1s, spaces 0s.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct ModuleWord {
    bits: u16,
}

impl ModuleWord {
    fn from_bars(bars: &BarVector<'_>, u: UnitWidth, modules: u32) -> Option<Self> {
        debug_assert!(modules <= 16);
        let mut bits = 0u32;
        let mut total = 0u32;
        for token in bars.bars {
            let n = (token.width as f32 / u.get()).round() as u32;
            if n == 0 {
                return None;
            }
            total += n;
            if total > modules {
                return None;
            }
            let fill = if token.color.is_bar() { (1u32 << n) - 1 } else { 0 };
            bits = (bits << n) | fill;
        }
        (total == modules).then_some(Self { bits: bits as u16 })
    }

    #[inline]
    pub(crate) fn bits(&self) -> u16 {
        self.bits
    }
}

// ============================================================================
// Unit width
// ============================================================================

/// Estimated pixel width of one module
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct UnitWidth(f32);

impl UnitWidth {
    /// Initial estimate from a window spanning `modules` modules
    pub(crate) fn estimate(psize: u32, modules: u32) -> Option<Self> {
        let u = psize as f32 / modules as f32;
        (u > 0.0).then_some(Self(u))
    }

    #[inline]
    pub(crate) fn get(self) -> f32 {
        self.0
    }

    /// New estimate from the next window, if it agrees with this one
    pub(crate) fn refine(self, psize: u32, modules: u32) -> Option<Self> {
        let next = Self::estimate(psize, modules)?;
        ((next.0 - self.0).abs() <= self.0 * UNIT_TOLERANCE).then_some(next)
    }
}

// ============================================================================
// Shared width helpers
// ============================================================================

/// Whether `width` lies within `ratio` (e.g. 0.5 for ±50%) of `reference`
#[inline]
pub(crate) fn within(width: u32, reference: u32, ratio: f32) -> bool {
    let (w, r) = (width as f32, reference as f32);
    w >= r * (1.0 - ratio) && w <= r * (1.0 + ratio)
}

/// Narrow/wide classification used by the two-width symbologies
#[derive(Debug, Clone, Copy)]
pub(crate) struct WidthBands {
    narrow: (f32, f32),
    wide: (f32, f32),
}

impl WidthBands {
    /// Bands as fractions of a window's pixel size
    ///
    /// A run is narrow within `psize / narrow.0 ..= psize / narrow.1` and
    /// wide within `psize / wide.0 ..= psize / wide.1`.
    pub(crate) fn new(psize: u32, narrow: (f32, f32), wide: (f32, f32)) -> Self {
        let p = psize as f32;
        Self {
            narrow: (p / narrow.0, p / narrow.1),
            wide: (p / wide.0, p / wide.1),
        }
    }

    /// `Some(true)` for wide, `Some(false)` for narrow, `None` for neither
    pub(crate) fn classify(&self, width: u32) -> Option<bool> {
        let w = width as f32;
        if w >= self.narrow.0 && w <= self.narrow.1 {
            Some(false)
        } else if w >= self.wide.0 && w <= self.wide.1 {
            Some(true)
        } else {
            None
        }
    }

    /// Pack the wide/narrow pattern of `widths`, first run most significant
    pub(crate) fn pattern(&self, mut widths: impl Iterator<Item = u32>) -> Option<u16> {
        widths.try_fold(0u16, |acc, w| Some(acc << 1 | self.classify(w)? as u16))
    }
}
