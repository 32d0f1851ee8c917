//! Interleaved 2 of 5 decoder
//!
//! Digits come in pairs: the five bars of a ten-run group carry the first
//! digit and the five spaces the second. The symbol opens with four narrow
//! runs and closes with wide bar, narrow space, narrow bar.

use crate::{
    config::internal::DecoderState,
    decoder::{within, BarVector, Decoded, SymbologyDecoder, TokenCursor, WidthBands},
    CodeType, CodeTypes,
};
use tracing::trace;

const PAIR_RUNS: usize = 10;

/// Narrow band is `psize/28 ..= psize/9`, wide band `psize/8.9 ..= psize/3`
const NARROW: (f32, f32) = (28.0, 9.0);
const WIDE: (f32, f32) = (8.9, 3.0);

// ============================================================================
// I25 lookup tables
// ============================================================================

/// Wide/narrow pattern per digit, first element in the high bit
static DIGITS: [u8; 10] = [
    0b00110, 0b10001, 0b01001, 0b11000, 0b00101, 0b10100, 0b01100, 0b00011, 0b10010, 0b01010,
];

static KEYS: [Option<u8>; 32] = build_keys();

const fn build_keys() -> [Option<u8>; 32] {
    let mut keys = [None; 32];
    let mut d = 0;
    while d < DIGITS.len() {
        keys[DIGITS[d] as usize] = Some(d as u8);
        d += 1;
    }
    keys
}

/// Wide/narrow pattern of a digit
pub(crate) fn encoding(digit: u8) -> Option<u8> {
    DIGITS.get(digit as usize).copied()
}

// ============================================================================
// Decoder
// ============================================================================

/// Interleaved 2 of 5 decoder
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct I25;

impl SymbologyDecoder for I25 {
    fn family(&self) -> CodeTypes {
        CodeTypes::CODE25I
    }

    fn scan(&self, cursor: &mut TokenCursor<'_>, state: &DecoderState) -> Option<Decoded> {
        let start = cursor.take(4)?;
        if !start.starts_with_bar() {
            return None;
        }
        let mut narrow = start.psize() as f32 / 4.0;
        if !start
            .widths()
            .all(|w| (0.7 * narrow..=1.3 * narrow).contains(&(w as f32)))
        {
            return None;
        }

        let mut text = String::new();
        let mut prev: Option<u32> = None;
        loop {
            if read_end(cursor, narrow) {
                break;
            }

            let pair = cursor.take(PAIR_RUNS)?;
            if !pair.starts_with_bar() {
                return None;
            }
            let psize = pair.psize();
            let continuous = match prev {
                Some(p) => within(psize, p, 0.5),
                None => (12.0 * narrow..=28.0 * narrow).contains(&(psize as f32)),
            };
            if !continuous {
                trace!(psize, ?prev, "i25: pair width jump");
                return None;
            }
            prev = Some(psize);

            let (first, second, n) = decode_pair(&pair)?;
            text.push(char::from(b'0' + first));
            text.push(char::from(b'0' + second));
            narrow = n;

            if text.len() > crate::config::MAX_LENGTH as usize {
                return None;
            }
        }

        if text.is_empty() || !state.is_enabled(CodeType::Code25i) {
            return None;
        }
        if !state.length_ok(CodeType::Code25i, text.len()) {
            trace!(len = text.len(), "i25: length outside limits");
            return None;
        }
        Some(Decoded::new(CodeType::Code25i, text))
    }
}

/// Split a ten-run group into its two digits and the mean narrow width
fn decode_pair(pair: &BarVector<'_>) -> Option<(u8, u8, f32)> {
    let bands = WidthBands::new(pair.psize(), NARROW, WIDE);
    let bars = bands.pattern(pair.widths().step_by(2))?;
    let spaces = bands.pattern(pair.widths().skip(1).step_by(2))?;
    let first = KEYS[bars as usize]?;
    let second = KEYS[spaces as usize]?;

    let (sum, count) = pair
        .widths()
        .filter(|&w| bands.classify(w) == Some(false))
        .fold((0u32, 0u32), |(s, c), w| (s + w, c + 1));
    Some((first, second, sum as f32 / count.max(1) as f32))
}

/// Consume the stop pattern if it is next and followed by a quiet zone
fn read_end(cursor: &mut TokenCursor<'_>, narrow: f32) -> bool {
    let Some(end) = cursor.window(4) else {
        return false;
    };
    if !end.starts_with_bar() {
        return false;
    }
    let (wide, s, b, quiet) = (
        end.width(0) as f32,
        end.width(1) as f32,
        end.width(2) as f32,
        end.width(3) as f32,
    );
    let is_narrow = |w: f32| (0.5 * narrow..=1.7 * narrow).contains(&w);
    let matched = wide >= 1.7 * narrow
        && is_narrow(s)
        && is_narrow(b)
        && quiet >= 2.0 * (wide + s + b);
    if matched {
        cursor.take(3);
    }
    matched
}
