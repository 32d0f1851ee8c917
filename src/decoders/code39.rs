//! Code 39 decoder
//!
//! Characters are nine runs, three of them wide, separated by a narrow
//! space. Symbols open and close with the `*` delimiter. The optional mod-43
//! check character and the full-ASCII shift pairs are interpreted when the
//! corresponding code types are enabled.

use crate::{
    config::internal::DecoderState,
    decoder::{within, Decoded, SymbologyDecoder, TokenCursor, WidthBands},
    CodeType, CodeTypes,
};
use tracing::trace;

const RUNS: usize = 9;

/// Character values in check-sum order
pub(crate) static ALPHABET: &[u8; 43] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ-. $/+%";

/// Value of the `*` delimiter
const DELIMITER: u8 = 43;

/// Narrow band is `psize/25 ..= psize/8`, wide band `psize/7.9 ..= psize`
const NARROW: (f32, f32) = (25.0, 8.0);
const WIDE: (f32, f32) = (7.9, 1.0);

// ============================================================================
// Code 39 lookup tables
// ============================================================================

/// Wide/narrow patterns, first run in the high bit, indexed by value
static ENCODINGS: [u16; 44] = [
    0b000110100, // 0
    0b100100001,
    0b001100001,
    0b101100000,
    0b000110001,
    0b100110000,
    0b001110000,
    0b000100101,
    0b100100100,
    0b001100100,
    0b100001001, // A
    0b001001001,
    0b101001000,
    0b000011001,
    0b100011000,
    0b001011000,
    0b000001101,
    0b100001100,
    0b001001100,
    0b000011100,
    0b100000011, // K
    0b001000011,
    0b101000010,
    0b000010011,
    0b100010010,
    0b001010010,
    0b000000111,
    0b100000110,
    0b001000110,
    0b000010110,
    0b110000001, // U
    0b011000001,
    0b111000000,
    0b010010001,
    0b110010000,
    0b011010000,
    0b010000101, // -
    0b110000100,
    0b011000100,
    0b010101000, // $
    0b010100010,
    0b010001010,
    0b000101010,
    0b010010100, // *
];

static PATTERNS: [Option<u8>; 512] = build_patterns();

const fn build_patterns() -> [Option<u8>; 512] {
    let mut table = [None; 512];
    let mut value = 0;
    while value < ENCODINGS.len() {
        table[ENCODINGS[value] as usize] = Some(value as u8);
        value += 1;
    }
    table
}

/// Wide/narrow pattern of a character, `*` included
pub(crate) fn encoding(c: char) -> Option<u16> {
    if c == '*' {
        return Some(ENCODINGS[DELIMITER as usize]);
    }
    value_of(c).map(|v| ENCODINGS[v as usize])
}

fn value_of(c: char) -> Option<u8> {
    ALPHABET.iter().position(|&a| a as char == c).map(|v| v as u8)
}

/// Mod-43 check character for `text`
pub(crate) fn mod43(text: &str) -> Option<char> {
    let sum = text
        .chars()
        .map(|c| value_of(c).map(u32::from))
        .sum::<Option<u32>>()?;
    Some(ALPHABET[(sum % 43) as usize] as char)
}

// ============================================================================
// Decoder
// ============================================================================

/// Code 39 decoder
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Code39;

impl SymbologyDecoder for Code39 {
    fn family(&self) -> CodeTypes {
        CodeTypes::CODE39
    }

    fn scan(&self, cursor: &mut TokenCursor<'_>, state: &DecoderState) -> Option<Decoded> {
        // The delimiter opens with a narrow bar and a wide space, each
        // possibly a pixel off after rounding
        let head = cursor.window(2)?;
        let (b0, b1) = (head.width(0) as f32, head.width(1) as f32);
        if b0 - 1.0 > 0.7 * (b1 + 1.0) || b1 - 1.0 > 3.3 * (b0 + 1.0) {
            return None;
        }

        let (start, mut prev) = read_char(cursor)?;
        if start != DELIMITER {
            return None;
        }

        let mut values = Vec::new();
        loop {
            let gap = cursor.next()?;
            let p = prev as f32;
            let gap_w = gap.width as f32;
            if gap.color.is_bar() || gap_w < p / NARROW.0 * 0.5 || gap_w > p / NARROW.1 * 1.5 {
                trace!(gap = gap.width, psize = prev, "code39: bad gap");
                return None;
            }

            let (value, psize) = read_char(cursor)?;
            if !within(psize, prev, 0.5) {
                trace!(psize, prev, "code39: character width jump");
                return None;
            }
            prev = psize;

            if value == DELIMITER {
                break;
            }
            values.push(value);
            if values.len() > crate::config::MAX_LENGTH as usize + 1 {
                return None;
            }
        }
        if values.is_empty() {
            return None;
        }

        let raw: String = values.iter().map(|&v| ALPHABET[v as usize] as char).collect();
        interpret(raw, state)
    }
}

/// Read one nine-run character, returning its value and pixel size
fn read_char(cursor: &mut TokenCursor<'_>) -> Option<(u8, u32)> {
    let bars = cursor.take(RUNS)?;
    if !bars.starts_with_bar() {
        return None;
    }
    let bands = WidthBands::new(bars.psize(), NARROW, WIDE);
    let pattern = bands.pattern(bars.widths())?;
    PATTERNS[pattern as usize].map(|v| (v, bars.psize()))
}

/// Pick the reported type and text for the characters between delimiters
fn interpret(raw: String, state: &DecoderState) -> Option<Decoded> {
    let mut data = raw.as_str();
    let mut checked = false;
    if state.is_enabled(CodeType::Code39Mod43) && data.len() >= 2 {
        let (body, check) = data.split_at(data.len() - 1);
        if mod43(body).is_some_and(|c| check.starts_with(c)) {
            data = body;
            checked = true;
        }
    }

    let accept = |code_type: CodeType, text: String| {
        state
            .length_ok(code_type, text.len())
            .then(|| Decoded::new(code_type, text))
    };

    if state.is_enabled(CodeType::Code39Ext) && data.contains(&['$', '%', '/', '+'][..]) {
        if let Some(text) = full_ascii(data) {
            return accept(CodeType::Code39Ext, text);
        }
        trace!(data, "code39: malformed full ASCII pair");
    }
    if checked {
        return accept(CodeType::Code39Mod43, data.to_string());
    }
    if state.is_enabled(CodeType::Code39) {
        return accept(CodeType::Code39, raw);
    }
    None
}

/// Expand full-ASCII shift pairs
fn full_ascii(data: &str) -> Option<String> {
    let mut out = String::with_capacity(data.len());
    let mut chars = data.chars();
    while let Some(c) = chars.next() {
        match c {
            '$' | '%' | '/' | '+' => out.push(expand(c, chars.next()?)?),
            c => out.push(c),
        }
    }
    Some(out)
}

fn expand(shift: char, c: char) -> Option<char> {
    let b = u8::try_from(c).ok()?;
    let v = match (shift, b) {
        ('$', b'A'..=b'Z') => b - b'A' + 0x01,
        ('%', b'A'..=b'E') => b - b'A' + 0x1b,
        ('%', b'F'..=b'J') => b - b'F' + b';',
        ('%', b'K'..=b'O') => b - b'K' + b'[',
        ('%', b'P'..=b'T') => b - b'P' + b'{',
        ('%', b'U') => 0x00,
        ('%', b'V') => b'@',
        ('%', b'W') => b'`',
        ('%', b'X'..=b'Z') => 0x7f,
        ('/', b'A'..=b'O') => b - b'A' + b'!',
        ('/', b'Z') => b':',
        ('+', b'A'..=b'Z') => b - b'A' + b'a',
        _ => return None,
    };
    Some(char::from(v))
}
