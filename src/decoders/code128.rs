//! Code 128 and GS1-128 decoder
//!
//! Every symbol is six runs spanning eleven modules. The stop symbol is
//! recognized by its first six runs and a trailing two-module bar.

use crate::{
    config::internal::DecoderState,
    decoder::{Decoded, SymbologyDecoder, TokenCursor, UnitWidth},
    CodeType, CodeTypes,
};
use tracing::{trace, warn};

/// Modules per symbol
const MODULES: u32 = 11;
/// Runs per symbol
const RUNS: usize = 6;
/// Trailing quiet zone, in modules, required after the stop bar
const TRAILING_QUIET: f32 = 5.0;

// Code 128 symbol values with a special meaning
const FNC3: u8 = 96;
const FNC2: u8 = 97;
const SHIFT: u8 = 98;
const CODE_C: u8 = 99;
const CODE_B: u8 = 100;
const CODE_A: u8 = 101;
const FNC1: u8 = 102;
const START_A: u8 = 103;
const START_B: u8 = 104;
const START_C: u8 = 105;
const STOP: u8 = 106;

/// ASCII group separator, emitted for FNC1 after the first position
const GS: char = '\x1d';

// ============================================================================
// Code 128 lookup tables
// ============================================================================

/// Run widths of every symbol; the stop entry omits its final bar
static PATTERNS: [[u8; RUNS]; 107] = [
    [2, 1, 2, 2, 2, 2], // 0
    [2, 2, 2, 1, 2, 2],
    [2, 2, 2, 2, 2, 1],
    [1, 2, 1, 2, 2, 3],
    [1, 2, 1, 3, 2, 2],
    [1, 3, 1, 2, 2, 2],
    [1, 2, 2, 2, 1, 3],
    [1, 2, 2, 3, 1, 2],
    [1, 3, 2, 2, 1, 2],
    [2, 2, 1, 2, 1, 3],
    [2, 2, 1, 3, 1, 2], // 10
    [2, 3, 1, 2, 1, 2],
    [1, 1, 2, 2, 3, 2],
    [1, 2, 2, 1, 3, 2],
    [1, 2, 2, 2, 3, 1],
    [1, 1, 3, 2, 2, 2],
    [1, 2, 3, 1, 2, 2],
    [1, 2, 3, 2, 2, 1],
    [2, 2, 3, 2, 1, 1],
    [2, 2, 1, 1, 3, 2],
    [2, 2, 1, 2, 3, 1], // 20
    [2, 1, 3, 2, 1, 2],
    [2, 2, 3, 1, 1, 2],
    [3, 1, 2, 1, 3, 1],
    [3, 1, 1, 2, 2, 2],
    [3, 2, 1, 1, 2, 2],
    [3, 2, 1, 2, 2, 1],
    [3, 1, 2, 2, 1, 2],
    [3, 2, 2, 1, 1, 2],
    [3, 2, 2, 2, 1, 1],
    [2, 1, 2, 1, 2, 3], // 30
    [2, 1, 2, 3, 2, 1],
    [2, 3, 2, 1, 2, 1],
    [1, 1, 1, 3, 2, 3],
    [1, 3, 1, 1, 2, 3],
    [1, 3, 1, 3, 2, 1],
    [1, 1, 2, 3, 1, 3],
    [1, 3, 2, 1, 1, 3],
    [1, 3, 2, 3, 1, 1],
    [2, 1, 1, 3, 1, 3],
    [2, 3, 1, 1, 1, 3], // 40
    [2, 3, 1, 3, 1, 1],
    [1, 1, 2, 1, 3, 3],
    [1, 1, 2, 3, 3, 1],
    [1, 3, 2, 1, 3, 1],
    [1, 1, 3, 1, 2, 3],
    [1, 1, 3, 3, 2, 1],
    [1, 3, 3, 1, 2, 1],
    [3, 1, 3, 1, 2, 1],
    [2, 1, 1, 3, 3, 1],
    [2, 3, 1, 1, 3, 1], // 50
    [2, 1, 3, 1, 1, 3],
    [2, 1, 3, 3, 1, 1],
    [2, 1, 3, 1, 3, 1],
    [3, 1, 1, 1, 2, 3],
    [3, 1, 1, 3, 2, 1],
    [3, 3, 1, 1, 2, 1],
    [3, 1, 2, 1, 1, 3],
    [3, 1, 2, 3, 1, 1],
    [3, 3, 2, 1, 1, 1],
    [3, 1, 4, 1, 1, 1], // 60
    [2, 2, 1, 4, 1, 1],
    [4, 3, 1, 1, 1, 1],
    [1, 1, 1, 2, 2, 4],
    [1, 1, 1, 4, 2, 2],
    [1, 2, 1, 1, 2, 4],
    [1, 2, 1, 4, 2, 1],
    [1, 4, 1, 1, 2, 2],
    [1, 4, 1, 2, 2, 1],
    [1, 1, 2, 2, 1, 4],
    [1, 1, 2, 4, 1, 2], // 70
    [1, 2, 2, 1, 1, 4],
    [1, 2, 2, 4, 1, 1],
    [1, 4, 2, 1, 1, 2],
    [1, 4, 2, 2, 1, 1],
    [2, 4, 1, 2, 1, 1],
    [2, 2, 1, 1, 1, 4],
    [4, 1, 3, 1, 1, 1],
    [2, 4, 1, 1, 1, 2],
    [1, 3, 4, 1, 1, 1],
    [1, 1, 1, 2, 4, 2], // 80
    [1, 2, 1, 1, 4, 2],
    [1, 2, 1, 2, 4, 1],
    [1, 1, 4, 2, 1, 2],
    [1, 2, 4, 1, 1, 2],
    [1, 2, 4, 2, 1, 1],
    [4, 1, 1, 2, 1, 2],
    [4, 2, 1, 1, 1, 2],
    [4, 2, 1, 2, 1, 1],
    [2, 1, 2, 1, 4, 1],
    [2, 1, 4, 1, 2, 1], // 90
    [4, 1, 2, 1, 2, 1],
    [1, 1, 1, 1, 4, 3],
    [1, 1, 1, 3, 4, 1],
    [1, 3, 1, 1, 4, 1],
    [1, 1, 4, 1, 1, 3],
    [1, 1, 4, 3, 1, 1],
    [4, 1, 1, 1, 1, 3],
    [4, 1, 1, 3, 1, 1],
    [1, 1, 3, 1, 4, 1],
    [1, 1, 4, 1, 3, 1], // 100
    [3, 1, 1, 1, 4, 1],
    [4, 1, 1, 1, 3, 1],
    [2, 1, 1, 4, 1, 2],
    [2, 1, 1, 2, 1, 4],
    [2, 1, 1, 2, 3, 2],
    [2, 3, 3, 1, 1, 1], // stop
];

/// 9-bit module key to symbol value
static KEYS: [Option<u8>; 512] = build_keys();

/// Module word of a symbol with its leading bar and trailing space stripped
const fn key_of(widths: &[u8; RUNS]) -> usize {
    let mut bits = 0u32;
    let mut i = 0;
    while i < RUNS {
        let n = widths[i] as u32;
        bits <<= n;
        if i % 2 == 0 {
            bits |= (1 << n) - 1;
        }
        i += 1;
    }
    ((bits >> 1) & 0x1ff) as usize
}

const fn build_keys() -> [Option<u8>; 512] {
    let mut keys = [None; 512];
    let mut value = 0;
    while value < PATTERNS.len() {
        keys[key_of(&PATTERNS[value])] = Some(value as u8);
        value += 1;
    }
    keys
}

/// Run widths of a symbol value, stop without its final bar
pub(crate) fn pattern(value: u8) -> Option<&'static [u8; RUNS]> {
    PATTERNS.get(value as usize)
}

/// Check symbol for a start value followed by data values
pub(crate) fn checksum(start: u8, data: &[u8]) -> u8 {
    let sum = data
        .iter()
        .enumerate()
        .fold(start as u32, |acc, (i, &v)| acc + (i as u32 + 1) * v as u32);
    (sum % 103) as u8
}

// ============================================================================
// Decoder
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CodeSet {
    A,
    B,
    C,
}

impl CodeSet {
    fn shifted(self) -> Self {
        match self {
            Self::A => Self::B,
            Self::B => Self::A,
            Self::C => Self::C,
        }
    }
}

/// Code 128 decoder, reporting GS1-128 when the data opens with FNC1
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Code128;

impl SymbologyDecoder for Code128 {
    fn family(&self) -> CodeTypes {
        CodeTypes::CODE128
    }

    fn scan(&self, cursor: &mut TokenCursor<'_>, state: &DecoderState) -> Option<Decoded> {
        let mut u = UnitWidth::estimate(cursor.window(RUNS)?.psize(), MODULES)?;

        let start = read_symbol(cursor, &mut u)?;
        if !(START_A..=START_C).contains(&start) {
            return None;
        }

        let mut values = Vec::new();
        loop {
            let value = read_symbol(cursor, &mut u)?;
            if value == STOP {
                break;
            }
            if value >= START_A {
                trace!(value, "code128: start symbol inside data");
                return None;
            }
            values.push(value);
        }

        // Final bar of the stop pattern and the trailing quiet zone
        let bar = cursor.next()?;
        if !bar.color.is_bar() || (bar.width as f32 / u.get()).round() as u32 != 2 {
            return None;
        }
        if let Some(quiet) = cursor.peek(0) {
            if (quiet.width as f32) < u.get() * TRAILING_QUIET {
                return None;
            }
        }

        let check = values.pop()?;
        if values.is_empty() {
            return None;
        }
        let expected = checksum(start, &values);
        if expected != check {
            warn!(expected, found = check, "code128: checksum mismatch");
            return None;
        }

        let (text, gs1) = decode_text(start, &values)?;
        let code_type = if gs1 && state.is_enabled(CodeType::Gs1_128) {
            CodeType::Gs1_128
        } else if state.is_enabled(CodeType::Code128) {
            CodeType::Code128
        } else {
            return None;
        };
        if !state.length_ok(code_type, text.len()) {
            trace!(len = text.len(), "code128: length outside limits");
            return None;
        }
        Some(Decoded::new(code_type, text))
    }
}

/// Read one six-run symbol, refining the unit width
fn read_symbol(cursor: &mut TokenCursor<'_>, u: &mut UnitWidth) -> Option<u8> {
    let bars = cursor.take(RUNS)?;
    if !bars.starts_with_bar() {
        return None;
    }
    *u = u.refine(bars.psize(), MODULES)?;
    let word = bars.module_word(*u, MODULES)?;
    KEYS[((word.bits() >> 1) & 0x1ff) as usize]
}

/// Expand symbol values into text; the flag is set for a leading FNC1
fn decode_text(start: u8, values: &[u8]) -> Option<(String, bool)> {
    let mut set = match start {
        START_A => CodeSet::A,
        START_B => CodeSet::B,
        _ => CodeSet::C,
    };
    let mut shift = false;
    let mut gs1 = false;
    let mut text = String::with_capacity(values.len() * 2);

    for (i, &value) in values.iter().enumerate() {
        let current = if shift { set.shifted() } else { set };
        shift = false;

        match (current, value) {
            (_, FNC1) if i == 0 => gs1 = true,
            (_, FNC1) => text.push(GS),
            (CodeSet::C, 0..=99) => {
                text.push(char::from(b'0' + value / 10));
                text.push(char::from(b'0' + value % 10));
            }
            (CodeSet::C, CODE_B) => set = CodeSet::B,
            (CodeSet::C, CODE_A) => set = CodeSet::A,
            (CodeSet::A, 0..=63) => text.push(char::from(value + 32)),
            (CodeSet::A, 64..=95) => text.push(char::from(value - 64)),
            (CodeSet::B, 0..=95) => text.push(char::from(value + 32)),
            // Reader programming and extended ASCII are not interpreted
            (_, FNC2 | FNC3) => {}
            (CodeSet::A, CODE_A) | (CodeSet::B, CODE_B) => {}
            (_, SHIFT) => shift = true,
            (_, CODE_C) => set = CodeSet::C,
            (CodeSet::A, CODE_B) => set = CodeSet::B,
            (CodeSet::B, CODE_A) => set = CodeSet::A,
            _ => return None,
        }
    }
    Some((text, gs1))
}
