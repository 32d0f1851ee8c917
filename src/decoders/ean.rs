//! EAN-13, EAN-8 and UPC-A decoder
//!
//! Layout: guard `101`, left digits (A or B parity, four runs over seven
//! modules, starting with a space), center guard `01010`, right digits
//! (C parity, starting with a bar), guard `101`. The parity sequence of the
//! six EAN-13 left digits encodes the implied leading digit.

use crate::{
    config::internal::DecoderState,
    decoder::{Decoded, SymbologyDecoder, TokenCursor, UnitWidth},
    CodeType, CodeTypes,
};
use tracing::{debug, trace};

const DIGIT_MODULES: u32 = 7;
const DIGIT_RUNS: usize = 4;

const GUARD: u16 = 0b101;
const CENTER: u16 = 0b01010;

/// Parity of a left-hand digit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Parity {
    /// Set A, odd number of bar modules
    Odd,
    /// Set B, even number of bar modules
    Even,
}

// ============================================================================
// EAN lookup tables
// ============================================================================

/// Set A module patterns, indexed by digit
static CODES_A: [u8; 10] = [
    0b0001101, 0b0011001, 0b0010011, 0b0111101, 0b0100011, 0b0110001, 0b0101111, 0b0111011,
    0b0110111, 0b0001011,
];

/// Left digit parities for each implied leading digit, first digit in the
/// high bit, `1` for set B
static LEADING: [u8; 10] = [
    0b000000, 0b001011, 0b001101, 0b001110, 0b010011, 0b011001, 0b011100, 0b010101, 0b010110,
    0b011010,
];

static LEFT: [Option<(u8, Parity)>; 128] = build_left();
static RIGHT: [Option<u8>; 128] = build_right();

const fn code_c(digit: usize) -> u8 {
    !CODES_A[digit] & 0x7f
}

const fn code_b(digit: usize) -> u8 {
    let c = code_c(digit);
    let mut rev = 0u8;
    let mut i = 0;
    while i < 7 {
        rev = (rev << 1) | ((c >> i) & 1);
        i += 1;
    }
    rev
}

const fn build_left() -> [Option<(u8, Parity)>; 128] {
    let mut table = [None; 128];
    let mut d = 0;
    while d < 10 {
        table[CODES_A[d] as usize] = Some((d as u8, Parity::Odd));
        table[code_b(d) as usize] = Some((d as u8, Parity::Even));
        d += 1;
    }
    table
}

const fn build_right() -> [Option<u8>; 128] {
    let mut table = [None; 128];
    let mut d = 0;
    while d < 10 {
        table[code_c(d) as usize] = Some(d as u8);
        d += 1;
    }
    table
}

/// Module pattern of `digit` in the given set: A, B or C (right hand)
pub(crate) fn code(digit: u8, parity: Option<Parity>) -> u8 {
    let d = digit as usize % 10;
    match parity {
        Some(Parity::Odd) => CODES_A[d],
        Some(Parity::Even) => code_b(d),
        None => code_c(d),
    }
}

/// Left-hand parities for an EAN-13 leading digit, first digit first
pub(crate) fn leading_parities(digit: u8) -> [Parity; 6] {
    let bits = LEADING[digit as usize % 10];
    std::array::from_fn(|i| {
        if bits >> (5 - i) & 1 == 1 {
            Parity::Even
        } else {
            Parity::Odd
        }
    })
}

/// Modulo-10 check digit for the given digits
///
/// The digit next to the check digit is weighted 3, alternating with 1
/// towards the front.
pub(crate) fn check_digit(digits: &[u8]) -> u8 {
    let sum: u32 = digits
        .iter()
        .rev()
        .enumerate()
        .map(|(i, &d)| d as u32 * if i % 2 == 0 { 3 } else { 1 })
        .sum();
    ((10 - sum % 10) % 10) as u8
}

// ============================================================================
// Decoder
// ============================================================================

/// EAN/UPC decoder
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Ean;

impl SymbologyDecoder for Ean {
    fn family(&self) -> CodeTypes {
        CodeTypes::EAN
    }

    fn scan(&self, cursor: &mut TokenCursor<'_>, state: &DecoderState) -> Option<Decoded> {
        let guard = cursor.take(3)?;
        if !guard.starts_with_bar() {
            return None;
        }
        let mut u = UnitWidth::estimate(guard.psize(), 3)?;
        if guard.module_word(u, 3)?.bits() != GUARD {
            return None;
        }

        let mut digits = Vec::with_capacity(13);
        let mut parity = 0u8;
        let mut center = false;
        for i in 0..6 {
            if i == 4 && read_center(cursor, &mut u) {
                center = true;
                break;
            }
            let (digit, p) = read_digit(cursor, &mut u, |bits| LEFT[bits])?;
            digits.push(digit);
            parity = parity << 1 | (p == Parity::Even) as u8;
        }
        if !center && !read_center(cursor, &mut u) {
            trace!("ean: missing center guard");
            return None;
        }

        let half = digits.len();
        for _ in 0..half {
            let (digit, _) = read_digit(cursor, &mut u, |bits| RIGHT[bits].map(|d| (d, ())))?;
            digits.push(digit);
        }

        let end = cursor.take(3)?;
        u = u.refine(end.psize(), 3)?;
        if end.module_word(u, 3)?.bits() != GUARD {
            return None;
        }

        let code_type = if half == 4 {
            if parity != 0 || !state.is_enabled(CodeType::Ean8) {
                return None;
            }
            CodeType::Ean8
        } else {
            let leading = LEADING.iter().position(|&p| p == parity)? as u8;
            digits.insert(0, leading);
            if leading == 0 && state.is_enabled(CodeType::Upca) {
                CodeType::Upca
            } else if state.is_enabled(CodeType::Ean13) {
                CodeType::Ean13
            } else {
                return None;
            }
        };

        let (body, check) = digits.split_at(digits.len() - 1);
        if check_digit(body) != check[0] {
            debug!(?digits, "ean: check digit mismatch");
            return None;
        }

        let skip = usize::from(code_type == CodeType::Upca);
        let text = digits[skip..]
            .iter()
            .map(|&d| char::from(b'0' + d))
            .collect::<String>();
        Some(Decoded::new(code_type, text))
    }
}

/// Read one four-run digit and look its module word up in `table`
fn read_digit<T>(
    cursor: &mut TokenCursor<'_>,
    u: &mut UnitWidth,
    table: impl Fn(usize) -> Option<(u8, T)>,
) -> Option<(u8, T)> {
    let bars = cursor.take(DIGIT_RUNS)?;
    *u = u.refine(bars.psize(), DIGIT_MODULES)?;
    let word = bars.module_word(*u, DIGIT_MODULES)?;
    table(word.bits() as usize)
}

/// Consume the center guard if it is next
fn read_center(cursor: &mut TokenCursor<'_>, u: &mut UnitWidth) -> bool {
    let Some(bars) = cursor.window(5) else {
        return false;
    };
    if bars.starts_with_bar() {
        return false;
    }
    let Some(refined) = u.refine(bars.psize(), 5) else {
        return false;
    };
    match bars.module_word(refined, 5) {
        Some(word) if word.bits() == CENTER => {
            *u = refined;
            cursor.take(5);
            true
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::Token;

    fn push_modules(tokens: &mut Vec<Token>, bits: u8, len: u32, unit: u32) {
        for i in (0..len).rev() {
            let bar = bits >> i & 1 == 1;
            match tokens.last_mut() {
                Some(t) if t.color.is_bar() == bar => t.width += unit,
                _ => tokens.push(Token::new(bar.into(), unit)),
            }
        }
    }

    fn ean_tokens(digits: &str, unit: u32) -> Vec<Token> {
        let digits: Vec<u8> = digits.bytes().map(|b| b - b'0').collect();
        let (parities, left, right): (Vec<Option<Parity>>, &[u8], &[u8]) = if digits.len() == 8 {
            (vec![Some(Parity::Odd); 4], &digits[..4], &digits[4..])
        } else {
            (
                leading_parities(digits[0]).map(Some).to_vec(),
                &digits[1..7],
                &digits[7..],
            )
        };
        let mut tokens = Vec::new();
        push_modules(&mut tokens, 0b101, 3, unit);
        for (&d, &p) in left.iter().zip(&parities) {
            push_modules(&mut tokens, code(d, p), 7, unit);
        }
        push_modules(&mut tokens, 0b01010, 5, unit);
        for &d in right {
            push_modules(&mut tokens, code(d, None), 7, unit);
        }
        push_modules(&mut tokens, 0b101, 3, unit);
        tokens.push(Token::space(9 * unit));
        tokens
    }

    fn scan_with(digits: &str, state: &DecoderState) -> Option<Decoded> {
        let tokens = ean_tokens(digits, 2);
        Ean.scan(&mut TokenCursor::new(&tokens, 0), state)
    }

    fn scan(digits: &str) -> Option<Decoded> {
        scan_with(digits, &DecoderState::default())
    }

    #[test]
    fn test_tables() {
        assert_eq!(code(0, Some(Parity::Even)), 0b0100111);
        assert_eq!(code(0, None), 0b1110010);
        assert_eq!(LEFT[0b0100111], Some((0, Parity::Even)));
        assert_eq!(RIGHT[0b1110100], Some(9));
        assert_eq!(LEFT.iter().filter(|e| e.is_some()).count(), 20);
    }

    #[test]
    fn test_check_digit() {
        assert_eq!(check_digit(&[4, 0, 0, 6, 3, 8, 1, 3, 3, 3, 9, 3]), 1);
        assert_eq!(check_digit(&[9, 6, 3, 8, 5, 0, 7]), 4);
    }

    #[test]
    fn test_decode_ean13() {
        let decoded = scan("4006381333931").unwrap();
        assert_eq!(decoded, Decoded::new(CodeType::Ean13, "4006381333931"));
    }

    #[test]
    fn test_decode_ean8() {
        let decoded = scan("96385074").unwrap();
        assert_eq!(decoded, Decoded::new(CodeType::Ean8, "96385074"));
    }

    #[test]
    fn test_leading_zero_is_upca() {
        let decoded = scan("0036000291452").unwrap();
        assert_eq!(decoded, Decoded::new(CodeType::Upca, "036000291452"));

        let config = crate::ScanConfig::new().disable(crate::config::Upca);
        let decoded = scan_with("0036000291452", &(&config).into()).unwrap();
        assert_eq!(decoded, Decoded::new(CodeType::Ean13, "0036000291452"));
    }

    #[test]
    fn test_bad_check_digit() {
        assert!(scan("4006381333932").is_none());
    }

    #[test]
    fn test_disabled_type() {
        let config = crate::ScanConfig::new().disable(crate::config::Ean8);
        assert!(scan_with("96385074", &(&config).into()).is_none());
    }

    #[test]
    fn test_cursor_left_on_trailing_space() {
        let tokens = ean_tokens("4006381333931", 1);
        let mut cursor = TokenCursor::new(&tokens, 0);
        Ean.scan(&mut cursor, &DecoderState::default()).unwrap();
        assert_eq!(cursor.peek(0), Some(Token::space(9)));
    }
}
