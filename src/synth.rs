//! Synthetic barcode generation
//!
//! The `*_widths` functions return the run widths of a symbol in modules,
//! starting and ending with a bar. [`render_row`] and [`render_image`] turn
//! them into black-on-white pixels with a quiet zone on both sides;
//! [`render_row_scaled`] does the same for a fractional module size, with
//! grey pixels where an edge falls inside a pixel.
//!
//! ```
//! use barline::synth;
//!
//! let widths = synth::code39_widths("HELLO", 3).unwrap();
//! let image = synth::render_image(&widths, 2, 10, 8);
//! assert_eq!(image.height(), 8);
//! ```

use ::image::GrayImage;

#[cfg(feature = "code128")]
use crate::decoders::code128;
#[cfg(feature = "code39")]
use crate::decoders::code39;
#[cfg(feature = "ean")]
use crate::decoders::ean::{self, Parity};
#[cfg(feature = "i25")]
use crate::decoders::i25;

const BLACK: u8 = 0;
const WHITE: u8 = 255;

/// Append `count` modules of the pattern `bits` (first module in the high
/// bit), merging with the previous run when the colour continues
#[cfg(feature = "ean")]
fn push_modules(widths: &mut Vec<u32>, bits: u32, count: u32) {
    for i in (0..count).rev() {
        let bar = bits >> i & 1 == 1;
        // Even indices are bars
        let last_is_bar = widths.len() % 2 == 1;
        if !widths.is_empty() && last_is_bar == bar {
            if let Some(w) = widths.last_mut() {
                *w += 1;
            }
        } else {
            widths.push(1);
        }
    }
}

#[cfg(feature = "ean")]
fn parse_digits(digits: &str) -> Option<Vec<u8>> {
    digits
        .bytes()
        .map(|b| b.is_ascii_digit().then(|| b - b'0'))
        .collect()
}

/// EAN/UPC check digit for the digits before it
#[cfg(feature = "ean")]
pub fn ean_check_digit(digits: &str) -> Option<char> {
    let digits = parse_digits(digits)?;
    Some(char::from(b'0' + ean::check_digit(&digits)))
}

/// Module widths of an EAN-8, UPC-A or EAN-13 symbol
///
/// 7, 11 and 12 digits get a check digit appended (11 digits are UPC-A,
/// encoded as EAN-13 with a leading zero). 8 and 13 digits are encoded as
/// given, check digit included.
#[cfg(feature = "ean")]
pub fn ean_widths(digits: &str) -> Option<Vec<u32>> {
    let mut digits = parse_digits(digits)?;
    if digits.len() == 11 {
        digits.insert(0, 0);
        digits.push(ean::check_digit(&digits));
    } else if matches!(digits.len(), 7 | 12) {
        digits.push(ean::check_digit(&digits));
    }

    let (parities, left, right): (Vec<Parity>, &[u8], &[u8]) = match digits.len() {
        8 => (vec![Parity::Odd; 4], &digits[..4], &digits[4..]),
        13 => (
            ean::leading_parities(digits[0]).to_vec(),
            &digits[1..7],
            &digits[7..],
        ),
        _ => return None,
    };

    let mut widths = Vec::new();
    push_modules(&mut widths, 0b101, 3);
    for (&d, &p) in left.iter().zip(&parities) {
        push_modules(&mut widths, ean::code(d, Some(p)) as u32, 7);
    }
    push_modules(&mut widths, 0b01010, 5);
    for &d in right {
        push_modules(&mut widths, ean::code(d, None) as u32, 7);
    }
    push_modules(&mut widths, 0b101, 3);
    Some(widths)
}

/// Symbol values for `text`, start and check included, stop excluded
///
/// All-digit text of even length uses code set C; anything else must be
/// printable ASCII and uses code set B. ASCII 29 is encoded as FNC1.
#[cfg(feature = "code128")]
fn code128_values(text: &str, gs1: bool) -> Option<Vec<u8>> {
    const FNC1: u8 = 102;
    const START_B: u8 = 104;
    const START_C: u8 = 105;

    let numeric = !text.is_empty() && text.len() % 2 == 0 && text.bytes().all(|b| b.is_ascii_digit());
    let mut data = Vec::new();
    if gs1 {
        data.push(FNC1);
    }
    let start = if numeric {
        for pair in text.as_bytes().chunks(2) {
            data.push((pair[0] - b'0') * 10 + (pair[1] - b'0'));
        }
        START_C
    } else {
        for b in text.bytes() {
            data.push(match b {
                0x1d => FNC1,
                32..=127 => b - 32,
                _ => return None,
            });
        }
        START_B
    };
    if data.is_empty() {
        return None;
    }

    let check = code128::checksum(start, &data);
    let mut values = vec![start];
    values.extend(data);
    values.push(check);
    Some(values)
}

#[cfg(feature = "code128")]
fn code128_symbol_widths(values: &[u8]) -> Option<Vec<u32>> {
    const STOP: u8 = 106;

    let mut widths = Vec::with_capacity(values.len() * 6 + 7);
    for &v in values.iter().chain(&[STOP]) {
        widths.extend(code128::pattern(v)?.iter().map(|&w| w as u32));
    }
    widths.push(2);
    Some(widths)
}

/// Module widths of a Code 128 symbol
#[cfg(feature = "code128")]
pub fn code128_widths(text: &str) -> Option<Vec<u32>> {
    code128_symbol_widths(&code128_values(text, false)?)
}

/// Module widths of a GS1-128 symbol: a leading FNC1, then `text` as for
/// [`code128_widths`]
#[cfg(feature = "code128")]
pub fn gs1_128_widths(text: &str) -> Option<Vec<u32>> {
    code128_symbol_widths(&code128_values(text, true)?)
}

/// Code 39 mod-43 check character for `text`
#[cfg(feature = "code39")]
pub fn code39_check(text: &str) -> Option<char> {
    code39::mod43(text)
}

/// Module widths of a Code 39 symbol with wide runs `ratio` modules wide
///
/// The `*` delimiters are added; `text` must not contain them.
#[cfg(feature = "code39")]
pub fn code39_widths(text: &str, ratio: u32) -> Option<Vec<u32>> {
    if text.is_empty() || text.contains('*') || ratio < 2 {
        return None;
    }
    let mut widths = Vec::new();
    for (n, c) in std::iter::once('*')
        .chain(text.chars())
        .chain(std::iter::once('*'))
        .enumerate()
    {
        if n > 0 {
            widths.push(1);
        }
        let enc = code39::encoding(c)?;
        widths.extend((0..9).rev().map(|i| if enc >> i & 1 == 1 { ratio } else { 1 }));
    }
    Some(widths)
}

/// Module widths of an Interleaved 2 of 5 symbol with wide runs `ratio`
/// modules wide
///
/// `digits` must have an even, non-zero length.
#[cfg(feature = "i25")]
pub fn i25_widths(digits: &str, ratio: u32) -> Option<Vec<u32>> {
    let bytes = digits.as_bytes();
    if bytes.is_empty() || bytes.len() % 2 != 0 || ratio < 2 {
        return None;
    }
    let width = |bit: u8| if bit == 1 { ratio } else { 1 };

    let mut widths = vec![1, 1, 1, 1];
    for pair in bytes.chunks(2) {
        let a = i25::encoding(pair[0].checked_sub(b'0')?)?;
        let b = i25::encoding(pair[1].checked_sub(b'0')?)?;
        for i in (0..5).rev() {
            widths.push(width(a >> i & 1));
            widths.push(width(b >> i & 1));
        }
    }
    widths.extend([ratio, 1, 1]);
    Some(widths)
}

/// Rasterize module widths into one row of pixels
///
/// Runs alternate bar, space, bar, ... Each module is `unit` pixels and a
/// quiet zone of `quiet` modules is added on both sides.
pub fn render_row(widths: &[u32], unit: u32, quiet: u32) -> Vec<u8> {
    let unit = unit.max(1) as usize;
    let total: u32 = widths.iter().sum::<u32>() + 2 * quiet;
    let mut row = Vec::with_capacity(total as usize * unit);
    row.resize(quiet as usize * unit, WHITE);
    for (i, &w) in widths.iter().enumerate() {
        let color = if i % 2 == 0 { BLACK } else { WHITE };
        row.extend(std::iter::repeat(color).take(w as usize * unit));
    }
    row.resize(total as usize * unit, WHITE);
    row
}

/// Rasterize module widths with a fractional module size
///
/// Each pixel takes the share of its area covered by bars, so an edge that
/// falls inside a pixel comes out grey. The row is rounded up to whole
/// pixels at the end.
pub fn render_row_scaled(widths: &[u32], unit: f32, quiet: u32) -> Vec<u8> {
    let unit = unit.max(1.0);
    let modules = widths.iter().sum::<u32>() + 2 * quiet;
    let len = (modules as f32 * unit).ceil() as usize;
    let mut coverage = vec![0f32; len];

    let mut x = quiet as f32 * unit;
    for (i, &w) in widths.iter().enumerate() {
        let end = x + w as f32 * unit;
        if i % 2 == 0 {
            let first = x.floor() as usize;
            let last = (end.ceil() as usize).min(len);
            for (p, c) in coverage.iter_mut().enumerate().take(last).skip(first) {
                let px = p as f32;
                *c += (end.min(px + 1.0) - x.max(px)).max(0.0);
            }
        }
        x = end;
    }

    coverage
        .iter()
        .map(|c| (WHITE as f32 * (1.0 - c.min(1.0))).round() as u8)
        .collect()
}

fn image_from_row(row: &[u8], height: u32) -> GrayImage {
    GrayImage::from_fn(row.len() as u32, height, |x, _| {
        ::image::Luma([row[x as usize]])
    })
}

/// Rasterize module widths into an image `height` rows tall
pub fn render_image(widths: &[u32], unit: u32, quiet: u32, height: u32) -> GrayImage {
    image_from_row(&render_row(widths, unit, quiet), height)
}

/// [`render_row_scaled`] repeated over `height` rows
pub fn render_image_scaled(widths: &[u32], unit: f32, quiet: u32, height: u32) -> GrayImage {
    image_from_row(&render_row_scaled(widths, unit, quiet), height)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_row() {
        assert_eq!(
            render_row(&[1, 2, 1], 2, 1),
            [255, 255, 0, 0, 255, 255, 255, 255, 0, 0, 255, 255]
        );
    }

    #[test]
    fn test_render_row_scaled() {
        // the bar covers pixel 1 by half and pixel 2 fully
        assert_eq!(render_row_scaled(&[1], 1.5, 1), [255, 128, 0, 255, 255]);
        // whole units match the crisp renderer
        assert_eq!(render_row_scaled(&[1, 2, 1], 2.0, 1), render_row(&[1, 2, 1], 2, 1));
    }

    #[test]
    #[cfg(feature = "ean")]
    fn test_ean_module_count() {
        assert_eq!(ean_widths("400638133393").unwrap().iter().sum::<u32>(), 95);
        assert_eq!(ean_widths("9638507").unwrap().iter().sum::<u32>(), 67);
        assert_eq!(ean_check_digit("03600029145"), Some('2'));
        assert!(ean_widths("12345").is_none());
        assert!(ean_widths("40063813339x").is_none());
    }

    #[test]
    #[cfg(feature = "code128")]
    fn test_code128_layout() {
        // start, 3 data, check, stop (13 modules)
        let widths = code128_widths("ABC").unwrap();
        assert_eq!(widths.iter().sum::<u32>(), 5 * 11 + 13);
        assert_eq!(widths.len() % 2, 1);
        // "1234" packs into two code set C symbols
        assert_eq!(code128_widths("1234").unwrap().iter().sum::<u32>(), 4 * 11 + 13);
        assert!(code128_widths("caf\u{e9}").is_none());
    }

    #[test]
    #[cfg(feature = "code39")]
    fn test_code39_layout() {
        // 3 characters with delimiters, 15 modules each at 3:1, two gaps
        let widths = code39_widths("A", 3).unwrap();
        assert_eq!(widths.iter().sum::<u32>(), 3 * 15 + 2);
        assert!(code39_widths("a", 3).is_none());
        assert_eq!(code39_check("CODE39"), Some('W'));
    }

    #[test]
    #[cfg(feature = "i25")]
    fn test_i25_layout() {
        let widths = i25_widths("12", 3).unwrap();
        assert_eq!(widths.len(), 4 + 10 + 3);
        assert_eq!(widths.iter().sum::<u32>(), 4 + 18 + 5);
        assert!(i25_widths("123", 3).is_none());
    }
}
