//! Run-length tokenizer
//!
//! Walks one logical scan line at a time and turns it into alternating
//! bar/space runs. Two corrections are applied while walking:
//!
//! * the binarization threshold follows the local contrast, so uneven
//!   illumination does not merge bars into their neighbouring spaces;
//! * each edge is placed at sub-pixel precision from the grey pixels on
//!   both sides of it, and runs are rounded edge to edge so the rounding
//!   error of one run is carried into the next.

use crate::color::Color;
use crate::direction::{Axis, Direction};
use crate::image::LuminanceSource;

/// Luminance drop (or rise) against the running mean that moves the threshold
const CONTRAST: u32 = 50;
/// Upper clamp when the threshold is raised inside a space
const THRESHOLD_MAX: u8 = 220;
/// Lower clamp when the threshold is lowered inside a bar
const THRESHOLD_MIN: u8 = 80;
/// Edge positions are snapped to this many steps per pixel before rounding
const SUBPIXEL: u32 = 8;
/// Below this spread between the two runs an edge is taken as crisp
const MIN_EDGE_CONTRAST: u8 = 16;

/// One bar or space run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Token {
    pub color: Color,
    /// Run length in pixels after sub-pixel correction
    pub width: u32,
}

impl Token {
    #[inline]
    pub fn new(color: Color, width: u32) -> Self {
        Self { color, width }
    }

    #[inline]
    pub fn bar(width: u32) -> Self {
        Self::new(Color::Bar, width)
    }

    #[inline]
    pub fn space(width: u32) -> Self {
        Self::new(Color::Space, width)
    }
}

/// Produces [`Token`]s from a [`LuminanceSource`] along one direction
///
/// Call [`next_line`](Self::next_line) to move to the next logical scan line,
/// then [`next_token`](Self::next_token) until it returns `None`.
pub struct Tokenizer<'a, S: ?Sized> {
    source: &'a S,
    axis: Axis,
    concurrent_lines: u32,
    line_skip: u32,
    next_line: u32,
    line: Option<u32>,
    samples: Vec<u8>,
    /// First pixel classified into the next run
    pos: usize,
    /// Sub-pixel edge where the next run starts
    edge: f32,
    /// Rounded pixel where the next token starts
    origin: u32,
    initial_threshold: u8,
    threshold: u8,
}

impl<'a, S: LuminanceSource + ?Sized> Tokenizer<'a, S> {
    /// Create a tokenizer over `source`
    ///
    /// `concurrent_lines` raster lines are averaged into each logical line
    /// and consecutive logical lines start `line_skip` raster lines apart.
    pub fn new(
        source: &'a S,
        direction: Direction,
        threshold: u8,
        concurrent_lines: u32,
        line_skip: u32,
    ) -> Self {
        Self {
            source,
            axis: Axis::new(direction, source.width(), source.height()),
            concurrent_lines: concurrent_lines.max(1),
            line_skip: line_skip.max(1),
            next_line: 0,
            line: None,
            samples: Vec::new(),
            pos: 0,
            edge: 0.0,
            origin: 0,
            initial_threshold: threshold,
            threshold,
        }
    }

    pub fn direction(&self) -> Direction {
        self.axis.direction()
    }

    /// Advance to the next logical scan line
    ///
    /// Returns the index of the first raster line it covers, or `None` once
    /// the image is exhausted. The threshold starts over on every line.
    pub fn next_line(&mut self) -> Option<u32> {
        if self.axis.length() == 0 || self.next_line >= self.axis.lines() {
            self.line = None;
            self.samples.clear();
            return None;
        }

        let line = self.next_line;
        self.next_line = self.next_line.saturating_add(self.line_skip);
        self.axis
            .sample(self.source, line, self.concurrent_lines, &mut self.samples);
        self.line = Some(line);
        self.pos = 0;
        self.edge = 0.0;
        self.origin = 0;
        self.threshold = self.initial_threshold;
        Some(line)
    }

    /// Current raster line, if any
    pub fn line(&self) -> Option<u32> {
        self.line
    }

    /// Pixels on the current scan line
    pub fn line_length(&self) -> u32 {
        self.samples.len() as u32
    }

    /// Pixel offset where the next token starts
    pub fn position(&self) -> u32 {
        self.origin
    }

    /// Current (possibly adapted) binarization threshold
    pub fn threshold(&self) -> u8 {
        self.threshold
    }

    /// Image coordinates of `pos` on the current line
    pub(crate) fn point(&self, pos: u32) -> (u32, u32) {
        let pos = pos.min(self.line_length().saturating_sub(1));
        self.axis.point(self.line.unwrap_or(0), pos)
    }

    /// Read the next run on the current line
    pub fn next_token(&mut self) -> Option<Token> {
        let first = *self.samples.get(self.pos)?;
        let color = Color::classify(first, self.threshold);

        let mut sum = first as u32;
        let mut count = 1u32;
        let mut purest = first;
        let mut end = self.pos + 1;
        while let Some(&lum) = self.samples.get(end) {
            // A deviation the next pixel does not repeat is an edge ramp
            let plateau = self
                .samples
                .get(end + 1)
                .is_some_and(|&next| (next.abs_diff(lum) as u32) < CONTRAST / 2);
            if plateau {
                self.adapt(color, lum, sum / count);
            }
            if Color::classify(lum, self.threshold) != color {
                break;
            }
            sum += lum as u32;
            count += 1;
            purest = color.purest(purest, lum);
            end += 1;
        }

        let edge = if end < self.samples.len() {
            self.edge_after(color, end - 1, purest)
        } else {
            self.samples.len() as f32
        };
        let width = snap(edge).saturating_sub(self.origin).max(1);
        self.origin += width;
        self.edge = edge;
        self.pos = end;

        Some(Token::new(color, width))
    }

    /// Sub-pixel position of the edge after the run ending at pixel `last`
    ///
    /// The run's last pixel and the next run's first pixel are both split by
    /// their luminance between the purest values of the two runs. Bar
    /// coverage already given to the previous edge is not counted twice.
    fn edge_after(&self, color: Color, last: usize, purest: u8) -> f32 {
        let next = color.flip();
        let ahead = self.samples[last + 1..]
            .iter()
            .take_while(|&&lum| Color::classify(lum, self.threshold) == next)
            .fold(self.samples[last + 1], |acc, &lum| next.purest(acc, lum));
        let (dark, bright) = match color {
            Color::Bar => (purest, ahead),
            Color::Space => (ahead, purest),
        };

        let a = last as f32;
        if bright.saturating_sub(dark) < MIN_EDGE_CONTRAST {
            return a + 1.0;
        }

        let d = |lum: u8| darkness(lum, dark, bright);
        let covered = d(self.samples[last]) + d(self.samples[last + 1]);
        let floor = a.max(self.edge);
        let edge = match color {
            Color::Bar => floor + covered,
            Color::Space => a + 2.0 - covered + (self.edge - a).max(0.0),
        };
        edge.clamp(floor, a + 2.0)
    }

    /// Move the threshold when a pixel deviates strongly from its run
    fn adapt(&mut self, color: Color, lum: u8, mean: u32) {
        let lum32 = lum as u32;
        match color {
            Color::Space if lum32 + CONTRAST < mean => {
                let t = ((mean + lum32) / 2).min(THRESHOLD_MAX as u32) as u8;
                if t > self.threshold {
                    self.threshold = t;
                }
            }
            Color::Bar if lum32 > mean + CONTRAST => {
                let t = ((mean + lum32) / 2).max(THRESHOLD_MIN as u32) as u8;
                if t < self.threshold {
                    self.threshold = t;
                }
            }
            _ => {}
        }
    }
}

/// Bar coverage of a pixel, 0 at `bright` and 1 at `dark`
fn darkness(lum: u8, dark: u8, bright: u8) -> f32 {
    let span = bright.saturating_sub(dark).max(1) as f32;
    ((bright as f32 - lum as f32) / span).clamp(0.0, 1.0)
}

/// Round an edge to whole pixels, halves up, after snapping it to the
/// sub-pixel grid
fn snap(edge: f32) -> u32 {
    let steps = (edge * SUBPIXEL as f32).round() as u32;
    (steps + SUBPIXEL / 2) / SUBPIXEL
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Image;

    fn row(samples: &[u8]) -> Image {
        Image::from_gray(samples, samples.len() as u32, 1).unwrap()
    }

    fn tokens(img: &Image, direction: Direction, threshold: u8) -> Vec<Token> {
        let mut tok = Tokenizer::new(img, direction, threshold, 1, 1);
        tok.next_line().unwrap();
        std::iter::from_fn(|| tok.next_token()).collect()
    }

    #[test]
    fn crisp_runs_keep_integer_widths() {
        let mut px = vec![255u8; 4];
        px.extend([0; 3]);
        px.extend([255; 2]);
        px.extend([0; 1]);
        let img = row(&px);
        assert_eq!(
            tokens(&img, Direction::LeftRight, 150),
            vec![
                Token::space(4),
                Token::bar(3),
                Token::space(2),
                Token::bar(1)
            ]
        );
    }

    #[test]
    fn reversed_direction_reverses_runs() {
        let mut px = vec![255u8; 4];
        px.extend([0; 2]);
        let img = row(&px);
        assert_eq!(
            tokens(&img, Direction::RightLeft, 150),
            vec![Token::bar(2), Token::space(4)]
        );
    }

    #[test]
    fn line_without_transitions_is_one_token() {
        let img = row(&[255; 17]);
        assert_eq!(
            tokens(&img, Direction::LeftRight, 150),
            vec![Token::space(17)]
        );
    }

    #[test]
    fn grey_pixel_is_split_by_luminance() {
        // mostly dark: the bar reaches past the middle of the grey pixel
        let img = row(&[0, 0, 0, 96, 255, 255, 255, 255]);
        assert_eq!(
            tokens(&img, Direction::LeftRight, 100),
            vec![Token::bar(4), Token::space(4)]
        );

        // mostly light, and classified as space by the threshold
        let img = row(&[0, 0, 0, 160, 255, 255, 255, 255]);
        assert_eq!(
            tokens(&img, Direction::LeftRight, 100),
            vec![Token::bar(3), Token::space(5)]
        );
    }

    #[test]
    fn antialiased_row_at_fractional_unit() {
        // 2.5 px per module: every other edge falls in the middle of a pixel
        let px = crate::synth::render_row_scaled(&[1, 3, 1, 1, 3], 2.5, 10);
        assert_eq!(px.len(), 73);
        assert_eq!(px[27], 128);
        let img = row(&px);
        let toks = tokens(&img, Direction::LeftRight, 150);
        assert_eq!(
            toks,
            vec![
                Token::space(25),
                Token::bar(3),
                Token::space(7),
                Token::bar(3),
                Token::space(2),
                Token::bar(8),
                Token::space(25),
            ]
        );

        // the same runs read backwards keep their widths within a pixel
        let reversed = tokens(&img, Direction::RightLeft, 150);
        assert_eq!(reversed.len(), toks.len());
        for (r, t) in reversed.iter().rev().zip(&toks) {
            assert_eq!(r.color, t.color);
            assert!(r.width.abs_diff(t.width) <= 1, "{reversed:?}");
        }
    }

    #[test]
    fn position_tracks_rounded_edges() {
        let px = crate::synth::render_row_scaled(&[1, 1, 1], 2.5, 2);
        let img = row(&px);
        let mut tok = Tokenizer::new(&img, Direction::LeftRight, 150, 1, 1);
        tok.next_line();
        let mut starts = Vec::new();
        while tok.next_token().is_some() {
            starts.push(tok.position());
        }
        // edges at 5, 7.5, 10 and 12.5, line end at 17.5 rounded up
        assert_eq!(starts, [5, 8, 10, 13, 18]);
    }

    #[test]
    fn snap_rounds_halves_up() {
        assert_eq!(snap(3.0), 3);
        assert_eq!(snap(3.49), 3);
        assert_eq!(snap(3.498), 4);
        assert_eq!(snap(3.502), 4);
        assert_eq!(snap(3.6), 4);
    }

    #[test]
    fn total_length_is_preserved() {
        let px = [255, 200, 40, 30, 90, 240, 250, 60, 20, 180, 255, 255];
        let img = row(&px);
        let toks = tokens(&img, Direction::LeftRight, 150);
        let total: u32 = toks.iter().map(|t| t.width).sum();
        assert!((total as i32 - px.len() as i32).abs() <= 1, "{toks:?}");
    }

    #[test]
    fn threshold_rises_for_dark_pixels_in_bright_space() {
        // a dim "bar" at 170 on a 255 background stays above the threshold
        // of 150, but is far darker than the running mean
        let mut px = vec![255u8; 6];
        px.extend([170; 3]);
        px.extend([255; 6]);
        let img = row(&px);
        let mut tok = Tokenizer::new(&img, Direction::LeftRight, 150, 1, 1);
        tok.next_line();
        let first = tok.next_token().unwrap();
        assert_eq!(first, Token::space(6));
        assert!(tok.threshold() > 170);
        let second = tok.next_token().unwrap();
        assert_eq!(second.color, Color::Bar);
        assert_eq!(second.width, 3);
    }

    #[test]
    fn edge_ramp_pixel_does_not_move_threshold() {
        // the grey pixel after the bar is a ramp towards the space, not
        // shading inside the bar
        let img = row(&[0, 0, 0, 0, 120, 255, 255, 255]);
        let mut tok = Tokenizer::new(&img, Direction::LeftRight, 150, 1, 1);
        tok.next_line();
        assert_eq!(tok.next_token(), Some(Token::bar(5)));
        assert!(tok.threshold() > 120);
        assert_eq!(tok.next_token(), Some(Token::space(3)));
    }

    #[test]
    fn threshold_is_clamped() {
        let mut px = vec![255u8; 4];
        px.extend([0; 4]);
        px.extend([200; 4]);
        let img = row(&px);
        let mut tok = Tokenizer::new(&img, Direction::LeftRight, 150, 1, 1);
        tok.next_line();
        while tok.next_token().is_some() {}
        assert!(tok.threshold() >= THRESHOLD_MIN && tok.threshold() <= THRESHOLD_MAX);
    }

    #[test]
    fn lines_follow_line_skip() {
        let img = Image::from_gray(&[255; 4 * 20], 4, 20).unwrap();
        let mut tok = Tokenizer::new(&img, Direction::LeftRight, 150, 2, 8);
        assert_eq!(tok.next_line(), Some(0));
        assert_eq!(tok.next_line(), Some(8));
        assert_eq!(tok.next_line(), Some(16));
        assert_eq!(tok.next_line(), None);

        let mut tok = Tokenizer::new(&img, Direction::TopDown, 150, 1, 3);
        assert_eq!(tok.next_line(), Some(0));
        assert_eq!(tok.line_length(), 20);
        assert_eq!(tok.next_line(), Some(3));
        assert_eq!(tok.next_line(), None);
    }
}
