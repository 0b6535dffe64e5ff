//! Word wrapping and typewriter timing for dialogue lines.
//!
//! A line is wrapped once. Its reveal is driven by a single character cursor over the
//! whitespace-normalized text minus the spaces consumed by line breaks, so wrapped rows fill
//! strictly in order and every reveal step shows something.

use std::ops::Range;

use crate::foundation::core::Fps;
use crate::render::config::RenderConfig;
use crate::text::glyphs::GlyphSource;

/// Seconds the full text stays up after the reveal.
pub const HOLD_SECS: f64 = 2.0;

/// Pixel geometry of the dialogue box contents, scaled from a 200px-tall reference box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoxMetrics {
    pub text_px: f32,
    pub name_px: f32,
    pub padding: u32,
    pub border: u32,
    pub name_top: u32,
    pub text_top: u32,
    pub line_gap: u32,
    pub portrait: u32,
}

impl BoxMetrics {
    pub fn for_config(config: &RenderConfig) -> Self {
        let s = f64::from(config.text_box_height) / 200.0;
        let px = |v: f64| ((v * s).round() as u32).max(1);
        Self {
            text_px: (16.0 * s).max(1.0) as f32,
            name_px: (14.0 * s).max(1.0) as f32,
            padding: px(12.0),
            border: 2,
            name_top: px(12.0),
            text_top: px(38.0),
            line_gap: px(6.0),
            portrait: px(48.0),
        }
    }

    /// Left edge of the name and text columns.
    pub fn text_left(&self, has_portrait: bool) -> u32 {
        if has_portrait {
            self.portrait + self.padding * 2
        } else {
            self.padding
        }
    }

    /// Width available to wrapped text.
    pub fn text_width(&self, box_width: u32, has_portrait: bool) -> f32 {
        box_width
            .saturating_sub(self.text_left(has_portrait))
            .saturating_sub(self.padding) as f32
    }

    /// Vertical distance between wrapped rows.
    pub fn line_height(&self) -> u32 {
        self.text_px.round() as u32 + self.line_gap
    }
}

/// Typewriter timing for a fixed number of characters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RevealClock {
    total_chars: usize,
    frames_per_char: f64,
    hold_frames: u64,
}

impl RevealClock {
    pub fn new(total_chars: usize, fps: Fps, chars_per_second: f64) -> Self {
        Self {
            total_chars,
            frames_per_char: fps.as_f64() / chars_per_second,
            hold_frames: fps.secs_to_frames_round(HOLD_SECS),
        }
    }

    pub fn total_chars(&self) -> usize {
        self.total_chars
    }

    /// Frames spent revealing, computed in floating point before rounding up.
    pub fn typewriter_frames(&self) -> u64 {
        (self.total_chars as f64 * self.frames_per_char).ceil() as u64
    }

    pub fn hold_frames(&self) -> u64 {
        self.hold_frames
    }

    pub fn frame_count(&self) -> u64 {
        self.typewriter_frames() + self.hold_frames
    }

    /// Characters visible at `frame`; past the reveal this is every character.
    pub fn chars_shown(&self, frame: u64) -> usize {
        if frame >= self.typewriter_frames() {
            return self.total_chars;
        }
        let typed = (frame as f64 / self.frames_per_char).floor() as usize + 1;
        typed.min(self.total_chars)
    }

    /// First frame at which character `index` is visible.
    pub fn reveal_frame(&self, index: usize) -> u64 {
        if index == 0 {
            return 0;
        }
        ((index as f64 * self.frames_per_char).ceil() as u64).min(self.typewriter_frames())
    }
}

/// A wrapped dialogue line and its reveal clock.
#[derive(Clone, Debug, PartialEq)]
pub struct DialogueLayout {
    chars: Vec<char>,
    rows: Vec<Range<usize>>,
    clock: RevealClock,
}

impl DialogueLayout {
    pub fn new(
        text: &str,
        glyphs: &dyn GlyphSource,
        px: f32,
        max_width: f32,
        fps: Fps,
        chars_per_second: f64,
    ) -> Self {
        let normalized = text.split_whitespace().collect::<Vec<_>>().join(" ");
        let words: Vec<char> = normalized.chars().collect();

        // Break spaces are never drawn, so they are dropped and rows become contiguous.
        let mut chars = Vec::with_capacity(words.len());
        let mut rows = Vec::new();
        for row in wrap_rows(&words, glyphs, px, max_width) {
            let start = chars.len();
            chars.extend_from_slice(&words[row]);
            rows.push(start..chars.len());
        }
        let clock = RevealClock::new(chars.len(), fps, chars_per_second);
        Self { chars, rows, clock }
    }

    pub fn clock(&self) -> RevealClock {
        self.clock
    }

    pub fn chars(&self) -> &[char] {
        &self.chars
    }

    /// Character ranges of each wrapped row. Rows are contiguous and cover every character.
    pub fn rows(&self) -> &[Range<usize>] {
        &self.rows
    }

    /// Text of each wrapped row.
    pub fn row_strings(&self) -> Vec<String> {
        self.rows
            .iter()
            .map(|r| self.chars[r.clone()].iter().collect())
            .collect()
    }

    /// Frames (relative to the line start) at which a blip plays: every `interval`-th non-space
    /// character, starting with the first.
    pub fn blip_frames(&self, interval: usize) -> Vec<u64> {
        let interval = interval.max(1);
        self.chars
            .iter()
            .enumerate()
            .filter(|(_, ch)| !ch.is_whitespace())
            .enumerate()
            .filter(|(n, _)| n % interval == 0)
            .map(|(_, (index, _))| self.clock.reveal_frame(index))
            .collect()
    }
}

/// Greedy word wrap by measured advance. Words wider than a row break between characters.
fn wrap_rows(
    chars: &[char],
    glyphs: &dyn GlyphSource,
    px: f32,
    max_width: f32,
) -> Vec<Range<usize>> {
    let width_of =
        |r: Range<usize>| -> f32 { chars[r].iter().map(|&c| glyphs.advance(c, px)).sum() };
    let space_w = glyphs.advance(' ', px);

    let mut rows = Vec::new();
    let mut current: Option<(usize, usize, f32)> = None;

    let mut i = 0;
    while i < chars.len() {
        let start = i;
        while i < chars.len() && chars[i] != ' ' {
            i += 1;
        }
        let word = start..i;
        i += 1;

        if let Some((row_start, row_end, w)) = current {
            let word_w = width_of(word.clone());
            if w + space_w + word_w <= max_width {
                current = Some((row_start, word.end, w + space_w + word_w));
                continue;
            }
            rows.push(row_start..row_end);
        }
        current = Some(place_first_word(word, &width_of, max_width, &mut rows));
    }
    if let Some((row_start, row_end, _)) = current {
        rows.push(row_start..row_end);
    }
    rows
}

/// Start a row with `word`, spilling whole rows first when the word alone is too wide.
fn place_first_word(
    word: Range<usize>,
    width_of: &dyn Fn(Range<usize>) -> f32,
    max_width: f32,
    rows: &mut Vec<Range<usize>>,
) -> (usize, usize, f32) {
    let mut start = word.start;
    while word.end - start > 1 && width_of(start..word.end) > max_width {
        let mut take = 1;
        while start + take < word.end && width_of(start..start + take + 1) <= max_width {
            take += 1;
        }
        rows.push(start..start + take);
        start += take;
    }
    (start, word.end, width_of(start..word.end))
}

#[cfg(test)]
#[path = "../../tests/unit/text/layout.rs"]
mod tests;
