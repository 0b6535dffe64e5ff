use std::sync::Arc;

use crate::assets::store::AssetLibrary;
use crate::foundation::core::Rgba8Premul;
use crate::foundation::error::{ReelError, ReelResult};
use crate::render::frame::FrameRGBA;
use crate::session::context::{RenderContext, RenderWarning};

/// Coverage mask for one glyph plus its placement relative to the pen position.
#[derive(Clone, Debug, PartialEq)]
pub struct GlyphBitmap {
    pub width: usize,
    pub height: usize,
    /// Left edge relative to the pen x.
    pub xmin: i32,
    /// Bottom edge relative to the baseline, positive up.
    pub ymin: i32,
    /// 8-bit coverage, row-major.
    pub coverage: Vec<u8>,
}

impl GlyphBitmap {
    /// Top-left corner when the pen sits at `(pen_x, baseline)` in a y-down raster.
    pub fn origin(&self, pen_x: f32, baseline: f32) -> (i64, i64) {
        let x = (pen_x + self.xmin as f32).round() as i64;
        let y = (baseline - (self.ymin + self.height as i32) as f32).round() as i64;
        (x, y)
    }
}

/// Anything that can measure and rasterize single characters.
pub trait GlyphSource: Send + Sync {
    /// Horizontal advance of `ch` at `px` pixels per em.
    fn advance(&self, ch: char, px: f32) -> f32;

    /// Coverage mask for `ch` at `px`.
    fn rasterize(&self, ch: char, px: f32) -> GlyphBitmap;

    /// Distance from the top of a line to its baseline.
    fn ascent(&self, px: f32) -> f32;

    /// Width of `text` laid out on one line.
    fn measure(&self, text: &str, px: f32) -> f32 {
        text.chars().map(|ch| self.advance(ch, px)).sum()
    }
}

/// TrueType/OpenType glyphs rasterized by `fontdue`.
pub struct FontGlyphs {
    font: fontdue::Font,
}

impl FontGlyphs {
    pub fn from_bytes(bytes: &[u8]) -> ReelResult<Self> {
        let font = fontdue::Font::from_bytes(bytes, fontdue::FontSettings::default())
            .map_err(|e| ReelError::asset(format!("parse font: {e}")))?;
        Ok(Self { font })
    }
}

impl GlyphSource for FontGlyphs {
    fn advance(&self, ch: char, px: f32) -> f32 {
        self.font.metrics(ch, px).advance_width
    }

    fn rasterize(&self, ch: char, px: f32) -> GlyphBitmap {
        let (metrics, coverage) = self.font.rasterize(ch, px);
        GlyphBitmap {
            width: metrics.width,
            height: metrics.height,
            xmin: metrics.xmin,
            ymin: metrics.ymin,
            coverage,
        }
    }

    fn ascent(&self, px: f32) -> f32 {
        self.font
            .horizontal_line_metrics(px)
            .map(|m| m.ascent)
            .unwrap_or(px)
    }
}

/// Fixed-advance block glyphs used when the dialogue font cannot be loaded.
///
/// Every visible character is a solid square sitting on the baseline, so text stays legible as
/// a reveal animation and measurements stay deterministic.
#[derive(Clone, Copy, Debug, Default)]
pub struct BlockGlyphs;

impl GlyphSource for BlockGlyphs {
    fn advance(&self, _ch: char, px: f32) -> f32 {
        px.max(1.0).round()
    }

    fn rasterize(&self, ch: char, px: f32) -> GlyphBitmap {
        if ch.is_whitespace() {
            return GlyphBitmap {
                width: 0,
                height: 0,
                xmin: 0,
                ymin: 0,
                coverage: Vec::new(),
            };
        }
        let side = ((px * 0.75).round() as usize).max(1);
        GlyphBitmap {
            width: side,
            height: side,
            xmin: 0,
            ymin: 0,
            coverage: vec![255; side * side],
        }
    }

    fn ascent(&self, px: f32) -> f32 {
        px.max(1.0).round()
    }
}

/// Draw `text` on one line with its pen starting at `(x, baseline)`. Returns the advance used.
pub fn draw_text(
    frame: &mut FrameRGBA,
    source: &dyn GlyphSource,
    text: &str,
    px: f32,
    x: f32,
    baseline: f32,
    color: Rgba8Premul,
) -> f32 {
    let mut pen = x;
    for ch in text.chars() {
        let g = source.rasterize(ch, px);
        let (gx, gy) = g.origin(pen, baseline);
        frame.blend_coverage(&g.coverage, g.width, g.height, gx, gy, color);
        pen += source.advance(ch, px);
    }
    pen - x
}

/// Load the catalog font, falling back to [`BlockGlyphs`] with a warning.
pub fn load_glyph_source(
    library: &AssetLibrary,
    ctx: &mut RenderContext,
) -> Arc<dyn GlyphSource> {
    let path = library.catalog().font.clone();
    let parsed = library
        .read_bytes(&path)
        .and_then(|bytes| FontGlyphs::from_bytes(&bytes));
    match parsed {
        Ok(font) => {
            tracing::debug!(font = %path, "dialogue font loaded");
            Arc::new(font)
        }
        Err(e) => {
            tracing::debug!(font = %path, error = %e, "dialogue font unavailable");
            ctx.warn(RenderWarning::missing_font(&path));
            Arc::new(BlockGlyphs)
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/text/glyphs.rs"]
mod tests;
