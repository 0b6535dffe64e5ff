use std::sync::Arc;

use crate::assets::decode::resize_nearest;
use crate::foundation::core::{Fps, Rgba8Premul};
use crate::render::config::RenderConfig;
use crate::render::frame::FrameRGBA;
use crate::text::glyphs::{GlyphBitmap, GlyphSource, draw_text};
use crate::text::layout::{BoxMetrics, DialogueLayout, RevealClock};

/// `#1A1A3A` at roughly 85% opacity.
pub const BOX_FILL: Rgba8Premul = Rgba8Premul {
    r: 22,
    g: 22,
    b: 49,
    a: 216,
};

const BORDER: Rgba8Premul = Rgba8Premul {
    r: 255,
    g: 255,
    b: 255,
    a: 255,
};

const TEXT_COLOR: Rgba8Premul = BORDER;

/// Who is speaking, as shown in the box header.
#[derive(Clone, Debug, PartialEq)]
pub struct Speaker {
    pub name: String,
    pub color: Rgba8Premul,
    pub portrait: Option<FrameRGBA>,
}

#[derive(Clone, Debug)]
struct PlacedGlyph {
    index: usize,
    x: i64,
    y: i64,
    bitmap: Arc<GlyphBitmap>,
}

/// Typewriter dialogue box for one line.
///
/// The static parts (fill, border, portrait, name) are drawn once; glyphs are rasterized once in
/// reveal order. Each frame is the base plus the glyphs revealed so far.
#[derive(Clone, Debug)]
pub struct DialogueBox {
    base: FrameRGBA,
    glyphs: Vec<PlacedGlyph>,
    layout: DialogueLayout,
}

impl DialogueBox {
    pub fn new(
        speaker: &Speaker,
        text: &str,
        source: &dyn GlyphSource,
        config: &RenderConfig,
        fps: Fps,
        chars_per_second: f64,
    ) -> Self {
        let m = BoxMetrics::for_config(config);
        let (w, h) = (config.text_box_width, config.text_box_height);
        let has_portrait = speaker.portrait.is_some();
        let left = m.text_left(has_portrait);

        let mut base = FrameRGBA::filled(w, h, BOX_FILL);
        base.stroke_rect(0, 0, w, h, m.border, BORDER);
        if let Some(portrait) = &speaker.portrait {
            let p = resize_nearest(portrait, m.portrait, m.portrait);
            base.blit_over(&p, i64::from(m.padding), i64::from(m.padding));
        }
        let name_baseline = m.name_top as f32 + source.ascent(m.name_px);
        draw_text(
            &mut base,
            source,
            &speaker.name,
            m.name_px,
            left as f32,
            name_baseline,
            speaker.color,
        );

        let layout = DialogueLayout::new(
            text,
            source,
            m.text_px,
            m.text_width(w, has_portrait),
            fps,
            chars_per_second,
        );

        let ascent = source.ascent(m.text_px);
        let mut glyphs = Vec::with_capacity(layout.chars().len());
        for (row_i, row) in layout.rows().iter().enumerate() {
            let baseline = (m.text_top + row_i as u32 * m.line_height()) as f32 + ascent;
            let mut pen = left as f32;
            for index in row.clone() {
                let ch = layout.chars()[index];
                let bitmap = source.rasterize(ch, m.text_px);
                if bitmap.width > 0 && bitmap.height > 0 {
                    let (x, y) = bitmap.origin(pen, baseline);
                    glyphs.push(PlacedGlyph {
                        index,
                        x,
                        y,
                        bitmap: Arc::new(bitmap),
                    });
                }
                pen += source.advance(ch, m.text_px);
            }
        }

        Self {
            base,
            glyphs,
            layout,
        }
    }

    pub fn layout(&self) -> &DialogueLayout {
        &self.layout
    }

    pub fn clock(&self) -> RevealClock {
        self.layout.clock()
    }

    /// Reveal plus hold.
    pub fn frame_count(&self) -> u64 {
        self.clock().frame_count()
    }

    /// Box image at `index`; indices past the end show the full text.
    pub fn frame(&self, index: u64) -> FrameRGBA {
        let shown = self.clock().chars_shown(index);
        let mut out = self.base.clone();
        for g in self.glyphs.iter().take_while(|g| g.index < shown) {
            out.blend_coverage(
                &g.bitmap.coverage,
                g.bitmap.width,
                g.bitmap.height,
                g.x,
                g.y,
                TEXT_COLOR,
            );
        }
        out
    }

    /// Every frame in order, produced on demand.
    pub fn frames(&self) -> impl Iterator<Item = FrameRGBA> + '_ {
        (0..self.frame_count()).map(move |i| self.frame(i))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/text/dialogue_box.rs"]
mod tests;
