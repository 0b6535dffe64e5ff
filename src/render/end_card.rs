use crate::assets::backgrounds::FALLBACK_COLOR;
use crate::assets::decode::resize_nearest;
use crate::foundation::core::{Fps, Rgba8Premul};
use crate::render::config::RenderConfig;
use crate::render::frame::FrameRGBA;
use crate::text::glyphs::{GlyphSource, draw_text};
use crate::text::layout::DialogueLayout;

const WHITE: Rgba8Premul = Rgba8Premul {
    r: 255,
    g: 255,
    b: 255,
    a: 255,
};

const ACCENT: Rgba8Premul = Rgba8Premul {
    r: 255,
    g: 204,
    b: 0,
    a: 255,
};

/// What the closing card says.
#[derive(Clone, Debug, PartialEq)]
pub struct EndCard {
    pub episode_id: String,
    pub title: String,
    pub series: String,
}

impl EndCard {
    /// Render the single static end-card image.
    ///
    /// Layout, top to bottom and horizontally centered: episode id, the title wrapped to 80% of
    /// the frame width, then the series name.
    pub fn render(
        &self,
        template: Option<&FrameRGBA>,
        glyphs: &dyn GlyphSource,
        config: &RenderConfig,
    ) -> FrameRGBA {
        let (w, h) = (config.width, config.height);
        let mut frame = match template {
            Some(t) => {
                let mut f = FrameRGBA::filled(w, h, FALLBACK_COLOR);
                f.blit_over(&resize_nearest(t, w, h), 0, 0);
                f
            }
            None => FrameRGBA::filled(w, h, FALLBACK_COLOR),
        };

        let unit = (f64::from(h) / 1080.0).max(1.0 / 64.0);
        let id_px = (28.0 * unit).max(1.0) as f32;
        let title_px = (48.0 * unit).max(1.0) as f32;
        let series_px = (24.0 * unit).max(1.0) as f32;
        let gap = (title_px * 0.5).round();

        // Only the wrap is needed here; the reveal clock is unused.
        let title_rows = DialogueLayout::new(
            &self.title,
            glyphs,
            title_px,
            w as f32 * 0.8,
            Fps::default(),
            1.0,
        )
        .row_strings();

        let mut lines: Vec<(&str, f32, Rgba8Premul)> =
            vec![(self.episode_id.as_str(), id_px, ACCENT)];
        lines.extend(title_rows.iter().map(|r| (r.as_str(), title_px, WHITE)));
        lines.push((self.series.as_str(), series_px, ACCENT));

        let block_h: f32 = lines.iter().map(|(_, px, _)| px + gap).sum::<f32>() - gap;
        let mut top = (h as f32 - block_h) / 2.0;
        for (text, px, color) in lines {
            let width = glyphs.measure(text, px);
            let x = (w as f32 - width) / 2.0;
            draw_text(&mut frame, glyphs, text, px, x, top + glyphs.ascent(px), color);
            top += px + gap;
        }
        frame
    }

    /// Number of end-card frames for `secs` seconds.
    pub fn frame_count(secs: f64, fps: Fps) -> u64 {
        if secs <= 0.0 {
            0
        } else {
            fps.secs_to_frames_round(secs)
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/end_card.rs"]
mod tests;
