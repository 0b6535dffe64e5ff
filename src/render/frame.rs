use crate::foundation::core::Rgba8Premul;
use crate::foundation::error::{ReelError, ReelResult};
use crate::foundation::math::mul_div255_u8;

/// A frame (or any raster surface) as RGBA8 pixels.
///
/// Frames are **premultiplied alpha** throughout the pipeline. The `premultiplied` flag is kept
/// to make this explicit at API boundaries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRGBA {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    /// Whether the `data` is premultiplied alpha.
    pub premultiplied: bool,
}

impl FrameRGBA {
    /// Fully transparent surface.
    pub fn transparent(width: u32, height: u32) -> Self {
        Self::filled(width, height, Rgba8Premul::transparent())
    }

    /// Surface filled with a single color.
    pub fn filled(width: u32, height: u32, color: Rgba8Premul) -> Self {
        let px = color.to_array();
        let mut data = Vec::with_capacity(width as usize * height as usize * 4);
        for _ in 0..(width as usize * height as usize) {
            data.extend_from_slice(&px);
        }
        Self {
            width,
            height,
            data,
            premultiplied: true,
        }
    }

    /// Wrap premultiplied RGBA8 bytes, checking the buffer length.
    pub fn from_premul(width: u32, height: u32, data: Vec<u8>) -> ReelResult<Self> {
        if data.len() != width as usize * height as usize * 4 {
            return Err(ReelError::validation(format!(
                "rgba8 buffer length {} does not match {width}x{height}",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data,
            premultiplied: true,
        })
    }

    /// Read one pixel. Out-of-bounds reads return transparent.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        if x >= self.width || y >= self.height {
            return [0, 0, 0, 0];
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        [
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ]
    }

    /// Composite `src` over this surface with its top-left corner at `(x, y)`.
    ///
    /// Pixels falling outside this surface are clipped.
    pub fn blit_over(&mut self, src: &FrameRGBA, x: i64, y: i64) {
        let Some((dx0, dy0, sx0, sy0, w, h)) =
            clip_blit(self.width, self.height, src.width, src.height, x, y)
        else {
            return;
        };

        for row in 0..h {
            let d_off = ((dy0 + row) * self.width as usize + dx0) * 4;
            let s_off = ((sy0 + row) * src.width as usize + sx0) * 4;
            let d_row = &mut self.data[d_off..d_off + w * 4];
            let s_row = &src.data[s_off..s_off + w * 4];
            for (d, s) in d_row.chunks_exact_mut(4).zip(s_row.chunks_exact(4)) {
                let out = over([d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]]);
                d.copy_from_slice(&out);
            }
        }
    }

    /// Composite a full-frame layer shifted by `-offset` and scaled by `zoom` about the center.
    ///
    /// Nearest-neighbour sampling keeps pixel art crisp. With `zoom == 1` this is an integer
    /// shift of the layer.
    pub fn blit_layer_transformed(&mut self, layer: &FrameRGBA, offset: (f64, f64), zoom: f64) {
        let zoom = zoom.max(1e-3);
        let cx = f64::from(self.width) / 2.0;
        let cy = f64::from(self.height) / 2.0;
        if (zoom - 1.0).abs() < 1e-9 {
            let x = -offset.0.round() as i64;
            let y = -offset.1.round() as i64;
            self.blit_over(layer, x, y);
            return;
        }

        let inv = 1.0 / zoom;
        let w = self.width as usize;
        for y in 0..self.height {
            let sy = ((f64::from(y) + 0.5 - cy) * inv + cy + offset.1).floor();
            if sy < 0.0 || sy >= f64::from(layer.height) {
                continue;
            }
            let sy = sy as usize;
            for x in 0..self.width {
                let sx = ((f64::from(x) + 0.5 - cx) * inv + cx + offset.0).floor();
                if sx < 0.0 || sx >= f64::from(layer.width) {
                    continue;
                }
                let s_i = (sy * layer.width as usize + sx as usize) * 4;
                let d_i = (y as usize * w + x as usize) * 4;
                let s = [
                    layer.data[s_i],
                    layer.data[s_i + 1],
                    layer.data[s_i + 2],
                    layer.data[s_i + 3],
                ];
                let d = [
                    self.data[d_i],
                    self.data[d_i + 1],
                    self.data[d_i + 2],
                    self.data[d_i + 3],
                ];
                self.data[d_i..d_i + 4].copy_from_slice(&over(d, s));
            }
        }
    }

    /// Overwrite a rectangle with `color` (no blending).
    pub fn fill_rect(&mut self, x: u32, y: u32, w: u32, h: u32, color: Rgba8Premul) {
        let x1 = x.saturating_add(w).min(self.width);
        let y1 = y.saturating_add(h).min(self.height);
        let px = color.to_array();
        for yy in y..y1 {
            for xx in x..x1 {
                let i = (yy as usize * self.width as usize + xx as usize) * 4;
                self.data[i..i + 4].copy_from_slice(&px);
            }
        }
    }

    /// Draw a rectangle outline `thickness` pixels wide along the inside of the bounds.
    pub fn stroke_rect(
        &mut self,
        x: u32,
        y: u32,
        w: u32,
        h: u32,
        thickness: u32,
        color: Rgba8Premul,
    ) {
        let t = thickness.min(w / 2).min(h / 2);
        self.fill_rect(x, y, w, t, color);
        self.fill_rect(x, y + h.saturating_sub(t), w, t, color);
        self.fill_rect(x, y, t, h, color);
        self.fill_rect(x + w.saturating_sub(t), y, t, h, color);
    }

    /// Blend an 8-bit coverage mask tinted with `color` at `(x, y)`.
    pub fn blend_coverage(
        &mut self,
        coverage: &[u8],
        cov_w: usize,
        cov_h: usize,
        x: i64,
        y: i64,
        color: Rgba8Premul,
    ) {
        let Some((dx0, dy0, sx0, sy0, w, h)) =
            clip_blit(self.width, self.height, cov_w as u32, cov_h as u32, x, y)
        else {
            return;
        };
        let c = color.to_array();
        for row in 0..h {
            for col in 0..w {
                let cov = u16::from(coverage[(sy0 + row) * cov_w + sx0 + col]);
                if cov == 0 {
                    continue;
                }
                let src = [
                    mul_div255_u8(u16::from(c[0]), cov),
                    mul_div255_u8(u16::from(c[1]), cov),
                    mul_div255_u8(u16::from(c[2]), cov),
                    mul_div255_u8(u16::from(c[3]), cov),
                ];
                let i = ((dy0 + row) * self.width as usize + dx0 + col) * 4;
                let d = [
                    self.data[i],
                    self.data[i + 1],
                    self.data[i + 2],
                    self.data[i + 3],
                ];
                self.data[i..i + 4].copy_from_slice(&over(d, src));
            }
        }
    }

    /// Convert to a straight-alpha `image` buffer (for PNG output).
    pub fn to_rgba_image(&self) -> image::RgbaImage {
        let mut out = self.data.clone();
        if self.premultiplied {
            for px in out.chunks_exact_mut(4) {
                let a = u32::from(px[3]);
                if a == 0 || a == 255 {
                    continue;
                }
                for c in &mut px[..3] {
                    *c = ((u32::from(*c) * 255 + a / 2) / a).min(255) as u8;
                }
            }
        }
        image::RgbaImage::from_raw(self.width, self.height, out)
            .unwrap_or_else(|| image::RgbaImage::new(self.width, self.height))
    }
}

/// Source-over for premultiplied RGBA8.
pub(crate) fn over(dst: [u8; 4], src: [u8; 4]) -> [u8; 4] {
    let sa = src[3];
    if sa == 0 {
        return dst;
    }
    if sa == 255 {
        return src;
    }
    let inv = 255u16 - u16::from(sa);
    let mut out = [0u8; 4];
    for i in 0..4 {
        out[i] = src[i].saturating_add(mul_div255_u8(u16::from(dst[i]), inv));
    }
    out
}

/// Clip a `src_w x src_h` blit at `(x, y)` against a `dst_w x dst_h` surface.
///
/// Returns `(dst_x, dst_y, src_x, src_y, width, height)` of the visible region.
fn clip_blit(
    dst_w: u32,
    dst_h: u32,
    src_w: u32,
    src_h: u32,
    x: i64,
    y: i64,
) -> Option<(usize, usize, usize, usize, usize, usize)> {
    let dx0 = x.max(0);
    let dy0 = y.max(0);
    let dx1 = (x + i64::from(src_w)).min(i64::from(dst_w));
    let dy1 = (y + i64::from(src_h)).min(i64::from(dst_h));
    if dx0 >= dx1 || dy0 >= dy1 {
        return None;
    }
    Some((
        dx0 as usize,
        dy0 as usize,
        (dx0 - x) as usize,
        (dy0 - y) as usize,
        (dx1 - dx0) as usize,
        (dy1 - dy0) as usize,
    ))
}

#[cfg(test)]
#[path = "../../tests/unit/render/frame.rs"]
mod tests;
