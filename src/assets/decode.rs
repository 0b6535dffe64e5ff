use anyhow::Context;

use crate::foundation::error::ReelResult;
use crate::render::frame::FrameRGBA;

/// Decode an encoded image (PNG, JPEG, ...) into premultiplied RGBA8.
pub fn decode_image(bytes: &[u8]) -> ReelResult<FrameRGBA> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();

    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);

    FrameRGBA::from_premul(width, height, rgba8_premul)
}

/// Nearest-neighbour resize, keeping pixel art crisp.
///
/// Nearest sampling never mixes neighbouring pixels, so it is safe on premultiplied data.
pub fn resize_nearest(src: &FrameRGBA, width: u32, height: u32) -> FrameRGBA {
    if src.width == width && src.height == height {
        return src.clone();
    }
    let Some(buf) = image::RgbaImage::from_raw(src.width, src.height, src.data.clone()) else {
        return FrameRGBA::transparent(width, height);
    };
    let out = image::imageops::resize(&buf, width, height, image::imageops::FilterType::Nearest);
    FrameRGBA {
        width,
        height,
        data: out.into_raw(),
        premultiplied: src.premultiplied,
    }
}

fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((px[0] as u16 * a + 127) / 255) as u8;
        px[1] = ((px[1] as u16 * a + 127) / 255) as u8;
        px[2] = ((px[2] as u16 * a + 127) / 255) as u8;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
