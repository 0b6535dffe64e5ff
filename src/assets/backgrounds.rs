use crate::assets::decode::resize_nearest;
use crate::assets::store::AssetLibrary;
use crate::foundation::core::Rgba8Premul;
use crate::render::camera::{CameraPose, layer_depth, parallax_offset, parallax_zoom};
use crate::render::config::RenderConfig;
use crate::render::frame::FrameRGBA;
use crate::session::context::{RenderContext, RenderWarning};

/// Layer file names inside `backgrounds/<location>/`, back to front.
pub const LAYER_FILES: [&str; 4] = [
    "background.png",
    "midground.png",
    "foreground.png",
    "effects.png",
];

/// Fill used when a location has no background art (`#1A1A3A`).
pub const FALLBACK_COLOR: Rgba8Premul = Rgba8Premul {
    r: 26,
    g: 26,
    b: 58,
    a: 255,
};

/// One background image and how strongly it follows the camera.
#[derive(Clone, Debug, PartialEq)]
pub struct ParallaxLayer {
    /// Frame-sized premultiplied image.
    pub image: FrameRGBA,
    /// Parallax depth in `[0, 1]`.
    pub depth: f64,
}

/// Background art for one location, resolved once per scene.
#[derive(Clone, Debug, PartialEq)]
pub enum BackgroundSet {
    /// Per-location layer folder with one to four layers.
    Layered(Vec<ParallaxLayer>),
    /// Single flattened image.
    Flat(ParallaxLayer),
    /// Nothing found; a static solid fill.
    Solid(FrameRGBA),
}

impl BackgroundSet {
    /// Resolve background art for `location`, scaled to the config's frame size.
    ///
    /// Never fails: when neither a layer folder nor a flat image exists, a solid layer is returned
    /// and a warning naming the location is recorded.
    pub fn load(
        library: &AssetLibrary,
        location: &str,
        config: &RenderConfig,
        ctx: &mut RenderContext,
    ) -> Self {
        let (w, h) = (config.width, config.height);

        let layers: Vec<ParallaxLayer> = LAYER_FILES
            .iter()
            .enumerate()
            .filter_map(|(slot, name)| {
                library
                    .load_image(&format!("backgrounds/{location}/{name}"))
                    .map(|img| ParallaxLayer {
                        image: resize_nearest(&img, w, h),
                        depth: layer_depth(slot),
                    })
            })
            .collect();
        if !layers.is_empty() {
            tracing::debug!(location, layers = layers.len(), "layered background");
            return Self::Layered(layers);
        }

        if let Some(img) = library.load_image(&format!("backgrounds/{location}.png")) {
            tracing::debug!(location, "flat background");
            return Self::Flat(ParallaxLayer {
                image: resize_nearest(&img, w, h),
                depth: layer_depth(0),
            });
        }

        ctx.warn(RenderWarning::missing_background(location));
        Self::Solid(FrameRGBA::filled(w, h, FALLBACK_COLOR))
    }

    /// Layers in compositing order. Solid backgrounds have none.
    pub fn layers(&self) -> &[ParallaxLayer] {
        match self {
            Self::Layered(layers) => layers,
            Self::Flat(layer) => std::slice::from_ref(layer),
            Self::Solid(_) => &[],
        }
    }

    /// Paint the background for `pose` into `frame`, which is first cleared to opaque black.
    pub fn paint(&self, frame: &mut FrameRGBA, pose: CameraPose) {
        if let Self::Solid(fill) = self {
            frame.blit_over(fill, 0, 0);
            return;
        }
        frame.fill_rect(
            0,
            0,
            frame.width,
            frame.height,
            Rgba8Premul::opaque(0, 0, 0),
        );
        for layer in self.layers() {
            let off = parallax_offset(pose, layer.depth);
            let zoom = parallax_zoom(pose, layer.depth);
            frame.blit_layer_transformed(&layer.image, (off.x, off.y), zoom);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/backgrounds.rs"]
mod tests;
