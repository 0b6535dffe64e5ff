use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::assets::catalog::{Catalog, TENSE_MUSIC, UPBEAT_MUSIC};
use crate::assets::store::AssetLibrary;
use crate::foundation::error::{ReelError, ReelResult};
use crate::render::config::RenderConfig;
use crate::scene::model::Script;
use crate::session::episode::{ComposeOpts, EpisodeComposer, EpisodeOutput};

/// Shortest scene a pacing change may produce, in seconds.
pub const MIN_SCENE_SECS: f64 = 4.0;

/// Shortest explicit dialogue duration a pacing change may produce, in milliseconds.
pub const MIN_LINE_MS: f64 = 1000.0;

/// Alternate cuts of one script offered side by side.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VariantPreset {
    /// Script pacing with the situation-matched track.
    Standard,
    /// Faster pacing over the upbeat track.
    Upbeat,
    /// Slower pacing, tense track and a longer punchline hold.
    Tense,
}

impl VariantPreset {
    pub const ALL: [VariantPreset; 3] = [Self::Standard, Self::Upbeat, Self::Tense];

    pub fn name(self) -> &'static str {
        match self {
            Self::Standard => "Standard",
            Self::Upbeat => "Upbeat",
            Self::Tense => "Tense",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::Standard => "Default pacing, situation-matched music",
            Self::Upbeat => "Faster pacing, energetic music",
            Self::Tense => "Slower pacing, tense underscore, extended punchline hold",
        }
    }

    /// Factor applied to scene and line durations.
    pub fn pacing(self) -> f64 {
        match self {
            Self::Standard => 1.0,
            Self::Upbeat => 0.85,
            Self::Tense => 1.15,
        }
    }

    /// Seconds added to the final scene.
    pub fn punchline_hold_secs(self) -> f64 {
        match self {
            Self::Standard => 2.0,
            Self::Upbeat => 1.0,
            Self::Tense => 3.0,
        }
    }

    /// Track for this variant, falling back to the catalog default when the preset's own track
    /// is not in the library.
    pub fn music(self, script: &Script, library: &AssetLibrary) -> String {
        let preferred = match self {
            Self::Standard => return select_music(script, library.catalog()),
            Self::Upbeat => UPBEAT_MUSIC,
            Self::Tense => TENSE_MUSIC,
        };
        if library.exists(preferred) {
            preferred.to_string()
        } else {
            library.catalog().music.default.clone()
        }
    }
}

/// Background track for a script: situation table, then mood table, then the default track.
pub fn select_music(script: &Script, catalog: &Catalog) -> String {
    let table = &catalog.music;
    let meta = &script.metadata;
    meta.situation
        .as_ref()
        .and_then(|s| table.situations.get(s))
        .or_else(|| meta.mood.as_ref().and_then(|m| table.moods.get(m)))
        .unwrap_or(&table.default)
        .clone()
}

/// Copy of `script` with every duration scaled by `multiplier` and `hold_secs` added to the last
/// scene.
///
/// Scaled durations are floored to whole seconds (scenes) or milliseconds (lines) and kept at
/// [`MIN_SCENE_SECS`] and [`MIN_LINE_MS`] or above. Lines without an explicit duration keep
/// following their text length.
pub fn adjust_pacing(script: &Script, multiplier: f64, hold_secs: f64) -> Script {
    let mut adjusted = script.clone();
    for scene in &mut adjusted.scenes {
        scene.duration_seconds = (scene.duration_seconds * multiplier)
            .floor()
            .max(MIN_SCENE_SECS);
        for line in &mut scene.dialogue {
            if let Some(ms) = line.duration_ms.as_mut() {
                *ms = (*ms * multiplier).floor().max(MIN_LINE_MS);
            }
        }
    }
    if let Some(last) = adjusted.scenes.last_mut() {
        last.duration_seconds += hold_secs.max(0.0);
    }
    adjusted
}

/// One variant ready to render.
#[derive(Clone, Debug, PartialEq)]
pub struct VariantPlan {
    /// 1-based position in the variant list.
    pub number: usize,
    pub preset: VariantPreset,
    pub script: Script,
    pub music: String,
}

impl VariantPlan {
    /// Output file name, e.g. `ep001_v2_widescreen.mp4`.
    pub fn file_name(&self, config: &RenderConfig) -> String {
        format!(
            "{}_v{}_{}.mp4",
            self.script.episode_id.to_lowercase(),
            self.number,
            config.label
        )
    }
}

/// Plan the first `count` presets (2 or 3) for `script`.
pub fn plan_variants(
    script: &Script,
    library: &AssetLibrary,
    count: usize,
) -> ReelResult<Vec<VariantPlan>> {
    if !(2..=VariantPreset::ALL.len()).contains(&count) {
        return Err(ReelError::validation(format!(
            "variant count must be 2 or 3 (got {count})"
        )));
    }
    Ok(VariantPreset::ALL[..count]
        .iter()
        .enumerate()
        .map(|(i, &preset)| VariantPlan {
            number: i + 1,
            preset,
            script: adjust_pacing(script, preset.pacing(), preset.punchline_hold_secs()),
            music: preset.music(script, library),
        })
        .collect())
}

/// A rendered variant.
#[derive(Clone, Debug, PartialEq)]
pub struct VariantOutput {
    pub number: usize,
    pub preset: VariantPreset,
    pub output: EpisodeOutput,
}

/// Render 2 or 3 variants of `script` into `out_dir`, in parallel.
///
/// Each variant is an independent [`EpisodeComposer`] run with its own render context; nothing
/// mutable is shared between them. The first failure is returned.
#[tracing::instrument(skip_all, fields(episode = %script.episode_id, count = count))]
pub fn render_variants(
    script: &Script,
    library: &AssetLibrary,
    config: &RenderConfig,
    opts: &ComposeOpts,
    out_dir: &Path,
    count: usize,
) -> ReelResult<Vec<VariantOutput>> {
    script.validate(opts.fps)?;
    let plans = plan_variants(script, library, count)?;
    plans
        .into_par_iter()
        .map(|plan| -> ReelResult<VariantOutput> {
            let out: PathBuf = out_dir.join(plan.file_name(config));
            tracing::info!(
                variant = plan.number,
                preset = plan.preset.name(),
                music = %plan.music,
                "variant start"
            );
            let opts = ComposeOpts {
                music: Some(plan.music.clone()),
                ..opts.clone()
            };
            let composer = EpisodeComposer::new(library, config.clone(), opts)?;
            let output = composer.compose(&plan.script, &out)?;
            Ok(VariantOutput {
                number: plan.number,
                preset: plan.preset,
                output,
            })
        })
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/session/variants.rs"]
mod tests;
