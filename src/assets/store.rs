use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::assets::catalog::Catalog;
use crate::assets::decode::{decode_image, resize_nearest};
use crate::foundation::error::{ReelError, ReelResult};
use crate::render::frame::FrameRGBA;

/// Side length of dialogue-box portraits.
pub const PORTRAIT_SIZE: u32 = 48;

/// Read-only asset tree plus its catalog.
///
/// All lookups take paths relative to the root and go through [`normalize_rel_path`], so a
/// script can never reach outside the library.
#[derive(Clone, Debug)]
pub struct AssetLibrary {
    root: PathBuf,
    catalog: Catalog,
}

impl AssetLibrary {
    /// Open a library, reading `<root>/catalog.json` when present.
    #[tracing::instrument(skip_all, fields(root = %root.as_ref().display()))]
    pub fn open(root: impl AsRef<Path>) -> ReelResult<Self> {
        let root = root.as_ref().to_path_buf();
        if !root.is_dir() {
            return Err(ReelError::validation(format!(
                "asset root '{}' is not a directory",
                root.display()
            )));
        }
        let catalog_path = root.join("catalog.json");
        let catalog = if catalog_path.is_file() {
            let text = std::fs::read_to_string(&catalog_path)
                .with_context(|| format!("read catalog '{}'", catalog_path.display()))?;
            Catalog::from_json(&text)?
        } else {
            tracing::debug!("no catalog.json, using built-in defaults");
            Catalog::default()
        };
        Ok(Self { root, catalog })
    }

    pub fn with_catalog(root: impl Into<PathBuf>, catalog: Catalog) -> Self {
        Self {
            root: root.into(),
            catalog,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Absolute path for a library-relative asset path.
    pub fn resolve(&self, rel: &str) -> ReelResult<PathBuf> {
        Ok(self.root.join(normalize_rel_path(rel)?))
    }

    pub fn exists(&self, rel: &str) -> bool {
        self.resolve(rel).map(|p| p.is_file()).unwrap_or(false)
    }

    pub fn read_bytes(&self, rel: &str) -> ReelResult<Vec<u8>> {
        let path = self.resolve(rel)?;
        let bytes =
            std::fs::read(&path).with_context(|| format!("read asset '{}'", path.display()))?;
        Ok(bytes)
    }

    /// Load an image, treating absent and undecodable files alike as missing.
    ///
    /// Callers decide which warning a `None` turns into.
    pub fn load_image(&self, rel: &str) -> Option<FrameRGBA> {
        if !self.exists(rel) {
            tracing::debug!(asset = rel, "image not found");
            return None;
        }
        match self.read_bytes(rel).and_then(|b| decode_image(&b)) {
            Ok(img) => Some(img),
            Err(e) => {
                tracing::debug!(asset = rel, error = %e, "image failed to decode");
                None
            }
        }
    }

    /// Portrait thumbnail for the dialogue box, if the character has one.
    pub fn load_portrait(&self, character: &str) -> Option<FrameRGBA> {
        self.load_image(&format!("ui/portraits/{character}_portrait.png"))
            .map(|img| resize_nearest(&img, PORTRAIT_SIZE, PORTRAIT_SIZE))
    }

    /// Optional end-card backdrop.
    pub fn load_end_card_template(&self) -> Option<FrameRGBA> {
        self.load_image("ui/endcard_template.png")
    }
}

/// Normalize and validate library-relative asset paths.
///
/// The result uses `/` separators, drops `.` segments, and rejects absolute paths and parent
/// traversals (`..`).
pub(crate) fn normalize_rel_path(source: &str) -> ReelResult<String> {
    let s = source.replace('\\', "/");
    if s.is_empty() {
        return Err(ReelError::validation("asset path must be non-empty"));
    }
    if s.starts_with('/') || s.contains(':') {
        return Err(ReelError::validation(format!(
            "asset path '{source}' must be relative"
        )));
    }

    let mut out = Vec::<&str>::new();
    for part in s.split('/') {
        match part {
            "" | "." => continue,
            ".." => {
                return Err(ReelError::validation(format!(
                    "asset path '{source}' must not contain '..'"
                )));
            }
            _ => out.push(part),
        }
    }

    if out.is_empty() {
        return Err(ReelError::validation("asset path must contain a file name"));
    }
    Ok(out.join("/"))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/store.rs"]
mod tests;
