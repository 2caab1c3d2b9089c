use serde::Deserialize;
use std::path::{Path, PathBuf};

/// JSON object embedded in the score page; other keys are ignored
#[derive(Debug, Clone, Deserialize)]
pub struct ScorePayload {
    pub name: String,
    #[serde(rename = "thumbnailUrl")]
    pub thumbnail_url: String,
}

/// A raster thumbnail and its vector counterpart stored under one sanitized name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreAssetPair {
    pub name: String,
    pub png_url: String,
    pub svg_url: String,
}

impl ScoreAssetPair {
    pub fn dir(&self, root: &Path) -> PathBuf {
        root.join(&self.name)
    }

    pub fn png_path(&self, root: &Path) -> PathBuf {
        self.dir(root).join(format!("{}.png", self.name))
    }

    pub fn svg_path(&self, root: &Path) -> PathBuf {
        self.dir(root).join(format!("{}.svg", self.name))
    }
}

pub mod fetch;
pub mod page;
