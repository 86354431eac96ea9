//! Engine configuration.
//!
//! Every field has a default, so a JSON file only needs to name what it changes:
//!
//! ```json
//! { "threshold": 30, "cache": "content_hash", "threading": { "parallel": true } }
//! ```

use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use crate::{
    batch::{cache::CachePolicy, driver::BatchThreading},
    effects::{diff::DEFAULT_THRESHOLD, glitch::GlitchRecipe},
    foundation::error::{CapsuleError, CapsuleResult},
};

/// Directories, threshold and batch options for a run.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct CapsuleConfig {
    /// Where captured screenshots are read from.
    pub screenshots_dir: PathBuf,
    /// Where mask artifacts are written.
    pub masks_dir: PathBuf,
    /// Where glitch artifacts are written.
    pub glitches_dir: PathBuf,
    /// Max channel delta that still counts as unchanged.
    pub threshold: u8,
    /// How already-processed pairs are detected.
    pub cache: CachePolicy,
    /// Sequential or rayon-parallel pair processing.
    pub threading: BatchThreading,
    /// Per-channel glitch shift vectors.
    pub recipe: GlitchRecipe,
}

impl Default for CapsuleConfig {
    fn default() -> Self {
        Self {
            screenshots_dir: PathBuf::from("media/screenshots"),
            masks_dir: PathBuf::from("media/masks"),
            glitches_dir: PathBuf::from("media/glitches"),
            threshold: DEFAULT_THRESHOLD,
            cache: CachePolicy::default(),
            threading: BatchThreading::default(),
            recipe: GlitchRecipe::default(),
        }
    }
}

impl CapsuleConfig {
    /// Load a JSON configuration file.
    pub fn from_path(path: impl AsRef<Path>) -> CapsuleResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            CapsuleError::validation(format!("open config JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Parse a JSON configuration from a reader.
    pub fn from_reader(r: impl std::io::Read) -> CapsuleResult<Self> {
        let cfg: Self = serde_json::from_reader(r)
            .map_err(|e| CapsuleError::validation(format!("parse config JSON: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject configurations the batch cannot run with.
    pub fn validate(&self) -> CapsuleResult<()> {
        for (name, dir) in [
            ("screenshots_dir", &self.screenshots_dir),
            ("masks_dir", &self.masks_dir),
            ("glitches_dir", &self.glitches_dir),
        ] {
            if dir.as_os_str().is_empty() {
                return Err(CapsuleError::validation(format!("{name} must not be empty")));
            }
        }
        if self.threading.threads == Some(0) {
            return Err(CapsuleError::validation(
                "threading.threads must be >= 1 when set",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
