use std::path::{Path, PathBuf};

use crate::foundation::error::{CapsuleError, CapsuleResult};

/// Separator placed between the two stems of an artifact name.
pub const PAIR_SEPARATOR: &str = "__";

/// Two temporally adjacent screenshots.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SnapshotPair {
    /// Position of `earlier` in the input sequence.
    pub index: usize,
    /// The earlier screenshot.
    pub earlier: PathBuf,
    /// The later screenshot.
    pub later: PathBuf,
}

impl SnapshotPair {
    /// File stem of the earlier screenshot.
    pub fn earlier_stem(&self) -> String {
        file_stem(&self.earlier)
    }

    /// File stem of the later screenshot.
    pub fn later_stem(&self) -> String {
        file_stem(&self.later)
    }

    /// `"<earlier>__<later>"`, the key shared by both artifacts.
    pub fn artifact_name(&self) -> String {
        format!(
            "{}{PAIR_SEPARATOR}{}",
            self.earlier_stem(),
            self.later_stem()
        )
    }
}

impl std::fmt::Display for SnapshotPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}", self.earlier_stem(), self.later_stem())
    }
}

fn file_stem(p: &Path) -> String {
    p.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Pair each screenshot with its successor. The order of `paths` is kept as is.
pub fn consecutive_pairs(paths: &[PathBuf]) -> CapsuleResult<Vec<SnapshotPair>> {
    if paths.len() < 2 {
        return Err(CapsuleError::InsufficientInput {
            available: paths.len(),
        });
    }
    Ok(paths
        .windows(2)
        .enumerate()
        .map(|(index, w)| SnapshotPair {
            index,
            earlier: w[0].clone(),
            later: w[1].clone(),
        })
        .collect())
}

/// Which artifact the viewer should overlay for a pair.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Overlay {
    /// The full-color glitch composite.
    Glitch(PathBuf),
    /// The black/white change mask, used when no glitch exists.
    Mask(PathBuf),
}

/// Where mask and glitch artifacts live on disk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArtifactLayout {
    /// Directory holding `<name>_mask.png` files.
    pub masks_dir: PathBuf,
    /// Directory holding `<name>.png` glitch files.
    pub glitches_dir: PathBuf,
}

impl ArtifactLayout {
    /// Build a layout from the two output directories.
    pub fn new(masks_dir: impl Into<PathBuf>, glitches_dir: impl Into<PathBuf>) -> Self {
        Self {
            masks_dir: masks_dir.into(),
            glitches_dir: glitches_dir.into(),
        }
    }

    /// Path of the mask artifact for `pair`.
    pub fn mask_path(&self, pair: &SnapshotPair) -> PathBuf {
        self.masks_dir
            .join(format!("{}_mask.png", pair.artifact_name()))
    }

    /// Path of the glitch artifact for `pair`.
    pub fn glitch_path(&self, pair: &SnapshotPair) -> PathBuf {
        self.glitches_dir
            .join(format!("{}.png", pair.artifact_name()))
    }

    /// Path of the content stamp kept next to the glitch artifact.
    pub fn stamp_path(&self, pair: &SnapshotPair) -> PathBuf {
        self.glitches_dir
            .join(format!("{}.stamp.json", pair.artifact_name()))
    }

    /// Whether both artifacts for `pair` exist.
    pub fn is_complete(&self, pair: &SnapshotPair) -> bool {
        self.mask_path(pair).is_file() && self.glitch_path(pair).is_file()
    }

    /// Glitch artifact if present, otherwise the mask, otherwise nothing.
    pub fn overlay_for(&self, pair: &SnapshotPair) -> Option<Overlay> {
        let glitch = self.glitch_path(pair);
        if glitch.is_file() {
            return Some(Overlay::Glitch(glitch));
        }
        let mask = self.mask_path(pair);
        mask.is_file().then_some(Overlay::Mask(mask))
    }

    /// Create both output directories. Safe to call repeatedly.
    pub fn ensure_dirs(&self) -> CapsuleResult<()> {
        for dir in [&self.masks_dir, &self.glitches_dir] {
            std::fs::create_dir_all(dir).map_err(|e| CapsuleError::io(dir, e))?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/batch/artifacts.rs"]
mod tests;
