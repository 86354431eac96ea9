use std::path::Path;

use xxhash_rust::xxh3::Xxh3;

use crate::{
    batch::artifacts::{ArtifactLayout, SnapshotPair},
    effects::{glitch::GlitchRecipe, shift::ShiftVector},
    foundation::error::{CapsuleError, CapsuleResult},
};

const XXH3_SEED: u64 = 0x5eed_c0de_7a11_0b5e;

/// How the batch decides that a pair is already processed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CachePolicy {
    /// Skip a pair when both artifacts exist. Inputs edited after the artifacts
    /// were written are not noticed.
    #[default]
    Exists,
    /// Also require a stamp whose fingerprint matches the current input bytes,
    /// threshold and glitch recipe.
    ContentHash,
}

/// 128-bit fingerprint of everything that determines a pair's artifacts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PairFingerprint {
    /// High 64 bits.
    pub hi: u64,
    /// Low 64 bits.
    pub lo: u64,
}

impl PairFingerprint {
    /// Lowercase 32-digit hex form stored in stamp files.
    pub fn to_hex(self) -> String {
        format!("{:016x}{:016x}", self.hi, self.lo)
    }
}

struct StableHasher {
    inner: Xxh3,
}

impl StableHasher {
    fn new() -> Self {
        Self {
            inner: Xxh3::with_seed(XXH3_SEED),
        }
    }

    fn write_bytes(&mut self, b: &[u8]) {
        self.inner.update(b);
    }

    fn write_u64(&mut self, v: u64) {
        self.write_bytes(&v.to_le_bytes());
    }

    fn write_blob(&mut self, b: &[u8]) {
        self.write_u64(b.len() as u64);
        self.write_bytes(b);
    }

    fn write_shift(&mut self, s: ShiftVector) {
        self.write_bytes(&s.dx.to_le_bytes());
        self.write_bytes(&s.dy.to_le_bytes());
    }

    fn finish(self) -> PairFingerprint {
        let v = self.inner.digest128();
        PairFingerprint {
            hi: (v >> 64) as u64,
            lo: v as u64,
        }
    }
}

/// Fingerprint both input files together with the parameters that shape the output.
pub fn fingerprint_pair(
    pair: &SnapshotPair,
    threshold: u8,
    recipe: &GlitchRecipe,
) -> CapsuleResult<PairFingerprint> {
    let mut h = StableHasher::new();
    for path in [&pair.earlier, &pair.later] {
        h.write_blob(&read_input(path)?);
    }
    h.write_bytes(&[threshold]);
    for shift in [recipe.red, recipe.green, recipe.blue] {
        h.write_shift(shift.earlier);
        h.write_shift(shift.later);
    }
    Ok(h.finish())
}

fn read_input(path: &Path) -> CapsuleResult<Vec<u8>> {
    std::fs::read(path).map_err(|e| CapsuleError::decode(path, e))
}

#[derive(Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
struct PairStamp {
    earlier: String,
    later: String,
    fingerprint: String,
}

/// Result of a cache probe.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CacheLookup {
    /// Artifacts are present and current; nothing to do.
    Hit,
    /// The pair must be (re)computed. Carries the fingerprint to stamp afterwards
    /// under [`CachePolicy::ContentHash`].
    Miss(Option<PairFingerprint>),
}

/// Skip-on-existence artifact cache with an optional content check.
#[derive(Clone, Debug)]
pub struct ArtifactCache {
    layout: ArtifactLayout,
    policy: CachePolicy,
}

impl ArtifactCache {
    /// Cache over `layout` using `policy`.
    pub fn new(layout: ArtifactLayout, policy: CachePolicy) -> Self {
        Self { layout, policy }
    }

    /// Output layout backing this cache.
    pub fn layout(&self) -> &ArtifactLayout {
        &self.layout
    }

    /// Active policy.
    pub fn policy(&self) -> CachePolicy {
        self.policy
    }

    /// Decide whether `pair` needs work.
    pub fn lookup(
        &self,
        pair: &SnapshotPair,
        threshold: u8,
        recipe: &GlitchRecipe,
    ) -> CapsuleResult<CacheLookup> {
        match self.policy {
            CachePolicy::Exists => Ok(if self.layout.is_complete(pair) {
                CacheLookup::Hit
            } else {
                CacheLookup::Miss(None)
            }),
            CachePolicy::ContentHash => {
                let fp = fingerprint_pair(pair, threshold, recipe)?;
                if self.layout.is_complete(pair) && self.read_stamp(pair) == Some(fp.to_hex()) {
                    Ok(CacheLookup::Hit)
                } else {
                    Ok(CacheLookup::Miss(Some(fp)))
                }
            }
        }
    }

    /// Persist the stamp for a freshly written pair. No-op without a fingerprint.
    pub fn record(&self, pair: &SnapshotPair, fp: Option<PairFingerprint>) -> CapsuleResult<()> {
        let Some(fp) = fp else {
            return Ok(());
        };
        let stamp = PairStamp {
            earlier: pair.earlier_stem(),
            later: pair.later_stem(),
            fingerprint: fp.to_hex(),
        };
        let path = self.layout.stamp_path(pair);
        let json = serde_json::to_vec_pretty(&stamp)
            .map_err(|e| CapsuleError::Other(anyhow::Error::new(e)))?;
        std::fs::write(&path, json).map_err(|e| CapsuleError::io(&path, e))
    }

    fn read_stamp(&self, pair: &SnapshotPair) -> Option<String> {
        let path = self.layout.stamp_path(pair);
        let bytes = std::fs::read(&path).ok()?;
        match serde_json::from_slice::<PairStamp>(&bytes) {
            Ok(stamp) => Some(stamp.fingerprint),
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "ignoring unreadable stamp");
                None
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/batch/cache.rs"]
mod tests;
