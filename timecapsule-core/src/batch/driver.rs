use std::collections::HashMap;
use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::{
    assets::{
        decode::load_grid,
        encode::{write_grid_png, write_mask_png},
    },
    batch::{
        artifacts::{ArtifactLayout, SnapshotPair, consecutive_pairs},
        cache::{ArtifactCache, CacheLookup},
    },
    config::CapsuleConfig,
    effects::{
        align::align,
        diff::change_mask,
        glitch::{GlitchRecipe, synthesize_glitch},
    },
    foundation::{
        error::{CapsuleError, CapsuleResult},
        grid::{ChangeMask, PixelGrid},
    },
};

/// Threading options for a batch run.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct BatchThreading {
    /// Process pairs on a dedicated rayon pool instead of the calling thread.
    pub parallel: bool,
    /// Override the number of rayon worker threads. `None` uses rayon defaults.
    pub threads: Option<usize>,
}

/// Mask and glitch composite for one aligned pair.
#[derive(Clone, Debug)]
pub struct GlitchOutput {
    /// Change mask over the aligned region.
    pub mask: ChangeMask,
    /// Glitch composite over the aligned region.
    pub glitch: PixelGrid,
}

/// Load, align, diff and glitch two screenshots without touching any cache.
///
/// Fails with [`CapsuleError::Decode`] when either file cannot be read and with
/// [`CapsuleError::DegenerateAlignment`] when the shared crop has no pixels.
pub fn process_pair(
    earlier: &Path,
    later: &Path,
    threshold: u8,
    recipe: &GlitchRecipe,
) -> CapsuleResult<GlitchOutput> {
    let a = load_grid(earlier)?;
    let b = load_grid(later)?;
    let (a, b) = align(&a, &b);
    if a.is_empty() {
        return Err(CapsuleError::DegenerateAlignment {
            width: a.width(),
            height: a.height(),
        });
    }
    let mask = change_mask(&a, &b, threshold);
    let glitch = synthesize_glitch(&a, &b, &mask, recipe);
    Ok(GlitchOutput { mask, glitch })
}

/// What happened to one pair during a batch.
#[derive(Debug)]
pub enum PairOutcome {
    /// Both artifacts were computed and written.
    Written {
        /// Fraction of aligned pixels marked as changed.
        changed_ratio: f64,
    },
    /// Artifacts were already present; nothing was recomputed.
    Cached,
    /// The aligned region had zero area; nothing was written.
    Degenerate,
    /// The pair failed; later pairs were still processed.
    Failed(CapsuleError),
}

/// Outcome for a single pair.
#[derive(Debug)]
pub struct PairReport {
    /// The pair that was processed.
    pub pair: SnapshotPair,
    /// What happened to it.
    pub outcome: PairOutcome,
}

/// Overall status of a batch run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BatchStatus {
    /// Every pair was visited.
    Completed,
    /// Fewer than two screenshots were supplied; nothing was done.
    InsufficientInput {
        /// Number of screenshots supplied.
        available: usize,
    },
}

/// Aggregated per-pair results of [`BatchDriver::run`], in pair order.
#[derive(Debug)]
pub struct BatchReport {
    /// Overall status.
    pub status: BatchStatus,
    /// One entry per consecutive pair.
    pub pairs: Vec<PairReport>,
}

impl BatchReport {
    fn count(&self, pred: impl Fn(&PairOutcome) -> bool) -> usize {
        self.pairs.iter().filter(|p| pred(&p.outcome)).count()
    }

    /// Pairs whose artifacts were written in this run.
    pub fn written(&self) -> usize {
        self.count(|o| matches!(o, PairOutcome::Written { .. }))
    }

    /// Pairs skipped because their artifacts were already present.
    pub fn cached(&self) -> usize {
        self.count(|o| matches!(o, PairOutcome::Cached))
    }

    /// Pairs skipped because their aligned region was empty.
    pub fn degenerate(&self) -> usize {
        self.count(|o| matches!(o, PairOutcome::Degenerate))
    }

    /// Pairs that failed.
    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, PairOutcome::Failed(_)))
    }

    /// Failed pairs with their errors.
    pub fn failures(&self) -> impl Iterator<Item = (&SnapshotPair, &CapsuleError)> {
        self.pairs.iter().filter_map(|p| match &p.outcome {
            PairOutcome::Failed(e) => Some((&p.pair, e)),
            _ => None,
        })
    }
}

/// Walks consecutive screenshot pairs and writes mask + glitch artifacts.
#[derive(Clone, Debug)]
pub struct BatchDriver {
    cache: ArtifactCache,
    threshold: u8,
    recipe: GlitchRecipe,
    threading: BatchThreading,
}

impl BatchDriver {
    /// Build a driver from a validated configuration.
    pub fn new(config: &CapsuleConfig) -> CapsuleResult<Self> {
        config.validate()?;
        let layout = ArtifactLayout::new(&config.masks_dir, &config.glitches_dir);
        Ok(Self {
            cache: ArtifactCache::new(layout, config.cache),
            threshold: config.threshold,
            recipe: config.recipe,
            threading: config.threading.clone(),
        })
    }

    /// Output layout used by this driver.
    pub fn layout(&self) -> &ArtifactLayout {
        self.cache.layout()
    }

    /// Process every consecutive pair of `screenshots`, in the given order.
    ///
    /// Per-pair failures are recorded in the report and never abort the batch.
    /// A pair whose artifact paths were already claimed by an earlier pair (repeated
    /// stems) fails instead of overwriting or reusing those artifacts. Only failing to
    /// create the output directories is returned as an error.
    pub fn run(&self, screenshots: &[PathBuf]) -> CapsuleResult<BatchReport> {
        let pairs = match consecutive_pairs(screenshots) {
            Ok(p) => p,
            Err(CapsuleError::InsufficientInput { available }) => {
                tracing::warn!(available, "need at least 2 screenshots, nothing to do");
                return Ok(BatchReport {
                    status: BatchStatus::InsufficientInput { available },
                    pairs: Vec::new(),
                });
            }
            Err(e) => return Err(e),
        };

        self.cache.layout().ensure_dirs()?;
        let jobs = claim_outputs(self.cache.layout(), pairs);

        let reports: Vec<PairReport> = if self.threading.parallel {
            let pool = build_thread_pool(self.threading.threads)?;
            pool.install(|| {
                jobs.into_par_iter()
                    .map(|(p, owner)| self.run_pair(p, owner))
                    .collect()
            })
        } else {
            jobs.into_iter()
                .map(|(p, owner)| self.run_pair(p, owner))
                .collect()
        };

        let report = BatchReport {
            status: BatchStatus::Completed,
            pairs: reports,
        };
        tracing::info!(
            pairs = report.pairs.len(),
            written = report.written(),
            cached = report.cached(),
            degenerate = report.degenerate(),
            failed = report.failed(),
            "batch finished"
        );
        Ok(report)
    }

    #[tracing::instrument(skip(self, pair, owner), fields(pair = %pair))]
    fn run_pair(&self, pair: SnapshotPair, owner: Option<usize>) -> PairReport {
        let result = match owner {
            Some(first) => Err(CapsuleError::validation(format!(
                "pair #{} ({pair}) targets artifact '{}' already claimed by pair #{first}",
                pair.index,
                pair.artifact_name()
            ))),
            None => self.try_pair(&pair),
        };
        let outcome = match result {
            Ok(o) => o,
            Err(e) => {
                tracing::warn!(pair = %pair, error = %e, "pair failed, continuing");
                PairOutcome::Failed(e)
            }
        };
        PairReport { pair, outcome }
    }

    fn try_pair(&self, pair: &SnapshotPair) -> CapsuleResult<PairOutcome> {
        let fingerprint = match self.cache.lookup(pair, self.threshold, &self.recipe)? {
            CacheLookup::Hit => {
                tracing::debug!("artifacts present, skipping");
                return Ok(PairOutcome::Cached);
            }
            CacheLookup::Miss(fp) => fp,
        };

        let out = match process_pair(&pair.earlier, &pair.later, self.threshold, &self.recipe) {
            Ok(out) => out,
            Err(CapsuleError::DegenerateAlignment { width, height }) => {
                tracing::warn!(width, height, "aligned region is empty, skipping");
                return Ok(PairOutcome::Degenerate);
            }
            Err(e) => return Err(e),
        };

        let layout = self.cache.layout();
        write_mask_png(&out.mask, layout.mask_path(pair))?;
        let glitch_path = layout.glitch_path(pair);
        write_grid_png(&out.glitch, &glitch_path)?;
        self.cache.record(pair, fingerprint)?;

        let changed_ratio = out.mask.changed_ratio();
        tracing::info!(
            path = %glitch_path.display(),
            changed_ratio,
            "saved glitch"
        );
        Ok(PairOutcome::Written { changed_ratio })
    }
}

/// Pair each job with the index of an earlier pair that already claimed one of its
/// output paths, if any. Only the first pair for a given path gets to write it.
fn claim_outputs(
    layout: &ArtifactLayout,
    pairs: Vec<SnapshotPair>,
) -> Vec<(SnapshotPair, Option<usize>)> {
    let mut claimed: HashMap<PathBuf, usize> = HashMap::with_capacity(pairs.len() * 2);
    pairs
        .into_iter()
        .map(|pair| {
            let targets = [layout.mask_path(&pair), layout.glitch_path(&pair)];
            let owner = targets.iter().find_map(|t| claimed.get(t).copied());
            if owner.is_none() {
                for t in targets {
                    claimed.insert(t, pair.index);
                }
            }
            (pair, owner)
        })
        .collect()
}

fn build_thread_pool(threads: Option<usize>) -> CapsuleResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(CapsuleError::validation(
            "batch threading 'threads' must be >= 1 when set",
        ));
    }

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| CapsuleError::validation(format!("failed to build rayon thread pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/batch/driver.rs"]
mod tests;
