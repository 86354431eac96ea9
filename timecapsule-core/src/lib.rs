//! Timecapsule turns a sequence of archived website screenshots into change masks and
//! "glitch" transitions between neighbouring snapshots.
//!
//! # Pipeline overview
//!
//! 1. **Load**: `image file -> PixelGrid` (RGB8, alpha dropped)
//! 2. **Align**: `(PixelGrid, PixelGrid) -> (PixelGrid, PixelGrid)` by centered cropping to the
//!    common size
//! 3. **Diff**: `aligned pair + threshold -> ChangeMask` (max channel delta, strict `>`)
//! 4. **Glitch**: `aligned pair + mask -> PixelGrid` (later snapshot, with edge-clamped
//!    channel shifts blended in where the mask is set)
//! 5. **Batch**: consecutive pairs of a screenshot sequence are written as
//!    `<a>__<b>_mask.png` and `<a>__<b>.png`, skipping pairs that are already done
//!
//! Steps 2-4 are pure and deterministic. All file IO lives in the loader, the artifact
//! writers and the [`BatchDriver`].
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod assets;
mod batch;
mod config;
mod effects;
mod foundation;
mod snapshot;

pub use assets::decode::{decode_grid, load_grid};
pub use assets::encode::{write_grid_png, write_mask_png};
pub use batch::artifacts::{
    ArtifactLayout, Overlay, PAIR_SEPARATOR, SnapshotPair, consecutive_pairs,
};
pub use batch::cache::{
    ArtifactCache, CacheLookup, CachePolicy, PairFingerprint, fingerprint_pair,
};
pub use batch::driver::{
    BatchDriver, BatchReport, BatchStatus, BatchThreading, GlitchOutput, PairOutcome, PairReport,
    process_pair,
};
pub use config::CapsuleConfig;
pub use effects::align::{CropWindow, align, centered_window};
pub use effects::diff::{DEFAULT_THRESHOLD, change_mask, max_channel_delta};
pub use effects::glitch::{ChannelShift, GlitchRecipe, synthesize_glitch};
pub use effects::shift::{ShiftVector, shift_plane};
pub use foundation::error::{CapsuleError, CapsuleResult};
pub use foundation::grid::{ChangeMask, Channel, PixelGrid};
pub use snapshot::discover::{list_screenshots, pick_evenly, snapshot_label};
