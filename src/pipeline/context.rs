use rand::SeedableRng;
use rand::rngs::SmallRng;

use crate::raster::{Composite, RasterImage};

/// Progress snapshot handed to an observer as a merge advances.
#[derive(Clone, Debug)]
pub struct ProgressInfo {
    /// Inputs fully merged so far.
    pub completed: usize,
    /// Total number of inputs.
    pub total: usize,
    /// Human-readable description of the current stage.
    pub phase: String,
}

/// Observer invoked after each unit of merge progress.
pub type ProgressFn<'p> = &'p mut dyn FnMut(&ProgressInfo);

/// Mutable state threaded through every step of a merge.
///
/// `S` is the strategy-specific scratch state; the common fields cover the
/// raw inputs, their decoded forms, the accumulated placement list, and the
/// canvas they end up on.
#[derive(Debug)]
pub struct MergeContext<S> {
    /// Encoded input buffers, untouched after construction.
    pub inputs: Vec<Vec<u8>>,
    /// Decoded working images. Steps may resize, replace, or drain these.
    pub images: Vec<RasterImage>,
    /// Captions paired index-wise with `images` when captioning is on.
    pub captions: Vec<String>,
    /// Ordered placement instructions; later entries draw on top.
    pub composites: Vec<Composite>,
    /// The output canvas once a step has created it.
    pub canvas: Option<RasterImage>,
    /// Running progress counters.
    pub progress: ProgressInfo,
    /// Strategy-specific scratch state.
    pub state: S,
    /// Randomness source for shuffles and jitter; seedable in tests.
    pub rng: SmallRng,
}

impl<S: Default> MergeContext<S> {
    /// Build a context over the given inputs with OS-seeded randomness.
    pub fn new(inputs: Vec<Vec<u8>>) -> Self {
        Self::with_rng(inputs, SmallRng::from_os_rng())
    }

    /// Build a context with a caller-provided RNG, for deterministic runs.
    pub fn with_rng(inputs: Vec<Vec<u8>>, rng: SmallRng) -> Self {
        let total = inputs.len();
        Self {
            inputs,
            images: Vec::new(),
            captions: Vec::new(),
            composites: Vec::new(),
            canvas: None,
            progress: ProgressInfo {
                completed: 0,
                total,
                phase: "Initializing".to_string(),
            },
            state: S::default(),
            rng,
        }
    }
}

impl<S> MergeContext<S> {
    /// Record one completed unit of work and notify the observer, if any.
    pub fn bump_progress(&mut self, phase: &str, on_progress: &mut Option<ProgressFn<'_>>) {
        self.progress.completed += 1;
        if self.progress.phase != phase {
            self.progress.phase = phase.to_string();
        }
        if let Some(observer) = on_progress {
            observer(&self.progress);
        }
    }
}
