//! Picstitch merges a set of images into a single canvas.
//!
//! Four layout strategies are supported, each exposed as a single entry
//! point that takes raw encoded image bytes plus validated options and
//! returns the encoded output image:
//!
//! 1. **Grid** ([`grid_merge`]): uniform cells in row-major order, with
//!    optional captions rendered beneath each image.
//! 2. **Masonry** ([`masonry_merge`]): ragged packed rows or columns with
//!    per-lane alignment and justified overflow cropping.
//! 3. **Collage** ([`collage_merge`]): randomized overlapping placement
//!    with size jitter and rotation.
//! 4. **Template** ([`template_merge`]): user-declared slot grids,
//!    including a handful of ready-made [`presets`].
//!
//! Every strategy runs the same staged pipeline: a [`MergePipeline`]
//! validates options, then executes an ordered list of stages against a
//! shared [`MergeContext`], each stage refining layout state and
//! accumulating placement instructions until a single export stage
//! produces the final buffer.
//!
//! The key design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Single-threaded stages**: stages run strictly in registration
//!   order; a later stage always sees the previous stage's mutations.
//! - **Injectable randomness**: shuffle/jitter draw from the context's
//!   RNG so tests can seed it deterministically.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;
mod layouts;
mod pipeline;
mod raster;

pub use foundation::color::Rgba;
pub use foundation::error::{StitchError, StitchResult};
pub use foundation::math::{AspectRatio, median, randint, trimmed_median};
pub use layouts::collage::{
    CollageOptions, CollageState, collage_merge, collage_merge_with_rng,
};
pub use layouts::grid::{GridOptions, GridState, grid_merge, grid_merge_with_rng};
pub use layouts::masonry::{
    HorizontalAlign, MasonryFlow, MasonryOptions, MasonryState, VerticalAlign, masonry_merge,
    masonry_merge_with_rng,
};
pub use layouts::presets;
pub use layouts::template::{
    Slot, Template, TemplateCanvas, TemplateOptions, TemplateState, template_merge,
    template_merge_with_rng,
};
pub use pipeline::context::{MergeContext, ProgressFn, ProgressInfo};
pub use pipeline::guards::{require_canvas, require_non_empty, require_state};
pub use pipeline::runner::{MergePipeline, StepFn, ValidateOptions};
pub use raster::{
    Composite, EdgeStyle, OutputFormat, RasterImage, decode_image, encode_image,
};
