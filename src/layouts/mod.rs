//! Layout strategies: grid, masonry, collage, and template.
//!
//! Each strategy is a step list wired into a [`crate::pipeline::runner::MergePipeline`];
//! the steps every strategy shares live in [`shared`].

pub mod collage;
pub mod grid;
pub mod masonry;
pub mod presets;
pub mod template;
mod shared;

use crate::foundation::color::Rgba;
use crate::raster::{EdgeStyle, OutputFormat};

/// Option fields common to every layout strategy.
pub(crate) trait CommonOptions {
    /// Randomize input order before layout.
    fn shuffle(&self) -> bool;
    /// Spacing between images and around the canvas edge, in pixels.
    fn gap(&self) -> u32;
    /// Canvas background color.
    fn canvas_color(&self) -> Rgba;
    /// Border and corner treatment applied to each prepared image.
    fn edge_style(&self) -> EdgeStyle;
    /// Output encoding.
    fn format(&self) -> OutputFormat;
}

/// Strategy state that records the computed canvas dimensions.
pub(crate) trait CanvasState {
    /// `(width, height)` once a sizing step has computed them.
    fn canvas_size(&self) -> (Option<u32>, Option<u32>);
}
