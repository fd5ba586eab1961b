//! The collage strategy: an overlapping, jittered, rotated scatter that
//! still reads as a loose grid.

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use tracing::instrument;

use super::{CanvasState, CommonOptions, shared};
use crate::foundation::color::Rgba;
use crate::foundation::error::{StitchError, StitchResult};
use crate::foundation::math::{AspectRatio, randint, trimmed_median};
use crate::pipeline::context::{MergeContext, ProgressFn};
use crate::pipeline::guards::{require_non_empty, require_state};
use crate::pipeline::runner::{MergePipeline, ValidateOptions};
use crate::raster::{Composite, EdgeStyle, OutputFormat};

/// Options for [`collage_merge`].
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct CollageOptions {
    /// Randomize which input lands in which scatter cell.
    pub shuffle: bool,
    /// Spacing option shared with the other layouts; collage placement
    /// derives spacing from `overlap_percentage` instead.
    pub gap: u32,
    /// Canvas background color.
    pub canvas_color: Rgba,
    /// Border stroke width on each image; `0` disables.
    pub border_width: u32,
    /// Border stroke color.
    pub border_color: Rgba,
    /// Corner radius on each image; `0` keeps square corners.
    pub corner_radius: u32,
    /// Output encoding.
    pub format: OutputFormat,
    /// Nominal cell aspect ratio, width over height.
    pub aspect_ratio: AspectRatio,
    /// Nominal cell width; computed from the inputs when absent.
    pub image_width: Option<u32>,
    /// Number of scatter columns; rows follow from the image count.
    pub columns: u32,
    /// How far neighboring cells pull into each other, as a percentage of
    /// the nominal cell size.
    pub overlap_percentage: u32,
    /// Each image is rotated by a uniform angle in `[-range, range]`
    /// degrees.
    pub rotation_range: u32,
    /// Each image's width is jittered by a uniform pixel amount in
    /// `[-variance, variance]`, with height following the aspect ratio.
    pub image_width_variance: u32,
}

impl Default for CollageOptions {
    fn default() -> Self {
        Self {
            shuffle: false,
            gap: 50,
            canvas_color: Rgba::WHITE,
            border_width: 0,
            border_color: Rgba::BLACK,
            corner_radius: 0,
            format: OutputFormat::Png,
            aspect_ratio: AspectRatio::SQUARE,
            image_width: None,
            columns: 4,
            overlap_percentage: 25,
            rotation_range: 7,
            image_width_variance: 10,
        }
    }
}

impl ValidateOptions for CollageOptions {
    fn validate(&self) -> StitchResult<()> {
        if self.columns == 0 {
            return Err(StitchError::validation("columns must be greater than 0"));
        }
        if self.image_width == Some(0) {
            return Err(StitchError::validation("image_width must be greater than 0"));
        }
        if self.overlap_percentage > 100 {
            return Err(StitchError::validation(
                "overlap_percentage must be between 0 and 100",
            ));
        }
        if self.rotation_range > 360 {
            return Err(StitchError::validation(
                "rotation_range must be between 0 and 360",
            ));
        }
        Ok(())
    }
}

impl CommonOptions for CollageOptions {
    fn shuffle(&self) -> bool {
        self.shuffle
    }
    fn gap(&self) -> u32 {
        self.gap
    }
    fn canvas_color(&self) -> Rgba {
        self.canvas_color
    }
    fn edge_style(&self) -> EdgeStyle {
        EdgeStyle {
            border_width: self.border_width,
            border_color: self.border_color,
            corner_radius: self.corner_radius,
        }
    }
    fn format(&self) -> OutputFormat {
        self.format
    }
}

/// Scratch state threaded through the collage steps.
#[derive(Debug, Default)]
pub struct CollageState {
    image_width: Option<u32>,
    image_height: Option<u32>,
    rows: Option<u32>,
    columns: Option<u32>,
    canvas_width: Option<u32>,
    canvas_height: Option<u32>,
}

impl CanvasState for CollageState {
    fn canvas_size(&self) -> (Option<u32>, Option<u32>) {
        (self.canvas_width, self.canvas_height)
    }
}

/// Merge `inputs` into a collage per `options`.
#[instrument(skip_all, fields(inputs = inputs.len()))]
pub fn collage_merge(
    inputs: Vec<Vec<u8>>,
    options: CollageOptions,
    on_progress: Option<ProgressFn<'_>>,
) -> StitchResult<Vec<u8>> {
    wire_steps(MergePipeline::new(inputs, options, on_progress)?).run()
}

/// As [`collage_merge`], with a caller-seeded RNG for reproducible jitter.
pub fn collage_merge_with_rng(
    inputs: Vec<Vec<u8>>,
    options: CollageOptions,
    on_progress: Option<ProgressFn<'_>>,
    rng: SmallRng,
) -> StitchResult<Vec<u8>> {
    wire_steps(MergePipeline::with_rng(inputs, options, on_progress, rng)?).run()
}

fn wire_steps<'p>(
    pipeline: MergePipeline<'p, CollageOptions, CollageState>,
) -> MergePipeline<'p, CollageOptions, CollageState> {
    pipeline
        .step(shared::load_images)
        .step(shared::shuffle_images)
        .step(calculate_image_dimensions)
        .step(resize_and_border_images)
        .step(rotate_images)
        .step(create_composites)
        .step(shared::create_canvas)
        .step(shared::apply_composites)
        .step(shared::export_canvas)
}

/// Settle the nominal cell size and the scatter grid.
fn calculate_image_dimensions(
    ctx: &mut MergeContext<CollageState>,
    options: CollageOptions,
    _on_progress: &mut Option<ProgressFn<'_>>,
) -> StitchResult<Option<Vec<u8>>> {
    let width = match options.image_width {
        Some(width) => width,
        None => {
            let widths: Vec<u32> = ctx.images.iter().map(|img| img.width()).collect();
            let median = trimmed_median(&widths)
                .ok_or_else(|| StitchError::internal("images must not be empty"))?;
            (median.round() as u32).max(1)
        }
    };
    let height = ((f64::from(width) / options.aspect_ratio.ratio()).floor() as u32).max(1);

    let count = ctx.images.len() as u32;
    let columns = options.columns;
    ctx.state.image_width = Some(width);
    ctx.state.image_height = Some(height);
    ctx.state.columns = Some(columns);
    ctx.state.rows = Some(count.div_ceil(columns));
    Ok(None)
}

/// Resize each image to a jittered cell size and apply the edge treatment.
fn resize_and_border_images(
    ctx: &mut MergeContext<CollageState>,
    options: CollageOptions,
    _on_progress: &mut Option<ProgressFn<'_>>,
) -> StitchResult<Option<Vec<u8>>> {
    let nominal_width = *require_state(&ctx.state.image_width, "image_width")?;
    let nominal_height = *require_state(&ctx.state.image_height, "image_height")?;
    let variance = options.image_width_variance as i32;
    let ratio = options.aspect_ratio.ratio();
    let style = options.edge_style();

    let mut prepared = Vec::with_capacity(ctx.images.len());
    for image in ctx.images.drain(..) {
        let jitter = randint(&mut ctx.rng, -variance, variance);
        let width = (i64::from(nominal_width) + i64::from(jitter)).max(1) as u32;
        let height_jitter = (f64::from(jitter) / ratio).floor() as i64;
        let height = (i64::from(nominal_height) + height_jitter).max(1) as u32;
        prepared.push(image.resize(width, height)?.apply_edges(&style)?);
    }
    ctx.images = prepared;
    Ok(None)
}

/// Rotate each image by a uniform random angle, growing its bounds.
fn rotate_images(
    ctx: &mut MergeContext<CollageState>,
    options: CollageOptions,
    _on_progress: &mut Option<ProgressFn<'_>>,
) -> StitchResult<Option<Vec<u8>>> {
    if options.rotation_range == 0 {
        return Ok(None);
    }
    let range = options.rotation_range as i32;
    let mut rotated = Vec::with_capacity(ctx.images.len());
    for image in ctx.images.drain(..) {
        let angle = randint(&mut ctx.rng, -range, range);
        rotated.push(image.rotate(f64::from(angle)));
    }
    ctx.images = rotated;
    Ok(None)
}

/// Scatter the images on an overlap-deducted grid of cell centers, then
/// renormalize so the bounding box hugs the content.
///
/// Composite order is shuffled so stacking does not always favor later
/// inputs.
fn create_composites(
    ctx: &mut MergeContext<CollageState>,
    options: CollageOptions,
    on_progress: &mut Option<ProgressFn<'_>>,
) -> StitchResult<Option<Vec<u8>>> {
    require_non_empty(&ctx.images, "images")?;
    let cell_width = f64::from(*require_state(&ctx.state.image_width, "image_width")?);
    let cell_height = f64::from(*require_state(&ctx.state.image_height, "image_height")?);
    let columns = *require_state(&ctx.state.columns, "columns")?;

    let overlap = f64::from(options.overlap_percentage) / 100.0;
    let x_pull = cell_width * overlap;
    let y_pull = cell_height * overlap;

    let images: Vec<_> = ctx.images.drain(..).collect();
    let mut placed: Vec<Composite> = Vec::with_capacity(images.len());
    let mut min_x = i64::MAX;
    let mut min_y = i64::MAX;
    let mut max_x = i64::MIN;
    let mut max_y = i64::MIN;

    for (index, image) in images.into_iter().enumerate() {
        let row = f64::from(index as u32 / columns);
        let col = f64::from(index as u32 % columns);

        let center_x = cell_width * col - x_pull * col + cell_width / 2.0;
        let center_y = cell_height * row - y_pull * row + cell_height / 2.0;
        let x = (center_x - f64::from(image.width()) / 2.0).round() as i64;
        let y = (center_y - f64::from(image.height()) / 2.0).round() as i64;

        min_x = min_x.min(x);
        min_y = min_y.min(y);
        max_x = max_x.max(x + i64::from(image.width()));
        max_y = max_y.max(y + i64::from(image.height()));
        placed.push(Composite { image, x, y });
        ctx.bump_progress("Merging images", on_progress);
    }

    // Shift everything so the content's bounding box starts at the origin.
    for composite in &mut placed {
        composite.x -= min_x;
        composite.y -= min_y;
    }
    placed.shuffle(&mut ctx.rng);

    ctx.state.canvas_width = Some((max_x - min_x).max(1) as u32);
    ctx.state.canvas_height = Some((max_y - min_y).max(1) as u32);
    ctx.composites = placed;
    Ok(None)
}

#[cfg(test)]
#[path = "../../tests/unit/layouts/collage.rs"]
mod tests;
