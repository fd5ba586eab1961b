//! The grid strategy: a uniform rows-by-columns arrangement with optional
//! per-image captions below each cell.

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use tracing::instrument;

use super::{CanvasState, CommonOptions, shared};
use crate::foundation::color::Rgba;
use crate::foundation::error::{StitchError, StitchResult};
use crate::foundation::math::{AspectRatio, trimmed_median};
use crate::pipeline::context::{MergeContext, ProgressFn};
use crate::pipeline::guards::require_state;
use crate::pipeline::runner::{MergePipeline, ValidateOptions};
use crate::raster::{Composite, EdgeStyle, OutputFormat};
use crate::raster::text::{fit_font_size, render_caption};

/// Caption strip height as a fraction of the canvas width.
const CAPTION_HEIGHT_TO_CANVAS_WIDTH_RATIO: f64 = 0.04;

/// Options for [`grid_merge`].
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct GridOptions {
    /// Randomize image order before placement.
    pub shuffle: bool,
    /// Spacing between cells and around the canvas edge.
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
    /// Cell aspect ratio, width over height.
    pub aspect_ratio: AspectRatio,
    /// Explicit cell width; computed from the inputs when absent.
    pub image_width: Option<u32>,
    /// Number of columns; rows follow from the image count.
    pub columns: u32,
    /// Render a caption strip under each image.
    pub caption: bool,
    /// Captions paired index-wise with the inputs; required when `caption`
    /// is on.
    pub captions: Vec<String>,
    /// Caption text color.
    pub caption_color: Rgba,
    /// Upper bound on the fitted caption font size.
    pub max_caption_size: u32,
}

impl Default for GridOptions {
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
            caption: false,
            captions: Vec::new(),
            caption_color: Rgba::BLACK,
            max_caption_size: 100,
        }
    }
}

impl ValidateOptions for GridOptions {
    fn validate(&self) -> StitchResult<()> {
        if self.columns == 0 {
            return Err(StitchError::validation("columns must be greater than 0"));
        }
        if self.image_width == Some(0) {
            return Err(StitchError::validation("image_width must be greater than 0"));
        }
        if self.max_caption_size == 0 {
            return Err(StitchError::validation(
                "max_caption_size must be greater than 0",
            ));
        }
        Ok(())
    }
}

impl CommonOptions for GridOptions {
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

/// Scratch state threaded through the grid steps.
#[derive(Debug, Default)]
pub struct GridState {
    are_captions_provided: Option<bool>,
    image_width: Option<u32>,
    image_height: Option<u32>,
    rows: Option<u32>,
    columns: Option<u32>,
    canvas_width: Option<u32>,
    canvas_height: Option<u32>,
    caption_height: Option<u32>,
    font_size: Option<u32>,
}

impl CanvasState for GridState {
    fn canvas_size(&self) -> (Option<u32>, Option<u32>) {
        (self.canvas_width, self.canvas_height)
    }
}

/// Merge `inputs` into a grid per `options`.
#[instrument(skip_all, fields(inputs = inputs.len()))]
pub fn grid_merge(
    inputs: Vec<Vec<u8>>,
    options: GridOptions,
    on_progress: Option<ProgressFn<'_>>,
) -> StitchResult<Vec<u8>> {
    wire_steps(MergePipeline::new(inputs, options, on_progress)?).run()
}

/// As [`grid_merge`], with a caller-seeded RNG for reproducible shuffles.
pub fn grid_merge_with_rng(
    inputs: Vec<Vec<u8>>,
    options: GridOptions,
    on_progress: Option<ProgressFn<'_>>,
    rng: SmallRng,
) -> StitchResult<Vec<u8>> {
    wire_steps(MergePipeline::with_rng(inputs, options, on_progress, rng)?).run()
}

fn wire_steps<'p>(
    pipeline: MergePipeline<'p, GridOptions, GridState>,
) -> MergePipeline<'p, GridOptions, GridState> {
    pipeline
        .step(shared::load_images)
        .step(validate_captions)
        .step(shuffle_images_and_captions)
        .step(calculate_image_dimensions)
        .step(prepare_images)
        .step(calculate_canvas_dimensions)
        .step(calculate_font_size)
        .step(shared::create_canvas)
        .step(create_composites)
        .step(shared::apply_composites)
        .step(shared::export_canvas)
}

/// Check the caption list against the image count and stash it.
fn validate_captions(
    ctx: &mut MergeContext<GridState>,
    options: GridOptions,
    _on_progress: &mut Option<ProgressFn<'_>>,
) -> StitchResult<Option<Vec<u8>>> {
    ctx.state.are_captions_provided = Some(options.caption);
    if !options.caption {
        return Ok(None);
    }
    if options.captions.len() != ctx.images.len() {
        return Err(StitchError::validation(format!(
            "expected {} captions, but got {}",
            ctx.images.len(),
            options.captions.len()
        )));
    }
    ctx.captions = options.captions;
    Ok(None)
}

/// Shuffle images (and captions, when present) with one shared permutation.
fn shuffle_images_and_captions(
    ctx: &mut MergeContext<GridState>,
    options: GridOptions,
    _on_progress: &mut Option<ProgressFn<'_>>,
) -> StitchResult<Option<Vec<u8>>> {
    if !options.shuffle {
        return Ok(None);
    }

    let mut order: Vec<usize> = (0..ctx.images.len()).collect();
    order.shuffle(&mut ctx.rng);

    ctx.images = permute(std::mem::take(&mut ctx.images), &order);
    if !ctx.captions.is_empty() {
        ctx.captions = permute(std::mem::take(&mut ctx.captions), &order);
    }
    Ok(None)
}

fn permute<T>(items: Vec<T>, order: &[usize]) -> Vec<T> {
    let mut slots: Vec<Option<T>> = items.into_iter().map(Some).collect();
    order
        .iter()
        .map(|&from| slots[from].take().expect("permutation index used once"))
        .collect()
}

/// Settle the uniform cell size and the row/column grid.
fn calculate_image_dimensions(
    ctx: &mut MergeContext<GridState>,
    options: GridOptions,
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
    let rows = count.div_ceil(columns);

    ctx.state.image_width = Some(width);
    ctx.state.image_height = Some(height);
    ctx.state.columns = Some(columns);
    ctx.state.rows = Some(rows);
    Ok(None)
}

/// Resize every image to the cell size and apply the edge treatment.
fn prepare_images(
    ctx: &mut MergeContext<GridState>,
    options: GridOptions,
    _on_progress: &mut Option<ProgressFn<'_>>,
) -> StitchResult<Option<Vec<u8>>> {
    let width = *require_state(&ctx.state.image_width, "image_width")?;
    let height = *require_state(&ctx.state.image_height, "image_height")?;
    let style = options.edge_style();

    let mut prepared = Vec::with_capacity(ctx.images.len());
    for image in ctx.images.drain(..) {
        prepared.push(image.resize(width, height)?.apply_edges(&style)?);
    }
    ctx.images = prepared;
    Ok(None)
}

/// Derive the canvas size from the grid and, when captioning, the caption
/// strip height.
fn calculate_canvas_dimensions(
    ctx: &mut MergeContext<GridState>,
    options: GridOptions,
    _on_progress: &mut Option<ProgressFn<'_>>,
) -> StitchResult<Option<Vec<u8>>> {
    let image_width = *require_state(&ctx.state.image_width, "image_width")?;
    let image_height = *require_state(&ctx.state.image_height, "image_height")?;
    let columns = *require_state(&ctx.state.columns, "columns")?;
    let rows = *require_state(&ctx.state.rows, "rows")?;
    let captions_on = *require_state(&ctx.state.are_captions_provided, "are_captions_provided")?;

    let canvas_width = image_width * columns + options.gap * (columns + 1);
    let caption_height = if captions_on {
        (f64::from(canvas_width) * CAPTION_HEIGHT_TO_CANVAS_WIDTH_RATIO).floor() as u32
    } else {
        0
    };
    let canvas_height =
        image_height * rows + options.gap * (rows + 1) + caption_height * rows;

    ctx.state.canvas_width = Some(canvas_width);
    ctx.state.canvas_height = Some(canvas_height);
    ctx.state.caption_height = Some(caption_height);
    Ok(None)
}

/// Fit one font size that works for the longest caption.
fn calculate_font_size(
    ctx: &mut MergeContext<GridState>,
    options: GridOptions,
    _on_progress: &mut Option<ProgressFn<'_>>,
) -> StitchResult<Option<Vec<u8>>> {
    if !*require_state(&ctx.state.are_captions_provided, "are_captions_provided")? {
        return Ok(None);
    }
    let image_width = *require_state(&ctx.state.image_width, "image_width")?;
    let caption_height = *require_state(&ctx.state.caption_height, "caption_height")?;

    let longest = ctx
        .captions
        .iter()
        .max_by_key(|caption| caption.chars().count())
        .ok_or_else(|| StitchError::internal("captions must not be empty"))?;

    let fitted = fit_font_size(
        longest,
        f64::from(image_width),
        f64::from(caption_height),
        options.max_caption_size,
    )?;
    ctx.state.font_size = Some(fitted);
    Ok(None)
}

/// Place every cell (and caption strip) row-major onto the canvas.
fn create_composites(
    ctx: &mut MergeContext<GridState>,
    options: GridOptions,
    on_progress: &mut Option<ProgressFn<'_>>,
) -> StitchResult<Option<Vec<u8>>> {
    let image_width = *require_state(&ctx.state.image_width, "image_width")?;
    let image_height = *require_state(&ctx.state.image_height, "image_height")?;
    let columns = *require_state(&ctx.state.columns, "columns")?;
    let caption_height = *require_state(&ctx.state.caption_height, "caption_height")?;
    let captions_on = *require_state(&ctx.state.are_captions_provided, "are_captions_provided")?;
    let gap = i64::from(options.gap);

    let images: Vec<_> = ctx.images.drain(..).collect();
    let captions = std::mem::take(&mut ctx.captions);

    let mut x = gap;
    let mut y = gap;
    let mut column = 0u32;
    for (index, image) in images.into_iter().enumerate() {
        ctx.composites.push(Composite { image, x, y });

        if captions_on && caption_height > 0 {
            let font_size = *require_state(&ctx.state.font_size, "font_size")?;
            let strip = render_caption(
                &captions[index],
                image_width,
                caption_height,
                font_size,
                options.caption_color,
            )?;
            ctx.composites.push(Composite {
                image: strip,
                x,
                y: y + i64::from(image_height),
            });
        }

        column += 1;
        if column == columns {
            column = 0;
            x = gap;
            y += i64::from(image_height) + gap + i64::from(caption_height);
        } else {
            x += i64::from(image_width) + gap;
        }
        ctx.bump_progress("Merging images", on_progress);
    }
    Ok(None)
}

#[cfg(test)]
#[path = "../../tests/unit/layouts/grid.rs"]
mod tests;
