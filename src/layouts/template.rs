//! The template strategy: images fill caller-declared slots on a fixed
//! grid.

use rand::rngs::SmallRng;
use tracing::instrument;

use super::{CanvasState, CommonOptions, shared};
use crate::foundation::color::Rgba;
use crate::foundation::error::{StitchError, StitchResult};
use crate::pipeline::context::{MergeContext, ProgressFn};
use crate::pipeline::guards::{require_non_empty, require_state};
use crate::pipeline::runner::{MergePipeline, ValidateOptions};
use crate::raster::{Composite, EdgeStyle, OutputFormat, RasterImage};

/// One rectangular region of a template grid, in 1-based grid units.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Slot {
    /// Leftmost grid column the slot occupies, starting at 1.
    pub col: u32,
    /// Topmost grid row the slot occupies, starting at 1.
    pub row: u32,
    /// Number of columns spanned.
    #[serde(default = "one")]
    pub col_span: u32,
    /// Number of rows spanned.
    #[serde(default = "one")]
    pub row_span: u32,
}

fn one() -> u32 {
    1
}

impl Slot {
    /// Build a slot from `(col, row, col_span, row_span)`.
    pub const fn new(col: u32, row: u32, col_span: u32, row_span: u32) -> Self {
        Self {
            col,
            row,
            col_span,
            row_span,
        }
    }

    fn right(&self) -> u32 {
        self.col + self.col_span - 1
    }

    fn bottom(&self) -> u32 {
        self.row + self.row_span - 1
    }

    fn overlaps(&self, other: &Slot) -> bool {
        self.col <= other.right()
            && self.right() >= other.col
            && self.row <= other.bottom()
            && self.bottom() >= other.row
    }
}

/// Canvas dimensions and grid granularity of a template.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TemplateCanvas {
    /// Canvas width in pixels.
    pub width: u32,
    /// Canvas height in pixels.
    pub height: u32,
    /// Number of grid columns.
    pub columns: u32,
    /// Number of grid rows.
    pub rows: u32,
}

/// A slot arrangement over a fixed canvas grid.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Template {
    /// The canvas and its grid.
    pub canvas: TemplateCanvas,
    /// The slots images fill, in input order.
    pub slots: Vec<Slot>,
}

/// Options for [`template_merge`].
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct TemplateOptions {
    /// Randomize which input fills which slot.
    #[serde(default)]
    pub shuffle: bool,
    /// Spacing between slots and around the canvas edge.
    #[serde(default = "default_gap")]
    pub gap: u32,
    /// Canvas background color.
    #[serde(default = "default_canvas_color")]
    pub canvas_color: Rgba,
    /// Border stroke width on each image; `0` disables.
    #[serde(default)]
    pub border_width: u32,
    /// Border stroke color.
    #[serde(default = "default_border_color")]
    pub border_color: Rgba,
    /// Corner radius on each image; `0` keeps square corners.
    #[serde(default)]
    pub corner_radius: u32,
    /// Output encoding.
    #[serde(default)]
    pub format: OutputFormat,
    /// The slot arrangement to fill.
    pub template: Template,
}

fn default_gap() -> u32 {
    50
}
fn default_canvas_color() -> Rgba {
    Rgba::WHITE
}
fn default_border_color() -> Rgba {
    Rgba::BLACK
}

impl TemplateOptions {
    /// Options for `template` with defaults for everything else.
    pub fn new(template: Template) -> Self {
        Self {
            shuffle: false,
            gap: default_gap(),
            canvas_color: default_canvas_color(),
            border_width: 0,
            border_color: default_border_color(),
            corner_radius: 0,
            format: OutputFormat::default(),
            template,
        }
    }
}

impl ValidateOptions for TemplateOptions {
    fn validate(&self) -> StitchResult<()> {
        let canvas = &self.template.canvas;
        if canvas.columns == 0 || canvas.rows == 0 {
            return Err(StitchError::validation(
                "template grid needs at least one column and one row",
            ));
        }
        if canvas.width <= self.gap * 2 {
            return Err(StitchError::validation(format!(
                "canvas width must be greater than {}",
                self.gap * 2
            )));
        }
        if canvas.height <= self.gap * 2 {
            return Err(StitchError::validation(format!(
                "canvas height must be greater than {}",
                self.gap * 2
            )));
        }
        if self.template.slots.is_empty() {
            return Err(StitchError::validation(
                "template must define at least one slot",
            ));
        }

        let (slot_width, slot_height) = slot_dimensions(&self.template, self.gap);
        if slot_width.floor() <= 0.0 {
            return Err(StitchError::validation(
                "columns are too thin; increase canvas width, reduce gap, or reduce columns",
            ));
        }
        if slot_height.floor() <= 0.0 {
            return Err(StitchError::validation(
                "rows are too thin; increase canvas height, reduce gap, or reduce rows",
            ));
        }

        for (index, slot) in self.template.slots.iter().enumerate() {
            if slot.col == 0 || slot.row == 0 || slot.col_span == 0 || slot.row_span == 0 {
                return Err(StitchError::validation(format!(
                    "slot {index} must use 1-based positions and positive spans"
                )));
            }
            if slot.col > canvas.columns || slot.row > canvas.rows {
                return Err(StitchError::validation(format!(
                    "slot {index} starts outside the {}x{} grid",
                    canvas.columns, canvas.rows
                )));
            }
            if slot.right() > canvas.columns {
                return Err(StitchError::validation(format!(
                    "slot {index} spans past the right edge of the grid"
                )));
            }
            if slot.bottom() > canvas.rows {
                return Err(StitchError::validation(format!(
                    "slot {index} spans past the bottom edge of the grid"
                )));
            }
        }

        for i in 0..self.template.slots.len() {
            for j in (i + 1)..self.template.slots.len() {
                if self.template.slots[i].overlaps(&self.template.slots[j]) {
                    return Err(StitchError::validation(format!(
                        "slot {i} overlaps with slot {j}"
                    )));
                }
            }
        }
        Ok(())
    }
}

impl CommonOptions for TemplateOptions {
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

/// Fractional slot cell size after deducting the gaps.
fn slot_dimensions(template: &Template, gap: u32) -> (f64, f64) {
    let canvas = &template.canvas;
    let workable_width = f64::from(canvas.width) - f64::from(gap * (canvas.columns + 1));
    let workable_height = f64::from(canvas.height) - f64::from(gap * (canvas.rows + 1));
    (
        workable_width / f64::from(canvas.columns),
        workable_height / f64::from(canvas.rows),
    )
}

/// A resized image bound to its slot's grid anchor.
#[derive(Debug)]
struct Block {
    image: RasterImage,
    col: u32,
    row: u32,
}

/// Scratch state threaded through the template steps.
#[derive(Debug, Default)]
pub struct TemplateState {
    slot_width: Option<f64>,
    slot_height: Option<f64>,
    canvas_width: Option<u32>,
    canvas_height: Option<u32>,
    blocks: Option<Vec<Block>>,
}

impl CanvasState for TemplateState {
    fn canvas_size(&self) -> (Option<u32>, Option<u32>) {
        (self.canvas_width, self.canvas_height)
    }
}

/// Merge `inputs` into `options.template`'s slots, in order.
///
/// Extra inputs beyond the slot count are ignored; extra slots stay empty.
#[instrument(skip_all, fields(inputs = inputs.len()))]
pub fn template_merge(
    inputs: Vec<Vec<u8>>,
    options: TemplateOptions,
    on_progress: Option<ProgressFn<'_>>,
) -> StitchResult<Vec<u8>> {
    wire_steps(MergePipeline::new(inputs, options, on_progress)?).run()
}

/// As [`template_merge`], with a caller-seeded RNG for reproducible
/// shuffles.
pub fn template_merge_with_rng(
    inputs: Vec<Vec<u8>>,
    options: TemplateOptions,
    on_progress: Option<ProgressFn<'_>>,
    rng: SmallRng,
) -> StitchResult<Vec<u8>> {
    wire_steps(MergePipeline::with_rng(inputs, options, on_progress, rng)?).run()
}

fn wire_steps<'p>(
    pipeline: MergePipeline<'p, TemplateOptions, TemplateState>,
) -> MergePipeline<'p, TemplateOptions, TemplateState> {
    pipeline
        .step(shared::load_images)
        .step(shared::shuffle_images)
        .step(calculate_slot_dimensions)
        .step(build_blocks)
        .step(shared::create_canvas)
        .step(create_composites)
        .step(shared::apply_composites)
        .step(shared::export_canvas)
}

/// Record the canvas size and the fractional per-cell dimensions.
fn calculate_slot_dimensions(
    ctx: &mut MergeContext<TemplateState>,
    options: TemplateOptions,
    _on_progress: &mut Option<ProgressFn<'_>>,
) -> StitchResult<Option<Vec<u8>>> {
    let (slot_width, slot_height) = slot_dimensions(&options.template, options.gap);
    ctx.state.slot_width = Some(slot_width);
    ctx.state.slot_height = Some(slot_height);
    ctx.state.canvas_width = Some(options.template.canvas.width);
    ctx.state.canvas_height = Some(options.template.canvas.height);
    Ok(None)
}

/// Resize each image to its slot's pixel box and bind it to the slot.
fn build_blocks(
    ctx: &mut MergeContext<TemplateState>,
    options: TemplateOptions,
    _on_progress: &mut Option<ProgressFn<'_>>,
) -> StitchResult<Option<Vec<u8>>> {
    let slot_width = *require_state(&ctx.state.slot_width, "slot_width")?;
    let slot_height = *require_state(&ctx.state.slot_height, "slot_height")?;
    require_non_empty(&ctx.images, "images")?;
    let gap = f64::from(options.gap);
    let style = options.edge_style();

    let filled = options.template.slots.len().min(ctx.images.len());
    let mut blocks = Vec::with_capacity(filled);
    for (slot, image) in options.template.slots.iter().zip(ctx.images.drain(..)) {
        let width = (f64::from(slot.col_span) * slot_width + f64::from(slot.col_span - 1) * gap)
            .floor()
            .max(1.0) as u32;
        let height = (f64::from(slot.row_span) * slot_height + f64::from(slot.row_span - 1) * gap)
            .floor()
            .max(1.0) as u32;
        blocks.push(Block {
            image: image.resize(width, height)?.apply_edges(&style)?,
            col: slot.col,
            row: slot.row,
        });
    }
    ctx.state.blocks = Some(blocks);
    Ok(None)
}

/// Place each block at its slot's pixel anchor.
fn create_composites(
    ctx: &mut MergeContext<TemplateState>,
    options: TemplateOptions,
    on_progress: &mut Option<ProgressFn<'_>>,
) -> StitchResult<Option<Vec<u8>>> {
    let slot_width = *require_state(&ctx.state.slot_width, "slot_width")?;
    let slot_height = *require_state(&ctx.state.slot_height, "slot_height")?;
    let blocks = ctx
        .state
        .blocks
        .take()
        .ok_or_else(|| StitchError::internal("state field blocks was not initialized"))?;
    let gap = f64::from(options.gap);

    for block in blocks {
        let x = f64::from(block.col - 1) * slot_width + f64::from(block.col) * gap;
        let y = f64::from(block.row - 1) * slot_height + f64::from(block.row) * gap;
        ctx.composites.push(Composite {
            image: block.image,
            x: x.floor() as i64,
            y: y.floor() as i64,
        });
        ctx.bump_progress("Merging images", on_progress);
    }
    Ok(None)
}

#[cfg(test)]
#[path = "../../tests/unit/layouts/template.rs"]
mod tests;
