//! The masonry strategy: images keep their aspect ratios and flow into
//! uniform rows or columns.

use rand::rngs::SmallRng;
use tracing::instrument;

use super::{CanvasState, CommonOptions, shared};
use crate::foundation::color::Rgba;
use crate::foundation::error::{StitchError, StitchResult};
use crate::foundation::math::trimmed_median;
use crate::pipeline::context::{MergeContext, ProgressFn};
use crate::pipeline::guards::require_state;
use crate::pipeline::runner::{MergePipeline, ValidateOptions};
use crate::raster::{Composite, EdgeStyle, OutputFormat, RasterImage};

/// Flow direction plus the per-direction sizing and alignment knobs.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(tag = "flow", rename_all = "lowercase")]
pub enum MasonryFlow {
    /// Rows of uniform height filling a fixed canvas width.
    Horizontal {
        /// Explicit row height; computed from the inputs when absent.
        #[serde(default)]
        row_height: Option<u32>,
        /// Fixed canvas width rows flow into.
        canvas_width: u32,
        /// In-row alignment.
        #[serde(default)]
        h_align: HorizontalAlign,
    },
    /// Columns of uniform width filling a fixed canvas height.
    Vertical {
        /// Explicit column width; computed from the inputs when absent.
        #[serde(default)]
        column_width: Option<u32>,
        /// Fixed canvas height columns flow into.
        canvas_height: u32,
        /// In-column alignment.
        #[serde(default)]
        v_align: VerticalAlign,
    },
}

/// In-row alignment for horizontal masonry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HorizontalAlign {
    /// Pack rows against the left edge.
    Left,
    /// Center each row.
    Center,
    /// Pack rows against the right edge.
    Right,
    /// Fill each row edge to edge, cropping trailing overflow.
    #[default]
    Justified,
}

/// In-column alignment for vertical masonry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerticalAlign {
    /// Pack columns against the top edge.
    Top,
    /// Center each column.
    Middle,
    /// Pack columns against the bottom edge.
    Bottom,
    /// Fill each column edge to edge, cropping trailing overflow.
    #[default]
    Justified,
}

/// Axis-neutral alignment the lane placement code works in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum LaneAlign {
    Start,
    Center,
    End,
    Justified,
}

impl From<HorizontalAlign> for LaneAlign {
    fn from(align: HorizontalAlign) -> Self {
        match align {
            HorizontalAlign::Left => LaneAlign::Start,
            HorizontalAlign::Center => LaneAlign::Center,
            HorizontalAlign::Right => LaneAlign::End,
            HorizontalAlign::Justified => LaneAlign::Justified,
        }
    }
}

impl From<VerticalAlign> for LaneAlign {
    fn from(align: VerticalAlign) -> Self {
        match align {
            VerticalAlign::Top => LaneAlign::Start,
            VerticalAlign::Middle => LaneAlign::Center,
            VerticalAlign::Bottom => LaneAlign::End,
            VerticalAlign::Justified => LaneAlign::Justified,
        }
    }
}

/// Options for [`masonry_merge`].
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct MasonryOptions {
    /// Randomize image order before packing.
    #[serde(default)]
    pub shuffle: bool,
    /// Spacing between images and around the canvas edge.
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
    /// Flow direction and its sizing knobs.
    #[serde(flatten)]
    pub flow: MasonryFlow,
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

impl MasonryOptions {
    /// Horizontal-flow options with defaults for everything else.
    pub fn horizontal(canvas_width: u32) -> Self {
        Self::with_flow(MasonryFlow::Horizontal {
            row_height: None,
            canvas_width,
            h_align: HorizontalAlign::default(),
        })
    }

    /// Vertical-flow options with defaults for everything else.
    pub fn vertical(canvas_height: u32) -> Self {
        Self::with_flow(MasonryFlow::Vertical {
            column_width: None,
            canvas_height,
            v_align: VerticalAlign::default(),
        })
    }

    fn with_flow(flow: MasonryFlow) -> Self {
        Self {
            shuffle: false,
            gap: default_gap(),
            canvas_color: default_canvas_color(),
            border_width: 0,
            border_color: default_border_color(),
            corner_radius: 0,
            format: OutputFormat::default(),
            flow,
        }
    }

    /// The caller-fixed extent of the flow axis.
    fn primary_canvas_size(&self) -> u32 {
        match self.flow {
            MasonryFlow::Horizontal { canvas_width, .. } => canvas_width,
            MasonryFlow::Vertical { canvas_height, .. } => canvas_height,
        }
    }

    fn explicit_lane_size(&self) -> Option<u32> {
        match self.flow {
            MasonryFlow::Horizontal { row_height, .. } => row_height,
            MasonryFlow::Vertical { column_width, .. } => column_width,
        }
    }

    fn lane_align(&self) -> LaneAlign {
        match self.flow {
            MasonryFlow::Horizontal { h_align, .. } => h_align.into(),
            MasonryFlow::Vertical { v_align, .. } => v_align.into(),
        }
    }
}

impl ValidateOptions for MasonryOptions {
    fn validate(&self) -> StitchResult<()> {
        let (name, size) = match self.flow {
            MasonryFlow::Horizontal { canvas_width, .. } => ("canvas_width", canvas_width),
            MasonryFlow::Vertical { canvas_height, .. } => ("canvas_height", canvas_height),
        };
        if size <= self.gap * 2 {
            return Err(StitchError::validation(format!(
                "{name} must be greater than twice the gap"
            )));
        }
        if self.explicit_lane_size() == Some(0) {
            let knob = match self.flow {
                MasonryFlow::Horizontal { .. } => "row_height",
                MasonryFlow::Vertical { .. } => "column_width",
            };
            return Err(StitchError::validation(format!(
                "{knob} must be greater than 0"
            )));
        }
        Ok(())
    }
}

impl CommonOptions for MasonryOptions {
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

/// Scratch state threaded through the masonry steps.
#[derive(Debug, Default)]
pub struct MasonryState {
    lane_size: Option<u32>,
    lanes: Option<Vec<Vec<RasterImage>>>,
    canvas_width: Option<u32>,
    canvas_height: Option<u32>,
}

impl CanvasState for MasonryState {
    fn canvas_size(&self) -> (Option<u32>, Option<u32>) {
        (self.canvas_width, self.canvas_height)
    }
}

/// Merge `inputs` into a masonry arrangement per `options`.
#[instrument(skip_all, fields(inputs = inputs.len()))]
pub fn masonry_merge(
    inputs: Vec<Vec<u8>>,
    options: MasonryOptions,
    on_progress: Option<ProgressFn<'_>>,
) -> StitchResult<Vec<u8>> {
    wire_steps(MergePipeline::new(inputs, options, on_progress)?).run()
}

/// As [`masonry_merge`], with a caller-seeded RNG for reproducible shuffles.
pub fn masonry_merge_with_rng(
    inputs: Vec<Vec<u8>>,
    options: MasonryOptions,
    on_progress: Option<ProgressFn<'_>>,
    rng: SmallRng,
) -> StitchResult<Vec<u8>> {
    wire_steps(MergePipeline::with_rng(inputs, options, on_progress, rng)?).run()
}

fn wire_steps<'p>(
    pipeline: MergePipeline<'p, MasonryOptions, MasonryState>,
) -> MergePipeline<'p, MasonryOptions, MasonryState> {
    pipeline
        .step(shared::load_images)
        .step(shared::shuffle_images)
        .step(calculate_lane_size)
        .step(resize_images)
        .step(split_into_lanes)
        .step(calculate_canvas_dimensions)
        .step(shared::create_canvas)
        .step(create_composites)
        .step(shared::apply_composites)
        .step(shared::export_canvas)
}

/// The extent an image occupies along the flow axis.
fn primary_extent(flow: &MasonryFlow, image: &RasterImage) -> u32 {
    match flow {
        MasonryFlow::Horizontal { .. } => image.width(),
        MasonryFlow::Vertical { .. } => image.height(),
    }
}

/// Settle the uniform lane cross-size: row height or column width.
fn calculate_lane_size(
    ctx: &mut MergeContext<MasonryState>,
    options: MasonryOptions,
    _on_progress: &mut Option<ProgressFn<'_>>,
) -> StitchResult<Option<Vec<u8>>> {
    let size = match options.explicit_lane_size() {
        Some(size) => size,
        None => {
            let cross_sizes: Vec<u32> = ctx
                .images
                .iter()
                .map(|img| match options.flow {
                    MasonryFlow::Horizontal { .. } => img.height(),
                    MasonryFlow::Vertical { .. } => img.width(),
                })
                .collect();
            let median = trimmed_median(&cross_sizes)
                .ok_or_else(|| StitchError::internal("images must not be empty"))?;
            (median.round() as u32).max(1)
        }
    };
    ctx.state.lane_size = Some(size);
    Ok(None)
}

/// Scale every image to the lane cross-size, preserving aspect ratio.
fn resize_images(
    ctx: &mut MergeContext<MasonryState>,
    options: MasonryOptions,
    _on_progress: &mut Option<ProgressFn<'_>>,
) -> StitchResult<Option<Vec<u8>>> {
    let lane_size = *require_state(&ctx.state.lane_size, "lane_size")?;

    let mut resized = Vec::with_capacity(ctx.images.len());
    for image in ctx.images.drain(..) {
        let scaled = match options.flow {
            MasonryFlow::Horizontal { .. } => image.scale_to_height(lane_size)?,
            MasonryFlow::Vertical { .. } => image.scale_to_width(lane_size)?,
        };
        resized.push(scaled);
    }
    ctx.images = resized;
    Ok(None)
}

/// Partition the images into lanes along the flow axis.
///
/// Justified lanes admit the image that crosses the canvas edge and rely on
/// placement to crop it; the other alignments close the lane before an
/// image would overflow.
fn split_into_lanes(
    ctx: &mut MergeContext<MasonryState>,
    options: MasonryOptions,
    _on_progress: &mut Option<ProgressFn<'_>>,
) -> StitchResult<Option<Vec<u8>>> {
    let canvas_size = i64::from(options.primary_canvas_size());
    let gap = i64::from(options.gap);
    let justified = options.lane_align() == LaneAlign::Justified;

    let mut lanes: Vec<Vec<RasterImage>> = Vec::new();
    let mut lane: Vec<RasterImage> = Vec::new();
    let mut cursor = gap;

    for image in ctx.images.drain(..) {
        let extent = i64::from(primary_extent(&options.flow, &image));
        if justified {
            cursor += extent + gap;
            lane.push(image);
            if cursor + gap >= canvas_size {
                lanes.push(std::mem::take(&mut lane));
                cursor = gap;
            }
        } else {
            if !lane.is_empty() && cursor + extent > canvas_size {
                lanes.push(std::mem::take(&mut lane));
                cursor = gap;
            }
            cursor += extent + gap;
            lane.push(image);
        }
    }
    if !lane.is_empty() {
        lanes.push(lane);
    }

    ctx.state.lanes = Some(lanes);
    Ok(None)
}

/// The flow axis is caller-fixed; the cross axis grows with the lane count.
fn calculate_canvas_dimensions(
    ctx: &mut MergeContext<MasonryState>,
    options: MasonryOptions,
    _on_progress: &mut Option<ProgressFn<'_>>,
) -> StitchResult<Option<Vec<u8>>> {
    let lane_size = *require_state(&ctx.state.lane_size, "lane_size")?;
    let lanes = require_state(&ctx.state.lanes, "lanes")?;
    let lane_count = lanes.len() as u32;
    let cross = lane_size * lane_count + options.gap * (lane_count + 1);

    let (width, height) = match options.flow {
        MasonryFlow::Horizontal { canvas_width, .. } => (canvas_width, cross),
        MasonryFlow::Vertical { canvas_height, .. } => (cross, canvas_height),
    };
    ctx.state.canvas_width = Some(width);
    ctx.state.canvas_height = Some(height);
    Ok(None)
}

/// Leading offset of a lane's content along the flow axis.
fn lane_offset(align: LaneAlign, canvas_size: i64, content: i64, gap: i64) -> i64 {
    match align {
        LaneAlign::Start | LaneAlign::Justified => gap,
        LaneAlign::End => canvas_size - content - gap,
        LaneAlign::Center => (canvas_size - content) / 2,
    }
}

/// Place each lane's images, cropping justified overflow at the far edge.
fn create_composites(
    ctx: &mut MergeContext<MasonryState>,
    options: MasonryOptions,
    on_progress: &mut Option<ProgressFn<'_>>,
) -> StitchResult<Option<Vec<u8>>> {
    let lane_size = *require_state(&ctx.state.lane_size, "lane_size")?;
    let lanes = ctx
        .state
        .lanes
        .take()
        .ok_or_else(|| StitchError::internal("state field lanes was not initialized"))?;

    let canvas_size = i64::from(options.primary_canvas_size());
    let gap = i64::from(options.gap);
    let align = options.lane_align();
    let style = options.edge_style();

    let mut cross_cursor = gap;
    for lane in lanes {
        let content: i64 = lane
            .iter()
            .map(|img| i64::from(primary_extent(&options.flow, img)))
            .sum::<i64>()
            + gap * (lane.len() as i64 - 1);
        let mut cursor = lane_offset(align, canvas_size, content, gap);

        for image in lane {
            let mut extent = i64::from(primary_extent(&options.flow, &image));
            let mut image = image;

            // Justified lanes crop the image that runs past the far edge.
            if align == LaneAlign::Justified && cursor + extent > canvas_size - gap {
                let available = (canvas_size - gap - cursor).max(1);
                if available < extent {
                    image = match options.flow {
                        MasonryFlow::Horizontal { .. } => {
                            image.resize_cover(available as u32, lane_size)?
                        }
                        MasonryFlow::Vertical { .. } => {
                            image.resize_cover(lane_size, available as u32)?
                        }
                    };
                    extent = available;
                }
            }

            let image = image.apply_edges(&style)?;
            let (x, y) = match options.flow {
                MasonryFlow::Horizontal { .. } => (cursor, cross_cursor),
                MasonryFlow::Vertical { .. } => (cross_cursor, cursor),
            };
            ctx.composites.push(Composite { image, x, y });
            cursor += extent + gap;
            ctx.bump_progress("Merging images", on_progress);
        }
        cross_cursor += i64::from(lane_size) + gap;
    }
    Ok(None)
}

#[cfg(test)]
#[path = "../../tests/unit/layouts/masonry.rs"]
mod tests;
