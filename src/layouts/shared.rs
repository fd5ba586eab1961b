//! Steps shared by every layout strategy.

use rand::seq::SliceRandom;

use super::{CanvasState, CommonOptions};
use crate::foundation::error::{StitchError, StitchResult};
use crate::pipeline::context::{MergeContext, ProgressFn};
use crate::pipeline::guards::{require_canvas, require_non_empty, require_state};
use crate::raster::{RasterImage, decode_image, encode_image};

/// Decode every input buffer into a working image.
///
/// A buffer that fails to decode is a caller error and is reported with its
/// input index.
pub(crate) fn load_images<O, S>(
    ctx: &mut MergeContext<S>,
    _options: O,
    _on_progress: &mut Option<ProgressFn<'_>>,
) -> StitchResult<Option<Vec<u8>>> {
    if ctx.inputs.is_empty() {
        return Err(StitchError::validation("at least one image input is required"));
    }

    let mut images = Vec::with_capacity(ctx.inputs.len());
    for (index, bytes) in ctx.inputs.iter().enumerate() {
        let image = decode_image(bytes)
            .map_err(|_| StitchError::validation(format!("Invalid image input at index {index}")))?;
        images.push(image);
    }
    ctx.images = images;
    Ok(None)
}

/// Randomize the decoded image order when the options ask for it.
pub(crate) fn shuffle_images<O, S>(
    ctx: &mut MergeContext<S>,
    options: O,
    _on_progress: &mut Option<ProgressFn<'_>>,
) -> StitchResult<Option<Vec<u8>>>
where
    O: CommonOptions,
{
    if options.shuffle() {
        let mut images = std::mem::take(&mut ctx.images);
        images.shuffle(&mut ctx.rng);
        ctx.images = images;
    }
    Ok(None)
}

/// Create the blank canvas from the dimensions a sizing step computed.
pub(crate) fn create_canvas<O, S>(
    ctx: &mut MergeContext<S>,
    options: O,
    _on_progress: &mut Option<ProgressFn<'_>>,
) -> StitchResult<Option<Vec<u8>>>
where
    O: CommonOptions,
    S: CanvasState,
{
    let (width, height) = ctx.state.canvas_size();
    let width = *require_state(&width, "canvas_width")?;
    let height = *require_state(&height, "canvas_height")?;
    ctx.canvas = Some(RasterImage::blank(width, height, options.canvas_color())?);
    Ok(None)
}

/// Draw the accumulated composites onto the canvas in list order.
pub(crate) fn apply_composites<O, S>(
    ctx: &mut MergeContext<S>,
    _options: O,
    _on_progress: &mut Option<ProgressFn<'_>>,
) -> StitchResult<Option<Vec<u8>>> {
    require_non_empty(&ctx.composites, "composites")?;
    let composites = std::mem::take(&mut ctx.composites);
    let canvas = require_canvas(ctx)?;
    canvas.composite(&composites);
    Ok(None)
}

/// Encode the finished canvas; this is the terminal step of every strategy.
pub(crate) fn export_canvas<O, S>(
    ctx: &mut MergeContext<S>,
    options: O,
    _on_progress: &mut Option<ProgressFn<'_>>,
) -> StitchResult<Option<Vec<u8>>>
where
    O: CommonOptions,
{
    let canvas = require_canvas(ctx)?;
    let encoded = encode_image(canvas, options.format())?;
    Ok(Some(encoded))
}
