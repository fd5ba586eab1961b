//! Precondition guards used at step boundaries.
//!
//! A failing guard always means a wiring defect in a step list, never bad
//! caller input, so every guard reports [`StitchError::Internal`].

use crate::foundation::error::{StitchError, StitchResult};
use crate::pipeline::context::MergeContext;
use crate::raster::RasterImage;

/// Require that an earlier step populated an optional state field.
pub fn require_state<'a, T>(field: &'a Option<T>, name: &str) -> StitchResult<&'a T> {
    field.as_ref().ok_or_else(|| {
        StitchError::internal(format!("state field {name} was not initialized"))
    })
}

/// Require a non-empty collection.
pub fn require_non_empty<T>(items: &[T], name: &str) -> StitchResult<()> {
    if items.is_empty() {
        return Err(StitchError::internal(format!("{name} must not be empty")));
    }
    Ok(())
}

/// Require that a canvas-creating step already ran.
pub fn require_canvas<S>(ctx: &mut MergeContext<S>) -> StitchResult<&mut RasterImage> {
    ctx.canvas.as_mut().ok_or_else(|| {
        StitchError::internal("state field canvas was not initialized".to_string())
    })
}
