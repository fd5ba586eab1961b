//! Rounded corners and borders, applied as SVG-rendered overlays.

use super::RasterImage;
use super::text::render_svg;
use crate::foundation::color::Rgba;
use crate::foundation::error::StitchResult;

/// Edge treatment applied to a prepared image: corner rounding first, then
/// an inset border stroke.
#[derive(Clone, Copy, Debug)]
pub struct EdgeStyle {
    /// Stroke width in pixels; `0` disables the border.
    pub border_width: u32,
    /// Stroke color.
    pub border_color: Rgba,
    /// Corner radius in pixels; `0` keeps square corners.
    pub corner_radius: u32,
}

impl EdgeStyle {
    /// True when this style changes nothing.
    pub fn is_noop(&self) -> bool {
        self.border_width == 0 && self.corner_radius == 0
    }
}

impl RasterImage {
    /// Apply corner rounding and a border per `style`.
    ///
    /// The border width is clamped so the stroke never exceeds half of
    /// either image dimension.
    pub fn apply_edges(&self, style: &EdgeStyle) -> StitchResult<Self> {
        if style.is_noop() {
            return Ok(self.clone());
        }

        let width = self.width();
        let height = self.height();
        let mut shaped = self.clone();

        if style.corner_radius > 0 {
            let mask = corner_mask(width, height, style.corner_radius)?;
            shaped.mask_alpha(&mask);
        }

        let border = style.border_width.min(width / 2).min(height / 2);
        if border > 0 {
            let stroke = border_stroke(width, height, border, style)?;
            shaped.draw_over(&stroke, 0, 0);
        }
        Ok(shaped)
    }

    /// Multiply this image's alpha by the mask's alpha, pixel by pixel.
    fn mask_alpha(&mut self, mask: &RasterImage) {
        for (pixel, mask_pixel) in self.pixels.pixels_mut().zip(mask.pixels().pixels()) {
            let a = u16::from(pixel.0[3]) * u16::from(mask_pixel.0[3]) / 255;
            pixel.0[3] = a as u8;
        }
    }
}

/// White rounded rectangle whose alpha selects the pixels to keep.
fn corner_mask(width: u32, height: u32, radius: u32) -> StitchResult<RasterImage> {
    let svg = format!(
        r##"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}"><rect width="{width}" height="{height}" rx="{radius}" ry="{radius}" fill="#ffffff"/></svg>"##
    );
    render_svg(&svg, width, height)
}

/// Border stroke drawn inset so the full stroke width stays inside the image,
/// with corner rounding matched to the mask.
fn border_stroke(
    width: u32,
    height: u32,
    border: u32,
    style: &EdgeStyle,
) -> StitchResult<RasterImage> {
    let inset = f64::from(border) / 2.0;
    let rect_w = f64::from(width) - f64::from(border);
    let rect_h = f64::from(height) - f64::from(border);
    let radius = f64::from(style.corner_radius).max(0.0);
    let fill = format!(
        "#{:02x}{:02x}{:02x}",
        style.border_color.r, style.border_color.g, style.border_color.b
    );
    let svg = format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}"><rect x="{inset}" y="{inset}" width="{rect_w}" height="{rect_h}" rx="{radius}" ry="{radius}" fill="none" stroke="{fill}" stroke-opacity="{opacity}" stroke-width="{border}"/></svg>"#,
        opacity = style.border_color.alpha,
    );
    render_svg(&svg, width, height)
}
