//! The raster collaborator: decode, resize, rotate, mask, compose, encode.
//!
//! Layout stages treat [`RasterImage`] as an opaque handle and only go
//! through the narrow surface exposed here; everything pixel-shaped lives
//! in this module.

mod decode;
mod edges;
mod encode;
mod ops;
pub(crate) mod text;

pub use decode::decode_image;
pub use edges::EdgeStyle;
pub use encode::{OutputFormat, encode_image};

use crate::foundation::color::Rgba;
use crate::foundation::error::{StitchError, StitchResult};

/// A decoded working image in straight-alpha RGBA8 form.
#[derive(Clone, Debug)]
pub struct RasterImage {
    pixels: image::RgbaImage,
}

/// A single placement instruction consumed by canvas compositing.
///
/// Draw order equals list order; later composites draw on top.
#[derive(Clone, Debug)]
pub struct Composite {
    /// The overlay pixels.
    pub image: RasterImage,
    /// Horizontal offset of the overlay's top-left corner on the canvas.
    pub x: i64,
    /// Vertical offset of the overlay's top-left corner on the canvas.
    pub y: i64,
}

impl RasterImage {
    pub(crate) fn from_rgba(pixels: image::RgbaImage) -> Self {
        Self { pixels }
    }

    pub(crate) fn pixels(&self) -> &image::RgbaImage {
        &self.pixels
    }

    /// Construct a blank canvas filled with a background color.
    pub fn blank(width: u32, height: u32, background: Rgba) -> StitchResult<Self> {
        if width == 0 || height == 0 {
            return Err(StitchError::internal(format!(
                "cannot create a {width}x{height} canvas"
            )));
        }
        let fill = image::Rgba([background.r, background.g, background.b, background.alpha_u8()]);
        Ok(Self {
            pixels: image::RgbaImage::from_pixel(width, height, fill),
        })
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// Channel count of the backing buffer; always RGBA here.
    pub fn channels(&self) -> u8 {
        4
    }

    /// Composite an ordered list of overlays onto this canvas.
    ///
    /// Overlays are clipped against the canvas bounds; later entries draw
    /// over earlier ones.
    pub fn composite(&mut self, overlays: &[Composite]) {
        for overlay in overlays {
            self.draw_over(&overlay.image, overlay.x, overlay.y);
        }
    }

    fn draw_over(&mut self, src: &RasterImage, x: i64, y: i64) {
        let dst_w = i64::from(self.pixels.width());
        let dst_h = i64::from(self.pixels.height());

        for (sx, sy, &pixel) in src.pixels.enumerate_pixels() {
            let dx = x + i64::from(sx);
            let dy = y + i64::from(sy);
            if dx < 0 || dy < 0 || dx >= dst_w || dy >= dst_h {
                continue;
            }
            let dst = self.pixels.get_pixel_mut(dx as u32, dy as u32);
            *dst = over(*dst, pixel);
        }
    }
}

/// Straight-alpha source-over blend of one pixel.
fn over(dst: image::Rgba<u8>, src: image::Rgba<u8>) -> image::Rgba<u8> {
    if src.0[3] == 255 {
        return src;
    }
    if src.0[3] == 0 {
        return dst;
    }

    let sa = f32::from(src.0[3]) / 255.0;
    let da = f32::from(dst.0[3]) / 255.0;
    let oa = sa + da * (1.0 - sa);
    if oa <= 0.0 {
        return image::Rgba([0, 0, 0, 0]);
    }

    let mut out = [0u8; 4];
    for i in 0..3 {
        let sc = f32::from(src.0[i]);
        let dc = f32::from(dst.0[i]);
        out[i] = ((sc * sa + dc * da * (1.0 - sa)) / oa).round().clamp(0.0, 255.0) as u8;
    }
    out[3] = (oa * 255.0).round() as u8;
    image::Rgba(out)
}
