//! Geometry operations on working images: resizing, cover cropping, rotation.

use image::imageops::FilterType;

use super::RasterImage;
use crate::foundation::error::{StitchError, StitchResult};

impl RasterImage {
    /// Resize to exact dimensions, ignoring the source aspect ratio.
    pub fn resize(&self, width: u32, height: u32) -> StitchResult<Self> {
        check_target(width, height)?;
        Ok(Self::from_rgba(image::imageops::resize(
            self.pixels(),
            width,
            height,
            FilterType::Triangle,
        )))
    }

    /// Resize to a target width, scaling height to preserve aspect ratio.
    pub fn scale_to_width(&self, width: u32) -> StitchResult<Self> {
        check_target(width, 1)?;
        let height = u64::from(width) * u64::from(self.height()) / u64::from(self.width());
        self.resize(width, (height as u32).max(1))
    }

    /// Resize to a target height, scaling width to preserve aspect ratio.
    pub fn scale_to_height(&self, height: u32) -> StitchResult<Self> {
        check_target(1, height)?;
        let width = u64::from(height) * u64::from(self.width()) / u64::from(self.height());
        self.resize((width as u32).max(1), height)
    }

    /// Fill the target box, cropping centered overflow on the longer axis.
    pub fn resize_cover(&self, width: u32, height: u32) -> StitchResult<Self> {
        check_target(width, height)?;
        let covered = image::DynamicImage::ImageRgba8(self.pixels().clone())
            .resize_to_fill(width, height, FilterType::Triangle)
            .into_rgba8();
        Ok(Self::from_rgba(covered))
    }

    /// Rotate about the image center, growing the bounds to hold every
    /// source pixel and filling uncovered regions with transparency.
    pub fn rotate(&self, degrees: f64) -> Self {
        if degrees.rem_euclid(360.0) == 0.0 {
            return self.clone();
        }

        let radians = degrees.to_radians();
        let (sin, cos) = radians.sin_cos();
        let src_w = f64::from(self.width());
        let src_h = f64::from(self.height());
        // Tiny epsilon keeps float noise in sin/cos from growing an axis.
        let out_w = ((src_w * cos.abs() + src_h * sin.abs()) - 1e-9).ceil().max(1.0) as u32;
        let out_h = ((src_w * sin.abs() + src_h * cos.abs()) - 1e-9).ceil().max(1.0) as u32;

        let mut rotated = image::RgbaImage::new(out_w, out_h);
        let (out_cx, out_cy) = (f64::from(out_w) / 2.0, f64::from(out_h) / 2.0);
        let (src_cx, src_cy) = (src_w / 2.0, src_h / 2.0);

        for (dx, dy, pixel) in rotated.enumerate_pixels_mut() {
            // Inverse-map the destination pixel center into source space.
            let rel_x = f64::from(dx) + 0.5 - out_cx;
            let rel_y = f64::from(dy) + 0.5 - out_cy;
            let sx = rel_x * cos + rel_y * sin + src_cx - 0.5;
            let sy = -rel_x * sin + rel_y * cos + src_cy - 0.5;
            *pixel = sample_bilinear(self.pixels(), sx, sy);
        }
        Self::from_rgba(rotated)
    }
}

fn check_target(width: u32, height: u32) -> StitchResult<()> {
    if width == 0 || height == 0 {
        return Err(StitchError::internal(format!(
            "cannot resize to {width}x{height}"
        )));
    }
    Ok(())
}

/// Bilinear sample with transparent black outside the source bounds.
fn sample_bilinear(src: &image::RgbaImage, x: f64, y: f64) -> image::Rgba<u8> {
    let x0 = x.floor();
    let y0 = y.floor();
    let fx = x - x0;
    let fy = y - y0;

    let tap = |ix: f64, iy: f64| -> [f64; 4] {
        if ix < 0.0 || iy < 0.0 || ix >= f64::from(src.width()) || iy >= f64::from(src.height()) {
            return [0.0; 4];
        }
        let p = src.get_pixel(ix as u32, iy as u32).0;
        [
            f64::from(p[0]),
            f64::from(p[1]),
            f64::from(p[2]),
            f64::from(p[3]),
        ]
    };

    let p00 = tap(x0, y0);
    let p10 = tap(x0 + 1.0, y0);
    let p01 = tap(x0, y0 + 1.0);
    let p11 = tap(x0 + 1.0, y0 + 1.0);

    let mut out = [0u8; 4];
    for i in 0..4 {
        let top = p00[i] * (1.0 - fx) + p10[i] * fx;
        let bottom = p01[i] * (1.0 - fx) + p11[i] * fx;
        out[i] = (top * (1.0 - fy) + bottom * fy).round().clamp(0.0, 255.0) as u8;
    }
    image::Rgba(out)
}
