use std::io::Cursor;

use super::RasterImage;
use crate::foundation::error::{StitchError, StitchResult};

/// Supported output encodings.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Lossless, the default.
    #[default]
    Png,
    /// Lossy; alpha is flattened before encoding.
    Jpeg,
    /// WebP.
    Webp,
    /// GIF.
    Gif,
    /// TIFF.
    Tiff,
    /// AVIF.
    Avif,
}

impl OutputFormat {
    /// Per-format cap on either canvas dimension, where the codec has one.
    pub fn max_dimension(self) -> Option<u32> {
        match self {
            OutputFormat::Webp => Some(16_383),
            OutputFormat::Gif | OutputFormat::Jpeg => Some(65_535),
            OutputFormat::Png | OutputFormat::Tiff | OutputFormat::Avif => None,
        }
    }

    fn image_format(self) -> image::ImageFormat {
        match self {
            OutputFormat::Png => image::ImageFormat::Png,
            OutputFormat::Jpeg => image::ImageFormat::Jpeg,
            OutputFormat::Webp => image::ImageFormat::WebP,
            OutputFormat::Gif => image::ImageFormat::Gif,
            OutputFormat::Tiff => image::ImageFormat::Tiff,
            OutputFormat::Avif => image::ImageFormat::Avif,
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            OutputFormat::Png => "png",
            OutputFormat::Jpeg => "jpeg",
            OutputFormat::Webp => "webp",
            OutputFormat::Gif => "gif",
            OutputFormat::Tiff => "tiff",
            OutputFormat::Avif => "avif",
        };
        f.write_str(name)
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = StitchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "png" => Ok(OutputFormat::Png),
            "jpeg" | "jpg" => Ok(OutputFormat::Jpeg),
            "webp" => Ok(OutputFormat::Webp),
            "gif" => Ok(OutputFormat::Gif),
            "tiff" => Ok(OutputFormat::Tiff),
            "avif" => Ok(OutputFormat::Avif),
            other => Err(StitchError::validation(format!(
                "unknown output format '{other}'"
            ))),
        }
    }
}

/// Encode a finished canvas into the requested format.
///
/// Canvases wider or taller than the codec allows fail with an actionable
/// [`StitchError::Image`] instead of a codec-level error.
pub fn encode_image(canvas: &RasterImage, format: OutputFormat) -> StitchResult<Vec<u8>> {
    if let Some(limit) = format.max_dimension()
        && (canvas.width() > limit || canvas.height() > limit)
    {
        return Err(StitchError::image(format!(
            "image too large for \"{format}\" format, try a format that allows larger images"
        )));
    }

    let mut encoded = Vec::new();
    let result = match format {
        // JPEG has no alpha channel; flatten before encoding.
        OutputFormat::Jpeg => image::DynamicImage::ImageRgba8(canvas.pixels().clone())
            .to_rgb8()
            .write_to(&mut Cursor::new(&mut encoded), format.image_format()),
        _ => canvas
            .pixels()
            .write_to(&mut Cursor::new(&mut encoded), format.image_format()),
    };
    result.map_err(|err| {
        StitchError::internal_with(format!("failed to encode {format} output"), err)
    })?;
    Ok(encoded)
}

#[cfg(test)]
#[path = "../../tests/unit/raster/encode.rs"]
mod tests;
