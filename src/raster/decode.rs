use anyhow::Context;

use super::RasterImage;
use super::text::render_svg_tree;
use crate::foundation::error::StitchResult;

/// Decode an encoded input buffer into a working [`RasterImage`].
///
/// Bitmap formats go through the `image` crate; SVG documents are detected
/// by sniffing the buffer and rasterized at their intrinsic size.
pub fn decode_image(bytes: &[u8]) -> StitchResult<RasterImage> {
    if looks_like_svg(bytes) {
        return decode_svg(bytes);
    }

    let decoded = image::load_from_memory(bytes)
        .context("decode image from memory")?
        .to_rgba8();
    Ok(RasterImage::from_rgba(decoded))
}

/// Cheap SVG sniff: an XML-ish prefix plus an `<svg` tag somewhere early.
fn looks_like_svg(bytes: &[u8]) -> bool {
    let head = &bytes[..bytes.len().min(1024)];
    let Ok(text) = std::str::from_utf8(head) else {
        return false;
    };
    let trimmed = text.trim_start_matches(['\u{feff}', ' ', '\t', '\r', '\n']);
    trimmed.starts_with('<') && trimmed.contains("<svg")
}

fn decode_svg(bytes: &[u8]) -> StitchResult<RasterImage> {
    let tree = usvg::Tree::from_data(bytes, &super::text::svg_options())
        .context("parse svg document")?;
    let size = tree.size();
    let width = size.width().ceil() as u32;
    let height = size.height().ceil() as u32;
    render_svg_tree(&tree, width, height)
}
