//! Caption text support: SVG construction, measurement, and font fitting.
//!
//! Captions are laid out by rendering an SVG `<text>` element, which keeps
//! shaping and fallback handling inside the SVG engine instead of this
//! crate.

use std::sync::{Arc, OnceLock};

use anyhow::Context;

use super::RasterImage;
use crate::foundation::color::Rgba;
use crate::foundation::error::{StitchError, StitchResult};

/// Smallest font size the fitting loop will return.
pub(crate) const MIN_FONT_SIZE: u32 = 2;

/// Overflow past this many pixels shrinks in coarse steps.
const COARSE_OVERFLOW: f64 = 200.0;
const COARSE_STEP: u32 = 5;
const FINE_STEP: u32 = 2;

static FONTDB: OnceLock<Arc<usvg::fontdb::Database>> = OnceLock::new();

/// System font database, loaded once per process.
fn font_database() -> Arc<usvg::fontdb::Database> {
    FONTDB
        .get_or_init(|| {
            let mut db = usvg::fontdb::Database::new();
            db.load_system_fonts();
            Arc::new(db)
        })
        .clone()
}

/// SVG parse options sharing the cached font database.
pub(crate) fn svg_options() -> usvg::Options<'static> {
    usvg::Options {
        fontdb: font_database(),
        ..usvg::Options::default()
    }
}

/// Escape text for embedding in SVG markup.
pub(crate) fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            other => escaped.push(other),
        }
    }
    escaped
}

fn rgb_hex(color: Rgba) -> String {
    format!("#{:02x}{:02x}{:02x}", color.r, color.g, color.b)
}

/// Rasterize a parsed SVG tree into a straight-alpha image of the given size.
pub(crate) fn render_svg_tree(
    tree: &usvg::Tree,
    width: u32,
    height: u32,
) -> StitchResult<RasterImage> {
    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height).ok_or_else(|| {
        StitchError::internal(format!("cannot allocate a {width}x{height} svg surface"))
    })?;
    resvg::render(tree, resvg::tiny_skia::Transform::identity(), &mut pixmap.as_mut());

    let mut pixels = image::RgbaImage::new(width, height);
    for (target, source) in pixels.pixels_mut().zip(pixmap.pixels()) {
        let straight = source.demultiply();
        *target = image::Rgba([
            straight.red(),
            straight.green(),
            straight.blue(),
            straight.alpha(),
        ]);
    }
    Ok(RasterImage::from_rgba(pixels))
}

/// Render a standalone SVG document.
pub(crate) fn render_svg(svg: &str, width: u32, height: u32) -> StitchResult<RasterImage> {
    let tree =
        usvg::Tree::from_str(svg, &svg_options()).context("parse generated svg markup")?;
    render_svg_tree(&tree, width, height)
}

/// Measure the layout bounds of `text` at `font_size`, in pixels.
fn measure_text(text: &str, font_size: u32) -> StitchResult<(f64, f64)> {
    let svg = format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg"><text x="0" y="{font_size}" font-family="sans-serif" font-size="{font_size}">{}</text></svg>"#,
        escape_xml(text)
    );
    let tree =
        usvg::Tree::from_str(&svg, &svg_options()).context("parse text measurement svg")?;
    let bbox = tree.root().abs_bounding_box();
    Ok((f64::from(bbox.width()), f64::from(bbox.height())))
}

/// Shrink a starting font size until `text` fits inside the given box.
///
/// Steps down coarsely while far from fitting, finely near the boundary,
/// and never drops below [`MIN_FONT_SIZE`].
pub(crate) fn fit_font_size(
    text: &str,
    max_width: f64,
    max_height: f64,
    initial: u32,
) -> StitchResult<u32> {
    let mut size = initial.max(MIN_FONT_SIZE);
    loop {
        let (width, height) = measure_text(text, size)?;
        if width <= max_width && height <= max_height {
            return Ok(size);
        }
        if size <= MIN_FONT_SIZE {
            return Ok(MIN_FONT_SIZE);
        }
        let overflow = (width - max_width).max(height - max_height);
        let step = if overflow > COARSE_OVERFLOW {
            COARSE_STEP
        } else {
            FINE_STEP
        };
        size = size.saturating_sub(step).max(MIN_FONT_SIZE);
    }
}

/// Render a centered caption into a `width` x `height` transparent strip.
pub(crate) fn render_caption(
    text: &str,
    width: u32,
    height: u32,
    font_size: u32,
    color: Rgba,
) -> StitchResult<RasterImage> {
    let svg = format!(
        concat!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
            r#"<text x="50%" y="50%" dy="0.35em" text-anchor="middle" "#,
            r#"font-family="sans-serif" font-size="{size}" fill="{fill}" fill-opacity="{opacity}">{body}</text>"#,
            r#"</svg>"#
        ),
        w = width,
        h = height,
        size = font_size,
        fill = rgb_hex(color),
        opacity = color.alpha,
        body = escape_xml(text),
    );
    render_svg(&svg, width, height)
}
