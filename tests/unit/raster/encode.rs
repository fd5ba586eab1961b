use super::*;
use crate::foundation::color::Rgba;
use crate::raster::decode_image;

fn canvas(w: u32, h: u32) -> RasterImage {
    RasterImage::blank(w, h, Rgba::WHITE).unwrap()
}

#[test]
fn png_round_trips_through_decode() {
    let encoded = encode_image(&canvas(12, 7), OutputFormat::Png).unwrap();
    let decoded = decode_image(&encoded).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (12, 7));
    assert_eq!(decoded.pixels().get_pixel(0, 0).0, [255, 255, 255, 255]);
}

#[test]
fn jpeg_flattens_alpha_before_encoding() {
    let semi = RasterImage::blank(
        6,
        6,
        Rgba {
            r: 10,
            g: 20,
            b: 30,
            alpha: 0.5,
        },
    )
    .unwrap();
    let encoded = encode_image(&semi, OutputFormat::Jpeg).unwrap();
    let decoded = decode_image(&encoded).unwrap();
    assert_eq!(decoded.pixels().get_pixel(3, 3).0[3], 255);
}

#[test]
fn webp_rejects_oversized_canvases_with_an_actionable_message() {
    let too_wide = canvas(16_384, 1);
    let err = encode_image(&too_wide, OutputFormat::Webp).unwrap_err();
    match err {
        StitchError::Image(message) => {
            assert!(message.contains("webp"), "message was: {message}");
            assert!(message.contains("try a format"), "message was: {message}");
        }
        other => panic!("expected image error, got {other:?}"),
    }
    assert!(encode_image(&canvas(16_383, 1), OutputFormat::Webp).is_ok());
}

#[test]
fn dimension_limits_match_the_codec_table() {
    assert_eq!(OutputFormat::Webp.max_dimension(), Some(16_383));
    assert_eq!(OutputFormat::Gif.max_dimension(), Some(65_535));
    assert_eq!(OutputFormat::Jpeg.max_dimension(), Some(65_535));
    assert_eq!(OutputFormat::Png.max_dimension(), None);
    assert_eq!(OutputFormat::Tiff.max_dimension(), None);
    assert_eq!(OutputFormat::Avif.max_dimension(), None);
}

#[test]
fn format_names_parse_case_insensitively() {
    assert_eq!("PNG".parse::<OutputFormat>().unwrap(), OutputFormat::Png);
    assert_eq!("jpg".parse::<OutputFormat>().unwrap(), OutputFormat::Jpeg);
    assert_eq!("jpeg".parse::<OutputFormat>().unwrap(), OutputFormat::Jpeg);
    assert!("bmp".parse::<OutputFormat>().is_err());
}

#[test]
fn format_serializes_as_lowercase_strings() {
    assert_eq!(serde_json::to_string(&OutputFormat::Webp).unwrap(), "\"webp\"");
    let parsed: OutputFormat = serde_json::from_str("\"gif\"").unwrap();
    assert_eq!(parsed, OutputFormat::Gif);
}
