use super::*;
use rand::SeedableRng;
use rand::rngs::SmallRng;

use crate::foundation::color::Rgba;
use crate::raster::{decode_image, encode_image};

fn block(w: u32, h: u32) -> RasterImage {
    RasterImage::blank(w, h, Rgba::BLACK).unwrap()
}

fn context_with_images(images: Vec<RasterImage>) -> MergeContext<MasonryState> {
    let mut ctx = MergeContext::with_rng(Vec::new(), SmallRng::seed_from_u64(1));
    ctx.images = images;
    ctx
}

fn horizontal_with(h_align: HorizontalAlign, canvas_width: u32) -> MasonryOptions {
    let mut options = MasonryOptions::horizontal(canvas_width);
    if let MasonryFlow::Horizontal {
        h_align: ref mut align,
        ..
    } = options.flow
    {
        *align = h_align;
    }
    options
}

#[test]
fn validation_requires_room_beyond_the_gaps() {
    let options = MasonryOptions::horizontal(100);
    // gap defaults to 50, so a 100px canvas leaves no room
    let err = options.validate().unwrap_err();
    assert_eq!(
        err.to_string(),
        "validation error: canvas_width must be greater than twice the gap"
    );
    assert!(MasonryOptions::horizontal(101).validate().is_ok());
    assert!(MasonryOptions::vertical(100).validate().is_err());
}

#[test]
fn lane_size_defaults_to_the_trimmed_median_cross_size() {
    let mut ctx = context_with_images(vec![block(10, 100), block(10, 110), block(10, 120)]);
    calculate_lane_size(&mut ctx, MasonryOptions::horizontal(1000), &mut None).unwrap();
    assert_eq!(ctx.state.lane_size, Some(110));

    let mut ctx = context_with_images(vec![block(80, 10), block(90, 10), block(100, 10)]);
    calculate_lane_size(&mut ctx, MasonryOptions::vertical(1000), &mut None).unwrap();
    assert_eq!(ctx.state.lane_size, Some(90));
}

#[test]
fn resize_scales_to_the_lane_cross_size() {
    let mut ctx = context_with_images(vec![block(300, 200)]);
    ctx.state.lane_size = Some(100);
    resize_images(&mut ctx, MasonryOptions::horizontal(1000), &mut None).unwrap();
    assert_eq!((ctx.images[0].width(), ctx.images[0].height()), (150, 100));

    let mut ctx = context_with_images(vec![block(300, 200)]);
    ctx.state.lane_size = Some(100);
    resize_images(&mut ctx, MasonryOptions::vertical(1000), &mut None).unwrap();
    assert_eq!((ctx.images[0].width(), ctx.images[0].height()), (100, 66));
}

#[test]
fn justified_lanes_admit_the_image_that_crosses_the_edge() {
    let mut ctx = context_with_images(vec![block(300, 100); 5]);
    ctx.state.lane_size = Some(100);
    split_into_lanes(&mut ctx, MasonryOptions::horizontal(1000), &mut None).unwrap();
    let lanes = ctx.state.lanes.as_ref().unwrap();
    let sizes: Vec<usize> = lanes.iter().map(|lane| lane.len()).collect();
    assert_eq!(sizes, vec![3, 2]);
}

#[test]
fn justified_lane_closes_once_a_trailing_gap_no_longer_fits() {
    // 3 x 300 plus 4 gaps fills 1100 of a 1120 canvas; a fourth image
    // would only ever render as a degenerate sliver, so it opens a new lane.
    let options = MasonryOptions::horizontal(1120);
    let mut ctx = context_with_images(vec![block(300, 100); 4]);
    ctx.state.lane_size = Some(100);
    split_into_lanes(&mut ctx, options.clone(), &mut None).unwrap();
    let lanes = ctx.state.lanes.as_ref().unwrap();
    let sizes: Vec<usize> = lanes.iter().map(|lane| lane.len()).collect();
    assert_eq!(sizes, vec![3, 1]);

    create_composites(&mut ctx, options, &mut None).unwrap();
    // Nothing may end past the content edge at canvas - gap.
    for composite in &ctx.composites {
        assert!(composite.x + i64::from(composite.image.width()) <= 1070);
    }
}

#[test]
fn non_justified_lanes_close_before_overflowing() {
    let mut ctx = context_with_images(vec![block(300, 100); 5]);
    ctx.state.lane_size = Some(100);
    split_into_lanes(
        &mut ctx,
        horizontal_with(HorizontalAlign::Left, 1000),
        &mut None,
    )
    .unwrap();
    let lanes = ctx.state.lanes.as_ref().unwrap();
    let sizes: Vec<usize> = lanes.iter().map(|lane| lane.len()).collect();
    assert_eq!(sizes, vec![2, 2, 1]);
}

#[test]
fn cross_axis_grows_with_the_lane_count() {
    let mut ctx = context_with_images(Vec::new());
    ctx.state.lane_size = Some(100);
    ctx.state.lanes = Some(vec![vec![block(10, 100)], vec![block(10, 100)]]);
    calculate_canvas_dimensions(&mut ctx, MasonryOptions::horizontal(1000), &mut None).unwrap();
    // two lanes of 100 plus three gaps of 50
    assert_eq!(ctx.state.canvas_size(), (Some(1000), Some(350)));
}

#[test]
fn justified_placement_crops_the_trailing_overflow() {
    let options = MasonryOptions::horizontal(1000);
    let mut ctx = context_with_images(Vec::new());
    ctx.state.lane_size = Some(100);
    ctx.state.lanes = Some(vec![vec![block(300, 100), block(300, 100), block(300, 100)]]);

    create_composites(&mut ctx, options, &mut None).unwrap();

    let xs: Vec<i64> = ctx.composites.iter().map(|c| c.x).collect();
    assert_eq!(xs, vec![50, 400, 750]);
    // 750 + 300 would cross the 950 content edge; the tail is cropped to fit.
    assert_eq!(ctx.composites[2].image.width(), 200);
    assert_eq!(ctx.composites[2].image.height(), 100);
}

#[test]
fn left_alignment_starts_at_the_gap_and_keeps_the_shortfall() {
    let mut ctx = context_with_images(Vec::new());
    ctx.state.lane_size = Some(100);
    ctx.state.lanes = Some(vec![vec![block(300, 100), block(300, 100)]]);
    create_composites(
        &mut ctx,
        horizontal_with(HorizontalAlign::Left, 1000),
        &mut None,
    )
    .unwrap();
    let xs: Vec<i64> = ctx.composites.iter().map(|c| c.x).collect();
    assert_eq!(xs, vec![50, 400]);
    // No cropping outside justified mode.
    assert_eq!(ctx.composites[1].image.width(), 300);
}

#[test]
fn right_and_center_alignment_shift_the_lane() {
    // content = 300 + 50 + 300 = 650
    let mut ctx = context_with_images(Vec::new());
    ctx.state.lane_size = Some(100);
    ctx.state.lanes = Some(vec![vec![block(300, 100), block(300, 100)]]);
    create_composites(
        &mut ctx,
        horizontal_with(HorizontalAlign::Right, 1000),
        &mut None,
    )
    .unwrap();
    let xs: Vec<i64> = ctx.composites.iter().map(|c| c.x).collect();
    assert_eq!(xs, vec![300, 650]);

    let mut ctx = context_with_images(Vec::new());
    ctx.state.lane_size = Some(100);
    ctx.state.lanes = Some(vec![vec![block(300, 100), block(300, 100)]]);
    create_composites(
        &mut ctx,
        horizontal_with(HorizontalAlign::Center, 1000),
        &mut None,
    )
    .unwrap();
    let xs: Vec<i64> = ctx.composites.iter().map(|c| c.x).collect();
    assert_eq!(xs, vec![175, 525]);
}

#[test]
fn vertical_flow_swaps_the_axes() {
    let mut ctx = context_with_images(Vec::new());
    ctx.state.lane_size = Some(100);
    ctx.state.lanes = Some(vec![vec![block(100, 300), block(100, 300)]]);
    create_composites(&mut ctx, MasonryOptions::vertical(1000), &mut None).unwrap();
    let positions: Vec<(i64, i64)> = ctx.composites.iter().map(|c| (c.x, c.y)).collect();
    assert_eq!(positions, vec![(50, 50), (50, 400)]);
}

#[test]
fn masonry_merge_produces_a_canvas_of_the_requested_width() {
    let inputs: Vec<Vec<u8>> = (0..4)
        .map(|_| encode_image(&block(300, 100), OutputFormat::Png).unwrap())
        .collect();
    let output = masonry_merge(inputs, MasonryOptions::horizontal(800), None).unwrap();
    let canvas = decode_image(&output).unwrap();
    assert_eq!(canvas.width(), 800);
    assert!(canvas.height() > 0);
}

#[test]
fn seeded_shuffle_reorders_inputs_reproducibly() {
    let order_for = |seed: u64| {
        let mut options = MasonryOptions::horizontal(1000);
        options.shuffle = true;
        let mut ctx: MergeContext<MasonryState> =
            MergeContext::with_rng(Vec::new(), SmallRng::seed_from_u64(seed));
        ctx.images = (0..8u32).map(|i| block(10 + i, 10)).collect();
        shared::shuffle_images(&mut ctx, options, &mut None).unwrap();
        ctx.images.iter().map(|img| img.width()).collect::<Vec<_>>()
    };
    assert_eq!(order_for(5), order_for(5));
}

#[test]
fn flow_deserializes_from_a_tagged_object() {
    let options: MasonryOptions = serde_json::from_str(
        r#"{"flow":"horizontal","canvas_width":1200,"h_align":"center","gap":10}"#,
    )
    .unwrap();
    assert_eq!(options.gap, 10);
    match options.flow {
        MasonryFlow::Horizontal {
            canvas_width,
            h_align,
            row_height,
        } => {
            assert_eq!(canvas_width, 1200);
            assert_eq!(h_align, HorizontalAlign::Center);
            assert_eq!(row_height, None);
        }
        other => panic!("expected horizontal flow, got {other:?}"),
    }
}
