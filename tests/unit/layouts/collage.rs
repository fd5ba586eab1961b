use super::*;
use rand::SeedableRng;
use rand::rngs::SmallRng;

use crate::raster::{RasterImage, decode_image, encode_image};

fn tile(side: u32) -> RasterImage {
    RasterImage::blank(side, side, Rgba::BLACK).unwrap()
}

fn context_with_images(seed: u64, images: Vec<RasterImage>) -> MergeContext<CollageState> {
    let mut ctx = MergeContext::with_rng(Vec::new(), SmallRng::seed_from_u64(seed));
    ctx.images = images;
    ctx
}

fn deterministic_options() -> CollageOptions {
    CollageOptions {
        overlap_percentage: 0,
        rotation_range: 0,
        image_width_variance: 0,
        ..CollageOptions::default()
    }
}

#[test]
fn validation_bounds_the_percentages_and_angles() {
    let options = CollageOptions {
        overlap_percentage: 101,
        ..CollageOptions::default()
    };
    assert!(options.validate().is_err());
    let options = CollageOptions {
        rotation_range: 361,
        ..CollageOptions::default()
    };
    assert!(options.validate().is_err());
    assert!(CollageOptions::default().validate().is_ok());
}

#[test]
fn zero_jitter_collage_is_a_plain_grid() {
    let mut options = deterministic_options();
    options.columns = 2;
    options.image_width = Some(100);

    let mut ctx = context_with_images(3, vec![tile(100), tile(100)]);
    calculate_image_dimensions(&mut ctx, options.clone(), &mut None).unwrap();
    resize_and_border_images(&mut ctx, options.clone(), &mut None).unwrap();
    rotate_images(&mut ctx, options.clone(), &mut None).unwrap();
    create_composites(&mut ctx, options, &mut None).unwrap();

    let mut positions: Vec<(i64, i64)> = ctx.composites.iter().map(|c| (c.x, c.y)).collect();
    positions.sort();
    assert_eq!(positions, vec![(0, 0), (100, 0)]);
    assert_eq!(ctx.state.canvas_size(), (Some(200), Some(100)));
}

#[test]
fn overlap_pulls_neighbors_together() {
    let mut options = deterministic_options();
    options.columns = 2;
    options.image_width = Some(100);
    options.overlap_percentage = 25;

    let mut ctx = context_with_images(3, vec![tile(100), tile(100)]);
    calculate_image_dimensions(&mut ctx, options.clone(), &mut None).unwrap();
    resize_and_border_images(&mut ctx, options.clone(), &mut None).unwrap();
    create_composites(&mut ctx, options, &mut None).unwrap();

    let mut positions: Vec<(i64, i64)> = ctx.composites.iter().map(|c| (c.x, c.y)).collect();
    positions.sort();
    // Second center is pulled 25px left, so the canvas shrinks to 175.
    assert_eq!(positions, vec![(0, 0), (75, 0)]);
    assert_eq!(ctx.state.canvas_size(), (Some(175), Some(100)));
}

#[test]
fn the_bounding_box_always_hugs_the_content() {
    let options = CollageOptions {
        columns: 3,
        image_width: Some(120),
        ..CollageOptions::default()
    };

    for seed in 0..5u64 {
        let mut ctx = context_with_images(seed, (0..7).map(|_| tile(120)).collect());
        calculate_image_dimensions(&mut ctx, options.clone(), &mut None).unwrap();
        resize_and_border_images(&mut ctx, options.clone(), &mut None).unwrap();
        rotate_images(&mut ctx, options.clone(), &mut None).unwrap();
        create_composites(&mut ctx, options.clone(), &mut None).unwrap();

        let canvas_w = ctx.state.canvas_size().0.unwrap() as i64;
        let canvas_h = ctx.state.canvas_size().1.unwrap() as i64;
        let min_x = ctx.composites.iter().map(|c| c.x).min().unwrap();
        let min_y = ctx.composites.iter().map(|c| c.y).min().unwrap();
        let max_x = ctx
            .composites
            .iter()
            .map(|c| c.x + i64::from(c.image.width()))
            .max()
            .unwrap();
        let max_y = ctx
            .composites
            .iter()
            .map(|c| c.y + i64::from(c.image.height()))
            .max()
            .unwrap();

        assert_eq!(min_x, 0, "seed {seed}");
        assert_eq!(min_y, 0, "seed {seed}");
        assert_eq!(max_x, canvas_w, "seed {seed}");
        assert_eq!(max_y, canvas_h, "seed {seed}");
    }
}

#[test]
fn width_jitter_couples_height_through_the_aspect_ratio() {
    let options = CollageOptions {
        image_width: Some(100),
        image_width_variance: 20,
        aspect_ratio: "2:1".parse().unwrap(),
        rotation_range: 0,
        overlap_percentage: 0,
        ..CollageOptions::default()
    };
    let mut ctx = context_with_images(9, vec![tile(100); 4]);
    calculate_image_dimensions(&mut ctx, options.clone(), &mut None).unwrap();
    resize_and_border_images(&mut ctx, options, &mut None).unwrap();

    for image in &ctx.images {
        let dw = i64::from(image.width()) - 100;
        // nominal height = floor(100 / 2) = 50; jitter halves along with it
        let expected_height = 50 + (dw as f64 / 2.0).floor() as i64;
        assert_eq!(i64::from(image.height()), expected_height);
        assert!((80..=120).contains(&i64::from(image.width())));
    }
}

#[test]
fn rotation_grows_every_image_bound() {
    let options = CollageOptions {
        image_width: Some(100),
        image_width_variance: 0,
        rotation_range: 45,
        ..CollageOptions::default()
    };
    let mut ctx = context_with_images(11, vec![tile(100); 6]);
    calculate_image_dimensions(&mut ctx, options.clone(), &mut None).unwrap();
    resize_and_border_images(&mut ctx, options.clone(), &mut None).unwrap();
    rotate_images(&mut ctx, options, &mut None).unwrap();
    for image in &ctx.images {
        assert!(image.width() >= 100);
        assert!(image.height() >= 100);
    }
}

#[test]
fn seeded_merges_are_reproducible() {
    let inputs: Vec<Vec<u8>> = (0..4)
        .map(|_| encode_image(&tile(80), OutputFormat::Png).unwrap())
        .collect();
    let options = CollageOptions {
        columns: 2,
        ..CollageOptions::default()
    };
    let first = collage_merge_with_rng(
        inputs.clone(),
        options.clone(),
        None,
        SmallRng::seed_from_u64(99),
    )
    .unwrap();
    let second =
        collage_merge_with_rng(inputs, options, None, SmallRng::seed_from_u64(99)).unwrap();
    assert_eq!(first, second);
}

#[test]
fn collage_merge_produces_a_decodable_canvas() {
    let inputs: Vec<Vec<u8>> = (0..4)
        .map(|_| encode_image(&tile(100), OutputFormat::Png).unwrap())
        .collect();
    let output = collage_merge(inputs, CollageOptions::default(), None).unwrap();
    let canvas = decode_image(&output).unwrap();
    assert!(canvas.width() > 0 && canvas.height() > 0);
}
