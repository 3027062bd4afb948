//! Effect pipeline benchmarks
//!
//! Measures `Screenshot::get_image` on 4K captures, since every preview,
//! save and copy re-applies the effect stack to the raw image.

use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use gscreenshot_core::{
    capture::ImageBuffer,
    model::{ImageFormat, Region},
    screenshot::{CursorGlyph, Screenshot, ScreenshotEffect},
    util::encode::encode_image,
};

fn create_4k_screenshot() -> Screenshot {
    Screenshot::new(ImageBuffer::from_test_pattern(3840, 2160))
}

fn bench_no_effects(c: &mut Criterion) {
    let shot = create_4k_screenshot();

    c.bench_function("get_image_plain_4k", |b| {
        b.iter(|| black_box(&shot).get_image());
    });
}

fn bench_crop(c: &mut Criterion) {
    let mut shot = create_4k_screenshot();
    shot.add_effect(ScreenshotEffect::crop(Region::from_xywh(640, 360, 1920, 1080)));

    c.bench_function("get_image_crop_4k", |b| {
        b.iter(|| black_box(&shot).get_image());
    });
}

fn bench_stamp_then_crop(c: &mut Criterion) {
    let mut shot = create_4k_screenshot();
    shot.add_effect(ScreenshotEffect::stamp(CursorGlyph::Default, (1200, 800)));
    shot.add_effect(ScreenshotEffect::crop(Region::from_xywh(640, 360, 1920, 1080)));

    c.bench_function("get_image_stamp_crop_4k", |b| {
        b.iter(|| black_box(&shot).get_image());
    });
}

fn bench_preview(c: &mut Criterion) {
    let shot = create_4k_screenshot();

    c.bench_function("get_preview_bordered_4k", |b| {
        b.iter(|| black_box(&shot).get_preview(480, 270, true));
    });
}

fn bench_png_save_path(c: &mut Criterion) {
    let mut shot = create_4k_screenshot();
    shot.add_effect(ScreenshotEffect::crop(Region::from_xywh(0, 0, 1920, 1080)));

    c.bench_function("get_image_and_encode_png_1080p", |b| {
        b.iter(|| encode_image(&black_box(&shot).get_image(), ImageFormat::Png).unwrap());
    });
}

criterion_group!(
    benches,
    bench_no_effects,
    bench_crop,
    bench_stamp_then_crop,
    bench_preview,
    bench_png_save_path
);
criterion_main!(benches);
