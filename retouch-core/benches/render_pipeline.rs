use criterion::{Criterion, criterion_group, criterion_main};
use image::RgbaImage;
use retouch_core::{Region, RegionDetector, preset_by_name, render};
use retouch_utils::{ParameterSet, image_utils::to_working};
use std::hint::black_box;

fn build_source_image() -> RgbaImage {
    let mut img = RgbaImage::from_pixel(1024, 768, image::Rgba([64, 64, 64, 255]));
    // Skin-toned block with texture so every stage has work to do.
    for y in 200..560 {
        for x in 360..680 {
            let val = ((x + y) % 40) as u8;
            img.put_pixel(x, y, image::Rgba([200 + val / 2, 160 + val / 2, 130 + val, 255]));
        }
    }
    img
}

fn render_benchmark(c: &mut Criterion) {
    let image = build_source_image();
    let passport = preset_by_name("passport").map(|p| p.params).unwrap_or_default();
    let regions = [Region::new(360, 200, 320, 360)];

    c.bench_function("render_passport_preset", |b| {
        b.iter(|| {
            let out = render(black_box(&image), &passport, &regions, true);
            black_box(out);
        });
    });

    c.bench_function("render_identity", |b| {
        b.iter(|| {
            let out = render(black_box(&image), &ParameterSet::default(), &[], false);
            black_box(out);
        });
    });
}

fn detect_benchmark(c: &mut Criterion) {
    let working = to_working(&build_source_image());
    let detector = RegionDetector::default();

    c.bench_function("detect_regions", |b| {
        b.iter(|| black_box(detector.detect(black_box(&working))));
    });
}

criterion_group!(benches, render_benchmark, detect_benchmark);
criterion_main!(benches);
