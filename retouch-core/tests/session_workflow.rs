use image::{DynamicImage, Rgb, RgbImage, RgbaImage};
use retouch_core::{
    Region, RegionDetector, RenderOutcome, SessionError, SessionPhase, SessionState, render,
};
use retouch_utils::{
    ParamKey, ParameterSet, QualityLabel, analyze_quality, color::luma, encode_image,
    enhance::channel_means, image_utils::to_working, output::ImageFormatHint,
};

fn portrait(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        let inside = x > width / 4 && x < 3 * width / 4 && y > height / 4 && y < 3 * height / 4;
        if inside {
            let v = ((x * 3 + y * 5) % 20) as u8;
            Rgb([215 + v, 165 + v, 135 + v])
        } else {
            Rgb([40, 70, 190])
        }
    })
}

fn textured_rgba(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| {
        let v = ((x * 29 + y * 53) % 256) as u8;
        image::Rgba([v, 255 - v, v / 2, 255])
    })
}

fn loaded_session(image: RgbImage) -> SessionState {
    let mut session = SessionState::default();
    assert_eq!(
        session.load_image(DynamicImage::ImageRgb8(image)),
        RenderOutcome::Rendered
    );
    session
}

#[test]
fn identity_render_round_trips_the_source() {
    let source = textured_rgba(48, 32);
    let out = render(&source, &ParameterSet::default(), &[], false).expect("rendered");
    assert_eq!(out, source);
}

#[test]
fn brightness_and_contrast_always_saturate() {
    let source = textured_rgba(32, 32);
    for brightness in [-100, -50, 0, 50, 100] {
        for contrast in [-100, -50, 0, 50, 100] {
            let params = ParameterSet {
                brightness,
                contrast,
                ..ParameterSet::default()
            };
            let out = render(&source, &params, &[], false).expect("rendered");
            let lut_ok = source.pixels().zip(out.pixels()).all(|(src, dst)| {
                let expected = |v: u8| {
                    ((1.0 + contrast as f32 / 100.0) * v as f32 + brightness as f32)
                        .round()
                        .clamp(0.0, 255.0) as u8
                };
                dst[0] == expected(src[0]) && dst[1] == expected(src[1]) && dst[2] == expected(src[2])
            });
            assert!(lut_ok, "brightness {brightness} contrast {contrast}");
        }
    }
}

#[test]
fn increasing_brightness_never_darkens() {
    let source = textured_rgba(32, 32);
    let mean = |img: &RgbaImage| {
        img.pixels()
            .map(|p| luma(p[0], p[1], p[2]) as f64)
            .sum::<f64>()
            / (img.width() * img.height()) as f64
    };
    let mut previous = f64::MIN;
    for brightness in -100..=100 {
        let params = ParameterSet {
            brightness,
            contrast: 30,
            white_balance: 20,
            ..ParameterSet::default()
        };
        let current = mean(&render(&source, &params, &[], false).expect("rendered"));
        assert!(current >= previous, "brightness {brightness}");
        previous = current;
    }
}

#[test]
fn detector_never_returns_nothing() {
    let detector = RegionDetector::default();
    let images = [
        RgbImage::from_pixel(50, 50, Rgb([0, 0, 0])),
        RgbImage::from_pixel(8, 8, Rgb([255, 255, 255])),
        portrait(200, 160),
        to_working(&textured_rgba(64, 64)),
    ];
    for image in images {
        let regions = detector.detect(&image);
        assert!(!regions.is_empty());
        for Region {
            x,
            y,
            width,
            height,
        } in regions
        {
            assert!(width > 0 && height > 0);
            assert!(x + width <= image.width());
            assert!(y + height <= image.height());
        }
    }
}

#[test]
fn toggling_ai_analyses_at_most_once_per_load() {
    let mut session = loaded_session(portrait(200, 160));
    session.toggle_ai();
    let proposed = *session.params();
    let regions = session.regions().to_vec();
    assert!(session.auto_enhance_applied());
    assert_eq!(proposed.skin, 25);
    assert_eq!(proposed.smooth, 15);

    session.set_param(ParamKey::Skin, 60);
    session.toggle_ai();
    assert_eq!(session.phase(), SessionPhase::AiOff);
    assert_eq!(session.params().skin, 60);

    session.toggle_ai();
    assert_eq!(session.phase(), SessionPhase::AiOn { analyzed: true });
    assert_eq!(session.params().skin, 60, "second toggle must not re-propose");
    assert_eq!(session.regions(), regions.as_slice());

    session.load_image(DynamicImage::ImageRgb8(portrait(200, 160)));
    assert!(!session.ai_enabled());
    session.toggle_ai();
    assert_eq!(session.params().skin, 25, "a reload analyses again");
}

#[test]
fn quality_thresholds_for_flat_and_checkerboard() {
    let flat = analyze_quality(&RgbImage::from_pixel(100, 100, Rgb([128, 128, 128])));
    assert_eq!(flat.contrast, 0.0);
    assert_eq!(flat.sharpness, 0.0);
    assert_eq!(flat.label, QualityLabel::NeedsImprovement);

    let checker = RgbImage::from_fn(100, 100, |x, y| {
        if (x + y) % 2 == 0 {
            Rgb([0, 0, 0])
        } else {
            Rgb([255, 255, 255])
        }
    });
    let report = analyze_quality(&checker);
    assert!(report.sharpness > 100.0);
    assert_eq!(report.label, QualityLabel::Good);
}

#[test]
fn passport_preset_then_reset() {
    let mut session = loaded_session(portrait(120, 90));
    assert_eq!(
        session.apply_preset("Passport").expect("preset"),
        RenderOutcome::Rendered
    );
    assert_eq!(
        *session.params(),
        ParameterSet {
            brightness: 10,
            contrast: 15,
            clarity: 25,
            smooth: 8,
            skin: 35,
            white_balance: 6,
        }
    );
    session.reset();
    assert!(session.params().is_identity());
}

#[test]
fn white_balance_moves_channel_means_toward_average() {
    let mut session = loaded_session(RgbImage::from_pixel(40, 40, Rgb([140, 120, 100])));
    let before = channel_means(&to_working(session.output().expect("output")));
    session.set_param(ParamKey::WhiteBalance, 50);
    let after = channel_means(&to_working(session.output().expect("output")));
    for (b, a) in before.iter().zip(after) {
        assert!((a - 120.0).abs() <= (b - 120.0).abs());
    }
    assert!((after[0] - 120.0).abs() < (before[0] - 120.0).abs());
    assert!((after[2] - 120.0).abs() < (before[2] - 120.0).abs());
}

#[test]
fn encoded_bytes_load_and_download_as_jpeg() {
    let png = encode_image(&textured_rgba(30, 20), ImageFormatHint::Png, 95).expect("encode png");
    let mut session = SessionState::default();
    assert_eq!(session.load_bytes(&png).expect("load"), RenderOutcome::Rendered);
    session.set_param(ParamKey::Clarity, 40);

    let jpeg = session.download().expect("download");
    assert_eq!(&jpeg[..2], &[0xFF, 0xD8]);
    let decoded = image::load_from_memory(&jpeg).expect("decode download");
    assert_eq!((decoded.width(), decoded.height()), (30, 20));
    assert_eq!(session.download_name(), "retouched.jpg");

    assert!(matches!(
        session.load_bytes(&[]),
        Err(SessionError::Decode(_))
    ));
    assert_eq!(session.phase(), SessionPhase::NoImage);
}
