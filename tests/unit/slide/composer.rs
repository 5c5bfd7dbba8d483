use super::*;
use crate::foundation::core::{Canvas, Rgb8};

fn small_cfg() -> SlideConfig {
    SlideConfig {
        canvas: Canvas {
            width: 200,
            height: 160,
        },
        text_origin: [10.0, 10.0],
        max_text_width: 180.0,
        line_height: 20.0,
        font_size: 14.0,
        illustration_size: 40,
        illustration_top: 100,
        ..SlideConfig::default()
    }
}

fn pixel(frame: &FrameRGBA, x: u32, y: u32) -> [u8; 4] {
    let i = ((y * frame.width + x) * 4) as usize;
    [
        frame.data[i],
        frame.data[i + 1],
        frame.data[i + 2],
        frame.data[i + 3],
    ]
}

#[test]
fn background_fills_the_canvas() {
    let mut c = SlideComposer::new(&small_cfg());
    let (frame, status) = c.compose_frame("", None).unwrap();
    assert_eq!(status, IllustrationStatus::Missing);
    assert_eq!((frame.width, frame.height), (200, 160));
    assert_eq!(pixel(&frame, 199, 159), [73, 109, 137, 255]);
}

#[test]
fn illustration_is_centered_at_fixed_top() {
    let dir = tempfile::tempdir().unwrap();
    let img_path = dir.path().join("leaf.png");
    image::RgbaImage::from_pixel(13, 7, image::Rgba([0, 200, 0, 255]))
        .save(&img_path)
        .unwrap();

    let mut c = SlideComposer::new(&small_cfg());
    let (frame, status) = c.compose_frame("", Some(&img_path)).unwrap();
    assert_eq!(status, IllustrationStatus::Placed);
    // Square of side 40 centered horizontally: x in 80..120, y in 100..140.
    let inside = pixel(&frame, 100, 120);
    assert!(inside[0] <= 2 && inside[1] >= 198 && inside[2] <= 2, "{inside:?}");
    assert_eq!(inside[3], 255);
    assert_eq!(pixel(&frame, 70, 120), [73, 109, 137, 255]);
    assert_eq!(pixel(&frame, 100, 90), [73, 109, 137, 255]);
}

#[test]
fn broken_illustration_is_not_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let bad = dir.path().join("bad.png");
    std::fs::write(&bad, b"not an image").unwrap();

    let mut c = SlideComposer::new(&small_cfg());
    let out = dir.path().join("slide.png");
    let slide = c.compose("Chlorophyll absorbs red and blue light", Some(&bad), &out).unwrap();
    assert!(matches!(slide.illustration, IllustrationStatus::Failed(_)));
    assert!(out.exists());

    let missing = dir.path().join("nope.png");
    let (_, status) = c.compose_frame("text", Some(&missing)).unwrap();
    assert!(matches!(status, IllustrationStatus::Failed(_)));
}

#[test]
fn written_png_round_trips_size_and_color() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("nested").join("slide.png");
    let cfg = SlideConfig {
        background_rgb: Rgb8::new(5, 6, 7),
        ..small_cfg()
    };
    let slide = SlideComposer::new(&cfg).compose("", None, &out).unwrap();
    assert_eq!((slide.width, slide.height), (200, 160));
    let back = image::open(&out).unwrap().to_rgba8();
    assert_eq!(back.dimensions(), (200, 160));
    assert_eq!(back.get_pixel(0, 0).0, [5, 6, 7, 255]);
}

#[test]
fn unpremultiply_restores_straight_color() {
    let mut px = vec![64u8, 0, 0, 128, 10, 20, 30, 255, 0, 0, 0, 0];
    unpremultiply_rgba8_in_place(&mut px);
    assert_eq!(px, vec![128, 0, 0, 128, 10, 20, 30, 255, 0, 0, 0, 0]);
}
