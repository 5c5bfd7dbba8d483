use super::*;
use crate::foundation::core::Rgb8;
use crate::render::raster::Sprite;
use crate::title::trajectory::MotionParams;

fn small_cfg() -> TitleConfig {
    TitleConfig {
        canvas: Canvas {
            width: 64,
            height: 32,
        },
        duration_secs: 1.0,
        ..TitleConfig::default()
    }
}

fn synthetic_clip(fps: u32, len_frames: u64) -> TitleClip {
    let sprite = Sprite {
        width: 4,
        height: 4,
        rgba8_premul: [255u8, 255, 255, 255].repeat(16),
    };
    let glyphs = vec![
        Glyph {
            origin: Point::new(10.0, 10.0),
            sprite: sprite.clone(),
        },
        Glyph {
            origin: Point::new(30.0, 10.0),
            sprite,
        },
    ];
    let params = MotionParams {
        amplitude: 20.0,
        ..MotionParams::default()
    };
    let trajectories = glyphs
        .iter()
        .enumerate()
        .map(|(index, g)| Trajectory {
            base: g.origin,
            index,
            count: 2,
            params,
        })
        .collect();
    TitleClip {
        canvas: Canvas {
            width: 64,
            height: 32,
        },
        fps: Fps::integer(fps).unwrap(),
        background: Rgb8::BLACK.to_rgba(),
        len_frames,
        glyphs,
        trajectories,
        cached: None,
    }
}

fn lit_pixels(frame: &FrameRGBA) -> usize {
    frame.data.chunks_exact(4).filter(|px| px[0] != 0).count()
}

#[test]
fn clip_length_follows_duration_and_fps() {
    let mut animator = TitleAnimator::new(&small_cfg(), Fps::integer(24).unwrap());
    let clip = animator.animate("").unwrap();
    assert_eq!(clip.len_frames(), 24);
    assert_eq!(clip.glyph_count(), 0);
    assert!((clip.duration_secs() - 1.0).abs() < 1e-9);
}

#[test]
fn empty_title_renders_plain_background() {
    let cfg = TitleConfig {
        background_rgb: Rgb8::new(1, 2, 3),
        ..small_cfg()
    };
    let mut clip = TitleAnimator::new(&cfg, Fps::integer(24).unwrap())
        .animate("")
        .unwrap();
    let frame = clip.frame(FrameIndex(3)).unwrap();
    assert!(frame.data.chunks_exact(4).all(|px| px == [1, 2, 3, 255]));
}

#[test]
fn glyphs_rest_at_their_origin_by_clip_end() {
    let clip = synthetic_clip(24, 120);
    let end = clip.positions_at(FrameIndex(119));
    assert!((end[0] - Point::new(10.0, 10.0)).hypot() < 0.01);
    assert!((end[1] - Point::new(30.0, 10.0)).hypot() < 0.01);

    let start = clip.positions_at(FrameIndex(0));
    assert!((start[0] - Point::new(10.0, 10.0)).hypot() > 60.0);
}

#[test]
fn settled_frame_shows_every_glyph() {
    let mut clip = synthetic_clip(24, 120);
    let last = clip.frame(FrameIndex(119)).unwrap();
    assert_eq!(lit_pixels(&last), 32);
}

#[test]
fn frames_past_the_end_hold_the_last_frame() {
    let mut clip = synthetic_clip(24, 30);
    let last = clip.frame(FrameIndex(29)).unwrap();
    let past = clip.frame(FrameIndex(500)).unwrap();
    assert_eq!(last.data, past.data);
}

#[test]
fn chunked_frames_match_direct_rendering() {
    let mut clip = synthetic_clip(24, 60);
    for i in [0u64, 1, 23, 24, 25, 59] {
        let via_cache = clip.frame(FrameIndex(i)).unwrap();
        let direct = clip.render_frame(FrameIndex(i));
        assert_eq!(via_cache.data, direct.data, "frame {i}");
    }
}
