use super::*;

fn seg(name: &str, secs: f64, width: u32, height: u32) -> VideoSegment {
    VideoSegment {
        path: PathBuf::from(name),
        duration_secs: secs,
        frames: (secs * 24.0).round() as u64,
        canvas: Canvas { width, height },
    }
}

#[test]
fn single_segment_has_no_pause() {
    let plan = plan_sequence(&[seg("title.mp4", 2.0, 1920, 1080)]);
    assert_eq!(plan, vec![SequenceEntry::Segment(0)]);
    assert_eq!(sequence_duration(&[seg("t", 2.0, 2, 2)], 0.1), 2.0);
}

#[test]
fn pauses_sit_between_segments_in_order() {
    let segments = [
        seg("title.mp4", 3.0, 1920, 1080),
        seg("slide1.mp4", 4.5, 1280, 720),
        seg("slide2.mp4", 2.5, 1920, 1080),
    ];
    let plan = plan_sequence(&segments);
    assert_eq!(
        plan,
        vec![
            SequenceEntry::Segment(0),
            SequenceEntry::Pause {
                width: 1920,
                height: 1080
            },
            SequenceEntry::Segment(1),
            SequenceEntry::Pause {
                width: 1280,
                height: 720
            },
            SequenceEntry::Segment(2),
        ]
    );
    let pauses = plan
        .iter()
        .filter(|e| matches!(e, SequenceEntry::Pause { .. }))
        .count();
    assert_eq!(pauses, 2);
    assert!((sequence_duration(&segments, 0.1) - 10.2).abs() < 1e-9);
}

#[test]
fn empty_plan_is_empty() {
    assert!(plan_sequence(&[]).is_empty());
    assert_eq!(sequence_duration(&[], 0.1), 0.0);
}

#[test]
fn filter_graph_joins_every_input_in_order() {
    let inputs = [
        InputRef { video: 0, audio: 0 },
        InputRef { video: 1, audio: 2 },
        InputRef { video: 3, audio: 3 },
    ];
    let graph = concat_filter(
        &inputs,
        Canvas {
            width: 1920,
            height: 1080,
        },
        Fps::integer(24).unwrap(),
        Rgb8::new(73, 109, 137),
    );
    assert!(graph.starts_with("[0:v]pad=1920:1080:(ow-iw)/2:(oh-ih)/2:color=0x496d89"));
    assert!(graph.contains("[2:a]aresample=48000"));
    assert!(graph.contains("fps=24/1"));
    assert!(graph.ends_with("[v0][a0][v1][a1][v2][a2]concat=n=3:v=1:a=1[outv][outa]"));
}

#[test]
fn nothing_to_concatenate_is_a_validation_error() {
    let pause = PauseSpec {
        duration_secs: 0.1,
        rgb: Rgb8::BLACK,
    };
    let err = concatenate_with_ffmpeg(&[], &pause, Fps::integer(24).unwrap(), Path::new("x.mp4"))
        .unwrap_err();
    assert!(matches!(err, SlidecastError::Validation(_)));
}
