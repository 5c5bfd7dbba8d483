use super::*;
use crate::encode::sink::CaptureSink;

struct Counter {
    fps: Fps,
    len: u64,
    renders: u64,
}

impl FrameSource for Counter {
    fn canvas(&self) -> Canvas {
        Canvas {
            width: 2,
            height: 2,
        }
    }

    fn fps(&self) -> Fps {
        self.fps
    }

    fn len_frames(&self) -> u64 {
        self.len
    }

    fn frame(&mut self, idx: FrameIndex) -> SlidecastResult<FrameRGBA> {
        self.renders += 1;
        let mut f = FrameRGBA::transparent(self.canvas());
        f.data[0] = idx.0 as u8;
        Ok(f)
    }
}

#[test]
fn frame_count_rounds_and_never_hits_zero() {
    let fps = Fps::integer(24).unwrap();
    assert_eq!(frames_for_audio(2.0, fps), 48);
    assert_eq!(frames_for_audio(2.01, fps), 48);
    assert_eq!(frames_for_audio(2.03, fps), 49);
    assert_eq!(frames_for_audio(0.0, fps), 1);
}

#[test]
fn same_rate_maps_one_to_one_then_holds() {
    let fps = Fps::integer(24).unwrap();
    let src = Counter {
        fps,
        len: 120,
        renders: 0,
    };
    for i in 0..120 {
        assert_eq!(source_frame_for(i, fps, &src), FrameIndex(i));
    }
    assert_eq!(source_frame_for(120, fps, &src), FrameIndex(119));
    assert_eq!(source_frame_for(10_000, fps, &src), FrameIndex(119));
}

#[test]
fn different_rates_map_by_time() {
    let out = Fps::integer(24).unwrap();
    let src = Counter {
        fps: Fps::integer(12).unwrap(),
        len: 10,
        renders: 0,
    };
    assert_eq!(source_frame_for(0, out, &src), FrameIndex(0));
    assert_eq!(source_frame_for(1, out, &src), FrameIndex(0));
    assert_eq!(source_frame_for(2, out, &src), FrameIndex(1));
    assert_eq!(source_frame_for(19, out, &src), FrameIndex(9));
}

#[test]
fn invalid_narration_duration_is_rejected_without_output() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("seg.mp4");
    let audio = AudioAsset {
        path: dir.path().join("a.wav"),
        duration_secs: f64::NAN,
        sample_rate: 22_050,
        channels: 1,
    };
    let mut src = Counter {
        fps: Fps::integer(24).unwrap(),
        len: 1,
        renders: 0,
    };
    let err = mux_source(&mut src, &audio, Fps::integer(24).unwrap(), &out).unwrap_err();
    assert!(matches!(err, SlidecastError::Encoding(_)), "{err}");
    assert!(!out.exists());
}

#[test]
fn undecodable_narration_leaves_no_output() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("seg.mp4");
    let audio = AudioAsset {
        path: dir.path().join("missing.wav"),
        duration_secs: 1.0,
        sample_rate: 22_050,
        channels: 1,
    };
    let mut src = Counter {
        fps: Fps::integer(24).unwrap(),
        len: 1,
        renders: 0,
    };
    assert!(mux_source(&mut src, &audio, Fps::integer(24).unwrap(), &out).is_err());
    assert!(!out.exists());
}

#[test]
fn streamed_clip_holds_its_last_frame_and_renders_each_once() {
    let fps = Fps::integer(24).unwrap();
    let mut src = Counter {
        fps: Fps::integer(12).unwrap(),
        len: 3,
        renders: 0,
    };
    let mut sink = CaptureSink::new();
    let cfg = SinkConfig::video_only(src.canvas(), fps);
    stream_frames(&mut src, 10, cfg, &mut sink).unwrap();

    assert!(sink.is_finished());
    let shown: Vec<u8> = sink.frames().iter().map(|f| f.data[0]).collect();
    assert_eq!(shown, vec![0, 0, 1, 1, 2, 2, 2, 2, 2, 2]);
    assert_eq!(src.renders, 3);
}

#[test]
fn streamed_clip_is_truncated_to_the_requested_length() {
    let fps = Fps::integer(24).unwrap();
    let mut src = Counter {
        fps,
        len: 120,
        renders: 0,
    };
    let mut sink = CaptureSink::new();
    let cfg = SinkConfig::video_only(src.canvas(), fps);
    stream_frames(&mut src, 5, cfg, &mut sink).unwrap();
    assert_eq!(sink.frames().len(), 5);
    assert_eq!(sink.frames()[4].data[0], 4);
}
