use super::*;

fn write_wav(path: &Path, sample_rate: u32, channels: u16, frames: u32) {
    let spec = hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut w = hound::WavWriter::create(path, spec).unwrap();
    for _ in 0..frames * u32::from(channels) {
        w.write_sample(0i16).unwrap();
    }
    w.finalize().unwrap();
}

#[test]
fn wav_duration_comes_from_the_header() {
    let dir = tempfile::tempdir().unwrap();
    let p = dir.path().join("narration.wav");
    write_wav(&p, 22_050, 1, 22_050 * 3 / 2);
    let a = probe_audio(&p).unwrap();
    assert!((a.duration_secs - 1.5).abs() < 1e-9);
    assert_eq!(a.sample_rate, 22_050);
    assert_eq!(a.channels, 1);
}

#[test]
fn stereo_wav_counts_frames_not_samples() {
    let dir = tempfile::tempdir().unwrap();
    let p = dir.path().join("stereo.WAV");
    write_wav(&p, 48_000, 2, 24_000);
    let a = AudioAsset::open(&p).unwrap();
    assert!((a.duration_secs - 0.5).abs() < 1e-9);
}

#[test]
fn samples_cover_whole_frames() {
    let fps = Fps::integer(24).unwrap();
    assert_eq!(samples_for_frames(24, fps, 48_000), 48_000);
    assert_eq!(samples_for_frames(1, fps, 48_000), 2_000);
    let ntsc = Fps::new(30_000, 1_001).unwrap();
    assert_eq!(samples_for_frames(30_000, ntsc, 48_000), 48_048_000);
}

#[test]
fn fit_pads_and_truncates() {
    let mut pcm = AudioPcm {
        sample_rate: 48_000,
        channels: 2,
        interleaved_f32: vec![0.5; 10],
    };
    pcm.fit_to_frames(8);
    assert_eq!(pcm.interleaved_f32.len(), 16);
    assert_eq!(pcm.interleaved_f32[15], 0.0);
    pcm.fit_to_frames(2);
    assert_eq!(pcm.frames(), 2);
    assert_eq!(pcm.interleaved_f32, vec![0.5; 4]);
}

#[test]
fn f32le_is_little_endian() {
    let dir = tempfile::tempdir().unwrap();
    let p = dir.path().join("a.f32le");
    write_f32le(&[1.0, -0.5], &p).unwrap();
    let bytes = std::fs::read(&p).unwrap();
    assert_eq!(&bytes[..4], &1.0f32.to_le_bytes());
    assert_eq!(&bytes[4..], &(-0.5f32).to_le_bytes());
}
