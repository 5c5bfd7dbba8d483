//! Audio/video plumbing: probing, muxing narration onto visuals and sequencing segments.

/// Narration muxed under a still or a clip.
pub mod mux;
/// Audio and video probing, PCM decoding.
pub mod probe;
/// Final assembly with pause clips.
pub mod sequence;
