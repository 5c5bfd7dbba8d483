//! Text measurement, wrapping and shaping.

/// Parley-backed shaping and measurement.
pub mod engine;
/// Pure line breaking.
pub mod layout;
