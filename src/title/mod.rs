//! Animated title clips: glyphs cut from the rendered title fly in on damped rotating paths.

/// Title clip rendering.
pub mod animator;
/// Connected-component glyph extraction.
pub mod glyphs;
/// Damped rotating glyph motion.
pub mod trajectory;
