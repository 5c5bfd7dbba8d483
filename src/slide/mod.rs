//! Slide records and still-image slide composition.

/// Slide rasterization.
pub mod composer;
/// Slide records and input validation.
pub mod model;
