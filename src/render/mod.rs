//! CPU rasterization and frame plumbing shared by the title and slide renderers.

/// Frames and frame sources.
pub mod frame;
/// vello_cpu drawing helpers.
pub mod raster;
