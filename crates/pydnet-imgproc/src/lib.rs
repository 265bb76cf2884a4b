#![deny(missing_docs)]
//! Raster operations used by the depth evaluation pipeline.

/// Bilinear interpolation kernel.
pub mod interpolation;

/// Min-max normalization of rasters.
pub mod normalize;

/// Resizing rasters to a new resolution.
pub mod resize;
