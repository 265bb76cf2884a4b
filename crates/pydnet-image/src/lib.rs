#![deny(missing_docs)]
//! Single channel raster types for depth evaluation.

/// Error types for the image module.
pub mod error;

/// Raster representation for depth and mask images.
pub mod image;

pub use crate::error::ImageError;
pub use crate::image::{DepthMap, Image, ImageSize, InverseDepthMap, ValidityMask};
