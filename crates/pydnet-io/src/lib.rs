#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Error types for I/O operations.
pub mod error;

/// Ground truth depth rasters.
pub mod ground_truth;

/// Sample manifests listing the evaluation split.
pub mod manifest;

/// PNG image encoding and decoding.
///
/// Read and write 16-bit single channel PNG images.
pub mod png;

/// Predicted inverse depth codec.
pub mod prediction;

/// TIFF image encoding and decoding.
///
/// Read and write single channel TIFF images with 16-bit or float samples.
pub mod tiff;

/// Internal utility functions for image bit depth conversion.
mod conv_utils;

pub use crate::error::IoError;
