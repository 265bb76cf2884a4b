use std::path::Path;

use pydnet_image::{Image, InverseDepthMap};
use pydnet_imgproc::normalize::normalize_min_max;

use crate::{
    error::IoError,
    png::{read_image_png_mono16, write_image_png_gray16},
};

/// Fixed point scale of the stored inverse depth: `stored = value * 256`.
pub const PREDICTION_PNG_SCALE: f32 = 256.0;

/// Upper end of the normalized inverse depth range before fixed point encoding.
pub const PREDICTION_NORM_MAX: f32 = 255.0;

/// Read a predicted inverse depth map stored as a 16-bit PNG.
///
/// # Arguments
///
/// * `file_path` - The path to the PNG file.
/// * `scale` - Divisor turning the stored integers into inverse depth,
///   [`PREDICTION_PNG_SCALE`] for files written by [`write_prediction_png`].
pub fn read_prediction_png(
    file_path: impl AsRef<Path>,
    scale: f32,
) -> Result<InverseDepthMap, IoError> {
    let raw = read_image_png_mono16(file_path)?;
    Ok(raw.map(|&v| v as f32 / scale))
}

/// Min-max normalize a raw network output to `[0, PREDICTION_NORM_MAX]`.
pub fn normalize_prediction(idepth: &InverseDepthMap) -> Result<Image<f32>, IoError> {
    let mut normalized = Image::from_size_val(idepth.size(), 0.0f32)?;
    normalize_min_max(idepth, &mut normalized, 0.0, PREDICTION_NORM_MAX)?;
    Ok(normalized)
}

/// Turn a normalized prediction into 16-bit fixed point, truncating.
///
/// Non-finite values are stored as zero.
pub fn quantize_prediction(normalized: &Image<f32>) -> Image<u16> {
    normalized.map(|&v| {
        let fixed = v * PREDICTION_PNG_SCALE;
        if fixed.is_finite() {
            fixed.clamp(0.0, u16::MAX as f32) as u16
        } else {
            0
        }
    })
}

/// Encode a raw network output into the 16-bit prediction format.
///
/// The inverse depth is min-max normalized to `[0, 255]`, multiplied by 256
/// and truncated to integers.
pub fn encode_prediction(idepth: &InverseDepthMap) -> Result<Image<u16>, IoError> {
    Ok(quantize_prediction(&normalize_prediction(idepth)?))
}

/// Encode `idepth` with [`encode_prediction`] and write it as a 16-bit PNG.
pub fn write_prediction_png(
    file_path: impl AsRef<Path>,
    idepth: &InverseDepthMap,
) -> Result<(), IoError> {
    let encoded = encode_prediction(idepth)?;
    write_image_png_gray16(file_path, &encoded)
}
