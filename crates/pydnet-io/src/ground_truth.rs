use std::path::{Path, PathBuf};

use pydnet_image::DepthMap;

use crate::{
    error::IoError,
    png::read_image_png_mono16,
    tiff::{is_tiff_float, read_image_tiff_mono16, read_image_tiff_mono32f},
};

/// Extensions tried, in order, when looking up a ground truth raster.
pub const GROUND_TRUTH_EXTENSIONS: [&str; 3] = ["tiff", "tif", "png"];

/// Read a ground truth depth map in metres.
///
/// Floating point TIFF files are taken as metres. Integer rasters (16-bit PNG
/// or TIFF) are divided by `integer_scale`, e.g. 256 for KITTI depth PNGs or
/// 1000 for millimetre depth.
pub fn read_ground_truth(
    file_path: impl AsRef<Path>,
    integer_scale: f32,
) -> Result<DepthMap, IoError> {
    let file_path = file_path.as_ref();
    if !file_path.exists() {
        return Err(IoError::FileDoesNotExist(file_path.to_path_buf()));
    }

    let extension = file_path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());

    match extension.as_deref() {
        Some("png") => {
            let raw = read_image_png_mono16(file_path)?;
            Ok(raw.map(|&v| v as f32 / integer_scale))
        }
        Some("tif") | Some("tiff") => {
            if is_tiff_float(file_path)? {
                read_image_tiff_mono32f(file_path)
            } else {
                let raw = read_image_tiff_mono16(file_path)?;
                Ok(raw.map(|&v| v as f32 / integer_scale))
            }
        }
        _ => Err(IoError::InvalidFileExtension(file_path.to_path_buf())),
    }
}

/// Look up the ground truth raster named `key` inside `dir`.
///
/// Returns the first existing file among [`GROUND_TRUTH_EXTENSIONS`].
pub fn find_ground_truth(dir: impl AsRef<Path>, key: &str) -> Option<PathBuf> {
    GROUND_TRUTH_EXTENSIONS
        .iter()
        .map(|ext| dir.as_ref().join(format!("{key}.{ext}")))
        .find(|path| path.exists())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{png::write_image_png_gray16, tiff::write_image_tiff_mono32f};
    use pydnet_image::Image;

    #[test]
    fn read_ground_truth_png_scaled() -> Result<(), IoError> {
        let tmp_dir = tempfile::tempdir()?;
        let file_path = tmp_dir.path().join("0000.png");
        write_image_png_gray16(&file_path, &Image::new([2, 1].into(), vec![0u16, 512])?)?;

        let depth = read_ground_truth(&file_path, 256.0)?;
        assert_eq!(depth.as_slice(), &[0.0, 2.0]);
        Ok(())
    }

    #[test]
    fn read_ground_truth_tiff_metres() -> Result<(), IoError> {
        let tmp_dir = tempfile::tempdir()?;
        let file_path = tmp_dir.path().join("0000.tiff");
        write_image_tiff_mono32f(&file_path, &Image::new([2, 1].into(), vec![1.25f32, 3.5])?)?;

        let depth = read_ground_truth(&file_path, 1000.0)?;
        assert_eq!(depth.as_slice(), &[1.25, 3.5]);
        Ok(())
    }

    #[test]
    fn find_ground_truth_prefers_tiff() -> Result<(), IoError> {
        let tmp_dir = tempfile::tempdir()?;
        std::fs::write(tmp_dir.path().join("a.png"), b"")?;
        std::fs::write(tmp_dir.path().join("a.tiff"), b"")?;

        assert_eq!(
            find_ground_truth(tmp_dir.path(), "a"),
            Some(tmp_dir.path().join("a.tiff"))
        );
        assert_eq!(find_ground_truth(tmp_dir.path(), "b"), None);
        Ok(())
    }
}
