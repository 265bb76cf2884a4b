use std::{fs, path::Path};

use pydnet_image::{Image, ImageSize};
use tiff::{
    decoder::DecodingResult,
    encoder::{colortype, TiffEncoder},
};

use crate::error::IoError;

/// Read a TIFF image and return it as a single precision floating point image.
///
/// Depth rasters exported from HDF5 or MAT containers are stored this way,
/// with values in metres.
///
/// # Arguments
///
/// * `file_path` - The path to the TIFF image.
pub fn read_image_tiff_mono32f(file_path: impl AsRef<Path>) -> Result<Image<f32>, IoError> {
    let file_path = file_path.as_ref();
    let (result, size) = read_image_tiff_impl(file_path)?;

    match result {
        DecodingResult::F32(data) => Ok(Image::new(size.into(), data)?),
        _ => Err(IoError::UnsupportedPixelLayout {
            path: file_path.to_path_buf(),
            expected: "32-bit float single channel tiff",
        }),
    }
}

/// Read a TIFF image and return it as a grayscale 16-bit image.
///
/// # Arguments
///
/// * `file_path` - The path to the TIFF image.
pub fn read_image_tiff_mono16(file_path: impl AsRef<Path>) -> Result<Image<u16>, IoError> {
    let file_path = file_path.as_ref();
    let (result, size) = read_image_tiff_impl(file_path)?;

    match result {
        DecodingResult::U16(data) => Ok(Image::new(size.into(), data)?),
        _ => Err(IoError::UnsupportedPixelLayout {
            path: file_path.to_path_buf(),
            expected: "16-bit single channel tiff",
        }),
    }
}

/// Returns true when the decoded TIFF stores floating point samples.
pub fn is_tiff_float(file_path: impl AsRef<Path>) -> Result<bool, IoError> {
    let file = fs::File::open(file_path.as_ref())?;
    let mut decoder = tiff::decoder::Decoder::new(file)?;
    Ok(matches!(decoder.colortype()?, tiff::ColorType::Gray(32)))
}

/// Write a TIFF image with a single precision floating point channel.
///
/// # Arguments
///
/// * `file_path` - The path to the TIFF image.
/// * `image` - The image to write.
pub fn write_image_tiff_mono32f(
    file_path: impl AsRef<Path>,
    image: &Image<f32>,
) -> Result<(), IoError> {
    write_image_tiff_impl::<colortype::Gray32Float, f32>(file_path, image.as_slice(), image.size())
}

/// Write a TIFF image with a mono16 color type.
///
/// # Arguments
///
/// * `file_path` - The path to the TIFF image.
/// * `image` - The image to write.
pub fn write_image_tiff_mono16(
    file_path: impl AsRef<Path>,
    image: &Image<u16>,
) -> Result<(), IoError> {
    write_image_tiff_impl::<colortype::Gray16, u16>(file_path, image.as_slice(), image.size())
}

fn read_image_tiff_impl(file_path: &Path) -> Result<(DecodingResult, [usize; 2]), IoError> {
    if !file_path.exists() {
        return Err(IoError::FileDoesNotExist(file_path.to_path_buf()));
    }

    if file_path.extension().map_or(true, |ext| {
        !ext.eq_ignore_ascii_case("tiff") && !ext.eq_ignore_ascii_case("tif")
    }) {
        return Err(IoError::InvalidFileExtension(file_path.to_path_buf()));
    }

    let tiff_data = fs::File::open(file_path)?;
    let mut decoder = tiff::decoder::Decoder::new(tiff_data)?;

    if !matches!(decoder.colortype()?, tiff::ColorType::Gray(_)) {
        return Err(IoError::UnsupportedPixelLayout {
            path: file_path.to_path_buf(),
            expected: "single channel tiff",
        });
    }

    let result = decoder.read_image()?;
    let (width, height) = decoder.dimensions()?;

    Ok((result, [width as usize, height as usize]))
}

fn write_image_tiff_impl<C, T>(
    file_path: impl AsRef<Path>,
    image_data: &[T],
    image_size: ImageSize,
) -> Result<(), IoError>
where
    C: colortype::ColorType<Inner = T>,
    [T]: tiff::encoder::TiffValue,
{
    let file = fs::File::create(file_path)?;

    let mut encoder = TiffEncoder::new(file)?;
    encoder.write_image::<C>(
        image_size.width as u32,
        image_size.height as u32,
        image_data,
    )?;
    Ok(())
}
