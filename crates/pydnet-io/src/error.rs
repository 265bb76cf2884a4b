/// An error type for the io module.
#[derive(thiserror::Error, Debug)]
pub enum IoError {
    /// Error when the file does not exist.
    #[error("File does not exist: {0}")]
    FileDoesNotExist(std::path::PathBuf),

    /// Invalid file extension.
    #[error("File does not have a valid extension: {0}")]
    InvalidFileExtension(std::path::PathBuf),

    /// Error to open the file.
    #[error("Failed to manipulate the file. {0}")]
    FileError(#[from] std::io::Error),

    /// Error to create the image.
    #[error("Failed to create image. {0}")]
    ImageCreationError(#[from] pydnet_image::ImageError),

    /// Error to encode the PNG image.
    #[error("Failed to encode the png image. {0}")]
    PngEncodingError(String),

    /// Error to decode the PNG image.
    #[error("Failed to decode the png image. {0}")]
    PngDecodeError(String),

    /// Error to decode or encode the TIFF image.
    #[error("Error with TIFF encoding/decoding. {0}")]
    TiffError(#[from] tiff::TiffError),

    /// The raster does not have the expected channels or bit depth.
    #[error("Unsupported pixel layout in {path}: expected {expected}")]
    UnsupportedPixelLayout {
        /// The offending file.
        path: std::path::PathBuf,
        /// Human readable description of the accepted layout.
        expected: &'static str,
    },

    /// The manifest does not list any sample.
    #[error("Manifest {0} does not list any sample")]
    EmptyManifest(std::path::PathBuf),
}
