use std::path::PathBuf;

use argh::FromArgs;

use pydnet::image::{Image, ImageSize, InverseDepthMap};
use pydnet::imgproc::resize::resize_bilinear;
use pydnet::io::{
    png::write_image_png_gray16,
    prediction::{normalize_prediction, quantize_prediction},
    tiff::read_image_tiff_mono32f,
};

#[derive(FromArgs, Debug)]
#[argh(subcommand, name = "encode")]
/// Encode a raw float inverse depth into the 16-bit prediction PNG format.
pub struct EncodeArgs {
    /// path to the float32 TIFF network output
    #[argh(option, short = 'i')]
    input: PathBuf,

    /// path of the PNG to write
    #[argh(option, short = 'o')]
    output: PathBuf,

    /// output width, resizes together with --height
    #[argh(option)]
    width: Option<usize>,

    /// output height, resizes together with --width
    #[argh(option)]
    height: Option<usize>,
}

pub fn run(args: EncodeArgs) -> Result<(), Box<dyn std::error::Error>> {
    let raw = read_image_tiff_mono32f(&args.input)?;

    let size = match (args.width, args.height) {
        (Some(width), Some(height)) => Some([width, height].into()),
        (None, None) => None,
        _ => return Err("--width and --height must be given together".into()),
    };

    let encoded = encode_raw(&raw, size)?;
    write_image_png_gray16(&args.output, &encoded)?;
    log::info!(
        "encoded {} ({}) into {}",
        args.input.display(),
        encoded.size(),
        args.output.display()
    );

    Ok(())
}

/// Normalize, resize to `size` if given, then quantize.
fn encode_raw(
    raw: &InverseDepthMap,
    size: Option<ImageSize>,
) -> Result<Image<u16>, Box<dyn std::error::Error>> {
    let normalized = normalize_prediction(raw)?;

    let normalized = match size {
        Some(size) => {
            let mut resized = Image::from_size_val(size, 0.0f32)?;
            resize_bilinear(&normalized, &mut resized)?;
            resized
        }
        None => normalized,
    };

    Ok(quantize_prediction(&normalized))
}
