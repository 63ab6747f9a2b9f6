use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use lib_pcx::constants::{FILE_EXT, FORMAT_NAME};
use lib_pcx::image::bmp::BmpError;
use lib_pcx::image::decoder::DecodeError;
use lib_pcx::image::encoder::EncodingError;
use lib_pcx::{decode, encode, read_bitmap, EncodeOptions, PcxFormat};
use log::{info, warn};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),

    #[error("Bitmap error: {0}")]
    BitmapError(#[from] BmpError),

    #[error("Encoding error: {0}")]
    EncodingError(#[from] EncodingError),

    #[error("Decoding error: {0}")]
    DecodeError(#[from] DecodeError),

    #[error("Written file does not decode to the source image")]
    VerificationFailed,
}

/// Converts the bitmap at `input` and writes the PCX next to it or to `output`.
///
/// The encoded bytes are decoded again before writing, so a broken file is
/// never left behind.
pub fn encode_file(
    input: &Path,
    output: Option<PathBuf>,
    format: PcxFormat,
    dpi: u16,
) -> Result<PathBuf, ConvertError> {
    let bytes = fs::read(input)?;
    let bitmap = read_bitmap(&bytes)?;
    info!(
        "Read {}: {}x{} pixels",
        input.display(),
        bitmap.pixels.width(),
        bitmap.pixels.height()
    );

    let options = EncodeOptions {
        format,
        resolution: (dpi, dpi),
        ..EncodeOptions::default()
    };
    let encoded = encode(&bitmap.pixels, &options)?;

    let decoded = decode(&encoded)?;
    if decoded.width() != bitmap.pixels.width() || decoded.height() != bitmap.pixels.height() {
        warn!("Round trip changed the image dimensions");
        return Err(ConvertError::VerificationFailed);
    }
    if matches!(format, PcxFormat::TrueColor | PcxFormat::TrueColorAlpha) && decoded.pixels != bitmap.pixels {
        warn!("Lossless round trip changed pixel values");
        return Err(ConvertError::VerificationFailed);
    }

    let output = output.unwrap_or_else(|| input.with_extension(FILE_EXT));
    fs::write(&output, &encoded)?;
    info!("Wrote {} bytes to {}", encoded.len(), output.display());

    Ok(output)
}

/// One-paragraph description of the PCX file at `input`.
pub fn inspect_file(input: &Path) -> Result<String, ConvertError> {
    let bytes = fs::read(input)?;
    let image = decode(&bytes)?;
    let header = &image.header;

    let palette = match &image.palette {
        Some(colors) => format!("{} palette entries", colors.len()),
        None if header.planes == 1 => "grayscale".to_string(),
        None => "direct color".to_string(),
    };

    Ok(format!(
        "{} v{}: {}x{} pixels, {} bpp, {} plane(s), {} bytes per line, {} dpi x {} dpi, {}",
        FORMAT_NAME,
        header.version,
        image.width(),
        image.height(),
        header.bits_per_pixel,
        header.planes,
        header.bytes_per_line,
        header.horizontal_dpi,
        header.vertical_dpi,
        palette
    ))
}
