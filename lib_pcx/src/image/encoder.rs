use log::{debug, error, info};
use thiserror::Error;

use super::format::{EncodeOptions, ErrorKind, PcxHeader};
use crate::color::{MatrixError, PixelMatrix, Rgb};
use crate::compression::bitplane::{bytes_per_line, BitPlaneError};
use crate::compression::{compress, CompressionError};
use crate::constants::{
    EXTENDED_PALETTE_BLOCK_SIZE, EXTENDED_PALETTE_ENTRIES, EXTENDED_PALETTE_MARKER,
    HEADER_PALETTE_ENTRIES, PCX_HEADER_SIZE,
};

#[derive(Error, Debug)]
pub enum EncodingError {
    #[error("Invalid pixel matrix")]
    InvalidPixelMatrix(#[from] MatrixError),
    #[error("Image {width}x{height} exceeds the PCX limit of {max} pixels per side")]
    ImageTooLarge {
        width: usize,
        height: usize,
        max: usize,
    },
    #[error("Failed to compress image data")]
    CompressionFailed(#[from] CompressionError),
    #[error("Palette of {size} colors exceeds the {capacity} slots of the format")]
    PaletteTooLarge { size: usize, capacity: usize },
}

impl EncodingError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            EncodingError::CompressionFailed(CompressionError::PackingFailed(
                BitPlaneError::UnsupportedFormat { .. },
            )) => ErrorKind::UnsupportedFormat,
            _ => ErrorKind::Validation,
        }
    }
}

/// Encodes `pixels` as a PCX file.
pub fn encode(pixels: &PixelMatrix, options: &EncodeOptions) -> Result<Vec<u8>, EncodingError> {
    info!("Starting encoding");

    let format = options.format;
    let (width, height) = (pixels.width(), pixels.height());
    let max = usize::from(u16::MAX);
    let line_size = bytes_per_line(format.bits_per_pixel(), width);
    if width > max || height > max || line_size > max {
        error!("Image {}x{} is too large for a PCX header", width, height);
        return Err(EncodingError::ImageTooLarge { width, height, max });
    }

    // Step 1: Compress the image data
    let compressed = compress(pixels, format.reduction(), format.bits_per_pixel(), format.planes())?;
    debug!(
        "Image data compressed successfully with palette size: {}",
        compressed.palette.len()
    );

    // Step 2: Write header
    let mut header = PcxHeader::new(
        width as u16,
        height as u16,
        format.bits_per_pixel(),
        format.planes(),
        line_size as u16,
        options,
    );
    if !compressed.palette.is_empty() && !format.has_extended_palette() {
        check_palette_size(&compressed.palette, HEADER_PALETTE_ENTRIES)?;
        header.palette[..compressed.palette.len()].copy_from_slice(&compressed.palette);
    }
    debug!("Header written: {:?}", header);

    let mut encoded_data =
        Vec::with_capacity(PCX_HEADER_SIZE + compressed.data.len() + EXTENDED_PALETTE_BLOCK_SIZE);
    encoded_data.extend_from_slice(&header.to_bytes());

    // Step 3: Body
    encoded_data.extend_from_slice(&compressed.data);
    debug!("RLE data added to encoded data");

    // Step 4: Extended palette
    if format.has_extended_palette() {
        check_palette_size(&compressed.palette, EXTENDED_PALETTE_ENTRIES)?;
        encoded_data.push(EXTENDED_PALETTE_MARKER);
        for index in 0..EXTENDED_PALETTE_ENTRIES {
            let color = compressed.palette.get(index).copied().unwrap_or(Rgb::BLACK);
            encoded_data.extend_from_slice(&color.to_bytes());
        }
        debug!(
            "Extended palette written with {} colors",
            compressed.palette.len()
        );
    }

    info!("Encoding process completed successfully");
    Ok(encoded_data)
}

/// Encodes a row-major RGBA buffer of `width` x `height` pixels.
pub fn encode_rgba(
    width: usize,
    height: usize,
    rgba_data: &[u8],
    options: &EncodeOptions,
) -> Result<Vec<u8>, EncodingError> {
    let pixels = PixelMatrix::from_rgba_bytes(width, height, rgba_data)?;
    encode(&pixels, options)
}

fn check_palette_size(palette: &[Rgb], capacity: usize) -> Result<(), EncodingError> {
    if palette.len() > capacity {
        error!(
            "Palette size {} exceeds the maximum allowed limit of {} colors",
            palette.len(),
            capacity
        );
        return Err(EncodingError::PaletteTooLarge {
            size: palette.len(),
            capacity,
        });
    }
    Ok(())
}
