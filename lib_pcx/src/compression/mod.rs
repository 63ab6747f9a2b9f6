pub mod bitplane;
pub mod median_cut;
pub mod rle;

use bitplane::{BitPlaneError, PaletteLookup, PlaneLayout, PlaneSource};
use log::{debug, info};
use median_cut::QuantizeError;
use rle::RleDecompressionError;
use thiserror::Error;

use crate::color::{PixelMatrix, Rgb};

#[derive(Error, Debug)]
pub enum CompressionError {
    #[error("Palette quantization failed")]
    QuantizationFailed(#[from] QuantizeError),
    #[error("Bit plane packing failed")]
    PackingFailed(#[from] BitPlaneError),
}

#[derive(Error, Debug)]
pub enum DecompressionError {
    #[error("RLE decompression failed")]
    RleDecompressionFailed(#[from] RleDecompressionError),
    #[error("Bit plane unpacking failed")]
    UnpackingFailed(#[from] BitPlaneError),
}

/// How pixels are reduced before packing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reduction {
    /// Median cut down to this many colors, one plane of indices.
    Quantize(usize),
    /// Channels stored as separate planes, no palette.
    Planar,
}

pub struct CompressionResult {
    /// Empty for planar images.
    pub palette: Vec<Rgb>,
    pub data: Vec<u8>,
}

/// Quantizes (if asked), packs and run-length encodes `pixels`.
pub fn compress(
    pixels: &PixelMatrix,
    reduction: Reduction,
    bits_per_pixel: u8,
    planes: u8,
) -> Result<CompressionResult, CompressionError> {
    info!("Starting compression");
    debug!(
        "Input: {}x{} pixels, {} bpp, {} plane(s)",
        pixels.width(),
        pixels.height(),
        bits_per_pixel,
        planes
    );

    // Step 1: Quantize and pack
    let (palette, packed) = match reduction {
        Reduction::Quantize(target) => {
            let population: Vec<_> = pixels.pixels().collect();
            let quantization = median_cut::median_cut(&population, target)?;
            debug!("Quantized to {} colors", quantization.palette.len());

            let packed = bitplane::pack(
                pixels,
                PlaneSource::Indexed(&quantization),
                bits_per_pixel,
                planes,
            )?;
            (quantization.palette, packed)
        }
        Reduction::Planar => {
            let packed = bitplane::pack(pixels, PlaneSource::Channels, bits_per_pixel, planes)?;
            (Vec::new(), packed)
        }
    };
    debug!("Packed planes: {} bytes", packed.len());

    // Step 2: RLE
    let data = rle::rle_compression(&packed);
    debug!("RLE compression: {} bytes", data.len());

    info!(
        "Compression completed successfully: {}%",
        ((packed.len() as f32 - data.len() as f32) / packed.len() as f32) * 100.0
    );

    Ok(CompressionResult { palette, data })
}

/// Run-length decodes `data` and unpacks it into pixels.
pub fn decompress(
    data: &[u8],
    layout: PlaneLayout,
    lookup: PaletteLookup<'_>,
) -> Result<PixelMatrix, DecompressionError> {
    info!("Starting decompression");
    debug!("Input data length: {}, layout: {:?}", data.len(), layout);

    // Step 1: RLE
    let decoded = rle::rle_decompression(data, layout.total_size())?;
    debug!(
        "RLE decompression: {} bytes from {} input bytes",
        decoded.data.len(),
        decoded.consumed
    );

    // Step 2: Unpack planes
    let pixels = bitplane::unpack(&decoded.data, layout, lookup)?;
    info!("Decompression completed successfully");

    Ok(pixels)
}
