use log::{debug, error, info, warn};
use thiserror::Error;

use super::format::{ErrorKind, Image, PcxHeader};
use crate::color::Rgb;
use crate::compression::bitplane::{BitPlaneError, PaletteLookup, PlaneLayout};
use crate::compression::{decompress, DecompressionError};
use crate::constants::*;

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("Not a PCX file: signature byte is {0:#04x}")]
    InvalidSignature(u8),
    #[error("Header truncated: {0} of 128 bytes present")]
    TruncatedHeader(usize),
    #[error("Unsupported PCX version {0}")]
    UnsupportedVersion(u8),
    #[error("Unsupported PCX encoding {0}")]
    UnsupportedEncoding(u8),
    #[error("Invalid image window: x {x_min}..={x_max}, y {y_min}..={y_max}")]
    InvalidWindow {
        x_min: u16,
        y_min: u16,
        x_max: u16,
        y_max: u16,
    },

    #[error("Invalid plane layout")]
    InvalidLayout(#[from] BitPlaneError),
    #[error("Decompression failed")]
    DecompressionFailed(#[from] DecompressionError),
}

impl DecodeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DecodeError::InvalidSignature(_) => ErrorKind::Signature,
            DecodeError::UnsupportedVersion(_)
            | DecodeError::UnsupportedEncoding(_)
            | DecodeError::InvalidLayout(BitPlaneError::UnsupportedFormat { .. }) => {
                ErrorKind::UnsupportedFormat
            }
            _ => ErrorKind::Corruption,
        }
    }
}

pub fn decode(encoded_data: &[u8]) -> Result<Image, DecodeError> {
    let header = parse_header(encoded_data)?;
    debug!("Header parsed: {:?}", header);

    let layout = PlaneLayout::new(
        header.width(),
        header.height(),
        header.bits_per_pixel,
        header.planes,
    )
    .with_bytes_per_line(usize::from(header.bytes_per_line));
    debug!("Image dimensions read: width={} height={}", layout.width, layout.height);
    // Geometry comes from the file, check it before sizing any buffer
    layout.validate()?;

    let extended = if header.bits_per_pixel == 8 && header.planes == 1 {
        read_extended_palette(encoded_data)
    } else {
        None
    };

    let palette = match (header.planes, header.bits_per_pixel) {
        (1, 4) => Some(header.palette.to_vec()),
        (1, 8) => extended,
        _ => None,
    };
    let lookup = match &palette {
        Some(colors) => PaletteLookup::Palette(colors),
        None => PaletteLookup::Grayscale,
    };

    let pixels = decompress(&encoded_data[PCX_HEADER_SIZE..], layout, lookup)?;
    info!("Decoding completed successfully");

    Ok(Image {
        header,
        palette,
        pixels,
    })
}

/// Parses and validates the fixed 128-byte header.
pub fn parse_header(encoded_data: &[u8]) -> Result<PcxHeader, DecodeError> {
    // Check the signature before anything else
    let Some(&manufacturer) = encoded_data.first() else {
        error!("Empty input, no PCX header");
        return Err(DecodeError::TruncatedHeader(0));
    };
    if manufacturer != PCX_SIGNATURE {
        error!("Invalid PCX signature {:#04x}", manufacturer);
        return Err(DecodeError::InvalidSignature(manufacturer));
    }
    if encoded_data.len() < PCX_HEADER_SIZE {
        error!("Header truncated at {} bytes", encoded_data.len());
        return Err(DecodeError::TruncatedHeader(encoded_data.len()));
    }

    let bytes = &encoded_data[..PCX_HEADER_SIZE];
    let word = |offset: usize| u16::from_le_bytes([bytes[offset], bytes[offset + 1]]);

    let mut palette = [Rgb::BLACK; HEADER_PALETTE_ENTRIES];
    for (color, rgb) in palette
        .iter_mut()
        .zip(bytes[PcxHeader::PALETTE_OFFSET..PcxHeader::RESERVED_OFFSET].chunks_exact(3))
    {
        *color = Rgb::new(rgb[0], rgb[1], rgb[2]);
    }

    let header = PcxHeader {
        manufacturer,
        version: bytes[1],
        encoding: bytes[2],
        bits_per_pixel: bytes[3],
        x_min: word(4),
        y_min: word(6),
        x_max: word(8),
        y_max: word(10),
        horizontal_dpi: word(12),
        vertical_dpi: word(14),
        palette,
        reserved: bytes[PcxHeader::RESERVED_OFFSET],
        planes: bytes[65],
        bytes_per_line: word(66),
        palette_type: word(68),
        horizontal_screen_size: word(70),
        vertical_screen_size: word(72),
    };

    if !PCX_KNOWN_VERSIONS.contains(&header.version) {
        error!("Unsupported PCX version {}", header.version);
        return Err(DecodeError::UnsupportedVersion(header.version));
    }
    if header.encoding != PCX_ENCODING_RLE {
        error!("Unsupported PCX encoding {}", header.encoding);
        return Err(DecodeError::UnsupportedEncoding(header.encoding));
    }
    if header.x_max < header.x_min || header.y_max < header.y_min {
        error!("Image window is inverted");
        return Err(DecodeError::InvalidWindow {
            x_min: header.x_min,
            y_min: header.y_min,
            x_max: header.x_max,
            y_max: header.y_max,
        });
    }

    Ok(header)
}

/// Reads the 256-color palette appended to 8-bit images, if present.
///
/// A missing marker is not an error; the image is then grayscale.
fn read_extended_palette(encoded_data: &[u8]) -> Option<Vec<Rgb>> {
    if encoded_data.len() < PCX_HEADER_SIZE + EXTENDED_PALETTE_BLOCK_SIZE {
        warn!("File too short for an extended palette, decoding as grayscale");
        return None;
    }

    let block = &encoded_data[encoded_data.len() - EXTENDED_PALETTE_BLOCK_SIZE..];
    if block[0] != EXTENDED_PALETTE_MARKER {
        warn!(
            "Extended palette marker is {:#04x}, decoding as grayscale",
            block[0]
        );
        return None;
    }

    let palette: Vec<Rgb> = block[1..]
        .chunks_exact(3)
        .map(|rgb| Rgb::new(rgb[0], rgb[1], rgb[2]))
        .collect();
    debug!("Read extended palette of {} colors", palette.len());
    Some(palette)
}
