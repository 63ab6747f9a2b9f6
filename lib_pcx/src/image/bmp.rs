//! Reader for uncompressed, 8-bit indexed Windows bitmaps.
//!
//! Layout: a 14-byte file header, a 40-byte `BITMAPINFOHEADER`, a color
//! table of `[blue, green, red, reserved]` entries filling the gap up to the
//! pixel data offset, then rows padded to 4 bytes. Rows run bottom to top
//! unless the height is negative. All fields are little-endian.

use log::{debug, error, info};
use thiserror::Error;

use super::format::ErrorKind;
use crate::color::{MatrixError, PixelMatrix, Rgb};
use crate::compression::bitplane::read_samples;
use crate::constants::*;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum BmpError {
    #[error("Not a BMP file: signature is {0:#06x}")]
    InvalidSignature(u16),
    #[error("Unexpected end of data: needed {needed} bytes, got {actual}")]
    UnexpectedEof { needed: usize, actual: usize },
    #[error("Unsupported info header size {0}, only 40 is supported")]
    UnsupportedInfoHeader(u32),
    #[error("Unsupported bit depth {0}, only 8-bit indexed bitmaps are supported")]
    UnsupportedBitDepth(u16),
    #[error("Unsupported compression method {0}")]
    UnsupportedCompression(u32),
    #[error("Pixel data offset {0} points inside the headers")]
    InvalidDataOffset(u32),
    #[error("Color index {index} exceeds color table size of {size}")]
    ColorIndexOutOfRange { index: usize, size: usize },
    #[error("Invalid bitmap dimensions")]
    InvalidDimensions(#[from] MatrixError),
}

impl BmpError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            BmpError::InvalidSignature(_) => ErrorKind::Signature,
            BmpError::UnsupportedInfoHeader(_)
            | BmpError::UnsupportedBitDepth(_)
            | BmpError::UnsupportedCompression(_) => ErrorKind::UnsupportedFormat,
            BmpError::InvalidDimensions(_) => ErrorKind::Validation,
            BmpError::UnexpectedEof { .. }
            | BmpError::InvalidDataOffset(_)
            | BmpError::ColorIndexOutOfRange { .. } => ErrorKind::Corruption,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BmpFileHeader {
    pub file_type: u16,
    pub file_size: u32,
    pub reserved: [u16; 2],
    pub data_offset: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BmpInfoHeader {
    pub size: u32,
    pub width: i32,
    /// Positive for bottom-up rows, negative for top-down.
    pub height: i32,
    pub planes: u16,
    pub bit_count: u16,
    pub compression: u32,
    pub image_size: u32,
    pub x_pixels_per_meter: i32,
    pub y_pixels_per_meter: i32,
    pub colors_used: u32,
    pub colors_important: u32,
}

#[derive(Debug)]
pub struct Bitmap {
    pub file_header: BmpFileHeader,
    pub info_header: BmpInfoHeader,
    pub color_table: Vec<Rgb>,
    /// Top row first, regardless of the storage order.
    pub pixels: PixelMatrix,
}

/// Little-endian field access with bounds checks.
struct Fields<'a> {
    data: &'a [u8],
}

impl<'a> Fields<'a> {
    fn bytes<const N: usize>(&self, offset: usize) -> Result<[u8; N], BmpError> {
        self.data
            .get(offset..offset + N)
            .and_then(|slice| slice.try_into().ok())
            .ok_or(BmpError::UnexpectedEof {
                needed: offset + N,
                actual: self.data.len(),
            })
    }

    fn u16(&self, offset: usize) -> Result<u16, BmpError> {
        self.bytes(offset).map(u16::from_le_bytes)
    }

    fn u32(&self, offset: usize) -> Result<u32, BmpError> {
        self.bytes(offset).map(u32::from_le_bytes)
    }

    fn i32(&self, offset: usize) -> Result<i32, BmpError> {
        self.bytes(offset).map(i32::from_le_bytes)
    }
}

pub fn read_bitmap(data: &[u8]) -> Result<Bitmap, BmpError> {
    info!("Starting bitmap parsing");
    let fields = Fields { data };

    let file_header = read_file_header(&fields)?;
    debug!("File header: {:?}", file_header);
    let info_header = read_info_header(&fields)?;
    debug!("Info header: {:?}", info_header);

    if info_header.bit_count != 8 {
        error!("Unsupported bit depth {}", info_header.bit_count);
        return Err(BmpError::UnsupportedBitDepth(info_header.bit_count));
    }
    if info_header.compression != BMP_COMPRESSION_NONE {
        error!("Unsupported compression {}", info_header.compression);
        return Err(BmpError::UnsupportedCompression(info_header.compression));
    }

    let color_table = read_color_table(&fields, file_header.data_offset)?;
    debug!("Color table holds {} colors", color_table.len());

    let pixels = read_pixels(data, &file_header, &info_header, &color_table)?;
    info!(
        "Bitmap parsed: {}x{} pixels",
        pixels.width(),
        pixels.height()
    );

    Ok(Bitmap {
        file_header,
        info_header,
        color_table,
        pixels,
    })
}

fn read_file_header(fields: &Fields) -> Result<BmpFileHeader, BmpError> {
    let file_type = fields.u16(0)?;
    if file_type != BMP_SIGNATURE {
        error!("Invalid BMP signature {:#06x}", file_type);
        return Err(BmpError::InvalidSignature(file_type));
    }

    Ok(BmpFileHeader {
        file_type,
        file_size: fields.u32(2)?,
        reserved: [fields.u16(6)?, fields.u16(8)?],
        data_offset: fields.u32(10)?,
    })
}

fn read_info_header(fields: &Fields) -> Result<BmpInfoHeader, BmpError> {
    let base = BMP_FILE_HEADER_SIZE;
    let size = fields.u32(base)?;
    if size as usize != BMP_INFO_HEADER_SIZE {
        error!("Info header of {} bytes is not supported", size);
        return Err(BmpError::UnsupportedInfoHeader(size));
    }

    Ok(BmpInfoHeader {
        size,
        width: fields.i32(base + 4)?,
        height: fields.i32(base + 8)?,
        planes: fields.u16(base + 12)?,
        bit_count: fields.u16(base + 14)?,
        compression: fields.u32(base + 16)?,
        image_size: fields.u32(base + 20)?,
        x_pixels_per_meter: fields.i32(base + 24)?,
        y_pixels_per_meter: fields.i32(base + 28)?,
        colors_used: fields.u32(base + 32)?,
        colors_important: fields.u32(base + 36)?,
    })
}

fn read_color_table(fields: &Fields, data_offset: u32) -> Result<Vec<Rgb>, BmpError> {
    let table_start = BMP_FILE_HEADER_SIZE + BMP_INFO_HEADER_SIZE;
    let table_size = (data_offset as usize)
        .checked_sub(table_start)
        .ok_or(BmpError::InvalidDataOffset(data_offset))?
        / BMP_COLOR_TABLE_ENTRY_SIZE;

    (0..table_size)
        .map(|i| {
            let [blue, green, red, _] = fields.bytes::<4>(table_start + i * BMP_COLOR_TABLE_ENTRY_SIZE)?;
            Ok(Rgb::new(red, green, blue))
        })
        .collect()
}

fn read_pixels(
    data: &[u8],
    file_header: &BmpFileHeader,
    info_header: &BmpInfoHeader,
    color_table: &[Rgb],
) -> Result<PixelMatrix, BmpError> {
    let width = usize::try_from(info_header.width).map_err(|_| MatrixError::ZeroWidth)?;
    let height = info_header.height.unsigned_abs() as usize;
    if width == 0 {
        return Err(MatrixError::ZeroWidth.into());
    }
    if height == 0 {
        return Err(MatrixError::Empty.into());
    }

    let bits = usize::from(info_header.bit_count);
    let stride = (bits * width).div_ceil(32) * 4;
    let start = file_header.data_offset as usize;
    let needed = start + stride * height;
    let pixel_data = data.get(start..needed).ok_or(BmpError::UnexpectedEof {
        needed,
        actual: data.len(),
    })?;
    debug!("Row stride: {} bytes", stride);

    let mut rows = pixel_data
        .chunks_exact(stride)
        .map(|line| {
            read_samples(line, info_header.bit_count as u8, width)
                .into_iter()
                .map(|index| {
                    color_table
                        .get(usize::from(index))
                        .map(|color| color.opaque())
                        .ok_or(BmpError::ColorIndexOutOfRange {
                            index: usize::from(index),
                            size: color_table.len(),
                        })
                })
                .collect::<Result<Vec<_>, _>>()
        })
        .collect::<Result<Vec<_>, _>>()?;

    if info_header.height > 0 {
        rows.reverse();
    }

    Ok(PixelMatrix::new(rows)?)
}
