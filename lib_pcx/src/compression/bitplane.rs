//! Packing of pixel samples into PCX scanlines and back.
//!
//! A PCX scanline is `planes` consecutive runs of `bytes_per_line` bytes.
//! Inside a plane, samples are `bits_per_pixel` wide and stored most
//! significant bit first; the last byte of a plane is zero-padded.

use std::collections::HashMap;

use log::{debug, error};
use thiserror::Error;

use super::median_cut::Quantization;
use crate::color::{MatrixError, PixelMatrix, Rgb, Rgba};

#[derive(Error, Debug, PartialEq, Eq)]
pub enum BitPlaneError {
    #[error("Unsupported layout: {bits_per_pixel} bits per pixel with {planes} plane(s)")]
    UnsupportedFormat { bits_per_pixel: u8, planes: u8 },
    #[error("Palette of {size} colors does not fit in {bits_per_pixel} bits per pixel")]
    PaletteTooLarge { size: usize, bits_per_pixel: u8 },
    #[error("Color {0:?} has no entry in the color relation")]
    MissingRelation(Rgba),
    #[error("Quantized color {0:?} is not in the palette")]
    MissingPaletteEntry(Rgb),
    #[error("Palette index {index} exceeds palette size of {size}")]
    IndexOutOfRange { index: usize, size: usize },
    #[error("Plane data holds {actual} bytes, layout needs {expected}")]
    BufferTooShort { expected: usize, actual: usize },
    #[error("Stride of {actual} bytes cannot hold a line needing {needed}")]
    StrideTooSmall { needed: usize, actual: usize },
    #[error("Invalid pixel matrix")]
    InvalidMatrix(#[from] MatrixError),
}

/// Geometry of an uncompressed PCX image body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaneLayout {
    pub width: usize,
    pub height: usize,
    pub bits_per_pixel: u8,
    pub planes: u8,
    /// Stride of one plane. May exceed the minimum when a writer pads lines.
    pub bytes_per_line: usize,
}

impl PlaneLayout {
    /// Layout with the tightest stride for `width`.
    pub fn new(width: usize, height: usize, bits_per_pixel: u8, planes: u8) -> Self {
        Self {
            width,
            height,
            bits_per_pixel,
            planes,
            bytes_per_line: bytes_per_line(bits_per_pixel, width),
        }
    }

    pub fn with_bytes_per_line(self, bytes_per_line: usize) -> Self {
        Self {
            bytes_per_line,
            ..self
        }
    }

    /// Bytes in one scanline across all planes.
    pub fn scanline_size(&self) -> usize {
        usize::from(self.planes) * self.bytes_per_line
    }

    pub fn total_size(&self) -> usize {
        self.scanline_size() * self.height
    }

    /// Checks that `unpack` can read this layout: one plane of 1, 4 or 8
    /// bits, or three or four planes of 4 or 8 bits, with a non-empty image
    /// and a stride wide enough for a line.
    pub fn validate(&self) -> Result<(), BitPlaneError> {
        let supported = match self.planes {
            1 => matches!(self.bits_per_pixel, 1 | 4 | 8),
            3 | 4 => matches!(self.bits_per_pixel, 4 | 8),
            _ => false,
        };
        if !supported {
            error!(
                "Cannot unpack {} bpp with {} planes",
                self.bits_per_pixel, self.planes
            );
            return Err(unsupported(self.bits_per_pixel, self.planes));
        }
        if self.width == 0 {
            return Err(MatrixError::ZeroWidth.into());
        }
        if self.height == 0 {
            return Err(MatrixError::Empty.into());
        }

        let needed = bytes_per_line(self.bits_per_pixel, self.width);
        if self.bytes_per_line < needed {
            return Err(BitPlaneError::StrideTooSmall {
                needed,
                actual: self.bytes_per_line,
            });
        }
        Ok(())
    }
}

/// Bytes needed for `width` samples of `bits_per_pixel` bits, rounded up.
pub fn bytes_per_line(bits_per_pixel: u8, width: usize) -> usize {
    (usize::from(bits_per_pixel) * width).div_ceil(8)
}

/// Where packed sample values come from.
#[derive(Debug, Clone, Copy)]
pub enum PlaneSource<'a> {
    /// A single plane of palette indices, found by mapping each pixel
    /// through the quantization's relation and then into its palette.
    Indexed(&'a Quantization),
    /// One plane per channel: red, green, blue and, with four planes, alpha.
    Channels,
}

/// How single-plane sample values turn back into colors.
#[derive(Debug, Clone, Copy)]
pub enum PaletteLookup<'a> {
    /// The sample is the gray intensity itself.
    Grayscale,
    Palette(&'a [Rgb]),
}

/// MSB-first bit writer over one plane of one scanline.
struct BitWriter<'a> {
    buffer: &'a mut [u8],
    bit_position: usize,
}

impl<'a> BitWriter<'a> {
    fn new(buffer: &'a mut [u8]) -> Self {
        Self {
            buffer,
            bit_position: 0,
        }
    }

    fn write_bits(&mut self, value: u8, num_bits: u8) {
        for shift in (0..num_bits).rev() {
            if (value >> shift) & 1 == 1 {
                self.buffer[self.bit_position / 8] |= 0x80 >> (self.bit_position % 8);
            }
            self.bit_position += 1;
        }
    }
}

/// MSB-first bit reader; samples may straddle byte boundaries.
struct BitReader<'a> {
    data: &'a [u8],
    bit_position: usize,
}

impl<'a> BitReader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            bit_position: 0,
        }
    }

    fn read_bits(&mut self, num_bits: u8) -> u8 {
        let mut value = 0u16;
        for _ in 0..num_bits {
            let byte = self.data[self.bit_position / 8];
            let bit = (byte >> (7 - self.bit_position % 8)) & 1;
            value = (value << 1) | u16::from(bit);
            self.bit_position += 1;
        }
        value as u8
    }
}

/// Reads `count` samples of `bits_per_pixel` bits from the start of `line`.
///
/// `line` must hold at least `bytes_per_line(bits_per_pixel, count)` bytes.
pub fn read_samples(line: &[u8], bits_per_pixel: u8, count: usize) -> Vec<u8> {
    let mut reader = BitReader::new(line);
    (0..count).map(|_| reader.read_bits(bits_per_pixel)).collect()
}

/// Packs `pixels` into uncompressed PCX plane data.
pub fn pack(
    pixels: &PixelMatrix,
    source: PlaneSource<'_>,
    bits_per_pixel: u8,
    planes: u8,
) -> Result<Vec<u8>, BitPlaneError> {
    let layout = PlaneLayout::new(pixels.width(), pixels.height(), bits_per_pixel, planes);
    let bytes_per_line = layout.bytes_per_line;
    let mut data = vec![0u8; layout.total_size()];
    debug!("Packing {:?}: {} bytes per line", layout, bytes_per_line);

    match source {
        PlaneSource::Indexed(quantization) => {
            if planes != 1 || !matches!(bits_per_pixel, 1 | 4 | 8) {
                return Err(unsupported(bits_per_pixel, planes));
            }
            if quantization.palette.len() > 1usize << bits_per_pixel {
                error!(
                    "Palette of {} colors cannot be indexed with {} bits",
                    quantization.palette.len(),
                    bits_per_pixel
                );
                return Err(BitPlaneError::PaletteTooLarge {
                    size: quantization.palette.len(),
                    bits_per_pixel,
                });
            }

            let mut palette_map: HashMap<Rgb, u8> = HashMap::new();
            for (index, &color) in quantization.palette.iter().enumerate() {
                palette_map.entry(color).or_insert(index as u8);
            }

            for (row, line) in pixels.rows().iter().zip(data.chunks_exact_mut(bytes_per_line)) {
                let mut writer = BitWriter::new(line);
                for pixel in row {
                    let representative = quantization
                        .relation
                        .get(pixel)
                        .ok_or(BitPlaneError::MissingRelation(*pixel))?
                        .rgb();
                    let index = *palette_map
                        .get(&representative)
                        .ok_or(BitPlaneError::MissingPaletteEntry(representative))?;
                    writer.write_bits(index, bits_per_pixel);
                }
            }
        }
        PlaneSource::Channels => {
            if !matches!(planes, 3 | 4) || bits_per_pixel != 8 {
                return Err(unsupported(bits_per_pixel, planes));
            }

            for (row, scanline) in pixels
                .rows()
                .iter()
                .zip(data.chunks_exact_mut(layout.scanline_size()))
            {
                for (plane, line) in scanline.chunks_exact_mut(bytes_per_line).enumerate() {
                    let mut writer = BitWriter::new(line);
                    for pixel in row {
                        writer.write_bits(<[u8; 4]>::from(*pixel)[plane], bits_per_pixel);
                    }
                }
            }
        }
    }

    Ok(data)
}

/// Rebuilds a pixel matrix from uncompressed PCX plane data.
///
/// With one plane, samples go through `lookup`. With three or four planes
/// they are the red, green, blue (and alpha) channels directly.
pub fn unpack(
    data: &[u8],
    layout: PlaneLayout,
    lookup: PaletteLookup<'_>,
) -> Result<PixelMatrix, BitPlaneError> {
    layout.validate()?;
    let PlaneLayout {
        width,
        bits_per_pixel,
        planes,
        ..
    } = layout;
    if data.len() < layout.total_size() {
        return Err(BitPlaneError::BufferTooShort {
            expected: layout.total_size(),
            actual: data.len(),
        });
    }

    let bytes_per_line = layout.bytes_per_line;
    let mut rows = Vec::with_capacity(layout.height);

    for scanline in data.chunks_exact(layout.scanline_size()).take(layout.height) {
        let row = if planes == 1 {
            read_samples(scanline, bits_per_pixel, width)
                .into_iter()
                .map(|sample| resolve(sample, lookup))
                .collect::<Result<Vec<_>, _>>()?
        } else {
            let mut row = vec![Rgba::gray(0); width];
            for (plane, line) in scanline.chunks_exact(bytes_per_line).enumerate() {
                let samples = read_samples(line, bits_per_pixel, width);
                for (pixel, value) in row.iter_mut().zip(samples) {
                    match plane {
                        0 => pixel.red = value,
                        1 => pixel.green = value,
                        2 => pixel.blue = value,
                        _ => pixel.alpha = value,
                    }
                }
            }
            row
        };
        rows.push(row);
    }

    Ok(PixelMatrix::new(rows)?)
}

fn resolve(sample: u8, lookup: PaletteLookup<'_>) -> Result<Rgba, BitPlaneError> {
    match lookup {
        PaletteLookup::Grayscale => Ok(Rgba::gray(sample)),
        PaletteLookup::Palette(palette) => palette
            .get(usize::from(sample))
            .map(|color| color.opaque())
            .ok_or(BitPlaneError::IndexOutOfRange {
                index: usize::from(sample),
                size: palette.len(),
            }),
    }
}

fn unsupported(bits_per_pixel: u8, planes: u8) -> BitPlaneError {
    BitPlaneError::UnsupportedFormat {
        bits_per_pixel,
        planes,
    }
}
