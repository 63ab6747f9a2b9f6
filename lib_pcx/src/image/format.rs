use serde::{Deserialize, Serialize};

use crate::color::{PixelMatrix, Rgb};
use crate::compression::Reduction;
use crate::constants::*;

/// Failure classes shared by the encoders and decoders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad magic bytes.
    Signature,
    /// Bit depth, plane count, header size or version we don't handle.
    UnsupportedFormat,
    /// Caller-supplied data or parameters are invalid.
    Validation,
    /// The encoded data is truncated or inconsistent.
    Corruption,
}

/// The PCX layouts this crate can write.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PcxFormat {
    /// 4 bpp, one plane, 16 colors in the header palette.
    #[default]
    Palette16,
    /// 8 bpp, one plane, 256 colors appended after the image data.
    Palette256,
    /// 8 bpp, red, green and blue planes.
    TrueColor,
    /// 8 bpp, red, green, blue and alpha planes.
    TrueColorAlpha,
}

impl PcxFormat {
    pub fn bits_per_pixel(self) -> u8 {
        match self {
            PcxFormat::Palette16 => 4,
            PcxFormat::Palette256 | PcxFormat::TrueColor | PcxFormat::TrueColorAlpha => 8,
        }
    }

    pub fn planes(self) -> u8 {
        match self {
            PcxFormat::Palette16 | PcxFormat::Palette256 => 1,
            PcxFormat::TrueColor => 3,
            PcxFormat::TrueColorAlpha => 4,
        }
    }

    pub fn reduction(self) -> Reduction {
        match self {
            PcxFormat::Palette16 => Reduction::Quantize(HEADER_PALETTE_ENTRIES),
            PcxFormat::Palette256 => Reduction::Quantize(EXTENDED_PALETTE_ENTRIES),
            PcxFormat::TrueColor | PcxFormat::TrueColorAlpha => Reduction::Planar,
        }
    }

    /// Whether the format carries the 256-color palette after the body.
    pub fn has_extended_palette(self) -> bool {
        self == PcxFormat::Palette256
    }
}

/// Writer settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodeOptions {
    pub format: PcxFormat,
    /// Horizontal and vertical resolution in dpi.
    pub resolution: (u16, u16),
    /// Horizontal and vertical screen size hint, 0 when unknown.
    pub screen_size: (u16, u16),
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            format: PcxFormat::default(),
            resolution: (72, 72),
            screen_size: (0, 0),
        }
    }
}

impl EncodeOptions {
    pub fn with_format(format: PcxFormat) -> Self {
        Self {
            format,
            ..Self::default()
        }
    }
}

/// The 128-byte PCX file header. Multi-byte fields are little-endian.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PcxHeader {
    pub manufacturer: u8,
    pub version: u8,
    pub encoding: u8,
    pub bits_per_pixel: u8,
    pub x_min: u16,
    pub y_min: u16,
    pub x_max: u16,
    pub y_max: u16,
    pub horizontal_dpi: u16,
    pub vertical_dpi: u16,
    pub palette: [Rgb; HEADER_PALETTE_ENTRIES],
    pub reserved: u8,
    pub planes: u8,
    pub bytes_per_line: u16,
    pub palette_type: u16,
    pub horizontal_screen_size: u16,
    pub vertical_screen_size: u16,
}

impl PcxHeader {
    pub const PALETTE_OFFSET: usize = 16;
    pub const RESERVED_OFFSET: usize = 64;
    pub const FILLER_OFFSET: usize = 74;

    /// Header for a fresh image, palette left black.
    pub fn new(
        width: u16,
        height: u16,
        bits_per_pixel: u8,
        planes: u8,
        bytes_per_line: u16,
        options: &EncodeOptions,
    ) -> Self {
        Self {
            manufacturer: PCX_SIGNATURE,
            version: PCX_VERSION,
            encoding: PCX_ENCODING_RLE,
            bits_per_pixel,
            x_min: 0,
            y_min: 0,
            x_max: width.saturating_sub(1),
            y_max: height.saturating_sub(1),
            horizontal_dpi: options.resolution.0,
            vertical_dpi: options.resolution.1,
            palette: [Rgb::BLACK; HEADER_PALETTE_ENTRIES],
            reserved: 0,
            planes,
            bytes_per_line,
            palette_type: PCX_PALETTE_TYPE_COLOR,
            horizontal_screen_size: options.screen_size.0,
            vertical_screen_size: options.screen_size.1,
        }
    }

    /// Width in pixels. Only meaningful once `x_max >= x_min` is checked.
    pub fn width(&self) -> usize {
        usize::from(self.x_max) - usize::from(self.x_min) + 1
    }

    pub fn height(&self) -> usize {
        usize::from(self.y_max) - usize::from(self.y_min) + 1
    }

    pub fn to_bytes(&self) -> [u8; PCX_HEADER_SIZE] {
        let mut bytes = [0u8; PCX_HEADER_SIZE];
        bytes[0] = self.manufacturer;
        bytes[1] = self.version;
        bytes[2] = self.encoding;
        bytes[3] = self.bits_per_pixel;

        let words = [
            self.x_min,
            self.y_min,
            self.x_max,
            self.y_max,
            self.horizontal_dpi,
            self.vertical_dpi,
        ];
        for (slot, word) in bytes[4..Self::PALETTE_OFFSET].chunks_exact_mut(2).zip(words) {
            slot.copy_from_slice(&word.to_le_bytes());
        }

        for (slot, color) in bytes[Self::PALETTE_OFFSET..Self::RESERVED_OFFSET]
            .chunks_exact_mut(3)
            .zip(self.palette)
        {
            slot.copy_from_slice(&color.to_bytes());
        }

        bytes[Self::RESERVED_OFFSET] = self.reserved;
        bytes[65] = self.planes;

        let words = [
            self.bytes_per_line,
            self.palette_type,
            self.horizontal_screen_size,
            self.vertical_screen_size,
        ];
        for (slot, word) in bytes[66..Self::FILLER_OFFSET].chunks_exact_mut(2).zip(words) {
            slot.copy_from_slice(&word.to_le_bytes());
        }

        bytes
    }
}

/// A decoded PCX image.
#[derive(Debug)]
pub struct Image {
    pub header: PcxHeader,
    /// The palette the pixels were resolved through, if any.
    pub palette: Option<Vec<Rgb>>,
    pub pixels: PixelMatrix,
}

impl Image {
    pub fn width(&self) -> usize {
        self.pixels.width()
    }

    pub fn height(&self) -> usize {
        self.pixels.height()
    }
}
