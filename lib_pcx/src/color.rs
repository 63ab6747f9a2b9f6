use serde::{Deserialize, Serialize};
use thiserror::Error;

/// An opaque 8-bit-per-channel color, as stored in PCX palettes.
///
/// Field order matters: the derived `Ord` compares red first, then green,
/// then blue, which is the same as comparing the packed `0xRRGGBB` key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

/// A color with alpha. Ordered like the packed `0xRRGGBBAA` key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Rgba {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    pub alpha: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);

    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    pub fn to_bytes(self) -> [u8; 3] {
        [self.red, self.green, self.blue]
    }

    pub fn opaque(self) -> Rgba {
        Rgba::new(self.red, self.green, self.blue, u8::MAX)
    }
}

impl Rgba {
    pub const fn new(red: u8, green: u8, blue: u8, alpha: u8) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Opaque gray with every color channel set to `value`.
    pub const fn gray(value: u8) -> Self {
        Self::new(value, value, value, u8::MAX)
    }

    pub fn rgb(self) -> Rgb {
        Rgb::new(self.red, self.green, self.blue)
    }
}

impl From<[u8; 4]> for Rgba {
    fn from([red, green, blue, alpha]: [u8; 4]) -> Self {
        Self::new(red, green, blue, alpha)
    }
}

impl From<Rgba> for [u8; 4] {
    fn from(color: Rgba) -> Self {
        [color.red, color.green, color.blue, color.alpha]
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum MatrixError {
    #[error("Pixel matrix has no rows")]
    Empty,
    #[error("Pixel matrix has no columns")]
    ZeroWidth,
    #[error("Pixel matrix row {row} has {actual} pixels, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        actual: usize,
    },
}

/// Rows of pixels, top row first. Always non-empty and rectangular.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelMatrix {
    rows: Vec<Vec<Rgba>>,
}

impl PixelMatrix {
    pub fn new(rows: Vec<Vec<Rgba>>) -> Result<Self, MatrixError> {
        let first = rows.first().ok_or(MatrixError::Empty)?;
        let expected = first.len();
        if expected == 0 {
            return Err(MatrixError::ZeroWidth);
        }
        if let Some((row, actual)) = rows
            .iter()
            .map(Vec::len)
            .enumerate()
            .find(|&(_, len)| len != expected)
        {
            return Err(MatrixError::RaggedRow {
                row,
                expected,
                actual,
            });
        }
        Ok(Self { rows })
    }

    /// Builds a matrix from a flat, row-major RGBA byte buffer.
    pub fn from_rgba_bytes(width: usize, height: usize, data: &[u8]) -> Result<Self, MatrixError> {
        if width == 0 {
            return Err(MatrixError::ZeroWidth);
        }
        let rows: Vec<Vec<Rgba>> = data
            .chunks(width * 4)
            .take(height)
            .map(|line| {
                line.chunks_exact(4)
                    .map(|px| Rgba::new(px[0], px[1], px[2], px[3]))
                    .collect()
            })
            .collect();
        if rows.len() < height {
            return Err(MatrixError::RaggedRow {
                row: rows.len(),
                expected: width,
                actual: 0,
            });
        }
        Self::new(rows)
    }

    pub fn width(&self) -> usize {
        self.rows[0].len()
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn rows(&self) -> &[Vec<Rgba>] {
        &self.rows
    }

    pub fn get(&self, x: usize, y: usize) -> Option<Rgba> {
        self.rows.get(y).and_then(|row| row.get(x)).copied()
    }

    /// Every pixel in row-major order.
    pub fn pixels(&self) -> impl Iterator<Item = Rgba> + '_ {
        self.rows.iter().flatten().copied()
    }

    pub fn into_rows(self) -> Vec<Vec<Rgba>> {
        self.rows
    }

    /// Flattens the matrix back into row-major RGBA bytes.
    pub fn to_rgba_bytes(&self) -> Vec<u8> {
        let mut data = Vec::with_capacity(self.width() * self.height() * 4);
        for pixel in self.pixels() {
            data.extend_from_slice(&<[u8; 4]>::from(pixel));
        }
        data
    }
}
