#![allow(dead_code)]

use lib_pcx::{PixelMatrix, Rgba};

pub const GRADIENT_WIDTH: usize = 16;
pub const GRADIENT_HEIGHT: usize = 16;

/// 2x2 image of four distinct colors.
pub fn four_colors() -> PixelMatrix {
    PixelMatrix::new(vec![
        vec![Rgba::new(255, 0, 0, 255), Rgba::new(0, 255, 0, 255)],
        vec![Rgba::new(0, 0, 255, 255), Rgba::new(255, 255, 255, 255)],
    ])
    .unwrap()
}

/// 16x16 gray ramp with 256 distinct, opaque colors.
pub fn gradient() -> PixelMatrix {
    let rows = (0..GRADIENT_HEIGHT)
        .map(|y| {
            (0..GRADIENT_WIDTH)
                .map(|x| Rgba::gray((y * GRADIENT_WIDTH + x) as u8))
                .collect()
        })
        .collect();
    PixelMatrix::new(rows).unwrap()
}

/// Smooth color field with many more colors than a PCX palette can hold.
pub fn color_field(width: usize, height: usize) -> PixelMatrix {
    let rows = (0..height)
        .map(|y| {
            (0..width)
                .map(|x| {
                    Rgba::new(
                        (x * 255 / width) as u8,
                        (y * 255 / height) as u8,
                        ((x + y) * 127 / (width + height)) as u8,
                        255,
                    )
                })
                .collect()
        })
        .collect();
    PixelMatrix::new(rows).unwrap()
}

/// Pixels with varying alpha, for the four-plane layout.
pub fn translucent(width: usize, height: usize) -> PixelMatrix {
    let rows = (0..height)
        .map(|y| {
            (0..width)
                .map(|x| Rgba::new(x as u8 * 9, y as u8 * 7, 200, (x * y) as u8))
                .collect()
        })
        .collect();
    PixelMatrix::new(rows).unwrap()
}

/// Serialises an uncompressed 8-bit indexed BMP.
///
/// `table` holds `[blue, green, red, reserved]` entries; `indices` are
/// listed top row first and get stored bottom-up with 4-byte row padding.
pub fn bitmap_8bit(width: usize, table: &[[u8; 4]], indices: &[Vec<u8>]) -> Vec<u8> {
    let height = indices.len();
    let stride = width.div_ceil(4) * 4;
    let offset = 14 + 40 + table.len() * 4;
    let file_size = offset + stride * height;

    let mut bytes = Vec::with_capacity(file_size);
    bytes.extend_from_slice(b"BM");
    bytes.extend_from_slice(&(file_size as u32).to_le_bytes());
    bytes.extend_from_slice(&[0; 4]);
    bytes.extend_from_slice(&(offset as u32).to_le_bytes());

    bytes.extend_from_slice(&40u32.to_le_bytes());
    bytes.extend_from_slice(&(width as i32).to_le_bytes());
    bytes.extend_from_slice(&(height as i32).to_le_bytes());
    bytes.extend_from_slice(&1u16.to_le_bytes());
    bytes.extend_from_slice(&8u16.to_le_bytes());
    bytes.extend_from_slice(&0u32.to_le_bytes());
    bytes.extend_from_slice(&((stride * height) as u32).to_le_bytes());
    bytes.extend_from_slice(&2835i32.to_le_bytes());
    bytes.extend_from_slice(&2835i32.to_le_bytes());
    bytes.extend_from_slice(&(table.len() as u32).to_le_bytes());
    bytes.extend_from_slice(&0u32.to_le_bytes());

    for entry in table {
        bytes.extend_from_slice(entry);
    }
    for row in indices.iter().rev() {
        let mut line = row.clone();
        line.resize(stride, 0);
        bytes.extend_from_slice(&line);
    }
    bytes
}
