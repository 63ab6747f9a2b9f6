mod common;

use std::collections::BTreeSet;

use common::{color_field, four_colors, gradient, translucent};
use lib_pcx::compression::bitplane::{PaletteLookup, PlaneLayout};
use lib_pcx::compression::median_cut::median_cut;
use lib_pcx::compression::rle::{rle_compression, rle_decompression, RleDecompressionError};
use lib_pcx::compression::{compress, decompress, DecompressionError, Reduction};
use lib_pcx::Rgba;

#[test]
fn test_comp_decomp_four_colors() {
    let pixels = four_colors();
    let compressed = compress(&pixels, Reduction::Quantize(16), 4, 1).unwrap();
    assert_eq!(compressed.palette.len(), 4);

    let layout = PlaneLayout::new(2, 2, 4, 1);
    let decompressed = decompress(
        &compressed.data,
        layout,
        PaletteLookup::Palette(&compressed.palette),
    )
    .unwrap();
    assert_eq!(decompressed, pixels);
}

#[test]
fn test_comp_decomp_gradients() {
    let pixels = gradient();
    let compressed = compress(&pixels, Reduction::Quantize(256), 8, 1).unwrap();
    assert_eq!(compressed.palette.len(), 256);

    let layout = PlaneLayout::new(16, 16, 8, 1);
    let decompressed = decompress(
        &compressed.data,
        layout,
        PaletteLookup::Palette(&compressed.palette),
    )
    .unwrap();
    assert_eq!(decompressed, pixels);
}

#[test]
fn test_comp_decomp_repeating_color() {
    let pixels = lib_pcx::PixelMatrix::new(vec![vec![Rgba::new(255, 0, 0, 255); 64]; 64]).unwrap();
    let compressed = compress(&pixels, Reduction::Quantize(16), 4, 1).unwrap();
    assert_eq!(compressed.palette.len(), 1);

    // 2048 zero bytes: 32 full runs of 63 plus one run of 32.
    assert_eq!(compressed.data.len(), 33 * 2);

    let layout = PlaneLayout::new(64, 64, 4, 1);
    let decompressed = decompress(
        &compressed.data,
        layout,
        PaletteLookup::Palette(&compressed.palette),
    )
    .unwrap();
    assert_eq!(decompressed, pixels);
}

#[test]
fn test_comp_decomp_quantized_field() {
    let pixels = color_field(37, 21);
    let population: Vec<Rgba> = pixels.pixels().collect();
    let distinct: BTreeSet<Rgba> = population.iter().copied().collect();
    assert!(distinct.len() > 16);

    let compressed = compress(&pixels, Reduction::Quantize(16), 4, 1).unwrap();
    assert_eq!(compressed.palette.len(), 16);

    let layout = PlaneLayout::new(37, 21, 4, 1);
    let decompressed = decompress(
        &compressed.data,
        layout,
        PaletteLookup::Palette(&compressed.palette),
    )
    .unwrap();

    // Every pixel comes back as its bucket's representative.
    let quantization = median_cut(&population, 16).unwrap();
    for (original, decoded) in pixels.pixels().zip(decompressed.pixels()) {
        assert_eq!(decoded, quantization.relation[&original]);
    }
}

#[test]
fn test_comp_decomp_planar() {
    let pixels = translucent(19, 5);
    let compressed = compress(&pixels, Reduction::Planar, 8, 4).unwrap();
    assert!(compressed.palette.is_empty());

    let layout = PlaneLayout::new(19, 5, 8, 4);
    let decompressed = decompress(&compressed.data, layout, PaletteLookup::Grayscale).unwrap();
    assert_eq!(decompressed, pixels);
}

#[test]
fn test_decomp_truncated_body() {
    let pixels = color_field(40, 40);
    let compressed = compress(&pixels, Reduction::Quantize(16), 4, 1).unwrap();
    let truncated = &compressed.data[..compressed.data.len() / 2];

    let layout = PlaneLayout::new(40, 40, 4, 1);
    let result = decompress(
        truncated,
        layout,
        PaletteLookup::Palette(&compressed.palette),
    );
    assert!(matches!(
        result,
        Err(DecompressionError::RleDecompressionFailed(
            RleDecompressionError::Truncated { .. } | RleDecompressionError::DanglingControlByte { .. }
        ))
    ));
}

#[test]
fn test_rle_round_trip_mixed_runs() {
    let mut data = Vec::new();
    for value in [0x00u8, 0xC0, 0x3F, 0xFF, 0x80, 0xC1] {
        for len in [1usize, 2, 62, 63, 64, 127, 200] {
            data.extend(std::iter::repeat(value).take(len));
        }
    }
    let compressed = rle_compression(&data);
    let decoded = rle_decompression(&compressed, data.len()).unwrap();
    assert_eq!(decoded.data, data);
    assert_eq!(decoded.consumed, compressed.len());
}
