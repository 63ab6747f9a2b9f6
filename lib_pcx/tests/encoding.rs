mod common;

use common::{bitmap_8bit, color_field, four_colors, gradient, translucent, GRADIENT_HEIGHT, GRADIENT_WIDTH};
use lib_pcx::compression::median_cut::median_cut;
use lib_pcx::image::decoder::DecodeError;
use lib_pcx::image::encoder::EncodingError;
use lib_pcx::{
    decode, encode, encode_rgba, read_bitmap, EncodeOptions, ErrorKind, PcxFormat, PixelMatrix, Rgb,
    Rgba,
};

#[test]
fn test_encode_decode_four_colors() {
    let pixels = four_colors();
    let encoded = encode(&pixels, &EncodeOptions::default()).unwrap();

    // Header plus a handful of RLE bytes, no trailing palette.
    assert_eq!(encoded[0], 0x0A);
    assert_eq!(encoded[1], 5);
    assert_eq!(encoded[2], 1);
    assert_eq!(encoded[3], 4);
    assert_eq!(encoded[65], 1);
    assert_eq!(u16::from_le_bytes([encoded[66], encoded[67]]), 1);

    let decoded = decode(&encoded).unwrap();
    assert_eq!(decoded.width(), 2);
    assert_eq!(decoded.height(), 2);
    assert_eq!(decoded.pixels, pixels);

    // The header palette holds the four colors, the rest stays black.
    let palette = decoded.palette.unwrap();
    assert_eq!(palette.len(), 16);
    for color in pixels.pixels() {
        assert!(palette[..4].contains(&color.rgb()));
    }
    assert!(palette[4..].iter().all(|&c| c == Rgb::BLACK));
}

#[test]
fn test_encode_decode_quantized_to_sixteen() {
    let pixels = color_field(50, 30);
    let encoded = encode(&pixels, &EncodeOptions::default()).unwrap();
    let decoded = decode(&encoded).unwrap();

    let population: Vec<Rgba> = pixels.pixels().collect();
    let quantization = median_cut(&population, 16).unwrap();
    assert_eq!(quantization.palette.len(), 16);

    let expected: Vec<Vec<Rgba>> = pixels
        .rows()
        .iter()
        .map(|row| row.iter().map(|p| quantization.relation[p]).collect())
        .collect();
    assert_eq!(decoded.pixels.into_rows(), expected);
}

#[test]
fn test_encode_decode_gradient_extended_palette() {
    let pixels = gradient();
    let encoded = encode(&pixels, &EncodeOptions::with_format(PcxFormat::Palette256)).unwrap();

    let marker = encoded.len() - 769;
    assert_eq!(encoded[marker], 0x0C);

    let decoded = decode(&encoded).unwrap();
    assert_eq!(decoded.width(), GRADIENT_WIDTH);
    assert_eq!(decoded.height(), GRADIENT_HEIGHT);
    assert_eq!(decoded.palette.as_ref().map(Vec::len), Some(256));
    assert_eq!(decoded.pixels, pixels);
}

#[test]
fn test_extended_palette_is_padded() {
    let pixels = four_colors();
    let encoded = encode(&pixels, &EncodeOptions::with_format(PcxFormat::Palette256)).unwrap();
    let palette = &encoded[encoded.len() - 768..];
    assert_eq!(palette.len(), 256 * 3);
    assert!(palette[4 * 3..].iter().all(|&b| b == 0));

    let decoded = decode(&encoded).unwrap();
    assert_eq!(decoded.pixels, pixels);
}

#[test]
fn test_missing_marker_falls_back_to_grayscale() {
    let pixels = gradient();
    let mut encoded = encode(&pixels, &EncodeOptions::with_format(PcxFormat::Palette256)).unwrap();
    let marker = encoded.len() - 769;
    encoded[marker] = 0x0B;

    let decoded = decode(&encoded).unwrap();
    assert!(decoded.palette.is_none());
    // Palette order follows the gray level, so indices read as intensities.
    assert_eq!(decoded.pixels, pixels);
}

#[test]
fn test_encode_decode_true_color() {
    let pixels = color_field(13, 9);
    let encoded = encode(&pixels, &EncodeOptions::with_format(PcxFormat::TrueColor)).unwrap();
    assert_eq!(encoded[65], 3);

    let decoded = decode(&encoded).unwrap();
    assert!(decoded.palette.is_none());
    assert_eq!(decoded.pixels, pixels);
}

#[test]
fn test_encode_decode_true_color_alpha() {
    let pixels = translucent(20, 11);
    let encoded = encode(&pixels, &EncodeOptions::with_format(PcxFormat::TrueColorAlpha)).unwrap();
    assert_eq!(encoded[65], 4);

    let decoded = decode(&encoded).unwrap();
    assert_eq!(decoded.pixels, pixels);
}

#[test]
fn test_encode_options_in_header() {
    let options = EncodeOptions {
        format: PcxFormat::Palette16,
        resolution: (300, 150),
        screen_size: (640, 480),
    };
    let encoded = encode(&four_colors(), &options).unwrap();
    let decoded = decode(&encoded).unwrap();
    assert_eq!(decoded.header.horizontal_dpi, 300);
    assert_eq!(decoded.header.vertical_dpi, 150);
    assert_eq!(decoded.header.horizontal_screen_size, 640);
    assert_eq!(decoded.header.vertical_screen_size, 480);
    assert_eq!(decoded.header.palette_type, 1);
}

#[test]
fn test_encode_rgba_rejects_short_buffer() {
    let err = encode_rgba(4, 4, &[0; 4 * 4 * 3], &EncodeOptions::default()).unwrap_err();
    assert!(matches!(err, EncodingError::InvalidPixelMatrix(_)));
    assert_eq!(err.kind(), ErrorKind::Validation);
}

#[test]
fn test_encode_rgba_round_trip() {
    let data = [255, 0, 0, 255].repeat(12);
    let encoded = encode_rgba(4, 3, &data, &EncodeOptions::default()).unwrap();
    let decoded = decode(&encoded).unwrap();
    assert_eq!(decoded.pixels.to_rgba_bytes(), data);
    assert_eq!(decoded.palette.unwrap()[0], Rgb::new(255, 0, 0));
}

#[test]
fn test_decode_truncated_body_is_corruption() {
    let encoded = encode(&color_field(30, 30), &EncodeOptions::default()).unwrap();
    let err = decode(&encoded[..encoded.len() - 5]).unwrap_err();
    assert!(matches!(err, DecodeError::DecompressionFailed(_)));
    assert_eq!(err.kind(), ErrorKind::Corruption);
}

#[test]
fn test_bitmap_to_pcx() {
    // Blue, green, red, white in BGRx order.
    let table = [[255, 0, 0, 0], [0, 255, 0, 0], [0, 0, 255, 0], [255, 255, 255, 0]];
    let indices = vec![vec![0, 1, 2, 3, 0], vec![3, 3, 2, 1, 0], vec![1, 1, 1, 1, 1]];
    let bitmap = read_bitmap(&bitmap_8bit(5, &table, &indices)).unwrap();

    assert_eq!(bitmap.pixels.width(), 5);
    assert_eq!(bitmap.pixels.height(), 3);
    assert_eq!(bitmap.pixels.get(0, 0), Some(Rgba::new(0, 0, 255, 255)));
    assert_eq!(bitmap.pixels.get(2, 0), Some(Rgba::new(255, 0, 0, 255)));
    assert_eq!(bitmap.pixels.get(0, 2), Some(Rgba::new(0, 255, 0, 255)));

    let encoded = encode(&bitmap.pixels, &EncodeOptions::default()).unwrap();
    let decoded = decode(&encoded).unwrap();
    assert_eq!(decoded.pixels, bitmap.pixels);
}

#[test]
fn test_bitmap_with_many_colors_to_pcx() {
    let table: Vec<[u8; 4]> = (0..=255u8).map(|v| [v, 255 - v, v / 3, 0]).collect();
    let indices: Vec<Vec<u8>> = (0..10u8)
        .map(|y| (0..25u8).map(|x| x.wrapping_mul(10).wrapping_add(y)).collect())
        .collect();
    let bitmap = read_bitmap(&bitmap_8bit(25, &table, &indices)).unwrap();

    let encoded = encode(&bitmap.pixels, &EncodeOptions::default()).unwrap();
    let decoded = decode(&encoded).unwrap();
    let palette = decoded.palette.unwrap();
    for pixel in decoded.pixels.pixels() {
        assert!(palette.contains(&pixel.rgb()));
    }

    let encoded = encode(&bitmap.pixels, &EncodeOptions::with_format(PcxFormat::Palette256)).unwrap();
    let decoded = decode(&encoded).unwrap();
    assert_eq!(decoded.pixels, bitmap.pixels);
}

#[test]
fn test_single_color_image() {
    let pixels = PixelMatrix::new(vec![vec![Rgba::new(9, 8, 7, 255); 3]; 2]).unwrap();
    for format in [PcxFormat::Palette16, PcxFormat::Palette256] {
        let encoded = encode(&pixels, &EncodeOptions::with_format(format)).unwrap();
        let decoded = decode(&encoded).unwrap();
        assert_eq!(decoded.pixels, pixels);
        assert_eq!(decoded.palette.unwrap()[0], Rgb::new(9, 8, 7));
    }
}
