pub const FORMAT_NAME: &str = "ZSoft PCX";
pub const FILE_EXT: &str = "pcx";

/// First byte of every PCX file.
pub const PCX_SIGNATURE: u8 = 0x0A;
pub const PCX_VERSION: u8 = 5;
/// The only encoding PCX defines: byte-wise run-length.
pub const PCX_ENCODING_RLE: u8 = 1;
/// Versions written by the various PaintBrush releases (1 was never used).
pub const PCX_KNOWN_VERSIONS: [u8; 5] = [0, 2, 3, 4, 5];
pub const PCX_HEADER_SIZE: usize = 128;
pub const PCX_PALETTE_TYPE_COLOR: u16 = 1;

pub const HEADER_PALETTE_ENTRIES: usize = 16;
pub const EXTENDED_PALETTE_ENTRIES: usize = 256;
/// Marker byte preceding the trailing 256-color palette.
pub const EXTENDED_PALETTE_MARKER: u8 = 0x0C;
/// Marker plus 256 RGB triples.
pub const EXTENDED_PALETTE_BLOCK_SIZE: usize = EXTENDED_PALETTE_ENTRIES * 3 + 1;

pub const RLE_FLAG: u8 = 0xC0;
pub const RLE_COUNT_MASK: u8 = 0x3F;
pub const RLE_MAX_RUN: usize = 63;

pub const BMP_SIGNATURE: u16 = 0x4D42; // "BM"
pub const BMP_FILE_HEADER_SIZE: usize = 14;
pub const BMP_INFO_HEADER_SIZE: usize = 40;
pub const BMP_COLOR_TABLE_ENTRY_SIZE: usize = 4;
pub const BMP_COMPRESSION_NONE: u32 = 0;
