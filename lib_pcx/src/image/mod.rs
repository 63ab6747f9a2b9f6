pub mod bmp;
pub mod decoder;
pub mod encoder;
pub mod format;

pub use bmp::read_bitmap;
pub use decoder::decode;
pub use encoder::{encode, encode_rgba};
