pub mod color;
pub mod compression;
pub mod constants;
pub mod image;

use log::*;
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

pub use crate::color::{PixelMatrix, Rgb, Rgba};
pub use crate::image::format::{EncodeOptions, ErrorKind, Image, PcxFormat, PcxHeader};
pub use crate::image::{decode, encode, encode_rgba, read_bitmap};

/// Sets up `env_logger` for the `lib_pcx` target and any extra `targets`.
///
/// Records go to `log_file` when one is given, otherwise to stderr.
pub fn init_logging(log_file: Option<&Path>, level: LevelFilter, targets: &[&str]) -> io::Result<()> {
    let target = match log_file {
        Some(path) => env_logger::Target::Pipe(Box::new(File::create(path)?)),
        None => env_logger::Target::Stderr,
    };

    let mut builder = env_logger::Builder::new();
    builder.target(target).filter(Some("lib_pcx"), level);
    for module in targets {
        builder.filter(Some(module), level);
    }

    let result = builder
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {}:{}] {}",
                record.level(),
                record.file().unwrap_or("unknown"),
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .try_init();

    if result.is_err() {
        warn!("Logger already initialised, keeping the existing one");
    }
    Ok(())
}
