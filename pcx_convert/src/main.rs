mod convert;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use lib_pcx::PcxFormat;
use log::LevelFilter;

use convert::{encode_file, inspect_file, ConvertError};

#[derive(Parser, Debug)]
#[command(name = "pcx-convert")]
#[command(author, version, about = "Convert 8-bit indexed BMP files to palette PCX images", long_about = None)]
struct Cli {
    /// Log debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Write log records to this file instead of stderr
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert a BMP file to PCX
    Encode {
        /// Source bitmap
        input: PathBuf,

        /// Destination file (defaults to the input with a .pcx extension)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Target PCX layout
        #[arg(short, long, value_enum, default_value_t = Format::Palette16)]
        format: Format,

        /// Resolution written to the header, in dpi
        #[arg(long, default_value_t = 72)]
        dpi: u16,
    },
    /// Decode a PCX file and print its header
    Inspect {
        input: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    /// 16 colors, 4 bits per pixel
    Palette16,
    /// 256 colors, 8 bits per pixel
    Palette256,
    /// 24-bit RGB planes
    TrueColor,
    /// 32-bit RGBA planes
    TrueColorAlpha,
}

impl From<Format> for PcxFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Palette16 => PcxFormat::Palette16,
            Format::Palette256 => PcxFormat::Palette256,
            Format::TrueColor => PcxFormat::TrueColor,
            Format::TrueColorAlpha => PcxFormat::TrueColorAlpha,
        }
    }
}

fn main() -> Result<(), ConvertError> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    lib_pcx::init_logging(cli.log_file.as_deref(), level, &["pcx_convert"])?;

    match cli.command {
        Command::Encode {
            input,
            output,
            format,
            dpi,
        } => {
            let output = encode_file(&input, output, format.into(), dpi)?;
            println!("File saved successfully to {}", output.display());
        }
        Command::Inspect { input } => {
            println!("{}", inspect_file(&input)?);
        }
    }

    Ok(())
}
