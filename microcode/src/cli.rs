use clap::Parser;

use crate::writer::ImageFormat;

#[derive(Parser)]
#[command(name = "Microcode Generator")]
#[command(version = "1.0")]
#[command(about = "Generates the control-logic EEPROM images for the 8-bit CPU", long_about = None)]
pub(crate) struct Cli {
    /// Output file prefix; images are written to <prefix>0 (low byte) and <prefix>1 (high byte)
    #[arg(short, long, default_value = "ee")]
    pub(crate) output: String,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = ImageFormat::Binary)]
    pub(crate) format: ImageFormat,

    /// Print the microcode table to stdout instead of writing images
    #[arg(short, long)]
    pub(crate) list: bool,
}
